//! Read-only traversal over the program AST.
//!
//! A visitor overrides the hooks it cares about; every hook defaults to
//! the matching `walk_*` descent helper, so recursion is explicit: an
//! override that still wants its children visited calls the helper
//! itself.

use crate::arena::Handle;
use crate::decl::{
    AliasDecl, BufferDecl, FunctionDecl, Program, SamplerDecl, StructDecl, UniformBufferDecl,
    VarDecl,
};
use crate::expr::{Expr, ExprKind};
use crate::stmt::{Stmt, StmtKind};

/// Double-dispatch replacement: one hook per node family with a
/// default-descent body.
pub trait Visitor: Sized {
    fn visit_program(&mut self, program: &Program) {
        walk_program(self, program);
    }

    fn visit_stmt(&mut self, program: &Program, stmt: Handle<Stmt>) {
        walk_stmt(self, program, stmt);
    }

    fn visit_expr(&mut self, program: &Program, expr: Handle<Expr>) {
        walk_expr(self, program, expr);
    }

    fn visit_var_decl(&mut self, program: &Program, decl: Handle<VarDecl>) {
        walk_var_decl(self, program, decl);
    }

    fn visit_buffer_decl(&mut self, program: &Program, decl: Handle<BufferDecl>) {
        let _ = (program, decl);
    }

    fn visit_sampler_decl(&mut self, program: &Program, decl: Handle<SamplerDecl>) {
        walk_sampler_decl(self, program, decl);
    }

    fn visit_struct_decl(&mut self, program: &Program, decl: Handle<StructDecl>) {
        walk_struct_decl(self, program, decl);
    }

    fn visit_alias_decl(&mut self, program: &Program, decl: Handle<AliasDecl>) {
        let _ = (program, decl);
    }

    fn visit_function_decl(&mut self, program: &Program, decl: Handle<FunctionDecl>) {
        walk_function_decl(self, program, decl);
    }

    fn visit_uniform_buffer_decl(&mut self, program: &Program, decl: Handle<UniformBufferDecl>) {
        walk_uniform_buffer_decl(self, program, decl);
    }
}

/// Visits every active top-level statement.
pub fn walk_program<V: Visitor>(visitor: &mut V, program: &Program) {
    for &stmt in &program.global_stmts {
        visitor.visit_stmt(program, stmt);
    }
}

/// Descends into a statement's children.
pub fn walk_stmt<V: Visitor>(visitor: &mut V, program: &Program, stmt: Handle<Stmt>) {
    match &program.stmts[stmt].kind {
        StmtKind::CodeBlock { stmts } => {
            for &s in stmts {
                visitor.visit_stmt(program, s);
            }
        }
        StmtKind::VarDeclStmt { decls, .. } => {
            for &d in decls {
                visitor.visit_var_decl(program, d);
            }
        }
        StmtKind::BufferDeclStmt { decls, .. } => {
            for &d in decls {
                visitor.visit_buffer_decl(program, d);
            }
        }
        StmtKind::SamplerDeclStmt { decls, .. } => {
            for &d in decls {
                visitor.visit_sampler_decl(program, d);
            }
        }
        StmtKind::StructDeclStmt { decl } => visitor.visit_struct_decl(program, *decl),
        StmtKind::AliasDeclStmt {
            struct_decl,
            aliases,
        } => {
            if let Some(decl) = struct_decl {
                visitor.visit_struct_decl(program, *decl);
            }
            for &a in aliases {
                visitor.visit_alias_decl(program, a);
            }
        }
        StmtKind::UniformBufferDeclStmt { decl } => {
            visitor.visit_uniform_buffer_decl(program, *decl)
        }
        StmtKind::FunctionDeclStmt { decl } => visitor.visit_function_decl(program, *decl),
        StmtKind::StateDeclStmt { initializer, .. } => {
            if let Some(init) = initializer {
                visitor.visit_expr(program, *init);
            }
        }
        StmtKind::For {
            init,
            condition,
            iteration,
            body,
        } => {
            if let Some(init) = init {
                visitor.visit_stmt(program, *init);
            }
            if let Some(condition) = condition {
                visitor.visit_expr(program, *condition);
            }
            if let Some(iteration) = iteration {
                visitor.visit_expr(program, *iteration);
            }
            visitor.visit_stmt(program, *body);
        }
        StmtKind::While { condition, body } => {
            visitor.visit_expr(program, *condition);
            visitor.visit_stmt(program, *body);
        }
        StmtKind::DoWhile { body, condition } => {
            visitor.visit_stmt(program, *body);
            visitor.visit_expr(program, *condition);
        }
        StmtKind::If {
            condition,
            body,
            else_branch,
        } => {
            visitor.visit_expr(program, *condition);
            visitor.visit_stmt(program, *body);
            if let Some(else_branch) = else_branch {
                visitor.visit_stmt(program, *else_branch);
            }
        }
        StmtKind::Switch { selector, cases } => {
            visitor.visit_expr(program, *selector);
            for case in cases {
                if let Some(label) = case.label {
                    visitor.visit_expr(program, label);
                }
                for &s in &case.stmts {
                    visitor.visit_stmt(program, s);
                }
            }
        }
        StmtKind::ExprStmt { expr } => visitor.visit_expr(program, *expr),
        StmtKind::Return { expr } => {
            if let Some(expr) = expr {
                visitor.visit_expr(program, *expr);
            }
        }
        StmtKind::CtrlTransfer(_) => {}
    }
}

/// Descends into an expression's children.
pub fn walk_expr<V: Visitor>(visitor: &mut V, program: &Program, expr: Handle<Expr>) {
    match &program.exprs[expr].kind {
        ExprKind::Literal { .. } => {}
        ExprKind::Object { prefix, .. } => {
            if let Some(prefix) = prefix {
                visitor.visit_expr(program, *prefix);
            }
        }
        ExprKind::Call {
            prefix, arguments, ..
        } => {
            if let Some(prefix) = prefix {
                visitor.visit_expr(program, *prefix);
            }
            for &arg in arguments {
                visitor.visit_expr(program, arg);
            }
        }
        ExprKind::Subscript { prefix, indices } => {
            visitor.visit_expr(program, *prefix);
            for &index in indices {
                visitor.visit_expr(program, index);
            }
        }
        ExprKind::Cast { expr, .. } => visitor.visit_expr(program, *expr),
        ExprKind::InitializerList { exprs } => {
            for &e in exprs {
                visitor.visit_expr(program, e);
            }
        }
        ExprKind::StateInitializer { values } => {
            for value in values {
                visitor.visit_expr(program, value.value);
            }
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            visitor.visit_expr(program, *lhs);
            visitor.visit_expr(program, *rhs);
        }
        ExprKind::Unary { expr, .. } => visitor.visit_expr(program, *expr),
        ExprKind::Assign { lvalue, value, .. } => {
            visitor.visit_expr(program, *lvalue);
            visitor.visit_expr(program, *value);
        }
        ExprKind::Bracket { expr } => visitor.visit_expr(program, *expr),
    }
}

/// Visits a variable's initializer.
pub fn walk_var_decl<V: Visitor>(visitor: &mut V, program: &Program, decl: Handle<VarDecl>) {
    if let Some(init) = program.var_decls[decl].initializer {
        visitor.visit_expr(program, init);
    }
}

/// Visits a sampler's state-value expressions.
pub fn walk_sampler_decl<V: Visitor>(visitor: &mut V, program: &Program, decl: Handle<SamplerDecl>) {
    for value in &program.sampler_decls[decl].values {
        visitor.visit_expr(program, value.value);
    }
}

/// Visits a struct's member statements.
pub fn walk_struct_decl<V: Visitor>(visitor: &mut V, program: &Program, decl: Handle<StructDecl>) {
    for &member in &program.struct_decls[decl].members {
        visitor.visit_stmt(program, member);
    }
}

/// Visits a function's parameters and body.
pub fn walk_function_decl<V: Visitor>(
    visitor: &mut V,
    program: &Program,
    decl: Handle<FunctionDecl>,
) {
    for &param in &program.function_decls[decl].parameters {
        visitor.visit_stmt(program, param);
    }
    if let Some(body) = program.function_decls[decl].body {
        visitor.visit_stmt(program, body);
    }
}

/// Visits a constant buffer's member statements.
pub fn walk_uniform_buffer_decl<V: Visitor>(
    visitor: &mut V,
    program: &Program,
    decl: Handle<UniformBufferDecl>,
) {
    for &member in &program.uniform_buffer_decls[decl].members {
        visitor.visit_stmt(program, member);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::TypeSpecifier;
    use crate::denoter::TypeDenoter;
    use crate::expr::Expr;
    use crate::op::BinaryOp;
    use crate::types::DataType;

    #[derive(Default)]
    struct Counter {
        stmts: usize,
        exprs: usize,
        var_decls: usize,
    }

    impl Visitor for Counter {
        fn visit_stmt(&mut self, program: &Program, stmt: Handle<Stmt>) {
            self.stmts += 1;
            walk_stmt(self, program, stmt);
        }

        fn visit_expr(&mut self, program: &Program, expr: Handle<Expr>) {
            self.exprs += 1;
            walk_expr(self, program, expr);
        }

        fn visit_var_decl(&mut self, program: &Program, decl: Handle<VarDecl>) {
            self.var_decls += 1;
            walk_var_decl(self, program, decl);
        }
    }

    #[test]
    fn counts_nested_nodes() {
        let mut program = Program::default();
        let one = program.add_expr(Expr::new(ExprKind::Literal {
            data_type: DataType::Int,
            value: "1".into(),
        }));
        let two = program.add_expr(Expr::new(ExprKind::Literal {
            data_type: DataType::Int,
            value: "2".into(),
        }));
        let sum = program.add_expr(Expr::new(ExprKind::Binary {
            op: BinaryOp::Add,
            lhs: one,
            rhs: two,
        }));
        let var = program.var_decls.append(crate::decl::VarDecl {
            initializer: Some(sum),
            ..crate::decl::VarDecl::new("x", TypeDenoter::base(DataType::Int))
        });
        let decl_stmt = program.add_stmt(Stmt::new(StmtKind::VarDeclStmt {
            specifier: TypeSpecifier::new(TypeDenoter::base(DataType::Int)),
            decls: vec![var],
        }));
        let block = program.add_stmt(Stmt::new(StmtKind::CodeBlock {
            stmts: vec![decl_stmt],
        }));
        program.global_stmts.push(block);

        let mut counter = Counter::default();
        counter.visit_program(&program);
        assert_eq!(counter.stmts, 2);
        assert_eq!(counter.var_decls, 1);
        assert_eq!(counter.exprs, 3);
    }

    #[test]
    fn override_suppresses_descent() {
        struct StopAtBlock {
            stmts: usize,
        }
        impl Visitor for StopAtBlock {
            fn visit_stmt(&mut self, _program: &Program, _stmt: Handle<Stmt>) {
                // no walk_stmt call: children are not visited
                self.stmts += 1;
            }
        }

        let mut program = Program::default();
        let inner = program.add_stmt(Stmt::new(StmtKind::CodeBlock { stmts: vec![] }));
        let outer = program.add_stmt(Stmt::new(StmtKind::CodeBlock {
            stmts: vec![inner],
        }));
        program.global_stmts.push(outer);

        let mut visitor = StopAtBlock { stmts: 0 };
        visitor.visit_program(&program);
        assert_eq!(visitor.stmts, 1);
    }
}
