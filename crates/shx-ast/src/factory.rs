//! Builders for the synthetic nodes the lowering pass inserts.

use crate::arena::Handle;
use crate::decl::{Program, TypeSpecifier, VarDecl};
use crate::denoter::TypeDenoter;
use crate::expr::{Expr, ExprKind, SymbolRef};
use crate::flags::AstFlags;
use crate::op::AssignOp;
use crate::resource::BufferType;
use crate::stmt::{Stmt, StmtKind};
use crate::types::DataType;

/// A variable-declaration statement introducing one fresh variable of
/// the given type. Returns the statement and the declarator.
pub fn make_var_decl_stmt(
    program: &mut Program,
    ty: TypeDenoter,
    ident: &str,
) -> (Handle<Stmt>, Handle<VarDecl>) {
    let var = program.var_decls.append(VarDecl::new(ident, ty.clone()));
    let stmt = program.add_stmt(Stmt::new(StmtKind::VarDeclStmt {
        specifier: TypeSpecifier::new(ty),
        decls: vec![var],
    }));
    (stmt, var)
}

/// An object expression referencing an existing variable declaration.
pub fn make_object_expr(program: &mut Program, var: Handle<VarDecl>) -> Handle<Expr> {
    let ident = program.var_decls[var].ident.clone();
    let ty = program.var_decls[var].ty.clone();
    program.add_expr(Expr::typed(
        ExprKind::Object {
            prefix: None,
            ident,
            symbol: Some(SymbolRef::Var(var)),
        },
        ty,
    ))
}

/// Wraps a single statement in a code block.
pub fn make_code_block_stmt(program: &mut Program, inner: Handle<Stmt>) -> Handle<Stmt> {
    program.add_stmt(Stmt::new(StmtKind::CodeBlock { stmts: vec![inner] }))
}

/// A literal expression.
pub fn make_literal_expr(
    program: &mut Program,
    data_type: DataType,
    value: &str,
) -> Handle<Expr> {
    program.add_expr(Expr::typed(
        ExprKind::Literal {
            data_type,
            value: value.into(),
        },
        TypeDenoter::base(data_type),
    ))
}

/// A cast of a literal to the given target type, e.g. the `T(0)` and
/// `T(1)` bounds of a lowered `saturate`.
pub fn make_literal_cast_expr(
    program: &mut Program,
    target: &TypeDenoter,
    literal_type: DataType,
    value: &str,
) -> Handle<Expr> {
    let literal = make_literal_expr(program, literal_type, value);
    program.add_expr(Expr::typed(
        ExprKind::Cast {
            specifier: TypeSpecifier::new(target.clone()),
            expr: literal,
        },
        target.clone(),
    ))
}

/// An initializer list repeating `literal` once per member type, cast
/// to that member's type. Used to turn a cast-to-struct of a single
/// literal into a constructor list.
pub fn make_constructor_list_expr(
    program: &mut Program,
    literal: Handle<Expr>,
    member_types: &[TypeDenoter],
) -> Handle<Expr> {
    let (data_type, value) = match &program.exprs[literal].kind {
        ExprKind::Literal { data_type, value } => (*data_type, value.clone()),
        _ => (DataType::Int, "0".into()),
    };
    let mut exprs = Vec::with_capacity(member_types.len());
    for member in member_types {
        exprs.push(make_literal_cast_expr(program, member, data_type, &value));
    }
    program.add_expr(Expr::new(ExprKind::InitializerList { exprs }))
}

/// The VKSL constructor identifier binding a texture kind together with
/// a separate sampler (`sampler2D(tex, smpl)` and friends).
pub fn vksl_sampler_ident(buffer_type: BufferType) -> &'static str {
    match buffer_type {
        BufferType::Texture1D => "sampler1D",
        BufferType::Texture1DArray => "sampler1DArray",
        BufferType::Texture2D => "sampler2D",
        BufferType::Texture2DArray => "sampler2DArray",
        BufferType::Texture3D => "sampler3D",
        BufferType::TextureCube => "samplerCube",
        BufferType::TextureCubeArray => "samplerCubeArray",
        BufferType::Texture2DMs => "sampler2DMS",
        BufferType::Texture2DMsArray => "sampler2DMSArray",
        _ => "sampler2D",
    }
}

/// A texture + sampler binding call for VKSL output, replacing a
/// sampler-state argument of a texture intrinsic.
pub fn make_texture_sampler_binding_call(
    program: &mut Program,
    texture: Handle<Expr>,
    sampler: Handle<Expr>,
    buffer_type: BufferType,
) -> Handle<Expr> {
    program.add_expr(Expr::new(ExprKind::Call {
        prefix: None,
        ident: vksl_sampler_ident(buffer_type).into(),
        intrinsic: None,
        function: None,
        arguments: vec![texture, sampler],
    }))
}

/// An element assignment `name[i0][i1]... = value;` used when array
/// initializers are unrolled.
pub fn make_array_assign_stmt(
    program: &mut Program,
    var: Handle<VarDecl>,
    indices: &[u32],
    value: Handle<Expr>,
) -> Handle<Stmt> {
    let object = make_object_expr(program, var);
    let index_exprs = indices
        .iter()
        .map(|&i| make_literal_expr(program, DataType::Int, &i.to_string()))
        .collect();
    let subscript = program.add_expr(Expr::new(ExprKind::Subscript {
        prefix: object,
        indices: index_exprs,
    }));
    let assign = program.add_expr(Expr::new(ExprKind::Assign {
        lvalue: subscript,
        op: AssignOp::Set,
        value,
    }));
    let mut stmt = Stmt::new(StmtKind::ExprStmt { expr: assign });
    stmt.flags.insert(AstFlags::REACHABLE);
    program.add_stmt(stmt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_decl_stmt_links_declarator() {
        let mut program = Program::default();
        let (stmt, var) =
            make_var_decl_stmt(&mut program, TypeDenoter::base(DataType::Int), "tmp_count");
        assert_eq!(program.var_decls[var].ident, "tmp_count");
        match &program.stmts[stmt].kind {
            StmtKind::VarDeclStmt { decls, specifier } => {
                assert_eq!(decls, &vec![var]);
                assert!(specifier.ty.is_base());
            }
            _ => panic!("expected VarDeclStmt"),
        }
    }

    #[test]
    fn object_expr_copies_type() {
        let mut program = Program::default();
        let (_, var) =
            make_var_decl_stmt(&mut program, TypeDenoter::base(DataType::Float3), "v");
        let obj = make_object_expr(&mut program, var);
        assert_eq!(
            program.exprs[obj].ty.as_ref().unwrap().as_base().unwrap().data_type,
            DataType::Float3
        );
        assert_eq!(program.expr_var_decl(obj), Some(var));
    }

    #[test]
    fn constructor_list_casts_each_member() {
        let mut program = Program::default();
        let literal = make_literal_expr(&mut program, DataType::Int, "0");
        let members = vec![
            TypeDenoter::base(DataType::Float),
            TypeDenoter::base(DataType::Int2),
        ];
        let list = make_constructor_list_expr(&mut program, literal, &members);
        match &program.exprs[list].kind {
            ExprKind::InitializerList { exprs } => {
                assert_eq!(exprs.len(), 2);
                for &e in exprs {
                    assert!(matches!(program.exprs[e].kind, ExprKind::Cast { .. }));
                }
            }
            _ => panic!("expected InitializerList"),
        }
    }

    #[test]
    fn array_assign_shape() {
        let mut program = Program::default();
        let (_, var) = make_var_decl_stmt(
            &mut program,
            TypeDenoter::base(DataType::Float),
            "values",
        );
        let value = make_literal_expr(&mut program, DataType::Float, "1.0");
        let stmt = make_array_assign_stmt(&mut program, var, &[2, 3], value);
        let StmtKind::ExprStmt { expr } = &program.stmts[stmt].kind else {
            panic!("expected ExprStmt");
        };
        let ExprKind::Assign { lvalue, op, .. } = &program.exprs[*expr].kind else {
            panic!("expected Assign");
        };
        assert_eq!(*op, AssignOp::Set);
        let ExprKind::Subscript { indices, .. } = &program.exprs[*lvalue].kind else {
            panic!("expected Subscript");
        };
        assert_eq!(indices.len(), 2);
    }

    #[test]
    fn vksl_sampler_idents() {
        assert_eq!(vksl_sampler_ident(BufferType::Texture2D), "sampler2D");
        assert_eq!(vksl_sampler_ident(BufferType::TextureCubeArray), "samplerCubeArray");
    }
}
