//! The main lowering pass over the program AST.

use shx_ast::arena::Arena;
use shx_ast::{
    AstFlags, DataType, Expr, ExprKind, FunctionDecl, Handle, Intrinsic, OutputVersion, Program,
    ShaderTarget, StateValue, Stmt, StmtKind, StorageClass, StructDecl, StructTypeDenoter,
    SymbolRef, TypeDenoter, VarDecl, factory, vector_data_type,
};

use crate::exprconv::{ExprConvFlags, ExprConverter};
use crate::keywords::is_reserved_word;
use crate::scope::ScopeStack;
use crate::{ConvertError, ConvertOptions, NameMangling};

/// One lowering pass instance. Scratch state (scope stack, decl
/// stacks, counters) lives here and dies with the pass.
pub(crate) struct Converter {
    target: ShaderTarget,
    mangling: NameMangling,
    options: ConvertOptions,
    is_vksl: bool,
    expr_converter: ExprConverter,

    scopes: ScopeStack,
    func_stack: Vec<Handle<FunctionDecl>>,
    struct_stack: Vec<Handle<StructDecl>>,
    self_param_stack: Vec<Handle<VarDecl>>,
    global_reserved: Vec<SymbolRef>,

    anonym_counter: u32,
    obfuscation_counter: u32,
}

impl Converter {
    pub(crate) fn new(
        target: ShaderTarget,
        mangling: NameMangling,
        options: ConvertOptions,
        version: OutputVersion,
    ) -> Self {
        Self {
            target,
            mangling,
            options,
            is_vksl: version.is_vksl(),
            expr_converter: ExprConverter::new(ExprConvFlags::CASTS),
            scopes: ScopeStack::new(),
            func_stack: Vec::new(),
            struct_stack: Vec::new(),
            self_param_stack: Vec::new(),
            global_reserved: Vec::new(),
            anonym_counter: 0,
            obfuscation_counter: 0,
        }
    }

    pub(crate) fn convert_program(&mut self, program: &mut Program) -> Result<(), ConvertError> {
        self.reserve_entry_point_io(program);

        self.scopes.open();
        let stmts = program.global_stmts.clone();
        let result = self.visit_stmts(program, &stmts);
        self.scopes.close();
        result?;

        if !self.is_vksl {
            self.move_sampler_state_globals(program);
        }

        debug_assert_eq!(self.scopes.depth(), 0);
        debug_assert!(self.func_stack.is_empty());
        debug_assert!(self.struct_stack.is_empty());
        debug_assert!(self.self_param_stack.is_empty());
        Ok(())
    }

    /// Renames the entry point's I/O variables after their semantics
    /// and registers both partitions as globally reserved.
    fn reserve_entry_point_io(&mut self, program: &mut Program) {
        let Some(entry_point) = program.entry_point else {
            return;
        };
        let ep = &program.function_decls[entry_point];
        let inputs = ep.input_semantics.var_refs.clone();
        let inputs_sv = ep.input_semantics.var_refs_sv.clone();
        let outputs = ep.output_semantics.var_refs.clone();
        let outputs_sv = ep.output_semantics.var_refs_sv.clone();

        match self.target {
            ShaderTarget::VertexShader => {
                if self.mangling.use_always_semantics {
                    self.rename_in_out_idents(program, &inputs, true, true);
                }
                self.rename_in_out_idents(program, &outputs, false, false);
            }
            ShaderTarget::FragmentShader => {
                self.rename_in_out_idents(program, &inputs, true, false);
                if self.mangling.use_always_semantics {
                    self.rename_in_out_idents(program, &outputs, false, true);
                }
            }
            _ => {
                self.rename_in_out_idents(program, &inputs, true, false);
                self.rename_in_out_idents(program, &outputs, false, false);
            }
        }

        for &var in inputs.iter().chain(&outputs).chain(&inputs_sv).chain(&outputs_sv) {
            self.register_decl_ident(program, SymbolRef::Var(var), true);
        }
    }

    fn rename_in_out_idents(
        &self,
        program: &mut Program,
        vars: &[Handle<VarDecl>],
        input: bool,
        semantic_only: bool,
    ) {
        for &var in vars {
            let semantic = program.var_decls[var].semantic.to_string();
            program.var_decls[var].ident = if semantic_only {
                semantic
            } else if input {
                format!("{}{}", self.mangling.input_prefix, semantic)
            } else {
                format!("{}{}", self.mangling.output_prefix, semantic)
            };
        }
    }

    /// Moves top-level sampler-state declarations into the disabled
    /// list. They stay addressable for diagnostics but are not
    /// emitted.
    fn move_sampler_state_globals(&mut self, program: &mut Program) {
        let mut kept = Vec::with_capacity(program.global_stmts.len());
        for &stmt in &program.global_stmts.clone() {
            if self.stmt_is_sampler_state(program, stmt) {
                program.disabled_stmts.push(stmt);
            } else {
                kept.push(stmt);
            }
        }
        program.global_stmts = kept;
    }

    fn stmt_is_sampler_state(&self, program: &Program, stmt: Handle<Stmt>) -> bool {
        match &program.stmts[stmt].kind {
            StmtKind::SamplerDeclStmt { sampler_type, .. } => sampler_type.is_sampler_state(),
            StmtKind::VarDeclStmt { specifier, .. } => specifier.ty.is_sampler_state(program),
            _ => false,
        }
    }

    /* ----- Scope and identifier handling ----- */

    fn ident_of(program: &Program, symbol: SymbolRef) -> &str {
        match symbol {
            SymbolRef::Var(h) => &program.var_decls[h].ident,
            SymbolRef::Buffer(h) => &program.buffer_decls[h].ident,
            SymbolRef::Sampler(h) => &program.sampler_decls[h].ident,
            SymbolRef::Struct(h) => &program.struct_decls[h].ident,
            SymbolRef::Alias(h) => &program.alias_decls[h].ident,
            SymbolRef::Function(h) => &program.function_decls[h].ident,
        }
    }

    fn set_ident(program: &mut Program, symbol: SymbolRef, ident: String) {
        match symbol {
            SymbolRef::Var(h) => program.var_decls[h].ident = ident,
            SymbolRef::Buffer(h) => program.buffer_decls[h].ident = ident,
            SymbolRef::Sampler(h) => program.sampler_decls[h].ident = ident,
            SymbolRef::Struct(h) => program.struct_decls[h].ident = ident,
            SymbolRef::Alias(h) => program.alias_decls[h].ident = ident,
            SymbolRef::Function(h) => program.function_decls[h].ident = ident,
        }
    }

    /// Renames the declaration if required, then binds it either in
    /// the current scope or in the globally reserved list. Renames
    /// happen before registration so later lookups see the final name.
    fn register_decl_ident(&mut self, program: &mut Program, symbol: SymbolRef, global: bool) {
        let mut ident = Self::ident_of(program, symbol).to_string();
        let mut renamed = false;

        if self.must_rename(program, symbol) {
            ident = format!("{}{}", self.mangling.temporary_prefix, ident);
            renamed = true;
        }
        renamed |= self.rename_reserved(&mut ident);
        if renamed {
            Self::set_ident(program, symbol, ident.clone());
        }

        if global {
            self.global_reserved.push(symbol);
        } else {
            self.scopes.register(&ident);
        }
    }

    fn must_rename(&self, program: &Program, symbol: SymbolRef) -> bool {
        let ident = Self::ident_of(program, symbol);
        if let SymbolRef::Var(var) = symbol {
            // Struct members and shader inputs keep their names.
            if !self.struct_stack.is_empty()
                || program.var_decls[var].flags.contains(AstFlags::SHADER_INPUT)
            {
                return false;
            }
            if let Some(&reserved) = self
                .global_reserved
                .iter()
                .find(|&&r| Self::ident_of(program, r) == ident)
            {
                // The reserved declaration itself keeps the name.
                return reserved != symbol;
            }
        }
        self.scopes.fetch_current(ident)
    }

    /// Rewrites reserved-word and `gl_`-prefixed identifiers; under
    /// obfuscation, every identifier becomes `_N`.
    fn rename_reserved(&mut self, ident: &mut String) -> bool {
        if self.options.obfuscate {
            *ident = format!("_{}", self.obfuscation_counter);
            self.obfuscation_counter += 1;
            return true;
        }
        if is_reserved_word(ident) || ident.starts_with("gl_") {
            *ident = format!("{}{}", self.mangling.reserved_word_prefix, ident);
            return true;
        }
        false
    }

    fn inside_entry_point(&self, program: &Program) -> bool {
        self.func_stack
            .last()
            .is_some_and(|&f| program.function_decls[f].is_entry_point())
    }

    /* ----- Statements ----- */

    fn visit_stmts(
        &mut self,
        program: &mut Program,
        stmts: &[Handle<Stmt>],
    ) -> Result<(), ConvertError> {
        for &stmt in stmts {
            self.visit_stmt(program, stmt, false)?;
        }
        Ok(())
    }

    fn visit_stmt(
        &mut self,
        program: &mut Program,
        stmt: Handle<Stmt>,
        disable_new_scope: bool,
    ) -> Result<(), ConvertError> {
        match &program.stmts[stmt].kind {
            StmtKind::CodeBlock { .. } => {
                self.remove_dead_code(program, stmt);
                if self.options.unroll_array_initializers {
                    self.unroll_block(program, stmt);
                }
                let StmtKind::CodeBlock { stmts } = &program.stmts[stmt].kind else {
                    unreachable!();
                };
                let children = stmts.clone();
                if disable_new_scope {
                    self.visit_stmts(program, &children)
                } else {
                    self.scopes.open();
                    let result = self.visit_stmts(program, &children);
                    self.scopes.close();
                    result
                }
            }

            StmtKind::VarDeclStmt { .. } => {
                // `static` is a reserved word in the target language.
                if let StmtKind::VarDeclStmt { specifier, .. } = &mut program.stmts[stmt].kind {
                    specifier
                        .storage_classes
                        .retain(|class| *class != StorageClass::Static);
                }
                let StmtKind::VarDeclStmt { decls, .. } = &program.stmts[stmt].kind else {
                    unreachable!();
                };
                let decls = decls.clone();
                for decl in decls {
                    self.register_decl_ident(program, SymbolRef::Var(decl), false);
                    if let Some(init) = program.var_decls[decl].initializer {
                        self.visit_expr(program, init)?;
                    }
                }
                Ok(())
            }

            StmtKind::BufferDeclStmt { decls, .. } => {
                for decl in decls.clone() {
                    self.register_decl_ident(program, SymbolRef::Buffer(decl), false);
                }
                Ok(())
            }

            StmtKind::SamplerDeclStmt { decls, .. } => {
                for decl in decls.clone() {
                    self.register_decl_ident(program, SymbolRef::Sampler(decl), false);
                }
                Ok(())
            }

            StmtKind::StructDeclStmt { decl } => {
                let decl = *decl;
                self.convert_struct_decl(program, decl)
            }

            StmtKind::AliasDeclStmt {
                struct_decl,
                aliases,
            } => {
                let struct_decl = *struct_decl;
                let aliases = aliases.clone();
                if let Some(decl) = struct_decl {
                    // An anonymous struct takes the first alias's name;
                    // alias names disappear in the output.
                    if program.struct_decls[decl].is_anonymous() && !aliases.is_empty() {
                        let name = program.alias_decls[aliases[0]].ident.clone();
                        program.struct_decls[decl].ident = name.clone();
                        for &alias in &aliases {
                            if let TypeDenoter::Struct(denoter) =
                                &mut program.alias_decls[alias].ty
                                && denoter.ident.is_empty()
                            {
                                denoter.ident = name.clone();
                            }
                        }
                    }
                    self.convert_struct_decl(program, decl)?;
                }
                Ok(())
            }

            StmtKind::UniformBufferDeclStmt { decl } => {
                let members = program.uniform_buffer_decls[*decl].members.clone();
                self.visit_stmts(program, &members)
            }

            StmtKind::FunctionDeclStmt { decl } => {
                let decl = *decl;
                self.convert_function_decl(program, decl)
            }

            StmtKind::StateDeclStmt { .. } => Ok(()),

            StmtKind::For { .. } => {
                self.wrap_loop_body(program, stmt);
                let StmtKind::For {
                    init,
                    condition,
                    iteration,
                    body,
                } = &program.stmts[stmt].kind
                else {
                    unreachable!();
                };
                let (init, condition, iteration, body) = (*init, *condition, *iteration, *body);
                self.scopes.open();
                let result =
                    self.visit_for_children(program, init, condition, iteration, body);
                self.scopes.close();
                result
            }

            StmtKind::While { .. } => {
                self.wrap_loop_body(program, stmt);
                let StmtKind::While { condition, body } = &program.stmts[stmt].kind else {
                    unreachable!();
                };
                let (condition, body) = (*condition, *body);
                self.scopes.open();
                let result = self
                    .visit_expr(program, condition)
                    .and_then(|()| self.visit_stmt(program, body, false));
                self.scopes.close();
                result
            }

            StmtKind::DoWhile { .. } => {
                self.wrap_loop_body(program, stmt);
                let StmtKind::DoWhile { body, condition } = &program.stmts[stmt].kind else {
                    unreachable!();
                };
                let (body, condition) = (*body, *condition);
                self.scopes.open();
                let result = self
                    .visit_stmt(program, body, false)
                    .and_then(|()| self.visit_expr(program, condition));
                self.scopes.close();
                result
            }

            StmtKind::If { .. } => {
                self.wrap_loop_body(program, stmt);
                let StmtKind::If {
                    condition,
                    body,
                    else_branch,
                } = &program.stmts[stmt].kind
                else {
                    unreachable!();
                };
                let (condition, body, else_branch) = (*condition, *body, *else_branch);
                self.scopes.open();
                let result = self
                    .visit_expr(program, condition)
                    .and_then(|()| self.visit_stmt(program, body, false));
                self.scopes.close();
                result?;

                if let Some(else_stmt) = else_branch {
                    let wrapped = self.wrap_entry_point_return(program, else_stmt);
                    if wrapped != else_stmt
                        && let StmtKind::If { else_branch, .. } =
                            &mut program.stmts[stmt].kind
                    {
                        *else_branch = Some(wrapped);
                    }
                    self.scopes.open();
                    let result = self.visit_stmt(program, wrapped, false);
                    self.scopes.close();
                    result?;
                }
                Ok(())
            }

            StmtKind::Switch { .. } => {
                self.remove_dead_code(program, stmt);
                let StmtKind::Switch { selector, cases } = &program.stmts[stmt].kind else {
                    unreachable!();
                };
                let selector = *selector;
                let cases: Vec<(Option<Handle<Expr>>, Vec<Handle<Stmt>>)> = cases
                    .iter()
                    .map(|case| (case.label, case.stmts.clone()))
                    .collect();
                self.scopes.open();
                let result = (|| {
                    self.visit_expr(program, selector)?;
                    for (label, stmts) in &cases {
                        if let Some(label) = label {
                            self.visit_expr(program, *label)?;
                        }
                        self.visit_stmts(program, stmts)?;
                    }
                    Ok(())
                })();
                self.scopes.close();
                result
            }

            StmtKind::ExprStmt { expr } => {
                let expr = *expr;
                self.visit_expr(program, expr)
            }

            StmtKind::Return { expr } => {
                if let Some(expr) = *expr {
                    self.visit_expr(program, expr)?;
                }
                Ok(())
            }

            StmtKind::CtrlTransfer(_) => Ok(()),
        }
    }

    fn visit_for_children(
        &mut self,
        program: &mut Program,
        init: Option<Handle<Stmt>>,
        condition: Option<Handle<Expr>>,
        iteration: Option<Handle<Expr>>,
        body: Handle<Stmt>,
    ) -> Result<(), ConvertError> {
        if let Some(init) = init {
            self.visit_stmt(program, init, false)?;
        }
        if let Some(condition) = condition {
            self.visit_expr(program, condition)?;
        }
        if let Some(iteration) = iteration {
            self.visit_expr(program, iteration)?;
        }
        // For-init variables already live in the loop scope; the body
        // block must not open another one.
        let body_is_block = program.stmts[body].kind.is_code_block();
        self.visit_stmt(program, body, body_is_block)
    }

    /// Wraps a bare `return` body of a loop or branch into a code
    /// block when inside the entry point, so return-rewriting at emit
    /// time sees a block.
    fn wrap_loop_body(&mut self, program: &mut Program, stmt: Handle<Stmt>) {
        let body = match &program.stmts[stmt].kind {
            StmtKind::For { body, .. }
            | StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. }
            | StmtKind::If { body, .. } => *body,
            _ => return,
        };
        let wrapped = self.wrap_entry_point_return(program, body);
        if wrapped == body {
            return;
        }
        match &mut program.stmts[stmt].kind {
            StmtKind::For { body, .. }
            | StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. }
            | StmtKind::If { body, .. } => *body = wrapped,
            _ => {}
        }
    }

    fn wrap_entry_point_return(
        &mut self,
        program: &mut Program,
        stmt: Handle<Stmt>,
    ) -> Handle<Stmt> {
        if self.inside_entry_point(program) && program.stmts[stmt].kind.is_return() {
            factory::make_code_block_stmt(program, stmt)
        } else {
            stmt
        }
    }

    /// Drops statements flagged as dead code from a block or from all
    /// cases of a switch.
    fn remove_dead_code(&mut self, program: &mut Program, stmt: Handle<Stmt>) {
        let is_dead = |program: &Program, s: Handle<Stmt>| {
            program.stmts[s].flags.contains(AstFlags::DEAD_CODE)
        };
        match &program.stmts[stmt].kind {
            StmtKind::CodeBlock { stmts } => {
                let kept: Vec<_> = stmts
                    .clone()
                    .into_iter()
                    .filter(|&s| !is_dead(program, s))
                    .collect();
                if let StmtKind::CodeBlock { stmts } = &mut program.stmts[stmt].kind {
                    *stmts = kept;
                }
            }
            StmtKind::Switch { cases, .. } => {
                let filtered: Vec<Vec<Handle<Stmt>>> = cases
                    .iter()
                    .map(|case| {
                        case.stmts
                            .iter()
                            .copied()
                            .filter(|&s| !is_dead(program, s))
                            .collect()
                    })
                    .collect();
                if let StmtKind::Switch { cases, .. } = &mut program.stmts[stmt].kind {
                    for (case, kept) in cases.iter_mut().zip(filtered) {
                        case.stmts = kept;
                    }
                }
            }
            _ => {}
        }
    }

    /* ----- Initializer unrolling ----- */

    /// Expands array initializers in a code block into per-element
    /// assignment statements placed directly after the declaration.
    fn unroll_block(&mut self, program: &mut Program, block: Handle<Stmt>) {
        let StmtKind::CodeBlock { stmts } = &program.stmts[block].kind else {
            return;
        };
        let children = stmts.clone();
        let mut rebuilt = Vec::with_capacity(children.len());
        for child in children {
            rebuilt.push(child);
            let StmtKind::VarDeclStmt { decls, .. } = &program.stmts[child].kind else {
                continue;
            };
            for var in decls.clone() {
                self.unroll_var_decl(program, var, &mut rebuilt);
            }
        }
        if let StmtKind::CodeBlock { stmts } = &mut program.stmts[block].kind {
            *stmts = rebuilt;
        }
    }

    fn unroll_var_decl(
        &mut self,
        program: &mut Program,
        var: Handle<VarDecl>,
        out: &mut Vec<Handle<Stmt>>,
    ) {
        let ty = program.var_decls[var].ty.clone();
        let Some(array) = ty.aliased(program).as_array() else {
            return;
        };
        let dims = array.dimension_sizes();
        if dims.is_empty() || dims.contains(&0) {
            return;
        }
        let Some(init) = program.var_decls[var].initializer else {
            return;
        };
        if !program.exprs[init].kind.is_initializer_list() {
            return;
        }

        let mut indices = vec![0u32; dims.len()];
        loop {
            let sub = program.initializer_sub_expr(init, &indices).unwrap_or(init);
            out.push(factory::make_array_assign_stmt(program, var, &indices, sub));
            if !next_multi_index(&mut indices, &dims) {
                break;
            }
        }
        program.var_decls[var].initializer = None;
    }

    /* ----- Declarations ----- */

    fn convert_struct_decl(
        &mut self,
        program: &mut Program,
        decl: Handle<StructDecl>,
    ) -> Result<(), ConvertError> {
        if program.struct_decls[decl].is_anonymous() {
            program.struct_decls[decl].ident =
                format!("{}anonym{}", self.mangling.temporary_prefix, self.anonym_counter);
            self.anonym_counter += 1;
        }
        let mut ident = program.struct_decls[decl].ident.clone();
        if self.rename_reserved(&mut ident) {
            program.struct_decls[decl].ident = ident;
        }

        self.struct_stack.push(decl);
        self.scopes.open();
        let members = program.struct_decls[decl].members.clone();
        let result = self.visit_stmts(program, &members);
        self.scopes.close();
        self.struct_stack.pop();
        result?;

        if !self.is_vksl {
            self.remove_sampler_state_members(program, decl);
        }

        // Empty structures are illegal in the target language.
        if struct_own_member_count(program, decl) == 0 {
            let dummy_ident = format!("{}dummy", self.mangling.temporary_prefix);
            let (stmt, var) =
                factory::make_var_decl_stmt(program, TypeDenoter::base(DataType::Int), &dummy_ident);
            program.var_decls[var].struct_ref = Some(decl);
            program.struct_decls[decl].members.push(stmt);
        }
        Ok(())
    }

    fn remove_sampler_state_members(&mut self, program: &mut Program, decl: Handle<StructDecl>) {
        let members = program.struct_decls[decl].members.clone();
        let mut kept = Vec::with_capacity(members.len());
        for member in members {
            let is_sampler_state = match &program.stmts[member].kind {
                StmtKind::VarDeclStmt { specifier, .. } => specifier.ty.is_sampler_state(program),
                _ => false,
            };
            if is_sampler_state {
                program.disabled_stmts.push(member);
            } else {
                kept.push(member);
            }
        }
        program.struct_decls[decl].members = kept;
    }

    fn convert_function_decl(
        &mut self,
        program: &mut Program,
        decl: Handle<FunctionDecl>,
    ) -> Result<(), ConvertError> {
        self.func_stack.push(decl);
        self.scopes.open();

        // A non-static member function gains an explicit receiver.
        let mut pushed_self = false;
        if let Some(owner) = program.function_decls[decl].struct_ref
            && !program.function_decls[decl].is_static()
        {
            let receiver_ty = TypeDenoter::Struct(StructTypeDenoter::new(
                program.struct_decls[owner].ident.clone(),
                Some(owner),
            ));
            let receiver_ident = format!("{}self", self.mangling.namespace_prefix);
            let (stmt, var) = factory::make_var_decl_stmt(program, receiver_ty, &receiver_ident);
            program.stmts[stmt].flags.insert(AstFlags::SELF_PARAMETER);
            program.var_decls[var].flags.insert(AstFlags::SELF_PARAMETER);
            program.function_decls[decl].parameters.insert(0, stmt);
            self.self_param_stack.push(var);
            pushed_self = true;
        }

        let mut ident = program.function_decls[decl].ident.clone();
        if self.rename_reserved(&mut ident) {
            program.function_decls[decl].ident = ident;
        }

        if program.function_decls[decl].is_entry_point() {
            self.tag_entry_point_arrays(program, decl);
        }
        let result = self.visit_function_children(program, decl);

        if !self.is_vksl {
            self.remove_sampler_state_params(program, decl);
        }

        if pushed_self {
            self.self_param_stack.pop();
        }
        self.scopes.close();
        self.func_stack.pop();
        result
    }

    fn visit_function_children(
        &mut self,
        program: &mut Program,
        decl: Handle<FunctionDecl>,
    ) -> Result<(), ConvertError> {
        let parameters = program.function_decls[decl].parameters.clone();
        for param in parameters {
            self.visit_stmt(program, param, false)?;
        }
        if let Some(body) = program.function_decls[decl].body {
            // The body block shares the function scope (parameters are
            // visible without another nesting level).
            self.visit_stmt(program, body, true)?;
        }
        Ok(())
    }

    /// Entry-point parameters of array type drive `in`/`out` array
    /// blocks later; tag them and every variable of a struct element
    /// type.
    fn tag_entry_point_arrays(&mut self, program: &mut Program, decl: Handle<FunctionDecl>) {
        for param in program.function_decls[decl].parameters.clone() {
            let StmtKind::VarDeclStmt { decls, .. } = &program.stmts[param].kind else {
                continue;
            };
            let Some(&var) = decls.first() else {
                continue;
            };
            let ty = program.var_decls[var].ty.clone();
            let aliased = ty.aliased(program).clone();
            let Some(array) = aliased.as_array() else {
                continue;
            };
            program.var_decls[var].flags.insert(AstFlags::DYNAMIC_ARRAY);

            let element = array.base.aliased(program).clone();
            if let Some(struct_ref) = element.as_struct().and_then(|s| s.struct_ref) {
                for member in program.struct_var_decls(struct_ref) {
                    program.var_decls[member].flags.insert(AstFlags::DYNAMIC_ARRAY);
                }
            }
        }
    }

    fn remove_sampler_state_params(&mut self, program: &mut Program, decl: Handle<FunctionDecl>) {
        let parameters = program.function_decls[decl].parameters.clone();
        let mut kept = Vec::with_capacity(parameters.len());
        for param in parameters {
            if self.stmt_is_sampler_state(program, param) {
                program.disabled_stmts.push(param);
            } else {
                kept.push(param);
            }
        }
        program.function_decls[decl].parameters = kept;
    }

    /* ----- Expressions ----- */

    fn visit_expr(&mut self, program: &mut Program, expr: Handle<Expr>) -> Result<(), ConvertError> {
        match &program.exprs[expr].kind {
            ExprKind::Literal { .. } => {
                self.convert_literal(program, expr);
                Ok(())
            }
            ExprKind::Call { .. } => self.convert_call_expr(program, expr),
            ExprKind::Cast { .. } => {
                self.convert_cast_expr(program, expr);
                let ExprKind::Cast { expr: sub, .. } = &program.exprs[expr].kind else {
                    unreachable!();
                };
                let sub = *sub;
                self.visit_expr(program, sub)
            }
            ExprKind::Object { .. } => self.convert_object_expr(program, expr),
            ExprKind::Subscript { prefix, indices } => {
                let prefix = *prefix;
                let indices = indices.clone();
                self.visit_expr(program, prefix)?;
                for index in indices {
                    self.visit_expr(program, index)?;
                }
                Ok(())
            }
            ExprKind::InitializerList { exprs } => {
                for sub in exprs.clone() {
                    self.visit_expr(program, sub)?;
                }
                Ok(())
            }
            ExprKind::StateInitializer { values } => {
                let values: Vec<Handle<Expr>> =
                    values.iter().map(|value: &StateValue| value.value).collect();
                for value in values {
                    self.visit_expr(program, value)?;
                }
                Ok(())
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                let (lhs, rhs) = (*lhs, *rhs);
                self.visit_expr(program, lhs)?;
                self.visit_expr(program, rhs)
            }
            ExprKind::Unary { expr: sub, .. } => {
                let sub = *sub;
                self.visit_expr(program, sub)
            }
            ExprKind::Assign { lvalue, value, .. } => {
                let (lvalue, value) = (*lvalue, *value);
                self.visit_expr(program, lvalue)?;
                self.visit_expr(program, value)
            }
            ExprKind::Bracket { expr: sub } => {
                let sub = *sub;
                self.visit_expr(program, sub)
            }
        }
    }

    /// The target has no half literals: `1.5h` becomes `1.5f`.
    fn convert_literal(&mut self, program: &mut Program, expr: Handle<Expr>) {
        let node = &mut program.exprs[expr];
        let ExprKind::Literal { data_type, value } = &mut node.kind else {
            return;
        };
        if value.ends_with(['h', 'H']) {
            value.pop();
            value.push('f');
            *data_type = DataType::Float;
            node.ty = Some(TypeDenoter::base(DataType::Float));
        }
    }

    /// Cast-to-struct of a single literal becomes a constructor list
    /// with one literal cast per member. Other sub-expression shapes
    /// are left for the emitter.
    fn convert_cast_expr(&mut self, program: &mut Program, expr: Handle<Expr>) {
        let ExprKind::Cast { specifier, expr: sub } = &program.exprs[expr].kind else {
            return;
        };
        let sub = *sub;
        let aliased = specifier.ty.aliased(program).clone();
        let Some(struct_ref) = aliased.as_struct().and_then(|s| s.struct_ref) else {
            return;
        };
        if !program.exprs[sub].kind.is_literal() {
            return;
        }
        let member_types = program.struct_member_types(struct_ref);
        let list = factory::make_constructor_list_expr(program, sub, &member_types);
        if let ExprKind::Cast { expr: sub, .. } = &mut program.exprs[expr].kind {
            *sub = list;
        }
    }

    fn convert_object_expr(
        &mut self,
        program: &mut Program,
        expr: Handle<Expr>,
    ) -> Result<(), ConvertError> {
        let ExprKind::Object { prefix, symbol, .. } = &program.exprs[expr].kind else {
            return Ok(());
        };
        let (prefix, symbol) = (*prefix, *symbol);

        if let Some(prefix) = prefix {
            self.convert_entry_point_struct_prefix(program, expr, prefix);
        } else if let (Some(&self_param), Some(&active_struct)) =
            (self.self_param_stack.last(), self.struct_stack.last())
        {
            // An unqualified member reference inside a member function
            // gains the receiver as its prefix.
            if let Some(var) = symbol.and_then(SymbolRef::as_var)
                && let Some(owner) = program.var_decls[var].struct_ref
                && (owner == active_struct || program.struct_is_base_of(owner, active_struct))
            {
                let receiver = factory::make_object_expr(program, self_param);
                if let ExprKind::Object { prefix, .. } = &mut program.exprs[expr].kind {
                    *prefix = Some(receiver);
                }
            }
        }

        let ExprKind::Object { prefix, .. } = &program.exprs[expr].kind else {
            unreachable!();
        };
        if let Some(prefix) = *prefix {
            self.visit_expr(program, prefix)?;
        }
        Ok(())
    }

    /// Rewrites prefixes that reference an entry-point I/O struct:
    /// fields of non-entry-point struct parameters become immutable;
    /// global in/out fields lose their prefix entirely.
    fn convert_entry_point_struct_prefix(
        &mut self,
        program: &mut Program,
        object: Handle<Expr>,
        prefix: Handle<Expr>,
    ) {
        let inner = program.non_bracket_expr(prefix);
        match &program.exprs[inner].kind {
            ExprKind::Object { symbol, .. } => {
                let Some(var) = symbol.and_then(SymbolRef::as_var) else {
                    return;
                };
                let ty = program.var_decls[var].ty.clone();
                let aliased = ty.aliased(program).clone();
                let Some(struct_ref) = aliased.as_struct().and_then(|s| s.struct_ref) else {
                    return;
                };
                if self.mark_immutable_for_nep_struct(program, object, struct_ref) {
                    return;
                }
                let field_var = program.expr_var_decl(object);
                if field_var.is_some_and(|v| program.is_global_in_out_var(v))
                    && let ExprKind::Object { prefix, .. } = &mut program.exprs[object].kind
                {
                    *prefix = None;
                }
            }
            ExprKind::Subscript { prefix: array_prefix, .. } => {
                let array_prefix = *array_prefix;
                let Some(var) = program.expr_var_decl(array_prefix) else {
                    return;
                };
                let ty = program.var_decls[var].ty.clone();
                let aliased = ty.aliased(program).clone();
                let Some(array) = aliased.as_array() else {
                    return;
                };
                let element = array.base.aliased(program).clone();
                if let Some(struct_ref) = element.as_struct().and_then(|s| s.struct_ref) {
                    self.mark_immutable_for_nep_struct(program, object, struct_ref);
                }
            }
            _ => {}
        }
    }

    fn mark_immutable_for_nep_struct(
        &mut self,
        program: &mut Program,
        object: Handle<Expr>,
        struct_ref: Handle<StructDecl>,
    ) -> bool {
        if program.struct_decls[struct_ref]
            .flags
            .contains(AstFlags::NON_ENTRY_POINT_PARAM)
        {
            program.exprs[object].flags.insert(AstFlags::IMMUTABLE);
            true
        } else {
            false
        }
    }

    /* ----- Calls ----- */

    fn convert_call_expr(
        &mut self,
        program: &mut Program,
        expr: Handle<Expr>,
    ) -> Result<(), ConvertError> {
        let ExprKind::Call { prefix, intrinsic, .. } = &program.exprs[expr].kind else {
            return Ok(());
        };
        let (prefix, intrinsic) = (*prefix, *intrinsic);

        if let Some(prefix) = prefix {
            self.visit_expr(program, prefix)?;
        }

        if let Some(intrinsic) = intrinsic
            && intrinsic.is_texture()
            && let Some(prefix) = prefix
        {
            if self.is_vksl {
                self.bind_texture_sampler_argument(program, expr, prefix);
            } else {
                // The texture object becomes the leading argument; the
                // prefix stays in place for the argument rewrites below.
                if let ExprKind::Call { arguments, .. } = &mut program.exprs[expr].kind {
                    arguments.insert(0, prefix);
                }
            }
        }

        if !self.is_vksl {
            self.strip_sampler_state_arguments(program, expr);
        }

        if let Some(intrinsic) = intrinsic {
            self.convert_intrinsic_call(program, expr, intrinsic)?;
        } else {
            self.convert_function_call(program, expr)?;
        }

        let ExprKind::Call { arguments, .. } = &program.exprs[expr].kind else {
            unreachable!();
        };
        for argument in arguments.clone() {
            // The leading texture argument aliases the already-visited
            // prefix.
            if Some(argument) != prefix {
                self.visit_expr(program, argument)?;
            }
        }
        Ok(())
    }

    /// In VKSL a texture is sampled through an explicit
    /// texture + sampler binding; the leading sampler-state argument is
    /// replaced by that binding call.
    fn bind_texture_sampler_argument(
        &mut self,
        program: &mut Program,
        expr: Handle<Expr>,
        prefix: Handle<Expr>,
    ) {
        let ExprKind::Call { arguments, .. } = &program.exprs[expr].kind else {
            return;
        };
        let Some(&first) = arguments.first() else {
            return;
        };
        let is_sampler_state = program
            .expr_type(first)
            .is_some_and(|ty| ty.is_sampler_state(program));
        if !is_sampler_state {
            return;
        }
        let buffer_type = program
            .lvalue_symbol(prefix)
            .and_then(SymbolRef::as_buffer)
            .map(|b| program.buffer_decls[b].ty.buffer_type)
            .unwrap_or(shx_ast::BufferType::Texture2D);
        let binding =
            factory::make_texture_sampler_binding_call(program, prefix, first, buffer_type);
        if let ExprKind::Call { arguments, .. } = &mut program.exprs[expr].kind {
            arguments[0] = binding;
        }
    }

    /// The target has no sampler-state objects; such arguments vanish
    /// from every call.
    fn strip_sampler_state_arguments(&mut self, program: &mut Program, expr: Handle<Expr>) {
        let ExprKind::Call { arguments, .. } = &program.exprs[expr].kind else {
            return;
        };
        let kept: Vec<_> = arguments
            .clone()
            .into_iter()
            .filter(|&argument| {
                !program
                    .expr_type(argument)
                    .is_some_and(|ty| ty.is_sampler_state(program))
            })
            .collect();
        if let ExprKind::Call { arguments, .. } = &mut program.exprs[expr].kind {
            *arguments = kept;
        }
    }

    fn convert_intrinsic_call(
        &mut self,
        program: &mut Program,
        expr: Handle<Expr>,
        intrinsic: Intrinsic,
    ) -> Result<(), ConvertError> {
        match intrinsic {
            Intrinsic::Saturate => self.convert_saturate(program, expr),
            Intrinsic::TextureSample2
            | Intrinsic::TextureSample3
            | Intrinsic::TextureSample4
            | Intrinsic::TextureSample5 => {
                self.convert_texture_sample(program, expr, 2);
                Ok(())
            }
            Intrinsic::TextureSampleLevel3
            | Intrinsic::TextureSampleLevel4
            | Intrinsic::TextureSampleLevel5 => {
                self.convert_texture_sample(program, expr, 3);
                Ok(())
            }
            _ if intrinsic.is_interlocked() => {
                self.convert_interlocked(program, expr, intrinsic);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// `saturate(x)` becomes `clamp(x, T(0), T(1))` with `T` the
    /// argument's type.
    fn convert_saturate(
        &mut self,
        program: &mut Program,
        expr: Handle<Expr>,
    ) -> Result<(), ConvertError> {
        let ExprKind::Call { arguments, .. } = &program.exprs[expr].kind else {
            return Ok(());
        };
        if arguments.len() != 1 {
            return Err(ConvertError::InvalidIntrinsicArgCount("saturate"));
        }
        let argument = arguments[0];
        let arg_ty = program
            .expr_type(argument)
            .map(|ty| ty.aliased(program).clone());
        let Some(arg_ty) = arg_ty.filter(TypeDenoter::is_base) else {
            return Err(ConvertError::InvalidIntrinsicArgType("saturate"));
        };

        let zero = factory::make_literal_cast_expr(program, &arg_ty, DataType::Int, "0");
        let one = factory::make_literal_cast_expr(program, &arg_ty, DataType::Int, "1");
        if let ExprKind::Call {
            intrinsic,
            ident,
            arguments,
            ..
        } = &mut program.exprs[expr].kind
        {
            *intrinsic = Some(Intrinsic::Clamp);
            *ident = "clamp".into();
            arguments.push(zero);
            arguments.push(one);
        }
        Ok(())
    }

    /// Sizes the `Location` (index 1) and `Offset` (given index)
    /// arguments of a sample intrinsic to the texture's natural
    /// coordinate dimension.
    fn convert_texture_sample(
        &mut self,
        program: &mut Program,
        expr: Handle<Expr>,
        offset_index: usize,
    ) {
        let ExprKind::Call { prefix, .. } = &program.exprs[expr].kind else {
            return;
        };
        let Some(prefix) = *prefix else {
            return;
        };
        let dimension = program
            .lvalue_symbol(prefix)
            .and_then(SymbolRef::as_buffer)
            .map(|b| program.buffer_decls[b].ty.buffer_type.texture_dim())
            .unwrap_or(0);
        if dimension == 0 {
            return;
        }

        self.cast_call_argument(program, expr, 1, vector_data_type(DataType::Float, dimension));
        self.cast_call_argument(
            program,
            expr,
            offset_index,
            vector_data_type(DataType::Int, dimension),
        );
    }

    fn cast_call_argument(
        &mut self,
        program: &mut Program,
        expr: Handle<Expr>,
        index: usize,
        target: DataType,
    ) {
        let ExprKind::Call { arguments, .. } = &program.exprs[expr].kind else {
            return;
        };
        let Some(&argument) = arguments.get(index) else {
            return;
        };
        let converted = self
            .expr_converter
            .convert_if_cast_required(program, argument, target);
        if converted != argument
            && let ExprKind::Call { arguments, .. } = &mut program.exprs[expr].kind
        {
            arguments[index] = converted;
        }
    }

    /// Interlocked ops on RW-texture buffers become image atomics; a
    /// subscripted first argument contributes its trailing index as a
    /// second argument.
    fn convert_interlocked(
        &mut self,
        program: &mut Program,
        expr: Handle<Expr>,
        intrinsic: Intrinsic,
    ) {
        let ExprKind::Call { arguments, .. } = &program.exprs[expr].kind else {
            return;
        };
        if arguments.len() < 2 {
            return;
        }
        let first = arguments[0];

        match &program.exprs[first].kind {
            ExprKind::Subscript { prefix, .. } => {
                let prefix = *prefix;
                if !self.is_rw_texture(program, prefix) {
                    return;
                }
                self.retag_image_atomic(program, expr, intrinsic);

                // The trailing index moves into the argument list; a
                // single-index subscript collapses back to the object.
                let ExprKind::Subscript { indices, .. } = &mut program.exprs[first].kind else {
                    return;
                };
                let Some(index) = indices.pop() else {
                    return;
                };
                let collapsed = indices.is_empty();
                if let ExprKind::Call { arguments, .. } = &mut program.exprs[expr].kind {
                    arguments.insert(1, index);
                    if collapsed {
                        arguments[0] = prefix;
                    }
                }
            }
            _ => {
                if self.is_rw_texture(program, first) {
                    self.retag_image_atomic(program, expr, intrinsic);
                }
            }
        }
    }

    fn is_rw_texture(&self, program: &Program, expr: Handle<Expr>) -> bool {
        program
            .expr_type(expr)
            .map(|ty| ty.aliased(program).clone())
            .as_ref()
            .and_then(TypeDenoter::as_buffer)
            .is_some_and(|b| b.buffer_type.is_rw_texture_buffer())
    }

    fn retag_image_atomic(
        &mut self,
        program: &mut Program,
        expr: Handle<Expr>,
        intrinsic: Intrinsic,
    ) {
        if let ExprKind::Call { intrinsic: slot, .. } = &mut program.exprs[expr].kind {
            *slot = Some(intrinsic.to_image_atomic());
        }
    }

    /// Member-function calls become free-function calls with an
    /// explicit receiver argument.
    fn convert_function_call(
        &mut self,
        program: &mut Program,
        expr: Handle<Expr>,
    ) -> Result<(), ConvertError> {
        let ExprKind::Call { prefix, function, .. } = &program.exprs[expr].kind else {
            return Ok(());
        };
        let (prefix, function) = (*prefix, *function);
        let Some(function) = function else {
            return Ok(());
        };
        if !program.function_decls[function].is_member_function() {
            return Ok(());
        }

        if program.function_decls[function].is_static() {
            // Static member calls only lose their prefix.
            if let ExprKind::Call { prefix, .. } = &mut program.exprs[expr].kind {
                *prefix = None;
            }
            return Ok(());
        }

        let receiver = match prefix {
            Some(prefix) => prefix,
            None => {
                let Some(&self_param) = self.self_param_stack.last() else {
                    return Err(ConvertError::MissingSelfParam(
                        program.function_decls[function].ident.clone(),
                    ));
                };
                factory::make_object_expr(program, self_param)
            }
        };
        if let ExprKind::Call {
            prefix, arguments, ..
        } = &mut program.exprs[expr].kind
        {
            arguments.insert(0, receiver);
            *prefix = None;
        }
        Ok(())
    }
}

/// Advances a row-major multi-index; `false` once the outermost
/// dimension overflows.
fn next_multi_index(indices: &mut [u32], dims: &[u32]) -> bool {
    for d in (0..dims.len()).rev() {
        indices[d] += 1;
        if indices[d] < dims[d] {
            return true;
        }
        indices[d] = 0;
    }
    false
}

fn struct_own_member_count(program: &Program, decl: Handle<StructDecl>) -> usize {
    program.struct_decls[decl]
        .members
        .iter()
        .map(|&member| match &program.stmts[member].kind {
            StmtKind::VarDeclStmt { decls, .. } => decls.len(),
            _ => 0,
        })
        .sum()
}

/// Re-aligns reference identifiers and struct denoters with their
/// (possibly renamed) declarations, so emitted references follow every
/// rename.
pub(crate) fn sync_reference_idents(program: &mut Program) {
    for handle in program.exprs.handles().collect::<Vec<_>>() {
        let new_ident = match &program.exprs[handle].kind {
            ExprKind::Object {
                symbol: Some(symbol),
                ..
            } => Some(Converter::ident_of(program, *symbol).to_string()),
            ExprKind::Call {
                function: Some(function),
                ..
            } => Some(program.function_decls[*function].ident.clone()),
            _ => None,
        };
        let Some(new_ident) = new_ident else {
            continue;
        };
        match &mut program.exprs[handle].kind {
            ExprKind::Object { ident, .. } | ExprKind::Call { ident, .. } => *ident = new_ident,
            _ => {}
        }
    }

    let Program {
        exprs,
        stmts,
        var_decls,
        alias_decls,
        struct_decls,
        ..
    } = program;
    for (_, var) in var_decls.iter_mut() {
        refresh_struct_denoter(&mut var.ty, struct_decls);
    }
    for (_, alias) in alias_decls.iter_mut() {
        refresh_struct_denoter(&mut alias.ty, struct_decls);
    }
    for (_, stmt) in stmts.iter_mut() {
        if let StmtKind::VarDeclStmt { specifier, .. } = &mut stmt.kind {
            refresh_struct_denoter(&mut specifier.ty, struct_decls);
        }
    }
    for (_, expr) in exprs.iter_mut() {
        if let ExprKind::Cast { specifier, .. } = &mut expr.kind {
            refresh_struct_denoter(&mut specifier.ty, struct_decls);
        }
        if let Some(ty) = &mut expr.ty {
            refresh_struct_denoter(ty, struct_decls);
        }
    }
}

fn refresh_struct_denoter(ty: &mut TypeDenoter, struct_decls: &Arena<StructDecl>) {
    match ty {
        TypeDenoter::Struct(denoter) => {
            if let Some(decl) = denoter.struct_ref {
                denoter.ident = struct_decls[decl].ident.clone();
            }
        }
        TypeDenoter::Array(array) => refresh_struct_denoter(&mut array.base, struct_decls),
        TypeDenoter::Buffer(buffer) => {
            if let Some(generic) = &mut buffer.generic_ty {
                refresh_struct_denoter(generic, struct_decls);
            }
        }
        _ => {}
    }
}
