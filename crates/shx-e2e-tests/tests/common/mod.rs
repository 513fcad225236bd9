use shx_ast::factory;
use shx_ast::{
    AstFlags, DataType, Expr, ExprKind, FunctionDecl, Handle, Program, Stmt, StmtKind,
    TypeDenoter, TypeSpecifier, VarDecl,
};

/// Initializes test logging once; repeated calls are harmless.
#[allow(dead_code)]
pub fn init_logging() {
    env_logger::try_init().ok();
}

#[allow(dead_code)]
pub fn literal(program: &mut Program, data_type: DataType, value: &str) -> Handle<Expr> {
    factory::make_literal_expr(program, data_type, value)
}

#[allow(dead_code)]
pub fn int_literal(program: &mut Program, value: i32) -> Handle<Expr> {
    factory::make_literal_expr(program, DataType::Int, &value.to_string())
}

#[allow(dead_code)]
pub fn block(program: &mut Program, stmts: Vec<Handle<Stmt>>) -> Handle<Stmt> {
    program.add_stmt(Stmt::new(StmtKind::CodeBlock { stmts }))
}

#[allow(dead_code)]
pub fn expr_stmt(program: &mut Program, expr: Handle<Expr>) -> Handle<Stmt> {
    program.add_stmt(Stmt::new(StmtKind::ExprStmt { expr }))
}

/// Declares a single variable as a statement and returns both handles.
#[allow(dead_code)]
pub fn var_decl_stmt(
    program: &mut Program,
    ty: TypeDenoter,
    ident: &str,
) -> (Handle<Stmt>, Handle<VarDecl>) {
    factory::make_var_decl_stmt(program, ty, ident)
}

/// Appends a function declaration plus its wrapping statement; the
/// statement is added to the global list.
#[allow(dead_code)]
pub fn add_function(
    program: &mut Program,
    mut func: FunctionDecl,
    body: Option<Handle<Stmt>>,
) -> Handle<FunctionDecl> {
    func.body = body;
    let decl = program.function_decls.append(func);
    let stmt = program.add_stmt(Stmt::new(StmtKind::FunctionDeclStmt { decl }));
    program.global_stmts.push(stmt);
    decl
}

/// Appends an entry-point function and registers it on the program.
#[allow(dead_code)]
pub fn add_entry_point(
    program: &mut Program,
    ident: &str,
    body: Option<Handle<Stmt>>,
) -> Handle<FunctionDecl> {
    let mut func = FunctionDecl::new(ident, TypeSpecifier::new(TypeDenoter::Void));
    func.flags.insert(AstFlags::ENTRY_POINT);
    let decl = add_function(program, func, body);
    program.entry_point = Some(decl);
    decl
}

/// An object expression referencing a declared variable.
#[allow(dead_code)]
pub fn object(program: &mut Program, var: Handle<VarDecl>) -> Handle<Expr> {
    factory::make_object_expr(program, var)
}

/// A member access `prefix.member` resolved to `member`'s declaration.
#[allow(dead_code)]
pub fn member_access(
    program: &mut Program,
    prefix: Handle<Expr>,
    member: Handle<VarDecl>,
) -> Handle<Expr> {
    let ident = program.var_decls[member].ident.clone();
    let ty = program.var_decls[member].ty.clone();
    program.add_expr(Expr::typed(
        ExprKind::Object {
            prefix: Some(prefix),
            ident,
            symbol: Some(shx_ast::SymbolRef::Var(member)),
        },
        ty,
    ))
}
