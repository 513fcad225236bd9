//! Declarations and the [`Program`] root.
//!
//! The program owns one arena per node family; declarations reference
//! each other (and are referenced from expressions) through handles.

use crate::arena::{Arena, Handle};
use crate::denoter::{BufferTypeDenoter, TypeDenoter};
use crate::expr::{Expr, ExprKind, SymbolRef};
use crate::flags::{AstFlags, SourceArea};
use crate::resource::{
    AttributeType, ExtModifiers, InterpModifier, RegisterType, ShaderTarget, StorageClass,
    TypeModifier,
};
use crate::semantic::IndexedSemantic;
use crate::stmt::{Stmt, StmtKind};

/// An explicit binding-slot register (`register(b0)`), optionally
/// restricted to one shader target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Register {
    pub ty: RegisterType,
    pub slot: i32,
    /// `None` applies to every target.
    pub shader_target: Option<ShaderTarget>,
}

impl Register {
    pub fn new(ty: RegisterType, slot: i32) -> Self {
        Self {
            ty,
            slot,
            shader_target: None,
        }
    }

    /// Selects the register that applies to `target`: an exact match
    /// wins, otherwise an unrestricted register.
    pub fn for_target(registers: &[Register], target: ShaderTarget) -> Option<&Register> {
        registers
            .iter()
            .find(|r| r.shader_target == Some(target))
            .or_else(|| registers.iter().find(|r| r.shader_target.is_none()))
    }
}

/// Default-value payload attached to a declarator by the front-end.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeclDefault {
    /// Numeric payload; scalars occupy element 0.
    Matrix([f32; 16]),
    /// Resource handle payload.
    Handle(i32),
}

/// The declared type plus its modifiers, shared by all declarators of
/// one statement.
#[derive(Clone, Debug, Default)]
pub struct TypeSpecifier {
    pub area: SourceArea,
    pub storage_classes: Vec<StorageClass>,
    pub interp_modifiers: Vec<InterpModifier>,
    pub type_modifiers: Vec<TypeModifier>,
    /// `in` keyword present.
    pub input: bool,
    /// `out` or `inout` keyword present.
    pub output: bool,
    pub ty: TypeDenoter,
}

impl TypeSpecifier {
    pub fn new(ty: TypeDenoter) -> Self {
        Self {
            ty,
            ..Default::default()
        }
    }

    /// A parameter is an input unless it is exclusively `out`.
    pub fn is_input(&self) -> bool {
        self.input || !self.output
    }

    pub fn is_output(&self) -> bool {
        self.output
    }
}

/// A variable declarator.
#[derive(Clone, Debug)]
pub struct VarDecl {
    pub area: SourceArea,
    pub flags: AstFlags,
    pub ident: String,
    /// Full declared type, including array dimensions.
    pub ty: TypeDenoter,
    pub semantic: IndexedSemantic,
    pub initializer: Option<Handle<Expr>>,
    pub default: Option<DeclDefault>,
    /// Owning struct for member variables.
    pub struct_ref: Option<Handle<StructDecl>>,
}

impl VarDecl {
    pub fn new(ident: impl Into<String>, ty: TypeDenoter) -> Self {
        Self {
            area: SourceArea::IGNORE,
            flags: AstFlags::EMPTY,
            ident: ident.into(),
            ty,
            semantic: IndexedSemantic::default(),
            initializer: None,
            default: None,
            struct_ref: None,
        }
    }
}

/// A buffer or texture object declarator.
#[derive(Clone, Debug)]
pub struct BufferDecl {
    pub area: SourceArea,
    pub flags: AstFlags,
    pub ident: String,
    pub ty: BufferTypeDenoter,
    pub registers: Vec<Register>,
    pub default: Option<DeclDefault>,
}

impl BufferDecl {
    pub fn new(ident: impl Into<String>, ty: BufferTypeDenoter) -> Self {
        Self {
            area: SourceArea::IGNORE,
            flags: AstFlags::EMPTY,
            ident: ident.into(),
            ty,
            registers: Vec::new(),
            default: None,
        }
    }
}

/// One `name = value` sampler-state entry.
pub use crate::expr::StateValue as SamplerValue;

/// A sampler object declarator.
#[derive(Clone, Debug)]
pub struct SamplerDecl {
    pub area: SourceArea,
    pub flags: AstFlags,
    pub ident: String,
    pub sampler_type: crate::resource::SamplerType,
    pub registers: Vec<Register>,
    /// Alternative texture identifier this sampler samples.
    pub alias: String,
    pub values: Vec<SamplerValue>,
}

impl SamplerDecl {
    pub fn new(ident: impl Into<String>, sampler_type: crate::resource::SamplerType) -> Self {
        Self {
            area: SourceArea::IGNORE,
            flags: AstFlags::EMPTY,
            ident: ident.into(),
            sampler_type,
            registers: Vec::new(),
            alias: String::new(),
            values: Vec::new(),
        }
    }
}

/// A structure declaration. Members are variable-declaration
/// statements.
#[derive(Clone, Debug)]
pub struct StructDecl {
    pub area: SourceArea,
    pub flags: AstFlags,
    /// Empty for anonymous structs until the converter labels them.
    pub ident: String,
    pub base_struct: Option<Handle<StructDecl>>,
    pub members: Vec<Handle<Stmt>>,
}

impl StructDecl {
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            area: SourceArea::IGNORE,
            flags: AstFlags::EMPTY,
            ident: ident.into(),
            base_struct: None,
            members: Vec::new(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.ident.is_empty()
    }
}

/// A type alias declarator.
#[derive(Clone, Debug)]
pub struct AliasDecl {
    pub area: SourceArea,
    pub flags: AstFlags,
    pub ident: String,
    pub ty: TypeDenoter,
}

/// An attribute such as `[numthreads(8, 8, 1)]`.
#[derive(Clone, Debug)]
pub struct Attribute {
    pub kind: AttributeType,
    pub arguments: Vec<Handle<Expr>>,
}

/// The entry point's input or output semantic variables, partitioned
/// into user-defined and system-value sets.
#[derive(Clone, Debug, Default)]
pub struct SemanticVars {
    pub var_refs: Vec<Handle<VarDecl>>,
    pub var_refs_sv: Vec<Handle<VarDecl>>,
}

impl SemanticVars {
    pub fn contains(&self, var: Handle<VarDecl>) -> bool {
        self.var_refs.contains(&var) || self.var_refs_sv.contains(&var)
    }
}

/// A function declaration.
#[derive(Clone, Debug)]
pub struct FunctionDecl {
    pub area: SourceArea,
    pub flags: AstFlags,
    pub ident: String,
    pub return_type: TypeSpecifier,
    /// Return-value semantic of the entry point.
    pub semantic: IndexedSemantic,
    /// Parameters are variable-declaration statements.
    pub parameters: Vec<Handle<Stmt>>,
    /// `None` for forward declarations; otherwise a code-block statement.
    pub body: Option<Handle<Stmt>>,
    /// Owning struct for member functions.
    pub struct_ref: Option<Handle<StructDecl>>,
    pub attributes: Vec<Attribute>,
    pub input_semantics: SemanticVars,
    pub output_semantics: SemanticVars,
}

impl FunctionDecl {
    pub fn new(ident: impl Into<String>, return_type: TypeSpecifier) -> Self {
        Self {
            area: SourceArea::IGNORE,
            flags: AstFlags::EMPTY,
            ident: ident.into(),
            return_type,
            semantic: IndexedSemantic::default(),
            parameters: Vec::new(),
            body: None,
            struct_ref: None,
            attributes: Vec::new(),
            input_semantics: SemanticVars::default(),
            output_semantics: SemanticVars::default(),
        }
    }

    pub fn is_entry_point(&self) -> bool {
        self.flags.contains(AstFlags::ENTRY_POINT)
    }

    pub fn is_member_function(&self) -> bool {
        self.struct_ref.is_some()
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(AstFlags::STATIC_MEMBER)
    }
}

/// A constant-buffer declaration. Members are variable-declaration
/// statements.
#[derive(Clone, Debug)]
pub struct UniformBufferDecl {
    pub area: SourceArea,
    pub flags: AstFlags,
    pub ident: String,
    pub registers: Vec<Register>,
    pub ext_modifiers: ExtModifiers,
    pub members: Vec<Handle<Stmt>>,
}

impl UniformBufferDecl {
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            area: SourceArea::IGNORE,
            flags: AstFlags::EMPTY,
            ident: ident.into(),
            registers: Vec::new(),
            ext_modifiers: ExtModifiers::EMPTY,
            members: Vec::new(),
        }
    }
}

/// The root of an elaborated shader program.
///
/// Produced by the external front-end, read by the reflection analyzer,
/// mutated in place by the lowering converter, and finally consumed by
/// the external emitter.
#[derive(Clone, Debug, Default)]
pub struct Program {
    pub exprs: Arena<Expr>,
    pub stmts: Arena<Stmt>,
    pub var_decls: Arena<VarDecl>,
    pub buffer_decls: Arena<BufferDecl>,
    pub sampler_decls: Arena<SamplerDecl>,
    pub struct_decls: Arena<StructDecl>,
    pub alias_decls: Arena<AliasDecl>,
    pub function_decls: Arena<FunctionDecl>,
    pub uniform_buffer_decls: Arena<UniformBufferDecl>,

    /// Active top-level statements, in source order.
    pub global_stmts: Vec<Handle<Stmt>>,
    /// Statements kept for reflection but suppressed from emission
    /// (preprocessor-disabled code, stripped sampler states).
    pub disabled_stmts: Vec<Handle<Stmt>>,
    /// The entry point for the current compile target.
    pub entry_point: Option<Handle<FunctionDecl>>,
}

impl Program {
    /// Appends an expression node.
    pub fn add_expr(&mut self, expr: Expr) -> Handle<Expr> {
        self.exprs.append(expr)
    }

    /// Appends a statement node.
    pub fn add_stmt(&mut self, stmt: Stmt) -> Handle<Stmt> {
        self.stmts.append(stmt)
    }

    /// The entry-point declaration, if one is set.
    pub fn entry_point_ref(&self) -> Option<&FunctionDecl> {
        self.entry_point.map(|h| &self.function_decls[h])
    }

    /// `true` if `var` is one of the entry point's global in/out
    /// variables.
    pub fn is_global_in_out_var(&self, var: Handle<VarDecl>) -> bool {
        self.entry_point_ref().is_some_and(|ep| {
            ep.input_semantics.contains(var) || ep.output_semantics.contains(var)
        })
    }

    /// The declared type denoter of a symbol.
    pub fn symbol_type(&self, symbol: SymbolRef) -> Option<TypeDenoter> {
        match symbol {
            SymbolRef::Var(h) => Some(self.var_decls[h].ty.clone()),
            SymbolRef::Buffer(h) => Some(TypeDenoter::Buffer(self.buffer_decls[h].ty.clone())),
            SymbolRef::Sampler(h) => Some(TypeDenoter::Sampler(crate::denoter::SamplerTypeDenoter {
                sampler_type: self.sampler_decls[h].sampler_type,
            })),
            SymbolRef::Struct(h) => Some(TypeDenoter::Struct(crate::denoter::StructTypeDenoter {
                ident: self.struct_decls[h].ident.clone(),
                struct_ref: Some(h),
            })),
            SymbolRef::Alias(h) => Some(self.alias_decls[h].ty.clone()),
            SymbolRef::Function(_) => None,
        }
    }

    /// Resolves an expression's type denoter: the attached denoter
    /// first, the referenced symbol's declared type as a fallback.
    pub fn expr_type(&self, expr: Handle<Expr>) -> Option<TypeDenoter> {
        let node = &self.exprs[expr];
        if let Some(ty) = &node.ty {
            return Some(ty.clone());
        }
        match &node.kind {
            ExprKind::Literal { data_type, .. } => Some(TypeDenoter::base(*data_type)),
            ExprKind::Object { symbol, .. } => symbol.and_then(|s| self.symbol_type(s)),
            ExprKind::Bracket { expr } => self.expr_type(*expr),
            ExprKind::Cast { specifier, .. } => Some(specifier.ty.clone()),
            ExprKind::Assign { lvalue, .. } => self.expr_type(*lvalue),
            _ => None,
        }
    }

    /// Skips bracket expressions.
    pub fn non_bracket_expr(&self, mut expr: Handle<Expr>) -> Handle<Expr> {
        while let ExprKind::Bracket { expr: inner } = &self.exprs[expr].kind {
            expr = *inner;
        }
        expr
    }

    /// The symbol an l-value expression ultimately names, looking
    /// through brackets and array subscripts.
    pub fn lvalue_symbol(&self, expr: Handle<Expr>) -> Option<SymbolRef> {
        match &self.exprs[self.non_bracket_expr(expr)].kind {
            ExprKind::Object { symbol, .. } => *symbol,
            ExprKind::Subscript { prefix, .. } => self.lvalue_symbol(*prefix),
            _ => None,
        }
    }

    /// The variable declaration an object expression resolved to.
    pub fn expr_var_decl(&self, expr: Handle<Expr>) -> Option<Handle<VarDecl>> {
        match &self.exprs[self.non_bracket_expr(expr)].kind {
            ExprKind::Object { symbol, .. } => symbol.and_then(SymbolRef::as_var),
            _ => None,
        }
    }

    /// All variable declarators of a struct, base structs first.
    pub fn struct_var_decls(&self, decl: Handle<StructDecl>) -> Vec<Handle<VarDecl>> {
        let mut vars = Vec::new();
        if let Some(base) = self.struct_decls[decl].base_struct {
            vars.extend(self.struct_var_decls(base));
        }
        for &member in &self.struct_decls[decl].members {
            if let StmtKind::VarDeclStmt { decls, .. } = &self.stmts[member].kind {
                vars.extend(decls.iter().copied());
            }
        }
        vars
    }

    /// Number of member variables declared directly or via base structs.
    pub fn struct_member_count(&self, decl: Handle<StructDecl>) -> usize {
        self.struct_var_decls(decl).len()
    }

    /// The member type denoters of a struct, in declaration order.
    pub fn struct_member_types(&self, decl: Handle<StructDecl>) -> Vec<TypeDenoter> {
        self.struct_var_decls(decl)
            .into_iter()
            .map(|v| self.var_decls[v].ty.clone())
            .collect()
    }

    /// `true` if `base` appears in `derived`'s base-struct chain.
    pub fn struct_is_base_of(&self, base: Handle<StructDecl>, derived: Handle<StructDecl>) -> bool {
        let mut current = self.struct_decls[derived].base_struct;
        while let Some(h) = current {
            if h == base {
                return true;
            }
            current = self.struct_decls[h].base_struct;
        }
        false
    }

    /// Navigates a (possibly nested) initializer list by a multi-index,
    /// returning the leaf sub-expression.
    pub fn initializer_sub_expr(
        &self,
        initializer: Handle<Expr>,
        indices: &[u32],
    ) -> Option<Handle<Expr>> {
        let mut current = initializer;
        for &index in indices {
            match &self.exprs[current].kind {
                ExprKind::InitializerList { exprs } => {
                    current = *exprs.get(index as usize)?;
                }
                // Fewer nesting levels than indices: the flat element
                // covers the remaining dimensions.
                _ => break,
            }
        }
        Some(current)
    }
}
