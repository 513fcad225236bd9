//! Statement nodes.

use crate::arena::Handle;
use crate::decl::{
    AliasDecl, BufferDecl, FunctionDecl, SamplerDecl, StructDecl, TypeSpecifier,
    UniformBufferDecl, VarDecl,
};
use crate::denoter::BufferTypeDenoter;
use crate::expr::Expr;
use crate::flags::{AstFlags, SourceArea};
use crate::op::CtrlTransfer;
use crate::resource::{SamplerType, StateType};

/// A statement node.
#[derive(Clone, Debug)]
pub struct Stmt {
    pub area: SourceArea,
    pub flags: AstFlags,
    pub kind: StmtKind,
}

impl Stmt {
    /// A bare statement with no source area.
    pub fn new(kind: StmtKind) -> Self {
        Self {
            area: SourceArea::IGNORE,
            flags: AstFlags::EMPTY,
            kind,
        }
    }
}

/// One `case`/`default` arm of a switch statement.
#[derive(Clone, Debug)]
pub struct SwitchCase {
    /// `None` is the `default` arm.
    pub label: Option<Handle<Expr>>,
    pub stmts: Vec<Handle<Stmt>>,
}

/// The statement tag union.
#[derive(Clone, Debug)]
pub enum StmtKind {
    /// `{ ... }` block.
    CodeBlock { stmts: Vec<Handle<Stmt>> },

    /// A type specifier applied to one or more variable declarators.
    VarDeclStmt {
        specifier: TypeSpecifier,
        decls: Vec<Handle<VarDecl>>,
    },

    /// Buffer/texture declarations sharing one buffer denoter.
    BufferDeclStmt {
        ty: BufferTypeDenoter,
        decls: Vec<Handle<BufferDecl>>,
    },

    /// Sampler declarations sharing one sampler kind.
    SamplerDeclStmt {
        sampler_type: SamplerType,
        decls: Vec<Handle<SamplerDecl>>,
    },

    StructDeclStmt { decl: Handle<StructDecl> },

    /// `typedef` statement, possibly wrapping an (anonymous) struct.
    AliasDeclStmt {
        struct_decl: Option<Handle<StructDecl>>,
        aliases: Vec<Handle<AliasDecl>>,
    },

    UniformBufferDeclStmt { decl: Handle<UniformBufferDecl> },

    FunctionDeclStmt { decl: Handle<FunctionDecl> },

    /// Non-programmable state block (`raster_state { ... }` etc.); the
    /// initializer is a state-initializer expression.
    StateDeclStmt {
        state_type: StateType,
        initializer: Option<Handle<Expr>>,
    },

    For {
        init: Option<Handle<Stmt>>,
        condition: Option<Handle<Expr>>,
        iteration: Option<Handle<Expr>>,
        body: Handle<Stmt>,
    },

    While {
        condition: Handle<Expr>,
        body: Handle<Stmt>,
    },

    DoWhile {
        body: Handle<Stmt>,
        condition: Handle<Expr>,
    },

    If {
        condition: Handle<Expr>,
        body: Handle<Stmt>,
        /// Either another `If` (else-if chain) or a block/statement.
        else_branch: Option<Handle<Stmt>>,
    },

    Switch {
        selector: Handle<Expr>,
        cases: Vec<SwitchCase>,
    },

    ExprStmt { expr: Handle<Expr> },

    Return { expr: Option<Handle<Expr>> },

    CtrlTransfer(CtrlTransfer),
}

impl StmtKind {
    pub fn is_code_block(&self) -> bool {
        matches!(self, Self::CodeBlock { .. })
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Self::Return { .. })
    }

    pub fn is_var_decl(&self) -> bool {
        matches!(self, Self::VarDeclStmt { .. })
    }

    pub fn is_sampler_decl(&self) -> bool {
        matches!(self, Self::SamplerDeclStmt { .. })
    }
}
