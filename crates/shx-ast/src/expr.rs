//! Expression nodes.
//!
//! Expressions are `{ area, flags, ty, kind }` records stored in the
//! program's expression arena; children are handles. The `ty` field is
//! the denoter the front-end attached after semantic analysis.

use crate::arena::Handle;
use crate::decl::{BufferDecl, FunctionDecl, SamplerDecl, StructDecl, TypeSpecifier, VarDecl};
use crate::denoter::TypeDenoter;
use crate::flags::{AstFlags, SourceArea};
use crate::intrinsic::Intrinsic;
use crate::op::{AssignOp, BinaryOp, UnaryOp};
use crate::types::DataType;

/// A non-owning reference to the declaration an object expression
/// resolved to.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum SymbolRef {
    Var(Handle<VarDecl>),
    Buffer(Handle<BufferDecl>),
    Sampler(Handle<SamplerDecl>),
    Struct(Handle<StructDecl>),
    Alias(Handle<crate::decl::AliasDecl>),
    Function(Handle<FunctionDecl>),
}

impl SymbolRef {
    /// The referenced variable declaration, if this symbol is one.
    pub fn as_var(self) -> Option<Handle<VarDecl>> {
        match self {
            Self::Var(h) => Some(h),
            _ => None,
        }
    }

    /// The referenced buffer declaration, if this symbol is one.
    pub fn as_buffer(self) -> Option<Handle<BufferDecl>> {
        match self {
            Self::Buffer(h) => Some(h),
            _ => None,
        }
    }
}

/// One `name = value` entry inside a state or sampler initializer.
#[derive(Clone, Debug)]
pub struct StateValue {
    pub name: String,
    pub value: Handle<Expr>,
}

/// An expression node.
#[derive(Clone, Debug)]
pub struct Expr {
    pub area: SourceArea,
    pub flags: AstFlags,
    /// Type denoter attached by the front-end semantic analyzer.
    pub ty: Option<TypeDenoter>,
    pub kind: ExprKind,
}

impl Expr {
    /// A bare expression with no source area and no attached type.
    pub fn new(kind: ExprKind) -> Self {
        Self {
            area: SourceArea::IGNORE,
            flags: AstFlags::EMPTY,
            ty: None,
            kind,
        }
    }

    /// An expression with an attached type denoter.
    pub fn typed(kind: ExprKind, ty: TypeDenoter) -> Self {
        Self {
            area: SourceArea::IGNORE,
            flags: AstFlags::EMPTY,
            ty: Some(ty),
            kind,
        }
    }
}

/// The expression tag union.
#[derive(Clone, Debug)]
pub enum ExprKind {
    /// A literal with its scanned spelling (`"1.5f"`, `"true"`, ...).
    Literal { data_type: DataType, value: String },

    /// A name reference, optionally behind a prefix (`a.b`).
    Object {
        prefix: Option<Handle<Expr>>,
        ident: String,
        symbol: Option<SymbolRef>,
    },

    /// A function, intrinsic, or type-constructor call.
    Call {
        prefix: Option<Handle<Expr>>,
        ident: String,
        intrinsic: Option<Intrinsic>,
        function: Option<Handle<FunctionDecl>>,
        arguments: Vec<Handle<Expr>>,
    },

    /// Array subscript with one handle per dimension (`a[i][j]`).
    Subscript {
        prefix: Handle<Expr>,
        indices: Vec<Handle<Expr>>,
    },

    /// C-style cast.
    Cast {
        specifier: TypeSpecifier,
        expr: Handle<Expr>,
    },

    /// Brace-enclosed initializer list (possibly nested).
    InitializerList { exprs: Vec<Handle<Expr>> },

    /// `{ name = value; ... }` state-object initializer.
    StateInitializer { values: Vec<StateValue> },

    Binary {
        op: BinaryOp,
        lhs: Handle<Expr>,
        rhs: Handle<Expr>,
    },

    Unary {
        op: UnaryOp,
        expr: Handle<Expr>,
    },

    Assign {
        lvalue: Handle<Expr>,
        op: AssignOp,
        value: Handle<Expr>,
    },

    /// Parenthesized expression.
    Bracket { expr: Handle<Expr> },
}

impl ExprKind {
    pub fn as_literal(&self) -> Option<(&DataType, &str)> {
        match self {
            Self::Literal { data_type, value } => Some((data_type, value)),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    pub fn is_initializer_list(&self) -> bool {
        matches!(self, Self::InitializerList { .. })
    }
}
