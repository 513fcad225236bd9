//! Typed shader AST for the shx cross-compiler.
//!
//! An arena-based representation of an elaborated HLSL-family shader
//! program. The external front-end builds a [`Program`]; the
//! reflection analyzer reads it and the GLSL lowering pass rewrites it
//! in place before the text emitter runs.

pub mod arena;
mod decl;
mod denoter;
mod error;
pub mod eval;
mod expr;
pub mod factory;
mod flags;
mod intrinsic;
mod op;
mod resource;
mod semantic;
mod stmt;
mod types;
pub mod visit;

pub use arena::{Arena, Handle};
pub use decl::{
    AliasDecl, Attribute, BufferDecl, DeclDefault, FunctionDecl, Program, Register, SamplerDecl,
    SamplerValue, SemanticVars, StructDecl, TypeSpecifier, UniformBufferDecl, VarDecl,
};
pub use denoter::{
    AliasTypeDenoter, ArrayTypeDenoter, BaseTypeDenoter, BufferTypeDenoter, CompareFlags,
    SamplerTypeDenoter, StructTypeDenoter, TypeDenoter,
};
pub use error::{MapError, TypeError};
pub use expr::{Expr, ExprKind, StateValue, SymbolRef};
pub use flags::{AstFlags, SourceArea};
pub use intrinsic::Intrinsic;
pub use op::{AssignOp, BinaryOp, CtrlTransfer, UnaryOp};
pub use resource::{
    AttributeType, BufferType, ExtModifiers, ImageLayoutFormat, InterpModifier, OutputVersion,
    RegisterType, SamplerType, ShaderTarget, StateType, StorageClass, TypeModifier,
};
pub use semantic::{IndexedSemantic, Semantic};
pub use stmt::{Stmt, StmtKind, SwitchCase};
pub use types::{
    DataType, matrix_data_type, subscript_data_type, vector_data_type,
};
pub use visit::Visitor;
