//! GLSL/VKSL lowering pass.
//!
//! Rewrites an elaborated shader AST in place until it is legal in the
//! output dialect: identifier renaming against the reserved-word set,
//! intrinsic rewrites, member-function flattening with an explicit
//! receiver, sampler-state stripping, anonymous-struct labeling,
//! array-initializer unrolling, and dead-code removal. The downstream
//! emitter observes the post-conversion tree.

mod convert;
mod exprconv;
mod funcname;
mod keywords;
mod scope;

pub use exprconv::{ExprConvFlags, ExprConverter};
pub use keywords::is_reserved_word;
pub use scope::ScopeStack;

use shx_ast::{OutputVersion, Program, ShaderTarget};

/// Identifier-mangling configuration.
#[derive(Clone, Debug)]
pub struct NameMangling {
    /// Prefix of renamed entry-point inputs.
    pub input_prefix: String,
    /// Prefix of renamed entry-point outputs.
    pub output_prefix: String,
    /// Prefix applied to identifiers that collide with reserved words.
    pub reserved_word_prefix: String,
    /// Prefix of temporaries and scope-collision renames.
    pub temporary_prefix: String,
    /// Prefix of namespace-qualified names (member functions, the
    /// receiver parameter).
    pub namespace_prefix: String,
    /// Rename entry-point inputs (vertex) / outputs (fragment) to the
    /// bare semantic string as well.
    pub use_always_semantics: bool,
}

impl Default for NameMangling {
    fn default() -> Self {
        Self {
            input_prefix: "in_".into(),
            output_prefix: "out_".into(),
            reserved_word_prefix: "rsv_".into(),
            temporary_prefix: "tmp_".into(),
            namespace_prefix: "nsp_".into(),
            use_always_semantics: false,
        }
    }
}

/// Conversion options.
#[derive(Clone, Copy, Debug)]
pub struct ConvertOptions {
    /// Replace every identifier with an anonymous `_N` name.
    pub obfuscate: bool,
    /// Unroll array initializers into per-element assignments.
    pub unroll_array_initializers: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            obfuscate: false,
            unroll_array_initializers: true,
        }
    }
}

/// Errors that abort a conversion. The AST may be partially rewritten
/// afterwards and must not be emitted.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// An intrinsic argument has a type the rewrite cannot handle.
    #[error("invalid argument type for intrinsic '{0}'")]
    InvalidIntrinsicArgType(&'static str),

    /// An intrinsic call has the wrong number of arguments.
    #[error("invalid number of arguments for intrinsic '{0}'")]
    InvalidIntrinsicArgCount(&'static str),

    /// A member-function call has neither a receiver nor an active
    /// `self` parameter.
    #[error("missing 'self' parameter for member function '{0}'")]
    MissingSelfParam(String),
}

/// Lowers `program` for the given target and output version.
///
/// Runs the expression prepass, the main conversion, and the
/// function-name pass, in that order.
pub fn convert(
    program: &mut Program,
    target: ShaderTarget,
    mangling: NameMangling,
    options: ConvertOptions,
    version: OutputVersion,
) -> Result<(), ConvertError> {
    let mut flags = ExprConvFlags::ALL;
    if version.has_420_pack() {
        // The 420pack feature set accepts vector subscripts and brace
        // initializers natively.
        flags.remove(ExprConvFlags::VECTOR_SUBSCRIPTS | ExprConvFlags::INITIALIZER);
    }
    ExprConverter::new(flags).convert(program);

    let mut converter = convert::Converter::new(target, mangling.clone(), options, version);
    converter.convert_program(program)?;

    funcname::convert_function_names(program, &mangling);
    convert::sync_reference_idents(program);
    Ok(())
}
