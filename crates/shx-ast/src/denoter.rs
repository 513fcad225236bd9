//! The polymorphic type-denoter family.
//!
//! A denoter is the runtime type descriptor the front-end attaches to
//! declarations and expressions. It is a tagged union with downcast
//! probes; alias denoters are chased through [`TypeDenoter::aliased`].

use crate::Program;
use crate::arena::Handle;
use crate::decl::{AliasDecl, StructDecl};
use crate::resource::{BufferType, ExtModifiers, SamplerType};
use crate::types::DataType;

/// Comparison flags for [`TypeDenoter::equals`].
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub struct CompareFlags(u32);

impl CompareFlags {
    pub const EMPTY: Self = Self(0);
    /// Ignore the generic sub-type of buffer denoters. GLSL cannot
    /// distinguish `Texture2D<float>` from `Texture2D<float4>` in a
    /// function signature.
    pub const IGNORE_GENERIC_SUB_TYPE: Self = Self(1);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for CompareFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Scalar/vector/matrix denoter with the extended modifiers the
/// reflection analyzer propagates onto uniforms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BaseTypeDenoter {
    pub data_type: DataType,
    pub ext_modifiers: ExtModifiers,
    /// Texture identifier this parameter animates sprite UVs for.
    pub sprite_uv_ref: String,
}

impl BaseTypeDenoter {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            ext_modifiers: ExtModifiers::EMPTY,
            sprite_uv_ref: String::new(),
        }
    }
}

/// Buffer/texture denoter with an optional generic element type.
#[derive(Clone, Debug, PartialEq)]
pub struct BufferTypeDenoter {
    pub buffer_type: BufferType,
    /// Element type of `Buffer<T>` / `StructuredBuffer<T>` / typed
    /// textures; `None` for untyped buffers.
    pub generic_ty: Option<Box<TypeDenoter>>,
    pub ext_modifiers: ExtModifiers,
}

impl BufferTypeDenoter {
    pub fn new(buffer_type: BufferType) -> Self {
        Self {
            buffer_type,
            generic_ty: None,
            ext_modifiers: ExtModifiers::EMPTY,
        }
    }

    pub fn with_generic(buffer_type: BufferType, generic: TypeDenoter) -> Self {
        Self {
            buffer_type,
            generic_ty: Some(Box::new(generic)),
            ext_modifiers: ExtModifiers::EMPTY,
        }
    }
}

/// Sampler denoter (traditional samplers and sampler-state objects).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerTypeDenoter {
    pub sampler_type: SamplerType,
}

/// Struct denoter with its declaration back-reference.
#[derive(Clone, Debug, PartialEq)]
pub struct StructTypeDenoter {
    pub ident: String,
    pub struct_ref: Option<Handle<StructDecl>>,
}

impl StructTypeDenoter {
    pub fn new(ident: impl Into<String>, struct_ref: Option<Handle<StructDecl>>) -> Self {
        Self {
            ident: ident.into(),
            struct_ref,
        }
    }
}

/// Alias (typedef) denoter with its declaration back-reference.
#[derive(Clone, Debug, PartialEq)]
pub struct AliasTypeDenoter {
    pub ident: String,
    pub alias_ref: Option<Handle<AliasDecl>>,
}

/// Array denoter; `None` dimensions are unsized.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayTypeDenoter {
    pub base: Box<TypeDenoter>,
    pub dims: Vec<Option<u32>>,
}

impl ArrayTypeDenoter {
    pub fn new(base: TypeDenoter, dims: Vec<Option<u32>>) -> Self {
        Self {
            base: Box::new(base),
            dims,
        }
    }

    /// Sized dimension extents; unsized dimensions report 0.
    pub fn dimension_sizes(&self) -> Vec<u32> {
        self.dims.iter().map(|d| d.unwrap_or(0)).collect()
    }
}

/// The denoter family.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeDenoter {
    Void,
    Base(BaseTypeDenoter),
    Buffer(BufferTypeDenoter),
    Sampler(SamplerTypeDenoter),
    Struct(StructTypeDenoter),
    Alias(AliasTypeDenoter),
    Array(ArrayTypeDenoter),
}

impl Default for TypeDenoter {
    fn default() -> Self {
        Self::Void
    }
}

impl TypeDenoter {
    /// Shorthand for a base denoter without modifiers.
    pub fn base(data_type: DataType) -> Self {
        Self::Base(BaseTypeDenoter::new(data_type))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    pub fn is_base(&self) -> bool {
        matches!(self, Self::Base(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Base(b) if b.data_type.is_scalar())
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Base(b) if b.data_type.is_vector())
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, Self::Base(b) if b.data_type.is_matrix())
    }

    pub fn is_buffer(&self) -> bool {
        matches!(self, Self::Buffer(_))
    }

    pub fn is_sampler(&self) -> bool {
        matches!(self, Self::Sampler(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, Self::Alias(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn as_base(&self) -> Option<&BaseTypeDenoter> {
        match self {
            Self::Base(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_buffer(&self) -> Option<&BufferTypeDenoter> {
        match self {
            Self::Buffer(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_sampler(&self) -> Option<&SamplerTypeDenoter> {
        match self {
            Self::Sampler(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructTypeDenoter> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayTypeDenoter> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Chases alias denoters to the representative denoter.
    ///
    /// Unresolved aliases (no declaration back-reference) stop the
    /// chase and are returned as-is.
    pub fn aliased<'a>(&'a self, program: &'a Program) -> &'a TypeDenoter {
        let mut current = self;
        let mut steps = 0;
        while let Self::Alias(alias) = current {
            let Some(decl) = alias.alias_ref.and_then(|h| program.alias_decls.try_get(h)) else {
                break;
            };
            current = &decl.ty;
            // An alias cycle would be front-end breakage; refuse to spin.
            steps += 1;
            if steps > program.alias_decls.len() {
                break;
            }
        }
        current
    }

    /// The element type of an array or the generic sub-type of a buffer.
    pub fn generic_sub_type(&self) -> Option<&TypeDenoter> {
        match self {
            Self::Array(a) => Some(&a.base),
            Self::Buffer(b) => b.generic_ty.as_deref(),
            _ => None,
        }
    }

    /// `true` if the aliased denoter is a sampler-state object.
    pub fn is_sampler_state(&self, program: &Program) -> bool {
        matches!(
            self.aliased(program),
            Self::Sampler(s) if s.sampler_type.is_sampler_state()
        )
    }

    /// Structural equality through aliases.
    ///
    /// With [`CompareFlags::IGNORE_GENERIC_SUB_TYPE`], buffer denoters
    /// compare by buffer kind alone.
    pub fn equals(&self, other: &TypeDenoter, flags: CompareFlags, program: &Program) -> bool {
        let lhs = self.aliased(program);
        let rhs = other.aliased(program);
        match (lhs, rhs) {
            (Self::Void, Self::Void) => true,
            (Self::Base(a), Self::Base(b)) => a.data_type == b.data_type,
            (Self::Sampler(a), Self::Sampler(b)) => a.sampler_type == b.sampler_type,
            (Self::Struct(a), Self::Struct(b)) => match (a.struct_ref, b.struct_ref) {
                (Some(ha), Some(hb)) => ha == hb,
                _ => a.ident == b.ident,
            },
            (Self::Buffer(a), Self::Buffer(b)) => {
                if a.buffer_type != b.buffer_type {
                    return false;
                }
                if flags.contains(CompareFlags::IGNORE_GENERIC_SUB_TYPE) {
                    return true;
                }
                match (&a.generic_ty, &b.generic_ty) {
                    (Some(ga), Some(gb)) => ga.equals(gb, flags, program),
                    (None, None) => true,
                    _ => false,
                }
            }
            (Self::Array(a), Self::Array(b)) => {
                a.dims == b.dims && a.base.equals(&b.base, flags, program)
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for TypeDenoter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Base(b) => write!(f, "{}", b.data_type),
            Self::Buffer(b) => write!(f, "{:?}", b.buffer_type),
            Self::Sampler(s) => write!(f, "{:?}", s.sampler_type),
            Self::Struct(s) => write!(f, "struct {}", s.ident),
            Self::Alias(a) => f.write_str(&a.ident),
            Self::Array(a) => {
                write!(f, "{}", a.base)?;
                for dim in &a.dims {
                    match dim {
                        Some(n) => write!(f, "[{n}]")?,
                        None => f.write_str("[]")?,
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Program;
    use crate::decl::AliasDecl;

    #[test]
    fn downcast_probes() {
        let den = TypeDenoter::base(DataType::Float3);
        assert!(den.is_base());
        assert!(den.is_vector());
        assert!(!den.is_struct());
        assert_eq!(den.as_base().unwrap().data_type, DataType::Float3);
        assert!(den.as_buffer().is_none());
    }

    #[test]
    fn alias_chasing() {
        let mut program = Program::default();
        let inner = program.alias_decls.append(AliasDecl {
            ident: "Scalar".into(),
            ty: TypeDenoter::base(DataType::Float),
            area: Default::default(),
            flags: Default::default(),
        });
        let outer = program.alias_decls.append(AliasDecl {
            ident: "Value".into(),
            ty: TypeDenoter::Alias(AliasTypeDenoter {
                ident: "Scalar".into(),
                alias_ref: Some(inner),
            }),
            area: Default::default(),
            flags: Default::default(),
        });
        let den = TypeDenoter::Alias(AliasTypeDenoter {
            ident: "Value".into(),
            alias_ref: Some(outer),
        });
        assert_eq!(
            den.aliased(&program).as_base().unwrap().data_type,
            DataType::Float
        );
    }

    #[test]
    fn unresolved_alias_stops() {
        let program = Program::default();
        let den = TypeDenoter::Alias(AliasTypeDenoter {
            ident: "Mystery".into(),
            alias_ref: None,
        });
        assert!(den.aliased(&program).is_alias());
    }

    #[test]
    fn buffer_equality_modulo_generic() {
        let program = Program::default();
        let a = TypeDenoter::Buffer(BufferTypeDenoter::with_generic(
            BufferType::Texture2D,
            TypeDenoter::base(DataType::Float),
        ));
        let b = TypeDenoter::Buffer(BufferTypeDenoter::with_generic(
            BufferType::Texture2D,
            TypeDenoter::base(DataType::Float4),
        ));
        assert!(!a.equals(&b, CompareFlags::EMPTY, &program));
        assert!(a.equals(&b, CompareFlags::IGNORE_GENERIC_SUB_TYPE, &program));

        let c = TypeDenoter::Buffer(BufferTypeDenoter::new(BufferType::Texture3D));
        assert!(!a.equals(&c, CompareFlags::IGNORE_GENERIC_SUB_TYPE, &program));
    }

    #[test]
    fn array_equality() {
        let program = Program::default();
        let a = TypeDenoter::Array(ArrayTypeDenoter::new(
            TypeDenoter::base(DataType::Int),
            vec![Some(4)],
        ));
        let b = TypeDenoter::Array(ArrayTypeDenoter::new(
            TypeDenoter::base(DataType::Int),
            vec![Some(4)],
        ));
        let c = TypeDenoter::Array(ArrayTypeDenoter::new(
            TypeDenoter::base(DataType::Int),
            vec![None],
        ));
        assert!(a.equals(&b, CompareFlags::EMPTY, &program));
        assert!(!a.equals(&c, CompareFlags::EMPTY, &program));
    }

    #[test]
    fn dimension_sizes() {
        let arr = ArrayTypeDenoter::new(TypeDenoter::base(DataType::Float), vec![Some(2), None, Some(3)]);
        assert_eq!(arr.dimension_sizes(), vec![2, 0, 3]);
    }
}
