//! Externally exposed reflection enumerations.
//!
//! Numeric values are stable: serialized reflection output depends on
//! them, so variants carry explicit discriminants and new members may
//! only be appended.

/// Failure to map a textual form back to a reflection enum.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {kind} name '{name}'")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

impl UnknownName {
    fn new(kind: &'static str, name: &str) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

macro_rules! named_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
        #[repr(i32)]
        pub enum $name {
            $($variant = $value),+
        }

        impl $name {
            /// All variants, in numeric order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The canonical textual form.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            /// Parses the canonical textual form.
            pub fn from_name(s: &str) -> Result<Self, UnknownName> {
                match s {
                    $(stringify!($variant) => Ok($name::$variant),)+
                    _ => Err(UnknownName::new(stringify!($name), s)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

named_enum! {
    /// Sampler filter.
    Filter {
        None = 1,
        Point = 2,
        Linear = 3,
        Anisotropic = 4,
    }
}

named_enum! {
    /// Texture address mode.
    TextureAddressMode {
        Wrap = 1,
        Mirror = 2,
        Clamp = 3,
        Border = 4,
        MirrorOnce = 5,
    }
}

named_enum! {
    /// Sample comparison function.
    ComparisonFunc {
        Never = 1,
        Less = 2,
        Equal = 3,
        LessEqual = 4,
        Greater = 5,
        NotEqual = 6,
        GreaterEqual = 7,
        Always = 8,
    }
}

named_enum! {
    /// Rasterizer fill mode.
    FillMode {
        Wire = 1,
        Solid = 2,
    }
}

named_enum! {
    /// Rasterizer cull mode.
    CullMode {
        Clockwise = 1,
        CounterClockwise = 2,
        None = 3,
    }
}

named_enum! {
    /// Action taken on a stencil operation.
    StencilOpType {
        Keep = 1,
        Zero = 2,
        Replace = 3,
        Increment = 4,
        Decrement = 5,
        IncrementWrap = 6,
        DecrementWrap = 7,
        Inverse = 8,
    }
}

named_enum! {
    /// Factor applied to a blend operand.
    BlendFactor {
        One = 1,
        Zero = 2,
        DestinationRGB = 3,
        SourceRGB = 4,
        DestinationInvRGB = 5,
        SourceInvRGB = 6,
        DestinationA = 7,
        SourceA = 8,
        DestinationInvA = 9,
        SourceInvA = 10,
    }
}

named_enum! {
    /// Operation combining the two blend operands.
    BlendOpType {
        Add = 1,
        Subtract = 2,
        ReverseSubtract = 3,
        Minimum = 4,
        Maximum = 5,
    }
}

named_enum! {
    /// Render order of elements using the shader.
    SortMode {
        None = 1,
        BackToFront = 2,
        FrontToBack = 3,
    }
}

/// Kind of a reflected uniform.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[repr(i32)]
pub enum UniformType {
    Buffer = 0,
    UniformBuffer = 1,
    Sampler = 2,
    Variable = 3,
    Struct = 4,
}

/// Buffer kind codes stored in `Uniform::base_type` for buffer
/// uniforms.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[repr(i32)]
pub enum BufferType {
    Undefined = 0,

    Buffer = 1,
    StructuredBuffer = 2,
    ByteAddressBuffer = 3,

    RWBuffer = 4,
    RWStructuredBuffer = 5,
    RWByteAddressBuffer = 6,
    AppendStructuredBuffer = 7,
    ConsumeStructuredBuffer = 8,

    RWTexture1D = 9,
    RWTexture1DArray = 10,
    RWTexture2D = 11,
    RWTexture2DArray = 12,
    RWTexture3D = 13,

    Texture1D = 14,
    Texture1DArray = 15,
    Texture2D = 16,
    Texture2DArray = 17,
    Texture3D = 18,
    TextureCube = 19,
    TextureCubeArray = 20,
    Texture2DMS = 21,
    Texture2DMSArray = 22,
}

/// Data-type codes stored in `Uniform::base_type` for variable
/// uniforms.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[repr(i32)]
pub enum DataType {
    Undefined = 0,

    String = 1,

    Bool = 2,
    Int = 3,
    UInt = 4,
    Half = 5,
    Float = 6,
    Double = 7,

    Bool2 = 8,
    Bool3 = 9,
    Bool4 = 10,
    Int2 = 11,
    Int3 = 12,
    Int4 = 13,
    UInt2 = 14,
    UInt3 = 15,
    UInt4 = 16,
    Half2 = 17,
    Half3 = 18,
    Half4 = 19,
    Float2 = 20,
    Float3 = 21,
    Float4 = 22,
    Double2 = 23,
    Double3 = 24,
    Double4 = 25,

    Bool2x2 = 26,
    Bool2x3 = 27,
    Bool2x4 = 28,
    Bool3x2 = 29,
    Bool3x3 = 30,
    Bool3x4 = 31,
    Bool4x2 = 32,
    Bool4x3 = 33,
    Bool4x4 = 34,
    Int2x2 = 35,
    Int2x3 = 36,
    Int2x4 = 37,
    Int3x2 = 38,
    Int3x3 = 39,
    Int3x4 = 40,
    Int4x2 = 41,
    Int4x3 = 42,
    Int4x4 = 43,
    UInt2x2 = 44,
    UInt2x3 = 45,
    UInt2x4 = 46,
    UInt3x2 = 47,
    UInt3x3 = 48,
    UInt3x4 = 49,
    UInt4x2 = 50,
    UInt4x3 = 51,
    UInt4x4 = 52,
    Half2x2 = 53,
    Half2x3 = 54,
    Half2x4 = 55,
    Half3x2 = 56,
    Half3x3 = 57,
    Half3x4 = 58,
    Half4x2 = 59,
    Half4x3 = 60,
    Half4x4 = 61,
    Float2x2 = 62,
    Float2x3 = 63,
    Float2x4 = 64,
    Float3x2 = 65,
    Float3x3 = 66,
    Float3x4 = 67,
    Float4x2 = 68,
    Float4x3 = 69,
    Float4x4 = 70,
    Double2x2 = 71,
    Double2x3 = 72,
    Double2x4 = 73,
    Double3x2 = 74,
    Double3x3 = 75,
    Double3x4 = 76,
    Double4x2 = 77,
    Double4x3 = 78,
    Double4x4 = 79,
}

/// Variable-type codes of function signatures.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[repr(i32)]
pub enum VarType {
    Undefined = 0,
    Void = 1,

    Bool = 2,
    Int = 3,
    UInt = 4,
    Half = 5,
    Float = 6,
    Double = 7,

    Bool2 = 8,
    Bool3 = 9,
    Bool4 = 10,
    Int2 = 11,
    Int3 = 12,
    Int4 = 13,
    UInt2 = 14,
    UInt3 = 15,
    UInt4 = 16,
    Half2 = 17,
    Half3 = 18,
    Half4 = 19,
    Float2 = 20,
    Float3 = 21,
    Float4 = 22,
    Double2 = 23,
    Double3 = 24,
    Double4 = 25,

    Bool2x2 = 26,
    Bool2x3 = 27,
    Bool2x4 = 28,
    Bool3x2 = 29,
    Bool3x3 = 30,
    Bool3x4 = 31,
    Bool4x2 = 32,
    Bool4x3 = 33,
    Bool4x4 = 34,
    Int2x2 = 35,
    Int2x3 = 36,
    Int2x4 = 37,
    Int3x2 = 38,
    Int3x3 = 39,
    Int3x4 = 40,
    Int4x2 = 41,
    Int4x3 = 42,
    Int4x4 = 43,
    UInt2x2 = 44,
    UInt2x3 = 45,
    UInt2x4 = 46,
    UInt3x2 = 47,
    UInt3x3 = 48,
    UInt3x4 = 49,
    UInt4x2 = 50,
    UInt4x3 = 51,
    UInt4x4 = 52,
    Half2x2 = 53,
    Half2x3 = 54,
    Half2x4 = 55,
    Half3x2 = 56,
    Half3x3 = 57,
    Half3x4 = 58,
    Half4x2 = 59,
    Half4x3 = 60,
    Half4x4 = 61,
    Float2x2 = 62,
    Float2x3 = 63,
    Float2x4 = 64,
    Float3x2 = 65,
    Float3x3 = 66,
    Float3x4 = 67,
    Float4x2 = 68,
    Float4x3 = 69,
    Float4x4 = 70,
    Double2x2 = 71,
    Double2x3 = 72,
    Double2x4 = 73,
    Double3x2 = 74,
    Double3x3 = 75,
    Double3x4 = 76,
    Double4x2 = 77,
    Double4x3 = 78,
    Double4x4 = 79,
}
