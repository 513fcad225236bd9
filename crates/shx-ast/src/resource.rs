//! Resource-related closed sets: buffers, samplers, state blocks,
//! registers, modifiers, attributes, and compile targets.

use crate::error::MapError;
use crate::types::DataType;

/// Buffer object kinds: storage buffers, typed textures, patches, and
/// geometry streams. Variant order is contractual for the range
/// predicates.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum BufferType {
    Undefined,

    // Storage buffers
    Buffer,
    StructuredBuffer,
    ByteAddressBuffer,

    RwBuffer,
    RwStructuredBuffer,
    RwByteAddressBuffer,
    AppendStructuredBuffer,
    ConsumeStructuredBuffer,

    // Writable textures
    RwTexture1D,
    RwTexture1DArray,
    RwTexture2D,
    RwTexture2DArray,
    RwTexture3D,

    // Read-only textures
    Texture1D,
    Texture1DArray,
    Texture2D,
    Texture2DArray,
    Texture3D,
    TextureCube,
    TextureCubeArray,
    Texture2DMs,
    Texture2DMsArray,

    // Tessellation patches
    InputPatch,
    OutputPatch,

    // Geometry streams
    PointStream,
    LineStream,
    TriangleStream,
}

impl BufferType {
    /// Storage buffers (read-only and read-write, including
    /// append/consume).
    pub fn is_storage_buffer(self) -> bool {
        (Self::Buffer..=Self::ConsumeStructuredBuffer).contains(&self)
    }

    /// Read-write buffer objects of any kind.
    pub fn is_rw_buffer(self) -> bool {
        (Self::RwBuffer..=Self::RwTexture3D).contains(&self)
    }

    /// Texture objects, writable or not.
    pub fn is_texture_buffer(self) -> bool {
        (Self::RwTexture1D..=Self::Texture2DMsArray).contains(&self)
    }

    /// Multi-sampled textures.
    pub fn is_texture_ms_buffer(self) -> bool {
        (Self::Texture2DMs..=Self::Texture2DMsArray).contains(&self)
    }

    /// Writable textures (GLSL image types).
    pub fn is_rw_texture_buffer(self) -> bool {
        (Self::RwTexture1D..=Self::RwTexture3D).contains(&self)
    }

    /// Tessellation patch objects.
    pub fn is_patch_buffer(self) -> bool {
        (Self::InputPatch..=Self::OutputPatch).contains(&self)
    }

    /// Geometry-shader output streams.
    pub fn is_stream_buffer(self) -> bool {
        (Self::PointStream..=Self::TriangleStream).contains(&self)
    }

    /// The natural coordinate dimension of a texture kind (0 for
    /// non-textures).
    pub fn texture_dim(self) -> u32 {
        match self {
            Self::Texture1D | Self::RwTexture1D => 1,
            Self::Texture1DArray
            | Self::RwTexture1DArray
            | Self::Texture2D
            | Self::RwTexture2D
            | Self::Texture2DMs => 2,
            Self::Texture2DArray
            | Self::RwTexture2DArray
            | Self::Texture2DMsArray
            | Self::Texture3D
            | Self::RwTexture3D
            | Self::TextureCube => 3,
            Self::TextureCubeArray => 4,
            _ => 0,
        }
    }
}

/// Sampler kinds: traditional samplers plus the two state objects.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum SamplerType {
    Undefined,

    Sampler1D,
    Sampler2D,
    Sampler3D,
    SamplerCube,
    Sampler1DArray,
    Sampler2DArray,
    SamplerCubeArray,
    Sampler1DShadow,
    Sampler2DShadow,
    SamplerCubeShadow,
    Sampler1DArrayShadow,
    Sampler2DArrayShadow,
    SamplerCubeArrayShadow,

    SamplerState,
    SamplerComparisonState,
}

impl SamplerType {
    /// `SamplerState` and `SamplerComparisonState` have no direct GLSL
    /// counterpart and are stripped by the converter.
    pub fn is_sampler_state(self) -> bool {
        (Self::SamplerState..=Self::SamplerComparisonState).contains(&self)
    }

    pub fn is_shadow(self) -> bool {
        (Self::Sampler1DShadow..=Self::SamplerCubeArrayShadow).contains(&self)
    }

    pub fn is_array(self) -> bool {
        matches!(
            self,
            Self::Sampler1DArray
                | Self::Sampler2DArray
                | Self::SamplerCubeArray
                | Self::Sampler1DArrayShadow
                | Self::Sampler2DArrayShadow
                | Self::SamplerCubeArrayShadow
        )
    }

    /// Coordinate dimension of the sampled texture (0 for state objects).
    pub fn texture_dim(self) -> u32 {
        match self {
            Self::Sampler1D | Self::Sampler1DShadow => 1,
            Self::Sampler2D | Self::Sampler1DArray | Self::Sampler2DShadow | Self::Sampler1DArrayShadow => 2,
            Self::Sampler3D
            | Self::SamplerCube
            | Self::Sampler2DArray
            | Self::SamplerCubeShadow
            | Self::Sampler2DArrayShadow => 3,
            Self::SamplerCubeArray | Self::SamplerCubeArrayShadow => 4,
            _ => 0,
        }
    }
}

/// Non-programmable state blocks decoded by the reflection analyzer.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum StateType {
    Undefined,
    Rasterizer,
    Depth,
    Stencil,
    Blend,
    Options,
}

/// GLSL `layout(...)` image formats.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ImageLayoutFormat {
    Undefined,

    // Float formats
    F32X4,
    F32X2,
    F32X1,
    F16X4,
    F16X2,
    F16X1,
    F11R11G10B,

    // Normalized formats
    UN32X4,
    UN16X4,
    UN10R10G10B2A,
    UN8X4,
    UN16X2,
    UN8X2,
    UN16X1,
    UN8X1,
    SN16X4,
    SN8X4,
    SN16X2,
    SN8X2,
    SN16X1,
    SN8X1,

    // Signed integer formats
    I32X4,
    I16X4,
    I8X4,
    I32X2,
    I16X2,
    I8X2,
    I32X1,
    I16X1,
    I8X1,

    // Unsigned integer formats
    UI32X4,
    UI16X4,
    UI10R10G10B2A,
    UI8X4,
    UI32X2,
    UI16X2,
    UI8X2,
    UI32X1,
    UI16X1,
    UI8X1,
}

impl ImageLayoutFormat {
    /// The scalar class an image format loads/stores as.
    pub fn base_type(self) -> DataType {
        match self {
            Self::Undefined => DataType::Undefined,
            Self::I32X4
            | Self::I16X4
            | Self::I8X4
            | Self::I32X2
            | Self::I16X2
            | Self::I8X2
            | Self::I32X1
            | Self::I16X1
            | Self::I8X1 => DataType::Int,
            Self::UI32X4
            | Self::UI16X4
            | Self::UI10R10G10B2A
            | Self::UI8X4
            | Self::UI32X2
            | Self::UI16X2
            | Self::UI8X2
            | Self::UI32X1
            | Self::UI16X1
            | Self::UI8X1 => DataType::UInt,
            _ => DataType::Float,
        }
    }
}

/// Register classes of explicit binding slots (`register(b0)` etc.).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum RegisterType {
    Undefined,
    ConstantBuffer,
    TextureBuffer,
    BufferOffset,
    Sampler,
    UnorderedAccessView,
}

impl RegisterType {
    /// The register prefix character (`b`, `t`, `c`, `s`, `u`).
    pub fn to_char(self) -> Option<char> {
        match self {
            Self::Undefined => None,
            Self::ConstantBuffer => Some('b'),
            Self::TextureBuffer => Some('t'),
            Self::BufferOffset => Some('c'),
            Self::Sampler => Some('s'),
            Self::UnorderedAccessView => Some('u'),
        }
    }

    /// Inverse of [`to_char`](Self::to_char).
    pub fn from_char(c: char) -> Result<Self, MapError> {
        Ok(match c {
            'b' => Self::ConstantBuffer,
            't' => Self::TextureBuffer,
            'c' => Self::BufferOffset,
            's' => Self::Sampler,
            'u' => Self::UnorderedAccessView,
            _ => return Err(MapError::new("char", "RegisterType", c.to_string())),
        })
    }
}

/// Storage-class keywords on variable declarations.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum StorageClass {
    Extern,
    Precise,
    Shared,
    GroupShared,
    Static,
    Volatile,
}

/// Interpolation modifiers on entry-point I/O.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum InterpModifier {
    Linear,
    Centroid,
    NoInterpolation,
    NoPerspective,
    Sample,
}

/// Type modifiers (`const`, `row_major`, ...).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum TypeModifier {
    Const,
    RowMajor,
    ColumnMajor,
    SNorm,
    UNorm,
}

/// Extended modifiers carried on base type denoters and reflected onto
/// uniforms.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub struct ExtModifiers(u32);

impl ExtModifiers {
    pub const EMPTY: Self = Self(0);
    /// Hidden from material editors.
    pub const INTERNAL: Self = Self(1);
    /// Edited as a color rather than a raw vector.
    pub const COLOR: Self = Self(2);

    /// Returns `true` if `self` contains all flags in `other`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for ExtModifiers {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ExtModifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Declaration attributes (`[numthreads(...)]` etc.).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum AttributeType {
    Undefined,
    Branch,
    Call,
    Flatten,
    IfAll,
    IfAny,
    Loop,
    Unroll,
    Domain,
    EarlyDepthStencil,
    Instance,
    MaxTessFactor,
    MaxVertexCount,
    NumThreads,
    OutputControlPoints,
    OutputTopology,
    Partitioning,
    PatchConstantFunc,
}

/// The shader stage a compilation targets.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ShaderTarget {
    Undefined,
    VertexShader,
    TessellationControlShader,
    TessellationEvaluationShader,
    GeometryShader,
    FragmentShader,
    ComputeShader,
}

impl std::fmt::Display for ShaderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Undefined => "undefined",
            Self::VertexShader => "vertex",
            Self::TessellationControlShader => "tess-control",
            Self::TessellationEvaluationShader => "tess-eval",
            Self::GeometryShader => "geometry",
            Self::FragmentShader => "fragment",
            Self::ComputeShader => "compute",
        })
    }
}

/// Output dialect versions. The numeric value is `major * 100 + minor`.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum OutputVersion {
    Glsl110,
    Glsl120,
    Glsl130,
    Glsl140,
    Glsl150,
    Glsl330,
    Glsl400,
    Glsl410,
    Glsl420,
    Glsl430,
    Glsl440,
    Glsl450,
    Glsl460,
    Essl300,
    Vksl450,
}

impl OutputVersion {
    /// Vulkan-flavored GLSL: sampler-state objects survive and textures
    /// bind together with samplers.
    pub fn is_vksl(self) -> bool {
        self == Self::Vksl450
    }

    /// `true` when the `GL_ARB_shading_language_420pack` feature set is
    /// implied (GLSL >= 4.20 or any VKSL).
    pub fn has_420_pack(self) -> bool {
        self.is_vksl() || (Self::Glsl420..=Self::Glsl460).contains(&self)
    }
}
