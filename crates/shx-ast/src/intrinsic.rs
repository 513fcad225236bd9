//! Intrinsic call targets and their family predicates.
//!
//! The variant order is contractual: family predicates are contiguous
//! range checks, and the converter relies on the interlocked block
//! mirroring the image-atomic block.

/// Enumerated intrinsic call targets.
///
/// Numeric suffixes on texture intrinsics give the overload's argument
/// count, the way the source language distinguishes them.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Intrinsic {
    Undefined,

    // Global intrinsics
    Abort,
    Abs,
    ACos,
    All,
    AllMemoryBarrier,
    AllMemoryBarrierWithGroupSync,
    Any,
    ASin,
    ATan,
    ATan2,
    Ceil,
    Clamp,
    Clip,
    Cos,
    CosH,
    Cross,
    Ddx,
    DdxCoarse,
    DdxFine,
    Ddy,
    DdyCoarse,
    DdyFine,
    Degrees,
    Determinant,
    DeviceMemoryBarrier,
    DeviceMemoryBarrierWithGroupSync,
    Distance,
    Dot,
    Exp,
    Exp2,
    FaceForward,
    FirstBitHigh,
    FirstBitLow,
    Floor,
    FMod,
    Frac,
    FrExp,
    FWidth,
    GroupMemoryBarrier,
    GroupMemoryBarrierWithGroupSync,
    IsFinite,
    IsInf,
    IsNaN,
    LdExp,
    Length,
    Lerp,
    Lit,
    Log,
    Log10,
    Log2,
    MAD,
    Max,
    Min,
    ModF,
    MSAD4,
    Mul,
    Normalize,
    Pow,
    Radians,
    Rcp,
    Reflect,
    Refract,
    Round,
    RSqrt,
    Saturate,
    Sign,
    Sin,
    SinCos,
    SinH,
    SmoothStep,
    Sqrt,
    Step,
    Tan,
    TanH,
    Transpose,
    Trunc,

    // Interlocked intrinsics
    InterlockedAdd,
    InterlockedAnd,
    InterlockedCompareExchange,
    InterlockedCompareStore,
    InterlockedExchange,
    InterlockedMax,
    InterlockedMin,
    InterlockedOr,
    InterlockedXor,

    // Image-atomic counterparts of the interlocked block (same order)
    ImageAtomicAdd,
    ImageAtomicAnd,
    ImageAtomicCompSwap,
    ImageAtomicCompStore,
    ImageAtomicExchange,
    ImageAtomicMax,
    ImageAtomicMin,
    ImageAtomicOr,
    ImageAtomicXor,

    // Image load/store
    ImageLoad,
    ImageStore,

    // Stream-output intrinsics
    StreamOutputAppend,
    StreamOutputRestartStrip,

    // Texture object intrinsics
    TextureCalculateLevelOfDetail,
    TextureCalculateLevelOfDetailUnclamped,
    TextureGetDimensions,
    TextureGetSamplePosition,
    TextureLoad1,
    TextureLoad2,
    TextureLoad3,
    TextureGather2,
    TextureGather3,
    TextureGather4,
    TextureGatherRed2,
    TextureGatherRed3,
    TextureGatherGreen2,
    TextureGatherGreen3,
    TextureGatherBlue2,
    TextureGatherBlue3,
    TextureGatherAlpha2,
    TextureGatherAlpha3,
    TextureGatherCmp3,
    TextureGatherCmp4,
    TextureGatherCmpRed3,
    TextureGatherCmpRed4,
    TextureSample2,
    TextureSample3,
    TextureSample4,
    TextureSample5,
    TextureSampleBias3,
    TextureSampleBias4,
    TextureSampleBias5,
    TextureSampleCmp3,
    TextureSampleCmp4,
    TextureSampleCmp5,
    TextureSampleCmpLevelZero3,
    TextureSampleCmpLevelZero4,
    TextureSampleGrad4,
    TextureSampleGrad5,
    TextureSampleGrad6,
    TextureSampleLevel3,
    TextureSampleLevel4,
    TextureSampleLevel5,
}

impl Intrinsic {
    /// Plain (receiver-less) intrinsics.
    pub fn is_global(self) -> bool {
        (Self::Abort..=Self::Trunc).contains(&self)
    }

    /// Intrinsics invoked as members of a texture object.
    pub fn is_texture(self) -> bool {
        (Self::TextureCalculateLevelOfDetail..=Self::TextureSampleLevel5).contains(&self)
    }

    /// The `Gather*` family.
    pub fn is_texture_gather(self) -> bool {
        (Self::TextureGather2..=Self::TextureGatherCmpRed4).contains(&self)
    }

    /// The `Sample*` family.
    pub fn is_texture_sample(self) -> bool {
        (Self::TextureSample2..=Self::TextureSampleLevel5).contains(&self)
    }

    /// Comparison variants of sample/gather.
    pub fn is_texture_compare(self) -> bool {
        (Self::TextureGatherCmp3..=Self::TextureGatherCmpRed4).contains(&self)
            || (Self::TextureSampleCmp3..=Self::TextureSampleCmpLevelZero4).contains(&self)
    }

    /// Level-zero comparison sampling.
    pub fn is_texture_compare_level_zero(self) -> bool {
        (Self::TextureSampleCmpLevelZero3..=Self::TextureSampleCmpLevelZero4).contains(&self)
    }

    /// The `Load*` family.
    pub fn is_texture_load(self) -> bool {
        (Self::TextureLoad1..=Self::TextureLoad3).contains(&self)
    }

    /// Geometry-stream output intrinsics.
    pub fn is_stream_output(self) -> bool {
        (Self::StreamOutputAppend..=Self::StreamOutputRestartStrip).contains(&self)
    }

    /// GLSL image intrinsics (atomics plus load/store).
    pub fn is_image(self) -> bool {
        (Self::ImageAtomicAdd..=Self::ImageStore).contains(&self)
    }

    /// The interlocked (atomic) family.
    pub fn is_interlocked(self) -> bool {
        (Self::InterlockedAdd..=Self::InterlockedXor).contains(&self)
    }

    /// Maps an interlocked intrinsic onto its image-atomic counterpart.
    ///
    /// Returns `self` unchanged for non-interlocked intrinsics.
    pub fn to_image_atomic(self) -> Intrinsic {
        match self {
            Self::InterlockedAdd => Self::ImageAtomicAdd,
            Self::InterlockedAnd => Self::ImageAtomicAnd,
            Self::InterlockedCompareExchange => Self::ImageAtomicCompSwap,
            Self::InterlockedCompareStore => Self::ImageAtomicCompStore,
            Self::InterlockedExchange => Self::ImageAtomicExchange,
            Self::InterlockedMax => Self::ImageAtomicMax,
            Self::InterlockedMin => Self::ImageAtomicMin,
            Self::InterlockedOr => Self::ImageAtomicOr,
            Self::InterlockedXor => Self::ImageAtomicXor,
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_partitions() {
        assert!(Intrinsic::Saturate.is_global());
        assert!(!Intrinsic::TextureSample2.is_global());
        assert!(Intrinsic::TextureSample4.is_texture());
        assert!(Intrinsic::TextureSample4.is_texture_sample());
        assert!(Intrinsic::TextureGatherRed3.is_texture_gather());
        assert!(!Intrinsic::TextureGatherRed3.is_texture_sample());
        assert!(Intrinsic::TextureLoad2.is_texture_load());
        assert!(Intrinsic::TextureSampleCmp4.is_texture_compare());
        assert!(Intrinsic::TextureSampleCmpLevelZero3.is_texture_compare_level_zero());
        assert!(Intrinsic::StreamOutputAppend.is_stream_output());
        assert!(Intrinsic::ImageAtomicAdd.is_image());
        assert!(Intrinsic::ImageStore.is_image());
        assert!(Intrinsic::InterlockedXor.is_interlocked());
        assert!(!Intrinsic::ImageAtomicXor.is_interlocked());
    }

    #[test]
    fn interlocked_to_image_atomic() {
        assert_eq!(
            Intrinsic::InterlockedAdd.to_image_atomic(),
            Intrinsic::ImageAtomicAdd
        );
        assert_eq!(
            Intrinsic::InterlockedCompareExchange.to_image_atomic(),
            Intrinsic::ImageAtomicCompSwap
        );
        assert_eq!(
            Intrinsic::InterlockedXor.to_image_atomic(),
            Intrinsic::ImageAtomicXor
        );
        // non-interlocked intrinsics pass through
        assert_eq!(Intrinsic::Clamp.to_image_atomic(), Intrinsic::Clamp);
    }
}
