//! System-value semantics and indexed semantic names.

use std::cmp::Ordering;
use std::fmt;

/// Entry-point I/O semantics. `UserDefined` covers everything that is
/// not a system value.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Semantic {
    Undefined,
    UserDefined,

    ClipDistance,
    CullDistance,
    Coverage,
    Depth,
    DepthGreaterEqual,
    DepthLessEqual,
    DispatchThreadId,
    DomainLocation,
    FragCoord,
    GroupId,
    GroupIndex,
    GroupThreadId,
    GsInstanceId,
    InnerCoverage,
    InsideTessFactor,
    InstanceId,
    IsFrontFace,
    OutputControlPointId,
    PrimitiveId,
    RenderTargetArrayIndex,
    SampleIndex,
    StencilRef,
    Target,
    TessFactor,
    VertexId,
    VertexPosition,
    ViewportArrayIndex,
}

impl Semantic {
    /// `true` for every semantic except `Undefined` and `UserDefined`.
    pub fn is_system_value(self) -> bool {
        self > Self::UserDefined
    }

    /// The `SV_*` spelling of a system value.
    pub fn system_value_name(self) -> Option<&'static str> {
        Some(match self {
            Self::ClipDistance => "SV_ClipDistance",
            Self::CullDistance => "SV_CullDistance",
            Self::Coverage => "SV_Coverage",
            Self::Depth => "SV_Depth",
            Self::DepthGreaterEqual => "SV_DepthGreaterEqual",
            Self::DepthLessEqual => "SV_DepthLessEqual",
            Self::DispatchThreadId => "SV_DispatchThreadID",
            Self::DomainLocation => "SV_DomainLocation",
            Self::FragCoord | Self::VertexPosition => "SV_Position",
            Self::GroupId => "SV_GroupID",
            Self::GroupIndex => "SV_GroupIndex",
            Self::GroupThreadId => "SV_GroupThreadID",
            Self::GsInstanceId => "SV_GSInstanceID",
            Self::InnerCoverage => "SV_InnerCoverage",
            Self::InsideTessFactor => "SV_InsideTessFactor",
            Self::InstanceId => "SV_InstanceID",
            Self::IsFrontFace => "SV_IsFrontFace",
            Self::OutputControlPointId => "SV_OutputControlPointID",
            Self::PrimitiveId => "SV_PrimitiveID",
            Self::RenderTargetArrayIndex => "SV_RenderTargetArrayIndex",
            Self::SampleIndex => "SV_SampleIndex",
            Self::StencilRef => "SV_StencilRef",
            Self::Target => "SV_Target",
            Self::TessFactor => "SV_TessFactor",
            Self::VertexId => "SV_VertexID",
            Self::ViewportArrayIndex => "SV_ViewportArrayIndex",
            _ => return None,
        })
    }
}

/// A semantic paired with its non-negative index and, for user-defined
/// semantics, the user-provided name.
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct IndexedSemantic {
    semantic: Semantic,
    index: i32,
    user_name: String,
}

impl Default for Semantic {
    fn default() -> Self {
        Self::Undefined
    }
}

impl IndexedSemantic {
    /// A system-value semantic with an index.
    pub fn new(semantic: Semantic, index: i32) -> Self {
        Self {
            semantic,
            index: index.max(0),
            user_name: String::new(),
        }
    }

    /// A user-defined semantic. The trailing digits of `name` become
    /// the index, mirroring the source language's `TEXCOORD3` style.
    pub fn user_defined(name: &str) -> Self {
        let split = name
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i)
            .unwrap_or(name.len());
        let index = name[split..].parse().unwrap_or(0);
        Self {
            semantic: Semantic::UserDefined,
            index,
            user_name: name[..split].to_string(),
        }
    }

    pub fn semantic(&self) -> Semantic {
        self.semantic
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn is_system_value(&self) -> bool {
        self.semantic.is_system_value()
    }

    pub fn is_valid(&self) -> bool {
        self.semantic != Semantic::Undefined
    }
}

impl PartialOrd for IndexedSemantic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexedSemantic {
    /// Strict weak order: semantic kind, then user name, then index.
    fn cmp(&self, other: &Self) -> Ordering {
        self.semantic
            .cmp(&other.semantic)
            .then_with(|| self.user_name.cmp(&other.user_name))
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl fmt::Display for IndexedSemantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.semantic.system_value_name() {
            Some(name) => write!(f, "{name}{}", self.index),
            None if self.semantic == Semantic::UserDefined => {
                write!(f, "{}{}", self.user_name, self.index)
            }
            None => f.write_str("<undefined>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_value_predicate() {
        assert!(Semantic::VertexId.is_system_value());
        assert!(Semantic::Target.is_system_value());
        assert!(!Semantic::UserDefined.is_system_value());
        assert!(!Semantic::Undefined.is_system_value());
    }

    #[test]
    fn user_defined_index_split() {
        let s = IndexedSemantic::user_defined("TEXCOORD3");
        assert_eq!(s.semantic(), Semantic::UserDefined);
        assert_eq!(s.index(), 3);
        assert_eq!(s.to_string(), "TEXCOORD3");

        let s = IndexedSemantic::user_defined("COLOR");
        assert_eq!(s.index(), 0);
        assert_eq!(s.to_string(), "COLOR0");

        let s = IndexedSemantic::user_defined("UV12");
        assert_eq!(s.index(), 12);
    }

    #[test]
    fn system_value_to_string() {
        assert_eq!(
            IndexedSemantic::new(Semantic::Target, 2).to_string(),
            "SV_Target2"
        );
        assert_eq!(
            IndexedSemantic::new(Semantic::VertexPosition, 0).to_string(),
            "SV_Position0"
        );
    }

    #[test]
    fn ordering_is_strict_weak() {
        let a = IndexedSemantic::new(Semantic::Target, 0);
        let b = IndexedSemantic::new(Semantic::Target, 1);
        let c = IndexedSemantic::user_defined("TEXCOORD0");
        assert!(a < b);
        assert!(c < a); // UserDefined precedes system values
        assert_eq!(a.cmp(&a), Ordering::Equal);
    }

    #[test]
    fn negative_index_clamped() {
        assert_eq!(IndexedSemantic::new(Semantic::Depth, -5).index(), 0);
    }
}
