//! Shader reflection record.
//!
//! The flat data product describing a shader's externally visible
//! surface: resource binding slots, sampler states, render states,
//! uniforms with default values, and function signatures. Filled by
//! the reflection analyzer; read-only afterwards.

mod enums;
mod print;

pub use enums::{
    BlendFactor, BlendOpType, BufferType, ComparisonFunc, CullMode, DataType, FillMode, Filter,
    SortMode, StencilOpType, TextureAddressMode, UniformType, UnknownName, VarType,
};
pub use print::{print_reflection, write_reflection};

use std::collections::BTreeMap;

/// Number of blend render targets carried in [`BlendState`].
pub const MAX_NUM_RENDER_TARGETS: usize = 8;

/// A resource bound at a register/location on the current shader
/// target. A location of -1 means "not set".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingSlot {
    pub ident: String,
    pub location: i32,
}

impl BindingSlot {
    pub fn new(ident: impl Into<String>, location: i32) -> Self {
        Self {
            ident: ident.into(),
            location,
        }
    }
}

/// Sampler state descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplerState {
    pub filter_min: Filter,
    pub filter_max: Filter,
    pub filter_mip: Filter,
    pub address_u: TextureAddressMode,
    pub address_v: TextureAddressMode,
    pub address_w: TextureAddressMode,
    pub mip_lod_bias: f32,
    pub max_anisotropy: u32,
    pub comparison_func: ComparisonFunc,
    pub border_color: [f32; 4],
    pub min_lod: f32,
    pub max_lod: f32,
    /// `true` once any sampler value initializer was present.
    pub is_non_default: bool,
    /// Alternative texture identifier the sampler samples.
    pub alias: String,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            filter_min: Filter::Linear,
            filter_max: Filter::Linear,
            filter_mip: Filter::Linear,
            address_u: TextureAddressMode::Wrap,
            address_v: TextureAddressMode::Wrap,
            address_w: TextureAddressMode::Wrap,
            mip_lod_bias: 0.0,
            max_anisotropy: 1,
            comparison_func: ComparisonFunc::Always,
            border_color: [0.0; 4],
            min_lod: -f32::MAX,
            max_lod: f32::MAX,
            is_non_default: false,
            alias: String::new(),
        }
    }
}

/// Rasterizer control state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterizerState {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub scissor_enable: bool,
    pub multisample_enable: bool,
    pub antialiased_line_enable: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::CounterClockwise,
            scissor_enable: false,
            multisample_enable: true,
            antialiased_line_enable: false,
        }
    }
}

/// Depth-buffer control state.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthState {
    pub read_enable: bool,
    pub write_enable: bool,
    pub compare_func: ComparisonFunc,
    pub depth_bias: f32,
    pub scaled_depth_bias: f32,
    pub depth_clip: bool,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            read_enable: true,
            write_enable: true,
            compare_func: ComparisonFunc::Less,
            depth_bias: 0.0,
            scaled_depth_bias: 0.0,
            depth_clip: true,
        }
    }
}

/// Per-face stencil operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StencilOperation {
    pub fail: StencilOpType,
    pub zfail: StencilOpType,
    pub pass: StencilOpType,
    pub compare_func: ComparisonFunc,
}

impl Default for StencilOperation {
    fn default() -> Self {
        Self {
            fail: StencilOpType::Keep,
            zfail: StencilOpType::Keep,
            pass: StencilOpType::Keep,
            compare_func: ComparisonFunc::Always,
        }
    }
}

/// Stencil-buffer control state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StencilState {
    pub enabled: bool,
    pub reference: i32,
    pub read_mask: u8,
    pub write_mask: u8,
    pub front: StencilOperation,
    pub back: StencilOperation,
}

impl Default for StencilState {
    fn default() -> Self {
        Self {
            enabled: false,
            reference: 0,
            read_mask: 0xFF,
            write_mask: 0xFF,
            front: StencilOperation::default(),
            back: StencilOperation::default(),
        }
    }
}

/// One blend operation (source factor, destination factor, operator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlendOperation {
    pub source: BlendFactor,
    pub destination: BlendFactor,
    pub operation: BlendOpType,
}

impl Default for BlendOperation {
    fn default() -> Self {
        Self {
            source: BlendFactor::One,
            destination: BlendFactor::Zero,
            operation: BlendOpType::Add,
        }
    }
}

/// Blend state of a single render target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlendStateTarget {
    pub enabled: bool,
    pub write_mask: i8,
    pub color_op: BlendOperation,
    pub alpha_op: BlendOperation,
}

impl Default for BlendStateTarget {
    fn default() -> Self {
        Self {
            enabled: false,
            write_mask: 0b1111,
            color_op: BlendOperation::default(),
            alpha_op: BlendOperation::default(),
        }
    }
}

/// Blend state across all render targets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlendState {
    pub alpha_to_coverage: bool,
    pub independent_blend: bool,
    pub targets: [BlendStateTarget; MAX_NUM_RENDER_TARGETS],
}

/// Global options applying to the whole program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalOptions {
    pub sort_mode: SortMode,
    pub separable: bool,
    pub transparent: bool,
    pub forward: bool,
    pub priority: i32,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            sort_mode: SortMode::FrontToBack,
            separable: false,
            transparent: false,
            forward: false,
            priority: 0,
        }
    }
}

/// `numthreads` attribute of a compute shader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NumThreads {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Default-value payload a uniform indexes into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Real(f32),
    Int(i32),
    IntVec([i32; 4]),
    Matrix([f32; 16]),
    Handle(i32),
}

/// Flags further describing a uniform.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub struct UniformFlags(u32);

impl UniformFlags {
    pub const NONE: Self = Self(0);
    /// Hidden from material editors.
    pub const INTERNAL: Self = Self(1);
    /// Edited as a color.
    pub const COLOR: Self = Self(2);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for UniformFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for UniformFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A single element of a constant buffer or an opaque resource.
#[derive(Clone, Debug, PartialEq)]
pub struct Uniform {
    pub ident: String,
    pub ty: UniformType,
    /// Kind code; interpretation depends on `ty` ([`DataType`] for
    /// variables, [`BufferType`] for buffers).
    pub base_type: i32,
    /// Index into `constant_buffers`, or -1.
    pub uniform_block: i32,
    /// Index into `default_values`, or -1.
    pub default_value: i32,
    pub flags: UniformFlags,
    /// Texture identifier this parameter animates sprite UVs for.
    pub sprite_uv_ref: String,
}

impl Uniform {
    pub fn new(ident: impl Into<String>, ty: UniformType) -> Self {
        Self {
            ident: ident.into(),
            ty,
            base_type: 0,
            uniform_block: -1,
            default_value: -1,
            flags: UniformFlags::NONE,
            sprite_uv_ref: String::new(),
        }
    }
}

/// Direction flags of a function parameter.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub struct ParameterFlags(u32);

impl ParameterFlags {
    pub const NONE: Self = Self(0);
    pub const IN: Self = Self(1);
    pub const OUT: Self = Self(2);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ParameterFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ParameterFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A single function parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub ty: VarType,
    pub ident: String,
    pub flags: ParameterFlags,
}

/// A function defined in the program.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub ident: String,
    pub return_value: VarType,
    pub parameters: Vec<Parameter>,
}

/// The complete reflection product.
#[derive(Clone, Debug, Default)]
pub struct ReflectionData {
    /// Macros defined after preprocessing.
    pub macros: Vec<String>,
    pub textures: Vec<BindingSlot>,
    pub storage_buffers: Vec<BindingSlot>,
    pub constant_buffers: Vec<BindingSlot>,
    pub input_attributes: Vec<BindingSlot>,
    pub output_attributes: Vec<BindingSlot>,
    /// Sampler states by identifier (sorted for stable output).
    pub sampler_states: BTreeMap<String, SamplerState>,
    pub blend_state: BlendState,
    pub rasterizer_state: RasterizerState,
    pub depth_state: DepthState,
    pub stencil_state: StencilState,
    pub global_options: GlobalOptions,
    pub num_threads: NumThreads,
    pub uniforms: Vec<Uniform>,
    pub default_values: Vec<DefaultValue>,
    pub functions: Vec<Function>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampler_state_defaults() {
        let s = SamplerState::default();
        assert_eq!(s.filter_min, Filter::Linear);
        assert_eq!(s.address_w, TextureAddressMode::Wrap);
        assert_eq!(s.max_anisotropy, 1);
        assert_eq!(s.comparison_func, ComparisonFunc::Always);
        assert_eq!(s.min_lod, -f32::MAX);
        assert_eq!(s.max_lod, f32::MAX);
        assert!(!s.is_non_default);
    }

    #[test]
    fn state_defaults() {
        let r = RasterizerState::default();
        assert_eq!(r.fill_mode, FillMode::Solid);
        assert_eq!(r.cull_mode, CullMode::CounterClockwise);
        assert!(r.multisample_enable);

        let d = DepthState::default();
        assert!(d.read_enable && d.write_enable && d.depth_clip);
        assert_eq!(d.compare_func, ComparisonFunc::Less);

        let s = StencilState::default();
        assert_eq!(s.read_mask, 0xFF);
        assert_eq!(s.front.pass, StencilOpType::Keep);

        let b = BlendState::default();
        assert_eq!(b.targets.len(), MAX_NUM_RENDER_TARGETS);
        assert_eq!(b.targets[7].write_mask, 0b1111);
        assert_eq!(b.targets[0].color_op.source, BlendFactor::One);
        assert_eq!(b.targets[0].color_op.destination, BlendFactor::Zero);

        let g = GlobalOptions::default();
        assert_eq!(g.sort_mode, SortMode::FrontToBack);
        assert_eq!(g.priority, 0);
    }

    #[test]
    fn uniform_defaults() {
        let u = Uniform::new("wvpMatrix", UniformType::Variable);
        assert_eq!(u.uniform_block, -1);
        assert_eq!(u.default_value, -1);
        assert_eq!(u.flags, UniformFlags::NONE);
    }

    #[test]
    fn flags_combine() {
        let f = UniformFlags::INTERNAL | UniformFlags::COLOR;
        assert!(f.contains(UniformFlags::INTERNAL));
        assert_eq!(f.bits(), 3);

        let p = ParameterFlags::IN | ParameterFlags::OUT;
        assert!(p.contains(ParameterFlags::OUT));
    }
}
