//! Human-readable rendition of the reflection record.

use std::fmt::Write;

use crate::{
    BindingSlot, BlendOperation, BlendState, BlendStateTarget, DepthState, GlobalOptions,
    MAX_NUM_RENDER_TARGETS, NumThreads, RasterizerState, ReflectionData, SamplerState,
    StencilOperation, StencilState,
};

/// Renders the reflection record.
///
/// Binding-slot lists are right-aligned on the maximum non-negative
/// location; slots without a location render with blanks in the number
/// column; empty sections render `< none >`.
pub fn print_reflection(data: &ReflectionData) -> String {
    let mut printer = Printer::default();
    printer.line("Code Reflection:");
    printer.indented(|p| {
        p.binding_slots("Macros", &macro_slots(data));
        p.binding_slots("Textures", &data.textures);
        p.binding_slots("Storage Buffers", &data.storage_buffers);
        p.binding_slots("Constant Buffers", &data.constant_buffers);
        p.binding_slots("Input Attributes", &data.input_attributes);
        p.binding_slots("Output Attributes", &data.output_attributes);
        p.sampler_states(data);
        p.rasterizer_state(&data.rasterizer_state);
        p.depth_state(&data.depth_state);
        p.stencil_state(&data.stencil_state);
        p.blend_state(&data.blend_state);
        p.global_options(&data.global_options);
        p.num_threads(&data.num_threads);
    });
    printer.out
}

fn macro_slots(data: &ReflectionData) -> Vec<BindingSlot> {
    data.macros
        .iter()
        .map(|m| BindingSlot::new(m.clone(), -1))
        .collect()
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn indented(&mut self, body: impl FnOnce(&mut Self)) {
        self.indent += 1;
        body(self);
        self.indent -= 1;
    }

    fn section(&mut self, title: &str, body: impl FnOnce(&mut Self)) {
        self.line(&format!("{title}:"));
        self.indented(body);
    }

    fn binding_slots(&mut self, title: &str, slots: &[BindingSlot]) {
        self.section(title, |p| {
            if slots.is_empty() {
                p.line("< none >");
                return;
            }
            let max_location = slots.iter().map(|s| s.location).max().unwrap_or(-1);
            let width = max_location.to_string().len();
            for slot in slots {
                if max_location >= 0 {
                    if slot.location >= 0 {
                        p.line(&format!("{:>width$}: {}", slot.location, slot.ident));
                    } else {
                        p.line(&format!("{:width$}  {}", "", slot.ident));
                    }
                } else {
                    p.line(&slot.ident);
                }
            }
        });
    }

    fn sampler_states(&mut self, data: &ReflectionData) {
        self.section("Sampler States", |p| {
            if data.sampler_states.is_empty() {
                p.line("< none >");
                return;
            }
            for (ident, state) in &data.sampler_states {
                p.line(ident);
                p.indented(|p| p.sampler_state(state));
            }
        });
    }

    fn sampler_state(&mut self, s: &SamplerState) {
        let c = s.border_color;
        self.line(&format!("AddressU       = {}", s.address_u));
        self.line(&format!("AddressV       = {}", s.address_v));
        self.line(&format!("AddressW       = {}", s.address_w));
        self.line(&format!(
            "BorderColor    = {{ {}, {}, {}, {} }}",
            float(c[0]),
            float(c[1]),
            float(c[2]),
            float(c[3])
        ));
        self.line(&format!("ComparisonFunc = {}", s.comparison_func));
        self.line(&format!("FilterMin      = {}", s.filter_min));
        self.line(&format!("FilterMax      = {}", s.filter_max));
        self.line(&format!("FilterMip      = {}", s.filter_mip));
        self.line(&format!("MaxAnisotropy  = {}", s.max_anisotropy));
        self.line(&format!("MaxLOD         = {}", float(s.max_lod)));
        self.line(&format!("MinLOD         = {}", float(s.min_lod)));
        self.line(&format!("MipLODBias     = {}", float(s.mip_lod_bias)));
    }

    fn rasterizer_state(&mut self, s: &RasterizerState) {
        self.section("Rasterizer state", |p| {
            p.line(&format!("FillMode        = {}", s.fill_mode));
            p.line(&format!("CullMode        = {}", s.cull_mode));
            p.line(&format!("AALine          = {}", flag(s.antialiased_line_enable)));
            p.line(&format!("Multisample     = {}", flag(s.multisample_enable)));
            p.line(&format!("Scissor         = {}", flag(s.scissor_enable)));
        });
    }

    fn depth_state(&mut self, s: &DepthState) {
        self.section("Depth state", |p| {
            p.line(&format!("ReadEnable       = {}", flag(s.read_enable)));
            p.line(&format!("WriteEnable      = {}", flag(s.write_enable)));
            p.line(&format!("ComparisonFunc   = {}", s.compare_func));
            p.line(&format!("DepthBias        = {}", float(s.depth_bias)));
            p.line(&format!("ScaledDepthBias  = {}", float(s.scaled_depth_bias)));
            p.line(&format!("DepthClip        = {}", flag(s.depth_clip)));
        });
    }

    fn stencil_operation(&mut self, s: &StencilOperation) {
        self.line(&format!("Fail            = {}", s.fail));
        self.line(&format!("ZFail           = {}", s.zfail));
        self.line(&format!("Pass            = {}", s.pass));
        self.line(&format!("ComparisonFunc  = {}", s.compare_func));
    }

    fn stencil_state(&mut self, s: &StencilState) {
        self.section("Stencil state", |p| {
            p.line(&format!("Enabled         = {}", flag(s.enabled)));
            p.line(&format!("Reference       = {}", s.reference));
            p.line(&format!("ReadMask        = {}", s.read_mask));
            p.line(&format!("WriteMask       = {}", s.write_mask));
            p.line("Back");
            p.indented(|p| p.stencil_operation(&s.back));
            p.line("Front");
            p.indented(|p| p.stencil_operation(&s.front));
        });
    }

    fn blend_operation(&mut self, s: &BlendOperation) {
        self.line(&format!("Source          = {}", s.source));
        self.line(&format!("Destination     = {}", s.destination));
        self.line(&format!("Operation       = {}", s.operation));
    }

    fn blend_target(&mut self, s: &BlendStateTarget) {
        self.line(&format!("Enabled         = {}", flag(s.enabled)));
        self.line(&format!("WriteMask       = {}", s.write_mask));
        self.line("Color");
        self.indented(|p| p.blend_operation(&s.color_op));
        self.line("Alpha");
        self.indented(|p| p.blend_operation(&s.alpha_op));
    }

    fn blend_state(&mut self, s: &BlendState) {
        self.section("Blend state", |p| {
            p.line(&format!("AlphaToCoverage       = {}", flag(s.alpha_to_coverage)));
            p.line(&format!("IndependantBlend      = {}", flag(s.independent_blend)));
            for i in 0..MAX_NUM_RENDER_TARGETS {
                p.line(&format!("Target {i}"));
                p.indented(|p| p.blend_target(&s.targets[i]));
            }
        });
    }

    fn global_options(&mut self, s: &GlobalOptions) {
        self.section("Global options", |p| {
            p.line(&format!("SortMode            = {}", s.sort_mode));
            p.line(&format!("Separable           = {}", flag(s.separable)));
            p.line(&format!("Transparent         = {}", flag(s.transparent)));
            p.line(&format!("Forward             = {}", flag(s.forward)));
            p.line(&format!("Priority            = {}", s.priority));
        });
    }

    fn num_threads(&mut self, s: &NumThreads) {
        self.section("Number of Threads", |p| {
            p.line(&format!("X = {}", s.x));
            p.line(&format!("Y = {}", s.y));
            p.line(&format!("Z = {}", s.z));
        });
    }
}

fn flag(value: bool) -> i32 {
    value as i32
}

/// Stream-style float rendition: six significant digits, scientific
/// notation outside [1e-4, 1e6).
fn float(value: f32) -> String {
    if value == 0.0 {
        return "0".into();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let abs = value.abs() as f64;
    if !(1e-4..1e6).contains(&abs) {
        let exp = abs.log10().floor() as i32;
        let mantissa = value as f64 / 10f64.powi(exp);
        let mantissa = trim_zeros(&format!("{mantissa:.5}"));
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exp.abs());
    }
    let digits_before = if abs >= 1.0 {
        abs.log10().floor() as usize + 1
    } else {
        1
    };
    let precision = 6usize.saturating_sub(digits_before);
    trim_zeros(&format!("{value:.precision$}"))
}

fn trim_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.into();
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.into()
}

/// Writes the rendition into a formatter sink.
pub fn write_reflection(out: &mut impl Write, data: &ReflectionData) -> std::fmt::Result {
    out.write_str(&print_reflection(data))
}
