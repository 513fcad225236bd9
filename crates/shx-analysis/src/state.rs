//! State-object initializer decoding.
//!
//! Each state block (`rasterizer`, `depth`, `stencil`, `blend`,
//! `options`) and each sampler declaration carries a list of
//! `name = value` entries. Values are either literals (parsed through
//! the constant [`Variant`]), enumerator name references (looked up in
//! the matching reflection enum), or nested state initializers.
//! Mismatches degrade to reports; decoding never aborts.

use shx_ast::eval::{self, Variant};
use shx_ast::{Expr, ExprKind, Handle, Program, StateValue};
use shx_reflect::{
    BlendFactor, BlendOpType, BlendOperation, BlendState, BlendStateTarget, ComparisonFunc,
    CullMode, DepthState, FillMode, Filter, GlobalOptions, MAX_NUM_RENDER_TARGETS,
    RasterizerState, SamplerState, SortMode, StencilOpType, StencilOperation, StencilState,
    TextureAddressMode,
};

use crate::report::ReportHandler;

fn expr_area(program: &Program, expr: Handle<Expr>) -> shx_ast::SourceArea {
    program.exprs[expr].area
}

/// The literal variant of a state value, or an error report.
fn literal_variant(
    program: &Program,
    expr: Handle<Expr>,
    reports: &mut ReportHandler,
) -> Option<Variant> {
    match &program.exprs[expr].kind {
        ExprKind::Literal { value, .. } => {
            let parsed = Variant::parse(value);
            if parsed.is_none() {
                reports.warning(
                    format!("malformed literal '{value}'"),
                    expr_area(program, expr),
                );
            }
            parsed
        }
        _ => {
            reports.error("expected literal value", expr_area(program, expr));
            None
        }
    }
}

/// The enumerator identifier of a state value, or an error report.
fn enumerator_ident<'a>(
    program: &'a Program,
    expr: Handle<Expr>,
    reports: &mut ReportHandler,
) -> Option<&'a str> {
    match &program.exprs[expr].kind {
        ExprKind::Object { ident, prefix: None, .. } => Some(ident),
        _ => {
            reports.error("expected state enumerator", expr_area(program, expr));
            None
        }
    }
}

/// The nested initializer entries of a state value, or an error report.
fn nested_values<'a>(
    program: &'a Program,
    expr: Handle<Expr>,
    reports: &mut ReportHandler,
) -> Option<&'a [StateValue]> {
    match &program.exprs[expr].kind {
        ExprKind::StateInitializer { values } => Some(values),
        _ => {
            reports.error("expected state initializer", expr_area(program, expr));
            None
        }
    }
}

fn decode_bool(program: &Program, expr: Handle<Expr>, out: &mut bool, reports: &mut ReportHandler) {
    if let Some(v) = literal_variant(program, expr, reports) {
        *out = v.to_bool();
    }
}

fn decode_f32(program: &Program, expr: Handle<Expr>, out: &mut f32, reports: &mut ReportHandler) {
    if let Some(v) = literal_variant(program, expr, reports) {
        *out = v.to_real() as f32;
    }
}

macro_rules! decode_enum {
    ($fn_name:ident, $enum:ty, $on_unknown:ident) => {
        fn $fn_name(
            program: &Program,
            expr: Handle<Expr>,
            out: &mut $enum,
            reports: &mut ReportHandler,
        ) {
            let Some(ident) = enumerator_ident(program, expr, reports) else {
                return;
            };
            match <$enum>::from_name(ident) {
                Ok(value) => *out = value,
                Err(err) => reports.$on_unknown(err.to_string(), expr_area(program, expr)),
            }
        }
    };
}

// Unknown sampler enumerators degrade to warnings; unknown render-state
// enumerators are errors.
decode_enum!(decode_filter, Filter, warning);
decode_enum!(decode_address_mode, TextureAddressMode, warning);
decode_enum!(decode_compare_func_warn, ComparisonFunc, warning);
decode_enum!(decode_compare_func, ComparisonFunc, error);
decode_enum!(decode_fill_mode, FillMode, error);
decode_enum!(decode_cull_mode, CullMode, error);
decode_enum!(decode_stencil_op, StencilOpType, error);
decode_enum!(decode_blend_factor, BlendFactor, error);
decode_enum!(decode_blend_op, BlendOpType, error);
decode_enum!(decode_sort_mode, SortMode, error);

/// Decodes one `name = value` entry of a sampler declaration.
pub fn reflect_sampler_value(
    program: &Program,
    value: &StateValue,
    state: &mut SamplerState,
    reports: &mut ReportHandler,
) {
    let expr = value.value;
    match value.name.as_str() {
        "MipLODBias" => decode_f32_or_default(program, expr, &mut state.mip_lod_bias, reports),
        "MaxAnisotropy" => {
            if let Some(v) = literal_or_warn(program, expr, reports) {
                state.max_anisotropy = v.to_int().max(0) as u32;
            }
        }
        "MinLOD" => decode_f32_or_default(program, expr, &mut state.min_lod, reports),
        "MaxLOD" => decode_f32_or_default(program, expr, &mut state.max_lod, reports),
        "Filter" => {
            let mut filter = state.filter_min;
            decode_filter(program, expr, &mut filter, reports);
            state.filter_min = filter;
            state.filter_max = filter;
            state.filter_mip = filter;
        }
        "AddressU" => decode_address_mode(program, expr, &mut state.address_u, reports),
        "AddressV" => decode_address_mode(program, expr, &mut state.address_v, reports),
        "AddressW" => decode_address_mode(program, expr, &mut state.address_w, reports),
        "ComparisonFunc" => {
            decode_compare_func_warn(program, expr, &mut state.comparison_func, reports)
        }
        "BorderColor" => reflect_border_color(program, expr, state, reports),
        // Unknown sampler keys are tolerated.
        _ => {}
    }
}

fn decode_f32_or_default(
    program: &Program,
    expr: Handle<Expr>,
    out: &mut f32,
    reports: &mut ReportHandler,
) {
    if let Some(v) = literal_or_warn(program, expr, reports) {
        *out = v.to_real() as f32;
    }
}

/// Sampler literal keys are lenient: a non-literal or malformed value
/// warns and leaves the default.
fn literal_or_warn(
    program: &Program,
    expr: Handle<Expr>,
    reports: &mut ReportHandler,
) -> Option<Variant> {
    match &program.exprs[expr].kind {
        ExprKind::Literal { value, .. } => {
            let parsed = Variant::parse(value);
            if parsed.is_none() {
                reports.warning(
                    format!("malformed literal '{value}'"),
                    expr_area(program, expr),
                );
            }
            parsed
        }
        _ => None,
    }
}

fn reflect_border_color(
    program: &Program,
    expr: Handle<Expr>,
    state: &mut SamplerState,
    reports: &mut ReportHandler,
) {
    match &program.exprs[expr].kind {
        // Vector constructor call: all four channels given.
        ExprKind::Call { arguments, .. } => {
            let is_vector = program.exprs[expr]
                .ty
                .as_ref()
                .is_some_and(|ty| ty.is_vector());
            if is_vector && arguments.len() == 4 {
                for (channel, &arg) in state.border_color.iter_mut().zip(arguments) {
                    *channel = eval::evaluate_or_default(program, arg, Variant::Real(0.0))
                        .to_real() as f32;
                }
            } else {
                reports.warning(
                    "failed to initialize sampler value 'BorderColor': \
                     invalid type or invalid number of arguments",
                    expr_area(program, expr),
                );
            }
        }
        // Scalar cast: splat to all four channels.
        ExprKind::Cast { expr: sub, .. } => {
            let value =
                eval::evaluate_or_default(program, *sub, Variant::Real(0.0)).to_real() as f32;
            state.border_color = [value; 4];
        }
        // Initializer list: exactly four entries.
        ExprKind::InitializerList { exprs } => {
            if exprs.len() == 4 {
                for (channel, &sub) in state.border_color.iter_mut().zip(exprs) {
                    *channel = eval::evaluate_or_default(program, sub, Variant::Real(0.0))
                        .to_real() as f32;
                }
            } else {
                reports.warning(
                    "failed to initialize sampler value 'BorderColor': \
                     invalid number of arguments",
                    expr_area(program, expr),
                );
            }
        }
        _ => {}
    }
}

/// Decodes one rasterizer-state entry.
pub fn reflect_rasterizer_value(
    program: &Program,
    value: &StateValue,
    state: &mut RasterizerState,
    reports: &mut ReportHandler,
) {
    let expr = value.value;
    match value.name.as_str() {
        "scissor" => decode_bool(program, expr, &mut state.scissor_enable, reports),
        "multisample" => decode_bool(program, expr, &mut state.multisample_enable, reports),
        "lineaa" => decode_bool(program, expr, &mut state.antialiased_line_enable, reports),
        "fill" => decode_fill_mode(program, expr, &mut state.fill_mode, reports),
        "cull" => decode_cull_mode(program, expr, &mut state.cull_mode, reports),
        _ => reports.error(
            "unknown state keyword in rasterizer state",
            expr_area(program, expr),
        ),
    }
}

/// Decodes one depth-state entry.
pub fn reflect_depth_value(
    program: &Program,
    value: &StateValue,
    state: &mut DepthState,
    reports: &mut ReportHandler,
) {
    let expr = value.value;
    match value.name.as_str() {
        "read" => decode_bool(program, expr, &mut state.read_enable, reports),
        "write" => decode_bool(program, expr, &mut state.write_enable, reports),
        "compare" => decode_compare_func(program, expr, &mut state.compare_func, reports),
        "bias" => decode_f32(program, expr, &mut state.depth_bias, reports),
        "scaledBias" => decode_f32(program, expr, &mut state.scaled_depth_bias, reports),
        "clip" => decode_bool(program, expr, &mut state.depth_clip, reports),
        _ => reports.error(
            "unknown state keyword in depth state",
            expr_area(program, expr),
        ),
    }
}

fn reflect_stencil_operation(
    program: &Program,
    value: &StateValue,
    operation: &mut StencilOperation,
    reports: &mut ReportHandler,
) {
    let expr = value.value;
    match value.name.as_str() {
        "fail" => decode_stencil_op(program, expr, &mut operation.fail, reports),
        "zfail" => decode_stencil_op(program, expr, &mut operation.zfail, reports),
        "pass" => decode_stencil_op(program, expr, &mut operation.pass, reports),
        "compare" => decode_compare_func(program, expr, &mut operation.compare_func, reports),
        _ => reports.error(
            "unknown state keyword in stencil operation",
            expr_area(program, expr),
        ),
    }
}

/// Decodes one stencil-state entry.
pub fn reflect_stencil_value(
    program: &Program,
    value: &StateValue,
    state: &mut StencilState,
    reports: &mut ReportHandler,
) {
    let expr = value.value;
    match value.name.as_str() {
        "enabled" => decode_bool(program, expr, &mut state.enabled, reports),
        "reference" => {
            if let Some(v) = literal_variant(program, expr, reports) {
                state.reference = v.to_int() as i32;
            }
        }
        "readmask" => {
            if let Some(v) = literal_variant(program, expr, reports) {
                state.read_mask = v.to_int() as u8;
            }
        }
        "writemask" => {
            if let Some(v) = literal_variant(program, expr, reports) {
                state.write_mask = v.to_int() as u8;
            }
        }
        "back" => {
            if let Some(values) = nested_values(program, expr, reports) {
                for entry in values {
                    reflect_stencil_operation(program, entry, &mut state.back, reports);
                }
            }
        }
        "front" => {
            if let Some(values) = nested_values(program, expr, reports) {
                for entry in values {
                    reflect_stencil_operation(program, entry, &mut state.front, reports);
                }
            }
        }
        _ => reports.error(
            "unknown state keyword in stencil state",
            expr_area(program, expr),
        ),
    }
}

fn reflect_blend_operation(
    program: &Program,
    value: &StateValue,
    operation: &mut BlendOperation,
    reports: &mut ReportHandler,
) {
    let expr = value.value;
    match value.name.as_str() {
        "source" => decode_blend_factor(program, expr, &mut operation.source, reports),
        "dest" => decode_blend_factor(program, expr, &mut operation.destination, reports),
        "op" => decode_blend_op(program, expr, &mut operation.operation, reports),
        _ => reports.error(
            "unknown state keyword in blend operation",
            expr_area(program, expr),
        ),
    }
}

fn reflect_blend_target(
    program: &Program,
    value: &StateValue,
    target: &mut BlendStateTarget,
    reports: &mut ReportHandler,
) {
    let expr = value.value;
    match value.name.as_str() {
        "enabled" => decode_bool(program, expr, &mut target.enabled, reports),
        "writemask" => {
            if let Some(v) = literal_variant(program, expr, reports) {
                target.write_mask = v.to_int() as i8;
            }
        }
        "color" => {
            if let Some(values) = nested_values(program, expr, reports) {
                for entry in values {
                    reflect_blend_operation(program, entry, &mut target.color_op, reports);
                }
            }
        }
        "alpha" => {
            if let Some(values) = nested_values(program, expr, reports) {
                for entry in values {
                    reflect_blend_operation(program, entry, &mut target.alpha_op, reports);
                }
            }
        }
        // Consumed by the target-index scan.
        "index" => {}
        _ => reports.error(
            "unknown state keyword in blend target",
            expr_area(program, expr),
        ),
    }
}

/// Decodes one blend-state entry, maintaining the render-target cursor:
/// targets without an `index` key take the cursor position; explicit
/// indices reposition it. Indices past the target array are ignored.
pub fn reflect_blend_value(
    program: &Program,
    value: &StateValue,
    state: &mut BlendState,
    target_index: &mut u32,
    reports: &mut ReportHandler,
) {
    let expr = value.value;
    match value.name.as_str() {
        "dither" => decode_bool(program, expr, &mut state.alpha_to_coverage, reports),
        "independant" => decode_bool(program, expr, &mut state.independent_blend, reports),
        "target" => {
            let Some(values) = nested_values(program, expr, reports) else {
                return;
            };
            for entry in values {
                if entry.name == "index" {
                    if let Some(v) = literal_variant(program, entry.value, reports) {
                        *target_index = v.to_int().max(0) as u32;
                    }
                }
            }
            if (*target_index as usize) < MAX_NUM_RENDER_TARGETS {
                let target = &mut state.targets[*target_index as usize];
                for entry in values {
                    reflect_blend_target(program, entry, target, reports);
                }
                *target_index += 1;
            }
        }
        _ => reports.error(
            "unknown state keyword in blend state",
            expr_area(program, expr),
        ),
    }
}

/// Decodes one global-options entry.
pub fn reflect_options_value(
    program: &Program,
    value: &StateValue,
    options: &mut GlobalOptions,
    reports: &mut ReportHandler,
) {
    let expr = value.value;
    match value.name.as_str() {
        "separable" => decode_bool(program, expr, &mut options.separable, reports),
        "priority" => {
            if let Some(v) = literal_variant(program, expr, reports) {
                options.priority = v.to_int() as i32;
            }
        }
        "transparent" => decode_bool(program, expr, &mut options.transparent, reports),
        // Mirrors the upstream decoder, which stores `forward` into the
        // transparency flag.
        "forward" => decode_bool(program, expr, &mut options.transparent, reports),
        "sort" => decode_sort_mode(program, expr, &mut options.sort_mode, reports),
        _ => reports.error(
            "unknown state keyword in options state",
            expr_area(program, expr),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shx_ast::{DataType, Expr, ExprKind};

    fn literal(program: &mut Program, value: &str) -> Handle<Expr> {
        program.add_expr(Expr::new(ExprKind::Literal {
            data_type: DataType::Int,
            value: value.into(),
        }))
    }

    fn enumerator(program: &mut Program, ident: &str) -> Handle<Expr> {
        program.add_expr(Expr::new(ExprKind::Object {
            prefix: None,
            ident: ident.into(),
            symbol: None,
        }))
    }

    fn entry(name: &str, value: Handle<Expr>) -> StateValue {
        StateValue {
            name: name.into(),
            value,
        }
    }

    #[test]
    fn rasterizer_keys() {
        let mut program = Program::default();
        let mut state = RasterizerState::default();
        let mut reports = ReportHandler::new(true);

        let on = literal(&mut program, "true");
        reflect_rasterizer_value(&program, &entry("scissor", on), &mut state, &mut reports);
        let wire = enumerator(&mut program, "Wire");
        reflect_rasterizer_value(&program, &entry("fill", wire), &mut state, &mut reports);
        let cw = enumerator(&mut program, "Clockwise");
        reflect_rasterizer_value(&program, &entry("cull", cw), &mut state, &mut reports);

        assert!(state.scissor_enable);
        assert_eq!(state.fill_mode, FillMode::Wire);
        assert_eq!(state.cull_mode, CullMode::Clockwise);
        assert!(reports.reports().is_empty());
    }

    #[test]
    fn unknown_key_reports_error() {
        let mut program = Program::default();
        let mut state = RasterizerState::default();
        let mut reports = ReportHandler::new(true);
        let v = literal(&mut program, "1");
        reflect_rasterizer_value(&program, &entry("bogus", v), &mut state, &mut reports);
        assert_eq!(reports.reports().len(), 1);
        assert_eq!(reports.reports()[0].kind, crate::report::ReportKind::Error);
    }

    #[test]
    fn unknown_enumerator_in_state_is_error() {
        let mut program = Program::default();
        let mut state = DepthState::default();
        let mut reports = ReportHandler::new(true);
        let bad = enumerator(&mut program, "Sometimes");
        reflect_depth_value(&program, &entry("compare", bad), &mut state, &mut reports);
        assert_eq!(state.compare_func, ComparisonFunc::Less);
        assert_eq!(reports.reports().len(), 1);
        assert_eq!(reports.reports()[0].kind, crate::report::ReportKind::Error);
    }

    #[test]
    fn literal_where_enumerator_expected() {
        let mut program = Program::default();
        let mut state = DepthState::default();
        let mut reports = ReportHandler::new(true);
        let lit = literal(&mut program, "1");
        reflect_depth_value(&program, &entry("compare", lit), &mut state, &mut reports);
        assert_eq!(reports.reports().len(), 1);
    }

    #[test]
    fn sampler_filter_writes_all_three() {
        let mut program = Program::default();
        let mut state = SamplerState::default();
        let mut reports = ReportHandler::new(true);
        let aniso = enumerator(&mut program, "Anisotropic");
        reflect_sampler_value(&program, &entry("Filter", aniso), &mut state, &mut reports);
        assert_eq!(state.filter_min, Filter::Anisotropic);
        assert_eq!(state.filter_max, Filter::Anisotropic);
        assert_eq!(state.filter_mip, Filter::Anisotropic);
    }

    #[test]
    fn sampler_unknown_enumerator_is_warning() {
        let mut program = Program::default();
        let mut state = SamplerState::default();
        let mut reports = ReportHandler::new(true);
        let bad = enumerator(&mut program, "Cubic");
        reflect_sampler_value(&program, &entry("Filter", bad), &mut state, &mut reports);
        assert_eq!(state.filter_min, Filter::Linear);
        assert_eq!(reports.reports().len(), 1);
        assert_eq!(reports.reports()[0].kind, crate::report::ReportKind::Warning);
    }

    #[test]
    fn border_color_initializer_list() {
        let mut program = Program::default();
        let mut state = SamplerState::default();
        let mut reports = ReportHandler::new(true);
        let channels: Vec<_> = ["1.0", "0.5", "0.25", "0.0"]
            .iter()
            .map(|v| literal(&mut program, v))
            .collect();
        let list = program.add_expr(Expr::new(ExprKind::InitializerList { exprs: channels }));
        reflect_sampler_value(&program, &entry("BorderColor", list), &mut state, &mut reports);
        assert_eq!(state.border_color, [1.0, 0.5, 0.25, 0.0]);
        assert!(reports.reports().is_empty());
    }

    #[test]
    fn border_color_wrong_arity_warns() {
        let mut program = Program::default();
        let mut state = SamplerState::default();
        let mut reports = ReportHandler::new(true);
        let channels = vec![literal(&mut program, "1.0")];
        let list = program.add_expr(Expr::new(ExprKind::InitializerList { exprs: channels }));
        reflect_sampler_value(&program, &entry("BorderColor", list), &mut state, &mut reports);
        assert_eq!(state.border_color, [0.0; 4]);
        assert_eq!(reports.reports().len(), 1);
    }

    #[test]
    fn blend_target_cursor() {
        let mut program = Program::default();
        let mut state = BlendState::default();
        let mut reports = ReportHandler::new(true);
        let mut cursor = 0u32;

        // First target without index lands at 0.
        let on = literal(&mut program, "true");
        let init0 = program.add_expr(Expr::new(ExprKind::StateInitializer {
            values: vec![entry("enabled", on)],
        }));
        reflect_blend_value(
            &program,
            &entry("target", init0),
            &mut state,
            &mut cursor,
            &mut reports,
        );
        assert!(state.targets[0].enabled);
        assert_eq!(cursor, 1);

        // Explicit index repositions the cursor.
        let idx = literal(&mut program, "5");
        let on2 = literal(&mut program, "true");
        let init5 = program.add_expr(Expr::new(ExprKind::StateInitializer {
            values: vec![entry("index", idx), entry("enabled", on2)],
        }));
        reflect_blend_value(
            &program,
            &entry("target", init5),
            &mut state,
            &mut cursor,
            &mut reports,
        );
        assert!(state.targets[5].enabled);
        assert_eq!(cursor, 6);
        assert!(!state.targets[1].enabled);
    }

    #[test]
    fn blend_target_out_of_range_ignored() {
        let mut program = Program::default();
        let mut state = BlendState::default();
        let mut reports = ReportHandler::new(true);
        let mut cursor = 0u32;
        let idx = literal(&mut program, "8");
        let on = literal(&mut program, "true");
        let init = program.add_expr(Expr::new(ExprKind::StateInitializer {
            values: vec![entry("index", idx), entry("enabled", on)],
        }));
        reflect_blend_value(
            &program,
            &entry("target", init),
            &mut state,
            &mut cursor,
            &mut reports,
        );
        assert!(state.targets.iter().all(|t| !t.enabled));
        assert_eq!(cursor, 8);
    }

    #[test]
    fn forward_writes_transparent() {
        let mut program = Program::default();
        let mut options = GlobalOptions::default();
        let mut reports = ReportHandler::new(true);
        let on = literal(&mut program, "true");
        reflect_options_value(&program, &entry("forward", on), &mut options, &mut reports);
        assert!(options.transparent);
        assert!(!options.forward);
    }

    #[test]
    fn options_sort_mode() {
        let mut program = Program::default();
        let mut options = GlobalOptions::default();
        let mut reports = ReportHandler::new(true);
        let mode = enumerator(&mut program, "BackToFront");
        reflect_options_value(&program, &entry("sort", mode), &mut options, &mut reports);
        assert_eq!(options.sort_mode, SortMode::BackToFront);
    }
}
