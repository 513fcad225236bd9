//! End-to-end reflection coverage: binding slots, uniforms, sampler
//! states, compute attributes, and the printed rendition.

mod common;

use common::*;
use shx_ast::{
    Attribute, AttributeType, BaseTypeDenoter, DataType, DeclDefault, Expr, ExprKind,
    ExtModifiers, FunctionDecl, Program, Register, RegisterType, SamplerDecl, SamplerType,
    ShaderTarget, StateValue, Stmt, StmtKind, TypeDenoter, TypeSpecifier, UniformBufferDecl,
    VarDecl,
};
use shx_reflect::{Filter, TextureAddressMode, UniformType, VarType};

/// `[numthreads(10, 1, 1)]` on a compute entry point.
fn compute_program() -> Program {
    let mut program = Program::default();
    let args = [10, 1, 1]
        .iter()
        .map(|&n| int_literal(&mut program, n))
        .collect();
    let body = block(&mut program, vec![]);
    let entry = add_entry_point(&mut program, "main", Some(body));
    program.function_decls[entry].attributes.push(Attribute {
        kind: AttributeType::NumThreads,
        arguments: args,
    });
    program
}

#[test]
fn numthreads_reflected_for_compute_target() {
    init_logging();
    let program = compute_program();
    let (data, reports) = shx_analysis::reflect(&program, ShaderTarget::ComputeShader, true);
    assert!(reports.is_empty());
    assert_eq!(data.num_threads.x, 10);
    assert_eq!(data.num_threads.y, 1);
    assert_eq!(data.num_threads.z, 1);
}

#[test]
fn numthreads_zero_for_vertex_target() {
    let program = compute_program();
    let (data, _) = shx_analysis::reflect(&program, ShaderTarget::VertexShader, true);
    assert_eq!(data.num_threads.x, 0);
    assert_eq!(data.num_threads.y, 0);
    assert_eq!(data.num_threads.z, 0);
}

#[test]
fn numthreads_non_constant_argument_yields_zero() {
    let mut program = Program::default();
    let call = program.add_expr(Expr::new(ExprKind::Call {
        prefix: None,
        ident: "groupSize".into(),
        intrinsic: None,
        function: None,
        arguments: vec![],
    }));
    let y = int_literal(&mut program, 4);
    let z = int_literal(&mut program, 2);
    let body = block(&mut program, vec![]);
    let entry = add_entry_point(&mut program, "main", Some(body));
    program.function_decls[entry].attributes.push(Attribute {
        kind: AttributeType::NumThreads,
        arguments: vec![call, y, z],
    });

    let (data, _) = shx_analysis::reflect(&program, ShaderTarget::ComputeShader, true);
    assert_eq!(data.num_threads.x, 0);
    assert_eq!(data.num_threads.y, 4);
    assert_eq!(data.num_threads.z, 2);
}

/// `cbuffer VertexParam : register(b0) { float4x4 wvpMatrix; }`
#[test]
fn constant_buffer_reflection() {
    let mut program = Program::default();

    let member_var = program.var_decls.append(VarDecl::new(
        "wvpMatrix",
        TypeDenoter::base(DataType::Float4x4),
    ));
    let member_stmt = program.add_stmt(Stmt::new(StmtKind::VarDeclStmt {
        specifier: TypeSpecifier::new(TypeDenoter::base(DataType::Float4x4)),
        decls: vec![member_var],
    }));

    let mut cbuffer = UniformBufferDecl::new("VertexParam");
    cbuffer
        .registers
        .push(Register::new(RegisterType::ConstantBuffer, 0));
    cbuffer.members.push(member_stmt);
    let decl = program.uniform_buffer_decls.append(cbuffer);
    let stmt = program.add_stmt(Stmt::new(StmtKind::UniformBufferDeclStmt { decl }));
    program.global_stmts.push(stmt);

    let (data, reports) = shx_analysis::reflect(&program, ShaderTarget::VertexShader, true);
    assert!(reports.is_empty());

    assert_eq!(data.constant_buffers.len(), 1);
    assert_eq!(data.constant_buffers[0].ident, "VertexParam");
    assert_eq!(data.constant_buffers[0].location, 0);

    assert_eq!(data.uniforms.len(), 2);
    assert_eq!(data.uniforms[0].ident, "VertexParam");
    assert_eq!(data.uniforms[0].ty, UniformType::UniformBuffer);
    assert_eq!(data.uniforms[0].base_type, 0);
    assert_eq!(data.uniforms[1].ident, "wvpMatrix");
    assert_eq!(data.uniforms[1].ty, UniformType::Variable);
    assert_eq!(
        data.uniforms[1].base_type,
        shx_reflect::DataType::Float4x4 as i32
    );
    assert_eq!(data.uniforms[1].uniform_block, 0);
}

/// `SamplerState S { Filter = Linear; AddressU = Wrap; };`
#[test]
fn sampler_state_reflection() {
    let mut program = Program::default();

    let filter = program.add_expr(Expr::new(ExprKind::Object {
        prefix: None,
        ident: "Linear".into(),
        symbol: None,
    }));
    let address = program.add_expr(Expr::new(ExprKind::Object {
        prefix: None,
        ident: "Wrap".into(),
        symbol: None,
    }));
    let mut sampler = SamplerDecl::new("S", SamplerType::SamplerState);
    sampler.values.push(StateValue {
        name: "Filter".into(),
        value: filter,
    });
    sampler.values.push(StateValue {
        name: "AddressU".into(),
        value: address,
    });
    let decl = program.sampler_decls.append(sampler);
    let stmt = program.add_stmt(Stmt::new(StmtKind::SamplerDeclStmt {
        sampler_type: SamplerType::SamplerState,
        decls: vec![decl],
    }));
    program.global_stmts.push(stmt);

    let (data, reports) = shx_analysis::reflect(&program, ShaderTarget::FragmentShader, true);
    assert!(reports.is_empty());

    let state = &data.sampler_states["S"];
    assert_eq!(state.filter_min, Filter::Linear);
    assert_eq!(state.filter_max, Filter::Linear);
    assert_eq!(state.filter_mip, Filter::Linear);
    assert_eq!(state.address_u, TextureAddressMode::Wrap);
    assert!(state.is_non_default);

    assert_eq!(data.uniforms.len(), 1);
    assert_eq!(data.uniforms[0].ident, "S");
    assert_eq!(data.uniforms[0].ty, UniformType::Sampler);
}

#[test]
fn sampler_without_initializers_stays_default() {
    let mut program = Program::default();
    let mut sampler = SamplerDecl::new("plain", SamplerType::SamplerState);
    sampler.alias = "albedoTex".into();
    let decl = program.sampler_decls.append(sampler);
    let stmt = program.add_stmt(Stmt::new(StmtKind::SamplerDeclStmt {
        sampler_type: SamplerType::SamplerState,
        decls: vec![decl],
    }));
    program.global_stmts.push(stmt);

    let (data, _) = shx_analysis::reflect(&program, ShaderTarget::FragmentShader, true);
    let state = &data.sampler_states["plain"];
    assert!(!state.is_non_default);
    assert_eq!(state.alias, "albedoTex");
}

/// Index invariants: every `uniform_block` and `default_value` index
/// stored on a uniform resolves.
#[test]
fn uniform_indices_are_valid() {
    let mut program = Program::default();

    let member_var = program.var_decls.append(VarDecl {
        default: Some(DeclDefault::Matrix([0.5; 16])),
        ..VarDecl::new("tint", TypeDenoter::base(DataType::Float4))
    });
    let specifier = TypeSpecifier::new(TypeDenoter::Base(BaseTypeDenoter {
        data_type: DataType::Float4,
        ext_modifiers: ExtModifiers::COLOR,
        sprite_uv_ref: String::new(),
    }));
    let member_stmt = program.add_stmt(Stmt::new(StmtKind::VarDeclStmt {
        specifier,
        decls: vec![member_var],
    }));

    let mut cbuffer = UniformBufferDecl::new("MaterialParams");
    cbuffer.members.push(member_stmt);
    let decl = program.uniform_buffer_decls.append(cbuffer);
    let stmt = program.add_stmt(Stmt::new(StmtKind::UniformBufferDeclStmt { decl }));
    program.global_stmts.push(stmt);

    let (data, _) = shx_analysis::reflect(&program, ShaderTarget::FragmentShader, true);

    for uniform in &data.uniforms {
        if uniform.uniform_block >= 0 {
            assert!((uniform.uniform_block as usize) < data.constant_buffers.len());
        } else {
            assert_eq!(uniform.uniform_block, -1);
        }
        if uniform.default_value >= 0 {
            assert!((uniform.default_value as usize) < data.default_values.len());
        } else {
            assert_eq!(uniform.default_value, -1);
        }
    }

    let tint = data.uniforms.iter().find(|u| u.ident == "tint").unwrap();
    assert!(tint.flags.contains(shx_reflect::UniformFlags::COLOR));
    assert!(tint.default_value >= 0);
    match data.default_values[tint.default_value as usize] {
        shx_reflect::DefaultValue::Matrix(values) => assert_eq!(values[0], 0.5),
        ref other => panic!("expected matrix payload, got {other:?}"),
    }
    // Unbound constant buffer renders as "no location".
    assert_eq!(data.constant_buffers[0].location, -1);
}

/// The constant-buffer uniform precedes its members, so the "last
/// constant-buffer index" rule is well defined.
#[test]
fn uniform_buffer_emitted_before_members() {
    let mut program = Program::default();
    for name in ["BlockA", "BlockB"] {
        let member_var = program
            .var_decls
            .append(VarDecl::new(format!("{name}_value"), TypeDenoter::base(DataType::Float)));
        let member_stmt = program.add_stmt(Stmt::new(StmtKind::VarDeclStmt {
            specifier: TypeSpecifier::new(TypeDenoter::base(DataType::Float)),
            decls: vec![member_var],
        }));
        let mut cbuffer = UniformBufferDecl::new(name);
        cbuffer.members.push(member_stmt);
        let decl = program.uniform_buffer_decls.append(cbuffer);
        let stmt = program.add_stmt(Stmt::new(StmtKind::UniformBufferDeclStmt { decl }));
        program.global_stmts.push(stmt);
    }

    let (data, _) = shx_analysis::reflect(&program, ShaderTarget::VertexShader, true);
    let idents: Vec<&str> = data.uniforms.iter().map(|u| u.ident.as_str()).collect();
    assert_eq!(
        idents,
        vec!["BlockA", "BlockA_value", "BlockB", "BlockB_value"]
    );
    assert_eq!(data.uniforms[1].uniform_block, 0);
    assert_eq!(data.uniforms[3].uniform_block, 1);
}

#[test]
fn entry_point_io_attributes() {
    let mut program = Program::default();

    let mut coord = VarDecl::new("coord", TypeDenoter::base(DataType::Float4));
    coord.semantic = shx_ast::IndexedSemantic::user_defined("TEXCOORD2");
    let coord = program.var_decls.append(coord);

    let mut vertex_id = VarDecl::new("vid", TypeDenoter::base(DataType::UInt));
    vertex_id.semantic = shx_ast::IndexedSemantic::new(shx_ast::Semantic::VertexId, 0);
    let vertex_id = program.var_decls.append(vertex_id);

    let body = block(&mut program, vec![]);
    let entry = add_entry_point(&mut program, "VS", Some(body));
    program.function_decls[entry].input_semantics.var_refs.push(coord);
    program.function_decls[entry]
        .input_semantics
        .var_refs_sv
        .push(vertex_id);

    let (data, _) = shx_analysis::reflect(&program, ShaderTarget::VertexShader, true);
    assert_eq!(data.input_attributes.len(), 2);
    // user-named partition keeps the identifier
    assert_eq!(data.input_attributes[0].ident, "coord");
    assert_eq!(data.input_attributes[0].location, 2);
    // system-value partition uses the semantic name
    assert_eq!(data.input_attributes[1].ident, "SV_VertexID0");
}

#[test]
fn printed_rendition_contains_all_sections() {
    let mut program = compute_program();

    let buffer = program.buffer_decls.append(shx_ast::BufferDecl {
        registers: vec![Register::new(RegisterType::TextureBuffer, 1)],
        ..shx_ast::BufferDecl::new(
            "heightMap",
            shx_ast::BufferTypeDenoter::new(shx_ast::BufferType::Texture2D),
        )
    });
    let stmt = program.add_stmt(Stmt::new(StmtKind::BufferDeclStmt {
        ty: shx_ast::BufferTypeDenoter::new(shx_ast::BufferType::Texture2D),
        decls: vec![buffer],
    }));
    program.global_stmts.push(stmt);

    let (data, _) = shx_analysis::reflect(&program, ShaderTarget::ComputeShader, true);
    let text = shx_reflect::print_reflection(&data);

    let sections = [
        "Macros:",
        "Textures:",
        "Storage Buffers:",
        "Constant Buffers:",
        "Input Attributes:",
        "Output Attributes:",
        "Sampler States:",
        "Rasterizer state:",
        "Depth state:",
        "Stencil state:",
        "Blend state:",
        "Global options:",
        "Number of Threads:",
    ];
    let mut cursor = 0;
    for section in sections {
        let found = text[cursor..]
            .find(section)
            .unwrap_or_else(|| panic!("section '{section}' missing or out of order"));
        cursor += found;
    }
    assert!(text.contains("1: heightMap"));
    assert!(text.contains("X = 10"));
}

#[test]
fn functions_recorded_for_every_declaration() {
    let mut program = Program::default();
    let helper = FunctionDecl::new(
        "brighten",
        TypeSpecifier::new(TypeDenoter::base(DataType::Float3)),
    );
    add_function(&mut program, helper, None);
    let body = block(&mut program, vec![]);
    add_entry_point(&mut program, "PS", Some(body));

    let (data, _) = shx_analysis::reflect(&program, ShaderTarget::FragmentShader, true);
    assert_eq!(data.functions.len(), 2);
    assert_eq!(data.functions[0].ident, "brighten");
    assert_eq!(data.functions[0].return_value, VarType::Float3);
    assert_eq!(data.functions[1].ident, "PS");
    assert_eq!(data.functions[1].return_value, VarType::Void);
}

#[test]
fn state_decl_errors_do_not_abort() {
    let mut program = Program::default();
    let bogus = program.add_expr(Expr::new(ExprKind::Literal {
        data_type: DataType::Int,
        value: "1".into(),
    }));
    let good = program.add_expr(Expr::new(ExprKind::Literal {
        data_type: DataType::Bool,
        value: "true".into(),
    }));
    let init = program.add_expr(Expr::new(ExprKind::StateInitializer {
        values: vec![
            StateValue {
                name: "nonsense".into(),
                value: bogus,
            },
            StateValue {
                name: "scissor".into(),
                value: good,
            },
        ],
    }));
    let stmt = program.add_stmt(Stmt::new(StmtKind::StateDeclStmt {
        state_type: shx_ast::StateType::Rasterizer,
        initializer: Some(init),
    }));
    program.global_stmts.push(stmt);

    let (data, reports) = shx_analysis::reflect(&program, ShaderTarget::FragmentShader, true);
    // the unknown key is reported, the valid key still lands
    assert_eq!(reports.len(), 1);
    assert!(data.rasterizer_state.scissor_enable);
}
