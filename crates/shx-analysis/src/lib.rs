//! Reflection analyzer.
//!
//! Walks an elaborated program (active and preprocessor-disabled code
//! alike) and fills a [`ReflectionData`] record with the shader's
//! externally visible surface. The pass never mutates the AST and
//! never aborts: mismatches accumulate as [`Report`]s.

mod report;
mod state;

pub use report::{Report, ReportHandler, ReportKind};

use shx_ast::visit::{self, Visitor};
use shx_ast::{
    AttributeType, DeclDefault, ExprKind, FunctionDecl, Handle, Program, Register, SamplerDecl,
    ShaderTarget, StateType, Stmt, StmtKind, TypeSpecifier, UniformBufferDecl, eval,
};
use shx_reflect::{
    BindingSlot, DefaultValue, Function, Parameter, ParameterFlags, ReflectionData, SamplerState,
    Uniform, UniformFlags, UniformType, VarType,
};

/// Runs reflection over a program for the given shader target.
pub fn reflect(
    program: &Program,
    target: ShaderTarget,
    enable_warnings: bool,
) -> (ReflectionData, Vec<Report>) {
    Analyzer::new(target, enable_warnings).reflect(program)
}

/// The reflection pass. One instance handles one compilation.
pub struct Analyzer {
    target: ShaderTarget,
    data: ReflectionData,
    reports: ReportHandler,
}

impl Analyzer {
    pub fn new(target: ShaderTarget, enable_warnings: bool) -> Self {
        Self {
            target,
            data: ReflectionData::default(),
            reports: ReportHandler::new(enable_warnings),
        }
    }

    /// Consumes the analyzer and returns the filled record plus the
    /// accumulated reports.
    pub fn reflect(mut self, program: &Program) -> (ReflectionData, Vec<Report>) {
        self.visit_program(program);
        (self.data, self.reports.into_reports())
    }

    /// The binding location of the register list for the current
    /// target, or -1 when no register matches.
    fn binding_point(&self, registers: &[Register]) -> i32 {
        Register::for_target(registers, self.target)
            .map(|r| r.slot)
            .unwrap_or(-1)
    }

    fn eval_int(&self, program: &Program, expr: shx_ast::Handle<shx_ast::Expr>) -> i32 {
        eval::evaluate_or_default(program, expr, eval::Variant::Int(0)).to_int() as i32
    }

    fn reflect_entry_point_attributes(&mut self, program: &Program, func: &FunctionDecl) {
        for attribute in &func.attributes {
            if attribute.kind != AttributeType::NumThreads {
                continue;
            }
            if self.target == ShaderTarget::ComputeShader && attribute.arguments.len() == 3 {
                self.data.num_threads.x = self.eval_int(program, attribute.arguments[0]);
                self.data.num_threads.y = self.eval_int(program, attribute.arguments[1]);
                self.data.num_threads.z = self.eval_int(program, attribute.arguments[2]);
            }
        }
    }

    fn reflect_state_decl(
        &mut self,
        program: &Program,
        state_type: StateType,
        initializer: Option<shx_ast::Handle<shx_ast::Expr>>,
    ) {
        let Some(init) = initializer else {
            return;
        };
        let ExprKind::StateInitializer { values } = &program.exprs[init].kind else {
            return;
        };
        match state_type {
            StateType::Rasterizer => {
                for value in values {
                    state::reflect_rasterizer_value(
                        program,
                        value,
                        &mut self.data.rasterizer_state,
                        &mut self.reports,
                    );
                }
            }
            StateType::Depth => {
                for value in values {
                    state::reflect_depth_value(
                        program,
                        value,
                        &mut self.data.depth_state,
                        &mut self.reports,
                    );
                }
            }
            StateType::Stencil => {
                for value in values {
                    state::reflect_stencil_value(
                        program,
                        value,
                        &mut self.data.stencil_state,
                        &mut self.reports,
                    );
                }
            }
            StateType::Blend => {
                let mut target_index = 0u32;
                for value in values {
                    state::reflect_blend_value(
                        program,
                        value,
                        &mut self.data.blend_state,
                        &mut target_index,
                        &mut self.reports,
                    );
                }
            }
            StateType::Options => {
                for value in values {
                    state::reflect_options_value(
                        program,
                        value,
                        &mut self.data.global_options,
                        &mut self.reports,
                    );
                }
            }
            StateType::Undefined => {}
        }
    }

    fn reflect_uniform_buffer_members(&mut self, program: &Program, decl: &UniformBufferDecl) {
        let block_index = self.data.constant_buffers.len() as i32 - 1;
        for &member in &decl.members {
            let StmtKind::VarDeclStmt { specifier, decls } = &program.stmts[member].kind else {
                continue;
            };
            let (uniform_type, base_denoter) = if specifier.ty.is_struct() {
                (UniformType::Struct, None)
            } else {
                (UniformType::Variable, specifier.ty.as_base())
            };
            let base_type = base_denoter
                .map(|b| data_type_to_reflection(b.data_type))
                .unwrap_or(shx_reflect::DataType::Undefined);

            for &var_handle in decls {
                let var = &program.var_decls[var_handle];
                let mut uniform = Uniform::new(&var.ident, uniform_type);
                uniform.base_type = base_type as i32;
                uniform.uniform_block = block_index;

                if let Some(base) = base_denoter {
                    if base.ext_modifiers.contains(shx_ast::ExtModifiers::INTERNAL) {
                        uniform.flags |= UniformFlags::INTERNAL;
                    }
                    if base.ext_modifiers.contains(shx_ast::ExtModifiers::COLOR) {
                        uniform.flags |= UniformFlags::COLOR;
                    }
                    uniform.sprite_uv_ref = base.sprite_uv_ref.clone();

                    if let Some(default) = var.default {
                        uniform.default_value = self.data.default_values.len() as i32;
                        self.data.default_values.push(match default {
                            DeclDefault::Matrix(values) => DefaultValue::Matrix(values),
                            DeclDefault::Handle(handle) => DefaultValue::Handle(handle),
                        });
                    }
                }

                self.data.uniforms.push(uniform);
            }
        }
    }
}

impl Visitor for Analyzer {
    fn visit_program(&mut self, program: &Program) {
        // Reflection stays complete in the presence of
        // preprocessor-disabled code.
        for &stmt in &program.global_stmts {
            self.visit_stmt(program, stmt);
        }
        for &stmt in &program.disabled_stmts {
            self.visit_stmt(program, stmt);
        }

        if let Some(entry_point) = program.entry_point_ref() {
            for &var in &entry_point.input_semantics.var_refs {
                let decl = &program.var_decls[var];
                self.data
                    .input_attributes
                    .push(BindingSlot::new(decl.ident.clone(), decl.semantic.index()));
            }
            for &var in &entry_point.input_semantics.var_refs_sv {
                let decl = &program.var_decls[var];
                self.data.input_attributes.push(BindingSlot::new(
                    decl.semantic.to_string(),
                    decl.semantic.index(),
                ));
            }
            for &var in &entry_point.output_semantics.var_refs {
                let decl = &program.var_decls[var];
                self.data
                    .output_attributes
                    .push(BindingSlot::new(decl.ident.clone(), decl.semantic.index()));
            }
            for &var in &entry_point.output_semantics.var_refs_sv {
                let decl = &program.var_decls[var];
                self.data.output_attributes.push(BindingSlot::new(
                    decl.semantic.to_string(),
                    decl.semantic.index(),
                ));
            }
            if entry_point.semantic.is_system_value() {
                self.data.output_attributes.push(BindingSlot::new(
                    entry_point.semantic.to_string(),
                    entry_point.semantic.index(),
                ));
            }
        }
    }

    fn visit_stmt(&mut self, program: &Program, stmt: Handle<Stmt>) {
        if let StmtKind::StateDeclStmt {
            state_type,
            initializer,
        } = &program.stmts[stmt].kind
        {
            self.reflect_state_decl(program, *state_type, *initializer);
            return;
        }
        visit::walk_stmt(self, program, stmt);
    }

    fn visit_sampler_decl(&mut self, program: &Program, decl: Handle<SamplerDecl>) {
        let sampler = &program.sampler_decls[decl];

        let mut sampler_state = SamplerState::default();
        for value in &sampler.values {
            state::reflect_sampler_value(program, value, &mut sampler_state, &mut self.reports);
            sampler_state.is_non_default = true;
        }
        sampler_state.alias = sampler.alias.clone();
        self.data
            .sampler_states
            .insert(sampler.ident.clone(), sampler_state);

        self.data
            .uniforms
            .push(Uniform::new(&sampler.ident, UniformType::Sampler));
    }

    fn visit_function_decl(&mut self, program: &Program, decl: Handle<FunctionDecl>) {
        let func = &program.function_decls[decl];

        if func.is_entry_point() {
            self.reflect_entry_point_attributes(program, func);
        }

        let mut function = Function {
            ident: func.ident.clone(),
            return_value: specifier_var_type(&func.return_type),
            parameters: Vec::new(),
        };

        for &param in &func.parameters {
            let StmtKind::VarDeclStmt { specifier, decls } = &program.stmts[param].kind else {
                continue;
            };
            let Some(&first) = decls.first() else {
                continue;
            };
            let mut flags = ParameterFlags::NONE;
            if specifier.is_input() {
                flags |= ParameterFlags::IN;
            }
            if specifier.is_output() {
                flags |= ParameterFlags::OUT;
            }
            function.parameters.push(Parameter {
                ty: specifier_var_type(specifier),
                ident: program.var_decls[first].ident.clone(),
                flags,
            });
        }

        self.data.functions.push(function);

        visit::walk_function_decl(self, program, decl);
    }

    fn visit_uniform_buffer_decl(&mut self, program: &Program, decl: Handle<UniformBufferDecl>) {
        let buffer = &program.uniform_buffer_decls[decl];

        self.data.constant_buffers.push(BindingSlot::new(
            buffer.ident.clone(),
            self.binding_point(&buffer.registers),
        ));

        let mut uniform = Uniform::new(&buffer.ident, UniformType::UniformBuffer);
        if buffer
            .ext_modifiers
            .contains(shx_ast::ExtModifiers::INTERNAL)
        {
            uniform.flags |= UniformFlags::INTERNAL;
        }
        self.data.uniforms.push(uniform);

        self.reflect_uniform_buffer_members(program, buffer);
    }

    fn visit_buffer_decl(&mut self, program: &Program, decl: Handle<shx_ast::BufferDecl>) {
        let buffer = &program.buffer_decls[decl];

        let slot = BindingSlot::new(buffer.ident.clone(), self.binding_point(&buffer.registers));
        if buffer.ty.buffer_type.is_storage_buffer() {
            self.data.storage_buffers.push(slot);
        } else {
            self.data.textures.push(slot);
        }

        let mut uniform = Uniform::new(&buffer.ident, UniformType::Buffer);
        uniform.base_type = buffer_type_to_reflection(buffer.ty.buffer_type) as i32;
        if buffer
            .ty
            .ext_modifiers
            .contains(shx_ast::ExtModifiers::INTERNAL)
        {
            uniform.flags |= UniformFlags::INTERNAL;
        }
        if buffer
            .ty
            .ext_modifiers
            .contains(shx_ast::ExtModifiers::COLOR)
        {
            uniform.flags |= UniformFlags::COLOR;
        }
        if let Some(DeclDefault::Handle(handle)) = buffer.default {
            uniform.default_value = self.data.default_values.len() as i32;
            self.data.default_values.push(DefaultValue::Handle(handle));
        }
        self.data.uniforms.push(uniform);
    }
}

/// The reflected variable type of a type specifier: void and base
/// types map directly, everything else collapses to `Undefined`.
fn specifier_var_type(specifier: &TypeSpecifier) -> VarType {
    if specifier.ty.is_void() {
        return VarType::Void;
    }
    specifier
        .ty
        .as_base()
        .map(|b| data_type_to_var_type(b.data_type))
        .unwrap_or(VarType::Undefined)
}

macro_rules! numeric_type_map {
    ($fn_name:ident -> $dst:ty) => {
        fn $fn_name(t: shx_ast::DataType) -> $dst {
            use shx_ast::DataType as Src;
            numeric_type_map!(@arms t, Src, $dst;
                Bool, Int, UInt, Half, Float, Double,
                Bool2, Bool3, Bool4, Int2, Int3, Int4, UInt2, UInt3, UInt4,
                Half2, Half3, Half4, Float2, Float3, Float4,
                Double2, Double3, Double4,
                Bool2x2, Bool2x3, Bool2x4, Bool3x2, Bool3x3, Bool3x4,
                Bool4x2, Bool4x3, Bool4x4,
                Int2x2, Int2x3, Int2x4, Int3x2, Int3x3, Int3x4,
                Int4x2, Int4x3, Int4x4,
                UInt2x2, UInt2x3, UInt2x4, UInt3x2, UInt3x3, UInt3x4,
                UInt4x2, UInt4x3, UInt4x4,
                Half2x2, Half2x3, Half2x4, Half3x2, Half3x3, Half3x4,
                Half4x2, Half4x3, Half4x4,
                Float2x2, Float2x3, Float2x4, Float3x2, Float3x3, Float3x4,
                Float4x2, Float4x3, Float4x4,
                Double2x2, Double2x3, Double2x4, Double3x2, Double3x3, Double3x4,
                Double4x2, Double4x3, Double4x4)
        }
    };
    (@arms $t:ident, $src:ty, $dst:ty; $($variant:ident),+) => {
        match $t {
            $(<$src>::$variant => <$dst>::$variant,)+
            _ => <$dst>::Undefined,
        }
    };
}

numeric_type_map!(data_type_to_reflection -> shx_reflect::DataType);
numeric_type_map!(data_type_to_var_type -> VarType);

/// Maps an AST buffer kind onto the reflection buffer-type code.
fn buffer_type_to_reflection(t: shx_ast::BufferType) -> shx_reflect::BufferType {
    use shx_ast::BufferType as Src;
    use shx_reflect::BufferType as Dst;
    match t {
        Src::Buffer => Dst::Buffer,
        Src::StructuredBuffer => Dst::StructuredBuffer,
        Src::ByteAddressBuffer => Dst::ByteAddressBuffer,
        Src::RwBuffer => Dst::RWBuffer,
        Src::RwStructuredBuffer => Dst::RWStructuredBuffer,
        Src::RwByteAddressBuffer => Dst::RWByteAddressBuffer,
        Src::AppendStructuredBuffer => Dst::AppendStructuredBuffer,
        Src::ConsumeStructuredBuffer => Dst::ConsumeStructuredBuffer,
        Src::RwTexture1D => Dst::RWTexture1D,
        Src::RwTexture1DArray => Dst::RWTexture1DArray,
        Src::RwTexture2D => Dst::RWTexture2D,
        Src::RwTexture2DArray => Dst::RWTexture2DArray,
        Src::RwTexture3D => Dst::RWTexture3D,
        Src::Texture1D => Dst::Texture1D,
        Src::Texture1DArray => Dst::Texture1DArray,
        Src::Texture2D => Dst::Texture2D,
        Src::Texture2DArray => Dst::Texture2DArray,
        Src::Texture3D => Dst::Texture3D,
        Src::TextureCube => Dst::TextureCube,
        Src::TextureCubeArray => Dst::TextureCubeArray,
        Src::Texture2DMs => Dst::Texture2DMS,
        Src::Texture2DMsArray => Dst::Texture2DMSArray,
        _ => Dst::Undefined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shx_ast::{
        BufferTypeDenoter, DataType, Expr, ExprKind, RegisterType, TypeDenoter, VarDecl,
    };

    #[test]
    fn type_maps_follow_numbering() {
        assert_eq!(
            data_type_to_reflection(DataType::Float4x4),
            shx_reflect::DataType::Float4x4
        );
        assert_eq!(
            data_type_to_reflection(DataType::Undefined),
            shx_reflect::DataType::Undefined
        );
        assert_eq!(
            data_type_to_reflection(DataType::String),
            shx_reflect::DataType::Undefined
        );
        assert_eq!(data_type_to_var_type(DataType::Half3), VarType::Half3);
        assert_eq!(
            buffer_type_to_reflection(shx_ast::BufferType::RwTexture2D),
            shx_reflect::BufferType::RWTexture2D
        );
    }

    #[test]
    fn binding_point_prefers_target_register() {
        let analyzer = Analyzer::new(ShaderTarget::FragmentShader, false);
        let registers = vec![
            Register {
                ty: RegisterType::TextureBuffer,
                slot: 3,
                shader_target: Some(ShaderTarget::FragmentShader),
            },
            Register::new(RegisterType::TextureBuffer, 1),
        ];
        assert_eq!(analyzer.binding_point(&registers), 3);
        assert_eq!(analyzer.binding_point(&[]), -1);
    }

    #[test]
    fn buffer_decl_splits_textures_and_storage() {
        let mut program = Program::default();
        let texture = program.buffer_decls.append(shx_ast::BufferDecl::new(
            "colorMap",
            BufferTypeDenoter::new(shx_ast::BufferType::Texture2D),
        ));
        let storage = program.buffer_decls.append(shx_ast::BufferDecl::new(
            "particles",
            BufferTypeDenoter::new(shx_ast::BufferType::RwStructuredBuffer),
        ));
        let stmt = program.add_stmt(shx_ast::Stmt::new(StmtKind::BufferDeclStmt {
            ty: BufferTypeDenoter::new(shx_ast::BufferType::Texture2D),
            decls: vec![texture],
        }));
        let stmt2 = program.add_stmt(shx_ast::Stmt::new(StmtKind::BufferDeclStmt {
            ty: BufferTypeDenoter::new(shx_ast::BufferType::RwStructuredBuffer),
            decls: vec![storage],
        }));
        program.global_stmts.push(stmt);
        program.global_stmts.push(stmt2);

        let (data, reports) = reflect(&program, ShaderTarget::FragmentShader, true);
        assert!(reports.is_empty());
        assert_eq!(data.textures.len(), 1);
        assert_eq!(data.textures[0].ident, "colorMap");
        assert_eq!(data.storage_buffers.len(), 1);
        assert_eq!(data.storage_buffers[0].ident, "particles");
        assert_eq!(data.uniforms.len(), 2);
        assert_eq!(data.uniforms[0].ty, UniformType::Buffer);
        assert_eq!(
            data.uniforms[0].base_type,
            shx_reflect::BufferType::Texture2D as i32
        );
    }

    #[test]
    fn disabled_statements_still_reflected() {
        let mut program = Program::default();
        let values = vec![shx_ast::StateValue {
            name: "scissor".into(),
            value: program.add_expr(Expr::new(ExprKind::Literal {
                data_type: DataType::Bool,
                value: "true".into(),
            })),
        }];
        let init = program.add_expr(Expr::new(ExprKind::StateInitializer { values }));
        let stmt = program.add_stmt(shx_ast::Stmt::new(StmtKind::StateDeclStmt {
            state_type: StateType::Rasterizer,
            initializer: Some(init),
        }));
        program.disabled_stmts.push(stmt);

        let (data, _) = reflect(&program, ShaderTarget::VertexShader, true);
        assert!(data.rasterizer_state.scissor_enable);
    }

    #[test]
    fn entry_point_return_semantic_reflected() {
        let mut program = Program::default();
        let mut func = FunctionDecl::new(
            "main",
            TypeSpecifier::new(TypeDenoter::base(DataType::Float4)),
        );
        func.flags.insert(shx_ast::AstFlags::ENTRY_POINT);
        func.semantic = shx_ast::IndexedSemantic::new(shx_ast::Semantic::Target, 0);
        let handle = program.function_decls.append(func);
        let stmt = program.add_stmt(shx_ast::Stmt::new(StmtKind::FunctionDeclStmt {
            decl: handle,
        }));
        program.global_stmts.push(stmt);
        program.entry_point = Some(handle);

        let (data, _) = reflect(&program, ShaderTarget::FragmentShader, true);
        assert_eq!(data.output_attributes.len(), 1);
        assert_eq!(data.output_attributes[0].ident, "SV_Target0");
        assert_eq!(data.output_attributes[0].location, 0);
        assert_eq!(data.functions.len(), 1);
        assert_eq!(data.functions[0].return_value, VarType::Float4);
    }

    #[test]
    fn function_parameters_direction_flags() {
        let mut program = Program::default();
        let param_var = program
            .var_decls
            .append(VarDecl::new("amount", TypeDenoter::base(DataType::Float)));
        let mut specifier = TypeSpecifier::new(TypeDenoter::base(DataType::Float));
        specifier.output = true;
        let param = program.add_stmt(shx_ast::Stmt::new(StmtKind::VarDeclStmt {
            specifier,
            decls: vec![param_var],
        }));
        let mut func = FunctionDecl::new("helper", TypeSpecifier::new(TypeDenoter::Void));
        func.parameters.push(param);
        let handle = program.function_decls.append(func);
        let stmt = program.add_stmt(shx_ast::Stmt::new(StmtKind::FunctionDeclStmt {
            decl: handle,
        }));
        program.global_stmts.push(stmt);

        let (data, _) = reflect(&program, ShaderTarget::VertexShader, true);
        assert_eq!(data.functions.len(), 1);
        let func = &data.functions[0];
        assert_eq!(func.return_value, VarType::Void);
        assert_eq!(func.parameters.len(), 1);
        assert!(func.parameters[0].flags.contains(ParameterFlags::OUT));
        assert!(!func.parameters[0].flags.contains(ParameterFlags::IN));
    }
}
