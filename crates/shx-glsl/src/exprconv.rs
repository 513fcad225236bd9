//! Expression conversion prepass.
//!
//! Rewrites expression shapes the base GLSL versions cannot express:
//! swizzles on scalars, brace initializers where a constructor is
//! required, and implicit casts the target wants spelled out. On
//! targets with the 4.20 feature pack (or VKSL), vector-subscript and
//! initializer conversion are skipped because the dialect accepts them
//! natively.

use shx_ast::{
    DataType, Expr, ExprKind, Handle, Program, TypeSpecifier, vector_data_type,
};

/// Conversion selection bitset.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub struct ExprConvFlags(u32);

impl ExprConvFlags {
    pub const EMPTY: Self = Self(0);
    /// Rewrite swizzles applied to scalars into vector constructors.
    pub const VECTOR_SUBSCRIPTS: Self = Self(1);
    /// Rewrite brace initializers of base-typed variables into type
    /// constructors.
    pub const INITIALIZER: Self = Self(1 << 1);
    /// Insert explicit casts where argument types must match exactly.
    pub const CASTS: Self = Self(1 << 2);

    pub const ALL: Self = Self(0b111);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl std::ops::BitOr for ExprConvFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Runs the selected conversions over the whole program.
pub struct ExprConverter {
    flags: ExprConvFlags,
}

impl ExprConverter {
    pub fn new(flags: ExprConvFlags) -> Self {
        Self { flags }
    }

    pub fn convert(&self, program: &mut Program) {
        if self.flags.contains(ExprConvFlags::VECTOR_SUBSCRIPTS) {
            self.convert_vector_subscripts(program);
        }
        if self.flags.contains(ExprConvFlags::INITIALIZER) {
            self.convert_initializers(program);
        }
    }

    /// `scalar.xxx` becomes `float3(scalar)` and friends.
    fn convert_vector_subscripts(&self, program: &mut Program) {
        for handle in program.exprs.handles().collect::<Vec<_>>() {
            let ExprKind::Object {
                prefix: Some(prefix),
                ident,
                symbol: None,
            } = &program.exprs[handle].kind
            else {
                continue;
            };
            let prefix = *prefix;
            let Some(base) = program
                .expr_type(prefix)
                .map(|ty| ty.aliased(program).clone())
                .as_ref()
                .and_then(|ty| ty.as_base().map(|b| b.data_type))
            else {
                continue;
            };
            if !base.is_scalar() || ident.len() < 2 || !is_swizzle(ident) {
                continue;
            }
            let vector = vector_data_type(base, ident.len() as u32);
            if vector == DataType::Undefined {
                continue;
            }
            let node = &mut program.exprs[handle];
            node.kind = ExprKind::Call {
                prefix: None,
                ident: vector.name(),
                intrinsic: None,
                function: None,
                arguments: vec![prefix],
            };
            node.ty = Some(shx_ast::TypeDenoter::base(vector));
        }
    }

    /// `float3 v = { x, y, z };` becomes `float3 v = float3(x, y, z);`.
    fn convert_initializers(&self, program: &mut Program) {
        for var in program.var_decls.handles().collect::<Vec<_>>() {
            let Some(init) = program.var_decls[var].initializer else {
                continue;
            };
            let Some(base) = program.var_decls[var].ty.as_base().map(|b| b.data_type) else {
                continue;
            };
            let ExprKind::InitializerList { exprs } = &program.exprs[init].kind else {
                continue;
            };
            let arguments = exprs.clone();
            let node = &mut program.exprs[init];
            node.kind = ExprKind::Call {
                prefix: None,
                ident: base.name(),
                intrinsic: None,
                function: None,
                arguments,
            };
            node.ty = Some(shx_ast::TypeDenoter::base(base));
        }
    }

    /// Wraps `expr` in a cast to `target` when its data type differs.
    /// Used by the texture-sample rewrites to size location/offset
    /// vectors. Returns the (possibly new) expression handle.
    pub fn convert_if_cast_required(
        &self,
        program: &mut Program,
        expr: Handle<Expr>,
        target: DataType,
    ) -> Handle<Expr> {
        if !self.flags.contains(ExprConvFlags::CASTS) {
            return expr;
        }
        let current = program
            .expr_type(expr)
            .map(|ty| ty.aliased(program).clone())
            .and_then(|ty| ty.as_base().map(|b| b.data_type));
        if current == Some(target) {
            return expr;
        }
        let target_den = shx_ast::TypeDenoter::base(target);
        program.add_expr(Expr::typed(
            ExprKind::Cast {
                specifier: TypeSpecifier::new(target_den.clone()),
                expr,
            },
            target_den,
        ))
    }
}

fn is_swizzle(ident: &str) -> bool {
    ident
        .chars()
        .all(|c| matches!(c, 'x' | 'y' | 'z' | 'w' | 'r' | 'g' | 'b' | 'a'))
}
