//! Constant-expression evaluation.
//!
//! Folds literal arithmetic for the places that need a compile-time
//! value: `numthreads` arguments, border colors, blend target indices.
//! Anything that does not reduce yields the caller's default.

use crate::arena::Handle;
use crate::decl::Program;
use crate::expr::{Expr, ExprKind};
use crate::op::{BinaryOp, UnaryOp};
use crate::types::DataType;

/// A scalar constant: the value space of literal parsing and folding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Variant {
    Bool(bool),
    Int(i64),
    Real(f64),
}

impl Variant {
    /// Parses a scanned literal spelling.
    ///
    /// Accepts `true`/`false`, decimal and `0x` integers, and reals
    /// with an optional `f`/`F`/`h`/`H` suffix. Returns `None` for
    /// malformed spellings.
    pub fn parse(s: &str) -> Option<Variant> {
        match s {
            "true" => return Some(Variant::Bool(true)),
            "false" => return Some(Variant::Bool(false)),
            _ => {}
        }
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return i64::from_str_radix(hex, 16).ok().map(Variant::Int);
        }
        let trimmed = s.strip_suffix(['f', 'F', 'h', 'H']).unwrap_or(s);
        if trimmed.contains(['.', 'e', 'E']) || trimmed != s {
            return trimmed.parse().ok().map(Variant::Real);
        }
        trimmed.parse().ok().map(Variant::Int)
    }

    /// Integer reading: booleans are 0/1, reals truncate.
    pub fn to_int(self) -> i64 {
        match self {
            Self::Bool(b) => b as i64,
            Self::Int(i) => i,
            Self::Real(r) => r as i64,
        }
    }

    /// Real reading.
    pub fn to_real(self) -> f64 {
        match self {
            Self::Bool(b) => b as i64 as f64,
            Self::Int(i) => i as f64,
            Self::Real(r) => r,
        }
    }

    /// Boolean reading: non-zero is true.
    pub fn to_bool(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Int(i) => i != 0,
            Self::Real(r) => r != 0.0,
        }
    }

    fn is_real(self) -> bool {
        matches!(self, Self::Real(_))
    }
}

/// Evaluates `expr` to a constant, or `None` if it does not reduce.
pub fn evaluate(program: &Program, expr: Handle<Expr>) -> Option<Variant> {
    let node: &Expr = &program.exprs[expr];
    match &node.kind {
        ExprKind::Literal { value, .. } => Variant::parse(value),
        ExprKind::Bracket { expr } => evaluate(program, *expr),
        ExprKind::Unary { op, expr } => {
            let value = evaluate(program, *expr)?;
            Some(match op {
                UnaryOp::Nop => value,
                UnaryOp::Negate => match value {
                    Variant::Bool(b) => Variant::Int(-(b as i64)),
                    Variant::Int(i) => Variant::Int(-i),
                    Variant::Real(r) => Variant::Real(-r),
                },
                UnaryOp::LogicalNot => Variant::Bool(!value.to_bool()),
                UnaryOp::Not => Variant::Int(!value.to_int()),
                // ++/-- need an l-value; not constant
                UnaryOp::Inc | UnaryOp::Dec => return None,
            })
        }
        ExprKind::Binary { op, lhs, rhs } => {
            let lhs = evaluate(program, *lhs)?;
            let rhs = evaluate(program, *rhs)?;
            evaluate_binary(*op, lhs, rhs)
        }
        ExprKind::Cast { specifier, expr } => {
            let value = evaluate(program, *expr)?;
            let base = specifier.ty.as_base()?.data_type;
            Some(coerce(value, base))
        }
        // A constant variable folds through its initializer.
        ExprKind::Object { symbol, prefix, .. } => {
            if prefix.is_some() {
                return None;
            }
            let var = symbol.and_then(crate::expr::SymbolRef::as_var)?;
            let init = program.var_decls[var].initializer?;
            evaluate(program, init)
        }
        _ => None,
    }
}

/// Evaluates `expr`, substituting `default` if it does not reduce.
pub fn evaluate_or_default(program: &Program, expr: Handle<Expr>, default: Variant) -> Variant {
    evaluate(program, expr).unwrap_or(default)
}

fn evaluate_binary(op: BinaryOp, lhs: Variant, rhs: Variant) -> Option<Variant> {
    if op.is_logical() {
        let result = match op {
            BinaryOp::LogicalAnd => lhs.to_bool() && rhs.to_bool(),
            _ => lhs.to_bool() || rhs.to_bool(),
        };
        return Some(Variant::Bool(result));
    }
    if op.is_compare() {
        let (a, b) = (lhs.to_real(), rhs.to_real());
        let result = match op {
            BinaryOp::Equal => a == b,
            BinaryOp::NotEqual => a != b,
            BinaryOp::Less => a < b,
            BinaryOp::Greater => a > b,
            BinaryOp::LessEqual => a <= b,
            _ => a >= b,
        };
        return Some(Variant::Bool(result));
    }
    if op.is_bitwise() {
        let (a, b) = (lhs.to_int(), rhs.to_int());
        let result = match op {
            BinaryOp::Or => a | b,
            BinaryOp::Xor => a ^ b,
            BinaryOp::And => a & b,
            BinaryOp::Shl => a.checked_shl(b.try_into().ok()?)?,
            _ => a.checked_shr(b.try_into().ok()?)?,
        };
        return Some(Variant::Int(result));
    }
    if lhs.is_real() || rhs.is_real() {
        let (a, b) = (lhs.to_real(), rhs.to_real());
        let result = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Mod => a % b,
            _ => return None,
        };
        Some(Variant::Real(result))
    } else {
        let (a, b) = (lhs.to_int(), rhs.to_int());
        let result = match op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div => a.checked_div(b)?,
            BinaryOp::Mod => a.checked_rem(b)?,
            _ => return None,
        };
        Some(Variant::Int(result))
    }
}

fn coerce(value: Variant, base: DataType) -> Variant {
    match base.base() {
        DataType::Bool => Variant::Bool(value.to_bool()),
        DataType::Int | DataType::UInt => Variant::Int(value.to_int()),
        DataType::Half | DataType::Float | DataType::Double => Variant::Real(value.to_real()),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{TypeSpecifier, VarDecl};
    use crate::denoter::TypeDenoter;
    use crate::expr::SymbolRef;

    fn lit(program: &mut Program, data_type: DataType, value: &str) -> Handle<Expr> {
        program.add_expr(Expr::new(ExprKind::Literal {
            data_type,
            value: value.into(),
        }))
    }

    #[test]
    fn variant_parsing() {
        assert_eq!(Variant::parse("true"), Some(Variant::Bool(true)));
        assert_eq!(Variant::parse("42"), Some(Variant::Int(42)));
        assert_eq!(Variant::parse("0x1F"), Some(Variant::Int(31)));
        assert_eq!(Variant::parse("1.5"), Some(Variant::Real(1.5)));
        assert_eq!(Variant::parse("2.0f"), Some(Variant::Real(2.0)));
        assert_eq!(Variant::parse("3h"), Some(Variant::Real(3.0)));
        assert_eq!(Variant::parse("1e3"), Some(Variant::Real(1000.0)));
        assert_eq!(Variant::parse("nonsense"), None);
    }

    #[test]
    fn variant_coercions() {
        assert_eq!(Variant::Bool(true).to_int(), 1);
        assert_eq!(Variant::Real(2.9).to_int(), 2);
        assert_eq!(Variant::Int(0).to_bool(), false);
        assert_eq!(Variant::Int(3).to_real(), 3.0);
    }

    #[test]
    fn folds_arithmetic() {
        let mut program = Program::default();
        let a = lit(&mut program, DataType::Int, "10");
        let b = lit(&mut program, DataType::Int, "4");
        let sum = program.add_expr(Expr::new(ExprKind::Binary {
            op: BinaryOp::Add,
            lhs: a,
            rhs: b,
        }));
        assert_eq!(evaluate(&program, sum), Some(Variant::Int(14)));

        let r = lit(&mut program, DataType::Float, "0.5f");
        let product = program.add_expr(Expr::new(ExprKind::Binary {
            op: BinaryOp::Mul,
            lhs: sum,
            rhs: r,
        }));
        assert_eq!(evaluate(&program, product), Some(Variant::Real(7.0)));
    }

    #[test]
    fn folds_through_variables() {
        let mut program = Program::default();
        let init = lit(&mut program, DataType::Int, "8");
        let var = program.var_decls.append(VarDecl {
            initializer: Some(init),
            ..VarDecl::new("n", TypeDenoter::base(DataType::Int))
        });
        let obj = program.add_expr(Expr::new(ExprKind::Object {
            prefix: None,
            ident: "n".into(),
            symbol: Some(SymbolRef::Var(var)),
        }));
        assert_eq!(evaluate(&program, obj), Some(Variant::Int(8)));
    }

    #[test]
    fn cast_coerces() {
        let mut program = Program::default();
        let value = lit(&mut program, DataType::Float, "2.75");
        let cast = program.add_expr(Expr::new(ExprKind::Cast {
            specifier: TypeSpecifier::new(TypeDenoter::base(DataType::Int)),
            expr: value,
        }));
        assert_eq!(evaluate(&program, cast), Some(Variant::Int(2)));
    }

    #[test]
    fn default_for_non_constant() {
        let mut program = Program::default();
        let call = program.add_expr(Expr::new(ExprKind::Call {
            prefix: None,
            ident: "foo".into(),
            intrinsic: None,
            function: None,
            arguments: vec![],
        }));
        assert_eq!(
            evaluate_or_default(&program, call, Variant::Int(0)),
            Variant::Int(0)
        );
    }

    #[test]
    fn division_by_zero_is_not_constant() {
        let mut program = Program::default();
        let a = lit(&mut program, DataType::Int, "1");
        let b = lit(&mut program, DataType::Int, "0");
        let div = program.add_expr(Expr::new(ExprKind::Binary {
            op: BinaryOp::Div,
            lhs: a,
            rhs: b,
        }));
        assert_eq!(evaluate(&program, div), None);
    }
}
