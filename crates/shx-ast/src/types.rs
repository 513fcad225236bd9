//! The `DataType` closed set and its shape algebra.
//!
//! Scalars, all 2/3/4 vectors, and all MxN (M,N in 2..=4) matrices over
//! the six scalar bases, plus `String` for state-value text. Variant
//! order is contractual: the scalar/vector/matrix predicates are
//! contiguous-range checks.

use crate::error::TypeError;

/// Scalar, vector, and matrix data types.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum DataType {
    Undefined,

    /// String literals inside state and sampler initializers.
    String,

    // Scalars
    Bool,
    Int,
    UInt,
    Half,
    Float,
    Double,

    // Vectors (base-major)
    Bool2,
    Bool3,
    Bool4,
    Int2,
    Int3,
    Int4,
    UInt2,
    UInt3,
    UInt4,
    Half2,
    Half3,
    Half4,
    Float2,
    Float3,
    Float4,
    Double2,
    Double3,
    Double4,

    // Matrices (base-major, row-major dimension order)
    Bool2x2,
    Bool2x3,
    Bool2x4,
    Bool3x2,
    Bool3x3,
    Bool3x4,
    Bool4x2,
    Bool4x3,
    Bool4x4,
    Int2x2,
    Int2x3,
    Int2x4,
    Int3x2,
    Int3x3,
    Int3x4,
    Int4x2,
    Int4x3,
    Int4x4,
    UInt2x2,
    UInt2x3,
    UInt2x4,
    UInt3x2,
    UInt3x3,
    UInt3x4,
    UInt4x2,
    UInt4x3,
    UInt4x4,
    Half2x2,
    Half2x3,
    Half2x4,
    Half3x2,
    Half3x3,
    Half3x4,
    Half4x2,
    Half4x3,
    Half4x4,
    Float2x2,
    Float2x3,
    Float2x4,
    Float3x2,
    Float3x3,
    Float3x4,
    Float4x2,
    Float4x3,
    Float4x4,
    Double2x2,
    Double2x3,
    Double2x4,
    Double3x2,
    Double3x3,
    Double3x4,
    Double4x2,
    Double4x3,
    Double4x4,
}

impl Default for DataType {
    fn default() -> Self {
        Self::Undefined
    }
}

const SCALARS: [DataType; 6] = [
    DataType::Bool,
    DataType::Int,
    DataType::UInt,
    DataType::Half,
    DataType::Float,
    DataType::Double,
];

const VECTORS: [[DataType; 3]; 6] = [
    [DataType::Bool2, DataType::Bool3, DataType::Bool4],
    [DataType::Int2, DataType::Int3, DataType::Int4],
    [DataType::UInt2, DataType::UInt3, DataType::UInt4],
    [DataType::Half2, DataType::Half3, DataType::Half4],
    [DataType::Float2, DataType::Float3, DataType::Float4],
    [DataType::Double2, DataType::Double3, DataType::Double4],
];

const MATRICES: [[DataType; 9]; 6] = [
    [
        DataType::Bool2x2,
        DataType::Bool2x3,
        DataType::Bool2x4,
        DataType::Bool3x2,
        DataType::Bool3x3,
        DataType::Bool3x4,
        DataType::Bool4x2,
        DataType::Bool4x3,
        DataType::Bool4x4,
    ],
    [
        DataType::Int2x2,
        DataType::Int2x3,
        DataType::Int2x4,
        DataType::Int3x2,
        DataType::Int3x3,
        DataType::Int3x4,
        DataType::Int4x2,
        DataType::Int4x3,
        DataType::Int4x4,
    ],
    [
        DataType::UInt2x2,
        DataType::UInt2x3,
        DataType::UInt2x4,
        DataType::UInt3x2,
        DataType::UInt3x3,
        DataType::UInt3x4,
        DataType::UInt4x2,
        DataType::UInt4x3,
        DataType::UInt4x4,
    ],
    [
        DataType::Half2x2,
        DataType::Half2x3,
        DataType::Half2x4,
        DataType::Half3x2,
        DataType::Half3x3,
        DataType::Half3x4,
        DataType::Half4x2,
        DataType::Half4x3,
        DataType::Half4x4,
    ],
    [
        DataType::Float2x2,
        DataType::Float2x3,
        DataType::Float2x4,
        DataType::Float3x2,
        DataType::Float3x3,
        DataType::Float3x4,
        DataType::Float4x2,
        DataType::Float4x3,
        DataType::Float4x4,
    ],
    [
        DataType::Double2x2,
        DataType::Double2x3,
        DataType::Double2x4,
        DataType::Double3x2,
        DataType::Double3x3,
        DataType::Double3x4,
        DataType::Double4x2,
        DataType::Double4x3,
        DataType::Double4x4,
    ],
];

fn scalar_index(base: DataType) -> Option<usize> {
    SCALARS.iter().position(|&s| s == base)
}

impl DataType {
    /// `true` for the six scalar bases (excludes `String`).
    pub fn is_scalar(self) -> bool {
        (Self::Bool..=Self::Double).contains(&self)
    }

    /// `true` for all 2/3/4-component vectors.
    pub fn is_vector(self) -> bool {
        (Self::Bool2..=Self::Double4).contains(&self)
    }

    /// `true` for all MxN matrices.
    pub fn is_matrix(self) -> bool {
        (Self::Bool2x2..=Self::Double4x4).contains(&self)
    }

    /// The scalar base of a scalar, vector, or matrix type.
    ///
    /// Returns `Undefined` for `Undefined` and `String`.
    pub fn base(self) -> DataType {
        if self.is_scalar() {
            return self;
        }
        for (i, row) in VECTORS.iter().enumerate() {
            if row.contains(&self) {
                return SCALARS[i];
            }
        }
        for (i, row) in MATRICES.iter().enumerate() {
            if row.contains(&self) {
                return SCALARS[i];
            }
        }
        DataType::Undefined
    }

    /// Vector dimension: 1 for scalars, 2..=4 for vectors, 0 otherwise.
    pub fn vector_dim(self) -> u32 {
        if self.is_scalar() {
            return 1;
        }
        for row in VECTORS.iter() {
            if let Some(i) = row.iter().position(|&v| v == self) {
                return i as u32 + 2;
            }
        }
        0
    }

    /// Matrix dimensions: `(1,1)` for scalars, `(N,1)` for vectors,
    /// `(M,N)` for matrices, `(0,0)` otherwise.
    pub fn matrix_dims(self) -> (u32, u32) {
        if self.is_scalar() {
            return (1, 1);
        }
        if self.is_vector() {
            return (self.vector_dim(), 1);
        }
        for row in MATRICES.iter() {
            if let Some(i) = row.iter().position(|&m| m == self) {
                return (i as u32 / 3 + 2, i as u32 % 3 + 2);
            }
        }
        (0, 0)
    }

    /// `true` if the base is `Bool`.
    pub fn is_boolean(self) -> bool {
        self.base() == DataType::Bool
    }

    /// `true` if the base is `Half`, `Float`, or `Double`.
    pub fn is_real(self) -> bool {
        matches!(self.base(), DataType::Half | DataType::Float | DataType::Double)
    }

    /// `true` if the base is `Int` or `UInt`.
    pub fn is_integral(self) -> bool {
        matches!(self.base(), DataType::Int | DataType::UInt)
    }

    /// HLSL-style spelling (`"float4x4"`, `"uint3"`, ...).
    pub fn name(self) -> String {
        match self {
            Self::Undefined => "undefined".into(),
            Self::String => "string".into(),
            _ => {
                let base = match self.base() {
                    Self::Bool => "bool",
                    Self::Int => "int",
                    Self::UInt => "uint",
                    Self::Half => "half",
                    Self::Float => "float",
                    Self::Double => "double",
                    _ => return "undefined".into(),
                };
                if self.is_scalar() {
                    base.into()
                } else if self.is_vector() {
                    format!("{base}{}", self.vector_dim())
                } else {
                    let (m, n) = self.matrix_dims();
                    format!("{base}{m}x{n}")
                }
            }
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// The vector type over `base` with `dim` components (`dim == 1` yields
/// the scalar itself). Returns `Undefined` out of range.
pub fn vector_data_type(base: DataType, dim: u32) -> DataType {
    let Some(i) = scalar_index(base) else {
        return DataType::Undefined;
    };
    match dim {
        1 => base,
        2..=4 => VECTORS[i][dim as usize - 2],
        _ => DataType::Undefined,
    }
}

/// The MxN matrix type over `base`. Returns `Undefined` out of range.
pub fn matrix_data_type(base: DataType, rows: u32, cols: u32) -> DataType {
    let Some(i) = scalar_index(base) else {
        return DataType::Undefined;
    };
    if !(2..=4).contains(&rows) || !(2..=4).contains(&cols) {
        return DataType::Undefined;
    }
    MATRICES[i][(rows as usize - 2) * 3 + (cols as usize - 2)]
}

/// Resolves the result type of a swizzle or matrix selector.
///
/// Scalars and vectors accept `xyzw` / `rgba` component sequences of
/// length 1..=4 (duplicates allowed; l-value rules are the front-end's
/// concern). Matrices accept chains of `_mRC` (zero-based) or `_RC`
/// (one-based) selectors.
pub fn subscript_data_type(data_type: DataType, subscript: &str) -> Result<DataType, TypeError> {
    if data_type.is_matrix() {
        return subscript_matrix_type(data_type, subscript);
    }
    let dim = data_type.vector_dim();
    if dim == 0 {
        return Err(TypeError::InvalidSubscript {
            subscript: subscript.into(),
            ty: data_type.name(),
        });
    }
    if subscript.is_empty() || subscript.len() > 4 {
        return Err(TypeError::InvalidSubscript {
            subscript: subscript.into(),
            ty: data_type.name(),
        });
    }
    for c in subscript.chars() {
        let index = match c {
            'x' | 'r' => 0,
            'y' | 'g' => 1,
            'z' | 'b' => 2,
            'w' | 'a' => 3,
            _ => {
                return Err(TypeError::InvalidComponent {
                    subscript: subscript.into(),
                    component: c,
                });
            }
        };
        if index >= dim {
            return Err(TypeError::InvalidSubscript {
                subscript: subscript.into(),
                ty: data_type.name(),
            });
        }
    }
    Ok(vector_data_type(data_type.base(), subscript.len() as u32))
}

fn subscript_matrix_type(data_type: DataType, subscript: &str) -> Result<DataType, TypeError> {
    let (rows, cols) = data_type.matrix_dims();
    let bytes = subscript.as_bytes();
    let mut pos = 0usize;
    let mut count = 0u32;

    while pos < bytes.len() {
        if bytes[pos] != b'_' {
            return Err(TypeError::InvalidSubscript {
                subscript: subscript.into(),
                ty: data_type.name(),
            });
        }
        pos += 1;
        let zero_based = pos < bytes.len() && bytes[pos] == b'm';
        if zero_based {
            pos += 1;
        }
        if pos + 2 > bytes.len()
            || !bytes[pos].is_ascii_digit()
            || !bytes[pos + 1].is_ascii_digit()
        {
            return Err(TypeError::InvalidSubscript {
                subscript: subscript.into(),
                ty: data_type.name(),
            });
        }
        let mut r = (bytes[pos] - b'0') as u32;
        let mut c = (bytes[pos + 1] - b'0') as u32;
        if !zero_based {
            if r == 0 || c == 0 {
                return Err(TypeError::SubscriptOutOfRange {
                    subscript: subscript.into(),
                    rows,
                    cols,
                });
            }
            r -= 1;
            c -= 1;
        }
        if r >= rows || c >= cols {
            return Err(TypeError::SubscriptOutOfRange {
                subscript: subscript.into(),
                rows,
                cols,
            });
        }
        pos += 2;
        count += 1;
    }

    if !(1..=4).contains(&count) {
        return Err(TypeError::InvalidSubscript {
            subscript: subscript.into(),
            ty: data_type.name(),
        });
    }
    Ok(vector_data_type(data_type.base(), count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_shape_laws() {
        for &base in &SCALARS {
            for dim in 1..=4u32 {
                let v = vector_data_type(base, dim);
                assert_eq!(v.base(), base, "base of {v:?}");
                assert_eq!(v.vector_dim(), dim, "dim of {v:?}");
            }
        }
    }

    #[test]
    fn matrix_shape_laws() {
        for &base in &SCALARS {
            for m in 2..=4u32 {
                for n in 2..=4u32 {
                    let t = matrix_data_type(base, m, n);
                    assert_eq!(t.base(), base);
                    assert_eq!(t.matrix_dims(), (m, n));
                    assert_eq!(t.vector_dim(), 0);
                }
            }
        }
    }

    #[test]
    fn scalar_and_vector_matrix_dims() {
        assert_eq!(DataType::Float.matrix_dims(), (1, 1));
        assert_eq!(DataType::Float3.matrix_dims(), (3, 1));
        assert_eq!(DataType::Float4x2.matrix_dims(), (4, 2));
        assert_eq!(DataType::String.matrix_dims(), (0, 0));
    }

    #[test]
    fn predicates() {
        assert!(DataType::Double.is_scalar());
        assert!(!DataType::String.is_scalar());
        assert!(DataType::Bool2.is_vector());
        assert!(DataType::Double4x4.is_matrix());
        assert!(DataType::Half3.is_real());
        assert!(DataType::UInt4.is_integral());
        assert!(DataType::Bool3x3.is_boolean());
    }

    #[test]
    fn names() {
        assert_eq!(DataType::Float4x4.name(), "float4x4");
        assert_eq!(DataType::UInt3.name(), "uint3");
        assert_eq!(DataType::Half.name(), "half");
    }

    #[test]
    fn vector_swizzles() {
        assert_eq!(
            subscript_data_type(DataType::Float3, "xyz").unwrap(),
            DataType::Float3
        );
        assert_eq!(
            subscript_data_type(DataType::Float3, "xxyy").unwrap(),
            DataType::Float4
        );
        assert_eq!(
            subscript_data_type(DataType::Float4, "rgb").unwrap(),
            DataType::Float3
        );
        assert_eq!(
            subscript_data_type(DataType::Float, "x").unwrap(),
            DataType::Float
        );
        // 'z' exceeds a 2-component vector
        assert!(subscript_data_type(DataType::Int2, "xz").is_err());
        // unknown component letter
        assert!(subscript_data_type(DataType::Float4, "xq").is_err());
        // five components
        assert!(subscript_data_type(DataType::Float4, "xxxxx").is_err());
    }

    #[test]
    fn matrix_selectors() {
        assert_eq!(
            subscript_data_type(DataType::Float4x4, "_m00").unwrap(),
            DataType::Float
        );
        assert_eq!(
            subscript_data_type(DataType::Float4x4, "_11_22").unwrap(),
            DataType::Float2
        );
        assert_eq!(
            subscript_data_type(DataType::Float2x3, "_m01_m12").unwrap(),
            DataType::Float2
        );
        // row out of range (zero-based row 2 on a 2-row matrix)
        assert!(subscript_data_type(DataType::Float2x3, "_m20").is_err());
        // one-based zero index
        assert!(subscript_data_type(DataType::Float4x4, "_01").is_err());
        // swizzle syntax on a matrix
        assert!(subscript_data_type(DataType::Float4x4, "xy").is_err());
    }

    #[test]
    fn subscript_rejects_non_numeric() {
        assert!(subscript_data_type(DataType::String, "x").is_err());
        assert!(subscript_data_type(DataType::Undefined, "x").is_err());
    }
}
