//! Per-node boolean flag bitset.

/// Bitflags carried by every AST node.
///
/// The front-end sets the reachability/dead-code and entry-point
/// related flags; the lowering pass sets the rest.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub struct AstFlags(u32);

impl AstFlags {
    pub const EMPTY: Self = Self(0);
    /// Reachable from the entry point.
    pub const REACHABLE: Self = Self(1);
    /// Statically unreachable; dropped from active blocks by the converter.
    pub const DEAD_CODE: Self = Self(1 << 1);
    /// The entry-point function declaration.
    pub const ENTRY_POINT: Self = Self(1 << 2);
    /// A variable fed by the shader input assembly.
    pub const SHADER_INPUT: Self = Self(1 << 3);
    /// A variable written to the shader output interface.
    pub const SHADER_OUTPUT: Self = Self(1 << 4);
    /// The synthesized receiver parameter of a lowered member function.
    pub const SELF_PARAMETER: Self = Self(1 << 5);
    /// A struct passed to a non-entry-point function parameter.
    pub const NON_ENTRY_POINT_PARAM: Self = Self(1 << 6);
    /// Part of an unsized entry-point I/O array.
    pub const DYNAMIC_ARRAY: Self = Self(1 << 7);
    /// Must not be written; reads come from a flattened I/O struct.
    pub const IMMUTABLE: Self = Self(1 << 8);
    /// A static member function (no receiver).
    pub const STATIC_MEMBER: Self = Self(1 << 9);

    /// Returns `true` if `self` contains all flags in `other`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no flags are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Sets all flags in `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears all flags in `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl std::ops::BitOr for AstFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for AstFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Source-text region a node was parsed from. The external front-end
/// populates it; this crate only carries it through for diagnostics.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub struct SourceArea {
    /// 1-based line of the first token (0 = unknown).
    pub line: u32,
    /// 1-based column of the first token.
    pub column: u32,
    /// Length of the region in characters.
    pub length: u32,
}

impl SourceArea {
    /// The "no source position" marker.
    pub const IGNORE: Self = Self {
        line: 0,
        column: 0,
        length: 0,
    };

    pub fn new(line: u32, column: u32, length: u32) -> Self {
        Self {
            line,
            column,
            length,
        }
    }
}

impl std::fmt::Display for SourceArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            f.write_str("<unknown>")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_set_operations() {
        let mut flags = AstFlags::EMPTY;
        assert!(flags.is_empty());
        flags.insert(AstFlags::DEAD_CODE | AstFlags::REACHABLE);
        assert!(flags.contains(AstFlags::DEAD_CODE));
        assert!(flags.contains(AstFlags::REACHABLE));
        assert!(!flags.contains(AstFlags::ENTRY_POINT));
        flags.remove(AstFlags::DEAD_CODE);
        assert!(!flags.contains(AstFlags::DEAD_CODE));
        assert!(flags.contains(AstFlags::REACHABLE));
    }

    #[test]
    fn source_area_display() {
        assert_eq!(SourceArea::new(3, 14, 5).to_string(), "3:14");
        assert_eq!(SourceArea::IGNORE.to_string(), "<unknown>");
    }
}
