//! Parsed generic type signatures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Suffix marking an array type, e.g. `int[]` or `java.lang.Integer[]`.
const ARRAY_SUFFIX: &str = "[]";

/// A parsed type signature: a raw type name plus ordered type arguments.
///
/// Descriptors are plain values. Two descriptors are equal when their
/// structure is equal; there is no identity beyond that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct TypeDescriptor {
    /// Type name as written, e.g. `java.util.List` or `int[]`. Never empty.
    pub raw_name: String,
    /// Type arguments in declaration order. Empty for non-generic types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    /// A non-generic type.
    pub fn simple(raw_name: impl Into<String>) -> Self {
        Self {
            raw_name: raw_name.into(),
            type_arguments: Vec::new(),
        }
    }

    /// A generic type with the given arguments.
    pub fn generic(raw_name: impl Into<String>, type_arguments: Vec<TypeDescriptor>) -> Self {
        Self {
            raw_name: raw_name.into(),
            type_arguments,
        }
    }

    /// Number of type arguments.
    pub fn arity(&self) -> usize {
        self.type_arguments.len()
    }

    pub fn is_generic(&self) -> bool {
        !self.type_arguments.is_empty()
    }

    /// True for `T[]` shapes. Arrays never carry type arguments of their own.
    pub fn is_array(&self) -> bool {
        self.type_arguments.is_empty()
            && self.raw_name.len() > ARRAY_SUFFIX.len()
            && self.raw_name.ends_with(ARRAY_SUFFIX)
    }

    /// Element type of an array (`int[][]` → `int[]`), or `None` for non-arrays.
    pub fn component(&self) -> Option<TypeDescriptor> {
        if !self.is_array() {
            return None;
        }
        self.raw_name
            .strip_suffix(ARRAY_SUFFIX)
            .map(|name| TypeDescriptor::simple(name.trim_end()))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_name)?;
        if let Some((first, rest)) = self.type_arguments.split_first() {
            write!(f, "<{first}")?;
            for arg in rest {
                write!(f, ", {arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}
