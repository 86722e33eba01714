//! Converters for the JDK types MicroProfile Config supports out of the box.
//!
//! Values are trimmed before conversion and an empty value is accepted as
//! "no value", matching the SmallRye builtin converters. Rejection messages
//! reuse SmallRye's message codes so they read the same as at runtime.

use std::sync::Arc;

use crate::capability::{CapabilityProvider, Conversion, ConversionContext};
use crate::error::CapabilityError;
use crate::project::ProjectContext;

/// Implementation name of the builtin provider.
pub const STANDARD_CONVERTERS: &str = "typeconv.StandardConverters";

/// Provider of the builtin [`StandardContext`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardConverters;

impl CapabilityProvider for StandardConverters {
    fn name(&self) -> &str {
        STANDARD_CONVERTERS
    }

    fn build_context(
        &self,
        _project: &dyn ProjectContext,
    ) -> Result<Arc<dyn ConversionContext>, CapabilityError> {
        Ok(Arc::new(StandardContext))
    }
}

/// Conversion context for strings, booleans, numbers and characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Text,
    Boolean,
    Integer { min: i64, max: i64 },
    Long,
    Float,
    Double,
    Char,
}

fn target(type_name: &str) -> Option<Target> {
    let target = match type_name {
        "java.lang.String" | "java.lang.CharSequence" | "java.lang.Object" => Target::Text,
        "boolean" | "java.lang.Boolean" => Target::Boolean,
        "byte" | "java.lang.Byte" => Target::Integer {
            min: i8::MIN.into(),
            max: i8::MAX.into(),
        },
        "short" | "java.lang.Short" => Target::Integer {
            min: i16::MIN.into(),
            max: i16::MAX.into(),
        },
        "int" | "java.lang.Integer" => Target::Integer {
            min: i32::MIN.into(),
            max: i32::MAX.into(),
        },
        "long" | "java.lang.Long" => Target::Long,
        "float" | "java.lang.Float" => Target::Float,
        "double" | "java.lang.Double" => Target::Double,
        "char" | "java.lang.Character" => Target::Char,
        _ => return None,
    };
    Some(target)
}

impl ConversionContext for StandardContext {
    fn provider(&self) -> &str {
        STANDARD_CONVERTERS
    }

    fn can_convert(&self, type_name: &str) -> bool {
        target(type_name).is_some()
    }

    fn convert(&self, value: &str, type_name: &str) -> Result<Conversion, CapabilityError> {
        let Some(target) = target(type_name) else {
            return Err(CapabilityError::Conversion {
                type_name: type_name.to_string(),
                reason: "no converter registered".to_string(),
            });
        };

        let value = value.trim();
        if value.is_empty() {
            return Ok(Conversion::Accepted);
        }

        let expected = match target {
            Target::Text | Target::Boolean => None,
            Target::Integer { min, max } => (!value
                .parse::<i64>()
                .is_ok_and(|n| (min..=max).contains(&n)))
            .then_some("SRCFG00029: Expected an integer value"),
            Target::Long => value
                .parse::<i64>()
                .is_err()
                .then_some("SRCFG00030: Expected a long value"),
            Target::Double => (!is_java_float(value)).then_some("SRCFG00031: Expected a double value"),
            Target::Float => (!is_java_float(value)).then_some("SRCFG00032: Expected a float value"),
            Target::Char => {
                (value.chars().count() != 1).then_some("SRCFG00033: Expected a char value")
            }
        };

        Ok(match expected {
            None => Conversion::Accepted,
            Some(expected) => Conversion::rejected(format!("{expected}, got \"{value}\"")),
        })
    }
}

/// Decimal floating literal as `Double.parseDouble` reads it, minus hex floats.
fn is_java_float(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    if unsigned == "NaN" || unsigned == "Infinity" {
        return true;
    }

    let body = unsigned
        .strip_suffix(['f', 'F', 'd', 'D'])
        .unwrap_or(unsigned);
    let has_digit = body.chars().any(|c| c.is_ascii_digit());
    let well_formed = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));

    has_digit && well_formed && body.parse::<f64>().is_ok()
}
