//! The inverse of the parsers: typed host values to outgoing wire fields.
//!
//! Values are written in the same invariant text the parsers read back, so
//! parsing a serialized value yields the value again. Floating point values
//! use the shortest text that reads back to the same number.

use std::fmt;

use crate::datatype::{DataType, HostValue, TargetType};
use crate::error::{Result, SolrmapError};
use crate::parser::DATE_FORMAT;

/// One outgoing field entry. Multi-valued host collections produce one entry
/// per element, all sharing the field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireField {
    name: String,
    value: String,
    multi_valued: bool,
}

impl WireField {
    pub fn new(name: &str, value: String, multi_valued: bool) -> Self {
        Self {
            name: name.to_string(),
            value,
            multi_valued,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn value(&self) -> &str {
        &self.value
    }
    pub fn is_multi_valued(&self) -> bool {
        self.multi_valued
    }
}

impl fmt::Display for WireField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

fn special_float(nan: bool, infinite: bool, negative: bool) -> Option<&'static str> {
    match (nan, infinite, negative) {
        (true, _, _) => Some("NaN"),
        (false, true, false) => Some("Infinity"),
        (false, true, true) => Some("-Infinity"),
        _ => None,
    }
}

/// Renders a scalar without checking it against a declared type.
/// `None` for nulls and collections.
pub fn render_value(value: &HostValue) -> Option<String> {
    let text = match value {
        HostValue::Str(s) => s.clone(),
        HostValue::Int(i) => i.to_string(),
        HostValue::Long(l) => l.to_string(),
        HostValue::Float(v) => special_float(v.is_nan(), v.is_infinite(), v.is_sign_negative())
            .map(str::to_string)
            .unwrap_or_else(|| v.to_string()),
        HostValue::Double(v) => special_float(v.is_nan(), v.is_infinite(), v.is_sign_negative())
            .map(str::to_string)
            .unwrap_or_else(|| v.to_string()),
        HostValue::Decimal(d) => d.to_string(),
        HostValue::Bool(b) => b.to_string(),
        HostValue::Date(d) => d.format(DATE_FORMAT).to_string(),
        HostValue::Guid(g) => g.hyphenated().to_string(),
        HostValue::Enum(m) => m.name().to_string(),
        HostValue::Null | HostValue::Array(_) | HostValue::List(_) | HostValue::Set(_) => return None,
    };
    Some(text)
}

fn mismatch(field: &str, target: &TargetType, value: &HostValue) -> SolrmapError {
    SolrmapError::ValueMismatch {
        field: field.to_string(),
        expected: target.to_string(),
        found: value.kind().to_string(),
    }
}

/// Renders a scalar declared as `target`, rejecting values of another type.
pub fn render(value: &HostValue, target: &TargetType, field: &str) -> Result<String> {
    let matches = match (target.base(), value) {
        (TargetType::Enum(enum_type), HostValue::Enum(member)) => {
            if !enum_type.contains(member) {
                return Err(SolrmapError::InvalidEnumValue {
                    field: field.to_string(),
                    target: enum_type.name().to_string(),
                    text: member.name().to_string(),
                });
            }
            true
        }
        (TargetType::Str, HostValue::Str(_))
        | (TargetType::Int, HostValue::Int(_))
        | (TargetType::Long, HostValue::Long(_))
        | (TargetType::Float, HostValue::Float(_))
        | (TargetType::Double, HostValue::Double(_))
        | (TargetType::Decimal, HostValue::Decimal(_))
        | (TargetType::Bool, HostValue::Bool(_))
        | (TargetType::Date, HostValue::Date(_))
        | (TargetType::Guid, HostValue::Guid(_)) => true,
        _ => false,
    };
    if !matches {
        return Err(mismatch(field, target, value));
    }
    render_value(value).ok_or_else(|| mismatch(field, target, value))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FieldSerializer;

impl FieldSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Writes `value`, declared as `target`, under the wire name `field`.
    /// A null value writes nothing; a collection writes one entry per
    /// non-null element.
    pub fn serialize(&self, value: &HostValue, target: &TargetType, field: &str) -> Result<Vec<WireField>> {
        if value.is_null() {
            return Ok(Vec::new());
        }
        match target {
            TargetType::Nullable(inner) => self.serialize(value, inner, field),
            TargetType::Array(element) | TargetType::List(element) | TargetType::Set(element) => {
                if !element.is_scalar() {
                    return Err(SolrmapError::UnsupportedElementType {
                        field: field.to_string(),
                        target: target.to_string(),
                        element: element.to_string(),
                    });
                }
                let elements = value.elements().ok_or_else(|| mismatch(field, target, value))?;
                elements
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(|v| render(v, element, field).map(|text| WireField::new(field, text, true)))
                    .collect()
            }
            scalar if scalar.is_scalar() => Ok(vec![WireField::new(field, render(value, scalar, field)?, false)]),
            other => Err(SolrmapError::UnsupportedType {
                field: field.to_string(),
                target: other.to_string(),
            }),
        }
    }

    pub fn serialize_as<T: DataType>(&self, value: T, field: &str) -> Result<Vec<WireField>> {
        self.serialize(&value.into_host(), &T::target_type(), field)
    }
}
