//! Field parsers and the registry that dispatches between them.
//!
//! Each [`FieldParser`] declares, through a pure predicate over a
//! [`TargetType`], which requested types it can produce. The
//! [`ParserRegistry`] tries its parsers in a fixed priority order (scalar
//! parsers first, then the collection parser) and hands anything unclaimed to
//! the [`DefaultFieldParser`]. The registry is an immutable value; it holds no
//! per-call state and can be shared between threads.
//!
//! Numeric text is read in the engine's invariant format: `.` as decimal
//! separator, optional sign, exponent notation where the type allows it, and
//! no grouping separators. Surrounding whitespace is ignored for every scalar
//! except strings and enum names.

use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

// used to tell numeric overflow apart from malformed decimal text
use bigdecimal::{BigDecimal, RoundingMode};
use bigdecimal::num_bigint::BigInt;
use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use rust_decimal::Decimal;
use tracing::trace;
use uuid::Uuid;

use crate::datatype::{DataType, EnumType, HostValue, TargetType};
use crate::error::{Result, SolrmapError};
use crate::node::ValueNode;

/// The timestamp layout the engine reads and writes, always UTC.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

// Decimal carries at most 28 fractional digits and 29 integer digits.
const DECIMAL_MAX_SCALE: i64 = 28;
const DECIMAL_MAX_DIGITS: i128 = 29;

lazy_static! {
    static ref DECIMAL_MAX: BigDecimal = BigDecimal::new(BigInt::from(Decimal::MAX.mantissa()), 0);
}

pub trait FieldParser: Send + Sync {
    fn name(&self) -> &'static str;
    /// Must be side-effect free and give the same answer for the same type.
    fn can_handle_type(&self, target: &TargetType) -> bool;
    /// Converts a node. The registry is passed in so that container parsers
    /// can dispatch their elements.
    fn parse(&self, node: &ValueNode, target: &TargetType, registry: &ParserRegistry) -> Result<HostValue>;
}

// ------------- Failures --------------
fn format_error(node: &ValueNode, target: &TargetType) -> SolrmapError {
    SolrmapError::Format {
        field: node.label().to_string(),
        target: target.to_string(),
        text: node.text().to_string(),
    }
}

fn overflow(node: &ValueNode, target: &TargetType) -> SolrmapError {
    SolrmapError::Overflow {
        field: node.label().to_string(),
        target: target.to_string(),
        text: node.text().to_string(),
    }
}

fn unsupported(node: &ValueNode, target: &TargetType) -> SolrmapError {
    SolrmapError::UnsupportedType {
        field: node.label().to_string(),
        target: target.to_string(),
    }
}

// ------------- Lexical readers --------------
fn read_integer<T: FromStr<Err = ParseIntError>>(node: &ValueNode, target: &TargetType) -> Result<T> {
    node.text().trim().parse::<T>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => overflow(node, target),
        _ => format_error(node, target),
    })
}

fn is_infinity_literal(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

// A finite literal that only fits as infinity is an overflow, not a value.
fn read_float<T: FromStr>(node: &ValueNode, target: &TargetType, is_infinite: fn(&T) -> bool) -> Result<T> {
    let text = node.text().trim();
    let value = text.parse::<T>().map_err(|_| format_error(node, target))?;
    if is_infinite(&value) && !is_infinity_literal(text) {
        return Err(overflow(node, target));
    }
    Ok(value)
}

// Exponents are bounded before the value is expanded to plain text; values
// below the smallest representable fraction read as zero.
fn read_decimal(node: &ValueNode, target: &TargetType) -> Result<Decimal> {
    let big = BigDecimal::from_str(node.text().trim()).map_err(|_| format_error(node, target))?;
    let (_, scale) = big.as_bigint_and_exponent();
    // |value| < 10^magnitude
    let magnitude = big.digits() as i128 - scale as i128;
    if magnitude > DECIMAL_MAX_DIGITS {
        return Err(overflow(node, target));
    }
    if magnitude < -DECIMAL_MAX_SCALE as i128 {
        return Ok(Decimal::ZERO);
    }
    if big.abs() > *DECIMAL_MAX {
        return Err(overflow(node, target));
    }
    let big = if scale > DECIMAL_MAX_SCALE {
        big.with_scale_round(DECIMAL_MAX_SCALE, RoundingMode::HalfEven)
    } else {
        big
    };
    Decimal::from_str(&big.to_plain_string()).map_err(|_| overflow(node, target))
}

pub(crate) fn read_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn read_bool(node: &ValueNode, target: &TargetType) -> Result<bool> {
    let text = node.text().trim();
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format_error(node, target))
    }
}

fn read_guid(node: &ValueNode, target: &TargetType) -> Result<Uuid> {
    Uuid::parse_str(node.text().trim()).map_err(|_| format_error(node, target))
}

// Enum names are matched exactly, case included.
fn read_enum(node: &ValueNode, enum_type: &EnumType) -> Result<HostValue> {
    enum_type
        .member(node.text())
        .map(HostValue::Enum)
        .ok_or_else(|| SolrmapError::InvalidEnumValue {
            field: node.label().to_string(),
            target: enum_type.name().to_string(),
            text: node.text().to_string(),
        })
}

// ------------- Scalar Parsers --------------
macro_rules! integer_parser {
    ($parser:ident, $ty:ty, $variant:ident) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $parser;

        impl FieldParser for $parser {
            fn name(&self) -> &'static str {
                stringify!($parser)
            }
            fn can_handle_type(&self, target: &TargetType) -> bool {
                matches!(target, TargetType::$variant)
            }
            fn parse(&self, node: &ValueNode, _target: &TargetType, _registry: &ParserRegistry) -> Result<HostValue> {
                read_integer::<$ty>(node, &TargetType::$variant).map(HostValue::$variant)
            }
        }
    };
}

macro_rules! float_parser {
    ($parser:ident, $ty:ty, $variant:ident) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $parser;

        impl FieldParser for $parser {
            fn name(&self) -> &'static str {
                stringify!($parser)
            }
            fn can_handle_type(&self, target: &TargetType) -> bool {
                matches!(target, TargetType::$variant)
            }
            fn parse(&self, node: &ValueNode, _target: &TargetType, _registry: &ParserRegistry) -> Result<HostValue> {
                read_float::<$ty>(node, &TargetType::$variant, |v| v.is_infinite()).map(HostValue::$variant)
            }
        }
    };
}

integer_parser!(IntFieldParser, i32, Int);
integer_parser!(LongFieldParser, i64, Long);
float_parser!(FloatFieldParser, f32, Float);
float_parser!(DoubleFieldParser, f64, Double);

#[derive(Debug, Default, Clone, Copy)]
pub struct DecimalFieldParser;

impl FieldParser for DecimalFieldParser {
    fn name(&self) -> &'static str {
        "DecimalFieldParser"
    }
    fn can_handle_type(&self, target: &TargetType) -> bool {
        matches!(target, TargetType::Decimal)
    }
    fn parse(&self, node: &ValueNode, _target: &TargetType, _registry: &ParserRegistry) -> Result<HostValue> {
        read_decimal(node, &TargetType::Decimal).map(HostValue::Decimal)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DateTimeFieldParser;

impl FieldParser for DateTimeFieldParser {
    fn name(&self) -> &'static str {
        "DateTimeFieldParser"
    }
    fn can_handle_type(&self, target: &TargetType) -> bool {
        matches!(target, TargetType::Date)
    }
    fn parse(&self, node: &ValueNode, _target: &TargetType, _registry: &ParserRegistry) -> Result<HostValue> {
        read_date(node.text())
            .map(HostValue::Date)
            .ok_or_else(|| format_error(node, &TargetType::Date))
    }
}

/// Parses enum members regardless of where enums fall in a registry's order.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnumFieldParser;

impl FieldParser for EnumFieldParser {
    fn name(&self) -> &'static str {
        "EnumFieldParser"
    }
    fn can_handle_type(&self, target: &TargetType) -> bool {
        matches!(target, TargetType::Enum(_))
    }
    fn parse(&self, node: &ValueNode, target: &TargetType, _registry: &ParserRegistry) -> Result<HostValue> {
        match target {
            TargetType::Enum(enum_type) => read_enum(node, enum_type),
            other => Err(unsupported(node, other)),
        }
    }
}

// ------------- Collection Parser --------------
/// Handles arrays, ordered sequences and sets over a declared element type.
/// Strings, keyed mappings and untyped collections are never claimed.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollectionFieldParser;

impl FieldParser for CollectionFieldParser {
    fn name(&self) -> &'static str {
        "CollectionFieldParser"
    }
    fn can_handle_type(&self, target: &TargetType) -> bool {
        matches!(target, TargetType::Array(_) | TargetType::List(_) | TargetType::Set(_))
    }
    fn parse(&self, node: &ValueNode, target: &TargetType, registry: &ParserRegistry) -> Result<HostValue> {
        let element = match target {
            TargetType::Array(e) | TargetType::List(e) | TargetType::Set(e) => e.as_ref(),
            other => return Err(unsupported(node, other)),
        };
        if !registry.supports(element) {
            return Err(SolrmapError::UnsupportedElementType {
                field: node.label().to_string(),
                target: target.to_string(),
                element: element.to_string(),
            });
        }
        if !node.tag().is_collection() {
            return Err(format_error(node, target));
        }
        let values = node
            .children()
            .iter()
            .map(|child| registry.parse(child, element).map_err(|e| e.within(node.label())))
            .collect::<Result<Vec<_>>>()?;
        Ok(match target {
            TargetType::Array(_) => HostValue::Array(values),
            TargetType::Set(_) => HostValue::set_of(values),
            _ => HostValue::List(values),
        })
    }
}

// ------------- Default Parser --------------
/// Catch-all parser. It unwraps nullable types and re-dispatches the inner
/// type, and otherwise reads a closed list of scalars: enums (by exact member
/// name), identifiers, strings (verbatim) and booleans (`true`/`false`, any
/// case). Every other type, numeric and date types included, is
/// [`SolrmapError::UnsupportedType`]; there is no implicit widening.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFieldParser;

impl DefaultFieldParser {
    fn resolves(&self, target: &TargetType, registry: &ParserRegistry) -> bool {
        match target {
            TargetType::Nullable(inner) => registry.supports(inner),
            TargetType::Enum(_) | TargetType::Guid | TargetType::Str | TargetType::Bool => true,
            _ => false,
        }
    }
}

impl FieldParser for DefaultFieldParser {
    fn name(&self) -> &'static str {
        "DefaultFieldParser"
    }
    fn can_handle_type(&self, _target: &TargetType) -> bool {
        true
    }
    fn parse(&self, node: &ValueNode, target: &TargetType, registry: &ParserRegistry) -> Result<HostValue> {
        match target {
            TargetType::Nullable(inner) => registry.parse(node, inner),
            TargetType::Enum(enum_type) => read_enum(node, enum_type),
            TargetType::Guid => read_guid(node, target).map(HostValue::Guid),
            TargetType::Str => Ok(HostValue::Str(node.text().to_string())),
            TargetType::Bool => read_bool(node, target).map(HostValue::Bool),
            other => Err(unsupported(node, other)),
        }
    }
}

// ------------- Registry --------------
pub struct ParserRegistry {
    parsers: Vec<Box<dyn FieldParser>>,
    fallback: DefaultFieldParser,
}

impl ParserRegistry {
    /// The standard registry: integer, long, float, double, decimal and date
    /// parsers, then the collection parser, then the default parser.
    pub fn new() -> Self {
        Self::with_parsers(vec![
            Box::new(IntFieldParser),
            Box::new(LongFieldParser),
            Box::new(FloatFieldParser),
            Box::new(DoubleFieldParser),
            Box::new(DecimalFieldParser),
            Box::new(DateTimeFieldParser),
            Box::new(CollectionFieldParser),
        ])
    }
    /// A registry trying `parsers` in the given order before the default parser.
    pub fn with_parsers(parsers: Vec<Box<dyn FieldParser>>) -> Self {
        tracing::debug!(
            order = ?parsers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            "parser registry built"
        );
        Self {
            parsers,
            fallback: DefaultFieldParser,
        }
    }
    /// Parsers in dispatch order, the default parser last.
    pub fn parsers(&self) -> impl Iterator<Item = &dyn FieldParser> {
        self.parsers
            .iter()
            .map(|p| p.as_ref())
            .chain(std::iter::once(&self.fallback as &dyn FieldParser))
    }
    /// The first parser claiming `target`.
    pub fn parser_for(&self, target: &TargetType) -> &dyn FieldParser {
        self.parsers
            .iter()
            .map(|p| p.as_ref())
            .find(|p| p.can_handle_type(target))
            .unwrap_or(&self.fallback)
    }
    /// Whether `target` can be produced at all, element types included.
    pub fn supports(&self, target: &TargetType) -> bool {
        if self.parsers.iter().any(|p| p.can_handle_type(target)) {
            return match target.element() {
                Some(element) => self.supports(element),
                None => true,
            };
        }
        self.fallback.resolves(target, self)
    }
    pub fn parse(&self, node: &ValueNode, target: &TargetType) -> Result<HostValue> {
        let parser = self.parser_for(target);
        trace!(field = node.label(), target = %target, parser = parser.name(), "dispatch");
        parser.parse(node, target, self)
    }
    /// Parses into a concrete Rust type through its declared TargetType.
    pub fn parse_as<T: DataType>(&self, node: &ValueNode) -> Result<T> {
        let value = self.parse(node, &T::target_type())?;
        let found = value.kind();
        T::from_host(value).ok_or_else(|| SolrmapError::ValueMismatch {
            field: node.label().to_string(),
            expected: T::target_type().to_string(),
            found: found.to_string(),
        })
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
