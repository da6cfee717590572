//! Query expression builder.
//!
//! Every [`QueryFragment`] comes out of a validating constructor in this
//! module; callers never assemble query text by hand. Supported forms:
//!
//! * field equality, `name:(value)` with special characters escaped
//! * ranges, `name:[from TO to]` (or `{from TO to}` when exclusive), with `*`
//!   standing in for an unset bound
//! * spatial distance filters as local parameters,
//!   `{!geofilt pt=lat,lon sfield=name d=distance}` or `{!bbox ...}`
//! * composition with `AND`, `OR` and negation
//!
//! Numbers are written with the shortest text that reads back to the same
//! value, so `5.2` stays `5.2` and `5.0` is written as `5`.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::datatype::{DataType, HostValue};
use crate::error::{Result, SolrmapError};
use crate::serializer::render_value;

lazy_static! {
    static ref SPECIAL_CHARACTERS: Regex =
        Regex::new(r#"(\+|-|&&|\|\||!|\{|\}|\[|\]|\^|\(|\)|"|~|:|;|\\|\?|\*|/)"#).unwrap();
    // local parameter values cannot be escaped
    static ref LOCAL_PARAM_FIELD: Regex = Regex::new(r"^[\w.\-]+$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryFragment(String);

impl QueryFragment {
    /// Matches every document.
    pub fn all() -> Self {
        QueryFragment("*:*".to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for QueryFragment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backslash-escapes query syntax characters and quotes values that contain
/// spaces or are empty.
pub fn quote(value: &str) -> String {
    let escaped = SPECIAL_CHARACTERS.replace_all(value, r"\${1}");
    if escaped.is_empty() || escaped.contains(' ') {
        format!("\"{}\"", escaped)
    } else {
        escaped.into_owned()
    }
}

fn field_name(field: Option<&str>) -> Result<String> {
    match field.map(str::trim) {
        Some(name) if !name.is_empty() => {
            let escaped = SPECIAL_CHARACTERS.replace_all(name, r"\${1}");
            Ok(escaped.replace(' ', "\\ "))
        }
        _ => Err(SolrmapError::MissingField),
    }
}

/// A field name usable as a local parameter value, as in `sfield=name`.
fn local_param_field(field: Option<&str>) -> Result<String> {
    match field.map(str::trim) {
        Some(name) if name.is_empty() => Err(SolrmapError::MissingField),
        Some(name) if LOCAL_PARAM_FIELD.is_match(name) => Ok(name.to_string()),
        Some(name) => Err(SolrmapError::InvalidFieldName(name.to_string())),
        None => Err(SolrmapError::MissingField),
    }
}

fn scalar_text(field: &str, value: &HostValue) -> Result<String> {
    render_value(value).ok_or_else(|| SolrmapError::ValueMismatch {
        field: field.to_string(),
        expected: "scalar".to_string(),
        found: value.kind().to_string(),
    })
}

// ------------- Field Queries --------------
/// `field:(value)` with the value escaped.
pub fn field_query(field: &str, value: &HostValue) -> Result<QueryFragment> {
    let name = field_name(Some(field))?;
    let text = scalar_text(field, value)?;
    Ok(QueryFragment(format!("{}:({})", name, quote(&text))))
}

/// `field:(value)` with the value passed through as query syntax.
pub fn field_query_unquoted(field: &str, value: &str) -> Result<QueryFragment> {
    let name = field_name(Some(field))?;
    Ok(QueryFragment(format!("{}:({})", name, value)))
}

// ------------- Range Queries --------------
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    field: String,
    from: Option<HostValue>,
    to: Option<HostValue>,
    inclusive_from: bool,
    inclusive_to: bool,
}

impl RangeQuery {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            from: None,
            to: None,
            inclusive_from: true,
            inclusive_to: true,
        }
    }
    /// Sets the lower bound; a null (e.g. `None::<i32>`) leaves it open.
    pub fn from<T: DataType>(mut self, value: T) -> Self {
        self.from = Some(value.into_host()).filter(|v| !v.is_null());
        self
    }
    /// Sets the upper bound; a null leaves it open.
    pub fn to<T: DataType>(mut self, value: T) -> Self {
        self.to = Some(value.into_host()).filter(|v| !v.is_null());
        self
    }
    pub fn exclusive(mut self) -> Self {
        self.inclusive_from = false;
        self.inclusive_to = false;
        self
    }
    pub fn inclusive(mut self, from: bool, to: bool) -> Self {
        self.inclusive_from = from;
        self.inclusive_to = to;
        self
    }

    fn bound(&self, value: &Option<HostValue>) -> Result<String> {
        match value {
            None => Ok("*".to_string()),
            Some(v @ (HostValue::Str(_) | HostValue::Enum(_))) => Ok(quote(&scalar_text(&self.field, v)?)),
            Some(v) => scalar_text(&self.field, v),
        }
    }

    pub fn build(&self) -> Result<QueryFragment> {
        let name = field_name(Some(&self.field))?;
        Ok(QueryFragment(format!(
            "{}:{}{} TO {}{}",
            name,
            if self.inclusive_from { '[' } else { '{' },
            self.bound(&self.from)?,
            self.bound(&self.to)?,
            if self.inclusive_to { ']' } else { '}' },
        )))
    }
}

/// An inclusive range; an absent (or null) bound is rendered as `*`.
pub fn build_range_query(field: &str, from: Option<HostValue>, to: Option<HostValue>) -> Result<QueryFragment> {
    let query = RangeQuery {
        from: from.filter(|v| !v.is_null()),
        to: to.filter(|v| !v.is_null()),
        ..RangeQuery::new(field)
    };
    query.build()
}

// ------------- Distance Queries --------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationAccuracy {
    /// Exact great-circle distance (`geofilt`).
    #[default]
    Radius,
    /// The enclosing bounding box (`bbox`), cheaper and less exact.
    BoundingBox,
}

impl CalculationAccuracy {
    fn operator(&self) -> &'static str {
        match self {
            CalculationAccuracy::Radius => "geofilt",
            CalculationAccuracy::BoundingBox => "bbox",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceQuery {
    field: String,
    latitude: f64,
    longitude: f64,
    distance: f64,
    accuracy: CalculationAccuracy,
}

impl DistanceQuery {
    /// Fails with `MissingField` on an absent or blank field,
    /// `InvalidFieldName` when the field is more than word characters, dots
    /// and dashes, `InvalidPoint` on non-finite coordinates and
    /// `InvalidDistance` unless `distance` is finite and non-negative.
    pub fn new<'a>(field: impl Into<Option<&'a str>>, latitude: f64, longitude: f64, distance: f64) -> Result<Self> {
        let field = local_param_field(field.into())?;
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(SolrmapError::InvalidPoint { latitude, longitude });
        }
        if !distance.is_finite() || distance < 0.0 {
            return Err(SolrmapError::InvalidDistance(distance));
        }
        Ok(Self {
            field,
            latitude,
            longitude,
            distance,
            accuracy: CalculationAccuracy::default(),
        })
    }
    pub fn with_accuracy(mut self, accuracy: CalculationAccuracy) -> Self {
        self.accuracy = accuracy;
        self
    }
    pub fn field(&self) -> &str {
        &self.field
    }
    pub fn accuracy(&self) -> CalculationAccuracy {
        self.accuracy
    }
    pub fn query(&self) -> QueryFragment {
        QueryFragment(format!(
            "{{!{} pt={},{} sfield={} d={}}}",
            self.accuracy.operator(),
            self.latitude,
            self.longitude,
            self.field,
            self.distance
        ))
    }
}

pub fn build_distance_query<'a>(
    field: impl Into<Option<&'a str>>,
    latitude: f64,
    longitude: f64,
    distance: f64,
    accuracy: Option<CalculationAccuracy>,
) -> Result<QueryFragment> {
    let query = DistanceQuery::new(field, latitude, longitude, distance)?;
    Ok(query.with_accuracy(accuracy.unwrap_or_default()).query())
}

// ------------- Composition --------------
fn combine(fragments: impl IntoIterator<Item = QueryFragment>, operator: &str) -> QueryFragment {
    let mut parts: Vec<String> = fragments.into_iter().map(QueryFragment::into_string).collect();
    match parts.len() {
        0 => QueryFragment::all(),
        1 => QueryFragment(parts.remove(0)),
        _ => {
            let separator = format!(" {} ", operator);
            QueryFragment(format!("({})", parts.join(separator.as_str())))
        }
    }
}

pub fn and(fragments: impl IntoIterator<Item = QueryFragment>) -> QueryFragment {
    combine(fragments, "AND")
}

pub fn or(fragments: impl IntoIterator<Item = QueryFragment>) -> QueryFragment {
    combine(fragments, "OR")
}

pub fn not(fragment: QueryFragment) -> QueryFragment {
    QueryFragment(format!("-{}", fragment.0))
}

// ------------- Fluent DSL --------------
/// Starts a query on `field`: `by("price").is(5)` or
/// `by("price").between(1).and(10)`.
pub fn by(field: &str) -> FieldSelector {
    FieldSelector {
        field: field.to_string(),
    }
}

pub fn by_range<F: DataType, T: DataType>(field: &str, from: F, to: T) -> Result<QueryFragment> {
    RangeQuery::new(field).from(from).to(to).build()
}

#[derive(Debug, Clone)]
pub struct FieldSelector {
    field: String,
}

impl FieldSelector {
    pub fn is<T: DataType>(&self, value: T) -> Result<QueryFragment> {
        field_query(&self.field, &value.into_host())
    }
    pub fn between<T: DataType>(&self, from: T) -> RangeStart {
        RangeStart {
            query: RangeQuery::new(&self.field).from(from),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RangeStart {
    query: RangeQuery,
}

impl RangeStart {
    pub fn and<T: DataType>(self, to: T) -> Result<QueryFragment> {
        self.query.to(to).build()
    }
}
