// used for timestamps on the wire
use chrono::NaiveDateTime;
// used for fixed precision decimal numbers
use rust_decimal::Decimal;
// used for unique identifiers
use uuid::Uuid;

// used for sets of host values
use std::collections::BTreeSet;
// used to print out readable forms of a target type
use std::fmt;

/// Structured descriptor of a requested host type.
///
/// A descriptor decomposes into a base type, a nullability flag and, for
/// collections, exactly one level of element type. `Map`, `UntypedCollection`
/// and `Other` describe host types that exist but that no parser accepts;
/// they are there so the accept/reject boundaries can be stated and tested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetType {
    Str,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Bool,
    Date,
    Guid,
    Enum(EnumType),
    Nullable(Box<TargetType>),
    Array(Box<TargetType>),
    List(Box<TargetType>),
    Set(Box<TargetType>),
    Map(Box<TargetType>, Box<TargetType>),
    UntypedCollection,
    Other(String),
}

impl TargetType {
    pub fn nullable(inner: TargetType) -> Self {
        TargetType::Nullable(Box::new(inner))
    }
    pub fn array(element: TargetType) -> Self {
        TargetType::Array(Box::new(element))
    }
    pub fn list(element: TargetType) -> Self {
        TargetType::List(Box::new(element))
    }
    pub fn set(element: TargetType) -> Self {
        TargetType::Set(Box::new(element))
    }
    pub fn map(key: TargetType, value: TargetType) -> Self {
        TargetType::Map(Box::new(key), Box::new(value))
    }
    pub fn is_nullable(&self) -> bool {
        matches!(self, TargetType::Nullable(_))
    }
    /// The type with one level of nullability removed.
    pub fn base(&self) -> &TargetType {
        match self {
            TargetType::Nullable(inner) => inner,
            other => other,
        }
    }
    /// The element type of an ordered sequence, set or array.
    pub fn element(&self) -> Option<&TargetType> {
        match self.base() {
            TargetType::Array(e) | TargetType::List(e) | TargetType::Set(e) => Some(e),
            _ => None,
        }
    }
    pub fn is_collection(&self) -> bool {
        self.element().is_some()
    }
    pub fn is_scalar(&self) -> bool {
        matches!(
            self.base(),
            TargetType::Str
                | TargetType::Int
                | TargetType::Long
                | TargetType::Float
                | TargetType::Double
                | TargetType::Decimal
                | TargetType::Bool
                | TargetType::Date
                | TargetType::Guid
                | TargetType::Enum(_)
        )
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TargetType::Str => write!(f, "String"),
            TargetType::Int => write!(f, "Int"),
            TargetType::Long => write!(f, "Long"),
            TargetType::Float => write!(f, "Float"),
            TargetType::Double => write!(f, "Double"),
            TargetType::Decimal => write!(f, "Decimal"),
            TargetType::Bool => write!(f, "Bool"),
            TargetType::Date => write!(f, "Date"),
            TargetType::Guid => write!(f, "Guid"),
            TargetType::Enum(e) => write!(f, "{}", e.name()),
            TargetType::Nullable(inner) => write!(f, "Nullable<{}>", inner),
            TargetType::Array(e) => write!(f, "Array<{}>", e),
            TargetType::List(e) => write!(f, "List<{}>", e),
            TargetType::Set(e) => write!(f, "Set<{}>", e),
            TargetType::Map(k, v) => write!(f, "Map<{}, {}>", k, v),
            TargetType::UntypedCollection => write!(f, "Collection"),
            TargetType::Other(name) => write!(f, "{}", name),
        }
    }
}

// ------------- Enums --------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumType {
    name: String,
    members: Vec<String>,
}

impl EnumType {
    pub fn new(name: &str, members: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn members(&self) -> &[String] {
        &self.members
    }
    /// Case-sensitive lookup of a declared member.
    pub fn member(&self, name: &str) -> Option<EnumMember> {
        self.members
            .iter()
            .position(|m| m == name)
            .map(|ordinal| EnumMember::new(&self.name, name, ordinal))
    }
    pub fn contains(&self, member: &EnumMember) -> bool {
        member.type_name == self.name
            && self.members.get(member.ordinal).map(String::as_str) == Some(member.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumMember {
    type_name: String,
    name: String,
    ordinal: usize,
}

impl EnumMember {
    pub fn new(type_name: &str, name: &str, ordinal: usize) -> Self {
        Self {
            type_name: type_name.to_string(),
            name: name.to_string(),
            ordinal,
        }
    }
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}

// ------------- Host Values --------------
/// A converted value, shaped by the TargetType it was requested as.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Str(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Bool(bool),
    Date(NaiveDateTime),
    Guid(Uuid),
    Enum(EnumMember),
    Array(Vec<HostValue>),
    List(Vec<HostValue>),
    /// Distinct by value equality, in first-seen order.
    Set(Vec<HostValue>),
}

impl HostValue {
    /// Builds a set, dropping repeated values.
    pub fn set_of(values: Vec<HostValue>) -> Self {
        let mut distinct: Vec<HostValue> = Vec::with_capacity(values.len());
        for v in values {
            if !distinct.contains(&v) {
                distinct.push(v);
            }
        }
        HostValue::Set(distinct)
    }
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Null => "Null",
            HostValue::Str(_) => "String",
            HostValue::Int(_) => "Int",
            HostValue::Long(_) => "Long",
            HostValue::Float(_) => "Float",
            HostValue::Double(_) => "Double",
            HostValue::Decimal(_) => "Decimal",
            HostValue::Bool(_) => "Bool",
            HostValue::Date(_) => "Date",
            HostValue::Guid(_) => "Guid",
            HostValue::Enum(_) => "Enum",
            HostValue::Array(_) => "Array",
            HostValue::List(_) => "List",
            HostValue::Set(_) => "Set",
        }
    }
    /// The elements of a collection value.
    pub fn elements(&self) -> Option<&[HostValue]> {
        match self {
            HostValue::Array(v) | HostValue::List(v) | HostValue::Set(v) => Some(v),
            _ => None,
        }
    }
}

/// Binds a concrete Rust type to the TargetType it is requested as and to
/// the [`HostValue`] shape the registry produces for it.
pub trait DataType: Sized {
    // static stuff which needs to be implemented downstream
    const DATA_TYPE: &'static str;
    fn target_type() -> TargetType;
    fn from_host(value: HostValue) -> Option<Self>;
    fn into_host(self) -> HostValue;
    // instance callable with pre-made implementation
    fn data_type(&self) -> &'static str {
        Self::DATA_TYPE
    }
}

// ------------- Data Types --------------
macro_rules! scalar_data_type {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl DataType for $ty {
            const DATA_TYPE: &'static str = $name;
            fn target_type() -> TargetType {
                TargetType::$variant
            }
            fn from_host(value: HostValue) -> Option<Self> {
                match value {
                    HostValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
            fn into_host(self) -> HostValue {
                HostValue::$variant(self)
            }
        }
    };
}

scalar_data_type!(String, Str, "String");
scalar_data_type!(i32, Int, "Int");
scalar_data_type!(i64, Long, "Long");
scalar_data_type!(f32, Float, "Float");
scalar_data_type!(f64, Double, "Double");
scalar_data_type!(Decimal, Decimal, "Decimal");
scalar_data_type!(bool, Bool, "Bool");
scalar_data_type!(NaiveDateTime, Date, "Date");
scalar_data_type!(Uuid, Guid, "Guid");

impl<T: DataType> DataType for Option<T> {
    const DATA_TYPE: &'static str = "Nullable";
    fn target_type() -> TargetType {
        TargetType::nullable(T::target_type())
    }
    fn from_host(value: HostValue) -> Option<Self> {
        match value {
            HostValue::Null => Some(None),
            other => T::from_host(other).map(Some),
        }
    }
    fn into_host(self) -> HostValue {
        match self {
            Some(v) => v.into_host(),
            None => HostValue::Null,
        }
    }
}

impl<T: DataType> DataType for Vec<T> {
    const DATA_TYPE: &'static str = "List";
    fn target_type() -> TargetType {
        TargetType::list(T::target_type())
    }
    fn from_host(value: HostValue) -> Option<Self> {
        match value {
            HostValue::Array(v) | HostValue::List(v) | HostValue::Set(v) => {
                v.into_iter().map(T::from_host).collect()
            }
            _ => None,
        }
    }
    fn into_host(self) -> HostValue {
        HostValue::List(self.into_iter().map(DataType::into_host).collect())
    }
}

impl<T: DataType + Ord> DataType for BTreeSet<T> {
    const DATA_TYPE: &'static str = "Set";
    fn target_type() -> TargetType {
        TargetType::set(T::target_type())
    }
    fn from_host(value: HostValue) -> Option<Self> {
        match value {
            HostValue::Array(v) | HostValue::List(v) | HostValue::Set(v) => {
                v.into_iter().map(T::from_host).collect()
            }
            _ => None,
        }
    }
    fn into_host(self) -> HostValue {
        HostValue::Set(self.into_iter().map(DataType::into_host).collect())
    }
}

/// Declares a fieldless host enum that converts by member name.
///
/// ```
/// solrmap::solr_enum! {
///     pub enum Numbers { One, Two }
/// }
/// use solrmap::datatype::DataType;
/// assert_eq!(Numbers::target_type().to_string(), "Numbers");
/// ```
#[macro_export]
macro_rules! solr_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($member:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($member),+
        }

        impl $crate::datatype::DataType for $name {
            const DATA_TYPE: &'static str = stringify!($name);
            fn target_type() -> $crate::datatype::TargetType {
                $crate::datatype::TargetType::Enum($crate::datatype::EnumType::new(
                    stringify!($name),
                    &[$(stringify!($member)),+],
                ))
            }
            fn from_host(value: $crate::datatype::HostValue) -> Option<Self> {
                let member = match value {
                    $crate::datatype::HostValue::Enum(member) => member,
                    _ => return None,
                };
                if member.type_name() != stringify!($name) {
                    return None;
                }
                $(
                    if member.name() == stringify!($member) {
                        return Some($name::$member);
                    }
                )+
                None
            }
            fn into_host(self) -> $crate::datatype::HostValue {
                let name = match self {
                    $($name::$member => stringify!($member),)+
                };
                $crate::datatype::HostValue::Enum($crate::datatype::EnumMember::new(
                    stringify!($name),
                    name,
                    self as usize,
                ))
            }
        }
    };
}
