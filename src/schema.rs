//! Schema document model and the schema-aware field resolver.
//!
//! A [`SchemaDocument`] is built by an external loader (or read from the
//! engine's JSON schema listing with [`SchemaDocument::from_json`]) and is
//! read-only afterwards. The [`SchemaResolver`] owns one and answers field
//! lookups: exact declarations first, then dynamic field patterns in
//! declaration order.

// other lookups use HashMap with a fast hasher for field names
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::datatype::TargetType;
use crate::error::{Result, SolrmapError};

pub type FieldHasher = BuildHasherDefault<SeaHasher>;

fn yes() -> bool {
    true
}

// ------------- Fields --------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    multi_valued: bool,
    #[serde(default = "yes")]
    indexed: bool,
    #[serde(default = "yes")]
    stored: bool,
    #[serde(default)]
    doc_values: bool,
}

impl SchemaField {
    /// A field with the engine's attribute defaults: indexed and stored,
    /// optional, single-valued, without doc values.
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            required: false,
            multi_valued: false,
            indexed: true,
            stored: true,
            doc_values: false,
        }
    }
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
    pub fn multi_valued(mut self) -> Self {
        self.multi_valued = true;
        self
    }
    pub fn not_indexed(mut self) -> Self {
        self.indexed = false;
        self
    }
    pub fn not_stored(mut self) -> Self {
        self.stored = false;
        self
    }
    pub fn doc_values(mut self) -> Self {
        self.doc_values = true;
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
    pub fn is_required(&self) -> bool {
        self.required
    }
    pub fn is_multi_valued(&self) -> bool {
        self.multi_valued
    }
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }
    pub fn is_stored(&self) -> bool {
        self.stored
    }
    pub fn is_doc_values(&self) -> bool {
        self.doc_values
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFieldType {
    name: String,
    #[serde(rename = "class")]
    implementation_type: String,
}

impl SchemaFieldType {
    pub fn new(name: &str, implementation_type: &str) -> Self {
        Self {
            name: name.to_string(),
            implementation_type: implementation_type.to_string(),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn implementation_type(&self) -> &str {
        &self.implementation_type
    }
    /// The scalar host type values of this field type usually map to,
    /// judged from the implementation class. `None` for classes without an
    /// obvious scalar counterpart (spatial, currency, binary, ...).
    pub fn target_hint(&self) -> Option<TargetType> {
        let class = self.implementation_type.rsplit('.').next().unwrap_or_default();
        let hint = match class {
            "StrField" | "TextField" | "SortableTextField" => TargetType::Str,
            "IntPointField" | "TrieIntField" | "IntField" => TargetType::Int,
            "LongPointField" | "TrieLongField" | "LongField" => TargetType::Long,
            "FloatPointField" | "TrieFloatField" | "FloatField" => TargetType::Float,
            "DoublePointField" | "TrieDoubleField" | "DoubleField" => TargetType::Double,
            "BoolField" => TargetType::Bool,
            "DatePointField" | "TrieDateField" | "DateField" => TargetType::Date,
            "UUIDField" => TargetType::Guid,
            _ => return None,
        };
        Some(hint)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyField {
    source: String,
    #[serde(rename = "dest")]
    destination: String,
}

impl CopyField {
    pub fn new(source: &str, destination: &str) -> Self {
        Self {
            source: source.to_string(),
            destination: destination.to_string(),
        }
    }
    pub fn source(&self) -> &str {
        &self.source
    }
    pub fn destination(&self) -> &str {
        &self.destination
    }
}

// ------------- Dynamic Field Patterns --------------
#[derive(Debug, Clone, PartialEq, Eq)]
enum Wildcard {
    Leading(String),
    Trailing(String),
}

/// A field-name rule with exactly one `*`, either first or last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicFieldPattern {
    pattern: String,
    wildcard: Wildcard,
}

impl DynamicFieldPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.matches('*').count() != 1 {
            return Err(SolrmapError::InvalidPattern(pattern.to_string()));
        }
        let wildcard = if let Some(suffix) = pattern.strip_prefix('*') {
            Wildcard::Leading(suffix.to_string())
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            Wildcard::Trailing(prefix.to_string())
        } else {
            return Err(SolrmapError::InvalidPattern(pattern.to_string()));
        };
        Ok(Self {
            pattern: pattern.to_string(),
            wildcard,
        })
    }
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
    pub fn matches(&self, name: &str) -> bool {
        match &self.wildcard {
            Wildcard::Leading(suffix) => name.ends_with(suffix.as_str()),
            Wildcard::Trailing(prefix) => name.starts_with(prefix.as_str()),
        }
    }
}

impl fmt::Display for DynamicFieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

// ------------- Schema Document --------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    #[serde(default)]
    fields: Vec<SchemaField>,
    #[serde(default)]
    field_types: Vec<SchemaFieldType>,
    #[serde(default)]
    dynamic_fields: Vec<SchemaField>,
    #[serde(default)]
    copy_fields: Vec<CopyField>,
    #[serde(default)]
    unique_key: Option<String>,
}

impl SchemaDocument {
    pub fn new() -> Self {
        Self::default()
    }
    /// Reads the engine's JSON schema listing, either the bare schema object
    /// or the `{"schema": {...}}` envelope.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let schema = match value {
            serde_json::Value::Object(mut map) if map.contains_key("schema") => {
                map.remove("schema").unwrap_or_default()
            }
            other => other,
        };
        Ok(serde_json::from_value(schema)?)
    }
    pub fn with_field(mut self, field: SchemaField) -> Self {
        self.fields.push(field);
        self
    }
    pub fn with_field_type(mut self, field_type: SchemaFieldType) -> Self {
        self.field_types.push(field_type);
        self
    }
    /// Adds a dynamic field; its name is the pattern.
    pub fn with_dynamic_field(mut self, field: SchemaField) -> Self {
        self.dynamic_fields.push(field);
        self
    }
    pub fn with_copy_field(mut self, copy_field: CopyField) -> Self {
        self.copy_fields.push(copy_field);
        self
    }
    pub fn with_unique_key(mut self, unique_key: &str) -> Self {
        self.unique_key = Some(unique_key.to_string());
        self
    }
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }
    pub fn field_types(&self) -> &[SchemaFieldType] {
        &self.field_types
    }
    pub fn dynamic_fields(&self) -> &[SchemaField] {
        &self.dynamic_fields
    }
    pub fn copy_fields(&self) -> &[CopyField] {
        &self.copy_fields
    }
    /// The unique key field name. A missing declaration and a blank one both
    /// read as `None`.
    pub fn unique_key(&self) -> Option<&str> {
        self.unique_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

// ------------- Resolver --------------
/// A field reference resolved against the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedField<'a> {
    field: &'a SchemaField,
    pattern: Option<&'a DynamicFieldPattern>,
}

impl<'a> ResolvedField<'a> {
    /// The declared field, or the dynamic field whose pattern matched.
    pub fn field(&self) -> &'a SchemaField {
        self.field
    }
    pub fn is_dynamic(&self) -> bool {
        self.pattern.is_some()
    }
    pub fn pattern(&self) -> Option<&'a DynamicFieldPattern> {
        self.pattern
    }
}

#[derive(Debug, Clone)]
pub struct SchemaResolver {
    schema: SchemaDocument,
    fields_by_name: HashMap<String, usize, FieldHasher>,
    types_by_name: HashMap<String, usize, FieldHasher>,
    patterns: Vec<DynamicFieldPattern>,
    default_field: Option<String>,
}

impl SchemaResolver {
    /// Indexes the schema. Fails with `InvalidPattern` when a dynamic field
    /// name is not a single leading or trailing wildcard. On duplicate names
    /// the first declaration wins.
    pub fn new(schema: SchemaDocument) -> Result<Self> {
        let mut fields_by_name = HashMap::<String, usize, FieldHasher>::default();
        for (i, field) in schema.fields.iter().enumerate() {
            fields_by_name.entry(field.name.clone()).or_insert(i);
        }
        let mut types_by_name = HashMap::<String, usize, FieldHasher>::default();
        for (i, field_type) in schema.field_types.iter().enumerate() {
            types_by_name.entry(field_type.name.clone()).or_insert(i);
        }
        let patterns = schema
            .dynamic_fields
            .iter()
            .map(|f| DynamicFieldPattern::new(&f.name))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            fields = schema.fields.len(),
            dynamic_fields = patterns.len(),
            field_types = schema.field_types.len(),
            unique_key = ?schema.unique_key(),
            "schema resolver built"
        );
        Ok(Self {
            schema,
            fields_by_name,
            types_by_name,
            patterns,
            default_field: None,
        })
    }
    /// Sets the field that [`SchemaResolver::resolve_or_default`] falls back to.
    pub fn with_default_field(mut self, default_field: Option<String>) -> Self {
        self.default_field = default_field;
        self
    }
    pub fn schema(&self) -> &SchemaDocument {
        &self.schema
    }
    pub fn unique_key(&self) -> Option<&str> {
        self.schema.unique_key()
    }
    pub fn resolve_field(&self, name: &str) -> Option<ResolvedField<'_>> {
        if let Some(&i) = self.fields_by_name.get(name) {
            return Some(ResolvedField {
                field: &self.schema.fields[i],
                pattern: None,
            });
        }
        self.patterns
            .iter()
            .position(|p| p.matches(name))
            .map(|i| ResolvedField {
                field: &self.schema.dynamic_fields[i],
                pattern: Some(&self.patterns[i]),
            })
    }
    /// Like [`SchemaResolver::resolve_field`], falling back to the configured
    /// default field when `name` is unresolved.
    pub fn resolve_or_default(&self, name: &str) -> Option<ResolvedField<'_>> {
        self.resolve_field(name).or_else(|| {
            let default_field = self.default_field.as_deref()?;
            debug!(field = name, default_field, "falling back to default field");
            self.resolve_field(default_field)
        })
    }
    pub fn field_type(&self, field: &SchemaField) -> Option<&SchemaFieldType> {
        self.types_by_name
            .get(field.type_name())
            .map(|&i| &self.schema.field_types[i])
    }
    /// The host type suggested by the schema for a field: the field type's
    /// hint, as a list when the field is multi-valued.
    pub fn target_hint(&self, name: &str) -> Option<TargetType> {
        let resolved = self.resolve_field(name)?;
        let hint = self.field_type(resolved.field())?.target_hint()?;
        if resolved.field().is_multi_valued() {
            Some(TargetType::list(hint))
        } else {
            Some(hint)
        }
    }
    /// Destinations that values written to `source` are copied into.
    pub fn copy_destinations(&self, source: &str) -> Vec<&str> {
        self.schema
            .copy_fields
            .iter()
            .filter(|c| c.source == source)
            .map(|c| c.destination.as_str())
            .collect()
    }
}
