//! Runtime settings, read with the `config` crate.
//!
//! Sources, later ones overriding earlier ones:
//! 1. built-in defaults
//! 2. an optional settings file (format chosen by extension)
//! 3. environment variables prefixed `SOLRMAP_`, with `__` between levels,
//!    e.g. `SOLRMAP_QUERY__DEFAULT_ACCURACY=bounding_box`
//!
//! ```toml
//! [query]
//! default_accuracy = "bounding_box"
//!
//! [mapping]
//! default_field = "text"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::query::{CalculationAccuracy, DistanceQuery, QueryFragment};
use crate::schema::{SchemaDocument, SchemaResolver};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub query: QuerySettings,
    pub mapping: MappingSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    pub default_accuracy: CalculationAccuracy,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MappingSettings {
    pub default_field: Option<String>,
}

impl Settings {
    /// Loads settings from `path` (if given and present) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("SOLRMAP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }

    /// A resolver over `schema` that falls back to the configured default field.
    pub fn resolver(&self, schema: SchemaDocument) -> Result<SchemaResolver> {
        Ok(SchemaResolver::new(schema)?.with_default_field(self.mapping.default_field.clone()))
    }
}

impl QuerySettings {
    /// A distance filter using the configured accuracy.
    pub fn distance<'a>(
        &self,
        field: impl Into<Option<&'a str>>,
        latitude: f64,
        longitude: f64,
        distance: f64,
    ) -> Result<QueryFragment> {
        let query = DistanceQuery::new(field, latitude, longitude, distance)?;
        Ok(query.with_accuracy(self.default_accuracy).query())
    }
}
