// src/schema/mod.rs

//! JSON Hyper-Schema document types.
//!
//! This is a deliberately small subset of Hyper-Schema: enough structure to
//! walk `definitions`, `properties`, and `links[*].schema` /
//! `links[*].targetSchema`, plus an open `extras` bag per node that carries
//! this tool's `table` / `column` annotations (and anything else a real
//! hyper-schema document puts alongside them, which we ignore).

pub mod ingest;

use serde::Deserialize;
use std::collections::BTreeMap;

/// A schema document: table/column annotations live in `definitions`,
/// `properties`, and the schemas reachable through `links`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HyperSchema {
    #[serde(default)]
    pub definitions: BTreeMap<String, SchemaNode>,
    #[serde(default)]
    pub properties: BTreeMap<String, SchemaNode>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// One node in the schema tree. `table` / `column` / `foreign_key`
/// annotations arrive as arbitrary JSON in `extras` and are validated lazily
/// by [`ingest`] against the shape the annotation is supposed to have.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaNode {
    #[serde(default)]
    pub properties: BTreeMap<String, SchemaNode>,
    #[serde(flatten)]
    pub extras: BTreeMap<String, serde_json::Value>,
}

/// A hyper-schema link. Only `schema` and `targetSchema` are relevant here —
/// both may carry their own `table` annotation.
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default)]
    pub schema: Option<Box<SchemaNode>>,
    #[serde(default, rename = "targetSchema")]
    pub target_schema: Option<Box<SchemaNode>>,
}

/// Parse a hyper-schema document from its YAML or JSON text form.
pub fn parse(text: &str, format: SchemaFormat) -> crate::error::Result<HyperSchema> {
    match format {
        SchemaFormat::Yaml => Ok(serde_yaml::from_str(text)?),
        SchemaFormat::Json => Ok(serde_json::from_str(text)?),
    }
}

/// Source format of a hyper-schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Yaml,
    Json,
}
