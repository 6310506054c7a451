//! Deserializable records for the files under `data/`.
//!
//! Every table file is a JSON array of these records. The structs mirror the
//! on-disk shape; cross-table checks live in `index.rs`.

use crate::catalog::identity::{SizeScheme, TableKind};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Uniform view over catalog records used by generic lookup, search and the
/// compatibility rules.
pub trait Record: std::fmt::Debug {
    fn table(&self) -> TableKind;

    fn id(&self) -> &str;

    /// Display field matched by `search`.
    fn label(&self) -> &str;

    /// Values of a named attribute, or `None` when the table has no such
    /// attribute. Scalar attributes yield a single entry.
    fn attribute(&self, name: &str) -> Option<Vec<&str>>;

    fn to_json(&self) -> serde_json::Result<Value>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BikeType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: String,
    pub name: String,
}

/// Category flattened out of its parent bike type at load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BikeCategory {
    pub id: String,
    pub name: String,
    pub bike_type: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Model families offered by the brand, in display order.
    #[serde(default)]
    pub family_ids: Vec<String>,
    /// Catch-all family used when the seller cannot name the exact model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_family_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    #[serde(default)]
    pub bike_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_range: Option<YearRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msrp_range: Option<PriceRange>,
    #[serde(default)]
    pub custom: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub from: i64,
    pub to: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub currency: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub name: String,
    pub manufacturer: String,
    pub category: String,
    #[serde(default)]
    pub bike_types: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub id: String,
    pub scheme: SizeScheme,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub id: String,
    pub name: String,
    pub hex: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub currencies: Vec<String>,
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub shipping_options: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub payment_methods: Vec<String>,
}

/// One code of an enumerated domain (frame materials, conditions, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

fn strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

impl Record for BikeType {
    fn table(&self) -> TableKind {
        TableKind::BikeTypes
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn attribute(&self, name: &str) -> Option<Vec<&str>> {
        match name {
            "categories" => Some(self.categories.iter().map(|c| c.id.as_str()).collect()),
            _ => None,
        }
    }
    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Record for BikeCategory {
    fn table(&self) -> TableKind {
        TableKind::BikeCategories
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn attribute(&self, name: &str) -> Option<Vec<&str>> {
        match name {
            "bike_type" => Some(vec![self.bike_type.as_str()]),
            _ => None,
        }
    }
    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Record for Brand {
    fn table(&self) -> TableKind {
        TableKind::Brands
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn attribute(&self, name: &str) -> Option<Vec<&str>> {
        match name {
            "families" => Some(strs(&self.family_ids)),
            "country" => Some(self.country.iter().map(String::as_str).collect()),
            _ => None,
        }
    }
    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Record for Model {
    fn table(&self) -> TableKind {
        TableKind::Models
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn attribute(&self, name: &str) -> Option<Vec<&str>> {
        match name {
            "brand_id" => Some(vec![self.brand_id.as_str()]),
            "bike_types" => Some(strs(&self.bike_types)),
            _ => None,
        }
    }
    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Record for Component {
    fn table(&self) -> TableKind {
        TableKind::Components
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn attribute(&self, name: &str) -> Option<Vec<&str>> {
        match name {
            "bike_types" => Some(strs(&self.bike_types)),
            "category" => Some(vec![self.category.as_str()]),
            "manufacturer" => Some(vec![self.manufacturer.as_str()]),
            _ => None,
        }
    }
    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Record for Size {
    fn table(&self) -> TableKind {
        TableKind::Sizes
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.label
    }
    fn attribute(&self, name: &str) -> Option<Vec<&str>> {
        match name {
            "scheme" => Some(vec![self.scheme.as_str()]),
            _ => None,
        }
    }
    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Record for Color {
    fn table(&self) -> TableKind {
        TableKind::Colors
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn attribute(&self, _name: &str) -> Option<Vec<&str>> {
        None
    }
    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Record for Country {
    fn table(&self) -> TableKind {
        TableKind::Countries
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn attribute(&self, name: &str) -> Option<Vec<&str>> {
        match name {
            "currencies" => Some(strs(&self.currencies)),
            "shipping_options" => Some(strs(&self.shipping_options)),
            "cities" => Some(strs(&self.cities)),
            _ => None,
        }
    }
    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Record for Currency {
    fn table(&self) -> TableKind {
        TableKind::Currencies
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn attribute(&self, name: &str) -> Option<Vec<&str>> {
        match name {
            "payment_methods" => Some(strs(&self.payment_methods)),
            _ => None,
        }
    }
    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Read a JSON document from disk without further validation.
pub fn read_json_file(path: &Path) -> Result<Value> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value = serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}

/// Convert an already-parsed table document into typed records.
pub fn parse_records<T: DeserializeOwned>(value: Value, path: &Path) -> Result<Vec<T>> {
    serde_json::from_value(value).with_context(|| format!("decoding records in {}", path.display()))
}
