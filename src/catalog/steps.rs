//! The six-step listing schema stored in `data/listing_schema.json`.
//!
//! Steps name their fields; `fields` gives each field a kind; the two rule
//! lists are declarative records that the validator evaluates uniformly.
//! `ListingSchema::check` enforces the structural invariants at load so the
//! validator can assume every name it meets is declared.

use crate::catalog::identity::TableKind;
use crate::catalog::model::OptionEntry;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const STEP_COUNT: u8 = 6;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListingSchema {
    pub schema_version: String,
    pub steps: Vec<StepSchema>,
    pub fields: BTreeMap<String, FieldSpec>,
    #[serde(default)]
    pub conditional_rules: Vec<ConditionalRule>,
    #[serde(default)]
    pub compatibility_rules: Vec<CompatibilityRule>,
    pub photo_guidelines: PhotoGuidelines,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepSchema {
    pub step: u8,
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
}

impl StepSchema {
    /// Required fields first, then optional ones, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .map(String::as_str)
    }

    pub fn owns(&self, field: &str) -> bool {
        self.fields().any(|name| name == field)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// Value domain of a draft field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Id of a record in a catalog table.
    Reference { table: TableKind },
    /// One code from an option group.
    OneOf { group: String },
    /// A list of codes from an option group.
    ManyOf { group: String },
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        greater_than: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        at_most: Option<f64>,
    },
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    Boolean,
    Photos { min_count: usize, max_count: usize },
}

impl FieldKind {
    pub fn option_group(&self) -> Option<&str> {
        match self {
            FieldKind::OneOf { group } | FieldKind::ManyOf { group } => Some(group.as_str()),
            _ => None,
        }
    }
}

/// Adds `require` to the effective required set when `when.field` equals
/// `when.equals` exactly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConditionalRule {
    pub when: FieldMatch,
    pub require: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldMatch {
    pub field: String,
    pub equals: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompatibilityRule {
    /// `field` may only carry a value while `trigger` holds one of `values`.
    AllowedWhen {
        field: String,
        trigger: String,
        values: Vec<Value>,
    },
    /// Every value of `field` must appear in `attribute` of the record that
    /// `reference` points to.
    ListedIn {
        field: String,
        reference: String,
        attribute: String,
    },
}

impl CompatibilityRule {
    /// The constrained field and the field it is checked against.
    pub fn fields(&self) -> (&str, &str) {
        match self {
            CompatibilityRule::AllowedWhen { field, trigger, .. } => {
                (field.as_str(), trigger.as_str())
            }
            CompatibilityRule::ListedIn {
                field, reference, ..
            } => (field.as_str(), reference.as_str()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhotoGuidelines {
    pub formats: Vec<String>,
    pub min_width: u32,
    pub min_height: u32,
    pub max_file_size_mb: u32,
    #[serde(default)]
    pub recommended_shots: Vec<ShotGuideline>,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShotGuideline {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

impl ListingSchema {
    pub fn step(&self, number: u8) -> Option<&StepSchema> {
        self.steps.iter().find(|step| step.step == number)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Step that owns `field`.
    pub fn step_of(&self, field: &str) -> Option<u8> {
        self.steps
            .iter()
            .find(|step| step.owns(field))
            .map(|step| step.step)
    }

    /// A compatibility rule is checked in the step where its later field
    /// lives, which is the first step where both can be filled.
    pub fn rule_step(&self, rule: &CompatibilityRule) -> Option<u8> {
        let (field, other) = rule.fields();
        Some(self.step_of(field)?.max(self.step_of(other)?))
    }

    /// Structural checks run once at load. Any failure is fatal.
    pub fn check(&self, options: &BTreeMap<String, Vec<OptionEntry>>) -> Result<()> {
        if self.schema_version.trim().is_empty() {
            bail!("listing schema_version must not be empty");
        }
        if self.steps.len() != usize::from(STEP_COUNT) {
            bail!(
                "listing schema must declare {STEP_COUNT} steps, found {}",
                self.steps.len()
            );
        }

        let mut owners: BTreeMap<&str, u8> = BTreeMap::new();
        for (position, step) in self.steps.iter().enumerate() {
            let expected = position + 1;
            if usize::from(step.step) != expected {
                bail!("step at position {expected} is numbered {}", step.step);
            }
            for field in step.fields() {
                if !self.fields.contains_key(field) {
                    bail!("step {} lists undeclared field {field}", step.step);
                }
                if let Some(previous) = owners.insert(field, step.step) {
                    bail!(
                        "field {field} is listed by both step {previous} and step {}",
                        step.step
                    );
                }
            }
        }

        for (name, spec) in &self.fields {
            if !owners.contains_key(name.as_str()) {
                bail!("field {name} is declared but not assigned to any step");
            }
            check_kind(name, &spec.kind, options)?;
        }

        let declared = |field: &str| self.fields.contains_key(field);
        for (position, rule) in self.conditional_rules.iter().enumerate() {
            if !declared(rule.when.field.as_str()) {
                bail!(
                    "conditional rule {position} triggers on undeclared field {}",
                    rule.when.field
                );
            }
            if rule.require.is_empty() {
                bail!("conditional rule {position} requires nothing");
            }
            if let Some(field) = rule.require.iter().find(|field| !declared(field.as_str())) {
                bail!("conditional rule {position} requires undeclared field {field}");
            }
        }

        for (position, rule) in self.compatibility_rules.iter().enumerate() {
            let (field, other) = rule.fields();
            for name in [field, other] {
                if !declared(name) {
                    bail!("compatibility rule {position} references undeclared field {name}");
                }
            }
            match rule {
                CompatibilityRule::AllowedWhen { values, .. } => {
                    if values.is_empty() {
                        bail!("compatibility rule {position} allows no trigger values");
                    }
                }
                CompatibilityRule::ListedIn {
                    reference,
                    attribute,
                    ..
                } => {
                    let Some(FieldKind::Reference { table }) =
                        self.fields.get(reference).map(|spec| &spec.kind)
                    else {
                        bail!(
                            "compatibility rule {position} uses {reference}, which is not a reference field"
                        );
                    };
                    if !table.attributes().contains(&attribute.as_str()) {
                        bail!(
                            "compatibility rule {position} reads unknown attribute {attribute} of {table}"
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

fn check_kind(
    name: &str,
    kind: &FieldKind,
    options: &BTreeMap<String, Vec<OptionEntry>>,
) -> Result<()> {
    match kind {
        FieldKind::OneOf { group } | FieldKind::ManyOf { group } => {
            if !options.contains_key(group) {
                bail!("field {name} uses unknown option group {group}");
            }
        }
        FieldKind::Integer {
            min: Some(min),
            max: Some(max),
        } if min > max => {
            bail!("field {name} has min {min} above max {max}");
        }
        FieldKind::Photos {
            min_count,
            max_count,
        } if min_count > max_count || *max_count == 0 => {
            bail!("field {name} has an empty photo count range {min_count}..={max_count}");
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> BTreeMap<String, Vec<OptionEntry>> {
        BTreeMap::from([(
            "suspension_types".to_string(),
            vec![OptionEntry {
                code: "hardtail".to_string(),
                name: "Hardtail".to_string(),
                description: String::new(),
            }],
        )])
    }

    fn minimal_schema() -> Value {
        let steps: Vec<Value> = (1..=6)
            .map(|n| {
                json!({
                    "step": n,
                    "key": format!("step_{n}"),
                    "title": format!("Step {n}"),
                    "required": [format!("field_{n}")],
                })
            })
            .collect();
        let mut fields = serde_json::Map::new();
        for n in 1..=6 {
            fields.insert(format!("field_{n}"), json!({"kind": "text"}));
        }
        json!({
            "schema_version": "listing_schema_v1",
            "steps": steps,
            "fields": fields,
            "photo_guidelines": {
                "formats": ["jpg"],
                "min_width": 800,
                "min_height": 600,
                "max_file_size_mb": 10
            }
        })
    }

    #[test]
    fn minimal_schema_passes() {
        let schema: ListingSchema = serde_json::from_value(minimal_schema()).unwrap();
        schema.check(&options()).unwrap();
        assert_eq!(schema.step_of("field_4"), Some(4));
    }

    #[test]
    fn field_kinds_deserialize_from_flat_objects() {
        let spec: FieldSpec = serde_json::from_value(json!({
            "description": "Rear travel",
            "kind": "integer",
            "min": 0,
            "max": 250
        }))
        .unwrap();
        assert_eq!(
            spec.kind,
            FieldKind::Integer {
                min: Some(0),
                max: Some(250)
            }
        );
    }

    #[test]
    fn field_in_two_steps_is_rejected() {
        let mut raw = minimal_schema();
        raw["steps"][1]["optional"] = json!(["field_1"]);
        let schema: ListingSchema = serde_json::from_value(raw).unwrap();
        let err = schema.check(&options()).unwrap_err();
        assert!(err.to_string().contains("field_1"));
    }

    #[test]
    fn rule_on_undeclared_field_is_rejected() {
        let mut raw = minimal_schema();
        raw["conditional_rules"] = json!([
            {"when": {"field": "field_1", "equals": "x"}, "require": ["ghost"]}
        ]);
        let schema: ListingSchema = serde_json::from_value(raw).unwrap();
        assert!(schema.check(&options()).is_err());
    }

    #[test]
    fn listed_in_requires_reference_field() {
        let mut raw = minimal_schema();
        raw["compatibility_rules"] = json!([
            {"kind": "listed_in", "field": "field_2", "reference": "field_1", "attribute": "bike_types"}
        ]);
        let schema: ListingSchema = serde_json::from_value(raw).unwrap();
        let err = schema.check(&options()).unwrap_err();
        assert!(err.to_string().contains("not a reference field"));
    }

    #[test]
    fn unknown_option_group_is_rejected() {
        let mut raw = minimal_schema();
        raw["fields"]["field_3"] = json!({"kind": "one_of", "group": "frame_materials"});
        let schema: ListingSchema = serde_json::from_value(raw).unwrap();
        assert!(schema.check(&options()).is_err());
    }

    #[test]
    fn rule_step_is_the_later_of_both_fields() {
        let mut raw = minimal_schema();
        raw["compatibility_rules"] = json!([
            {"kind": "allowed_when", "field": "field_2", "trigger": "field_1", "values": ["x"]}
        ]);
        let schema: ListingSchema = serde_json::from_value(raw).unwrap();
        assert_eq!(schema.rule_step(&schema.compatibility_rules[0]), Some(2));
    }
}
