//! Six-step listing validation.
//!
//! `Validator` is a thin borrow of the catalog. Validating a step computes the
//! effective required fields (unconditional plus every conditional rule whose
//! trigger matches), then checks presence, per-field domains, the references
//! its rules read from other steps and the compatibility rules that belong to
//! the step. Every violation is collected;
//! nothing short-circuits, and the same input always yields the same list in
//! the same order.

mod checks;
mod report;

pub use checks::Photo;
pub(crate) use checks::check_value;
pub use report::{FieldError, FieldRequirements, ListingReport, StepReport};

use crate::catalog::{Catalog, CompatibilityRule, FieldKind, StepSchema};
use crate::draft::{Draft, describe, id_of, ids_of, provided};
use crate::error::ValidatorError;
use serde_json::Value;

#[derive(Clone, Copy, Debug)]
pub struct Validator<'a> {
    catalog: &'a Catalog,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Validate the fields owned by `step` (1..=6) in `draft`.
    pub fn validate_step(&self, step: i64, draft: &Draft) -> Result<StepReport, ValidatorError> {
        let schema = self.step_schema(step)?;
        Ok(self.run_step(schema, draft))
    }

    /// Validate every step and report each one.
    pub fn validate_listing(&self, draft: &Draft) -> ListingReport {
        let steps: Vec<StepReport> = self
            .catalog
            .schema()
            .steps
            .iter()
            .map(|schema| self.run_step(schema, draft))
            .collect();
        ListingReport {
            valid: steps.iter().all(|report| report.valid),
            steps,
        }
    }

    /// Required, optional and excluded fields of `step` given the fields
    /// already present in `context`.
    pub fn field_requirements(
        &self,
        step: i64,
        context: &Draft,
    ) -> Result<FieldRequirements, ValidatorError> {
        let schema = self.step_schema(step)?;
        let required = self.required_fields(schema, context);
        let excluded: Vec<String> = schema
            .fields()
            .filter(|field| self.is_excluded(field, context))
            .map(str::to_string)
            .collect();
        let optional = schema
            .fields()
            .filter(|field| !required.iter().any(|name| name == field))
            .filter(|field| !excluded.iter().any(|name| name == field))
            .map(str::to_string)
            .collect();
        Ok(FieldRequirements {
            step: schema.step,
            required,
            optional,
            excluded,
        })
    }

    fn step_schema(&self, step: i64) -> Result<&'a StepSchema, ValidatorError> {
        u8::try_from(step)
            .ok()
            .and_then(|number| self.catalog.schema().step(number))
            .ok_or(ValidatorError::InvalidStep(step))
    }

    fn run_step(&self, schema: &StepSchema, draft: &Draft) -> StepReport {
        let listing = self.catalog.schema();
        let required = self.required_fields(schema, draft);
        let mut errors = Vec::new();

        for field in &required {
            if provided(draft, field).is_none() {
                errors.push(FieldError::MissingField {
                    field: field.clone(),
                });
            }
        }

        for field in schema.fields() {
            let Some(value) = provided(draft, field) else {
                continue;
            };
            if let Some(spec) = listing.field(field) {
                errors.extend(check_value(self.catalog, field, &spec.kind, value));
            }
        }

        for field in self.context_fields(schema) {
            let Some(value) = provided(draft, field) else {
                continue;
            };
            let Some(spec) = listing.field(field) else {
                continue;
            };
            if matches!(spec.kind, FieldKind::Reference { .. }) {
                errors.extend(check_value(self.catalog, field, &spec.kind, value));
            }
        }

        for rule in &listing.compatibility_rules {
            if listing.rule_step(rule) != Some(schema.step) {
                continue;
            }
            if let Some(error) = self.check_rule(rule, draft) {
                errors.push(error);
            }
        }

        tracing::debug!(
            step = schema.step,
            errors = errors.len(),
            "validated listing step"
        );
        StepReport {
            step: schema.step,
            key: schema.key.clone(),
            title: schema.title.clone(),
            valid: errors.is_empty(),
            required_fields: required,
            errors,
        }
    }

    /// Unconditional required fields, then fields added by matching
    /// conditional rules that this step owns. First occurrence wins.
    fn required_fields(&self, schema: &StepSchema, draft: &Draft) -> Vec<String> {
        let mut required = schema.required.clone();
        for rule in &self.catalog.schema().conditional_rules {
            if draft.get(&rule.when.field) != Some(&rule.when.equals) {
                continue;
            }
            for field in &rule.require {
                if schema.owns(field) && !required.contains(field) {
                    required.push(field.clone());
                }
            }
        }
        required
    }

    /// Fields owned by other steps that this step's rules read: conditional
    /// triggers that add one of its fields and the other side of every
    /// compatibility rule it evaluates. Rule declaration order, no repeats.
    fn context_fields(&self, schema: &StepSchema) -> Vec<&'a str> {
        let listing = self.catalog.schema();
        let triggers = listing
            .conditional_rules
            .iter()
            .filter(|rule| rule.require.iter().any(|field| schema.owns(field)))
            .map(|rule| rule.when.field.as_str());
        let partners = listing
            .compatibility_rules
            .iter()
            .filter(|rule| listing.rule_step(rule) == Some(schema.step))
            .flat_map(|rule| {
                let (field, other) = rule.fields();
                [field, other]
            });

        let mut fields: Vec<&'a str> = Vec::new();
        for field in triggers.chain(partners) {
            if !schema.owns(field) && !fields.contains(&field) {
                fields.push(field);
            }
        }
        fields
    }

    fn is_excluded(&self, field: &str, context: &Draft) -> bool {
        self.catalog
            .schema()
            .compatibility_rules
            .iter()
            .any(|rule| match rule {
                CompatibilityRule::AllowedWhen {
                    field: constrained,
                    trigger,
                    values,
                } if constrained == field => provided(context, trigger)
                    .is_some_and(|current| self.is_sound(trigger, current) && !values.contains(current)),
                _ => false,
            })
    }

    fn check_rule(&self, rule: &CompatibilityRule, draft: &Draft) -> Option<FieldError> {
        match rule {
            CompatibilityRule::AllowedWhen {
                field,
                trigger,
                values,
            } => {
                provided(draft, field)?;
                let current = provided(draft, trigger)?;
                if !self.is_sound(trigger, current) || values.contains(current) {
                    return None;
                }
                Some(FieldError::IncompatibleFields {
                    field: field.clone(),
                    other_field: trigger.clone(),
                    reason: format!(
                        "{field} only applies when {trigger} is one of [{}], but {trigger} is '{}'",
                        values.iter().map(describe).collect::<Vec<_>>().join(", "),
                        describe(current)
                    ),
                })
            }
            CompatibilityRule::ListedIn {
                field,
                reference,
                attribute,
            } => {
                let value = provided(draft, field)?;
                let target = provided(draft, reference)?;
                if !self.is_sound(field, value) || !self.is_sound(reference, target) {
                    return None;
                }
                let FieldKind::Reference { table } = &self.catalog.schema().field(reference)?.kind
                else {
                    return None;
                };
                let target_id = id_of(target)?;
                let record = self.catalog.get(*table, &target_id).ok()?;
                let listed = record.attribute(attribute)?;
                let missing: Vec<String> = ids_of(value)
                    .into_iter()
                    .filter(|id| !listed.contains(&id.as_str()))
                    .collect();
                if missing.is_empty() {
                    return None;
                }
                Some(FieldError::IncompatibleFields {
                    field: field.clone(),
                    other_field: reference.clone(),
                    reason: format!(
                        "{field} '{}' is not among the {attribute} of {} '{target_id}' ({reference})",
                        missing.join(", "),
                        table
                    ),
                })
            }
        }
    }

    /// Present and free of per-field violations.
    fn is_sound(&self, field: &str, value: &Value) -> bool {
        self.catalog
            .schema()
            .field(field)
            .is_some_and(|spec| check_value(self.catalog, field, &spec.kind, value).is_empty())
    }
}
