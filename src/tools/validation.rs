//! Validation operations. Each wraps one validator call and turns a failed
//! report into an error whose details carry every violation.

use super::{ToolError, render};
use crate::catalog::{Catalog, TableKind};
use crate::draft::Draft;
use crate::pricing::pricing_warnings;
use crate::validator::{ListingReport, StepReport, Validator};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub(super) struct DetailsArgs {
    details: Draft,
    #[serde(default)]
    bike_type_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ComponentsArgs {
    components: Draft,
    #[serde(default)]
    bike_type_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PricingArgs {
    price_data: Draft,
}

#[derive(Debug, Deserialize)]
pub(super) struct PhotosArgs {
    photos: Value,
}

#[derive(Debug, Deserialize)]
pub(super) struct StepArgs {
    step: i64,
    #[serde(default)]
    draft: Draft,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListingArgs {
    draft: Draft,
}

pub(super) fn validate_bike_details(
    catalog: &Catalog,
    validator: &Validator<'_>,
    args: DetailsArgs,
) -> Result<Value, ToolError> {
    let draft = with_bike_type(catalog, args.details, args.bike_type_id)?;
    step_outcome(validator.validate_step(2, &draft)?)
}

pub(super) fn validate_component_compatibility(
    catalog: &Catalog,
    validator: &Validator<'_>,
    args: ComponentsArgs,
) -> Result<Value, ToolError> {
    let draft = with_bike_type(catalog, args.components, args.bike_type_id)?;
    step_outcome(validator.validate_step(4, &draft)?)
}

/// Pricing advice rides along as `warnings` whether or not the step passes.
pub(super) fn validate_pricing(
    validator: &Validator<'_>,
    args: PricingArgs,
) -> Result<Value, ToolError> {
    let warnings = json!(pricing_warnings(&args.price_data));
    match step_outcome(validator.validate_step(5, &args.price_data)?) {
        Ok(mut data) => {
            data["warnings"] = warnings;
            Ok(data)
        }
        Err(mut error) => {
            error.details["warnings"] = warnings;
            Err(error)
        }
    }
}

pub(super) fn validate_photo_order(
    validator: &Validator<'_>,
    args: PhotosArgs,
) -> Result<Value, ToolError> {
    let mut draft = Draft::new();
    draft.insert("photos".to_string(), args.photos);
    step_outcome(validator.validate_step(6, &draft)?)
}

pub(super) fn validate_step(validator: &Validator<'_>, args: StepArgs) -> Result<Value, ToolError> {
    step_outcome(validator.validate_step(args.step, &args.draft)?)
}

pub(super) fn validate_bike_listing(
    validator: &Validator<'_>,
    args: ListingArgs,
) -> Result<Value, ToolError> {
    listing_outcome(validator.validate_listing(&args.draft))
}

/// The step arguments arrive without the step 1 context; a separately passed
/// bike type fills it in unless the fields already carry one. The passed id
/// must exist either way.
fn with_bike_type(
    catalog: &Catalog,
    mut fields: Draft,
    bike_type: Option<String>,
) -> Result<Draft, ToolError> {
    if let Some(bike_type) = bike_type {
        let bike_type = bike_type.trim();
        catalog.get(TableKind::BikeTypes, bike_type)?;
        fields
            .entry("bike_type")
            .or_insert_with(|| Value::String(bike_type.to_string()));
    }
    Ok(fields)
}

fn step_outcome(report: StepReport) -> Result<Value, ToolError> {
    let Some(first) = report.errors.first() else {
        return render(&report);
    };
    let error = ToolError::new(
        first.code(),
        format!(
            "step {} ({}) has {} problem(s); first: {}",
            report.step,
            report.key,
            report.errors.len(),
            first.message()
        ),
    );
    Err(error.with_details(render(&report)?))
}

fn listing_outcome(report: ListingReport) -> Result<Value, ToolError> {
    let Some(first) = report.errors().next() else {
        return render(&report);
    };
    let failing: Vec<String> = report
        .steps
        .iter()
        .filter(|step| !step.valid)
        .map(|step| step.step.to_string())
        .collect();
    let error = ToolError::new(
        first.code(),
        format!(
            "listing has problems in step(s) {}; first: {}",
            failing.join(", "),
            first.message()
        ),
    );
    Err(error.with_details(render(&report)?))
}
