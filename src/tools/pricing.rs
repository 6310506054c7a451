//! Step 5 price guidance operations.

use super::{ToolError, render};
use crate::catalog::{Catalog, FieldKind, TableKind};
use crate::error::{CatalogError, ErrorCode};
use crate::pricing::{fee_breakdown, suggest_price};
use crate::validator::check_value;
use serde::Deserialize;
use serde_json::{Value, json};

const DEFAULT_FEE_CURRENCY: &str = "EUR";

#[derive(Debug, Deserialize)]
pub(super) struct SuggestionArgs {
    bike_type_id: String,
    brand_id: String,
    model_id: String,
    year: i64,
    condition: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct FeeArgs {
    asking_price: f64,
    #[serde(default)]
    currency_code: Option<String>,
}

pub(super) fn get_price_suggestions(
    catalog: &Catalog,
    args: SuggestionArgs,
) -> Result<Value, ToolError> {
    let bike_type = args.bike_type_id.trim();
    let model_id = args.model_id.trim();
    catalog.get(TableKind::BikeTypes, bike_type)?;
    let models = catalog.models_for_brand(args.brand_id.trim(), Some(bike_type))?;
    let Some(model) = models.into_iter().find(|model| model.id == model_id) else {
        return Err(ToolError::new(
            ErrorCode::NotFound,
            format!(
                "model {model_id} is not offered by brand {} as {bike_type}",
                args.brand_id.trim()
            ),
        )
        .with_details(json!({
            "brand_id": args.brand_id.trim(),
            "model_id": model_id,
            "bike_type_id": bike_type,
        })));
    };
    check_field(catalog, "year", &json!(args.year))?;
    check_field(catalog, "condition", &json!(args.condition))?;

    let reference_year = latest_model_year(catalog).unwrap_or(args.year);
    let suggestion = suggest_price(model, args.year, &args.condition, reference_year);
    tracing::debug!(
        model = %model.id,
        recommended = suggestion.recommended,
        "suggested price"
    );
    Ok(json!({
        "model": { "id": model.id, "brand_id": model.brand_id, "name": model.name },
        "reference_year": reference_year,
        "price_suggestions": render(&suggestion)?,
    }))
}

pub(super) fn calculate_fees(catalog: &Catalog, args: FeeArgs) -> Result<Value, ToolError> {
    let code = args
        .currency_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .unwrap_or(DEFAULT_FEE_CURRENCY)
        .to_uppercase();
    let currency = catalog
        .currencies()
        .get(&code)
        .ok_or_else(|| CatalogError::NotFound {
            table: TableKind::Currencies,
            id: code.clone(),
        })?;
    check_field(catalog, "price", &json!(args.asking_price))?;
    Ok(json!({
        "currency": { "id": currency.id, "name": currency.name, "symbol": currency.symbol },
        "fee_breakdown": render(&fee_breakdown(args.asking_price))?,
    }))
}

/// Hold an operation argument to the domain of the listing field it fills.
fn check_field(catalog: &Catalog, name: &str, value: &Value) -> Result<(), ToolError> {
    let Some(spec) = catalog.schema().field(name) else {
        return Ok(());
    };
    match check_value(catalog, name, &spec.kind, value).into_iter().next() {
        None => Ok(()),
        Some(error) => Err(ToolError::new(error.code(), error.message()).with_details(render(&error)?)),
    }
}

/// Upper bound of the listing's model year field.
fn latest_model_year(catalog: &Catalog) -> Option<i64> {
    match catalog.schema().field("year")?.kind {
        FieldKind::Integer { max, .. } => max,
        _ => None,
    }
}
