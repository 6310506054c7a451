//! Read-only catalog operations for steps 1 through 6.

use super::{ToolError, render};
use crate::catalog::{
    Catalog, ComponentFilter, FieldKind, OptionEntry, Page, Record, STEP_COUNT, TableKind,
};
use crate::draft::Draft;
use crate::error::{CatalogError, ErrorCode};
use crate::tools::TOOLS;
use crate::validator::Validator;
use serde::Deserialize;
use serde_json::{Map, Value, json};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;
const DEFAULT_CITY_LIMIT: i64 = 50;

#[derive(Debug, Default, Deserialize)]
pub(super) struct SearchArgs {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    offset: Option<i64>,
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BrandArgs {
    brand_id: String,
    #[serde(default)]
    bike_type_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ModelArgs {
    brand_id: String,
    model_id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct BikeTypeArgs {
    bike_type_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SizeArgs {
    #[serde(default)]
    scheme: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CityArgs {
    country_code: String,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CountryArgs {
    country_code: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ComponentArgs {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    bike_type_id: Option<String>,
    #[serde(flatten)]
    search: SearchArgs,
}

#[derive(Debug, Deserialize)]
pub(super) struct CurrencyArgs {
    currency_code: String,
}

pub(super) fn list_bike_types(catalog: &Catalog) -> Result<Value, ToolError> {
    let bike_types = records(catalog.list_all(TableKind::BikeTypes))?;
    Ok(json!({ "total": bike_types.len(), "bike_types": bike_types }))
}

pub(super) fn list_brands(catalog: &Catalog, args: SearchArgs) -> Result<Value, ToolError> {
    let (offset, limit) = window(args.offset, args.limit);
    let query = args.query.unwrap_or_default();
    let page = catalog.brands().search(&query, offset, limit);
    let brands = page
        .items
        .iter()
        .map(|brand| -> Result<Value, ToolError> {
            let mut entry = render(*brand)?;
            entry["model_count"] = json!(brand.family_ids.len());
            Ok(entry)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!({
        "query": query,
        "brands": brands,
        "pagination": pagination(&page),
    }))
}

pub(super) fn list_models(catalog: &Catalog, args: BrandArgs) -> Result<Value, ToolError> {
    let bike_type = args.bike_type_id.as_deref().map(str::trim);
    if let Some(bike_type) = bike_type {
        catalog.get(TableKind::BikeTypes, bike_type)?;
    }
    let brand = find(catalog.brands().get(&args.brand_id), TableKind::Brands, &args.brand_id)?;
    let models = catalog.models_for_brand(&brand.id, bike_type)?;
    Ok(json!({
        "brand": { "id": brand.id, "name": brand.name },
        "custom_family_id": brand.custom_family_id,
        "total": models.len(),
        "models": render(&models)?,
    }))
}

pub(super) fn get_model_details(catalog: &Catalog, args: ModelArgs) -> Result<Value, ToolError> {
    let brand = find(catalog.brands().get(&args.brand_id), TableKind::Brands, &args.brand_id)?;
    let model = find(catalog.models().get(&args.model_id), TableKind::Models, &args.model_id)?;
    if model.brand_id != brand.id {
        return Err(ToolError::new(
            ErrorCode::NotFound,
            format!("model {} is not offered by brand {}", model.id, brand.id),
        )
        .with_details(json!({ "brand_id": brand.id, "model_id": model.id })));
    }
    let bike_types: Vec<Value> = model
        .bike_types
        .iter()
        .filter_map(|id| catalog.bike_types().get(id))
        .map(|bike_type| json!({ "id": bike_type.id, "name": bike_type.name }))
        .collect();
    Ok(json!({
        "brand": { "id": brand.id, "name": brand.name, "country": brand.country },
        "model": render(model)?,
        "bike_types": bike_types,
    }))
}

pub(super) fn get_detail_options(
    catalog: &Catalog,
    validator: &Validator<'_>,
    args: BikeTypeArgs,
) -> Result<Value, ToolError> {
    let bike_type = find(
        catalog.bike_types().get(&args.bike_type_id),
        TableKind::BikeTypes,
        &args.bike_type_id,
    )?;
    let context = bike_type_context(&bike_type.id);
    let requirements = validator.field_requirements(2, &context)?;
    let mut fields = Map::new();
    for name in requirements.required.iter().chain(&requirements.optional) {
        fields.insert(name.clone(), describe_field(catalog, name)?);
    }
    Ok(json!({
        "bike_type": { "id": bike_type.id, "name": bike_type.name },
        "field_rules": render(&requirements)?,
        "fields": fields,
    }))
}

pub(super) fn get_field_requirements(
    catalog: &Catalog,
    validator: &Validator<'_>,
    args: BikeTypeArgs,
) -> Result<Value, ToolError> {
    let bike_type = find(
        catalog.bike_types().get(&args.bike_type_id),
        TableKind::BikeTypes,
        &args.bike_type_id,
    )?;
    let context = bike_type_context(&bike_type.id);
    let steps = (1..=i64::from(STEP_COUNT))
        .map(|step| validator.field_requirements(step, &context))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!({
        "bike_type": { "id": bike_type.id, "name": bike_type.name },
        "steps": render(&steps)?,
    }))
}

pub(super) fn list_colors(catalog: &Catalog) -> Result<Value, ToolError> {
    let colors = records(catalog.list_all(TableKind::Colors))?;
    Ok(json!({ "total": colors.len(), "colors": colors }))
}

pub(super) fn list_sizes(catalog: &Catalog, args: SizeArgs) -> Result<Value, ToolError> {
    let scheme = args.scheme.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let sizes: Vec<_> = catalog
        .sizes()
        .all()
        .iter()
        .filter(|size| scheme.is_none_or(|wanted| size.scheme.as_str() == wanted))
        .collect();
    Ok(json!({ "total": sizes.len(), "sizes": render(&sizes)? }))
}

pub(super) fn list_countries(catalog: &Catalog) -> Result<Value, ToolError> {
    let countries: Vec<Value> = catalog
        .countries()
        .all()
        .iter()
        .map(|country| {
            json!({
                "id": country.id,
                "name": country.name,
                "currencies": country.currencies,
                "shipping_options": country.shipping_options,
                "city_count": country.cities.len(),
            })
        })
        .collect();
    Ok(json!({ "total": countries.len(), "countries": countries }))
}

pub(super) fn list_cities(catalog: &Catalog, args: CityArgs) -> Result<Value, ToolError> {
    let code = normalize_code(&args.country_code);
    let country = find(catalog.countries().get(&code), TableKind::Countries, &code)?;
    let limit = usize::try_from(args.limit.unwrap_or(DEFAULT_CITY_LIMIT).max(1)).unwrap_or(1);
    let needle = args.query.unwrap_or_default().trim().to_lowercase();
    let matches: Vec<&String> = country
        .cities
        .iter()
        .filter(|city| needle.is_empty() || city.to_lowercase().contains(&needle))
        .collect();
    let total = matches.len();
    let cities: Vec<&String> = matches.into_iter().take(limit).collect();
    Ok(json!({
        "country": { "id": country.id, "name": country.name },
        "total": total,
        "cities": cities,
    }))
}

pub(super) fn get_shipping_options(
    catalog: &Catalog,
    args: CountryArgs,
) -> Result<Value, ToolError> {
    let code = normalize_code(&args.country_code);
    let country = find(catalog.countries().get(&code), TableKind::Countries, &code)?;
    let options = option_entries(catalog, "shipping_options", &country.shipping_options);
    Ok(json!({
        "country": { "id": country.id, "name": country.name },
        "shipping_options": render(&options)?,
    }))
}

pub(super) fn list_component_categories(catalog: &Catalog) -> Result<Value, ToolError> {
    let categories: Vec<Value> = catalog
        .option_group("component_categories")
        .unwrap_or_default()
        .iter()
        .map(|entry| {
            let count = catalog
                .components()
                .all()
                .iter()
                .filter(|component| component.category == entry.code)
                .count();
            json!({
                "code": entry.code,
                "name": entry.name,
                "description": entry.description,
                "component_count": count,
            })
        })
        .collect();
    Ok(json!({ "total": categories.len(), "categories": categories }))
}

pub(super) fn list_components(catalog: &Catalog, args: ComponentArgs) -> Result<Value, ToolError> {
    let category = args.category.as_deref().map(str::trim).filter(|c| !c.is_empty());
    if let Some(category) = category {
        let known = catalog.option_group("component_categories").unwrap_or_default();
        if !known.iter().any(|entry| entry.code == category) {
            return Err(ToolError::new(
                ErrorCode::InvalidValue,
                format!("unknown component category '{category}'"),
            )
            .with_details(json!({
                "category": category,
                "allowed": known.iter().map(|entry| entry.code.as_str()).collect::<Vec<_>>(),
            })));
        }
    }
    let bike_type = args.bike_type_id.as_deref().map(str::trim).filter(|t| !t.is_empty());
    if let Some(bike_type) = bike_type {
        catalog.get(TableKind::BikeTypes, bike_type)?;
    }

    let (offset, limit) = window(args.search.offset, args.search.limit);
    let query = args.search.query.unwrap_or_default();
    let filter = ComponentFilter {
        category,
        bike_type,
    };
    let page = catalog.components_matching(&filter, &query, offset, limit);
    Ok(json!({
        "category": category,
        "bike_type_id": bike_type,
        "components": render(&page.items)?,
        "pagination": pagination(&page),
    }))
}

pub(super) fn list_currencies(catalog: &Catalog) -> Result<Value, ToolError> {
    let currencies = records(catalog.list_all(TableKind::Currencies))?;
    Ok(json!({ "total": currencies.len(), "currencies": currencies }))
}

pub(super) fn get_payment_methods(
    catalog: &Catalog,
    args: CurrencyArgs,
) -> Result<Value, ToolError> {
    let code = normalize_code(&args.currency_code);
    let currency = find(catalog.currencies().get(&code), TableKind::Currencies, &code)?;
    let methods = option_entries(catalog, "payment_methods", &currency.payment_methods);
    Ok(json!({
        "currency": { "id": currency.id, "name": currency.name, "symbol": currency.symbol },
        "payment_methods": render(&methods)?,
    }))
}

pub(super) fn get_photo_requirements(catalog: &Catalog) -> Result<Value, ToolError> {
    let schema = catalog.schema();
    let (min_count, max_count) = schema
        .fields
        .values()
        .find_map(|spec| match spec.kind {
            FieldKind::Photos {
                min_count,
                max_count,
            } => Some((min_count, max_count)),
            _ => None,
        })
        .unwrap_or_default();
    Ok(json!({
        "min_photos": min_count,
        "max_photos": max_count,
        "main_photos": 1,
        "guidelines": render(&schema.photo_guidelines)?,
    }))
}

pub(super) fn get_listing_workflow(catalog: &Catalog) -> Result<Value, ToolError> {
    let schema = catalog.schema();
    let steps: Vec<Value> = schema
        .steps
        .iter()
        .map(|step| {
            let tools: Vec<&str> = TOOLS
                .iter()
                .filter(|spec| spec.step == Some(step.step))
                .map(|spec| spec.name)
                .collect();
            json!({
                "step": step.step,
                "key": step.key,
                "title": step.title,
                "description": step.description,
                "required": step.required,
                "optional": step.optional,
                "tools": tools,
            })
        })
        .collect();
    Ok(json!({
        "schema_version": schema.schema_version,
        "steps": steps,
        "conditional_rules": render(&schema.conditional_rules)?,
        "compatibility_rules": render(&schema.compatibility_rules)?,
    }))
}

pub(super) fn get_server_capabilities(catalog: &Catalog) -> Result<Value, ToolError> {
    Ok(json!({
        "schema_version": catalog.schema().schema_version,
        "tables": catalog.counts(),
        "option_groups": catalog.option_groups().keys().collect::<Vec<_>>(),
        "tools": TOOLS.iter().map(|spec| spec.name).collect::<Vec<_>>(),
    }))
}

/// Clamp caller pagination to `limit` in 1..=100 (default 20) and a
/// non-negative offset.
fn window(offset: Option<i64>, limit: Option<i64>) -> (usize, usize) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (
        usize::try_from(offset).unwrap_or(0),
        usize::try_from(limit).unwrap_or(1),
    )
}

fn pagination<T>(page: &Page<T>) -> Value {
    json!({
        "offset": page.offset,
        "limit": page.limit,
        "total": page.total,
        "returned": page.items.len(),
        "current_page": page.offset / page.limit.max(1) + 1,
        "has_more": page.has_more(),
    })
}

fn records(items: Vec<&dyn Record>) -> Result<Vec<Value>, ToolError> {
    items
        .into_iter()
        .map(|record| record.to_json().map_err(ToolError::internal))
        .collect()
}

fn find<'a, T>(found: Option<&'a T>, table: TableKind, id: &str) -> Result<&'a T, CatalogError> {
    found.ok_or_else(|| CatalogError::NotFound {
        table,
        id: id.to_string(),
    })
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn bike_type_context(bike_type: &str) -> Draft {
    let mut context = Draft::new();
    context.insert("bike_type".to_string(), Value::String(bike_type.to_string()));
    context
}

/// Field kind, description and, for closed domains, the allowed entries.
fn describe_field(catalog: &Catalog, name: &str) -> Result<Value, ToolError> {
    let Some(spec) = catalog.schema().field(name) else {
        return Ok(Value::Null);
    };
    let mut entry = render(spec)?;
    match &spec.kind {
        FieldKind::Reference { table } => {
            entry["options"] = Value::Array(records(catalog.list_all(*table))?);
        }
        FieldKind::OneOf { group } | FieldKind::ManyOf { group } => {
            entry["options"] = render(&catalog.option_group(group).unwrap_or_default())?;
        }
        _ => {}
    }
    Ok(entry)
}

fn option_entries<'a>(catalog: &'a Catalog, group: &str, codes: &[String]) -> Vec<&'a OptionEntry> {
    let entries = catalog.option_group(group).unwrap_or_default();
    codes
        .iter()
        .filter_map(|code| entries.iter().find(|entry| &entry.code == code))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_clamps_limit_and_offset() {
        assert_eq!(window(None, None), (0, 20));
        assert_eq!(window(Some(-5), Some(0)), (0, 1));
        assert_eq!(window(Some(40), Some(1000)), (40, 100));
    }

    #[test]
    fn country_codes_are_upper_cased() {
        assert_eq!(normalize_code(" de "), "DE");
    }
}
