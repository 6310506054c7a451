//! Per-field domain checks: references, option codes, numeric ranges, text
//! and photo lists.

use crate::catalog::{Catalog, FieldKind};
use crate::draft::{describe, id_of};
use crate::validator::report::FieldError;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeSet;

/// One entry of the `photos` list.
#[derive(Clone, Debug, Deserialize)]
pub struct Photo {
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub order: i64,
    #[serde(default)]
    pub is_main: bool,
}

/// Check a provided value against its field kind. An empty result means the
/// value is sound.
pub(crate) fn check_value(
    catalog: &Catalog,
    field: &str,
    kind: &FieldKind,
    value: &Value,
) -> Vec<FieldError> {
    match kind {
        FieldKind::Reference { table } => {
            let Some(id) = id_of(value) else {
                return vec![invalid(field, value, "expected an identifier")];
            };
            match catalog.get(*table, &id) {
                Ok(_) => Vec::new(),
                Err(_) => vec![FieldError::InvalidReference {
                    field: field.to_string(),
                    table: *table,
                    value: id,
                }],
            }
        }
        FieldKind::OneOf { group } => {
            let codes = option_codes(catalog, group);
            match value.as_str() {
                Some(code) if codes.iter().any(|known| known == code) => Vec::new(),
                _ => vec![FieldError::InvalidValue {
                    field: field.to_string(),
                    value: value.clone(),
                    reason: format!("'{}' is not a known {group} code", describe(value)),
                    allowed: codes,
                }],
            }
        }
        FieldKind::ManyOf { group } => {
            let Some(items) = value.as_array() else {
                return vec![invalid(field, value, "expected a list of codes")];
            };
            let codes = option_codes(catalog, group);
            let unknown: Vec<Value> = items
                .iter()
                .filter(|item| {
                    item.as_str()
                        .is_none_or(|code| !codes.iter().any(|known| known == code))
                })
                .cloned()
                .collect();
            if unknown.is_empty() {
                return Vec::new();
            }
            vec![FieldError::InvalidValue {
                field: field.to_string(),
                value: Value::Array(unknown),
                reason: format!("contains codes outside {group}"),
                allowed: codes,
            }]
        }
        FieldKind::Integer { min, max } => {
            let Some(number) = whole_number(value) else {
                return vec![invalid(field, value, "expected a whole number")];
            };
            if min.is_some_and(|min| number < min) || max.is_some_and(|max| number > max) {
                return vec![invalid(field, value, &range_reason(min, max))];
            }
            Vec::new()
        }
        FieldKind::Number {
            greater_than,
            at_most,
        } => {
            let Some(number) = value.as_f64() else {
                return vec![invalid(field, value, "expected a number")];
            };
            if let Some(floor) = greater_than {
                if number <= *floor {
                    return vec![invalid(field, value, &format!("must be greater than {floor}"))];
                }
            }
            if let Some(ceiling) = at_most {
                if number > *ceiling {
                    return vec![invalid(field, value, &format!("must be at most {ceiling}"))];
                }
            }
            Vec::new()
        }
        FieldKind::Text { max_length } => {
            let Some(text) = value.as_str() else {
                return vec![invalid(field, value, "expected text")];
            };
            match max_length {
                Some(limit) if text.trim().chars().count() > *limit => {
                    vec![invalid(field, value, &format!("must be at most {limit} characters"))]
                }
                _ => Vec::new(),
            }
        }
        FieldKind::Boolean => {
            if value.is_boolean() {
                Vec::new()
            } else {
                vec![invalid(field, value, "expected true or false")]
            }
        }
        FieldKind::Photos {
            min_count,
            max_count,
        } => check_photos(field, value, *min_count, *max_count),
    }
}

/// Photo list rules: count bounds, one main photo, positive unique order
/// values and a non-empty url on every entry.
pub(crate) fn check_photos(
    field: &str,
    value: &Value,
    min_count: usize,
    max_count: usize,
) -> Vec<FieldError> {
    let Some(items) = value.as_array() else {
        return vec![invalid(field, value, "expected a list of photos")];
    };

    let mut errors = Vec::new();
    if items.len() < min_count {
        errors.push(invalid(
            field,
            &json!(items.len()),
            &format!("at least {min_count} photos are required, got {}", items.len()),
        ));
    }
    if items.len() > max_count {
        errors.push(invalid(
            field,
            &json!(items.len()),
            &format!("at most {max_count} photos are allowed, got {}", items.len()),
        ));
    }

    let mut photos = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let entry = format!("{field}[{position}]");
        match Photo::deserialize(item) {
            Ok(photo) => {
                if photo.url.trim().is_empty() {
                    errors.push(invalid(&entry, item, "url must not be empty"));
                }
                if photo.order < 1 {
                    errors.push(invalid(&entry, item, "order must be 1 or greater"));
                }
                photos.push(photo);
            }
            Err(err) => errors.push(invalid(&entry, item, &format!("malformed photo: {err}"))),
        }
    }

    let mut seen = BTreeSet::new();
    let repeated: BTreeSet<i64> = photos
        .iter()
        .map(|photo| photo.order)
        .filter(|order| !seen.insert(*order))
        .collect();
    if !repeated.is_empty() {
        errors.push(invalid(
            field,
            &json!(repeated),
            "photo order values must be unique",
        ));
    }

    let mains = photos.iter().filter(|photo| photo.is_main).count();
    if !photos.is_empty() && mains != 1 {
        errors.push(invalid(
            field,
            &json!(mains),
            &format!("exactly one photo must be marked as main, found {mains}"),
        ));
    }

    errors
}

/// Integers, and finite floats with no fractional part (`140.0`).
fn whole_number(value: &Value) -> Option<i64> {
    if let Some(number) = value.as_i64() {
        return Some(number);
    }
    let number = value.as_f64()?;
    let representable = number >= i64::MIN as f64 && number < i64::MAX as f64;
    (number.is_finite() && number.fract() == 0.0 && representable).then_some(number as i64)
}

fn invalid(field: &str, value: &Value, reason: &str) -> FieldError {
    FieldError::InvalidValue {
        field: field.to_string(),
        value: value.clone(),
        reason: reason.to_string(),
        allowed: Vec::new(),
    }
}

fn option_codes(catalog: &Catalog, group: &str) -> Vec<String> {
    catalog
        .option_group(group)
        .unwrap_or_default()
        .iter()
        .map(|entry| entry.code.clone())
        .collect()
}

fn range_reason(min: &Option<i64>, max: &Option<i64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("must be between {min} and {max}"),
        (Some(min), None) => format!("must be at least {min}"),
        (None, Some(max)) => format!("must be at most {max}"),
        (None, None) => "is out of range".to_string(),
    }
}
