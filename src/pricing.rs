//! Pricing guidance for step 5.
//!
//! Everything here is a pure function of catalog data and caller input: a
//! depreciation estimate over a model family's reference price range, the
//! marketplace fee breakdown, and warnings that never block a listing.

use crate::catalog::{Model, PriceRange};
use crate::draft::{Draft, provided};
use serde::Serialize;
use serde_json::Value;

pub const PLATFORM_FEE_RATE: f64 = 0.04;
pub const PAYMENT_FEE_RATE: f64 = 0.029;
/// Charged once per sale, in the listing currency.
pub const FIXED_TRANSACTION_FEE: f64 = 0.30;

const YEARLY_DEPRECIATION: f64 = 0.15;
const MAX_DEPRECIATION_YEARS: i64 = 5;
const CONSERVATIVE_MARGIN: f64 = 0.8;
const OPTIMISTIC_MARGIN: f64 = 1.1;
const DEFAULT_CONDITION_FACTOR: f64 = 0.60;

/// Reference range for families without one, such as custom builds.
const FALLBACK_MSRP: (f64, f64) = (1000.0, 5000.0);
const FALLBACK_CURRENCY: &str = "EUR";

const LOW_PRICE: f64 = 100.0;
const HIGH_VALUE: f64 = 10_000.0;

/// Share of the depreciated reference price a bike in `condition` keeps.
pub fn condition_factor(condition: &str) -> f64 {
    match condition {
        "new" => 1.0,
        "like_new" => 0.85,
        "very_good" => 0.75,
        "good" => 0.60,
        "fair" => 0.45,
        "needs_repair" => 0.30,
        _ => DEFAULT_CONDITION_FACTOR,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceSuggestion {
    pub conservative: i64,
    pub recommended: i64,
    pub optimistic: i64,
    pub currency: String,
    pub age_years: i64,
    pub depreciation_percent: i64,
    pub condition_factor: f64,
    /// The family's reference range; `None` when the fallback range was used.
    pub msrp_range: Option<PriceRange>,
}

/// Estimate a resale range for `model` built in `year` and sold in
/// `condition`. Age is counted up to `reference_year` and depreciation stops
/// after five years.
pub fn suggest_price(
    model: &Model,
    year: i64,
    condition: &str,
    reference_year: i64,
) -> PriceSuggestion {
    let (min, max, currency) = match &model.msrp_range {
        Some(range) => (range.min, range.max, range.currency.clone()),
        None => (FALLBACK_MSRP.0, FALLBACK_MSRP.1, FALLBACK_CURRENCY.to_string()),
    };
    let age_years = (reference_year - year).max(0);
    let depreciation = YEARLY_DEPRECIATION * age_years.min(MAX_DEPRECIATION_YEARS) as f64;
    let factor = condition_factor(condition);
    let retained = factor * (1.0 - depreciation);

    let conservative = (min * retained * CONSERVATIVE_MARGIN).floor() as i64;
    let optimistic = (max * retained * OPTIMISTIC_MARGIN).floor() as i64;
    PriceSuggestion {
        conservative,
        recommended: (conservative + optimistic) / 2,
        optimistic,
        currency,
        age_years,
        depreciation_percent: (depreciation * 100.0).round() as i64,
        condition_factor: factor,
        msrp_range: model.msrp_range.clone(),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeeBreakdown {
    pub asking_price: f64,
    pub platform_fee: f64,
    pub payment_processing_fee: f64,
    pub fixed_transaction_fee: f64,
    pub total_fees: f64,
    pub net_amount: f64,
    pub platform_fee_rate: f64,
    pub payment_fee_rate: f64,
}

/// Fees the seller pays on a sale at `asking_price`, rounded to cents.
pub fn fee_breakdown(asking_price: f64) -> FeeBreakdown {
    let platform_fee = asking_price * PLATFORM_FEE_RATE;
    let payment_fee = asking_price * PAYMENT_FEE_RATE;
    let total_fees = platform_fee + payment_fee + FIXED_TRANSACTION_FEE;
    FeeBreakdown {
        asking_price,
        platform_fee: cents(platform_fee),
        payment_processing_fee: cents(payment_fee),
        fixed_transaction_fee: FIXED_TRANSACTION_FEE,
        total_fees: cents(total_fees),
        net_amount: cents(asking_price - total_fees),
        platform_fee_rate: PLATFORM_FEE_RATE,
        payment_fee_rate: PAYMENT_FEE_RATE,
    }
}

/// Advice on a pricing step. None of it makes the step invalid.
pub fn pricing_warnings(price_data: &Draft) -> Vec<String> {
    let Some(price) = provided(price_data, "price").and_then(Value::as_f64) else {
        return Vec::new();
    };
    let mut warnings = Vec::new();
    if let Some(original) = provided(price_data, "original_price").and_then(Value::as_f64) {
        if price > original {
            warnings.push(format!(
                "asking price {price} is above the original price {original}; this may reduce interest"
            ));
        }
    }
    if price < LOW_PRICE {
        warnings.push(format!(
            "asking price {price} is very low and may look suspicious to buyers"
        ));
    }
    let accepts_paypal = provided(price_data, "payment_methods")
        .and_then(Value::as_array)
        .is_some_and(|methods| methods.iter().any(|method| method == "paypal"));
    if price > HIGH_VALUE && !accepts_paypal {
        warnings.push(format!(
            "asking price {price} is high; buyers of high-value bikes often expect paypal buyer protection"
        ));
    }
    warnings
}

fn cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model(msrp: Option<(f64, f64)>) -> Model {
        Model {
            id: "acme-ridge".to_string(),
            brand_id: "acme".to_string(),
            name: "Ridge".to_string(),
            bike_types: vec!["mountain".to_string()],
            year_range: None,
            msrp_range: msrp.map(|(min, max)| PriceRange {
                min,
                max,
                currency: "EUR".to_string(),
            }),
            custom: false,
        }
    }

    fn price_data(value: Value) -> Draft {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn depreciates_by_age_and_condition() {
        let suggestion = suggest_price(&model(Some((2300.0, 10000.0))), 2023, "like_new", 2026);
        assert_eq!(suggestion.age_years, 3);
        assert_eq!(suggestion.depreciation_percent, 45);
        assert_eq!(suggestion.conservative, 860);
        assert_eq!(suggestion.optimistic, 5142);
        assert_eq!(suggestion.recommended, 3001);
        assert_eq!(suggestion.currency, "EUR");
    }

    #[test]
    fn depreciation_stops_after_five_years() {
        let old = suggest_price(&model(Some((2000.0, 4000.0))), 2010, "good", 2026);
        let five = suggest_price(&model(Some((2000.0, 4000.0))), 2021, "good", 2026);
        assert_eq!(old.age_years, 16);
        assert_eq!(old.depreciation_percent, 75);
        assert_eq!(old.conservative, five.conservative);
        assert_eq!(old.optimistic, five.optimistic);
    }

    #[test]
    fn future_years_count_as_new() {
        let suggestion = suggest_price(&model(Some((2000.0, 4000.0))), 2030, "new", 2026);
        assert_eq!(suggestion.age_years, 0);
        assert_eq!(suggestion.depreciation_percent, 0);
    }

    #[test]
    fn families_without_a_range_use_the_fallback() {
        let suggestion = suggest_price(&model(None), 2026, "new", 2026);
        assert_eq!(suggestion.msrp_range, None);
        assert_eq!(suggestion.conservative, 800);
        assert_eq!(suggestion.optimistic, 5500);
        assert_eq!(suggestion.recommended, 3150);
    }

    #[test]
    fn unknown_conditions_use_the_default_factor() {
        assert_eq!(condition_factor("mint"), DEFAULT_CONDITION_FACTOR);
        assert!(condition_factor("needs_repair") < condition_factor("fair"));
    }

    #[test]
    fn fees_are_rounded_to_cents() {
        let fees = fee_breakdown(1000.0);
        assert_eq!(fees.platform_fee, 40.0);
        assert_eq!(fees.payment_processing_fee, 29.0);
        assert_eq!(fees.total_fees, 69.3);
        assert_eq!(fees.net_amount, 930.7);
    }

    #[test]
    fn reasonable_prices_have_no_warnings() {
        let data = price_data(json!({"price": 2500, "original_price": 4000, "payment_methods": ["card"]}));
        assert!(pricing_warnings(&data).is_empty());
    }

    #[test]
    fn price_above_original_is_flagged() {
        let data = price_data(json!({"price": 4500, "original_price": 4000}));
        let warnings = pricing_warnings(&data);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("above the original price"));
    }

    #[test]
    fn very_low_price_is_flagged() {
        let warnings = pricing_warnings(&price_data(json!({"price": 50})));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("very low"));
    }

    #[test]
    fn high_value_without_paypal_is_flagged() {
        let without = price_data(json!({"price": 12000, "payment_methods": ["bank_transfer"]}));
        assert_eq!(pricing_warnings(&without).len(), 1);
        let with = price_data(json!({"price": 12000, "payment_methods": ["paypal"]}));
        assert!(pricing_warnings(&with).is_empty());
    }

    #[test]
    fn missing_price_yields_no_warnings() {
        assert!(pricing_warnings(&price_data(json!({"currency_code": "EUR"}))).is_empty());
    }
}
