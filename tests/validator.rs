// Step and listing validation against the bundled listing schema.
mod support;

use listingdesk::{ErrorCode, FieldError, TableKind, Validator, ValidatorError};
use serde_json::{Value, json};
use support::{catalog, complete_draft, draft};

fn validator() -> Validator<'static> {
    Validator::new(catalog())
}

fn codes_and_fields(errors: &[FieldError]) -> Vec<(ErrorCode, String)> {
    errors
        .iter()
        .map(|error| (error.code(), error.field().to_string()))
        .collect()
}

fn missing(fields: &[&str]) -> Vec<(ErrorCode, String)> {
    fields
        .iter()
        .map(|field| (ErrorCode::MissingField, field.to_string()))
        .collect()
}

#[test]
fn e_bike_specifications_require_motor_details() {
    let report = validator()
        .validate_step(2, &draft(json!({ "bike_type": "e_bike" })))
        .unwrap();
    assert!(!report.valid);
    assert_eq!(
        codes_and_fields(&report.errors),
        missing(&[
            "frame_material_code",
            "motor_brand",
            "battery_capacity_wh",
            "motor_position"
        ])
    );
    assert_eq!(
        report.required_fields,
        vec![
            "frame_material_code",
            "motor_brand",
            "battery_capacity_wh",
            "motor_position"
        ]
    );
}

#[test]
fn road_bike_specifications_need_only_the_frame_material() {
    let report = validator()
        .validate_step(2, &draft(json!({ "bike_type": "road" })))
        .unwrap();
    assert_eq!(codes_and_fields(&report.errors), missing(&["frame_material_code"]));
}

#[test]
fn motor_fields_are_rejected_on_a_road_bike() {
    let report = validator()
        .validate_step(2, &draft(json!({ "bike_type": "road", "motor_brand": "Bosch" })))
        .unwrap();
    let incompatible: Vec<&FieldError> = report
        .errors
        .iter()
        .filter(|error| error.code() == ErrorCode::IncompatibleFields)
        .collect();
    assert_eq!(incompatible.len(), 1);
    match incompatible[0] {
        FieldError::IncompatibleFields {
            field, other_field, ..
        } => {
            assert_eq!(field, "motor_brand");
            assert_eq!(other_field, "bike_type");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(incompatible[0].message().contains("road"));
    // The missing frame material is reported alongside, not instead.
    assert_eq!(report.errors[0].code(), ErrorCode::MissingField);
}

#[test]
fn hardtail_excludes_rear_travel() {
    let report = validator()
        .validate_step(
            4,
            &draft(json!({
                "suspension_type": "hardtail",
                "rear_suspension_travel_mm": 140
            })),
        )
        .unwrap();
    assert_eq!(
        codes_and_fields(&report.errors),
        vec![
            (ErrorCode::MissingField, "component_id".to_string()),
            (
                ErrorCode::MissingField,
                "front_suspension_travel_mm".to_string()
            ),
            (
                ErrorCode::IncompatibleFields,
                "rear_suspension_travel_mm".to_string()
            ),
        ]
    );
}

#[test]
fn full_suspension_accepts_rear_travel() {
    let report = validator()
        .validate_step(
            4,
            &draft(json!({
                "bike_type": "mountain",
                "component_id": "sram-gx-eagle",
                "suspension_type": "full_suspension",
                "front_suspension_travel_mm": 150,
                "rear_suspension_travel_mm": 140
            })),
        )
        .unwrap();
    assert!(report.valid, "{:?}", report.errors);
}

#[test]
fn unknown_ids_are_invalid_references() {
    let report = validator()
        .validate_step(
            1,
            &draft(json!({
                "bike_type": "unicycle",
                "brand_id": "trek",
                "model_id": "trek-time-machine"
            })),
        )
        .unwrap();
    assert_eq!(
        report.errors,
        vec![
            FieldError::InvalidReference {
                field: "bike_type".to_string(),
                table: TableKind::BikeTypes,
                value: "unicycle".to_string(),
            },
            FieldError::InvalidReference {
                field: "model_id".to_string(),
                table: TableKind::Models,
                value: "trek-time-machine".to_string(),
            },
        ]
    );
}

#[test]
fn model_must_belong_to_the_brand_and_bike_type() {
    let report = validator()
        .validate_step(
            1,
            &draft(json!({
                "bike_type": "road",
                "brand_id": "giant",
                "model_id": "trek-fuel-ex"
            })),
        )
        .unwrap();
    let pairs: Vec<(&str, ErrorCode)> = report
        .errors
        .iter()
        .map(|error| (error.field(), error.code()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("brand_id", ErrorCode::IncompatibleFields),
            ("bike_type", ErrorCode::IncompatibleFields),
        ]
    );
}

#[test]
fn custom_family_is_accepted_for_its_brand() {
    let report = validator()
        .validate_step(
            1,
            &draft(json!({
                "bike_type": "gravel",
                "brand_id": "trek",
                "model_id": "trek-custom"
            })),
        )
        .unwrap();
    assert!(report.valid, "{:?}", report.errors);
}

#[test]
fn enumerated_fields_reject_unknown_codes() {
    let report = validator()
        .validate_step(
            2,
            &draft(json!({
                "bike_type": "city",
                "frame_material_code": "bamboo",
                "condition": "pristine"
            })),
        )
        .unwrap();
    assert_eq!(report.errors.len(), 2);
    match &report.errors[0] {
        FieldError::InvalidValue { field, allowed, .. } => {
            assert_eq!(field, "frame_material_code");
            assert!(allowed.iter().any(|code| code == "carbon"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(report.errors[1].field(), "condition");
}

#[test]
fn blank_values_count_as_missing() {
    let report = validator()
        .validate_step(
            3,
            &draft(json!({ "country_id": "", "city": "   ", "zip_code": null })),
        )
        .unwrap();
    assert_eq!(
        codes_and_fields(&report.errors),
        missing(&["country_id", "city", "zip_code"])
    );
}

#[test]
fn shipping_and_currency_follow_the_country() {
    let draft = draft(json!({
        "country_id": "GB",
        "city": "London",
        "zip_code": "SW1A 1AA",
        "shipping_options": ["pickup", "eu_shipping"],
        "price": 900,
        "currency_code": "EUR",
        "payment_methods": ["card"]
    }));
    let location = validator().validate_step(3, &draft).unwrap();
    assert_eq!(
        codes_and_fields(&location.errors),
        vec![(ErrorCode::IncompatibleFields, "shipping_options".to_string())]
    );
    assert!(location.errors[0].message().contains("eu_shipping"));

    let pricing = validator().validate_step(5, &draft).unwrap();
    assert_eq!(
        codes_and_fields(&pricing.errors),
        vec![(ErrorCode::IncompatibleFields, "currency_code".to_string())]
    );
}

#[test]
fn price_must_be_positive() {
    let report = validator()
        .validate_step(5, &draft(json!({ "price": 0, "currency_code": "EUR" })))
        .unwrap();
    assert_eq!(
        codes_and_fields(&report.errors),
        vec![(ErrorCode::InvalidValue, "price".to_string())]
    );
}

#[test]
fn photos_need_exactly_one_main_photo() {
    let report = validator()
        .validate_step(
            6,
            &draft(json!({
                "photos": [
                    { "url": "https://img.example/1.jpg", "order": 1 },
                    { "url": "https://img.example/2.jpg", "order": 2 },
                    { "url": "https://img.example/3.jpg", "order": 2 }
                ]
            })),
        )
        .unwrap();
    let messages: Vec<String> = report.errors.iter().map(FieldError::message).collect();
    assert_eq!(messages.len(), 2, "{messages:?}");
    assert!(messages[0].contains("unique"));
    assert!(messages[1].contains("main"));
}

#[test]
fn too_few_photos_are_reported() {
    let report = validator()
        .validate_step(
            6,
            &draft(json!({
                "photos": [{ "url": "https://img.example/1.jpg", "order": 1, "is_main": true }]
            })),
        )
        .unwrap();
    assert_eq!(
        codes_and_fields(&report.errors),
        vec![(ErrorCode::InvalidValue, "photos".to_string())]
    );
    assert!(report.errors[0].message().contains("at least 3"));
}

#[test]
fn out_of_range_steps_are_rejected() {
    for step in [0, 7, -1] {
        let err = validator().validate_step(step, &draft(json!({}))).unwrap_err();
        assert_eq!(err, ValidatorError::InvalidStep(step));
        assert_eq!(err.code(), ErrorCode::InvalidStep);
    }
}

#[test]
fn validation_is_deterministic() {
    let input = draft(json!({
        "bike_type": "road",
        "motor_brand": "Bosch",
        "frame_material_code": "wood",
        "color_id": "plaid"
    }));
    let first = validator().validate_step(2, &input).unwrap();
    let second = validator().validate_step(2, &input).unwrap();
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
    assert_eq!(first.errors.len(), 3);
}

#[test]
fn validation_leaves_the_draft_untouched() {
    let input = complete_draft();
    let before = input.clone();
    validator().validate_listing(&input);
    assert_eq!(input, before);
}

#[test]
fn complete_listing_passes_every_step() {
    let report = validator().validate_listing(&complete_draft());
    assert!(report.valid, "{:?}", report.errors().collect::<Vec<_>>());
    assert_eq!(report.steps.len(), 6);
    for step in &report.steps {
        assert!(step.valid);
        assert!(step.errors.is_empty());
    }
}

#[test]
fn listing_report_groups_errors_by_step() {
    let mut input = complete_draft();
    input.remove("city");
    input.insert("price".to_string(), Value::from(-5));
    let report = validator().validate_listing(&input);
    assert!(!report.valid);
    let failing: Vec<u8> = report
        .steps
        .iter()
        .filter(|step| !step.valid)
        .map(|step| step.step)
        .collect();
    assert_eq!(failing, vec![3, 5]);
    assert_eq!(report.errors().count(), 2);
}

#[test]
fn field_requirements_exclude_inapplicable_fields() {
    let context = draft(json!({ "bike_type": "road" }));
    let requirements = validator().field_requirements(2, &context).unwrap();
    assert_eq!(requirements.required, vec!["frame_material_code"]);
    for field in ["motor_brand", "battery_capacity_wh", "motor_position"] {
        assert!(requirements.excluded.iter().any(|name| name == field));
        assert!(!requirements.optional.iter().any(|name| name == field));
    }

    let e_bike = validator()
        .field_requirements(2, &draft(json!({ "bike_type": "e_bike" })))
        .unwrap();
    assert!(e_bike.excluded.is_empty());
    assert!(e_bike.required.iter().any(|name| name == "motor_brand"));
}

#[test]
fn unknown_bike_type_is_reported_by_the_steps_that_read_it() {
    let report = validator()
        .validate_step(
            2,
            &draft(json!({
                "bike_type": "spaceship",
                "motor_brand": "Bosch",
                "frame_material_code": "carbon"
            })),
        )
        .unwrap();
    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec![FieldError::InvalidReference {
            field: "bike_type".to_string(),
            table: TableKind::BikeTypes,
            value: "spaceship".to_string(),
        }]
    );

    let components = validator()
        .validate_step(
            4,
            &draft(json!({ "bike_type": "spaceship", "component_id": "sram-gx-eagle" })),
        )
        .unwrap();
    assert_eq!(
        codes_and_fields(&components.errors),
        vec![(ErrorCode::InvalidReference, "bike_type".to_string())]
    );
}

#[test]
fn unknown_country_is_reported_by_pricing() {
    let report = validator()
        .validate_step(
            5,
            &draft(json!({ "country_id": "XX", "price": 900, "currency_code": "EUR" })),
        )
        .unwrap();
    assert_eq!(
        codes_and_fields(&report.errors),
        vec![(ErrorCode::InvalidReference, "country_id".to_string())]
    );
}

#[test]
fn unrelated_references_are_left_to_their_own_step() {
    let report = validator()
        .validate_step(
            6,
            &draft(json!({
                "brand_id": "no-such-brand",
                "photos": [
                    { "url": "https://img.example/1.jpg", "order": 1, "is_main": true },
                    { "url": "https://img.example/2.jpg", "order": 2 },
                    { "url": "https://img.example/3.jpg", "order": 3 }
                ]
            })),
        )
        .unwrap();
    assert!(report.valid, "{:?}", report.errors);
}

#[test]
fn integral_floats_count_as_whole_numbers() {
    let mut fields = json!({
        "bike_type": "mountain",
        "component_id": "sram-gx-eagle",
        "suspension_type": "full_suspension",
        "front_suspension_travel_mm": 150.0,
        "rear_suspension_travel_mm": 140.0
    });
    let report = validator().validate_step(4, &draft(fields.clone())).unwrap();
    assert!(report.valid, "{:?}", report.errors);

    fields["front_suspension_travel_mm"] = json!(150.5);
    let report = validator().validate_step(4, &draft(fields)).unwrap();
    assert_eq!(
        codes_and_fields(&report.errors),
        vec![(
            ErrorCode::InvalidValue,
            "front_suspension_travel_mm".to_string()
        )]
    );
}
