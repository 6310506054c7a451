#![allow(dead_code)]

use anyhow::{Context, Result};
use listingdesk::{Catalog, Draft};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

pub fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// The bundled catalog, loaded once per test binary.
pub fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(|| Catalog::load(&data_dir()).expect("bundled data must load"))
}

/// Copy of the bundled data directory that a test may break.
pub fn scratch_data_dir() -> Result<TempDir> {
    let dir = TempDir::new().context("allocating scratch data dir")?;
    for entry in fs::read_dir(data_dir())? {
        let entry = entry?;
        fs::copy(entry.path(), dir.path().join(entry.file_name()))
            .with_context(|| format!("copying {}", entry.path().display()))?;
    }
    Ok(dir)
}

pub fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}

pub fn draft(value: Value) -> Draft {
    match value {
        Value::Object(map) => map,
        other => panic!("draft fixtures must be objects, got {other}"),
    }
}

/// A trail bike listing that passes every step.
pub fn complete_draft() -> Draft {
    draft(json!({
        "bike_type": "mountain",
        "bike_category_id": "mtb_trail",
        "brand_id": "trek",
        "model_id": "trek-fuel-ex",
        "frame_material_code": "carbon",
        "year": 2022,
        "frame_size": "l",
        "color_id": "black",
        "condition": "very_good",
        "brake_type": "disc",
        "shifting_code": "mechanical",
        "msrp": 5499,
        "country_id": "DE",
        "city": "Berlin",
        "zip_code": "10115",
        "receipt_present": true,
        "shipping_options": ["pickup", "domestic_shipping"],
        "component_id": "shimano-xt-m8100",
        "suspension_type": "full_suspension",
        "front_suspension_travel_mm": 140,
        "rear_suspension_travel_mm": 130,
        "tires": "Maxxis Minion DHF 2.5",
        "price": 3200,
        "currency_code": "EUR",
        "negotiable": true,
        "payment_methods": ["card", "paypal"],
        "photos": [
            { "url": "https://img.example/drive-side.jpg", "order": 1, "is_main": true },
            { "url": "https://img.example/non-drive-side.jpg", "order": 2 },
            { "url": "https://img.example/drivetrain.jpg", "order": 3, "description": "XT cassette" }
        ]
    }))
}
