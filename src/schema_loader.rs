//! JSON Schema contracts for the raw files under `data/`.
//!
//! Contracts are compiled into the binary from `schema/` so a data directory
//! is always checked against the shape this build understands. Validation runs
//! on the untyped document before serde decoding, which keeps error messages
//! pointed at the offending JSON path instead of a serde position.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::path::Path;

const TABLE_CONTRACT: &str = include_str!("../schema/catalog_table.schema.json");
const OPTIONS_CONTRACT: &str = include_str!("../schema/option_groups.schema.json");
const LISTING_SCHEMA_CONTRACT: &str = include_str!("../schema/listing_schema.schema.json");

/// A compiled contract plus the name used in error messages.
pub(crate) struct Contract {
    name: &'static str,
    compiled: JSONSchema,
}

impl Contract {
    pub(crate) fn table() -> Result<Self> {
        compile("catalog_table", TABLE_CONTRACT)
    }

    pub(crate) fn option_groups() -> Result<Self> {
        compile("option_groups", OPTIONS_CONTRACT)
    }

    pub(crate) fn listing_schema() -> Result<Self> {
        compile("listing_schema", LISTING_SCHEMA_CONTRACT)
    }

    /// Validate `document` (read from `path`) and report every violation.
    pub(crate) fn check(&self, document: &Value, path: &Path) -> Result<()> {
        if let Err(errors) = self.compiled.validate(document) {
            let details = errors
                .map(|err| format!("{}: {}", err.instance_path, err))
                .collect::<Vec<_>>()
                .join("\n");
            bail!(
                "{} failed {} contract validation:\n{}",
                path.display(),
                self.name,
                details
            );
        }
        Ok(())
    }
}

fn compile(name: &'static str, raw: &str) -> Result<Contract> {
    let schema: Value =
        serde_json::from_str(raw).with_context(|| format!("parsing {name} contract"))?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| anyhow!("compiling {name} contract: {err}"))?;
    Ok(Contract { name, compiled })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bundled_contracts_compile() {
        Contract::table().unwrap();
        Contract::option_groups().unwrap();
        Contract::listing_schema().unwrap();
    }

    #[test]
    fn table_contract_rejects_records_without_ids() {
        let contract = Contract::table().unwrap();
        let document = json!([{ "id": "ok", "name": "Ok" }, { "name": "No id" }]);
        let err = contract
            .check(&document, Path::new("brands.json"))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("brands.json"));
        assert!(message.contains("catalog_table"));
    }

    #[test]
    fn table_contract_accepts_well_formed_records() {
        let contract = Contract::table().unwrap();
        let document = json!([{ "id": "black", "name": "Black", "hex": "#111827" }]);
        contract.check(&document, Path::new("colors.json")).unwrap();
    }
}
