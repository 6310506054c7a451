//! The loaded reference catalog.
//!
//! `Catalog::load` reads every table, the option groups and the listing
//! schema from one data directory, checks each raw file against its bundled
//! contract, then cross-checks references between tables. It is strict: a
//! dangling id or duplicate anywhere fails the whole load, because the
//! validator and the tools assume every stored reference resolves.

use crate::catalog::identity::TableKind;
use crate::catalog::model::{
    BikeCategory, BikeType, Brand, Color, Component, Country, Currency, Model, OptionEntry,
    Record, Size, parse_records, read_json_file,
};
use crate::catalog::steps::ListingSchema;
use crate::catalog::table::{Page, Table};
use crate::error::CatalogError;
use crate::schema_loader::Contract;
use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// File whose presence marks a directory as a listing data directory.
pub const LISTING_SCHEMA_FILE: &str = "listing_schema.json";
const OPTIONS_FILE: &str = "options.json";

const COMPONENT_CATEGORIES: &str = "component_categories";
const SHIPPING_OPTIONS: &str = "shipping_options";
const PAYMENT_METHODS: &str = "payment_methods";

#[derive(Debug)]
pub struct Catalog {
    bike_types: Table<BikeType>,
    bike_categories: Table<BikeCategory>,
    brands: Table<Brand>,
    models: Table<Model>,
    components: Table<Component>,
    sizes: Table<Size>,
    colors: Table<Color>,
    countries: Table<Country>,
    currencies: Table<Currency>,
    options: BTreeMap<String, Vec<OptionEntry>>,
    schema: ListingSchema,
}

/// Narrowing applied by [`Catalog::components_matching`].
#[derive(Clone, Debug, Default)]
pub struct ComponentFilter<'a> {
    pub category: Option<&'a str>,
    pub bike_type: Option<&'a str>,
}

impl Catalog {
    /// Load and validate the catalog rooted at `data_dir`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let contract = Contract::table()?;
        let bike_types: Vec<BikeType> = load_table(data_dir, TableKind::BikeTypes, &contract)?;
        let brands = load_table(data_dir, TableKind::Brands, &contract)?;
        let models = load_table(data_dir, TableKind::Models, &contract)?;
        let components = load_table(data_dir, TableKind::Components, &contract)?;
        let sizes = load_table(data_dir, TableKind::Sizes, &contract)?;
        let colors = load_table(data_dir, TableKind::Colors, &contract)?;
        let countries = load_table(data_dir, TableKind::Countries, &contract)?;
        let currencies = load_table(data_dir, TableKind::Currencies, &contract)?;

        let options_path = data_dir.join(OPTIONS_FILE);
        let raw_options = read_json_file(&options_path)?;
        Contract::option_groups()?.check(&raw_options, &options_path)?;
        let options: BTreeMap<String, Vec<OptionEntry>> =
            serde_json::from_value(raw_options)
                .with_context(|| format!("decoding {}", options_path.display()))?;

        let schema_path = data_dir.join(LISTING_SCHEMA_FILE);
        let raw_schema = read_json_file(&schema_path)?;
        Contract::listing_schema()?.check(&raw_schema, &schema_path)?;
        let schema: ListingSchema = serde_json::from_value(raw_schema)
            .with_context(|| format!("decoding {}", schema_path.display()))?;

        let bike_categories = flatten_categories(&bike_types);
        let catalog = Self {
            bike_types: Table::build(bike_types)?,
            bike_categories: Table::build(bike_categories)?,
            brands: Table::build(brands)?,
            models: Table::build(models)?,
            components: Table::build(components)?,
            sizes: Table::build(sizes)?,
            colors: Table::build(colors)?,
            countries: Table::build(countries)?,
            currencies: Table::build(currencies)?,
            options,
            schema,
        };
        catalog
            .check_references()
            .with_context(|| format!("cross-checking catalog in {}", data_dir.display()))?;
        catalog
            .schema
            .check(&catalog.options)
            .with_context(|| format!("checking {}", schema_path.display()))?;

        tracing::info!(
            data_dir = %data_dir.display(),
            schema_version = %catalog.schema.schema_version,
            bike_types = catalog.bike_types.len(),
            brands = catalog.brands.len(),
            models = catalog.models.len(),
            components = catalog.components.len(),
            countries = catalog.countries.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn bike_types(&self) -> &Table<BikeType> {
        &self.bike_types
    }

    pub fn bike_categories(&self) -> &Table<BikeCategory> {
        &self.bike_categories
    }

    pub fn brands(&self) -> &Table<Brand> {
        &self.brands
    }

    pub fn models(&self) -> &Table<Model> {
        &self.models
    }

    pub fn components(&self) -> &Table<Component> {
        &self.components
    }

    pub fn sizes(&self) -> &Table<Size> {
        &self.sizes
    }

    pub fn colors(&self) -> &Table<Color> {
        &self.colors
    }

    pub fn countries(&self) -> &Table<Country> {
        &self.countries
    }

    pub fn currencies(&self) -> &Table<Currency> {
        &self.currencies
    }

    pub fn schema(&self) -> &ListingSchema {
        &self.schema
    }

    pub fn option_group(&self, name: &str) -> Option<&[OptionEntry]> {
        self.options.get(name).map(Vec::as_slice)
    }

    pub fn option_groups(&self) -> &BTreeMap<String, Vec<OptionEntry>> {
        &self.options
    }

    /// Exact lookup by table and id.
    pub fn get(&self, table: TableKind, id: &str) -> Result<&dyn Record, CatalogError> {
        let found = match table {
            TableKind::BikeTypes => self.bike_types.get(id).map(erase),
            TableKind::BikeCategories => self.bike_categories.get(id).map(erase),
            TableKind::Brands => self.brands.get(id).map(erase),
            TableKind::Models => self.models.get(id).map(erase),
            TableKind::Components => self.components.get(id).map(erase),
            TableKind::Sizes => self.sizes.get(id).map(erase),
            TableKind::Colors => self.colors.get(id).map(erase),
            TableKind::Countries => self.countries.get(id).map(erase),
            TableKind::Currencies => self.currencies.get(id).map(erase),
        };
        found.ok_or_else(|| CatalogError::NotFound {
            table,
            id: id.to_string(),
        })
    }

    /// Case-insensitive substring search on the table's display field.
    pub fn search(
        &self,
        table: TableKind,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Page<&dyn Record> {
        match table {
            TableKind::BikeTypes => self.bike_types.search(query, offset, limit).map(erase),
            TableKind::BikeCategories => {
                self.bike_categories.search(query, offset, limit).map(erase)
            }
            TableKind::Brands => self.brands.search(query, offset, limit).map(erase),
            TableKind::Models => self.models.search(query, offset, limit).map(erase),
            TableKind::Components => self.components.search(query, offset, limit).map(erase),
            TableKind::Sizes => self.sizes.search(query, offset, limit).map(erase),
            TableKind::Colors => self.colors.search(query, offset, limit).map(erase),
            TableKind::Countries => self.countries.search(query, offset, limit).map(erase),
            TableKind::Currencies => self.currencies.search(query, offset, limit).map(erase),
        }
    }

    /// Every record of a table in file order.
    pub fn list_all(&self, table: TableKind) -> Vec<&dyn Record> {
        match table {
            TableKind::BikeTypes => self.bike_types.all().iter().map(erase).collect(),
            TableKind::BikeCategories => self.bike_categories.all().iter().map(erase).collect(),
            TableKind::Brands => self.brands.all().iter().map(erase).collect(),
            TableKind::Models => self.models.all().iter().map(erase).collect(),
            TableKind::Components => self.components.all().iter().map(erase).collect(),
            TableKind::Sizes => self.sizes.all().iter().map(erase).collect(),
            TableKind::Colors => self.colors.all().iter().map(erase).collect(),
            TableKind::Countries => self.countries.all().iter().map(erase).collect(),
            TableKind::Currencies => self.currencies.all().iter().map(erase).collect(),
        }
    }

    /// Model families of a brand in the brand's display order, optionally
    /// narrowed to one bike type.
    pub fn models_for_brand(
        &self,
        brand_id: &str,
        bike_type: Option<&str>,
    ) -> Result<Vec<&Model>, CatalogError> {
        let brand = self
            .brands
            .get(brand_id)
            .ok_or_else(|| CatalogError::NotFound {
                table: TableKind::Brands,
                id: brand_id.to_string(),
            })?;
        Ok(brand
            .family_ids
            .iter()
            .filter_map(|family| self.models.get(family))
            .filter(|model| bike_type.is_none_or(|wanted| model.bike_types.iter().any(|t| t == wanted)))
            .collect())
    }

    pub fn components_matching(
        &self,
        filter: &ComponentFilter<'_>,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Page<&Component> {
        self.components.search_where(query, offset, limit, |component| {
            filter
                .category
                .is_none_or(|category| component.category == category)
                && filter
                    .bike_type
                    .is_none_or(|wanted| component.bike_types.iter().any(|t| t == wanted))
        })
    }

    /// Record counts per table.
    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        TableKind::ALL
            .into_iter()
            .map(|kind| (kind.as_str(), self.list_all(kind).len()))
            .collect()
    }

    fn check_references(&self) -> Result<()> {
        for group in self.options.keys() {
            self.option_codes(group)?;
        }

        for brand in self.brands.all() {
            for family in &brand.family_ids {
                let Some(model) = self.models.get(family) else {
                    bail!("brand {} references unknown model family {family}", brand.id);
                };
                if model.brand_id != brand.id {
                    bail!(
                        "brand {} lists family {family}, which belongs to {}",
                        brand.id,
                        model.brand_id
                    );
                }
            }
            if let Some(custom) = &brand.custom_family_id {
                if !brand.family_ids.contains(custom) {
                    bail!(
                        "brand {} custom family {custom} is not one of its families",
                        brand.id
                    );
                }
            }
        }

        for model in self.models.all() {
            let Some(brand) = self.brands.get(&model.brand_id) else {
                bail!("model {} references unknown brand {}", model.id, model.brand_id);
            };
            if !brand.family_ids.contains(&model.id) {
                bail!("model {} is not listed by brand {}", model.id, brand.id);
            }
            self.check_bike_types("model", &model.id, &model.bike_types)?;
            if let Some(range) = model.year_range {
                if range.from > range.to {
                    bail!("model {} has an inverted year range", model.id);
                }
            }
        }

        let categories = self.option_codes(COMPONENT_CATEGORIES)?;
        for component in self.components.all() {
            if !categories.contains(component.category.as_str()) {
                bail!(
                    "component {} uses unknown category {}",
                    component.id,
                    component.category
                );
            }
            self.check_bike_types("component", &component.id, &component.bike_types)?;
        }

        let shipping = self.option_codes(SHIPPING_OPTIONS)?;
        for country in self.countries.all() {
            for currency in &country.currencies {
                if !self.currencies.contains(currency) {
                    bail!("country {} references unknown currency {currency}", country.id);
                }
            }
            if let Some(option) = country
                .shipping_options
                .iter()
                .find(|option| !shipping.contains(option.as_str()))
            {
                bail!("country {} offers unknown shipping option {option}", country.id);
            }
        }

        let payments = self.option_codes(PAYMENT_METHODS)?;
        for currency in self.currencies.all() {
            if let Some(method) = currency
                .payment_methods
                .iter()
                .find(|method| !payments.contains(method.as_str()))
            {
                bail!(
                    "currency {} accepts unknown payment method {method}",
                    currency.id
                );
            }
        }

        Ok(())
    }

    fn check_bike_types(&self, owner: &str, id: &str, bike_types: &[String]) -> Result<()> {
        for bike_type in bike_types {
            if !self.bike_types.contains(bike_type) {
                bail!("{owner} {id} references unknown bike type {bike_type}");
            }
        }
        Ok(())
    }

    fn option_codes(&self, group: &str) -> Result<BTreeSet<&str>> {
        let Some(entries) = self.options.get(group) else {
            bail!("option group {group} is missing");
        };
        let mut codes = BTreeSet::new();
        for entry in entries {
            if !codes.insert(entry.code.as_str()) {
                bail!("option group {group} repeats code {}", entry.code);
            }
        }
        Ok(codes)
    }
}

fn erase<T: Record>(record: &T) -> &dyn Record {
    record
}

fn load_table<T: DeserializeOwned>(
    data_dir: &Path,
    table: TableKind,
    contract: &Contract,
) -> Result<Vec<T>> {
    let path = data_dir.join(format!("{}.json", table.as_str()));
    let raw = read_json_file(&path)?;
    contract.check(&raw, &path)?;
    parse_records(raw, &path)
}

fn flatten_categories(bike_types: &[BikeType]) -> Vec<BikeCategory> {
    bike_types
        .iter()
        .flat_map(|bike_type| {
            bike_type.categories.iter().map(|category| BikeCategory {
                id: category.id.clone(),
                name: category.name.clone(),
                bike_type: bike_type.id.clone(),
            })
        })
        .collect()
}
