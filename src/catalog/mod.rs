//! Reference catalog wiring.
//!
//! The catalog is the immutable set of tables under `data/` (bike types,
//! brands, model families, components, sizes, colors, countries, currencies),
//! the option groups that enumerate closed value domains, and the six-step
//! listing schema. Load it once with [`Catalog::load`] and pass it by
//! reference; nothing mutates it afterwards.

pub mod identity;
pub mod index;
pub mod model;
pub mod steps;
pub mod table;

pub use identity::{SizeScheme, TableKind};
pub use index::{Catalog, ComponentFilter, LISTING_SCHEMA_FILE};
pub use model::{
    BikeCategory, BikeType, Brand, CategoryEntry, Color, Component, Country, Currency, Model,
    OptionEntry, PriceRange, Record, Size, YearRange,
};
pub use steps::{
    CompatibilityRule, ConditionalRule, FieldKind, FieldMatch, FieldSpec, ListingSchema,
    PhotoGuidelines, STEP_COUNT, ShotGuideline, StepSchema,
};
pub use table::{Page, Table};
