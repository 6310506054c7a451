//! Bicycle listing reference catalog and listing validator.
//!
//! The crate loads an immutable catalog (bike types, brands, model families,
//! components, sizes, colors, countries, currencies, option groups and the
//! six-step listing schema) from a data directory, validates caller-owned
//! listing drafts step by step, offers price guidance, and exposes all of it
//! through named JSON operations. The binaries are thin wrappers: `listing-tools` for one-shot
//! calls and data checks, `listing-serve` for a line-delimited request loop.

pub mod catalog;
pub mod config;
pub mod draft;
pub mod error;
pub mod pricing;
mod schema_loader;
pub mod serve;
pub mod telemetry;
pub mod tools;
pub mod validator;

pub use catalog::{Catalog, Page, Record, TableKind};
pub use config::{CommonArgs, LogFormat, Settings, resolve_data_dir};
pub use draft::Draft;
pub use error::{CatalogError, ErrorCode, ValidatorError};
pub use serve::{ServeStats, serve};
pub use tools::{ListingTools, TOOLS, ToolResponse, ToolSpec};
pub use validator::{FieldError, ListingReport, StepReport, Validator};
