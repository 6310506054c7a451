//! Named operations over the catalog and validator.
//!
//! Each operation takes a JSON object of arguments and answers with a
//! [`ToolResponse`]. The registry below fixes the workflow step an operation
//! belongs to and the operations an agent would usually call next; both are
//! echoed in the response metadata.

mod envelope;
mod lookup;
mod pricing;
mod validation;

pub use envelope::{ResponseMetadata, ToolError, ToolResponse};

use crate::catalog::Catalog;
use crate::error::ErrorCode;
use crate::validator::Validator;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Static description of one operation.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<u8>,
    pub description: &'static str,
    pub next: &'static [&'static str],
}

pub const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "list_bike_types",
        step: Some(1),
        description: "Bike types and their categories.",
        next: &["list_brands"],
    },
    ToolSpec {
        name: "list_brands",
        step: Some(1),
        description: "Search brands by name with offset/limit pagination.",
        next: &["list_models"],
    },
    ToolSpec {
        name: "list_models",
        step: Some(1),
        description: "Model families of a brand, optionally for one bike type.",
        next: &["get_model_details"],
    },
    ToolSpec {
        name: "get_model_details",
        step: Some(1),
        description: "One model family of a brand.",
        next: &["get_detail_options"],
    },
    ToolSpec {
        name: "get_detail_options",
        step: Some(2),
        description: "Specification fields and their allowed values for a bike type.",
        next: &["validate_bike_details"],
    },
    ToolSpec {
        name: "get_field_requirements",
        step: Some(2),
        description: "Required, optional and excluded fields of every step for a bike type.",
        next: &["get_detail_options"],
    },
    ToolSpec {
        name: "list_colors",
        step: Some(2),
        description: "Frame colors.",
        next: &["validate_bike_details"],
    },
    ToolSpec {
        name: "list_sizes",
        step: Some(2),
        description: "Frame sizes, optionally for one sizing scheme.",
        next: &["validate_bike_details"],
    },
    ToolSpec {
        name: "validate_bike_details",
        step: Some(2),
        description: "Validate the specification step.",
        next: &["list_countries"],
    },
    ToolSpec {
        name: "list_countries",
        step: Some(3),
        description: "Supported countries with currencies and shipping options.",
        next: &["list_cities"],
    },
    ToolSpec {
        name: "list_cities",
        step: Some(3),
        description: "Cities of a country, optionally filtered by name.",
        next: &["get_shipping_options"],
    },
    ToolSpec {
        name: "get_shipping_options",
        step: Some(3),
        description: "Shipping options offered in a country.",
        next: &["list_component_categories"],
    },
    ToolSpec {
        name: "list_component_categories",
        step: Some(4),
        description: "Component categories with component counts.",
        next: &["list_components"],
    },
    ToolSpec {
        name: "list_components",
        step: Some(4),
        description: "Search components by category, bike type and name.",
        next: &["validate_component_compatibility"],
    },
    ToolSpec {
        name: "validate_component_compatibility",
        step: Some(4),
        description: "Validate the components step.",
        next: &["list_currencies"],
    },
    ToolSpec {
        name: "list_currencies",
        step: Some(5),
        description: "Currencies and the payment methods each accepts.",
        next: &["get_payment_methods", "get_price_suggestions"],
    },
    ToolSpec {
        name: "get_payment_methods",
        step: Some(5),
        description: "Payment methods accepted for a currency.",
        next: &["validate_pricing"],
    },
    ToolSpec {
        name: "get_price_suggestions",
        step: Some(5),
        description: "Resale price range for a model family by year and condition.",
        next: &["calculate_fees", "validate_pricing"],
    },
    ToolSpec {
        name: "calculate_fees",
        step: Some(5),
        description: "Platform and payment fees deducted from an asking price.",
        next: &["validate_pricing"],
    },
    ToolSpec {
        name: "validate_pricing",
        step: Some(5),
        description: "Validate the pricing step.",
        next: &["get_photo_requirements"],
    },
    ToolSpec {
        name: "get_photo_requirements",
        step: Some(6),
        description: "Photo count limits and shot guidelines.",
        next: &["validate_photo_order"],
    },
    ToolSpec {
        name: "validate_photo_order",
        step: Some(6),
        description: "Validate the photos step.",
        next: &["validate_bike_listing"],
    },
    ToolSpec {
        name: "validate_step",
        step: None,
        description: "Validate any single step of a draft.",
        next: &[],
    },
    ToolSpec {
        name: "validate_bike_listing",
        step: None,
        description: "Validate all six steps of a draft.",
        next: &[],
    },
    ToolSpec {
        name: "get_listing_workflow",
        step: None,
        description: "The six steps, their fields and operations.",
        next: &["list_bike_types"],
    },
    ToolSpec {
        name: "get_server_capabilities",
        step: None,
        description: "Catalog sizes, schema version and available operations.",
        next: &["get_listing_workflow"],
    },
];

pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|spec| spec.name == name)
}

/// Operation dispatcher bound to one loaded catalog.
#[derive(Clone, Copy, Debug)]
pub struct ListingTools<'a> {
    catalog: &'a Catalog,
    validator: Validator<'a>,
}

impl<'a> ListingTools<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            validator: Validator::new(catalog),
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Run operation `name` with `arguments` (a JSON object, or null for none).
    pub fn call(&self, name: &str, arguments: &Value) -> ToolResponse {
        let Some(spec) = find_tool(name) else {
            tracing::debug!(tool = name, "unknown tool");
            let error = ToolError::new(ErrorCode::NotFound, format!("unknown tool '{name}'"))
                .with_details(json!({ "tool": name }));
            return ToolResponse::failed(error, ResponseMetadata::default());
        };

        let span = tracing::info_span!("tool", name = spec.name);
        let _guard = span.enter();

        let metadata = ResponseMetadata {
            step: spec.step,
            next_suggested_tools: spec.next.iter().map(|next| next.to_string()).collect(),
        };
        match self.dispatch(spec.name, arguments) {
            Ok(data) => {
                tracing::debug!("tool succeeded");
                ToolResponse::ok(data, metadata)
            }
            Err(error) => {
                tracing::debug!(code = %error.code, "tool failed");
                ToolResponse::failed(error, metadata)
            }
        }
    }

    fn dispatch(&self, name: &str, arguments: &Value) -> Result<Value, ToolError> {
        match name {
            "list_bike_types" => lookup::list_bike_types(self.catalog),
            "list_brands" => lookup::list_brands(self.catalog, parse(arguments)?),
            "list_models" => lookup::list_models(self.catalog, parse(arguments)?),
            "get_model_details" => lookup::get_model_details(self.catalog, parse(arguments)?),
            "get_detail_options" => {
                lookup::get_detail_options(self.catalog, &self.validator, parse(arguments)?)
            }
            "get_field_requirements" => {
                lookup::get_field_requirements(self.catalog, &self.validator, parse(arguments)?)
            }
            "list_colors" => lookup::list_colors(self.catalog),
            "list_sizes" => lookup::list_sizes(self.catalog, parse(arguments)?),
            "list_countries" => lookup::list_countries(self.catalog),
            "list_cities" => lookup::list_cities(self.catalog, parse(arguments)?),
            "get_shipping_options" => lookup::get_shipping_options(self.catalog, parse(arguments)?),
            "list_component_categories" => lookup::list_component_categories(self.catalog),
            "list_components" => lookup::list_components(self.catalog, parse(arguments)?),
            "list_currencies" => lookup::list_currencies(self.catalog),
            "get_payment_methods" => lookup::get_payment_methods(self.catalog, parse(arguments)?),
            "get_price_suggestions" => {
                pricing::get_price_suggestions(self.catalog, parse(arguments)?)
            }
            "calculate_fees" => pricing::calculate_fees(self.catalog, parse(arguments)?),
            "get_photo_requirements" => lookup::get_photo_requirements(self.catalog),
            "get_listing_workflow" => lookup::get_listing_workflow(self.catalog),
            "get_server_capabilities" => lookup::get_server_capabilities(self.catalog),
            "validate_bike_details" => {
                validation::validate_bike_details(self.catalog, &self.validator, parse(arguments)?)
            }
            "validate_component_compatibility" => validation::validate_component_compatibility(
                self.catalog,
                &self.validator,
                parse(arguments)?,
            ),
            "validate_pricing" => validation::validate_pricing(&self.validator, parse(arguments)?),
            "validate_photo_order" => {
                validation::validate_photo_order(&self.validator, parse(arguments)?)
            }
            "validate_step" => validation::validate_step(&self.validator, parse(arguments)?),
            "validate_bike_listing" => {
                validation::validate_bike_listing(&self.validator, parse(arguments)?)
            }
            other => Err(ToolError::new(
                ErrorCode::Internal,
                format!("tool '{other}' is registered but has no handler"),
            )),
        }
    }
}

/// Decode operation arguments. A missing argument object counts as `{}`.
fn parse<T: DeserializeOwned>(arguments: &Value) -> Result<T, ToolError> {
    let empty = Value::Object(Default::default());
    let source = if arguments.is_null() { &empty } else { arguments };
    T::deserialize(source)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid arguments: {err}")))
}

fn render<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(ToolError::internal)
}
