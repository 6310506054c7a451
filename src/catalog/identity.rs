use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Reference table held by the catalog.
///
/// Table names double as the `table` argument of `reference` fields in the
/// listing schema, so an unknown name is a load error rather than an `Other`
/// variant.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TableKind {
    BikeTypes,
    BikeCategories,
    Brands,
    Models,
    Components,
    Sizes,
    Colors,
    Countries,
    Currencies,
}

impl TableKind {
    pub const ALL: [TableKind; 9] = [
        TableKind::BikeTypes,
        TableKind::BikeCategories,
        TableKind::Brands,
        TableKind::Models,
        TableKind::Components,
        TableKind::Sizes,
        TableKind::Colors,
        TableKind::Countries,
        TableKind::Currencies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::BikeTypes => "bike_types",
            TableKind::BikeCategories => "bike_categories",
            TableKind::Brands => "brands",
            TableKind::Models => "models",
            TableKind::Components => "components",
            TableKind::Sizes => "sizes",
            TableKind::Colors => "colors",
            TableKind::Countries => "countries",
            TableKind::Currencies => "currencies",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        TableKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
    }

    /// Record attributes that compatibility rules may inspect.
    pub fn attributes(&self) -> &'static [&'static str] {
        match self {
            TableKind::BikeTypes => &["categories"],
            TableKind::BikeCategories => &["bike_type"],
            TableKind::Brands => &["families", "country"],
            TableKind::Models => &["brand_id", "bike_types"],
            TableKind::Components => &["bike_types", "category", "manufacturer"],
            TableKind::Sizes => &["scheme"],
            TableKind::Colors => &[],
            TableKind::Countries => &["currencies", "shipping_options", "cities"],
            TableKind::Currencies => &["payment_methods"],
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TableKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TableKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        TableKind::parse(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown catalog table '{value}'")))
    }
}

/// Sizing convention of a frame size entry.
///
/// `Other` keeps newer data files loadable by older binaries.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SizeScheme {
    Numeric,
    Letter,
    Other(String),
}

impl SizeScheme {
    pub fn as_str(&self) -> &str {
        match self {
            SizeScheme::Numeric => "numeric",
            SizeScheme::Letter => "letter",
            SizeScheme::Other(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value {
            "numeric" => SizeScheme::Numeric,
            "letter" => SizeScheme::Letter,
            other => SizeScheme::Other(other.to_string()),
        }
    }
}

impl Serialize for SizeScheme {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SizeScheme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_round_trip_through_parse() {
        for kind in TableKind::ALL {
            assert_eq!(TableKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(TableKind::parse("frames"), None);
    }

    #[test]
    fn unknown_size_scheme_is_preserved() {
        let scheme: SizeScheme = serde_json::from_str("\"wheel_inch\"").unwrap();
        assert_eq!(scheme, SizeScheme::Other("wheel_inch".to_string()));
        assert_eq!(serde_json::to_string(&scheme).unwrap(), "\"wheel_inch\"");
    }
}
