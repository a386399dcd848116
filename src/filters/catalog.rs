use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

/// Every property type tag the marketplace knows about.
pub const PROPERTY_TYPES: [&str; 35] = [
    // Residential
    "apartment",
    "studio",
    "penthouse",
    "duplex",
    "loft",
    "house",
    "villa",
    "townhouse",
    "bungalow",
    "cottage",
    "farmhouse",
    "mansion",
    "chalet",
    "condo",
    "serviced-apartment",
    "room",
    "shared-room",
    "mobile-home",
    "residential-land",
    // Commercial
    "office",
    "coworking-space",
    "retail",
    "shop",
    "showroom",
    "restaurant",
    "hotel",
    "warehouse",
    "factory",
    "industrial-land",
    "commercial-land",
    "agricultural-land",
    "parking-space",
    "garage",
    "building",
    "mixed-use",
];

/// A tag from [`PROPERTY_TYPES`]. Can only be built from a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyType(&'static str);

impl PropertyType {
    /// Look up a tag in the catalog. Matching is exact.
    pub fn from_tag(tag: &str) -> Option<Self> {
        PROPERTY_TYPES
            .into_iter()
            .find(|known| *known == tag)
            .map(PropertyType)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn all() -> impl Iterator<Item = PropertyType> {
        PROPERTY_TYPES.into_iter().map(PropertyType)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for PropertyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl<'de> Deserialize<'de> for PropertyType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        PropertyType::from_tag(&tag)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown property type: {tag}")))
    }
}

/// Field deserializer that maps tags outside the catalog to `None`
/// instead of failing the surrounding document.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<PropertyType>, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = Option::<String>::deserialize(deserializer)?;
    Ok(tag.and_then(|tag| {
        let parsed = PropertyType::from_tag(&tag);
        if parsed.is_none() {
            debug!(tag = %tag, "Ignoring unknown property type");
        }
        parsed
    }))
}
