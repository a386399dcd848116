//! Mapping between [`FilterSet`] and the search page's query string.
//!
//! Parsing never fails. Anything unrecognised or malformed falls back to
//! the field default, so a hand-edited or stale URL still renders a search.

use std::collections::HashMap;

use tracing::debug;
use url::form_urlencoded;

use super::catalog::PropertyType;
use super::types::{Amenity, FilterSet, ListingStatus, Purpose, RentalTerm, SortBy, ViewMode};

pub const LISTING_STATUS: &str = "listingStatus";
pub const PURPOSE: &str = "purpose";
pub const RENTAL_TERM: &str = "rentalTerm";
pub const PROPERTY_TYPE: &str = "propertyType";
pub const PRICE_MIN: &str = "priceMin";
pub const PRICE_MAX: &str = "priceMax";
pub const AREA_MIN: &str = "areaMin";
pub const AREA_MAX: &str = "areaMax";
pub const BEDROOMS: &str = "bedrooms";
pub const BATHROOMS: &str = "bathrooms";
pub const SORT_BY: &str = "sortBy";
pub const SHOW_SOLD: &str = "showSold";
pub const VIEW: &str = "view";

const TRUE: &str = "true";

/// Build a [`FilterSet`] from a query string, with or without the leading `?`.
pub fn parse(query: &str) -> FilterSet {
    let query = query.strip_prefix('?').unwrap_or(query);

    // First non-empty occurrence of a key wins
    let mut params: HashMap<String, String> = HashMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    let get = |key: &str| params.get(key).map(String::as_str);

    let amenities = Amenity::ALL
        .into_iter()
        .filter(|amenity| get(amenity.key()) == Some(TRUE))
        .collect();

    let filters = FilterSet {
        listing_status: field(
            LISTING_STATUS,
            get(LISTING_STATUS),
            ListingStatus::from_query,
        ),
        purpose: field(PURPOSE, get(PURPOSE), Purpose::from_query),
        rental_term: field(RENTAL_TERM, get(RENTAL_TERM), RentalTerm::from_query),
        property_type: field(PROPERTY_TYPE, get(PROPERTY_TYPE), PropertyType::from_tag),
        price_min: field(PRICE_MIN, get(PRICE_MIN), number),
        price_max: field(PRICE_MAX, get(PRICE_MAX), number),
        area_min: field(AREA_MIN, get(AREA_MIN), number),
        area_max: field(AREA_MAX, get(AREA_MAX), number),
        bedrooms: field(BEDROOMS, get(BEDROOMS), number),
        bathrooms: field(BATHROOMS, get(BATHROOMS), number),
        amenities,
        sort_by: field(SORT_BY, get(SORT_BY), SortBy::from_query).unwrap_or_default(),
        show_sold: get(SHOW_SOLD) == Some(TRUE),
        view_mode: field(VIEW, get(VIEW), ViewMode::from_query).unwrap_or_default(),
    };

    filters.normalized()
}

/// Render a [`FilterSet`] as a query string (no leading `?`).
///
/// Fields at their default are left out, so the default set renders as "".
pub fn serialize(filters: &FilterSet) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());

    if let Some(status) = filters.listing_status {
        out.append_pair(LISTING_STATUS, status.as_str());
    }
    if let Some(purpose) = filters.purpose {
        out.append_pair(PURPOSE, purpose.as_str());
    }
    if filters.rental_term_applies() {
        if let Some(term) = filters.rental_term {
            out.append_pair(RENTAL_TERM, term.as_str());
        }
    }
    if let Some(property_type) = filters.property_type {
        out.append_pair(PROPERTY_TYPE, property_type.as_str());
    }

    let numbers = [
        (PRICE_MIN, filters.price_min),
        (PRICE_MAX, filters.price_max),
        (AREA_MIN, filters.area_min),
        (AREA_MAX, filters.area_max),
        (BEDROOMS, filters.bedrooms.map(u64::from)),
        (BATHROOMS, filters.bathrooms.map(u64::from)),
    ];
    for (key, value) in numbers {
        if let Some(value) = value {
            out.append_pair(key, &value.to_string());
        }
    }

    for amenity in Amenity::ALL {
        if filters.has_amenity(amenity) {
            out.append_pair(amenity.key(), TRUE);
        }
    }

    if filters.sort_by != SortBy::default() {
        out.append_pair(SORT_BY, filters.sort_by.as_str());
    }
    if filters.show_sold {
        out.append_pair(SHOW_SOLD, TRUE);
    }
    if filters.view_mode != ViewMode::default() {
        out.append_pair(VIEW, filters.view_mode.as_str());
    }

    out.finish()
}

fn field<T>(key: &str, raw: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let raw = raw?;
    let parsed = parse(raw);
    if parsed.is_none() {
        debug!(key, value = raw, "Ignoring unparsable filter value");
    }
    parsed
}

fn number<T: std::str::FromStr>(raw: &str) -> Option<T> {
    raw.parse().ok()
}
