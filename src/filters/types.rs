use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::catalog::PropertyType;

/// Which marketplace section a listing belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingStatus {
    ForSale,
    ForRent,
    NewProject,
}

impl ListingStatus {
    pub const ALL: [ListingStatus; 3] = [Self::ForSale, Self::ForRent, Self::NewProject];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForSale => "for-sale",
            Self::ForRent => "for-rent",
            Self::NewProject => "new-project",
        }
    }

    pub fn from_query(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Purpose {
    Residential,
    Commercial,
}

impl Purpose {
    pub const ALL: [Purpose; 2] = [Self::Residential, Self::Commercial];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
        }
    }

    pub fn from_query(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|purpose| purpose.as_str() == value)
    }
}

/// Rental duration. Only meaningful for residential rentals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RentalTerm {
    LongTerm,
    ShortTerm,
}

impl RentalTerm {
    pub const ALL: [RentalTerm; 2] = [Self::LongTerm, Self::ShortTerm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LongTerm => "long-term",
            Self::ShortTerm => "short-term",
        }
    }

    pub fn from_query(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|term| term.as_str() == value)
    }
}

/// Amenity flags. Each one is its own boolean query key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Amenity {
    Parking,
    PetsAllowed,
    Furnished,
    Pool,
    Gym,
}

impl Amenity {
    pub const ALL: [Amenity; 5] = [
        Self::Parking,
        Self::PetsAllowed,
        Self::Furnished,
        Self::Pool,
        Self::Gym,
    ];

    /// Query key for this amenity
    pub fn key(&self) -> &'static str {
        match self {
            Self::Parking => "parking",
            Self::PetsAllowed => "petsAllowed",
            Self::Furnished => "furnished",
            Self::Pool => "pool",
            Self::Gym => "gym",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    Beds,
    Area,
}

impl SortBy {
    pub const ALL: [SortBy; 5] = [
        Self::Newest,
        Self::PriceLow,
        Self::PriceHigh,
        Self::Beds,
        Self::Area,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Beds => "beds",
            Self::Area => "area",
        }
    }

    pub fn from_query(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sort| sort.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    Map,
    List,
}

impl ViewMode {
    pub const ALL: [ViewMode; 2] = [Self::Map, Self::List];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::List => "list",
        }
    }

    pub fn from_query(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == value)
    }
}

/// A single field mutation coming from a filter control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    ListingStatus(Option<ListingStatus>),
    Purpose(Option<Purpose>),
    RentalTerm(Option<RentalTerm>),
    PropertyType(Option<PropertyType>),
    PriceMin(Option<u64>),
    PriceMax(Option<u64>),
    AreaMin(Option<u64>),
    AreaMax(Option<u64>),
    Bedrooms(Option<u8>),
    Bathrooms(Option<u8>),
    Amenity(Amenity, bool),
    SortBy(SortBy),
    ShowSold(bool),
    ViewMode(ViewMode),
}

/// All active search criteria as one value.
///
/// `FilterSet::default()` is the "nothing selected" state. Mutations go
/// through [`FilterSet::apply`], which keeps `rental_term` consistent with
/// the listing status and purpose. Its only text form is the query string
/// in [`super::query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub listing_status: Option<ListingStatus>,
    pub purpose: Option<Purpose>,
    pub rental_term: Option<RentalTerm>,
    pub property_type: Option<PropertyType>,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    pub area_min: Option<u64>,
    pub area_max: Option<u64>,
    /// At least this many bedrooms
    pub bedrooms: Option<u8>,
    /// At least this many bathrooms
    pub bathrooms: Option<u8>,
    pub amenities: BTreeSet<Amenity>,
    pub sort_by: SortBy,
    pub show_sold: bool,
    pub view_mode: ViewMode,
}

impl FilterSet {
    /// Rental term only applies to residential rentals.
    pub fn rental_term_applies(&self) -> bool {
        self.listing_status == Some(ListingStatus::ForRent)
            && self.purpose == Some(Purpose::Residential)
    }

    /// Apply one field mutation and run the cascade rules.
    pub fn apply(&self, change: FilterChange) -> FilterSet {
        let mut next = self.clone();
        match change {
            FilterChange::ListingStatus(value) => next.listing_status = value,
            FilterChange::Purpose(value) => next.purpose = value,
            FilterChange::RentalTerm(value) => next.rental_term = value,
            FilterChange::PropertyType(value) => next.property_type = value,
            FilterChange::PriceMin(value) => next.price_min = value,
            FilterChange::PriceMax(value) => next.price_max = value,
            FilterChange::AreaMin(value) => next.area_min = value,
            FilterChange::AreaMax(value) => next.area_max = value,
            FilterChange::Bedrooms(value) => next.bedrooms = value,
            FilterChange::Bathrooms(value) => next.bathrooms = value,
            FilterChange::Amenity(amenity, true) => {
                next.amenities.insert(amenity);
            }
            FilterChange::Amenity(amenity, false) => {
                next.amenities.remove(&amenity);
            }
            FilterChange::SortBy(value) => next.sort_by = value,
            FilterChange::ShowSold(value) => next.show_sold = value,
            FilterChange::ViewMode(value) => next.view_mode = value,
        }
        next.normalized()
    }

    /// Enforce the dependent-field rules.
    pub fn normalized(mut self) -> FilterSet {
        if !self.rental_term_applies() {
            self.rental_term = None;
        }
        self
    }

    /// Reset everything except the marketplace section.
    pub fn cleared(&self) -> FilterSet {
        FilterSet {
            listing_status: self.listing_status,
            purpose: self.purpose,
            ..FilterSet::default()
        }
    }

    pub fn has_amenity(&self, amenity: Amenity) -> bool {
        self.amenities.contains(&amenity)
    }

    pub fn price_range(&self) -> (Option<u64>, Option<u64>) {
        (self.price_min, self.price_max)
    }

    pub fn area_range(&self) -> (Option<u64>, Option<u64>) {
        (self.area_min, self.area_max)
    }

    /// True when either min/max pair is present and backwards.
    /// Inversions are passed on as-is; this is only for diagnostics.
    pub fn has_inverted_range(&self) -> bool {
        is_inverted(self.price_range()) || is_inverted(self.area_range())
    }

    pub fn is_default(&self) -> bool {
        *self == FilterSet::default()
    }
}

fn is_inverted(range: (Option<u64>, Option<u64>)) -> bool {
    matches!(range, (Some(min), Some(max)) if min > max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residential_rental() -> FilterSet {
        FilterSet::default()
            .apply(FilterChange::ListingStatus(Some(ListingStatus::ForRent)))
            .apply(FilterChange::Purpose(Some(Purpose::Residential)))
            .apply(FilterChange::RentalTerm(Some(RentalTerm::ShortTerm)))
    }

    #[test]
    fn leaving_rentals_clears_rental_term() {
        let filters = residential_rental();
        assert_eq!(filters.rental_term, Some(RentalTerm::ShortTerm));

        let for_sale = filters.apply(FilterChange::ListingStatus(Some(ListingStatus::ForSale)));
        assert_eq!(for_sale.rental_term, None);
        assert_eq!(for_sale.purpose, Some(Purpose::Residential));
    }

    #[test]
    fn switching_to_commercial_clears_rental_term() {
        let filters = residential_rental().apply(FilterChange::Purpose(Some(Purpose::Commercial)));
        assert_eq!(filters.rental_term, None);
    }

    #[test]
    fn rental_term_outside_rentals_is_ignored() {
        let filters = FilterSet::default()
            .apply(FilterChange::ListingStatus(Some(ListingStatus::ForSale)))
            .apply(FilterChange::RentalTerm(Some(RentalTerm::LongTerm)));
        assert_eq!(filters.rental_term, None);
    }

    #[test]
    fn query_names_parse_back() {
        for mode in ViewMode::ALL {
            assert_eq!(ViewMode::from_query(mode.as_str()), Some(mode));
        }
        for sort in SortBy::ALL {
            assert_eq!(SortBy::from_query(sort.as_str()), Some(sort));
        }
        assert_eq!(ViewMode::from_query("grid"), None);
    }

    #[test]
    fn amenity_toggles() {
        let filters = FilterSet::default()
            .apply(FilterChange::Amenity(Amenity::Pool, true))
            .apply(FilterChange::Amenity(Amenity::Gym, true))
            .apply(FilterChange::Amenity(Amenity::Pool, false));
        assert!(filters.has_amenity(Amenity::Gym));
        assert!(!filters.has_amenity(Amenity::Pool));
    }

    #[test]
    fn cleared_keeps_only_the_section() {
        let filters = residential_rental()
            .apply(FilterChange::Bedrooms(Some(3)))
            .apply(FilterChange::SortBy(SortBy::PriceHigh))
            .apply(FilterChange::ShowSold(true));

        let cleared = filters.cleared();
        assert_eq!(cleared.listing_status, Some(ListingStatus::ForRent));
        assert_eq!(cleared.purpose, Some(Purpose::Residential));
        assert_eq!(cleared.rental_term, None);
        assert_eq!(cleared.bedrooms, None);
        assert_eq!(cleared.sort_by, SortBy::Newest);
        assert!(!cleared.show_sold);
    }

    #[test]
    fn inverted_ranges_are_reported_not_fixed() {
        let filters = FilterSet::default()
            .apply(FilterChange::PriceMin(Some(100_000)))
            .apply(FilterChange::PriceMax(Some(50_000)));
        assert!(filters.has_inverted_range());
        assert_eq!(filters.price_range(), (Some(100_000), Some(50_000)));

        let one_sided = FilterSet::default().apply(FilterChange::AreaMin(Some(500)));
        assert!(!one_sided.has_inverted_range());
    }
}
