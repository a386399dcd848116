use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filters::{Amenity, ListingStatus, PropertyType, Purpose, RentalTerm};

/// Location information for a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub city: String,
    pub area: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A single marketplace listing as returned by the results API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub address: String,
    pub location: Location,
    pub listing_status: ListingStatus,
    pub purpose: Purpose,
    #[serde(default)]
    pub rental_term: Option<RentalTerm>,
    /// `None` when the API sends a type outside the catalog
    #[serde(default, deserialize_with = "crate::filters::catalog::lenient")]
    pub property_type: Option<PropertyType>,
    pub price: u64,
    /// Floor area in square meters
    pub area: u64,
    pub bedrooms: u8,
    pub bathrooms: u8,
    #[serde(default)]
    pub amenities: Vec<Amenity>,
    #[serde(default)]
    pub sold: bool,
    #[serde(default)]
    pub images: Vec<String>,
    pub url: String,
    pub listed_at: DateTime<Utc>,
}

impl Listing {
    pub fn has_amenity(&self, amenity: Amenity) -> bool {
        self.amenities.contains(&amenity)
    }
}

/// One page of search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingsPage {
    pub listings: Vec<Listing>,
    /// Total number of matches across all pages
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
}

impl ListingsPage {
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            listings: Vec::new(),
            total: 0,
            page,
            page_size,
        }
    }

    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        let pages = self.total.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}
