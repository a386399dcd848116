use crate::fetchers::traits::ListingsFetcher;
use crate::filters::{
    Amenity, FilterSet, ListingStatus, PropertyType, Purpose, RentalTerm, SortBy,
};
use crate::models::{Listing, ListingsPage, Location};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::cmp::Reverse;
use tracing::{debug, info};

/// Answers searches from a fixed set of listings held in memory
pub struct MemoryFetcher {
    listings: Vec<Listing>,
    page_size: u32,
}

impl MemoryFetcher {
    pub fn new(listings: Vec<Listing>, page_size: u32) -> Self {
        Self {
            listings,
            page_size: page_size.max(1),
        }
    }

    /// Fetcher preloaded with a handful of Stockholm listings
    pub fn sample(page_size: u32) -> Self {
        Self::new(sample_listings(), page_size)
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Every listing matching `filters`, in `sort_by` order
    pub fn search(&self, filters: &FilterSet) -> Vec<&Listing> {
        let mut found: Vec<&Listing> = self
            .listings
            .iter()
            .filter(|listing| matches(filters, listing))
            .collect();

        match filters.sort_by {
            SortBy::Newest => found.sort_by_key(|l| (Reverse(l.listed_at), l.id.clone())),
            SortBy::PriceLow => found.sort_by_key(|l| (l.price, l.id.clone())),
            SortBy::PriceHigh => found.sort_by_key(|l| (Reverse(l.price), l.id.clone())),
            SortBy::Beds => found.sort_by_key(|l| (Reverse(l.bedrooms), l.id.clone())),
            SortBy::Area => found.sort_by_key(|l| (Reverse(l.area), l.id.clone())),
        }

        found
    }
}

#[async_trait]
impl ListingsFetcher for MemoryFetcher {
    async fn fetch_listings(&self, filters: &FilterSet, page: u32) -> Result<ListingsPage> {
        let page = page.max(1);
        let found = self.search(filters);
        let total = found.len() as u64;

        let start = (page as usize - 1).saturating_mul(self.page_size as usize);
        let listings: Vec<Listing> = found
            .into_iter()
            .skip(start)
            .take(self.page_size as usize)
            .cloned()
            .collect();

        if filters.has_inverted_range() {
            debug!("Search has an inverted range, nothing can match it");
        }
        info!(
            "Matched {} of {} listings, returning {} on page {}",
            total,
            self.listings.len(),
            listings.len(),
            page
        );

        Ok(ListingsPage {
            listings,
            total,
            page,
            page_size: self.page_size,
        })
    }

    fn source_name(&self) -> &'static str {
        "memory"
    }
}

fn within(value: u64, min: Option<u64>, max: Option<u64>) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

/// Whether `listing` satisfies every active criterion in `filters`
pub fn matches(filters: &FilterSet, listing: &Listing) -> bool {
    if listing.sold && !filters.show_sold {
        return false;
    }
    if filters.listing_status.is_some_and(|s| s != listing.listing_status) {
        return false;
    }
    if filters.purpose.is_some_and(|p| p != listing.purpose) {
        return false;
    }
    // A term left on a non-rental set is ignored, the same as in its query string
    if filters.rental_term_applies()
        && filters.rental_term.is_some()
        && filters.rental_term != listing.rental_term
    {
        return false;
    }
    if filters
        .property_type
        .is_some_and(|t| listing.property_type != Some(t))
    {
        return false;
    }
    if !within(listing.price, filters.price_min, filters.price_max) {
        return false;
    }
    if !within(listing.area, filters.area_min, filters.area_max) {
        return false;
    }
    if filters.bedrooms.is_some_and(|n| listing.bedrooms < n) {
        return false;
    }
    if filters.bathrooms.is_some_and(|n| listing.bathrooms < n) {
        return false;
    }
    filters
        .amenities
        .iter()
        .all(|amenity| listing.has_amenity(*amenity))
}

fn listed(timestamp: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(timestamp, 0).single().unwrap_or_default()
}

fn stockholm(area: &str, latitude: f64, longitude: f64) -> Location {
    Location {
        city: "Stockholm".to_string(),
        area: Some(area.to_string()),
        latitude: Some(latitude),
        longitude: Some(longitude),
    }
}

struct Seed {
    id: &'static str,
    address: &'static str,
    area_name: &'static str,
    status: ListingStatus,
    purpose: Purpose,
    rental_term: Option<RentalTerm>,
    property_type: &'static str,
    price: u64,
    sqm: u64,
    bedrooms: u8,
    bathrooms: u8,
    amenities: &'static [Amenity],
    sold: bool,
    listed_at: i64,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "sodermalm-1",
        address: "Götgatan 120",
        area_name: "Södermalm",
        status: ListingStatus::ForSale,
        purpose: Purpose::Residential,
        rental_term: None,
        property_type: "apartment",
        price: 5_195_000,
        sqm: 70,
        bedrooms: 2,
        bathrooms: 1,
        amenities: &[Amenity::Parking],
        sold: false,
        listed_at: 1_760_000_000,
    },
    Seed {
        id: "sodermalm-2",
        address: "Ringvägen 11A",
        area_name: "Södermalm",
        status: ListingStatus::ForSale,
        purpose: Purpose::Residential,
        rental_term: None,
        property_type: "apartment",
        price: 7_900_000,
        sqm: 84,
        bedrooms: 3,
        bathrooms: 2,
        amenities: &[Amenity::Gym],
        sold: false,
        listed_at: 1_760_100_000,
    },
    Seed {
        id: "katarina-1",
        address: "Tjustgatan 4",
        area_name: "Katarina",
        status: ListingStatus::ForSale,
        purpose: Purpose::Residential,
        rental_term: None,
        property_type: "studio",
        price: 2_395_000,
        sqm: 24,
        bedrooms: 1,
        bathrooms: 1,
        amenities: &[],
        sold: true,
        listed_at: 1_759_000_000,
    },
    Seed {
        id: "maria-1",
        address: "Torkel Knutssonsgatan 31",
        area_name: "Södermalm Maria",
        status: ListingStatus::ForSale,
        purpose: Purpose::Residential,
        rental_term: None,
        property_type: "penthouse",
        price: 12_950_000,
        sqm: 114,
        bedrooms: 4,
        bathrooms: 2,
        amenities: &[Amenity::Parking, Amenity::Pool],
        sold: false,
        listed_at: 1_760_200_000,
    },
    Seed {
        id: "sodermalm-3",
        address: "Folkungagatan 101",
        area_name: "Södermalm",
        status: ListingStatus::ForRent,
        purpose: Purpose::Residential,
        rental_term: Some(RentalTerm::LongTerm),
        property_type: "apartment",
        price: 16_500,
        sqm: 39,
        bedrooms: 1,
        bathrooms: 1,
        amenities: &[Amenity::Furnished, Amenity::PetsAllowed],
        sold: false,
        listed_at: 1_760_300_000,
    },
    Seed {
        id: "vasastan-1",
        address: "Odengatan 56",
        area_name: "Vasastan",
        status: ListingStatus::ForRent,
        purpose: Purpose::Residential,
        rental_term: Some(RentalTerm::ShortTerm),
        property_type: "serviced-apartment",
        price: 28_000,
        sqm: 52,
        bedrooms: 2,
        bathrooms: 1,
        amenities: &[Amenity::Furnished, Amenity::Gym],
        sold: false,
        listed_at: 1_760_400_000,
    },
    Seed {
        id: "norrmalm-1",
        address: "Kungsgatan 30",
        area_name: "Norrmalm",
        status: ListingStatus::ForRent,
        purpose: Purpose::Commercial,
        rental_term: None,
        property_type: "office",
        price: 95_000,
        sqm: 240,
        bedrooms: 0,
        bathrooms: 2,
        amenities: &[Amenity::Parking],
        sold: false,
        listed_at: 1_760_050_000,
    },
    Seed {
        id: "hammarby-1",
        address: "Lugnets allé 12",
        area_name: "Hammarby sjöstad",
        status: ListingStatus::NewProject,
        purpose: Purpose::Residential,
        rental_term: None,
        property_type: "townhouse",
        price: 9_450_000,
        sqm: 132,
        bedrooms: 4,
        bathrooms: 3,
        amenities: &[Amenity::Parking, Amenity::PetsAllowed],
        sold: false,
        listed_at: 1_760_500_000,
    },
];

fn sample_listings() -> Vec<Listing> {
    SEEDS
        .iter()
        .filter_map(|seed| {
            let property_type = PropertyType::from_tag(seed.property_type)?;
            Some(Listing {
                id: seed.id.to_string(),
                title: format!("{} in {}", property_type, seed.area_name),
                address: seed.address.to_string(),
                location: stockholm(seed.area_name, 59.3145, 18.0736),
                listing_status: seed.status,
                purpose: seed.purpose,
                rental_term: seed.rental_term,
                property_type: Some(property_type),
                price: seed.price,
                area: seed.sqm,
                bedrooms: seed.bedrooms,
                bathrooms: seed.bathrooms,
                amenities: seed.amenities.to_vec(),
                sold: seed.sold,
                images: vec![],
                url: format!("https://listings.example.com/{}", seed.id),
                listed_at: listed(seed.listed_at),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{parse, FilterChange};

    fn ids(fetcher: &MemoryFetcher, query: &str) -> Vec<String> {
        fetcher
            .search(&parse(query))
            .into_iter()
            .map(|l| l.id.clone())
            .collect()
    }

    #[test]
    fn sample_seeds_all_load() {
        assert_eq!(MemoryFetcher::sample(10).len(), SEEDS.len());
        assert!(MemoryFetcher::new(Vec::new(), 10).is_empty());
    }

    #[test]
    fn sold_listings_hidden_unless_requested() {
        let fetcher = MemoryFetcher::sample(20);
        assert!(!ids(&fetcher, "").contains(&"katarina-1".to_string()));
        assert!(ids(&fetcher, "showSold=true").contains(&"katarina-1".to_string()));
    }

    #[test]
    fn newest_first_by_default() {
        let fetcher = MemoryFetcher::sample(20);
        let found = ids(&fetcher, "listingStatus=for-sale");
        assert_eq!(found, ["maria-1", "sodermalm-2", "sodermalm-1"]);
    }

    #[test]
    fn price_range_and_sort() {
        let fetcher = MemoryFetcher::sample(20);
        let found = ids(
            &fetcher,
            "listingStatus=for-sale&priceMin=5000000&priceMax=13000000&sortBy=price-low",
        );
        assert_eq!(found, ["sodermalm-1", "sodermalm-2", "maria-1"]);
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let fetcher = MemoryFetcher::sample(20);
        assert!(ids(&fetcher, "priceMin=100000&priceMax=50000").is_empty());
    }

    #[test]
    fn rental_term_and_amenities() {
        let fetcher = MemoryFetcher::sample(20);
        assert_eq!(
            ids(&fetcher, "listingStatus=for-rent&purpose=residential&rentalTerm=short-term"),
            ["vasastan-1"]
        );
        assert_eq!(ids(&fetcher, "furnished=true&petsAllowed=true"), ["sodermalm-3"]);
    }

    #[test]
    fn bedrooms_means_at_least() {
        let fetcher = MemoryFetcher::sample(20);
        let found = ids(&fetcher, "bedrooms=4&sortBy=area");
        assert_eq!(found, ["hammarby-1", "maria-1"]);
    }

    #[test]
    fn stray_rental_term_is_ignored_like_its_query() {
        let fetcher = MemoryFetcher::sample(20);
        let filters = FilterSet {
            listing_status: Some(ListingStatus::ForRent),
            purpose: Some(Purpose::Commercial),
            rental_term: Some(RentalTerm::LongTerm),
            ..FilterSet::default()
        };
        let via_query = parse(&crate::filters::serialize(&filters));
        assert_eq!(via_query.rental_term, None);

        let direct: Vec<&str> = fetcher
            .search(&filters)
            .into_iter()
            .map(|l| l.id.as_str())
            .collect();
        let reparsed: Vec<&str> = fetcher
            .search(&via_query)
            .into_iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(direct, ["norrmalm-1"]);
        assert_eq!(direct, reparsed);
    }

    #[test]
    fn untyped_listing_only_matches_without_type_filter() {
        let mut listings = sample_listings();
        listings.truncate(1);
        listings[0].property_type = None;
        let fetcher = MemoryFetcher::new(listings, 20);

        assert_eq!(fetcher.search(&FilterSet::default()).len(), 1);
        assert!(fetcher.search(&parse("propertyType=apartment")).is_empty());
    }

    #[test]
    fn commercial_property_type() {
        let fetcher = MemoryFetcher::sample(20);
        assert_eq!(ids(&fetcher, "purpose=commercial&propertyType=office"), ["norrmalm-1"]);
    }

    #[tokio::test]
    async fn pages_through_results() {
        let fetcher = MemoryFetcher::sample(3);
        let filters = FilterSet::default().apply(FilterChange::SortBy(SortBy::PriceHigh));

        let first = fetcher.fetch_listings(&filters, 1).await.unwrap();
        assert_eq!(first.total, 7);
        assert_eq!(first.total_pages(), 3);
        assert_eq!(first.listings.len(), 3);
        assert_eq!(first.listings[0].id, "maria-1");

        let last = fetcher.fetch_listings(&filters, 3).await.unwrap();
        assert_eq!(last.listings.len(), 1);

        let beyond = fetcher.fetch_listings(&filters, 9).await.unwrap();
        assert!(beyond.listings.is_empty());
        assert_eq!(beyond.total, 7);
    }

    #[tokio::test]
    async fn page_zero_is_first_page() {
        let fetcher = MemoryFetcher::sample(2);
        let page = fetcher.fetch_listings(&FilterSet::default(), 0).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.listings.len(), 2);
    }
}
