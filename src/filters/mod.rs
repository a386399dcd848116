pub mod catalog;
pub mod query;
pub mod sync;
pub mod types;

pub use catalog::{PropertyType, PROPERTY_TYPES};
pub use query::{parse, serialize};
pub use sync::{
    FilterSync, GuardPolicy, MemoryRouter, NavigationOrigin, Router, SyncEvent, SyncState,
};
pub use types::{
    Amenity, FilterChange, FilterSet, ListingStatus, Purpose, RentalTerm, SortBy, ViewMode,
};
