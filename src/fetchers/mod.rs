pub mod api;
pub mod memory;
pub mod traits;

pub use api::ApiFetcher;
pub use memory::MemoryFetcher;
pub use traits::ListingsFetcher;
