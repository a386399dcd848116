pub mod config;
pub mod fetchers;
pub mod filters;
pub mod models;
pub mod pagination;
pub mod search;
