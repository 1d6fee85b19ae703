pub mod header_provider;
pub mod result_store;
pub mod search_api;
