pub mod export;
pub mod graphql;
pub mod headers;
pub mod store;
