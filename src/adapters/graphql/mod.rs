pub mod client;
pub mod parsers;
pub mod query;
pub mod rate_limiter;
pub mod schema;
