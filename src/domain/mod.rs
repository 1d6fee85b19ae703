pub mod accommodation;
pub mod cleaning;
pub mod criteria;
pub mod table;
