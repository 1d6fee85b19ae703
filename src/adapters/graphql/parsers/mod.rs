pub mod items;
pub mod validate;
