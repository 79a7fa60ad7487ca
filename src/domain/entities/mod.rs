pub mod filter;
pub mod records;
pub mod selection;
