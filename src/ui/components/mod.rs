pub mod detail;
pub mod filters;
pub mod notices;
pub mod pagination;
pub mod status;
pub mod table;
