pub mod export_service;
pub mod performance;
pub mod query_service;
