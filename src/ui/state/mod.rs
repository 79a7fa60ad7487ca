pub mod app_state;
pub mod debounce;
pub mod list_controller;
pub mod notices;
pub mod query_state;
