pub mod api_client;
pub mod debounce;
pub mod version;
