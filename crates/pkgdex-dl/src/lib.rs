pub mod error;
pub mod fetch;
pub mod http_client;
