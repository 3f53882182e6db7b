pub mod http_backend;
pub mod wire;

pub use http_backend::HttpBackendAdapter;
