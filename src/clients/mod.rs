pub mod upstream;

pub use upstream::{Service, UpstreamClient, UpstreamError, UpstreamRequest, build_http_client};
