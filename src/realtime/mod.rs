pub mod client;
pub mod fetcher;

pub use client::{post_location, FetchError, HttpLocationSource, LocationSource};
pub use fetcher::{run_poller, DEFAULT_POLL_INTERVAL};
