pub mod loader;
pub mod types;

pub use loader::{load_stations, StationError};
pub use types::{RawStop, RouteId, RouteSet, StationRegistry, Waypoint};
