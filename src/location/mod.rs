pub mod reconciler;
pub mod store;
pub mod types;
pub mod validator;

pub use reconciler::{PositionReconciler, Reconciliation};
pub use store::LocationStore;
pub use types::{Coordinate, LatLng, LocationReport, StoredLocation};
