//! Live position service and route-aware station map for a campus shuttle.
//!
//! The `api` side holds the single most recent position report. The client
//! side polls it, filters out missing and implausible fixes, and keeps a map
//! of the vehicle and the stations of the two routes in sync with the routes
//! the user has toggled on.

pub mod api;
pub mod display;
pub mod location;
pub mod realtime;
pub mod stations;
pub mod telemetry;
