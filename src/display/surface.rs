use std::collections::HashMap;

use tracing::{debug, info};

use crate::display::session::MapSurface;
use crate::display::visibility::{DisplayedMarker, IconSpec};
use crate::location::LatLng;
use crate::stations::Waypoint;

/// Headless map surface that reports marker changes through `tracing`.
///
/// Keeps the station layer the way a map library would, so re-showing an
/// unchanged icon is silent and only real changes are logged.
#[derive(Debug, Default)]
pub struct TracingSurface {
    stations: HashMap<String, IconSpec>,
    vehicle: Option<LatLng>,
}

impl MapSurface for TracingSurface {
    fn move_vehicle(&mut self, position: LatLng) {
        if self.vehicle == Some(position) {
            return;
        }
        self.vehicle = Some(position);
        info!(lat = position.lat, lng = position.lng, "Vehicle marker moved");
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) {
        info!(lat = center.lat, lng = center.lng, zoom, "Map view");
    }

    fn show_station(&mut self, waypoint: &Waypoint, marker: &DisplayedMarker) {
        if self.stations.get(&waypoint.name) == Some(&marker.icon) {
            return;
        }
        info!(
            station = %waypoint.name,
            lat = waypoint.lat,
            lng = waypoint.lng,
            letter = marker.icon.letter,
            background = %marker.icon.fill.css_background(),
            size_px = marker.icon.size_px,
            label = marker.icon.label.is_some(),
            "Station marker"
        );
        self.stations.insert(waypoint.name.clone(), marker.icon.clone());
    }

    fn hide_station(&mut self, name: &str) {
        if self.stations.remove(name).is_some() {
            debug!(station = %name, "Station marker removed");
        }
    }
}
