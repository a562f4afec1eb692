use serde_json::Value;
use tracing::{debug, info, warn};

use crate::location::types::{coerce_number, Coordinate, LocationReport};
use crate::location::validator;

/// What a single observation did to the last-known-good position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reconciliation {
    /// A valid fix arrived and replaced the last-known-good position.
    Updated(Coordinate),
    /// The report carried no usable fix; nothing changed.
    NoFix(Coordinate),
    /// The report was implausible and was ignored.
    Rejected(Coordinate),
}

impl Reconciliation {
    /// The position the marker should be shown at after this observation.
    pub fn position(&self) -> Coordinate {
        match *self {
            Reconciliation::Updated(c) | Reconciliation::NoFix(c) | Reconciliation::Rejected(c) => c,
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Reconciliation::Updated(_))
    }
}

/// Turns a stream of raw reports into a position that only ever moves to
/// validated fixes.
#[derive(Debug, Clone)]
pub struct PositionReconciler {
    last_known_good: Coordinate,
}

impl PositionReconciler {
    pub fn new(initial: Coordinate) -> Self {
        Self {
            last_known_good: initial,
        }
    }

    pub fn last_known_good(&self) -> Coordinate {
        self.last_known_good
    }

    pub fn observe_report(&mut self, report: &LocationReport) -> Reconciliation {
        self.observe(report.lat.as_ref(), report.lng.as_ref())
    }

    pub fn observe(&mut self, raw_lat: Option<&Value>, raw_lng: Option<&Value>) -> Reconciliation {
        let (Some(lat), Some(lng)) = (raw_lat.and_then(coerce_number), raw_lng.and_then(coerce_number))
        else {
            debug!("Report carried no fix, holding last known position");
            return Reconciliation::NoFix(self.last_known_good);
        };

        if !validator::is_valid(lat, lng) {
            warn!(
                lat,
                lng,
                held_lat = self.last_known_good.latitude,
                held_lng = self.last_known_good.longitude,
                "Received invalid coordinates, keeping last valid position"
            );
            return Reconciliation::Rejected(self.last_known_good);
        }

        self.last_known_good = Coordinate::now(lat, lng);
        info!(lat, lng, "Updated position");
        Reconciliation::Updated(self.last_known_good)
    }
}
