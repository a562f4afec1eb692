use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::location::LatLng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RouteId {
    A,
    B,
}

impl RouteId {
    pub const ALL: [RouteId; 2] = [RouteId::A, RouteId::B];

    pub fn letter(self) -> &'static str {
        match self {
            RouteId::A => "A",
            RouteId::B => "B",
        }
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

impl FromStr for RouteId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "a" | "A" => Ok(RouteId::A),
            "b" | "B" => Ok(RouteId::B),
            other => Err(format!("unknown route '{other}'")),
        }
    }
}

pub type RouteSet = BTreeSet<RouteId>;

/// One stop as listed for a single route.
#[derive(Debug, Clone, PartialEq)]
pub struct RawStop {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl RawStop {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
        }
    }
}

/// A named station, served by one or both routes.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub routes: RouteSet,
}

impl Waypoint {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn serves(&self, route: RouteId) -> bool {
        self.routes.contains(&route)
    }
}

/// The merged station set for a session. Built once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    waypoints: Vec<Waypoint>,
    by_name: HashMap<String, usize>,
}

impl StationRegistry {
    /// Merge the two route lists into one set of waypoints keyed by name.
    ///
    /// Route A is walked first, then route B. A name seen again only gains the
    /// extra route; the first occurrence's coordinates are kept. Iteration
    /// order is the order of first appearance.
    pub fn build(route_a: &[RawStop], route_b: &[RawStop]) -> Self {
        let mut registry = Self::default();
        registry.add_route(RouteId::A, route_a);
        registry.add_route(RouteId::B, route_b);
        registry
    }

    fn add_route(&mut self, route: RouteId, stops: &[RawStop]) {
        for stop in stops {
            match self.by_name.get(&stop.name) {
                Some(&idx) => {
                    self.waypoints[idx].routes.insert(route);
                }
                None => {
                    self.by_name.insert(stop.name.clone(), self.waypoints.len());
                    self.waypoints.push(Waypoint {
                        name: stop.name.clone(),
                        lat: stop.lat,
                        lng: stop.lng,
                        routes: RouteSet::from([route]),
                    });
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Waypoint> {
        self.by_name.get(name).map(|&i| &self.waypoints[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn on_route(&self, route: RouteId) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter().filter(move |w| w.serves(route))
    }
}
