use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::display::viewport::{MapSettings, Viewport, ViewportConstraints};
use crate::display::visibility::{DisplayedMarker, IconStyle, VisibilityEngine};
use crate::location::{Coordinate, LatLng, LocationReport, PositionReconciler};
use crate::realtime::FetchError;
use crate::stations::{RouteId, RouteSet, StationRegistry, Waypoint};

/// The map library as the session sees it: one vehicle marker, one marker
/// per station addressed by name, and a view.
pub trait MapSurface {
    fn move_vehicle(&mut self, position: LatLng);
    fn set_view(&mut self, center: LatLng, zoom: f64);
    fn show_station(&mut self, waypoint: &Waypoint, marker: &DisplayedMarker);
    fn hide_station(&mut self, name: &str);
}

/// Everything that can change what the map shows. Poll results and UI input
/// share one queue, so they are applied strictly one at a time.
#[derive(Debug)]
pub enum SessionEvent {
    Poll(Result<LocationReport, FetchError>),
    ToggleRoute(RouteId),
    Zoom(f64),
    Resize(Viewport),
    Pan(LatLng),
    Focus(String),
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub settings: MapSettings,
    pub style: IconStyle,
    /// Where the vehicle marker sits until the first valid fix.
    pub initial_position: LatLng,
    pub viewport: Viewport,
    pub active_routes: RouteSet,
}

impl Default for SessionOptions {
    fn default() -> Self {
        let settings = MapSettings::default();
        Self {
            initial_position: settings.initial_center,
            settings,
            style: IconStyle::default(),
            viewport: Viewport::new(1280, 800),
            active_routes: RouteSet::from(RouteId::ALL),
        }
    }
}

/// Client-side state for one map: the last-known-good vehicle position,
/// the toggled routes and the current view.
pub struct MapSession<S> {
    registry: StationRegistry,
    reconciler: PositionReconciler,
    engine: VisibilityEngine,
    constraints: ViewportConstraints,
    active: RouteSet,
    viewport: Viewport,
    center: LatLng,
    zoom: f64,
    surface: S,
}

impl<S: MapSurface> MapSession<S> {
    /// Build the session and draw the initial view, vehicle and stations.
    pub fn new(registry: StationRegistry, options: SessionOptions, surface: S) -> Self {
        let SessionOptions {
            settings,
            style,
            initial_position,
            viewport,
            active_routes,
        } = options;

        let engine = VisibilityEngine::new(style, settings.min_zoom);
        let constraints = ViewportConstraints::new(settings);
        let center = constraints.clamp_center(constraints.settings().initial_center);
        let zoom = constraints.clamp_zoom(constraints.settings().initial_zoom, viewport);
        let initial = Coordinate::now(initial_position.lat, initial_position.lng);

        let mut session = Self {
            registry,
            reconciler: PositionReconciler::new(initial),
            engine,
            constraints,
            active: active_routes,
            viewport,
            center,
            zoom,
            surface,
        };
        session.surface.set_view(center, zoom);
        session.surface.move_vehicle(initial_position);
        session.refresh_stations();
        session
    }

    /// Apply events until every sender is gone, then hand the session back.
    pub async fn run(mut self, mut events: mpsc::Receiver<SessionEvent>) -> Self {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        debug!("Event queue closed, session stopping");
        self
    }

    pub fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Poll(Ok(report)) => {
                let outcome = self.reconciler.observe_report(&report);
                if outcome.is_update() {
                    self.surface.move_vehicle(outcome.position().position());
                }
            }
            SessionEvent::Poll(Err(e)) => {
                error!(error = %e, "Error fetching location");
            }
            SessionEvent::ToggleRoute(route) => {
                let now_active = if self.active.remove(&route) {
                    false
                } else {
                    self.active.insert(route)
                };
                info!(route = %route, active = now_active, "Route toggled");
                self.refresh_stations();
            }
            SessionEvent::Zoom(zoom) => {
                self.zoom = self.constraints.clamp_zoom(zoom, self.viewport);
                self.surface.set_view(self.center, self.zoom);
                self.refresh_stations();
            }
            SessionEvent::Resize(viewport) => {
                self.viewport = viewport;
                self.zoom = self.constraints.clamp_zoom(self.zoom, viewport);
                self.surface.set_view(self.center, self.zoom);
                self.refresh_stations();
            }
            SessionEvent::Pan(target) => {
                self.center = self.constraints.clamp_center(target);
                if self.center != target {
                    debug!(lat = target.lat, lng = target.lng, "Pan held at map bounds");
                }
                self.surface.set_view(self.center, self.zoom);
            }
            SessionEvent::Focus(name) => {
                let Some(station) = self.registry.get(&name) else {
                    warn!(station = %name, "No such station");
                    return;
                };
                let (center, zoom) =
                    self.constraints
                        .focus(station.position(), self.zoom, self.viewport);
                self.center = center;
                self.zoom = zoom;
                self.surface.set_view(center, zoom);
                self.refresh_stations();
            }
        }
    }

    /// Recompute every station marker and push the result to the surface.
    fn refresh_stations(&mut self) {
        let markers = self.markers();
        for (waypoint, marker) in self.registry.iter().zip(&markers) {
            if marker.visible {
                self.surface.show_station(waypoint, marker);
            } else {
                self.surface.hide_station(&marker.name);
            }
        }
    }

    pub fn markers(&self) -> Vec<DisplayedMarker> {
        self.engine.compute_display(
            &self.registry,
            &self.active,
            self.zoom,
            self.viewport.is_wide(),
        )
    }

    pub fn last_known_good(&self) -> Coordinate {
        self.reconciler.last_known_good()
    }

    pub fn active_routes(&self) -> &RouteSet {
        &self.active
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}
