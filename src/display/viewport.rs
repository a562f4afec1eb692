//! Map view policy: the bounding box around the stations, aspect-dependent
//! minimum zoom, and the focus zoom used by the stop selector.

use crate::location::LatLng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn contains(&self, p: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&p.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&p.lng)
    }

    pub fn clamp(&self, p: LatLng) -> LatLng {
        LatLng::new(
            p.lat.clamp(self.south_west.lat, self.north_east.lat),
            p.lng.clamp(self.south_west.lng, self.north_east.lng),
        )
    }
}

/// Pixel size of the visible map frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Landscape or square.
    pub fn is_wide(&self) -> bool {
        self.width >= self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub initial_center: LatLng,
    pub initial_zoom: f64,
    pub bounds: Bounds,
    /// Minimum zoom for tall viewports; also the threshold at or below which
    /// wide viewports hide station labels.
    pub min_zoom: f64,
    /// How much further out a wide viewport may zoom.
    pub wide_zoom_allowance: f64,
    pub max_zoom: f64,
    pub focus_zoom: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            initial_center: LatLng::new(14.6394, 121.0789),
            initial_zoom: 16.0,
            bounds: Bounds {
                south_west: LatLng::new(14.633675319061712, 121.07404641949906),
                north_east: LatLng::new(14.647212556900775, 121.081723735956),
            },
            min_zoom: 16.0,
            wide_zoom_allowance: 0.5,
            max_zoom: 19.0,
            focus_zoom: 17.0,
        }
    }
}

/// Keeps every requested view inside the configured box and zoom range.
#[derive(Debug, Clone)]
pub struct ViewportConstraints {
    settings: MapSettings,
}

impl ViewportConstraints {
    pub fn new(settings: MapSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    pub fn min_zoom(&self, viewport: Viewport) -> f64 {
        if viewport.is_wide() {
            self.settings.min_zoom - self.settings.wide_zoom_allowance
        } else {
            self.settings.min_zoom
        }
    }

    pub fn clamp_zoom(&self, zoom: f64, viewport: Viewport) -> f64 {
        zoom.clamp(self.min_zoom(viewport), self.settings.max_zoom)
    }

    pub fn clamp_center(&self, center: LatLng) -> LatLng {
        self.settings.bounds.clamp(center)
    }

    /// View for the stop selector: center on `target`, zooming in to at least
    /// the focus zoom but never out.
    pub fn focus(&self, target: LatLng, current_zoom: f64, viewport: Viewport) -> (LatLng, f64) {
        let zoom = self.clamp_zoom(current_zoom.max(self.settings.focus_zoom), viewport);
        (self.clamp_center(target), zoom)
    }
}
