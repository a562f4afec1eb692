//! Station marker visibility and icon styling.
//!
//! A station is visible while at least one of its routes is toggled on. Its
//! icon shows the routes that are both active and served by the station:
//! a solid disc for one route, a split disc lettered "A/B" for both.

use crate::stations::{RouteId, RouteSet, StationRegistry, Waypoint};

#[derive(Debug, Clone, PartialEq)]
pub struct IconStyle {
    pub route_a_color: String,
    pub route_b_color: String,
    pub min_size_px: f64,
    pub max_size_px: f64,
    pub min_font_px: f64,
    pub max_font_px: f64,
    pub min_label_font_px: f64,
}

impl Default for IconStyle {
    fn default() -> Self {
        Self {
            route_a_color: "#003a6c".to_string(),
            route_b_color: "#0265d3".to_string(),
            min_size_px: 18.0,
            max_size_px: 48.0,
            min_font_px: 10.0,
            max_font_px: 18.0,
            min_label_font_px: 10.0,
        }
    }
}

impl IconStyle {
    fn color(&self, route: RouteId) -> &str {
        match route {
            RouteId::A => &self.route_a_color,
            RouteId::B => &self.route_b_color,
        }
    }

    /// Disc diameter; grows two pixels per zoom level inside the clamp.
    pub fn size_px(&self, zoom: f64) -> f64 {
        (10.0 + (zoom - 10.0) * 2.0).clamp(self.min_size_px, self.max_size_px)
    }

    pub fn font_px(&self, size_px: f64) -> f64 {
        (size_px / 2.5).round().clamp(self.min_font_px, self.max_font_px)
    }

    pub fn label_font_px(&self, font_px: f64) -> f64 {
        (font_px * 0.85).round().max(self.min_label_font_px)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IconFill {
    Solid(String),
    /// Left half first color, right half second.
    Split(String, String),
}

impl IconFill {
    pub fn css_background(&self) -> String {
        match self {
            IconFill::Solid(c) => c.clone(),
            IconFill::Split(left, right) => {
                format!("linear-gradient(90deg, {left} 50%, {right} 50%)")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconLabel {
    pub text: String,
    pub font_px: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconSpec {
    pub letter: &'static str,
    pub class: &'static str,
    pub fill: IconFill,
    pub size_px: f64,
    pub font_px: f64,
    pub label: Option<IconLabel>,
    /// Marker box, with room below the disc for the label.
    pub box_px: [f64; 2],
    pub anchor_px: [f64; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedMarker {
    pub name: String,
    pub visible: bool,
    pub routes_shown: RouteSet,
    pub icon: IconSpec,
}

/// Routes that should color a station's icon: the active ones it serves, or
/// all of them when none of its routes is active.
pub fn routes_shown(station_routes: &RouteSet, active: &RouteSet) -> RouteSet {
    let shown: RouteSet = station_routes.intersection(active).copied().collect();
    if shown.is_empty() {
        station_routes.clone()
    } else {
        shown
    }
}

#[derive(Debug, Clone)]
pub struct VisibilityEngine {
    style: IconStyle,
    label_min_zoom: f64,
}

impl VisibilityEngine {
    pub fn new(style: IconStyle, label_min_zoom: f64) -> Self {
        Self {
            style,
            label_min_zoom,
        }
    }

    /// Labels crowd each other on the widest, most zoomed-out view.
    pub fn labels_visible(&self, zoom: f64, viewport_is_wide: bool) -> bool {
        !(viewport_is_wide && zoom <= self.label_min_zoom)
    }

    /// Full recompute of every station marker, in registry order.
    pub fn compute_display(
        &self,
        registry: &StationRegistry,
        active: &RouteSet,
        zoom: f64,
        viewport_is_wide: bool,
    ) -> Vec<DisplayedMarker> {
        let show_labels = self.labels_visible(zoom, viewport_is_wide);
        registry
            .iter()
            .map(|w| self.display_for(w, active, zoom, show_labels))
            .collect()
    }

    pub fn display_for(
        &self,
        waypoint: &Waypoint,
        active: &RouteSet,
        zoom: f64,
        show_label: bool,
    ) -> DisplayedMarker {
        let visible = !waypoint.routes.is_disjoint(active);
        let shown = routes_shown(&waypoint.routes, active);
        let icon = self.icon(&waypoint.name, &shown, zoom, show_label);
        DisplayedMarker {
            name: waypoint.name.clone(),
            visible,
            routes_shown: shown,
            icon,
        }
    }

    pub fn icon(&self, name: &str, routes: &RouteSet, zoom: f64, show_label: bool) -> IconSpec {
        let has_a = routes.contains(&RouteId::A);
        let has_b = routes.contains(&RouteId::B);
        let (letter, class, fill) = match (has_a, has_b) {
            (true, true) => (
                "A/B",
                "both",
                IconFill::Split(
                    self.style.color(RouteId::A).to_string(),
                    self.style.color(RouteId::B).to_string(),
                ),
            ),
            (false, true) => ("B", "line-b", IconFill::Solid(self.style.color(RouteId::B).to_string())),
            _ => ("A", "line-a", IconFill::Solid(self.style.color(RouteId::A).to_string())),
        };

        let size_px = self.style.size_px(zoom);
        let font_px = self.style.font_px(size_px);
        let label = show_label.then(|| IconLabel {
            text: name.to_string(),
            font_px: self.style.label_font_px(font_px),
        });

        IconSpec {
            letter,
            class,
            fill,
            size_px,
            font_px,
            label,
            box_px: [size_px, size_px + 24.0],
            anchor_px: [size_px / 2.0, size_px / 2.0 + 8.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stations::RawStop;

    fn engine() -> VisibilityEngine {
        VisibilityEngine::new(IconStyle::default(), 16.0)
    }

    fn registry() -> StationRegistry {
        StationRegistry::build(
            &[RawStop::new("Shared", 1.0, 1.0), RawStop::new("OnlyA", 2.0, 2.0)],
            &[RawStop::new("Shared", 1.0, 1.0), RawStop::new("OnlyB", 3.0, 3.0)],
        )
    }

    fn marker<'a>(markers: &'a [DisplayedMarker], name: &str) -> &'a DisplayedMarker {
        markers.iter().find(|m| m.name == name).unwrap()
    }

    #[test]
    fn shared_station_with_one_active_route_shows_that_route() {
        let active = RouteSet::from([RouteId::A]);
        let markers = engine().compute_display(&registry(), &active, 16.0, false);

        let shared = marker(&markers, "Shared");
        assert!(shared.visible);
        assert_eq!(shared.routes_shown, RouteSet::from([RouteId::A]));
        assert_eq!(shared.icon.letter, "A");
        assert_eq!(shared.icon.fill, IconFill::Solid("#003a6c".into()));

        assert!(!marker(&markers, "OnlyB").visible);
    }

    #[test]
    fn nothing_is_visible_without_active_routes() {
        let markers = engine().compute_display(&registry(), &RouteSet::new(), 17.0, false);
        assert!(markers.iter().all(|m| !m.visible));
    }

    #[test]
    fn hidden_stations_fall_back_to_full_membership() {
        let markers = engine().compute_display(&registry(), &RouteSet::new(), 17.0, false);
        let shared = marker(&markers, "Shared");
        assert_eq!(shared.routes_shown, RouteSet::from([RouteId::A, RouteId::B]));
        assert_eq!(shared.icon.letter, "A/B");
    }

    #[test]
    fn both_routes_give_a_split_icon() {
        let active = RouteSet::from([RouteId::A, RouteId::B]);
        let markers = engine().compute_display(&registry(), &active, 17.0, false);

        let shared = marker(&markers, "Shared");
        assert_eq!(shared.icon.class, "both");
        assert_eq!(
            shared.icon.fill.css_background(),
            "linear-gradient(90deg, #003a6c 50%, #0265d3 50%)"
        );

        let only_b = marker(&markers, "OnlyB");
        assert_eq!(only_b.icon.letter, "B");
        assert_eq!(only_b.icon.class, "line-b");
        assert_eq!(only_b.icon.fill.css_background(), "#0265d3");
    }

    #[test]
    fn output_follows_registry_order() {
        let active = RouteSet::from([RouteId::A, RouteId::B]);
        let markers = engine().compute_display(&registry(), &active, 17.0, false);
        let names: Vec<&str> = markers.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Shared", "OnlyA", "OnlyB"]);
    }

    #[test]
    fn icon_size_grows_with_zoom_inside_bounds() {
        let style = IconStyle::default();
        assert_eq!(style.size_px(10.0), 18.0);
        assert_eq!(style.size_px(16.0), 22.0);
        assert_eq!(style.size_px(19.0), 28.0);
        assert_eq!(style.size_px(40.0), 48.0);

        let mut prev = 0.0;
        for z in 0..30 {
            let s = style.size_px(z as f64);
            assert!(s >= prev);
            prev = s;
        }
    }

    #[test]
    fn icon_geometry_at_focus_zoom() {
        let icon = engine().icon("X", &RouteSet::from([RouteId::A]), 17.0, true);
        assert_eq!(icon.size_px, 24.0);
        assert_eq!(icon.font_px, 10.0);
        assert_eq!(icon.box_px, [24.0, 48.0]);
        assert_eq!(icon.anchor_px, [12.0, 20.0]);
        assert_eq!(icon.label.unwrap().font_px, 10.0);
    }

    #[test]
    fn labels_hidden_only_when_wide_and_zoomed_out() {
        let e = engine();
        assert!(!e.labels_visible(16.0, true));
        assert!(!e.labels_visible(15.5, true));
        assert!(e.labels_visible(16.5, true));
        assert!(e.labels_visible(16.0, false));

        let active = RouteSet::from([RouteId::A]);
        let markers = e.compute_display(&registry(), &active, 16.0, true);
        assert!(markers.iter().all(|m| m.icon.label.is_none()));
    }
}
