use std::f64::consts::PI;

use eframe::egui::{Pos2, Rect, Vec2};

use crate::data::{GeoBounds, GeoPoint};

/// Boston city center, the default map center.
pub(super) const BOSTON_CENTER: GeoPoint = GeoPoint::new(-71.06, 42.36);

pub(super) const MIN_ZOOM: f64 = 3.0;
pub(super) const MAX_ZOOM: f64 = 18.0;

/// Web-Mercator world size at zoom 0, matching vector-tile map engines.
const TILE_SIZE: f64 = 512.0;
const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;
const MAX_LATITUDE: f64 = 85.051_128_78;

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

fn project(point: GeoPoint, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.lon + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

fn unproject(x: f64, y: f64, zoom: f64) -> GeoPoint {
    let size = world_size(zoom);
    let lon = x / size * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y / size)).sinh().atan().to_degrees();
    GeoPoint::new(lon, lat.clamp(-MAX_LATITUDE, MAX_LATITUDE))
}

/// Center + zoom of a Web-Mercator view, plus the size of the last canvas it
/// was drawn into.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct MapCamera {
    pub(super) center: GeoPoint,
    pub(super) zoom: f64,
    viewport: Vec2,
}

impl MapCamera {
    pub(super) fn new(center: GeoPoint, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            viewport: Vec2::new(1280.0, 800.0),
        }
    }

    pub(super) fn set_viewport(&mut self, size: Vec2) {
        if size.x > 0.0 && size.y > 0.0 {
            self.viewport = size;
        }
    }

    pub(super) fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub(super) fn geo_to_screen(&self, rect: Rect, point: GeoPoint) -> Pos2 {
        let (cx, cy) = project(self.center, self.zoom);
        let (x, y) = project(point, self.zoom);
        rect.center() + Vec2::new((x - cx) as f32, (y - cy) as f32)
    }

    pub(super) fn screen_to_geo(&self, rect: Rect, screen: Pos2) -> GeoPoint {
        let (cx, cy) = project(self.center, self.zoom);
        let offset = screen - rect.center();
        unproject(cx + f64::from(offset.x), cy + f64::from(offset.y), self.zoom)
    }

    pub(super) fn bounds(&self) -> GeoBounds {
        let rect = Rect::from_center_size(Pos2::ZERO, self.viewport);
        let top_left = self.screen_to_geo(rect, rect.left_top());
        let bottom_right = self.screen_to_geo(rect, rect.right_bottom());
        GeoBounds {
            min: GeoPoint::new(top_left.lon, bottom_right.lat),
            max: GeoPoint::new(bottom_right.lon, top_left.lat),
        }
    }

    pub(super) fn pan_by(&mut self, screen_delta: Vec2) {
        let (cx, cy) = project(self.center, self.zoom);
        self.center = unproject(
            cx - f64::from(screen_delta.x),
            cy - f64::from(screen_delta.y),
            self.zoom,
        );
    }

    /// Changes zoom while keeping the place under `anchor` in place.
    pub(super) fn zoom_around(&mut self, rect: Rect, anchor: Pos2, zoom_delta: f64) {
        let anchored = self.screen_to_geo(rect, anchor);
        self.set_zoom(self.zoom + zoom_delta);

        let (ax, ay) = project(anchored, self.zoom);
        let offset = anchor - rect.center();
        self.center = unproject(
            ax - f64::from(offset.x),
            ay - f64::from(offset.y),
            self.zoom,
        );
    }

    pub(super) fn meters_to_pixels(&self, meters: f64, latitude: f64) -> f32 {
        let meters_per_pixel =
            EARTH_CIRCUMFERENCE_M * latitude.to_radians().cos() / world_size(self.zoom);
        (meters / meters_per_pixel) as f32
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    fn anchor_in(rect: Rect, fraction_x: f32, fraction_y: f32) -> Pos2 {
        pos2(
            rect.left() + rect.width() * fraction_x,
            rect.top() + rect.height() * fraction_y,
        )
    }

    fn canvas() -> Rect {
        Rect::from_min_size(pos2(100.0, 50.0), vec2(800.0, 600.0))
    }

    #[test]
    fn center_projects_to_rect_center() {
        let camera = MapCamera::new(BOSTON_CENTER, 11.0);
        let screen = camera.geo_to_screen(canvas(), BOSTON_CENTER);
        assert!((screen - canvas().center()).length() < 0.01);
    }

    #[test]
    fn zoom_around_keeps_anchor_fixed() {
        let rect = canvas();
        let anchor = anchor_in(rect, 0.8, 0.3);
        let mut camera = MapCamera::new(BOSTON_CENTER, 10.0);
        let before = camera.screen_to_geo(rect, anchor);

        camera.zoom_around(rect, anchor, 1.5);

        let after = camera.geo_to_screen(rect, before);
        assert!((after - anchor).length() < 0.05);
        assert_eq!(camera.zoom, 11.5);
    }

    #[test]
    fn bounds_surround_the_center() {
        let mut camera = MapCamera::new(BOSTON_CENTER, 12.0);
        camera.set_viewport(vec2(1000.0, 700.0));
        let bounds = camera.bounds();

        assert!(bounds.contains(BOSTON_CENTER));
        assert!(bounds.min.lon < bounds.max.lon);
        assert!(bounds.min.lat < bounds.max.lat);
    }

    #[test]
    fn pixels_per_meter_double_per_zoom_level() {
        let low = MapCamera::new(BOSTON_CENTER, 11.0).meters_to_pixels(100.0, 42.36);
        let high = MapCamera::new(BOSTON_CENTER, 12.0).meters_to_pixels(100.0, 42.36);
        assert!((high / low - 2.0).abs() < 1e-4);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = MapCamera::new(BOSTON_CENTER, 40.0);
        assert_eq!(camera.zoom, MAX_ZOOM);
        camera.set_zoom(-2.0);
        assert_eq!(camera.zoom, MIN_ZOOM);
    }
}
