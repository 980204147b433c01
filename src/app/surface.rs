use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, Painter, Pos2, Rect, Sense, Shape, Stroke, Ui};

use crate::data::{GeoBounds, GeoPoint};

use super::camera::MapCamera;
use super::layers::{Layer, LayerSet, LineLayer, Pick, PointLayer};
use super::render_utils::{
    arc_control_point, circle_visible, distance_to_segment, draw_background, edge_visible,
};

/// A scroll pause this long ends a wheel-zoom gesture.
const SCROLL_GESTURE_IDLE: Duration = Duration::from_millis(150);
const ARC_SEGMENTS: usize = 16;
const ARC_LIFT: f32 = 0.18;
const LINE_PICK_TOLERANCE_PX: f32 = 3.0;

/// The slice of a map widget the views talk to: they hand it layers and read
/// back the camera.
pub(super) trait MapSurface {
    fn set_layers(&mut self, layers: LayerSet);
    fn zoom(&self) -> f64;
    fn set_zoom(&mut self, zoom: f64);
    fn bounds(&self) -> GeoBounds;
}

pub(super) struct SurfaceResponse {
    pub(super) response: egui::Response,
    pub(super) hovered: Option<Pick>,
    /// `Some(None)` is a click on empty map.
    pub(super) clicked: Option<Option<Pick>>,
    pub(super) camera_changed: bool,
    pub(super) gesture_ended: bool,
}

pub(super) struct EguiMapSurface {
    camera: MapCamera,
    layers: LayerSet,
    background: Color32,
    interactive: bool,
    last_scroll: Option<Instant>,
}

impl EguiMapSurface {
    pub(super) fn new(center: GeoPoint, zoom: f64, background: Color32) -> Self {
        Self {
            camera: MapCamera::new(center, zoom),
            layers: LayerSet::default(),
            background,
            interactive: true,
            last_scroll: None,
        }
    }

    /// A surface that only draws; pointer input is ignored.
    pub(super) fn passive(center: GeoPoint, zoom: f64, background: Color32) -> Self {
        Self {
            interactive: false,
            ..Self::new(center, zoom, background)
        }
    }

    pub(super) fn show(&mut self, ui: &mut Ui) -> SurfaceResponse {
        let sense = if self.interactive {
            Sense::click_and_drag()
        } else {
            Sense::hover()
        };
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), sense);
        self.camera.set_viewport(rect.size());

        let mut camera_changed = false;
        let mut gesture_ended = false;
        if self.interactive {
            camera_changed |= self.handle_zoom(ui, rect, &response);
            camera_changed |= self.handle_pan(&response);
            gesture_ended = response.drag_stopped() || self.scroll_gesture_ended(ui);
        }

        let painter = ui.painter_at(rect);
        let origin = self.camera.geo_to_screen(rect, GeoPoint::new(0.0, 0.0));
        draw_background(&painter, rect, origin, self.camera.zoom, self.background);
        for layer in &self.layers.layers {
            match layer {
                Layer::Lines(lines) => self.paint_lines(&painter, rect, lines),
                Layer::Points(points) => self.paint_points(&painter, rect, points),
            }
        }

        let hovered = if self.interactive {
            ui.input(|input| input.pointer.hover_pos())
                .filter(|pointer| rect.contains(*pointer))
                .and_then(|pointer| self.hit_test(rect, pointer))
        } else {
            None
        };
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let clicked = response
            .clicked_by(egui::PointerButton::Primary)
            .then_some(hovered);

        SurfaceResponse {
            response,
            hovered,
            clicked,
            camera_changed,
            gesture_ended,
        }
    }

    fn handle_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) -> bool {
        if !response.hovered() {
            return false;
        }

        let (scroll, pinch) = ui.input(|input| (input.raw_scroll_delta.y, input.zoom_delta()));
        let mut zoom_factor = 1.0f32;
        if scroll.abs() > f32::EPSILON {
            zoom_factor *= (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        }
        if (pinch - 1.0).abs() > f32::EPSILON {
            zoom_factor *= pinch;
        }
        if (zoom_factor - 1.0).abs() <= f32::EPSILON {
            return false;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        self.camera
            .zoom_around(rect, pointer, f64::from(zoom_factor).log2());
        self.last_scroll = Some(Instant::now());
        ui.ctx().request_repaint_after(SCROLL_GESTURE_IDLE);
        true
    }

    fn handle_pan(&mut self, response: &egui::Response) -> bool {
        if !response.dragged() {
            return false;
        }

        let delta = response.drag_delta();
        if delta == egui::Vec2::ZERO {
            return false;
        }
        self.camera.pan_by(delta);
        true
    }

    fn scroll_gesture_ended(&mut self, ui: &Ui) -> bool {
        let Some(last) = self.last_scroll else {
            return false;
        };

        let elapsed = last.elapsed();
        if elapsed >= SCROLL_GESTURE_IDLE {
            self.last_scroll = None;
            return true;
        }

        ui.ctx()
            .request_repaint_after(SCROLL_GESTURE_IDLE.saturating_sub(elapsed));
        false
    }

    fn line_path(&self, rect: Rect, source: GeoPoint, target: GeoPoint, arc: bool) -> Vec<Pos2> {
        let start = self.camera.geo_to_screen(rect, source);
        let end = self.camera.geo_to_screen(rect, target);
        if !arc {
            return vec![start, end];
        }

        let control = arc_control_point(start, end, ARC_LIFT);
        (0..=ARC_SEGMENTS)
            .map(|step| {
                let t = step as f32 / ARC_SEGMENTS as f32;
                let u = 1.0 - t;
                let x = u * u * start.x + 2.0 * u * t * control.x + t * t * end.x;
                let y = u * u * start.y + 2.0 * u * t * control.y + t * t * end.y;
                Pos2::new(x, y)
            })
            .collect()
    }

    fn paint_lines(&self, painter: &Painter, rect: Rect, layer: &LineLayer) {
        for line in &layer.lines {
            let path = self.line_path(rect, line.source, line.target, layer.arc);
            let visible = path
                .windows(2)
                .any(|pair| edge_visible(rect, pair[0], pair[1], layer.width_px));
            if !visible {
                continue;
            }

            let stroke = Stroke::new(layer.width_px, line.color);
            if path.len() == 2 {
                painter.line_segment([path[0], path[1]], stroke);
            } else {
                painter.add(Shape::line(path, stroke));
            }
        }
    }

    fn point_radius_px(&self, layer: &PointLayer, position: GeoPoint, radius_m: f64) -> f32 {
        self.camera
            .meters_to_pixels(radius_m, position.lat)
            .clamp(layer.clamp.min, layer.clamp.max)
    }

    fn paint_points(&self, painter: &Painter, rect: Rect, layer: &PointLayer) {
        for point in &layer.points {
            let center = self.camera.geo_to_screen(rect, point.position);
            let radius = self.point_radius_px(layer, point.position, point.radius_m);
            if !circle_visible(rect, center, radius) {
                continue;
            }

            painter.circle(center, radius, point.fill, point.outline);
        }
    }

    /// Topmost pickable primitive under `pointer`; within a layer the closest
    /// one wins.
    fn hit_test(&self, rect: Rect, pointer: Pos2) -> Option<Pick> {
        self.layers.layers.iter().rev().find_map(|layer| match layer {
            Layer::Points(points) => points
                .points
                .iter()
                .filter_map(|point| {
                    let pick = point.pick?;
                    let center = self.camera.geo_to_screen(rect, point.position);
                    let radius = self.point_radius_px(points, point.position, point.radius_m);
                    let distance = center.distance(pointer);
                    (distance <= radius + 1.0).then_some((pick, distance))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(pick, _)| pick),
            Layer::Lines(lines) => {
                let tolerance = (lines.width_px * 0.5).max(LINE_PICK_TOLERANCE_PX);
                lines
                    .lines
                    .iter()
                    .filter_map(|line| {
                        let pick = line.pick?;
                        let path = self.line_path(rect, line.source, line.target, lines.arc);
                        let distance = path
                            .windows(2)
                            .map(|pair| distance_to_segment(pointer, pair[0], pair[1]))
                            .fold(f32::INFINITY, f32::min);
                        (distance <= tolerance).then_some((pick, distance))
                    })
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(pick, _)| pick)
            }
        })
    }
}

impl MapSurface for EguiMapSurface {
    fn set_layers(&mut self, layers: LayerSet) {
        tracing::debug!(
            layers = layers.layers.len(),
            primitives = layers.primitive_count(),
            "replaced map layers"
        );
        self.layers = layers;
    }

    fn zoom(&self) -> f64 {
        self.camera.zoom
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.camera.set_zoom(zoom);
    }

    fn bounds(&self) -> GeoBounds {
        self.camera.bounds()
    }
}

/// In-memory surface for driving the views without a window.
#[cfg(test)]
pub(super) struct RecordingSurface {
    pub(super) layers: LayerSet,
    pub(super) zoom: f64,
    pub(super) bounds: GeoBounds,
    pub(super) uploads: usize,
}

#[cfg(test)]
impl RecordingSurface {
    pub(super) fn new(zoom: f64) -> Self {
        Self {
            layers: LayerSet::default(),
            zoom,
            bounds: GeoBounds {
                min: GeoPoint::new(-180.0, -85.0),
                max: GeoPoint::new(180.0, 85.0),
            },
            uploads: 0,
        }
    }
}

#[cfg(test)]
impl MapSurface for RecordingSurface {
    fn set_layers(&mut self, layers: LayerSet) {
        self.layers = layers;
        self.uploads += 1;
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    fn bounds(&self) -> GeoBounds {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::super::layers::{LinePrimitive, PointPrimitive};
    use super::super::scale::NETWORK_POI_PIXELS;
    use super::*;

    fn canvas() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0))
    }

    fn surface_with(layers: Vec<Layer>) -> EguiMapSurface {
        let mut surface = EguiMapSurface::new(GeoPoint::new(-71.06, 42.36), 12.0, Color32::BLACK);
        surface.camera.set_viewport(canvas().size());
        surface.set_layers(LayerSet { layers });
        surface
    }

    fn line_layer() -> Layer {
        Layer::Lines(LineLayer {
            id: "links",
            width_px: 2.0,
            arc: false,
            lines: vec![LinePrimitive {
                source: GeoPoint::new(-71.10, 42.36),
                target: GeoPoint::new(-71.02, 42.36),
                color: Color32::WHITE,
                pick: Some(Pick::Link(0)),
            }],
        })
    }

    fn point_layer() -> Layer {
        Layer::Points(PointLayer {
            id: "pois",
            clamp: NETWORK_POI_PIXELS,
            points: vec![PointPrimitive {
                position: GeoPoint::new(-71.06, 42.36),
                radius_m: 200.0,
                fill: Color32::WHITE,
                outline: Stroke::NONE,
                pick: Some(Pick::Poi(3)),
            }],
        })
    }

    #[test]
    fn points_above_lines_win_the_pick() {
        let surface = surface_with(vec![line_layer(), point_layer()]);
        assert_eq!(
            surface.hit_test(canvas(), canvas().center()),
            Some(Pick::Poi(3))
        );
    }

    #[test]
    fn lines_are_picked_along_their_length() {
        let surface = surface_with(vec![line_layer(), point_layer()]);
        let along = canvas().center() + vec2(60.0, 1.0);
        assert_eq!(surface.hit_test(canvas(), along), Some(Pick::Link(0)));
        assert_eq!(surface.hit_test(canvas(), pos2(5.0, 5.0)), None);
    }

    #[test]
    fn arcs_bow_away_from_the_chord() {
        let surface = surface_with(Vec::new());
        let path = surface.line_path(
            canvas(),
            GeoPoint::new(-71.10, 42.36),
            GeoPoint::new(-71.02, 42.36),
            true,
        );
        assert_eq!(path.len(), ARC_SEGMENTS + 1);
        let middle = path[ARC_SEGMENTS / 2];
        assert!((middle.y - canvas().center().y).abs() > 1.0);
    }
}
