use eframe::egui::{self, Color32, Id, Pos2, Rect, Sense, Stroke, Ui, vec2};

use super::super::filter::BinRange;
use super::super::render_utils::ACCENT;

/// Thumbs never get closer than this share of the slider extent.
const MIN_THUMB_GAP_FRACTION: f64 = 0.02;
/// Exponent of the impact slider's position mapping. Positions near zero
/// cover the severe end of the impact range.
const IMPACT_SLIDER_EXPONENT: f64 = 100.0;
pub(in crate::app) const IMPACT_SLIDER_STEP: f64 = 0.01;

const TRACK_HEIGHT: f32 = 8.0;
const THUMB_RADIUS: f32 = 8.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum Thumb {
    Low,
    High,
}

pub(in crate::app) fn min_gap_for(bounds: (f64, f64), step: f64) -> f64 {
    let span = bounds.1 - bounds.0;
    step.max(span * MIN_THUMB_GAP_FRACTION)
}

/// Orders the pair and pushes the thumb that is not being dragged away until
/// the gap holds, staying inside `bounds`.
pub(in crate::app) fn enforce_min_gap(
    value: (f64, f64),
    bounds: (f64, f64),
    min_gap: f64,
    active: Thumb,
) -> (f64, f64) {
    let left = value.0.min(value.1);
    let right = value.0.max(value.1);
    if min_gap <= 0.0 || right - left >= min_gap {
        return (left, right);
    }

    match active {
        Thumb::Low => ((right - min_gap).max(bounds.0), right),
        Thumb::High => (left, (left + min_gap).min(bounds.1)),
    }
}

fn snap(value: f64, bounds: (f64, f64), step: f64) -> f64 {
    let snapped = if step > 0.0 {
        bounds.0 + ((value - bounds.0) / step).round() * step
    } else {
        value
    };
    snapped.clamp(bounds.0, bounds.1)
}

pub(in crate::app) fn impact_to_slider(value: f64, extent: (f64, f64)) -> f64 {
    let (min, max) = extent;
    if max == min {
        return 0.0;
    }
    let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
    t.powf(IMPACT_SLIDER_EXPONENT)
}

pub(in crate::app) fn slider_to_impact(position: f64, extent: (f64, f64)) -> f64 {
    let (min, max) = extent;
    let t = position.clamp(0.0, 1.0);
    min + (max - min) * t.powf(IMPACT_SLIDER_EXPONENT.recip())
}

/// Strength bins as a range over segment edges `0..=bins`: bin `q` spans
/// `[q - 1, q]`.
pub(in crate::app) fn strength_to_slider(range: BinRange) -> (f64, f64) {
    ((range.lo - 1) as f64, range.hi as f64)
}

pub(in crate::app) fn slider_to_strength(value: (f64, f64)) -> BinRange {
    let left = value.0.min(value.1).round().max(0.0) as usize;
    let right = value.0.max(value.1).round().max(0.0) as usize;
    let hi = if right == left { left + 1 } else { right };
    BinRange::new(left + 1, hi)
}

/// Two-thumb slider over `bounds`. `rail` paints equal-width color segments
/// under the thumbs; without it the selected span is highlighted. Returns
/// true when the value changed.
pub(in crate::app) fn range_slider(
    ui: &mut Ui,
    id_salt: &str,
    value: &mut (f64, f64),
    bounds: (f64, f64),
    step: f64,
    min_gap: f64,
    rail: &[Color32],
) -> bool {
    let width = ui.available_width().max(80.0);
    let (rect, response) =
        ui.allocate_exact_size(vec2(width, THUMB_RADIUS * 2.0 + 4.0), Sense::click_and_drag());
    let track = Rect::from_center_size(
        rect.center(),
        vec2(rect.width() - THUMB_RADIUS * 2.0, TRACK_HEIGHT),
    );
    let span = (bounds.1 - bounds.0).max(f64::EPSILON);
    let to_x = |v: f64| track.left() + (((v - bounds.0) / span) as f32) * track.width();
    let to_value = |x: f32| bounds.0 + f64::from((x - track.left()) / track.width()) * span;

    let state_id = Id::new(id_salt).with("active_thumb");
    let mut changed = false;
    if let Some(pointer) = response.interact_pointer_pos() {
        let active = if response.drag_started() || response.clicked() {
            let low_distance = (pointer.x - to_x(value.0)).abs();
            let high_distance = (pointer.x - to_x(value.1)).abs();
            let thumb = if low_distance <= high_distance && pointer.x <= to_x(value.1) {
                Thumb::Low
            } else {
                Thumb::High
            };
            ui.ctx().data_mut(|data| data.insert_temp(state_id, thumb));
            thumb
        } else {
            ui.ctx()
                .data(|data| data.get_temp::<Thumb>(state_id))
                .unwrap_or(Thumb::High)
        };

        let target = snap(to_value(pointer.x), bounds, step);
        let moved = match active {
            Thumb::Low => (target.min(value.1), value.1),
            Thumb::High => (value.0, target.max(value.0)),
        };
        let next = enforce_min_gap(moved, bounds, min_gap, active);
        if next != *value {
            *value = next;
            changed = true;
        }
    }

    let painter = ui.painter_at(rect.expand(2.0));
    let rounding = TRACK_HEIGHT * 0.5;
    if rail.is_empty() {
        painter.rect_filled(track, rounding, Color32::from_gray(70));
        let selected = Rect::from_x_y_ranges(to_x(value.0)..=to_x(value.1), track.y_range());
        painter.rect_filled(selected, rounding, ACCENT);
    } else {
        let segment = track.width() / rail.len() as f32;
        for (index, color) in rail.iter().enumerate() {
            let left = track.left() + segment * index as f32;
            let cell = Rect::from_min_max(
                Pos2::new(left, track.top()),
                Pos2::new(left + segment, track.bottom()),
            );
            painter.rect_filled(cell, 0.0, *color);
        }
    }

    let thumb_stroke = Stroke::new(2.0, ACCENT);
    for thumb in [value.0, value.1] {
        let center = Pos2::new(to_x(thumb), track.center().y);
        painter.circle(center, THUMB_RADIUS, Color32::WHITE, thumb_stroke);
    }

    if response.hovered() || response.dragged() {
        ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grab);
    }
    changed
}
