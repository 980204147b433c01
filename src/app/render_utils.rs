use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

pub(super) type Rgb = [u8; 3];

/// Sequential dependency palette: dark purple, burgundy, red, orange, gold,
/// bright yellow.
pub(super) const DEPENDENCY_PALETTE: [Rgb; 6] = [
    [127, 59, 141],
    [158, 42, 99],
    [227, 26, 28],
    [246, 132, 0],
    [253, 194, 0],
    [255, 255, 180],
];
pub(super) const DEPENDENCY_ALPHA: u8 = 120;
pub(super) const LANDING_DEPENDENCY_ALPHA: u8 = 200;

/// OrRd reversed: severe impact (dark red) to negligible impact (cream).
pub(super) const IMPACT_PALETTE: [Rgb; 6] = [
    [127, 0, 0],
    [215, 48, 31],
    [252, 141, 89],
    [253, 212, 158],
    [254, 230, 206],
    [255, 247, 236],
];
pub(super) const IMPACT_ALPHA: u8 = 220;

pub(super) const CLOSED_FILL: Color32 = Color32::from_rgb(93, 212, 255);
pub(super) const MAP_BACKGROUND: Color32 = Color32::from_rgb(0, 0, 0);
pub(super) const LANDING_BACKGROUND: Color32 = Color32::from_rgb(10, 10, 15);
pub(super) const ACCENT: Color32 = Color32::from_rgb(127, 59, 141);
pub(super) const NAV_ACTIVE: Color32 = Color32::from_rgb(221, 130, 35);

fn lerp_rgb(a: Rgb, b: Rgb, amount: f64) -> Rgb {
    let channel = |from: u8, to: u8| {
        (f64::from(from) + amount * (f64::from(to) - f64::from(from))).round() as u8
    };
    [channel(a[0], b[0]), channel(a[1], b[1]), channel(a[2], b[2])]
}

/// Color for a zero-based bin, interpolated across the whole palette by the
/// bin's position among `bins`.
pub(super) fn ramp_color(palette: &[Rgb], bin: usize, bins: usize, alpha: u8) -> Color32 {
    let Some(last) = palette.len().checked_sub(1) else {
        return Color32::TRANSPARENT;
    };

    let t = if bins > 1 {
        (bin as f64 / (bins - 1) as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let position = t * last as f64;
    let lower = (position.floor() as usize).min(last);
    let upper = (lower + 1).min(last);
    let [r, g, b] = lerp_rgb(palette[lower], palette[upper], position - lower as f64);
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

/// Direct palette lookup, clamped to the last entry.
pub(super) fn palette_color(palette: &[Rgb], index: usize, alpha: u8) -> Color32 {
    match palette.get(index.min(palette.len().saturating_sub(1))) {
        Some([r, g, b]) => Color32::from_rgba_unmultiplied(*r, *g, *b, alpha),
        None => Color32::TRANSPARENT,
    }
}

/// Flat backdrop with a faint graticule anchored at `origin` so it pans with
/// the map.
pub(super) fn draw_background(painter: &Painter, rect: Rect, origin: Pos2, zoom: f64, fill: Color32) {
    painter.rect_filled(rect, 0.0, fill);

    let step = (56.0 * (1.0 + zoom.fract() as f32)).max(20.0);
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 45));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    if max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom() {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let top_left = rect.left_top();
    let top_right = rect.right_top();
    let bottom_left = rect.left_bottom();
    let bottom_right = rect.right_bottom();

    segments_intersect(start, end, top_left, top_right)
        || segments_intersect(start, end, top_right, bottom_right)
        || segments_intersect(start, end, bottom_right, bottom_left)
        || segments_intersect(start, end, bottom_left, top_left)
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}

pub(super) fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }

    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}

/// Control point lifting a link into a shallow arc, offset perpendicular to
/// the chord.
pub(super) fn arc_control_point(start: Pos2, end: Pos2, lift: f32) -> Pos2 {
    let chord = end - start;
    let normal = eframe::egui::vec2(chord.y, -chord.x);
    start + chord * 0.5 + normal * lift
}
