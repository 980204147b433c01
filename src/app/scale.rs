//! Zoom-dependent sizes. Every function here is a pure function of the zoom
//! level (plus selection for network POIs).

/// Zoom at which base sizes are shown unscaled.
pub(super) const REF_ZOOM: f64 = 12.0;

/// Smaller divisors shrink harder below [`REF_ZOOM`].
const LINK_ZOOM_DIVISOR: f64 = 1.2;
const POI_ZOOM_DIVISOR: f64 = 1.0;

const LINK_BASE_WIDTH_PX: f64 = 0.9;
const LINK_MIN_WIDTH_PX: f64 = 0.8;
const LINK_MAX_WIDTH_PX: f64 = 3.0;

const INTERMEDIATE_ZOOM_MIN: f64 = 9.0;
const INTERMEDIATE_ZOOM_MAX: f64 = 12.0;
const INTERMEDIATE_RAMP: f64 = 0.5;
const INTERMEDIATE_WIDTH_FACTOR: f64 = 0.2;

const NETWORK_POI_RADIUS_M: f64 = 32.0;
const NETWORK_POI_SELECTED_RADIUS_M: f64 = 56.0;

const IMPACT_POI_RADIUS_M: f64 = 28.0;
const CLOSED_POI_RADIUS_M: f64 = 40.0;

const LANDING_POI_RADIUS_M: f64 = 24.0;

/// Pixel clamps applied after converting meter radii to screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct PixelClamp {
    pub(super) min: f32,
    pub(super) max: f32,
}

pub(super) const NETWORK_POI_PIXELS: PixelClamp = PixelClamp { min: 1.0, max: 16.0 };
pub(super) const IMPACT_POI_PIXELS: PixelClamp = PixelClamp { min: 2.0, max: 14.0 };
pub(super) const CLOSED_POI_PIXELS: PixelClamp = PixelClamp { min: 3.0, max: 18.0 };
pub(super) const LANDING_POI_PIXELS: PixelClamp = PixelClamp { min: 1.0, max: 12.0 };

pub(super) fn zoom_scale(zoom: f64, reference: f64, divisor: f64) -> f64 {
    2f64.powf((zoom - reference) / divisor)
}

/// Width multiplier that thins links inside the medium-zoom band, with linear
/// ramps at both edges.
pub(super) fn intermediate_zoom_factor(zoom: f64) -> f64 {
    if zoom <= INTERMEDIATE_ZOOM_MIN || zoom >= INTERMEDIATE_ZOOM_MAX {
        return 1.0;
    }

    if zoom < INTERMEDIATE_ZOOM_MIN + INTERMEDIATE_RAMP {
        let t = (zoom - INTERMEDIATE_ZOOM_MIN) / INTERMEDIATE_RAMP;
        return 1.0 + t * (INTERMEDIATE_WIDTH_FACTOR - 1.0);
    }

    if zoom > INTERMEDIATE_ZOOM_MAX - INTERMEDIATE_RAMP {
        let t = (zoom - (INTERMEDIATE_ZOOM_MAX - INTERMEDIATE_RAMP)) / INTERMEDIATE_RAMP;
        return INTERMEDIATE_WIDTH_FACTOR + t * (1.0 - INTERMEDIATE_WIDTH_FACTOR);
    }

    INTERMEDIATE_WIDTH_FACTOR
}

pub(super) fn link_width_px(zoom: f64) -> f64 {
    let scaled = LINK_BASE_WIDTH_PX * zoom_scale(zoom, REF_ZOOM, LINK_ZOOM_DIVISOR);
    let base = scaled.clamp(LINK_MIN_WIDTH_PX, LINK_MAX_WIDTH_PX);
    (base * intermediate_zoom_factor(zoom)).max(1.0)
}

pub(super) fn network_poi_radius_m(zoom: f64, selected: bool) -> f64 {
    let base = if selected {
        NETWORK_POI_SELECTED_RADIUS_M
    } else {
        NETWORK_POI_RADIUS_M
    };
    (base * zoom_scale(zoom, REF_ZOOM, POI_ZOOM_DIVISOR)).max(1.0)
}

pub(super) fn impact_poi_radius_m(zoom: f64) -> f64 {
    (IMPACT_POI_RADIUS_M * zoom_scale(zoom, REF_ZOOM, LINK_ZOOM_DIVISOR)).max(2.0)
}

pub(super) fn closed_poi_radius_m(zoom: f64) -> f64 {
    (CLOSED_POI_RADIUS_M * zoom_scale(zoom, REF_ZOOM, LINK_ZOOM_DIVISOR)).max(3.0)
}

pub(super) fn landing_arc_width_px(zoom: f64) -> f64 {
    (LINK_BASE_WIDTH_PX * zoom_scale(zoom, REF_ZOOM, LINK_ZOOM_DIVISOR)).clamp(1.0, LINK_MAX_WIDTH_PX)
}

pub(super) fn landing_poi_radius_m(zoom: f64) -> f64 {
    (LANDING_POI_RADIUS_M * zoom_scale(zoom, REF_ZOOM, POI_ZOOM_DIVISOR)).max(1.0)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn reference_zoom_is_unscaled() {
        assert!(close(zoom_scale(REF_ZOOM, REF_ZOOM, 1.2), 1.0));
        assert!(close(zoom_scale(13.0, REF_ZOOM, 1.0), 2.0));
    }

    #[test]
    fn repeated_calls_agree() {
        assert_eq!(link_width_px(12.0), link_width_px(12.0));
        assert_eq!(network_poi_radius_m(12.0, true), network_poi_radius_m(12.0, true));
    }

    #[test]
    fn intermediate_band_ramps_without_jumps() {
        assert!(close(intermediate_zoom_factor(9.0), 1.0));
        assert!(close(intermediate_zoom_factor(9.25), 0.6));
        assert!(close(intermediate_zoom_factor(9.5), 0.2));
        assert!(close(intermediate_zoom_factor(10.5), 0.2));
        assert!(close(intermediate_zoom_factor(11.75), 0.6));
        assert!(close(intermediate_zoom_factor(12.0), 1.0));
        assert!(close(intermediate_zoom_factor(15.0), 1.0));
    }

    #[test]
    fn link_width_never_drops_below_one_pixel() {
        assert!(close(link_width_px(10.0), 1.0));
        assert!(close(link_width_px(16.0), 3.0));
        assert!(close(link_width_px(12.0), 1.0));
    }

    #[test]
    fn selected_pois_are_larger() {
        for zoom in [8.0, 10.0, 12.0, 14.0] {
            assert!(network_poi_radius_m(zoom, true) > network_poi_radius_m(zoom, false));
        }
    }

    #[test]
    fn pois_shrink_faster_than_links() {
        let poi_ratio = zoom_scale(10.0, REF_ZOOM, POI_ZOOM_DIVISOR);
        let link_ratio = zoom_scale(10.0, REF_ZOOM, LINK_ZOOM_DIVISOR);
        assert!(poi_ratio < link_ratio);
    }

    #[test]
    fn simulation_radii_respect_their_floors() {
        assert!(close(impact_poi_radius_m(2.0), 2.0));
        assert!(close(closed_poi_radius_m(2.0), 3.0));
        assert!(close(closed_poi_radius_m(REF_ZOOM), 40.0));
        assert!(close(landing_arc_width_px(4.0), 1.0));
        assert!(close(landing_poi_radius_m(REF_ZOOM), 24.0));
    }

    proptest! {
        #[test]
        fn zoom_scale_is_increasing(a in 0.0f64..22.0, b in 0.0f64..22.0, divisor in 0.5f64..3.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(zoom_scale(low, REF_ZOOM, divisor) <= zoom_scale(high, REF_ZOOM, divisor));
        }
    }
}
