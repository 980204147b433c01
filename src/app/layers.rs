use eframe::egui::{Color32, Stroke};

use crate::data::GeoPoint;

use super::scale::PixelClamp;

/// What a drawn primitive refers to, so hover and click can be routed back
/// to the record behind it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(super) enum Pick {
    Link(usize),
    Poi(usize),
    ImpactPoi(usize),
    ClosedPoi(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub(super) struct LinePrimitive {
    pub(super) source: GeoPoint,
    pub(super) target: GeoPoint,
    pub(super) color: Color32,
    pub(super) pick: Option<Pick>,
}

#[derive(Clone, Debug, PartialEq)]
pub(super) struct LineLayer {
    pub(super) id: &'static str,
    pub(super) width_px: f32,
    /// Draw as a shallow great-circle-like arc instead of a straight segment.
    pub(super) arc: bool,
    pub(super) lines: Vec<LinePrimitive>,
}

#[derive(Clone, Debug, PartialEq)]
pub(super) struct PointPrimitive {
    pub(super) position: GeoPoint,
    pub(super) radius_m: f64,
    pub(super) fill: Color32,
    pub(super) outline: Stroke,
    pub(super) pick: Option<Pick>,
}

#[derive(Clone, Debug, PartialEq)]
pub(super) struct PointLayer {
    pub(super) id: &'static str,
    pub(super) clamp: PixelClamp,
    pub(super) points: Vec<PointPrimitive>,
}

#[derive(Clone, Debug, PartialEq)]
pub(super) enum Layer {
    Lines(LineLayer),
    Points(PointLayer),
}

impl Layer {
    #[cfg(test)]
    pub(super) fn id(&self) -> &'static str {
        match self {
            Self::Lines(layer) => layer.id,
            Self::Points(layer) => layer.id,
        }
    }

    pub(super) fn len(&self) -> usize {
        match self {
            Self::Lines(layer) => layer.lines.len(),
            Self::Points(layer) => layer.points.len(),
        }
    }
}

/// Ordered bottom-to-top list of layers handed to a map surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub(super) struct LayerSet {
    pub(super) layers: Vec<Layer>,
}

impl LayerSet {
    pub(super) fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    #[cfg(test)]
    pub(super) fn get(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id() == id)
    }

    pub(super) fn primitive_count(&self) -> usize {
        self.layers.iter().map(Layer::len).sum()
    }
}
