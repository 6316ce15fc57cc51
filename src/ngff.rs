//! Serde models of OME-NGFF multiscale group metadata.
//!
//! <https://ngff.openmicroscopy.org/0.4/#multiscale-md>
//!
//! Axis entries are kept untyped at the wire (`type` and `unit` as plain
//! strings) so that foreign stores with vocabularies this crate does not
//! model still deserialize; coercion into the typed [`Axis`] model happens
//! on top, substituting the sentinel unit for unrecognized text.

use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::units::{SpaceUnits, TimeUnits};

/// One entry of a multiscale `axes` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisMeta {
    pub name: String,
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A `coordinateTransformations` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum CoordinateTransformation {
    Identity,
    Translation { translation: Vec<f64> },
    Scale { scale: Vec<f64> },
}

/// One pyramid level: an array path plus its transforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub path: String,
    #[serde(rename = "coordinateTransformations")]
    pub coordinate_transformations: Vec<CoordinateTransformation>,
}

/// One multiscale image: axes plus datasets ordered highest resolution first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Multiscale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub axes: Vec<AxisMeta>,
    pub datasets: Vec<Dataset>,
}

/// Per-channel display window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OmeroWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Per-channel rendering metadata. Every field is optional in the wild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OmeroChannel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<OmeroWindow>,
}

/// The `omero` block of rendering hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Omero {
    #[serde(default)]
    pub channels: Vec<OmeroChannel>,
}

/// The group attributes this crate consumes and produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiscales: Option<Vec<Multiscale>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omero: Option<Omero>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(rename = "image-label")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_label: Option<serde_json::Value>,
}

impl From<&Axis> for AxisMeta {
    fn from(axis: &Axis) -> Self {
        Self {
            name: axis.name().to_string(),
            axis_type: Some(axis.axis_type().to_string()),
            // omitted only for channel axes, which have no unit at all
            unit: axis.unit_name(),
        }
    }
}

impl AxisMeta {
    /// Coerce into the typed axis model.
    ///
    /// `time` maps to a time axis and `channel` to `None` (the channel axis
    /// is consumed separately by the reader); anything else, including custom
    /// types, maps to a space axis. Unrecognized unit text becomes the
    /// sentinel.
    pub fn to_axis(&self) -> Option<Axis> {
        let unit = self.unit.as_deref().unwrap_or("none");
        match self.axis_type.as_deref() {
            Some("time") => Some(Axis::time(
                &self.name,
                TimeUnits::from_name(unit).unwrap_or(TimeUnits::None),
            )),
            Some("channel") => None,
            _ => Some(Axis::space(
                &self.name,
                SpaceUnits::from_name(unit).unwrap_or(SpaceUnits::None),
            )),
        }
    }
}
