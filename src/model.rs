//! Layer-attached axis metadata and its frozen "restore defaults" snapshot.

use crate::axis::Axis;
use crate::units::{SpaceUnits, TimeUnits};
use crate::{Error, Result};

/// Immutable snapshot of a layer's state at first coercion or read.
///
/// Captured exactly once and never replaced, so "restore defaults" always
/// targets the state the layer was first seen in.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalMetadata {
    pub axes: Vec<Axis>,
    pub name: Option<String>,
    pub scale: Option<Vec<f64>>,
    pub translate: Option<Vec<f64>>,
}

/// Per-layer axis metadata.
///
/// Owns one [`Axis`] per layer dimension; the list length must equal the
/// owning layer's dimensionality for as long as the metadata is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraMetadata {
    axes: Vec<Axis>,
    original: Option<OriginalMetadata>,
}

impl ExtraMetadata {
    pub fn new(axes: Vec<Axis>, original: Option<OriginalMetadata>) -> Self {
        Self { axes, original }
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axes_mut(&mut self) -> &mut [Axis] {
        &mut self.axes
    }

    pub fn original(&self) -> Option<&OriginalMetadata> {
        self.original.as_ref()
    }

    pub fn axis_names(&self) -> Vec<String> {
        self.axes.iter().map(|axis| axis.name().to_string()).collect()
    }

    /// Rename all axes positionally.
    ///
    /// The number of names must equal the number of axes; a mismatch is a
    /// caller bug and fails loudly.
    pub fn set_axis_names<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        if names.len() != self.axes.len() {
            return Err(Error::general(format!(
                "got {} axis names for {} axes",
                names.len(),
                self.axes.len()
            )));
        }
        for (axis, name) in self.axes.iter_mut().zip(names) {
            axis.set_name(name.as_ref());
        }
        Ok(())
    }

    /// The unit shared by every space axis, or the sentinel if they disagree
    /// (or there are no space axes).
    pub fn space_unit(&self) -> SpaceUnits {
        let mut units = self.axes.iter().filter_map(|axis| match axis {
            Axis::Space(space) => Some(space.unit),
            _ => None,
        });
        match units.next() {
            Some(first) if units.all(|unit| unit == first) => first,
            _ => SpaceUnits::None,
        }
    }

    /// Overwrite the unit of every space axis; other axes are untouched.
    pub fn set_space_unit(&mut self, unit: SpaceUnits) {
        for axis in &mut self.axes {
            if let Axis::Space(space) = axis {
                space.unit = unit;
            }
        }
    }

    /// The unit shared by every time axis, or the sentinel if they disagree
    /// (or there are no time axes).
    pub fn time_unit(&self) -> TimeUnits {
        let mut units = self.axes.iter().filter_map(|axis| match axis {
            Axis::Time(time) => Some(time.unit),
            _ => None,
        });
        match units.next() {
            Some(first) if units.all(|unit| unit == first) => first,
            _ => TimeUnits::None,
        }
    }

    /// Overwrite the unit of every time axis; other axes are untouched.
    pub fn set_time_unit(&mut self, unit: TimeUnits) {
        for axis in &mut self.axes {
            if let Axis::Time(time) = axis {
                time.unit = unit;
            }
        }
    }
}
