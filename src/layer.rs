//! The host-viewer boundary: a minimal layer abstraction and the lazy
//! coercion that attaches axis metadata to it.

use crate::axis::Axis;
use crate::model::{ExtraMetadata, OriginalMetadata};
use crate::units::SpaceUnits;
use crate::{Error, Result};

/// The slice of a host viewer's layer that the metadata core needs: a name,
/// a dimensionality, affine placement, and a typed slot for [`ExtraMetadata`].
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    ndim: usize,
    scale: Vec<f64>,
    translate: Vec<f64>,
    extra: Option<ExtraMetadata>,
}

impl Layer {
    /// A layer with unit scale and zero translation per dimension.
    pub fn new(name: impl Into<String>, ndim: usize) -> Self {
        Self {
            name: name.into(),
            ndim,
            scale: vec![1.0; ndim],
            translate: vec![0.0; ndim],
            extra: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn set_scale(&mut self, scale: Vec<f64>) -> Result<()> {
        if scale.len() != self.ndim {
            return Err(Error::general(format!(
                "scale has {} components for a {}-dimensional layer",
                scale.len(),
                self.ndim
            )));
        }
        self.scale = scale;
        Ok(())
    }

    pub fn translate(&self) -> &[f64] {
        &self.translate
    }

    pub fn set_translate(&mut self, translate: Vec<f64>) -> Result<()> {
        if translate.len() != self.ndim {
            return Err(Error::general(format!(
                "translate has {} components for a {}-dimensional layer",
                translate.len(),
                self.ndim
            )));
        }
        self.translate = translate;
        Ok(())
    }

    pub fn extra_metadata(&self) -> Option<&ExtraMetadata> {
        self.extra.as_ref()
    }

    pub fn extra_metadata_mut(&mut self) -> Option<&mut ExtraMetadata> {
        self.extra.as_mut()
    }

    pub fn set_extra_metadata(&mut self, extra: ExtraMetadata) {
        self.extra = Some(extra);
    }
}

/// The typed attribute boundary between the reader/writer and a host viewer.
///
/// The reader produces one of these per layer; the writer consumes one.
/// Display hints (`visible`, `colormap`, `contrast_limits`) are carried for
/// the host but never interpreted here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerAttributes {
    pub name: Option<String>,
    pub scale: Option<Vec<f64>>,
    pub translate: Option<Vec<f64>>,
    /// Index of the channel axis in the on-disk data, for hosts with a
    /// channel-axis display convention.
    pub channel_axis: Option<usize>,
    pub visible: Option<bool>,
    pub colormap: Option<String>,
    pub contrast_limits: Option<(f64, f64)>,
    pub extra: Option<ExtraMetadata>,
}

/// The trailing `ndim` labels of a viewer-wide axis label list.
///
/// A viewer canvas shares one ordered label list across all loaded layers;
/// the trailing `ndim` entries belong to a given `ndim`-dimensional layer and
/// any leading entries to higher-dimensional neighbours. Fewer labels than
/// dimensions is a caller bug.
pub fn trailing_axis_labels<S: AsRef<str>>(labels: &[S], ndim: usize) -> Result<&[S]> {
    let skip = labels.len().checked_sub(ndim).ok_or_else(|| {
        Error::general(format!(
            "viewer has {} axis labels, fewer than the layer's {} dimensions",
            labels.len(),
            ndim
        ))
    })?;
    Ok(&labels[skip..])
}

/// Fetch a layer's [`ExtraMetadata`], seeding it on first touch.
///
/// A layer without metadata gets one space axis (sentinel unit) per trailing
/// viewer label, plus an [`OriginalMetadata`] snapshot of its current state.
/// A layer that already carries metadata is returned unchanged, so the
/// snapshot is captured at most once per layer.
pub fn coerce_extra_metadata<'a, S: AsRef<str>>(
    viewer_axis_labels: &[S],
    layer: &'a mut Layer,
) -> Result<&'a mut ExtraMetadata> {
    if layer.extra.is_none() {
        let axes: Vec<Axis> = trailing_axis_labels(viewer_axis_labels, layer.ndim)?
            .iter()
            .map(|label| Axis::space(label.as_ref(), SpaceUnits::None))
            .collect();
        let original = OriginalMetadata {
            axes: axes.clone(),
            name: Some(layer.name.clone()),
            scale: Some(layer.scale.clone()),
            translate: Some(layer.translate.clone()),
        };
        layer.extra = Some(ExtraMetadata::new(axes, Some(original)));
    }
    Ok(layer.extra.as_mut().expect("just seeded"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::AxisType;

    #[test]
    fn trailing_labels_take_the_suffix() {
        let labels = ["t", "z", "y", "x"];
        let trailing = trailing_axis_labels(&labels, 2).unwrap();
        assert_eq!(trailing, ["y", "x"]);
        assert_eq!(trailing_axis_labels(&labels, 4).unwrap(), labels);
    }

    #[test]
    fn trailing_labels_reject_too_few() {
        let labels = ["y", "x"];
        let err = trailing_axis_labels(&labels, 3).unwrap_err();
        assert!(err.to_string().contains("fewer than"));
    }

    #[test]
    fn coercion_seeds_space_axes_from_the_suffix() {
        let mut layer = Layer::new("cells", 2);
        layer.set_scale(vec![2.0, 3.0]).unwrap();
        let extra = coerce_extra_metadata(&["t", "y", "x"], &mut layer).unwrap();
        assert_eq!(extra.axis_names(), ["y", "x"]);
        assert!(extra
            .axes()
            .iter()
            .all(|axis| axis.axis_type() == AxisType::Space));
        let original = extra.original().expect("snapshot taken at seed time");
        assert_eq!(original.name.as_deref(), Some("cells"));
        assert_eq!(original.scale.as_deref(), Some(&[2.0, 3.0][..]));
        assert_eq!(original.translate.as_deref(), Some(&[0.0, 0.0][..]));
    }

    #[test]
    fn coercion_is_idempotent() {
        let mut layer = Layer::new("cells", 2);
        coerce_extra_metadata(&["y", "x"], &mut layer).unwrap();

        // Mutate and re-coerce: neither the axes nor the snapshot re-seed.
        layer
            .extra_metadata_mut()
            .unwrap()
            .set_axis_names(&["row", "col"])
            .unwrap();
        layer.set_name("renamed");
        let extra = coerce_extra_metadata(&["y", "x"], &mut layer).unwrap();
        assert_eq!(extra.axis_names(), ["row", "col"]);
        assert_eq!(
            extra.original().unwrap().name.as_deref(),
            Some("cells"),
            "snapshot must not be retaken"
        );
    }

    #[test]
    fn scale_setter_rejects_dimension_mismatch() {
        let mut layer = Layer::new("cells", 2);
        assert!(layer.set_scale(vec![1.0, 2.0, 3.0]).is_err());
        assert!(layer.set_translate(vec![0.0]).is_err());
    }
}
