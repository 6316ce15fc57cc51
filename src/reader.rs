//! Reading OME-NGFF multiscale images into layers with typed axis metadata.

use std::path::Path;
use std::sync::Arc;

use ndarray::ArrayD;
use zarrs::array::Array;
use zarrs::array_subset::ArraySubset;
use zarrs::filesystem::FilesystemStore;
use zarrs::group::Group;

use crate::axis::Axis;
use crate::layer::LayerAttributes;
use crate::model::{ExtraMetadata, OriginalMetadata};
use crate::ngff::{CoordinateTransformation, GroupAttributes, Multiscale, OmeroChannel};
use crate::pixel::{Pixel, Pyramid};
use crate::units::SpaceUnits;
use crate::{Error, Result};

/// What kind of layer a node maps to in the host viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Image,
    Labels,
}

/// One layer produced by the reader: pixel data plus its typed attributes.
#[derive(Debug, Clone)]
pub struct LayerData<T> {
    pub data: Pyramid<T>,
    pub attributes: LayerAttributes,
    pub kind: LayerKind,
}

/// Everything one read produced: the layers, plus any non-fatal warnings
/// raised while sanitizing metadata.
#[derive(Debug, Clone)]
pub struct ReadOutput<T> {
    pub layers: Vec<LayerData<T>>,
    pub warnings: Vec<String>,
}

/// A multiscale image store recognized at a path.
///
/// `open` is the discovery step: it returns `None` for anything that is not
/// a zarr group carrying multiscales metadata, so callers trying several
/// readers can move on without treating the path as an error.
pub struct OmeZarrReader {
    store: Arc<FilesystemStore>,
    attributes: GroupAttributes,
}

impl OmeZarrReader {
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let store = match FilesystemStore::new(path) {
            Ok(store) => Arc::new(store),
            Err(error) => {
                log::debug!("{}: not a readable store: {error}", path.display());
                return None;
            }
        };
        let attributes = match read_group_attributes(&store, "/") {
            Ok(attributes) => attributes,
            Err(error) => {
                log::debug!("{}: not an ome-zarr group: {error}", path.display());
                return None;
            }
        };
        if attributes
            .multiscales
            .as_ref()
            .map_or(true, |multiscales| multiscales.is_empty())
        {
            log::debug!("{}: no multiscales metadata", path.display());
            return None;
        }
        Some(Self { store, attributes })
    }

    /// Read every image and labels node into layers.
    pub fn read<T: Pixel>(&self) -> Result<ReadOutput<T>> {
        let mut layers = Vec::new();
        let mut warnings = Vec::new();

        let omero_channels: &[OmeroChannel] = match &self.attributes.omero {
            Some(omero) => &omero.channels,
            None => &[],
        };
        for multiscale in self.attributes.multiscales.as_deref().unwrap_or(&[]) {
            self.read_node(
                multiscale,
                "",
                omero_channels,
                LayerKind::Image,
                &mut layers,
                &mut warnings,
            )?;
        }

        self.read_labels(&mut layers, &mut warnings)?;

        Ok(ReadOutput { layers, warnings })
    }

    /// Labels are children of the `labels` group, each a multiscale image of
    /// its own. Unreadable children are skipped, not fatal.
    fn read_labels<T: Pixel>(
        &self,
        layers: &mut Vec<LayerData<T>>,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        let Ok(labels_attributes) = read_group_attributes(&self.store, "/labels") else {
            return Ok(());
        };
        for name in labels_attributes.labels.as_deref().unwrap_or(&[]) {
            let prefix = format!("/labels/{name}");
            let child = match read_group_attributes(&self.store, &prefix) {
                Ok(child) => child,
                Err(error) => {
                    log::debug!("skipping labels node {name}: {error}");
                    continue;
                }
            };
            for multiscale in child.multiscales.as_deref().unwrap_or(&[]) {
                self.read_node(multiscale, &prefix, &[], LayerKind::Labels, layers, warnings)?;
            }
        }
        Ok(())
    }

    fn read_node<T: Pixel>(
        &self,
        multiscale: &Multiscale,
        prefix: &str,
        omero_channels: &[OmeroChannel],
        kind: LayerKind,
        layers: &mut Vec<LayerData<T>>,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        let (axes, channel_axis) = node_axes(multiscale, warnings)?;
        let (mut scale, mut translate) = node_transforms(multiscale);
        if let Some(channel) = channel_axis {
            if let Some(scale) = scale.as_mut() {
                remove_component(scale, channel);
            }
            if let Some(translate) = translate.as_mut() {
                remove_component(translate, channel);
            }
        }

        let Some(levels) = self.read_levels::<T>(multiscale, prefix)? else {
            log::debug!("skipping data-less node {prefix:?}");
            return Ok(());
        };

        // Foreign metadata may disagree with the arrays it describes; the
        // channel index below indexes into the data, so the counts must match.
        let ndim = levels[0].ndim();
        if multiscale.axes.len() != ndim {
            let warning = format!(
                "node {prefix:?} declares {} axes for {ndim}-dimensional data; skipping it",
                multiscale.axes.len()
            );
            log::warn!("{warning}");
            warnings.push(warning);
            return Ok(());
        }

        let name = multiscale.name.clone();
        let extra = ExtraMetadata::new(
            axes.clone(),
            Some(OriginalMetadata {
                axes: axes.clone(),
                name: name.clone(),
                scale: scale.clone(),
                translate: translate.clone(),
            }),
        );
        let base_attributes = LayerAttributes {
            name,
            scale,
            translate,
            channel_axis,
            extra: Some(extra),
            ..Default::default()
        };

        match (kind, channel_axis) {
            (LayerKind::Image, Some(channel)) => {
                // One layer per channel, sliced out of every level.
                let num_channels = levels[0].shape()[channel];
                for index in 0..num_channels {
                    let channel_levels: Vec<ArrayD<T>> = levels
                        .iter()
                        .map(|level| level.index_axis(ndarray::Axis(channel), index).to_owned())
                        .collect();
                    let mut attributes = base_attributes.clone();
                    apply_omero_channel(&mut attributes, omero_channels.get(index));
                    layers.push(LayerData {
                        data: Pyramid::from_levels(channel_levels),
                        attributes,
                        kind,
                    });
                }
            }
            (LayerKind::Labels, Some(channel)) => {
                // Labels are not split; a unit-length channel axis is squeezed.
                let mut attributes = base_attributes;
                let data = if levels[0].shape()[channel] == 1 {
                    Pyramid::from_levels(
                        levels
                            .iter()
                            .map(|level| level.index_axis(ndarray::Axis(channel), 0).to_owned())
                            .collect(),
                    )
                } else {
                    let warning =
                        format!("labels node {prefix:?} has a non-trivial channel axis");
                    log::warn!("{warning}");
                    warnings.push(warning);
                    attributes.extra = None;
                    Pyramid::from_levels(levels)
                };
                layers.push(LayerData {
                    data,
                    attributes,
                    kind,
                });
            }
            (_, None) => {
                let mut attributes = base_attributes;
                if kind == LayerKind::Image {
                    apply_omero_channel(&mut attributes, omero_channels.first());
                }
                layers.push(LayerData {
                    data: Pyramid::from_levels(levels),
                    attributes,
                    kind,
                });
            }
        }
        Ok(())
    }

    /// Read every resolution level of a node, highest resolution first.
    /// Returns `None` when the node has no readable pixel data.
    fn read_levels<T: Pixel>(
        &self,
        multiscale: &Multiscale,
        prefix: &str,
    ) -> Result<Option<Vec<ArrayD<T>>>> {
        if multiscale.datasets.is_empty() {
            return Ok(None);
        }
        let mut levels = Vec::with_capacity(multiscale.datasets.len());
        for dataset in &multiscale.datasets {
            let array_path = format!("{prefix}/{}", dataset.path);
            let array = match Array::open(self.store.clone(), &array_path) {
                Ok(array) => array,
                Err(error) => {
                    log::debug!("no array at {array_path}: {error}");
                    return Ok(None);
                }
            };
            let subset = ArraySubset::new_with_shape(array.shape().to_vec());
            match array.retrieve_array_subset_ndarray::<T>(&subset) {
                Ok(level) => levels.push(level),
                Err(error) => {
                    log::warn!("could not read {array_path}: {error}");
                    return Ok(None);
                }
            }
        }
        Ok(Some(levels))
    }
}

fn read_group_attributes(store: &Arc<FilesystemStore>, path: &str) -> Result<GroupAttributes> {
    let group = Group::open(store.clone(), path)?;
    let attributes =
        serde_json::from_value(serde_json::Value::Object(group.attributes().clone()))?;
    Ok(attributes)
}

/// Build the typed axes of a node, locating the channel axis and collapsing
/// mixed spatial units to the sentinel.
///
/// More than one channel axis has no defined layer mapping and is rejected.
fn node_axes(
    multiscale: &Multiscale,
    warnings: &mut Vec<String>,
) -> Result<(Vec<Axis>, Option<usize>)> {
    let mut channel_axes = multiscale
        .axes
        .iter()
        .enumerate()
        .filter(|(_, axis)| axis.axis_type.as_deref() == Some("channel"))
        .map(|(index, _)| index);
    let channel_axis = channel_axes.next();
    if channel_axes.next().is_some() {
        return Err(Error::general(
            "found more than one channel axis; at most one is supported",
        ));
    }

    let mut axes: Vec<Axis> = multiscale
        .axes
        .iter()
        .filter_map(|axis| axis.to_axis())
        .collect();

    let space_units: std::collections::BTreeSet<String> = axes
        .iter()
        .filter(|axis| matches!(axis, Axis::Space(_)))
        .filter_map(|axis| axis.unit_name())
        .collect();
    if space_units.len() > 1 {
        let warning =
            format!("found mixed spatial units: {space_units:?}; using none for all instead");
        log::warn!("{warning}");
        warnings.push(warning);
        for axis in &mut axes {
            if let Axis::Space(space) = axis {
                space.unit = SpaceUnits::None;
            }
        }
    }

    Ok((axes, channel_axis))
}

/// The level-0 scale and translation of a node, if present.
fn node_transforms(multiscale: &Multiscale) -> (Option<Vec<f64>>, Option<Vec<f64>>) {
    let mut scale = None;
    let mut translate = None;
    if let Some(dataset) = multiscale.datasets.first() {
        for transform in &dataset.coordinate_transformations {
            match transform {
                CoordinateTransformation::Scale { scale: vector } if scale.is_none() => {
                    scale = Some(vector.clone());
                }
                CoordinateTransformation::Translation {
                    translation: vector,
                } if translate.is_none() => {
                    translate = Some(vector.clone());
                }
                _ => {}
            }
        }
    }
    (scale, translate)
}

/// Drop the channel component from a transform vector. The channel dimension
/// has no spatial or temporal scale.
fn remove_component(vector: &mut Vec<f64>, index: usize) {
    if index < vector.len() {
        vector.remove(index);
    }
}

fn apply_omero_channel(attributes: &mut LayerAttributes, channel: Option<&OmeroChannel>) {
    let Some(channel) = channel else {
        return;
    };
    if let Some(label) = &channel.label {
        attributes.name = Some(label.clone());
    }
    attributes.visible = channel.active;
    attributes.colormap = channel.color.clone();
    if let Some(window) = &channel.window {
        if let (Some(start), Some(end)) = (window.start, window.end) {
            attributes.contrast_limits = Some((start, end));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngff::AxisMeta;
    use crate::units::{AxisType, TimeUnits};

    fn axis_meta(name: &str, axis_type: &str, unit: Option<&str>) -> AxisMeta {
        AxisMeta {
            name: name.to_string(),
            axis_type: Some(axis_type.to_string()),
            unit: unit.map(str::to_string),
        }
    }

    fn multiscale(axes: Vec<AxisMeta>, transforms: Vec<CoordinateTransformation>) -> Multiscale {
        Multiscale {
            version: Some("0.4".to_string()),
            name: Some("img".to_string()),
            axes,
            datasets: vec![crate::ngff::Dataset {
                path: "0".to_string(),
                coordinate_transformations: transforms,
            }],
        }
    }

    #[test]
    fn axes_map_by_type_and_channel_is_consumed() {
        let multiscale = multiscale(
            vec![
                axis_meta("t", "time", Some("second")),
                axis_meta("c", "channel", None),
                axis_meta("y", "space", Some("meter")),
                axis_meta("x", "space", Some("meter")),
            ],
            vec![],
        );
        let mut warnings = Vec::new();
        let (axes, channel_axis) = node_axes(&multiscale, &mut warnings).unwrap();
        assert_eq!(channel_axis, Some(1));
        assert_eq!(
            axes,
            vec![
                Axis::time("t", TimeUnits::Second),
                Axis::space("y", SpaceUnits::Meter),
                Axis::space("x", SpaceUnits::Meter),
            ]
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn mixed_space_units_collapse_with_one_warning() {
        let multiscale = multiscale(
            vec![
                axis_meta("y", "space", Some("millimeter")),
                axis_meta("x", "space", Some("meter")),
            ],
            vec![],
        );
        let mut warnings = Vec::new();
        let (axes, _) = node_axes(&multiscale, &mut warnings).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("mixed spatial units"));
        for axis in &axes {
            assert_eq!(axis.unit_name().as_deref(), Some("none"));
        }
    }

    #[test]
    fn time_units_do_not_trigger_the_space_sanitizer() {
        let multiscale = multiscale(
            vec![
                axis_meta("t", "time", Some("second")),
                axis_meta("y", "space", Some("meter")),
                axis_meta("x", "space", Some("meter")),
            ],
            vec![],
        );
        let mut warnings = Vec::new();
        let (axes, _) = node_axes(&multiscale, &mut warnings).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(axes[0].axis_type(), AxisType::Time);
    }

    #[test]
    fn multiple_channel_axes_are_rejected() {
        let multiscale = multiscale(
            vec![
                axis_meta("c0", "channel", None),
                axis_meta("c1", "channel", None),
                axis_meta("x", "space", None),
            ],
            vec![],
        );
        let err = node_axes(&multiscale, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("more than one channel axis"));
    }

    #[test]
    fn transforms_take_the_first_scale_and_translation() {
        let multiscale = multiscale(
            vec![
                axis_meta("y", "space", None),
                axis_meta("x", "space", None),
            ],
            vec![
                CoordinateTransformation::Scale {
                    scale: vec![2.0, 3.0],
                },
                CoordinateTransformation::Translation {
                    translation: vec![-1.0, 1.0],
                },
                CoordinateTransformation::Scale {
                    scale: vec![9.0, 9.0],
                },
            ],
        );
        let (scale, translate) = node_transforms(&multiscale);
        assert_eq!(scale, Some(vec![2.0, 3.0]));
        assert_eq!(translate, Some(vec![-1.0, 1.0]));
    }

    #[test]
    fn channel_component_is_removed_from_transforms() {
        let mut scale = vec![1.0, 2.0, 3.0];
        remove_component(&mut scale, 0);
        assert_eq!(scale, vec![2.0, 3.0]);
        // out of range is a no-op
        remove_component(&mut scale, 5);
        assert_eq!(scale, vec![2.0, 3.0]);
    }
}
