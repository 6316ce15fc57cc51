//! Writing a layer's pixel data and axis metadata as an OME-NGFF group.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use zarrs::array::ArrayBuilder;
use zarrs::filesystem::FilesystemStore;
use zarrs::group::{Group, GroupBuilder};

use crate::layer::LayerAttributes;
use crate::ngff::{AxisMeta, CoordinateTransformation, Dataset, GroupAttributes, Multiscale};
use crate::pixel::{Pixel, Pyramid};
use crate::{Error, Result};

const NGFF_VERSION: &str = "0.4";

/// Chunks are written whole per dimension, capped to keep them bounded.
const MAX_CHUNK_DIM: u64 = 256;

/// The OME multiscales metadata derived from a layer: a name, one axis
/// descriptor per dimension, and one transform list per resolution level.
#[derive(Debug, Clone, PartialEq)]
pub struct OmeMetadata {
    pub name: Option<String>,
    pub axes: Vec<AxisMeta>,
    pub transforms: Vec<Vec<CoordinateTransformation>>,
}

/// Derive OME axes and per-level coordinate transformations.
///
/// `shapes` are the level shapes, highest resolution first. The scale written
/// for level `i` is the elementwise downsampling ratio `shapes[0] / shapes[i]`
/// times the layer's base scale, so non-uniform pyramids are represented
/// exactly. The translation is defined in the base coordinate frame and is
/// identical across levels.
pub fn multiscales_metadata(
    shapes: &[Vec<u64>],
    attributes: &LayerAttributes,
) -> Result<OmeMetadata> {
    let Some(level_0) = shapes.first() else {
        return Err(Error::general("no resolution levels to write"));
    };
    let ndim = level_0.len();
    for shape in shapes {
        if shape.len() != ndim {
            return Err(Error::general(format!(
                "level shape {shape:?} does not match the layer's {ndim} dimensions"
            )));
        }
        if shape.contains(&0) {
            return Err(Error::general(format!(
                "level shape {shape:?} has a zero-sized dimension"
            )));
        }
    }

    let axes: Vec<AxisMeta> = match &attributes.extra {
        Some(extra) => extra.axes().iter().map(AxisMeta::from).collect(),
        // No axis metadata: space is the most sensible default, named by index.
        None => (0..ndim)
            .map(|i| AxisMeta {
                name: i.to_string(),
                axis_type: Some("space".to_string()),
                unit: None,
            })
            .collect(),
    };
    if axes.len() != ndim {
        return Err(Error::general(format!(
            "layer has {} axes for {}-dimensional data",
            axes.len(),
            ndim
        )));
    }

    let base_scale = match &attributes.scale {
        Some(scale) => scale.clone(),
        None => vec![1.0; ndim],
    };
    if base_scale.len() != ndim {
        return Err(Error::general(format!(
            "scale has {} components for {}-dimensional data",
            base_scale.len(),
            ndim
        )));
    }
    let base_translate = match &attributes.translate {
        Some(translate) => translate.clone(),
        None => vec![0.0; ndim],
    };
    if base_translate.len() != ndim {
        return Err(Error::general(format!(
            "translate has {} components for {}-dimensional data",
            base_translate.len(),
            ndim
        )));
    }

    let transforms = shapes
        .iter()
        .map(|shape| {
            let scale = level_0
                .iter()
                .zip(shape)
                .zip(&base_scale)
                .map(|((&full, &level), base)| (full as f64 / level as f64) * base)
                .collect();
            vec![
                CoordinateTransformation::Scale { scale },
                CoordinateTransformation::Translation {
                    translation: base_translate.clone(),
                },
            ]
        })
        .collect();

    Ok(OmeMetadata {
        name: attributes.name.clone(),
        axes,
        transforms,
    })
}

fn multiscale_attribute(metadata: &OmeMetadata) -> Multiscale {
    let datasets = metadata
        .transforms
        .iter()
        .enumerate()
        .map(|(level, transforms)| Dataset {
            path: level.to_string(),
            coordinate_transformations: transforms.clone(),
        })
        .collect();
    Multiscale {
        version: Some(NGFF_VERSION.to_string()),
        name: metadata.name.clone(),
        axes: metadata.axes.clone(),
        datasets,
    }
}

/// Write a layer as a fresh OME-NGFF multiscale image at `path`.
///
/// The directory must not already exist; this writer always creates a new
/// store and never appends. Returns the written paths (always one today).
pub fn write_image<T: Pixel>(
    path: impl AsRef<Path>,
    data: &Pyramid<T>,
    attributes: &LayerAttributes,
) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    std::fs::create_dir(path)?;

    let metadata = multiscales_metadata(&data.shapes(), attributes)?;
    let store = Arc::new(FilesystemStore::new(path).map_err(Error::wrap)?);

    let mut group = GroupBuilder::new().build(store.clone(), "/")?;
    group.attributes_mut().insert(
        "multiscales".to_string(),
        serde_json::to_value(vec![multiscale_attribute(&metadata)])?,
    );
    group.store_metadata()?;

    let dimension_names: Vec<String> = metadata.axes.iter().map(|axis| axis.name.clone()).collect();
    for (level, array_data) in data.levels().iter().enumerate() {
        let shape: Vec<u64> = array_data.shape().iter().map(|&s| s as u64).collect();
        let chunk_shape: Vec<u64> = shape.iter().map(|&s| s.min(MAX_CHUNK_DIM)).collect();
        let array = ArrayBuilder::new(
            shape.clone(),
            T::data_type(),
            chunk_shape.try_into().map_err(Error::wrap)?,
            T::fill_value(),
        )
        .dimension_names(Some(dimension_names.clone()))
        .build(store.clone(), &format!("/{level}"))?;
        array.store_metadata()?;
        array.store_array_subset_ndarray(&vec![0; shape.len()], array_data.clone())?;
        log::debug!("wrote level {level} with shape {shape:?}");
    }

    Ok(vec![path.to_path_buf()])
}

/// Rewrite only the multiscales metadata of an existing OME-NGFF store.
///
/// The layer must be structurally compatible with the store: the same number
/// of resolution levels and the same number of axes. A mismatch is an error;
/// silently overwriting a structurally different store would corrupt it.
pub fn overwrite_metadata<T: Pixel>(
    path: impl AsRef<Path>,
    data: &Pyramid<T>,
    attributes: &LayerAttributes,
) -> Result<()> {
    let store = Arc::new(FilesystemStore::new(path.as_ref()).map_err(Error::wrap)?);
    let mut group = Group::open(store, "/")?;
    let group_attributes: GroupAttributes =
        serde_json::from_value(serde_json::Value::Object(group.attributes().clone()))?;

    let mut multiscales = group_attributes
        .multiscales
        .filter(|multiscales| multiscales.len() == 1)
        .ok_or_else(|| Error::general("the store is not an ome-zarr multiscale image"))?;
    let multiscale = &mut multiscales[0];

    let metadata = multiscales_metadata(&data.shapes(), attributes)?;

    let num_levels_layer = metadata.transforms.len();
    let num_levels_zarr = multiscale.datasets.len();
    if num_levels_layer != num_levels_zarr {
        return Err(Error::general(format!(
            "the number of multiscale levels in the layer ({num_levels_layer}) \
             is different to that of the ome-zarr ({num_levels_zarr})"
        )));
    }
    let num_axes_layer = metadata.axes.len();
    let num_axes_zarr = multiscale.axes.len();
    if num_axes_layer != num_axes_zarr {
        return Err(Error::general(format!(
            "the number of axes in the layer ({num_axes_layer}) \
             is different to that of the ome-zarr ({num_axes_zarr})"
        )));
    }

    for (dataset, transforms) in multiscale.datasets.iter_mut().zip(&metadata.transforms) {
        dataset.coordinate_transformations = transforms.clone();
    }
    multiscale.axes = metadata.axes;
    multiscale.name = metadata.name;

    group
        .attributes_mut()
        .insert("multiscales".to_string(), serde_json::to_value(multiscales)?);
    group.store_metadata()?;
    Ok(())
}
