//! Opaque pixel passthrough between `ndarray` buffers and zarr arrays.
//!
//! The crate never interprets pixel values; it only needs to know which zarr
//! data type a Rust element corresponds to when creating arrays, and how to
//! fill unwritten chunks.

use ndarray::ArrayD;
use zarrs::array::{DataType, Element, ElementOwned, FillValue};

/// An element type that can round-trip through a zarr array.
pub trait Pixel: Element + ElementOwned + Clone {
    /// The zarr data type for this element.
    fn data_type() -> DataType;
    /// The fill value for unwritten chunks.
    fn fill_value() -> FillValue;
}

macro_rules! impl_pixel {
    ($($t:ty => $data_type:expr),+ $(,)?) => {
        $(impl Pixel for $t {
            fn data_type() -> DataType {
                $data_type
            }

            fn fill_value() -> FillValue {
                FillValue::from(<$t>::default())
            }
        })+
    };
}

impl_pixel!(
    u8 => DataType::UInt8,
    u16 => DataType::UInt16,
    u32 => DataType::UInt32,
    u64 => DataType::UInt64,
    i8 => DataType::Int8,
    i16 => DataType::Int16,
    i32 => DataType::Int32,
    i64 => DataType::Int64,
    f32 => DataType::Float32,
    f64 => DataType::Float64,
);

/// Pixel data for one layer: a bare array, or an ordered list of resolution
/// levels with the highest resolution first.
#[derive(Debug, Clone, PartialEq)]
pub enum Pyramid<T> {
    Single(ArrayD<T>),
    Multiscale(Vec<ArrayD<T>>),
}

impl<T> Pyramid<T> {
    /// Wrap a list of levels, squeezing a trivial single-level pyramid.
    pub fn from_levels(mut levels: Vec<ArrayD<T>>) -> Self {
        if levels.len() == 1 {
            Self::Single(levels.remove(0))
        } else {
            Self::Multiscale(levels)
        }
    }

    pub fn levels(&self) -> &[ArrayD<T>] {
        match self {
            Self::Single(array) => std::slice::from_ref(array),
            Self::Multiscale(levels) => levels,
        }
    }

    pub fn num_levels(&self) -> usize {
        self.levels().len()
    }

    /// Dimensionality of the highest-resolution level.
    pub fn ndim(&self) -> usize {
        self.levels().first().map_or(0, |level| level.ndim())
    }

    /// Level shapes, highest resolution first.
    pub fn shapes(&self) -> Vec<Vec<u64>> {
        self.levels()
            .iter()
            .map(|level| level.shape().iter().map(|&s| s as u64).collect())
            .collect()
    }
}

impl<T> From<ArrayD<T>> for Pyramid<T> {
    fn from(array: ArrayD<T>) -> Self {
        Self::Single(array)
    }
}

impl<T> From<Vec<ArrayD<T>>> for Pyramid<T> {
    fn from(levels: Vec<ArrayD<T>>) -> Self {
        Self::from_levels(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_level_lists_are_squeezed() {
        let level = ArrayD::<u8>::zeros(vec![2, 3]);
        let pyramid = Pyramid::from_levels(vec![level.clone()]);
        assert!(matches!(pyramid, Pyramid::Single(_)));
        assert_eq!(pyramid.levels(), &[level]);
    }

    #[test]
    fn shapes_are_reported_per_level() {
        let pyramid = Pyramid::from_levels(vec![
            ArrayD::<u8>::zeros(vec![4, 6]),
            ArrayD::<u8>::zeros(vec![2, 3]),
        ]);
        assert_eq!(pyramid.num_levels(), 2);
        assert_eq!(pyramid.ndim(), 2);
        assert_eq!(pyramid.shapes(), vec![vec![4, 6], vec![2, 3]]);
    }
}
