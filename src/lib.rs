pub mod axis;
mod error;
pub mod layer;
pub mod model;
pub mod ngff;
pub mod pixel;
pub mod reader;
pub mod units;
pub mod writer;

pub use zarrs;

pub use axis::{Axis, ChannelAxis, SpaceAxis, TimeAxis};
pub use error::{Error, Result};
pub use layer::{coerce_extra_metadata, trailing_axis_labels, Layer, LayerAttributes};
pub use model::{ExtraMetadata, OriginalMetadata};
pub use pixel::{Pixel, Pyramid};
pub use reader::{LayerData, LayerKind, OmeZarrReader, ReadOutput};
pub use units::{AxisType, SpaceUnits, TimeUnits};
pub use writer::{multiscales_metadata, overwrite_metadata, write_image, OmeMetadata};
