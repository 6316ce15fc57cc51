//! The per-dimension axis model: a closed sum over space, time and channel.

use crate::units::{AxisType, SpaceUnits, TimeUnits};

/// A spatial axis with a physical unit, sentinel when unset.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceAxis {
    pub name: String,
    pub unit: SpaceUnits,
}

/// A temporal axis with a physical unit, sentinel when unset.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    pub name: String,
    pub unit: TimeUnits,
}

/// A channel axis. Channels are an enumeration, so carry no unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelAxis {
    pub name: String,
}

/// One dimension of an image layer.
///
/// Exactly one of the three shapes per axis; `axis_type` and `unit_name` are
/// the only cross-variant operations callers need.
#[derive(Debug, Clone, PartialEq)]
pub enum Axis {
    Space(SpaceAxis),
    Time(TimeAxis),
    Channel(ChannelAxis),
}

impl Axis {
    pub fn space(name: impl Into<String>, unit: SpaceUnits) -> Self {
        Self::Space(SpaceAxis {
            name: name.into(),
            unit,
        })
    }

    pub fn time(name: impl Into<String>, unit: TimeUnits) -> Self {
        Self::Time(TimeAxis {
            name: name.into(),
            unit,
        })
    }

    pub fn channel(name: impl Into<String>) -> Self {
        Self::Channel(ChannelAxis { name: name.into() })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Space(axis) => &axis.name,
            Self::Time(axis) => &axis.name,
            Self::Channel(axis) => &axis.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Self::Space(axis) => axis.name = name,
            Self::Time(axis) => axis.name = name,
            Self::Channel(axis) => axis.name = name,
        }
    }

    pub fn axis_type(&self) -> AxisType {
        match self {
            Self::Space(_) => AxisType::Space,
            Self::Time(_) => AxisType::Time,
            Self::Channel(_) => AxisType::Channel,
        }
    }

    /// The string form of the axis unit; `None` only for channel axes.
    pub fn unit_name(&self) -> Option<String> {
        match self {
            Self::Space(axis) => Some(axis.unit.to_string()),
            Self::Time(axis) => Some(axis.unit.to_string()),
            Self::Channel(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_dispatch_per_variant() {
        let axes = [
            Axis::space("y", SpaceUnits::Millimeter),
            Axis::time("t", TimeUnits::Second),
            Axis::channel("c"),
        ];
        assert_eq!(axes[0].axis_type(), AxisType::Space);
        assert_eq!(axes[1].axis_type(), AxisType::Time);
        assert_eq!(axes[2].axis_type(), AxisType::Channel);
        assert_eq!(axes[0].unit_name().as_deref(), Some("millimeter"));
        assert_eq!(axes[1].unit_name().as_deref(), Some("second"));
        assert_eq!(axes[2].unit_name(), None);
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(
            Axis::space("x", SpaceUnits::Meter),
            Axis::space("x", SpaceUnits::Meter)
        );
        assert_ne!(
            Axis::space("x", SpaceUnits::Meter),
            Axis::space("x", SpaceUnits::None)
        );
        assert_ne!(Axis::space("x", SpaceUnits::None), Axis::channel("x"));
    }

    #[test]
    fn set_name_renames_any_variant() {
        let mut axis = Axis::channel("c");
        axis.set_name("channels");
        assert_eq!(axis.name(), "channels");
    }
}
