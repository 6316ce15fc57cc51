//! Closed vocabularies for axis semantics and physical units.
//!
//! The string form of every member is its lowercase name, matching the unit
//! strings used by OME-NGFF axis metadata. `from_name` is the reverse lookup
//! and returns `None` for unrecognized text rather than failing: foreign
//! stores legitimately contain units this crate does not model, and callers
//! substitute the `None` sentinel member in that case.

use std::fmt;

/// Semantic type of an image axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisType {
    Space,
    Time,
    Channel,
}

impl AxisType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "space" => Some(Self::Space),
            "time" => Some(Self::Time),
            "channel" => Some(Self::Channel),
            _ => None,
        }
    }

    pub fn names() -> Vec<String> {
        [Self::Space, Self::Time, Self::Channel]
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

impl fmt::Display for AxisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Space => "space",
            Self::Time => "time",
            Self::Channel => "channel",
        };
        f.write_str(name)
    }
}

macro_rules! unit_enum {
    ($(#[$attr:meta])* $name:ident { $($variant:ident => $string:literal),+ $(,)? }) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub enum $name {
            /// Unset sentinel, distinct from an absent unit.
            #[default]
            None,
            $($variant),+
        }

        impl $name {
            /// Reverse lookup from the string form; `None` if unrecognized.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    "none" => Some(Self::None),
                    $($string => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// The string form of every member, in declaration order.
            pub fn names() -> Vec<String> {
                [Self::None, $(Self::$variant),+]
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = match self {
                    Self::None => "none",
                    $(Self::$variant => $string,)+
                };
                f.write_str(name)
            }
        }
    };
}

unit_enum!(
    /// Supported units for a spatial axis.
    SpaceUnits {
        Nanometer => "nanometer",
        Micrometer => "micrometer",
        Millimeter => "millimeter",
        Centimeter => "centimeter",
        Meter => "meter",
    }
);

unit_enum!(
    /// Supported units for a time axis.
    TimeUnits {
        Nanosecond => "nanosecond",
        Microsecond => "microsecond",
        Millisecond => "millisecond",
        Second => "second",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_units_round_trip_every_member() {
        for name in SpaceUnits::names() {
            let unit = SpaceUnits::from_name(&name).expect("name should round-trip");
            assert_eq!(unit.to_string(), name);
        }
    }

    #[test]
    fn time_units_round_trip_every_member() {
        for name in TimeUnits::names() {
            let unit = TimeUnits::from_name(&name).expect("name should round-trip");
            assert_eq!(unit.to_string(), name);
        }
    }

    #[test]
    fn axis_type_round_trip_every_member() {
        for name in AxisType::names() {
            let ty = AxisType::from_name(&name).expect("name should round-trip");
            assert_eq!(ty.to_string(), name);
        }
    }

    #[test]
    fn from_name_rejects_unrecognized_text() {
        assert_eq!(SpaceUnits::from_name("parsec"), None);
        assert_eq!(SpaceUnits::from_name("Millimeter"), None);
        assert_eq!(TimeUnits::from_name("fortnight"), None);
        assert_eq!(AxisType::from_name(""), None);
    }

    #[test]
    fn default_is_the_sentinel() {
        assert_eq!(SpaceUnits::default(), SpaceUnits::None);
        assert_eq!(TimeUnits::default(), TimeUnits::None);
    }
}
