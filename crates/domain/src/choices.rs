//! Fixed enumerations (choices) shared by containers, visits and the service catalog.
//!
//! Every choice has a stable wire value (used in JSON and in the database)
//! and a human-readable label (the "display" value of list endpoints).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when a string is not one of the wire values of a choice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a valid choice.")]
pub struct UnknownChoice(pub String);

macro_rules! define_choice {
    (
        $(#[doc = $doc:expr])*
        $name:ident { $($variant:ident => ($value:literal, $label:literal)),+ $(,)? }
    ) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stable wire value.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }

            /// Human-readable label.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok(Self::$variant),)+
                    other => Err(UnknownChoice(other.to_owned())),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = String::deserialize(deserializer)?;
                value.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

define_choice!(
    /// ISO size category of a container.
    ContainerSize {
        Ft20 => ("20", "20ft"),
        Ft20HighCube => ("20HC", "20ft HC"),
        Ft40 => ("40", "40ft"),
        Ft40HighCube => ("40HC", "40ft HC"),
        Ft45 => ("45", "45ft"),
    }
);

define_choice!(
    /// Whether a container arrived empty or with cargo.
    ContainerState {
        Empty => ("empty", "Empty"),
        Loaded => ("loaded", "Loaded"),
    }
);

define_choice!(
    /// How a container arrives at or leaves the terminal.
    TransportType {
        Auto => ("auto", "Auto"),
        Wagon => ("wagon", "Wagon"),
    }
);

define_choice!(
    /// Billing unit of a service type.
    UnitOfMeasure {
        Container => ("container", "container"),
        Day => ("day", "day"),
        Operation => ("operation", "operation"),
        Unit => ("unit", "Unit"),
    }
);

define_choice!(
    /// Visit status filter used by the list endpoints.
    VisitStatus {
        InTerminal => ("in_terminal", "In terminal"),
        LeftTerminal => ("left_terminal", "Left terminal"),
        All => ("all", "All"),
    }
);

impl Default for VisitStatus {
    fn default() -> Self {
        Self::All
    }
}

impl ContainerState {
    /// Resolve a free-text spreadsheet value (Russian or English, any case).
    #[must_use]
    pub fn from_alias(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "порожний" | "empty" => Some(Self::Empty),
            "груженый" | "loaded" => Some(Self::Loaded),
            _ => None,
        }
    }
}

impl TransportType {
    /// Resolve a free-text spreadsheet value (Russian or English, any case).
    #[must_use]
    pub fn from_alias(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "авто" | "auto" => Some(Self::Auto),
            "вагон" | "wagon" => Some(Self::Wagon),
            _ => None,
        }
    }
}
