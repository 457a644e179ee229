//! Typed identifier newtypes backed by database row ids.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap an existing row id.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Access the inner row id.
            #[must_use]
            pub const fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a [`Company`](crate::company::Company).
    CompanyId
);

define_id!(
    /// Unique identifier for a [`Contract`](crate::company::Contract).
    ContractId
);

define_id!(
    /// Unique identifier for a [`Container`](crate::container::Container).
    ContainerId
);

define_id!(
    /// Unique identifier for a [`ContainerVisit`](crate::visit::ContainerVisit).
    VisitId
);

define_id!(
    /// Unique identifier for a [`ServiceType`](crate::catalog::ServiceType).
    ServiceTypeId
);

define_id!(
    /// Unique identifier for a [`TerminalService`](crate::catalog::TerminalService).
    ServiceId
);

define_id!(
    /// Unique identifier for a [`ContractService`](crate::catalog::ContractService).
    ContractServiceId
);

define_id!(
    /// Unique identifier for an [`AppliedService`](crate::visit::AppliedService).
    AppliedServiceId
);

define_id!(
    /// Unique identifier for an [`Attachment`](crate::visit::Attachment).
    AttachmentId
);
