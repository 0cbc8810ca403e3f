//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Markers are removed by batch, so both the marker and the interaction
//! batch that spawned it carry a strongly-typed ID. All IDs use UUID v7
//! (time-ordered).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Declares a UUID v7 newtype.
///
/// `Display` prints the prefix and the first eight hex digits
/// (`batch-0190a1b2`), which is what log fields want; the full value is
/// available through [`Uuid`] conversion and serde.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh, time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// The underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let simple = self.0.simple().to_string();
                write!(f, "{}-{}", $prefix, simple.get(..8).unwrap_or(&simple))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a single falling marker.
    MarkerId,
    "marker"
);

define_id!(
    /// Identifier shared by every marker spawned from one interaction.
    BatchId,
    "batch"
);
