//! Identifier newtypes shared by every billing crate.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! uuid_id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh identifier.
            ///
            /// UUIDv7, so ids minted later sort later. Tests that need a
            /// fixed id should build one `from` a known `Uuid` instead.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {e}", stringify!($name))))?;
                Ok(Self(uuid))
            }
        }
    };
}

uuid_id! {
    /// Tenant owning a contract, draft or event stream. Every store read
    /// and write is fenced by one of these.
    TenantId
}

uuid_id! {
    /// Identity of an aggregate root.
    AggregateId
}
