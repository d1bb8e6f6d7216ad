use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(StationId);
id_newtype!(CollectionRequestId);

pub const NO_COLLECTION_REQUEST_LABEL: &str = "Nenhum";

/// Lifecycle of a request to empty a station.
///
/// The wire encoding is fixed by the collaborator server and is not sequential:
/// `Canceled = 0`, `Open = 1`, `Confirmed = 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CollectionStatus {
    Open,
    Confirmed,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown collection status wire value {0}")]
pub struct UnknownCollectionStatus(pub u8);

impl CollectionStatus {
    pub const fn wire_value(self) -> u8 {
        match self {
            Self::Canceled => 0,
            Self::Open => 1,
            Self::Confirmed => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Aberto",
            Self::Confirmed => "Confirmado",
            Self::Canceled => "Cancelado",
        }
    }
}

impl TryFrom<u8> for CollectionStatus {
    type Error = UnknownCollectionStatus;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Canceled),
            1 => Ok(Self::Open),
            2 => Ok(Self::Confirmed),
            other => Err(UnknownCollectionStatus(other)),
        }
    }
}

impl From<CollectionStatus> for u8 {
    fn from(value: CollectionStatus) -> Self {
        value.wire_value()
    }
}

impl fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
