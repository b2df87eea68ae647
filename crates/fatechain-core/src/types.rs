use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdError;

const OPERATION_PREFIX: &str = "op-";
const NAMESPACE_REGISTRY: &str = "!namespaces";

/// Identifier of one logical multi-step operation.
///
/// Assigned by the chain store when a chain is seeded and used as the tag on
/// every reservation the chain's steps take, so holds stay attributable after
/// a restart.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct OperationId(u64);

impl OperationId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for OperationId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{OPERATION_PREFIX}{:016x}", self.0)
    }
}

impl FromStr for OperationId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix(OPERATION_PREFIX).unwrap_or(s);
        if digits.is_empty() || digits.len() > 16 {
            return Err(IdError::InvalidOperationId(s.to_string()));
        }
        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| IdError::InvalidOperationId(s.to_string()))
    }
}

/// Identifier of a reservable resource, such as a namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The instance-wide namespace registry.
    ///
    /// Operations that rewrite the set of namespaces hold it exclusively;
    /// operations on a single namespace hold it shared.
    #[must_use]
    pub fn namespace_registry() -> Self {
        Self(NAMESPACE_REGISTRY.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockMode {
    Shared,
    Exclusive,
}

impl LockMode {
    #[must_use]
    pub fn is_exclusive(self) -> bool {
        matches!(self, Self::Exclusive)
    }
}

impl From<bool> for LockMode {
    /// `true` selects an exclusive (write) hold.
    fn from(exclusive: bool) -> Self {
        if exclusive {
            Self::Exclusive
        } else {
            Self::Shared
        }
    }
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Shared => "shared",
            Self::Exclusive => "exclusive",
        };
        write!(f, "{s}")
    }
}
