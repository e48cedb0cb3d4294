//! Permission keys and result maps.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Opaque permission identifier, e.g. `"android.permission.CAMERA"`.
///
/// Equality is exact string equality; no normalisation is applied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for Permission {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for Permission {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&Permission> for Permission {
    fn from(key: &Permission) -> Self {
        key.clone()
    }
}

impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Per-permission outcome of a batch check or batch request.
pub type PermissionResults = BTreeMap<Permission, bool>;

/// Collapse duplicates, keeping first-occurrence order.
pub(crate) fn dedup<I, P>(permissions: I) -> Vec<Permission>
where
    I: IntoIterator<Item = P>,
    P: Into<Permission>,
{
    let mut seen: HashSet<Permission> = HashSet::new();
    permissions
        .into_iter()
        .map(|p| -> Permission { p.into() })
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
