use std::collections::BTreeSet;

use crate::constants::PERMISSION_SEPARATOR;

/// Set of permission identifiers, either held by a principal or required by an endpoint.
///
/// Identifiers are opaque strings compared exactly (case-sensitive), e.g. `orders.read`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    /// Returns `true` when every permission in `required` is held.
    ///
    /// An empty `required` set is trivially satisfied.
    #[must_use]
    pub fn contains_all(&self, required: &PermissionSet) -> bool {
        required.0.is_subset(&self.0)
    }

    /// Returns `true` when at least one permission in `required` is held.
    ///
    /// An empty `required` set is never satisfied.
    #[must_use]
    pub fn contains_any(&self, required: &PermissionSet) -> bool {
        !self.0.is_disjoint(&required.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Parse the value of a permissions claim.
///
/// The value is a comma-separated list; entries are trimmed and empty entries dropped,
/// so `"a, b,,c"` yields `{a, b, c}`.
#[must_use]
pub fn parse_permission_claim(value: &str) -> PermissionSet {
    value
        .split(PERMISSION_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}
