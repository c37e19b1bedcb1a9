/// Constraints a principal must satisfy to reach a route.
///
/// Every named policy must pass. If `roles` is non-empty the principal must also
/// hold at least one of them. With both lists empty only authentication is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequirement {
    pub policies: Vec<String>,
    pub roles: Vec<String>,
}

impl AccessRequirement {
    #[must_use]
    pub fn new(policies: Vec<String>, roles: Vec<String>) -> Self {
        Self { policies, roles }
    }

    /// Requirement that only asks for an authenticated principal
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }
}

/// Route-level authorization requirement attached to a binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequirement {
    /// No constraint at all; authorization is globally disabled.
    Unconstrained,
    /// Route is explicitly public. A valid token, if present, still yields a principal.
    Anonymous,
    /// Authentication required plus the given policy and role constraints.
    Authorized(AccessRequirement),
}

impl AuthRequirement {
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    #[must_use]
    pub fn access(&self) -> Option<&AccessRequirement> {
        match self {
            Self::Authorized(access) => Some(access),
            Self::Unconstrained | Self::Anonymous => None,
        }
    }
}
