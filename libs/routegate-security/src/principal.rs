use crate::constants::{PERMISSIONS_CLAIM, ROLE_CLAIM};
use crate::permission::{PermissionSet, parse_permission_claim};

/// A single `(type, value)` attribute carried by a principal.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Claim {
    pub kind: String,
    pub value: String,
}

impl Claim {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// `Principal` is the identity attached to a request, together with its claims
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Principal {
    subject: Option<String>,
    authenticated: bool,
    claims: Vec<Claim>,
}

impl Principal {
    /// Create a new `Principal` builder
    #[must_use]
    pub fn builder() -> PrincipalBuilder {
        PrincipalBuilder::default()
    }

    /// Create an anonymous principal with no subject and no claims
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    #[must_use]
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Value of the first claim of the given type, if any
    #[must_use]
    pub fn find_claim(&self, kind: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| c.value.as_str())
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.claims
            .iter()
            .filter(|c| c.kind == ROLE_CLAIM)
            .map(|c| c.value.as_str())
    }

    #[must_use]
    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles().any(|r| r == role)
    }

    /// Permissions read from the [`PERMISSIONS_CLAIM`]; a missing claim yields an empty set.
    #[must_use]
    pub fn permissions(&self) -> PermissionSet {
        self.find_claim(PERMISSIONS_CLAIM)
            .map(parse_permission_claim)
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct PrincipalBuilder {
    subject: Option<String>,
    claims: Vec<Claim>,
}

impl PrincipalBuilder {
    #[must_use]
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_owned());
        self
    }

    #[must_use]
    pub fn add_claim(mut self, kind: &str, value: &str) -> Self {
        self.claims.push(Claim::new(kind, value));
        self
    }

    #[must_use]
    pub fn add_role(self, role: &str) -> Self {
        self.add_claim(ROLE_CLAIM, role)
    }

    /// Set the permissions claim from a list of identifiers (joined with `,`)
    #[must_use]
    pub fn permissions<'a>(self, permissions: impl IntoIterator<Item = &'a str>) -> Self {
        let value = permissions.into_iter().collect::<Vec<_>>().join(",");
        self.add_claim(PERMISSIONS_CLAIM, &value)
    }

    /// Build an authenticated principal
    #[must_use]
    pub fn build(self) -> Principal {
        Principal {
            subject: self.subject,
            authenticated: true,
            claims: self.claims,
        }
    }
}
