use routegate_security::{PERMISSIONS_CLAIM, Principal};
use serde::{Deserialize, Serialize};

/// Claim value that may be encoded as a single string or an array of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}

/// Bearer token payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - the `sub` claim. See <https://datatracker.ietf.org/doc/html/rfc7519#section-4.1.2>
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (seconds since epoch) - the `exp` claim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,

    /// Role names; a single string or an array
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    /// Permission identifiers; a comma-separated string or an array
    #[serde(
        rename = "Permissions",
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub permissions: Vec<String>,

    /// Additional provider-specific claims
    #[serde(flatten)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

impl TokenClaims {
    /// Convert into an authenticated principal.
    ///
    /// String-valued extra claims become principal claims of the same type.
    #[must_use]
    pub fn into_principal(self) -> Principal {
        let mut builder = Principal::builder();
        if let Some(sub) = &self.sub {
            builder = builder.subject(sub);
        }
        for role in &self.roles {
            builder = builder.add_role(role);
        }
        if !self.permissions.is_empty() {
            builder = builder.add_claim(PERMISSIONS_CLAIM, &self.permissions.join(","));
        }
        for (kind, value) in &self.extras {
            if let Some(value) = value.as_str() {
                builder = builder.add_claim(kind, value);
            }
        }
        builder.build()
    }
}
