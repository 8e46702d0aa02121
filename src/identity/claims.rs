//! Claims carried by a verified access token.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::error::IdentityError;

/// Roles granted to the user for one client.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClientAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// User claims decoded from a token.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct UserClaims {
    #[serde(default)]
    pub preferred_username: Option<String>,

    /// Per-client role assignments (`resource_access` in Keycloak tokens).
    #[serde(default)]
    pub resource_access: HashMap<String, ClientAccess>,

    /// Every other claim, kept as is.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl UserClaims {
    /// Claims used when authentication is disabled.
    pub fn anonymous(client_id: &str) -> Self {
        let mut resource_access = HashMap::new();
        resource_access.insert(
            client_id.to_string(),
            ClientAccess {
                roles: vec!["read".to_string()],
            },
        );
        let mut extra = HashMap::new();
        extra.insert("given_name".to_string(), Value::from("anonymous"));

        Self {
            preferred_username: None,
            resource_access,
            extra,
        }
    }

    /// Roles granted for `client_id` (empty when the client is unknown).
    pub fn roles(&self, client_id: &str) -> &[String] {
        self.resource_access
            .get(client_id)
            .map(|access| access.roles.as_slice())
            .unwrap_or(&[])
    }

    /// Whether the user holds the expected roles for `client_id`.
    ///
    /// An empty `expected` list always passes. Otherwise one matching role is
    /// enough, unless `require_all` is set.
    pub fn has_roles(&self, expected: &[&str], client_id: &str, require_all: bool) -> bool {
        if expected.is_empty() {
            return true;
        }
        let roles = self.roles(client_id);
        let held = |role: &&str| roles.iter().any(|r| r == role);
        if require_all {
            expected.iter().all(held)
        } else {
            expected.iter().any(held)
        }
    }

    /// Like [`has_roles`](Self::has_roles) but fails with `NotAllowed`.
    pub fn check_roles(
        &self,
        expected: &[&str],
        client_id: &str,
        require_all: bool,
    ) -> Result<(), IdentityError> {
        if self.has_roles(expected, client_id, require_all) {
            Ok(())
        } else {
            Err(IdentityError::NotAllowed(
                "User does not have required permissions".to_string(),
            ))
        }
    }
}
