//! Credential issuance seam.
//!
//! User auto-provisioning (e.g. adding a roster member whose username does
//! not exist yet) needs an initial credential. Issuance policy is delegated
//! to a swappable collaborator instead of a hard-coded constant.

/// Supplies credentials for newly provisioned users.
pub trait CredentialIssuer: Send + Sync {
    /// Produce the default credential marker for a new account.
    fn issue_default(&self) -> String;
}

/// Issues a fixed marker taken from configuration.
pub struct StaticCredentialIssuer {
    marker: String,
}

impl StaticCredentialIssuer {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl CredentialIssuer for StaticCredentialIssuer {
    fn issue_default(&self) -> String {
        self.marker.clone()
    }
}
