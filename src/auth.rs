use sha2::{Digest, Sha256};
use std::fmt;

/// An API key that has passed [`CredentialGate::verify`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short hex digest safe to put in logs and error bodies.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.0)
    }
}

// never print the raw key
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.fingerprint())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("API key missing")]
    MissingCredential,
    #[error("API key invalid")]
    InvalidCredential,
}

// first 8 bytes of sha256, hex encoded
pub fn fingerprint(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

/// Checks a presented key against the one configured secret.
pub struct CredentialGate {
    header_name: String,
    secret: String,
}

impl CredentialGate {
    pub fn new(header_name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            header_name: header_name.into(),
            secret: secret.into(),
        }
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Exact, case-sensitive comparison. No trimming or normalization.
    pub fn verify(&self, presented: Option<&str>) -> Result<Credential, AuthError> {
        let presented = presented.ok_or(AuthError::MissingCredential)?;
        if presented != self.secret {
            return Err(AuthError::InvalidCredential);
        }
        Ok(Credential(presented.to_string()))
    }

    /// Pulls the configured header out of a request and verifies it.
    /// A value that is not visible ASCII counts as present but wrong.
    pub fn verify_headers(&self, headers: &axum::http::HeaderMap) -> Result<Credential, AuthError> {
        match headers.get(self.header_name.as_str()) {
            None => self.verify(None),
            Some(value) => match value.to_str() {
                Ok(s) => self.verify(Some(s)),
                Err(_) => Err(AuthError::InvalidCredential),
            },
        }
    }
}
