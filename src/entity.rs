//! Entity identity and stable key derivation.
//!
//! A shielded entity is an application or a web domain, optionally
//! scoped to an activity category. Each entity gets a deterministic
//! string key used both as its open-counter key and as a config lookup
//! key, so the same token must always yield the same key across
//! process restarts.

use sha2::{Digest, Sha256};

/// Opaque platform token for an application, web domain, or category.
/// The engine never interprets the bytes; it only hashes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueToken(Vec<u8>);

impl OpaqueToken {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Deterministic one-way hash of a token, rendered as lowercase hex.
pub fn stable_hash(token: &OpaqueToken) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// The application or web domain being shielded.
#[derive(Debug, Clone)]
pub enum EntityIdentity {
    Application {
        bundle_id: Option<String>,
        display_name: Option<String>,
        token: Option<OpaqueToken>,
    },
    WebDomain {
        domain: Option<String>,
        token: Option<OpaqueToken>,
    },
}

impl EntityIdentity {
    /// Stable compound key: bundle id or lowercased domain when present,
    /// else the token hash, else `unknown`.
    pub fn stable_key(&self) -> String {
        match self {
            Self::Application {
                bundle_id, token, ..
            } => app_key(bundle_id.as_deref(), token.as_ref()),
            Self::WebDomain { domain, token } => domain_key(domain.as_deref(), token.as_ref()),
        }
    }

    pub fn hashed_token(&self) -> Option<String> {
        match self {
            Self::Application { token, .. } | Self::WebDomain { token, .. } => {
                token.as_ref().map(stable_hash)
            }
        }
    }

    /// Name shown to the user: the app's display name (bundle id as a
    /// last resort) or the domain string.
    pub fn display_name(&self) -> Option<String> {
        match self {
            Self::Application {
                display_name,
                bundle_id,
                ..
            } => display_name.clone().or_else(|| bundle_id.clone()),
            Self::WebDomain { domain, .. } => domain.clone(),
        }
    }

    pub fn bundle_id(&self) -> Option<&str> {
        match self {
            Self::Application { bundle_id, .. } => bundle_id.as_deref(),
            Self::WebDomain { .. } => None,
        }
    }

    /// Lowercased domain, the form used for `perDomain` lookups.
    pub fn lowercase_domain(&self) -> Option<String> {
        match self {
            Self::WebDomain { domain, .. } => domain.as_ref().map(|d| d.to_lowercase()),
            Self::Application { .. } => None,
        }
    }

    pub fn is_web_domain(&self) -> bool {
        matches!(self, Self::WebDomain { .. })
    }
}

/// Activity category an entity may be scoped to.
#[derive(Debug, Clone)]
pub struct ActivityCategory {
    pub token: Option<OpaqueToken>,
    pub display_name: Option<String>,
}

impl ActivityCategory {
    pub fn stable_key(&self) -> String {
        match &self.token {
            Some(token) => format!("category:{}", stable_hash(token)),
            None => "category:unknown".to_string(),
        }
    }

    pub fn hashed_token(&self) -> Option<String> {
        self.token.as_ref().map(stable_hash)
    }
}

pub fn app_key(bundle_id: Option<&str>, token: Option<&OpaqueToken>) -> String {
    match bundle_id.filter(|id| !id.is_empty()) {
        Some(id) => format!("app:{id}"),
        None => match token {
            Some(token) => format!("app:{}", stable_hash(token)),
            None => "app:unknown".to_string(),
        },
    }
}

pub fn domain_key(domain: Option<&str>, token: Option<&OpaqueToken>) -> String {
    match domain.filter(|d| !d.is_empty()) {
        Some(domain) => format!("domain:{}", domain.to_lowercase()),
        None => match token {
            Some(token) => format!("domain:{}", stable_hash(token)),
            None => "domain:unknown".to_string(),
        },
    }
}
