//! Target descriptor: one remote host and the credentials to reach it.

use std::fmt;

use crate::error::{FirstmateError, Result};

const REDACTED: &str = "****";

/// Secrets shorter than this are left in log text; masking them would
/// mangle ordinary words.
pub const MIN_REDACT_LEN: usize = 4;

/// Percent-encode the characters that would end the userinfo part of a URL.
pub fn encode_userinfo(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            '@' => out.push_str("%40"),
            '/' => out.push_str("%2F"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            _ => out.push(ch),
        }
    }
    out
}

/// Immutable description of the host a run is executed against.
///
/// `secondary_user`/`secondary_secret` are the credentials used by
/// authenticated source-fetch steps (private git clones). They may be empty.
#[derive(Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    id: u32,
    fqdn: String,
    user: String,
    secret: String,
    secondary_user: String,
    secondary_secret: String,
}

impl TargetDescriptor {
    /// Create a descriptor with primary SSH credentials only.
    pub fn new(fqdn: impl Into<String>, user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: 1,
            fqdn: fqdn.into(),
            user: user.into(),
            secret: secret.into(),
            secondary_user: String::new(),
            secondary_secret: String::new(),
        }
    }

    /// Attach credentials for authenticated source fetches.
    pub fn with_secondary(mut self, user: impl Into<String>, secret: impl Into<String>) -> Self {
        self.secondary_user = user.into();
        self.secondary_secret = secret.into();
        self
    }

    /// Override the descriptor id.
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn fqdn(&self) -> &str {
        &self.fqdn
    }

    #[inline]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[inline]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    #[inline]
    pub fn secondary_user(&self) -> &str {
        &self.secondary_user
    }

    #[inline]
    pub fn secondary_secret(&self) -> &str {
        &self.secondary_secret
    }

    /// Returns true if secondary credentials were supplied.
    pub fn has_secondary(&self) -> bool {
        !self.secondary_user.is_empty() && !self.secondary_secret.is_empty()
    }

    /// Check that host, user and secret are present.
    ///
    /// The executor does not call this; callers validate before a run.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("host", &self.fqdn),
            ("user", &self.user),
            ("secret", &self.secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FirstmateError::validation(format!(
                "target is missing: {}",
                missing.join(", ")
            )))
        }
    }

    /// Mask every secret of this descriptor that occurs in `text`, both as
    /// written and in its URL-encoded form.
    pub fn redact(&self, text: &str) -> String {
        let mut needles: Vec<String> = Vec::new();
        for secret in [&self.secret, &self.secondary_secret] {
            if secret.chars().count() < MIN_REDACT_LEN {
                continue;
            }
            let encoded = encode_userinfo(secret);
            if encoded != *secret {
                needles.push(encoded);
            }
            needles.push(secret.clone());
        }
        // Longest first, so a short secret cannot break up a longer one.
        needles.sort_by_key(|needle| std::cmp::Reverse(needle.len()));

        let mut out = text.to_string();
        for needle in &needles {
            out = out.replace(needle.as_str(), REDACTED);
        }
        out
    }
}

impl fmt::Debug for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetDescriptor")
            .field("id", &self.id)
            .field("fqdn", &self.fqdn)
            .field("user", &self.user)
            .field("secret", &REDACTED)
            .field("secondary_user", &self.secondary_user)
            .field("secondary_secret", &REDACTED)
            .finish()
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.fqdn)
    }
}
