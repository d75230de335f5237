use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque proof token handed out by the CAPTCHA widget once the user passes
/// the challenge. Sent verbatim as the `recaptchaToken` part.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptchaProof(String);

impl CaptchaProof {
    /// Returns `None` for an empty token; the widget reports "no proof" that way.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CaptchaProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CaptchaProof({} chars)", self.0.len())
    }
}
