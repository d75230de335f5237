use async_trait::async_trait;

use crate::captcha::CaptchaProof;

/// The CAPTCHA widget as seen by the submission flow.
#[async_trait]
pub trait CaptchaPort: Send + Sync {
    /// Current proof, or `None` when the challenge is unsolved or expired.
    async fn current_proof(&self) -> Option<CaptchaProof>;

    /// Forget the proof so the next application needs a new challenge.
    async fn reset(&self);
}
