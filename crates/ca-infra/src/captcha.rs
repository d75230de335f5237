use async_trait::async_trait;
use ca_core::ports::CaptchaPort;
use ca_core::CaptchaProof;
use tokio::sync::RwLock;
use tracing::debug;

/// Holds the proof most recently handed over by the CAPTCHA widget.
#[derive(Default)]
pub struct InMemoryCaptcha {
    proof: RwLock<Option<CaptchaProof>>,
}

impl InMemoryCaptcha {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` models an expired or unsolved challenge.
    pub async fn set_proof(&self, proof: Option<CaptchaProof>) {
        debug!(present = proof.is_some(), "captcha proof updated");
        *self.proof.write().await = proof;
    }
}

#[async_trait]
impl CaptchaPort for InMemoryCaptcha {
    async fn current_proof(&self) -> Option<CaptchaProof> {
        self.proof.read().await.clone()
    }

    async fn reset(&self) {
        *self.proof.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reset_forgets_the_proof() {
        let captcha = InMemoryCaptcha::new();
        captcha.set_proof(CaptchaProof::new("tok123")).await;
        assert_eq!(
            captcha.current_proof().await.map(|p| p.as_str().to_string()),
            Some("tok123".to_string())
        );

        captcha.reset().await;
        assert!(captcha.current_proof().await.is_none());
    }
}
