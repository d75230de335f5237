//! Explicit abandonment of the whole application.

use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use crate::usecases::final_step::FinalStepForm;
use crate::usecases::submission::{CleanupCoordinator, CleanupReport};

/// Clears every fragment and document and resets the CAPTCHA proof, the same
/// way a successful submission does.
pub struct DiscardApplication {
    cleanup: Arc<CleanupCoordinator>,
    form: Arc<FinalStepForm>,
}

impl DiscardApplication {
    pub fn new(cleanup: Arc<CleanupCoordinator>, form: Arc<FinalStepForm>) -> Self {
        Self { cleanup, form }
    }

    pub async fn execute(&self) -> CleanupReport {
        let span = info_span!("usecase.discard_application.execute");

        async {
            let report = self.cleanup.run().await;
            self.form.reset().await;
            info!(clean = report.is_clean(), "application discarded");
            report
        }
        .instrument(span)
        .await
    }
}
