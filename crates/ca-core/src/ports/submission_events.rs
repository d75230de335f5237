use async_trait::async_trait;

use crate::ids::SubmissionId;
use crate::submission::SubmissionState;

/// Outbound notifications for whatever renders the confirm dialog.
#[async_trait]
pub trait SubmissionEventPort: Send + Sync {
    async fn emit_state_changed(&self, state: &SubmissionState, submission_id: Option<&SubmissionId>);
}
