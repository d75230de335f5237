//! Final step form state.
//!
//! The in-memory copy of `restOfData` is a read-through, write-through cache
//! of the fragment cache and the attachment store. Every mutation is
//! persisted before the method returns, and every failure lands in the
//! field-error map instead of escaping.

use std::collections::BTreeMap;
use std::sync::Arc;

use ca_core::attachment::{
    AttachmentFile, AttachmentMeta, AttachmentPolicy, AttachmentSlot, RejectionReason,
};
use ca_core::declaration::{Declaration, DeclarationState};
use ca_core::fragment::{Fragment, FragmentKey, RestOfData};
use ca_core::ports::{AttachmentStorePort, CaptchaPort, FragmentCachePort, StorageError};
use ca_core::submission::{CompletenessGate, GateReport};
use tokio::sync::Mutex;
use tracing::{debug, info, info_span, warn, Instrument};

use super::field::{
    FieldKey, FAILED_TO_PERSIST_MESSAGE, FAILED_TO_REMOVE_MESSAGE, FAILED_TO_SAVE_MESSAGE,
    REQUIRED_MESSAGE,
};

#[derive(Debug, thiserror::Error)]
pub enum AttachError {
    #[error("{slot}: {reason}")]
    Rejected {
        slot: AttachmentSlot,
        reason: RejectionReason,
    },

    #[error("{slot}: attachment store failed: {source}")]
    Storage {
        slot: AttachmentSlot,
        #[source]
        source: StorageError,
    },
}

/// Point-in-time view for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalStepSnapshot {
    pub rest_of_data: RestOfData,
    pub field_errors: BTreeMap<FieldKey, String>,
    pub gate: GateReport,
}

#[derive(Debug, Default)]
struct FormState {
    rest: RestOfData,
    errors: BTreeMap<FieldKey, String>,
}

pub struct FinalStepForm {
    attachment_store: Arc<dyn AttachmentStorePort>,
    fragment_cache: Arc<dyn FragmentCachePort>,
    captcha: Arc<dyn CaptchaPort>,
    policy: AttachmentPolicy,
    gate: CompletenessGate,
    state: Mutex<FormState>,
}

impl FinalStepForm {
    pub fn new(
        attachment_store: Arc<dyn AttachmentStorePort>,
        fragment_cache: Arc<dyn FragmentCachePort>,
        captcha: Arc<dyn CaptchaPort>,
        policy: AttachmentPolicy,
        gate: CompletenessGate,
    ) -> Self {
        Self {
            attachment_store,
            fragment_cache,
            captcha,
            policy,
            gate,
            state: Mutex::new(FormState::default()),
        }
    }

    pub fn gate(&self) -> &CompletenessGate {
        &self.gate
    }

    /// Rebuilds the form from both stores.
    ///
    /// The file mirror is replaced by metadata of the binaries actually held
    /// in the attachment store; an unreadable slot counts as empty. When the
    /// reconciled mirror differs from the cached one it is written back.
    pub async fn rehydrate(&self) -> FinalStepSnapshot {
        let span = info_span!("usecase.final_step.rehydrate");

        async {
            let cached = self.load_rest_of_data().await;
            let mut rest = cached.clone();

            for slot in AttachmentSlot::ALL {
                let meta = match self.attachment_store.get(slot).await {
                    Ok(file) => file.map(|f| f.meta()),
                    Err(err) => {
                        warn!(%slot, error = %err, "attachment unreadable; treating slot as empty");
                        None
                    }
                };
                if cached.files.get(slot) != meta.as_ref() {
                    debug!(%slot, present = meta.is_some(), "file mirror corrected from store");
                }
                rest.files.set(slot, meta);
            }

            if rest != cached {
                if let Err(err) = self.persist(&rest).await {
                    warn!(error = %err, "failed to write back reconciled restOfData");
                }
            }

            {
                let mut state = self.state.lock().await;
                state.rest = rest;
                state.errors.clear();
            }

            let snapshot = self.snapshot().await;
            info!(
                present = ?snapshot.rest_of_data.files.present_slots(),
                complete = snapshot.gate.is_complete(),
                "final step rehydrated"
            );
            snapshot
        }
        .instrument(span)
        .await
    }

    /// Validates and stores a document for `slot`.
    ///
    /// On rejection only this slot's message changes. On storage failure the
    /// slot's mirror entry is re-read from the store, so it shows whatever
    /// document survived the failed write.
    pub async fn attach(
        &self,
        slot: AttachmentSlot,
        file: AttachmentFile,
    ) -> Result<AttachmentMeta, AttachError> {
        let span = info_span!(
            "usecase.final_step.attach",
            slot = %slot,
            size = file.size(),
            mime = %file.mime
        );

        async {
            if let Err(reason) = self.policy.validate(&file, slot) {
                info!(%reason, "attachment rejected");
                self.set_error(FieldKey::Slot(slot), reason.to_string()).await;
                return Err(AttachError::Rejected { slot, reason });
            }

            if let Err(source) = self.attachment_store.put(slot, &file).await {
                warn!(error = %source, "attachment store write failed");
                self.set_error(FieldKey::Slot(slot), FAILED_TO_SAVE_MESSAGE.to_string())
                    .await;
                self.resync_slot(slot).await;
                return Err(AttachError::Storage { slot, source });
            }

            let meta = file.meta();
            let rest = {
                let mut state = self.state.lock().await;
                state.rest.files.set(slot, Some(meta.clone()));
                state.errors.remove(&FieldKey::Slot(slot));
                state.rest.clone()
            };
            if let Err(err) = self.persist(&rest).await {
                // The binary is stored; only the display mirror is stale and
                // the next rehydrate rebuilds it.
                warn!(error = %err, "failed to persist file mirror");
            }

            info!("attachment stored");
            Ok(meta)
        }
        .instrument(span)
        .await
    }

    /// Deletes the slot's document and its mirror entry.
    pub async fn remove(&self, slot: AttachmentSlot) -> Result<(), AttachError> {
        let span = info_span!("usecase.final_step.remove", slot = %slot);

        async {
            if let Err(source) = self.attachment_store.delete(slot).await {
                warn!(error = %source, "attachment store delete failed");
                self.set_error(FieldKey::Slot(slot), FAILED_TO_REMOVE_MESSAGE.to_string())
                    .await;
                return Err(AttachError::Storage { slot, source });
            }

            let rest = {
                let mut state = self.state.lock().await;
                state.rest.files.set(slot, None);
                state.errors.remove(&FieldKey::Slot(slot));
                state.rest.clone()
            };
            if let Err(err) = self.persist(&rest).await {
                warn!(error = %err, "failed to persist file mirror");
            }

            info!("attachment removed");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Sets one consent flag and writes `restOfData` through immediately.
    pub async fn set_declaration(&self, declaration: Declaration, accepted: bool) -> DeclarationState {
        let span = info_span!(
            "usecase.final_step.set_declaration",
            declaration = %declaration,
            accepted
        );

        async {
            let key = FieldKey::Declaration(declaration);
            let rest = {
                let mut state = self.state.lock().await;
                state.rest.declaration.set(declaration, accepted);
                if accepted {
                    state.errors.remove(&key);
                }
                state.rest.clone()
            };

            if let Err(err) = self.persist(&rest).await {
                warn!(error = %err, "failed to persist declaration");
                self.set_error(key, FAILED_TO_PERSIST_MESSAGE.to_string()).await;
            }

            rest.declaration
        }
        .instrument(span)
        .await
    }

    /// Recomputes the gate from the current form state and the live proof.
    pub async fn evaluate_gate(&self) -> GateReport {
        let (present, declaration) = {
            let state = self.state.lock().await;
            (state.rest.files.present_slots(), state.rest.declaration)
        };
        let proof_present = self.captcha.current_proof().await.is_some();
        self.gate.evaluate(present, &declaration, proof_present)
    }

    /// Marks every input the gate found missing with `Required`.
    pub async fn report_incomplete(&self, gate: &GateReport) {
        let mut state = self.state.lock().await;
        for slot in &gate.missing_slots {
            state
                .errors
                .insert(FieldKey::Slot(*slot), REQUIRED_MESSAGE.to_string());
        }
        for declaration in &gate.missing_declarations {
            state
                .errors
                .insert(FieldKey::Declaration(*declaration), REQUIRED_MESSAGE.to_string());
        }
        if gate.proof_missing {
            state.errors.insert(FieldKey::Captcha, REQUIRED_MESSAGE.to_string());
        }
    }

    pub async fn clear_error(&self, field: FieldKey) {
        self.state.lock().await.errors.remove(&field);
    }

    /// Forgets in-memory state after the stores were cleared elsewhere.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        *state = FormState::default();
    }

    pub async fn snapshot(&self) -> FinalStepSnapshot {
        let gate = self.evaluate_gate().await;
        let state = self.state.lock().await;
        FinalStepSnapshot {
            rest_of_data: state.rest.clone(),
            field_errors: state.errors.clone(),
            gate,
        }
    }

    /// Aligns one mirror entry with the store. Left untouched if the store
    /// cannot be read either.
    async fn resync_slot(&self, slot: AttachmentSlot) {
        let meta = match self.attachment_store.get(slot).await {
            Ok(file) => file.map(|f| f.meta()),
            Err(err) => {
                debug!(%slot, error = %err, "slot unreadable after failed write; mirror kept");
                return;
            }
        };

        let changed = {
            let mut state = self.state.lock().await;
            if state.rest.files.get(slot) == meta.as_ref() {
                None
            } else {
                state.rest.files.set(slot, meta);
                Some(state.rest.clone())
            }
        };
        if let Some(rest) = changed {
            debug!(%slot, "file mirror corrected after failed write");
            if let Err(err) = self.persist(&rest).await {
                warn!(error = %err, "failed to persist file mirror");
            }
        }
    }

    async fn set_error(&self, field: FieldKey, message: String) {
        self.state.lock().await.errors.insert(field, message);
    }

    async fn load_rest_of_data(&self) -> RestOfData {
        let raw = match self.fragment_cache.read(FragmentKey::RestOfData).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "fragment cache unreadable; starting final step empty");
                return RestOfData::default();
            }
        };

        match raw.map(|raw| Fragment::parse(FragmentKey::RestOfData, &raw)) {
            Some(Ok(Fragment::RestOfData(rest))) => rest,
            Some(Ok(_)) | None => RestOfData::default(),
            Some(Err(err)) => {
                warn!(error = %err, "cached restOfData is malformed; starting final step empty");
                RestOfData::default()
            }
        }
    }

    async fn persist(&self, rest: &RestOfData) -> Result<(), StorageError> {
        let serialized = Fragment::RestOfData(rest.clone())
            .to_json()
            .map_err(|err| StorageError::Corrupt(err.to_string()))?;
        self.fragment_cache
            .write(FragmentKey::RestOfData, serialized)
            .await
    }
}
