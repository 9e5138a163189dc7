use crate::models::TransactionDraft;
use crate::store::TransactionStore;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeResult {
    pub created: usize,
    pub failed: usize,
}

/// Persist drafts one by one, in order. A failed create is logged and
/// counted; it never stops the remaining drafts.
pub async fn materialize(
    store: &dyn TransactionStore,
    profile_id: &str,
    drafts: &[TransactionDraft],
) -> MaterializeResult {
    let mut result = MaterializeResult::default();

    for draft in drafts {
        match store.create(profile_id, draft).await {
            Ok(id) => {
                tracing::debug!(
                    transaction_id = %id,
                    template_id = draft.source_template_id.as_deref().unwrap_or(""),
                    date = %draft.date,
                    amount = %draft.amount,
                    "materialized recurring occurrence"
                );
                result.created += 1;
            }
            Err(err) => {
                tracing::error!(
                    profile_id,
                    template_id = draft.source_template_id.as_deref().unwrap_or(""),
                    description = %draft.description,
                    date = %draft.date,
                    amount = %draft.amount,
                    error = %err,
                    "failed to materialize recurring occurrence"
                );
                result.failed += 1;
            }
        }
    }

    result
}
