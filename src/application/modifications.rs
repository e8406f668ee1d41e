use super::engine::WorkflowEngine;
use crate::domain::actor::{Actor, Department, Role};
use crate::domain::modification::{ModificationId, ModificationRequest};
use crate::domain::request::RequestId;
use crate::error::{Result, WorkflowError};
use chrono::Utc;
use tracing::{debug, info, instrument};

impl WorkflowEngine {
    /// Kicks request `id` back to `target` for changes.
    #[instrument(skip(self, actor, reason, comments), fields(actor = %actor.id))]
    pub async fn request_modification(
        &self,
        id: RequestId,
        actor: &Actor,
        target: Department,
        reason: &str,
        comments: Option<String>,
    ) -> Result<ModificationRequest> {
        if !matches!(actor.role, Role::Finance | Role::Admin) {
            return Err(WorkflowError::Unauthorized(format!(
                "{} ({}) cannot request modifications",
                actor.id, actor.role
            )));
        }

        let _guard = self.write_lock().await;

        // The original must exist; its state is left alone.
        self.load_request(id).await?;
        let modification = ModificationRequest::new(
            self.stores.modifications.next_id().await?,
            id,
            target,
            reason,
            comments,
            actor.id.clone(),
            Utc::now(),
        )?;
        self.stores
            .modifications
            .store(modification.clone())
            .await?;

        info!(modification = modification.id, %target, "modification requested");
        Ok(modification)
    }

    /// Closes modification `id` and opens a new pending one addressed to
    /// `target`, carrying the reason along.
    ///
    /// Forwarding an already forwarded modification returns the record it was
    /// forwarded to; no second record is ever created.
    #[instrument(skip(self, actor, reason, comments), fields(actor = %actor.id))]
    pub async fn forward_modification(
        &self,
        id: ModificationId,
        actor: &Actor,
        target: Department,
        reason: &str,
        comments: Option<String>,
    ) -> Result<ModificationRequest> {
        let _guard = self.write_lock().await;

        let mut source = self.load_modification(id).await?;
        if !source.can_be_handled_by(actor) {
            return Err(WorkflowError::Unauthorized(format!(
                "{} ({}) cannot act on a modification addressed to {}",
                actor.id, actor.department, source.target_department
            )));
        }

        if source.is_completed() {
            return match source.forwarded_to {
                Some(forwarded) => {
                    debug!(forwarded, "modification already forwarded");
                    self.load_modification(forwarded).await
                }
                None => Err(WorkflowError::Validation(format!(
                    "modification {id} is already completed"
                ))),
            };
        }

        let at = Utc::now();
        let next_id = self.stores.modifications.next_id().await?;
        let next = source.forwarded(next_id, target, reason, comments, actor, at)?;
        source.complete(actor, at);
        source.forwarded_to = Some(next.id);

        self.stores.modifications.store(next.clone()).await?;
        self.stores.modifications.store(source).await?;

        info!(forwarded = next.id, %target, "modification forwarded");
        Ok(next)
    }

    /// Marks modification `id` as handled. Completing twice is a no-op.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn complete_modification(
        &self,
        id: ModificationId,
        actor: &Actor,
    ) -> Result<ModificationRequest> {
        let _guard = self.write_lock().await;

        let mut modification = self.load_modification(id).await?;
        if !modification.can_be_handled_by(actor) {
            return Err(WorkflowError::Unauthorized(format!(
                "{} ({}) cannot act on a modification addressed to {}",
                actor.id, actor.department, modification.target_department
            )));
        }

        if modification.complete(actor, Utc::now()) {
            self.stores
                .modifications
                .store(modification.clone())
                .await?;
            info!("modification completed");
        }
        Ok(modification)
    }

    pub async fn modification(&self, id: ModificationId) -> Result<ModificationRequest> {
        self.load_modification(id).await
    }

    async fn load_modification(&self, id: ModificationId) -> Result<ModificationRequest> {
        self.stores
            .modifications
            .get(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Modification", id))
    }
}
