use std::sync::Arc;

use tracing::{debug, info};
use training_core::model::{AttemptResult, Catalog, Learner, ModuleId};
use training_core::progression::{
    self, Completion, CompletionPolicy, ModuleStatus, ProgressSummary,
};

use crate::Clock;
use crate::error::ProgressServiceError;
use crate::session::SessionHolder;

/// Applies completion events to the signed-in learner's record.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    catalog: Arc<Catalog>,
    policy: CompletionPolicy,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<Catalog>) -> Self {
        Self {
            clock,
            catalog,
            policy: CompletionPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: CompletionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Status of every catalog module, in catalog order.
    #[must_use]
    pub fn module_statuses(&self, learner: &Learner) -> Vec<(ModuleId, ModuleStatus)> {
        self.catalog
            .modules()
            .iter()
            .map(|m| {
                let status = progression::module_status(learner.progress(), &self.catalog, m.id());
                (m.id().clone(), status)
            })
            .collect()
    }

    #[must_use]
    pub fn module_status(&self, learner: &Learner, module_id: &ModuleId) -> ModuleStatus {
        progression::module_status(learner.progress(), &self.catalog, module_id)
    }

    #[must_use]
    pub fn progress_percentage(&self, learner: &Learner) -> u8 {
        progression::progress_percentage(learner.progress(), &self.catalog)
    }

    #[must_use]
    pub fn summary(&self, learner: &Learner) -> ProgressSummary {
        ProgressSummary::new(learner.progress(), &self.catalog)
    }

    /// Apply an attempt to the current learner and store the updated record
    /// back in the session.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::NotSignedIn` without a current learner.
    /// Returns `ProgressServiceError::Progress` when the policy rejects the
    /// attempt; the session is left unchanged.
    pub fn complete_module(
        &self,
        session: &mut SessionHolder,
        module_id: &ModuleId,
        attempt: AttemptResult,
    ) -> Result<Completion, ProgressServiceError> {
        let learner = session
            .current_learner()
            .ok_or(ProgressServiceError::NotSignedIn)?;

        let completion = progression::try_complete_module(
            learner.progress(),
            &self.catalog,
            module_id,
            attempt,
            self.policy,
        )?;

        if completion.newly_completed {
            info!(
                learner = %learner.id(),
                module = %module_id,
                points = completion.points_delta,
                "module completed"
            );
        } else {
            debug!(
                learner = %learner.id(),
                module = %module_id,
                points_delta = completion.points_delta,
                "module attempt recorded"
            );
        }
        for badge in &completion.badges_awarded {
            info!(learner = %learner.id(), badge = %badge, "badge awarded");
        }
        for badge in &completion.badges_revoked {
            info!(learner = %learner.id(), badge = %badge, "badge revoked");
        }

        let updated = learner.clone().with_progress(completion.record.clone());
        session.set_learner(updated);
        Ok(completion)
    }

    /// Record a successful run through a module's content.
    ///
    /// The attempt count continues from the stored progress and the attempt is
    /// stamped with the service clock.
    ///
    /// # Errors
    ///
    /// Same as [`ProgressService::complete_module`].
    pub fn finish_module(
        &self,
        session: &mut SessionHolder,
        module_id: &ModuleId,
        points_earned: u32,
    ) -> Result<Completion, ProgressServiceError> {
        let previous_attempts = session
            .current_learner()
            .ok_or(ProgressServiceError::NotSignedIn)?
            .progress()
            .module(module_id)
            .map_or(0, |p| p.attempts);

        let attempt = AttemptResult::completed(
            previous_attempts.saturating_add(1),
            points_earned,
            self.clock.now(),
        );
        self.complete_module(session, module_id, attempt)
    }
}
