use std::sync::Arc;

use storage::repository::LearnerRepository;
use tracing::{info, warn};
use training_core::model::Learner;

use crate::error::SignInError;

/// Owns "the current learner" for one sign-in.
///
/// The held record is the only copy that progress updates are written back
/// to; signing out drops it.
#[derive(Debug, Default)]
pub struct SessionHolder {
    learner: Option<Learner>,
}

impl SessionHolder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current_learner(&self) -> Option<&Learner> {
        self.learner.as_ref()
    }

    /// Replace the current learner and return the stored copy.
    pub fn set_learner(&mut self, learner: Learner) -> &Learner {
        self.learner.insert(learner)
    }

    /// Drop the current learner, returning it if one was signed in.
    pub fn sign_out(&mut self) -> Option<Learner> {
        let learner = self.learner.take();
        if let Some(l) = &learner {
            info!(learner = %l.id(), "signed out");
        }
        learner
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.learner.is_some()
    }
}

/// Looks up seeded learners and places them in a session.
#[derive(Clone)]
pub struct SignInService {
    learners: Arc<dyn LearnerRepository>,
}

impl SignInService {
    #[must_use]
    pub fn new(learners: Arc<dyn LearnerRepository>) -> Self {
        Self { learners }
    }

    /// Sign in by email. Any previously signed-in learner is replaced.
    ///
    /// # Errors
    ///
    /// Returns `SignInError::InvalidCredentials` when no learner matches.
    /// Returns `SignInError::Storage` if the directory cannot be read.
    pub async fn sign_in<'a>(
        &self,
        session: &'a mut SessionHolder,
        email: &str,
    ) -> Result<&'a Learner, SignInError> {
        let learner = match self.learners.find_by_email(email).await {
            Ok(learner) => learner,
            Err(err) => {
                warn!(%email, "sign-in failed");
                return Err(err.into());
            }
        };
        info!(learner = %learner.id(), role = ?learner.role(), "signed in");
        Ok(session.set_learner(learner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use storage::seed::default_catalog;

    fn service() -> SignInService {
        let catalog = default_catalog().unwrap();
        SignInService::new(Arc::new(InMemoryRepository::seeded(&catalog)))
    }

    #[tokio::test]
    async fn sign_in_places_learner_in_session() {
        let mut session = SessionHolder::new();
        let learner = service()
            .sign_in(&mut session, "admin@gennova.com")
            .await
            .unwrap();
        assert_eq!(learner.name(), "Admin User");
        assert!(session.is_signed_in());
    }

    #[tokio::test]
    async fn sign_in_replaces_previous_learner() {
        let svc = service();
        let mut session = SessionHolder::new();
        svc.sign_in(&mut session, "admin@gennova.com").await.unwrap();
        let learner = svc.sign_in(&mut session, "user@gennova.com").await.unwrap();

        assert_eq!(learner.email(), "user@gennova.com");
        assert_eq!(
            session.current_learner().map(Learner::email),
            Some("user@gennova.com")
        );
    }

    #[tokio::test]
    async fn unknown_email_is_invalid_credentials() {
        let mut session = SessionHolder::new();
        let err = service()
            .sign_in(&mut session, "ghost@gennova.com")
            .await
            .unwrap_err();
        assert!(matches!(err, SignInError::InvalidCredentials));
        assert_eq!(err.to_string(), "invalid email or password");
        assert!(!session.is_signed_in());
    }

    #[tokio::test]
    async fn sign_out_discards_the_record() {
        let svc = service();
        let mut session = SessionHolder::new();
        svc.sign_in(&mut session, "user@gennova.com").await.unwrap();

        let dropped = session.sign_out().unwrap();
        assert!(!session.is_signed_in());
        assert_eq!(dropped.email(), "user@gennova.com");
        assert!(session.current_learner().is_none());
        assert!(session.sign_out().is_none());
    }
}
