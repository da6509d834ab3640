use serde::{Deserialize, Serialize};

use crate::model::ids::LearnerId;
use crate::model::record::LearnerRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

/// A signed-in learner together with their training record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Learner {
    id: LearnerId,
    name: String,
    email: String,
    role: Role,
    department: String,
    progress: LearnerRecord,
}

impl Learner {
    #[must_use]
    pub fn new(
        id: LearnerId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        department: impl Into<String>,
        progress: LearnerRecord,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role,
            department: department.into(),
            progress,
        }
    }

    #[must_use]
    pub fn id(&self) -> &LearnerId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    #[must_use]
    pub fn department(&self) -> &str {
        &self.department
    }

    #[must_use]
    pub fn progress(&self) -> &LearnerRecord {
        &self.progress
    }

    /// Replace the training record, keeping identity fields.
    #[must_use]
    pub fn with_progress(mut self, progress: LearnerRecord) -> Self {
        self.progress = progress;
        self
    }
}
