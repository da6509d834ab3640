mod catalog;
mod department;
mod ids;
mod learner;
mod record;

pub use catalog::{BadgeDefinition, BadgeKind, Catalog, CatalogError, ModuleDefinition};
pub use department::DepartmentStats;
pub use ids::{BadgeId, LearnerId, ModuleId, ParseIdError};
pub use learner::{Learner, Role};
pub use record::{AttemptResult, LearnerRecord, ModuleProgress};
