use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::catalog::{BadgeKind, Catalog};
use crate::model::ids::{BadgeId, ModuleId};

/// Per-learner, per-module progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub completed: bool,
    pub attempts: u32,
    pub points_earned: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

/// Payload handed over when a learner finishes a module's interactive content.
///
/// Only `completed` and `points_earned` drive the progression rules; the
/// other fields are stored as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub completed: bool,
    pub attempts: u32,
    pub points_earned: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl AttemptResult {
    /// A successful attempt stamped at `at`.
    #[must_use]
    pub fn completed(attempts: u32, points_earned: u32, at: DateTime<Utc>) -> Self {
        Self {
            completed: true,
            attempts,
            points_earned,
            last_attempt_at: Some(at),
        }
    }
}

impl From<AttemptResult> for ModuleProgress {
    fn from(attempt: AttemptResult) -> Self {
        Self {
            completed: attempt.completed,
            attempts: attempt.attempts,
            points_earned: attempt.points_earned,
            last_attempt_at: attempt.last_attempt_at,
        }
    }
}

/// A learner's training record for the duration of a sign-in.
///
/// Totals and badges are derived state; they are only changed by
/// [`crate::progression::complete_module`] or rebuilt by
/// [`LearnerRecord::from_modules`], so they always agree with `modules`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LearnerRecord {
    pub(crate) total_modules_completed: u32,
    pub(crate) total_points: u64,
    pub(crate) badges: BTreeSet<BadgeId>,
    pub(crate) modules: BTreeMap<ModuleId, ModuleProgress>,
}

impl LearnerRecord {
    /// A record with no progress at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rebuild a record from raw per-module progress.
    ///
    /// Totals are recomputed, module badges are granted for every completed
    /// catalog module, and the certification badge is granted when the whole
    /// catalog is complete. Special badges are carried over from `extra_badges`
    /// only when the catalog declares them as special.
    #[must_use]
    pub fn from_modules(
        modules: BTreeMap<ModuleId, ModuleProgress>,
        extra_badges: impl IntoIterator<Item = BadgeId>,
        catalog: &Catalog,
    ) -> Self {
        let total_modules_completed = modules.values().filter(|p| p.completed).count();
        let total_points = modules.values().map(|p| u64::from(p.points_earned)).sum();

        let mut badges: BTreeSet<BadgeId> = extra_badges
            .into_iter()
            .filter(|id| {
                catalog
                    .badge(id)
                    .is_some_and(|b| b.kind() == BadgeKind::Special)
            })
            .collect();
        for module in catalog.modules() {
            if modules.get(module.id()).is_some_and(|p| p.completed) {
                badges.insert(module.badge_id().clone());
            }
        }

        let mut record = Self {
            total_modules_completed: u32::try_from(total_modules_completed).unwrap_or(u32::MAX),
            total_points,
            badges,
            modules,
        };
        if record.all_completed(catalog) {
            record.badges.insert(catalog.certification_badge().clone());
        }
        record
    }

    #[must_use]
    pub fn total_modules_completed(&self) -> u32 {
        self.total_modules_completed
    }

    #[must_use]
    pub fn total_points(&self) -> u64 {
        self.total_points
    }

    #[must_use]
    pub fn badges(&self) -> &BTreeSet<BadgeId> {
        &self.badges
    }

    #[must_use]
    pub fn has_badge(&self, id: &BadgeId) -> bool {
        self.badges.contains(id)
    }

    #[must_use]
    pub fn modules(&self) -> &BTreeMap<ModuleId, ModuleProgress> {
        &self.modules
    }

    #[must_use]
    pub fn module(&self, id: &ModuleId) -> Option<&ModuleProgress> {
        self.modules.get(id)
    }

    #[must_use]
    pub fn is_completed(&self, id: &ModuleId) -> bool {
        self.modules.get(id).is_some_and(|p| p.completed)
    }

    /// True when every catalog module is completed. Vacuously true for an
    /// empty catalog.
    #[must_use]
    pub fn all_completed(&self, catalog: &Catalog) -> bool {
        catalog.modules().iter().all(|m| self.is_completed(m.id()))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BadgeDefinition, ModuleDefinition};
    use crate::time::fixed_now;

    fn catalog() -> Catalog {
        let modules = (1..=2)
            .map(|i| {
                ModuleDefinition::new(
                    ModuleId::new(format!("m{i}")),
                    format!("Module {i}"),
                    100,
                    BadgeId::new(format!("b{i}")),
                    Vec::new(),
                )
                .unwrap()
            })
            .collect();
        let badges = vec![
            BadgeDefinition::new(BadgeId::new("b1"), "B1", "", BadgeKind::Module),
            BadgeDefinition::new(BadgeId::new("b2"), "B2", "", BadgeKind::Module),
            BadgeDefinition::new(BadgeId::new("fast"), "Fast", "", BadgeKind::Special),
            BadgeDefinition::new(BadgeId::new("cert"), "Cert", "", BadgeKind::Certification),
        ];
        Catalog::new(modules, badges, BadgeId::new("cert")).unwrap()
    }

    fn done(points: u32) -> ModuleProgress {
        ModuleProgress {
            completed: true,
            attempts: 1,
            points_earned: points,
            last_attempt_at: Some(fixed_now()),
        }
    }

    #[test]
    fn from_modules_derives_totals_and_badges() {
        let mut modules = BTreeMap::new();
        modules.insert(ModuleId::new("m1"), done(95));
        modules.insert(ModuleId::new("m2"), ModuleProgress::default());

        let record = LearnerRecord::from_modules(
            modules,
            [BadgeId::new("module1-completion")],
            &catalog(),
        );

        assert_eq!(record.total_modules_completed(), 1);
        assert_eq!(record.total_points(), 95);
        assert_eq!(
            record.badges().iter().map(BadgeId::as_str).collect::<Vec<_>>(),
            vec!["b1"]
        );
    }

    #[test]
    fn from_modules_grants_certification_and_keeps_special_badges() {
        let mut modules = BTreeMap::new();
        modules.insert(ModuleId::new("m1"), done(100));
        modules.insert(ModuleId::new("m2"), done(100));

        let record = LearnerRecord::from_modules(modules, [BadgeId::new("fast")], &catalog());

        assert!(record.has_badge(&BadgeId::new("cert")));
        assert!(record.has_badge(&BadgeId::new("fast")));
        assert_eq!(record.total_points(), 200);
    }

    #[test]
    fn empty_record_has_nothing_completed() {
        let record = LearnerRecord::empty();
        assert!(!record.is_completed(&ModuleId::new("m1")));
        assert!(!record.all_completed(&catalog()));
        assert!(record.all_completed(&Catalog::empty(BadgeId::new("cert"))));
    }
}
