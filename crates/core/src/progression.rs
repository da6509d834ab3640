//! Training progression rules: prerequisite gating, badge awards and point
//! accounting over a [`LearnerRecord`].
//!
//! Every operation here is a pure function of its inputs. Writes return a new
//! record; the caller decides whether to keep it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AttemptResult, BadgeId, Catalog, LearnerRecord, ModuleId};
use crate::percent::rounded_percentage;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Failures raised by [`try_complete_module`] under [`CompletionPolicy::Strict`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("module {0} is not in the catalog")]
    UnknownModule(ModuleId),

    #[error("module {module} is locked until {missing:?} are completed")]
    PrerequisitesNotMet {
        module: ModuleId,
        missing: Vec<ModuleId>,
    },
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Locked,
    Available,
    Completed,
}

/// Resolve how a module should be presented to a learner.
///
/// A module is `Completed` if the record says so, `Locked` if it is not in the
/// catalog or any prerequisite is missing or incomplete, and `Available`
/// otherwise.
#[must_use]
pub fn module_status(
    record: &LearnerRecord,
    catalog: &Catalog,
    module_id: &ModuleId,
) -> ModuleStatus {
    if record.is_completed(module_id) {
        return ModuleStatus::Completed;
    }
    let Some(module) = catalog.module(module_id) else {
        return ModuleStatus::Locked;
    };
    if module.prerequisites().iter().all(|p| record.is_completed(p)) {
        ModuleStatus::Available
    } else {
        ModuleStatus::Locked
    }
}

/// Prerequisites of `module_id` that are not yet completed, in declared order.
///
/// Empty for unknown modules.
#[must_use]
pub fn missing_prerequisites(
    record: &LearnerRecord,
    catalog: &Catalog,
    module_id: &ModuleId,
) -> Vec<ModuleId> {
    catalog
        .module(module_id)
        .map(|m| {
            m.prerequisites()
                .iter()
                .filter(|p| !record.is_completed(p))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

//
// ─── COMPLETION ────────────────────────────────────────────────────────────────
//

/// Whether the write path re-checks what `module_status` already told the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Gating is the caller's job; unknown modules are accepted and earn no badge.
    #[default]
    Lenient,
    /// Unknown modules and locked modules are rejected.
    Strict,
}

/// Outcome of a completion event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub record: LearnerRecord,
    /// First transition of the module to completed.
    pub newly_completed: bool,
    /// A previously completed module was reported as not completed.
    pub completion_revoked: bool,
    pub badges_awarded: Vec<BadgeId>,
    pub badges_revoked: Vec<BadgeId>,
    pub points_delta: i64,
}

/// Apply an attempt result to a copy of `record` and return it.
///
/// Unknown module ids are accepted; they simply award no badge.
#[must_use]
pub fn complete_module(
    record: &LearnerRecord,
    catalog: &Catalog,
    module_id: &ModuleId,
    attempt: AttemptResult,
) -> Completion {
    apply_attempt(record, catalog, module_id, attempt)
}

/// Like [`complete_module`], but enforces `policy` first.
///
/// # Errors
///
/// Under [`CompletionPolicy::Strict`], returns `ProgressError::UnknownModule`
/// for ids outside the catalog and `ProgressError::PrerequisitesNotMet` when
/// the module is currently locked. The input record is never modified.
pub fn try_complete_module(
    record: &LearnerRecord,
    catalog: &Catalog,
    module_id: &ModuleId,
    attempt: AttemptResult,
    policy: CompletionPolicy,
) -> Result<Completion, ProgressError> {
    if policy == CompletionPolicy::Strict {
        if catalog.module(module_id).is_none() {
            return Err(ProgressError::UnknownModule(module_id.clone()));
        }
        if module_status(record, catalog, module_id) == ModuleStatus::Locked {
            return Err(ProgressError::PrerequisitesNotMet {
                module: module_id.clone(),
                missing: missing_prerequisites(record, catalog, module_id),
            });
        }
    }
    Ok(apply_attempt(record, catalog, module_id, attempt))
}

fn apply_attempt(
    record: &LearnerRecord,
    catalog: &Catalog,
    module_id: &ModuleId,
    attempt: AttemptResult,
) -> Completion {
    let previous = record.module(module_id);
    let was_completed = previous.is_some_and(|p| p.completed);
    let previous_points = previous.map_or(0, |p| p.points_earned);
    let now_completed = attempt.completed;
    let new_points = attempt.points_earned;

    let mut next = record.clone();
    next.modules.insert(module_id.clone(), attempt.into());

    let mut badges_awarded = Vec::new();
    let mut badges_revoked = Vec::new();
    let definition = catalog.module(module_id);

    if now_completed && !was_completed {
        next.total_modules_completed = next.total_modules_completed.saturating_add(1);
        if let Some(module) = definition {
            if next.badges.insert(module.badge_id().clone()) {
                badges_awarded.push(module.badge_id().clone());
            }
        }
        let certification = catalog.certification_badge();
        if next.all_completed(catalog) && next.badges.insert(certification.clone()) {
            badges_awarded.push(certification.clone());
        }
    } else if was_completed && !now_completed {
        next.total_modules_completed = next.total_modules_completed.saturating_sub(1);
        if let Some(module) = definition {
            if next.badges.remove(module.badge_id()) {
                badges_revoked.push(module.badge_id().clone());
            }
            let certification = catalog.certification_badge();
            if next.badges.remove(certification) {
                badges_revoked.push(certification.clone());
            }
        }
    }

    next.total_points =
        next.total_points.saturating_sub(u64::from(previous_points)) + u64::from(new_points);

    Completion {
        record: next,
        newly_completed: now_completed && !was_completed,
        completion_revoked: was_completed && !now_completed,
        badges_awarded,
        badges_revoked,
        points_delta: i64::from(new_points) - i64::from(previous_points),
    }
}

//
// ─── SUMMARIES ─────────────────────────────────────────────────────────────────
//

/// Share of the catalog the learner has completed, 0..=100.
///
/// An empty catalog yields 0.
#[must_use]
pub fn progress_percentage(record: &LearnerRecord, catalog: &Catalog) -> u8 {
    rounded_percentage(
        u64::from(record.total_modules_completed()),
        catalog.len() as u64,
    )
}

/// Headline numbers for a learner's stats card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub modules_completed: u32,
    pub module_count: usize,
    pub module_percentage: u8,
    pub points: u64,
    pub possible_points: u64,
    pub points_percentage: u8,
    pub badges_earned: usize,
    pub badge_count: usize,
    pub badge_percentage: u8,
}

impl ProgressSummary {
    #[must_use]
    pub fn new(record: &LearnerRecord, catalog: &Catalog) -> Self {
        let possible_points = catalog.total_points();
        let badge_count = catalog.badges().len();
        let badges_earned = catalog
            .badges()
            .iter()
            .filter(|b| record.has_badge(b.id()))
            .count();

        Self {
            modules_completed: record.total_modules_completed(),
            module_count: catalog.len(),
            module_percentage: progress_percentage(record, catalog),
            points: record.total_points(),
            possible_points,
            points_percentage: rounded_percentage(record.total_points(), possible_points),
            badges_earned,
            badge_count,
            badge_percentage: rounded_percentage(badges_earned as u64, badge_count as u64),
        }
    }
}

/// One completed module on the learner's progress chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub module_id: ModuleId,
    pub title: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub points: u32,
}

/// Completed modules ordered by completion time; undated entries sort last.
#[must_use]
pub fn completion_timeline(record: &LearnerRecord, catalog: &Catalog) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = record
        .modules()
        .iter()
        .filter(|(_, p)| p.completed)
        .map(|(id, p)| TimelineEntry {
            module_id: id.clone(),
            title: catalog
                .module(id)
                .map_or_else(|| id.to_string(), |m| m.title().to_owned()),
            completed_at: p.last_attempt_at,
            points: p.points_earned,
        })
        .collect();
    entries.sort_by_key(|e| (e.completed_at.is_none(), e.completed_at));
    entries
}

/// Coarse training status used on the admin progress table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingState {
    NotStarted,
    InProgress,
    Completed,
}

impl TrainingState {
    #[must_use]
    pub fn of(record: &LearnerRecord, catalog: &Catalog) -> Self {
        if !catalog.is_empty() && record.all_completed(catalog) {
            return Self::Completed;
        }
        let started = record
            .modules()
            .values()
            .any(|p| p.completed || p.attempts > 0);
        if started {
            Self::InProgress
        } else {
            Self::NotStarted
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
