use std::sync::Arc;

use serde::Serialize;
use storage::repository::{DepartmentRepository, LearnerRepository};
use training_core::model::{BadgeKind, Catalog, DepartmentStats, Learner, ModuleId, Role};
use training_core::progression::{
    self, ModuleStatus, ProgressSummary, TimelineEntry, TrainingState,
};

use crate::error::DashboardError;

/// A module tile on the learner dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleCard {
    pub module_id: ModuleId,
    pub title: String,
    pub required_minutes: u32,
    pub points: u32,
    pub status: ModuleStatus,
}

/// A badge on the achievements grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeTile {
    pub badge_id: String,
    pub title: String,
    pub kind: BadgeKind,
    pub earned: bool,
}

/// Everything the learner dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub learner_name: String,
    pub department: String,
    pub progress_percentage: u8,
    pub state: TrainingState,
    pub modules: Vec<ModuleCard>,
    pub summary: ProgressSummary,
    pub badges: Vec<BadgeTile>,
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentRow {
    pub department: String,
    pub total_employees: u32,
    pub completed: u32,
    pub in_progress: u32,
    pub not_started: u32,
    pub completion_rate: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LearnerRow {
    pub name: String,
    pub department: String,
    pub role: Role,
    pub progress_percentage: u8,
    pub points: u64,
    pub state: TrainingState,
}

/// Organisation-wide sums over every department row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverallStats {
    pub total_employees: u32,
    pub completed: u32,
    pub in_progress: u32,
    pub not_started: u32,
    pub completion_rate: u8,
}

impl OverallStats {
    #[must_use]
    pub fn from_departments(departments: &[DepartmentStats]) -> Self {
        let totals = departments
            .iter()
            .fold(DepartmentStats::default(), |mut acc, d| {
                acc.total_employees = acc.total_employees.saturating_add(d.total_employees);
                acc.completed = acc.completed.saturating_add(d.completed);
                acc.in_progress = acc.in_progress.saturating_add(d.in_progress);
                acc.not_started = acc.not_started.saturating_add(d.not_started);
                acc
            });
        Self {
            completion_rate: totals.completion_rate(),
            total_employees: totals.total_employees,
            completed: totals.completed,
            in_progress: totals.in_progress,
            not_started: totals.not_started,
        }
    }
}

/// Admin analytics: organisation totals, department roll-ups and the known
/// learners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminOverview {
    pub totals: OverallStats,
    pub departments: Vec<DepartmentRow>,
    pub learners: Vec<LearnerRow>,
}

/// Builds read-only views of learner progress.
#[derive(Clone)]
pub struct DashboardService {
    catalog: Arc<Catalog>,
    learners: Arc<dyn LearnerRepository>,
    departments: Arc<dyn DepartmentRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        learners: Arc<dyn LearnerRepository>,
        departments: Arc<dyn DepartmentRepository>,
    ) -> Self {
        Self {
            catalog,
            learners,
            departments,
        }
    }

    #[must_use]
    pub fn dashboard(&self, learner: &Learner) -> Dashboard {
        let record = learner.progress();
        let catalog = self.catalog.as_ref();

        let modules = catalog
            .modules()
            .iter()
            .map(|m| ModuleCard {
                module_id: m.id().clone(),
                title: m.title().to_owned(),
                required_minutes: m.required_minutes(),
                points: m.points(),
                status: progression::module_status(record, catalog, m.id()),
            })
            .collect();

        let badges = catalog
            .badges()
            .iter()
            .map(|b| BadgeTile {
                badge_id: b.id().to_string(),
                title: b.title().to_owned(),
                kind: b.kind(),
                earned: record.has_badge(b.id()),
            })
            .collect();

        Dashboard {
            learner_name: learner.name().to_owned(),
            department: learner.department().to_owned(),
            progress_percentage: progression::progress_percentage(record, catalog),
            state: TrainingState::of(record, catalog),
            modules,
            summary: ProgressSummary::new(record, catalog),
            badges,
            timeline: progression::completion_timeline(record, catalog),
        }
    }

    /// Department and learner overview for admins.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` for non-admin learners.
    /// Returns `DashboardError::Storage` if the repositories cannot be read.
    pub async fn admin_overview(&self, viewer: &Learner) -> Result<AdminOverview, DashboardError> {
        if !viewer.is_admin() {
            return Err(DashboardError::Forbidden);
        }
        let catalog = self.catalog.as_ref();

        let stats = self.departments.list_departments().await?;
        let totals = OverallStats::from_departments(&stats);
        let departments = stats
            .into_iter()
            .map(|d| DepartmentRow {
                completion_rate: d.completion_rate(),
                department: d.department,
                total_employees: d.total_employees,
                completed: d.completed,
                in_progress: d.in_progress,
                not_started: d.not_started,
            })
            .collect();

        let learners = self
            .learners
            .list_learners()
            .await?
            .iter()
            .map(|l| LearnerRow {
                name: l.name().to_owned(),
                department: l.department().to_owned(),
                role: l.role(),
                progress_percentage: progression::progress_percentage(l.progress(), catalog),
                points: l.progress().total_points(),
                state: TrainingState::of(l.progress(), catalog),
            })
            .collect();

        Ok(AdminOverview {
            totals,
            departments,
            learners,
        })
    }
}
