//! Built-in aseptic-process training catalog and sample data.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use training_core::model::{
    BadgeDefinition, BadgeId, BadgeKind, Catalog, CatalogError, DepartmentStats, Learner,
    LearnerId, LearnerRecord, ModuleDefinition, ModuleId, ModuleProgress, Role,
};

pub const CERTIFICATION_BADGE: &str = "certified-aseptic-handler";

struct ModuleSeed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    minutes: u32,
    points: u32,
    badge: &'static str,
    prerequisites: &'static [&'static str],
}

const MODULES: &[ModuleSeed] = &[
    ModuleSeed {
        id: "module1",
        title: "Aseptic Area Awareness",
        description: "Key principles of aseptic areas and contamination risks in biopharmaceutical manufacturing.",
        minutes: 30,
        points: 125,
        badge: "area-awareness",
        prerequisites: &[],
    },
    ModuleSeed {
        id: "module2",
        title: "Gowning & Entry Protocols",
        description: "Proper techniques for aseptic gowning and clean room entry.",
        minutes: 45,
        points: 150,
        badge: "gowning-master",
        prerequisites: &["module1"],
    },
    ModuleSeed {
        id: "module3",
        title: "Material Handling & Equipment Use",
        description: "Handling of materials and equipment in aseptic manufacturing environments.",
        minutes: 40,
        points: 135,
        badge: "handling-expert",
        prerequisites: &["module1", "module2"],
    },
    ModuleSeed {
        id: "module4",
        title: "Incident Identification & Contamination Control",
        description: "Identifying contamination incidents and applying control measures.",
        minutes: 50,
        points: 175,
        badge: "contamination-controller",
        prerequisites: &["module1", "module2", "module3"],
    },
];

const BADGES: &[(&str, &str, &str, BadgeKind)] = &[
    (
        "area-awareness",
        "Area Awareness Expert",
        "Completed the Aseptic Area Awareness module",
        BadgeKind::Module,
    ),
    (
        "gowning-master",
        "Gowning Master",
        "Completed the Gowning & Entry Protocols module",
        BadgeKind::Module,
    ),
    (
        "handling-expert",
        "Handling Expert",
        "Completed the Material Handling & Equipment Use module",
        BadgeKind::Module,
    ),
    (
        "contamination-controller",
        "Contamination Controller",
        "Completed the Incident Identification & Contamination Control module",
        BadgeKind::Module,
    ),
    (
        CERTIFICATION_BADGE,
        "Certified Aseptic Handler",
        "Completed all required training modules",
        BadgeKind::Certification,
    ),
    (
        "fast-learner",
        "Fast Learner",
        "Completed all modules on the first attempt",
        BadgeKind::Special,
    ),
    (
        "resilient-performer",
        "Resilient Performer",
        "Persevered through challenges to complete all training",
        BadgeKind::Special,
    ),
];

/// The four-module aseptic training catalog.
///
/// # Errors
///
/// Returns `CatalogError` if the built-in definitions are inconsistent.
pub fn default_catalog() -> Result<Catalog, CatalogError> {
    let modules = MODULES
        .iter()
        .map(|seed| {
            ModuleDefinition::new(
                ModuleId::new(seed.id),
                seed.title,
                seed.points,
                BadgeId::new(seed.badge),
                seed.prerequisites.iter().map(|p| ModuleId::new(*p)).collect(),
            )
            .map(|m| {
                m.with_description(seed.description)
                    .with_required_minutes(seed.minutes)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let badges = BADGES
        .iter()
        .map(|(id, title, description, kind)| {
            BadgeDefinition::new(BadgeId::new(*id), *title, *description, *kind)
        })
        .collect();

    Catalog::new(modules, badges, BadgeId::new(CERTIFICATION_BADGE))
}

fn at(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn progress(completed: bool, attempts: u32, points: u32, last: Option<&str>) -> ModuleProgress {
    ModuleProgress {
        completed,
        attempts,
        points_earned: points,
        last_attempt_at: last.and_then(at),
    }
}

/// Seeded sign-in accounts.
///
/// Records are rebuilt against `catalog`, so totals and badges always agree
/// with the per-module progress even when the raw seed disagrees.
#[must_use]
pub fn sample_learners(catalog: &Catalog) -> Vec<Learner> {
    let admin_modules: BTreeMap<ModuleId, ModuleProgress> = [
        ("module1", "2023-04-15T10:30:00"),
        ("module2", "2023-04-16T11:45:00"),
        ("module3", "2023-04-17T09:15:00"),
        ("module4", "2023-04-18T14:20:00"),
    ]
    .into_iter()
    .map(|(id, when)| (ModuleId::new(id), progress(true, 1, 125, Some(when))))
    .collect();

    let user_modules: BTreeMap<ModuleId, ModuleProgress> = [
        (
            "module1",
            progress(true, 2, 95, Some("2023-05-20T13:45:00")),
        ),
        ("module2", progress(false, 0, 0, None)),
        ("module3", progress(false, 0, 0, None)),
        ("module4", progress(false, 0, 0, None)),
    ]
    .into_iter()
    .map(|(id, p)| (ModuleId::new(id), p))
    .collect();

    vec![
        Learner::new(
            LearnerId::new("1"),
            "Admin User",
            "admin@gennova.com",
            Role::Admin,
            "HR & Training",
            LearnerRecord::from_modules(admin_modules, Vec::new(), catalog),
        ),
        Learner::new(
            LearnerId::new("2"),
            "Regular User",
            "user@gennova.com",
            Role::User,
            "Production",
            LearnerRecord::from_modules(user_modules, Vec::new(), catalog),
        ),
    ]
}

/// Department roll-up shown on the admin overview.
#[must_use]
pub fn department_stats() -> Vec<DepartmentStats> {
    [
        ("Production", 45, 20, 15, 10),
        ("Quality Control", 32, 25, 5, 2),
        ("Research & Development", 28, 15, 8, 5),
        ("Supply Chain", 18, 8, 6, 4),
        ("Administration", 12, 5, 2, 5),
    ]
    .into_iter()
    .map(
        |(department, total, completed, in_progress, not_started)| DepartmentStats {
            department: department.to_owned(),
            total_employees: total,
            completed,
            in_progress,
            not_started,
        },
    )
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use training_core::progression::{ModuleStatus, module_status, progress_percentage};

    #[test]
    fn default_catalog_matches_training_plan() {
        let catalog = default_catalog().unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.total_points(), 585);
        assert_eq!(catalog.badges().len(), 7);
        assert_eq!(catalog.certification_badge().as_str(), CERTIFICATION_BADGE);

        let m3 = catalog.module(&ModuleId::new("module3")).unwrap();
        assert_eq!(m3.prerequisites().len(), 2);
        assert_eq!(m3.required_minutes(), 40);
    }

    #[test]
    fn seeded_admin_is_certified() {
        let catalog = default_catalog().unwrap();
        let learners = sample_learners(&catalog);
        let admin = &learners[0];

        assert!(admin.is_admin());
        assert_eq!(admin.progress().total_points(), 500);
        assert_eq!(admin.progress().total_modules_completed(), 4);
        assert!(admin.progress().has_badge(&BadgeId::new(CERTIFICATION_BADGE)));
        assert_eq!(progress_percentage(admin.progress(), &catalog), 100);
    }

    #[test]
    fn seeded_user_has_normalized_badges() {
        let catalog = default_catalog().unwrap();
        let learners = sample_learners(&catalog);
        let user = &learners[1];

        assert_eq!(user.progress().total_points(), 95);
        assert_eq!(
            user.progress().badges().iter().cloned().collect::<Vec<_>>(),
            vec![BadgeId::new("area-awareness")]
        );
        assert_eq!(
            module_status(user.progress(), &catalog, &ModuleId::new("module2")),
            ModuleStatus::Available
        );
        assert_eq!(
            module_status(user.progress(), &catalog, &ModuleId::new("module3")),
            ModuleStatus::Locked
        );
    }

    #[test]
    fn seed_timestamps_parse() {
        assert!(at("2023-05-20T13:45:00").is_some());
        assert!(at("not a date").is_none());
    }

    #[test]
    fn department_stats_are_consistent() {
        for row in department_stats() {
            assert_eq!(
                row.total_employees,
                row.completed + row.in_progress + row.not_started,
                "{}",
                row.department
            );
        }
    }
}
