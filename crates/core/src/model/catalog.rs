use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{BadgeId, ModuleId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("module {0} is declared more than once")]
    DuplicateModule(ModuleId),

    #[error("badge {0} is declared more than once")]
    DuplicateBadge(BadgeId),

    #[error("module title cannot be empty")]
    EmptyTitle,

    #[error("badge {badge} is awarded by both {first} and {second}")]
    SharedModuleBadge {
        badge: BadgeId,
        first: ModuleId,
        second: ModuleId,
    },

    #[error("module {module} cannot award {badge}; it is not a module badge")]
    NotAModuleBadge { module: ModuleId, badge: BadgeId },
}

//
// ─── DEFINITIONS ───────────────────────────────────────────────────────────────
//

/// Category of an achievement badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    /// Granted when a single module is completed for the first time.
    Module,
    /// Awarded outside the module/certification rules.
    Special,
    /// Granted once every module in the catalog is completed.
    Certification,
}

/// A unit of training content with a point reward and prerequisite set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    id: ModuleId,
    title: String,
    description: String,
    required_minutes: u32,
    points: u32,
    badge_id: BadgeId,
    prerequisites: Vec<ModuleId>,
}

impl ModuleDefinition {
    /// Create a module definition.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyTitle` if the title is blank.
    pub fn new(
        id: ModuleId,
        title: impl Into<String>,
        points: u32,
        badge_id: BadgeId,
        prerequisites: Vec<ModuleId>,
    ) -> Result<Self, CatalogError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(CatalogError::EmptyTitle);
        }
        Ok(Self {
            id,
            title,
            description: String::new(),
            required_minutes: 0,
            points,
            badge_id,
            prerequisites,
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_required_minutes(mut self, minutes: u32) -> Self {
        self.required_minutes = minutes;
        self
    }

    #[must_use]
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn required_minutes(&self) -> u32 {
        self.required_minutes
    }

    /// Reward for completing the module.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn badge_id(&self) -> &BadgeId {
        &self.badge_id
    }

    #[must_use]
    pub fn prerequisites(&self) -> &[ModuleId] {
        &self.prerequisites
    }
}

/// An achievement marker shown on the badge grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    id: BadgeId,
    title: String,
    description: String,
    kind: BadgeKind,
}

impl BadgeDefinition {
    #[must_use]
    pub fn new(
        id: BadgeId,
        title: impl Into<String>,
        description: impl Into<String>,
        kind: BadgeKind,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            kind,
        }
    }

    #[must_use]
    pub fn id(&self) -> &BadgeId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn kind(&self) -> BadgeKind {
        self.kind
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Immutable module and badge catalog, loaded once at startup.
///
/// Module order is the declared order and is preserved for presentation.
/// Each module awards its own badge, distinct from the certification badge
/// and from any declared special badge. Prerequisites are trusted to form a
/// DAG; cycles are not detected and simply leave the affected modules locked
/// forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    modules: Vec<ModuleDefinition>,
    badges: Vec<BadgeDefinition>,
    certification_badge: BadgeId,
}

impl Catalog {
    /// Build a catalog from module and badge definitions.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateModule` or `CatalogError::DuplicateBadge`
    /// if an id is declared twice, `CatalogError::SharedModuleBadge` if two
    /// modules award the same badge, and `CatalogError::NotAModuleBadge` if a
    /// module awards the certification badge or a non-module badge.
    pub fn new(
        modules: Vec<ModuleDefinition>,
        badges: Vec<BadgeDefinition>,
        certification_badge: BadgeId,
    ) -> Result<Self, CatalogError> {
        let mut seen_modules = HashSet::with_capacity(modules.len());
        for module in &modules {
            if !seen_modules.insert(module.id()) {
                return Err(CatalogError::DuplicateModule(module.id().clone()));
            }
        }
        let mut seen_badges = HashMap::with_capacity(badges.len());
        for badge in &badges {
            if seen_badges.insert(badge.id(), badge.kind()).is_some() {
                return Err(CatalogError::DuplicateBadge(badge.id().clone()));
            }
        }

        let mut awarded_by: HashMap<&BadgeId, &ModuleId> = HashMap::with_capacity(modules.len());
        for module in &modules {
            let badge = module.badge_id();
            let reserved = badge == &certification_badge
                || seen_badges
                    .get(badge)
                    .is_some_and(|kind| *kind != BadgeKind::Module);
            if reserved {
                return Err(CatalogError::NotAModuleBadge {
                    module: module.id().clone(),
                    badge: badge.clone(),
                });
            }
            if let Some(first) = awarded_by.insert(badge, module.id()) {
                return Err(CatalogError::SharedModuleBadge {
                    badge: badge.clone(),
                    first: first.clone(),
                    second: module.id().clone(),
                });
            }
        }

        Ok(Self {
            modules,
            badges,
            certification_badge,
        })
    }

    /// An empty catalog with no modules or badges.
    #[must_use]
    pub fn empty(certification_badge: BadgeId) -> Self {
        Self {
            modules: Vec::new(),
            badges: Vec::new(),
            certification_badge,
        }
    }

    #[must_use]
    pub fn modules(&self) -> &[ModuleDefinition] {
        &self.modules
    }

    #[must_use]
    pub fn badges(&self) -> &[BadgeDefinition] {
        &self.badges
    }

    #[must_use]
    pub fn certification_badge(&self) -> &BadgeId {
        &self.certification_badge
    }

    #[must_use]
    pub fn module(&self, id: &ModuleId) -> Option<&ModuleDefinition> {
        self.modules.iter().find(|m| m.id() == id)
    }

    #[must_use]
    pub fn badge(&self, id: &BadgeId) -> Option<&BadgeDefinition> {
        self.badges.iter().find(|b| b.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Sum of every module's point reward.
    #[must_use]
    pub fn total_points(&self) -> u64 {
        self.modules.iter().map(|m| u64::from(m.points())).sum()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
