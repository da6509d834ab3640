#![forbid(unsafe_code)]

pub mod app_services;
pub mod dashboard_service;
pub mod error;
pub mod progress_service;
pub mod session;

pub use training_core::Clock;

pub use app_services::AppServices;
pub use dashboard_service::{
    AdminOverview, BadgeTile, Dashboard, DashboardService, DepartmentRow, LearnerRow, ModuleCard,
    OverallStats,
};
pub use error::{AppServicesError, DashboardError, ProgressServiceError, SignInError};
pub use progress_service::ProgressService;
pub use session::{SessionHolder, SignInService};
