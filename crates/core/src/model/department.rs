use serde::{Deserialize, Serialize};

use crate::percent::rounded_percentage;

/// Aggregate training status for one department, as shown on the admin view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentStats {
    pub department: String,
    pub total_employees: u32,
    pub completed: u32,
    pub in_progress: u32,
    pub not_started: u32,
}

impl DepartmentStats {
    /// Completed employees as a rounded percentage of the department.
    ///
    /// Returns 0 for a department with no employees.
    #[must_use]
    pub fn completion_rate(&self) -> u8 {
        rounded_percentage(u64::from(self.completed), u64::from(self.total_employees))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total: u32, completed: u32) -> DepartmentStats {
        DepartmentStats {
            department: "Production".into(),
            total_employees: total,
            completed,
            in_progress: 0,
            not_started: total - completed,
        }
    }

    #[test]
    fn completion_rate_rounds_half_up() {
        assert_eq!(stats(45, 20).completion_rate(), 44);
        assert_eq!(stats(32, 25).completion_rate(), 78);
        assert_eq!(stats(8, 1).completion_rate(), 13);
    }

    #[test]
    fn empty_department_has_zero_rate() {
        assert_eq!(stats(0, 0).completion_rate(), 0);
    }
}
