//! Domain model for the shift optimization problem.
//!
//! Values here are request-scoped: built once from an incoming
//! `OptimizationRequest`, never mutated afterward, and dropped when the
//! request returns.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::OptimizeError;

/// A single named skill, optionally leveled (e.g. "certified", "senior").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    pub name: String,
    pub level: Option<String>,
}

/// An employee who can be assigned to shifts.
#[derive(Debug, Clone)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: String,
    pub skills: Vec<Skill>,
    skill_names: HashSet<String>,
}

impl Employee {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        skills: Vec<Skill>,
    ) -> Self {
        let skill_names = skills.iter().map(|s| s.name.clone()).collect();
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            skills,
            skill_names,
        }
    }

    /// Membership test against the derived skill-name set.
    pub fn has_skill(&self, name: &str) -> bool {
        self.skill_names.contains(name)
    }
}

/// A time-bounded work unit requiring a staff count and optional skills.
#[derive(Debug, Clone)]
pub struct Shift {
    pub id: String,
    pub department_id: String,
    pub required_skills: HashSet<String>,
    pub min_staffing: u32,
    pub max_staffing: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Shift {
    pub fn new(
        id: impl Into<String>,
        department_id: impl Into<String>,
        required_skills: HashSet<String>,
        min_staffing: u32,
        max_staffing: u32,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Self, OptimizeError> {
        let id = id.into();
        if max_staffing < 1 {
            return Err(OptimizeError::InvalidShift {
                id,
                reason: "maxStaffing must be >= 1".to_string(),
            });
        }
        if max_staffing < min_staffing {
            return Err(OptimizeError::InvalidShift {
                id,
                reason: "maxStaffing must be >= minStaffing".to_string(),
            });
        }
        if start_time >= end_time {
            return Err(OptimizeError::InvalidShift {
                id,
                reason: "startTime must be before endTime".to_string(),
            });
        }
        Ok(Self {
            id,
            department_id: department_id.into(),
            required_skills,
            min_staffing,
            max_staffing,
            start_time,
            end_time,
        })
    }

    /// Duration in hours, guaranteed `> 0` by the constructor's invariant.
    pub fn duration_hours(&self) -> f64 {
        (self.end_time - self.start_time).num_seconds() as f64 / 3600.0
    }

    /// Shift duration rounded to integer minutes, for use as a CP coefficient.
    pub fn duration_minutes(&self) -> i32 {
        (self.duration_hours() * 60.0).round() as i32
    }
}

/// Status of a previously existing assignment carried in `currentSchedules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentStatus {
    Confirmed,
    Tentative,
    Conflict,
}

/// An existing (employee, shift) assignment, used only to synthesize the
/// fallback "current" solution when the solver yields nothing.
#[derive(Debug, Clone)]
pub struct ExistingAssignment {
    pub id: String,
    pub employee_id: String,
    pub shift_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AssignmentStatus,
}

/// The kind of policy a constraint implements, each with its own rule bag.
#[derive(Debug, Clone)]
pub enum ConstraintKind {
    MaxHours {
        max_hours: f64,
        /// Carried for API compatibility; the bound applies to the whole
        /// filtered shift window rather than a rolling `period_in_days` slice.
        period_in_days: u32,
    },
    MinRest {
        min_rest_hours: f64,
    },
    FairDistribution,
    /// Any constraint type the compiler does not (yet) recognize. Carried
    /// through so a request doesn't fail merely for naming one, but it
    /// contributes no constraints or objective terms.
    Unknown {
        type_name: String,
    },
}

/// A single constraint in the catalog. Only `active` constraints are
/// compiled by the model builder.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub id: String,
    pub kind: ConstraintKind,
    pub priority: u32,
    pub active: bool,
}

/// The scalar the solver minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Objective {
    MinimizeCost,
    MaximizeFairness,
    #[default]
    Balance,
}

/// Tunables for a single optimize call.
#[derive(Debug, Clone)]
pub struct OptimizationOptions {
    pub objective: Objective,
    /// Reserved; not yet wired into constraint compilation.
    pub allow_overtime: bool,
    pub max_optimization_time: u32,
    pub solution_count: u32,
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        Self {
            objective: Objective::default(),
            allow_overtime: false,
            max_optimization_time: 30,
            solution_count: 3,
        }
    }
}

/// A fully-parsed, ready-to-solve optimization request.
#[derive(Debug, Clone)]
pub struct OptimizationRequest {
    pub employees: Vec<Employee>,
    pub shifts: Vec<Shift>,
    pub constraints: Vec<Constraint>,
    pub current_schedules: Vec<ExistingAssignment>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub options: OptimizationOptions,
}

impl OptimizationRequest {
    /// Active constraints, in catalog order.
    pub fn active_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn employee_has_skill_by_name() {
        let emp = Employee::new(
            "emp-1",
            "John Doe",
            "john@example.com",
            vec![Skill {
                name: "nursing".to_string(),
                level: Some("certified".to_string()),
            }],
        );
        assert!(emp.has_skill("nursing"));
        assert!(!emp.has_skill("cpr"));
    }

    #[test]
    fn shift_duration_hours() {
        let shift = Shift::new(
            "shift-1",
            "dept-1",
            HashSet::new(),
            1,
            1,
            dt("2024-01-01T09:00:00Z"),
            dt("2024-01-01T17:00:00Z"),
        )
        .unwrap();
        assert_eq!(shift.duration_hours(), 8.0);
        assert_eq!(shift.duration_minutes(), 480);
    }

    #[test]
    fn shift_rejects_max_below_min() {
        let err = Shift::new(
            "shift-1",
            "dept-1",
            HashSet::new(),
            2,
            1,
            dt("2024-01-01T09:00:00Z"),
            dt("2024-01-01T17:00:00Z"),
        )
        .unwrap_err();
        assert!(matches!(err, OptimizeError::InvalidShift { .. }));
    }

    #[test]
    fn shift_rejects_inverted_times() {
        let err = Shift::new(
            "shift-1",
            "dept-1",
            HashSet::new(),
            1,
            1,
            dt("2024-01-01T17:00:00Z"),
            dt("2024-01-01T09:00:00Z"),
        )
        .unwrap_err();
        assert!(matches!(err, OptimizeError::InvalidShift { .. }));
    }
}
