//! Wire DTOs for the `/optimize` request and response.
//!
//! Field-name casing is normative (see SPEC_FULL.md §6): the top-level
//! request/response envelopes and `Employee` are camelCase; `Shift` and
//! `ExistingAssignment` are snake_case, matching the original service.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AssignmentStatus, Constraint, ConstraintKind, Employee, ExistingAssignment, Objective,
    OptimizationOptions, OptimizationRequest, Shift, Skill,
};
use crate::error::OptimizeError;
use crate::solution::Solution;

// ============================================================================
// Required-skills: accepted in three shapes, normalized to a name set.
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RequiredSkillsDto {
    Names(Vec<String>),
    Objects(Vec<SkillNameObject>),
    Map(std::collections::HashMap<String, bool>),
}

#[derive(Debug, Clone, Deserialize)]
struct SkillNameObject {
    name: String,
}

impl RequiredSkillsDto {
    fn into_names(self) -> HashSet<String> {
        match self {
            RequiredSkillsDto::Names(names) => names.into_iter().collect(),
            RequiredSkillsDto::Objects(objs) => objs.into_iter().map(|o| o.name).collect(),
            RequiredSkillsDto::Map(map) => map
                .into_iter()
                .filter(|(_, truthy)| *truthy)
                .map(|(name, _)| name)
                .collect(),
        }
    }
}

// ============================================================================
// Employee
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct SkillDto {
    name: String,
    #[serde(default)]
    level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    skills: Option<Vec<SkillDto>>,
    /// Opaque; accepted but not interpreted by the core.
    #[serde(default)]
    #[allow(dead_code)]
    availability_pattern: Option<serde_json::Value>,
    #[serde(default)]
    #[allow(dead_code)]
    metadata: Option<serde_json::Value>,
}

impl EmployeeDto {
    fn into_domain(self) -> Employee {
        let skills = self
            .skills
            .unwrap_or_default()
            .into_iter()
            .map(|s| Skill {
                name: s.name,
                level: s.level,
            })
            .collect();
        Employee::new(self.id, self.name, self.email, skills)
    }
}

// ============================================================================
// Shift
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ShiftDto {
    pub id: String,
    pub department_id: String,
    #[serde(default)]
    required_skills: Option<RequiredSkillsDto>,
    pub min_staffing: u32,
    pub max_staffing: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    #[allow(dead_code)]
    metadata: Option<serde_json::Value>,
}

impl ShiftDto {
    fn into_domain(self) -> Result<Shift, OptimizeError> {
        let required_skills = self
            .required_skills
            .map(RequiredSkillsDto::into_names)
            .unwrap_or_default();
        Shift::new(
            self.id,
            self.department_id,
            required_skills,
            self.min_staffing,
            self.max_staffing,
            self.start_time,
            self.end_time,
        )
    }
}

// ============================================================================
// ExistingAssignment (currentSchedules)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ExistingAssignmentDto {
    pub id: String,
    pub employee_id: String,
    pub shift_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
}

impl ExistingAssignmentDto {
    fn into_domain(self) -> Result<ExistingAssignment, OptimizeError> {
        let status = match self.status.as_str() {
            "confirmed" => AssignmentStatus::Confirmed,
            "tentative" => AssignmentStatus::Tentative,
            "conflict" => AssignmentStatus::Conflict,
            other => {
                return Err(OptimizeError::InvalidRequest {
                    reason: format!("unknown assignment status '{other}'"),
                })
            }
        };
        Ok(ExistingAssignment {
            id: self.id,
            employee_id: self.employee_id,
            shift_id: self.shift_id,
            start_time: self.start_time,
            end_time: self.end_time,
            status,
        })
    }
}

// ============================================================================
// Constraint
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ConstraintDto {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub rules: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub priority: u32,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl ConstraintDto {
    fn into_domain(self) -> Constraint {
        let kind = match self.type_name.as_str() {
            "max_hours" => {
                let max_hours = self
                    .rules
                    .get("maxHours")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(40.0);
                let period_in_days = self
                    .rules
                    .get("periodInDays")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(7) as u32;
                ConstraintKind::MaxHours {
                    max_hours,
                    period_in_days,
                }
            }
            "min_rest" => {
                let min_rest_hours = self
                    .rules
                    .get("minRestHours")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(8.0);
                ConstraintKind::MinRest { min_rest_hours }
            }
            "fair_distribution" => ConstraintKind::FairDistribution,
            other => ConstraintKind::Unknown {
                type_name: other.to_string(),
            },
        };
        Constraint {
            id: self.id,
            kind,
            priority: self.priority,
            active: self.active,
        }
    }
}

// ============================================================================
// Options
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationOptionsDto {
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub allow_overtime: bool,
    #[serde(default)]
    pub max_optimization_time: Option<u32>,
    #[serde(default)]
    pub solution_count: Option<u32>,
}

impl OptimizationOptionsDto {
    fn into_domain(self) -> Result<OptimizationOptions, OptimizeError> {
        let objective = match self.objective.as_deref() {
            None | Some("balance") => Objective::Balance,
            Some("minimize_cost") => Objective::MinimizeCost,
            Some("maximize_fairness") => Objective::MaximizeFairness,
            Some(other) => {
                return Err(OptimizeError::InvalidRequest {
                    reason: format!("unknown objective '{other}'"),
                })
            }
        };
        let max_optimization_time = self.max_optimization_time.unwrap_or(30);
        if !(1..=300).contains(&max_optimization_time) {
            return Err(OptimizeError::InvalidRequest {
                reason: "maxOptimizationTime must be in [1,300]".to_string(),
            });
        }
        let solution_count = self.solution_count.unwrap_or(3);
        if !(1..=10).contains(&solution_count) {
            return Err(OptimizeError::InvalidRequest {
                reason: "solutionCount must be in [1,10]".to_string(),
            });
        }
        Ok(OptimizationOptions {
            objective,
            allow_overtime: self.allow_overtime,
            max_optimization_time,
            solution_count,
        })
    }
}

// ============================================================================
// Request envelope
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRequestDto {
    pub employees: Vec<EmployeeDto>,
    pub shifts: Vec<ShiftDto>,
    #[serde(default)]
    pub constraints: Vec<ConstraintDto>,
    #[serde(default)]
    pub current_schedules: Vec<ExistingAssignmentDto>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub options: Option<OptimizationOptionsDto>,
}

impl OptimizationRequestDto {
    pub fn into_domain(self) -> Result<OptimizationRequest, OptimizeError> {
        let employees = self
            .employees
            .into_iter()
            .map(EmployeeDto::into_domain)
            .collect();
        let shifts = self
            .shifts
            .into_iter()
            .map(ShiftDto::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        let constraints = self
            .constraints
            .into_iter()
            .map(ConstraintDto::into_domain)
            .collect();
        let current_schedules = self
            .current_schedules
            .into_iter()
            .map(ExistingAssignmentDto::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        let options = self
            .options
            .map(OptimizationOptionsDto::into_domain)
            .transpose()?
            .unwrap_or_default();

        if self.start_date >= self.end_date {
            return Err(OptimizeError::InvalidRequest {
                reason: "startDate must be before endDate".to_string(),
            });
        }

        Ok(OptimizationRequest {
            employees,
            shifts,
            constraints,
            current_schedules,
            start_date: self.start_date,
            end_date: self.end_date,
            options,
        })
    }
}

// ============================================================================
// Response envelope
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDto {
    pub employee_id: String,
    pub shift_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsDto {
    pub total_cost: f64,
    pub fairness_score: f64,
    pub constraint_violations: u32,
    pub coverage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolutionDto {
    pub id: String,
    pub score: f64,
    pub assignments: Vec<AssignmentDto>,
    pub metrics: MetricsDto,
    #[serde(rename = "solveTime")]
    pub solve_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResponseDto {
    pub optimization_id: String,
    pub status: OptimizationStatus,
    pub solutions: Vec<SolutionDto>,
    pub total_solve_time: f64,
    pub message: String,
}

impl From<&Solution> for SolutionDto {
    fn from(solution: &Solution) -> Self {
        SolutionDto {
            id: solution.id.clone(),
            score: solution.score,
            assignments: solution
                .assignments
                .iter()
                .map(|a| AssignmentDto {
                    employee_id: a.employee_id.clone(),
                    shift_id: a.shift_id.clone(),
                    start_time: a.start_time,
                    end_time: a.end_time,
                })
                .collect(),
            metrics: MetricsDto {
                total_cost: solution.metrics.total_cost,
                fairness_score: solution.metrics.fairness_score,
                constraint_violations: solution.metrics.constraint_violations,
                coverage: solution.metrics.coverage,
            },
            solve_time: solution.solve_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_skills_accepts_name_list() {
        let dto: RequiredSkillsDto = serde_json::from_str(r#"["nursing","cpr"]"#).unwrap();
        let names = dto.into_names();
        assert!(names.contains("nursing"));
        assert!(names.contains("cpr"));
    }

    #[test]
    fn required_skills_accepts_object_list() {
        let dto: RequiredSkillsDto =
            serde_json::from_str(r#"[{"name":"nursing"},{"name":"cpr"}]"#).unwrap();
        let names = dto.into_names();
        assert!(names.contains("nursing"));
        assert!(names.contains("cpr"));
    }

    #[test]
    fn required_skills_accepts_truthy_map() {
        let dto: RequiredSkillsDto =
            serde_json::from_str(r#"{"nursing":true,"cpr":false}"#).unwrap();
        let names = dto.into_names();
        assert!(names.contains("nursing"));
        assert!(!names.contains("cpr"));
    }

    #[test]
    fn shift_dto_rejects_inverted_staffing() {
        let json = r#"{
            "id":"shift-1","department_id":"dept-1","min_staffing":3,"max_staffing":1,
            "start_time":"2024-01-01T09:00:00Z","end_time":"2024-01-01T17:00:00Z"
        }"#;
        let dto: ShiftDto = serde_json::from_str(json).unwrap();
        assert!(dto.into_domain().is_err());
    }
}
