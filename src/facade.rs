//! Top-level orchestration: filter the shift window, build and solve the
//! model, and assemble the outcome - including the fallback synthesis path
//! when the solver proves the model feasible but yields no solutions.

use crate::domain::{AssignmentStatus, OptimizationRequest};
use crate::engine::{self, SolveStatus};
use crate::error::OptimizeError;
use crate::filter;
use crate::solution::{Assignment, Metrics, Solution};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Completed,
    Failed,
}

pub struct OptimizationOutcome {
    pub status: OutcomeStatus,
    pub solutions: Vec<Solution>,
    pub message: String,
    pub total_solve_time_ms: f64,
}

pub struct ScheduleSolver;

impl ScheduleSolver {
    pub fn solve(request: &OptimizationRequest) -> Result<OptimizationOutcome, OptimizeError> {
        tracing::info!(
            employees = request.employees.len(),
            shifts = request.shifts.len(),
            "optimize request received"
        );

        let in_window = filter::shifts_in_window(&request.shifts, request.start_date, request.end_date);
        if in_window.is_empty() {
            tracing::info!(status = "failed", "no shifts in optimization window");
            return Ok(OptimizationOutcome {
                status: OutcomeStatus::Failed,
                solutions: Vec::new(),
                message: "No shifts found in the specified date range".to_string(),
                total_solve_time_ms: 0.0,
            });
        }
        let filtered: Vec<_> = in_window.into_iter().cloned().collect();
        tracing::debug!(shifts_in_window = filtered.len(), "shift window filter applied");

        let result = engine::solve(request, filtered.clone())?;

        let outcome = match (result.status, result.solutions.is_empty()) {
            (SolveStatus::Optimal, false) | (SolveStatus::Feasible, false) => {
                let total_solve_time_ms = result.solutions.iter().map(|s| s.solve_time_ms).sum();
                let message = format!("Generated {} solution(s)", result.solutions.len());
                OptimizationOutcome {
                    status: OutcomeStatus::Completed,
                    solutions: result.solutions,
                    message,
                    total_solve_time_ms,
                }
            }
            (SolveStatus::Optimal, true) | (SolveStatus::Feasible, true) => match synthesize_fallback(request, &filtered) {
                Some(solution) => OptimizationOutcome {
                    status: OutcomeStatus::Completed,
                    solutions: vec![solution],
                    message: "Generated 1 solution(s)".to_string(),
                    total_solve_time_ms: 0.0,
                },
                None => no_feasible_solution(),
            },
            (SolveStatus::Infeasible, _) | (SolveStatus::Unknown, _) => no_feasible_solution(),
        };

        tracing::info!(
            status = ?outcome.status,
            solutions = outcome.solutions.len(),
            "optimize request completed"
        );
        Ok(outcome)
    }
}

fn no_feasible_solution() -> OptimizationOutcome {
    OptimizationOutcome {
        status: OutcomeStatus::Failed,
        solutions: Vec::new(),
        message: "No feasible solution found".to_string(),
        total_solve_time_ms: 0.0,
    }
}

/// Builds the `id="current"` solution from confirmed existing assignments
/// when the model is provably solvable but the search collected nothing.
fn synthesize_fallback(
    request: &OptimizationRequest,
    shifts: &[crate::domain::Shift],
) -> Option<Solution> {
    let assignments: Vec<Assignment> = request
        .current_schedules
        .iter()
        .filter(|a| a.status == AssignmentStatus::Confirmed)
        .map(|a| Assignment {
            employee_id: a.employee_id.clone(),
            shift_id: a.shift_id.clone(),
            start_time: a.start_time,
            end_time: a.end_time,
        })
        .collect();

    if assignments.is_empty() {
        return None;
    }

    let coverage = if shifts.is_empty() {
        0.0
    } else {
        assignments.len() as f64 / shifts.len() as f64
    };

    Some(Solution {
        id: "current".to_string(),
        score: 0.0,
        assignments,
        metrics: Metrics {
            total_cost: 0.0,
            fairness_score: 0.5,
            constraint_violations: 0,
            coverage,
        },
        solve_time_ms: 0.0,
    })
}
