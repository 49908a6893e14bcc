//! Model builder and solver driver.
//!
//! Builds one boolean decision variable `x[e,s]` per (employee, shift) pair,
//! compiles the active constraint catalog and the chosen objective into a
//! `pumpkin_solver::Solver` model, and drives the search to collect up to
//! `solutionCount` distinct solutions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pumpkin_solver::constraints as cp;
use pumpkin_solver::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_solver::optimisation::OptimisationDirection;
use pumpkin_solver::results::{OptimisationResult, ProblemSolution, SolutionReference};
use pumpkin_solver::termination::TimeBudget;
use pumpkin_solver::variables::{DomainId, TransformableVariable};
use pumpkin_solver::Solver;

use crate::domain::{ConstraintKind, Objective, OptimizationRequest, Shift};
use crate::error::OptimizeError;
use crate::solution::{compute_metrics, Assignment, Solution};

/// A (variable, coefficient) pair in a linear expression.
type Term = (DomainId, i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

pub struct EngineResult {
    pub status: SolveStatus,
    pub solutions: Vec<Solution>,
}

fn scaled_terms(terms: &[Term]) -> Vec<pumpkin_solver::variables::AffineView<DomainId>> {
    terms
        .iter()
        .map(|(var, coeff)| var.scaled(*coeff))
        .collect()
}

fn post_ge(solver: &mut Solver, tag: pumpkin_solver::ConstraintTag, terms: &[Term], rhs: i32) -> Result<(), OptimizeError> {
    let views = scaled_terms(terms);
    solver
        .add_constraint(cp::greater_than_or_equals(views, rhs, tag))
        .post()
        .map_err(|e| OptimizeError::Solver(format!("{e:?}")))
}

fn post_le(solver: &mut Solver, tag: pumpkin_solver::ConstraintTag, terms: &[Term], rhs: i32) -> Result<(), OptimizeError> {
    let negated: Vec<Term> = terms.iter().map(|(v, c)| (*v, -c)).collect();
    post_ge(solver, tag, &negated, -rhs)
}

fn post_eq(solver: &mut Solver, tag: pumpkin_solver::ConstraintTag, terms: &[Term], rhs: i32) -> Result<(), OptimizeError> {
    post_ge(solver, tag, terms, rhs)?;
    post_le(solver, tag, terms, rhs)
}

/// Builds and solves the model for one (already window-filtered) shift set.
///
/// `shifts` is owned here: the filter stage produces references into the
/// parsed request, and this function needs its own copies to hand out into
/// the solutions it collects.
pub fn solve(request: &OptimizationRequest, shifts: Vec<Shift>) -> Result<EngineResult, OptimizeError> {
    let employees = &request.employees;

    let mut solver = Solver::default();
    let tag = solver.new_constraint_tag();

    let mut x: HashMap<(usize, usize), DomainId> = HashMap::with_capacity(employees.len() * shifts.len());
    for (e_idx, employee) in employees.iter().enumerate() {
        for (s_idx, shift) in shifts.iter().enumerate() {
            let eligible = shift
                .required_skills
                .iter()
                .all(|skill| employee.has_skill(skill));
            let (lb, ub) = if eligible { (0, 1) } else { (0, 0) };
            x.insert((e_idx, s_idx), solver.new_bounded_integer(lb, ub));
        }
    }

    // Staffing bounds: minStaffing <= sum_e x[e,s] <= maxStaffing.
    for (s_idx, shift) in shifts.iter().enumerate() {
        let terms: Vec<Term> = (0..employees.len()).map(|e_idx| (x[&(e_idx, s_idx)], 1)).collect();
        post_ge(&mut solver, tag, &terms, shift.min_staffing as i32)?;
        post_le(&mut solver, tag, &terms, shift.max_staffing as i32)?;
    }
    tracing::debug!(shifts = shifts.len(), "staffing constraints posted");

    // Max hours: one bound per active max_hours constraint, per employee.
    for max_hours in request.active_constraints().filter_map(|c| match &c.kind {
        ConstraintKind::MaxHours { max_hours, .. } => Some(*max_hours),
        _ => None,
    }) {
        let max_minutes = (max_hours * 60.0).floor() as i32;
        for e_idx in 0..employees.len() {
            let terms: Vec<Term> = shifts
                .iter()
                .enumerate()
                .map(|(s_idx, shift)| (x[&(e_idx, s_idx)], shift.duration_minutes()))
                .collect();
            post_le(&mut solver, tag, &terms, max_minutes)?;
        }
        tracing::debug!(max_hours, "max_hours constraint posted for every employee");
    }

    // Min rest: the first active min_rest constraint forbids back-to-back
    // pairs whose gap is shorter than the threshold, per employee.
    if let Some(min_rest_hours) = request.active_constraints().find_map(|c| match &c.kind {
        ConstraintKind::MinRest { min_rest_hours } => Some(*min_rest_hours),
        _ => None,
    }) {
        let min_rest_seconds = (min_rest_hours * 3600.0).round() as i64;
        for e_idx in 0..employees.len() {
            for i in 0..shifts.len() {
                for j in 0..shifts.len() {
                    if i == j {
                        continue;
                    }
                    let (earlier, later) = (&shifts[i], &shifts[j]);
                    if earlier.end_time >= later.start_time {
                        continue;
                    }
                    let gap = (later.start_time - earlier.end_time).num_seconds();
                    if gap < min_rest_seconds {
                        let terms = vec![(x[&(e_idx, i)], 1), (x[&(e_idx, j)], 1)];
                        post_le(&mut solver, tag, &terms, 1)?;
                    }
                }
            }
        }
        tracing::debug!(min_rest_hours, "min_rest constraint posted");
    }

    // Fair distribution: cap each employee's assigned-shift count. Skipped
    // entirely when there are no employees to distribute shifts across.
    if !employees.is_empty()
        && request
            .active_constraints()
            .any(|c| matches!(c.kind, ConstraintKind::FairDistribution))
    {
        let cap = (shifts.len() / employees.len()) as i32 + 1;
        for e_idx in 0..employees.len() {
            let terms: Vec<Term> = (0..shifts.len()).map(|s_idx| (x[&(e_idx, s_idx)], 1)).collect();
            post_le(&mut solver, tag, &terms, cap)?;
        }
        tracing::debug!(cap, "fair_distribution constraint posted");
    }

    let minute_cap: i32 = shifts
        .iter()
        .map(|s| s.duration_minutes() * s.max_staffing.max(1) as i32)
        .sum::<i32>()
        .max(1);

    let objective_var = match request.options.objective {
        Objective::MinimizeCost | Objective::Balance => {
            let cost_var = solver.new_bounded_integer(0, minute_cap);
            let mut terms: Vec<Term> = employees
                .iter()
                .enumerate()
                .flat_map(|(e_idx, _)| {
                    shifts
                        .iter()
                        .enumerate()
                        .map(move |(s_idx, shift)| (x[&(e_idx, s_idx)], shift.duration_minutes()))
                })
                .collect();
            terms.push((cost_var, -1));
            post_eq(&mut solver, tag, &terms, 0)?;
            cost_var
        }
        Objective::MaximizeFairness => {
            let mut h_vars = Vec::with_capacity(employees.len());
            for e_idx in 0..employees.len() {
                let h = solver.new_bounded_integer(0, minute_cap);
                let mut terms: Vec<Term> = shifts
                    .iter()
                    .enumerate()
                    .map(|(s_idx, shift)| (x[&(e_idx, s_idx)], shift.duration_minutes()))
                    .collect();
                terms.push((h, -1));
                post_eq(&mut solver, tag, &terms, 0)?;
                h_vars.push(h);
            }
            let h_max = solver.new_bounded_integer(0, minute_cap);
            let h_min = solver.new_bounded_integer(0, minute_cap);
            for h in &h_vars {
                post_ge(&mut solver, tag, &[(h_max, 1), (*h, -1)], 0)?;
                post_le(&mut solver, tag, &[(h_min, 1), (*h, -1)], 0)?;
            }
            let diff_var = solver.new_bounded_integer(0, minute_cap);
            post_eq(&mut solver, tag, &[(h_max, 1), (h_min, -1), (diff_var, -1)], 0)?;
            diff_var
        }
    };

    let collected: Arc<Mutex<Vec<Solution>>> = Arc::new(Mutex::new(Vec::new()));
    let collected_for_callback = Arc::clone(&collected);
    let max_solutions = request.options.solution_count as usize;
    let start = Instant::now();

    let callback = move |_solver: &Solver, solution_ref: pumpkin_solver::results::SolutionReference, _brancher: &_| {
        let mut guard = collected_for_callback.lock().expect("solution collector mutex poisoned");
        if guard.len() >= max_solutions {
            return;
        }
        let mut assignments = Vec::new();
        for (&(e_idx, s_idx), var) in x.iter() {
            if solution_ref.get_integer_value(*var) == 1 {
                let shift = &shifts[s_idx];
                assignments.push(Assignment {
                    employee_id: employees[e_idx].id.clone(),
                    shift_id: shift.id.clone(),
                    start_time: shift.start_time,
                    end_time: shift.end_time,
                });
            }
        }
        let metrics = compute_metrics(&assignments, &shifts);
        let score = solution_ref.get_integer_value(objective_var) as f64;
        guard.push(Solution {
            id: format!("sol_{}", guard.len()),
            score,
            assignments,
            metrics,
            solve_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        });
    };

    let mut brancher = solver.default_brancher();
    let mut termination = TimeBudget::starting_now(Duration::from_secs(request.options.max_optimization_time as u64));

    let result = solver.optimise(
        &mut brancher,
        &mut termination,
        LinearSatUnsat::new(OptimisationDirection::Minimise, objective_var, callback),
    );

    let status = match result {
        OptimisationResult::Optimal(_) => SolveStatus::Optimal,
        OptimisationResult::Satisfiable(_) => SolveStatus::Feasible,
        OptimisationResult::Unsatisfiable => SolveStatus::Infeasible,
        OptimisationResult::Unknown => SolveStatus::Unknown,
    };

    let solutions = collected.lock().expect("solution collector mutex poisoned").clone();
    Ok(EngineResult { status, solutions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Constraint, Employee, OptimizationOptions, Skill};
    use std::collections::HashSet;

    fn dt(s: &str) -> chrono::DateTime<chrono::Utc> {
        s.parse().unwrap()
    }

    fn employee(id: &str, skills: &[&str]) -> Employee {
        Employee::new(
            id,
            id,
            format!("{id}@example.com"),
            skills
                .iter()
                .map(|name| Skill {
                    name: name.to_string(),
                    level: None,
                })
                .collect(),
        )
    }

    fn shift(id: &str, skills: &[&str], min: u32, max: u32, start: &str, end: &str) -> Shift {
        Shift::new(
            id,
            "dept-1",
            skills.iter().map(|s| s.to_string()).collect::<HashSet<_>>(),
            min,
            max,
            dt(start),
            dt(end),
        )
        .unwrap()
    }

    fn request(
        employees: Vec<Employee>,
        shifts: Vec<Shift>,
        constraints: Vec<Constraint>,
        objective: Objective,
    ) -> OptimizationRequest {
        OptimizationRequest {
            employees,
            shifts: shifts.clone(),
            constraints,
            current_schedules: Vec::new(),
            start_date: dt("2024-01-01T00:00:00Z"),
            end_date: dt("2024-01-02T00:00:00Z"),
            options: OptimizationOptions {
                objective,
                allow_overtime: false,
                max_optimization_time: 5,
                solution_count: 5,
            },
        }
    }

    #[test]
    fn staffing_bounds_are_respected() {
        let employees = vec![employee("emp-1", &[]), employee("emp-2", &[])];
        let shifts = vec![shift(
            "shift-1",
            &[],
            1,
            1,
            "2024-01-01T09:00:00Z",
            "2024-01-01T17:00:00Z",
        )];
        let req = request(employees, shifts.clone(), Vec::new(), Objective::Balance);
        let result = solve(&req, shifts).unwrap();
        assert_ne!(result.status, SolveStatus::Infeasible);
        for solution in &result.solutions {
            let count = solution.assignments.iter().filter(|a| a.shift_id == "shift-1").count();
            assert!((1..=1).contains(&count), "staffing bound violated: {count} assigned");
        }
    }

    #[test]
    fn skill_gating_excludes_unqualified_employee() {
        let employees = vec![employee("emp-1", &["nursing"]), employee("emp-2", &[])];
        let shifts = vec![shift(
            "shift-1",
            &["nursing"],
            1,
            1,
            "2024-01-01T09:00:00Z",
            "2024-01-01T17:00:00Z",
        )];
        let req = request(employees, shifts.clone(), Vec::new(), Objective::Balance);
        let result = solve(&req, shifts).unwrap();
        for solution in &result.solutions {
            for assignment in &solution.assignments {
                assert_eq!(assignment.employee_id, "emp-1");
            }
        }
    }

    #[test]
    fn back_to_back_shifts_are_not_constrained_by_min_rest() {
        let employees = vec![employee("emp-1", &[])];
        let shifts = vec![
            shift("shift-1", &[], 1, 1, "2024-01-01T09:00:00Z", "2024-01-01T17:00:00Z"),
            shift("shift-2", &[], 1, 1, "2024-01-01T17:00:00Z", "2024-01-02T01:00:00Z"),
        ];
        let constraints = vec![Constraint {
            id: "min-rest".to_string(),
            kind: ConstraintKind::MinRest { min_rest_hours: 2.0 },
            priority: 1,
            active: true,
        }];
        let req = request(employees, shifts.clone(), constraints, Objective::Balance);
        let result = solve(&req, shifts).unwrap();
        assert_ne!(
            result.status,
            SolveStatus::Infeasible,
            "a zero-gap pair must not be treated as a min-rest violation"
        );
    }

    #[test]
    fn gap_shorter_than_min_rest_threshold_is_constrained() {
        let employees = vec![employee("emp-1", &[])];
        let shifts = vec![
            shift("shift-1", &[], 1, 1, "2024-01-01T09:00:00Z", "2024-01-01T17:00:00Z"),
            shift("shift-2", &[], 1, 1, "2024-01-01T18:00:00Z", "2024-01-02T02:00:00Z"),
        ];
        let constraints = vec![Constraint {
            id: "min-rest".to_string(),
            kind: ConstraintKind::MinRest { min_rest_hours: 2.0 },
            priority: 1,
            active: true,
        }];
        let req = request(employees, shifts.clone(), constraints, Objective::Balance);
        let result = solve(&req, shifts).unwrap();
        assert_eq!(
            result.status,
            SolveStatus::Infeasible,
            "the lone employee can't legally cover both shifts, so minStaffing can't be met"
        );
    }

    #[test]
    fn collected_scores_do_not_increase_under_minimize_cost() {
        let employees = vec![employee("emp-1", &[]), employee("emp-2", &[])];
        let shifts = vec![
            shift("shift-1", &[], 0, 2, "2024-01-01T09:00:00Z", "2024-01-01T17:00:00Z"),
            shift("shift-2", &[], 0, 2, "2024-01-01T17:00:00Z", "2024-01-02T01:00:00Z"),
        ];
        let req = request(employees, shifts.clone(), Vec::new(), Objective::MinimizeCost);
        let result = solve(&req, shifts).unwrap();
        assert!(!result.solutions.is_empty());
        let first = result.solutions.first().unwrap().score;
        let last = result.solutions.last().unwrap().score;
        assert!(last <= first, "score regressed: first={first} last={last}");
    }
}
