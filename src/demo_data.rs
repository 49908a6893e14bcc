//! Deterministic sample-request generator, used for manual exercising of
//! the HTTP surface and as input to the `bench` binary.

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

use crate::domain::{
    Constraint, ConstraintKind, Employee, Objective, OptimizationOptions, OptimizationRequest,
    Shift, Skill,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoSize {
    Small,
    Large,
}

impl std::str::FromStr for DemoSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SMALL" => Ok(DemoSize::Small),
            "LARGE" => Ok(DemoSize::Large),
            _ => Err(()),
        }
    }
}

pub fn list_demo_data() -> Vec<&'static str> {
    vec!["SMALL", "LARGE"]
}

struct Parameters {
    departments: Vec<&'static str>,
    required_skills: Vec<&'static str>,
    optional_skills: Vec<&'static str>,
    days_in_schedule: i64,
    employee_count: usize,
    optional_skill_distribution: Vec<(usize, f64)>,
}

impl DemoSize {
    fn parameters(self) -> Parameters {
        match self {
            DemoSize::Small => Parameters {
                departments: vec!["Ambulatory care", "Critical care", "Pediatric care"],
                required_skills: vec!["doctor", "nurse"],
                optional_skills: vec!["anaesthetics", "cardiology"],
                days_in_schedule: 14,
                employee_count: 15,
                optional_skill_distribution: vec![(1, 3.0), (2, 1.0)],
            },
            DemoSize::Large => Parameters {
                departments: vec![
                    "Ambulatory care",
                    "Neurology",
                    "Critical care",
                    "Pediatric care",
                    "Surgery",
                    "Radiology",
                ],
                required_skills: vec!["doctor", "nurse"],
                optional_skills: vec!["anaesthetics", "cardiology", "radiology"],
                days_in_schedule: 28,
                employee_count: 50,
                optional_skill_distribution: vec![(1, 3.0), (2, 1.0)],
            },
        }
    }
}

const FIRST_NAMES: &[&str] = &[
    "Amy", "Beth", "Carl", "Dan", "Elsa", "Flo", "Gus", "Hugo", "Ivy", "Jay",
];
const LAST_NAMES: &[&str] = &[
    "Cole", "Fox", "Green", "Jones", "King", "Li", "Poe", "Rye", "Smith", "Watt",
];

fn pick_count(rng: &mut StdRng, distribution: &[(usize, f64)]) -> usize {
    let total_weight: f64 = distribution.iter().map(|(_, w)| w).sum();
    let mut choice = rng.gen::<f64>() * total_weight;
    for (count, weight) in distribution {
        if choice < *weight {
            return *count;
        }
        choice -= weight;
    }
    distribution.last().map(|(c, _)| *c).unwrap_or(1)
}

fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Generates a demo optimization request for the given size.
pub fn generate(size: DemoSize) -> OptimizationRequest {
    let params = size.parameters();
    let mut rng = StdRng::seed_from_u64(0);
    let start_date = base_date();

    let employees: Vec<Employee> = (0..params.employee_count)
        .map(|i| {
            let first = FIRST_NAMES[i % FIRST_NAMES.len()];
            let last = LAST_NAMES[(i / FIRST_NAMES.len()) % LAST_NAMES.len()];
            let name = format!("{first} {last}");
            let email = format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase());

            let mut skills = vec![Skill {
                name: params.required_skills.choose(&mut rng).unwrap().to_string(),
                level: None,
            }];
            let optional_count = pick_count(&mut rng, &params.optional_skill_distribution);
            skills.extend(
                params
                    .optional_skills
                    .choose_multiple(&mut rng, optional_count.min(params.optional_skills.len()))
                    .map(|s| Skill {
                        name: s.to_string(),
                        level: None,
                    }),
            );

            Employee::new(format!("emp-{i}"), name, email, skills)
        })
        .collect();

    let shift_start_hours = [6, 14, 22];
    let mut shifts = Vec::new();
    let mut shift_idx = 0usize;

    for day in 0..params.days_in_schedule {
        let date = start_date + ChronoDuration::days(day);
        for department in &params.departments {
            for &hour in &shift_start_hours {
                let start_time = date + ChronoDuration::hours(hour);
                let end_time = start_time + ChronoDuration::hours(8);

                let mut required_skills = HashSet::new();
                required_skills.insert(
                    if rng.gen_bool(0.5) {
                        params.required_skills.choose(&mut rng)
                    } else {
                        params.optional_skills.choose(&mut rng)
                    }
                    .copied()
                    .unwrap_or("doctor")
                    .to_string(),
                );

                let shift = Shift::new(
                    format!("shift-{shift_idx}"),
                    department.to_string(),
                    required_skills,
                    1,
                    rng.gen_range(1..=3),
                    start_time,
                    end_time,
                )
                .expect("demo shift parameters are always valid");
                shifts.push(shift);
                shift_idx += 1;
            }
        }
    }

    let constraints = vec![
        Constraint {
            id: "max-hours".to_string(),
            kind: ConstraintKind::MaxHours {
                max_hours: 40.0,
                period_in_days: 7,
            },
            priority: 1,
            active: true,
        },
        Constraint {
            id: "min-rest".to_string(),
            kind: ConstraintKind::MinRest {
                min_rest_hours: 8.0,
            },
            priority: 1,
            active: true,
        },
        Constraint {
            id: "fair-distribution".to_string(),
            kind: ConstraintKind::FairDistribution,
            priority: 2,
            active: true,
        },
    ];

    let end_date = start_date + ChronoDuration::days(params.days_in_schedule);

    OptimizationRequest {
        employees,
        shifts,
        constraints,
        current_schedules: Vec::new(),
        start_date,
        end_date,
        options: OptimizationOptions {
            objective: Objective::Balance,
            allow_overtime: false,
            max_optimization_time: 30,
            solution_count: 3,
        },
    }
}
