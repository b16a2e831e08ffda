use std::collections::BTreeMap;

use crate::session::workout::{ExerciseRecord, PlanTemplate, Set, WEEKDAYS, day_key};

fn sets(count: usize, reps: u32, weight: f64) -> Vec<Set> {
    vec![Set::new(reps, weight); count]
}

fn exercise(name: &str, count: usize, reps: u32, weight: f64) -> ExerciseRecord {
    ExerciseRecord::new(name, sets(count, reps, weight))
}

/// The week a new user starts with.
pub fn default_week() -> BTreeMap<String, PlanTemplate> {
    WEEKDAYS
        .iter()
        .map(|&weekday| {
            let key = day_key(weekday);
            let plan = match key {
                "monday" => PlanTemplate::new(
                    "Push",
                    vec![
                        exercise("Bench Press", 3, 8, 60.0),
                        exercise("Overhead Press", 3, 8, 35.0),
                        exercise("Incline Dumbbell Press", 3, 10, 20.0),
                        exercise("Triceps Pushdown", 3, 12, 25.0),
                    ],
                ),
                "tuesday" => PlanTemplate::new(
                    "Pull",
                    vec![
                        exercise("Deadlift", 3, 5, 100.0),
                        exercise("Barbell Row", 3, 8, 50.0),
                        exercise("Lat Pulldown", 3, 10, 45.0),
                        exercise("Biceps Curl", 3, 12, 12.0),
                    ],
                ),
                "thursday" => PlanTemplate::new(
                    "Legs",
                    vec![
                        exercise("Squat", 3, 5, 80.0),
                        exercise("Romanian Deadlift", 3, 8, 60.0),
                        exercise("Leg Press", 3, 10, 120.0),
                        exercise("Calf Raise", 3, 15, 40.0),
                    ],
                ),
                "friday" => PlanTemplate::new(
                    "Upper",
                    vec![
                        exercise("Weighted Pull-up", 3, 6, 10.0),
                        exercise("Dumbbell Bench Press", 3, 10, 24.0),
                        exercise("Face Pull", 3, 15, 15.0),
                    ],
                ),
                "saturday" => PlanTemplate::new(
                    "Lower",
                    vec![
                        exercise("Front Squat", 3, 6, 60.0),
                        exercise("Hip Thrust", 3, 10, 70.0),
                        exercise("Walking Lunge", 3, 12, 16.0),
                    ],
                ),
                _ => PlanTemplate::rest(),
            };
            (key.to_string(), plan)
        })
        .collect()
}
