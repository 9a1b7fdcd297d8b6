//! In-memory gateway for tests.
//!
//! Serves pages from a local collection, and lets a test hold back the
//! response for specific query parameters to force out-of-order completions.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Notify;

use super::SetGateway;
use crate::error::GatewayError;
use crate::models::{Exercise, ExerciseSet, NewExercise, NewSet, SetPage, SortKey, SortOrder};
use crate::query::QueryParams;

#[derive(Default)]
pub(crate) struct ScriptedGateway {
    sets: Mutex<Vec<ExerciseSet>>,
    exercises: Mutex<Vec<Exercise>>,
    gates: Mutex<HashMap<QueryParams, Arc<Notify>>>,
    exercise_gate: Mutex<Option<Arc<Notify>>>,
    list_failure: Mutex<Option<GatewayError>>,
    exercise_failure: Mutex<Option<GatewayError>>,
    delete_failure: Mutex<Option<GatewayError>>,
    list_calls: Mutex<Vec<QueryParams>>,
    exercise_calls: Mutex<usize>,
}

pub(crate) fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
}

pub(crate) fn set(id: &str, exercise: &str, reps: u32, weight: f64, day: u32) -> ExerciseSet {
    ExerciseSet {
        id: id.to_string(),
        exercise: exercise.to_string(),
        reps: Some(reps),
        weight: Some(weight),
        created_at: at(day),
    }
}

pub(crate) fn exercise(id: &str, name: &str) -> Exercise {
    Exercise {
        id: id.to_string(),
        name: name.to_string(),
        image_url: None,
    }
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sets(sets: Vec<ExerciseSet>) -> Self {
        let gateway = Self::new();
        *gateway.sets.lock().unwrap() = sets;
        gateway
    }

    pub fn with_exercises(self, exercises: Vec<Exercise>) -> Self {
        self.set_exercises(exercises);
        self
    }

    /// Holds back the next `list_sets` response for `params` until the
    /// returned handle is notified.
    pub fn hold(&self, params: &QueryParams) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(params.clone(), gate.clone());
        gate
    }

    /// Holds back the next `list_exercises` response until notified.
    pub fn hold_exercises(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.exercise_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn set_exercises(&self, exercises: Vec<Exercise>) {
        *self.exercises.lock().unwrap() = exercises;
    }

    pub fn exercises(&self) -> Vec<Exercise> {
        self.exercises.lock().unwrap().clone()
    }

    pub fn fail_next_exercises(&self, err: GatewayError) {
        *self.exercise_failure.lock().unwrap() = Some(err);
    }

    pub fn fail_next_list(&self, err: GatewayError) {
        *self.list_failure.lock().unwrap() = Some(err);
    }

    pub fn fail_next_delete(&self, err: GatewayError) {
        *self.delete_failure.lock().unwrap() = Some(err);
    }

    pub fn list_calls(&self) -> Vec<QueryParams> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn exercise_calls(&self) -> usize {
        *self.exercise_calls.lock().unwrap()
    }

    fn page_for(&self, params: &QueryParams) -> SetPage {
        let mut matching: Vec<ExerciseSet> = self
            .sets
            .lock()
            .unwrap()
            .iter()
            .filter(|s| {
                params
                    .exercise_filter
                    .as_ref()
                    .map_or(true, |ex| &s.exercise == ex)
            })
            .filter(|s| params.date_start.map_or(true, |d| s.created_at.date_naive() >= d))
            .filter(|s| params.date_end.map_or(true, |d| s.created_at.date_naive() <= d))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = match params.sort_key {
                SortKey::Reps => a.reps.cmp(&b.reps),
                SortKey::Weight => a
                    .weight
                    .partial_cmp(&b.weight)
                    .unwrap_or(Ordering::Equal),
                SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            match params.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let size = params.page_size() as usize;
        let total_pages = matching.len().div_ceil(size) as u32;
        let items = matching
            .into_iter()
            .skip((params.page() as usize - 1) * size)
            .take(size)
            .collect();

        SetPage::new(items, total_pages)
    }
}

#[async_trait]
impl SetGateway for ScriptedGateway {
    async fn list_sets(&self, params: &QueryParams) -> Result<SetPage, GatewayError> {
        self.list_calls.lock().unwrap().push(params.clone());

        // The response reflects the collection at the time the request was issued.
        let outcome = match self.list_failure.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(self.page_for(params)),
        };

        let gate = self.gates.lock().unwrap().remove(params);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        outcome
    }

    async fn create_set(&self, new_set: &NewSet) -> Result<(), GatewayError> {
        new_set.validate()?;
        let mut sets = self.sets.lock().unwrap();
        let id = format!("s{}", sets.len() + 1);
        sets.push(ExerciseSet {
            id,
            exercise: new_set.exercise.clone(),
            reps: new_set.reps,
            weight: new_set.weight,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn delete_set(&self, set_id: &str) -> Result<(), GatewayError> {
        if let Some(err) = self.delete_failure.lock().unwrap().take() {
            return Err(err);
        }
        self.sets.lock().unwrap().retain(|s| s.id != set_id);
        Ok(())
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>, GatewayError> {
        *self.exercise_calls.lock().unwrap() += 1;

        let outcome = match self.exercise_failure.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(self.exercises()),
        };

        let gate = self.exercise_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        outcome
    }

    async fn get_exercise(&self, exercise_id: &str) -> Result<Exercise, GatewayError> {
        self.exercises
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == exercise_id)
            .cloned()
            .ok_or_else(|| GatewayError::ServerFault {
                status: 404,
                message: "Exercise not found".to_string(),
            })
    }

    async fn create_exercise(
        &self,
        new_exercise: &NewExercise,
    ) -> Result<Exercise, GatewayError> {
        new_exercise.validate()?;
        let mut exercises = self.exercises.lock().unwrap();
        let created = Exercise {
            id: format!("ex{}", exercises.len() + 1),
            name: new_exercise.name.clone(),
            image_url: new_exercise.image_url.clone(),
        };
        exercises.push(created.clone());
        Ok(created)
    }
}
