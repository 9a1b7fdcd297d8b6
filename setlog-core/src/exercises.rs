//! Shared exercise cache.
//!
//! Sets only carry an exercise id; views resolve names and images here. The
//! whole collection is loaded in one unpaginated request and searched on the
//! client, which stops scaling once a user has a very large exercise library.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::error::GatewayError;
use crate::gateway::SetGateway;
use crate::models::{Exercise, NewExercise};
use crate::store::RefreshOutcome;

/// Loads follow the same ordering as [`SetStore`](crate::SetStore): a list is
/// applied only if no newer load was issued after it.
pub struct ExerciseCache {
    gateway: Arc<dyn SetGateway>,
    exercises: watch::Sender<Arc<Vec<Exercise>>>,
    issued: AtomicU64,
    loaded: AtomicBool,
    first_load: Mutex<()>,
}

impl ExerciseCache {
    pub fn new(gateway: Arc<dyn SetGateway>) -> Self {
        let (exercises, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            gateway,
            exercises,
            issued: AtomicU64::new(0),
            loaded: AtomicBool::new(false),
            first_load: Mutex::new(()),
        }
    }

    /// Returns true once at least one load has been applied.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Reloads every exercise. On failure the previous list is kept.
    ///
    /// The load counts as issued when this method is called.
    pub fn refresh(
        &self,
    ) -> impl Future<Output = Result<RefreshOutcome, GatewayError>> + Send + '_ {
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        async move {
            let exercises = self.gateway.list_exercises().await?;
            Ok(self.apply(sequence, exercises))
        }
    }

    /// Loads the list unless it has already been loaded. Concurrent callers
    /// share one request.
    pub async fn ensure_loaded(&self) -> Result<(), GatewayError> {
        if self.is_loaded() {
            return Ok(());
        }
        let _guard = self.first_load.lock().await;
        if !self.is_loaded() {
            self.refresh().await?;
        }
        Ok(())
    }

    fn apply(&self, sequence: u64, exercises: Vec<Exercise>) -> RefreshOutcome {
        let count = exercises.len();
        let mut outcome = RefreshOutcome::Applied { sequence };

        self.exercises.send_if_modified(|current| {
            let latest = self.issued.load(Ordering::SeqCst);
            if sequence != latest {
                outcome = RefreshOutcome::Superseded { sequence, latest };
                return false;
            }
            *current = Arc::new(exercises);
            true
        });

        match outcome {
            RefreshOutcome::Applied { .. } => {
                self.loaded.store(true, Ordering::SeqCst);
                tracing::debug!(sequence, count, "loaded exercises");
            }
            RefreshOutcome::Superseded { latest, .. } => {
                tracing::debug!(sequence, latest, "discarding superseded exercise list");
            }
        }
        outcome
    }

    pub fn all(&self) -> Arc<Vec<Exercise>> {
        self.exercises.borrow().clone()
    }

    /// Looks up an exercise by id. Unknown ids are simply not found.
    pub fn find(&self, exercise_id: &str) -> Option<Exercise> {
        self.exercises
            .borrow()
            .iter()
            .find(|e| e.id == exercise_id)
            .cloned()
    }

    /// Case-insensitive substring search over exercise names.
    pub fn search(&self, query: &str) -> Vec<Exercise> {
        let query = query.to_lowercase();
        self.exercises
            .borrow()
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Exercise>>> {
        self.exercises.subscribe()
    }

    /// Creates an exercise and reloads the list so every view sees it.
    pub async fn create(&self, new_exercise: &NewExercise) -> Result<Exercise, GatewayError> {
        new_exercise.validate()?;
        let created = self.gateway.create_exercise(new_exercise).await?;
        self.refresh().await?;
        Ok(created)
    }
}
