//! Application context.
//!
//! Built once at start-up and handed to every view. It owns the single
//! [`SetStore`] and [`ExerciseCache`] so that all controllers created from it
//! observe the same results.

use std::sync::Arc;

use crate::controller::SetListController;
use crate::exercises::ExerciseCache;
use crate::gateway::SetGateway;
use crate::query::QueryParams;
use crate::store::SetStore;

#[derive(Clone)]
pub struct AppContext {
    gateway: Arc<dyn SetGateway>,
    store: Arc<SetStore>,
    exercises: Arc<ExerciseCache>,
}

impl AppContext {
    pub fn new(gateway: Arc<dyn SetGateway>) -> Self {
        Self {
            store: Arc::new(SetStore::new(gateway.clone())),
            exercises: Arc::new(ExerciseCache::new(gateway.clone())),
            gateway,
        }
    }

    pub fn gateway(&self) -> &Arc<dyn SetGateway> {
        &self.gateway
    }

    pub fn store(&self) -> &Arc<SetStore> {
        &self.store
    }

    pub fn exercises(&self) -> &Arc<ExerciseCache> {
        &self.exercises
    }

    /// Creates a controller for a new view over the shared store.
    pub fn controller(&self, params: QueryParams) -> SetListController {
        SetListController::new(
            self.store.clone(),
            self.gateway.clone(),
            self.exercises.clone(),
            params,
        )
    }
}
