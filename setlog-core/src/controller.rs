//! Per-view controller for a list of sets.
//!
//! A controller owns one view's query parameters and turns user actions into
//! store refreshes. Several controllers can share one [`SetStore`]; they all
//! display the same current page, whichever of them refreshed it last.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::GatewayError;
use crate::exercises::ExerciseCache;
use crate::gateway::SetGateway;
use crate::models::{Exercise, ExerciseSet, SetPage, SortKey, SortOrder};
use crate::query::QueryParams;
use crate::store::{RefreshOutcome, SetStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// Short-lived status message for the user (a snackbar on mobile).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            message: message.into(),
        }
    }
}

/// A set joined with its exercise, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct SetRow {
    pub set: ExerciseSet,
    /// `None` when the exercise is unknown to the cache
    pub exercise_name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug)]
struct ViewState {
    params: QueryParams,
    notice: Option<Notice>,
}

pub struct SetListController {
    store: Arc<SetStore>,
    gateway: Arc<dyn SetGateway>,
    exercises: Arc<ExerciseCache>,
    state: Mutex<ViewState>,
}

impl SetListController {
    pub fn new(
        store: Arc<SetStore>,
        gateway: Arc<dyn SetGateway>,
        exercises: Arc<ExerciseCache>,
        params: QueryParams,
    ) -> Self {
        Self {
            store,
            gateway,
            exercises,
            state: Mutex::new(ViewState {
                params,
                notice: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn params(&self) -> QueryParams {
        self.lock().params.clone()
    }

    /// First display: loads the exercise list (once) and the current page.
    ///
    /// A failed exercise load only leaves names unresolved; it is reported as
    /// a notice and does not fail the mount.
    pub async fn mount(&self) -> Result<RefreshOutcome, GatewayError> {
        let refresh = {
            let state = self.lock();
            self.store.refresh(&state.params)
        };

        let (exercises, sets) = futures::join!(self.exercises.ensure_loaded(), refresh);

        if let Err(e) = exercises {
            tracing::warn!("Failed to load exercises: {}", e);
            self.notify(Notice::failure(format!("Failed to load exercises: {}", e)));
        }
        self.report(sets)
    }

    /// Adopts `params` and refreshes, unless they equal the current ones.
    ///
    /// Returns `Ok(None)` when nothing changed.
    pub async fn on_parameters_changed(
        &self,
        params: QueryParams,
    ) -> Result<Option<RefreshOutcome>, GatewayError> {
        self.change(|_| params).await
    }

    /// Restricts the view to one exercise (`None` shows every exercise).
    pub async fn set_exercise_filter(
        &self,
        exercise_id: Option<String>,
    ) -> Result<Option<RefreshOutcome>, GatewayError> {
        self.change(|p| p.with_exercise_filter(exercise_id)).await
    }

    pub async fn set_date_range(
        &self,
        start: Option<chrono::NaiveDate>,
        end: Option<chrono::NaiveDate>,
    ) -> Result<Option<RefreshOutcome>, GatewayError> {
        self.change(|p| p.with_date_range(start, end)).await
    }

    /// Column-header behaviour: the active key flips direction, a new key
    /// starts descending.
    pub async fn sort_by(&self, key: SortKey) -> Result<Option<RefreshOutcome>, GatewayError> {
        self.change(|p| p.toggle_sort(key)).await
    }

    pub async fn set_sort(
        &self,
        key: SortKey,
        order: SortOrder,
    ) -> Result<Option<RefreshOutcome>, GatewayError> {
        self.change(|p| p.with_sort(key, order)).await
    }

    pub async fn go_to_page(&self, page: u32) -> Result<Option<RefreshOutcome>, GatewayError> {
        self.change(|p| p.with_page(page)).await
    }

    /// Re-requests the current parameters.
    pub async fn reload(&self) -> Result<RefreshOutcome, GatewayError> {
        let refresh = {
            let state = self.lock();
            self.store.refresh(&state.params)
        };
        self.report(refresh.await)
    }

    /// Deletes a set on the server, then refreshes the shared page with this
    /// view's parameters. Nothing is removed locally before the server agrees.
    pub async fn delete(&self, set_id: &str) -> Result<RefreshOutcome, GatewayError> {
        if let Err(e) = self.gateway.delete_set(set_id).await {
            tracing::warn!(set_id, "Failed to delete set: {}", e);
            let message = if e.is_session_ended() {
                e.to_string()
            } else {
                "Failed to delete set. Try again.".to_string()
            };
            self.notify(Notice::failure(message));
            return Err(e);
        }

        tracing::info!(set_id, "set deleted");
        self.notify(Notice::success("Set deleted successfully!"));
        self.reload().await
    }

    /// Current shared page.
    pub fn page(&self) -> Arc<SetPage> {
        self.store.current()
    }

    pub fn total_pages(&self) -> u32 {
        self.store.current().total_pages
    }

    /// Current page with each set's exercise resolved from the cache.
    pub fn rows(&self) -> Vec<SetRow> {
        self.store
            .current()
            .items
            .iter()
            .map(|set| {
                let exercise = self.exercises.find(&set.exercise);
                SetRow {
                    set: set.clone(),
                    exercise_name: exercise.as_ref().map(|e| e.name.clone()),
                    image_url: exercise.and_then(|e| e.image_url),
                }
            })
            .collect()
    }

    /// The exercise this view is filtered to, if any and if known.
    pub fn scoped_exercise(&self) -> Option<Exercise> {
        let filter = self.lock().params.exercise_filter.clone()?;
        self.exercises.find(&filter)
    }

    /// Takes the pending notice, if any. Each notice is shown once.
    pub fn take_notice(&self) -> Option<Notice> {
        self.lock().notice.take()
    }

    fn notify(&self, notice: Notice) {
        self.lock().notice = Some(notice);
    }

    /// Applies a parameter transition and issues the refresh under the same
    /// lock, so the order of changes is the order of issued requests.
    ///
    /// If the refresh fails the previous parameters are restored, unless a
    /// later change has replaced them in the meantime.
    async fn change<F>(&self, transition: F) -> Result<Option<RefreshOutcome>, GatewayError>
    where
        F: FnOnce(&QueryParams) -> QueryParams,
    {
        let pending = {
            let mut state = self.lock();
            let next = transition(&state.params);
            if next == state.params {
                None
            } else {
                let previous = std::mem::replace(&mut state.params, next.clone());
                Some((self.store.refresh(&next), previous, next))
            }
        };

        let Some((refresh, previous, next)) = pending else {
            return Ok(None);
        };

        let result = refresh.await;
        if result.is_err() {
            let mut state = self.lock();
            if state.params == next {
                state.params = previous;
            }
        }
        self.report(result).map(Some)
    }

    fn report(
        &self,
        result: Result<RefreshOutcome, GatewayError>,
    ) -> Result<RefreshOutcome, GatewayError> {
        if let Err(e) = &result {
            tracing::warn!("Failed to load sets: {}", e);
            let message = if e.is_session_ended() {
                e.to_string()
            } else {
                format!("Failed to load sets: {}", e)
            };
            self.notify(Notice::failure(message));
        }
        result
    }
}

impl std::fmt::Debug for SetListController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetListController")
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::scripted::{exercise, set, ScriptedGateway};

    struct Harness {
        gateway: Arc<ScriptedGateway>,
        store: Arc<SetStore>,
        exercises: Arc<ExerciseCache>,
    }

    impl Harness {
        fn new(sets: Vec<ExerciseSet>) -> Self {
            let gateway = Arc::new(ScriptedGateway::with_sets(sets).with_exercises(vec![
                exercise("ex1", "Bench Press"),
                exercise("ex2", "Squat"),
            ]));
            Self {
                store: Arc::new(SetStore::new(gateway.clone())),
                exercises: Arc::new(ExerciseCache::new(gateway.clone())),
                gateway,
            }
        }

        fn controller(&self, params: QueryParams) -> SetListController {
            SetListController::new(
                self.store.clone(),
                self.gateway.clone(),
                self.exercises.clone(),
                params,
            )
        }
    }

    fn two_sets() -> Vec<ExerciseSet> {
        vec![set("a", "ex1", 10, 50.0, 2), set("b", "ex2", 8, 40.0, 1)]
    }

    #[tokio::test]
    async fn test_mount_loads_first_page() {
        let harness = Harness::new(two_sets());
        let controller = harness.controller(QueryParams::new());

        let outcome = controller.mount().await.unwrap();
        assert!(outcome.is_applied());

        let page = controller.page();
        assert_eq!(page.ids(), vec!["a", "b"]);
        assert_eq!(page.items[0].reps, Some(10));
        assert_eq!(page.items[0].weight, Some(50.0));
        assert_eq!(page.items[1].reps, Some(8));
        assert_eq!(controller.total_pages(), 1);
        assert!(harness.exercises.is_loaded());
    }

    #[tokio::test]
    async fn test_delete_then_refresh_excludes_deleted() {
        let harness = Harness::new(two_sets());
        let controller = harness.controller(QueryParams::new());
        controller.mount().await.unwrap();

        let outcome = controller.delete("a").await.unwrap();
        assert!(outcome.is_applied());

        let page = controller.page();
        assert_eq!(page.ids(), vec!["b"]);
        assert!(!page.contains("a"));
        assert_eq!(page.total_pages, 1);
        assert_eq!(
            controller.take_notice(),
            Some(Notice::success("Set deleted successfully!"))
        );
        assert!(controller.take_notice().is_none());

        let calls = harness.gateway.list_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[tokio::test]
    async fn test_failed_delete_changes_nothing() {
        let harness = Harness::new(two_sets());
        let controller = harness.controller(QueryParams::new());
        controller.mount().await.unwrap();
        let before = controller.page();

        harness
            .gateway
            .fail_next_delete(GatewayError::ServerFault {
                status: 500,
                message: "boom".to_string(),
            });
        assert!(controller.delete("a").await.is_err());

        assert!(Arc::ptr_eq(&before, &controller.page()));
        assert_eq!(harness.gateway.list_calls().len(), 1);
        assert_eq!(
            controller.take_notice(),
            Some(Notice::failure("Failed to delete set. Try again."))
        );
    }

    #[tokio::test]
    async fn test_filter_change_supersedes_pending_unfiltered_load() {
        let harness = Harness::new(two_sets());
        let controller = harness.controller(QueryParams::new());
        let mut observer = harness.store.subscribe();

        let slow = harness.gateway.hold(&QueryParams::new());
        let mut mount = std::pin::pin!(controller.mount());
        assert!(futures::poll!(&mut mount).is_pending());

        let filtered = controller
            .set_exercise_filter(Some("ex1".to_string()))
            .await
            .unwrap();
        assert!(filtered.unwrap().is_applied());
        assert_eq!(observer.borrow_and_update().ids(), vec!["a"]);

        slow.notify_one();
        let unfiltered = mount.await.unwrap();
        assert!(!unfiltered.is_applied());
        assert!(!observer.has_changed().unwrap());
        assert_eq!(controller.page().ids(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_sort_toggle_cycle() {
        let harness = Harness::new(two_sets());
        let controller = harness.controller(QueryParams::new());
        controller.mount().await.unwrap();

        controller.sort_by(SortKey::CreatedAt).await.unwrap();
        assert_eq!(controller.params().sort_order, SortOrder::Asc);
        assert_eq!(controller.page().ids(), vec!["b", "a"]);

        controller.sort_by(SortKey::CreatedAt).await.unwrap();
        assert_eq!(controller.params().sort_order, SortOrder::Desc);
        assert_eq!(controller.params(), QueryParams::new());

        controller.sort_by(SortKey::CreatedAt).await.unwrap();
        controller.sort_by(SortKey::Weight).await.unwrap();
        assert_eq!(controller.params().sort_key, SortKey::Weight);
        assert_eq!(controller.params().sort_order, SortOrder::Desc);
        assert_eq!(controller.page().ids(), vec!["a", "b"]);

        assert_eq!(harness.gateway.list_calls().len(), 5);
    }

    #[tokio::test]
    async fn test_unchanged_parameters_do_not_refresh() {
        let harness = Harness::new(two_sets());
        let controller = harness.controller(QueryParams::for_exercise("ex1"));
        controller.mount().await.unwrap();

        let outcome = controller
            .on_parameters_changed(QueryParams::for_exercise("ex1"))
            .await
            .unwrap();
        assert!(outcome.is_none());
        assert!(controller
            .set_exercise_filter(Some("ex1".to_string()))
            .await
            .unwrap()
            .is_none());
        assert_eq!(harness.gateway.list_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_paging_and_reset_on_filter_change() {
        let sets = (1..=12)
            .map(|day| set(&format!("s{}", day), "ex1", day, 20.0, day))
            .collect();
        let harness = Harness::new(sets);
        let controller = harness.controller(QueryParams::new());
        controller.mount().await.unwrap();
        assert_eq!(controller.total_pages(), 2);
        assert_eq!(controller.page().items.len(), 10);

        controller.sort_by(SortKey::Reps).await.unwrap();
        controller.go_to_page(2).await.unwrap();
        let params = controller.params();
        assert_eq!(params.page(), 2);
        assert_eq!(params.sort_key, SortKey::Reps);
        assert_eq!(controller.page().ids(), vec!["s2", "s1"]);

        controller
            .set_date_range(chrono::NaiveDate::from_ymd_opt(2024, 1, 5), None)
            .await
            .unwrap();
        assert_eq!(controller.params().page(), 1);
        assert_eq!(controller.total_pages(), 1);
        assert_eq!(controller.page().items.len(), 8);
    }

    #[tokio::test]
    async fn test_controllers_share_the_store() {
        let harness = Harness::new(two_sets());
        let history = harness.controller(QueryParams::new());
        let scoped = harness.controller(QueryParams::for_exercise("ex2"));

        history.mount().await.unwrap();
        scoped.mount().await.unwrap();
        assert!(Arc::ptr_eq(&history.page(), &scoped.page()));
        assert_eq!(history.page().ids(), vec!["b"]);

        history.delete("b").await.unwrap();
        assert!(Arc::ptr_eq(&history.page(), &scoped.page()));
        assert_eq!(scoped.page().ids(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_rows_resolve_exercises() {
        let mut sets = two_sets();
        sets.push(set("c", "gone", 5, 10.0, 3));
        let harness = Harness::new(sets);
        let controller = harness.controller(QueryParams::new());
        controller.mount().await.unwrap();

        let rows = controller.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].set.id, "c");
        assert_eq!(rows[0].exercise_name, None);
        assert_eq!(rows[1].exercise_name.as_deref(), Some("Bench Press"));
        assert_eq!(rows[2].exercise_name.as_deref(), Some("Squat"));
    }

    #[tokio::test]
    async fn test_scoped_exercise() {
        let harness = Harness::new(two_sets());
        let scoped = harness.controller(QueryParams::for_exercise("ex2"));
        scoped.mount().await.unwrap();
        assert_eq!(scoped.scoped_exercise().unwrap().name, "Squat");

        let unscoped = harness.controller(QueryParams::new());
        assert!(unscoped.scoped_exercise().is_none());
    }

    #[tokio::test]
    async fn test_load_failure_sets_notice_and_keeps_page() {
        let harness = Harness::new(two_sets());
        let controller = harness.controller(QueryParams::new());
        controller.mount().await.unwrap();

        harness.gateway.fail_next_list(GatewayError::Unauthorized);
        let err = controller.go_to_page(2).await.unwrap_err();
        assert!(err.is_session_ended());
        assert_eq!(controller.page().ids(), vec!["a", "b"]);

        let notice = controller.take_notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Failure);
        assert_eq!(notice.message, GatewayError::Unauthorized.to_string());
    }

    #[tokio::test]
    async fn test_failed_page_change_can_be_retried() {
        let sets = (1..=25)
            .map(|day| set(&format!("s{}", day), "ex1", 5, 20.0, day))
            .collect();
        let harness = Harness::new(sets);
        let controller = harness.controller(QueryParams::new());
        controller.mount().await.unwrap();
        assert_eq!(controller.total_pages(), 3);

        harness
            .gateway
            .fail_next_list(GatewayError::NetworkFailure("offline".into()));
        assert!(controller.go_to_page(2).await.is_err());

        // Parameters still describe the page on screen
        assert_eq!(controller.params().page(), 1);
        assert_eq!(controller.page().items[0].id, "s25");
        assert!(controller.take_notice().is_some());

        let outcome = controller.go_to_page(2).await.unwrap();
        assert!(outcome.is_some_and(|o| o.is_applied()));
        assert_eq!(harness.gateway.list_calls().len(), 3);
        assert_eq!(controller.params().page(), 2);
        assert_eq!(controller.page().items[0].id, "s15");
    }

    #[tokio::test]
    async fn test_failed_filter_change_restores_previous_filter() {
        let harness = Harness::new(two_sets());
        let controller = harness.controller(QueryParams::new());
        controller.mount().await.unwrap();

        harness
            .gateway
            .fail_next_list(GatewayError::ServerFault {
                status: 500,
                message: "boom".into(),
            });
        assert!(controller
            .set_exercise_filter(Some("ex1".to_string()))
            .await
            .is_err());
        assert_eq!(controller.params().exercise_filter, None);

        let outcome = controller
            .set_exercise_filter(Some("ex1".to_string()))
            .await
            .unwrap();
        assert!(outcome.is_some());
        assert_eq!(controller.page().ids(), vec!["a"]);
    }
}
