//! Per-user session.
//!
//! A [`Session`] owns one user's [`Dashboard`], loads it from a
//! [`DocumentStore`] on start, writes it back through a debounced save after
//! every change and runs the midnight reset loop. [`Session::teardown`] (and
//! `Drop`) cancels both background tasks, so nothing fires for a user who
//! signed out.
//!
//! [`SessionHost`] follows identity changes and keeps at most one session
//! alive.

use chrono::NaiveDateTime;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::achievements::AchievementView;
use crate::activity::HeatmapCell;
use crate::clock::{until_next_midnight, Clock};
use crate::dashboard::{Dashboard, DashboardView, Outcome, ToggleOutcome};
use crate::error::{Result, StoreError};
use crate::identity::{AccessGate, User};
use crate::setup::Stage;
use crate::snapshot::{Snapshot, SnapshotPatch};
use crate::storage::Config;
use crate::store::DocumentStore;
use crate::sync::Debouncer;
use crate::tracker::CompletionKey;

/// Whether an action result needs to be persisted.
trait Persist {
    fn needs_save(&self) -> bool;
}

impl Persist for Outcome {
    fn needs_save(&self) -> bool {
        self.changed
    }
}

impl Persist for ToggleOutcome {
    fn needs_save(&self) -> bool {
        true
    }
}

struct Inner {
    id: Uuid,
    user: User,
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    dashboard: Mutex<Dashboard>,
    debouncer: Mutex<Debouncer>,
    active: AtomicBool,
}

impl Inner {
    fn dashboard(&self) -> MutexGuard<'_, Dashboard> {
        self.dashboard.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn debouncer(&self) -> MutexGuard<'_, Debouncer> {
        self.debouncer.lock().unwrap_or_else(|p| p.into_inner())
    }

    async fn load(&self) -> Stage {
        let today = self.clock.now().date();
        let dashboard = match self.store.get_document(&self.user.id).await {
            Ok(Some(snapshot)) => snapshot.hydrate(today),
            Ok(None) => Dashboard::new(),
            Err(e) => {
                tracing::error!(session = %self.id, user = %self.user.id, error = %e, "snapshot load failed");
                Dashboard::failed()
            }
        };
        let stage = dashboard.stage();
        *self.dashboard() = dashboard;
        tracing::info!(session = %self.id, user = %self.user.id, %stage, "snapshot loaded");
        stage
    }

    async fn save(&self) -> std::result::Result<(), StoreError> {
        let today = self.clock.now().date();
        let patch = {
            let dashboard = self.dashboard();
            // An errored load holds defaults, not the user's data.
            if dashboard.stage() == Stage::Error {
                tracing::warn!(session = %self.id, user = %self.user.id, "load failed earlier, save skipped");
                return Ok(());
            }
            SnapshotPatch::from(Snapshot::capture(&dashboard, today))
        };
        match self.store.put_document(&self.user.id, &patch, true).await {
            Ok(()) => {
                tracing::info!(session = %self.id, user = %self.user.id, "snapshot saved");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(session = %self.id, user = %self.user.id, error = %e, "snapshot save failed");
                Err(e)
            }
        }
    }

    fn schedule_save(self: &Arc<Self>) {
        if !self.active.load(Ordering::SeqCst) {
            tracing::debug!(session = %self.id, "session inactive, save skipped");
            return;
        }
        if self.dashboard().stage() == Stage::Error {
            tracing::debug!(session = %self.id, "session at error stage, save skipped");
            return;
        }
        let inner = Arc::clone(self);
        self.debouncer().schedule(move || async move {
            // Failures are logged in save; the next change schedules another.
            let _ = inner.save().await;
        });
    }
}

async fn reset_loop(inner: Arc<Inner>) {
    loop {
        let wait = until_next_midnight(inner.clock.now());
        tracing::debug!(session = %inner.id, wait_secs = wait.as_secs(), "daily reset scheduled");
        tokio::time::sleep(wait).await;
        let outcome = inner.dashboard().reset_day();
        if outcome.changed {
            inner.schedule_save();
        }
    }
}

pub struct Session {
    inner: Arc<Inner>,
    reset_task: Option<JoinHandle<()>>,
}

impl Session {
    /// Load the user's snapshot and start the background tasks.
    ///
    /// # Errors
    /// Returns [`crate::error::AuthError::EmailNotVerified`] for an
    /// unverified user. Store failures do not fail the start: the session
    /// comes up at [`Stage::Error`] and can be retried with [`Session::reload`].
    pub async fn start(
        user: User,
        store: Arc<dyn DocumentStore>,
        config: &Config,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        AccessGate::check(Some(&user))?;
        let inner = Arc::new(Inner {
            id: Uuid::new_v4(),
            user,
            store,
            clock,
            dashboard: Mutex::new(Dashboard::new()),
            debouncer: Mutex::new(Debouncer::new(config.debounce())),
            active: AtomicBool::new(true),
        });
        inner.load().await;

        let reset_task = config
            .reset
            .enabled
            .then(|| tokio::spawn(reset_loop(Arc::clone(&inner))));

        Ok(Self { inner, reset_task })
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn user(&self) -> &User {
        &self.inner.user
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Re-run the load, e.g. to retry after [`Stage::Error`].
    pub async fn reload(&self) -> Stage {
        self.inner.debouncer().cancel();
        self.inner.load().await
    }

    /// Cancel any pending save and write now.
    pub async fn flush(&self) -> Result<()> {
        self.inner.debouncer().cancel();
        self.inner.save().await?;
        Ok(())
    }

    pub fn has_pending_save(&self) -> bool {
        self.inner.debouncer().is_pending()
    }

    /// Stop the reset loop and drop any pending save. Safe to call twice.
    pub fn teardown(&mut self) {
        let was_active = self.inner.active.swap(false, Ordering::SeqCst);
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
        self.inner.debouncer().cancel();
        if was_active {
            tracing::info!(session = %self.inner.id, user = %self.inner.user.id, "session torn down");
        }
    }

    fn now(&self) -> NaiveDateTime {
        self.inner.clock.now()
    }

    fn apply<T: Persist>(&self, action: impl FnOnce(&mut Dashboard, NaiveDateTime) -> Result<T>) -> Result<T> {
        let now = self.now();
        let result = action(&mut self.inner.dashboard(), now)?;
        if result.needs_save() {
            self.inner.schedule_save();
        }
        Ok(result)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn stage(&self) -> Stage {
        self.inner.dashboard().stage()
    }

    /// A copy of the current engine state.
    pub fn dashboard(&self) -> Dashboard {
        self.inner.dashboard().clone()
    }

    pub fn view(&self) -> DashboardView {
        let today = self.now().date();
        self.inner.dashboard().view(today)
    }

    pub fn heatmap(&self) -> Vec<HeatmapCell> {
        let today = self.now().date();
        self.inner.dashboard().heatmap(today)
    }

    pub fn achievement_views(&self) -> Vec<AchievementView> {
        self.inner.dashboard().achievement_views()
    }

    // ── Actions ──────────────────────────────────────────────────────

    pub fn set_goal_text(&self, index: usize, text: &str) -> Result<Outcome> {
        self.apply(|d, now| d.set_goal_text(index, text, now.date()))
    }

    pub fn submit_goals(&self) -> Result<Outcome> {
        self.apply(|d, now| d.submit_goals(now.date()))
    }

    pub fn toggle_goal_selection(&self, goal: &str) -> Result<Outcome> {
        self.apply(|d, now| d.toggle_goal_selection(goal, now.date()))
    }

    pub fn submit_selection(&self) -> Result<Outcome> {
        self.apply(|d, now| d.submit_selection(now.date()))
    }

    pub fn set_habit_text(&self, goal_index: usize, habit_index: usize, text: &str) -> Result<Outcome> {
        self.apply(|d, now| d.set_habit_text(goal_index, habit_index, text, now.date()))
    }

    pub fn submit_habits(&self) -> Result<Outcome> {
        self.apply(|d, now| d.submit_habits(now.date()))
    }

    pub fn toggle_completion(&self, key: CompletionKey) -> Result<ToggleOutcome> {
        self.apply(|d, now| d.toggle_completion(key, now))
    }

    pub fn edit_goal(&self, index: usize, text: &str) -> Result<Outcome> {
        self.apply(|d, now| d.edit_goal(index, text, now.date()))
    }

    pub fn edit_habit(&self, goal_index: usize, habit_index: usize, text: &str) -> Result<Outcome> {
        self.apply(|d, now| d.edit_habit(goal_index, habit_index, text, now.date()))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Keeps the session in step with the identity provider.
pub struct SessionHost {
    store: Arc<dyn DocumentStore>,
    config: Config,
    clock: Arc<dyn Clock>,
    current: Option<Session>,
}

impl SessionHost {
    pub fn new(store: Arc<dyn DocumentStore>, config: Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
            current: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// React to a new auth state. A verified user gets a session (reusing
    /// the current one if it is theirs); anything else ends it.
    pub async fn on_auth_change(&mut self, user: Option<User>) -> Result<AccessGate> {
        let gate = AccessGate::for_user(user.as_ref());
        match (gate, user) {
            (AccessGate::Ready, Some(user)) => {
                if self.current.as_ref().is_some_and(|s| s.user().id == user.id) {
                    return Ok(gate);
                }
                self.end();
                let session =
                    Session::start(user, Arc::clone(&self.store), &self.config, Arc::clone(&self.clock))
                        .await?;
                self.current = Some(session);
            }
            _ => self.end(),
        }
        Ok(gate)
    }

    /// Apply auth changes until the provider goes away.
    pub async fn follow(&mut self, mut rx: watch::Receiver<Option<User>>) -> Result<()> {
        let user = rx.borrow_and_update().clone();
        self.on_auth_change(user).await?;
        while rx.changed().await.is_ok() {
            let user = rx.borrow_and_update().clone();
            self.on_auth_change(user).await?;
        }
        Ok(())
    }

    fn end(&mut self) {
        if let Some(mut session) = self.current.take() {
            session.teardown();
        }
    }
}
