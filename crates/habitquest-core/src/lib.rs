//! # HabitQuest Core Library
//!
//! This library provides the progression engine for HabitQuest, a gamified
//! habit tracker. All operations are available via a standalone CLI binary;
//! any richer front end is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Setup**: onboarding state machine (five goals, pick two, three habits
//!   each) that gates the dashboard
//! - **Tracking**: per-day completion set, per-date history, lifetime count,
//!   with streak and level derived from them
//! - **Achievements**: catalog of rules re-evaluated after every change; the
//!   unlocked set only grows
//! - **Session**: load, debounced save and midnight reset against a
//!   per-user document store, gated on a verified identity
//!
//! ## Key Components
//!
//! - [`Dashboard`]: synchronous engine facade
//! - [`Session`]: async driver owning the background tasks
//! - [`DocumentStore`]: persistence collaborator ([`SqliteStore`], [`MemoryStore`])
//! - [`Config`]: application configuration management

pub mod achievements;
pub mod activity;
pub mod clock;
pub mod dashboard;
pub mod error;
pub mod identity;
pub mod progression;
pub mod session;
pub mod setup;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod streak;
pub mod sync;
pub mod tracker;

/// Date format used for history keys and the stored document.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub use achievements::{AchievementDefinition, AchievementEngine, AchievementView, CATALOG};
pub use activity::{ActivityEntry, GoalProgress, HeatmapCell, Intensity};
pub use clock::{Clock, ManualClock, SystemClock};
pub use dashboard::{Dashboard, DashboardView, Outcome, ToggleOutcome};
pub use error::{AuthError, ConfigError, CoreError, StageError, StoreError, ValidationError};
pub use identity::{AccessGate, IdentityProvider, StaticIdentity, User};
pub use progression::Progress;
pub use session::{Session, SessionHost};
pub use setup::{SetupMachine, Stage};
pub use snapshot::{Snapshot, SnapshotPatch};
pub use storage::Config;
pub use store::{DocumentStore, MemoryStore, SqliteStore};
pub use tracker::{CompletionKey, CompletionTracker};
