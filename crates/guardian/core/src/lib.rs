//! Guardian Core
//!
//! Foreground-app monitoring and interception engine.
//!
//! A foreground-change event flows through [`classifier::classify`] with a
//! fresh [`config::BlockingConfig`] snapshot. An intercept decision is handed
//! to the [`dispatcher::Dispatcher`], which asks a [`dispatcher::Presenter`]
//! to seize the foreground. [`lifecycle::LifecycleController`] owns the
//! running flag and the store handle.

pub mod capability;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod event;
pub mod exclusion;
pub mod lifecycle;
pub mod notice;

pub use classifier::{Decision, classify};
pub use config::{BlockingConfig, ConfigStore};
pub use event::{EventKind, ForegroundEvent};
pub use exclusion::ExclusionList;
pub use lifecycle::{LifecycleController, RunningState, RunningStateReader};

/// Identifier of the guardian app itself.
pub const GUARDIAN_APP_ID: &str = "com.predator.app_guardian";
