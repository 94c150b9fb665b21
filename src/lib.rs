pub mod accessibility;
pub mod config;
pub mod enforcer;
pub mod ipc;
pub mod packages;
pub mod permissions;
pub mod presenter;
pub mod store;

pub use config::GuardianConfig;
pub use enforcer::{Enforcer, ShellEnforcer};
