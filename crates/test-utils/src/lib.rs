//! Test fixtures and mock collaborators for the floe workspace.
//!
//! The mocks keep all their state in the same [`floe_db::Store`] the engine
//! uses, so a handler's overlay rolls mock bank transfers back exactly the
//! way the real framework's cache context would.

use std::sync::Once;

use floe_common::logging::{self, LoggerConfig};

pub mod bank;
pub mod channels;
pub mod fixtures;
pub mod mirror;
pub mod transfer;

pub use bank::MockBank;
pub use channels::MockChannels;
pub use fixtures::{default_host_zone, remote_address, test_address, test_env, TestEnv};
pub use mirror::MockStakingMirror;
pub use transfer::MockTransfer;

static LOGGING: Once = Once::new();

/// Installs the tracing subscriber once per test binary; respects
/// `RUST_LOG` via the standard env filter.
pub fn init_test_logging() {
    LOGGING.call_once(|| logging::init(LoggerConfig::with_base_name("(floe-tests)")));
}
