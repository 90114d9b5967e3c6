// soldeploy - Solidity Deployer Generator
// Copyright (C) 2025 The soldeploy contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Logging configuration for soldeploy components
//!
//! Provides centralized console logging setup with environment variable
//! support (`RUST_LOG`) and a safe, idempotent initializer for tests.

use std::sync::Once;

use eyre::Result;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Initialize console logging for the soldeploy binary.
///
/// Respects `RUST_LOG` when set and falls back to the given default level
/// otherwise. Generation is a batch tool, so output stays compact: no
/// timestamps beyond the subscriber default, no file logging.
pub fn init_logging(default_level: Level) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level.as_str()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to initialize logging: {}", e))?;

    Ok(())
}

// Global test logging initialization - ensures logging is only set up once across all tests
static TEST_LOGGING_INIT: Once = Once::new();

/// Safe logging initialization for tests - can be called multiple times
/// without crashing.
///
/// Uses [`std::sync::Once`] so only the first call in a test process
/// installs a subscriber; later calls (and races with subscribers installed
/// elsewhere) are silently ignored.
pub fn ensure_test_logging(default_level: Option<Level>) {
    TEST_LOGGING_INIT.call_once(|| {
        let default_level = default_level.unwrap_or(Level::INFO);
        // Ignore errors: a subscriber installed by another harness is fine.
        let _ = init_logging(default_level);
    });
}
