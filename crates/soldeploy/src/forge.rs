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

//! Upstream compiler invocation.

use std::{path::Path, process::Command};

use eyre::{Result, WrapErr};
use tracing::info;

/// Runs `forge build` in the project root so artifacts are fresh before any
/// lookup happens. A failed build aborts the whole run; there is nothing
/// meaningful to generate from stale or missing artifacts.
pub fn run_forge_build(root: &Path) -> Result<()> {
    info!(root = %root.display(), "running forge build");
    let status = Command::new("forge")
        .arg("build")
        .current_dir(root)
        .status()
        .wrap_err("failed to spawn `forge build`; is foundry installed?")?;

    if !status.success() {
        eyre::bail!("`forge build` exited with {status}");
    }
    Ok(())
}
