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

//! soldeploy common - Shared functionality for soldeploy components
//!
//! This crate provides the compiled-artifact data model consumed by the
//! code generator, along with the error and logging plumbing shared by the
//! soldeploy binary and the codegen crate.

/// Parsed representation of one compiled-contract build artifact
pub mod artifact;
/// Error types shared across all soldeploy components
pub mod error;
/// Logging setup and utilities for consistent logging across soldeploy components
pub mod logging;

pub use artifact::*;
pub use error::*;
pub use logging::*;
