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

use thiserror::Error;

/// Errors raised while parsing artifacts and generating deployer sources.
///
/// All variants are deterministic functions of the input artifacts; none of
/// them is worth retrying. In a batch run each error is scoped to a single
/// contract and must not abort generation for its siblings.
#[derive(Debug, Error)]
pub enum SoldeployError {
    /// The artifact document exists but cannot be understood.
    #[error("malformed artifact for `{name}`: {reason}")]
    MalformedArtifact {
        /// Contract the artifact was parsed for.
        name: String,
        /// Human-readable parse failure.
        reason: String,
    },

    /// The artifact carries no creation bytecode, so there is nothing to
    /// deploy (interface or abstract contract).
    #[error("`{0}` has no creation bytecode (interface or abstract contract?)")]
    MissingBytecode(String),

    /// No artifact matches the requested contract name.
    #[error("no artifact found for `{0}`")]
    ArtifactNotFound(String),

    /// More than one artifact matches the requested contract name.
    #[error("multiple artifacts found for `{name}`: {candidates:?}")]
    AmbiguousArtifact {
        /// Contract name that was looked up.
        name: String,
        /// Every artifact path that matched.
        candidates: Vec<String>,
    },

    /// A library transitively depends on itself.
    #[error("circular library dependency via `{file}:{library}`")]
    CircularDependency {
        /// Source file declaring the offending library.
        file: String,
        /// Name of the offending library.
        library: String,
    },

    /// Two resolved libraries map to the same generated identifier and
    /// disambiguation is disabled.
    #[error("colliding deployer identifier `{0}`")]
    CollidingIdentifier(String),

    /// Filesystem failure while locating or reading artifacts.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout soldeploy.
pub type Result<T, E = SoldeployError> = std::result::Result<T, E>;
