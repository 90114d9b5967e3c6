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

//! soldeploy codegen - Deployer source generation
//!
//! Turns a parsed build artifact into one self-contained Solidity library
//! that deterministically deploys the contract, including any linked
//! libraries it transitively depends on. The pipeline is synchronous and
//! pure: resolve libraries, segment bytecode around link slots, map
//! constructor types, then assemble the output source.

pub mod generator;
pub use generator::*;

pub mod naming;
pub use naming::*;

pub mod resolver;
pub use resolver::*;

pub mod segmenter;
pub use segmenter::*;

pub mod types;
pub use types::*;
