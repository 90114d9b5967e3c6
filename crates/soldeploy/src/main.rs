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

//! soldeploy - Solidity Deployer Generator
//!
//! Turns compiled build artifacts into self-contained Solidity libraries
//! that deterministically deploy each contract, including any linked
//! libraries, via CREATE2.

use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::Result;
use soldeploy_codegen::{resolve_libraries, ArtifactLookup, DeployerGenerator, GeneratorOptions};
use soldeploy_common::ArtifactModel;
use tracing::{error, info, Level};

mod forge;
mod lookup;

use lookup::DirectoryLookup;

/// Command-line interface for soldeploy
#[derive(Debug, Parser)]
#[command(name = "soldeploy")]
#[command(about = "Generates deterministic Solidity deployer libraries from build artifacts")]
#[command(version)]
pub struct Cli {
    /// Foundry project root
    #[arg(long, env = "SOLDEPLOY_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Artifact directory, relative to the project root
    #[arg(long, env = "SOLDEPLOY_ARTIFACTS", default_value = "out")]
    pub artifacts: PathBuf,

    /// Output directory for generated deployer sources, relative to the project root
    #[arg(long, env = "SOLDEPLOY_OUTPUT", default_value = "deployers")]
    pub output: PathBuf,

    /// Pragma version range for the generated sources
    #[arg(long, env = "SOLDEPLOY_PRAGMA", default_value = ">=0.8.0 <0.9.0")]
    pub pragma: String,

    /// Skip running `forge build` before generation
    #[arg(long)]
    pub skip_build: bool,

    /// Do not inline library deployments; generated deployers take library
    /// addresses as caller-supplied parameters instead
    #[arg(long)]
    pub no_libraries: bool,

    /// Contracts to generate deployers for
    #[arg(required = true)]
    pub contracts: Vec<String>,
}

fn main() -> Result<()> {
    soldeploy_common::init_logging(Level::INFO)?;
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    if !cli.skip_build {
        forge::run_forge_build(&cli.root)?;
    }

    let mut lookup = DirectoryLookup::new(cli.root.join(&cli.artifacts));
    let output_dir = cli.root.join(&cli.output);
    std::fs::create_dir_all(&output_dir)?;

    // One contract's failure must not prevent generation for its siblings.
    let mut failed = 0usize;
    for contract in &cli.contracts {
        match generate_one(contract, &mut lookup, &cli, &output_dir) {
            Ok(path) => info!(contract = %contract, path = %path.display(), "wrote deployer"),
            Err(err) => {
                error!(contract = %contract, error = %err, "generation failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        eyre::bail!("failed to generate {failed} of {} deployers", cli.contracts.len());
    }
    Ok(())
}

fn generate_one(
    contract: &str,
    lookup: &mut DirectoryLookup,
    cli: &Cli,
    output_dir: &Path,
) -> Result<PathBuf> {
    let raw = lookup.lookup(contract)?;
    let artifact = ArtifactModel::parse(&raw, contract)?;

    let resolved_libraries = if cli.no_libraries {
        Vec::new()
    } else {
        resolve_libraries(&artifact.link_references, lookup)?
    };

    let options = GeneratorOptions { pragma: cli.pragma.clone(), resolved_libraries };
    let source = DeployerGenerator::new(&artifact, options).generate()?;

    let path = output_dir.join(format!("{contract}Deployer.sol"));
    std::fs::write(&path, source)?;
    Ok(path)
}
