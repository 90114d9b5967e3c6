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

//! Filesystem artifact lookup.
//!
//! Locates `<Name>.json` artifacts by recursive directory scan (the Foundry
//! `out/` layout nests them under `<Source>.sol/` directories). Documents
//! are memoized per run: a batch resolves the same library once per root
//! contract, and re-reading the file each time buys nothing.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use soldeploy_codegen::ArtifactLookup;
use soldeploy_common::{Result, SoldeployError};
use tracing::debug;

/// [`ArtifactLookup`] over a build-artifact directory tree.
#[derive(Debug)]
pub struct DirectoryLookup {
    root: PathBuf,
    cache: HashMap<String, String>,
}

impl DirectoryLookup {
    /// Creates a lookup rooted at the given artifact directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root, cache: HashMap::new() }
    }
}

impl ArtifactLookup for DirectoryLookup {
    fn lookup(&mut self, name: &str) -> Result<String> {
        if let Some(document) = self.cache.get(name) {
            return Ok(document.clone());
        }

        let file_name = format!("{name}.json");
        let mut candidates = Vec::new();
        scan(&self.root, &file_name, &mut candidates)?;
        candidates.sort();

        match candidates.as_slice() {
            [] => Err(SoldeployError::ArtifactNotFound(name.to_string())),
            [path] => {
                debug!(contract = name, path = %path.display(), "loaded artifact");
                let document = fs::read_to_string(path)?;
                self.cache.insert(name.to_string(), document.clone());
                Ok(document)
            }
            many => Err(SoldeployError::AmbiguousArtifact {
                name: name.to_string(),
                candidates: many.iter().map(|path| path.display().to_string()).collect(),
            }),
        }
    }
}

fn scan(dir: &Path, file_name: &str, found: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        // file_type() does not follow symlinks, so a link cycle inside the
        // artifact tree cannot recurse forever
        if entry.file_type()?.is_dir() {
            scan(&entry.path(), file_name, found)?;
        } else if entry.file_name() == file_name {
            found.push(entry.path());
        }
    }
    Ok(())
}
