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

//! Recursive library resolution.
//!
//! Walks a root contract's link references depth-first and produces every
//! library it transitively depends on, deduplicated and in leaves-first
//! deployment order. Each resolution call owns its own visit state; nothing
//! is shared across generation runs.

use std::collections::{BTreeMap, HashMap};

use soldeploy_common::{ArtifactModel, LinkReferences, Result, SoldeployError};
use tracing::{debug, trace};

use crate::naming::decapitalize;

/// External collaborator that locates the raw artifact JSON document for a
/// named contract or library.
///
/// Implementations may be called many times for the same name within one
/// batch; memoizing the documents is a worthwhile (but purely performance)
/// concern for filesystem-backed implementations.
pub trait ArtifactLookup {
    /// Returns the raw artifact document for `name`.
    ///
    /// Fails with [`SoldeployError::ArtifactNotFound`] when no candidate
    /// exists and [`SoldeployError::AmbiguousArtifact`] when several do.
    fn lookup(&mut self, name: &str) -> Result<String>;
}

/// In-memory [`ArtifactLookup`] backed by a name -> document map.
///
/// Useful for embedding and for tests; the soldeploy binary uses a
/// filesystem-backed implementation instead.
#[derive(Debug, Default)]
pub struct MapLookup {
    documents: BTreeMap<String, String>,
}

impl MapLookup {
    /// Registers the raw artifact document for `name`.
    pub fn insert(&mut self, name: impl Into<String>, raw: impl Into<String>) {
        self.documents.insert(name.into(), raw.into());
    }
}

impl ArtifactLookup for MapLookup {
    fn lookup(&mut self, name: &str) -> Result<String> {
        self.documents
            .get(name)
            .cloned()
            .ok_or_else(|| SoldeployError::ArtifactNotFound(name.to_string()))
    }
}

/// One transitively resolved library, ready for inlined deployment.
#[derive(Debug, Clone)]
pub struct ResolvedLibrary {
    /// Collision-free generated-code identifier (`mathLib`, `mathLib2`, ...).
    pub identifier: String,
    /// Source file declaring the library.
    pub file: String,
    /// Bare library name as declared in the source.
    pub name: String,
    /// The library's own parsed artifact.
    pub artifact: ArtifactModel,
    /// Identifiers of the libraries this one links against. All of them
    /// appear earlier in the resolution output.
    pub dependencies: Vec<String>,
}

/// Resolves every library the given link references transitively depend on.
///
/// The returned sequence is the order in which libraries finished resolving,
/// which is a valid topological (deploy-safe) order: a library's
/// dependencies always appear before the library itself. Sibling order
/// follows the input's file -> library iteration order and is reproducible
/// for identical input.
///
/// Fails with [`SoldeployError::CircularDependency`] when a library
/// transitively depends on itself.
pub fn resolve_libraries<L>(
    link_references: &LinkReferences,
    lookup: &mut L,
) -> Result<Vec<ResolvedLibrary>>
where
    L: ArtifactLookup + ?Sized,
{
    let mut resolution = Resolution::default();
    for (file, libraries) in link_references {
        for name in libraries.keys() {
            resolution.visit(file, name, lookup)?;
        }
    }

    let resolved = resolution.finish();
    debug!(libraries = resolved.len(), "resolved link references");
    Ok(resolved)
}

/// Visit state of one `(file, library)` key during traversal.
enum VisitState {
    /// Currently on the DFS stack; revisiting means a cycle.
    InProgress,
    /// Fully resolved, stored at this index of the output.
    Resolved(usize),
}

/// Resolved entry before identifier disambiguation. Dependencies are held
/// as indices so the rename pass cannot leave them stale.
struct PendingLibrary {
    identifier: String,
    file: String,
    name: String,
    artifact: ArtifactModel,
    dep_indices: Vec<usize>,
}

#[derive(Default)]
struct Resolution {
    states: HashMap<(String, String), VisitState>,
    pending: Vec<PendingLibrary>,
}

impl Resolution {
    fn visit<L>(&mut self, file: &str, name: &str, lookup: &mut L) -> Result<usize>
    where
        L: ArtifactLookup + ?Sized,
    {
        let key = (file.to_string(), name.to_string());
        match self.states.get(&key) {
            Some(VisitState::Resolved(idx)) => {
                trace!(file, library = name, "already resolved");
                return Ok(*idx);
            }
            Some(VisitState::InProgress) => {
                return Err(SoldeployError::CircularDependency {
                    file: file.to_string(),
                    library: name.to_string(),
                })
            }
            None => {}
        }
        self.states.insert(key.clone(), VisitState::InProgress);

        let raw = lookup.lookup(name)?;
        let artifact = ArtifactModel::parse(&raw, name)?;

        // A library's own libraries must deploy before it, so they resolve
        // first and land earlier in the output.
        let dep_keys: Vec<(String, String)> = artifact
            .link_references
            .iter()
            .flat_map(|(dep_file, libs)| {
                libs.keys().map(move |dep_name| (dep_file.clone(), dep_name.clone()))
            })
            .collect();

        let mut dep_indices = Vec::new();
        for (dep_file, dep_name) in dep_keys {
            let idx = self.visit(&dep_file, &dep_name, lookup)?;
            if !dep_indices.contains(&idx) {
                dep_indices.push(idx);
            }
        }

        trace!(file, library = name, dependencies = dep_indices.len(), "resolved library");
        let idx = self.pending.len();
        self.pending.push(PendingLibrary {
            identifier: decapitalize(name),
            file: key.0.clone(),
            name: key.1.clone(),
            artifact,
            dep_indices,
        });
        self.states.insert(key, VisitState::Resolved(idx));
        Ok(idx)
    }

    /// Disambiguates colliding identifiers, then materializes dependency
    /// names from indices so every list reflects the final names.
    fn finish(mut self) -> Vec<ResolvedLibrary> {
        let mut occurrences: HashMap<String, usize> = HashMap::new();
        for lib in &mut self.pending {
            let count = occurrences.entry(lib.identifier.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                lib.identifier = format!("{}{}", lib.identifier, count);
            }
        }

        let names: Vec<String> = self.pending.iter().map(|lib| lib.identifier.clone()).collect();
        self.pending
            .into_iter()
            .map(|lib| ResolvedLibrary {
                identifier: lib.identifier,
                file: lib.file,
                name: lib.name,
                artifact: lib.artifact,
                dependencies: lib.dep_indices.iter().map(|&idx| names[idx].clone()).collect(),
            })
            .collect()
    }
}
