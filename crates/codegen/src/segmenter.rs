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

//! Bytecode segmentation around library link slots.
//!
//! Splits creation bytecode into literal byte runs interleaved with named
//! placeholders, one per link slot. Substituting every placeholder with a
//! 20-byte address and concatenating the segments must reassemble the
//! original bytecode exactly; that byte-level contract is what the emitted
//! `abi.encodePacked` initcode accessors rely on.

use alloy_primitives::Address;
use soldeploy_common::{ArtifactModel, Result, SoldeployError};
use tracing::trace;

use crate::naming::decapitalize;

/// One piece of segmented bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A run of bytes copied verbatim from the artifact.
    Literal(Vec<u8>),
    /// A 20-byte hole to be filled with the named library's address.
    Placeholder(String),
}

/// Segmented creation bytecode plus the accessor-parameter names.
#[derive(Debug, Clone)]
pub struct SegmentedBytecode {
    /// Literal and placeholder segments in bytecode order.
    pub segments: Vec<Segment>,
    /// Placeholder identifiers deduplicated in first-encounter order. A
    /// library referenced at several offsets appears once here even though
    /// its placeholder segment repeats.
    pub placeholders: Vec<String>,
}

impl SegmentedBytecode {
    /// Reassembles the bytecode, filling each placeholder with the address
    /// the given resolver returns for it.
    pub fn link(&self, resolve: impl Fn(&str) -> Address) -> Vec<u8> {
        let mut out = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(bytes) => out.extend_from_slice(bytes),
                Segment::Placeholder(name) => out.extend_from_slice(resolve(name).as_slice()),
            }
        }
        out
    }
}

/// Segments an artifact's creation bytecode around its link slots.
///
/// Slots are flattened across all declaring files, ordered by byte offset
/// and walked with a cursor; bytes between slots become literal segments.
/// With no slots at all the result is one literal segment spanning the
/// whole bytecode. Placeholder names use the same decapitalization rule as
/// the resolver but are derived independently and never renamed here.
pub fn segment_artifact(artifact: &ArtifactModel) -> Result<SegmentedBytecode> {
    let bytes = artifact.bytecode_bytes()?;

    let mut slots: Vec<(usize, usize, &str, &str)> = artifact
        .link_references
        .iter()
        .flat_map(|(file, libraries)| {
            libraries.iter().flat_map(move |(name, slots)| {
                slots.iter().map(move |slot| (slot.start, slot.length, file.as_str(), name.as_str()))
            })
        })
        .collect();
    slots.sort_by_key(|&(start, ..)| start);

    let mut segments = Vec::new();
    let mut placeholders: Vec<String> = Vec::new();
    let mut cursor = 0usize;

    for (start, length, file, name) in slots {
        // checked_add keeps adversarial offsets on the error path instead
        // of overflowing past the bounds comparison
        let end = match start.checked_add(length) {
            Some(end) if start >= cursor && end <= bytes.len() => end,
            _ => {
                return Err(SoldeployError::MalformedArtifact {
                    name: artifact.contract_name.clone(),
                    reason: format!(
                        "link slot for `{file}:{name}` at byte {start} (length {length}) is outside bytecode of length {} or overlaps a sibling slot",
                        bytes.len()
                    ),
                })
            }
        };

        if start > cursor {
            segments.push(Segment::Literal(bytes[cursor..start].to_vec()));
        }
        let ident = decapitalize(name);
        if !placeholders.contains(&ident) {
            placeholders.push(ident.clone());
        }
        segments.push(Segment::Placeholder(ident));
        cursor = end;
    }

    if cursor < bytes.len() || segments.is_empty() {
        segments.push(Segment::Literal(bytes[cursor..].to_vec()));
    }

    trace!(
        contract = %artifact.contract_name,
        segments = segments.len(),
        placeholders = placeholders.len(),
        "segmented bytecode"
    );
    Ok(SegmentedBytecode { segments, placeholders })
}
