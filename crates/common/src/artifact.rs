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

//! Compiled-contract artifact model.
//!
//! One [`ArtifactModel`] is parsed from one build-artifact JSON document
//! (the `forge build` output format) and is never mutated afterwards. The
//! model keeps only the pieces the generator needs: the ABI, the creation
//! bytecode, the unresolved library link slots and a handful of optional
//! compiler-metadata fields.

use std::collections::BTreeMap;

use alloy_json_abi::JsonAbi;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SoldeployError};

/// Link references as emitted by the compiler: declaring source file ->
/// library name -> ordered byte slots inside the creation bytecode.
///
/// A `BTreeMap` keeps the file -> library iteration order stable and
/// reproducible for identical input, which the resolver relies on for
/// deterministic sibling ordering.
pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<LinkSlot>>>;

/// One unresolved library-address slot inside creation bytecode.
///
/// Offsets are in bytes (not hex characters) and locate a 20-byte region
/// that must be replaced by a deployed library address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSlot {
    /// Byte offset of the slot inside the bytecode.
    pub start: usize,
    /// Byte length of the slot (20 for an address).
    pub length: usize,
}

/// Structured representation of one compiled contract.
#[derive(Debug, Clone)]
pub struct ArtifactModel {
    /// Name of the compiled contract. Never empty.
    pub contract_name: String,
    /// Parsed contract ABI.
    pub abi: JsonAbi,
    /// Creation bytecode as a lowercase hex string without `0x` prefix.
    /// Empty for interfaces and abstract contracts.
    pub bytecode: String,
    /// Unresolved library link slots. Empty when the contract links no
    /// external libraries.
    pub link_references: LinkReferences,
    /// Source file the contract was compiled from, when recorded.
    pub source_path: Option<String>,
    /// Compiler version string, when recorded.
    pub compiler_version: Option<String>,
    /// Optimizer run count, when recorded.
    pub optimizer_runs: Option<u64>,
    /// Whether the contract was compiled via the IR pipeline, when recorded.
    pub via_ir: Option<bool>,
    /// Target EVM version, when recorded.
    pub evm_version: Option<String>,
}

/// Raw wire shape of the artifact document. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct RawArtifact {
    #[serde(default)]
    abi: JsonAbi,
    #[serde(default)]
    bytecode: Option<RawBytecode>,
    #[serde(default)]
    metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBytecode {
    #[serde(default)]
    object: String,
    #[serde(default)]
    link_references: LinkReferences,
}

impl ArtifactModel {
    /// Parses one artifact JSON document for the given contract.
    ///
    /// Optional fields (metadata, link references, even the bytecode object
    /// itself) may be absent without error; only an unparsable document or
    /// an empty contract name is a [`SoldeployError::MalformedArtifact`].
    pub fn parse(raw: &str, contract_name: &str) -> Result<Self> {
        if contract_name.is_empty() {
            return Err(SoldeployError::MalformedArtifact {
                name: contract_name.to_string(),
                reason: "empty contract name".to_string(),
            });
        }

        let doc: RawArtifact =
            serde_json::from_str(raw).map_err(|e| SoldeployError::MalformedArtifact {
                name: contract_name.to_string(),
                reason: e.to_string(),
            })?;

        let (bytecode, link_references) = match doc.bytecode {
            Some(b) => (normalize_hex(&b.object), b.link_references),
            None => (String::new(), LinkReferences::default()),
        };

        let meta = doc.metadata.as_ref().map(flatten_metadata).unwrap_or_default();

        debug!(
            contract = contract_name,
            bytecode_len = bytecode.len() / 2,
            libraries = link_references.values().map(|libs| libs.len()).sum::<usize>(),
            "parsed artifact"
        );

        Ok(Self {
            contract_name: contract_name.to_string(),
            abi: doc.abi,
            bytecode,
            link_references,
            source_path: meta.source_path_for(contract_name),
            compiler_version: meta.compiler_version,
            optimizer_runs: meta.optimizer_runs,
            via_ir: meta.via_ir,
            evm_version: meta.evm_version,
        })
    }

    /// Whether the artifact carries any creation bytecode at all.
    pub fn has_bytecode(&self) -> bool {
        !self.bytecode.is_empty()
    }

    /// Decodes the creation bytecode into raw bytes.
    ///
    /// Unlinked artifacts carry textual `__$...$__` markers inside their
    /// link-slot ranges; those pairs decode to zero since segmentation
    /// replaces the whole range with a placeholder anyway. Any other
    /// non-hex content is a malformed artifact.
    pub fn bytecode_bytes(&self) -> Result<Vec<u8>> {
        let hex = self.bytecode.as_str();
        if hex.len() % 2 != 0 {
            return Err(SoldeployError::MalformedArtifact {
                name: self.contract_name.clone(),
                reason: "odd-length bytecode hex".to_string(),
            });
        }

        let mut bytes = Vec::with_capacity(hex.len() / 2);
        for i in (0..hex.len()).step_by(2) {
            let pair = &hex[i..i + 2];
            match u8::from_str_radix(pair, 16) {
                Ok(byte) => bytes.push(byte),
                Err(_) if pair.contains(['_', '$']) => bytes.push(0),
                Err(_) => {
                    return Err(SoldeployError::MalformedArtifact {
                        name: self.contract_name.clone(),
                        reason: format!("invalid bytecode hex pair `{pair}` at byte {}", i / 2),
                    })
                }
            }
        }
        Ok(bytes)
    }
}

/// Strips an optional `0x` prefix and lowercases the hex string.
fn normalize_hex(raw: &str) -> String {
    raw.strip_prefix("0x").unwrap_or(raw).to_ascii_lowercase()
}

/// Optional compiler-metadata fields pulled out of the `metadata` object.
#[derive(Debug, Default)]
struct MetadataFields {
    compiler_version: Option<String>,
    optimizer_runs: Option<u64>,
    via_ir: Option<bool>,
    evm_version: Option<String>,
    compilation_target: Option<BTreeMap<String, String>>,
}

impl MetadataFields {
    /// Source path of the contract, preferring the compilation-target entry
    /// whose value matches the contract name.
    fn source_path_for(&self, contract_name: &str) -> Option<String> {
        let target = self.compilation_target.as_ref()?;
        target
            .iter()
            .find(|(_, name)| name.as_str() == contract_name)
            .or_else(|| target.iter().next())
            .map(|(path, _)| path.clone())
    }
}

/// Extracts the optional metadata fields, tolerating both the object form
/// and the string-embedded form solc uses for `metadata` output.
fn flatten_metadata(meta: &Value) -> MetadataFields {
    let parsed;
    let meta = match meta {
        Value::String(inner) => match serde_json::from_str::<Value>(inner) {
            Ok(value) => {
                parsed = value;
                &parsed
            }
            Err(_) => return MetadataFields::default(),
        },
        other => other,
    };

    MetadataFields {
        compiler_version: meta
            .pointer("/compiler/version")
            .and_then(Value::as_str)
            .map(str::to_string),
        optimizer_runs: meta.pointer("/settings/optimizer/runs").and_then(Value::as_u64),
        via_ir: meta.pointer("/settings/viaIR").and_then(Value::as_bool),
        evm_version: meta
            .pointer("/settings/evmVersion")
            .and_then(Value::as_str)
            .map(str::to_string),
        compilation_target: meta
            .pointer("/settings/compilationTarget")
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::ensure_test_logging;
    use serde_json::json;

    fn artifact_json() -> String {
        json!({
            "abi": [
                {
                    "type": "constructor",
                    "stateMutability": "nonpayable",
                    "inputs": [
                        { "name": "name", "type": "string", "internalType": "string" }
                    ]
                }
            ],
            "bytecode": {
                "object": "0x60806040",
                "linkReferences": {
                    "src/MathLib.sol": {
                        "MathLib": [ { "start": 1, "length": 20 } ]
                    }
                }
            },
            "metadata": {
                "compiler": { "version": "0.8.23+commit.f704f362" },
                "settings": {
                    "optimizer": { "enabled": true, "runs": 200 },
                    "viaIR": true,
                    "evmVersion": "paris",
                    "compilationTarget": { "src/Token.sol": "Token" }
                }
            }
        })
        .to_string()
    }

    #[test]
    fn parses_full_artifact() {
        ensure_test_logging(None);
        let model = ArtifactModel::parse(&artifact_json(), "Token").unwrap();

        assert_eq!(model.contract_name, "Token");
        assert_eq!(model.bytecode, "60806040");
        assert!(model.abi.constructor.is_some());
        assert_eq!(model.link_references["src/MathLib.sol"]["MathLib"][0].start, 1);
        assert_eq!(model.compiler_version.as_deref(), Some("0.8.23+commit.f704f362"));
        assert_eq!(model.optimizer_runs, Some(200));
        assert_eq!(model.via_ir, Some(true));
        assert_eq!(model.evm_version.as_deref(), Some("paris"));
        assert_eq!(model.source_path.as_deref(), Some("src/Token.sol"));
    }

    #[test]
    fn missing_optional_fields_are_not_errors() {
        ensure_test_logging(None);
        let model = ArtifactModel::parse(r#"{"abi": []}"#, "Empty").unwrap();

        assert!(!model.has_bytecode());
        assert!(model.link_references.is_empty());
        assert!(model.compiler_version.is_none());
        assert!(model.source_path.is_none());
    }

    #[test]
    fn unparsable_document_is_malformed() {
        ensure_test_logging(None);
        let err = ArtifactModel::parse("not json", "Broken").unwrap_err();
        assert!(matches!(err, SoldeployError::MalformedArtifact { .. }));
    }

    #[test]
    fn bytecode_prefix_is_stripped_and_lowercased() {
        ensure_test_logging(None);
        let raw = json!({ "bytecode": { "object": "0x60AbCd" } }).to_string();
        let model = ArtifactModel::parse(&raw, "Mixed").unwrap();
        assert_eq!(model.bytecode, "60abcd");
        assert_eq!(model.bytecode_bytes().unwrap(), vec![0x60, 0xab, 0xcd]);
    }

    #[test]
    fn unlinked_markers_decode_to_zero() {
        ensure_test_logging(None);
        let raw = json!({ "bytecode": { "object": "60__$abc1$__60" } }).to_string();
        let model = ArtifactModel::parse(&raw, "Unlinked").unwrap();
        // only the pairs touching marker punctuation zero out; hex pairs
        // inside the marker keep their value, which segmentation discards
        assert_eq!(model.bytecode_bytes().unwrap(), vec![0x60, 0, 0, 0xbc, 0, 0, 0x60]);
    }

    #[test]
    fn odd_length_bytecode_is_malformed() {
        ensure_test_logging(None);
        let raw = json!({ "bytecode": { "object": "608" } }).to_string();
        let model = ArtifactModel::parse(&raw, "Odd").unwrap();
        assert!(matches!(
            model.bytecode_bytes().unwrap_err(),
            SoldeployError::MalformedArtifact { .. }
        ));
    }

    #[test]
    fn string_embedded_metadata_is_flattened() {
        ensure_test_logging(None);
        let inner = json!({
            "compiler": { "version": "0.8.19+commit.7dd6d404" },
            "settings": { "evmVersion": "london", "compilationTarget": { "src/A.sol": "A" } }
        })
        .to_string();
        let raw = json!({ "metadata": inner }).to_string();
        let model = ArtifactModel::parse(&raw, "A").unwrap();
        assert_eq!(model.compiler_version.as_deref(), Some("0.8.19+commit.7dd6d404"));
        assert_eq!(model.evm_version.as_deref(), Some("london"));
        assert_eq!(model.source_path.as_deref(), Some("src/A.sol"));
    }
}
