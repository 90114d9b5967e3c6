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

//! Deployer source assembly.
//!
//! Composes segmented bytecode, mapped constructor parameters and the
//! resolved library set into one emitted Solidity library:
//!
//! - `deploy(...)` performs the deterministic CREATE2 deployment, deploying
//!   every resolved library first, in dependency order;
//! - `initcode(...)` reassembles the raw creation bytecode, parameterized
//!   over any library addresses unknown at generation time;
//! - one private initcode accessor per resolved library.
//!
//! Library deployments go through the same helper as the root contract, so
//! an already-deployed library (same initcode, same zero salt) is reused
//! rather than deployed twice.

use alloy_primitives::hex;
use itertools::Itertools;
use soldeploy_common::{ArtifactModel, Result, SoldeployError};
use tracing::info;

use crate::{
    map_constructor, naming::decapitalize, segment_artifact, ConstructorMapping, ResolvedLibrary,
    Segment, SegmentedBytecode, StructDefinition,
};

/// Options controlling one generation run.
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    /// Pragma version range for the emitted source, e.g. `>=0.8.0 <0.9.0`.
    pub pragma: String,
    /// Libraries to deploy inline, in topological order (normally the
    /// resolver output). Empty switches the emitted `deploy` to
    /// manual-linking mode where every placeholder becomes a caller-supplied
    /// address parameter.
    pub resolved_libraries: Vec<ResolvedLibrary>,
}

/// Generates one self-contained deployer source file per artifact.
#[derive(Debug)]
pub struct DeployerGenerator<'a> {
    artifact: &'a ArtifactModel,
    options: GeneratorOptions,
}

impl<'a> DeployerGenerator<'a> {
    /// Creates a generator for the given artifact.
    pub fn new(artifact: &'a ArtifactModel, options: GeneratorOptions) -> Self {
        Self { artifact, options }
    }

    /// Produces the full deployer source text.
    ///
    /// Fails with [`SoldeployError::MissingBytecode`] for artifacts without
    /// creation bytecode (interfaces and abstract contracts).
    pub fn generate(&self) -> Result<String> {
        let artifact = self.artifact;
        if !artifact.has_bytecode() {
            return Err(SoldeployError::MissingBytecode(artifact.contract_name.clone()));
        }

        let mapping = map_constructor(artifact.abi.constructor.as_ref());
        let segmented = segment_artifact(artifact)?;

        // Library segmentations are needed twice (accessor signature and
        // deploy-statement call site), so compute them up front. This also
        // surfaces a bytecode-less library before any text is assembled.
        let mut library_segments = Vec::with_capacity(self.options.resolved_libraries.len());
        for library in &self.options.resolved_libraries {
            if !library.artifact.has_bytecode() {
                return Err(SoldeployError::MissingBytecode(library.name.clone()));
            }
            library_segments.push(segment_artifact(&library.artifact)?);
        }

        // Placeholders not covered by a resolved library stay unresolved and
        // surface as address parameters on both `deploy` and `initcode`.
        let unresolved: Vec<&str> = segmented
            .placeholders
            .iter()
            .map(String::as_str)
            .filter(|ph| self.library_for_placeholder(ph).is_none())
            .collect();

        let mut source = SourceBuilder::default();
        source.header(&self.options.pragma);
        source.metadata_comment(artifact);
        for def in &mapping.structs {
            source.struct_block(def);
        }

        source.open_library(&format!("{}Deployer", artifact.contract_name));
        self.emit_deploy(&mut source, &mapping, &segmented, &unresolved, &library_segments);
        for (library, seg) in self.options.resolved_libraries.iter().zip(&library_segments) {
            source.function_block(
                &format!(
                    "function _{}Initcode({}) private pure returns (bytes memory)",
                    library.identifier,
                    address_params(&seg.placeholders)
                ),
                &initcode_body(seg),
            );
        }
        source.function_block(
            &format!(
                "function initcode({}) internal pure returns (bytes memory)",
                address_params(&segmented.placeholders)
            ),
            &initcode_body(&segmented),
        );
        source.create2_helper();
        source.close_library();

        info!(
            contract = %artifact.contract_name,
            libraries = self.options.resolved_libraries.len(),
            unresolved = unresolved.len(),
            "generated deployer source"
        );
        Ok(source.finish())
    }

    /// The resolved library whose derived placeholder name matches, if any.
    ///
    /// Placeholder names are derived independently of the resolver's
    /// collision renaming, so when two library names collide under
    /// decapitalization the first resolved occurrence wins here.
    fn library_for_placeholder(&self, placeholder: &str) -> Option<&ResolvedLibrary> {
        self.options
            .resolved_libraries
            .iter()
            .find(|library| decapitalize(&library.name) == placeholder)
    }

    fn emit_deploy(
        &self,
        source: &mut SourceBuilder,
        mapping: &ConstructorMapping,
        segmented: &SegmentedBytecode,
        unresolved: &[&str],
        library_segments: &[SegmentedBytecode],
    ) {
        let params = mapping
            .params
            .iter()
            .map(|param| param.declaration())
            .chain(unresolved.iter().map(|ph| format!("address {ph}")))
            .join(", ");

        let mut body = Vec::new();
        for (library, seg) in self.options.resolved_libraries.iter().zip(library_segments) {
            let args = seg
                .placeholders
                .iter()
                .map(|ph| self.placeholder_value(ph))
                .join(", ");
            body.push(format!(
                "address {} = _create2(_{}Initcode({}), 0);",
                library.identifier, library.identifier, args
            ));
        }

        let initcode_args =
            segmented.placeholders.iter().map(|ph| self.placeholder_value(ph)).join(", ");
        body.push(format!("bytes memory code = initcode({initcode_args});"));
        if !mapping.params.is_empty() {
            let encoded = mapping.params.iter().map(|param| param.name.as_str()).join(", ");
            body.push(format!("code = abi.encodePacked(code, abi.encode({encoded}));"));
        }
        let value = if mapping.payable { "msg.value" } else { "0" };
        body.push(format!("return _create2(code, {value});"));

        source.function_block(
            &format!("function deploy({params}) internal returns (address)"),
            &body,
        );
    }

    /// Expression supplying a placeholder's address inside `deploy`: the
    /// local variable of the inlined library, or the function parameter for
    /// a still-unresolved placeholder.
    fn placeholder_value(&self, placeholder: &str) -> String {
        match self.library_for_placeholder(placeholder) {
            Some(library) => library.identifier.clone(),
            None => placeholder.to_string(),
        }
    }
}

/// Renders `address a, address b` accessor parameters.
fn address_params(placeholders: &[String]) -> String {
    placeholders.iter().map(|ph| format!("address {ph}")).join(", ")
}

/// Body of an initcode accessor: the byte-exact `abi.encodePacked`
/// reassembly of the segmented bytecode.
fn initcode_body(segmented: &SegmentedBytecode) -> Vec<String> {
    if let [Segment::Literal(bytes)] = segmented.segments.as_slice() {
        return vec![format!("return hex\"{}\";", hex::encode(bytes))];
    }

    let mut body = vec!["return abi.encodePacked(".to_string()];
    let last = segmented.segments.len() - 1;
    for (index, segment) in segmented.segments.iter().enumerate() {
        let comma = if index == last { "" } else { "," };
        match segment {
            Segment::Literal(bytes) => {
                body.push(format!("    hex\"{}\"{comma}", hex::encode(bytes)))
            }
            Segment::Placeholder(name) => body.push(format!("    bytes20({name}){comma}")),
        }
    }
    body.push(");".to_string());
    body
}

/// Composable builder over the typed fragments of the emitted source:
/// header, metadata comment, struct blocks, function blocks. Keeps literal
/// byte exactness independent of formatting concerns.
#[derive(Debug, Default)]
struct SourceBuilder {
    out: String,
}

impl SourceBuilder {
    fn line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn header(&mut self, pragma: &str) {
        self.line("// SPDX-License-Identifier: UNLICENSED");
        self.line(&format!("pragma solidity {pragma};"));
        self.blank();
    }

    fn metadata_comment(&mut self, artifact: &ArtifactModel) {
        self.line("// Generated by soldeploy. Do not edit manually.");
        if let Some(path) = &artifact.source_path {
            self.line(&format!("// Source: {path}"));
        }
        if let Some(version) = &artifact.compiler_version {
            self.line(&format!("// Compiler: solc {version}"));
        }
        if let Some(runs) = artifact.optimizer_runs {
            self.line(&format!("// Optimizer runs: {runs}"));
        }
        if let Some(via_ir) = artifact.via_ir {
            self.line(&format!("// Via IR: {via_ir}"));
        }
        if let Some(evm) = &artifact.evm_version {
            self.line(&format!("// EVM version: {evm}"));
        }
        self.blank();
    }

    fn struct_block(&mut self, def: &StructDefinition) {
        self.line(&format!("struct {} {{", def.name));
        for (ty, name) in &def.fields {
            self.line(&format!("    {ty} {name};"));
        }
        self.line("}");
        self.blank();
    }

    fn open_library(&mut self, name: &str) {
        self.line(&format!("library {name} {{"));
    }

    fn close_library(&mut self) {
        self.line("}");
    }

    fn function_block(&mut self, signature: &str, body: &[String]) {
        self.line(&format!("    {signature} {{"));
        for line in body {
            if line.is_empty() {
                self.blank();
            } else {
                self.line(&format!("        {line}"));
            }
        }
        self.line("    }");
        self.blank();
    }

    /// Deterministic CREATE2 deployment helper shared by the root contract
    /// and every inlined library: zero salt, initcode-hash address, reuse of
    /// already-deployed code, raw revert-data propagation on failure.
    fn create2_helper(&mut self) {
        let body = [
            "addr = address(uint160(uint256(keccak256(abi.encodePacked(",
            "    bytes1(0xff), address(this), bytes32(0), keccak256(code)",
            ")))));",
            "if (addr.code.length > 0) {",
            "    return addr;",
            "}",
            "assembly {",
            "    addr := create2(value, add(code, 0x20), mload(code), 0)",
            "}",
            "if (addr.code.length == 0) {",
            "    assembly {",
            "        returndatacopy(0, 0, returndatasize())",
            "        revert(0, returndatasize())",
            "    }",
            "}",
        ]
        .map(String::from);
        self.function_block(
            "function _create2(bytes memory code, uint256 value) private returns (address addr)",
            &body,
        );
    }

    fn finish(mut self) -> String {
        // single trailing newline
        while self.out.ends_with("\n\n") {
            self.out.pop();
        }
        self.out
    }
}
