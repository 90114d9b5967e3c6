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

//! End-to-end generation tests over in-memory artifacts.

use serde_json::json;
use soldeploy_codegen::{
    resolve_libraries, DeployerGenerator, GeneratorOptions, MapLookup,
};
use soldeploy_common::{ensure_test_logging, ArtifactModel, SoldeployError};

const PRAGMA: &str = ">=0.8.0 <0.9.0";

fn parse(raw: serde_json::Value, name: &str) -> ArtifactModel {
    ArtifactModel::parse(&raw.to_string(), name).unwrap()
}

fn generate(artifact: &ArtifactModel, resolved: Vec<soldeploy_codegen::ResolvedLibrary>) -> String {
    let options = GeneratorOptions { pragma: PRAGMA.to_string(), resolved_libraries: resolved };
    DeployerGenerator::new(artifact, options).generate().unwrap()
}

#[test]
fn plain_contract_with_string_constructor() {
    ensure_test_logging(None);
    let artifact = parse(
        json!({
            "abi": [
                {
                    "type": "constructor",
                    "stateMutability": "nonpayable",
                    "inputs": [
                        { "name": "name", "type": "string", "internalType": "string" },
                        { "name": "symbol", "type": "string", "internalType": "string" }
                    ]
                }
            ],
            "bytecode": { "object": "0x608060405260016000f3", "linkReferences": {} }
        }),
        "Token",
    );

    let source = generate(&artifact, vec![]);

    assert!(source.contains("pragma solidity >=0.8.0 <0.9.0;"));
    assert!(source.contains("library TokenDeployer {"));
    assert!(source.contains(
        "function deploy(string memory name, string memory symbol) internal returns (address)"
    ));
    assert!(source.contains("function initcode() internal pure returns (bytes memory)"));
    assert!(source.contains("return hex\"608060405260016000f3\";"));
    assert!(source.contains("code = abi.encodePacked(code, abi.encode(name, symbol));"));
}

#[test]
fn parameterless_constructor_skips_argument_encoding() {
    ensure_test_logging(None);
    let artifact = parse(json!({ "abi": [], "bytecode": { "object": "0x6080" } }), "Plain");
    let source = generate(&artifact, vec![]);

    assert!(source.contains("function deploy() internal returns (address)"));
    assert!(!source.contains("abi.encode("));
}

#[test]
fn manual_linking_mode_takes_addresses_as_parameters() {
    ensure_test_logging(None);
    let bytecode: String = (0..80u8).map(|i| format!("{i:02x}")).collect();
    let artifact = parse(
        json!({
            "abi": [],
            "bytecode": {
                "object": bytecode,
                "linkReferences": {
                    "src/MathLib.sol": {
                        "MathLib": [
                            { "start": 10, "length": 20 },
                            { "start": 50, "length": 20 }
                        ]
                    }
                }
            }
        }),
        "Calculator",
    );

    let source = generate(&artifact, vec![]);

    // two slot occurrences dedup to one parameter
    assert!(source.contains("function deploy(address mathLib) internal returns (address)"));
    assert!(source
        .contains("function initcode(address mathLib) internal pure returns (bytes memory)"));
    assert_eq!(source.matches("bytes20(mathLib)").count(), 2);
    // no inlined library deployments in manual mode
    assert!(!source.contains("Initcode("));
}

#[test]
fn resolved_libraries_deploy_inline_in_dependency_order() {
    ensure_test_logging(None);
    let mut lookup = MapLookup::default();
    lookup.insert(
        "LibA",
        json!({
            "abi": [],
            "bytecode": {
                "object": (0..40u8).map(|i| format!("{i:02x}")).collect::<String>(),
                "linkReferences": {
                    "src/LibB.sol": { "LibB": [ { "start": 4, "length": 20 } ] }
                }
            }
        })
        .to_string(),
    );
    lookup.insert(
        "LibB",
        json!({ "abi": [], "bytecode": { "object": "0x600160005260206000f3" } }).to_string(),
    );

    let artifact = parse(
        json!({
            "abi": [],
            "bytecode": {
                "object": (0..64u8).map(|i| format!("{i:02x}")).collect::<String>(),
                "linkReferences": {
                    "src/LibA.sol": { "LibA": [ { "start": 30, "length": 20 } ] }
                }
            }
        }),
        "App",
    );

    let resolved = resolve_libraries(&artifact.link_references, &mut lookup).unwrap();
    let order: Vec<&str> = resolved.iter().map(|lib| lib.name.as_str()).collect();
    assert_eq!(order, ["LibB", "LibA"]);

    let source = generate(&artifact, resolved);

    let lib_b = source.find("address libB = _create2(_libBInitcode(), 0);").unwrap();
    let lib_a = source.find("address libA = _create2(_libAInitcode(libB), 0);").unwrap();
    assert!(lib_b < lib_a, "dependency must deploy before its dependent");

    assert!(source
        .contains("function _libBInitcode() private pure returns (bytes memory)"));
    assert!(source
        .contains("function _libAInitcode(address libB) private pure returns (bytes memory)"));

    // all placeholders are inlined, so deploy takes no address parameters
    assert!(source.contains("function deploy() internal returns (address)"));
    assert!(source.contains("bytes memory code = initcode(libA);"));
}

#[test]
fn circular_dependency_fails_resolution() {
    ensure_test_logging(None);
    let mut lookup = MapLookup::default();
    lookup.insert(
        "LibA",
        json!({
            "abi": [],
            "bytecode": {
                "object": (0..24u8).map(|i| format!("{i:02x}")).collect::<String>(),
                "linkReferences": { "src/LibB.sol": { "LibB": [ { "start": 0, "length": 20 } ] } }
            }
        })
        .to_string(),
    );
    lookup.insert(
        "LibB",
        json!({
            "abi": [],
            "bytecode": {
                "object": (0..24u8).map(|i| format!("{i:02x}")).collect::<String>(),
                "linkReferences": { "src/LibA.sol": { "LibA": [ { "start": 0, "length": 20 } ] } }
            }
        })
        .to_string(),
    );

    let artifact = parse(
        json!({
            "abi": [],
            "bytecode": {
                "object": (0..24u8).map(|i| format!("{i:02x}")).collect::<String>(),
                "linkReferences": { "src/LibA.sol": { "LibA": [ { "start": 0, "length": 20 } ] } }
            }
        }),
        "App",
    );

    let err = resolve_libraries(&artifact.link_references, &mut lookup).unwrap_err();
    assert!(matches!(err, SoldeployError::CircularDependency { .. }));
}

// Known edge case: placeholder names are derived from bare library names
// independently of the resolver's collision renaming. Two libraries whose
// names differ only by leading case therefore share one placeholder name in
// the initcode accessor while the resolver keeps two distinct identifiers.
#[test]
fn colliding_library_names_share_one_placeholder() {
    ensure_test_logging(None);
    let mut lookup = MapLookup::default();
    let leaf = json!({ "abi": [], "bytecode": { "object": "0x6001" } }).to_string();
    lookup.insert("Scale", leaf.clone());
    lookup.insert("scale", leaf);

    let artifact = parse(
        json!({
            "abi": [],
            "bytecode": {
                "object": (0..64u8).map(|i| format!("{i:02x}")).collect::<String>(),
                "linkReferences": {
                    "src/A.sol": { "Scale": [ { "start": 4, "length": 20 } ] },
                    "src/B.sol": { "scale": [ { "start": 40, "length": 20 } ] }
                }
            }
        }),
        "App",
    );

    let resolved = resolve_libraries(&artifact.link_references, &mut lookup).unwrap();
    let idents: Vec<&str> = resolved.iter().map(|lib| lib.identifier.as_str()).collect();
    assert_eq!(idents, ["scale", "scale2"]);

    let source = generate(&artifact, resolved);

    // both libraries still deploy under their disambiguated identifiers
    assert!(source.contains("address scale = _create2(_scaleInitcode(), 0);"));
    assert!(source.contains("address scale2 = _create2(_scale2Initcode(), 0);"));
    // but the accessor exposes a single placeholder parameter
    assert!(source.contains("function initcode(address scale) internal pure returns (bytes memory)"));
}

#[test]
fn struct_constructor_emits_definitions_before_the_library() {
    ensure_test_logging(None);
    let artifact = parse(
        json!({
            "abi": [
                {
                    "type": "constructor",
                    "stateMutability": "nonpayable",
                    "inputs": [
                        {
                            "name": "config",
                            "type": "tuple",
                            "internalType": "struct Vault.Config",
                            "components": [
                                { "name": "cap", "type": "uint256", "internalType": "uint256" },
                                { "name": "admin", "type": "address", "internalType": "contract IAdmin" }
                            ]
                        }
                    ]
                }
            ],
            "bytecode": { "object": "0x6080" }
        }),
        "Vault",
    );

    let source = generate(&artifact, vec![]);

    let struct_pos = source.find("struct Config {").unwrap();
    let library_pos = source.find("library VaultDeployer {").unwrap();
    assert!(struct_pos < library_pos);
    assert!(source.contains("    uint256 cap;"));
    assert!(source.contains("    address admin;"));
    assert!(source.contains("function deploy(Config memory config) internal returns (address)"));
}

#[test]
fn metadata_comment_reflects_artifact_fields() {
    ensure_test_logging(None);
    let artifact = parse(
        json!({
            "abi": [],
            "bytecode": { "object": "0x6080" },
            "metadata": {
                "compiler": { "version": "0.8.23+commit.f704f362" },
                "settings": {
                    "optimizer": { "runs": 999 },
                    "evmVersion": "paris",
                    "compilationTarget": { "src/Meta.sol": "Meta" }
                }
            }
        }),
        "Meta",
    );

    let source = generate(&artifact, vec![]);

    assert!(source.contains("// Source: src/Meta.sol"));
    assert!(source.contains("// Compiler: solc 0.8.23+commit.f704f362"));
    assert!(source.contains("// Optimizer runs: 999"));
    assert!(source.contains("// EVM version: paris"));
    // viaIR was absent, so the line is omitted
    assert!(!source.contains("// Via IR:"));
}
