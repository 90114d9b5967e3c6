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

//! Constructor parameter and struct mapping.
//!
//! Derives source-level Solidity types for a constructor's ABI parameters:
//! contract types collapse to `address`, enums to their declared underlying
//! type, and tuples to bare struct names whose definitions are collected
//! from the nested component tree.

use alloy_json_abi::{Constructor, InternalType, Param, StateMutability};

use crate::naming::{array_suffix, strip_array_suffix, strip_qualifier};

/// A named composite type reconstructed from ABI components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDefinition {
    /// Bare struct name with any enclosing-scope qualifier stripped.
    pub name: String,
    /// Ordered `(type, name)` field pairs.
    pub fields: Vec<(String, String)>,
}

/// One top-level constructor parameter, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedParam {
    /// Parameter name, falling back to `argN` for unnamed parameters.
    pub name: String,
    /// Rendered Solidity type.
    pub ty: String,
    /// Whether the parameter must be passed by reference (`memory`).
    pub memory: bool,
}

impl MappedParam {
    /// Renders the parameter declaration, e.g. `string memory name`.
    pub fn declaration(&self) -> String {
        if self.memory {
            format!("{} memory {}", self.ty, self.name)
        } else {
            format!("{} {}", self.ty, self.name)
        }
    }
}

/// Mapped constructor surface: parameters plus every struct definition the
/// parameter tree references.
#[derive(Debug, Clone, Default)]
pub struct ConstructorMapping {
    /// Deduplicated struct definitions in dependency-consistent order
    /// (nested structs are recorded before their referrers).
    pub structs: Vec<StructDefinition>,
    /// Top-level parameters in declaration order.
    pub params: Vec<MappedParam>,
    /// Whether the constructor is payable.
    pub payable: bool,
}

/// Maps a constructor's ABI parameters. A missing constructor maps to no
/// parameters, no structs, not payable.
pub fn map_constructor(constructor: Option<&Constructor>) -> ConstructorMapping {
    let Some(constructor) = constructor else {
        return ConstructorMapping::default();
    };

    let mut structs = Vec::new();
    for param in &constructor.inputs {
        collect_structs(param, &mut structs);
    }

    let params = constructor
        .inputs
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let ty = render_type(param);
            let memory = needs_memory(&ty, &structs);
            let name = if param.name.is_empty() {
                format!("arg{index}")
            } else {
                param.name.clone()
            };
            MappedParam { name, ty, memory }
        })
        .collect();

    ConstructorMapping {
        structs,
        params,
        payable: constructor.state_mutability == StateMutability::Payable,
    }
}

/// Renders the source-level type of one parameter.
///
/// The internal-type annotation wins where it carries richer semantics:
/// contract types are already declared as `address`, enums as their
/// underlying type, and structs get their bare name with the declared
/// type's array suffix reappended.
fn render_type(param: &Param) -> String {
    match &param.internal_type {
        Some(InternalType::Struct { ty, .. }) => {
            format!("{}{}", strip_qualifier(strip_array_suffix(ty)), array_suffix(&param.ty))
        }
        // contract and enum markers both collapse to the declared type
        // (`address`/underlying integer, array suffix included)
        _ => param.ty.clone(),
    }
}

/// Records every struct referenced by the parameter tree, walking nested
/// components before the enclosing struct so referenced definitions are
/// collected before their referrers. Already-recorded names are not
/// re-walked.
fn collect_structs(param: &Param, structs: &mut Vec<StructDefinition>) {
    let struct_name = match &param.internal_type {
        Some(InternalType::Struct { ty, .. }) => {
            Some(strip_qualifier(strip_array_suffix(ty)).to_string())
        }
        _ => None,
    };

    if let Some(name) = &struct_name {
        if structs.iter().any(|def| &def.name == name) {
            return;
        }
    }

    for component in &param.components {
        collect_structs(component, structs);
    }

    if let Some(name) = struct_name {
        let fields = param
            .components
            .iter()
            .enumerate()
            .map(|(index, component)| {
                let field_name = if component.name.is_empty() {
                    format!("field{index}")
                } else {
                    component.name.clone()
                };
                (render_type(component), field_name)
            })
            .collect();
        structs.push(StructDefinition { name, fields });
    }
}

/// Whether a rendered type requires reference-style (`memory`) passing:
/// dynamically sized primitives, arrays of any kind and recorded structs.
fn needs_memory(ty: &str, structs: &[StructDefinition]) -> bool {
    if ty.ends_with(']') || ty == "string" || ty == "bytes" {
        return true;
    }
    let base = strip_array_suffix(ty);
    structs.iter().any(|def| def.name == base)
}
