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

//! Identifier and type-string helpers shared by the resolver, segmenter and
//! type mapper.

/// Derives a generated-code identifier from a library name: first character
/// lowercased, remainder unchanged. `MathLib` becomes `mathLib`.
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strips every trailing array suffix from a Solidity type string:
/// `Pool.Key[2][]` becomes `Pool.Key`.
pub fn strip_array_suffix(ty: &str) -> &str {
    match ty.find('[') {
        Some(idx) => &ty[..idx],
        None => ty,
    }
}

/// Returns the trailing array suffix of a Solidity type string, empty when
/// the type is not an array: `tuple[2][]` yields `[2][]`.
pub fn array_suffix(ty: &str) -> &str {
    match ty.find('[') {
        Some(idx) => &ty[idx..],
        None => "",
    }
}

/// Strips any enclosing-scope qualifier from a (non-array) type name:
/// `Hooks.Permissions` becomes `Permissions`.
pub fn strip_qualifier(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decapitalize_lowercases_first_char_only() {
        assert_eq!(decapitalize("MathLib"), "mathLib");
        assert_eq!(decapitalize("mathLib"), "mathLib");
        assert_eq!(decapitalize("X"), "x");
        assert_eq!(decapitalize(""), "");
    }

    #[test]
    fn array_suffix_round_trips() {
        for ty in ["uint256", "uint256[]", "Pool.Key[2][]", "tuple[3]"] {
            assert_eq!(format!("{}{}", strip_array_suffix(ty), array_suffix(ty)), ty);
        }
        assert_eq!(array_suffix("uint256"), "");
        assert_eq!(strip_array_suffix("tuple[3]"), "tuple");
    }

    #[test]
    fn qualifier_is_stripped() {
        assert_eq!(strip_qualifier("Hooks.Permissions"), "Permissions");
        assert_eq!(strip_qualifier("Config"), "Config");
    }
}
