//! Typed model of a register map document.
//!
//! A document is usually written in YAML:
//!
//! ```yaml
//! version: 1.0.0
//! general:
//!   registers:
//!     serial:
//!       name: Serial Number
//!       address: auto
//!       ValueType: char[16]
//!       description: Device serial number
//! cells:
//!   address: 100
//!   registers:
//!     voltage:
//!       offset: auto
//!       ValueType: float32
//!       unit: V
//!       hardware_support_register: auto
//! ```
//!
//! Register sections keep the declaration order of their keys, which is the
//! order in which `auto` addresses are resolved.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::builder::RegisterDef;
use crate::error::{LayoutError, Result};
use crate::register::Address;

/// Either an explicit address (or offset, or coil index) or `"auto"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressSpec {
    #[default]
    Auto,
    Fixed(Address),
}

impl From<Address> for AddressSpec {
    fn from(value: Address) -> Self {
        AddressSpec::Fixed(value)
    }
}

impl<'de> Deserialize<'de> for AddressSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct AddressSpecVisitor;

        impl Visitor<'_> for AddressSpecVisitor {
            type Value = AddressSpec;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a non-negative integer below 65536 or \"auto\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                Address::try_from(v)
                    .map(AddressSpec::Fixed)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                Address::try_from(v)
                    .map(AddressSpec::Fixed)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                match v {
                    "auto" => Ok(AddressSpec::Auto),
                    other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }
        }

        deserializer.deserialize_any(AddressSpecVisitor)
    }
}

/// Register fields in declaration order, keyed by their mapping key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(pub Vec<(String, FieldSpec)>);

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Fields;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of register fields")
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(Fields::default())
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, FieldSpec)> =
                    Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, field)) = map.next_entry::<String, FieldSpec>()? {
                    if entries.iter().any(|(existing, _)| *existing == key) {
                        return Err(de::Error::custom(format!("duplicate field key `{key}`")));
                    }
                    entries.push((key, field));
                }
                Ok(Fields(entries))
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Display name, defaults to the mapping key.
    pub name: Option<String>,
    /// Absolute address, only valid for general registers.
    pub address: Option<AddressSpec>,
    /// Offset inside the cell block, only valid for cell registers.
    pub offset: Option<AddressSpec>,
    #[serde(rename = "ValueType")]
    pub value_type: String,
    pub unit: Option<String>,
    pub hardware_support_register: Option<AddressSpec>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    General,
    Cells,
}

impl FieldSpec {
    /// Turn the raw field into a builder definition.
    ///
    /// Fails with [`LayoutError::InvalidTypeSyntax`] naming `key` when `ValueType` does not parse.
    pub(crate) fn to_def(&self, key: &str, section: Section) -> Result<RegisterDef> {
        let position = match section {
            Section::General => {
                if self.offset.is_some() {
                    return Err(LayoutError::Schema(format!(
                        "general register `{key}` uses `offset`, expected `address`"
                    )));
                }
                self.address
            }
            Section::Cells => {
                if self.address.is_some() {
                    return Err(LayoutError::Schema(format!(
                        "cell register `{key}` uses `address`, expected `offset`"
                    )));
                }
                self.offset
            }
        };

        let value_type =
            self.value_type
                .parse()
                .map_err(|source| LayoutError::InvalidTypeSyntax {
                    field: key.to_string(),
                    source,
                })?;

        let mut def = RegisterDef::new(self.name.as_deref().unwrap_or(key), value_type)
            .at(position.unwrap_or_default())
            .with_description(self.description.clone());
        if let Some(unit) = &self.unit {
            def = def.with_unit(unit.clone());
        }
        if let Some(coil) = self.hardware_support_register {
            def = def.with_coil(coil);
        }

        Ok(def)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralSection {
    #[serde(default)]
    pub registers: Fields,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellSection {
    /// Start address of the first cell block.
    #[serde(default)]
    pub address: AddressSpec,
    #[serde(default)]
    pub registers: Fields,
}

/// Schema-checked register map document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapDocument {
    pub version: String,
    #[serde(default)]
    pub general: GeneralSection,
    #[serde(default)]
    pub cells: CellSection,
}

impl MapDocument {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|err| LayoutError::Schema(err.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| LayoutError::Schema(err.to_string()))
    }
}
