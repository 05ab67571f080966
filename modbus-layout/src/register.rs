use std::fmt;

use serde::Serialize;

pub use tokio_modbus::Address;

use crate::error::{LayoutError, Result};
use crate::value_type::ValueType;

/// Index of a single coil in the coil (bit) address space.
pub type CoilIndex = Address;

/// Number of addressable registers (and coils) in the 16-bit Modbus space.
pub const ADDRESS_SPACE: u32 = 0x1_0000;

/// Half-open range `start..end` of register addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressRange {
    pub start: u32,
    pub end: u32,
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Single named field of the register map with its resolved address.
///
/// For cell templates `address` holds the offset relative to the start of the cell block.
pub struct Register {
    pub name: String,
    pub value_type: ValueType,
    pub address: Address,
    pub unit: Option<String>,
    pub hardware_support_register: Option<CoilIndex>,
    pub description: String,
}

impl Register {
    pub fn register_count(&self) -> u32 {
        self.value_type.register_count()
    }

    /// First address past the field.
    pub fn end(&self) -> u32 {
        u32::from(self.address) + self.register_count()
    }

    pub fn range(&self) -> AddressRange {
        AddressRange {
            start: self.address.into(),
            end: self.end(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Hardware support coil tied to a register.
pub struct Coil {
    pub owner: String,
    pub parent_address: Address,
    pub index: CoilIndex,
}

/// Convert a computed start address into an `Address`, making sure `count` registers fit behind it.
pub(crate) fn fit_address(start: u64, count: u32, name: &str) -> Result<Address> {
    if start + u64::from(count) > u64::from(ADDRESS_SPACE) {
        return Err(LayoutError::AddressOverflow {
            name: name.to_string(),
        });
    }
    Address::try_from(start).map_err(|_| LayoutError::AddressOverflow {
        name: name.to_string(),
    })
}
