use log::debug;
use semver::Version;
use serde::Serialize;

use crate::document::AddressSpec;
use crate::error::{LayoutError, Result};
use crate::expand;
use crate::overlap;
use crate::register::{fit_address, Address, Coil, CoilIndex, Register};
use crate::value_type::ValueType;

/// Field definition fed into [`LayoutBuilder`], before addresses are resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterDef {
    pub name: String,
    pub value_type: ValueType,
    pub address: AddressSpec,
    pub unit: Option<String>,
    pub hardware_support_register: Option<AddressSpec>,
    pub description: String,
}

impl RegisterDef {
    /// New definition with an `auto` address and no hardware support coil.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            address: AddressSpec::Auto,
            unit: None,
            hardware_support_register: None,
            description: String::new(),
        }
    }

    pub fn at(mut self, address: impl Into<AddressSpec>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_coil(mut self, coil: impl Into<AddressSpec>) -> Self {
        self.hardware_support_register = Some(coil.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    General,
    Cell,
}

/// Accumulates general and cell fields and resolves their `auto` addresses and coils.
///
/// `auto` always continues after the entry with the highest address at the time
/// of the call, so interleaving explicit and `auto` addresses is order dependent.
/// The coil counter is shared between general and cell fields.
#[derive(Debug, Clone, Default)]
pub struct LayoutBuilder {
    version: Option<Version>,
    general_registers: Vec<Register>,
    cell_registers: Vec<Register>,
    coils: Vec<Coil>,
    cell_start_address: Option<u32>,
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn general_registers(&self) -> &[Register] {
        &self.general_registers
    }

    pub fn cell_registers(&self) -> &[Register] {
        &self.cell_registers
    }

    pub fn coils(&self) -> &[Coil] {
        &self.coils
    }

    /// Add a general field and return its resolved address.
    pub fn add_general_register(&mut self, def: RegisterDef) -> Result<Address> {
        self.add(Block::General, def)
    }

    /// Add a cell template field and return its resolved offset inside the block.
    pub fn add_cell_register(&mut self, def: RegisterDef) -> Result<Address> {
        self.add(Block::Cell, def)
    }

    /// Address right after the highest general register, 0 when there is none.
    pub fn next_general_address(&self) -> u32 {
        next_address(&self.general_registers)
    }

    /// Offset right after the highest cell register, 0 when there is none.
    pub fn next_cell_offset(&self) -> u32 {
        next_address(&self.cell_registers)
    }

    /// Index after the highest coil, 0 when there is none.
    pub fn next_coil(&self) -> u32 {
        self.coils
            .last()
            .map(|coil| u32::from(coil.index) + 1)
            .unwrap_or(0)
    }

    /// Fix the start of the first cell block. `auto` takes the next free general address now.
    ///
    /// The start may be the end of the address space; only the cell registers
    /// themselves are checked for overflow, when the blocks are expanded.
    pub fn set_cell_start_address(&mut self, address: AddressSpec) -> u32 {
        let address = match address {
            AddressSpec::Fixed(address) => u32::from(address),
            AddressSpec::Auto => self.next_general_address(),
        };
        debug!("cell blocks start at address {address}");
        self.cell_start_address = Some(address);
        address
    }

    /// The explicit cell start address, or the next free general address if none was set.
    pub fn cell_start_address(&self) -> u32 {
        self.cell_start_address.unwrap_or_else(|| self.next_general_address())
    }

    /// General registers followed by `cells` instantiations of the cell block.
    pub fn expand(&self, cells: usize) -> Result<Vec<Register>> {
        expand::expand(
            &self.general_registers,
            &self.cell_registers,
            self.cell_start_address(),
            cells,
        )
    }

    pub fn build(self) -> Layout {
        let cell_start_address = self.cell_start_address();
        Layout {
            version: self.version,
            general_registers: self.general_registers,
            cell_registers: self.cell_registers,
            cell_start_address,
            coils: self.coils,
        }
    }

    fn add(&mut self, block: Block, def: RegisterDef) -> Result<Address> {
        let registers = match block {
            Block::General => &self.general_registers,
            Block::Cell => &self.cell_registers,
        };
        if registers.iter().any(|register| register.name == def.name) {
            return Err(LayoutError::DuplicateName { name: def.name });
        }

        let count = def.value_type.register_count();
        let address = match def.address {
            AddressSpec::Fixed(address) => fit_address(address.into(), count, &def.name)?,
            AddressSpec::Auto => fit_address(next_address(registers).into(), count, &def.name)?,
        };
        let coil: Option<CoilIndex> = match def.hardware_support_register {
            None => None,
            Some(AddressSpec::Fixed(index)) => Some(index),
            Some(AddressSpec::Auto) => Some(fit_address(self.next_coil().into(), 1, &def.name)?),
        };

        debug!(
            "{block:?} register `{}`: {} at {address} ({count} registers), coil {coil:?}",
            def.name, def.value_type
        );

        if let Some(index) = coil {
            self.coils.push(Coil {
                owner: def.name.clone(),
                parent_address: address,
                index,
            });
            self.coils.sort_by_key(|coil| coil.index);
        }

        let registers = match block {
            Block::General => &mut self.general_registers,
            Block::Cell => &mut self.cell_registers,
        };
        registers.push(Register {
            name: def.name,
            value_type: def.value_type,
            address,
            unit: def.unit,
            hardware_support_register: coil,
            description: def.description,
        });
        registers.sort_by_key(|register| register.address);

        Ok(address)
    }
}

fn next_address(registers: &[Register]) -> u32 {
    registers.last().map(Register::end).unwrap_or(0)
}

/// Compiled register map: resolved general registers, cell template and coils.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub version: Option<Version>,
    pub general_registers: Vec<Register>,
    /// Cell template; addresses are offsets from the start of a block.
    pub cell_registers: Vec<Register>,
    /// Address of the first cell block, up to the end of the address space.
    pub cell_start_address: u32,
    pub coils: Vec<Coil>,
}

impl Layout {
    /// Cell template field with the highest offset, which determines the stride.
    pub fn last_cell(&self) -> Option<&Register> {
        expand::last_cell(&self.cell_registers)
    }

    /// Distance between the starts of two consecutive cell blocks.
    pub fn cell_stride(&self) -> u32 {
        expand::stride(&self.cell_registers)
    }

    pub fn expand(&self, cells: usize) -> Result<Vec<Register>> {
        expand::expand(
            &self.general_registers,
            &self.cell_registers,
            self.cell_start_address,
            cells,
        )
    }

    /// Check registers (with `cells` cell blocks) and coils for overlaps.
    pub fn check(&self, cells: usize) -> Result<()> {
        let registers = self.expand(cells)?;
        overlap::check_overlaps(&registers)?;
        overlap::check_coil_overlaps(&self.coils)
    }
}
