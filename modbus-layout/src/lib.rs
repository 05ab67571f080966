//! Compile declarative Modbus register maps into a conflict-free address layout.
//!
//! ## Register maps
//!
//! A register map (see [`document`]) lists
//!
//! - general fields, placed once in the holding register space, and
//! - cell fields, a template block repeated once per monitored unit (cell).
//!
//! Every field has a data type (see [`ValueType`]) and either an explicit address
//! (offset for cell fields) or `auto`, which places it right after the field with the
//! highest address so far. Fields may also claim a hardware support coil, a single bit
//! in the independent coil space signalling that the device supports the field.
//!
//! ## Layout
//!
//! [`compile`] resolves all addresses into a [`Layout`]. [`validate`] additionally expands
//! the cell block [`DEFAULT_MAX_CELLS`] (or any other number of) times and checks that
//! no two registers and no two coils collide, including across neighbouring cell blocks.

/// Resolution of `auto` addresses and coils
pub mod builder;
pub mod document;
pub mod error;
/// Repetition of the cell block
pub mod expand;
/// Register and coil overlap checks
pub mod overlap;
pub mod register;
/// Field data types and their register footprint
pub mod value_type;

use log::info;
use semver::Version;

pub use builder::{Layout, LayoutBuilder, RegisterDef};
pub use document::{AddressSpec, MapDocument};
pub use error::{LayoutError, Result};
pub use register::{Address, AddressRange, Coil, CoilIndex, Register};
pub use value_type::{BaseKind, TypeError, ValueType};

use document::Section;

/// Largest number of cell blocks a device is expected to expose.
pub const DEFAULT_MAX_CELLS: usize = 49;

/// Resolve the addresses of all fields of `document`.
///
/// General fields are added in declaration order, then the cell start address is
/// fixed, then the cell fields are added in declaration order.
pub fn compile(document: &MapDocument) -> Result<Layout> {
    let version =
        Version::parse(&document.version).map_err(|source| LayoutError::MalformedVersion {
            version: document.version.clone(),
            source,
        })?;

    let mut builder = LayoutBuilder::new().with_version(version);
    for (key, field) in &document.general.registers.0 {
        builder.add_general_register(field.to_def(key, Section::General)?)?;
    }
    builder.set_cell_start_address(document.cells.address);
    for (key, field) in &document.cells.registers.0 {
        builder.add_cell_register(field.to_def(key, Section::Cells)?)?;
    }

    let layout = builder.build();
    info!(
        "compiled {} general and {} cell registers, {} coils",
        layout.general_registers.len(),
        layout.cell_registers.len(),
        layout.coils.len()
    );
    Ok(layout)
}

/// Compile `document` and check it for overlaps with `max_cells` cell blocks.
pub fn validate(document: &MapDocument, max_cells: usize) -> Result<Layout> {
    let layout = compile(document)?;
    layout.check(max_cells)?;
    Ok(layout)
}
