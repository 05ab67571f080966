//! Overlap checks for the register and coil address spaces.
//!
//! Both checks sort their input and compare neighbours only, reporting the first
//! collision found.

use log::info;

use crate::error::{LayoutError, Result};
use crate::register::{Coil, Register};

/// Fail on the first pair of registers whose address ranges overlap.
///
/// Registers are ordered by address (stable) before the scan, so the input
/// may be any concatenation of general registers and cell blocks.
pub fn check_overlaps(registers: &[Register]) -> Result<()> {
    let mut sorted: Vec<&Register> = registers.iter().collect();
    sorted.sort_by_key(|register| register.address);

    for pair in sorted.windows(2) {
        let (prev, current) = (pair[0], pair[1]);
        if u32::from(current.address) < prev.end() {
            return Err(LayoutError::AddressConflict {
                first: prev.name.clone(),
                first_range: prev.range(),
                second: current.name.clone(),
                second_range: current.range(),
            });
        }
    }

    info!("{} registers checked, no address overlaps", registers.len());
    Ok(())
}

/// Fail on the first coil index claimed twice.
pub fn check_coil_overlaps(coils: &[Coil]) -> Result<()> {
    let mut sorted: Vec<&Coil> = coils.iter().collect();
    sorted.sort_by_key(|coil| coil.index);

    for pair in sorted.windows(2) {
        let (prev, current) = (pair[0], pair[1]);
        if current.index <= prev.index {
            return Err(LayoutError::FlagConflict {
                first: prev.owner.clone(),
                second: current.owner.clone(),
                index: current.index,
            });
        }
    }

    info!("{} coils checked, no overlaps", coils.len());
    Ok(())
}
