//! Materialization of repeated cell blocks.
//!
//! Block `i` (1-based) of a cell template starts at
//! `cell_start_address + (i - 1) * stride`, where the stride is the offset of the
//! highest template field plus its register count.

use log::debug;

use crate::error::Result;
use crate::register::{fit_address, Register, ADDRESS_SPACE};

/// Template field with the highest offset. Among equal offsets the last one wins.
pub fn last_cell(cells: &[Register]) -> Option<&Register> {
    cells.iter().max_by_key(|register| register.address)
}

pub fn stride(cells: &[Register]) -> u32 {
    last_cell(cells).map(Register::end).unwrap_or(0)
}

/// Concatenate `general` with `count` copies of the `cells` template.
///
/// Copies are named `"<name> <block>"`; everything but the address is carried over.
/// The inputs are left untouched.
pub fn expand(
    general: &[Register],
    cells: &[Register],
    cell_start_address: u32,
    count: usize,
) -> Result<Vec<Register>> {
    let stride = u64::from(stride(cells));
    debug!(
        "expanding {count} cell blocks of {} fields from address {cell_start_address}, stride {stride}",
        cells.len()
    );

    if cells.is_empty() {
        return Ok(general.to_vec());
    }

    let capacity = cells.len().saturating_mul(count).min(ADDRESS_SPACE as usize);
    let mut registers = Vec::with_capacity(general.len() + capacity);
    registers.extend_from_slice(general);

    for block in 1..=count as u64 {
        let base = u64::from(cell_start_address) + (block - 1) * stride;
        for cell in cells {
            let name = format!("{} {}", cell.name, block);
            let address = fit_address(base + u64::from(cell.address), cell.register_count(), &name)?;
            registers.push(Register {
                name,
                address,
                ..cell.clone()
            });
        }
    }

    Ok(registers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayoutError;
    use crate::register::Address;

    fn register(name: &str, address: Address, ty: &str) -> Register {
        Register {
            name: name.to_string(),
            value_type: ty.parse().unwrap(),
            address,
            unit: Some("V".to_string()),
            hardware_support_register: Some(3),
            description: format!("{name} description"),
        }
    }

    fn addresses(registers: &[Register]) -> Vec<Address> {
        registers.iter().map(|r| r.address).collect()
    }

    #[test]
    fn test_single_field_block() {
        let cells = [register("v", 0, "int32")];
        let registers = expand(&[], &cells, 10, 3).unwrap();
        assert_eq!(addresses(&registers), vec![10, 12, 14]);

        let names: Vec<&str> = registers.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["v 1", "v 2", "v 3"]);
        assert!(registers
            .iter()
            .all(|r| r.unit.as_deref() == Some("V") && r.hardware_support_register == Some(3)));
    }

    #[test]
    fn test_stride_from_highest_offset() {
        // the stride follows the highest offset, not the widest field
        let cells = [register("a", 0, "float64"), register("b", 5, "char[3]")];
        assert_eq!(stride(&cells), 7);
        assert_eq!(last_cell(&cells).unwrap().name, "b");

        let general = [register("g", 0, "uint16")];
        let registers = expand(&general, &cells, 1, 2).unwrap();
        assert_eq!(addresses(&registers), vec![0, 1, 6, 8, 13]);
        assert_eq!(registers[0], general[0]);
    }

    #[test]
    fn test_empty_template() {
        assert_eq!(stride(&[]), 0);
        let general = [register("g", 0, "uint16")];
        assert_eq!(expand(&general, &[], 1, 49).unwrap(), general);
    }

    #[test]
    fn test_empty_template_many_blocks() {
        let general = [register("g", 0, "uint16")];
        assert_eq!(expand(&general, &[], 65_536, usize::MAX).unwrap(), general);
    }

    #[test]
    fn test_zero_blocks() {
        let general = [register("g", 4, "uint16")];
        let cells = [register("v", 0, "uint16")];
        assert_eq!(expand(&general, &cells, 5, 0).unwrap(), general);
    }

    #[test]
    fn test_overflowing_block() {
        let cells = [register("v", 0, "float64")];
        assert!(expand(&[], &cells, 65_528, 2).is_ok());
        assert!(matches!(
            expand(&[], &cells, 65_528, 3),
            Err(LayoutError::AddressOverflow { name }) if name == "v 3"
        ));
    }
}
