use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use modbus_layout::{Layout, Register};

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Device name used in the title and the coil notes.
    pub device: String,
    /// Number of cell blocks listed in the overview table.
    pub cells: usize,
}

pub fn write_documentation(layout: &Layout, options: &RenderOptions, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    render_markdown(layout, options, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Write markdown documentation of `layout`.
pub fn render_markdown<W: Write>(layout: &Layout, options: &RenderOptions, out: &mut W) -> anyhow::Result<()> {
    let device = &options.device;

    write!(out, "# {device} Modbus Registers")?;
    if let Some(version) = &layout.version {
        write!(out, " {version}")?;
    }
    writeln!(out)?;
    writeln!(out)?;
    writeln!(
        out,
        "All provided fields will be accessible in the Holding Registers. \
         Each field can be split into multiple registers depending on its length. \
         Fields that are not supported by all hardware will additionally write to a coil \
         to indicate whether this function is supported."
    )?;
    writeln!(out)?;

    writeln!(out, "## Overview")?;
    writeln!(out)?;
    writeln!(out, "| |Register|Type|Hardware Supported Register|")?;
    writeln!(out, "|-|-|-|-|")?;
    for register in layout.expand(options.cells)? {
        let coil = register
            .hardware_support_register
            .map(|coil| coil.to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "|{}|{}|{}|{}|",
            register.name, register.address, register.value_type, coil
        )?;
    }
    writeln!(out, "|...| | | |")?;
    writeln!(out)?;

    out.write_all(DATA_TYPES.as_bytes())?;
    out.write_all(REGISTER_ALLOCATION.as_bytes())?;

    writeln!(out, "## Fields")?;
    writeln!(out)?;
    for register in &layout.general_registers {
        render_field(out, register, "###", "Register", device)?;
    }

    writeln!(out, "### Cells")?;
    writeln!(out)?;
    let (last_offset, last_size) = layout
        .last_cell()
        .map(|cell| (u32::from(cell.address), cell.register_count()))
        .unwrap_or((0, 0));
    let start = layout.cell_start_address;
    writeln!(
        out,
        "The cell fields repeat as many times as there are cells in the corresponding {device}. \
         The starting address for cell 1 is {start}, and the starting address for each subsequent cell \
         is the next available free address. So a Cell Register is calculated as follows:"
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "$$Starting Address + Offset + \\left(Last Cell Offset + Last Cell Size\\right) * \\left( Cell Number -1 \\right)\
         ={start} + Offset + \\left({last_offset} + {last_size}\\right) * \\left( Cell Number -1 \\right)$$"
    )?;
    writeln!(out)?;
    for register in &layout.cell_registers {
        render_field(out, register, "####", "Offset", device)?;
    }

    writeln!(
        out,
        "_This documentation was automatically generated from the register map file._"
    )?;
    Ok(())
}

fn render_field<W: Write>(
    out: &mut W,
    register: &Register,
    heading: &str,
    position: &str,
    device: &str,
) -> std::io::Result<()> {
    write!(out, "{heading} {}", register.name)?;
    if let Some(unit) = &register.unit {
        write!(out, " [{unit}]")?;
    }
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "| {position} | Type | Size |")?;
    writeln!(out, "|-|-|-|")?;
    writeln!(
        out,
        "|{}|`{}`|{}|",
        register.address,
        register.value_type,
        register.register_count()
    )?;
    writeln!(out)?;
    writeln!(out, "{}", register.description)?;
    if let Some(coil) = register.hardware_support_register {
        writeln!(out, "{device} may set coil {coil} to true if function is supported.")?;
    }
    writeln!(out)
}

const DATA_TYPES: &str = "\
## Supported Data Types

Each data type has a fixed bit width, and **all types can also be defined as arrays**.
Arrays are declared using the notation `Type[N]`, where `N` is the number of elements. \
For example, `char[10]` represents an array of 10 characters, with each character occupying 8 bits.

### Data Types Overview

- **int8 / uint8**
  8-bit signed and unsigned integers.

- **int16 / uint16**
  16-bit signed and unsigned integers.

- **int32 / uint32**
  32-bit signed and unsigned integers.

- **int64 / uint64**
  64-bit signed and unsigned integers.

- **float32**
  32-bit floating point number (commonly referred to as `float`).

- **float64**
  64-bit floating point number (similar to `double` in many languages).

- **bool**
  Boolean value. Although theoretically 1 bit is enough, a full byte (8 bits) is used.

- **char**
  8-bit character.

> **Note:**
> All the data types listed above can be used as arrays. For example, `int16[5]` is interpreted \
as an array with 5 elements of type `int16`. The total bit size is calculated by multiplying the \
bit size of the base type by the number of elements.

";

const REGISTER_ALLOCATION: &str = "\
## Register Allocation

All registers are fixed at 16 bits in length. This means that regardless of the bit width of a \
data type, the allocation in registers is as follows:

- If a data type occupies less than 16 bits (e.g., a single `char` of 8 bits), it will still use one full 16-bit register.
- Consequently, `char[1]` and `char[2]` both fit within one register since 1 or 2 characters at 8 bits each do not exceed 16 bits.
- When the total bit size of a data element (or array element) exceeds 16 bits, additional registers are allocated. \
For example, `char[3]` (24 bits) will require 2 registers, since one register can only hold 16 bits.
- For all data types, the number of registers used is determined by dividing the total required bit size \
by 16 and rounding up to the next whole number.

";
