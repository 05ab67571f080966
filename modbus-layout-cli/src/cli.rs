use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use modbus_layout::DEFAULT_MAX_CELLS;
use simplelog::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "modbus-layout", version, about = "Compile, validate and document Modbus register maps")]
pub struct Cli {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Disable logging
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check register maps for address and coil overlaps
    Validate {
        /// Register map files (YAML, or JSON with a .json extension)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Number of cell blocks to expand before checking
        #[arg(long, default_value_t = DEFAULT_MAX_CELLS)]
        cells: usize,
    },
    /// Generate markdown documentation for a register map
    Doc {
        /// Register map file
        file: PathBuf,
        /// Output markdown file
        #[arg(short, long, default_value = "documentation.md")]
        output: PathBuf,
        /// Number of cell blocks listed in the overview table
        #[arg(long, default_value_t = 3)]
        cells: usize,
        /// Device name used in the title and field notes
        #[arg(long, default_value = "Device")]
        device: String,
    },
    /// Print the compiled layout as JSON
    Dump {
        /// Register map file
        file: PathBuf,
        /// Print the flat register list with this many cell blocks instead
        #[arg(long)]
        cells: Option<usize>,
    },
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Off;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
