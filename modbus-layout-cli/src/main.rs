//! Command line front-end: validate register maps, render their documentation or dump the layout.

mod cli;
mod input;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{info, warn};
use modbus_layout::{Layout, DEFAULT_MAX_CELLS};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use tokio::task::JoinSet;

use cli::{Cli, Command};
use render::RenderOptions;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = configure_logging(cli.log_level()) {
        eprintln!("failed to configure logger: {err}");
    }

    match run(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn configure_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
}

async fn run(command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Validate { files, cells } => {
            let failed = validate(files, cells).await?;
            if failed > 0 {
                eprintln!("{failed} register map(s) failed validation");
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Command::Doc {
            file,
            output,
            cells,
            device,
        } => {
            let layout = compile_file(&file).await?;
            if let Err(err) = layout.check(DEFAULT_MAX_CELLS) {
                warn!("{}: {err}", file.display());
            }
            render::write_documentation(&layout, &RenderOptions { device, cells }, &output)?;
            info!("documentation written to {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Dump { file, cells } => {
            let layout = compile_file(&file).await?;
            let json = match cells {
                Some(cells) => serde_json::to_string_pretty(&layout.expand(cells)?)?,
                None => serde_json::to_string_pretty(&layout)?,
            };
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn compile_file(path: &Path) -> anyhow::Result<Layout> {
    let document = input::read_document(path).await?;
    Ok(modbus_layout::compile(&document)?)
}

async fn validate_file(path: &Path, cells: usize) -> anyhow::Result<Layout> {
    let document = input::read_document(path).await?;
    let layout =
        tokio::task::spawn_blocking(move || modbus_layout::validate(&document, cells)).await??;
    Ok(layout)
}

/// Validate every file on its own task and report all outcomes in argument order.
///
/// Returns the number of files that failed.
async fn validate(files: Vec<PathBuf>, cells: usize) -> anyhow::Result<usize> {
    let mut tasks = JoinSet::new();
    for (position, path) in files.into_iter().enumerate() {
        tasks.spawn(async move {
            let outcome = validate_file(&path, cells).await;
            (position, path, outcome)
        });
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined?);
    }
    outcomes.sort_by_key(|(position, _, _)| *position);

    let mut failed = 0;
    for (_, path, outcome) in outcomes {
        match outcome {
            Ok(layout) => {
                info!(
                    "{}: {} general registers, {} cell registers, {} cells checked",
                    path.display(),
                    layout.general_registers.len(),
                    layout.cell_registers.len(),
                    cells
                );
                println!("{}: OK", path.display());
            }
            Err(err) => {
                failed += 1;
                eprintln!("{}: {err:#}", path.display());
            }
        }
    }

    Ok(failed)
}
