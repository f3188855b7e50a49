///
/// This module implements the CLI interface for dockpatch: argument parsing, configuration
/// loading and output routing.
///
/// All derivation logic (versions, root discovery, diffing, statements) lives in the
/// [`dockpatch-core`] crate. This module is strictly CLI glue.
///
/// ## How To Use
/// - For command-line users: `dockpatch [--append] FILE...`, see `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`] and an output sink.
///
/// [`dockpatch-core`]: ../../dockpatch-core/
use crate::load_config::load_config;
use anyhow::Result;
use clap::Parser;
use dockpatch_core::{Deriver, Emit};
use std::io::Write;
use std::path::PathBuf;

/// CLI for dockpatch: derive patches from numbered file versions.
#[derive(Parser, Debug)]
#[clap(
    name = "dockpatch",
    version,
    about = "Derive patches between numbered file versions and emit the Dockerfile steps that apply them"
)]
pub struct Cli {
    /// Versioned files, named `<file>.<two-digit-version>` (e.g. noxfile.py.02)
    #[clap(required = true)]
    pub files: Vec<PathBuf>,

    /// Append statements to the Dockerfile instead of printing them
    #[clap(long)]
    pub append: bool,

    /// Path to a YAML config file
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Fail when a diff comes out empty
    #[clap(long)]
    pub strict: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default log filter for this verbosity when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// CLI logic entrypoint for integration tests and main().
/// Statements are written to `out` unless `--append` is set.
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    tracing::info!(files = cli.files.len(), append = cli.append, "dockpatch run started");

    let mut config = load_config(cli.config.as_deref())?;
    if cli.strict {
        config.strict = true;
    }
    config.trace_loaded();

    let diff = config.diff_tool();
    let deriver = Deriver::new(config, diff);
    let artifacts = deriver.derive_all(&cli.files, Emit::from(cli.append), out)?;

    for artifact in &artifacts {
        tracing::info!(
            patch = %artifact.path.display(),
            build_file = %artifact.build_file.display(),
            "Patch ready"
        );
    }
    Ok(())
}
