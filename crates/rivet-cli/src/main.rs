#![forbid(unsafe_code)]

use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::{Parser, Subcommand};

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "rivet", about = "A minimal build tool for Rust packages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile the project and its dependencies
    Build {
        /// Show compiler output for successful builds
        #[arg(long, short = 'v')]
        verbose: bool,
        /// Extra flags passed verbatim to the compiler
        #[arg(last = true)]
        rustc_flags: Vec<String>,
    },
    /// Archive the project into a distributable tarball
    Package {
        /// Output archive path (defaults to `<name>.tar.gz` in the project root)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Remove build artifacts
    Clean,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Build {
            verbose,
            rustc_flags,
        } => cmd_build(verbose, &rustc_flags),
        Command::Package { output } => cmd_package(output),
        Command::Clean => cmd_clean(),
    };

    if let Err(msg) = result {
        eprintln!("error: {msg}");
        process::exit(1);
    }
}

/// Find the project root by looking for the metadata file in the current directory.
fn project_root() -> Result<PathBuf, Box<dyn Error>> {
    let cwd = std::env::current_dir()?;
    if !cwd.join(rivet_config::META_FILE).exists() {
        return Err(format!(
            "no {} found in current directory",
            rivet_config::META_FILE
        )
        .into());
    }
    Ok(cwd)
}

fn cmd_build(verbose: bool, rustc_flags: &[String]) -> CliResult {
    let root = project_root()?;
    let ctx = rivet_engine::BuildContext::new(&root, verbose)?;

    let start = Instant::now();
    let artifact = rivet_engine::build(&ctx, &root, None, rustc_flags)?;

    eprintln!(
        "    Finished `{}` in {:.2}s",
        artifact.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn cmd_package(output: Option<PathBuf>) -> CliResult {
    let root = project_root()?;
    let dest = rivet_engine::package(&root, output)?;
    eprintln!("    Packaged `{}`", dest.display());
    Ok(())
}

fn cmd_clean() -> CliResult {
    let root = project_root()?;
    rivet_engine::clean(&root)?;
    eprintln!("    Cleaned build artifacts");
    Ok(())
}
