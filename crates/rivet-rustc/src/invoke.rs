//! Compiler command construction and execution.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::RustcError;

/// File extension of library artifacts produced by `--crate-type lib`.
pub const LIB_EXT: &str = "rlib";

/// Result of a compiler invocation.
#[derive(Debug)]
pub struct CompilationResult {
    /// Whether the compiler exited successfully.
    pub success: bool,
    /// The exit code, if the process was not killed by a signal.
    pub exit_code: Option<i32>,
    /// Raw stdout from the compiler.
    pub stdout: String,
    /// Raw stderr from the compiler (diagnostics).
    pub stderr: String,
}

/// What kind of crate to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrateType {
    /// A native executable (default).
    #[default]
    Bin,
    /// A Rust library (`.rlib`).
    Lib,
}

impl CrateType {
    /// Parse the `type` metadata value.
    ///
    /// # Errors
    /// Returns an error for anything other than `lib` or `bin`.
    pub fn parse(value: &str) -> Result<Self, RustcError> {
        match value {
            "bin" => Ok(Self::Bin),
            "lib" => Ok(Self::Lib),
            other => Err(RustcError::UnknownCrateType {
                value: other.to_owned(),
            }),
        }
    }

    /// The `--crate-type` argument value.
    pub fn as_rustc_arg(self) -> &'static str {
        match self {
            Self::Bin => "bin",
            Self::Lib => "lib",
        }
    }
}

/// Make a string usable as a rustc crate name.
///
/// Crate names must be identifiers: every character outside `[A-Za-z0-9_]` is
/// mapped to `_`, and a leading digit gets a `_` prefix. The artifact file
/// name is unaffected (output placement uses `-o`).
pub fn sanitize_crate_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

/// Builder for a single `rustc` invocation.
#[derive(Debug, Default)]
pub struct RustcCommand {
    entry: Option<PathBuf>,
    crate_name: Option<String>,
    crate_type: CrateType,
    metadata: Option<String>,
    edition: Option<String>,
    output: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
    externs: Vec<(String, PathBuf)>,
    extra_flags: Vec<String>,
    optimize: bool,
}

impl RustcCommand {
    /// Create a new empty command builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry file (relative to the working directory of the invocation).
    pub fn entry(mut self, path: &Path) -> Self {
        self.entry = Some(path.to_path_buf());
        self
    }

    /// Set the crate name (must already be a valid identifier).
    pub fn crate_name(mut self, name: &str) -> Self {
        self.crate_name = Some(name.to_owned());
        self
    }

    /// Set the crate type (bin or lib).
    pub fn crate_type(mut self, crate_type: CrateType) -> Self {
        self.crate_type = crate_type;
        self
    }

    /// Set the `-C metadata=` disambiguation value.
    pub fn metadata(mut self, value: &str) -> Self {
        self.metadata = Some(value.to_owned());
        self
    }

    /// Set the `--edition` flag.
    pub fn edition(mut self, edition: &str) -> Self {
        self.edition = Some(edition.to_owned());
        self
    }

    /// Set the exact output artifact path (`-o`).
    pub fn output(mut self, path: &Path) -> Self {
        self.output = Some(path.to_path_buf());
        self
    }

    /// Add a library search path (`-L`) for transitive dependency lookup.
    pub fn search_path(mut self, path: &Path) -> Self {
        self.search_paths.push(path.to_path_buf());
        self
    }

    /// Add `--extern name=path` pairs, in order.
    pub fn externs(mut self, pairs: &[(String, PathBuf)]) -> Self {
        self.externs.extend(pairs.iter().cloned());
        self
    }

    /// Append extra compiler flags verbatim.
    pub fn extra_flags(mut self, flags: &[String]) -> Self {
        self.extra_flags.extend(flags.iter().cloned());
        self
    }

    /// Enable optimization: `-C opt-level=3`, plus `-C lto` for binaries.
    /// rustc rejects `-C lto` when producing an rlib, so libraries get only
    /// the opt-level flag.
    pub fn optimize(mut self, enabled: bool) -> Self {
        self.optimize = enabled;
        self
    }

    /// Build the argument list without executing.
    ///
    /// # Errors
    /// Returns an error if the entry file, output path, or crate name is unset.
    pub fn build_args(&self) -> Result<Vec<String>, RustcError> {
        let Some(entry) = &self.entry else {
            return Err(RustcError::NoEntry);
        };
        let Some(output) = &self.output else {
            return Err(RustcError::NoOutput);
        };
        let Some(crate_name) = &self.crate_name else {
            return Err(RustcError::NoCrateName);
        };

        let mut args = Vec::new();

        if let Some(edition) = &self.edition {
            args.push("--edition".to_owned());
            args.push(edition.clone());
        }

        args.push("--crate-name".to_owned());
        args.push(crate_name.clone());

        args.push("--crate-type".to_owned());
        args.push(self.crate_type.as_rustc_arg().to_owned());

        if let Some(metadata) = &self.metadata {
            args.push("-C".to_owned());
            args.push(format!("metadata={metadata}"));
        }

        if self.optimize {
            args.push("-C".to_owned());
            args.push("opt-level=3".to_owned());
            if self.crate_type == CrateType::Bin {
                args.push("-C".to_owned());
                args.push("lto".to_owned());
            }
        }

        args.push("-o".to_owned());
        args.push(output.display().to_string());

        for dir in &self.search_paths {
            args.push("-L".to_owned());
            args.push(dir.display().to_string());
        }

        for (name, path) in &self.externs {
            args.push("--extern".to_owned());
            args.push(format!("{name}={}", path.display()));
        }

        args.extend(self.extra_flags.iter().cloned());

        args.push(entry.display().to_string());

        Ok(args)
    }

    /// Run the compiler synchronously with the given working directory.
    ///
    /// The compiler binary is `rustc`, overridable via the `RUSTC` environment
    /// variable. A non-zero exit is reported through `CompilationResult`, not
    /// as an error.
    ///
    /// # Errors
    /// Returns an error if the argument list is incomplete or the process
    /// cannot be spawned.
    pub fn execute(&self, workdir: &Path) -> Result<CompilationResult, RustcError> {
        let args = self.build_args()?;
        let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_owned());

        let mut cmd = Command::new(rustc);
        cmd.args(&args).current_dir(workdir);
        let output = rivet_util::process::run_command(&mut cmd)?;

        Ok(CompilationResult {
            success: output.success,
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn minimal() -> RustcCommand {
        RustcCommand::new()
            .entry(Path::new("main.rs"))
            .crate_name("demo")
            .output(Path::new("/tmp/out/demo"))
    }

    #[test]
    fn build_args_requires_entry() {
        let cmd = RustcCommand::new()
            .crate_name("demo")
            .output(Path::new("/tmp/out/demo"));
        assert!(cmd.build_args().is_err());
    }

    #[test]
    fn build_args_requires_output() {
        let cmd = RustcCommand::new().entry(Path::new("main.rs")).crate_name("demo");
        assert!(cmd.build_args().is_err());
    }

    #[test]
    fn build_args_requires_crate_name() {
        let cmd = RustcCommand::new()
            .entry(Path::new("main.rs"))
            .output(Path::new("/tmp/out/demo"));
        assert!(cmd.build_args().is_err());
    }

    #[test]
    fn entry_file_is_last() {
        let args = minimal().build_args().unwrap();
        assert_eq!(args.last().map(String::as_str), Some("main.rs"));
    }

    #[test]
    fn bin_optimization_includes_lto() {
        let args = minimal().optimize(true).build_args().unwrap();
        assert!(args.contains(&"opt-level=3".to_owned()));
        assert!(args.contains(&"lto".to_owned()));
    }

    #[test]
    fn lib_optimization_omits_lto() {
        let args = minimal()
            .crate_type(CrateType::Lib)
            .optimize(true)
            .build_args()
            .unwrap();
        assert!(args.contains(&"opt-level=3".to_owned()));
        assert!(!args.contains(&"lto".to_owned()));
    }

    #[test]
    fn externs_preserve_declaration_order() {
        let args = minimal()
            .externs(&[
                ("a".to_owned(), PathBuf::from("/out/liba.rlib")),
                ("b".to_owned(), PathBuf::from("/out/libb.rlib")),
            ])
            .build_args()
            .unwrap();
        let a_pos = args.iter().position(|s| s == "a=/out/liba.rlib").unwrap();
        let b_pos = args.iter().position(|s| s == "b=/out/libb.rlib").unwrap();
        assert!(a_pos < b_pos);
    }

    #[test]
    fn metadata_and_edition_flags_present() {
        let args = minimal()
            .edition("2018")
            .metadata("rdeadbeef")
            .build_args()
            .unwrap();
        assert!(args.contains(&"--edition".to_owned()));
        assert!(args.contains(&"2018".to_owned()));
        assert!(args.contains(&"metadata=rdeadbeef".to_owned()));
    }

    #[test]
    fn crate_type_parse() {
        assert_eq!(CrateType::parse("bin").unwrap(), CrateType::Bin);
        assert_eq!(CrateType::parse("lib").unwrap(), CrateType::Lib);
        assert!(CrateType::parse("dylib").is_err());
    }

    #[test]
    fn sanitize_crate_name_replaces_invalid_chars() {
        assert_eq!(sanitize_crate_name("my-app"), "my_app");
        assert_eq!(sanitize_crate_name("my.app"), "my_app");
        assert_eq!(sanitize_crate_name("plain"), "plain");
    }

    #[test]
    fn sanitize_crate_name_prefixes_leading_digit() {
        assert_eq!(sanitize_crate_name("2048"), "_2048");
    }

    #[test]
    fn sanitize_crate_name_empty() {
        assert_eq!(sanitize_crate_name(""), "_");
    }

    #[test]
    fn execute_compiles_trivial_program() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("main.rs"), "fn main() {}\n").unwrap();
        let out = tmp.path().join("demo");

        let result = RustcCommand::new()
            .entry(Path::new("main.rs"))
            .crate_name("demo")
            .edition("2018")
            .output(&out)
            .execute(tmp.path())
            .unwrap();

        assert!(result.success, "stderr: {}", result.stderr);
        assert!(out.exists());
    }

    #[test]
    fn execute_reports_compile_errors_via_result() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("main.rs"), "fn main() { let x: u8 = \"\"; }\n").unwrap();
        let out = tmp.path().join("demo");

        let result = RustcCommand::new()
            .entry(Path::new("main.rs"))
            .crate_name("demo")
            .edition("2018")
            .output(&out)
            .execute(tmp.path())
            .unwrap();

        assert!(!result.success);
        assert!(!result.stderr.is_empty());
    }
}
