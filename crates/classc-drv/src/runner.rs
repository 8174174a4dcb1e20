//! Thin adapter over an external C compiler and the binary it produces.
//!
//! Deliberately outside [`crate::Compiler`]: the facade's job stops at
//! producing C source text. Invoking `gcc` and executing the result is an
//! environment concern the CLI opts into with `--run`, not part of the
//! "hard core" lexer/parser/analyzer/codegen pipeline.

use std::io::Write;
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Output captured from running the compiled binary.
pub struct RunOutput {
    pub stdout: String,
    pub exit_code: i32,
}

/// Compiles `c_code` with the system C compiler and runs the resulting
/// binary.
pub fn compile_and_run(c_code: &str) -> Result<RunOutput> {
    let dir = tempfile::tempdir().context("creating scratch directory for generated C")?;
    let c_path = dir.path().join("program.c");
    let bin_path = dir.path().join("program");

    let mut c_file = std::fs::File::create(&c_path).context("writing generated C to disk")?;
    c_file.write_all(c_code.as_bytes())?;
    drop(c_file);

    let compile = Command::new("gcc")
        .arg("-o")
        .arg(&bin_path)
        .arg(&c_path)
        .arg("-Wall")
        .output()
        .context("spawning gcc; is it installed and on PATH?")?;
    if !compile.status.success() {
        bail!(
            "gcc exited with {}:\n{}",
            compile.status,
            String::from_utf8_lossy(&compile.stderr)
        );
    }

    let run = Command::new(&bin_path)
        .output()
        .context("spawning compiled program")?;

    Ok(RunOutput {
        stdout: String::from_utf8_lossy(&run.stdout).into_owned(),
        exit_code: run.status.code().unwrap_or(-1),
    })
}
