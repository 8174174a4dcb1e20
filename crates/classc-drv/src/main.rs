//! classc - command-line entry point.
//!
//! Reads a source file, runs it through [`classc_drv::Compiler`], and
//! either prints the generated C to stdout or reports every diagnostic in
//! `[stage] Line L, Column C: message` form and exits non-zero. `--run`
//! additionally shells out to a system C compiler (see
//! [`classc_drv::runner`]) and prints the compiled program's own output.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use classc_drv::Compiler;

/// A source-to-source compiler for the class-based toy language, emitting
/// C.
#[derive(Parser, Debug)]
#[command(name = "classc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiles a .cls source file to C", long_about = None)]
struct Cli {
    /// Source file to compile
    source: PathBuf,

    /// Also compile the generated C with the system compiler and run it
    #[arg(long)]
    run: bool,

    /// Write the generated C to this file instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let source = match std::fs::read_to_string(&cli.source) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: could not read {}: {e}", cli.source.display());
            return ExitCode::from(3);
        }
    };

    let result = Compiler::new(&source).compile();

    if !result.success {
        eprintln!("Compilation failed:");
        for err in &result.errors {
            eprintln!("  {err}");
        }
        return ExitCode::from(1);
    }

    let c_code = result.c_code.expect("successful compilation always produces C code");

    match &cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &c_code) {
                eprintln!("error: could not write {}: {e}", path.display());
                return ExitCode::from(3);
            }
        }
        None if !cli.run => println!("{c_code}"),
        None => {}
    }

    if cli.run {
        match classc_drv::runner::compile_and_run(&c_code) {
            Ok(output) => {
                print!("{}", output.stdout);
                if output.exit_code != 0 {
                    eprintln!("Program exited with code {}", output.exit_code);
                    return ExitCode::from(1);
                }
            }
            Err(e) => {
                eprintln!("error: {e:#}");
                return ExitCode::from(2);
            }
        }
    }

    ExitCode::SUCCESS
}
