//! Brewin CLI
//!
//! Command-line interface for running and syntax-checking .brew programs.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser as ClapParser, Subcommand};

use brewin_interpreter::{Interpreter, StdioHost};
use brewin_parser::parse_program;

#[derive(ClapParser)]
#[command(name = "brewin")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Brewin interpreter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a .brew program
    Run {
        /// Input .brew source file
        input: PathBuf,
    },

    /// Parse a .brew program and report syntax errors without running it
    Check {
        /// Input .brew source file
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { input } => {
            let source = read_source(&input);
            let program = parse_program(&source).unwrap_or_else(|e| {
                eprintln!("Parse error in {}: {}", input.display(), e);
                process::exit(1);
            });
            let mut interpreter = Interpreter::new(&program, StdioHost).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                process::exit(1);
            });
            if let Err(e) = interpreter.run() {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        Commands::Check { input } => {
            let source = read_source(&input);
            if let Err(e) = parse_program(&source) {
                eprintln!("Parse error in {}: {}", input.display(), e);
                process::exit(1);
            }
            println!("{}: OK", input.display());
        }
    }
}

fn read_source(path: &PathBuf) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path.display(), e);
        process::exit(1);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_source_reads_a_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "func main(): void {{ print(\"hi\"); }}").unwrap();
        let source = read_source(&file.path().to_path_buf());
        let program = parse_program(&source).unwrap();
        assert_eq!(program.functions.len(), 1);
    }
}
