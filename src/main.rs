//! Command-line driver: a one-shot file runner or a line-buffered REPL
//! sharing a single `VM` across lines, so global variables persist.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;

use rlox::prelude::*;

const EXIT_COMPILE_ERROR: u8 = 65;
const EXIT_RUNTIME_ERROR: u8 = 70;
const EXIT_IO_ERROR: u8 = 74;

#[derive(ClapParser)]
#[command(name = "rlox")]
#[command(about = "A bytecode interpreter for a small Lox-like language", long_about = None)]
struct Cli {
  /// Script to run. Omit to start a REPL.
  path: Option<PathBuf>,

  /// Disassemble every compiled chunk before executing it.
  #[arg(long)]
  dump: bool,
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let mut vm = VM::init();

  let result = match &cli.path {
    Some(path) => run_file(&mut vm, path, cli.dump),
    None => run_repl(&mut vm, cli.dump),
  };

  vm.free();
  result
}

fn run_file(vm: &mut VM, path: &PathBuf, dump: bool) -> ExitCode {
  let source = match std::fs::read_to_string(path) {
    Ok(source) => source,
    Err(err) => {
      eprintln!("Failed to read '{}': {}", path.display(), err);
      return ExitCode::from(EXIT_IO_ERROR);
    }
  };

  match run_source(vm, &source, dump) {
    Ok(()) => ExitCode::SUCCESS,
    Err(InterpretError::CompileError(message)) => {
      eprintln!("{message}");
      ExitCode::from(EXIT_COMPILE_ERROR)
    }
    Err(InterpretError::RuntimeError(message)) => {
      eprintln!("{message}");
      ExitCode::from(EXIT_RUNTIME_ERROR)
    }
  }
}

fn run_repl(vm: &mut VM, dump: bool) -> ExitCode {
  let stdin = io::stdin();
  let mut line = String::with_capacity(1024);
  loop {
    print!("> ");
    if io::stdout().flush().is_err() {
      return ExitCode::from(EXIT_IO_ERROR);
    }

    line.clear();
    match stdin.lock().read_line(&mut line) {
      Ok(0) => {
        println!();
        return ExitCode::SUCCESS;
      }
      Ok(_) => {
        if let Err(err) = run_source(vm, &line, dump) {
          eprintln!("{err}");
        }
      }
      Err(err) => {
        eprintln!("Failed to read from stdin: {}", err);
        return ExitCode::from(EXIT_IO_ERROR);
      }
    }
  }
}

fn run_source(vm: &mut VM, source: &str, dump: bool) -> Result<(), InterpretError> {
  vm.interpret_with(source, dump)
}
