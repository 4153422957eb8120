use std::io::Write;

use rlox::prelude::*;

#[test]
fn interpret_file_reads_and_runs_a_script() {
  let mut file = tempfile::Builder::new().suffix(".lox").tempfile().unwrap();
  writeln!(file, "print 1 + 1;").unwrap();

  let mut vm = VM::init();
  assert!(vm.interpret_file(file.path().to_str().unwrap()).is_ok());
  vm.free();
}

#[test]
fn interpret_file_reports_missing_file_as_a_compile_error() {
  use rlox::vm::InterpretError;

  let mut vm = VM::init();
  match vm.interpret_file("/no/such/path.lox") {
    Err(InterpretError::CompileError(_)) => {}
    other => panic!("expected a compile error, got {other:?}"),
  }
  vm.free();
}
