use rlox::prelude::*;
use rlox::vm::InterpretError;

#[test]
fn arithmetic_respects_precedence() {
  let mut vm = VM::init();
  assert!(vm.interpret("print 1 + 2 * 3;").is_ok());
  vm.free();
}

#[test]
fn grouping_overrides_precedence() {
  let mut vm = VM::init();
  assert!(vm.interpret("print (1 + 2) * 3;").is_ok());
  vm.free();
}

#[test]
fn strings_concatenate() {
  let mut vm = VM::init();
  assert!(vm.interpret(r#"print "foo" + "bar";"#).is_ok());
  vm.free();
}

#[test]
fn blocks_shadow_without_leaking() {
  let mut vm = VM::init();
  let source = "var a = 1; var b = 2; { var a = 10; print a + b; } print a;";
  assert!(vm.interpret(source).is_ok());
  vm.free();
}

#[test]
fn globals_persist_across_separate_interpret_calls() {
  let mut vm = VM::init();
  assert!(vm.interpret("var counter = 1;").is_ok());
  assert!(vm.interpret("print counter + 1;").is_ok());
  vm.free();
}

#[test]
fn negating_a_non_number_is_a_runtime_error() {
  let mut vm = VM::init();
  match vm.interpret("print -true;") {
    Err(InterpretError::RuntimeError(message)) => {
      assert!(message.starts_with("Operand must be a number."))
    }
    other => panic!("expected a runtime error, got {other:?}"),
  }
  vm.free();
}

#[test]
fn reading_a_local_in_its_own_initializer_is_a_compile_error() {
  let mut vm = VM::init();
  match vm.interpret("var a; { var a = a; }") {
    Err(InterpretError::CompileError(message)) => {
      assert!(message.contains("Can't read local variable in its own initializer."))
    }
    other => panic!("expected a compile error, got {other:?}"),
  }
  vm.free();
}

#[test]
fn reading_an_undefined_global_is_a_runtime_error() {
  let mut vm = VM::init();
  match vm.interpret("print undefined;") {
    Err(InterpretError::RuntimeError(message)) => {
      assert!(message.contains("Undefined variable 'undefined'."))
    }
    other => panic!("expected a runtime error, got {other:?}"),
  }
  vm.free();
}

#[test]
fn redeclaring_a_local_in_the_same_scope_is_a_compile_error() {
  let mut vm = VM::init();
  match vm.interpret("{ var a = 1; var a = 2; }") {
    Err(InterpretError::CompileError(message)) => {
      assert!(message.contains("Already a variable with this name in this scope."))
    }
    other => panic!("expected a compile error, got {other:?}"),
  }
  vm.free();
}
