use rlox::prelude::*;

#[test]
fn interprets_a_fixture_script_located_from_the_project_root() {
  use project_root::get_project_root;
  use std::fs::read_to_string;

  let project_root = get_project_root().expect("There is no project root");
  let fixture_path = project_root.join("tests/fixtures/scoping.lox");
  let source = read_to_string(fixture_path).unwrap();

  let mut vm = VM::init();
  assert!(vm.interpret(&source).is_ok());
  vm.free();
}
