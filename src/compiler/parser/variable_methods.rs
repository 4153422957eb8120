use super::*;
use crate::common::UINT8_COUNT;
use crate::compiler::UNINITIALIZED_DEPTH;

impl<'a> Parser<'a> {
  fn parse_variable(&mut self, message: String) -> Result<u8, InterpretError> {
    self.consume_token(TokenType::Identifier, message)?;

    // record if it's a local variable (scope_depth > 0)
    self.declare_variable()?;

    // if in local scope, simply exit (with a fake index)
    if self.compiler.scope_depth > 0 {
      return Ok(0);
    }

    self.identifier_constant()
  }

  fn mark_initialized(&mut self) {
    self.compiler.locals.last_mut().unwrap().depth = self.compiler.scope_depth;
  }

  fn define_variable(&mut self, global_index: u8) -> Result<(), InterpretError> {
    if self.compiler.scope_depth > 0 {
      self.mark_initialized();
      Ok(())
    } else {
      self.emit_bytes(&[OpCode::DefineGlobal as u8, global_index])
    }
  }

  /// Records the existence of variable (only for locals).
  fn declare_variable(&mut self) -> Result<(), InterpretError> {
    if self.compiler.scope_depth == 0 {
      return Ok(());
    }

    // Detect error => two variables with same name
    // in the same local scope.
    let mut duplicate = false;
    for local in self.compiler.locals.iter().rev() {
      if local.depth != UNINITIALIZED_DEPTH && local.depth < self.compiler.scope_depth {
        break;
      }
      if local.name.lexeme == self.previous.lexeme {
        duplicate = true;
        break;
      }
    }
    if duplicate {
      return self.error("Already a variable with this name in this scope.".into());
    }

    self.add_local()
  }

  fn add_local(&mut self) -> Result<(), InterpretError> {
    if self.compiler.locals.len() >= UINT8_COUNT {
      return self.error("Too many local variables in function(At most: 256).".into());
    }
    self.compiler.locals.push(Local {
      depth: UNINITIALIZED_DEPTH,
      name: self.previous.to_owned(),
    });
    Ok(())
  }

  pub(crate) fn identifier_constant(&mut self) -> Result<u8, InterpretError> {
    let value = self.allocate_string(self.previous.lexeme.to_owned());
    self.make_constant(value)
  }

  /// Try to find the local variable in the current scope.
  ///
  /// If find, return the index of the local variable. Searches from the
  /// most recently declared local backward so inner shadowing wins.
  pub(crate) fn resolve_local(&mut self) -> Result<Option<usize>, InterpretError> {
    let pos = self
      .compiler
      .locals
      .iter()
      .enumerate()
      .rev()
      .find(|(_, local)| local.name.lexeme == self.previous.lexeme)
      .map(|(idx, _)| idx);
    if let Some(pos) = pos {
      if self.compiler.locals[pos].depth == UNINITIALIZED_DEPTH {
        self.error("Can't read local variable in its own initializer.".into())?;
      }
    }
    Ok(pos)
  }

  /// Declare: bind a new variable.
  pub(crate) fn var_declaration(&mut self) -> Result<(), InterpretError> {
    let global_index = self.parse_variable("Expect variable name.".into())?;

    if self.match_token(TokenType::Equal)? {
      self.expression()?;
    } else {
      self.emit_byte(OpCode::Nil as u8)?;
    }

    self.consume_token(
      TokenType::Semicolon,
      "Expect `;` after variable declaration.".into(),
    )?;

    self.define_variable(global_index)
  }
}
