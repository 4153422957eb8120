//! # Compiler
//!
//! The compiler turns a source string into a [`crate::chunk::Chunk`] in a
//! single pass: there is no separate AST stage. [`crate::compiler::parser`]
//! holds the actual driver ([`parser::Parser::compile`]); this module holds
//! the shared precedence table and the compile-time local-variable model.

use crate::scanner::Token;

pub mod parser;

/// Precedence levels, ascending. `Primary` is the ceiling: `next()`
/// saturates there instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Precedence {
  #[default]
  None,
  Assignment, // =
  Or,         // or
  And,        // and
  Equality,   // == !=
  Comparison, // < > <= >=
  Term,       // + -
  Factor,     // * /
  Unary,      // ! -
  Call,       // . ()
  Primary,
}

impl Precedence {
  pub fn next(self) -> Self {
    match self {
      Precedence::None => Precedence::Assignment,
      Precedence::Assignment => Precedence::Or,
      Precedence::Or => Precedence::And,
      Precedence::And => Precedence::Equality,
      Precedence::Equality => Precedence::Comparison,
      Precedence::Comparison => Precedence::Term,
      Precedence::Term => Precedence::Factor,
      Precedence::Factor => Precedence::Unary,
      Precedence::Unary => Precedence::Call,
      Precedence::Call => Precedence::Primary,
      Precedence::Primary => Precedence::Primary,
    }
  }
}

/// A compile-time-resolved local variable: a name plus its scope depth.
///
/// `depth == -1` is the sentinel for "declared but not yet initialized":
/// it's set the moment the name is added to the locals array and cleared
/// to the real scope depth only after the initializer expression has been
/// fully compiled, so a local can never observe itself in its own
/// initializer (`var a = a;` in a nested scope is a compile error).
#[derive(Debug, Clone)]
pub struct Local<'a> {
  pub(crate) name: Token<'a>,
  pub(crate) depth: isize,
}

/// Compile-time state tracking which stack slots currently hold named
/// locals. Mirrors the shape of the runtime stack it addresses: `locals`
/// is capped at [`crate::common::UINT8_COUNT`] because `OP_GET_LOCAL` /
/// `OP_SET_LOCAL` address a slot with a single byte operand.
#[derive(Debug, Default)]
pub struct CompilerState<'a> {
  pub(crate) locals: Vec<Local<'a>>,
  pub(crate) scope_depth: isize,
}

/// Sentinel depth for "declared but not yet initialized".
pub(crate) const UNINITIALIZED_DEPTH: isize = -1;
