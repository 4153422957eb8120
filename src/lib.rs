//! A single-pass, Pratt-parsed, stack-based bytecode interpreter for a
//! small Lox-like expression and statement language: scanner, compiler,
//! and VM, wired together the way `clox` wires them, minus control flow.
//!
//! ```text
//! source text -> Scanner -> Parser (single-pass compiler) -> Chunk -> VM
//! ```

pub mod chunk;
pub mod common;
pub mod compiler;
pub mod debug;
pub mod memory;
pub mod object;
pub mod scanner;
pub mod table;
pub mod utils;
pub mod value;
pub mod vm;

/// Re-exports of the types most callers reach for.
pub mod prelude {
  pub use crate::chunk::{Chunk, OpCode};
  pub use crate::utils::Init;
  pub use crate::vm::{InterpretError, VM};
}
