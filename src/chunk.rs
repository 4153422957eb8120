//! # Chunk
//!
//! A module which represents a sequence of bytecode,
//! with it's dependent components.

use crate::{
  utils::Init,
  value::{Value, ValueArray},
};
use enum_repr::EnumFromU8;

/// ## OpCode
///
/// An enum which represents the different opcodes used in the virtual
/// machine. `ConstantLong`, `JumpIfFalse` and `Jump` are reserved for
/// forward compatibility with the disassembler and are never emitted by
/// the compiler in this core (there is no control flow, and every chunk
/// holds well under 256 constants).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumFromU8)]
pub enum OpCode {
  Constant = 0,
  ConstantLong,
  Nil,
  True,
  False,
  Pop,
  GetLocal,
  SetLocal,
  GetGlobal,
  DefineGlobal,
  SetGlobal,
  Equal,
  Greater,
  Less,
  NotEqual,
  GreaterEqual,
  LessEqual,
  Add,
  Subtract,
  Multiply,
  Divide,
  Not,
  Negate,
  Print,
  JumpIfFalse,
  Jump,
  Return,
}

/// ## Chunk
///
/// A struct which represents a chunk/sequence of bytecode: parallel
/// `code`/`lines` arrays (one line number per byte of code) plus the
/// constant pool referenced by `OP_CONSTANT`.
#[derive(Debug, Default, Clone)]
pub struct Chunk {
  pub(crate) code: Vec<u8>,
  pub(crate) lines: Vec<usize>,
  pub(crate) constants: ValueArray,
}

impl Chunk {
  /// Write a byte to the given chunk, tagging it with the source line it
  /// came from.
  pub fn write_chunk(&mut self, byte: u8, line: usize) {
    self.code.push(byte);
    self.lines.push(line);
  }

  /// Add a constant to the given chunk, then return it's index.
  pub fn add_constant(&mut self, value: Value) -> usize {
    self.constants.write(value);
    self.constants.values.len() - 1
  }

  /// Clear the given chunk.
  pub fn clear(&mut self) {
    self.code.clear();
    self.lines.clear();
    self.constants.clear();
  }

  /// Free the given chunk. The constant pool may hold `Value::Obj`
  /// pointers, but those are owned by the VM's object list, not by the
  /// chunk, so there is nothing to drop here beyond the backing `Vec`s.
  pub fn free(&mut self) {
    self.clear();
  }
}

impl Init for Chunk {}
