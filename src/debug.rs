//! # Debug
//!
//! A module which represents the debugging utilities for the virtual machine.
//!
//! Only compiled in when one of the `debug_*` cargo features is enabled;
//! disassembly is a development aid, never consulted by `VM::run`.

use crate::chunk::{Chunk, OpCode};

pub trait Debug {
  /// Disassemble the given chunk.
  fn disassemble(&self, name: &str);

  /// Disassemble the given instruction.
  fn disassemble_instruction(&self, offset: usize) -> usize;

  /// Print a simple (no-operand) instruction.
  fn simple_instruction(&self, name: &str, offset: usize) -> usize;

  /// Print an instruction with a single-byte operand (locals).
  fn byte_instruction(&self, name: &str, offset: usize) -> usize;

  /// Print an instruction with a constant-pool index operand.
  fn constant_instruction(&self, name: &str, offset: usize) -> usize;

  /// Print a jump instruction with its 16-bit offset operand (reserved,
  /// never emitted by this core's compiler).
  fn jump_instruction(&self, name: &str, sign: isize, offset: usize) -> usize;

  /// Get the line number of the given offset.
  fn line_number(&self, offset: usize) -> usize;
}

impl Debug for Chunk {
  fn disassemble(&self, name: &str) {
    eprintln!("== {} ==", name);

    let mut offset = 0;
    while offset < self.code.len() {
      offset = self.disassemble_instruction(offset);
    }
  }

  fn disassemble_instruction(&self, offset: usize) -> usize {
    eprint!("{:04} ", offset);

    if offset > 0 && self.line_number(offset) == self.line_number(offset - 1) {
      eprint!("   | ");
    } else {
      eprint!("{:4} ", self.line_number(offset));
    }

    let instruction = self.code[offset];
    match OpCode::from(instruction) {
      OpCode::Constant => self.constant_instruction("OP_CONSTANT", offset),
      OpCode::ConstantLong => self.simple_instruction("OP_CONSTANT_LONG", offset),
      OpCode::Nil => self.simple_instruction("OP_NIL", offset),
      OpCode::True => self.simple_instruction("OP_TRUE", offset),
      OpCode::False => self.simple_instruction("OP_FALSE", offset),
      OpCode::Pop => self.simple_instruction("OP_POP", offset),
      OpCode::GetLocal => self.byte_instruction("OP_GET_LOCAL", offset),
      OpCode::SetLocal => self.byte_instruction("OP_SET_LOCAL", offset),
      OpCode::GetGlobal => self.constant_instruction("OP_GET_GLOBAL", offset),
      OpCode::DefineGlobal => self.constant_instruction("OP_DEFINE_GLOBAL", offset),
      OpCode::SetGlobal => self.constant_instruction("OP_SET_GLOBAL", offset),
      OpCode::Equal => self.simple_instruction("OP_EQUAL", offset),
      OpCode::Greater => self.simple_instruction("OP_GREATER", offset),
      OpCode::Less => self.simple_instruction("OP_LESS", offset),
      OpCode::NotEqual => self.simple_instruction("OP_NOT_EQUAL", offset),
      OpCode::GreaterEqual => self.simple_instruction("OP_GREATER_EQUAL", offset),
      OpCode::LessEqual => self.simple_instruction("OP_LESS_EQUAL", offset),
      OpCode::Add => self.simple_instruction("OP_ADD", offset),
      OpCode::Subtract => self.simple_instruction("OP_SUBTRACT", offset),
      OpCode::Multiply => self.simple_instruction("OP_MULTIPLY", offset),
      OpCode::Divide => self.simple_instruction("OP_DIVIDE", offset),
      OpCode::Not => self.simple_instruction("OP_NOT", offset),
      OpCode::Negate => self.simple_instruction("OP_NEGATE", offset),
      OpCode::Print => self.simple_instruction("OP_PRINT", offset),
      OpCode::JumpIfFalse => self.jump_instruction("OP_JUMP_IF_FALSE", 1, offset),
      OpCode::Jump => self.jump_instruction("OP_JUMP", 1, offset),
      OpCode::Return => self.simple_instruction("OP_RETURN", offset),
    }
  }

  fn simple_instruction(&self, name: &str, offset: usize) -> usize {
    eprintln!("{}", name);
    offset + 1
  }

  fn byte_instruction(&self, name: &str, offset: usize) -> usize {
    let slot = self.code[offset + 1];
    eprintln!("{:<16} {:4}", name, slot);
    offset + 2
  }

  fn constant_instruction(&self, name: &str, offset: usize) -> usize {
    let constant_index = self.code[offset + 1] as usize;
    eprintln!(
      "{:<16} {:4} '{}'",
      name, constant_index, self.constants.values[constant_index]
    );
    offset + 2
  }

  fn jump_instruction(&self, name: &str, sign: isize, offset: usize) -> usize {
    let jump = u16::from_be_bytes([self.code[offset + 1], self.code[offset + 2]]) as isize;
    eprintln!(
      "{:<16} {:4} -> {}",
      name,
      offset,
      offset as isize + 3 + sign * jump
    );
    offset + 3
  }

  fn line_number(&self, offset: usize) -> usize {
    self.lines[offset]
  }
}
