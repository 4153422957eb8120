//! # VM
//!
//! ## Based on Stack
//!
//! The VM (aka. Virtual Machine) is the core of the interpreter.
//!
//! It is responsible for:
//!
//! - executing the bytecode

use std::ptr::NonNull;

use crate::debug::Debug;
use crate::{
  chunk::{Chunk, OpCode},
  common::STACK_MAX,
  compiler::parser::Parser,
  object::Obj,
  table::Table,
  utils::Init,
  value::Value,
};

/// ## InterpretError
///
/// The two failure modes of [`VM::interpret`]: a compile-time error
/// (scanning/parsing) or a runtime error (raised while executing bytecode).
#[derive(Debug, Clone, thiserror::Error)]
pub enum InterpretError {
  #[error("{0}")]
  CompileError(String),
  #[error("{0}")]
  RuntimeError(String),
}

/// ## VM
///
/// A struct which represents the virtual machine.
#[derive(Debug, Default)]
pub struct VM {
  /// The chunk currently being executed.
  pub(crate) chunk: Chunk,
  /// The instruction pointer (actually, the index).
  pub(crate) ip: usize,
  /// The stack of the virtual machine.
  pub(crate) stack: Vec<Value>,
  /// All globals, keyed by name.
  pub(crate) globals: Table,
  /// Head of the intrusive heap-object list. Every object allocated during
  /// compilation or execution ends up reachable from here by the time
  /// `interpret` returns, so `free` can reclaim everything in one pass.
  pub(crate) objects: Option<NonNull<Obj>>,
}

impl VM {
  /// Compile and run a source string end to end.
  pub fn interpret(&mut self, source: &str) -> Result<(), InterpretError> {
    self.interpret_with(source, false)
  }

  /// Compile and run a source string, optionally disassembling the
  /// compiled chunk first (the CLI's `--dump` flag).
  pub fn interpret_with(&mut self, source: &str, dump: bool) -> Result<(), InterpretError> {
    let mut parser = Parser::init();
    // Hand the VM's current object list to the parser so that string
    // constants allocated at compile time are linked into the same list
    // the VM will eventually free, then take it back once compilation
    // finishes (whether or not it succeeded).
    parser.objects = self.objects.take();
    let compiled_ok = parser.compile(source);
    self.objects = parser.objects.take();

    if !compiled_ok {
      return Err(InterpretError::CompileError(
        "compilation failed; see diagnostics above".into(),
      ));
    }

    self.rebind(parser.chunk);
    #[cfg(feature = "debug_print_code")]
    let dump = true;
    if dump {
      self.chunk.disassemble("code");
    }
    tracing::debug!(bytes = self.chunk.code.len(), "compiled chunk");
    self.run()
  }

  /// Interpret from file(path).
  pub fn interpret_file(&mut self, path: &str) -> Result<(), InterpretError> {
    use std::fs::read_to_string;
    let content = read_to_string(path)
      .map_err(|err| InterpretError::CompileError(format!("Failed to read '{}': {}", path, err)))?;
    self.interpret(&content)
  }
}

impl VM {
  /// Push onto the value stack, enforcing the fixed 256-slot capacity.
  fn push(&mut self, value: Value) -> Result<(), InterpretError> {
    if self.stack.len() >= STACK_MAX {
      return Err(InterpretError::RuntimeError("Stack overflow.".into()));
    }
    self.stack.push(value);
    Ok(())
  }

  fn unary_op<T>(&mut self, op: T) -> Result<(), InterpretError>
  where
    T: Fn(Value) -> Result<Value, InterpretError>,
  {
    if let Some(value) = self.stack.pop() {
      let result = op(value)?;
      self.push(result)
    } else {
      Err(InterpretError::RuntimeError(
        "Operate on an empty stack.".into(),
      ))
    }
  }

  fn binary_op<T>(&mut self, op: T) -> Result<(), InterpretError>
  where
    T: Fn(Value, Value) -> Result<Value, InterpretError>,
  {
    if let (Some(b), Some(a)) = (self.stack.pop(), self.stack.pop()) {
      let result = op(a, b)?;
      self.push(result)
    } else {
      Err(InterpretError::RuntimeError(
        "Operate on an empty stack.".into(),
      ))
    }
  }

  /// `OP_ADD` needs `&mut self` (string concatenation allocates), so it
  /// can't go through the `Fn` closures `binary_op` takes.
  fn add(&mut self) -> Result<(), InterpretError> {
    let (b, a) = match (self.stack.pop(), self.stack.pop()) {
      (Some(b), Some(a)) => (b, a),
      _ => {
        return Err(InterpretError::RuntimeError(
          "Operate on an empty stack.".into(),
        ))
      }
    };
    if a.is_string() && b.is_string() {
      let mut concatenated = a.as_rust_string().unwrap().to_owned();
      concatenated.push_str(b.as_rust_string().unwrap());
      let value = self.allocate_string(concatenated);
      self.push(value)
    } else {
      let result = (a + b)?;
      self.push(result)
    }
  }
}

impl VM {
  /// Read a byte from the chunk (update ip).
  fn read_byte(&mut self) -> u8 {
    let byte = self.chunk.code[self.ip];
    self.ip += 1;
    byte
  }

  /// Read a constant from the chunk (update ip).
  fn read_constant(&mut self) -> Value {
    let index = self.chunk.code[self.ip];
    self.ip += 1;
    self.chunk.constants.values[index as usize]
  }

  /// Read a short(u16) from the chunk (update ip). Only used by the
  /// reserved, never-emitted `OP_JUMP`/`OP_JUMP_IF_FALSE`.
  fn read_u16(&mut self) -> u16 {
    self.ip += 2;
    u16::from_be_bytes([self.chunk.code[self.ip - 2], self.chunk.code[self.ip - 1]])
  }
}

impl VM {
  /// Disassemble the current instruction.
  #[cfg(feature = "debug_trace_execution")]
  fn disassemble_instruction(&self) -> Result<(), InterpretError> {
    self.chunk.disassemble_instruction(self.ip);
    Ok(())
  }

  /// Trace VM's stack.
  #[cfg(feature = "debug_trace_stack")]
  pub fn trace_stack(&self) {
    eprint!("        | ");
    eprint!("[");
    for (i, value) in self.stack.iter().enumerate() {
      eprint!("{}", value);
      if i != self.stack.len() - 1 {
        eprint!(", ");
      }
    }
    eprintln!("]")
  }
}

impl VM {
  /// Run the virtual machine (with a valid chunk bound via `rebind`).
  pub fn run(&mut self) -> Result<(), InterpretError> {
    let mut result = Ok(());
    while self.ip < self.chunk.code.len() {
      #[cfg(feature = "debug_trace_stack")]
      self.trace_stack();
      #[cfg(feature = "debug_trace_execution")]
      self.disassemble_instruction()?;
      result = self.run_one_step();
      if result.is_err() {
        break;
      }
    }
    result
  }

  #[inline]
  fn run_one_step(&mut self) -> Result<(), InterpretError> {
    let raw_result = match OpCode::from(self.read_byte()) {
      /* Constants */
      OpCode::Constant => {
        let constant = self.read_constant();
        self.push(constant)
      }
      OpCode::ConstantLong => Err(InterpretError::RuntimeError(
        "OP_CONSTANT_LONG is reserved and never emitted.".into(),
      )),
      OpCode::Nil => self.push(Value::nil_val()),
      OpCode::True => self.push(Value::bool_val(true)),
      OpCode::False => self.push(Value::bool_val(false)),
      /* Comparisons */
      OpCode::Equal => self.binary_op(|l, r| Ok(Value::bool_val(l == r))),
      OpCode::Greater => self.binary_op(|l, r| l.greater(r)),
      OpCode::Less => self.binary_op(|l, r| l.less(r)),
      OpCode::NotEqual => self.binary_op(|l, r| Ok(Value::bool_val(l != r))),
      OpCode::GreaterEqual => self.binary_op(|l, r| l.greater_equal(r)),
      OpCode::LessEqual => self.binary_op(|l, r| l.less_equal(r)),
      /* Binary Arith Opts */
      OpCode::Add => self.add(),
      OpCode::Subtract => self.binary_op(|l, r| l - r),
      OpCode::Multiply => self.binary_op(|l, r| l * r),
      OpCode::Divide => self.binary_op(|l, r| l / r),
      /* Unary Arith Opts */
      OpCode::Not => self.unary_op(|v| Ok(Value::bool_val(v.is_falsey()))),
      OpCode::Negate => self.unary_op(|v| -v),
      /* Control Flow Opts (reserved, never emitted) */
      OpCode::JumpIfFalse => {
        let offset = self.read_u16();
        if self.stack.last().unwrap().is_falsey() {
          self.ip = (self.ip as isize + offset as i16 as isize) as usize;
        }
        Ok(())
      }
      OpCode::Jump => {
        let offset = self.read_u16();
        self.ip = (self.ip as isize + offset as i16 as isize) as usize;
        Ok(())
      }
      /* Helper Opts */
      OpCode::Print => {
        if let Some(value) = self.stack.pop() {
          println!("{}", value);
          Ok(())
        } else {
          Err(InterpretError::RuntimeError(
            "Expect a value after `print` statement.".into(),
          ))
        }
      }
      OpCode::Pop => {
        self.stack.pop();
        Ok(())
      }
      /* Variable Getters/Setters */
      OpCode::DefineGlobal => {
        let name = self.read_constant();
        match name.as_rust_string() {
          Ok(name) => {
            let name = name.to_owned();
            let value = self.stack.pop().unwrap();
            self.globals.set(name, value);
            Ok(())
          }
          Err(_) => Err(InterpretError::RuntimeError(
            "Expect a string as global variable name.".into(),
          )),
        }
      }
      OpCode::GetGlobal => {
        let name = self.read_constant();
        match name.as_rust_string() {
          Ok(name) => {
            let name = name.to_owned();
            if let Some(&value) = self.globals.get(&name) {
              self.push(value)
            } else {
              Err(InterpretError::RuntimeError(format!(
                "Undefined variable '{}'.",
                name
              )))
            }
          }
          Err(_) => Err(InterpretError::RuntimeError(
            "Expect a string as global variable name.".into(),
          )),
        }
      }
      OpCode::GetLocal => {
        let slot = self.read_byte();
        if let Some(value) = self.stack.get(slot as usize) {
          let value = value.to_owned();
          self.push(value)
        } else {
          Err(InterpretError::RuntimeError(format!(
            "Undefined local variable at slot `{}`.",
            slot
          )))
        }
      }
      OpCode::SetGlobal => {
        let name = self.read_constant();
        match name.as_rust_string() {
          Ok(name) => {
            let name = name.to_owned();
            let top = *self.stack.last().unwrap();
            if self.globals.set(name.clone(), top).is_none() {
              self.globals.remove(&name);
              Err(InterpretError::RuntimeError(format!(
                "Undefined variable '{}'.",
                name
              )))
            } else {
              Ok(())
            }
          }
          Err(_) => Err(InterpretError::RuntimeError(
            "Expect a string as global variable name.".into(),
          )),
        }
      }
      OpCode::SetLocal => {
        let slot = self.read_byte();
        let top = *self.stack.last().unwrap();
        if let Some(value) = self.stack.get_mut(slot as usize) {
          *value = top;
          Ok(())
        } else {
          Err(InterpretError::RuntimeError(format!(
            "Undefined local variable at slot `{}`.",
            slot
          )))
        }
      }
      /* Return */
      OpCode::Return => {
        return Ok(());
      }
    };
    if let Err(InterpretError::RuntimeError(message)) = raw_result {
      self.runtime_error(message)
    } else {
      raw_result
    }
  }
}

impl VM {
  pub fn runtime_error(&mut self, message: String) -> Result<(), InterpretError> {
    // Index should be `ip - 1`, as ip has increased before error occurred.
    let inst_index = self.ip - 1;
    let line = self.chunk.lines[inst_index];
    let full_message = format!("{}\n[line {}] in script", message, line);

    tracing::error!(line, %message, "runtime error");
    self.stack.clear();

    Err(InterpretError::RuntimeError(full_message))
  }
}

impl Init for VM {}

impl VM {
  /// Free the chunk, globals, and heap objects.
  pub fn free(&mut self) {
    self.chunk.free();
    self.stack.clear();
    self.globals.free();
    self.free_objects();
  }

  /// Rebind the virtual machine to the given chunk.
  pub fn rebind(&mut self, chunk: Chunk) {
    self.chunk = chunk;
    self.ip = 0;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::common::STACK_MAX;

  /// Pushes more constants than the stack can hold, without ever popping,
  /// by hand-building the chunk directly (no expression in this grammar
  /// keeps that many values live at once through compilation alone).
  #[test]
  fn pushing_past_stack_max_is_a_runtime_error() {
    let mut chunk = Chunk::init();
    let index = chunk.add_constant(Value::number_val(1.0)) as u8;
    for _ in 0..=STACK_MAX {
      chunk.write_chunk(OpCode::Constant as u8, 1);
      chunk.write_chunk(index, 1);
    }
    chunk.write_chunk(OpCode::Return as u8, 1);

    let mut vm = VM::init();
    vm.rebind(chunk);
    match vm.run() {
      Err(InterpretError::RuntimeError(message)) => {
        assert!(message.starts_with("Stack overflow."))
      }
      other => panic!("expected a runtime error, got {other:?}"),
    }
    vm.free();
  }
}
