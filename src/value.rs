//! # Value
//!
//! This module contains the `Value` type, which is the main type used in the
//! interpreter.
//!
//! Core implementation is about `union`.
//!
//! Wrappers of `Value` (e.g. `ValueArray`) are also included in this module.

use std::fmt::{Debug, Display};
use std::ptr::NonNull;

use crate::{object::Obj, utils::Init, vm::InterpretError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, enum_repr::EnumU8)]
pub enum ValueType {
  Bool,
  Nil,
  Number,
  Obj,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union ValUnion {
  pub(crate) boolean: bool,
  pub(crate) number: f64,
  pub(crate) obj: NonNull<Obj>,
}

impl Debug for ValUnion {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    // SAFETY: debug output only, reads the union as its widest numeric view.
    unsafe { f.write_str(&self.number.to_string()) }
  }
}

/// ## Value
///
/// A tagged union over {nil, bool, f64, object-ref}.
#[derive(Clone, Copy)]
pub struct Value {
  pub(crate) value_type: ValueType,
  pub(crate) val_union: ValUnion,
}

impl Debug for Value {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self)
  }
}

impl std::ops::Neg for Value {
  type Output = Result<Self, InterpretError>;
  fn neg(self) -> Self::Output {
    if self.is_number() {
      Ok(Value::number_val(-self.as_number()))
    } else {
      Err(InterpretError::RuntimeError(
        "Operand must be a number.".to_owned(),
      ))
    }
  }
}
impl std::ops::Add for Value {
  type Output = Result<Self, InterpretError>;
  fn add(self, rhs: Self) -> Self::Output {
    if self.is_number() && rhs.is_number() {
      Ok(Value::number_val(self.as_number() + rhs.as_number()))
    } else {
      Err(InterpretError::RuntimeError(
        "Operands must be two numbers or two strings.".to_owned(),
      ))
    }
  }
}
impl std::ops::Sub for Value {
  type Output = Result<Self, InterpretError>;
  fn sub(self, rhs: Self) -> Self::Output {
    if self.is_number() && rhs.is_number() {
      Ok(Value::number_val(self.as_number() - rhs.as_number()))
    } else {
      Err(InterpretError::RuntimeError(
        "Operands must be numbers.".to_owned(),
      ))
    }
  }
}
impl std::ops::Mul for Value {
  type Output = Result<Self, InterpretError>;
  fn mul(self, rhs: Self) -> Self::Output {
    if self.is_number() && rhs.is_number() {
      Ok(Value::number_val(self.as_number() * rhs.as_number()))
    } else {
      Err(InterpretError::RuntimeError(
        "Operands must be numbers.".to_owned(),
      ))
    }
  }
}
impl std::ops::Div for Value {
  type Output = Result<Self, InterpretError>;
  fn div(self, rhs: Self) -> Self::Output {
    if self.is_number() && rhs.is_number() {
      Ok(Value::number_val(self.as_number() / rhs.as_number()))
    } else {
      Err(InterpretError::RuntimeError(
        "Operands must be numbers.".to_owned(),
      ))
    }
  }
}

impl Value {
  /// Numeric ordering comparisons. `Value` has no `PartialOrd` impl — it's a
  /// tagged union, not an orderable type, and comparing non-numbers isn't
  /// meaningful — so these go through the same "both operands must be
  /// numbers" check as the arithmetic operators.
  pub fn greater(self, rhs: Self) -> Result<Self, InterpretError> {
    if self.is_number() && rhs.is_number() {
      Ok(Value::bool_val(self.as_number() > rhs.as_number()))
    } else {
      Err(InterpretError::RuntimeError(
        "Operands must be numbers.".to_owned(),
      ))
    }
  }

  pub fn less(self, rhs: Self) -> Result<Self, InterpretError> {
    if self.is_number() && rhs.is_number() {
      Ok(Value::bool_val(self.as_number() < rhs.as_number()))
    } else {
      Err(InterpretError::RuntimeError(
        "Operands must be numbers.".to_owned(),
      ))
    }
  }

  pub fn greater_equal(self, rhs: Self) -> Result<Self, InterpretError> {
    if self.is_number() && rhs.is_number() {
      Ok(Value::bool_val(self.as_number() >= rhs.as_number()))
    } else {
      Err(InterpretError::RuntimeError(
        "Operands must be numbers.".to_owned(),
      ))
    }
  }

  pub fn less_equal(self, rhs: Self) -> Result<Self, InterpretError> {
    if self.is_number() && rhs.is_number() {
      Ok(Value::bool_val(self.as_number() <= rhs.as_number()))
    } else {
      Err(InterpretError::RuntimeError(
        "Operands must be numbers.".to_owned(),
      ))
    }
  }
}

/// Value equality: different tags are never equal; numbers compare by IEEE
/// equality, booleans and nil by value, objects by identity except strings,
/// which compare by content (see [`crate::object::ObjString`]).
impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    if self.value_type != other.value_type {
      return false;
    }
    match self.value_type {
      ValueType::Bool => self.as_bool() == other.as_bool(),
      ValueType::Nil => true,
      ValueType::Number => self.as_number() == other.as_number(),
      ValueType::Obj => self.obj_eq(other),
    }
  }
}

impl Value {
  /// `nil` and `false` are falsey; every other value is truthy.
  pub fn is_falsey(&self) -> bool {
    self.is_nil() || (self.is_bool() && !self.as_bool())
  }
}

impl Display for Value {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self.value_type {
      ValueType::Bool => write!(f, "{}", self.as_bool()),
      ValueType::Nil => write!(f, "nil"),
      ValueType::Number => write!(f, "{}", self.as_number()),
      ValueType::Obj => write!(f, "{}", self.as_display_string()),
    }
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Self::number_val(value)
  }
}
impl From<Value> for f64 {
  fn from(val: Value) -> Self {
    val.as_number()
  }
}
impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Self::bool_val(value)
  }
}
impl From<Value> for bool {
  fn from(val: Value) -> Self {
    val.as_bool()
  }
}

impl Value {
  pub fn is_bool(&self) -> bool {
    self.value_type == ValueType::Bool
  }

  pub fn is_nil(&self) -> bool {
    self.value_type == ValueType::Nil
  }

  pub fn is_number(&self) -> bool {
    self.value_type == ValueType::Number
  }
}

impl Value {
  pub fn as_bool(&self) -> bool {
    unsafe { self.val_union.boolean }
  }

  pub fn as_number(&self) -> f64 {
    unsafe { self.val_union.number }
  }
}

impl Value {
  pub fn bool_val(value: bool) -> Self {
    Self {
      value_type: ValueType::Bool,
      val_union: ValUnion { boolean: value },
    }
  }

  pub fn nil_val() -> Self {
    Self {
      value_type: ValueType::Nil,
      val_union: ValUnion { number: 0.0 },
    }
  }

  pub fn number_val(value: f64) -> Self {
    Self {
      value_type: ValueType::Number,
      val_union: ValUnion { number: value },
    }
  }
}

/// ## ValueArray
///
/// A struct which represents a sequence of values.
#[derive(Debug, Default, Clone)]
pub struct ValueArray {
  pub(crate) values: Vec<Value>,
}

impl ValueArray {
  /// Write a value to the given value_array.
  pub fn write(&mut self, value: Value) {
    self.values.push(value);
  }

  /// Clear the given value_array.
  pub fn clear(&mut self) {
    self.values.clear();
  }
}

impl Init for ValueArray {}
