//! # Object
//!
//! This module mainly defines the `Object` type, which is the type of the
//! heap-allocated objects in the virtual machine.
//!
//! Objects are intrusively linked into a singly-linked list rooted in the
//! [`crate::vm::VM`] so that every allocation can be walked and freed in one
//! pass at VM teardown; there is no reference counting or GC (see
//! [`crate::memory`]).

use crate::{
  value::{ValUnion, Value, ValueType},
  vm::InterpretError,
};
use std::{
  fmt::{Debug, Display},
  ptr::NonNull,
};

/// ## Object Type
///
/// An enum which represents the type of the object. This core only ever
/// allocates strings; the enum exists so the dispatch on `obj_type` reads
/// the same way it would once more kinds (e.g. functions, instances) exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjType {
  String,
}

/// ## Object
///
/// The meta type (header) of all `objects` in the virtual machine. `next`
/// is the intrusive link to the previously-allocated object; the VM holds
/// the head of the list and walks it once at teardown.
#[derive(Debug)]
pub struct Obj {
  pub(crate) obj_type: ObjType,
  pub(crate) next: Option<NonNull<Obj>>,
}

impl Obj {
  pub fn new(obj_type: ObjType, next: Option<NonNull<Obj>>) -> Self {
    Self { obj_type, next }
  }
}

/// ## Object Trait
///
/// A helper trait of meta type `Object`: anything that can be boxed onto
/// the heap and addressed through the common `Obj` header.
pub trait ObjTrait {
  fn cast_to_obj_ptr(self) -> NonNull<Obj>;
}

impl Value {
  /// Quoted representation used by the disassembler when printing constants.
  pub(crate) fn format_object(&self) -> String {
    match self.obj_type().unwrap() {
      ObjType::String => format!("\"{}\"", self.as_rust_string().unwrap()),
    }
  }

  /// Plain representation used by `OP_PRINT` and `Display`.
  pub(crate) fn as_display_string(&self) -> String {
    match self.obj_type().unwrap() {
      ObjType::String => self.as_rust_string().unwrap().to_owned(),
    }
  }

  /// Object equality: strings compare by content, everything else (once
  /// more object kinds exist) by pointer identity.
  pub(crate) fn obj_eq(&self, other: &Self) -> bool {
    match (self.obj_type(), other.obj_type()) {
      (Ok(ObjType::String), Ok(ObjType::String)) => {
        self.as_rust_string().unwrap() == other.as_rust_string().unwrap()
      }
      _ => false,
    }
  }
}

impl Value {
  pub fn obj_val(value: NonNull<Obj>) -> Self {
    Self {
      value_type: ValueType::Obj,
      val_union: ValUnion { obj: value },
    }
  }

  pub fn is_obj(&self) -> bool {
    self.value_type == ValueType::Obj
  }

  pub fn as_obj(&self) -> NonNull<Obj> {
    unsafe { self.val_union.obj }
  }
}

impl Value {
  pub fn obj_type(&self) -> Result<ObjType, InterpretError> {
    match self.value_type {
      ValueType::Obj => Ok(unsafe { self.val_union.obj.as_ref() }.obj_type),
      _ => Err(InterpretError::RuntimeError(
        "Value is not an object.".into(),
      )),
    }
  }

  fn is_obj_type(&self, expect: ObjType) -> bool {
    self.is_obj() && self.obj_type() == Ok(expect)
  }
}

impl PartialEq for ObjType {
  fn eq(&self, other: &Self) -> bool {
    std::mem::discriminant(self) == std::mem::discriminant(other)
  }
}
impl Eq for ObjType {}

/// ## Object String
///
/// The type of the string object. `hash` is precomputed at construction
/// time and reserved for a future interning pool; this core never reads it.
#[repr(C)]
#[derive(Debug)]
pub struct ObjString {
  pub(crate) obj: Obj,
  pub(crate) data: String,
  pub(crate) hash: u64,
}

impl ObjTrait for ObjString {
  fn cast_to_obj_ptr(self) -> NonNull<Obj> {
    // NonNull::from(&self).cast() /* => Error! */
    NonNull::new(Box::into_raw(Box::new(self))).unwrap().cast() /* => Ok */
  }
}

impl Display for ObjString {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.data)
  }
}

impl Value {
  pub fn is_string(&self) -> bool {
    self.is_obj_type(ObjType::String)
  }

  pub fn as_string(&self) -> Result<NonNull<ObjString>, InterpretError> {
    if self.is_string() {
      Ok(self.as_obj().cast())
    } else {
      Err(InterpretError::RuntimeError(
        "Value is not a string.".into(),
      ))
    }
  }

  pub fn as_rust_string(&self) -> Result<&str, InterpretError> {
    let str_ref = &unsafe { self.as_string()?.as_ref() }.data;
    Ok(str_ref)
  }
}

/// The FNV-1a hash used to precompute [`ObjString::hash`], matching the
/// reference implementation's `hashString`.
pub(crate) fn fnv1a(bytes: &[u8]) -> u64 {
  let mut hash: u64 = 0xcbf29ce484222325;
  for &byte in bytes {
    hash ^= byte as u64;
    hash = hash.wrapping_mul(0x100000001b3);
  }
  hash
}
