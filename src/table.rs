//! # Table
//!
//! A module which wraps [`std::collections::HashMap`] for the VM's global
//! variable namespace.
//!
//! Keys are plain `String`s: two `Value` strings are equal by content (see
//! [`crate::object`]), so content is also what the global namespace should
//! key on. This sidesteps needing `ObjString` itself as a hash key.

use std::collections::HashMap;

use crate::{utils::Init, value::Value};

#[derive(Debug, Clone, Default)]
pub struct Table(HashMap<String, Value>);

impl Table {
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.0.get(key)
  }

  pub fn set(&mut self, key: String, value: Value) -> Option<Value> {
    self.0.insert(key, value)
  }

  pub fn remove(&mut self, key: &str) -> Option<Value> {
    self.0.remove(key)
  }

  pub fn free(&mut self) {
    self.0.clear()
  }
}

impl Init for Table {}
