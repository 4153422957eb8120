//! # Memory
//!
//! Allocation and teardown for heap objects.
//!
//! Every object the compiler or VM allocates is linked at the head of its
//! owning list (the [`crate::compiler::parser::Parser`]'s list during
//! compilation, the [`crate::vm::VM`]'s list once ownership is handed
//! over) on creation; `free_objects` walks a list once and drops each
//! node. There is no per-operation refcount or reclamation in between —
//! space grows monotonically for the lifetime of the VM (GC is a
//! deliberately out-of-scope future work item).

use std::ptr::NonNull;

use crate::{
  object::{fnv1a, Obj, ObjString, ObjTrait, ObjType},
  value::Value,
  vm::VM,
};

/// Box a Rust `String` as an `ObjString`, link it at the head of `objects`,
/// and return it wrapped as a `Value`.
pub(crate) fn allocate_string(objects: &mut Option<NonNull<Obj>>, data: String) -> Value {
  let hash = fnv1a(data.as_bytes());
  let obj_string = ObjString {
    obj: Obj::new(ObjType::String, *objects),
    data,
    hash,
  };
  let ptr = obj_string.cast_to_obj_ptr();
  *objects = Some(ptr);
  Value::obj_val(ptr)
}

/// Walk a list once, dropping every node.
pub(crate) fn free_objects(objects: &mut Option<NonNull<Obj>>) {
  let mut current = objects.take();
  while let Some(obj_ptr) = current {
    // SAFETY: every node in this list was boxed by `allocate_string` (the
    // only allocator in this core) and is visited exactly once.
    let obj_type = unsafe { obj_ptr.as_ref() }.obj_type;
    current = unsafe { obj_ptr.as_ref() }.next;
    match obj_type {
      ObjType::String => {
        let string_ptr: NonNull<ObjString> = obj_ptr.cast();
        drop(unsafe { Box::from_raw(string_ptr.as_ptr()) });
      }
    }
  }
}

impl VM {
  pub(crate) fn allocate_string(&mut self, data: String) -> Value {
    allocate_string(&mut self.objects, data)
  }

  /// Called only from `VM::free`.
  pub(crate) fn free_objects(&mut self) {
    free_objects(&mut self.objects);
  }
}
