//! # Common
//!
//! Common types and constants used throughout the library.

/// Maximum number of live local variables at once: one byte operand
/// addresses a slot, so the locals array and the runtime stack it backs
/// cannot exceed this without widening the operand encoding.
pub const UINT8_COUNT: usize = 256;

/// Capacity of the VM's value stack.
pub const STACK_MAX: usize = UINT8_COUNT;
