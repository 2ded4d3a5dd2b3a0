//! ## Overview
//! A virtual machine for the 15-bit, word-addressed architecture used by the
//! "Synacor Challenge": eight general-purpose registers, an unbounded stack,
//! 32,768 words of memory, and 22 opcodes.
//!
//! ## Architecture
//! Every value in memory and every register is a 15-bit unsigned word stored
//! in a 16-bit slot; the high bit is never set by any operation this machine
//! performs. A word in the range `[0, 32767]` is a literal; a word in the
//! range `[32768, 32775]` names one of the eight registers, and is resolved
//! to that register's current contents wherever an instruction reads a
//! *value*. A word outside `[0, 32775]` never appears in a well-formed
//! program, and any instruction that encounters one fails.
//!
//! ## Execution model
//! The program counter starts at address 0. Each cycle fetches one opcode,
//! then as many operand words as that opcode's arity requires, then executes
//! it; `halt`, `ret` against an empty stack, or the program counter running
//! past the top of memory all end the run cleanly. An invalid opcode, a
//! malformed operand, a stack underflow from `pop`, or division by zero from
//! `mod` all end it with an error.
//!
//! ## Math
//! The arithmetic opcodes (`add`, `mult`, `mod`) operate modulo 32,768;
//! `and`, `or`, and `not` operate on the low 15 bits only.
//!
//! ## Input and output
//! `out` writes the low byte of its operand to the output stream; `in` reads
//! one byte from the input stream into a register, failing if the stream is
//! exhausted.

mod error;
mod instruction;
mod machine;
mod memory;
mod registers;
mod stack;
mod tracer;
mod word;

pub use error::{ImageFormatError, IoFailure, VmError};
pub use instruction::{DecodedInstruction, Opcode};
pub use machine::{Machine, StepOutcome};
pub use memory::{Memory, MEMORY_SIZE};
pub use registers::Registers;
pub use stack::Stack;
pub use tracer::{NullTracer, Tracer, WriteTracer};
pub use word::{resolve_register, resolve_value, Operand};
