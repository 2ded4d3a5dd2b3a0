//! The interpreter loop: the only place PC, memory, registers, and the
//! stack are all mutated together. Everything else in this crate is a
//! leaf that `Machine` composes.

use std::io::{Read, Write};

use crate::error::{IoFailure, VmError};
use crate::instruction::{DecodedInstruction, Opcode};
use crate::memory::{Memory, MEMORY_SIZE};
use crate::registers::Registers;
use crate::stack::Stack;
use crate::tracer::Tracer;
use crate::word::{resolve_register, resolve_value, MODULUS};

/// What happened as a result of executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Execution should continue with the next instruction.
    Continue,
    /// `halt` was reached, or `ret` executed against an empty stack.
    /// Both are clean-exit conditions; the caller should stop stepping.
    Halted,
}

/// Owns all machine state: PC, memory, registers, and the stack. Created
/// once per run and mutated exclusively by [`Machine::step`].
pub struct Machine {
    pc: u16,
    memory: Memory,
    registers: Registers,
    stack: Stack,
}

impl Machine {
    /// Build a machine with the given memory image, PC at 0, all
    /// registers zero, and an empty stack.
    pub fn new(memory: Memory) -> Machine {
        Machine {
            pc: 0,
            memory,
            registers: Registers::new(),
            stack: Stack::new(),
        }
    }

    /// As [`Machine::new`], but pre-reserving stack capacity as a
    /// performance hint (never a ceiling — see [`Stack::with_capacity_hint`]).
    pub fn with_stack_capacity_hint(memory: Memory, hint: usize) -> Machine {
        Machine {
            pc: 0,
            memory,
            registers: Registers::new(),
            stack: Stack::with_capacity_hint(hint),
        }
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Read a raw memory word, for inspection (the debugger's `examine`
    /// command). Never fails: every address in `[0, 32767]` is mapped.
    pub fn peek_memory(&self, addr: u16) -> u16 {
        self.memory.read(addr)
    }

    /// Decode the instruction at the current PC without executing it or
    /// advancing PC. Returns `None` if PC has run off the top of memory
    /// (the same clean-exit condition `step` would reach).
    pub fn peek_next(&self) -> Option<DecodedInstruction> {
        let address = self.pc;
        if address as usize >= MEMORY_SIZE {
            return None;
        }
        let op = self.memory.read(address);
        let opcode = Opcode::from_word(op, address).ok()?;
        let mut operands = [0u16; 3];
        for (i, slot) in operands.iter_mut().take(opcode.arity()).enumerate() {
            let addr = address as usize + 1 + i;
            if addr >= MEMORY_SIZE {
                return None;
            }
            *slot = self.memory.read(addr as u16);
        }
        Some(DecodedInstruction {
            address,
            opcode,
            operands,
        })
    }

    /// Run to completion: keep stepping until `halt`, a clean `ret`-on-empty
    /// exit, or a fatal error. Flushes `output` exactly once, regardless of
    /// how the run ended, so a successful or a failed run both retain
    /// whatever bytes were already written.
    pub fn run(
        &mut self,
        input: &mut impl Read,
        output: &mut impl Write,
        tracer: &mut dyn Tracer,
    ) -> Result<(), VmError> {
        let result = loop {
            match self.step(input, output, tracer) {
                Ok(StepOutcome::Continue) => continue,
                Ok(StepOutcome::Halted) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        let _ = output.flush();
        result
    }

    /// Fetch, decode, and execute exactly one instruction.
    pub fn step(
        &mut self,
        input: &mut impl Read,
        output: &mut impl Write,
        tracer: &mut dyn Tracer,
    ) -> Result<StepOutcome, VmError> {
        let address = self.pc;
        let op = match self.fetch_word() {
            Some(w) => w,
            None => return Ok(StepOutcome::Halted),
        };
        let opcode = Opcode::from_word(op, address)?;

        let mut operands = [0u16; 3];
        for slot in operands.iter_mut().take(opcode.arity()) {
            *slot = match self.fetch_word() {
                Some(w) => w,
                None => return Ok(StepOutcome::Halted),
            };
        }

        let instr = DecodedInstruction {
            address,
            opcode,
            operands,
        };
        let outcome = self.execute(&instr, input, output)?;
        tracer.on_instruction(&instr, &self.registers, self.stack.len());
        Ok(outcome)
    }

    /// Read the word at PC and advance PC, or report that PC has run off
    /// the top of memory (treated as a clean exit, not an error).
    fn fetch_word(&mut self) -> Option<u16> {
        if self.pc as usize >= MEMORY_SIZE {
            return None;
        }
        let w = self.memory.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        Some(w)
    }

    fn execute(
        &mut self,
        instr: &DecodedInstruction,
        input: &mut impl Read,
        output: &mut impl Write,
    ) -> Result<StepOutcome, VmError> {
        let o = instr.operands;
        let regs = *self.registers.as_array();

        match instr.opcode {
            Opcode::Halt => return Ok(StepOutcome::Halted),

            Opcode::Set => {
                let dst = resolve_register(o[0])?;
                let val = resolve_value(o[1], &regs)?;
                self.registers.set(dst, val);
            }

            Opcode::Push => {
                let val = resolve_value(o[0], &regs)?;
                self.stack.push(val);
            }

            Opcode::Pop => {
                let dst = resolve_register(o[0])?;
                let val = self.stack.pop()?;
                self.registers.set(dst, val);
            }

            Opcode::Eq => {
                let dst = resolve_register(o[0])?;
                let b = resolve_value(o[1], &regs)?;
                let c = resolve_value(o[2], &regs)?;
                self.registers.set(dst, (b == c) as u16);
            }

            Opcode::Gt => {
                let dst = resolve_register(o[0])?;
                let b = resolve_value(o[1], &regs)?;
                let c = resolve_value(o[2], &regs)?;
                self.registers.set(dst, (b > c) as u16);
            }

            Opcode::Jmp => {
                let addr = resolve_value(o[0], &regs)?;
                self.pc = addr;
            }

            Opcode::Jt => {
                let cond = resolve_value(o[0], &regs)?;
                let addr = resolve_value(o[1], &regs)?;
                if cond != 0 {
                    self.pc = addr;
                }
            }

            Opcode::Jf => {
                let cond = resolve_value(o[0], &regs)?;
                let addr = resolve_value(o[1], &regs)?;
                if cond == 0 {
                    self.pc = addr;
                }
            }

            Opcode::Add => {
                let dst = resolve_register(o[0])?;
                let b = resolve_value(o[1], &regs)? as u32;
                let c = resolve_value(o[2], &regs)? as u32;
                self.registers.set(dst, ((b + c) % MODULUS) as u16);
            }

            Opcode::Mult => {
                let dst = resolve_register(o[0])?;
                let b = resolve_value(o[1], &regs)? as u32;
                let c = resolve_value(o[2], &regs)? as u32;
                self.registers.set(dst, ((b * c) % MODULUS) as u16);
            }

            Opcode::Mod => {
                let dst = resolve_register(o[0])?;
                let b = resolve_value(o[1], &regs)?;
                let c = resolve_value(o[2], &regs)?;
                if c == 0 {
                    return Err(VmError::DivByZero);
                }
                self.registers.set(dst, b % c);
            }

            Opcode::And => {
                let dst = resolve_register(o[0])?;
                let b = resolve_value(o[1], &regs)?;
                let c = resolve_value(o[2], &regs)?;
                self.registers.set(dst, b & c);
            }

            Opcode::Or => {
                let dst = resolve_register(o[0])?;
                let b = resolve_value(o[1], &regs)?;
                let c = resolve_value(o[2], &regs)?;
                self.registers.set(dst, b | c);
            }

            Opcode::Not => {
                let dst = resolve_register(o[0])?;
                let b = resolve_value(o[1], &regs)?;
                self.registers.set(dst, !b & 0x7FFF);
            }

            Opcode::Rmem => {
                let dst = resolve_register(o[0])?;
                let addr = resolve_value(o[1], &regs)?;
                let val = self.memory.read(addr);
                self.registers.set(dst, val);
            }

            Opcode::Wmem => {
                let addr = resolve_value(o[0], &regs)?;
                let val = resolve_value(o[1], &regs)?;
                self.memory.write(addr, val);
            }

            Opcode::Call => {
                let addr = resolve_value(o[0], &regs)?;
                self.stack.push(self.pc);
                self.pc = addr;
            }

            Opcode::Ret => {
                if self.stack.is_empty() {
                    return Ok(StepOutcome::Halted);
                }
                self.pc = self.stack.pop()?;
            }

            Opcode::Out => {
                let byte = (resolve_value(o[0], &regs)? & 0xFF) as u8;
                output
                    .write_all(&[byte])
                    .map_err(|_| VmError::Io(IoFailure::WriteFailed))?;
            }

            Opcode::In => {
                let dst = resolve_register(o[0])?;
                let mut byte = [0u8; 1];
                match input.read_exact(&mut byte) {
                    Ok(()) => self.registers.set(dst, byte[0] as u16),
                    Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                        return Err(VmError::Io(IoFailure::Eof));
                    }
                    Err(_) => return Err(VmError::Io(IoFailure::ReadFailed)),
                }
            }

            Opcode::Noop => {}
        }

        Ok(StepOutcome::Continue)
    }
}
