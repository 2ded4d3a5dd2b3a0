use std::io::{Read, Write};

use synacor_vm::{DecodedInstruction, Machine, Memory, NullTracer, StepOutcome, VmError};

const NO_MACHINE: &str = "no machine loaded (`reset` to load one)";

/// A snapshot of machine state, cheap to copy out for display.
#[derive(Debug, Clone)]
pub struct DebugInfos {
    pub pc: u16,
    pub registers: [u16; 8],
    pub stack_depth: usize,
    /// The instruction about to execute at `pc`, decoded but not run.
    /// `None` if `pc` has run off the top of memory (the same clean-exit
    /// condition `step` would reach).
    pub next_instruction: Option<DecodedInstruction>,
}

/// What happened over the course of a `steps` call.
#[derive(Debug)]
pub enum StepResult {
    /// Every requested step executed; the machine is still running.
    Continued,
    /// Execution reached a clean halt before the requested step count.
    Halted,
    /// Execution hit a fatal error before the requested step count.
    Failed(VmError),
}

/// Wraps a [`Machine`] with the bookkeeping the REPL needs: the original
/// image bytes (so `reset` can rebuild a fresh machine) and a uniform
/// "no machine loaded" error for commands issued before the first load.
pub struct Debugger {
    image: Vec<u8>,
    machine: Machine,
}

impl Debugger {
    pub fn new(image: Vec<u8>) -> Result<Debugger, VmError> {
        let memory = Memory::load_image(&image)?;
        Ok(Debugger {
            image,
            machine: Machine::new(memory),
        })
    }

    /// Rebuild the machine from the original image, discarding all state.
    pub fn reset(&mut self) -> Result<DebugInfos, VmError> {
        let memory = Memory::load_image(&self.image)?;
        self.machine = Machine::new(memory);
        Ok(self.debug_infos())
    }

    pub fn debug_infos(&self) -> DebugInfos {
        DebugInfos {
            pc: self.machine.pc(),
            registers: *self.machine.registers().as_array(),
            stack_depth: self.machine.stack_len(),
            next_instruction: self.machine.peek_next(),
        }
    }

    pub fn examine(&self, addr: u16) -> u16 {
        self.machine.peek_memory(addr)
    }

    /// Execute up to `count` instructions, stopping early on a clean halt
    /// or a fatal error.
    pub fn steps<R: Read, W: Write>(
        &mut self,
        count: usize,
        input: &mut R,
        output: &mut W,
    ) -> (usize, DebugInfos, StepResult) {
        let mut tracer = NullTracer;
        let mut executed = 0;
        let mut outcome = StepResult::Continued;

        for _ in 0..count {
            match self.machine.step(input, output, &mut tracer) {
                Ok(StepOutcome::Continue) => executed += 1,
                Ok(StepOutcome::Halted) => {
                    executed += 1;
                    outcome = StepResult::Halted;
                    break;
                }
                Err(e) => {
                    outcome = StepResult::Failed(e);
                    break;
                }
            }
        }

        (executed, self.debug_infos(), outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_for(words: &[u16]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn fresh_debugger_starts_at_zero() {
        let dbg = Debugger::new(image_for(&[0])).unwrap();
        let infos = dbg.debug_infos();
        assert_eq!(infos.pc, 0);
        assert_eq!(infos.stack_depth, 0);
    }

    #[test]
    fn steps_halt_stops_early() {
        let mut dbg = Debugger::new(image_for(&[19, 72, 0])).unwrap();
        let mut input: &[u8] = &[];
        let mut output = Vec::new();
        let (executed, _infos, outcome) = dbg.steps(10, &mut input, &mut output);
        assert_eq!(executed, 2);
        assert!(matches!(outcome, StepResult::Halted));
        assert_eq!(output, b"H");
    }

    #[test]
    fn reset_rewinds_to_a_fresh_machine() {
        let mut dbg = Debugger::new(image_for(&[19, 72, 0])).unwrap();
        let mut input: &[u8] = &[];
        let mut output = Vec::new();
        dbg.steps(10, &mut input, &mut output);
        assert_eq!(dbg.debug_infos().pc, 3);
        dbg.reset().unwrap();
        assert_eq!(dbg.debug_infos().pc, 0);
    }

    #[test]
    fn examine_reads_raw_words() {
        let dbg = Debugger::new(image_for(&[19, 72, 0])).unwrap();
        assert_eq!(dbg.examine(0), 19);
        assert_eq!(dbg.examine(1), 72);
    }

    #[test]
    fn debug_infos_decodes_the_next_instruction() {
        let dbg = Debugger::new(image_for(&[19, 72, 0])).unwrap();
        let instr = dbg.debug_infos().next_instruction.unwrap();
        assert_eq!(instr.opcode.mnemonic(), "out");
        assert_eq!(instr.operand_slice(), &[72]);
    }

    #[test]
    fn debug_infos_has_no_next_instruction_past_end_of_memory() {
        use synacor_vm::MEMORY_SIZE;

        // jmp straight to the last address, which holds a 2-arity opcode
        // with no room left for either operand word: there is no full
        // instruction left to decode there.
        let mut words = vec![0u16; MEMORY_SIZE];
        words[0] = 6; // jmp
        words[1] = (MEMORY_SIZE - 1) as u16;
        words[MEMORY_SIZE - 1] = 1; // set (arity 2), no room for its operands
        let mut dbg = Debugger::new(image_for(&words)).unwrap();

        let mut input: &[u8] = &[];
        let mut output = Vec::new();
        dbg.steps(1, &mut input, &mut output);

        assert_eq!(dbg.debug_infos().pc, (MEMORY_SIZE - 1) as u16);
        assert!(dbg.debug_infos().next_instruction.is_none());
    }
}
