use synacor_vm::VmError;

use crate::debugger::{DebugInfos, StepResult};

fn preview(value: u16) -> String {
    let byte = (value & 0xFF) as u8;
    if (32..=126).contains(&byte) {
        format!("{:#06x} ('{}')", value, byte as char)
    } else {
        format!("{:#06x}", value)
    }
}

pub fn display_infos(infos: &DebugInfos) {
    let pc = format!(colorify!(blue: "{:#06x}"), infos.pc);
    println!("pc: {}  stack_depth: {}", pc, infos.stack_depth);
    match &infos.next_instruction {
        Some(instr) => {
            let operands: Vec<String> = instr
                .operand_slice()
                .iter()
                .map(|w| w.to_string())
                .collect();
            println!(
                "  next: {} {}",
                instr.opcode.mnemonic(),
                operands.join(", ")
            );
        }
        None => println!("  next: (end of memory)"),
    }
    for (i, value) in infos.registers.iter().enumerate() {
        println!("  r{}: {}", i, preview(*value));
    }
}

pub fn display_examine(addr: u16, value: u16) {
    let addr = format!(colorify!(blue: "{:#06x}"), addr);
    println!("mem {} = {}", addr, preview(value));
}

pub fn display_step_result(executed: usize, outcome: &StepResult) {
    match outcome {
        StepResult::Continued => println!("executed {} instruction(s)", executed),
        StepResult::Halted => printlnc!(yellow: "halted after {} instruction(s)", executed),
        StepResult::Failed(e) => {
            printlnc!(red: "fatal after {} instruction(s): {}", executed, e)
        }
    }
}

pub fn display_error(e: &VmError) {
    printlnc!(red: "error: {}", e);
}

pub fn display_message(message: &str) {
    printlnc!(red: "{}", message);
}
