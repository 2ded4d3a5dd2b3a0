//! An interactive REPL for stepping a Synacor program one instruction (or
//! one batch of instructions) at a time, inspecting registers and memory
//! as it goes.

#[macro_use]
extern crate colorify;

mod command;
mod debugger;
mod display;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use command::Command;
use debugger::Debugger;

const HISTORY_FILE: &str = ".synacor-dbg-history";

/// An interactive debugger for the Synacor Challenge virtual machine.
#[derive(Parser, Debug)]
#[command(name = "synacor-dbg", version, about)]
struct Args {
    /// Path to the program image to load.
    image: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let bytes = match fs::read(&args.image) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("synacor-dbg: couldn't read {}: {e}", args.image);
            return ExitCode::FAILURE;
        }
    };

    let mut dbg = match Debugger::new(bytes) {
        Ok(dbg) => dbg,
        Err(e) => {
            display::display_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("synacor-dbg: couldn't start the line editor: {e}");
            return ExitCode::FAILURE;
        }
    };
    if rl.load_history(HISTORY_FILE).is_err() {
        printlnc!(yellow: "No previous history.");
    }

    display::display_infos(&dbg.debug_infos());

    let mut last_command: Option<Command> = None;
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    loop {
        let prompt = format!(colorify!(dark_grey: "({}) "), "synacor-dbg");
        match rl.readline(&prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());

                let command = match (line.parse::<Command>(), last_command.clone()) {
                    (Ok(Command::Repeat), Some(c)) => Ok(c),
                    (Ok(Command::Repeat), None) => Err("no last command".to_string()),
                    (Ok(c), _) => Ok(c),
                    (Err(e), _) => Err(e.to_string()),
                };

                match command {
                    Ok(Command::Exit) => break,
                    Ok(Command::Repeat) => unreachable!(),
                    Ok(Command::Regs) => display::display_infos(&dbg.debug_infos()),
                    Ok(Command::Examine(addr)) => {
                        display::display_examine(addr, dbg.examine(addr))
                    }
                    Ok(Command::Reset) => match dbg.reset() {
                        Ok(infos) => display::display_infos(&infos),
                        Err(e) => display::display_error(&e),
                    },
                    Ok(Command::Run) => {
                        let (n, infos, outcome) =
                            dbg.steps(usize::MAX, &mut input, &mut output);
                        display::display_step_result(n, &outcome);
                        display::display_infos(&infos);
                        last_command = Some(Command::Run);
                        let _ = rl.save_history(HISTORY_FILE);
                        continue;
                    }
                    Ok(Command::Step(count)) => {
                        let (n, infos, outcome) = dbg.steps(count, &mut input, &mut output);
                        display::display_step_result(n, &outcome);
                        display::display_infos(&infos);
                        last_command = Some(Command::Step(count));
                        let _ = rl.save_history(HISTORY_FILE);
                        continue;
                    }
                    Err(ref e) => display::display_message(e),
                }
                last_command = command.ok();
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("error: {err:?}");
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    ExitCode::SUCCESS
}
