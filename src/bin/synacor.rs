//! Runs a program image to completion against real standard input and
//! standard output.

use std::fs;
use std::io;
use std::process::ExitCode;

use clap::Parser;

use synacor_vm::{Machine, Memory, NullTracer, VmError, WriteTracer};

/// A virtual machine for the Synacor Challenge architecture.
#[derive(Parser, Debug)]
#[command(name = "synacor", version, about)]
struct Args {
    /// Path to the program image to load and run.
    image: String,

    /// Write a trace line per executed instruction to standard error.
    #[arg(long)]
    trace: bool,

    /// Pre-reserve this many stack slots up front. Never a hard cap; the
    /// stack still grows past it if the program pushes more.
    #[arg(long, value_name = "WORDS")]
    stack_capacity_hint: Option<usize>,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // clap's default error-writer picks stderr for most parse
            // errors and only uses stdout for `--help`/`--version`; the
            // reference architecture prints every usage error to standard
            // output (see the C reference's `printf`-based usage message),
            // so the message is written to stdout explicitly here instead
            // of going through `Error::exit`.
            print!("{e}");
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::Vm(e)) => {
            eprintln!("synacor: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
        Err(Failure::Load(path, e)) => {
            eprintln!("synacor: couldn't read {path}: {e}");
            ExitCode::from(1)
        }
    }
}

enum Failure {
    Vm(VmError),
    Load(String, io::Error),
}

fn run(args: &Args) -> Result<(), Failure> {
    let bytes =
        fs::read(&args.image).map_err(|e| Failure::Load(args.image.clone(), e))?;
    let memory = Memory::load_image(&bytes).map_err(Failure::Vm)?;

    let mut machine = match args.stack_capacity_hint {
        Some(hint) => Machine::with_stack_capacity_hint(memory, hint),
        None => Machine::new(memory),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut output = stdout.lock();

    if args.trace {
        let stderr = io::stderr();
        let mut tracer = WriteTracer::new(stderr.lock());
        machine
            .run(&mut input, &mut output, &mut tracer)
            .map_err(Failure::Vm)
    } else {
        let mut tracer = NullTracer;
        machine
            .run(&mut input, &mut output, &mut tracer)
            .map_err(Failure::Vm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn missing_image_argument_is_a_usage_error() {
        let err = Args::try_parse_from(["synacor"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_ne!(err.exit_code(), 0);
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn non_numeric_stack_capacity_hint_is_a_usage_error() {
        let err = Args::try_parse_from([
            "synacor",
            "image.bin",
            "--stack-capacity-hint",
            "not-a-number",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert_ne!(err.exit_code(), 0);
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn valid_arguments_parse_cleanly() {
        let args = Args::try_parse_from([
            "synacor",
            "image.bin",
            "--trace",
            "--stack-capacity-hint",
            "64",
        ])
        .unwrap();
        assert_eq!(args.image, "image.bin");
        assert!(args.trace);
        assert_eq!(args.stack_capacity_hint, Some(64));
    }
}
