//! The VM's error taxonomy: one variant per fatal condition the interpreter
//! can reach. All of them are fatal — the machine never recovers from one
//! internally, it only ever surfaces it to the caller.

use thiserror::Error;

/// A fatal VM error. Every fallible core operation returns
/// `Result<_, VmError>`; the CLI front-end maps any `Err` to exit code 1.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmError {
    /// The image's byte length was odd, or it held more than 32,768 words.
    #[error("malformed program image: {0}")]
    ImageFormat(ImageFormatError),

    /// A fetched opcode was greater than 21.
    #[error("invalid opcode {0} at address {1}")]
    InvalidOpcode(u16, u16),

    /// An operand word was outside `[0, 32775]` where a value was required.
    #[error("invalid operand {0}: not a literal or register reference")]
    InvalidOperand(u16),

    /// A destination operand was not a register reference.
    #[error("expected a register reference, got {0}")]
    ExpectedRegister(u16),

    /// `pop` was executed with an empty stack.
    #[error("stack underflow")]
    StackUnderflow,

    /// `mod` was executed with a zero divisor.
    #[error("division by zero")]
    DivByZero,

    /// Reading from or writing to a byte stream failed, or `in` hit EOF.
    #[error("I/O error: {0}")]
    Io(IoFailure),
}

/// Why image loading failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormatError {
    /// The byte stream's length was odd: the last byte has no pair.
    OddLength(usize),
    /// The image held more than 32,768 words.
    TooLarge(usize),
}

impl std::fmt::Display for ImageFormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageFormatError::OddLength(n) => {
                write!(f, "odd byte length ({n}), words must be 16-bit pairs")
            }
            ImageFormatError::TooLarge(words) => {
                write!(f, "{words} words exceeds the 32768-word memory")
            }
        }
    }
}

/// Why a byte-stream operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoFailure {
    /// `in` was executed but the input stream had no more bytes.
    Eof,
    /// A read from the input stream failed for a reason other than EOF.
    ReadFailed,
    /// A write to the output stream failed.
    WriteFailed,
}

impl std::fmt::Display for IoFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoFailure::Eof => write!(f, "end of input"),
            IoFailure::ReadFailed => write!(f, "read failed"),
            IoFailure::WriteFailed => write!(f, "write failed"),
        }
    }
}

impl VmError {
    /// The process exit code this error maps to. Every variant is fatal,
    /// so this is currently constant, but callers should go through this
    /// method rather than hardcoding `1` at the call site.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<VmError> {
        vec![
            VmError::ImageFormat(ImageFormatError::OddLength(3)),
            VmError::ImageFormat(ImageFormatError::TooLarge(32769)),
            VmError::InvalidOpcode(22, 0),
            VmError::InvalidOperand(40000),
            VmError::ExpectedRegister(10),
            VmError::StackUnderflow,
            VmError::DivByZero,
            VmError::Io(IoFailure::Eof),
            VmError::Io(IoFailure::ReadFailed),
            VmError::Io(IoFailure::WriteFailed),
        ]
    }

    #[test]
    fn every_variant_has_a_distinct_nonempty_message() {
        let messages: Vec<String> = all_variants().iter().map(|e| e.to_string()).collect();
        for msg in &messages {
            assert!(!msg.is_empty());
        }
        let mut unique = messages.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(
            unique.len(),
            messages.len(),
            "two variants produced the same Display message: {messages:?}"
        );
    }

    #[test]
    fn every_variant_maps_to_exit_code_one() {
        for e in all_variants() {
            assert_eq!(e.exit_code(), 1);
        }
    }

    #[test]
    fn image_format_messages_mention_the_offending_count() {
        assert_eq!(
            VmError::ImageFormat(ImageFormatError::OddLength(3)).to_string(),
            "malformed program image: odd byte length (3), words must be 16-bit pairs"
        );
        assert_eq!(
            VmError::ImageFormat(ImageFormatError::TooLarge(32769)).to_string(),
            "malformed program image: 32769 words exceeds the 32768-word memory"
        );
    }

    #[test]
    fn io_failure_messages_are_distinct() {
        assert_eq!(VmError::Io(IoFailure::Eof).to_string(), "I/O error: end of input");
        assert_eq!(
            VmError::Io(IoFailure::ReadFailed).to_string(),
            "I/O error: read failed"
        );
        assert_eq!(
            VmError::Io(IoFailure::WriteFailed).to_string(),
            "I/O error: write failed"
        );
    }
}
