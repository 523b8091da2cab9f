//! Marshalling of vendor private commands.
//!
//! Everything in here is pure byte shuffling: the fixed-shape buffers the radio's
//! private command handler expects, and the direction-tagged descriptor that pairs
//! an opcode with either an input payload or an output buffer.

use thiserror::Error;

pub mod command;
pub mod filter;
pub mod payload;
pub mod scan;

pub use command::{CommandDescriptor, Opcode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("buffer holds {actual} bytes, {expected} required")]
    Truncated { expected: usize, actual: usize },
    #[error("{0} channels requested, 1..={max} allowed", max = scan::MAX_CHANNELS)]
    ChannelCount(usize),
    #[error("filter pattern of {0} bytes, 1..={max} allowed", max = filter::MAX_PATTERN_LEN)]
    PatternLength(usize),
    #[error("invalid {0} field")]
    InvalidField(&'static str),
}

pub(crate) fn ensure_len(bytes: &[u8], expected: usize) -> Result<(), PayloadError> {
    if bytes.len() < expected {
        return Err(PayloadError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

pub(crate) fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(word)
}
