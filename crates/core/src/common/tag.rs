//! Producer tags.
//!
//! A tag names the station or buffer that will produce a value. Tags rename
//! registers at issue time and identify results on the Common Data Bus.
//! "No outstanding producer" is represented as `Option<Tag>::None`.

use std::fmt;

/// The structure class a tag belongs to.
///
/// The class determines the display letter: `A` for FP add/sub stations,
/// `M` for FP mul/div stations, `I` for integer stations, `L` for load
/// buffers, `S` for store buffers, and `B` for branch handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagClass {
    /// FP add/sub reservation station.
    FpAddSub,
    /// FP mul/div reservation station.
    FpMulDiv,
    /// Integer ALU reservation station.
    IntAlu,
    /// Load buffer.
    Load,
    /// Store buffer.
    Store,
    /// Branch handler.
    Branch,
}

/// Identity of an in-flight producer, assigned at structure construction.
///
/// Equality is by identity: two tags are equal iff they name the same slot.
/// A register or operand slot with no pending producer holds `None` instead
/// of a tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Which pool the producer lives in.
    pub class: TagClass,
    /// Zero-based slot index within the pool.
    pub index: u8,
}

impl Tag {
    /// Creates a tag for the given pool slot.
    pub fn new(class: TagClass, index: usize) -> Self {
        Self {
            class,
            index: index as u8,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self.class {
            TagClass::FpAddSub => 'A',
            TagClass::FpMulDiv => 'M',
            TagClass::IntAlu => 'I',
            TagClass::Load => 'L',
            TagClass::Store => 'S',
            TagClass::Branch => 'B',
        };
        write!(f, "{}{}", letter, self.index + 1)
    }
}

/// Formats an optional producer for log lines: the tag, or `0` when clear.
pub fn format_producer(producer: Option<Tag>) -> String {
    match producer {
        Some(tag) => tag.to_string(),
        None => "0".to_string(),
    }
}
