pub mod error;
pub mod json;
pub mod table;

pub use error::MalformedTableError;
pub use json::{load_table, parse_table};
pub use table::{OpcodeEntry, OpcodeSpace, OpcodeTable, OperandSpec};

/// Clock ticks (T-cycles) per machine cycle on the SM83.
pub const TICKS_PER_MCYCLE: u32 = 4;
/// Number of codes in each opcode space.
pub const OPCODES_PER_SPACE: usize = 0x100;
