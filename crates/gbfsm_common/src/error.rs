use crate::OpcodeSpace;

/// A defect in the instruction table that makes the control unit
/// impossible to generate. Any of these aborts the whole generation pass.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum MalformedTableError {
    #[error("{space} opcode 0x{code:02X} is missing from the table")]
    MissingCode { space: OpcodeSpace, code: u8 },

    #[error("{space} opcode 0x{code:02X} is listed more than once")]
    DuplicateCode { space: OpcodeSpace, code: u8 },

    #[error("{space} table key '{key}' is not an 8-bit opcode")]
    InvalidCode { space: OpcodeSpace, key: String },

    #[error("{space} opcode 0x{code:02X} ({mnemonic}) has no timing information")]
    MissingTiming {
        space: OpcodeSpace,
        code: u8,
        mnemonic: String,
    },

    #[error("{space} opcode 0x{code:02X} has mnemonic '{mnemonic}', which cannot form a state name")]
    InvalidMnemonic {
        space: OpcodeSpace,
        code: u8,
        mnemonic: String,
    },

    #[error(
        "{space} opcode 0x{code:02X} ({mnemonic}) takes {cycles} T-cycles, \
         leaving no machine cycle for its own states"
    )]
    StepCountTooSmall {
        space: OpcodeSpace,
        code: u8,
        mnemonic: String,
        cycles: u32,
    },

    #[error(
        "state '{name}' is generated by both {first_space} opcode 0x{first_code:02X} \
         and {second_space} opcode 0x{second_code:02X}"
    )]
    StateCollision {
        name: String,
        first_space: OpcodeSpace,
        first_code: u8,
        second_space: OpcodeSpace,
        second_code: u8,
    },
}
