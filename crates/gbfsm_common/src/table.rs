use std::fmt;

use crate::{MalformedTableError, OPCODES_PER_SPACE};

/// One of the two independent 256-entry opcode spaces of the SM83.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum OpcodeSpace {
    /// Unprefixed opcodes, dispatched directly from `FETCH`.
    Base,
    /// Opcodes following the 0xCB prefix byte.
    Extended,
}

impl OpcodeSpace {
    pub const ALL: [OpcodeSpace; 2] = [OpcodeSpace::Base, OpcodeSpace::Extended];

    /// Machine cycles spent before this space's own sequence starts.
    ///
    /// For the CB page the prefix fetch is one full M-cycle, and the
    /// `PREFIX_CB` dispatch state accounts for it.
    #[inline]
    pub const fn cycle_offset(self) -> u32 {
        match self {
            OpcodeSpace::Base => 0,
            OpcodeSpace::Extended => 1,
        }
    }

    /// Tag embedded in every state identifier owned by this space.
    #[inline]
    pub const fn tag(self) -> &'static str {
        match self {
            OpcodeSpace::Base => "",
            OpcodeSpace::Extended => "CB_",
        }
    }

    /// Name of the control-unit state that decodes opcodes of this space.
    #[inline]
    pub const fn dispatch_state(self) -> &'static str {
        match self {
            OpcodeSpace::Base => "FETCH",
            OpcodeSpace::Extended => "PREFIX_CB",
        }
    }
}

impl fmt::Display for OpcodeSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpcodeSpace::Base => f.write_str("base"),
            OpcodeSpace::Extended => f.write_str("extended"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct OperandSpec {
    pub name: String,
    /// `false` when the operand is reached through memory, e.g. `(HL)`.
    pub immediate: bool,
}

impl OperandSpec {
    pub fn immediate(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            immediate: true,
        }
    }

    pub fn indirect(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            immediate: false,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct OpcodeEntry {
    pub code: u8,
    pub mnemonic: String,
    pub operands: Vec<OperandSpec>,
    /// T-cycles of the first listed timing variant (the branch-taken one
    /// for conditional instructions).
    pub cycles: u32,
}

impl OpcodeEntry {
    pub fn new(code: u8, mnemonic: impl Into<String>, operands: Vec<OperandSpec>, cycles: u32) -> Self {
        Self {
            code,
            mnemonic: mnemonic.into(),
            operands,
            cycles,
        }
    }
}

/// A validated instruction table: both spaces cover every code 0x00..=0xFF
/// exactly once, stored in ascending code order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OpcodeTable {
    base: Vec<OpcodeEntry>,
    extended: Vec<OpcodeEntry>,
}

impl OpcodeTable {
    pub fn new(
        base: Vec<OpcodeEntry>,
        extended: Vec<OpcodeEntry>,
    ) -> Result<Self, MalformedTableError> {
        Ok(Self {
            base: Self::validate_space(OpcodeSpace::Base, base)?,
            extended: Self::validate_space(OpcodeSpace::Extended, extended)?,
        })
    }

    fn validate_space(
        space: OpcodeSpace,
        entries: Vec<OpcodeEntry>,
    ) -> Result<Vec<OpcodeEntry>, MalformedTableError> {
        let mut slots: Vec<Option<OpcodeEntry>> = vec![None; OPCODES_PER_SPACE];
        for entry in entries {
            let slot = &mut slots[entry.code as usize];
            if slot.is_some() {
                return Err(MalformedTableError::DuplicateCode {
                    space,
                    code: entry.code,
                });
            }
            *slot = Some(entry);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(code, slot)| {
                slot.ok_or(MalformedTableError::MissingCode {
                    space,
                    code: code as u8,
                })
            })
            .collect()
    }

    /// Entries of one space, ordered by code.
    pub fn space(&self, space: OpcodeSpace) -> &[OpcodeEntry] {
        match space {
            OpcodeSpace::Base => &self.base,
            OpcodeSpace::Extended => &self.extended,
        }
    }

    pub fn entry(&self, space: OpcodeSpace, code: u8) -> &OpcodeEntry {
        &self.space(space)[code as usize]
    }

    pub fn base(&self) -> &[OpcodeEntry] {
        &self.base
    }

    pub fn extended(&self) -> &[OpcodeEntry] {
        &self.extended
    }
}
