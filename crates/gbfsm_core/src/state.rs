use std::fmt;
use std::rc::Rc;

use gbfsm_common::OpcodeSpace;

/// Kind of a generated control-unit state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// A machine cycle in which the instruction does real work.
    Normal,
    /// Idle cycle between two normal steps, waiting on the bus. Control
    /// signals default to no-op here.
    Wait,
}

/// Identifier of a generated state.
///
/// The textual form is `[WAIT_]<tag><MNEMONIC>_<HH>[_<step>]`, where the tag
/// is empty for the base space and `CB_` for the extended space.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateId {
    space: OpcodeSpace,
    code: u8,
    mnemonic: Rc<str>,
    step: Option<u32>,
    kind: StateKind,
}

impl StateId {
    pub(crate) fn new(
        space: OpcodeSpace,
        code: u8,
        mnemonic: Rc<str>,
        step: Option<u32>,
        kind: StateKind,
    ) -> Self {
        Self {
            space,
            code,
            mnemonic,
            step,
            kind,
        }
    }

    pub fn space(&self) -> OpcodeSpace {
        self.space
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Machine-cycle step within the instruction, or `None` for single-step
    /// instructions whose only state carries no step suffix.
    pub fn step(&self) -> Option<u32> {
        self.step
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    pub fn is_wait(&self) -> bool {
        self.kind == StateKind::Wait
    }

    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wait() {
            f.write_str("WAIT_")?;
        }
        write!(f, "{}{}_{:02X}", self.space.tag(), self.mnemonic, self.code)?;
        if let Some(step) = self.step {
            write!(f, "_{}", step)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub id: StateId,
    /// Index within the owning sequence.
    pub position: usize,
    pub terminal: bool,
}

impl State {
    pub fn kind(&self) -> StateKind {
        self.id.kind()
    }

    /// `(space, code)` of the opcode this state belongs to.
    pub fn owner(&self) -> (OpcodeSpace, u8) {
        (self.id.space(), self.id.code())
    }
}

/// Ordered execution states of one opcode. Never empty; the last state is
/// the only terminal one and is always `Normal`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateSequence {
    space: OpcodeSpace,
    code: u8,
    states: Vec<State>,
}

impl StateSequence {
    pub(crate) fn new(space: OpcodeSpace, code: u8, states: Vec<State>) -> Self {
        debug_assert!(!states.is_empty());
        Self {
            space,
            code,
            states,
        }
    }

    pub fn space(&self) -> OpcodeSpace {
        self.space
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn first(&self) -> &State {
        &self.states[0]
    }

    pub fn terminal(&self) -> &State {
        &self.states[self.states.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &StateId> {
        self.states.iter().map(|state| &state.id)
    }
}
