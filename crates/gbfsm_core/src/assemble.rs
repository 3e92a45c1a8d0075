//! Aggregation of per-opcode sequences into the control-unit description.
//!
//! The control unit starts in `FETCH`. Decoding an opcode moves it to the
//! first state of that opcode's sequence (the dispatch map); every other
//! state either moves to the next state of its own sequence or, when it is
//! terminal, falls back to `FETCH`. Terminal states get no explicit
//! transition entry: the fallback is a single `default` arm.

use std::collections::HashMap;

use gbfsm_common::{MalformedTableError, OpcodeSpace, OPCODES_PER_SPACE};

use crate::state::{State, StateId, StateSequence};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchEntry {
    pub space: OpcodeSpace,
    pub code: u8,
    pub target: StateId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
}

/// A place where control-signal logic for one state is expected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stub {
    pub state: StateId,
    /// Rendered instruction text; only set on the first state of a sequence.
    pub comment: Option<String>,
}

/// Where the control unit goes after leaving a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextState<'a> {
    /// Back to instruction dispatch.
    Fetch,
    State(&'a StateId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateMachine {
    sequences: Vec<StateSequence>,
    states: Vec<State>,
    dispatch: Vec<DispatchEntry>,
    transitions: Vec<Transition>,
    stubs: Vec<Stub>,
    dispatch_index: HashMap<(OpcodeSpace, u8), usize>,
    transition_index: HashMap<StateId, usize>,
}

impl StateMachine {
    /// Build the description from every opcode's sequence paired with its
    /// rendered mnemonic.
    ///
    /// Both spaces must be complete: exactly one sequence per `(space, code)`.
    /// Output order follows input order.
    pub fn assemble<I>(parts: I) -> Result<Self, MalformedTableError>
    where
        I: IntoIterator<Item = (StateSequence, String)>,
    {
        let mut machine = StateMachine {
            sequences: Vec::with_capacity(2 * OPCODES_PER_SPACE),
            states: Vec::new(),
            dispatch: Vec::with_capacity(2 * OPCODES_PER_SPACE),
            transitions: Vec::new(),
            stubs: Vec::new(),
            dispatch_index: HashMap::with_capacity(2 * OPCODES_PER_SPACE),
            transition_index: HashMap::new(),
        };
        let mut owners: HashMap<String, (OpcodeSpace, u8)> = HashMap::new();

        for (sequence, mnemonic) in parts {
            let (space, code) = (sequence.space(), sequence.code());

            if machine
                .dispatch_index
                .insert((space, code), machine.dispatch.len())
                .is_some()
            {
                return Err(MalformedTableError::DuplicateCode { space, code });
            }
            machine.dispatch.push(DispatchEntry {
                space,
                code,
                target: sequence.first().id.clone(),
            });

            for state in sequence.states() {
                let previous = owners.insert(state.id.name(), (space, code));
                if let Some((first_space, first_code)) = previous {
                    return Err(MalformedTableError::StateCollision {
                        name: state.id.name(),
                        first_space,
                        first_code,
                        second_space: space,
                        second_code: code,
                    });
                }
            }

            for pair in sequence.states().windows(2) {
                machine
                    .transition_index
                    .insert(pair[0].id.clone(), machine.transitions.len());
                machine.transitions.push(Transition {
                    from: pair[0].id.clone(),
                    to: pair[1].id.clone(),
                });
            }

            let mut comment = Some(mnemonic);
            for state in sequence.states() {
                if !state.id.is_wait() {
                    machine.stubs.push(Stub {
                        state: state.id.clone(),
                        comment: comment.take(),
                    });
                }
            }

            machine.states.extend_from_slice(sequence.states());
            machine.sequences.push(sequence);
        }

        for space in OpcodeSpace::ALL {
            for code in 0..=0xFFu8 {
                if !machine.dispatch_index.contains_key(&(space, code)) {
                    return Err(MalformedTableError::MissingCode { space, code });
                }
            }
        }

        Ok(machine)
    }

    /// Every generated state, grouped by opcode, in execution order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn sequences(&self) -> &[StateSequence] {
        &self.sequences
    }

    pub fn sequence(&self, space: OpcodeSpace, code: u8) -> &StateSequence {
        &self.sequences[self.dispatch_index[&(space, code)]]
    }

    /// One entry per `(space, code)`, 512 in total.
    pub fn dispatch_map(&self) -> &[DispatchEntry] {
        &self.dispatch
    }

    /// Dispatch entries of one space, ordered as they were assembled.
    pub fn dispatch_for(&self, space: OpcodeSpace) -> impl Iterator<Item = &DispatchEntry> {
        self.dispatch.iter().filter(move |entry| entry.space == space)
    }

    /// State entered from `FETCH` (or `PREFIX_CB`) when `code` is decoded.
    pub fn dispatch(&self, space: OpcodeSpace, code: u8) -> &StateId {
        &self.dispatch[self.dispatch_index[&(space, code)]].target
    }

    /// Explicit intra-sequence transitions. Terminal states are absent.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn next_state(&self, state: &StateId) -> NextState<'_> {
        match self.transition_index.get(state) {
            Some(&index) => NextState::State(&self.transitions[index].to),
            None => NextState::Fetch,
        }
    }

    /// Control-signal stubs for the normal states; wait states are left out.
    pub fn stubs(&self) -> &[Stub] {
        &self.stubs
    }

    pub fn wait_state_count(&self) -> usize {
        self.states.iter().filter(|state| state.id.is_wait()).count()
    }
}
