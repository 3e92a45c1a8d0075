pub mod assemble;
pub mod mnemonic;
pub mod sequence;
pub mod state;

pub use assemble::{DispatchEntry, NextState, StateMachine, Stub, Transition};
pub use mnemonic::render_mnemonic;
pub use sequence::{build_sequence, step_count};
pub use state::{State, StateId, StateKind, StateSequence};

use gbfsm_common::{MalformedTableError, OpcodeSpace, OpcodeTable};

/// Derive the control-unit description for a whole instruction table.
///
/// The base space is visited before the extended space, each in ascending
/// code order. Any malformed entry aborts the pass; nothing partial is
/// returned.
pub fn generate(table: &OpcodeTable) -> Result<StateMachine, MalformedTableError> {
    let mut parts = Vec::with_capacity(OpcodeSpace::ALL.len() * gbfsm_common::OPCODES_PER_SPACE);
    for space in OpcodeSpace::ALL {
        for entry in table.space(space) {
            let sequence = build_sequence(space, entry)?;
            parts.push((sequence, render_mnemonic(entry)));
        }
        log::debug!("Built {} sequences for the {} space", table.space(space).len(), space);
    }

    let machine = StateMachine::assemble(parts)?;
    log::info!(
        "Generated {} states ({} wait), {} dispatch entries, {} transitions, {} stubs",
        machine.states().len(),
        machine.wait_state_count(),
        machine.dispatch_map().len(),
        machine.transitions().len(),
        machine.stubs().len()
    );
    Ok(machine)
}
