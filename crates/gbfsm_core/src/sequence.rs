//! Per-opcode state sequences.
//!
//! An opcode taking `n` machine cycles of its own becomes a linear chain of
//! `n` normal states with a wait state after every step but the last:
//!
//! ```text
//!   LD_06_0 -> WAIT_LD_06_0 -> LD_06_1 -> WAIT_LD_06_1 -> LD_06_2
//! ```
//!
//! Single-cycle opcodes get one state with no step suffix (`NOP_00`).

use std::rc::Rc;

use gbfsm_common::{MalformedTableError, OpcodeEntry, OpcodeSpace, TICKS_PER_MCYCLE};

use crate::state::{State, StateId, StateKind, StateSequence};

/// Number of machine cycles the opcode spends in its own states.
///
/// The extended space loses one cycle to the prefix fetch, which is handled
/// by the `PREFIX_CB` dispatch state.
pub fn step_count(space: OpcodeSpace, entry: &OpcodeEntry) -> Result<u32, MalformedTableError> {
    (entry.cycles / TICKS_PER_MCYCLE)
        .checked_sub(space.cycle_offset())
        .filter(|&steps| steps >= 1)
        .ok_or_else(|| MalformedTableError::StepCountTooSmall {
            space,
            code: entry.code,
            mnemonic: entry.mnemonic.clone(),
            cycles: entry.cycles,
        })
}

pub fn build_sequence(
    space: OpcodeSpace,
    entry: &OpcodeEntry,
) -> Result<StateSequence, MalformedTableError> {
    if !is_identifier(&entry.mnemonic) {
        return Err(MalformedTableError::InvalidMnemonic {
            space,
            code: entry.code,
            mnemonic: entry.mnemonic.clone(),
        });
    }
    let steps = step_count(space, entry)?;
    let mnemonic: Rc<str> = Rc::from(entry.mnemonic.as_str());
    let id = |step, kind| StateId::new(space, entry.code, Rc::clone(&mnemonic), step, kind);

    let mut ids = Vec::with_capacity(2 * steps as usize - 1);
    if steps == 1 {
        ids.push(id(None, StateKind::Normal));
    } else {
        for step in 0..steps {
            ids.push(id(Some(step), StateKind::Normal));
            if step != steps - 1 {
                ids.push(id(Some(step), StateKind::Wait));
            }
        }
    }

    let last = ids.len() - 1;
    let states = ids
        .into_iter()
        .enumerate()
        .map(|(position, id)| State {
            id,
            position,
            terminal: position == last,
        })
        .collect();
    Ok(StateSequence::new(space, entry.code, states))
}

fn is_identifier(mnemonic: &str) -> bool {
    !mnemonic.is_empty()
        && mnemonic
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbfsm_common::OperandSpec;

    fn names(sequence: &StateSequence) -> Vec<String> {
        sequence.ids().map(StateId::name).collect()
    }

    #[test]
    fn single_cycle_opcode_has_one_unsuffixed_state() {
        let entry = OpcodeEntry::new(0x00, "NOP", Vec::new(), 4);
        let sequence = build_sequence(OpcodeSpace::Base, &entry).unwrap();
        assert_eq!(names(&sequence), ["NOP_00"]);
        assert!(sequence.first().terminal);
        assert_eq!(sequence.first().kind(), StateKind::Normal);
        assert_eq!(sequence.first().id.step(), None);
    }

    #[test]
    fn multi_cycle_opcode_interleaves_wait_states() {
        let entry = OpcodeEntry::new(0x06, "LD", vec![OperandSpec::immediate("n")], 12);
        let sequence = build_sequence(OpcodeSpace::Base, &entry).unwrap();
        assert_eq!(
            names(&sequence),
            ["LD_06_0", "WAIT_LD_06_0", "LD_06_1", "WAIT_LD_06_1", "LD_06_2"]
        );
        let kinds: Vec<StateKind> = sequence.states().iter().map(State::kind).collect();
        assert_eq!(
            kinds,
            [
                StateKind::Normal,
                StateKind::Wait,
                StateKind::Normal,
                StateKind::Wait,
                StateKind::Normal,
            ]
        );
        let terminal: Vec<bool> = sequence.states().iter().map(|s| s.terminal).collect();
        assert_eq!(terminal, [false, false, false, false, true]);
        for (index, state) in sequence.states().iter().enumerate() {
            assert_eq!(state.position, index);
            assert_eq!(state.owner(), (OpcodeSpace::Base, 0x06));
        }
    }

    #[test]
    fn extended_space_drops_the_prefix_cycle() {
        // BIT 0,(HL): 12 T-cycles including the 0xCB fetch.
        let entry = OpcodeEntry::new(0x46, "BIT", Vec::new(), 12);
        let sequence = build_sequence(OpcodeSpace::Extended, &entry).unwrap();
        assert_eq!(names(&sequence), ["CB_BIT_46_0", "WAIT_CB_BIT_46_0", "CB_BIT_46_1"]);

        // RLC B: 8 T-cycles, one of its own.
        let entry = OpcodeEntry::new(0x00, "RLC", Vec::new(), 8);
        let sequence = build_sequence(OpcodeSpace::Extended, &entry).unwrap();
        assert_eq!(names(&sequence), ["CB_RLC_00"]);
    }

    #[test]
    fn step_count_per_space() {
        let entry = OpcodeEntry::new(0xCD, "CALL", Vec::new(), 24);
        assert_eq!(step_count(OpcodeSpace::Base, &entry), Ok(6));
        assert_eq!(step_count(OpcodeSpace::Extended, &entry), Ok(5));
        // Partial machine cycles are truncated.
        let entry = OpcodeEntry::new(0x01, "LD", Vec::new(), 14);
        assert_eq!(step_count(OpcodeSpace::Base, &entry), Ok(3));
    }

    #[test]
    fn zero_cycles_is_malformed() {
        let entry = OpcodeEntry::new(0x00, "NOP", Vec::new(), 0);
        assert_eq!(
            build_sequence(OpcodeSpace::Base, &entry),
            Err(MalformedTableError::StepCountTooSmall {
                space: OpcodeSpace::Base,
                code: 0x00,
                mnemonic: "NOP".to_string(),
                cycles: 0,
            })
        );
    }

    #[test]
    fn extended_opcode_without_own_cycle_is_malformed() {
        let entry = OpcodeEntry::new(0x11, "RL", Vec::new(), 4);
        assert!(matches!(
            build_sequence(OpcodeSpace::Extended, &entry),
            Err(MalformedTableError::StepCountTooSmall { code: 0x11, .. })
        ));
        let entry = OpcodeEntry::new(0x11, "RL", Vec::new(), 3);
        assert!(build_sequence(OpcodeSpace::Extended, &entry).is_err());
    }

    #[test]
    fn mnemonic_must_be_an_identifier() {
        for mnemonic in ["", "LD A", "JP,HL"] {
            let entry = OpcodeEntry::new(0x10, mnemonic, Vec::new(), 4);
            assert!(matches!(
                build_sequence(OpcodeSpace::Base, &entry),
                Err(MalformedTableError::InvalidMnemonic { code: 0x10, .. })
            ));
        }
        let entry = OpcodeEntry::new(0xD3, "ILLEGAL_D3", Vec::new(), 4);
        let sequence = build_sequence(OpcodeSpace::Base, &entry).unwrap();
        assert_eq!(names(&sequence), ["ILLEGAL_D3_D3"]);
    }
}
