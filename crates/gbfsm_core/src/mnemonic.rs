use gbfsm_common::OpcodeEntry;

/// Human-readable form of an instruction, e.g. `LD (HL) A` or `BIT 7 H`.
///
/// Operands are separated by single spaces; indirect operands are wrapped
/// in parentheses.
pub fn render_mnemonic(entry: &OpcodeEntry) -> String {
    let mut text = entry.mnemonic.clone();
    for operand in &entry.operands {
        text.push(' ');
        if operand.immediate {
            text.push_str(&operand.name);
        } else {
            text.push('(');
            text.push_str(&operand.name);
            text.push(')');
        }
    }
    text
}
