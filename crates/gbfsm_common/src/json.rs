//! Loader for the community `Opcodes.json` SM83 instruction table.
//!
//! The document has two objects, `unprefixed` and `cbprefixed`, each keyed
//! by `"0xHH"` strings. Only the fields the generator needs are read; flags,
//! byte counts and operand increments are ignored.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{MalformedTableError, OpcodeEntry, OpcodeSpace, OpcodeTable, OperandSpec};

#[derive(Debug, Deserialize)]
struct OpcodesDocument {
    unprefixed: BTreeMap<String, RawOpcode>,
    cbprefixed: BTreeMap<String, RawOpcode>,
}

#[derive(Debug, Deserialize)]
struct RawOpcode {
    mnemonic: String,
    #[serde(default)]
    operands: Vec<RawOperand>,
    cycles: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct RawOperand {
    name: String,
    #[serde(default = "default_immediate")]
    immediate: bool,
}

fn default_immediate() -> bool {
    true
}

/// Read and validate an `Opcodes.json` file.
pub fn load_table(path: impl AsRef<Path>) -> Result<OpcodeTable> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read opcode table '{}'", path.display()))?;
    let table = parse_table(&text)
        .with_context(|| format!("invalid opcode table '{}'", path.display()))?;
    log::info!("Loaded opcode table from '{}'", path.display());
    Ok(table)
}

/// Parse and validate the text of an `Opcodes.json` document.
pub fn parse_table(text: &str) -> Result<OpcodeTable> {
    let document: OpcodesDocument = serde_json::from_str(text)?;
    let base = convert_space(OpcodeSpace::Base, document.unprefixed)?;
    let extended = convert_space(OpcodeSpace::Extended, document.cbprefixed)?;
    Ok(OpcodeTable::new(base, extended)?)
}

fn convert_space(
    space: OpcodeSpace,
    raw: BTreeMap<String, RawOpcode>,
) -> Result<Vec<OpcodeEntry>, MalformedTableError> {
    raw.into_iter()
        .map(|(key, op)| {
            let code = parse_code(&key).ok_or(MalformedTableError::InvalidCode { space, key })?;
            // Conditional instructions list the taken timing first.
            let cycles = match op.cycles.first() {
                Some(&cycles) => cycles,
                None => {
                    return Err(MalformedTableError::MissingTiming {
                        space,
                        code,
                        mnemonic: op.mnemonic,
                    })
                }
            };
            if op.cycles.len() > 1 {
                log::debug!(
                    "{} opcode 0x{:02X} ({}) has {} timing variants, using {}",
                    space,
                    code,
                    op.mnemonic,
                    op.cycles.len(),
                    cycles
                );
            }
            let operands = op
                .operands
                .into_iter()
                .map(|operand| OperandSpec {
                    name: operand.name,
                    immediate: operand.immediate,
                })
                .collect();
            Ok(OpcodeEntry::new(code, op.mnemonic, operands, cycles))
        })
        .collect()
}

fn parse_code(key: &str) -> Option<u8> {
    let digits = key
        .strip_prefix("0x")
        .or_else(|| key.strip_prefix("0X"))?;
    u8::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn space_json(override_code: Option<(&str, Value)>) -> Value {
        let mut map = Map::new();
        for code in 0..=0xFFu8 {
            map.insert(
                format!("0x{:02X}", code),
                json!({
                    "mnemonic": "NOP",
                    "bytes": 1,
                    "cycles": [8],
                    "operands": [],
                    "immediate": true,
                    "flags": { "Z": "-", "N": "-", "H": "-", "C": "-" }
                }),
            );
        }
        if let Some((key, value)) = override_code {
            map.insert(key.to_string(), value);
        }
        Value::Object(map)
    }

    fn document(unprefixed: Value, cbprefixed: Value) -> String {
        json!({ "unprefixed": unprefixed, "cbprefixed": cbprefixed }).to_string()
    }

    #[test]
    fn parses_operands_and_first_timing_variant() {
        let jr = json!({
            "mnemonic": "JR",
            "bytes": 2,
            "cycles": [12, 8],
            "operands": [
                { "name": "NZ", "immediate": true },
                { "name": "e8", "bytes": 1, "immediate": true }
            ],
            "immediate": true
        });
        let ld = json!({
            "mnemonic": "LD",
            "cycles": [8],
            "operands": [
                { "name": "HL", "increment": true, "immediate": false },
                { "name": "A", "immediate": true }
            ]
        });
        let text = document(space_json(Some(("0x20", jr))), space_json(Some(("0x22", ld))));
        let table = parse_table(&text).unwrap();

        let entry = table.entry(OpcodeSpace::Base, 0x20);
        assert_eq!(entry.mnemonic, "JR");
        assert_eq!(entry.cycles, 12);
        assert_eq!(
            entry.operands,
            vec![OperandSpec::immediate("NZ"), OperandSpec::immediate("e8")]
        );

        let entry = table.entry(OpcodeSpace::Extended, 0x22);
        assert_eq!(entry.operands[0], OperandSpec::indirect("HL"));
        assert_eq!(table.base().len(), 256);
        assert_eq!(table.extended().len(), 256);
    }

    #[test]
    fn rejects_key_that_is_not_a_byte() {
        let extra = json!({ "mnemonic": "NOP", "cycles": [4], "operands": [] });
        let text = document(space_json(Some(("0x100", extra))), space_json(None));
        let err = parse_table(&text).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MalformedTableError>(),
            Some(&MalformedTableError::InvalidCode {
                space: OpcodeSpace::Base,
                key: "0x100".to_string(),
            })
        );
    }

    #[test]
    fn rejects_empty_timing_list() {
        let bad = json!({ "mnemonic": "SWAP", "cycles": [], "operands": [] });
        let text = document(space_json(None), space_json(Some(("0x37", bad))));
        let err = parse_table(&text).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MalformedTableError>(),
            Some(MalformedTableError::MissingTiming {
                space: OpcodeSpace::Extended,
                code: 0x37,
                ..
            })
        ));
    }

    #[test]
    fn rejects_incomplete_space() {
        let mut unprefixed = space_json(None);
        unprefixed.as_object_mut().unwrap().remove("0xD3");
        let text = document(unprefixed, space_json(None));
        let err = parse_table(&text).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MalformedTableError>(),
            Some(&MalformedTableError::MissingCode {
                space: OpcodeSpace::Base,
                code: 0xD3,
            })
        );
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(parse_table("{ \"unprefixed\": ").is_err());
    }

    #[test]
    fn parse_code_accepts_both_prefix_cases() {
        assert_eq!(parse_code("0x0A"), Some(0x0A));
        assert_eq!(parse_code("0XfF"), Some(0xFF));
        assert_eq!(parse_code("FF"), None);
        assert_eq!(parse_code("0x"), None);
    }
}
