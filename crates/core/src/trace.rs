//! Trace file loading.
//!
//! A trace is a text file, one instruction record per line, whitespace
//! separated: `pc(hex) opcode(dec) dest(dec) src1(dec) src2(dec) addr(hex)
//! dyn_count(dec) mispred(0|1) icache_miss(0|1) dcache_miss(0|1)`.

use std::fs;
use std::path::Path;

use crate::common::error::SimError;
use crate::isa::{Instruction, Opcode};

/// Loads and parses a trace file into a sequence of instructions.
///
/// When `disable_miss_modeling` is set, every `mispredict`/`icache_miss`/
/// `dcache_miss` flag is forced to `false` regardless of what the trace
/// line encodes, matching the `-D` CLI flag.
///
/// # Errors
/// Returns [`SimError::TraceOpen`] if the file cannot be read, or
/// [`SimError::MalformedTraceLine`] if a line does not parse into a
/// well-formed record.
pub fn load_trace(
    path: &Path,
    disable_miss_modeling: bool,
) -> Result<Vec<Instruction>, SimError> {
    let contents = fs::read_to_string(path).map_err(|source| SimError::TraceOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let mut instructions = Vec::new();
    for (line_no, raw) in contents.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let inst = parse_line(trimmed, disable_miss_modeling).ok_or_else(|| {
            SimError::MalformedTraceLine {
                path: path.to_path_buf(),
                line_no: line_no + 1,
                raw: trimmed.to_string(),
            }
        })?;
        instructions.push(inst);
    }
    Ok(instructions)
}

fn parse_line(line: &str, disable_miss_modeling: bool) -> Option<Instruction> {
    let mut fields = line.split_whitespace();

    let pc = parse_hex(fields.next()?)?;
    let opcode_raw: u8 = fields.next()?.parse().ok()?;
    let opcode = Opcode::from_encoding(opcode_raw)?;
    let dest_raw: i8 = fields.next()?.parse().ok()?;
    let src1: i8 = fields.next()?.parse().ok()?;
    let src2: i8 = fields.next()?.parse().ok()?;
    let addr = parse_hex(fields.next()?)?;
    let dyn_id: u64 = fields.next()?.parse().ok()?;
    let mispred: u8 = fields.next()?.parse().ok()?;
    let icache_miss: u8 = fields.next()?.parse().ok()?;
    let dcache_miss: u8 = fields.next()?.parse().ok()?;

    if fields.next().is_some() {
        return None;
    }

    // A destination of architectural register 0 is normalized to "none".
    let dest = if dest_raw == 0 { -1 } else { dest_raw };

    Some(Instruction {
        pc,
        opcode,
        dest,
        src1,
        src2,
        addr,
        dyn_id,
        mispredict: mispred != 0 && !disable_miss_modeling,
        icache_miss: icache_miss != 0 && !disable_miss_modeling,
        dcache_miss: dcache_miss != 0 && !disable_miss_modeling,
    })
}

fn parse_hex(field: &str) -> Option<u64> {
    let stripped = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field);
    u64::from_str_radix(stripped, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_trace(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_a_single_add() {
        let file = write_trace("0 2 1 -1 -1 0 0 0 0 0\n");
        let insts = load_trace(file.path(), false).unwrap();
        assert_eq!(insts.len(), 1);
        assert_eq!(insts[0].opcode, Opcode::Add);
        assert_eq!(insts[0].dest, 1);
        assert_eq!(insts[0].src1, -1);
    }

    #[test]
    fn normalizes_dest_zero_to_none() {
        let file = write_trace("0 2 0 -1 -1 0 0 0 0 0\n");
        let insts = load_trace(file.path(), false).unwrap();
        assert_eq!(insts[0].dest, -1);
    }

    #[test]
    fn disable_miss_modeling_zeroes_oracle_flags() {
        let file = write_trace("0 4 1 -1 -1 0x100 0 1 1 1\n");
        let insts = load_trace(file.path(), true).unwrap();
        assert!(!insts[0].mispredict);
        assert!(!insts[0].icache_miss);
        assert!(!insts[0].dcache_miss);
    }

    #[test]
    fn keeps_oracle_flags_when_modeling_enabled() {
        let file = write_trace("0 4 1 -1 -1 0x100 0 0 0 1\n");
        let insts = load_trace(file.path(), false).unwrap();
        assert!(insts[0].dcache_miss);
    }

    #[test]
    fn rejects_malformed_line() {
        let file = write_trace("not a valid trace line\n");
        let err = load_trace(file.path(), false).unwrap_err();
        assert!(matches!(err, SimError::MalformedTraceLine { .. }));
    }

    #[test]
    fn rejects_missing_file() {
        let err = load_trace(Path::new("/nonexistent/trace.txt"), false).unwrap_err();
        assert!(matches!(err, SimError::TraceOpen { .. }));
    }

    #[test]
    fn skips_blank_lines() {
        let file = write_trace("0 2 1 -1 -1 0 0 0 0 0\n\n4 2 2 1 -1 0 1 0 0 0\n");
        let insts = load_trace(file.path(), false).unwrap();
        assert_eq!(insts.len(), 2);
    }
}
