//! Instruction descriptor and opcode encoding.
//!
//! These types are read-only from the core's perspective: the trace loader
//! and fetch oracle (outside this crate's scope) populate them once and the
//! core never mutates a descriptor's fields.

/// The five opcodes a trace line can encode.
///
/// Numeric values match the trace file's wire encoding so `Opcode::try_from`
/// can decode a raw `u8` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Integer add; uses an ALU pipe.
    Add,
    /// Integer multiply; uses a MUL pipe.
    Mul,
    /// Memory load; uses an LSU pipe, subject to store-to-load forwarding.
    Load,
    /// Memory store; uses an LSU pipe, writes the store buffer.
    Store,
    /// Branch; uses an ALU pipe, resolved for mispredict at retire.
    Branch,
}

impl Opcode {
    /// Decodes the trace file's numeric opcode encoding (ADD=2 .. BRANCH=6).
    #[must_use]
    pub fn from_encoding(value: u8) -> Option<Self> {
        match value {
            2 => Some(Self::Add),
            3 => Some(Self::Mul),
            4 => Some(Self::Load),
            5 => Some(Self::Store),
            6 => Some(Self::Branch),
            _ => None,
        }
    }

    /// True for opcodes scheduled onto LSU pipes (LOAD, STORE).
    #[must_use]
    pub fn is_memory_op(self) -> bool {
        matches!(self, Self::Load | Self::Store)
    }
}

/// One dynamically-executed instruction from the trace.
///
/// `dest`/`src1`/`src2` are architectural register indices, or `-1` when the
/// operand is absent. A `dest` of architectural register 0 is normalized to
/// `-1` by the trace loader since register 0 is never renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Program counter of this instruction.
    pub pc: u64,
    /// Opcode.
    pub opcode: Opcode,
    /// Destination architectural register, or -1 if none.
    pub dest: i8,
    /// First source architectural register, or -1 if none.
    pub src1: i8,
    /// Second source architectural register, or -1 if none.
    pub src2: i8,
    /// Load/store effective address (meaningless for non-memory ops).
    pub addr: u64,
    /// Monotonically increasing dynamic-instruction id, unique per trace.
    pub dyn_id: u64,
    /// Oracle flag: this instruction is a mispredicted branch.
    pub mispredict: bool,
    /// Oracle flag: fetching this instruction missed in the i-cache.
    pub icache_miss: bool,
    /// Oracle flag: this load/store misses in the d-cache.
    pub dcache_miss: bool,
}
