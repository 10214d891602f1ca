//! The in-flight pipeline entry: the single per-instruction record mirrored
//! across the scheduling queue, the reorder buffer, and (transiently) a
//! functional-unit pipe and the store buffer.
//!
//! Each mirror is an independent snapshot rather than a shared pointer —
//! completion state genuinely diverges between the FU-pipe copy and the ROB
//! entry until the broadcast propagates — and all mirrors are correlated by
//! [`Instruction::dyn_id`], a stable handle across every structure.

use crate::isa::Instruction;

/// One in-flight instruction, renamed and ready to enter the scheduling queue.
#[derive(Debug, Clone, Copy)]
pub struct PipelineEntry {
    /// The original trace record.
    pub inst: Instruction,
    /// Renamed first source, or -1 if absent.
    pub src1_preg: i32,
    /// Renamed second source, or -1 if absent.
    pub src2_preg: i32,
    /// Allocated destination physical register, or -1 if the instruction
    /// writes no register.
    pub dest_preg: i32,
    /// The destination architectural register's previous mapping, freed
    /// when this entry retires.
    pub prev_preg: i32,
    /// Set once the entry has fired into a functional unit.
    pub fired: bool,
    /// For a load, set when store-buffer forwarding supplied the result.
    pub store_buffer_hit: bool,
}

impl PipelineEntry {
    /// Builds a renamed pipeline entry, as dispatch would.
    #[must_use]
    pub fn new(
        inst: Instruction,
        src1_preg: i32,
        src2_preg: i32,
        dest_preg: i32,
        prev_preg: i32,
    ) -> Self {
        Self {
            inst,
            src1_preg,
            src2_preg,
            dest_preg,
            prev_preg,
            fired: false,
            store_buffer_hit: false,
        }
    }

    /// The stable identity shared across every mirror of this instruction.
    #[must_use]
    pub fn dyn_id(&self) -> u64 {
        self.inst.dyn_id
    }
}

/// An occupant of a functional-unit pipe: a snapshot of the entry plus the
/// stage counter the pipe advances.
///
/// Holding a full snapshot (rather than just the dynamic id) means the
/// execute stage never needs to cross-reference the scheduling queue to
/// answer "is this a store, and what address does it touch".
#[derive(Debug, Clone, Copy)]
pub struct FuOccupant {
    /// Snapshot of the entry as it fired into the pipe.
    pub entry: PipelineEntry,
    /// Stage the occupant has reached, starting at 0 on insertion.
    pub stage: u32,
}

impl FuOccupant {
    /// Wraps a freshly-fired entry at stage 0.
    #[must_use]
    pub fn new(entry: PipelineEntry) -> Self {
        Self { entry, stage: 0 }
    }

    /// The stable identity shared across every mirror of this instruction.
    #[must_use]
    pub fn dyn_id(&self) -> u64 {
        self.entry.dyn_id()
    }
}
