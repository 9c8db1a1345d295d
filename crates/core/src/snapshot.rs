//! Immutable per-cycle snapshots.
//!
//! At the end of every cycle the engine emits a `CycleSnapshot` describing
//! the state of each microarchitectural structure, the register file, the
//! cache, the broadcast (if any), and the human-readable phase log. Building
//! a snapshot never mutates core state, and the records are plain owned data
//! an external observer can keep.

use crate::common::tag::Tag;
use crate::core::branch::BranchState;
use crate::core::fu::FuType;
use crate::core::load_buffer::LoadState;
use crate::core::station::{RsState, RsType};
use crate::core::store_buffer::StoreState;
use crate::core::cdb::CdbMessage;
use crate::isa::Opcode;
use crate::mem::cache::CacheLineInfo;

/// One reservation station's visible fields.
#[derive(Clone, Debug)]
pub struct StationView {
    /// Station tag.
    pub tag: Tag,
    /// Station class.
    pub rs_type: RsType,
    /// Lifecycle state.
    pub state: RsState,
    /// Held opcode, if busy.
    pub opcode: Option<Opcode>,
    /// First operand value.
    pub vj: f64,
    /// Second operand value.
    pub vk: f64,
    /// Outstanding first-operand producer.
    pub qj: Option<Tag>,
    /// Outstanding second-operand producer.
    pub qk: Option<Tag>,
    /// Destination register, if any.
    pub dest_reg: Option<usize>,
}

/// One load buffer's visible fields.
#[derive(Clone, Debug)]
pub struct LoadBufferView {
    /// Buffer tag.
    pub tag: Tag,
    /// Lifecycle state.
    pub state: LoadState,
    /// Held opcode, if busy.
    pub opcode: Option<Opcode>,
    /// Destination register, if any.
    pub dest_reg: Option<usize>,
    /// Computed effective address.
    pub effective_address: i64,
    /// Whether the effective address has been delivered.
    pub address_ready: bool,
    /// Remaining access cycles.
    pub remaining_cycles: u64,
    /// Program-order sequence number.
    pub sequence_number: u64,
}

/// One store buffer's visible fields.
#[derive(Clone, Debug)]
pub struct StoreBufferView {
    /// Buffer tag.
    pub tag: Tag,
    /// Lifecycle state.
    pub state: StoreState,
    /// Held opcode, if busy.
    pub opcode: Option<Opcode>,
    /// Computed effective address.
    pub effective_address: i64,
    /// Whether the effective address has been delivered.
    pub address_ready: bool,
    /// Value to store, once captured.
    pub value_to_store: f64,
    /// Outstanding value producer.
    pub source_tag: Option<Tag>,
    /// Whether the value has been captured.
    pub value_ready: bool,
    /// Remaining commit cycles.
    pub remaining_cycles: u64,
    /// Program-order sequence number.
    pub sequence_number: u64,
}

/// One branch handler's visible fields.
#[derive(Clone, Debug)]
pub struct BranchView {
    /// Handler tag.
    pub tag: Tag,
    /// Lifecycle state.
    pub state: BranchState,
    /// Held opcode, if busy.
    pub opcode: Option<Opcode>,
    /// First operand value.
    pub vj: f64,
    /// Second operand value.
    pub vk: f64,
    /// Outstanding first-operand producer.
    pub qj: Option<Tag>,
    /// Outstanding second-operand producer.
    pub qk: Option<Tag>,
    /// Program index of the branch.
    pub current_pc: usize,
    /// Target program index when taken.
    pub target_pc: usize,
}

/// One functional unit's visible fields.
#[derive(Clone, Debug)]
pub struct FuView {
    /// Execution class.
    pub fu_type: FuType,
    /// Whether an operation is in flight.
    pub busy: bool,
    /// Pool index of the station being executed.
    pub station: Option<usize>,
    /// Remaining execution cycles.
    pub remaining_cycles: u64,
}

/// One register's visible fields.
#[derive(Clone, Copy, Debug)]
pub struct RegisterView {
    /// Flat register index.
    pub index: usize,
    /// Current value.
    pub value: f64,
    /// Pending producer, if any.
    pub producer: Option<Tag>,
}

/// The immutable record of one cycle.
#[derive(Clone, Debug)]
pub struct CycleSnapshot {
    /// One-based cycle number.
    pub cycle: u64,
    /// Rendered instruction at the queue head, if any.
    pub iq_head: Option<String>,
    /// Queue depth.
    pub iq_len: usize,
    /// Program index of the next instruction to issue.
    pub program_counter: usize,
    /// Whether a branch is in flight.
    pub branch_pending: bool,
    /// All reservation stations, FP add/sub then FP mul/div then integer.
    pub stations: Vec<StationView>,
    /// All load buffers.
    pub load_buffers: Vec<LoadBufferView>,
    /// All store buffers.
    pub store_buffers: Vec<StoreBufferView>,
    /// All branch handlers.
    pub branch_handlers: Vec<BranchView>,
    /// All functional units, integer then FP add/sub then FP mul/div.
    pub functional_units: Vec<FuView>,
    /// The full register file.
    pub registers: Vec<RegisterView>,
    /// Cache line summaries.
    pub cache_lines: Vec<CacheLineInfo>,
    /// The message broadcast this cycle, if any.
    pub broadcast: Option<CdbMessage>,
    /// Human-readable phase log for this cycle, warnings included.
    pub log: Vec<String>,
}
