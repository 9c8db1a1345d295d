//! The per-cycle scheduler.
//!
//! Every cycle advances the whole machine once, in a fixed phase order that
//! is part of the timing contract:
//! 1. **Advance** one-cycle transitions (stations, branches, memory buffers,
//!    then address units, so an address written this cycle is observed next cycle).
//! 2. **Execute:** functional units and memory buffers count down; finished
//!    results join any messages deferred from earlier cycles.
//! 3. **Arbitrate:** at most one message wins the CDB; losers are deferred,
//!    never dropped.
//! 4. **Broadcast** to the register file (stale-tag-suppressed), stations,
//!    store buffers, and branch handlers.
//! 5. **Free** the broadcasting producer.
//! 6. **Evaluate branches**; a taken branch reloads the queue from its target.
//! 7. **Dispatch** operand-ready stations to free functional units.
//! 8. **Issue** at most one instruction from the queue head.
//! 9. **Snapshot** the cycle for external observers.
//!
//! Issue is fully suppressed while a branch is in flight (stall-on-branch),
//! so a taken branch never has wrong-path work to cancel.

use crate::common::reg::{RegisterFile, reg_name};
use crate::common::tag::{Tag, TagClass, format_producer};
use crate::config::CoreConfig;
use crate::core::address_unit::{AddressTarget, AddressUnit};
use crate::core::branch::BranchHandler;
use crate::core::cdb::{CdbMessage, DependencyCounts, choose};
use crate::core::fu::{FuType, FunctionalUnit};
use crate::core::load_buffer::{LoadBuffer, LoadState};
use crate::core::ordering::{load_can_start, store_can_start};
use crate::core::station::{ReservationStation, RsType};
use crate::core::store_buffer::StoreBuffer;
use crate::isa::{InstrClass, Instruction};
use crate::mem::cache::DataCache;
use crate::mem::main_memory::MainMemory;
use crate::queue::InstructionQueue;
use crate::snapshot::{
    BranchView, CycleSnapshot, FuView, LoadBufferView, RegisterView, StationView, StoreBufferView,
};
use crate::stats::SimStats;
use crate::units::{alu, fpu};

/// The cycle-accurate core: all microarchitectural structures plus the
/// scheduler that advances them.
pub struct CycleEngine {
    config: CoreConfig,
    program: Vec<Instruction>,
    iq: InstructionQueue,
    regs: RegisterFile,
    cache: DataCache,

    fp_add_sub_stations: Vec<ReservationStation>,
    fp_mul_div_stations: Vec<ReservationStation>,
    int_stations: Vec<ReservationStation>,

    int_units: Vec<FunctionalUnit>,
    fp_add_sub_units: Vec<FunctionalUnit>,
    fp_mul_div_units: Vec<FunctionalUnit>,

    load_buffers: Vec<LoadBuffer>,
    store_buffers: Vec<StoreBuffer>,
    branch_handlers: Vec<BranchHandler>,
    address_units: Vec<AddressUnit>,

    /// Ready messages that lost CDB arbitration in an earlier cycle. They
    /// re-enter the candidate list ahead of newly ready messages.
    pending_messages: Vec<CdbMessage>,

    program_counter: usize,
    branch_pending: bool,
    next_sequence: u64,
    cycle: u64,
    stats: SimStats,
    log: Vec<String>,
}

impl CycleEngine {
    /// Builds the core for a program under an already-validated configuration.
    pub fn new(program: Vec<Instruction>, config: CoreConfig) -> Self {
        let pools = &config.pools;

        let fp_add_sub_stations = (0..pools.num_fp_add_sub_rs)
            .map(|i| ReservationStation::new(Tag::new(TagClass::FpAddSub, i), RsType::FpAddSub))
            .collect();
        let fp_mul_div_stations = (0..pools.num_fp_mul_div_rs)
            .map(|i| ReservationStation::new(Tag::new(TagClass::FpMulDiv, i), RsType::FpMulDiv))
            .collect();
        let int_stations = (0..pools.num_int_rs)
            .map(|i| ReservationStation::new(Tag::new(TagClass::IntAlu, i), RsType::IntAlu))
            .collect();

        // One functional unit per station of the class.
        let int_units = (0..pools.num_int_rs)
            .map(|_| FunctionalUnit::new(FuType::IntAlu))
            .collect();
        let fp_add_sub_units = (0..pools.num_fp_add_sub_rs)
            .map(|_| FunctionalUnit::new(FuType::FpAddSub))
            .collect();
        let fp_mul_div_units = (0..pools.num_fp_mul_div_rs)
            .map(|_| FunctionalUnit::new(FuType::FpMulDiv))
            .collect();

        let load_buffers = (0..pools.num_load_buffers)
            .map(|i| LoadBuffer::new(Tag::new(TagClass::Load, i)))
            .collect();
        let store_buffers = (0..pools.num_store_buffers)
            .map(|i| StoreBuffer::new(Tag::new(TagClass::Store, i)))
            .collect();
        let branch_handlers = (0..pools.num_branch_handlers)
            .map(|i| BranchHandler::new(Tag::new(TagClass::Branch, i), config.latency.branch))
            .collect();
        let address_units = (0..pools.num_address_units)
            .map(|_| AddressUnit::new())
            .collect();

        let cache = DataCache::new(&config.cache, MainMemory::new(config.memory.memory_size));
        let iq = InstructionQueue::new(program.len());

        Self {
            config,
            program,
            iq,
            regs: RegisterFile::new(),
            cache,
            fp_add_sub_stations,
            fp_mul_div_stations,
            int_stations,
            int_units,
            fp_add_sub_units,
            fp_mul_div_units,
            load_buffers,
            store_buffers,
            branch_handlers,
            address_units,
            pending_messages: Vec::new(),
            program_counter: 0,
            branch_pending: false,
            next_sequence: 0,
            cycle: 0,
            stats: SimStats::default(),
            log: Vec::new(),
        }
    }

    /// The register file.
    pub fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    /// Mutable register file (initial-state setup).
    pub fn regs_mut(&mut self) -> &mut RegisterFile {
        &mut self.regs
    }

    /// The data cache (and, through it, main memory).
    pub fn cache(&self) -> &DataCache {
        &self.cache
    }

    /// Mutable data cache (initial-state setup, terminal flush).
    pub fn cache_mut(&mut self) -> &mut DataCache {
        &mut self.cache
    }

    /// Accumulated statistics.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Cycles stepped so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// True when the queue is empty, nothing is busy, and no branch is pending.
    pub fn is_finished(&self) -> bool {
        self.iq.is_empty() && !self.branch_pending && !self.any_busy()
    }

    fn any_busy(&self) -> bool {
        self.all_stations().any(|rs| rs.is_busy())
            || self.load_buffers.iter().any(|lb| lb.is_busy())
            || self.store_buffers.iter().any(|sb| sb.is_busy())
            || self.branch_handlers.iter().any(|bh| bh.is_busy())
            || self.all_units().any(|fu| !fu.is_free())
            || self.address_units.iter().any(|au| !au.is_free())
            || !self.pending_messages.is_empty()
    }

    fn all_stations(&self) -> impl Iterator<Item = &ReservationStation> {
        self.fp_add_sub_stations
            .iter()
            .chain(self.fp_mul_div_stations.iter())
            .chain(self.int_stations.iter())
    }

    fn all_units(&self) -> impl Iterator<Item = &FunctionalUnit> {
        self.int_units
            .iter()
            .chain(self.fp_add_sub_units.iter())
            .chain(self.fp_mul_div_units.iter())
    }

    /// Advances the machine by one cycle and returns its snapshot.
    pub fn step(&mut self) -> CycleSnapshot {
        self.cycle += 1;
        self.stats.cycles += 1;
        self.log.clear();

        // Phase 1: one-cycle transitions.
        self.advance_structures();

        // Phase 2: execute. Deferred messages come first in the candidate list.
        let mut ready = std::mem::take(&mut self.pending_messages);
        self.tick_functional_units(&mut ready);
        self.tick_memory_buffers(&mut ready);

        // Phases 3-5: arbitrate, broadcast, free the producer.
        let broadcast = self.arbitrate_and_broadcast(ready);

        // Phase 6: evaluate branches.
        let branch_taken_this_cycle = self.evaluate_branches();

        // Phase 7: dispatch operand-ready stations to free units.
        self.dispatch();

        // Phase 8: issue at most one instruction.
        self.issue(branch_taken_this_cycle);

        // Phase 9: snapshot.
        for warning in self.cache.drain_warnings() {
            self.log.push(format!("[WARN] {}", warning));
        }
        if self.config.general.trace_log {
            eprintln!("---------- cycle {} ----------", self.cycle);
            for line in &self.log {
                eprintln!("{}", line);
            }
        }
        self.build_snapshot(broadcast)
    }

    // --- phase 1 ---

    fn advance_structures(&mut self) {
        for rs in self
            .fp_add_sub_stations
            .iter_mut()
            .chain(self.fp_mul_div_stations.iter_mut())
            .chain(self.int_stations.iter_mut())
        {
            rs.advance();
        }
        for bh in &mut self.branch_handlers {
            bh.advance();
        }

        for i in 0..self.load_buffers.len() {
            if !self.load_buffers[i].is_busy() {
                continue;
            }
            let can_start = load_can_start(&self.load_buffers[i], &self.store_buffers);
            let was_executing = self.load_buffers[i].state() == LoadState::Executing;
            self.load_buffers[i].advance(can_start);
            if !was_executing && self.load_buffers[i].state() == LoadState::Executing {
                self.log.push(format!(
                    "[LOAD] {} starting access at EA={}",
                    self.load_buffers[i].tag(),
                    self.load_buffers[i].effective_address()
                ));
            }
        }

        for i in 0..self.store_buffers.len() {
            if !self.store_buffers[i].is_busy() {
                continue;
            }
            if self.store_buffers[i].ready_to_execute()
                && store_can_start(&self.store_buffers[i], &self.load_buffers, &self.store_buffers)
            {
                let ea = self.store_buffers[i].effective_address() as u64;
                let latency = self.cache.access_latency(ea);
                let hit = self.cache.is_hit(ea);
                self.store_buffers[i].start_execution(latency);
                self.log.push(format!(
                    "[STORE] {} starting commit at EA={} (latency={}, {})",
                    self.store_buffers[i].tag(),
                    ea,
                    latency,
                    if hit { "HIT" } else { "MISS" }
                ));
            } else {
                self.store_buffers[i].advance_waiting();
            }
        }

        for au in &mut self.address_units {
            if let Some((target, ea)) = au.tick() {
                match target {
                    AddressTarget::Load(i) => {
                        self.load_buffers[i].set_effective_address(ea);
                        self.log.push(format!(
                            "[ADDR] EA={} ready for {}",
                            ea,
                            self.load_buffers[i].tag()
                        ));
                    }
                    AddressTarget::Store(i) => {
                        self.store_buffers[i].set_effective_address(ea);
                        self.log.push(format!(
                            "[ADDR] EA={} ready for {}",
                            ea,
                            self.store_buffers[i].tag()
                        ));
                    }
                }
            }
        }
    }

    // --- phase 2 ---

    fn tick_functional_units(&mut self, ready: &mut Vec<CdbMessage>) {
        tick_fu_pool(
            &mut self.int_units,
            &mut self.int_stations,
            ready,
            &mut self.log,
            &mut self.stats,
        );
        tick_fu_pool(
            &mut self.fp_add_sub_units,
            &mut self.fp_add_sub_stations,
            ready,
            &mut self.log,
            &mut self.stats,
        );
        tick_fu_pool(
            &mut self.fp_mul_div_units,
            &mut self.fp_mul_div_stations,
            ready,
            &mut self.log,
            &mut self.stats,
        );
    }

    fn tick_memory_buffers(&mut self, ready: &mut Vec<CdbMessage>) {
        for lb in &mut self.load_buffers {
            let ea = lb.effective_address();
            if let Some(msg) = lb.tick_execute(&mut self.cache) {
                self.stats.loads_completed += 1;
                self.log
                    .push(format!("[LOAD] {} read {} from EA={}", msg.tag, msg.value, ea));
                ready.push(msg);
            }
        }
        for sb in &mut self.store_buffers {
            let tag = sb.tag();
            if let Some((addr, value)) = sb.tick_execute(&mut self.cache) {
                self.stats.stores_committed += 1;
                self.log
                    .push(format!("[STORE] {} committed {} to EA={}", tag, value, addr));
            }
        }
    }

    // --- phases 3-5 ---

    fn arbitrate_and_broadcast(&mut self, mut ready: Vec<CdbMessage>) -> Option<CdbMessage> {
        if ready.is_empty() {
            return None;
        }

        let counts: Vec<DependencyCounts> =
            ready.iter().map(|m| self.dependency_counts(m.tag)).collect();
        let winner = choose(&counts);
        let msg = ready.remove(winner);

        if !ready.is_empty() {
            self.stats.cdb_deferred += ready.len() as u64;
            self.log.push(format!(
                "[CDB] {} message(s) deferred to next cycle",
                ready.len()
            ));
        }
        self.pending_messages = ready;

        self.log.push(format!(
            "[CDB] broadcasting {} = {} (dest {})",
            msg.tag,
            msg.value,
            msg.dest_reg.map_or_else(|| "none".to_string(), reg_name),
        ));
        self.broadcast(&msg);
        self.free_producer(msg.tag);
        self.stats.cdb_broadcasts += 1;
        Some(msg)
    }

    /// Counts direct dependents of `tag` for CDB arbitration: stations and
    /// branch handlers waiting on it in Qj/Qk, and stores waiting on it as
    /// their value source. A structure counts once even when both operands
    /// wait on the same tag. A dependent is "ready" when this tag is its
    /// only outstanding dependency.
    fn dependency_counts(&self, tag: Tag) -> DependencyCounts {
        let mut counts = DependencyCounts::default();

        let mut visit = |qj: Option<Tag>, qk: Option<Tag>, waiting_state: bool| {
            let waits = qj == Some(tag) || qk == Some(tag);
            if !waits {
                return;
            }
            counts.dependents += 1;
            let other_outstanding = (qj.is_some() && qj != Some(tag))
                || (qk.is_some() && qk != Some(tag));
            if waiting_state && !other_outstanding {
                counts.ready_dependents += 1;
            }
        };

        for rs in self.all_stations() {
            if rs.is_busy() {
                visit(
                    rs.qj(),
                    rs.qk(),
                    rs.state() == crate::core::station::RsState::WaitingForOperands,
                );
            }
        }
        for bh in &self.branch_handlers {
            if bh.is_busy() {
                visit(
                    bh.qj(),
                    bh.qk(),
                    bh.state() == crate::core::branch::BranchState::WaitingForOperands,
                );
            }
        }
        for sb in &self.store_buffers {
            if sb.is_busy() && sb.source_tag() == Some(tag) {
                counts.dependents += 1;
                if sb.address_ready() {
                    counts.ready_dependents += 1;
                }
            }
        }

        counts
    }

    fn broadcast(&mut self, msg: &CdbMessage) {
        if let Some(dest) = msg.dest_reg {
            if self.regs.clear_producer_if_match(dest, msg.tag) {
                self.regs.write(dest, msg.value);
            } else if dest != 0 {
                self.log.push(format!(
                    "[CDB] stale write to {} by {} suppressed",
                    reg_name(dest),
                    msg.tag
                ));
            }
        }

        for rs in self
            .fp_add_sub_stations
            .iter_mut()
            .chain(self.fp_mul_div_stations.iter_mut())
            .chain(self.int_stations.iter_mut())
        {
            rs.on_cdb_broadcast(msg.tag, msg.value);
        }
        for sb in &mut self.store_buffers {
            sb.on_cdb_broadcast(msg.tag, msg.value);
        }
        for bh in &mut self.branch_handlers {
            bh.on_cdb_broadcast(msg.tag, msg.value);
        }
    }

    fn free_producer(&mut self, tag: Tag) {
        for rs in self
            .fp_add_sub_stations
            .iter_mut()
            .chain(self.fp_mul_div_stations.iter_mut())
            .chain(self.int_stations.iter_mut())
        {
            if rs.is_busy() && rs.tag() == tag && rs.is_result_ready() {
                self.log.push(format!("[FREE] station {} freed", tag));
                rs.free();
                return;
            }
        }
        for lb in &mut self.load_buffers {
            if lb.is_busy() && lb.tag() == tag && lb.is_result_ready() {
                self.log.push(format!("[FREE] buffer {} freed", tag));
                lb.free();
                return;
            }
        }
    }

    // --- phase 6 ---

    fn evaluate_branches(&mut self) -> bool {
        let mut taken_this_cycle = false;
        for bh in &mut self.branch_handlers {
            if let Some(outcome) = bh.evaluate_tick() {
                self.stats.branches_evaluated += 1;
                self.branch_pending = false;
                self.log.push(format!(
                    "[BRANCH] {} evaluated: {}, nextPC={}",
                    outcome.opcode,
                    if outcome.taken { "TAKEN" } else { "NOT TAKEN" },
                    outcome.next_pc
                ));
                if outcome.taken {
                    self.stats.branches_taken += 1;
                    self.iq.reload(outcome.next_pc, self.program.len());
                    self.program_counter = outcome.next_pc;
                    taken_this_cycle = true;
                    self.log.push(format!(
                        "[BRANCH] queue reloaded from PC={}, {} instruction(s) remaining",
                        outcome.next_pc,
                        self.iq.len()
                    ));
                }
            }
        }
        taken_this_cycle
    }

    // --- phase 7 ---

    fn dispatch(&mut self) {
        dispatch_pool(
            &mut self.fp_add_sub_stations,
            &mut self.fp_add_sub_units,
            &self.config.latency,
            &mut self.log,
        );
        dispatch_pool(
            &mut self.fp_mul_div_stations,
            &mut self.fp_mul_div_units,
            &self.config.latency,
            &mut self.log,
        );
        dispatch_pool(
            &mut self.int_stations,
            &mut self.int_units,
            &self.config.latency,
            &mut self.log,
        );
    }

    // --- phase 8 ---

    fn issue(&mut self, branch_taken_this_cycle: bool) {
        let Some(head) = self.iq.head() else {
            return;
        };

        if branch_taken_this_cycle {
            self.stats.stalls_branch += 1;
            self.log
                .push("[ISSUE] stall: branch taken this cycle".to_string());
            return;
        }
        if self.branch_pending {
            self.stats.stalls_branch += 1;
            self.log.push("[ISSUE] stall: branch pending".to_string());
            return;
        }

        let instr = self.program[head];
        let issued = match instr.class() {
            InstrClass::Load => self.issue_load(&instr),
            InstrClass::Store => self.issue_store(&instr),
            InstrClass::Branch => self.issue_branch(&instr),
            InstrClass::IntAlu | InstrClass::FpAddSub | InstrClass::FpMulDiv => {
                self.issue_alu(&instr)
            }
        };

        if issued {
            self.iq.dequeue();
            self.program_counter += 1;
            self.stats.instructions_issued += 1;
        }
    }

    fn issue_alu(&mut self, instr: &Instruction) -> bool {
        let pool = match instr.class() {
            InstrClass::FpAddSub => &mut self.fp_add_sub_stations,
            InstrClass::FpMulDiv => &mut self.fp_mul_div_stations,
            _ => &mut self.int_stations,
        };
        match pool.iter_mut().find(|rs| rs.is_free()) {
            Some(rs) => {
                rs.issue(instr, &mut self.regs);
                self.log
                    .push(format!("[ISSUE] {} -> station {}", instr, rs.tag()));
                true
            }
            None => {
                self.stats.stalls_structural += 1;
                self.log.push(format!(
                    "[ISSUE] stall: no free station for {}",
                    instr.opcode
                ));
                false
            }
        }
    }

    /// Issues a load: requires a free buffer, a free address unit, and a
    /// base register with no pending producer (the issue-time cache probe
    /// needs the architectural base value).
    fn issue_load(&mut self, instr: &Instruction) -> bool {
        let base = instr.base.unwrap_or(0);
        if self.regs.producer(base).is_some() {
            self.stats.stalls_data += 1;
            self.log.push(format!(
                "[ISSUE] stall: base register {} not ready for {}",
                reg_name(base),
                instr.opcode
            ));
            return false;
        }
        let Some(lb_index) = self.load_buffers.iter().position(|b| b.is_free()) else {
            self.stats.stalls_structural += 1;
            self.log.push(format!(
                "[ISSUE] stall: no free load buffer for {}",
                instr.opcode
            ));
            return false;
        };
        let Some(au_index) = self.address_units.iter().position(|u| u.is_free()) else {
            self.stats.stalls_structural += 1;
            self.log.push(format!(
                "[ISSUE] stall: no free address unit for {}",
                instr.opcode
            ));
            return false;
        };

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let base_value = self.regs.read_int(base);
        let ea = base_value.wrapping_add(instr.offset) as u64;
        let latency = self.cache.access_latency(ea);
        let hit = self.cache.is_hit(ea);

        self.load_buffers[lb_index].issue(instr, &mut self.regs, sequence, latency);
        self.address_units[au_index].start(
            AddressTarget::Load(lb_index),
            base_value,
            instr.offset,
            self.config.latency.address,
        );
        self.log.push(format!(
            "[ISSUE] {} -> buffer {} (seq={}, latency={}, {})",
            instr,
            self.load_buffers[lb_index].tag(),
            sequence,
            latency,
            if hit { "HIT" } else { "MISS" }
        ));
        true
    }

    /// Issues a store. The cache latency is deliberately not probed here:
    /// the hit/miss outcome is decided when the store becomes ready to
    /// commit, so it reflects intervening cache state changes.
    fn issue_store(&mut self, instr: &Instruction) -> bool {
        let base = instr.base.unwrap_or(0);
        if self.regs.producer(base).is_some() {
            self.stats.stalls_data += 1;
            self.log.push(format!(
                "[ISSUE] stall: base register {} not ready for {}",
                reg_name(base),
                instr.opcode
            ));
            return false;
        }
        let Some(sb_index) = self.store_buffers.iter().position(|b| b.is_free()) else {
            self.stats.stalls_structural += 1;
            self.log.push(format!(
                "[ISSUE] stall: no free store buffer for {}",
                instr.opcode
            ));
            return false;
        };
        let Some(au_index) = self.address_units.iter().position(|u| u.is_free()) else {
            self.stats.stalls_structural += 1;
            self.log.push(format!(
                "[ISSUE] stall: no free address unit for {}",
                instr.opcode
            ));
            return false;
        };

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let base_value = self.regs.read_int(base);
        self.store_buffers[sb_index].issue(instr, &self.regs, sequence);
        self.address_units[au_index].start(
            AddressTarget::Store(sb_index),
            base_value,
            instr.offset,
            self.config.latency.address,
        );
        self.log.push(format!(
            "[ISSUE] {} -> buffer {} (seq={}, value {})",
            instr,
            self.store_buffers[sb_index].tag(),
            sequence,
            if self.store_buffers[sb_index].value_ready() {
                "ready".to_string()
            } else {
                format!(
                    "from {}",
                    format_producer(self.store_buffers[sb_index].source_tag())
                )
            }
        ));
        true
    }

    fn issue_branch(&mut self, instr: &Instruction) -> bool {
        let Some(bh) = self.branch_handlers.iter_mut().find(|b| b.is_free()) else {
            self.stats.stalls_structural += 1;
            self.log.push(format!(
                "[ISSUE] stall: no free branch handler for {}",
                instr.opcode
            ));
            return false;
        };
        bh.issue(instr, &self.regs, self.program_counter);
        self.branch_pending = true;
        self.log.push(format!(
            "[ISSUE] {} -> handler {} (PC={})",
            instr,
            bh.tag(),
            self.program_counter
        ));
        true
    }

    // --- phase 9 ---

    fn build_snapshot(&self, broadcast: Option<CdbMessage>) -> CycleSnapshot {
        CycleSnapshot {
            cycle: self.cycle,
            iq_head: self.iq.head().map(|i| self.program[i].to_string()),
            iq_len: self.iq.len(),
            program_counter: self.program_counter,
            branch_pending: self.branch_pending,
            stations: self
                .all_stations()
                .map(|rs| StationView {
                    tag: rs.tag(),
                    rs_type: rs.rs_type(),
                    state: rs.state(),
                    opcode: rs.opcode(),
                    vj: rs.vj(),
                    vk: rs.vk(),
                    qj: rs.qj(),
                    qk: rs.qk(),
                    dest_reg: rs.dest_reg(),
                })
                .collect(),
            load_buffers: self
                .load_buffers
                .iter()
                .map(|lb| LoadBufferView {
                    tag: lb.tag(),
                    state: lb.state(),
                    opcode: lb.opcode(),
                    dest_reg: lb.dest_reg(),
                    effective_address: lb.effective_address(),
                    address_ready: lb.address_ready(),
                    remaining_cycles: lb.remaining_cycles(),
                    sequence_number: lb.sequence_number(),
                })
                .collect(),
            store_buffers: self
                .store_buffers
                .iter()
                .map(|sb| StoreBufferView {
                    tag: sb.tag(),
                    state: sb.state(),
                    opcode: sb.opcode(),
                    effective_address: sb.effective_address(),
                    address_ready: sb.address_ready(),
                    value_to_store: sb.value_to_store(),
                    source_tag: sb.source_tag(),
                    value_ready: sb.value_ready(),
                    remaining_cycles: sb.remaining_cycles(),
                    sequence_number: sb.sequence_number(),
                })
                .collect(),
            branch_handlers: self
                .branch_handlers
                .iter()
                .map(|bh| BranchView {
                    tag: bh.tag(),
                    state: bh.state(),
                    opcode: bh.opcode(),
                    vj: bh.vj(),
                    vk: bh.vk(),
                    qj: bh.qj(),
                    qk: bh.qk(),
                    current_pc: bh.current_pc(),
                    target_pc: bh.target_pc(),
                })
                .collect(),
            functional_units: self
                .all_units()
                .map(|fu| FuView {
                    fu_type: fu.fu_type(),
                    busy: !fu.is_free(),
                    station: fu.station(),
                    remaining_cycles: fu.remaining_cycles(),
                })
                .collect(),
            registers: self
                .regs
                .iter()
                .enumerate()
                .map(|(index, r)| RegisterView {
                    index,
                    value: r.value,
                    producer: r.producer,
                })
                .collect(),
            cache_lines: self.cache.line_summaries(),
            broadcast,
            log: self.log.clone(),
        }
    }
}

/// Ticks every unit of one pool; finished units evaluate their station's
/// semantic function and queue the CDB message.
fn tick_fu_pool(
    units: &mut [FunctionalUnit],
    stations: &mut [ReservationStation],
    ready: &mut Vec<CdbMessage>,
    log: &mut Vec<String>,
    stats: &mut SimStats,
) {
    for fu in units.iter_mut() {
        let Some(rs_index) = fu.tick() else {
            continue;
        };
        let rs = &mut stations[rs_index];
        let Some(op) = rs.opcode() else {
            continue;
        };

        let result = match op.class() {
            InstrClass::IntAlu => {
                let a = rs.vj() as i64;
                let b = if op.uses_immediate() {
                    rs.immediate()
                } else {
                    rs.vk() as i64
                };
                let outcome = alu::execute(op, a, b);
                if outcome.divide_by_zero {
                    stats.int_divide_by_zero += 1;
                    log.push(format!(
                        "[WARN] {} at {}: divide by zero, result forced to 0",
                        op,
                        rs.tag()
                    ));
                    log::warn!("integer divide by zero at station {}", rs.tag());
                }
                outcome.value as f64
            }
            _ => fpu::execute(op, rs.vj(), rs.vk()),
        };

        rs.on_execution_finished();
        log.push(format!("[EXEC] {} finished {}, result={}", rs.tag(), op, result));
        ready.push(CdbMessage {
            tag: rs.tag(),
            value: result,
            dest_reg: rs.dest_reg(),
        });
    }
}

/// Dispatches every operand-ready station of a pool to a free unit that
/// supports its opcode. Starting a unit marks it busy, so one unit serves
/// at most one station per cycle.
fn dispatch_pool(
    stations: &mut [ReservationStation],
    units: &mut [FunctionalUnit],
    latency: &crate::config::LatencyConfig,
    log: &mut Vec<String>,
) {
    for i in 0..stations.len() {
        if !stations[i].is_waiting_for_fu() {
            continue;
        }
        let Some(op) = stations[i].opcode() else {
            continue;
        };
        if let Some(fu) = units
            .iter_mut()
            .find(|u| u.is_free() && u.fu_type().supports(op))
        {
            let cycles = fu.fu_type().latency_for(op, latency);
            fu.start(i, cycles);
            stations[i].on_start_execution();
            log.push(format!(
                "[DISPATCH] {} ({}) -> {:?} unit",
                stations[i].tag(),
                op,
                fu.fu_type()
            ));
        }
    }
}
