//! Functional units.
//!
//! A functional unit executes one reservation station at a time. Per-op
//! latency comes from configuration at dispatch: integer ops share the ALU
//! latency, FP add and sub share theirs, and multiply and divide are looked
//! up separately. Starting a unit marks it busy, so a second station cannot
//! claim it in the same dispatch phase. The station is referenced by pool
//! index; stations and units of a class pair one-to-one with their pools.

use crate::config::LatencyConfig;
use crate::isa::{InstrClass, Opcode};

/// The execution class of a functional unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FuType {
    /// Integer arithmetic, logical, shift, compare.
    IntAlu,
    /// FP add and subtract.
    FpAddSub,
    /// FP multiply and divide.
    FpMulDiv,
}

impl FuType {
    /// True if this unit class executes the given opcode.
    pub fn supports(self, op: Opcode) -> bool {
        matches!(
            (self, op.class()),
            (FuType::IntAlu, InstrClass::IntAlu)
                | (FuType::FpAddSub, InstrClass::FpAddSub)
                | (FuType::FpMulDiv, InstrClass::FpMulDiv)
        )
    }

    /// Looks up the latency for an opcode this unit class supports.
    pub fn latency_for(self, op: Opcode, latency: &LatencyConfig) -> u64 {
        match self {
            FuType::IntAlu => latency.int_alu,
            FuType::FpAddSub => latency.fp_add_sub,
            FuType::FpMulDiv => match op {
                Opcode::DivD | Opcode::DivS => latency.fp_div,
                _ => latency.fp_mul,
            },
        }
    }
}

/// A single functional unit.
pub struct FunctionalUnit {
    fu_type: FuType,
    busy: bool,
    station: Option<usize>,
    remaining_cycles: u64,
}

impl FunctionalUnit {
    /// Creates an idle unit of the given class.
    pub fn new(fu_type: FuType) -> Self {
        Self {
            fu_type,
            busy: false,
            station: None,
            remaining_cycles: 0,
        }
    }

    /// The execution class.
    #[inline]
    pub fn fu_type(&self) -> FuType {
        self.fu_type
    }

    /// True when no operation is in flight.
    #[inline]
    pub fn is_free(&self) -> bool {
        !self.busy
    }

    /// Pool index of the station being executed, if any.
    #[inline]
    pub fn station(&self) -> Option<usize> {
        self.station
    }

    /// Remaining execution cycles.
    #[inline]
    pub fn remaining_cycles(&self) -> u64 {
        self.remaining_cycles
    }

    /// Claims this unit for the station at `station_index`.
    pub fn start(&mut self, station_index: usize, latency: u64) {
        self.busy = true;
        self.station = Some(station_index);
        self.remaining_cycles = latency;
    }

    /// Counts down one cycle; on expiry returns the finished station's pool
    /// index and becomes free. The engine evaluates the semantic function
    /// and builds the CDB message.
    pub fn tick(&mut self) -> Option<usize> {
        if !self.busy {
            return None;
        }
        self.remaining_cycles = self.remaining_cycles.saturating_sub(1);
        if self.remaining_cycles > 0 {
            return None;
        }
        self.busy = false;
        self.station.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_by_class() {
        assert!(FuType::IntAlu.supports(Opcode::Daddi));
        assert!(!FuType::IntAlu.supports(Opcode::AddD));
        assert!(FuType::FpAddSub.supports(Opcode::SubD));
        assert!(FuType::FpMulDiv.supports(Opcode::DivS));
        assert!(!FuType::FpMulDiv.supports(Opcode::AddD));
    }

    #[test]
    fn test_latency_lookup() {
        let latency = LatencyConfig::default();
        assert_eq!(FuType::IntAlu.latency_for(Opcode::Dadd, &latency), 1);
        assert_eq!(FuType::FpAddSub.latency_for(Opcode::SubD, &latency), 2);
        assert_eq!(FuType::FpMulDiv.latency_for(Opcode::MulD, &latency), 10);
        assert_eq!(FuType::FpMulDiv.latency_for(Opcode::DivD, &latency), 40);
    }

    #[test]
    fn test_start_marks_busy_until_expiry() {
        let mut fu = FunctionalUnit::new(FuType::FpAddSub);
        fu.start(2, 2);
        assert!(!fu.is_free());

        assert_eq!(fu.tick(), None);
        assert_eq!(fu.tick(), Some(2));
        assert!(fu.is_free());
        assert_eq!(fu.tick(), None);
    }
}
