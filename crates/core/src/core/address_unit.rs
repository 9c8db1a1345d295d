//! Effective-address units.
//!
//! An address unit computes `EA = base + offset` for one memory operation.
//! The base register value is read when the unit starts (at issue time,
//! where the issue rules guarantee it is meaningful for the probe) and the
//! result is delivered to the owning buffer after `address_latency` cycles.
//! A memory instruction cannot issue without a free address unit.

/// Which buffer an address unit is computing for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressTarget {
    /// Load buffer at the given pool index.
    Load(usize),
    /// Store buffer at the given pool index.
    Store(usize),
}

/// A single effective-address computation unit.
pub struct AddressUnit {
    busy: bool,
    remaining_cycles: u64,
    target: Option<AddressTarget>,
    effective_address: i64,
}

impl AddressUnit {
    /// Creates an idle unit.
    pub fn new() -> Self {
        Self {
            busy: false,
            remaining_cycles: 0,
            target: None,
            effective_address: 0,
        }
    }

    /// True when no computation is in flight.
    #[inline]
    pub fn is_free(&self) -> bool {
        !self.busy
    }

    /// Starts a computation for `target` with the given operands and latency.
    pub fn start(&mut self, target: AddressTarget, base_value: i64, offset: i64, latency: u64) {
        self.busy = true;
        self.remaining_cycles = latency;
        self.target = Some(target);
        self.effective_address = base_value.wrapping_add(offset);
    }

    /// Counts down one cycle; on expiry returns the finished computation.
    pub fn tick(&mut self) -> Option<(AddressTarget, i64)> {
        if !self.busy {
            return None;
        }
        self.remaining_cycles = self.remaining_cycles.saturating_sub(1);
        if self.remaining_cycles > 0 {
            return None;
        }
        self.busy = false;
        self.target.take().map(|t| (t, self.effective_address))
    }
}

impl Default for AddressUnit {
    fn default() -> Self {
        Self::new()
    }
}
