//! Memory-ordering predicates.
//!
//! Loads and stores are ordered by the sequence numbers assigned at issue.
//! A memory operation may start its access only when no earlier, still-busy
//! operation conflicts with it. A buffer whose effective address is not yet
//! computed is treated as a potential conflict (conservative blocking).
//! The engine re-evaluates these predicates every cycle in the advance phase
//! until they hold.

use crate::core::load_buffer::LoadBuffer;
use crate::core::store_buffer::StoreBuffer;

/// True when `load` may start its memory access.
///
/// Every store with a smaller sequence number that is still busy blocks the
/// load if its effective address matches, or is not yet known.
pub fn load_can_start(load: &LoadBuffer, stores: &[StoreBuffer]) -> bool {
    stores.iter().all(|sb| {
        !sb.is_busy()
            || sb.sequence_number() >= load.sequence_number()
            || (sb.address_ready() && sb.effective_address() != load.effective_address())
    })
}

/// True when `store` may start its commit.
///
/// Every earlier busy store or load with a matching (or unknown) effective
/// address blocks it.
pub fn store_can_start(
    store: &StoreBuffer,
    loads: &[LoadBuffer],
    stores: &[StoreBuffer],
) -> bool {
    let clear_of_stores = stores.iter().all(|sb| {
        !sb.is_busy()
            || sb.sequence_number() >= store.sequence_number()
            || (sb.address_ready() && sb.effective_address() != store.effective_address())
    });
    let clear_of_loads = loads.iter().all(|lb| {
        !lb.is_busy()
            || lb.sequence_number() >= store.sequence_number()
            || (lb.address_ready() && lb.effective_address() != store.effective_address())
    });
    clear_of_stores && clear_of_loads
}
