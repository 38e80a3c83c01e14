//! Per-thread scratch storage for top-level encodes.
//!
//! Each thread keeps at most one spare buffer. An encode takes it out of the slot for
//! its whole duration, so an empty slot means the buffer is checked out; a nested
//! encode started from inside a custom converter finds the slot empty and falls back
//! to a fresh allocation instead of sharing storage.

use std::cell::RefCell;

use crate::allocator::Allocator;
use crate::constants::SCRATCH_RETAIN_LIMIT;

thread_local! {
    static SCRATCH: RefCell<Option<Vec<u8>>> = const { RefCell::new(Some(Vec::new())) };
}

fn check_out() -> Option<Vec<u8>> {
    SCRATCH.with(|slot| slot.borrow_mut().take())
}

fn check_in(buffer: Vec<u8>) {
    if buffer.len() > SCRATCH_RETAIN_LIMIT {
        return;
    }
    SCRATCH.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            *slot = Some(buffer);
        }
    });
}

/// Returns the checked-out storage to the slot when dropped, including during unwinding.
struct Checkout(Allocator);

impl Drop for Checkout {
    fn drop(&mut self) {
        check_in(std::mem::take(&mut self.0).into_storage());
    }
}

/// Runs `f` with an allocator backed by this thread's scratch buffer when it is free.
pub(crate) fn with_allocator<R>(max_capacity: usize, f: impl FnOnce(&mut Allocator) -> R) -> R {
    match check_out() {
        Some(buffer) => {
            let mut checkout = Checkout(Allocator::from_vec(buffer, max_capacity));
            f(&mut checkout.0)
        }
        None => {
            tracing::trace!("scratch buffer in use, allocating a fresh one");
            f(&mut Allocator::with_max_capacity(max_capacity))
        }
    }
}
