//! State shared between interrupt and main-loop context.
//!
//! Values that cross the preemption boundary but do not fit the ring-buffer
//! roles (a current-time value, an alarm-triggered flag) go through
//! [`IrqCell`]: every access holds a critical section for exactly the
//! duration of the read or write, never across anything unbounded.

use core::cell::Cell;

use critical_section::Mutex;

/// A `Copy` value guarded by a critical section.
///
/// The accessors are the only way in or out, so torn reads and lost updates
/// are ruled out by construction rather than by convention.
pub struct IrqCell<T> {
    inner: Mutex<Cell<T>>,
}

impl<T: Copy> IrqCell<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(Cell::new(value)),
        }
    }

    /// Read the value as a unit.
    pub fn get(&self) -> T {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }

    /// Replace the value as a unit.
    pub fn set(&self, value: T) {
        critical_section::with(|cs| self.inner.borrow(cs).set(value));
    }

    /// Read-modify-write as a single unit. `f` runs inside the critical
    /// section; keep it short.
    pub fn update(&self, f: impl FnOnce(T) -> T) -> T {
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            let next = f(cell.get());
            cell.set(next);
            next
        })
    }
}
