//! Lock-free SPSC (Single Producer, Single Consumer) ring buffer.
//!
//! This is the byte plumbing under [`SerialPort`](crate::port::SerialPort):
//! one ring carries received bytes from the rx interrupt to the main loop,
//! the other carries queued bytes from the main loop to the tx interrupt.
//!
//! # Rules
//!
//! - Exactly one context calls [`RingBuffer::try_put`] and exactly one
//!   context calls [`RingBuffer::try_get`] on a given instance.
//! - Only atomic operations for synchronization; no operation blocks.
//! - A full buffer rejects the value; the caller decides whether to retry
//!   or drop.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Lock-free SPSC ring buffer of `Copy` values.
///
/// `head` and `tail` are monotonically increasing and wrapped onto the
/// storage by masking, so `N` must be a power of two.
///
/// # Safety
///
/// This type uses `UnsafeCell` internally but is safe to use because:
/// - Single producer: only one context writes slots and advances `head`
/// - Single consumer: only one context reads slots and advances `tail`
/// - All coordination through atomic operations
///
/// # Memory Ordering
///
/// - Producer publishes a slot with a `Release` store of `head`
/// - Consumer observes it with an `Acquire` load of `head`
/// - The mirrored pair on `tail` lets the producer reuse drained slots
pub struct RingBuffer<T, const N: usize> {
    slots: UnsafeCell<[T; N]>,

    /// Next write position (monotonic, wraps via mask).
    head: AtomicU32,

    /// Next read position (monotonic, wraps via mask).
    tail: AtomicU32,
}

// SAFETY: Single producer, single consumer, atomic coordination.
// No mutable aliasing possible within the access discipline above.
unsafe impl<T: Send, const N: usize> Sync for RingBuffer<T, N> {}
unsafe impl<T: Send, const N: usize> Send for RingBuffer<T, N> {}

impl<T: Copy, const N: usize> RingBuffer<T, N> {
    /// Mask for wrapping a monotonic index onto the storage.
    const MASK: u32 = (N - 1) as u32;

    /// Create a ring filled with `fill` (the slots are logically empty).
    ///
    /// # Panics
    ///
    /// Panics at compile time if `N` is not a power of two or does not fit
    /// the index arithmetic.
    pub const fn new(fill: T) -> Self {
        assert!(N.is_power_of_two(), "ring capacity must be a power of 2");
        assert!(N <= (u32::MAX / 2) as usize, "ring capacity too large");

        Self {
            slots: UnsafeCell::new([fill; N]),
            head: AtomicU32::new(0),
            tail: AtomicU32::new(0),
        }
    }

    /// Enqueue one value.
    ///
    /// Returns `false` without touching the buffer when it is full. Safe to
    /// call from interrupt context; completes in O(1) and never blocks.
    #[inline]
    pub fn try_put(&self, value: T) -> bool {
        // Only this context advances head, so a plain load is enough here.
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if head.wrapping_sub(tail) >= N as u32 {
            return false;
        }

        // SAFETY: single producer; the slot at head is not visible to the
        // consumer until the Release store below.
        unsafe {
            (*self.slots.get())[(head & Self::MASK) as usize] = value;
        }

        self.head.store(head.wrapping_add(1), Ordering::Release);
        true
    }

    /// Dequeue one value, oldest first.
    ///
    /// Returns `None` without touching the buffer when it is empty.
    #[inline]
    pub fn try_get(&self) -> Option<T> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        // SAFETY: single consumer; the producer will not reuse this slot
        // until the Release store of tail below.
        let value = unsafe { (*self.slots.get())[(tail & Self::MASK) as usize] };

        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(value)
    }

    /// Number of values currently queued.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail) as usize
    }

    /// Check whether the ring holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether another `try_put` would be rejected.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= N
    }

    /// Total number of slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T: Copy + Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let ring = RingBuffer::<u8, 8>::new(0);

        for b in b"AOS" {
            assert!(ring.try_put(*b));
        }

        assert_eq!(ring.try_get(), Some(b'A'));
        assert_eq!(ring.try_get(), Some(b'O'));
        assert_eq!(ring.try_get(), Some(b'S'));
        assert_eq!(ring.try_get(), None);
    }

    #[test]
    fn test_put_on_full_rejects_and_preserves_contents() {
        let ring = RingBuffer::<u8, 4>::new(0);

        for i in 0..4u8 {
            assert!(ring.try_put(i));
        }
        assert!(ring.is_full());
        assert_eq!(ring.len(), 4);

        assert!(!ring.try_put(99));
        assert_eq!(ring.len(), 4);

        for i in 0..4u8 {
            assert_eq!(ring.try_get(), Some(i));
        }
        assert_eq!(ring.try_get(), None);
    }

    #[test]
    fn test_get_on_empty_does_not_move_indices() {
        let ring = RingBuffer::<u8, 4>::new(0);

        assert_eq!(ring.try_get(), None);
        assert_eq!(ring.try_get(), None);
        assert_eq!(ring.len(), 0);

        assert!(ring.try_put(7));
        assert_eq!(ring.try_get(), Some(7));
    }

    #[test]
    fn test_wraparound_keeps_order() {
        let ring = RingBuffer::<u16, 4>::new(0);

        // Drive the indices well past one lap.
        for i in 0..100u16 {
            assert!(ring.try_put(i));
            assert_eq!(ring.try_get(), Some(i));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_len_tracks_puts_and_gets() {
        let ring = RingBuffer::<u8, 8>::new(0);
        assert_eq!(ring.capacity(), 8);

        for i in 0..5u8 {
            ring.try_put(i);
        }
        assert_eq!(ring.len(), 5);

        ring.try_get();
        ring.try_get();
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_spsc_threaded_stress() {
        use std::sync::Arc;
        use std::thread;

        let ring = Arc::new(RingBuffer::<u32, 64>::new(0));
        const COUNT: u32 = 10_000;

        let producer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                let mut next = 0u32;
                while next < COUNT {
                    if ring.try_put(next) {
                        next += 1;
                    } else {
                        thread::yield_now();
                    }
                }
            })
        };

        let mut expected = 0u32;
        while expected < COUNT {
            match ring.try_get() {
                Some(v) => {
                    assert_eq!(v, expected, "values must arrive in FIFO order");
                    expected += 1;
                }
                None => thread::yield_now(),
            }
        }

        producer.join().unwrap();
        assert!(ring.is_empty());
    }
}
