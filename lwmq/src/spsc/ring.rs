use crate::internal::cache_padded::CachePadded;

use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A fixed-capacity, wait-free single-producer/single-consumer ring buffer.
///
/// `CAPACITY` must be a non-zero power of two so index wraparound is a mask.
/// Anything else is rejected when the type is instantiated:
///
/// ```compile_fail
/// let channel = lwmq::BoundedChannel::<u32, 3>::new();
/// ```
///
/// The write index is owned by the producer and the read index by the
/// consumer; `occupancy` is the only field both sides modify, always with a
/// single atomic increment or decrement, so neither side ever retries.
///
/// Use [`split`](Self::split) to obtain the two endpoints. The
/// [`MessageQueue`](crate::MessageQueue) hands them out per channel instead.
pub struct BoundedChannel<T, const CAPACITY: usize> {
  buffer: Box<[UnsafeCell<MaybeUninit<T>>]>,
  write_index: CachePadded<UnsafeCell<usize>>, // producer only
  read_index: CachePadded<UnsafeCell<usize>>,  // consumer only
  occupancy: CachePadded<AtomicUsize>,
}

// Slots are handed from producer to consumer through `occupancy`
// (release increment / acquire load) and back through the release decrement.
unsafe impl<T: Send, const CAPACITY: usize> Sync for BoundedChannel<T, CAPACITY> {}

impl<T, const CAPACITY: usize> fmt::Debug for BoundedChannel<T, CAPACITY> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BoundedChannel")
      .field("capacity", &CAPACITY)
      .field("occupancy", &self.occupancy.load(Ordering::Relaxed))
      .finish_non_exhaustive()
  }
}

impl<T: Copy, const CAPACITY: usize> Default for BoundedChannel<T, CAPACITY> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Copy, const CAPACITY: usize> BoundedChannel<T, CAPACITY> {
  const MASK: usize = CAPACITY - 1;

  const CAPACITY_IS_POWER_OF_TWO: () = assert!(
    CAPACITY.is_power_of_two(),
    "BoundedChannel CAPACITY must be a non-zero power of two"
  );

  /// Allocates the slot storage. This is the only allocation the channel makes.
  pub fn new() -> Self {
    #[allow(clippy::let_unit_value)]
    let () = Self::CAPACITY_IS_POWER_OF_TWO;

    let buffer: Box<[UnsafeCell<MaybeUninit<T>>]> = (0..CAPACITY)
      .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
      .collect();

    BoundedChannel {
      buffer,
      write_index: CachePadded::new(UnsafeCell::new(0)),
      read_index: CachePadded::new(UnsafeCell::new(0)),
      occupancy: CachePadded::new(AtomicUsize::new(0)),
    }
  }

  /// Splits the channel into its producer and consumer endpoints.
  ///
  /// The exclusive borrow guarantees no other endpoint is alive.
  pub fn split(&mut self) -> (super::Producer<'_, T, CAPACITY>, super::Consumer<'_, T, CAPACITY>) {
    let this: &Self = self;
    // SAFETY: `&mut self` rules out any other endpoint for the borrow's duration.
    unsafe {
      (
        super::Producer::new_unchecked(this),
        super::Consumer::new_unchecked(this),
      )
    }
  }

  /// Number of slots.
  #[inline]
  pub const fn capacity(&self) -> usize {
    CAPACITY
  }

  /// Number of unread items. May be stale by the time the caller acts on it,
  /// but never overstates what the consumer can pop nor understates what the
  /// producer can push.
  #[inline]
  pub fn occupancy(&self) -> usize {
    self.occupancy.load(Ordering::Acquire)
  }

  /// `occupancy() == CAPACITY`.
  #[inline]
  pub fn is_full(&self) -> bool {
    self.occupancy() == CAPACITY
  }

  /// `occupancy() == 0`.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.occupancy() == 0
  }

  /// Stores `item` if a slot is free, otherwise hands it back.
  ///
  /// # Safety
  ///
  /// The caller must be the channel's only producer.
  #[inline]
  pub(crate) unsafe fn try_push(&self, item: T) -> Result<(), T> {
    if self.occupancy.load(Ordering::Acquire) == CAPACITY {
      return Err(item);
    }
    self.write_slot(item);
    Ok(())
  }

  /// Stores `item` without a fullness check in release builds.
  ///
  /// # Safety
  ///
  /// The caller must be the channel's only producer and the channel must not
  /// be full.
  #[inline]
  pub(crate) unsafe fn push_unchecked(&self, item: T) {
    // The acquire load is kept in release builds: it orders this slot write
    // after the consumer's read of the same slot.
    let occupied = self.occupancy.load(Ordering::Acquire);
    debug_assert!(
      occupied < CAPACITY,
      "push to a full channel (capacity {})",
      CAPACITY
    );
    self.write_slot(item);
  }

  /// Takes the oldest item if there is one.
  ///
  /// # Safety
  ///
  /// The caller must be the channel's only consumer.
  #[inline]
  pub(crate) unsafe fn try_pop(&self) -> Option<T> {
    if self.occupancy.load(Ordering::Acquire) == 0 {
      return None;
    }
    Some(self.read_slot())
  }

  /// Takes the oldest item without an emptiness check in release builds.
  ///
  /// # Safety
  ///
  /// The caller must be the channel's only consumer and the channel must not
  /// be empty.
  #[inline]
  pub(crate) unsafe fn pop_unchecked(&self) -> T {
    let occupied = self.occupancy.load(Ordering::Acquire);
    debug_assert!(occupied > 0, "pop from an empty channel");
    self.read_slot()
  }

  // Caller is the sole producer and has observed a free slot.
  #[inline]
  unsafe fn write_slot(&self, item: T) {
    let write = *self.write_index.get();
    debug_assert!(write < CAPACITY);
    (*self.buffer.get_unchecked(write).get()).write(item);
    *self.write_index.get() = (write + 1) & Self::MASK;
    // Publishes the slot contents together with the new count.
    self.occupancy.fetch_add(1, Ordering::Release);
  }

  // Caller is the sole consumer and has observed an occupied slot.
  #[inline]
  unsafe fn read_slot(&self) -> T {
    let read = *self.read_index.get();
    debug_assert!(read < CAPACITY);
    let item = (*self.buffer.get_unchecked(read).get()).assume_init_read();
    *self.read_index.get() = (read + 1) & Self::MASK;
    // Hands the slot back to the producer only after the copy above.
    self.occupancy.fetch_sub(1, Ordering::Release);
    item
  }
}
