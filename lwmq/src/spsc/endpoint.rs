use crate::error::{PopError, PushError};
use crate::spsc::ring::BoundedChannel;
use crate::telemetry;

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;

/// The writing end of a [`BoundedChannel`].
///
/// `Send` but not `Sync` or `Clone`: one thread at a time drives a producer.
pub struct Producer<'a, T, const CAPACITY: usize> {
  channel: &'a BoundedChannel<T, CAPACITY>,
  _not_sync: PhantomData<Cell<()>>,
}

/// The reading end of a [`BoundedChannel`].
///
/// `Send` but not `Sync` or `Clone`: one thread at a time drives a consumer.
pub struct Consumer<'a, T, const CAPACITY: usize> {
  channel: &'a BoundedChannel<T, CAPACITY>,
  _not_sync: PhantomData<Cell<()>>,
}

impl<T, const CAPACITY: usize> fmt::Debug for Producer<'_, T, CAPACITY> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Producer").field("channel", self.channel).finish()
  }
}

impl<T, const CAPACITY: usize> fmt::Debug for Consumer<'_, T, CAPACITY> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Consumer").field("channel", self.channel).finish()
  }
}

impl<'a, T: Copy, const CAPACITY: usize> Producer<'a, T, CAPACITY> {
  /// # Safety
  ///
  /// No other producer for `channel` may exist while this one is alive.
  #[inline]
  pub(crate) unsafe fn new_unchecked(channel: &'a BoundedChannel<T, CAPACITY>) -> Self {
    Producer {
      channel,
      _not_sync: PhantomData,
    }
  }

  /// Appends `item`.
  ///
  /// # Panics
  ///
  /// Panics if the channel is full. A full channel means it was sized too
  /// small; the item is never written over an unread one.
  #[inline]
  #[track_caller]
  pub fn push(&self, item: T) {
    if self.try_push(item).is_err() {
      tracing::error!(capacity = CAPACITY, "push to a full channel");
      panic!("push to a full channel (capacity {})", CAPACITY);
    }
  }

  /// Appends `item`, or returns it in `PushError::Full` if no slot is free.
  #[inline]
  pub fn try_push(&self, item: T) -> Result<(), PushError<T>> {
    // SAFETY: this is the only producer.
    match unsafe { self.channel.try_push(item) } {
      Ok(()) => Ok(()),
      Err(item) => {
        tracing::debug!(capacity = CAPACITY, "push rejected: channel full");
        telemetry::increment_counter("spsc::Producer::try_push", "rejected_full");
        Err(PushError::Full(item))
      }
    }
  }

  /// Appends `item` without checking for space in release builds.
  ///
  /// # Safety
  ///
  /// The channel must not be full. Debug builds assert this.
  #[inline]
  pub unsafe fn push_unchecked(&self, item: T) {
    self.channel.push_unchecked(item);
  }

  /// Returns `true` if no slot is free. Advisory; the value may already be
  /// stale, but only in the direction of freeing up.
  #[inline]
  pub fn is_full(&self) -> bool {
    self.channel.is_full()
  }

  /// Number of unread items.
  #[inline]
  pub fn occupancy(&self) -> usize {
    self.channel.occupancy()
  }

  /// Number of slots.
  #[inline]
  pub const fn capacity(&self) -> usize {
    CAPACITY
  }
}

impl<'a, T: Copy, const CAPACITY: usize> Consumer<'a, T, CAPACITY> {
  /// # Safety
  ///
  /// No other consumer for `channel` may exist while this one is alive.
  #[inline]
  pub(crate) unsafe fn new_unchecked(channel: &'a BoundedChannel<T, CAPACITY>) -> Self {
    Consumer {
      channel,
      _not_sync: PhantomData,
    }
  }

  /// Number of items ready to pop. Only grows behind the consumer's back, so
  /// popping exactly this many never underflows.
  #[inline]
  pub fn occupancy(&self) -> usize {
    self.channel.occupancy()
  }

  /// `occupancy() == 0`.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.channel.is_empty()
  }

  /// Removes the oldest item.
  ///
  /// # Panics
  ///
  /// Panics if the channel is empty.
  #[inline]
  #[track_caller]
  pub fn pop(&self) -> T {
    match self.try_pop() {
      Ok(item) => item,
      Err(PopError::Empty) => {
        tracing::error!(capacity = CAPACITY, "pop from an empty channel");
        panic!("pop from an empty channel");
      }
    }
  }

  /// Removes the oldest item, or returns `PopError::Empty`.
  #[inline]
  pub fn try_pop(&self) -> Result<T, PopError> {
    // SAFETY: this is the only consumer.
    match unsafe { self.channel.try_pop() } {
      Some(item) => Ok(item),
      None => {
        telemetry::increment_counter("spsc::Consumer::try_pop", "rejected_empty");
        Err(PopError::Empty)
      }
    }
  }

  /// Removes the oldest item without checking for one in release builds.
  ///
  /// # Safety
  ///
  /// The channel must not be empty. Debug builds assert this.
  #[inline]
  pub unsafe fn pop_unchecked(&self) -> T {
    self.channel.pop_unchecked()
  }

  /// Pops at most the items pending at the time of the call and feeds them to
  /// `f` in order. Items pushed meanwhile are left for the next call, so this
  /// always returns. Stops early if `f` pops from this consumer itself.
  /// Returns the number of items handed to `f`.
  pub fn drain<F: FnMut(T)>(&self, mut f: F) -> usize {
    let pending = self.channel.occupancy();
    let mut drained = 0;
    while drained < pending {
      // SAFETY: this is the only consumer. `f` may pop through `&self`, so
      // every step re-checks occupancy.
      match unsafe { self.channel.try_pop() } {
        Some(item) => f(item),
        None => break,
      }
      drained += 1;
    }
    drained
  }

  /// Number of slots.
  #[inline]
  pub const fn capacity(&self) -> usize {
    CAPACITY
  }
}
