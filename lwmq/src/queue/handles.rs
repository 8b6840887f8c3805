use crate::error::{PopError, PushError};
use crate::message::{Message, MessageContainer, Variant};
use crate::spsc::{Consumer, Producer};

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Push-only view of one queue channel, held by that channel's producer
/// thread.
///
/// Obtained from [`MessageQueue::channel_input`](crate::MessageQueue::channel_input).
/// The handle can be moved to the producer thread but not shared or cloned.
/// Dropping it lets the channel be claimed again.
pub struct ProducerHandle<'q, M, const CAPACITY: usize> {
  producer: Producer<'q, MessageContainer<M>, CAPACITY>,
  claim: &'q AtomicBool,
  index: usize,
}

/// Pop-only view of one queue channel, held by the queue's consumer thread.
///
/// Obtained from [`MessageQueue::channel_output`](crate::MessageQueue::channel_output).
/// The intended loop reads [`pending_count`](Self::pending_count) and pops
/// exactly that many messages, or calls [`drain`](Self::drain) which does so.
pub struct ConsumerHandle<'q, M, const CAPACITY: usize> {
  consumer: Consumer<'q, MessageContainer<M>, CAPACITY>,
  claim: &'q AtomicBool,
  index: usize,
}

impl<'q, M: Message, const CAPACITY: usize> ProducerHandle<'q, M, CAPACITY> {
  pub(super) fn new(
    producer: Producer<'q, MessageContainer<M>, CAPACITY>,
    claim: &'q AtomicBool,
    index: usize,
  ) -> Self {
    ProducerHandle {
      producer,
      claim,
      index,
    }
  }

  /// Returns `true` if the channel cannot take another message.
  ///
  /// Meant for debug checks before pushing; a correctly sized queue never
  /// reports full.
  #[inline]
  pub fn is_full(&self) -> bool {
    self.producer.is_full()
  }

  /// Pushes `message`.
  ///
  /// # Panics
  ///
  /// Panics if the channel is full.
  #[inline]
  #[track_caller]
  pub fn push<V: Variant<M>>(&self, message: V) {
    self.producer.push(MessageContainer::new(message));
  }

  /// Pushes `message`, handing it back in `PushError::Full` when the channel
  /// has no free slot.
  #[inline]
  pub fn try_push<V: Variant<M>>(&self, message: V) -> Result<(), PushError<V>> {
    self
      .producer
      .try_push(MessageContainer::new(message))
      .map_err(|_| PushError::Full(message))
  }

  /// Pushes an already wrapped message.
  ///
  /// # Panics
  ///
  /// Panics if the channel is full.
  #[inline]
  #[track_caller]
  pub fn push_message(&self, message: M) {
    self.producer.push(MessageContainer::from_message(message));
  }

  /// Pushes `message` without the fullness check in release builds.
  ///
  /// # Safety
  ///
  /// The channel must not be full. Debug builds assert this.
  #[inline]
  pub unsafe fn push_unchecked<V: Variant<M>>(&self, message: V) {
    self.producer.push_unchecked(MessageContainer::new(message));
  }

  /// Unread messages in this channel.
  #[inline]
  pub fn occupancy(&self) -> usize {
    self.producer.occupancy()
  }

  /// Slots in this channel.
  #[inline]
  pub const fn capacity(&self) -> usize {
    CAPACITY
  }

  /// Index of the channel within its queue.
  #[inline]
  pub fn channel_index(&self) -> usize {
    self.index
  }
}

impl<'q, M: Message, const CAPACITY: usize> ConsumerHandle<'q, M, CAPACITY> {
  pub(super) fn new(
    consumer: Consumer<'q, MessageContainer<M>, CAPACITY>,
    claim: &'q AtomicBool,
    index: usize,
  ) -> Self {
    ConsumerHandle {
      consumer,
      claim,
      index,
    }
  }

  /// Messages ready to pop. Popping exactly this many never underflows.
  #[inline]
  pub fn pending_count(&self) -> usize {
    self.consumer.occupancy()
  }

  /// `pending_count() == 0`.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.consumer.is_empty()
  }

  /// Pops the oldest message.
  ///
  /// # Panics
  ///
  /// Panics if the channel is empty.
  #[inline]
  #[track_caller]
  pub fn pop(&self) -> MessageContainer<M> {
    self.consumer.pop()
  }

  /// Pops the oldest message, or returns `PopError::Empty`.
  #[inline]
  pub fn try_pop(&self) -> Result<MessageContainer<M>, PopError> {
    self.consumer.try_pop()
  }

  /// Pops the oldest message without the emptiness check in release builds.
  ///
  /// # Safety
  ///
  /// The channel must not be empty. Debug builds assert this.
  #[inline]
  pub unsafe fn pop_unchecked(&self) -> MessageContainer<M> {
    self.consumer.pop_unchecked()
  }

  /// Pops the messages pending at call time and passes each to `f`; returns
  /// how many were passed. Stops early if `f` pops from this handle.
  #[inline]
  pub fn drain<F: FnMut(MessageContainer<M>)>(&self, f: F) -> usize {
    self.consumer.drain(f)
  }

  /// Slots in this channel.
  #[inline]
  pub const fn capacity(&self) -> usize {
    CAPACITY
  }

  /// Index of the channel within its queue.
  #[inline]
  pub fn channel_index(&self) -> usize {
    self.index
  }
}

impl<M, const CAPACITY: usize> Drop for ProducerHandle<'_, M, CAPACITY> {
  fn drop(&mut self) {
    // Release: the next holder sees this one's write index.
    self.claim.store(false, Ordering::Release);
    tracing::trace!(channel = self.index, "producer handle released");
  }
}

impl<M, const CAPACITY: usize> Drop for ConsumerHandle<'_, M, CAPACITY> {
  fn drop(&mut self) {
    self.claim.store(false, Ordering::Release);
    tracing::trace!(channel = self.index, "consumer handle released");
  }
}

impl<M, const CAPACITY: usize> fmt::Debug for ProducerHandle<'_, M, CAPACITY> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ProducerHandle")
      .field("channel_index", &self.index)
      .field("producer", &self.producer)
      .finish()
  }
}

impl<M, const CAPACITY: usize> fmt::Debug for ConsumerHandle<'_, M, CAPACITY> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ConsumerHandle")
      .field("channel_index", &self.index)
      .field("consumer", &self.consumer)
      .finish()
  }
}
