//! Many producers, one consumer: one [`BoundedChannel`] per producer thread.

mod handles;

pub use handles::{ConsumerHandle, ProducerHandle};

use crate::error::QueueError;
use crate::internal::cache_padded::CachePadded;
use crate::message::{Message, MessageContainer};
use crate::spsc::{BoundedChannel, Consumer, Producer};
use crate::telemetry;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

// A channel plus the flags recording which of its ends is handed out.
struct QueueChannel<M, const CAPACITY: usize> {
  channel: BoundedChannel<MessageContainer<M>, CAPACITY>,
  producer_claimed: CachePadded<AtomicBool>,
  consumer_claimed: CachePadded<AtomicBool>,
}

/// A fixed-size message queue carrying messages of universe `M` from
/// `CHANNELS` producer threads to a single consumer thread.
///
/// Each producer thread takes the [`ProducerHandle`] of its own channel; the
/// consumer thread takes a [`ConsumerHandle`] per channel and polls them, for
/// instance round-robin. Within a channel messages arrive in push order;
/// across channels there is no ordering.
///
/// Every channel is allocated up front by [`new`](Self::new). After that no
/// operation allocates, locks or waits. Channels never grow: size `CAPACITY`
/// so that no producer can get a full channel's worth ahead of the consumer.
///
/// At most one producer handle and one consumer handle per channel are alive
/// at any time; asking for a second one fails until the first is dropped.
///
/// # Examples
///
/// ```
/// use lwmq::{message_universe, MessageQueue};
/// use std::thread;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// pub struct Tick {
///   pub frame: u64,
/// }
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// pub struct Quit;
///
/// message_universe! {
///   pub enum Event: EventType {
///     Tick(Tick),
///     Quit(Quit),
///   }
/// }
///
/// let queue = MessageQueue::<Event, 64, 2>::new();
///
/// thread::scope(|s| {
///   for index in 0..queue.channels() {
///     let input = queue.channel_input(index).unwrap();
///     s.spawn(move || {
///       input.push(Tick { frame: index as u64 });
///       input.push(Quit);
///     });
///   }
/// });
///
/// let mut ticks = 0;
/// for output in queue.channel_outputs().unwrap() {
///   output.drain(|container| match container.tag() {
///     EventType::Tick => ticks += 1,
///     EventType::Quit => {}
///   });
/// }
/// assert_eq!(ticks, 2);
/// ```
pub struct MessageQueue<M, const CAPACITY: usize, const CHANNELS: usize> {
  channels: Box<[QueueChannel<M, CAPACITY>]>,
}

impl<M: Message, const CAPACITY: usize, const CHANNELS: usize> MessageQueue<M, CAPACITY, CHANNELS> {
  const HAS_CHANNELS: () = assert!(CHANNELS > 0, "MessageQueue CHANNELS must be at least 1");

  /// Allocates all `CHANNELS` channels of `CAPACITY` slots each.
  pub fn new() -> Self {
    #[allow(clippy::let_unit_value)]
    let () = Self::HAS_CHANNELS;

    let channels: Box<[QueueChannel<M, CAPACITY>]> = (0..CHANNELS)
      .map(|_| QueueChannel {
        channel: BoundedChannel::new(),
        producer_claimed: CachePadded::new(AtomicBool::new(false)),
        consumer_claimed: CachePadded::new(AtomicBool::new(false)),
      })
      .collect();

    tracing::debug!(
      channels = CHANNELS,
      capacity = CAPACITY,
      slot_bytes = std::mem::size_of::<MessageContainer<M>>(),
      "message queue allocated"
    );
    telemetry::log_event(None, "queue::MessageQueue::new", "Allocated", None);

    MessageQueue { channels }
  }

  /// Number of channels, i.e. of producer threads the queue serves.
  #[inline]
  pub const fn channels(&self) -> usize {
    CHANNELS
  }

  /// Slots per channel.
  #[inline]
  pub const fn capacity(&self) -> usize {
    CAPACITY
  }

  /// Returns the producer handle of channel `index`.
  ///
  /// # Errors
  ///
  /// - `QueueError::IndexOutOfRange` if `index >= CHANNELS`.
  /// - `QueueError::ProducerClaimed` if a producer handle for this channel is
  ///   still alive.
  pub fn channel_input(&self, index: usize) -> Result<ProducerHandle<'_, M, CAPACITY>, QueueError> {
    let slot = self.slot(index, "queue::MessageQueue::channel_input")?;
    if slot
      .producer_claimed
      .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
      .is_err()
    {
      tracing::warn!(channel = index, "producer handle requested twice");
      telemetry::log_event(
        Some(index),
        "queue::MessageQueue::channel_input",
        "ProducerClaimed",
        None,
      );
      return Err(QueueError::ProducerClaimed { index });
    }
    tracing::trace!(channel = index, "producer handle claimed");

    // SAFETY: the claim flag was just taken; it is released when the handle drops.
    let producer = unsafe { Producer::new_unchecked(&slot.channel) };
    Ok(ProducerHandle::new(producer, &slot.producer_claimed, index))
  }

  /// Returns the consumer handle of channel `index`.
  ///
  /// # Errors
  ///
  /// - `QueueError::IndexOutOfRange` if `index >= CHANNELS`.
  /// - `QueueError::ConsumerClaimed` if a consumer handle for this channel is
  ///   still alive.
  pub fn channel_output(&self, index: usize) -> Result<ConsumerHandle<'_, M, CAPACITY>, QueueError> {
    let slot = self.slot(index, "queue::MessageQueue::channel_output")?;
    if slot
      .consumer_claimed
      .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
      .is_err()
    {
      tracing::warn!(channel = index, "consumer handle requested twice");
      telemetry::log_event(
        Some(index),
        "queue::MessageQueue::channel_output",
        "ConsumerClaimed",
        None,
      );
      return Err(QueueError::ConsumerClaimed { index });
    }
    tracing::trace!(channel = index, "consumer handle claimed");

    // SAFETY: as in `channel_input`, for the consumer flag.
    let consumer = unsafe { Consumer::new_unchecked(&slot.channel) };
    Ok(ConsumerHandle::new(consumer, &slot.consumer_claimed, index))
  }

  /// Claims the consumer handle of every channel, in index order. Intended
  /// for the consumer thread's setup; nothing is claimed if any channel fails.
  pub fn channel_outputs(&self) -> Result<Vec<ConsumerHandle<'_, M, CAPACITY>>, QueueError> {
    (0..CHANNELS).map(|index| self.channel_output(index)).collect()
  }

  /// Unread messages in channel `index`, or `None` for an invalid index.
  pub fn occupancy(&self, index: usize) -> Option<usize> {
    self.channels.get(index).map(|slot| slot.channel.occupancy())
  }

  fn slot(&self, index: usize, location: &'static str) -> Result<&QueueChannel<M, CAPACITY>, QueueError> {
    self.channels.get(index).ok_or_else(|| {
      tracing::warn!(channel = index, channels = CHANNELS, "channel index out of range");
      telemetry::log_event(Some(index), location, "IndexOutOfRange", None);
      QueueError::IndexOutOfRange {
        index,
        channels: CHANNELS,
      }
    })
  }
}

impl<M: Message, const CAPACITY: usize, const CHANNELS: usize> Default
  for MessageQueue<M, CAPACITY, CHANNELS>
{
  fn default() -> Self {
    Self::new()
  }
}

impl<M: Message, const CAPACITY: usize, const CHANNELS: usize> fmt::Debug
  for MessageQueue<M, CAPACITY, CHANNELS>
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let occupancy: Vec<usize> = self
      .channels
      .iter()
      .map(|slot| slot.channel.occupancy())
      .collect();
    f.debug_struct("MessageQueue")
      .field("channels", &CHANNELS)
      .field("capacity", &CAPACITY)
      .field("occupancy", &occupancy)
      .finish()
  }
}
