#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! A lightweight, wait-free message queue from many producer threads to one
//! consumer thread.
//!
//! Every producer thread owns one bounded single-producer/single-consumer
//! channel of a [`MessageQueue`]; the consumer thread polls all of them.
//! Messages are small `Copy` structs from a closed set declared with
//! [`message_universe!`]. Push and pop copy a [`MessageContainer`] in or out of
//! a preallocated slot and bump one atomic counter: no locks, no allocation,
//! no retry loops.
//!
//! Channels never grow and never block. Pushing to a full channel or popping
//! an empty one is a caller bug: the plain `push`/`pop` panic, `try_push`/
//! `try_pop` return [`PushError`]/[`PopError`], and the `unsafe` `*_unchecked`
//! variants leave the check to debug builds.
//!
//! ```
//! use lwmq::{message_universe, MessageQueue};
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! pub struct Sample {
//!   pub sensor: u16,
//!   pub value: f32,
//! }
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! pub struct Fault {
//!   pub code: u32,
//! }
//!
//! message_universe! {
//!   pub enum Telemetry: TelemetryType {
//!     Sample(Sample),
//!     Fault(Fault),
//!   }
//! }
//!
//! let queue = MessageQueue::<Telemetry, 1024, 4>::new();
//! let input = queue.channel_input(0).unwrap();
//! let output = queue.channel_output(0).unwrap();
//!
//! assert!(!input.is_full());
//! input.push(Sample { sensor: 3, value: 21.5 });
//! input.push(Fault { code: 0xdead });
//!
//! assert_eq!(output.pending_count(), 2);
//! let first = output.pop();
//! assert_eq!(first.tag(), TelemetryType::Sample);
//! assert_eq!(first.read::<Sample>().sensor, 3);
//! assert_eq!(output.pop().get::<Fault>(), Some(&Fault { code: 0xdead }));
//! ```

pub mod error;
pub mod message;
pub mod queue;
pub mod spsc;
pub mod telemetry;

// Internal utilities - not part of public API
mod internal;

pub use error::{PopError, PushError, QueueError, TagMismatch};
pub use message::{Message, MessageContainer, Variant};
pub use queue::{ConsumerHandle, MessageQueue, ProducerHandle};
pub use spsc::BoundedChannel;

// Handles must be movable to their threads; the queue itself is shared by reference.
#[allow(dead_code)]
fn assert_send_sync<T: Send + Sync>() {}
#[allow(dead_code)]
fn assert_send<T: Send>() {}
#[allow(dead_code)]
fn static_assertions<M: Message>() {
  assert_send_sync::<MessageQueue<M, 8, 2>>();
  assert_send::<ProducerHandle<'static, M, 8>>();
  assert_send::<ConsumerHandle<'static, M, 8>>();
}
