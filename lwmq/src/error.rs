// src/error.rs

//! Errors returned by the checked queue and channel operations.

use core::fmt;

// Gives value-carrying errors an `into_inner` plus Display/Error impls.
macro_rules! impl_error_for_enum_with_inner {
    (
        $enum_name:ident < $generic_param:ident >,
        $($variant:ident ( $message:expr ) ),+
        $(,)?
    ) => {
        impl<$generic_param> $enum_name<$generic_param> {
            /// Consumes the error, returning the rejected value.
            #[inline]
            pub fn into_inner(self) -> $generic_param {
                match self {
                    $( $enum_name::$variant(v) => v, )+
                }
            }
        }

        impl<$generic_param> fmt::Display for $enum_name<$generic_param> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( $enum_name::$variant(_) => f.write_str($message), )+
                }
            }
        }

        impl<$generic_param: fmt::Debug> std::error::Error for $enum_name<$generic_param> {}
    };
}

/// Error returned by `try_push` when the message could not be stored.
/// The rejected message is handed back.
#[derive(PartialEq, Eq, Clone, Copy)]
pub enum PushError<T> {
  /// The channel already holds `CAPACITY` unread messages.
  Full(T),
}

impl<T> fmt::Debug for PushError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PushError::Full(_) => write!(f, "PushError::Full(..)"),
    }
  }
}

impl_error_for_enum_with_inner!(PushError<T>, Full("channel full"));

/// Error returned by `try_pop` when there is nothing to read.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PopError {
  /// The channel holds no unread messages.
  Empty,
}
impl std::error::Error for PopError {}
impl fmt::Display for PopError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PopError::Empty => write!(f, "channel empty"),
    }
  }
}

/// Error returned when acquiring a channel handle from a `MessageQueue`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum QueueError {
  /// The requested channel index is not `< channels`.
  IndexOutOfRange {
    /// The rejected index.
    index: usize,
    /// Number of channels the queue owns.
    channels: usize,
  },
  /// A `ProducerHandle` for this channel is still alive.
  ProducerClaimed {
    /// The contested channel.
    index: usize,
  },
  /// A `ConsumerHandle` for this channel is still alive.
  ConsumerClaimed {
    /// The contested channel.
    index: usize,
  },
}
impl std::error::Error for QueueError {}
impl fmt::Display for QueueError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      QueueError::IndexOutOfRange { index, channels } => {
        write!(f, "channel index {} out of range (queue has {} channels)", index, channels)
      }
      QueueError::ProducerClaimed { index } => {
        write!(f, "channel {} already has a live producer handle", index)
      }
      QueueError::ConsumerClaimed { index } => {
        write!(f, "channel {} already has a live consumer handle", index)
      }
    }
  }
}

/// Error returned by checked container reads when the stored variant is not the
/// requested one.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct TagMismatch<Tag> {
  /// Tag of the variant the caller asked for.
  pub expected: Tag,
  /// Tag of the variant actually stored.
  pub actual: Tag,
}
impl<Tag: fmt::Debug> std::error::Error for TagMismatch<Tag> {}
impl<Tag: fmt::Debug> fmt::Display for TagMismatch<Tag> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "message tag mismatch: expected {:?}, container holds {:?}",
      self.expected, self.actual
    )
  }
}
