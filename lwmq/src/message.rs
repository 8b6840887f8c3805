//! Typed message storage shared by every channel of a queue.
//!
//! A queue carries one closed set of message payloads, the *variant universe*.
//! The universe is a plain Rust enum implementing [`Message`]; each payload
//! struct implements [`Variant`] for it. [`MessageContainer`] is the slot type
//! the ring buffers store: one enum value, so the discriminator and payload are
//! written and copied together and can never disagree.
//!
//! The [`message_universe!`](crate::message_universe) macro generates all of the
//! above from a list of `Name(Payload)` pairs.

use crate::error::TagMismatch;

use core::fmt;
use core::hash::Hash;

/// A closed sum type of flat, copyable message payloads.
///
/// Implementors are normally generated by
/// [`message_universe!`](crate::message_universe).
pub trait Message: Copy + Send + 'static {
  /// Discriminator naming which payload a value holds.
  type Tag: Copy + Eq + Hash + fmt::Debug + Send + 'static;

  /// Returns the discriminator of the active payload.
  fn tag(&self) -> Self::Tag;
}

/// One payload type of a [`Message`] universe.
///
/// A payload struct may belong to a universe only once, so `TAG` is unique per
/// `(Self, M)` pair.
///
/// # Safety
///
/// `peek(m)` must return `Some` exactly when `m.tag() == Self::TAG`, and
/// `wrap(v).tag()` must equal `Self::TAG`.
/// [`MessageContainer::read_unchecked`] relies on this. Impls generated by
/// [`message_universe!`](crate::message_universe) uphold it.
pub unsafe trait Variant<M: Message>: Copy + Sized {
  /// The discriminator stored alongside this payload.
  const TAG: M::Tag;

  /// Wraps the payload into the universe's sum type.
  fn wrap(self) -> M;

  /// Borrows the payload out of `message` if it holds this variant.
  fn peek(message: &M) -> Option<&Self>;
}

/// Storage for one message of universe `M`, as kept in a channel slot.
///
/// Containers are populated by a push, copied out by a pop and never
/// reinterpreted: every accessor goes through the stored tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct MessageContainer<M> {
  message: M,
}

impl<M: Message> MessageContainer<M> {
  /// Builds a container holding `value`, tagged with `V::TAG`.
  #[inline]
  pub fn new<V: Variant<M>>(value: V) -> Self {
    MessageContainer {
      message: value.wrap(),
    }
  }

  /// Builds a container from an already wrapped message.
  #[inline]
  pub fn from_message(message: M) -> Self {
    MessageContainer { message }
  }

  /// Replaces the contents with `value` and its tag.
  #[inline]
  pub fn write<V: Variant<M>>(&mut self, value: V) {
    self.message = value.wrap();
  }

  /// Returns the discriminator of the stored payload.
  #[inline]
  pub fn tag(&self) -> M::Tag {
    self.message.tag()
  }

  /// Returns `true` if the container holds a `V`.
  #[inline]
  pub fn is<V: Variant<M>>(&self) -> bool {
    self.tag() == V::TAG
  }

  /// Checked access: `Some(&V)` if the container holds a `V`.
  #[inline]
  pub fn get<V: Variant<M>>(&self) -> Option<&V> {
    V::peek(&self.message)
  }

  /// Checked access reporting both tags on mismatch.
  pub fn try_read<V: Variant<M>>(&self) -> Result<&V, TagMismatch<M::Tag>> {
    V::peek(&self.message).ok_or(TagMismatch {
      expected: V::TAG,
      actual: self.tag(),
    })
  }

  /// Returns the stored payload as a `V`.
  ///
  /// The caller is expected to have dispatched on [`tag`](Self::tag) first.
  ///
  /// # Panics
  ///
  /// Panics if the container holds a different variant.
  #[inline]
  #[track_caller]
  pub fn read<V: Variant<M>>(&self) -> &V {
    match V::peek(&self.message) {
      Some(value) => value,
      None => {
        let actual = self.tag();
        tracing::error!(expected = ?V::TAG, ?actual, "message read with mismatched variant");
        panic!(
          "MessageContainer::read: expected {:?}, container holds {:?}",
          V::TAG,
          actual
        );
      }
    }
  }

  /// Returns the stored payload as a `V` without checking the tag in release
  /// builds.
  ///
  /// # Safety
  ///
  /// The container must hold a `V` (`self.is::<V>()`, which for a sound
  /// [`Variant`] impl is the same as `self.get::<V>().is_some()`). Debug builds
  /// assert the latter.
  #[inline]
  pub unsafe fn read_unchecked<V: Variant<M>>(&self) -> &V {
    debug_assert!(
      V::peek(&self.message).is_some(),
      "read_unchecked: expected {:?}, container holds {:?}",
      V::TAG,
      self.tag()
    );
    V::peek(&self.message).unwrap_unchecked()
  }

  /// Borrows the stored sum type, e.g. to `match` on it.
  #[inline]
  pub fn as_message(&self) -> &M {
    &self.message
  }

  /// Unwraps the stored sum type.
  #[inline]
  pub fn into_inner(self) -> M {
    self.message
  }
}

impl<M: Message> From<M> for MessageContainer<M> {
  #[inline]
  fn from(message: M) -> Self {
    MessageContainer { message }
  }
}

impl<M: Message + fmt::Debug> fmt::Debug for MessageContainer<M> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MessageContainer")
      .field("tag", &self.tag())
      .field("message", &self.message)
      .finish()
  }
}

/// Declares a message universe: the sum type, its tag enum, and the
/// [`Message`]/[`Variant`] impls tying them together.
///
/// `Clone` and `Copy` are derived on the generated enum; further attributes are
/// passed through. The tag enum is `#[repr(u32)]` with discriminators in
/// declaration order and derives `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`,
/// `Hash`, `PartialOrd` and `Ord`. Every payload type must be `Copy` and may
/// appear only once.
///
/// # Examples
///
/// ```
/// use lwmq::{message_universe, MessageContainer};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// pub struct Move {
///   pub dx: i32,
///   pub dy: i32,
/// }
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// pub struct Fire {
///   pub weapon: u8,
/// }
///
/// message_universe! {
///   #[derive(Debug, PartialEq)]
///   pub enum GameMessage: GameMessageType {
///     Move(Move),
///     Fire(Fire),
///   }
/// }
///
/// let container = MessageContainer::<GameMessage>::new(Fire { weapon: 2 });
/// assert_eq!(container.tag(), GameMessageType::Fire);
/// assert_eq!(GameMessageType::Fire.discriminant(), 1);
/// assert_eq!(container.get::<Fire>(), Some(&Fire { weapon: 2 }));
/// assert!(container.get::<Move>().is_none());
/// ```
#[macro_export]
macro_rules! message_universe {
  (
    $(#[$meta:meta])*
    $vis:vis enum $name:ident : $tag:ident {
      $( $(#[$vmeta:meta])* $variant:ident ( $payload:ty ) ),+ $(,)?
    }
  ) => {
    $(#[$meta])*
    #[derive(Clone, Copy)]
    $vis enum $name {
      $( $(#[$vmeta])* $variant($payload), )+
    }

    /// Discriminator of the generated message universe.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[repr(u32)]
    $vis enum $tag {
      $( $variant, )+
    }

    impl $tag {
      /// Stable numeric value of this tag (declaration order).
      #[allow(dead_code)]
      pub const fn discriminant(self) -> u32 {
        self as u32
      }
    }

    impl $crate::Message for $name {
      type Tag = $tag;

      #[inline]
      fn tag(&self) -> $tag {
        match self {
          $( $name::$variant(_) => $tag::$variant, )+
        }
      }
    }

    $(
      // SAFETY: `tag` and `peek` match on the same variant.
      unsafe impl $crate::Variant<$name> for $payload {
        const TAG: $tag = $tag::$variant;

        #[inline]
        fn wrap(self) -> $name {
          $name::$variant(self)
        }

        #[inline]
        #[allow(unreachable_patterns)]
        fn peek(message: &$name) -> ::core::option::Option<&Self> {
          match message {
            $name::$variant(value) => ::core::option::Option::Some(value),
            _ => ::core::option::Option::None,
          }
        }
      }
    )+
  };
}
