// src/internal/cache_padded.rs

//! Cache line padding for the ring's index and counter fields.

use core::ops::Deref;

#[allow(dead_code)]
#[repr(C)]
#[repr(align(64))]
pub(crate) struct AlignedInner64<T> {
  value: T,
}

#[allow(dead_code)]
#[repr(C)]
#[repr(align(128))]
pub(crate) struct AlignedInner128<T> {
  value: T,
}

// Apple silicon and recent x86_64 parts prefetch cache lines in adjacent pairs,
// so the producer and consumer halves are kept 128 bytes apart there.
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
mod arch_details {
  pub type ArchAligned<T> = super::AlignedInner128<T>;
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
mod arch_details {
  pub type ArchAligned<T> = super::AlignedInner64<T>;
}

/// A type `T` padded to the length of a cache line.
pub(crate) struct CachePadded<T> {
  inner: arch_details::ArchAligned<T>,
}

impl<T> CachePadded<T> {
  /// Creates a new cache-padded value.
  #[inline]
  pub(crate) const fn new(value: T) -> Self {
    CachePadded {
      inner: arch_details::ArchAligned { value },
    }
  }
}

impl<T> Deref for CachePadded<T> {
  type Target = T;
  #[inline]
  fn deref(&self) -> &T {
    &self.inner.value
  }
}
