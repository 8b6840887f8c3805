//! The wait-free single-producer/single-consumer ring buffer every queue
//! channel is built on. Usable on its own for any `Copy` element type.

mod endpoint;
mod ring;

pub use endpoint::{Consumer, Producer};
pub use ring::BoundedChannel;
