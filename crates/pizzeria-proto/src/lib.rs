//! Wire protocol and FIFO transport shared by the Reception and its Kitchens.
//!
//! A [`FramedChannel`] wraps one [`Fifo`] half and speaks length-prefixed
//! [`Message`] frames over it (spec.md §4.1, §4.2).

mod channel;
mod error;
mod fifo;
mod message;

pub use channel::FramedChannel;
pub use error::ProtoError;
pub use fifo::{Fifo, FifoMode};
pub use message::Message;
