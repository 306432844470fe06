//! Tool (consumer) client runtime
//!
//! A tool registers with the central service like a producer does, installs
//! filters, and receives the matching records as they are pushed.

mod client;


pub use client::{ChannelReceiver, ToolClient, ToolRole};
