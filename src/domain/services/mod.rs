//! Domain services: rules that span several entities.

mod channel_policy;

pub use channel_policy::ChannelPolicy;
