//! Channel access rules.

use crate::domain::entities::{ChannelMember, ChannelPost};

/// Domain service deciding what a caller may do inside a channel.
///
/// Every rule takes the caller's membership row (if any); having no row
/// denies everything.
pub struct ChannelPolicy;

impl ChannelPolicy {
    /// Members can read the channel and its posts, and write posts, comments and likes.
    pub fn can_participate(member: Option<&ChannelMember>) -> bool {
        member.is_some()
    }

    /// Only admins invite.
    pub fn can_invite(member: Option<&ChannelMember>) -> bool {
        member.is_some_and(|m| m.is_admin)
    }

    /// Authors delete their own posts; admins delete any post in the channel.
    pub fn can_delete_post(post: &ChannelPost, actor_id: i64, member: Option<&ChannelMember>) -> bool {
        match member {
            Some(m) if m.channel_id == post.channel_id => m.is_admin || post.user_id == actor_id,
            _ => false,
        }
    }
}
