//! # Domain Entities
//!
//! Core domain entities representing the main business objects of the
//! network. All entities map directly to their corresponding database tables.
//!
//! ## Core Entities
//!
//! - **User**: account with authentication data, profile and directory scoping
//! - **Post**: feed post with comments, likes, attachments and tags
//! - **Channel**: group space with members, invitations and its own posts
//! - **University / Career**: the directory every post and channel is scoped to
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod channel;
mod channel_post;
mod directory;
mod follow;
mod invitation;
mod post;
mod tag;
mod user;

pub use user::{NewUser, ProfileStats, ProfileUpdate, User, UserProfile, UserRepository, UserSummary};

pub use directory::{Career, DirectoryRepository, University, UniversityWithCareers};

pub use tag::{Tag, TagRepository, DEFAULT_TAGS};

pub use post::{
    Attachment, Comment, CommentWithAuthor, Like, LikeWithAuthor, NewAttachment, NewPost, Post,
    PostDetails, PostRepository, PostSearch, PostTags, PostUpdate,
};

pub use channel::{
    Channel, ChannelDetails, ChannelMember, ChannelRepository, MemberWithUser, NewChannel,
};

pub use invitation::{
    ChannelInvitation, InvitationAction, InvitationRepository, InvitationStatus,
    InvitationWithContext,
};

pub use channel_post::{ChannelPost, ChannelPostDetails, ChannelPostRepository, NewChannelPost};

pub use follow::FollowRepository;
