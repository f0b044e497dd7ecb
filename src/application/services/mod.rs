//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, login, JWT tokens, password reset
//! - **PostService**: Public feed, search, likes and comments
//! - **ChannelService**: Channels, membership and invitations
//! - **ChannelPostService**: Posts inside a channel
//! - **DirectoryService**: Universities, careers and tags
//! - **UserService**: Profiles, password changes and follows

pub mod auth_service;
pub mod channel_post_service;
pub mod channel_service;
pub mod directory_service;
pub mod post_service;
pub mod user_service;
mod uploads;

// Re-export auth service types
pub use auth_service::{
    decode_token, issue_token, AuthError, AuthService, AuthServiceImpl, Claims, Credentials,
    Registration,
};

// Re-export post service types
pub use post_service::{
    CreatePostInput, PostError, PostService, PostServiceImpl, UpdatePostInput,
};

// Re-export channel service types
pub use channel_service::{ChannelError, ChannelService, ChannelServiceImpl, CreateChannelInput};

pub use channel_post_service::{
    ChannelPostError, ChannelPostService, ChannelPostServiceImpl, CreateChannelPostInput,
};

pub use directory_service::{DirectoryError, DirectoryService, DirectoryServiceImpl};

// Re-export user service types
pub use user_service::{UpdateProfileInput, UserError, UserService, UserServiceImpl};
