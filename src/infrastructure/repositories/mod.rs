//! Repository Implementations
//!
//! PostgreSQL implementations of the domain repository traits.

mod channel_post_repository;
mod channel_repository;
mod directory_repository;
mod engagement;
mod follow_repository;
mod invitation_repository;
mod post_repository;
mod tag_repository;
mod user_repository;

pub use channel_post_repository::PgChannelPostRepository;
pub use channel_repository::PgChannelRepository;
pub use directory_repository::PgDirectoryRepository;
pub use follow_repository::PgFollowRepository;
pub use invitation_repository::PgInvitationRepository;
pub use post_repository::PgPostRepository;
pub use tag_repository::PgTagRepository;
pub use user_repository::PgUserRepository;
