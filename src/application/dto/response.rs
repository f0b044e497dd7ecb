//! Response DTOs
//!
//! View models for API response bodies. Resource keys are PascalCase with
//! `...ID` suffixes, envelopes and pagination are snake_case.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    Attachment, Career, Channel, ChannelDetails, ChannelInvitation, ChannelPostDetails,
    CommentWithAuthor, InvitationWithContext, LikeWithAuthor, MemberWithUser, Page, PostDetails,
    Tag, University, UniversityWithCareers, UserProfile, UserSummary,
};

/// `{"message": ...}`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
}

/// Author block embedded in posts, comments, likes and members
#[derive(Debug, Serialize)]
pub struct UserSummaryView {
    #[serde(rename = "UserID")]
    pub user_id: i64,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Avatar")]
    pub avatar: Option<String>,
}

impl From<UserSummary> for UserSummaryView {
    fn from(user: UserSummary) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            avatar: user.avatar_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NameView {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommentView {
    #[serde(rename = "CommentID")]
    pub comment_id: i64,
    #[serde(rename = "PostID")]
    pub post_id: i64,
    #[serde(rename = "UserID")]
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user: UserSummaryView,
}

impl From<CommentWithAuthor> for CommentView {
    fn from(c: CommentWithAuthor) -> Self {
        Self {
            comment_id: c.comment.id,
            post_id: c.comment.post_id,
            user_id: c.comment.user_id,
            content: c.comment.content,
            created_at: c.comment.created_at,
            user: c.author.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LikeView {
    #[serde(rename = "LikeID")]
    pub like_id: i64,
    #[serde(rename = "PostID")]
    pub post_id: i64,
    #[serde(rename = "UserID")]
    pub user_id: i64,
    pub liked_at: DateTime<Utc>,
    pub user: UserSummaryView,
}

impl From<LikeWithAuthor> for LikeView {
    fn from(l: LikeWithAuthor) -> Self {
        Self {
            like_id: l.like.id,
            post_id: l.like.post_id,
            user_id: l.like.user_id,
            liked_at: l.like.liked_at,
            user: l.author.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileView {
    #[serde(rename = "FileID")]
    pub file_id: i64,
    #[serde(rename = "FileURL")]
    pub file_url: String,
    pub file_type: String,
    pub file_name: String,
    #[serde(rename = "PostID")]
    pub post_id: i64,
}

impl From<Attachment> for FileView {
    fn from(f: Attachment) -> Self {
        Self {
            file_id: f.id,
            file_url: f.file_url,
            file_type: f.file_type,
            file_name: f.file_name,
            post_id: f.post_id,
        }
    }
}

fn views<T, V: From<T>>(items: Vec<T>) -> Vec<V> {
    items.into_iter().map(V::from).collect()
}

/// A feed post as rendered by every post listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PostView {
    #[serde(rename = "PostID")]
    pub post_id: i64,
    #[serde(rename = "UserID")]
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
    #[serde(rename = "UniversityID")]
    pub university_id: i64,
    #[serde(rename = "CareerID")]
    pub career_id: i64,
    pub university: NameView,
    pub career: NameView,
    pub user: UserSummaryView,
    pub comments: Vec<CommentView>,
    pub likes: Vec<LikeView>,
    pub files: Vec<FileView>,
}

impl From<PostDetails> for PostView {
    fn from(d: PostDetails) -> Self {
        Self {
            post_id: d.post.id,
            user_id: d.post.user_id,
            content: d.post.content,
            created_at: d.post.created_at,
            tags: d.post.tags,
            university_id: d.post.university_id,
            career_id: d.post.career_id,
            university: NameView {
                name: d.university_name.unwrap_or_default(),
            },
            career: NameView {
                name: d.career_name.unwrap_or_default(),
            },
            user: d.author.into(),
            comments: views(d.comments),
            likes: views(d.likes),
            files: views(d.files),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginationView {
    pub current_page: u32,
    pub total_pages: i64,
    pub page_size: u32,
    pub total_items: i64,
}

/// `{"posts": [...], "pagination": {...}}`
#[derive(Debug, Serialize)]
pub struct PostPageResponse {
    pub posts: Vec<PostView>,
    pub pagination: PaginationView,
}

impl From<Page<PostDetails>> for PostPageResponse {
    fn from(page: Page<PostDetails>) -> Self {
        let pagination = PaginationView {
            current_page: page.page,
            total_pages: page.total_pages(),
            page_size: page.page_size,
            total_items: page.total_items,
        };
        Self {
            posts: views(page.items),
            pagination,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostView>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub post: PostView,
}

#[derive(Debug, Serialize)]
pub struct CreatedPostResponse {
    pub message: String,
    pub post_id: i64,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub message: String,
    pub comment: CommentView,
}

/// Outcome of a like toggle
#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub message: String,
    pub liked: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelPostView {
    #[serde(rename = "PostID")]
    pub post_id: i64,
    #[serde(rename = "ChannelID")]
    pub channel_id: i64,
    #[serde(rename = "UserID")]
    pub user_id: i64,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserSummaryView,
    pub comments: Vec<CommentView>,
    pub likes: Vec<LikeView>,
    pub files: Vec<FileView>,
}

impl From<ChannelPostDetails> for ChannelPostView {
    fn from(d: ChannelPostDetails) -> Self {
        Self {
            post_id: d.post.id,
            channel_id: d.post.channel_id,
            user_id: d.post.user_id,
            content: d.post.content,
            tags: d.post.tags,
            created_at: d.post.created_at,
            updated_at: d.post.updated_at,
            user: d.author.into(),
            comments: views(d.comments),
            likes: views(d.likes),
            files: views(d.files),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChannelPostResponse {
    pub message: String,
    pub post: ChannelPostView,
}

#[derive(Debug, Serialize)]
pub struct ChannelPostListResponse {
    pub posts: Vec<ChannelPostView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CareerView {
    #[serde(rename = "CareerID")]
    pub career_id: i64,
    pub name: String,
    #[serde(rename = "UniversityID")]
    pub university_id: i64,
}

impl From<Career> for CareerView {
    fn from(c: Career) -> Self {
        Self {
            career_id: c.id,
            name: c.name,
            university_id: c.university_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UniversityView {
    #[serde(rename = "UniversityID")]
    pub university_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub careers: Option<Vec<CareerView>>,
}

impl From<University> for UniversityView {
    fn from(u: University) -> Self {
        Self {
            university_id: u.id,
            name: u.name,
            careers: None,
        }
    }
}

impl From<UniversityWithCareers> for UniversityView {
    fn from(u: UniversityWithCareers) -> Self {
        Self {
            careers: Some(views(u.careers)),
            ..u.university.into()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UniversitiesResponse {
    pub universities: Vec<UniversityView>,
}

#[derive(Debug, Serialize)]
pub struct UniversityResponse {
    pub university: UniversityView,
}

#[derive(Debug, Serialize)]
pub struct CareersResponse {
    pub careers: Vec<CareerView>,
}

#[derive(Debug, Serialize)]
pub struct CareerResponse {
    pub career: CareerView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagView {
    #[serde(rename = "TagID")]
    pub tag_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Tag> for TagView {
    fn from(t: Tag) -> Self {
        Self {
            tag_id: t.id,
            name: t.name,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemberView {
    #[serde(rename = "MemberID")]
    pub member_id: i64,
    #[serde(rename = "ChannelID")]
    pub channel_id: i64,
    #[serde(rename = "UserID")]
    pub user_id: i64,
    pub is_admin: bool,
    pub joined_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub user: UserSummaryView,
}

impl From<MemberWithUser> for MemberView {
    fn from(m: MemberWithUser) -> Self {
        Self {
            member_id: m.member.id,
            channel_id: m.member.channel_id,
            user_id: m.member.user_id,
            is_admin: m.member.is_admin,
            joined_at: m.member.joined_at,
            last_seen_at: m.member.last_seen_at,
            user: m.user.into(),
        }
    }
}

/// Channel columns without relations, used inside invitations
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelBriefView {
    #[serde(rename = "ChannelID")]
    pub channel_id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub created_by: i64,
    pub is_private: bool,
    #[serde(rename = "UniversityID")]
    pub university_id: i64,
    #[serde(rename = "CareerID")]
    pub career_id: i64,
}

impl From<Channel> for ChannelBriefView {
    fn from(c: Channel) -> Self {
        Self {
            channel_id: c.id,
            name: c.name,
            description: c.description,
            created_at: c.created_at,
            created_by: c.created_by,
            is_private: c.is_private,
            university_id: c.university_id,
            career_id: c.career_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelView {
    #[serde(flatten)]
    pub channel: ChannelBriefView,
    pub creator: UserSummaryView,
    pub university: Option<UniversityView>,
    pub career: Option<CareerView>,
    pub members: Vec<MemberView>,
}

impl From<ChannelDetails> for ChannelView {
    fn from(d: ChannelDetails) -> Self {
        Self {
            channel: d.channel.into(),
            creator: d.creator.into(),
            university: d.university.map(Into::into),
            career: d.career.map(Into::into),
            members: views(d.members),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub channel: ChannelView,
}

#[derive(Debug, Serialize)]
pub struct ChannelListResponse {
    pub channels: Vec<ChannelView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvitationView {
    #[serde(rename = "InvitationID")]
    pub invitation_id: i64,
    #[serde(rename = "ChannelID")]
    pub channel_id: i64,
    pub invited_by: i64,
    pub invited_user: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelBriefView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inviter: Option<UserSummaryView>,
}

impl From<ChannelInvitation> for InvitationView {
    fn from(i: ChannelInvitation) -> Self {
        Self {
            invitation_id: i.id,
            channel_id: i.channel_id,
            invited_by: i.invited_by,
            invited_user: i.invited_user,
            status: i.status.as_str().to_string(),
            created_at: i.created_at,
            updated_at: i.updated_at,
            channel: None,
            inviter: None,
        }
    }
}

impl From<InvitationWithContext> for InvitationView {
    fn from(i: InvitationWithContext) -> Self {
        Self {
            channel: Some(i.channel.into()),
            inviter: Some(i.inviter.into()),
            ..i.invitation.into()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub message: String,
    pub invitation: InvitationView,
}

#[derive(Debug, Serialize)]
pub struct InvitationListResponse {
    pub invitations: Vec<InvitationView>,
}

/// Profile page data. `Email` only appears on the caller's own profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProfileView {
    #[serde(rename = "UserID")]
    pub user_id: i64,
    pub username: String,
    pub account_name: String,
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub join_date: DateTime<Utc>,
    pub posts_count: i64,
    pub likes_received: i64,
    pub followers_count: i64,
    pub following_count: i64,
    #[serde(rename = "UniversityID")]
    pub university_id: Option<i64>,
    #[serde(rename = "CareerID")]
    pub career_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<NameView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career: Option<NameView>,
}

impl ProfileView {
    pub fn from_profile(profile: UserProfile, include_email: bool) -> Self {
        let UserProfile {
            user,
            university_name,
            career_name,
            stats,
        } = profile;
        Self {
            user_id: user.id,
            username: user.username,
            account_name: user.account_name,
            avatar: user.avatar_url,
            email: include_email.then_some(user.email),
            join_date: user.created_at,
            posts_count: stats.posts_count,
            likes_received: stats.likes_received,
            followers_count: stats.followers_count,
            following_count: stats.following_count,
            university_id: user.university_id,
            career_id: user.career_id,
            university: university_name.map(|name| NameView { name }),
            career: career_name.map(|name| NameView { name }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: ProfileView,
}

/// Outcome of a follow toggle
#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub message: String,
    pub following: bool,
}
