//! In-memory repositories for service tests.
//!
//! One [`MemoryStore`] implements every repository trait so a test can hand
//! the same `Arc` to each service parameter and observe cross-table effects
//! (likes received, memberships created by invitations, ...).

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

use crate::application::services::auth_service::hash_password;
use crate::domain::*;
use crate::shared::error::AppError;

static SEED_HASH: Lazy<String> = Lazy::new(|| {
    hash_password(MemoryStore::SEED_PASSWORD).expect("hashing the seed password")
});

#[derive(Default)]
struct State {
    next_id: i64,
    users: Vec<User>,
    universities: Vec<University>,
    careers: Vec<Career>,
    tags: Vec<Tag>,
    posts: Vec<Post>,
    post_tags: Vec<(i64, i64)>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    files: Vec<Attachment>,
    follows: Vec<(i64, i64)>,
    channels: Vec<Channel>,
    members: Vec<ChannelMember>,
    invitations: Vec<ChannelInvitation>,
    channel_posts: Vec<ChannelPost>,
    channel_comments: Vec<Comment>,
    channel_likes: Vec<Like>,
    channel_files: Vec<Attachment>,
    fail_post_write: bool,
}

impl State {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn summary(&self, user_id: i64) -> UserSummary {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(User::summary)
            .unwrap_or(UserSummary {
                id: user_id,
                username: String::new(),
                avatar_url: None,
            })
    }

    fn university_name(&self, id: i64) -> Option<String> {
        self.universities.iter().find(|u| u.id == id).map(|u| u.name.clone())
    }

    fn career_name(&self, id: i64) -> Option<String> {
        self.careers.iter().find(|c| c.id == id).map(|c| c.name.clone())
    }

    fn comments_of(&self, comments: &[Comment], post_id: i64) -> Vec<CommentWithAuthor> {
        comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| CommentWithAuthor {
                comment: c.clone(),
                author: self.summary(c.user_id),
            })
            .collect()
    }

    fn likes_of(&self, likes: &[Like], post_id: i64) -> Vec<LikeWithAuthor> {
        likes
            .iter()
            .filter(|l| l.post_id == post_id)
            .map(|l| LikeWithAuthor {
                like: l.clone(),
                author: self.summary(l.user_id),
            })
            .collect()
    }

    fn post_details(&self, post: &Post) -> PostDetails {
        PostDetails {
            post: post.clone(),
            author: self.summary(post.user_id),
            university_name: self.university_name(post.university_id),
            career_name: self.career_name(post.career_id),
            comments: self.comments_of(&self.comments, post.id),
            likes: self.likes_of(&self.likes, post.id),
            files: self.files.iter().filter(|f| f.post_id == post.id).cloned().collect(),
        }
    }

    fn channel_post_details(&self, post: &ChannelPost) -> ChannelPostDetails {
        ChannelPostDetails {
            post: post.clone(),
            author: self.summary(post.user_id),
            comments: self.comments_of(&self.channel_comments, post.id),
            likes: self.likes_of(&self.channel_likes, post.id),
            files: self
                .channel_files
                .iter()
                .filter(|f| f.post_id == post.id)
                .cloned()
                .collect(),
        }
    }

    fn channel_details(&self, channel: &Channel) -> ChannelDetails {
        ChannelDetails {
            channel: channel.clone(),
            creator: self.summary(channel.created_by),
            university: self
                .universities
                .iter()
                .find(|u| u.id == channel.university_id)
                .cloned(),
            career: self.careers.iter().find(|c| c.id == channel.career_id).cloned(),
            members: self
                .members
                .iter()
                .filter(|m| m.channel_id == channel.id)
                .map(|m| MemberWithUser {
                    member: m.clone(),
                    user: self.summary(m.user_id),
                })
                .collect(),
        }
    }

    fn sorted_posts(&self, author: Option<i64>) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .iter()
            .filter(|p| author.is_none_or(|a| p.user_id == a))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }

    fn add_member(&mut self, channel_id: i64, user_id: i64, is_admin: bool) {
        if self
            .members
            .iter()
            .any(|m| m.channel_id == channel_id && m.user_id == user_id)
        {
            return;
        }
        let now = Utc::now();
        let id = self.id();
        self.members.push(ChannelMember {
            id,
            channel_id,
            user_id,
            is_admin,
            joined_at: now,
            last_seen_at: now,
        });
    }

    fn set_invitation_status(
        &mut self,
        id: i64,
        status: InvitationStatus,
    ) -> Option<ChannelInvitation> {
        let invitation = self
            .invitations
            .iter_mut()
            .find(|i| i.id == id && i.is_pending())?;
        invitation.status = status;
        invitation.updated_at = Utc::now();
        Some(invitation.clone())
    }
}

fn toggle_in(likes: &mut Vec<Like>, next_id: i64, post_id: i64, user_id: i64) -> Toggle {
    if let Some(pos) = likes
        .iter()
        .position(|l| l.post_id == post_id && l.user_id == user_id)
    {
        likes.remove(pos);
        Toggle::Removed
    } else {
        likes.push(Like {
            id: next_id,
            post_id,
            user_id,
            liked_at: Utc::now(),
        });
        Toggle::Added
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Password of every account created by [`MemoryStore::seed_user`].
    pub const SEED_PASSWORD: &'static str = "secreto123";

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("memory store lock poisoned")
    }

    /// Tag ids linked to a feed post, in link order.
    pub fn post_tag_ids(&self, post_id: i64) -> Vec<i64> {
        self.lock()
            .post_tags
            .iter()
            .filter(|(p, _)| *p == post_id)
            .map(|(_, t)| *t)
            .collect()
    }

    /// Make the next post insert fail as a database error would.
    pub fn fail_next_post_write(&self) {
        self.lock().fail_post_write = true;
    }

    /// Account with email `<username>@example.com`.
    pub async fn seed_user(&self, username: &str) -> User {
        let mut state = self.lock();
        let now = Utc::now();
        let user = User {
            id: state.id(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: SEED_HASH.clone(),
            account_name: username.to_string(),
            created_at: now,
            updated_at: now,
            ..Default::default()
        };
        state.users.push(user.clone());
        user
    }

    /// Career under the named university, creating the university if needed.
    pub async fn seed_career(&self, university: &str, career: &str) -> (University, Career) {
        let mut state = self.lock();
        let university = match state.universities.iter().find(|u| u.name == university) {
            Some(u) => u.clone(),
            None => {
                let u = University {
                    id: state.id(),
                    name: university.to_string(),
                };
                state.universities.push(u.clone());
                u
            }
        };
        let career = Career {
            id: state.id(),
            name: career.to_string(),
            university_id: university.id,
        };
        state.careers.push(career.clone());
        (university, career)
    }

    pub async fn seed_post(&self, user_id: i64, career_id: i64, content: &str) -> i64 {
        let mut state = self.lock();
        let university_id = state
            .careers
            .iter()
            .find(|c| c.id == career_id)
            .map(|c| c.university_id)
            .unwrap_or_default();
        let id = state.id();
        state.posts.push(Post {
            id,
            user_id,
            content: content.to_string(),
            tags: Vec::new(),
            university_id,
            career_id,
            created_at: Utc::now(),
        });
        id
    }

    pub async fn seed_like(&self, post_id: i64, user_id: i64) {
        let mut state = self.lock();
        let id = state.id();
        toggle_in(&mut state.likes, id, post_id, user_id);
    }

    /// Channel administered by `admin`, with plain `members`.
    pub async fn seed_channel(&self, admin: i64, members: &[i64]) -> i64 {
        let mut state = self.lock();
        let id = state.id();
        state.channels.push(Channel {
            id,
            name: "Canal".into(),
            description: String::new(),
            created_by: admin,
            is_private: true,
            university_id: 0,
            career_id: 0,
            created_at: Utc::now(),
        });
        state.add_member(id, admin, true);
        for user in members {
            state.add_member(id, *user, false);
        }
        id
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut state = self.lock();
        if state
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AppError::BadRequest("Username or email already exists".into()));
        }
        let now = Utc::now();
        let created = User {
            id: state.id(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            account_name: user.account_name,
            avatar_url: user.avatar_url,
            created_at: now,
            updated_at: now,
            ..Default::default()
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn set_reset_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut state = self.lock();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            user.reset_token_hash = Some(token_hash.to_string());
            user.reset_token_expires_at = Some(expires_at);
        }
        Ok(())
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.reset_token_matches(token_hash, now))
            .cloned())
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), AppError> {
        let mut state = self.lock();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            user.password_hash = password_hash.to_string();
            user.reset_token_hash = None;
            user.reset_token_expires_at = None;
        }
        Ok(())
    }

    async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> Result<User, AppError> {
        let mut state = self.lock();
        if let Some(name) = &update.username {
            if state.users.iter().any(|u| u.id != user_id && &u.username == name) {
                return Err(AppError::BadRequest("Username or email already exists".into()));
            }
        }
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        user.avatar_url = Some(update.avatar_url);
        user.university_id = Some(update.university_id);
        user.career_id = Some(update.career_id);
        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(account_name) = update.account_name {
            user.account_name = account_name;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn find_profile(&self, user_id: i64) -> Result<Option<UserProfile>, AppError> {
        let state = self.lock();
        let Some(user) = state.users.iter().find(|u| u.id == user_id).cloned() else {
            return Ok(None);
        };
        let own_posts: Vec<i64> = state
            .posts
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.id)
            .collect();
        let stats = ProfileStats {
            posts_count: own_posts.len() as i64,
            likes_received: state
                .likes
                .iter()
                .filter(|l| own_posts.contains(&l.post_id))
                .count() as i64,
            followers_count: state.follows.iter().filter(|(_, to)| *to == user_id).count() as i64,
            following_count: state.follows.iter().filter(|(from, _)| *from == user_id).count()
                as i64,
        };
        Ok(Some(UserProfile {
            university_name: user.university_id.and_then(|id| state.university_name(id)),
            career_name: user.career_id.and_then(|id| state.career_name(id)),
            user,
            stats,
        }))
    }
}

#[async_trait]
impl DirectoryRepository for MemoryStore {
    async fn list_universities(&self) -> Result<Vec<UniversityWithCareers>, AppError> {
        let state = self.lock();
        let mut universities = state.universities.clone();
        universities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(universities
            .into_iter()
            .map(|university| {
                let mut careers: Vec<Career> = state
                    .careers
                    .iter()
                    .filter(|c| c.university_id == university.id)
                    .cloned()
                    .collect();
                careers.sort_by(|a, b| a.name.cmp(&b.name));
                UniversityWithCareers {
                    university,
                    careers,
                }
            })
            .collect())
    }

    async fn find_university(&self, id: i64) -> Result<Option<University>, AppError> {
        Ok(self.lock().universities.iter().find(|u| u.id == id).cloned())
    }

    async fn list_careers(&self) -> Result<Vec<Career>, AppError> {
        let mut careers = self.lock().careers.clone();
        careers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(careers)
    }

    async fn careers_of(&self, university_id: i64) -> Result<Vec<Career>, AppError> {
        let mut careers: Vec<Career> = self
            .lock()
            .careers
            .iter()
            .filter(|c| c.university_id == university_id)
            .cloned()
            .collect();
        careers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(careers)
    }

    async fn find_career(&self, id: i64) -> Result<Option<Career>, AppError> {
        Ok(self.lock().careers.iter().find(|c| c.id == id).cloned())
    }

    async fn create_university(&self, name: &str) -> Result<University, AppError> {
        let mut state = self.lock();
        if state.universities.iter().any(|u| u.name == name) {
            return Err(AppError::BadRequest("University already exists".into()));
        }
        let university = University {
            id: state.id(),
            name: name.to_string(),
        };
        state.universities.push(university.clone());
        Ok(university)
    }

    async fn create_career(&self, university_id: i64, name: &str) -> Result<Career, AppError> {
        let mut state = self.lock();
        if !state.universities.iter().any(|u| u.id == university_id) {
            return Err(AppError::NotFound("University not found".into()));
        }
        let career = Career {
            id: state.id(),
            name: name.to_string(),
            university_id,
        };
        state.careers.push(career.clone());
        Ok(career)
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.lock().tags.len() as i64)
    }

    async fn insert_missing(&self, names: &[&str]) -> Result<(), AppError> {
        let mut state = self.lock();
        for name in names {
            if !state.tags.iter().any(|t| t.name == *name) {
                let id = state.id();
                state.tags.push(Tag {
                    id,
                    name: name.to_string(),
                    created_at: Utc::now(),
                });
            }
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Tag>, AppError> {
        let mut tags = self.lock().tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>, AppError> {
        Ok(self
            .lock()
            .tags
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        Ok(self.lock().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_details(&self, id: i64) -> Result<Option<PostDetails>, AppError> {
        let state = self.lock();
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| state.post_details(p)))
    }

    async fn list(
        &self,
        author: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostDetails>, AppError> {
        let state = self.lock();
        Ok(state
            .sorted_posts(author)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|p| state.post_details(p))
            .collect())
    }

    async fn count(&self, author: Option<i64>) -> Result<i64, AppError> {
        Ok(self.lock().sorted_posts(author).len() as i64)
    }

    async fn search(&self, filter: &PostSearch) -> Result<Vec<PostDetails>, AppError> {
        let state = self.lock();
        Ok(state
            .sorted_posts(None)
            .into_iter()
            .filter(|p| filter.matches(p))
            .map(|p| state.post_details(p))
            .collect())
    }

    async fn create(&self, post: NewPost, files: Vec<NewAttachment>) -> Result<Post, AppError> {
        let mut state = self.lock();
        if std::mem::take(&mut state.fail_post_write) {
            return Err(AppError::Internal("simulated write failure".into()));
        }
        let created = Post {
            id: state.id(),
            user_id: post.user_id,
            content: post.content,
            tags: post.tags,
            university_id: post.university_id,
            career_id: post.career_id,
            created_at: Utc::now(),
        };
        for file in files {
            let id = state.id();
            state.files.push(Attachment {
                id,
                post_id: created.id,
                file_url: file.file_url,
                file_type: file.file_type,
                file_name: file.file_name,
            });
        }
        for tag_id in post.tag_ids {
            state.post_tags.push((created.id, tag_id));
        }
        state.posts.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, update: PostUpdate) -> Result<Post, AppError> {
        let mut state = self.lock();
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
        if let Some(content) = update.content {
            post.content = content;
        }
        if let Some(tags) = &update.tags {
            post.tags = tags.names.clone();
        }
        let updated = post.clone();
        if let Some(tags) = update.tags {
            state.post_tags.retain(|(post_id, _)| *post_id != id);
            state
                .post_tags
                .extend(tags.ids.into_iter().map(|tag_id| (id, tag_id)));
        }
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut state = self.lock();
        let before = state.posts.len();
        state.posts.retain(|p| p.id != id);
        if state.posts.len() == before {
            return Err(AppError::NotFound("Post not found".into()));
        }
        state.comments.retain(|c| c.post_id != id);
        state.likes.retain(|l| l.post_id != id);
        state.files.retain(|f| f.post_id != id);
        state.post_tags.retain(|(post, _)| *post != id);
        Ok(())
    }

    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<Toggle, AppError> {
        let mut state = self.lock();
        let id = state.id();
        Ok(toggle_in(&mut state.likes, id, post_id, user_id))
    }

    async fn remove_like(&self, post_id: i64, user_id: i64) -> Result<bool, AppError> {
        let mut state = self.lock();
        let before = state.likes.len();
        state
            .likes
            .retain(|l| !(l.post_id == post_id && l.user_id == user_id));
        Ok(state.likes.len() < before)
    }

    async fn add_comment(
        &self,
        post_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<CommentWithAuthor, AppError> {
        let mut state = self.lock();
        let comment = Comment {
            id: state.id(),
            post_id,
            user_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        state.comments.push(comment.clone());
        Ok(CommentWithAuthor {
            author: state.summary(user_id),
            comment,
        })
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn toggle(&self, follower_id: i64, followed_id: i64) -> Result<Toggle, AppError> {
        let mut state = self.lock();
        let edge = (follower_id, followed_id);
        if let Some(pos) = state.follows.iter().position(|f| *f == edge) {
            state.follows.remove(pos);
            Ok(Toggle::Removed)
        } else {
            state.follows.push(edge);
            Ok(Toggle::Added)
        }
    }

    async fn followers_of(&self, user_id: i64) -> Result<Vec<UserSummary>, AppError> {
        let state = self.lock();
        Ok(state
            .follows
            .iter()
            .rev()
            .filter(|(_, to)| *to == user_id)
            .map(|(from, _)| state.summary(*from))
            .collect())
    }
}

#[async_trait]
impl ChannelRepository for MemoryStore {
    async fn create_with_admin(&self, channel: NewChannel) -> Result<Channel, AppError> {
        let mut state = self.lock();
        let created = Channel {
            id: state.id(),
            name: channel.name,
            description: channel.description,
            created_by: channel.created_by,
            is_private: channel.is_private,
            university_id: channel.university_id,
            career_id: channel.career_id,
            created_at: Utc::now(),
        };
        state.channels.push(created.clone());
        state.add_member(created.id, created.created_by, true);
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Channel>, AppError> {
        Ok(self.lock().channels.iter().find(|c| c.id == id).cloned())
    }

    async fn find_details(&self, id: i64) -> Result<Option<ChannelDetails>, AppError> {
        let state = self.lock();
        Ok(state
            .channels
            .iter()
            .find(|c| c.id == id)
            .map(|c| state.channel_details(c)))
    }

    async fn list_for_member(&self, user_id: i64) -> Result<Vec<ChannelDetails>, AppError> {
        let state = self.lock();
        Ok(state
            .channels
            .iter()
            .rev()
            .filter(|c| {
                state
                    .members
                    .iter()
                    .any(|m| m.channel_id == c.id && m.user_id == user_id)
            })
            .map(|c| state.channel_details(c))
            .collect())
    }

    async fn find_member(
        &self,
        channel_id: i64,
        user_id: i64,
    ) -> Result<Option<ChannelMember>, AppError> {
        Ok(self
            .lock()
            .members
            .iter()
            .find(|m| m.channel_id == channel_id && m.user_id == user_id)
            .cloned())
    }

    async fn touch_last_seen(&self, channel_id: i64, user_id: i64) -> Result<(), AppError> {
        let mut state = self.lock();
        if let Some(member) = state
            .members
            .iter_mut()
            .find(|m| m.channel_id == channel_id && m.user_id == user_id)
        {
            member.last_seen_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl InvitationRepository for MemoryStore {
    async fn create(
        &self,
        channel_id: i64,
        invited_by: i64,
        invited_user: i64,
    ) -> Result<ChannelInvitation, AppError> {
        let mut state = self.lock();
        if state
            .invitations
            .iter()
            .any(|i| i.channel_id == channel_id && i.invited_user == invited_user && i.is_pending())
        {
            return Err(AppError::BadRequest("User already has a pending invitation".into()));
        }
        let now = Utc::now();
        let invitation = ChannelInvitation {
            id: state.id(),
            channel_id,
            invited_by,
            invited_user,
            status: InvitationStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.invitations.push(invitation.clone());
        Ok(invitation)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ChannelInvitation>, AppError> {
        Ok(self.lock().invitations.iter().find(|i| i.id == id).cloned())
    }

    async fn has_pending(&self, channel_id: i64, invited_user: i64) -> Result<bool, AppError> {
        Ok(self
            .lock()
            .invitations
            .iter()
            .any(|i| i.channel_id == channel_id && i.invited_user == invited_user && i.is_pending()))
    }

    async fn accept(&self, id: i64) -> Result<Option<ChannelInvitation>, AppError> {
        let mut state = self.lock();
        let accepted = state.set_invitation_status(id, InvitationStatus::Accepted);
        if let Some(invitation) = &accepted {
            state.add_member(invitation.channel_id, invitation.invited_user, false);
        }
        Ok(accepted)
    }

    async fn reject(&self, id: i64) -> Result<Option<ChannelInvitation>, AppError> {
        Ok(self.lock().set_invitation_status(id, InvitationStatus::Rejected))
    }

    async fn list_pending_for(&self, user_id: i64) -> Result<Vec<InvitationWithContext>, AppError> {
        let state = self.lock();
        Ok(state
            .invitations
            .iter()
            .rev()
            .filter(|i| i.invited_user == user_id && i.is_pending())
            .filter_map(|i| {
                let channel = state.channels.iter().find(|c| c.id == i.channel_id)?;
                Some(InvitationWithContext {
                    invitation: i.clone(),
                    channel: channel.clone(),
                    inviter: state.summary(i.invited_by),
                })
            })
            .collect())
    }
}

#[async_trait]
impl ChannelPostRepository for MemoryStore {
    async fn create(
        &self,
        post: NewChannelPost,
        files: Vec<NewAttachment>,
    ) -> Result<ChannelPost, AppError> {
        let mut state = self.lock();
        let now = Utc::now();
        let created = ChannelPost {
            id: state.id(),
            channel_id: post.channel_id,
            user_id: post.user_id,
            content: post.content,
            tags: post.tags,
            created_at: now,
            updated_at: now,
        };
        for file in files {
            let id = state.id();
            state.channel_files.push(Attachment {
                id,
                post_id: created.id,
                file_url: file.file_url,
                file_type: file.file_type,
                file_name: file.file_name,
            });
        }
        state.channel_posts.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ChannelPost>, AppError> {
        Ok(self.lock().channel_posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_details(&self, id: i64) -> Result<Option<ChannelPostDetails>, AppError> {
        let state = self.lock();
        Ok(state
            .channel_posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| state.channel_post_details(p)))
    }

    async fn list_for_channel(&self, channel_id: i64) -> Result<Vec<ChannelPostDetails>, AppError> {
        let state = self.lock();
        Ok(state
            .channel_posts
            .iter()
            .rev()
            .filter(|p| p.channel_id == channel_id)
            .map(|p| state.channel_post_details(p))
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut state = self.lock();
        let before = state.channel_posts.len();
        state.channel_posts.retain(|p| p.id != id);
        if state.channel_posts.len() == before {
            return Err(AppError::NotFound("Post not found".into()));
        }
        state.channel_comments.retain(|c| c.post_id != id);
        state.channel_likes.retain(|l| l.post_id != id);
        state.channel_files.retain(|f| f.post_id != id);
        Ok(())
    }

    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<Toggle, AppError> {
        let mut state = self.lock();
        let id = state.id();
        Ok(toggle_in(&mut state.channel_likes, id, post_id, user_id))
    }

    async fn add_comment(
        &self,
        post_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<CommentWithAuthor, AppError> {
        let mut state = self.lock();
        let comment = Comment {
            id: state.id(),
            post_id,
            user_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        state.channel_comments.push(comment.clone());
        Ok(CommentWithAuthor {
            author: state.summary(user_id),
            comment,
        })
    }
}
