use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::{repo::UserRepository, repo_types::User},
    blogs::{
        repo::BlogRepository,
        repo_types::{Blog, NewBlog},
    },
};

/// In-process store with the same contract as [`crate::db::PgStore`].
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    blogs: Mutex<Vec<Blog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(m: &Mutex<T>) -> anyhow::Result<MutexGuard<'_, T>> {
    m.lock().map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(lock(&self.users)?
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> anyhow::Result<User> {
        let mut users = lock(&self.users)?;
        if users.iter().any(|u| u.username == username) {
            anyhow::bail!("duplicate username: {}", username);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl BlogRepository for MemoryStore {
    async fn create(&self, blog: NewBlog) -> anyhow::Result<Blog> {
        let now = OffsetDateTime::now_utc();
        let row = Blog {
            id: Uuid::new_v4(),
            title: blog.title,
            author: blog.author,
            image: blog.image,
            date: blog.date,
            content: blog.content,
            user_id: blog.user_id,
            created_at: now,
            updated_at: now,
        };
        lock(&self.blogs)?.push(row.clone());
        Ok(row)
    }

    async fn list(&self, limit: i64) -> anyhow::Result<Vec<Blog>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(lock(&self.blogs)?.iter().take(limit).cloned().collect())
    }

    async fn latest(&self) -> anyhow::Result<Option<Blog>> {
        Ok(lock(&self.blogs)?.last().cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Blog>> {
        Ok(lock(&self.blogs)?.iter().find(|b| b.id == id).cloned())
    }

    async fn delete_all(&self) -> anyhow::Result<u64> {
        let mut blogs = lock(&self.blogs)?;
        let n = blogs.len() as u64;
        blogs.clear();
        Ok(n)
    }
}
