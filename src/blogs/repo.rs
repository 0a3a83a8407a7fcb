use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    blogs::repo_types::{Blog, NewBlog},
    db::PgStore,
};

#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn create(&self, blog: NewBlog) -> anyhow::Result<Blog>;
    /// Oldest first.
    async fn list(&self, limit: i64) -> anyhow::Result<Vec<Blog>>;
    async fn latest(&self) -> anyhow::Result<Option<Blog>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Blog>>;
    /// Returns the number of deleted blogs.
    async fn delete_all(&self) -> anyhow::Result<u64>;
}

#[async_trait]
impl BlogRepository for PgStore {
    async fn create(&self, blog: NewBlog) -> anyhow::Result<Blog> {
        let row = sqlx::query_as::<_, Blog>(
            r#"
            INSERT INTO blogs (title, author, image, date, content, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, author, image, date, content, user_id, created_at, updated_at
            "#,
        )
        .bind(&blog.title)
        .bind(&blog.author)
        .bind(&blog.image)
        .bind(&blog.date)
        .bind(&blog.content)
        .bind(blog.user_id)
        .fetch_one(&self.db)
        .await
        .context("insert blog")?;
        Ok(row)
    }

    async fn list(&self, limit: i64) -> anyhow::Result<Vec<Blog>> {
        let rows = sqlx::query_as::<_, Blog>(
            r#"
            SELECT id, title, author, image, date, content, user_id, created_at, updated_at
            FROM blogs
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("list blogs")?;
        Ok(rows)
    }

    async fn latest(&self) -> anyhow::Result<Option<Blog>> {
        let row = sqlx::query_as::<_, Blog>(
            r#"
            SELECT id, title, author, image, date, content, user_id, created_at, updated_at
            FROM blogs
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.db)
        .await
        .context("latest blog")?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Blog>> {
        let row = sqlx::query_as::<_, Blog>(
            r#"
            SELECT id, title, author, image, date, content, user_id, created_at, updated_at
            FROM blogs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find blog by id")?;
        Ok(row)
    }

    async fn delete_all(&self) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM blogs")
            .execute(&self.db)
            .await
            .context("delete blogs")?;
        Ok(res.rows_affected())
    }
}
