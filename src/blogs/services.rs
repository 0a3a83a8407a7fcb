use anyhow::Context;
use tracing::warn;
use uuid::Uuid;

use super::{
    dto::WriteBlogForm,
    repo_types::{author_or_default, Blog, NewBlog},
};
use crate::state::AppState;

/// Stores the optional upload under its original name, then inserts the blog.
pub async fn create_blog(st: &AppState, user_id: Uuid, form: WriteBlogForm) -> anyhow::Result<Blog> {
    let image = match form.file {
        Some(file) => Some(
            st.storage
                .put_object(&file.file_name, file.body, &file.content_type)
                .await
                .with_context(|| format!("store upload {}", file.file_name))?,
        ),
        None => None,
    };

    let orphan = image.clone();
    st.blogs
        .create(NewBlog {
            title: form.title,
            author: author_or_default(form.author),
            image,
            date: form.date,
            content: form.content,
            user_id,
        })
        .await
        .map_err(|e| match orphan {
            // Same-named uploads are shared, so the file is left in place.
            Some(path) => {
                warn!(%path, "blog insert failed; upload left without a blog");
                e.context(format!("upload {} left without a blog", path))
            }
            None => e,
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;
    use crate::{
        blogs::{dto::UploadItem, repo::BlogRepository},
        memory::MemoryStore,
        storage::MemoryStorage,
    };

    struct FailingBlogs;

    #[async_trait::async_trait]
    impl BlogRepository for FailingBlogs {
        async fn create(&self, _blog: NewBlog) -> anyhow::Result<Blog> {
            anyhow::bail!("insert blog")
        }
        async fn list(&self, _limit: i64) -> anyhow::Result<Vec<Blog>> {
            Ok(Vec::new())
        }
        async fn latest(&self) -> anyhow::Result<Option<Blog>> {
            Ok(None)
        }
        async fn find_by_id(&self, _id: Uuid) -> anyhow::Result<Option<Blog>> {
            Ok(None)
        }
        async fn delete_all(&self) -> anyhow::Result<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn create_blog_with_upload_records_image_path() {
        let storage = Arc::new(MemoryStorage::new());
        let state = AppState::in_memory(crate::state::test_config(), storage.clone());
        let user_id = Uuid::new_v4();

        let blog = create_blog(
            &state,
            user_id,
            WriteBlogForm {
                title: Some("Trip".into()),
                file: Some(UploadItem {
                    file_name: "beach.jpg".into(),
                    content_type: "image/jpeg".into(),
                    body: Bytes::from_static(b"jpeg"),
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(blog.image.as_deref(), Some("uploads/beach.jpg"));
        assert_eq!(blog.author, "Anonymous");
        assert_eq!(blog.user_id, user_id);
        assert_eq!(storage.get("beach.jpg").unwrap(), Bytes::from_static(b"jpeg"));
    }

    #[tokio::test]
    async fn create_blog_without_upload_has_no_image() {
        let state = AppState::in_memory(crate::state::test_config(), Arc::new(MemoryStorage::new()));
        let blog = create_blog(
            &state,
            Uuid::new_v4(),
            WriteBlogForm {
                author: Some("Ada".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(blog.image, None);
        assert_eq!(blog.author, "Ada");
    }

    #[tokio::test]
    async fn failed_insert_reports_stored_upload() {
        let storage = Arc::new(MemoryStorage::new());
        let state = AppState::from_parts(
            Arc::new(MemoryStore::new()),
            Arc::new(FailingBlogs),
            Arc::new(crate::state::test_config()),
            storage.clone(),
        );

        let err = create_blog(
            &state,
            Uuid::new_v4(),
            WriteBlogForm {
                file: Some(UploadItem {
                    file_name: "lost.png".into(),
                    content_type: "image/png".into(),
                    body: Bytes::from_static(b"png"),
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("uploads/lost.png"));
        assert!(storage.get("lost.png").is_some());
    }
}
