use bytes::Bytes;
use serde::Serialize;

/// Most blogs returned by `GET /get-blogs`.
pub const MAX_LISTED_BLOGS: i64 = 50;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// File part of a `/write` request.
#[derive(Debug)]
pub struct UploadItem {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

/// Parsed multipart body of `POST /write`.
#[derive(Debug, Default)]
pub struct WriteBlogForm {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub content: Option<String>,
    pub file: Option<UploadItem>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
