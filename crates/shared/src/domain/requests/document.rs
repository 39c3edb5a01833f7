/// File forwarded to the backend's multipart `/upload` endpoint.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}
