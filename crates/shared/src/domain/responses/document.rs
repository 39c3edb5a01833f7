use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Document record as listed by the backend. Field names differ between
/// backend versions, so everything except the id is optional.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentMetadata {
    pub id: i64,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub total_chunks: Option<u64>,
    #[serde(default)]
    pub processing_status: Option<String>,
    #[serde(default)]
    pub processed: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl DocumentMetadata {
    pub fn display_name(&self) -> &str {
        self.original_filename
            .as_deref()
            .or(self.filename.as_deref())
            .unwrap_or("unknown")
    }

    pub fn status(&self) -> &str {
        match (&self.processing_status, self.processed) {
            (Some(status), _) => status.as_str(),
            (None, Some(true)) => "processed",
            (None, Some(false)) => "processing",
            (None, None) => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DocumentSummary {
    pub total_documents: usize,
    pub total_chunks: u64,
}

impl DocumentSummary {
    pub fn from_documents(documents: &[DocumentMetadata]) -> Self {
        Self {
            total_documents: documents.len(),
            total_chunks: documents.iter().filter_map(|d| d.total_chunks).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_both_backend_shapes() {
        let docs: Vec<DocumentMetadata> = serde_json::from_str(
            r#"[
                {"id": 1, "original_filename": "manual.pdf", "total_chunks": 12, "processing_status": "completed"},
                {"id": 2, "filename": "notes.txt", "file_type": "text/plain", "file_size": 420, "processed": false, "created_at": "2024-06-01T08:00:00"}
            ]"#,
        )
        .unwrap();

        assert_eq!(docs[0].display_name(), "manual.pdf");
        assert_eq!(docs[0].status(), "completed");
        assert_eq!(docs[1].display_name(), "notes.txt");
        assert_eq!(docs[1].status(), "processing");

        let summary = DocumentSummary::from_documents(&docs);
        assert_eq!(summary.total_documents, 2);
        assert_eq!(summary.total_chunks, 12);
    }
}
