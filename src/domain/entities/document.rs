use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of the interview a document represents. The kind also selects
/// the id prefix of the document's summary vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    JobDescription,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::JobDescription => "jd",
        }
    }

    pub fn summary_vector_id(&self, document_id: Uuid) -> String {
        format!("{}-{}", self.as_str(), document_id)
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resume" => Ok(Self::Resume),
            "jd" | "job_description" => Ok(Self::JobDescription),
            other => Err(format!("unknown document kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionStatus {
    Uploaded,
    Processing,
    Embedded,
    Error,
}

impl IngestionStatus {
    fn rank(&self) -> u8 {
        match self {
            Self::Uploaded => 0,
            Self::Processing => 1,
            Self::Embedded => 2,
            Self::Error => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub owner: Uuid,
    pub kind: DocumentKind,
    pub filename: String,
    pub storage_key: String,
    pub status: IngestionStatus,
    /// A job description is uploaded against a specific resume.
    pub linked_resume_id: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        owner: Uuid,
        kind: DocumentKind,
        filename: impl Into<String>,
        storage_key: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            kind,
            filename: filename.into(),
            storage_key: storage_key.into(),
            status: IngestionStatus::Uploaded,
            linked_resume_id: None,
            uploaded_at: Utc::now(),
        }
    }

    pub fn with_linked_resume(mut self, resume_id: Uuid) -> Self {
        self.linked_resume_id = Some(resume_id);
        self
    }

    /// Status only moves forward; a stale transition is ignored.
    pub fn advance_status(&mut self, next: IngestionStatus) -> bool {
        if next.rank() > self.status.rank() {
            self.status = next;
            true
        } else {
            false
        }
    }

    pub fn summary_vector_id(&self) -> String {
        self.kind.summary_vector_id(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_moves_forward_only() {
        let mut doc = Document::new(Uuid::new_v4(), DocumentKind::Resume, "cv.txt", "key");
        assert!(doc.advance_status(IngestionStatus::Processing));
        assert!(doc.advance_status(IngestionStatus::Embedded));
        assert!(!doc.advance_status(IngestionStatus::Uploaded));
        assert_eq!(doc.status, IngestionStatus::Embedded);
    }

    #[test]
    fn test_error_reachable_from_any_state() {
        let mut doc = Document::new(Uuid::new_v4(), DocumentKind::JobDescription, "jd.txt", "key");
        assert!(doc.advance_status(IngestionStatus::Error));
        assert!(!doc.advance_status(IngestionStatus::Embedded));
    }

    #[test]
    fn test_summary_vector_id_prefixes() {
        let id = Uuid::new_v4();
        assert_eq!(
            DocumentKind::Resume.summary_vector_id(id),
            format!("resume-{id}")
        );
        assert_eq!(
            DocumentKind::JobDescription.summary_vector_id(id),
            format!("jd-{id}")
        );
    }
}
