use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{
    ports::{LlmService, VectorStore},
    DocumentKind, DomainError, VectorNamespace,
};

const GOOD_VERDICT: &str = "The resume is good enough for the required job description.";

/// Outcome of comparing a resume summary vector against a job description
/// summary vector.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityReport {
    pub resume_id: Uuid,
    pub jd_id: Uuid,
    /// Cosine similarity rounded to 4 decimals.
    pub score: f32,
    pub verdict: Option<String>,
    pub suggestions: Vec<String>,
}

pub struct SimilarityService {
    vector_store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmService>,
}

impl SimilarityService {
    pub fn new(vector_store: Arc<dyn VectorStore>, llm: Arc<dyn LlmService>) -> Self {
        Self { vector_store, llm }
    }

    /// An exact match short-circuits to a "good enough" verdict; anything
    /// less asks the LLM for improvement points over both full texts.
    #[instrument(skip(self))]
    pub async fn compare(
        &self,
        resume_id: Uuid,
        jd_id: Uuid,
    ) -> Result<SimilarityReport, DomainError> {
        let resume = self
            .vector_store
            .fetch(
                VectorNamespace::Summaries,
                &DocumentKind::Resume.summary_vector_id(resume_id),
            )
            .await?
            .ok_or_else(|| DomainError::not_found(format!("resume embedding {resume_id}")))?;
        let jd = self
            .vector_store
            .fetch(
                VectorNamespace::Summaries,
                &DocumentKind::JobDescription.summary_vector_id(jd_id),
            )
            .await?
            .ok_or_else(|| DomainError::not_found(format!("jd embedding {jd_id}")))?;

        let similarity = resume.vector.cosine_similarity(&jd.vector)?;
        let score = (similarity * 10_000.0).round() / 10_000.0;

        if score == 1.0 {
            return Ok(SimilarityReport {
                resume_id,
                jd_id,
                score,
                verdict: Some(GOOD_VERDICT.to_string()),
                suggestions: Vec::new(),
            });
        }

        let suggestions = self
            .suggest_improvements(&jd.metadata.text, &resume.metadata.text)
            .await?;

        Ok(SimilarityReport {
            resume_id,
            jd_id,
            score,
            verdict: None,
            suggestions,
        })
    }

    async fn suggest_improvements(
        &self,
        jd_text: &str,
        resume_text: &str,
    ) -> Result<Vec<String>, DomainError> {
        let prompt = format!(
            "You are given a job description and a resume.\n\n\
             JOB DESCRIPTION:\n{jd_text}\n\n\
             RESUME:\n{resume_text}\n\n\
             TASK:\n\
             1. Identify only the missing or insufficiently covered skills, experiences, \
             or qualifications in the resume, compared to the job description.\n\
             2. Return them as a pure JSON array of strings, one improvement point each.\n\
             3. Do not include code fences, explanations, or any text outside the JSON array.\n\
             4. If no improvements are needed, return an empty JSON array: []"
        );

        let response = self.llm.complete(&prompt).await?;

        // Malformed model output degrades to no suggestions, never to a
        // client-visible failure.
        match serde_json::from_str::<Vec<String>>(response.trim()) {
            Ok(suggestions) => Ok(suggestions),
            Err(e) => {
                tracing::warn!(error = %e, "suggestion output was not a JSON array");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::domain::{Embedding, VectorRecord};
    use crate::infrastructure::InMemoryVectorStore;

    struct FixedLlm {
        response: String,
    }

    #[async_trait]
    impl LlmService for FixedLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, DomainError> {
            Ok(self.response.clone())
        }

        async fn complete_with_system(
            &self,
            _system: &str,
            prompt: &str,
        ) -> Result<String, DomainError> {
            self.complete(prompt).await
        }
    }

    async fn store_with_summaries(
        resume_id: Uuid,
        jd_id: Uuid,
        resume_vec: Vec<f32>,
        jd_vec: Vec<f32>,
    ) -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new());
        store
            .upsert(
                VectorNamespace::Summaries,
                vec![
                    VectorRecord::summary(
                        format!("resume-{resume_id}"),
                        resume_id,
                        "resume text".to_string(),
                        Embedding::new(resume_vec),
                    ),
                    VectorRecord::summary(
                        format!("jd-{jd_id}"),
                        jd_id,
                        "jd text".to_string(),
                        Embedding::new(jd_vec),
                    ),
                ],
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_exact_match_short_circuits() {
        let resume_id = Uuid::new_v4();
        let jd_id = Uuid::new_v4();
        let store =
            store_with_summaries(resume_id, jd_id, vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0])
                .await;
        let svc = SimilarityService::new(
            store,
            Arc::new(FixedLlm {
                response: "should not be called".to_string(),
            }),
        );

        let report = svc.compare(resume_id, jd_id).await.unwrap();
        assert_eq!(report.score, 1.0);
        assert_eq!(report.verdict.as_deref(), Some(GOOD_VERDICT));
        assert!(report.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_imperfect_match_yields_suggestions() {
        let resume_id = Uuid::new_v4();
        let jd_id = Uuid::new_v4();
        let store =
            store_with_summaries(resume_id, jd_id, vec![1.0, 0.0, 0.0], vec![0.5, 0.5, 0.0])
                .await;
        let svc = SimilarityService::new(
            store,
            Arc::new(FixedLlm {
                response: r#"["Add AWS certification", "Mention team leadership"]"#.to_string(),
            }),
        );

        let report = svc.compare(resume_id, jd_id).await.unwrap();
        assert!(report.score < 1.0);
        assert!(report.verdict.is_none());
        assert_eq!(report.suggestions.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_suggestions_degrade_to_empty() {
        let resume_id = Uuid::new_v4();
        let jd_id = Uuid::new_v4();
        let store =
            store_with_summaries(resume_id, jd_id, vec![1.0, 0.0], vec![0.0, 1.0]).await;
        let svc = SimilarityService::new(
            store,
            Arc::new(FixedLlm {
                response: "Sorry, here are some thoughts instead of JSON".to_string(),
            }),
        );

        let report = svc.compare(resume_id, jd_id).await.unwrap();
        assert!(report.suggestions.is_empty());
        assert!(report.verdict.is_none());
    }

    #[tokio::test]
    async fn test_missing_summary_is_not_found() {
        let store = Arc::new(InMemoryVectorStore::new());
        let svc = SimilarityService::new(
            store,
            Arc::new(FixedLlm {
                response: "[]".to_string(),
            }),
        );

        let result = svc.compare(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_score_rounded_to_four_decimals() {
        let resume_id = Uuid::new_v4();
        let jd_id = Uuid::new_v4();
        let store =
            store_with_summaries(resume_id, jd_id, vec![1.0, 1.0, 0.0], vec![1.0, 0.0, 0.0])
                .await;
        let svc = SimilarityService::new(
            store,
            Arc::new(FixedLlm {
                response: "[]".to_string(),
            }),
        );

        let report = svc.compare(resume_id, jd_id).await.unwrap();
        // cos = 1/sqrt(2) ≈ 0.70710678
        assert_eq!(report.score, 0.7071);
    }
}
