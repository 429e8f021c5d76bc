//! The interview session engine: one scripted question/answer/evaluation
//! cycle per connection, grounded in the candidate's document via retrieval.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::application::cache::DocumentTextCache;
use crate::application::services::RetrievalService;
use crate::domain::{
    ports::{DocumentStore, LlmService, ObjectStorage, SessionStore},
    DocumentKind, DomainError, InterviewSession, QuestionPlan,
};

const INTERVIEWER_SYSTEM: &str = "You are a professional AI interviewer.";
const EVALUATOR_SYSTEM: &str =
    "You are an expert interviewer. Evaluate the answer from 0 to 10.";
const GREETING: &str = "Hello! I'm your AI Interviewer. Let's get started!";

/// Server-to-client protocol frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    System { data: String },
    Question { data: String },
    Error { data: String },
    Done,
}

/// Client-to-server frame: one answer per outstanding question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMessage {
    pub data: String,
}

/// Transport seam between the engine and a realtime connection. The engine
/// owns the session loop; the adapter owns the socket.
#[async_trait]
pub trait ClientChannel: Send {
    async fn send(&mut self, message: ServerMessage) -> Result<(), DomainError>;
    /// `Ok(None)` means the client disconnected.
    async fn recv(&mut self) -> Result<Option<ClientMessage>, DomainError>;
}

/// Terminal outcome of one engine run, for the transport layer's logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    Disconnected,
    Abandoned,
}

pub struct InterviewEngine {
    retrieval: Arc<RetrievalService>,
    llm: Arc<dyn LlmService>,
    sessions: Arc<dyn SessionStore>,
    documents: Arc<dyn DocumentStore>,
    storage: Arc<dyn ObjectStorage>,
    cache: Arc<DocumentTextCache>,
    plan: QuestionPlan,
    idle_timeout: Option<Duration>,
}

impl InterviewEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        retrieval: Arc<RetrievalService>,
        llm: Arc<dyn LlmService>,
        sessions: Arc<dyn SessionStore>,
        documents: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
        cache: Arc<DocumentTextCache>,
        plan: QuestionPlan,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            retrieval,
            llm,
            sessions,
            documents,
            storage,
            cache,
            plan,
            idle_timeout,
        }
    }

    /// Runs one full interview over `channel`. On a synchronous-path failure
    /// the client receives an explicit `error` frame before the error
    /// propagates; silent drops are a protocol defect.
    #[instrument(skip(self, channel), fields(principal = %principal, document_id = %document_id))]
    pub async fn run(
        &self,
        principal: Uuid,
        document_id: Uuid,
        channel: &mut dyn ClientChannel,
    ) -> Result<SessionOutcome, DomainError> {
        match self.drive(principal, document_id, channel).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::warn!(error = %e, "interview session failed");
                let _ = channel
                    .send(ServerMessage::Error {
                        data: e.to_string(),
                    })
                    .await;
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        principal: Uuid,
        document_id: Uuid,
        channel: &mut dyn ClientChannel,
    ) -> Result<SessionOutcome, DomainError> {
        let document = self
            .documents
            .find(document_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("document {document_id}")))?;

        // Fetch + chunk-ingest at most once per document per process;
        // concurrent sessions on the same document coalesce here.
        let storage = self.storage.clone();
        let retrieval = self.retrieval.clone();
        let storage_key = document.storage_key.clone();
        self.cache
            .get_or_ingest(document_id, || async move {
                let text = storage.fetch_text(&storage_key).await?;
                retrieval.ingest(document_id, &text).await?;
                Ok(text)
            })
            .await?;

        let mut session = InterviewSession::new(principal, document_id);
        self.sessions.save(&session).await?;
        tracing::info!(session_id = %session.id, "interview session started");

        channel
            .send(ServerMessage::System {
                data: GREETING.to_string(),
            })
            .await?;

        for step in self.plan.steps() {
            let question = self.ask(&document.kind, document_id, &step.prompt).await?;
            session.push_question(&question);
            self.sessions.save(&session).await?;
            channel
                .send(ServerMessage::Question { data: question })
                .await?;

            let answer = match self.await_answer(channel).await? {
                AnswerOutcome::Answer(answer) => answer,
                AnswerOutcome::Disconnected => {
                    // Partial transcript stays persisted and in progress.
                    tracing::info!(session_id = %session.id, "client disconnected mid-session");
                    return Ok(SessionOutcome::Disconnected);
                }
                AnswerOutcome::TimedOut => {
                    session.abandon();
                    self.sessions.save(&session).await?;
                    channel
                        .send(ServerMessage::Error {
                            data: "Interview abandoned: no answer received in time.".to_string(),
                        })
                        .await?;
                    return Ok(SessionOutcome::Abandoned);
                }
            };

            let evaluation = self.evaluate(&session, &answer).await?;
            let score = session.record_answer(answer, evaluation);
            self.sessions.save(&session).await?;
            tracing::debug!(
                session_id = %session.id,
                label = %step.label,
                score = score.unwrap_or(0.0),
                "answer evaluated"
            );
        }

        let average = session.complete();
        self.sessions.save(&session).await?;
        tracing::info!(session_id = %session.id, score = average, "interview completed");

        channel
            .send(ServerMessage::System {
                data: format!(
                    "Interview completed! Your average score is: {average:.1}/10"
                ),
            })
            .await?;
        channel.send(ServerMessage::Done).await?;

        Ok(SessionOutcome::Completed)
    }

    async fn ask(
        &self,
        kind: &DocumentKind,
        document_id: Uuid,
        step_prompt: &str,
    ) -> Result<String, DomainError> {
        let context = self
            .retrieval
            .relevant_context(document_id, step_prompt)
            .await?;

        let prompt = format!(
            "{}:\n{context}\n\n{step_prompt}",
            match kind {
                DocumentKind::Resume => "Resume",
                DocumentKind::JobDescription => "Job description",
            }
        );
        self.llm.complete_with_system(INTERVIEWER_SYSTEM, &prompt).await
    }

    async fn await_answer(
        &self,
        channel: &mut dyn ClientChannel,
    ) -> Result<AnswerOutcome, DomainError> {
        let received = match self.idle_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, channel.recv()).await {
                Ok(result) => result?,
                Err(_) => return Ok(AnswerOutcome::TimedOut),
            },
            None => channel.recv().await?,
        };

        Ok(match received {
            Some(message) => AnswerOutcome::Answer(message.data),
            None => AnswerOutcome::Disconnected,
        })
    }

    async fn evaluate(
        &self,
        session: &InterviewSession,
        answer: &str,
    ) -> Result<String, DomainError> {
        let question = session
            .questions
            .last()
            .map(|q| q.question.as_str())
            .unwrap_or_default();

        let prompt =
            format!("Q: {question}\nA: {answer}\nRate the answer and explain briefly.");
        self.llm.complete_with_system(EVALUATOR_SYSTEM, &prompt).await
    }
}

enum AnswerOutcome {
    Answer(String),
    Disconnected,
    TimedOut,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use crate::domain::ports::EmbeddingService;
    use crate::domain::{Document, Embedding, PlanStep, SessionStatus};
    use crate::infrastructure::{
        InMemoryDocumentStore, InMemoryObjectStorage, InMemorySessionStore, InMemoryVectorStore,
    };

    struct HistogramEmbedding;

    #[async_trait]
    impl EmbeddingService for HistogramEmbedding {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            let mut v = vec![0.0f32; 8];
            for b in text.bytes() {
                v[(b as usize) % 8] += 1.0;
            }
            Ok(Embedding::new(v))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            let mut vectors = Vec::with_capacity(texts.len());
            for text in texts {
                vectors.push(self.embed(text).await?);
            }
            Ok(vectors)
        }

        fn dimension(&self) -> usize {
            8
        }
    }

    /// Echoes question prompts back and scores every answer 7/10.
    struct ScriptedLlm;

    #[async_trait]
    impl LlmService for ScriptedLlm {
        async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
            Ok(prompt.to_string())
        }

        async fn complete_with_system(
            &self,
            system: &str,
            prompt: &str,
        ) -> Result<String, DomainError> {
            if system == EVALUATOR_SYSTEM {
                Ok("Score: 7/10, good depth".to_string())
            } else {
                Ok(format!("Interview question for: {prompt}"))
            }
        }
    }

    struct ScriptedChannel {
        answers: VecDeque<String>,
        sent: Vec<ServerMessage>,
    }

    impl ScriptedChannel {
        fn new(answers: Vec<&str>) -> Self {
            Self {
                answers: answers.into_iter().map(String::from).collect(),
                sent: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl ClientChannel for ScriptedChannel {
        async fn send(&mut self, message: ServerMessage) -> Result<(), DomainError> {
            self.sent.push(message);
            Ok(())
        }

        async fn recv(&mut self) -> Result<Option<ClientMessage>, DomainError> {
            Ok(self.answers.pop_front().map(|data| ClientMessage { data }))
        }
    }

    /// Channel that never answers, for the idle timeout path.
    struct SilentChannel {
        sent: Vec<ServerMessage>,
    }

    #[async_trait]
    impl ClientChannel for SilentChannel {
        async fn send(&mut self, message: ServerMessage) -> Result<(), DomainError> {
            self.sent.push(message);
            Ok(())
        }

        async fn recv(&mut self) -> Result<Option<ClientMessage>, DomainError> {
            futures::future::pending::<()>().await;
            unreachable!()
        }
    }

    struct Fixture {
        engine: InterviewEngine,
        sessions: Arc<InMemorySessionStore>,
        document_id: Uuid,
        principal: Uuid,
    }

    async fn fixture(plan: QuestionPlan, idle_timeout: Option<Duration>) -> Fixture {
        let vector_store = Arc::new(InMemoryVectorStore::new());
        let retrieval = Arc::new(RetrievalService::new(
            Arc::new(HistogramEmbedding),
            vector_store,
            50,
            3,
        ));
        let sessions = Arc::new(InMemorySessionStore::new());
        let documents = Arc::new(InMemoryDocumentStore::new());
        let storage = Arc::new(InMemoryObjectStorage::new());

        let principal = Uuid::new_v4();
        let document = Document::new(principal, DocumentKind::Resume, "cv.txt", "cv-key");
        let document_id = document.id;
        documents.save(&document).await.unwrap();
        storage
            .put(
                "cv-key",
                b"Rust developer.\n\nBuilt async services.\n\nLed a platform team.",
            )
            .await
            .unwrap();

        let engine = InterviewEngine::new(
            retrieval,
            Arc::new(ScriptedLlm),
            sessions.clone(),
            documents,
            storage,
            Arc::new(DocumentTextCache::new()),
            plan,
            idle_timeout,
        );

        Fixture {
            engine,
            sessions,
            document_id,
            principal,
        }
    }

    fn questions(sent: &[ServerMessage]) -> Vec<&str> {
        sent.iter()
            .filter_map(|m| match m {
                ServerMessage::Question { data } => Some(data.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_five_step_plan_asks_five_questions_in_order() {
        let fx = fixture(QuestionPlan::default(), None).await;
        let mut channel = ScriptedChannel::new(vec!["a1", "a2", "a3", "a4", "a5"]);

        let outcome = fx
            .engine
            .run(fx.principal, fx.document_id, &mut channel)
            .await
            .unwrap();
        assert_eq!(outcome, SessionOutcome::Completed);

        let asked = questions(&channel.sent);
        assert_eq!(asked.len(), 5);
        // Plan order is fixed; the scripted LLM echoes each step prompt.
        assert!(asked[0].contains("Tell me about yourself"));
        assert!(asked[1].contains("medium-level technical question"));
        assert!(asked[2].contains("hard-level technical question"));
        assert!(asked[3].contains("candidate's projects"));
        assert!(asked[4].contains("out-of-the-box"));

        // Done only arrives after the final evaluation is persisted.
        assert_eq!(channel.sent.last(), Some(&ServerMessage::Done));
        let stored = fx
            .sessions
            .list_completed_by_owner(fx.principal)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].questions.len(), 5);
        assert!(stored[0].questions.iter().all(|q| q.answer.is_some()));
        assert_eq!(stored[0].score, 7.0);
    }

    #[tokio::test]
    async fn test_empty_plan_completes_with_zero_score() {
        let fx = fixture(QuestionPlan::new(vec![]), None).await;
        let mut channel = ScriptedChannel::new(vec![]);

        let outcome = fx
            .engine
            .run(fx.principal, fx.document_id, &mut channel)
            .await
            .unwrap();
        assert_eq!(outcome, SessionOutcome::Completed);

        let stored = fx
            .sessions
            .list_completed_by_owner(fx.principal)
            .await
            .unwrap();
        assert_eq!(stored[0].score, 0.0);
        assert_eq!(stored[0].status, SessionStatus::Completed);
        assert_eq!(channel.sent.last(), Some(&ServerMessage::Done));
    }

    #[tokio::test]
    async fn test_unknown_document_fails_closed_with_error_frame() {
        let fx = fixture(QuestionPlan::default(), None).await;
        let mut channel = ScriptedChannel::new(vec![]);

        let result = fx
            .engine
            .run(fx.principal, Uuid::new_v4(), &mut channel)
            .await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
        assert!(matches!(
            channel.sent.last(),
            Some(ServerMessage::Error { .. })
        ));
    }

    #[tokio::test]
    async fn test_disconnect_leaves_partial_in_progress_transcript() {
        let fx = fixture(QuestionPlan::default(), None).await;
        // Two answers, then the client goes away.
        let mut channel = ScriptedChannel::new(vec!["a1", "a2"]);

        let outcome = fx
            .engine
            .run(fx.principal, fx.document_id, &mut channel)
            .await
            .unwrap();
        assert_eq!(outcome, SessionOutcome::Disconnected);

        let completed = fx
            .sessions
            .list_completed_by_owner(fx.principal)
            .await
            .unwrap();
        assert!(completed.is_empty());

        let all = fx.sessions.all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, SessionStatus::InProgress);
        assert_eq!(all[0].questions.len(), 3);
        assert!(all[0].questions.last().unwrap().answer.is_none());
    }

    #[tokio::test]
    async fn test_idle_timeout_abandons_session() {
        let fx = fixture(
            QuestionPlan::default(),
            Some(Duration::from_millis(20)),
        )
        .await;
        let mut channel = SilentChannel { sent: Vec::new() };

        let outcome = fx
            .engine
            .run(fx.principal, fx.document_id, &mut channel)
            .await
            .unwrap();
        assert_eq!(outcome, SessionOutcome::Abandoned);

        let all = fx.sessions.all().await;
        assert_eq!(all[0].status, SessionStatus::Abandoned);
        assert!(matches!(
            channel.sent.last(),
            Some(ServerMessage::Error { .. })
        ));
    }

    #[test]
    fn test_protocol_frame_shapes() {
        let question = serde_json::to_value(ServerMessage::Question {
            data: "Q1".to_string(),
        })
        .unwrap();
        assert_eq!(
            question,
            serde_json::json!({"type": "question", "data": "Q1"})
        );

        let done = serde_json::to_value(ServerMessage::Done).unwrap();
        assert_eq!(done, serde_json::json!({"type": "done"}));

        let answer: ClientMessage = serde_json::from_str(r#"{"data":"my answer"}"#).unwrap();
        assert_eq!(answer.data, "my answer");
    }
}
