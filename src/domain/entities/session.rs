use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(\.\d+)?").expect("valid number pattern"));

/// Extracts the per-question score from free-text LLM evaluation output.
///
/// Lenient by contract: the first decimal substring wins ("Score: 7/10"
/// yields 7, "question 2: score 9/10" yields 2) and text without digits
/// yields 0. Known limitation of the evaluation format.
pub fn extract_score(evaluation: &str) -> f32 {
    FIRST_NUMBER
        .find(evaluation)
        .and_then(|m| m.as_str().parse::<f32>().ok())
        .unwrap_or(0.0)
}

/// One labeled prompt template in the scripted question sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    pub label: String,
    pub prompt: String,
}

impl PlanStep {
    pub fn new(label: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prompt: prompt.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPlan {
    steps: Vec<PlanStep>,
}

impl QuestionPlan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Default for QuestionPlan {
    fn default() -> Self {
        Self::new(vec![
            PlanStep::new(
                "general",
                "Ask a general interview question like 'Tell me about yourself'.",
            ),
            PlanStep::new(
                "skills_medium",
                "Ask a medium-level technical question based on the candidate's skills.",
            ),
            PlanStep::new(
                "skills_hard",
                "Ask a hard-level technical question based on the candidate's skills \
                 and do not reveal any answer.",
            ),
            PlanStep::new(
                "projects_medium",
                "Ask a medium-level question about one of the candidate's projects.",
            ),
            PlanStep::new(
                "out_of_box",
                "Ask an out-of-the-box or situational question to test creativity or thinking.",
            ),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub answer: Option<String>,
    pub evaluation: Option<String>,
    pub score: Option<f32>,
    pub asked_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl QuestionRecord {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: None,
            evaluation: None,
            score: None,
            asked_at: Utc::now(),
            answered_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    pub id: Uuid,
    pub owner: Uuid,
    pub document_id: Uuid,
    pub questions: Vec<QuestionRecord>,
    pub status: SessionStatus,
    pub score: f32,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl InterviewSession {
    pub fn new(owner: Uuid, document_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            document_id,
            questions: Vec::new(),
            status: SessionStatus::InProgress,
            score: 0.0,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn push_question(&mut self, question: impl Into<String>) {
        self.questions.push(QuestionRecord::new(question));
    }

    /// Writes answer and evaluation into the most recent question record.
    /// Only the last record may be unanswered, so this never targets an
    /// earlier question.
    pub fn record_answer(
        &mut self,
        answer: impl Into<String>,
        evaluation: impl Into<String>,
    ) -> Option<f32> {
        let record = self.questions.last_mut()?;
        let evaluation = evaluation.into();
        let score = extract_score(&evaluation);
        record.answer = Some(answer.into());
        record.evaluation = Some(evaluation);
        record.score = Some(score);
        record.answered_at = Some(Utc::now());
        Some(score)
    }

    /// Marks the session completed and fixes its score to the mean of all
    /// per-question scores, 0 when nothing was scored.
    pub fn complete(&mut self) -> f32 {
        let scores: Vec<f32> = self.questions.iter().filter_map(|q| q.score).collect();
        self.score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f32>() / scores.len() as f32
        };
        self.status = SessionStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.score
    }

    pub fn abandon(&mut self) {
        self.status = SessionStatus::Abandoned;
        self.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_score_ratio() {
        assert_eq!(extract_score("Score: 7/10, good depth"), 7.0);
    }

    #[test]
    fn test_extract_score_decimal() {
        assert_eq!(extract_score("I would rate this 8.5 out of 10"), 8.5);
    }

    #[test]
    fn test_extract_score_first_number_wins() {
        // Documented leniency: the leading "2" is picked over the actual score.
        assert_eq!(extract_score("question 2: score 9/10"), 2.0);
    }

    #[test]
    fn test_extract_score_no_digits() {
        assert_eq!(extract_score("Excellent answer, well structured."), 0.0);
    }

    #[test]
    fn test_default_plan_labels() {
        let plan = QuestionPlan::default();
        let labels: Vec<&str> = plan.steps().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "general",
                "skills_medium",
                "skills_hard",
                "projects_medium",
                "out_of_box"
            ]
        );
    }

    #[test]
    fn test_completion_score_is_mean() {
        let mut session = InterviewSession::new(Uuid::new_v4(), Uuid::new_v4());
        session.push_question("Q1");
        session.record_answer("A1", "Score: 6/10");
        session.push_question("Q2");
        session.record_answer("A2", "Score: 8/10");

        let score = session.complete();
        assert_eq!(score, 7.0);
        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.completed_at.is_some());
    }

    #[test]
    fn test_completion_with_no_questions() {
        let mut session = InterviewSession::new(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(session.complete(), 0.0);
        assert_eq!(session.status, SessionStatus::Completed);
    }

    #[test]
    fn test_unanswered_record_is_always_last() {
        let mut session = InterviewSession::new(Uuid::new_v4(), Uuid::new_v4());
        session.push_question("Q1");
        session.record_answer("A1", "5/10");
        session.push_question("Q2");

        let unanswered: Vec<usize> = session
            .questions
            .iter()
            .enumerate()
            .filter(|(_, q)| q.answer.is_none())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(unanswered, vec![session.questions.len() - 1]);
    }
}
