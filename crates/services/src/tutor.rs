use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use course_core::model::Lesson;

use crate::error::TutorError;

/// Lesson content beyond this many characters is left out of answer prompts.
pub const ANSWER_CONTENT_CHARS: usize = 1000;
/// Lesson content beyond this many characters is left out of suggestion prompts.
pub const SUGGESTION_CONTENT_CHARS: usize = 800;

//
// ─── REPLIES ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorAnswer {
    pub answer: String,
    #[serde(default)]
    pub related_concepts: Vec<String>,
    #[serde(default)]
    pub additional_resources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedQuestions {
    #[serde(default)]
    pub questions: Vec<String>,
}

/// Decode a JSON reply from free-form model text.
///
/// Tries the text as-is first. Otherwise takes the span from the first `{` to
/// the last `}`, drops control characters and parses that.
///
/// # Errors
///
/// Returns `TutorError::MalformedReply` when neither attempt yields `T`.
pub fn parse_tutor_reply<T: DeserializeOwned>(raw: &str) -> Result<T, TutorError> {
    if let Ok(parsed) = serde_json::from_str(raw) {
        return Ok(parsed);
    }

    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(TutorError::MalformedReply(
            "no JSON object in reply".to_owned(),
        ));
    };
    if end < start {
        return Err(TutorError::MalformedReply(
            "no JSON object in reply".to_owned(),
        ));
    }
    let cleaned: String = raw[start..=end]
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    serde_json::from_str(&cleaned).map_err(|e| TutorError::MalformedReply(e.to_string()))
}

//
// ─── PROMPTS ───────────────────────────────────────────────────────────────────
//

fn content_excerpt(content: &str, limit: usize) -> &str {
    match content.char_indices().nth(limit) {
        Some((cut, _)) => &content[..cut],
        None => content,
    }
}

/// Prompt asking a model to answer a follow-up question about a lesson.
#[must_use]
pub(crate) fn answer_prompt(lesson_title: &str, lesson_content: &str, question: &str) -> String {
    format!(
        "You are a helpful C++ programming tutor. A student is learning about \
         \"{lesson_title}\" and has asked a follow-up question.\n\n\
         Lesson Content Summary: {}...\n\n\
         Student's Question: {question}\n\n\
         Answer in simple, beginner-friendly language and relate the answer back \
         to the lesson. Respond strictly in this JSON format without any additional text:\n\
         {{\"answer\": \"...\", \"relatedConcepts\": [\"...\"], \"additionalResources\": [\"...\"]}}",
        content_excerpt(lesson_content, ANSWER_CONTENT_CHARS)
    )
}

/// Prompt asking a model for follow-up questions a student might ask.
#[must_use]
pub(crate) fn suggestions_prompt(lesson_title: &str, lesson_content: &str) -> String {
    format!(
        "Based on this C++ lesson about \"{lesson_title}\", suggest 3-4 follow-up \
         questions a beginner might have.\n\n\
         Lesson Content: {}...\n\n\
         Respond strictly in this JSON format without any additional text:\n\
         {{\"questions\": [\"...\"]}}",
        content_excerpt(lesson_content, SUGGESTION_CONTENT_CHARS)
    )
}

//
// ─── TUTOR CONTRACT ────────────────────────────────────────────────────────────
//

/// Question-answering collaborator for lesson pages.
#[async_trait]
pub trait Tutor: Send + Sync {
    /// # Errors
    ///
    /// Returns `TutorError` when the tutor cannot be reached or replies with
    /// something that is not a valid answer.
    async fn answer_question(
        &self,
        lesson_title: &str,
        lesson_content: &str,
        question: &str,
    ) -> Result<TutorAnswer, TutorError>;

    /// # Errors
    ///
    /// Returns `TutorError` when the tutor cannot be reached or replies with
    /// something that is not a list of questions.
    async fn suggest_questions(
        &self,
        lesson_title: &str,
        lesson_content: &str,
    ) -> Result<SuggestedQuestions, TutorError>;
}

/// Text-completion backend behind [`ModelTutor`].
#[async_trait]
pub trait TutorModel: Send + Sync {
    /// Complete `prompt` and return the raw reply text.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::Unavailable` when the model cannot be reached.
    async fn complete(&self, prompt: &str) -> Result<String, TutorError>;
}

/// [`Tutor`] that builds prompts for a [`TutorModel`] and decodes its JSON replies.
#[derive(Clone)]
pub struct ModelTutor {
    model: Arc<dyn TutorModel>,
}

impl ModelTutor {
    #[must_use]
    pub fn new(model: Arc<dyn TutorModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Tutor for ModelTutor {
    async fn answer_question(
        &self,
        lesson_title: &str,
        lesson_content: &str,
        question: &str,
    ) -> Result<TutorAnswer, TutorError> {
        let prompt = answer_prompt(lesson_title, lesson_content, question);
        let raw = self.model.complete(&prompt).await?;
        parse_tutor_reply(&raw)
    }

    async fn suggest_questions(
        &self,
        lesson_title: &str,
        lesson_content: &str,
    ) -> Result<SuggestedQuestions, TutorError> {
        let prompt = suggestions_prompt(lesson_title, lesson_content);
        let raw = self.model.complete(&prompt).await?;
        parse_tutor_reply(&raw)
    }
}

//
// ─── VIEW-SCOPED HELPER ────────────────────────────────────────────────────────
//

/// Liveness flag for the view that issued a request.
///
/// Clones share the flag; closing any clone closes them all.
#[derive(Debug, Clone)]
pub struct ViewScope {
    open: Arc<AtomicBool>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::open()
    }
}

impl ViewScope {
    #[must_use]
    pub fn open() -> Self {
        Self {
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

/// Talks to a [`Tutor`] on behalf of one lesson view.
///
/// Replies that arrive after the view closed are dropped: the helper returns
/// `Ok(None)` and the caller has nothing to apply.
#[derive(Clone)]
pub struct TutorHelper {
    tutor: Arc<dyn Tutor>,
    scope: ViewScope,
}

impl TutorHelper {
    #[must_use]
    pub fn new(tutor: Arc<dyn Tutor>, scope: ViewScope) -> Self {
        Self { tutor, scope }
    }

    #[must_use]
    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// Ask a follow-up question about `lesson`.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::EmptyQuestion` for a blank question, or the tutor's
    /// own error while the view is still open.
    pub async fn ask(&self, lesson: &Lesson, question: &str) -> Result<Option<TutorAnswer>, TutorError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(TutorError::EmptyQuestion);
        }
        let reply = self
            .tutor
            .answer_question(lesson.title(), lesson.content(), question)
            .await;
        self.deliver(lesson, reply)
    }

    /// Fetch suggested follow-up questions for `lesson`.
    ///
    /// # Errors
    ///
    /// Returns the tutor's error while the view is still open.
    pub async fn suggestions(&self, lesson: &Lesson) -> Result<Option<SuggestedQuestions>, TutorError> {
        let reply = self
            .tutor
            .suggest_questions(lesson.title(), lesson.content())
            .await;
        self.deliver(lesson, reply)
    }

    fn deliver<T>(&self, lesson: &Lesson, reply: Result<T, TutorError>) -> Result<Option<T>, TutorError> {
        if !self.scope.is_open() {
            tracing::debug!(lesson = %lesson.id(), "discarding tutor reply for closed view");
            return Ok(None);
        }
        reply.map(Some).inspect_err(|err| {
            tracing::warn!(lesson = %lesson.id(), error = %err, "tutor request failed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json_directly() {
        let reply: SuggestedQuestions =
            parse_tutor_reply(r#"{"questions": ["Why use std::endl?"]}"#).unwrap();
        assert_eq!(reply.questions, vec!["Why use std::endl?"]);
    }

    #[test]
    fn extracts_object_from_chatty_reply() {
        let raw = "Sure! Here you go:\n```json\n{\"answer\": \"Use a\tloop\",\n\"relatedConcepts\": [\"for\"]}\n```";
        let reply: TutorAnswer = parse_tutor_reply(raw).unwrap();
        assert_eq!(reply.answer, "Use aloop");
        assert_eq!(reply.related_concepts, vec!["for"]);
        assert!(reply.additional_resources.is_empty());
    }

    #[test]
    fn rejects_reply_without_object() {
        let err = parse_tutor_reply::<TutorAnswer>("I cannot help with that.").unwrap_err();
        assert!(matches!(err, TutorError::MalformedReply(_)));

        let err = parse_tutor_reply::<TutorAnswer>("} backwards {").unwrap_err();
        assert!(matches!(err, TutorError::MalformedReply(_)));
    }

    #[test]
    fn prompt_truncates_long_content() {
        let content = "x".repeat(ANSWER_CONTENT_CHARS + 500);
        let prompt = answer_prompt("Loops", &content, "What is a loop?");
        assert!(prompt.contains(&"x".repeat(ANSWER_CONTENT_CHARS)));
        assert!(!prompt.contains(&"x".repeat(ANSWER_CONTENT_CHARS + 1)));
        assert!(prompt.contains("What is a loop?"));
    }

    #[test]
    fn suggestion_prompt_keeps_less_content() {
        let content = "y".repeat(ANSWER_CONTENT_CHARS);
        let prompt = suggestions_prompt("Loops", &content);
        assert!(prompt.contains(&"y".repeat(SUGGESTION_CONTENT_CHARS)));
        assert!(!prompt.contains(&"y".repeat(SUGGESTION_CONTENT_CHARS + 1)));
    }

    /// Replies with canned text and remembers the last prompt.
    struct ScriptedModel {
        reply: Result<String, TutorError>,
        last_prompt: std::sync::Mutex<Option<String>>,
    }

    impl ScriptedModel {
        fn new(reply: Result<String, TutorError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                last_prompt: std::sync::Mutex::new(None),
            })
        }

        fn last_prompt(&self) -> String {
            self.last_prompt.lock().unwrap().clone().unwrap_or_default()
        }
    }

    #[async_trait]
    impl TutorModel for ScriptedModel {
        async fn complete(&self, prompt: &str) -> Result<String, TutorError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_owned());
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn model_tutor_decodes_chatty_answer() {
        let model = ScriptedModel::new(Ok(
            "Here is my answer: {\"answer\": \"A loop repeats\", \"relatedConcepts\": [\"while\"]}".into(),
        ));
        let tutor = ModelTutor::new(model.clone());

        let reply = tutor
            .answer_question("Loops", "Loops repeat code.", "What is a loop?")
            .await
            .unwrap();
        assert_eq!(reply.answer, "A loop repeats");
        assert_eq!(reply.related_concepts, vec!["while"]);
        assert!(model.last_prompt().contains("What is a loop?"));
    }

    #[tokio::test]
    async fn model_tutor_suggestions_use_short_excerpt() {
        let model = ScriptedModel::new(Ok(r#"{"questions": ["Why?", "How?"]}"#.into()));
        let tutor = ModelTutor::new(model.clone());

        let content = "z".repeat(900);
        let reply = tutor.suggest_questions("Loops", &content).await.unwrap();
        assert_eq!(reply.questions, vec!["Why?", "How?"]);
        let prompt = model.last_prompt();
        assert!(prompt.contains(&"z".repeat(SUGGESTION_CONTENT_CHARS)));
        assert!(!prompt.contains(&"z".repeat(SUGGESTION_CONTENT_CHARS + 1)));
    }

    #[tokio::test]
    async fn model_tutor_passes_through_failures() {
        let down = ModelTutor::new(ScriptedModel::new(Err(TutorError::Unavailable("offline".into()))));
        let err = down.suggest_questions("Loops", "").await.unwrap_err();
        assert_eq!(err, TutorError::Unavailable("offline".into()));

        let garbled = ModelTutor::new(ScriptedModel::new(Ok("no idea".into())));
        let err = garbled.answer_question("Loops", "", "Why?").await.unwrap_err();
        assert!(matches!(err, TutorError::MalformedReply(_)));
    }

    #[test]
    fn closing_a_clone_closes_the_scope() {
        let scope = ViewScope::open();
        let other = scope.clone();
        assert!(scope.is_open());
        other.close();
        assert!(!scope.is_open());
    }
}
