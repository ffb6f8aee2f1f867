use std::sync::Arc;

use log::{error, warn};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use crate::gemini::{GenerateRequest, GenerativeTransport};
use crate::models::{LessonContent, QuizQuestion};

pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no API key configured")]
    MissingCredential,
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("service returned no text")]
    EmptyResponse,
    #[error("response is not valid JSON for the schema: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("response does not match the schema: {0}")]
    SchemaMismatch(String),
}

/// Turns (subject, branch, lesson) into lesson text and a quiz. Never fails:
/// every error is logged and replaced by placeholder content.
#[derive(Clone)]
pub struct ContentGenerator {
    api_key: Option<String>,
    model: String,
    transport: Arc<dyn GenerativeTransport>,
}

impl ContentGenerator {
    pub fn new(api_key: Option<String>, model: impl Into<String>, transport: Arc<dyn GenerativeTransport>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            transport,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn generate_lesson(&self, subject: &str, branch: &str, lesson_number: u32) -> LessonContent {
        match self.try_generate_lesson(subject, branch, lesson_number).await {
            Ok(lesson) => lesson,
            Err(GenerationError::MissingCredential) => {
                warn!("No API key configured, serving placeholder lesson");
                missing_key_lesson()
            }
            Err(e) => {
                error!("Gemini Lesson Error: {}", e);
                error_lesson()
            }
        }
    }

    pub async fn generate_quiz(&self, subject: &str, branch: &str, lesson_title: &str) -> Vec<QuizQuestion> {
        match self.try_generate_quiz(subject, branch, lesson_title).await {
            Ok(quiz) => quiz,
            Err(GenerationError::MissingCredential) => Vec::new(),
            Err(e) => {
                error!("Gemini Quiz Error: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn try_generate_lesson(
        &self,
        subject: &str,
        branch: &str,
        lesson_number: u32,
    ) -> Result<LessonContent, GenerationError> {
        let prompt = lesson_prompt(subject, branch, lesson_number);
        self.request(prompt, lesson_schema()).await
    }

    pub async fn try_generate_quiz(
        &self,
        subject: &str,
        branch: &str,
        lesson_title: &str,
    ) -> Result<Vec<QuizQuestion>, GenerationError> {
        let prompt = quiz_prompt(subject, branch, lesson_title);
        let quiz: Vec<QuizQuestion> = self.request(prompt, quiz_schema()).await?;
        validate_quiz(&quiz)?;
        Ok(quiz)
    }

    async fn request<T: DeserializeOwned>(&self, prompt: String, response_schema: Value) -> Result<T, GenerationError> {
        let api_key = self.api_key.clone().ok_or(GenerationError::MissingCredential)?;
        let request = GenerateRequest {
            api_key,
            model: self.model.clone(),
            prompt,
            response_schema,
        };

        let text = self
            .transport
            .generate(&request)
            .await
            .map_err(|e| GenerationError::Transport(format!("{:#}", e)))?;
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn validate_quiz(quiz: &[QuizQuestion]) -> Result<(), GenerationError> {
    for (i, q) in quiz.iter().enumerate() {
        if q.options.len() != OPTIONS_PER_QUESTION {
            return Err(GenerationError::SchemaMismatch(format!(
                "question {} has {} options",
                i + 1,
                q.options.len()
            )));
        }
        if q.correct_answer >= OPTIONS_PER_QUESTION {
            return Err(GenerationError::SchemaMismatch(format!(
                "question {} has correct answer index {}",
                i + 1,
                q.correct_answer
            )));
        }
    }
    Ok(())
}

pub fn missing_key_lesson() -> LessonContent {
    LessonContent {
        title: "API Key Missing".to_string(),
        content: "Please configure your Gemini API Key to view content.".to_string(),
        visual_prompt: "Error icon".to_string(),
    }
}

pub fn error_lesson() -> LessonContent {
    LessonContent {
        title: "Error Loading Lesson".to_string(),
        content: "We could not generate this lesson at the moment. Please try again.".to_string(),
        visual_prompt: "Broken robot".to_string(),
    }
}

fn lesson_prompt(subject: &str, branch: &str, lesson_number: u32) -> String {
    format!(
        "Create a comprehensive educational lesson for:\n\
         Subject: {}\n\
         Branch: {}\n\
         Lesson Number: {}\n\n\
         The output must be a JSON object with:\n\
         1. 'title': A catchy and relevant title for this specific lesson number.\n\
         2. 'content': The lesson text in Markdown format. Use headers, bullet points, and clear language. Keep it under 500 words but informative.\n\
         3. 'visualPrompt': A short description of a 3D diagram or visual aid that would best explain the core concept of this lesson (e.g., \"A rotating 3D DNA double helix structure\").",
        subject, branch, lesson_number
    )
}

fn quiz_prompt(subject: &str, branch: &str, lesson_title: &str) -> String {
    format!(
        "Create a 5-question multiple choice quiz for a lesson titled \"{}\" in {} ({}).\n\n\
         Return a JSON array of objects. Each object must have:\n\
         - question (string)\n\
         - options (array of 4 strings)\n\
         - correctAnswer (integer 0-3, index of the correct option)\n\
         - explanation (string explaining why the answer is correct)",
        lesson_title, subject, branch
    )
}

fn lesson_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {"type": "STRING"},
            "content": {"type": "STRING"},
            "visualPrompt": {"type": "STRING"},
        },
        "required": ["title", "content", "visualPrompt"],
    })
}

fn quiz_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": {"type": "STRING"},
                "options": {"type": "ARRAY", "items": {"type": "STRING"}},
                "correctAnswer": {"type": "INTEGER"},
                "explanation": {"type": "STRING"},
            },
            "required": ["question", "options", "correctAnswer", "explanation"],
        }
    })
}

#[cfg(test)]
#[path = "generator_tests.rs"]
pub(crate) mod tests;
