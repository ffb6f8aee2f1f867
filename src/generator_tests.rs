use super::*;
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

/// Replays canned replies and records every request it receives.
#[derive(Default)]
pub struct MockTransport {
    pub replies: Mutex<VecDeque<anyhow::Result<String>>>,
    pub calls: Mutex<Vec<GenerateRequest>>,
}

impl MockTransport {
    pub fn replying(replies: Vec<anyhow::Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::default(),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeTransport for MockTransport {
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("no reply scripted")))
    }
}

fn generator(transport: Arc<MockTransport>) -> ContentGenerator {
    ContentGenerator::new(Some("test-key".into()), "gemini-2.5-flash", transport)
}

const LESSON_JSON: &str = r#"{"title":"Inside the Cell","content":"Cells are **small**.","visualPrompt":"A rotating 3D cell"}"#;

fn quiz_json(count: usize) -> String {
    let questions: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"question":"Q{}","options":["a","b","c","d"],"correctAnswer":{},"explanation":"because"}}"#,
                i,
                i % 4
            )
        })
        .collect();
    format!("[{}]", questions.join(","))
}

#[tokio::test]
async fn lesson_is_parsed_from_constrained_json() {
    let transport = MockTransport::replying(vec![Ok(LESSON_JSON.to_string())]);
    let lesson = generator(transport.clone()).generate_lesson("Biology", "Cell Biology", 3).await;

    assert_eq!(lesson.title, "Inside the Cell");
    assert_eq!(lesson.visual_prompt, "A rotating 3D cell");

    let calls = transport.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].api_key, "test-key");
    assert_eq!(calls[0].model, "gemini-2.5-flash");
    assert!(calls[0].prompt.contains("Subject: Biology"));
    assert!(calls[0].prompt.contains("Branch: Cell Biology"));
    assert!(calls[0].prompt.contains("Lesson Number: 3"));
    assert_eq!(calls[0].response_schema["required"], json!(["title", "content", "visualPrompt"]));
}

#[tokio::test]
async fn quiz_is_parsed_and_prompt_names_the_lesson() {
    let transport = MockTransport::replying(vec![Ok(quiz_json(5))]);
    let quiz = generator(transport.clone())
        .generate_quiz("Physics", "Optics", "Bending Light")
        .await;

    assert_eq!(quiz.len(), 5);
    assert_eq!(quiz[2].correct_answer, 2);
    assert_eq!(quiz[0].options.len(), 4);

    let calls = transport.calls.lock().unwrap();
    assert!(calls[0].prompt.contains("\"Bending Light\" in Physics (Optics)"));
    assert_eq!(calls[0].response_schema["type"], "ARRAY");
}

#[tokio::test]
async fn missing_key_short_circuits_without_network() {
    let transport = MockTransport::replying(vec![Ok(LESSON_JSON.to_string())]);
    let generator = ContentGenerator::new(None, "gemini-2.5-flash", transport.clone());

    let lesson = generator.generate_lesson("Astronomy", "Cosmology", 1).await;
    let quiz = generator.generate_quiz("Astronomy", "Cosmology", &lesson.title).await;

    assert_eq!(lesson.title, "API Key Missing");
    assert_eq!(lesson.visual_prompt, "Error icon");
    assert!(quiz.is_empty());
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn blank_key_counts_as_missing() {
    let transport = MockTransport::replying(vec![]);
    let generator = ContentGenerator::new(Some("   ".into()), "m", transport.clone());
    assert!(!generator.has_credential());
    assert_eq!(generator.generate_lesson("Biology", "Botany", 1).await, missing_key_lesson());
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn transport_error_yields_error_lesson_and_empty_quiz() {
    let transport = MockTransport::replying(vec![
        Err(anyhow::anyhow!("connection refused")),
        Err(anyhow::anyhow!("503")),
    ]);
    let generator = generator(transport.clone());

    assert_eq!(generator.generate_lesson("Biology", "Botany", 2).await, error_lesson());
    assert!(generator.generate_quiz("Biology", "Botany", "x").await.is_empty());
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn unparsable_or_empty_text_falls_back() {
    let transport = MockTransport::replying(vec![
        Ok("not json at all".to_string()),
        Ok("   ".to_string()),
        Ok(r#"{"title":"only a title"}"#.to_string()),
        Ok("{\"question\":\"not an array\"}".to_string()),
    ]);
    let generator = generator(transport);

    assert_eq!(generator.generate_lesson("Chemistry", "Optics", 1).await.title, "Error Loading Lesson");
    assert_eq!(generator.generate_lesson("Chemistry", "Optics", 1).await.title, "Error Loading Lesson");
    assert_eq!(generator.generate_lesson("Chemistry", "Optics", 1).await.title, "Error Loading Lesson");
    assert!(generator.generate_quiz("Chemistry", "Optics", "t").await.is_empty());
}

#[tokio::test]
async fn schema_mismatch_in_quiz_is_rejected() {
    let three_options = r#"[{"question":"Q","options":["a","b","c"],"correctAnswer":0,"explanation":"e"}]"#;
    let out_of_range = r#"[{"question":"Q","options":["a","b","c","d"],"correctAnswer":4,"explanation":"e"}]"#;
    let transport = MockTransport::replying(vec![Ok(three_options.into()), Ok(out_of_range.into())]);
    let generator = generator(transport);

    assert!(matches!(
        generator.try_generate_quiz("Mathematics", "Algebra", "t").await,
        Err(GenerationError::SchemaMismatch(_))
    ));
    assert!(generator.generate_quiz("Mathematics", "Algebra", "t").await.is_empty());
}

#[tokio::test]
async fn errors_are_classified() {
    let transport = MockTransport::replying(vec![Ok(String::new()), Ok("{".into())]);
    let generator = generator(transport);

    assert!(matches!(
        generator.try_generate_lesson("Physics", "Optics", 1).await,
        Err(GenerationError::EmptyResponse)
    ));
    assert!(matches!(
        generator.try_generate_lesson("Physics", "Optics", 1).await,
        Err(GenerationError::Malformed(_))
    ));
}

#[tokio::test]
async fn identical_calls_are_not_cached() {
    let transport = MockTransport::replying(vec![Ok(LESSON_JSON.into()), Ok(LESSON_JSON.into())]);
    let generator = generator(transport.clone());

    generator.generate_lesson("Biology", "Genetics", 1).await;
    generator.generate_lesson("Biology", "Genetics", 1).await;
    assert_eq!(transport.call_count(), 2);
}
