use log::{debug, error, info};
use serde::Serialize;
use thiserror::Error;

use crate::data::{find_branch, find_subject};
use crate::generator::ContentGenerator;
use crate::models::{Branch, LessonContent, LessonId, Subject, SubjectType};
use crate::progress::{CompletionOutcome, ProgressStore};
use crate::quiz::{QuizError, QuizSession, QuizState};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("no lesson is open")]
    NoActiveLesson,
    #[error("no user signed in")]
    SignedOut,
    #[error("a newer lesson was requested")]
    Superseded,
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// A generated lesson and, when the service produced one, its quiz attempt.
pub struct ActiveLesson {
    pub subject: SubjectType,
    pub branch: Branch,
    pub lesson_number: u32,
    pub lesson_id: LessonId,
    pub content: LessonContent,
    pub quiz: Option<QuizSession>,
}

impl ActiveLesson {
    /// Generates the lesson, then its quiz from the lesson title. The two calls
    /// run one after the other.
    pub async fn generate(generator: &ContentGenerator, subject: &Subject, branch: &Branch, lesson_number: u32) -> Self {
        let content = generator
            .generate_lesson(subject.name.as_str(), &branch.name, lesson_number)
            .await;
        let questions = generator
            .generate_quiz(subject.name.as_str(), &branch.name, &content.title)
            .await;

        // An empty quiz means "no quiz available" rather than a division by zero later.
        let quiz = QuizSession::new(questions).ok();

        Self {
            subject: subject.id,
            branch: branch.clone(),
            lesson_number,
            lesson_id: LessonId::new(&branch.id, lesson_number),
            content,
            quiz,
        }
    }

    fn quiz_mut(&mut self) -> Result<&mut QuizSession, AppError> {
        self.quiz.as_mut().ok_or(AppError::Quiz(QuizError::NoQuestions))
    }
}

pub fn resolve_branch(subject: &str, branch_id: &str) -> Result<(&'static Subject, &'static Branch), AppError> {
    let subject = SubjectType::parse(subject)
        .and_then(find_subject)
        .ok_or_else(|| AppError::NotFound(format!("subject '{}'", subject)))?;
    let branch = find_branch(subject, branch_id)
        .ok_or_else(|| AppError::NotFound(format!("branch '{}'", branch_id)))?;
    Ok((subject, branch))
}

/// Lessons are numbered `1..=total_lessons`.
pub fn check_lesson(branch: &Branch, lesson_number: u32) -> Result<(), AppError> {
    if lesson_number == 0 || lesson_number > branch.total_lessons {
        return Err(AppError::NotFound(format!("lesson {} of {}", lesson_number, branch.name)));
    }
    Ok(())
}

pub fn resolve(subject: &str, branch_id: &str, lesson_number: u32) -> Result<(&'static Subject, &'static Branch), AppError> {
    let (subject, branch) = resolve_branch(subject, branch_id)?;
    check_lesson(branch, lesson_number)?;
    Ok((subject, branch))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizFinished {
    pub score_percent: u32,
    pub outcome: CompletionOutcome,
}

pub struct App {
    pub generator: ContentGenerator,
    pub store: ProgressStore,
    pub active: Option<ActiveLesson>,
    // Ticket of the most recent lesson request.
    latest_request: u64,
}

impl App {
    pub fn new(generator: ContentGenerator, store: ProgressStore) -> Self {
        Self {
            generator,
            store,
            active: None,
            latest_request: 0,
        }
    }

    /// Takes a ticket for a lesson about to be generated. Only the newest
    /// ticket may open its lesson.
    pub fn begin_open(&mut self) -> u64 {
        self.latest_request += 1;
        self.latest_request
    }

    /// Installs a generated lesson if no newer request was made meanwhile.
    /// A stale lesson is dropped and `None` returned.
    pub fn open_lesson(&mut self, ticket: u64, lesson: ActiveLesson) -> Option<&ActiveLesson> {
        if ticket != self.latest_request {
            debug!(
                "Discarding {} (request {}, latest is {})",
                lesson.lesson_id, ticket, self.latest_request
            );
            return None;
        }
        info!(
            "Opened {} ({}), quiz: {}",
            lesson.lesson_id,
            lesson.content.title,
            lesson.quiz.as_ref().map_or(0, |q| q.question_count())
        );
        Some(self.active.insert(lesson))
    }

    fn active_mut(&mut self) -> Result<&mut ActiveLesson, AppError> {
        self.active.as_mut().ok_or(AppError::NoActiveLesson)
    }

    pub fn select_answer(&mut self, option: usize) -> Result<bool, AppError> {
        Ok(self.active_mut()?.quiz_mut()?.select(option)?)
    }

    /// Moves to the next question. When this finishes the quiz the score is
    /// handed to the progress store, once per attempt. If storage refuses it
    /// the quiz stays completed and the learner has to retry.
    pub async fn next_question(&mut self) -> Result<Option<QuizFinished>, AppError> {
        let active = self.active.as_mut().ok_or(AppError::NoActiveLesson)?;
        let Some(score_percent) = active.quiz_mut()?.advance()? else {
            return Ok(None);
        };

        let outcome = match self.store.record_completion(&active.lesson_id, score_percent).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Score {}% for {} was not saved: {:#}", score_percent, active.lesson_id, e);
                return Err(e.into());
            }
        };
        Ok(Some(QuizFinished { score_percent, outcome }))
    }

    pub fn retry_quiz(&mut self) -> Result<(), AppError> {
        Ok(self.active_mut()?.quiz_mut()?.retry()?)
    }

    pub fn quiz_view(&self) -> Result<QuizView, AppError> {
        let active = self.active.as_ref().ok_or(AppError::NoActiveLesson)?;
        let quiz = active.quiz.as_ref().ok_or(AppError::Quiz(QuizError::NoQuestions))?;
        Ok(QuizView::of(&active.lesson_id, quiz))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub number: usize,
    pub question: String,
    pub options: Vec<String>,
    // Only filled once the learner has answered.
    pub correct_answer: Option<usize>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub lesson_id: LessonId,
    pub question_count: usize,
    pub progress_percent: u32,
    pub correct_so_far: usize,
    pub state: QuizState,
    pub question: Option<QuestionView>,
}

impl QuizView {
    pub fn of(lesson_id: &LessonId, quiz: &QuizSession) -> Self {
        let state = quiz.state();
        let question = match state {
            QuizState::Answering { index } | QuizState::Revealed { index, .. } => {
                let q = &quiz.questions()[index];
                let revealed = matches!(state, QuizState::Revealed { .. });
                Some(QuestionView {
                    number: index + 1,
                    question: q.question.clone(),
                    options: q.options.clone(),
                    correct_answer: revealed.then_some(q.correct_answer),
                    explanation: revealed.then(|| q.explanation.clone()),
                })
            }
            QuizState::Completed { .. } => None,
        };

        Self {
            lesson_id: lesson_id.clone(),
            question_count: quiz.question_count(),
            progress_percent: quiz.progress_percent(),
            correct_so_far: quiz.correct_so_far(),
            state,
            question,
        }
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
