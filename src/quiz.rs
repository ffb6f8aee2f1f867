use serde::Serialize;
use thiserror::Error;

use crate::models::QuizQuestion;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("no quiz available for this lesson")]
    NoQuestions,
    #[error("option {0} does not exist")]
    InvalidOption(usize),
    #[error("choose an answer before moving on")]
    NotAnswered,
    #[error("quiz already completed")]
    AlreadyCompleted,
    #[error("quiz is still in progress")]
    NotCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum QuizState {
    Answering { index: usize },
    Revealed { index: usize, chosen: usize },
    Completed { score_percent: u32 },
}

/// One attempt at a lesson quiz. The first option picked for a question is final.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    state: QuizState,
    correct: usize,
}

impl QuizSession {
    pub fn new(questions: Vec<QuizQuestion>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        Ok(Self {
            questions,
            state: QuizState::Answering { index: 0 },
            correct: 0,
        })
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn correct_so_far(&self) -> usize {
        self.correct
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        match self.state {
            QuizState::Answering { index } | QuizState::Revealed { index, .. } => self.questions.get(index),
            QuizState::Completed { .. } => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, QuizState::Completed { .. })
    }

    /// Share of questions already behind the learner, as shown in the quiz header.
    pub fn progress_percent(&self) -> u32 {
        match self.state {
            QuizState::Answering { index } | QuizState::Revealed { index, .. } => {
                score_percent(index, self.questions.len())
            }
            QuizState::Completed { .. } => 100,
        }
    }

    /// Returns `Ok(true)` when the answer was locked in, `Ok(false)` when the
    /// question already had one.
    pub fn select(&mut self, option: usize) -> Result<bool, QuizError> {
        match self.state {
            QuizState::Answering { index } => {
                if option >= self.questions[index].options.len() {
                    return Err(QuizError::InvalidOption(option));
                }
                self.state = QuizState::Revealed { index, chosen: option };
                Ok(true)
            }
            QuizState::Revealed { .. } => Ok(false),
            QuizState::Completed { .. } => Err(QuizError::AlreadyCompleted),
        }
    }

    /// Scores the revealed answer and moves on. Yields the final percentage
    /// only on the step that completes the quiz.
    pub fn advance(&mut self) -> Result<Option<u32>, QuizError> {
        let (index, chosen) = match self.state {
            QuizState::Revealed { index, chosen } => (index, chosen),
            QuizState::Answering { .. } => return Err(QuizError::NotAnswered),
            QuizState::Completed { .. } => return Err(QuizError::AlreadyCompleted),
        };

        if chosen == self.questions[index].correct_answer {
            self.correct += 1;
        }

        if index + 1 >= self.questions.len() {
            let score = score_percent(self.correct, self.questions.len());
            self.state = QuizState::Completed { score_percent: score };
            Ok(Some(score))
        } else {
            self.state = QuizState::Answering { index: index + 1 };
            Ok(None)
        }
    }

    pub fn retry(&mut self) -> Result<(), QuizError> {
        if !self.is_completed() {
            return Err(QuizError::NotCompleted);
        }
        self.state = QuizState::Answering { index: 0 };
        self.correct = 0;
        Ok(())
    }
}

/// `round(correct / total * 100)`, halves rounded up.
pub fn score_percent(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct * 200 + total) / (total * 2)) as u32
}

#[cfg(test)]
#[path = "quiz_tests.rs"]
mod tests;
