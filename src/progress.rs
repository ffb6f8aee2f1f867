use log::{info, warn};

use crate::db::Repository;
use crate::models::{LessonId, ProgressData, User};

pub const XP_PER_LESSON: u32 = 100;
pub const MINUTES_PER_LESSON: u32 = 15;

impl ProgressData {
    pub fn is_completed(&self, lesson_id: &LessonId) -> bool {
        self.completed_lessons.iter().any(|l| l == lesson_id.as_str())
    }

    pub fn score_for(&self, lesson_id: &LessonId) -> Option<u32> {
        self.quiz_scores.get(lesson_id.as_str()).copied()
    }

    /// Merges one completion into the snapshot. Returns true the first time a
    /// lesson is completed.
    pub fn record(&mut self, lesson_id: &LessonId, score_percent: u32) -> bool {
        let first = !self.is_completed(lesson_id);
        if first {
            self.completed_lessons.push(lesson_id.to_string());
        }
        self.quiz_scores.insert(lesson_id.to_string(), score_percent);
        // Every attempt counts, retakes included.
        self.time_spent_minutes += MINUTES_PER_LESSON;
        first
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    FirstCompletion { xp: u32 },
    Retake,
    // Nobody signed in; nothing was recorded.
    NoUser,
}

/// The signed-in user and their progress, written through to the repository
/// on every change.
pub struct ProgressStore {
    repo: Repository,
    user: Option<User>,
    progress: ProgressData,
}

impl ProgressStore {
    pub async fn restore(repo: Repository) -> anyhow::Result<Self> {
        let user = repo.load_user().await?;
        let progress = repo.load_progress().await?.unwrap_or_default();
        match &user {
            Some(u) => info!("Restored session for {} ({} XP)", u.username, u.xp),
            None => info!("No saved user, sign-in required"),
        }
        Ok(Self { repo, user, progress })
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn progress(&self) -> &ProgressData {
        &self.progress
    }

    pub async fn login(&mut self, user: User) -> anyhow::Result<&User> {
        self.repo.save_user(&user).await?;
        info!("{} signed in", user.username);
        Ok(self.user.insert(user))
    }

    /// Forgets the user. Progress stays on disk and in memory.
    pub async fn logout(&mut self) -> anyhow::Result<()> {
        self.repo.clear_user().await?;
        if let Some(u) = self.user.take() {
            info!("{} signed out", u.username);
        }
        Ok(())
    }

    /// Applies a finished attempt. Changes are staged on copies and only kept
    /// once storage accepted them. Progress is written before the user so a
    /// failed write can never leave XP granted for a lesson that is not stored
    /// as completed.
    pub async fn record_completion(&mut self, lesson_id: &LessonId, score_percent: u32) -> anyhow::Result<CompletionOutcome> {
        let Some(current) = self.user.as_ref() else {
            warn!("Completion of {} ignored, no user signed in", lesson_id);
            return Ok(CompletionOutcome::NoUser);
        };

        let mut progress = self.progress.clone();
        let mut user = current.clone();
        let first = progress.record(lesson_id, score_percent);

        self.repo.save_progress(&progress).await?;
        let outcome = if first {
            user.xp += XP_PER_LESSON;
            self.repo.save_user(&user).await?;
            CompletionOutcome::FirstCompletion { xp: user.xp }
        } else {
            CompletionOutcome::Retake
        };

        self.progress = progress;
        self.user = Some(user);
        info!("Recorded {} at {}% ({:?})", lesson_id, score_percent, outcome);
        Ok(outcome)
    }
}
