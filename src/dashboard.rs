use serde::Serialize;

use crate::data::catalog;
use crate::models::{ProgressData, SubjectType, User};

const RECENT_QUIZZES: usize = 10;
// Subject totals are scaled down so the chart bars stay comparable.
const TOTAL_SCALE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreBand {
    Strong,
    Fair,
    Weak,
}

impl ScoreBand {
    pub fn for_score(score: u32) -> Self {
        if score >= 80 {
            ScoreBand::Strong
        } else if score >= 50 {
            ScoreBand::Fair
        } else {
            ScoreBand::Weak
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMastery {
    pub subject: SubjectType,
    pub completed: usize,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub label: String,
    pub lesson_id: String,
    pub score: u32,
    pub band: ScoreBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub username: String,
    pub xp: u32,
    pub streak: u32,
    pub completed_lessons: usize,
    pub hours: u32,
    pub minutes: u32,
    pub mastery: Vec<SubjectMastery>,
    pub recent_quizzes: Vec<QuizResult>,
}

pub fn summarize(user: &User, progress: &ProgressData) -> DashboardSummary {
    let mastery = catalog()
        .iter()
        .map(|subject| {
            let prefix = format!("{}-", subject.id.prefix());
            SubjectMastery {
                subject: subject.id,
                completed: progress
                    .completed_lessons
                    .iter()
                    .filter(|l| l.starts_with(&prefix))
                    .count(),
                total: subject.branches.iter().map(|b| b.total_lessons).sum::<u32>() / TOTAL_SCALE,
            }
        })
        .collect();

    // Scores are listed in first-completion order.
    let scored: Vec<QuizResult> = progress
        .completed_lessons
        .iter()
        .filter_map(|id| progress.quiz_scores.get(id).map(|s| (id, *s)))
        .map(|(id, score)| QuizResult {
            label: format!("Quiz {}", id.rsplit('-').next().unwrap_or(id)),
            lesson_id: id.clone(),
            score,
            band: ScoreBand::for_score(score),
        })
        .collect();
    let skip = scored.len().saturating_sub(RECENT_QUIZZES);

    DashboardSummary {
        username: user.username.clone(),
        xp: user.xp,
        streak: user.streak,
        completed_lessons: progress.completed_lessons.len(),
        hours: progress.time_spent_minutes / 60,
        minutes: progress.time_spent_minutes % 60,
        mastery,
        recent_quizzes: scored.into_iter().skip(skip).collect(),
    }
}
