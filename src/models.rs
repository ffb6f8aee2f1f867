use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectType {
    Biology,
    Chemistry,
    Mathematics,
    Physics,
    Astronomy,
}

impl SubjectType {
    pub const ALL: [SubjectType; 5] = [
        SubjectType::Biology,
        SubjectType::Chemistry,
        SubjectType::Mathematics,
        SubjectType::Physics,
        SubjectType::Astronomy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SubjectType::Biology => "Biology",
            SubjectType::Chemistry => "Chemistry",
            SubjectType::Mathematics => "Mathematics",
            SubjectType::Physics => "Physics",
            SubjectType::Astronomy => "Astronomy",
        }
    }

    /// Prefix shared by every branch id of this subject ("BIO", "CHEM", ...).
    pub fn prefix(self) -> &'static str {
        match self {
            SubjectType::Biology => "BIO",
            SubjectType::Chemistry => "CHEM",
            SubjectType::Mathematics => "MATH",
            SubjectType::Physics => "PHYS",
            SubjectType::Astronomy => "ASTRO",
        }
    }

    pub fn icon(self) -> SubjectIcon {
        match self {
            SubjectType::Biology => SubjectIcon::Microscope,
            SubjectType::Chemistry => SubjectIcon::FlaskConical,
            SubjectType::Mathematics => SubjectIcon::Calculator,
            SubjectType::Physics => SubjectIcon::Atom,
            SubjectType::Astronomy => SubjectIcon::Rocket,
        }
    }

    /// Case-insensitive match on the subject name, as used in URLs.
    pub fn parse(s: &str) -> Option<SubjectType> {
        SubjectType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectIcon {
    Microscope,
    FlaskConical,
    Calculator,
    Atom,
    Rocket,
}

impl SubjectIcon {
    pub fn asset(self) -> &'static str {
        match self {
            SubjectIcon::Microscope => "icons/microscope.svg",
            SubjectIcon::FlaskConical => "icons/flask-conical.svg",
            SubjectIcon::Calculator => "icons/calculator.svg",
            SubjectIcon::Atom => "icons/atom.svg",
            SubjectIcon::Rocket => "icons/rocket.svg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub description: String,
    pub total_lessons: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectType,
    pub name: String,
    pub icon: SubjectIcon,
    pub color: String,
    pub description: String,
    pub branches: Vec<Branch>,
}

/// `{branchId}-L{lessonNumber}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(String);

impl LessonId {
    pub fn new(branch_id: &str, lesson_number: u32) -> Self {
        LessonId(format!("{}-L{}", branch_id, lesson_number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonContent {
    pub title: String,
    pub content: String, // Markdown
    pub visual_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressData {
    pub completed_lessons: Vec<String>,
    pub quiz_scores: BTreeMap<String, u32>,
    pub time_spent_minutes: u32,
    // Branch -> %, never computed
    pub mastery: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub avatar: String,
    pub xp: u32,
    pub streak: u32,
}

impl User {
    /// Builds the profile the sign-in form produces. No credentials are checked.
    pub fn sign_in(email: &str, username: Option<&str>) -> Self {
        let given = username.map(str::trim).filter(|u| !u.is_empty());
        let local_part = email.split('@').next().filter(|p| !p.is_empty());
        let display = given.or(local_part).unwrap_or("Learner");

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: display.to_string(),
            email: email.to_string(),
            avatar: format!(
                "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
                given.unwrap_or("Felix")
            ),
            xp: 0,
            streak: 1,
        }
    }
}
