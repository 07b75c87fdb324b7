use std::collections::HashSet;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type QuestionId = u32;

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("could not read question file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed question file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("survey has no questions")]
    NoQuestions,

    #[error("question {0} has no answers")]
    NoAnswers(QuestionId),

    #[error("question id {0} is used more than once")]
    DuplicateId(QuestionId),

    #[error("question ids start at 1")]
    ZeroId,

    #[error("single-question mode takes exactly one question, got {0}")]
    TooManyForSingle(usize),
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum SurveyMode {
    #[default]
    Single,
    Multi,
}

impl SurveyMode {
    pub fn toggled(self) -> Self {
        match self {
            SurveyMode::Single => SurveyMode::Multi,
            SurveyMode::Multi => SurveyMode::Single,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    pub answers: Vec<String>,
}

impl Question {
    fn new(id: QuestionId, title: &str, answers: &[&str]) -> Self {
        Self {
            id,
            title: title.to_string(),
            answers: answers.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Ordered, validated list of questions shown in one survey attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Questionnaire {
    mode: SurveyMode,
    questions: Vec<Question>,
}

impl Questionnaire {
    pub fn new(mode: SurveyMode, questions: Vec<Question>) -> Result<Self, SurveyError> {
        if questions.is_empty() {
            return Err(SurveyError::NoQuestions);
        }
        if mode == SurveyMode::Single && questions.len() > 1 {
            return Err(SurveyError::TooManyForSingle(questions.len()));
        }

        let mut seen = HashSet::new();
        for q in &questions {
            if q.id == 0 {
                return Err(SurveyError::ZeroId);
            }
            if q.answers.is_empty() {
                return Err(SurveyError::NoAnswers(q.id));
            }
            if !seen.insert(q.id) {
                return Err(SurveyError::DuplicateId(q.id));
            }
        }

        Ok(Self { mode, questions })
    }

    /// Built-in question set for the given mode
    pub fn builtin(mode: SurveyMode) -> Self {
        let questions = match mode {
            SurveyMode::Single => vec![Question::new(
                1,
                "How are you feeling today?",
                &[
                    "Very Happy",
                    "Somewhat Happy",
                    "Neutral",
                    "Somewhat Unhappy",
                    "Very Unhappy",
                ],
            )],
            SurveyMode::Multi => vec![
                Question::new(
                    1,
                    "How satisfied are you with your work-life balance?",
                    &[
                        "Very Satisfied",
                        "Somewhat Satisfied",
                        "Neutral",
                        "Somewhat Dissatisfied",
                        "Very Dissatisfied",
                    ],
                ),
                Question::new(
                    2,
                    "How often do you feel stressed during daily routines?",
                    &["Never", "Rarely", "Sometimes", "Often", "Always"],
                ),
            ],
        };
        Self { mode, questions }
    }

    /// Load a JSON array of `{id, title, answers}` records
    pub fn from_path<P: AsRef<Path>>(mode: SurveyMode, path: P) -> Result<Self, SurveyError> {
        let bytes = fs::read(path)?;
        let questions: Vec<Question> = serde_json::from_slice(&bytes)?;
        Self::new(mode, questions)
    }

    pub fn mode(&self) -> SurveyMode {
        self.mode
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn ids(&self) -> Vec<QuestionId> {
        self.questions.iter().map(|q| q.id).collect()
    }

    pub fn first_id(&self) -> QuestionId {
        self.questions[0].id
    }

    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
