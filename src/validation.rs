//! Construction-time guards for every row the store writes.
//!
//! Store insert functions only accept the types defined here, so a value that
//! reaches the database has already passed its length, range and presence checks.

use std::collections::HashSet;

use crate::entities::chat;
use crate::error::{Error, Result};
use crate::services::envelope::QuizPayload;

pub const CHAT_NAME_MAX_LEN: usize = 50;
pub const ATTITUDE_MAX_LEN: usize = 50;
pub const DIFFICULTY_MAX_LEN: usize = 50;
pub const EDUCATION_LEVEL_MAX_LEN: usize = 50;
pub const STUDY_AREA_MAX_LEN: usize = 100;
pub const MIN_QUIZ_LENGTH: i32 = 1;
pub const MAX_QUIZ_LENGTH: i32 = 20;
pub const QUIZ_NAME_MAX_LEN: usize = 100;
pub const QUESTION_TEXT_MAX_LEN: usize = 1000;
pub const OPTION_LABEL_MAX_LEN: usize = 10;
pub const OPTION_VALUE_MAX_LEN: usize = 500;
pub const USERNAME_MAX_LEN: usize = 50;
pub const MESSAGE_MAX_LEN: usize = 20_000;

fn required(field: &str, value: &str, max_len: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_argument(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max_len {
        return Err(Error::invalid_argument(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Blank optional values are stored as NULL.
fn optional(field: &str, value: Option<&str>, max_len: usize) -> Result<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => required(field, v, max_len).map(Some),
    }
}

/// Validated chat configuration, shared by chat creation, chat updates and
/// prompt rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    name: String,
    response_attitude: String,
    quiz_difficulty: String,
    quiz_length: i32,
    education_level: Option<String>,
    study_area: Option<String>,
}

impl ChatSettings {
    pub fn new(
        name: &str,
        response_attitude: &str,
        quiz_difficulty: &str,
        quiz_length: i32,
        education_level: Option<&str>,
        study_area: Option<&str>,
    ) -> Result<Self> {
        if !(MIN_QUIZ_LENGTH..=MAX_QUIZ_LENGTH).contains(&quiz_length) {
            return Err(Error::invalid_argument(format!(
                "quiz length must be between {MIN_QUIZ_LENGTH} and {MAX_QUIZ_LENGTH}"
            )));
        }
        Ok(Self {
            name: required("chat name", name, CHAT_NAME_MAX_LEN)?,
            response_attitude: required("response attitude", response_attitude, ATTITUDE_MAX_LEN)?,
            quiz_difficulty: required("quiz difficulty", quiz_difficulty, DIFFICULTY_MAX_LEN)?,
            quiz_length,
            education_level: optional(
                "education level",
                education_level,
                EDUCATION_LEVEL_MAX_LEN,
            )?,
            study_area: optional("study area", study_area, STUDY_AREA_MAX_LEN)?,
        })
    }

    pub fn from_chat(chat: &chat::Model) -> Result<Self> {
        Self::new(
            &chat.name,
            &chat.response_attitude,
            &chat.quiz_difficulty,
            chat.quiz_length,
            chat.education_level.as_deref(),
            chat.study_area.as_deref(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn response_attitude(&self) -> &str {
        &self.response_attitude
    }

    pub fn quiz_difficulty(&self) -> &str {
        &self.quiz_difficulty
    }

    pub fn quiz_length(&self) -> i32 {
        self.quiz_length
    }

    pub fn education_level(&self) -> Option<&str> {
        self.education_level.as_deref()
    }

    pub fn study_area(&self) -> Option<&str> {
        self.study_area.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    chat_id: i32,
    content: String,
    from_user: bool,
    is_quiz: bool,
}

impl NewMessage {
    pub fn new(chat_id: i32, content: &str, from_user: bool, is_quiz: bool) -> Result<Self> {
        Ok(Self {
            chat_id,
            content: required("message content", content, MESSAGE_MAX_LEN)?,
            from_user,
            is_quiz,
        })
    }

    pub fn chat_id(&self) -> i32 {
        self.chat_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn from_user(&self) -> bool {
        self.from_user
    }

    pub fn is_quiz(&self) -> bool {
        self.is_quiz
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    username: String,
    password_hash: String,
}

impl NewUser {
    pub fn new(username: &str, password_hash: String) -> Result<Self> {
        if password_hash.is_empty() {
            return Err(Error::invalid_argument("password hash must not be empty"));
        }
        Ok(Self {
            username: required("username", username, USERNAME_MAX_LEN)?,
            password_hash,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswerOption {
    label: String,
    value: String,
    is_answer: bool,
}

impl NewAnswerOption {
    pub fn new(label: &str, value: &str, is_answer: bool) -> Result<Self> {
        Ok(Self {
            label: required("option label", label, OPTION_LABEL_MAX_LEN)?,
            value: required("option value", value, OPTION_VALUE_MAX_LEN)?,
            is_answer,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_answer(&self) -> bool {
        self.is_answer
    }
}

/// A question with at least two uniquely labelled options, exactly one correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    text: String,
    options: Vec<NewAnswerOption>,
}

impl NewQuestion {
    pub fn new(text: &str, options: Vec<NewAnswerOption>) -> Result<Self> {
        let text = required("question text", text, QUESTION_TEXT_MAX_LEN)?;
        if options.len() < 2 {
            return Err(Error::invalid_argument(format!(
                "question \"{text}\" needs at least two options"
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = options.iter().find(|o| !seen.insert(o.label())) {
            return Err(Error::invalid_argument(format!(
                "question \"{text}\" repeats option label \"{}\"",
                dup.label()
            )));
        }
        let correct = options.iter().filter(|o| o.is_answer()).count();
        if correct != 1 {
            return Err(Error::invalid_argument(format!(
                "question \"{text}\" must have exactly one correct option, found {correct}"
            )));
        }
        Ok(Self { text, options })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[NewAnswerOption] {
        &self.options
    }

    pub fn correct_option(&self) -> &NewAnswerOption {
        // Construction guarantees exactly one.
        &self.options[self.options.iter().position(|o| o.is_answer()).unwrap_or(0)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuiz {
    name: String,
    difficulty: String,
    questions: Vec<NewQuestion>,
}

impl NewQuiz {
    pub fn new(name: &str, difficulty: &str, questions: Vec<NewQuestion>) -> Result<Self> {
        let name = required("quiz name", name, QUIZ_NAME_MAX_LEN)?;
        let difficulty = required("quiz difficulty", difficulty, DIFFICULTY_MAX_LEN)?;
        if questions.is_empty() {
            return Err(Error::invalid_argument(format!(
                "quiz \"{name}\" has no questions"
            )));
        }
        Ok(Self {
            name,
            difficulty,
            questions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    pub fn questions(&self) -> &[NewQuestion] {
        &self.questions
    }
}

/// Checks a model-supplied quiz against every structural rule before anything is written.
pub fn validate_quiz_payload(payload: &QuizPayload) -> Result<NewQuiz> {
    let mut questions = Vec::with_capacity(payload.questions.len());
    for (index, question) in payload.questions.iter().enumerate() {
        let options = question
            .options
            .iter()
            .map(|o| NewAnswerOption::new(&o.label, &o.value, o.is_answer))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| at_question(index, e))?;
        let new_question = NewQuestion::new(&question.text, options).map_err(|e| at_question(index, e))?;

        if let Some(label) = question.correct_label.as_deref().map(str::trim) {
            if !label.is_empty() && new_question.correct_option().label() != label {
                return Err(Error::invalid_argument(format!(
                    "question {}: correct label \"{label}\" does not match the option marked as the answer",
                    index + 1
                )));
            }
        }
        questions.push(new_question);
    }
    NewQuiz::new(&payload.name, &payload.difficulty, questions)
}

fn at_question(index: usize, err: Error) -> Error {
    match err {
        Error::InvalidArgument(msg) => {
            Error::InvalidArgument(format!("question {}: {msg}", index + 1))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::envelope::{OptionPayload, QuestionPayload};

    fn two_option_question(a_correct: bool, b_correct: bool) -> QuestionPayload {
        QuestionPayload::new(
            "Is water wet?",
            vec![
                OptionPayload::new("A", "Yes", a_correct),
                OptionPayload::new("B", "No", b_correct),
            ],
        )
    }

    #[test]
    fn test_chat_settings_blank_optionals_become_none() {
        let settings =
            ChatSettings::new("  Biology  ", "Friendly", "Medium", 5, Some("   "), Some(""))
                .unwrap();
        assert_eq!(settings.name(), "Biology");
        assert_eq!(settings.education_level(), None);
        assert_eq!(settings.study_area(), None);
    }

    #[test]
    fn test_chat_settings_rejects_out_of_range_quiz_length() {
        let low = ChatSettings::new("Bio", "Friendly", "Medium", MIN_QUIZ_LENGTH - 1, None, None);
        let high = ChatSettings::new("Bio", "Friendly", "Medium", MAX_QUIZ_LENGTH + 1, None, None);
        assert!(low.unwrap_err().is_invalid_argument());
        assert!(high.unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_chat_settings_rejects_long_name() {
        let name = "x".repeat(CHAT_NAME_MAX_LEN + 1);
        let result = ChatSettings::new(&name, "Friendly", "Medium", 5, None, None);
        assert!(result.unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_message_content_must_not_be_blank() {
        assert!(NewMessage::new(1, "  \n ", true, false)
            .unwrap_err()
            .is_invalid_argument());
        assert_eq!(NewMessage::new(1, " hi ", true, false).unwrap().content(), "hi");
    }

    #[test]
    fn test_valid_payload_passes() {
        let payload = QuizPayload::new("Basics", "Easy", vec![two_option_question(true, false)]);
        let quiz = validate_quiz_payload(&payload).unwrap();
        assert_eq!(quiz.questions().len(), 1);
        assert_eq!(quiz.questions()[0].correct_option().label(), "A");
    }

    #[test]
    fn test_payload_without_correct_option_is_rejected() {
        let payload = QuizPayload::new("Basics", "Easy", vec![two_option_question(false, false)]);
        assert!(validate_quiz_payload(&payload).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_payload_with_two_correct_options_is_rejected() {
        let payload = QuizPayload::new("Basics", "Easy", vec![two_option_question(true, true)]);
        assert!(validate_quiz_payload(&payload).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_payload_needs_two_options_and_a_question() {
        let single = QuizPayload::new(
            "Basics",
            "Easy",
            vec![QuestionPayload::new("Q", vec![OptionPayload::new("A", "x", true)])],
        );
        assert!(validate_quiz_payload(&single).is_err());

        let empty = QuizPayload::new("Basics", "Easy", vec![]);
        assert!(validate_quiz_payload(&empty).is_err());
    }

    #[test]
    fn test_duplicate_labels_are_rejected() {
        let payload = QuizPayload::new(
            "Basics",
            "Easy",
            vec![QuestionPayload::new(
                "Q",
                vec![OptionPayload::new("A", "x", true), OptionPayload::new("A", "y", false)],
            )],
        );
        let err = validate_quiz_payload(&payload).unwrap_err();
        assert!(err.to_string().contains("repeats option label"));
    }

    #[test]
    fn test_mismatched_correct_label_is_rejected() {
        let mut question = two_option_question(true, false);
        question.correct_label = Some("B".to_string());
        let payload = QuizPayload::new("Basics", "Easy", vec![question]);
        assert!(validate_quiz_payload(&payload).is_err());
    }
}
