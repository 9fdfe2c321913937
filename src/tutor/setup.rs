//! Chat creation and editing through one code path.
//!
//! [`SetupMode`] decides the only two things that differ between the two:
//! where missing form fields come from, and whether the store inserts or updates.

use sea_orm::ConnectionTrait;
use tracing::info;

use crate::entities::chat;
use crate::error::Result;
use crate::store;
use crate::validation::ChatSettings;

pub const DEFAULT_ATTITUDE: &str = "Friendly";
pub const DEFAULT_DIFFICULTY: &str = "Medium";
pub const DEFAULT_QUIZ_LENGTH: i32 = 5;

/// Raw chat settings as entered by the user. `None` means "not provided".
///
/// For the optional profile fields, `Some("")` clears a stored value while
/// `None` keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatForm {
    pub name: Option<String>,
    pub response_attitude: Option<String>,
    pub quiz_difficulty: Option<String>,
    pub quiz_length: Option<i32>,
    pub education_level: Option<String>,
    pub study_area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupMode {
    Create { owner_user_id: i32 },
    Update(chat::Model),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSetup {
    pub mode: SetupMode,
    pub form: ChatForm,
}

impl ChatSetup {
    pub fn create(owner_user_id: i32, form: ChatForm) -> Self {
        Self {
            mode: SetupMode::Create { owner_user_id },
            form,
        }
    }

    pub fn update(existing: chat::Model, form: ChatForm) -> Self {
        Self {
            mode: SetupMode::Update(existing),
            form,
        }
    }

    /// Resolves the form against defaults (create) or the stored chat (update).
    pub fn settings(&self) -> Result<ChatSettings> {
        let form = &self.form;
        match &self.mode {
            SetupMode::Create { .. } => ChatSettings::new(
                form.name.as_deref().unwrap_or_default(),
                form.response_attitude.as_deref().unwrap_or(DEFAULT_ATTITUDE),
                form.quiz_difficulty.as_deref().unwrap_or(DEFAULT_DIFFICULTY),
                form.quiz_length.unwrap_or(DEFAULT_QUIZ_LENGTH),
                form.education_level.as_deref(),
                form.study_area.as_deref(),
            ),
            SetupMode::Update(existing) => ChatSettings::new(
                form.name.as_deref().unwrap_or(&existing.name),
                form.response_attitude
                    .as_deref()
                    .unwrap_or(&existing.response_attitude),
                form.quiz_difficulty
                    .as_deref()
                    .unwrap_or(&existing.quiz_difficulty),
                form.quiz_length.unwrap_or(existing.quiz_length),
                form.education_level
                    .as_deref()
                    .or(existing.education_level.as_deref()),
                form.study_area.as_deref().or(existing.study_area.as_deref()),
            ),
        }
    }

    pub async fn apply<C: ConnectionTrait>(self, db: &C) -> Result<chat::Model> {
        let settings = self.settings()?;
        match self.mode {
            SetupMode::Create { owner_user_id } => {
                store::users::get_user(db, owner_user_id).await?;
                let chat = store::chats::insert_chat(db, owner_user_id, &settings).await?;
                info!("Created chat {} for user {}", chat.id, owner_user_id);
                Ok(chat)
            }
            SetupMode::Update(existing) => {
                let current = store::chats::get_chat(db, existing.id).await?;
                let chat = store::chats::update_chat(db, current, &settings).await?;
                info!("Updated chat {}", chat.id);
                Ok(chat)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_chat() -> chat::Model {
        chat::Model {
            id: 7,
            user_id: 1,
            name: "Algebra".to_string(),
            response_attitude: "Strict".to_string(),
            quiz_difficulty: "Hard".to_string(),
            quiz_length: 10,
            education_level: Some("University".to_string()),
            study_area: Some("Mathematics".to_string()),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_create_fills_defaults() {
        let setup = ChatSetup::create(
            1,
            ChatForm {
                name: Some("Biology".to_string()),
                ..Default::default()
            },
        );
        let settings = setup.settings().unwrap();
        assert_eq!(settings.response_attitude(), DEFAULT_ATTITUDE);
        assert_eq!(settings.quiz_difficulty(), DEFAULT_DIFFICULTY);
        assert_eq!(settings.quiz_length(), DEFAULT_QUIZ_LENGTH);
        assert_eq!(settings.education_level(), None);
    }

    #[test]
    fn test_create_requires_name() {
        let setup = ChatSetup::create(1, ChatForm::default());
        assert!(setup.settings().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_update_keeps_missing_fields() {
        let setup = ChatSetup::update(
            stored_chat(),
            ChatForm {
                quiz_length: Some(3),
                study_area: Some(String::new()),
                ..Default::default()
            },
        );
        let settings = setup.settings().unwrap();
        assert_eq!(settings.name(), "Algebra");
        assert_eq!(settings.response_attitude(), "Strict");
        assert_eq!(settings.quiz_length(), 3);
        assert_eq!(settings.education_level(), Some("University"));
        assert_eq!(settings.study_area(), None);
    }
}
