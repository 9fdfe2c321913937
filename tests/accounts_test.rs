mod common;

use study_tutor::accounts::{authenticate, register, Argon2Hasher};
use study_tutor::tutor::{ChatForm, ChatSetup};
use study_tutor::validation::MAX_QUIZ_LENGTH;

use common::{setup, ScriptedModel};

#[tokio::test]
async fn test_register_and_authenticate() {
    let ctx = setup(ScriptedModel::default()).await;
    let hasher = Argon2Hasher::default();

    let user = register(ctx.db(), &hasher, "  grace ", "hopper-1906")
        .await
        .expect("register");
    assert_eq!(user.username, "grace");
    assert_ne!(user.password_hash, "hopper-1906");

    let found = authenticate(ctx.db(), &hasher, "grace", "hopper-1906")
        .await
        .expect("authenticate");
    assert_eq!(found.id, user.id);

    assert!(authenticate(ctx.db(), &hasher, "grace", "wrong-password")
        .await
        .unwrap_err()
        .is_not_found());
    assert!(authenticate(ctx.db(), &hasher, "nobody", "hopper-1906")
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_short_passwords() {
    let ctx = setup(ScriptedModel::default()).await;
    let hasher = Argon2Hasher::default();

    assert!(register(ctx.db(), &hasher, "ada", "another-password")
        .await
        .unwrap_err()
        .is_already_exists());
    assert!(register(ctx.db(), &hasher, "linus", "short")
        .await
        .unwrap_err()
        .is_invalid_argument());
    assert!(register(ctx.db(), &hasher, "   ", "long-enough-password")
        .await
        .unwrap_err()
        .is_invalid_argument());
}

#[tokio::test]
async fn test_chat_setup_create_and_update() {
    let ctx = setup(ScriptedModel::default()).await;
    assert_eq!(ctx.chat.response_attitude, "Friendly");
    assert_eq!(ctx.chat.quiz_difficulty, "Medium");
    assert_eq!(ctx.chat.quiz_length, 2);
    assert_eq!(ctx.chat.education_level, None);

    let updated = ctx
        .tutor
        .setup_chat(ChatSetup::update(
            ctx.chat.clone(),
            ChatForm {
                name: Some("Organic chemistry".to_string()),
                education_level: Some("High school".to_string()),
                ..Default::default()
            },
        ))
        .await
        .expect("update chat");
    assert_eq!(updated.id, ctx.chat.id);
    assert_eq!(updated.name, "Organic chemistry");
    assert_eq!(updated.quiz_length, 2);
    assert_eq!(updated.education_level.as_deref(), Some("High school"));

    let stored = ctx.tutor.get_chat(ctx.chat.id).await.expect("get chat");
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_chat_setup_rejects_invalid_settings() {
    let ctx = setup(ScriptedModel::default()).await;

    for quiz_length in [0, MAX_QUIZ_LENGTH + 1] {
        let err = ctx
            .tutor
            .setup_chat(ChatSetup::create(
                ctx.user.id,
                ChatForm {
                    name: Some("Physics".to_string()),
                    quiz_length: Some(quiz_length),
                    ..Default::default()
                },
            ))
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    let err = ctx
        .tutor
        .setup_chat(ChatSetup::create(
            ctx.user.id + 100,
            ChatForm {
                name: Some("Physics".to_string()),
                ..Default::default()
            },
        ))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(ctx.tutor.list_chats(ctx.user.id).await.expect("chats").len(), 1);
}

#[tokio::test]
async fn test_list_chats_newest_first() {
    let ctx = setup(ScriptedModel::default()).await;
    let newer = ctx
        .tutor
        .setup_chat(ChatSetup::create(
            ctx.user.id,
            ChatForm {
                name: Some("Biology".to_string()),
                ..Default::default()
            },
        ))
        .await
        .expect("create chat");

    let ids: Vec<i32> = ctx
        .tutor
        .list_chats(ctx.user.id)
        .await
        .expect("chats")
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, [newer.id, ctx.chat.id]);
}
