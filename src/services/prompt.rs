//! System prompt templates for the tutor.

use crate::validation::ChatSettings;

const UNSPECIFIED: &str = "unspecified";

const TUTOR_TEMPLATE: &str = r#"You are a patient study tutor in a session called "{name}".
Respond in a tone that is {attitude}.
The student's education level is {education_level} and their area of study is {study_area}.
Quizzes in this session are {difficulty} and have {quiz_length} questions.

Reply with a single JSON object and nothing else:
{"wantsQuiz": false, "response": "<your reply to the student>", "isError": false, "quizzes": []}
Set "wantsQuiz" to true only when the student asks to be tested.
Set "isError" to true when you cannot help with the request."#;

const QUIZ_TEMPLATE: &str = r#"You are a patient study tutor in a session called "{name}".
Respond in a tone that is {attitude}.
The student's education level is {education_level} and their area of study is {study_area}.

Write one quiz about the conversation so far with exactly {quiz_length} questions at {difficulty} difficulty.
Every question has between two and four options labelled "A", "B", "C" and "D", and exactly one option is correct.
Reply with a single JSON object and nothing else:
{"wantsQuiz": true, "response": "<a short introduction to the quiz>", "isError": false, "quizzes": [{"name": "<quiz title>", "difficulty": "{difficulty}", "questions": [{"text": "<question>", "options": [{"label": "A", "value": "<option>", "isAnswer": true}, {"label": "B", "value": "<option>", "isAnswer": false}], "correctLabel": "A"}]}]}
Set "isError" to true when you cannot write a quiz for this conversation."#;

/// Renders the system instruction for one model call.
pub fn system_prompt(settings: &ChatSettings, quiz_requested: bool) -> String {
    let template = if quiz_requested {
        QUIZ_TEMPLATE
    } else {
        TUTOR_TEMPLATE
    };

    template
        .replace("{name}", settings.name())
        .replace("{attitude}", settings.response_attitude())
        .replace("{difficulty}", settings.quiz_difficulty())
        .replace("{quiz_length}", &settings.quiz_length().to_string())
        .replace(
            "{education_level}",
            settings.education_level().unwrap_or(UNSPECIFIED),
        )
        .replace("{study_area}", settings.study_area().unwrap_or(UNSPECIFIED))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ChatSettings {
        ChatSettings::new("Cell Biology", "Encouraging", "Medium", 3, Some("High school"), None)
            .unwrap()
    }

    #[test]
    fn test_tutor_prompt_snapshot() {
        insta::assert_snapshot!(system_prompt(&settings(), false));
    }

    #[test]
    fn test_quiz_prompt_uses_quiz_template() {
        let prompt = system_prompt(&settings(), true);
        assert!(prompt.contains("exactly 3 questions at Medium difficulty"));
        assert!(prompt.contains(r#""difficulty": "Medium""#));
        for placeholder in ["{name}", "{attitude}", "{difficulty}", "{quiz_length}"] {
            assert!(!prompt.contains(placeholder), "{placeholder} was not substituted");
        }
    }

    #[test]
    fn test_missing_optionals_render_as_unspecified() {
        let prompt = system_prompt(&settings(), false);
        assert!(prompt.contains("their area of study is unspecified"));
        assert!(prompt.contains("education level is High school"));
    }
}
