pub mod answer_option;
pub mod chat;
pub mod message;
pub mod quiz;
pub mod quiz_question;
pub mod user_answer;
pub mod users;
