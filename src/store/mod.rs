//! Typed repositories over the sea-orm entities.
//!
//! Every function is generic over [`sea_orm::ConnectionTrait`] so the same
//! code runs against the pooled connection or inside a transaction.

pub mod answers;
pub mod chats;
pub mod messages;
pub mod quizzes;
pub mod users;
