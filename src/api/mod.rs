pub mod handlers;
pub mod moderation;
