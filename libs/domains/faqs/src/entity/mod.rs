//! Sea-ORM entities backing the record store and plan lookups

pub mod chatbot;
pub mod faq;
pub mod plan;
pub mod tenant;
