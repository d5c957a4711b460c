//! Chatbot Debate - a conversational service that argues one side of a topic.
//!
//! The first message of a conversation fixes the topic and the bot's stance;
//! every later reply defends that stance against the user's arguments.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
