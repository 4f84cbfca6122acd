//! Talent Archaeologist: a seven-question talent excavation backed by an LLM.

pub mod channels;
pub mod config;
pub mod error;
pub mod excavation;
pub mod llm;
