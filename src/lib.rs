//! Docent - Voice-Narrated Website Demo Pilot

pub mod browser;
pub mod command;
pub mod core;
pub mod demo;
pub mod llm;
pub mod speech;
