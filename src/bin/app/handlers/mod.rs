// src/bin/app/handlers/mod.rs

pub mod admin;
pub mod generate;
pub mod health;
pub mod notes;
pub mod patients;
pub mod search;
pub mod templates;
pub mod transcribe;
