// src/handlers/mod.rs

pub mod drill;
pub mod exam;
pub mod users;
