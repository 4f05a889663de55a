// src/services/mod.rs

pub mod exam;

pub use exam::ExamService;
