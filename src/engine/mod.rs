// src/engine/mod.rs

//! Seeded question selection and scoring.
//!
//! An attempt stores only its exam, seed and size. The question list is
//! recomputed from those on every read by [`selector::QuestionSelector`],
//! and graded by the functions in [`scoring`].

pub mod blueprint;
pub mod error;
pub mod sampler;
pub mod scoring;
pub mod selector;

pub use blueprint::{Blueprint, BlueprintRule, BlueprintTable, DomainQuota};
pub use error::ExamError;
pub use selector::{QuestionSelector, SelectionPlan};
