// src/engine/selector.rs

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;

use super::{
    blueprint::{Blueprint, BlueprintTable, HARD_DOMAIN},
    error::ExamError,
    sampler::{sample_domain, seeded_rng},
};
use crate::store::QuestionCorpus;

/// One domain draw in a merged selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingStep {
    pub domain: String,
    pub count: usize,
    /// Whether ids picked by earlier steps are withheld from this draw.
    pub exclude_selected: bool,
}

/// The two ways an attempt's question list is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPlan {
    /// All questions from one domain with the attempt seed, kept in draw
    /// order. Used by the hard drill, which has never been reshuffled.
    SingleDomainDirect { domain: String, count: usize },
    /// Sequential domain draws, each with its own seed, then one shuffle
    /// keyed by the attempt seed.
    MergeThenShuffle { steps: Vec<SamplingStep> },
}

impl SelectionPlan {
    /// Hard questions first (no exclusions), then each named domain in
    /// blueprint order excluding everything already picked.
    pub fn merged(blueprint: &Blueprint) -> Self {
        let mut steps = Vec::with_capacity(blueprint.domain_counts.len() + 1);

        if blueprint.hard_count > 0 {
            steps.push(SamplingStep {
                domain: HARD_DOMAIN.to_string(),
                count: blueprint.hard_count,
                exclude_selected: false,
            });
        }

        steps.extend(
            blueprint
                .domain_counts
                .iter()
                .filter(|quota| quota.count > 0 && quota.domain != HARD_DOMAIN)
                .map(|quota| SamplingStep {
                    domain: quota.domain.clone(),
                    count: quota.count,
                    exclude_selected: true,
                }),
        );

        SelectionPlan::MergeThenShuffle { steps }
    }
}

/// Accumulator threaded through the merge steps.
#[derive(Debug, Clone)]
struct Selection {
    ids: Vec<i64>,
    seen: HashSet<i64>,
    next_seed: i64,
}

impl Selection {
    fn start(seed: i64, capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
            next_seed: seed,
        }
    }

    /// Appends unseen ids from one step and moves on to the next seed.
    fn absorb(mut self, drawn: Vec<i64>) -> Self {
        for id in drawn {
            if self.seen.insert(id) {
                self.ids.push(id);
            }
        }
        self.next_seed = self.next_seed.wrapping_add(1);
        self
    }
}

/// Rebuilds an attempt's question list from its exam name, seed and size.
///
/// Nothing is cached: question delivery, submission and every results or
/// report view call this independently and get the same ordered list.
#[derive(Debug, Clone)]
pub struct QuestionSelector {
    blueprints: Arc<BlueprintTable>,
}

impl QuestionSelector {
    pub fn new(blueprints: Arc<BlueprintTable>) -> Self {
        Self { blueprints }
    }

    /// Resolves the blueprint and turns it into a plan without touching the corpus.
    pub fn plan(&self, exam_name: &str, max_score: usize) -> Result<SelectionPlan, ExamError> {
        let blueprint = self.blueprints.resolve(exam_name, max_score)?;

        if self.blueprints.is_hard_drill(exam_name) {
            return Ok(SelectionPlan::SingleDomainDirect {
                domain: HARD_DOMAIN.to_string(),
                count: max_score,
            });
        }

        Ok(SelectionPlan::merged(&blueprint))
    }

    pub async fn select_question_ids(
        &self,
        corpus: &dyn QuestionCorpus,
        exam_name: &str,
        seed: i64,
        max_score: usize,
    ) -> Result<Vec<i64>, ExamError> {
        match self.plan(exam_name, max_score)? {
            SelectionPlan::SingleDomainDirect { domain, count } => {
                sample_domain(corpus, &domain, count, seed, &HashSet::new()).await
            }
            SelectionPlan::MergeThenShuffle { steps } => {
                let no_exclusions = HashSet::new();
                let mut selection = Selection::start(seed, max_score);

                for step in &steps {
                    let exclude = if step.exclude_selected {
                        &selection.seen
                    } else {
                        &no_exclusions
                    };
                    let drawn =
                        sample_domain(corpus, &step.domain, step.count, selection.next_seed, exclude)
                            .await?;
                    selection = selection.absorb(drawn);
                }

                if selection.ids.len() != max_score {
                    return Err(ExamError::SelectionCountMismatch {
                        expected: max_score,
                        selected: selection.ids.len(),
                    });
                }

                let mut ids = selection.ids;
                ids.shuffle(&mut seeded_rng(seed));

                tracing::debug!(exam_name, seed, max_score, "Selected attempt questions");
                Ok(ids)
            }
        }
    }
}
