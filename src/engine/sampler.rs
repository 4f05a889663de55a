// src/engine/sampler.rs

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::error::ExamError;
use crate::store::QuestionCorpus;

/// A question id with its sampling weight (the popularity score).
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct WeightedCandidate {
    pub id: i64,
    pub weight: f64,
}

impl WeightedCandidate {
    pub fn new(id: i64, weight: f64) -> Self {
        Self { id, weight }
    }
}

/// Every seeded draw and shuffle goes through this generator so the stream
/// for a given seed never depends on platform or storage.
pub fn seeded_rng(seed: i64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed as u64)
}

/// Sorts by descending weight, ties by ascending id.
pub fn canonical_order(candidates: &mut [WeightedCandidate]) {
    candidates.sort_by(|a, b| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Weighted sampling without replacement over an in-memory candidate list.
///
/// Candidates are put in canonical order first, so the result only depends
/// on the candidate set, `count` and `seed`. Once the remaining weight is
/// zero the rest is taken in canonical order.
pub fn weighted_draw(
    domain: &str,
    mut candidates: Vec<WeightedCandidate>,
    count: usize,
    seed: i64,
) -> Result<Vec<i64>, ExamError> {
    if candidates.len() < count {
        return Err(ExamError::InsufficientQuestions {
            domain: domain.to_string(),
            available: candidates.len(),
            requested: count,
        });
    }

    for candidate in &mut candidates {
        if !candidate.weight.is_finite() || candidate.weight < 0.0 {
            candidate.weight = 0.0;
        }
    }
    canonical_order(&mut candidates);

    // Each weight is finite but their sum may not be; rescale by the largest.
    let sum: f64 = candidates.iter().map(|c| c.weight).sum();
    if !sum.is_finite() {
        let max = candidates.first().map_or(1.0, |c| c.weight);
        for candidate in &mut candidates {
            candidate.weight /= max;
        }
    }

    let mut rng = seeded_rng(seed);
    let mut used = vec![false; candidates.len()];
    let mut selected = Vec::with_capacity(count);

    while selected.len() < count {
        let total_weight: f64 = candidates
            .iter()
            .zip(&used)
            .filter(|(_, taken)| !**taken)
            .map(|(c, _)| c.weight)
            .sum();

        if total_weight <= 0.0 {
            break;
        }

        let target = rng.gen_range(0.0..total_weight);
        let mut running = 0.0;
        let mut pick = None;

        for (idx, candidate) in candidates.iter().enumerate() {
            if used[idx] {
                continue;
            }
            running += candidate.weight;
            if running >= target {
                pick = Some(idx);
                break;
            }
        }

        match pick {
            Some(idx) => {
                used[idx] = true;
                selected.push(candidates[idx].id);
            }
            None => break,
        }
    }

    for (idx, candidate) in candidates.iter().enumerate() {
        if selected.len() == count {
            break;
        }
        if !used[idx] {
            used[idx] = true;
            selected.push(candidate.id);
        }
    }

    Ok(selected)
}

/// Draws `count` distinct question ids from `domain`, skipping `exclude`.
pub async fn sample_domain(
    corpus: &dyn QuestionCorpus,
    domain: &str,
    count: usize,
    seed: i64,
    exclude: &HashSet<i64>,
) -> Result<Vec<i64>, ExamError> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let candidates = corpus.domain_candidates(domain, exclude).await?;
    let available = candidates.len();
    let picked = weighted_draw(domain, candidates, count, seed)?;

    tracing::debug!(domain, count, seed, available, "Sampled domain questions");
    Ok(picked)
}
