// src/engine/blueprint.rs

use std::collections::HashMap;

use super::error::ExamError;

pub const CAPM_EXAM_NAME: &str = "CAPM Mock Exam";
pub const PMP_EXAM_NAME: &str = "PMP Mock Exam";
pub const HARD_DRILL_EXAM_NAME: &str = "Hard Question Drill";

/// Domain holding the exam-level scenario questions.
/// Sampled on its own, ahead of the named domains.
pub const HARD_DOMAIN: &str = "Hard Question";

/// Domain used for exams without a dedicated blueprint.
pub const FALLBACK_DOMAIN: &str = "Project Management Fundamentals";

/// Largest question count that still uses the short-quiz table.
pub const SHORT_QUIZ_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainQuota {
    pub domain: String,
    pub count: usize,
}

impl DomainQuota {
    pub fn new(domain: impl Into<String>, count: usize) -> Self {
        Self {
            domain: domain.into(),
            count,
        }
    }
}

/// Per-domain quotas plus the hard-question count for one exam size.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Blueprint {
    pub domain_counts: Vec<DomainQuota>,
    pub hard_count: usize,
}

impl Blueprint {
    pub fn new(domain_counts: Vec<DomainQuota>, hard_count: usize) -> Self {
        Self {
            domain_counts,
            hard_count,
        }
    }

    pub fn hard_only(count: usize) -> Self {
        Self::new(Vec::new(), count)
    }

    pub fn single_domain(domain: impl Into<String>, count: usize) -> Self {
        Self::new(vec![DomainQuota::new(domain, count)], 0)
    }

    /// Number of questions this blueprint allocates.
    pub fn total(&self) -> usize {
        self.hard_count + self.domain_counts.iter().map(|q| q.count).sum::<usize>()
    }
}

/// How an exam name turns a requested question count into a blueprint.
#[derive(Debug, Clone)]
pub enum BlueprintRule {
    /// `short` for counts up to `short_limit`, `full` above it.
    Tiered {
        short_limit: usize,
        short: Blueprint,
        full: Blueprint,
    },
    /// The same table whatever the count.
    Fixed(Blueprint),
    /// Every question comes from the hard domain.
    HardOnly,
}

impl BlueprintRule {
    fn blueprint_for(&self, total: usize) -> Blueprint {
        match self {
            BlueprintRule::Tiered {
                short_limit,
                short,
                full,
            } => {
                if total <= *short_limit {
                    short.clone()
                } else {
                    full.clone()
                }
            }
            BlueprintRule::Fixed(blueprint) => blueprint.clone(),
            BlueprintRule::HardOnly => Blueprint::hard_only(total),
        }
    }
}

/// Immutable exam-name to blueprint configuration.
///
/// Built once at startup and shared; tests substitute their own tables.
#[derive(Debug, Clone)]
pub struct BlueprintTable {
    rules: HashMap<String, BlueprintRule>,
    fallback_domain: String,
}

impl BlueprintTable {
    pub fn new(fallback_domain: impl Into<String>) -> Self {
        Self {
            rules: HashMap::new(),
            fallback_domain: fallback_domain.into(),
        }
    }

    pub fn with_rule(mut self, exam_name: impl Into<String>, rule: BlueprintRule) -> Self {
        self.rules.insert(exam_name.into(), rule);
        self
    }

    /// The CAPM, PMP and hard-drill tables served in production.
    pub fn standard() -> Self {
        let capm_full = Blueprint::new(
            vec![
                DomainQuota::new("Project Management Fundamentals", 47),
                DomainQuota::new("Predictive Methodologies", 22),
                DomainQuota::new("Agile Frameworks", 26),
                DomainQuota::new("Business Analysis", 35),
            ],
            20,
        );
        let capm_short = Blueprint::new(
            vec![
                DomainQuota::new("Project Management Fundamentals", 4),
                DomainQuota::new("Predictive Methodologies", 3),
                DomainQuota::new("Agile Frameworks", 3),
                DomainQuota::new("Business Analysis", 3),
            ],
            2,
        );
        let pmp = Blueprint::new(
            vec![
                DomainQuota::new("People", 63),
                DomainQuota::new("Process", 75),
                DomainQuota::new("Business Environment", 12),
            ],
            0,
        );

        Self::new(FALLBACK_DOMAIN)
            .with_rule(
                CAPM_EXAM_NAME,
                BlueprintRule::Tiered {
                    short_limit: SHORT_QUIZ_LIMIT,
                    short: capm_short,
                    full: capm_full,
                },
            )
            .with_rule(PMP_EXAM_NAME, BlueprintRule::Fixed(pmp))
            .with_rule(HARD_DRILL_EXAM_NAME, BlueprintRule::HardOnly)
    }

    /// True when the exam draws every question straight from the hard domain.
    pub fn is_hard_drill(&self, exam_name: &str) -> bool {
        matches!(self.rules.get(exam_name), Some(BlueprintRule::HardOnly))
    }

    /// Resolves the blueprint for `(exam_name, total)`.
    ///
    /// A table that does not allocate exactly `total` questions is a
    /// configuration defect and is reported as `BlueprintQuotaMismatch`.
    pub fn resolve(&self, exam_name: &str, total: usize) -> Result<Blueprint, ExamError> {
        let blueprint = match self.rules.get(exam_name) {
            Some(rule) => rule.blueprint_for(total),
            None => Blueprint::single_domain(self.fallback_domain.clone(), total),
        };

        let allocated = blueprint.total();
        if allocated != total {
            return Err(ExamError::BlueprintQuotaMismatch {
                exam: exam_name.to_string(),
                expected: total,
                allocated,
            });
        }

        Ok(blueprint)
    }
}

impl Default for BlueprintTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_for(blueprint: &Blueprint, domain: &str) -> usize {
        blueprint
            .domain_counts
            .iter()
            .find(|q| q.domain == domain)
            .map(|q| q.count)
            .unwrap_or(0)
    }

    #[test]
    fn full_capm_blueprint_sums_to_150() {
        let table = BlueprintTable::standard();
        let blueprint = table.resolve(CAPM_EXAM_NAME, 150).unwrap();

        assert_eq!(blueprint.total(), 150);
        assert_eq!(blueprint.hard_count, 20);
        assert_eq!(count_for(&blueprint, "Project Management Fundamentals"), 47);
        assert_eq!(count_for(&blueprint, "Predictive Methodologies"), 22);
        assert_eq!(count_for(&blueprint, "Agile Frameworks"), 26);
        assert_eq!(count_for(&blueprint, "Business Analysis"), 35);
    }

    #[test]
    fn short_quiz_uses_small_table() {
        let table = BlueprintTable::standard();
        let blueprint = table.resolve(CAPM_EXAM_NAME, 15).unwrap();

        assert_eq!(blueprint.hard_count, 2);
        assert_eq!(blueprint.total(), 15);
    }

    #[test]
    fn pmp_has_no_hard_questions() {
        let table = BlueprintTable::standard();
        let blueprint = table.resolve(PMP_EXAM_NAME, 150).unwrap();

        assert_eq!(blueprint.hard_count, 0);
        assert_eq!(count_for(&blueprint, "People"), 63);
        assert_eq!(count_for(&blueprint, "Process"), 75);
        assert_eq!(count_for(&blueprint, "Business Environment"), 12);
    }

    #[test]
    fn hard_drill_takes_every_question_from_hard_domain() {
        let table = BlueprintTable::standard();
        let blueprint = table.resolve(HARD_DRILL_EXAM_NAME, 20).unwrap();

        assert!(blueprint.domain_counts.is_empty());
        assert_eq!(blueprint.hard_count, 20);
        assert!(table.is_hard_drill(HARD_DRILL_EXAM_NAME));
        assert!(!table.is_hard_drill(CAPM_EXAM_NAME));
    }

    #[test]
    fn unknown_exam_falls_back_to_single_domain() {
        let table = BlueprintTable::standard();
        let blueprint = table.resolve("Scheduling Warmup", 12).unwrap();

        assert_eq!(
            blueprint.domain_counts,
            vec![DomainQuota::new(FALLBACK_DOMAIN, 12)]
        );
        assert_eq!(blueprint.hard_count, 0);
    }

    #[test]
    fn mismatched_count_fails_loudly() {
        let table = BlueprintTable::standard();

        let err = table.resolve(CAPM_EXAM_NAME, 100).unwrap_err();
        assert!(matches!(
            err,
            ExamError::BlueprintQuotaMismatch {
                expected: 100,
                allocated: 150,
                ..
            }
        ));

        // Short table only covers 15 questions.
        assert!(table.resolve(CAPM_EXAM_NAME, 10).is_err());
        assert!(table.resolve(PMP_EXAM_NAME, 60).is_err());
    }

    #[test]
    fn substituted_table_is_honoured() {
        let table = BlueprintTable::new("General").with_rule(
            "Mini",
            BlueprintRule::Fixed(Blueprint::new(vec![DomainQuota::new("Risk", 3)], 1)),
        );

        assert_eq!(table.resolve("Mini", 4).unwrap().hard_count, 1);
        assert_eq!(
            table.resolve("Other", 5).unwrap().domain_counts,
            vec![DomainQuota::new("General", 5)]
        );
        assert!(!table.is_hard_drill(HARD_DRILL_EXAM_NAME));
    }
}
