// src/report.rs

//! Downloadable attempt reports.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use chrono::Utc;

use crate::{
    config::PASSING_SCORE_PERCENTAGE,
    models::{
        question::Choice,
        result::{ExamResult, QuestionResult},
    },
};

const MAX_PROMPT_CHARS: usize = 400;
const MAX_CHOICE_LINE_CHARS: usize = 150;

/// Turns a scored attempt into a document the learner can download.
pub trait ReportRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn file_name(&self, result: &ExamResult) -> String;

    fn render(&self, result: &ExamResult) -> Vec<u8>;
}

/// Plain-text report.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReport;

impl ReportRenderer for TextReport {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn file_name(&self, result: &ExamResult) -> String {
        format!("exam-report-{}.txt", result.attempt_id)
    }

    fn render(&self, result: &ExamResult) -> Vec<u8> {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_report(&mut out, result);
        out.into_bytes()
    }
}

fn write_report(out: &mut String, result: &ExamResult) -> std::fmt::Result {
    let divider = "-".repeat(72);
    let percentage = result.percentage();
    let status = if percentage >= PASSING_SCORE_PERCENTAGE {
        "PASS"
    } else {
        "FAIL"
    };

    writeln!(out, "{} Report", result.exam_name)?;
    writeln!(out, "{divider}")?;
    writeln!(out, "Score Summary")?;
    writeln!(
        out,
        "Score: {}/{} ({:.1}%)",
        result.score, result.max_score, percentage
    )?;
    writeln!(out, "Status: {status}")?;
    writeln!(out, "{divider}")?;

    writeln!(out, "Performance by Domain")?;
    for (domain, (correct, total)) in domain_breakdown(&result.results) {
        let pct = correct as f64 / total as f64 * 100.0;
        writeln!(out, "  {domain:<48} {correct}/{total} ({pct:.1}%)")?;
    }
    writeln!(out, "{divider}")?;

    writeln!(out, "Question Review")?;
    for (idx, r) in result.results.iter().enumerate() {
        let q = &r.question;
        let status = if r.is_correct { "Correct" } else { "Incorrect" };

        writeln!(out)?;
        writeln!(out, "Question {} [{}] {}", idx + 1, status, q.question.domain)?;
        writeln!(out, "{}", truncate(&q.question.prompt, MAX_PROMPT_CHARS))?;
        writeln!(
            out,
            "Your Answer: {}",
            choice_list(&q.choices, &r.user_choice_ids)
        )?;
        writeln!(
            out,
            "Correct Answer: {}",
            choice_list(&q.choices, &r.correct_choice_ids)
        )?;
        writeln!(out, "Feedback: {}", feedback(r))?;

        for choice in &q.choices {
            let prefix = if choice.is_correct {
                "* Correct: "
            } else if r.user_choice_ids.contains(&choice.id) {
                "> You: "
            } else {
                "  "
            };
            let line = format!("{prefix}{}", choice_display(choice));
            writeln!(out, "{}", truncate(&line, MAX_CHOICE_LINE_CHARS))?;
        }

        if !q.question.explanation.is_empty() {
            writeln!(
                out,
                "Explanation: {}",
                truncate(&q.question.explanation, MAX_PROMPT_CHARS)
            )?;
        }
        writeln!(out, "Tip: {}", domain_tip(&q.question.domain, r.is_correct))?;
    }

    writeln!(out)?;
    writeln!(out, "{divider}")?;
    writeln!(
        out,
        "Generated on {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    )
}

/// (correct, total) per domain, ordered by domain name.
fn domain_breakdown(results: &[QuestionResult]) -> BTreeMap<&str, (usize, usize)> {
    let mut domains = BTreeMap::new();
    for r in results {
        let entry = domains.entry(r.question.question.domain.as_str()).or_insert((0, 0));
        entry.1 += 1;
        if r.is_correct {
            entry.0 += 1;
        }
    }
    domains
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn choice_display(choice: &Choice) -> String {
    if choice.text.is_empty() || choice.text == choice.label {
        if choice.label.is_empty() {
            return format!("Choice {}", choice.id);
        }
        return choice.label.clone();
    }
    format!("{}. {}", choice.label, choice.text)
}

fn choice_list(choices: &[Choice], ids: &[i64]) -> String {
    let by_id: HashMap<i64, &Choice> = choices.iter().map(|c| (c.id, c)).collect();
    let labels: Vec<String> = ids
        .iter()
        .filter_map(|id| by_id.get(id).map(|c| choice_display(c)))
        .collect();

    if labels.is_empty() {
        "None".to_string()
    } else {
        labels.join(", ")
    }
}

fn feedback(r: &QuestionResult) -> String {
    if r.user_choice_ids.is_empty() {
        return "Question was left unanswered. Revisit the scenario and map it to PMI guidance \
                before your next attempt."
            .to_string();
    }
    if r.is_correct {
        return "Strong alignment with PMI expectations. Keep reinforcing the principle \
                demonstrated here."
            .to_string();
    }

    let choices = &r.question.choices;
    format!(
        "You chose {}, but the better answer is {}. Review the scenario details and PMI \
         references that support the correct option.",
        choice_list(choices, &r.user_choice_ids),
        choice_list(choices, &r.correct_choice_ids)
    )
}

fn domain_tip(domain: &str, correct: bool) -> &'static str {
    match (domain, correct) {
        ("Project Management Fundamentals", true) => {
            "Keep scanning for stakeholder cues, governance triggers and ethical obligations; \
             they often separate the top answers."
        }
        ("Project Management Fundamentals", false) => {
            "Revisit the PMBOK 7th edition domains and the PMI Code of Ethics to sharpen decision patterns."
        }
        ("Predictive Methodologies", true) => {
            "Good predictive instincts. Keep drilling earned value and change control scenarios."
        }
        ("Predictive Methodologies", false) => {
            "Refresh schedule, cost and baseline management techniques to strengthen predictive reasoning."
        }
        ("Agile Frameworks", true) => {
            "Your agile mindset is sharp. Keep practicing servant leadership and flow optimization."
        }
        ("Agile Frameworks", false) => {
            "Review Scrum roles, Kanban signals and Lean principles to clarify adaptive responses."
        }
        ("Business Analysis", true) => {
            "Strong BA coverage. Keep mapping stakeholder needs to value techniques."
        }
        ("Business Analysis", false) => {
            "Refresh elicitation, prioritization and change enablement tools to raise accuracy."
        }
        ("Hard Question", true) => {
            "You handled an exam-level scenario; compare this reasoning with other ECO tasks for stronger recall."
        }
        ("Hard Question", false) => {
            "Dissect the scenario carefully: isolate the value driver and the governance hook before choosing."
        }
        (_, true) => "Solid work. Keep tying outcomes back to PMI guidance.",
        (_, false) => "Re-examine the scenario through PMI practices to sharpen your intuition.",
    }
}
