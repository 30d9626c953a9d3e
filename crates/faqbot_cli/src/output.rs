use std::collections::BTreeMap;
use std::io::{self, Write};

use anyhow::Result;
use faqbot_core::{Category, EvalSummary, QueryResult};

pub fn print_result(result: &QueryResult, json: bool) -> Result<()> {
    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(result)?)?;
        return Ok(());
    }
    write_text(&mut out, result)?;
    Ok(())
}

pub fn write_text(out: &mut impl Write, result: &QueryResult) -> io::Result<()> {
    match result {
        QueryResult::Confident {
            matched_question,
            answer,
            category,
            score,
        } => {
            writeln!(out, "Here's what I found:")?;
            writeln!(out, "Matched Question: {matched_question}")?;
            writeln!(out, "Answer: {answer}")?;
            writeln!(out, "Category: {category}")?;
            writeln!(out, "Confidence Score: {score:.2}")
        }
        QueryResult::Unsure { message } => writeln!(out, "{message}"),
    }
}

pub fn print_category_counts(counts: &BTreeMap<Category, usize>) {
    for (category, count) in counts {
        println!("category=\"{category}\" count={count}");
    }
}

pub fn print_eval(run_id: &str, summary: &EvalSummary, threshold: f32, required: f32) {
    println!(
        "run_id={} threshold={:.4} total={} passed={} failed={} pass_rate={:.4} required={:.4} meets_threshold={}",
        run_id,
        threshold,
        summary.total,
        summary.passed,
        summary.failed,
        summary.pass_rate,
        required,
        summary.meets(required)
    );

    for o in &summary.outcomes {
        println!(
            "case={} passed={} outcome={:?} question={} score={:.4} latency={:.1}ms",
            o.case_id,
            o.passed,
            o.actual,
            o.matched_question.as_deref().unwrap_or("null"),
            o.score,
            o.latency_ms
        );
    }
}
