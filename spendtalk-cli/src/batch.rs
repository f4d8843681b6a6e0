//! CSV batch mode: one message per row in, one `TransactionRecord` per row out.
//!
//! Input has a header row with a `text` column and an optional `voice`
//! column ("true"/"1"/"yes"). Other columns are ignored.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use spendtalk_core::Language;
use spendtalk_interpret::TransactionInterpreter;
use std::io::{Read, Write};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub rows: usize,
    pub skipped: usize,
}

pub fn run_batch<R: Read, W: Write>(
    input: R,
    output: W,
    interpreter: &TransactionInterpreter,
    language: Language,
    reference: NaiveDate,
) -> Result<BatchSummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = rdr.headers().context("read CSV header")?.clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let Some(text_col) = column("text") else {
        bail!("input CSV needs a `text` column (found: {})", headers.iter().collect::<Vec<_>>().join(", "));
    };
    let voice_col = column("voice");

    let mut wtr = csv::Writer::from_writer(output);
    let mut summary = BatchSummary::default();

    for (i, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("read CSV row {}", i + 2))?;
        let text = record.get(text_col).unwrap_or("");
        if text.is_empty() {
            summary.skipped += 1;
            continue;
        }
        let voice = voice_col
            .and_then(|c| record.get(c))
            .map(is_truthy)
            .unwrap_or(false);

        let t = interpreter.interpret(text, voice, language, reference);
        debug!(row = i + 2, kind = ?t.kind, amount = t.amount, "interpreted row");
        wtr.serialize(t.to_record()).context("write CSV row")?;
        summary.rows += 1;
    }

    wtr.flush().context("flush CSV output")?;
    Ok(summary)
}

fn is_truthy(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "y" | "x")
}
