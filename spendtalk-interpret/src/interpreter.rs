//! Orchestrates one message end to end: voice cleanup, date, categorization
//! (model first, rules as fallback), validation and merge.

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::NaiveDate;
use serde_json::Value;
use spendtalk_core::amount::{extract_amount_or, find_amount, scale_small_amount, DEFAULT_AMOUNT};
use spendtalk_core::transaction::truncate_chars;
use spendtalk_core::{
    describe_date, normalize_transcript, parse_date, ExpenseCategory, Language, ParsedTransaction,
    TransactionKind, TransactionType,
};
use tracing::{debug, warn};

use crate::category_rules::{self, RULE_DESCRIPTION_CHARS};
use crate::external::{ExternalCategorization, ExternalCategorizer};

/// Confidence assumed when the model does not report one.
pub const DEFAULT_EXTERNAL_CONFIDENCE: f64 = 0.8;
/// Model confidences are clamped into `[MIN_EXTERNAL_CONFIDENCE, 1.0]`.
pub const MIN_EXTERNAL_CONFIDENCE: f64 = 0.6;
pub const VOICE_CONFIDENCE_BOOST: f64 = 0.1;
/// Model descriptions are cut to this many characters.
pub const MODEL_DESCRIPTION_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorizationSource {
    Rules,
    External,
}

/// What both categorization paths produce before the date and voice merge.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorization {
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub confidence: f64,
    pub icon: String,
    pub source: CategorizationSource,
}

pub struct TransactionInterpreter {
    external: Option<Box<dyn ExternalCategorizer>>,
    default_amount: f64,
}

impl Default for TransactionInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionInterpreter {
    /// Rules only.
    pub fn new() -> Self {
        Self {
            external: None,
            default_amount: DEFAULT_AMOUNT,
        }
    }

    pub fn with_external(mut self, external: Box<dyn ExternalCategorizer>) -> Self {
        self.external = Some(external);
        self
    }

    /// Amount used when the text has none. Non-positive values are ignored.
    pub fn with_default_amount(mut self, amount: f64) -> Self {
        if amount.is_finite() && amount > 0.0 {
            self.default_amount = amount;
        } else {
            warn!(amount, "ignoring non-positive default amount");
        }
        self
    }

    pub fn default_amount(&self) -> f64 {
        self.default_amount
    }

    pub fn external_name(&self) -> Option<&'static str> {
        self.external.as_ref().map(|e| e.name())
    }

    /// Interpret one message. Never fails: anything unparseable resolves to
    /// the rules, the default amount and `reference`.
    ///
    /// Only the external call sits behind `catch_unwind`. The local steps do
    /// not panic: `parse_date` and `extract_amount_or` turn their internal
    /// `Result`s into the reference date and the default amount.
    pub fn interpret(
        &self,
        text: &str,
        has_voice: bool,
        language: Language,
        reference: NaiveDate,
    ) -> ParsedTransaction {
        let text = if has_voice {
            let normalized = normalize_transcript(text, language);
            debug!(original = text, normalized = %normalized, "normalized voice transcript");
            normalized
        } else {
            text.to_string()
        };

        let parsed_date = parse_date(&text, language, reference);
        let mut c = self.categorize(&text, language);

        if has_voice {
            c.confidence += VOICE_CONFIDENCE_BOOST;
            if parsed_date != reference {
                c.description = format!(
                    "{} ({})",
                    c.description,
                    describe_date(parsed_date, reference, language)
                );
            }
        }

        ParsedTransaction {
            kind: c.kind,
            amount: c.amount,
            description: c.description,
            confidence: c.confidence.clamp(0.0, 1.0),
            icon: c.icon,
            parsed_date,
            language,
            has_voice,
        }
    }

    /// Categorize with the model when one is configured, falling back to the
    /// keyword rules on any failure.
    pub fn categorize(&self, text: &str, language: Language) -> Categorization {
        if let Some(external) = &self.external {
            let provider = external.name();
            match catch_unwind(AssertUnwindSafe(|| external.categorize(text, language))) {
                Ok(Ok(raw)) => return self.validate(raw, text),
                Ok(Err(e)) => warn!(provider, error = %e, "external categorizer failed, using rules"),
                Err(_) => warn!(provider, "external categorizer panicked, using rules"),
            }
        }
        self.categorize_by_rules(text, language)
    }

    fn categorize_by_rules(&self, text: &str, language: Language) -> Categorization {
        let m = category_rules::categorize(text, language);
        Categorization {
            kind: m.kind,
            amount: extract_amount_or(text, self.default_amount),
            description: m.description,
            confidence: m.confidence,
            icon: m.icon,
            source: CategorizationSource::Rules,
        }
    }

    /// Coerce loosely typed model output field by field.
    fn validate(&self, raw: ExternalCategorization, text: &str) -> Categorization {
        let ty = match value_str(&raw.transaction_type) {
            Some(s) => TransactionType::from_code(s).unwrap_or_else(|| {
                debug!(value = s, "unknown transaction type from model, using expense");
                TransactionType::Expense
            }),
            None => TransactionType::Expense,
        };
        let category = value_str(&raw.category).and_then(ExpenseCategory::from_code);
        let kind = TransactionKind::from_parts(ty, category);

        let amount = coerce_amount(raw.amount.as_ref())
            .filter(|a| a.is_finite() && *a > 0.0)
            .unwrap_or_else(|| extract_amount_or(text, self.default_amount));

        let description = match value_str(&raw.description) {
            Some(s) => truncate_chars(s, MODEL_DESCRIPTION_CHARS),
            None => truncate_chars(text.trim(), RULE_DESCRIPTION_CHARS),
        };

        let confidence = value_f64(raw.confidence.as_ref())
            .filter(|c| c.is_finite())
            .map(|c| c.clamp(MIN_EXTERNAL_CONFIDENCE, 1.0))
            .unwrap_or(DEFAULT_EXTERNAL_CONFIDENCE);

        let icon = value_str(&raw.icon).unwrap_or(kind.icon()).to_string();

        Categorization {
            kind,
            amount,
            description,
            confidence,
            icon,
            source: CategorizationSource::External,
        }
    }
}

/// Non-blank string content of a JSON value.
fn value_str(v: &Option<Value>) -> Option<&str> {
    v.as_ref()?.as_str().map(str::trim).filter(|s| !s.is_empty())
}

fn value_f64(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numbers go through the small-amount scaling; strings through the same
/// extractor as free text ("25k", "1.5tr", "25000").
fn coerce_amount(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64().map(scale_small_amount),
        Value::String(s) => match find_amount(s) {
            Ok(found) => found.map(|m| m.value()),
            Err(e) => {
                warn!(error = %e, "amount extraction failed");
                None
            }
        },
        _ => None,
    }
}
