//! Parsed transaction types: the interpreter's output contract.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level classification of a financial entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionType {
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "saving")]
    Saving,
    #[serde(rename = "investment")]
    Investment,
}

impl TransactionType {
    pub fn code(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Saving => "saving",
            TransactionType::Investment => "investment",
        }
    }

    /// Lenient lookup used on model output. Unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "expense" | "expenses" | "spending" | "chi tiêu" => Some(TransactionType::Expense),
            "saving" | "savings" | "save" | "tiết kiệm" => Some(TransactionType::Saving),
            "investment" | "investments" | "invest" | "đầu tư" => Some(TransactionType::Investment),
            _ => None,
        }
    }
}

/// Closed expense taxonomy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    #[serde(rename = "food")]
    Food,
    #[serde(rename = "coffee")]
    Coffee,
    #[serde(rename = "transport")]
    Transport,
    #[serde(rename = "shopping")]
    Shopping,
    #[serde(rename = "entertainment")]
    Entertainment,
    #[serde(rename = "health")]
    Health,
    #[serde(rename = "education")]
    Education,
    #[serde(rename = "utilities")]
    Utilities,
    #[serde(rename = "other")]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 9] = [
        ExpenseCategory::Food,
        ExpenseCategory::Coffee,
        ExpenseCategory::Transport,
        ExpenseCategory::Shopping,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Health,
        ExpenseCategory::Education,
        ExpenseCategory::Utilities,
        ExpenseCategory::Other,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "food",
            ExpenseCategory::Coffee => "coffee",
            ExpenseCategory::Transport => "transport",
            ExpenseCategory::Shopping => "shopping",
            ExpenseCategory::Entertainment => "entertainment",
            ExpenseCategory::Health => "health",
            ExpenseCategory::Education => "education",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Other => "other",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Presentational glyph
    pub fn icon(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "🍜",
            ExpenseCategory::Coffee => "☕",
            ExpenseCategory::Transport => "🚗",
            ExpenseCategory::Shopping => "🛍️",
            ExpenseCategory::Entertainment => "🎬",
            ExpenseCategory::Health => "💊",
            ExpenseCategory::Education => "📚",
            ExpenseCategory::Utilities => "💡",
            ExpenseCategory::Other => "💸",
        }
    }
}

/// Type and category as one value: a category exists only for expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Expense(ExpenseCategory),
    Saving,
    Investment,
}

impl TransactionKind {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionKind::Expense(_) => TransactionType::Expense,
            TransactionKind::Saving => TransactionType::Saving,
            TransactionKind::Investment => TransactionType::Investment,
        }
    }

    pub fn category(&self) -> Option<ExpenseCategory> {
        match self {
            TransactionKind::Expense(c) => Some(*c),
            TransactionKind::Saving | TransactionKind::Investment => None,
        }
    }

    /// Build a kind from a type plus an optional category. The category is
    /// ignored unless the type is expense; a missing one becomes `Other`.
    pub fn from_parts(ty: TransactionType, category: Option<ExpenseCategory>) -> Self {
        match ty {
            TransactionType::Expense => {
                TransactionKind::Expense(category.unwrap_or(ExpenseCategory::Other))
            }
            TransactionType::Saving => TransactionKind::Saving,
            TransactionType::Investment => TransactionKind::Investment,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            TransactionKind::Expense(c) => c.icon(),
            TransactionKind::Saving => "🐷",
            TransactionKind::Investment => "📈",
        }
    }
}

impl Default for TransactionKind {
    fn default() -> Self {
        TransactionKind::Expense(ExpenseCategory::Other)
    }
}

/// Supported input languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[serde(rename = "vi")]
    #[default]
    Vi,
    #[serde(rename = "en")]
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Vi => "vi",
            Language::En => "en",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0:?} (expected \"vi\" or \"en\")")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vi" | "vi-vn" | "vietnamese" => Ok(Language::Vi),
            "en" | "en-us" | "en-gb" | "english" => Ok(Language::En),
            _ => Err(UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A structured transaction produced from one input message.
///
/// Serializes through [`TransactionRecord`], the flat shape handed to storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "TransactionRecord")]
pub struct ParsedTransaction {
    pub kind: TransactionKind,
    /// Minor-unit-free amount (e.g. VND), always > 0
    pub amount: f64,
    pub description: String,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub icon: String,
    pub parsed_date: NaiveDate,
    pub language: Language,
    pub has_voice: bool,
}

impl ParsedTransaction {
    pub fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    pub fn category(&self) -> Option<ExpenseCategory> {
        self.kind.category()
    }

    pub fn is_expense(&self) -> bool {
        matches!(self.kind, TransactionKind::Expense(_))
    }

    pub fn to_record(&self) -> TransactionRecord {
        TransactionRecord::from(self.clone())
    }
}

/// Flat persistence view of a [`ParsedTransaction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub description: String,
    pub category: Option<ExpenseCategory>,
    pub confidence: f64,
    pub icon: String,
    pub parsed_date: NaiveDate,
    pub language: Language,
    pub has_voice: bool,
}

impl From<ParsedTransaction> for TransactionRecord {
    fn from(t: ParsedTransaction) -> Self {
        Self {
            transaction_type: t.kind.transaction_type(),
            amount: t.amount,
            description: t.description,
            category: t.kind.category(),
            confidence: t.confidence,
            icon: t.icon,
            parsed_date: t.parsed_date,
            language: t.language,
            has_voice: t.has_voice,
        }
    }
}

/// Truncate to at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: TransactionKind) -> ParsedTransaction {
        ParsedTransaction {
            kind,
            amount: 25_000.0,
            description: "coffee 25k".to_string(),
            confidence: 0.9,
            icon: kind.icon().to_string(),
            parsed_date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            language: Language::Vi,
            has_voice: false,
        }
    }

    #[test]
    fn test_record_shape_for_expense() {
        let json = serde_json::to_value(sample(TransactionKind::Expense(ExpenseCategory::Coffee))).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["category"], "coffee");
        assert_eq!(json["parsedDate"], "2025-06-20");
        assert_eq!(json["hasVoice"], false);
        assert_eq!(json["language"], "vi");
    }

    #[test]
    fn test_record_shape_for_saving_has_null_category() {
        let json = serde_json::to_value(sample(TransactionKind::Saving)).unwrap();
        assert_eq!(json["type"], "saving");
        assert!(json["category"].is_null());
        assert!(json.as_object().unwrap().contains_key("category"));
    }

    #[test]
    fn test_from_parts_drops_category_for_non_expense() {
        let k = TransactionKind::from_parts(TransactionType::Investment, Some(ExpenseCategory::Food));
        assert_eq!(k, TransactionKind::Investment);
        assert_eq!(k.category(), None);

        let k = TransactionKind::from_parts(TransactionType::Expense, None);
        assert_eq!(k.category(), Some(ExpenseCategory::Other));
    }

    #[test]
    fn test_type_aliases() {
        assert_eq!(TransactionType::from_code("Savings"), Some(TransactionType::Saving));
        assert_eq!(TransactionType::from_code(" invest "), Some(TransactionType::Investment));
        assert_eq!(TransactionType::from_code("income"), None);
    }

    #[test]
    fn test_language_parse_rejects_unknown() {
        assert_eq!("VI".parse::<Language>().unwrap(), Language::Vi);
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("tiết kiệm", 4), "tiết");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
