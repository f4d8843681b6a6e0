//! spendtalk-core: transaction types and the deterministic text parsers
//! (amounts, dates, voice transcripts) behind the interpreter.

pub mod amount;
pub mod dates;
pub mod text;
pub mod time;
pub mod transaction;
pub mod voice;

pub use amount::{
    extract_amount, find_amount, scale_small_amount, AmountMatch, Magnitude, DEFAULT_AMOUNT,
};
pub use dates::{describe_date, parse_date};
pub use transaction::{
    ExpenseCategory, Language, ParsedTransaction, TransactionKind, TransactionRecord,
    TransactionType, UnsupportedLanguage,
};
pub use voice::{clarity_score, clarity_suggestions, normalize_transcript, ClaritySignals};
