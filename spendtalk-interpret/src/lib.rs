//! spendtalk-interpret: keyword category rules, the external (Gemini)
//! categorizer, and the interpreter that merges them into a ParsedTransaction

pub mod category_rules;
pub mod external;
pub mod gemini;
pub mod interpreter;

pub use category_rules::{categorize, RuleMatch};
pub use external::{
    parse_model_output, CategorizerError, ExternalCategorization, ExternalCategorizer,
};
pub use gemini::{GeminiCategorizer, GeminiConfig};
pub use interpreter::{Categorization, CategorizationSource, TransactionInterpreter};
