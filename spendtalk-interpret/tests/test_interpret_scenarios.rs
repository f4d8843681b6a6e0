use chrono::NaiveDate;
use serde_json::{json, Value};
use spendtalk_core::{parse_date, ExpenseCategory, Language, TransactionKind, TransactionType};
use spendtalk_interpret::{
    CategorizerError, ExternalCategorization, ExternalCategorizer, TransactionInterpreter,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Friday 2025-06-20
fn reference() -> NaiveDate {
    d(2025, 6, 20)
}

/// A model that always answers with the same malformed payload.
struct Garbled;

impl ExternalCategorizer for Garbled {
    fn name(&self) -> &'static str {
        "garbled"
    }

    fn categorize(&self, _: &str, _: Language) -> Result<ExternalCategorization, CategorizerError> {
        spendtalk_interpret::parse_model_output("garbled", "Sorry, I can't do that")
    }
}

/// A model that answers with a fixed, well-formed categorization.
struct Fixed(Value);

impl ExternalCategorizer for Fixed {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn categorize(&self, _: &str, _: Language) -> Result<ExternalCategorization, CategorizerError> {
        serde_json::from_value(self.0.clone())
            .map_err(|e| CategorizerError::Malformed { provider: "fixed", message: e.to_string() })
    }
}

#[test]
fn test_scenario_coffee() {
    let t = TransactionInterpreter::new().interpret("coffee 25k", false, Language::Vi, reference());
    assert_eq!(t.kind, TransactionKind::Expense(ExpenseCategory::Coffee));
    assert_eq!(t.amount, 25_000.0);
    assert_eq!(t.parsed_date, reference());
}

#[test]
fn test_scenario_lunch_three_days_ago() {
    let t = TransactionInterpreter::new().interpret("ăn trưa 3 ngày trước", false, Language::Vi, reference());
    assert_eq!(t.kind, TransactionKind::Expense(ExpenseCategory::Food));
    assert_eq!(t.parsed_date, d(2025, 6, 17));
}

#[test]
fn test_scenario_saving_yesterday() {
    let t = TransactionInterpreter::new().interpret("tiết kiệm 200k hôm qua", false, Language::Vi, reference());
    assert_eq!(t.transaction_type(), TransactionType::Saving);
    assert_eq!(t.category(), None);
    assert_eq!(t.amount, 200_000.0);
    assert_eq!(t.parsed_date, d(2025, 6, 19));

    let record = serde_json::to_value(&t).unwrap();
    assert_eq!(record["type"], "saving");
    assert_eq!(record["category"], Value::Null);
}

#[test]
fn test_scenario_empty_input() {
    let t = TransactionInterpreter::new().interpret("", false, Language::Vi, reference());
    assert_eq!(t.parsed_date, reference());
    assert_eq!(t.kind, TransactionKind::Expense(ExpenseCategory::Other));
    assert!(t.amount > 0.0);
}

#[test]
fn test_scenario_stock_purchase_on_explicit_date() {
    let t = TransactionInterpreter::new().interpret(
        "mua cổ phiếu 500k ngày 15/6",
        false,
        Language::Vi,
        reference(),
    );
    assert_eq!(t.kind, TransactionKind::Investment);
    assert_eq!(t.category(), None);
    assert_eq!(t.amount, 500_000.0);
    assert_eq!(t.parsed_date, d(2025, 6, 15));
}

#[test]
fn test_scenario_voice_coffee() {
    let interp = TransactionInterpreter::new();
    let voice = interp.interpret("coffee hai mươi lăm nghìn", true, Language::Vi, reference());
    let typed = interp.interpret("coffee hai mươi lăm nghìn", false, Language::Vi, reference());
    assert_eq!(voice.amount, 25_000.0);
    assert!(voice.confidence > typed.confidence);
    assert!((voice.confidence - 1.0).abs() < 1e-9);
    assert!(voice.has_voice);
}

#[test]
fn test_english_message() {
    let t = TransactionInterpreter::new().interpret(
        "lunch with the team yesterday 120k",
        false,
        Language::En,
        reference(),
    );
    assert_eq!(t.kind, TransactionKind::Expense(ExpenseCategory::Food));
    assert_eq!(t.amount, 120_000.0);
    assert_eq!(t.parsed_date, d(2025, 6, 19));
    assert_eq!(t.language, Language::En);
}

#[test]
fn test_malformed_model_output_falls_back() {
    let rules = TransactionInterpreter::new();
    let garbled = TransactionInterpreter::new().with_external(Box::new(Garbled));
    for text in ["coffee 25k", "tiết kiệm 200k hôm qua", ""] {
        assert_eq!(
            garbled.interpret(text, false, Language::Vi, reference()),
            rules.interpret(text, false, Language::Vi, reference())
        );
    }
}

#[test]
fn test_model_result_keeps_pipeline_date() {
    let interp = TransactionInterpreter::new().with_external(Box::new(Fixed(json!({
        "type": "investment",
        "amount": 500,
        "category": "shopping",
        "confidence": 0.99
    }))));
    let t = interp.interpret("mua vàng 500 hôm kia", false, Language::Vi, reference());
    assert_eq!(t.kind, TransactionKind::Investment);
    assert_eq!(t.category(), None);
    assert_eq!(t.amount, 500_000.0);
    assert_eq!(t.confidence, 0.99);
    assert_eq!(t.parsed_date, d(2025, 6, 18));
}

#[test]
fn test_invariants_over_many_inputs() {
    let inputs = [
        "coffee 25k",
        "phở 45k",
        "grab 30k hôm qua",
        "tiết kiệm 1tr",
        "mua cổ phiếu 2 triệu",
        "tiền điện 350k",
        "xem phim 120k thứ 7",
        "mua áo 300k 01/06",
        "???",
        "25",
        "",
        "31/02 ăn tối",
    ];
    let interp = TransactionInterpreter::new();
    for voice in [false, true] {
        for text in inputs {
            let t = interp.interpret(text, voice, Language::Vi, reference());
            assert!((0.0..=1.0).contains(&t.confidence), "{text}: {}", t.confidence);
            assert!(t.amount > 0.0, "{text}");
            assert!(t.parsed_date <= reference(), "{text}");
            assert_eq!(t.category().is_some(), t.is_expense(), "{text}");

            let record = serde_json::to_value(&t).unwrap();
            let mut keys: Vec<_> = record.as_object().unwrap().keys().cloned().collect();
            keys.sort();
            assert_eq!(
                keys,
                [
                    "amount", "category", "confidence", "description", "hasVoice", "icon", "language",
                    "parsedDate", "type"
                ]
            );
        }
    }
}

#[test]
fn test_small_bare_amount_is_thousands() {
    let t = TransactionInterpreter::new().interpret("cơm 35", false, Language::Vi, reference());
    assert_eq!(t.amount, 35_000.0);
}

#[test]
fn test_date_resolution_properties() {
    // Tuesday: "today" wins over the weekday mention
    let tuesday = d(2025, 6, 24);
    assert_eq!(parse_date("hôm nay thứ 2", Language::Vi, tuesday), tuesday);

    // idempotent for the same inputs
    let a = parse_date("thứ 6 tuần trước", Language::Vi, reference());
    let b = parse_date("thứ 6 tuần trước", Language::Vi, reference());
    assert_eq!(a, b);

    // bare dd/mm never lands in the future
    assert_eq!(parse_date("25/12", Language::Vi, reference()), d(2024, 12, 25));
}

#[test]
fn test_oversized_amount_literal_uses_default() {
    let interp = TransactionInterpreter::new();
    for text in [format!("cơm {}", "9".repeat(400)), format!("{}k", "9".repeat(320))] {
        let t = interp.interpret(&text, false, Language::Vi, reference());
        assert!(t.amount.is_finite() && t.amount > 0.0, "{}", t.amount);
        assert_eq!(t.amount, interp.default_amount());

        let record = serde_json::to_value(&t).unwrap();
        assert!(record["amount"].is_number());
    }
}
