//! Display strings for the two supported languages. The pipeline itself only
//! emits codes; everything a person reads is rendered here.

use chrono::NaiveDate;
use spendtalk_core::{describe_date, ExpenseCategory, Language, ParsedTransaction, TransactionType};

pub fn type_label(ty: TransactionType, language: Language) -> &'static str {
    match (language, ty) {
        (Language::Vi, TransactionType::Expense) => "Chi tiêu",
        (Language::Vi, TransactionType::Saving) => "Tiết kiệm",
        (Language::Vi, TransactionType::Investment) => "Đầu tư",
        (Language::En, TransactionType::Expense) => "Expense",
        (Language::En, TransactionType::Saving) => "Saving",
        (Language::En, TransactionType::Investment) => "Investment",
    }
}

pub fn category_label(category: ExpenseCategory, language: Language) -> &'static str {
    use ExpenseCategory::*;
    match (language, category) {
        (Language::Vi, Food) => "Ăn uống",
        (Language::Vi, Coffee) => "Cà phê",
        (Language::Vi, Transport) => "Di chuyển",
        (Language::Vi, Shopping) => "Mua sắm",
        (Language::Vi, Entertainment) => "Giải trí",
        (Language::Vi, Health) => "Sức khỏe",
        (Language::Vi, Education) => "Giáo dục",
        (Language::Vi, Utilities) => "Hóa đơn",
        (Language::Vi, Other) => "Khác",
        (Language::En, Food) => "Food",
        (Language::En, Coffee) => "Coffee",
        (Language::En, Transport) => "Transport",
        (Language::En, Shopping) => "Shopping",
        (Language::En, Entertainment) => "Entertainment",
        (Language::En, Health) => "Health",
        (Language::En, Education) => "Education",
        (Language::En, Utilities) => "Utilities",
        (Language::En, Other) => "Other",
    }
}

/// Whole-dong amount with thousands grouping: "25.000 ₫" (vi), "25,000 VND" (en).
pub fn format_amount(amount: f64, language: Language) -> String {
    let digits = format!("{:.0}", amount.abs());
    let sep = match language {
        Language::Vi => '.',
        Language::En => ',',
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(sep);
        }
        grouped.push(ch);
    }
    if amount < 0.0 {
        grouped.insert(0, '-');
    }

    match language {
        Language::Vi => format!("{grouped} ₫"),
        Language::En => format!("{grouped} VND"),
    }
}

/// Multi-line human summary of one transaction.
pub fn render(t: &ParsedTransaction, reference: NaiveDate) -> String {
    let lang = t.language;
    let (amount_l, date_l, confidence_l) = match lang {
        Language::Vi => ("Số tiền", "Ngày", "Độ tin cậy"),
        Language::En => ("Amount", "Date", "Confidence"),
    };

    let mut kind = type_label(t.transaction_type(), lang).to_string();
    if let Some(c) = t.category() {
        kind.push_str(" / ");
        kind.push_str(category_label(c, lang));
    }

    format!(
        "{} {}\n  {}\n  {amount_l}: {}\n  {date_l}: {} ({})\n  {confidence_l}: {:.0}%",
        t.icon,
        kind,
        t.description,
        format_amount(t.amount, lang),
        t.parsed_date,
        describe_date(t.parsed_date, reference, lang),
        t.confidence * 100.0
    )
}
