//! Deterministic keyword rules mapping a message to a transaction kind.
//!
//! Rules are checked in order and the first keyword hit wins, so the more
//! specific sets (coffee before food, investment before shopping) come first.
//! This is the fallback whenever no model is configured or the model fails.

use spendtalk_core::text::find_phrase;
use spendtalk_core::transaction::{truncate_chars, ExpenseCategory, Language, TransactionKind};
use tracing::debug;

/// Descriptions built from the raw message are cut to this many characters.
pub const RULE_DESCRIPTION_CHARS: usize = 50;

/// Confidence when no rule matched.
pub const UNMATCHED_CONFIDENCE: f64 = 0.6;

/// Result of rule-based categorization
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    pub kind: TransactionKind,
    pub icon: String,
    pub description: String,
    pub confidence: f64,
    /// Keyword that triggered the rule, if any
    pub keyword: Option<&'static str>,
}

struct Rule {
    kind: TransactionKind,
    confidence: f64,
    vi: &'static [&'static str],
    en: &'static [&'static str],
}

impl Rule {
    fn keywords(&self, language: Language) -> &'static [&'static str] {
        match language {
            Language::Vi => self.vi,
            Language::En => self.en,
        }
    }
}

const RULES: &[Rule] = &[
    Rule {
        kind: TransactionKind::Expense(ExpenseCategory::Coffee),
        confidence: 0.9,
        vi: &[
            "cà phê", "cafe", "cafè", "coffee", "cf", "bạc xỉu", "nâu đá", "trà sữa", "trà đá",
            "starbucks", "highlands", "phúc long", "trung nguyên", "cộng cà phê",
        ],
        en: &[
            "coffee", "cafe", "latte", "cappuccino", "espresso", "americano", "starbucks",
            "milk tea", "bubble tea",
        ],
    },
    Rule {
        kind: TransactionKind::Expense(ExpenseCategory::Food),
        confidence: 0.85,
        vi: &[
            "ăn sáng", "ăn trưa", "ăn tối", "ăn vặt", "ăn uống", "đồ ăn", "ăn", "cơm", "phở", "bún",
            "bánh mì", "lẩu", "nướng", "nhà hàng", "quán ăn", "đi chợ", "siêu thị", "grabfood",
            "grab food", "shopeefood", "baemin", "gà rán", "pizza", "kfc", "trái cây",
        ],
        en: &[
            "food", "lunch", "dinner", "breakfast", "brunch", "restaurant", "meal", "snack",
            "pizza", "burger", "groceries", "grocery", "grabfood", "kfc", "noodles", "pho",
        ],
    },
    Rule {
        kind: TransactionKind::Expense(ExpenseCategory::Transport),
        confidence: 0.85,
        vi: &[
            "đổ xăng", "xăng", "grab", "gojek", "taxi", "xe ôm", "gửi xe", "vé xe", "xe buýt",
            "bus", "vé tàu", "vé máy bay", "máy bay", "sửa xe", "rửa xe", "uber", "đi lại",
        ],
        en: &[
            "gas", "fuel", "petrol", "taxi", "grab", "uber", "bus", "train", "metro", "subway",
            "parking", "flight", "airfare", "toll",
        ],
    },
    Rule {
        kind: TransactionKind::Saving,
        confidence: 0.9,
        vi: &[
            "tiết kiệm", "gửi tiết kiệm", "để dành", "heo đất", "bỏ ống", "tích lũy", "saving",
            "savings",
        ],
        en: &["saving", "savings", "save", "saved", "deposit", "piggy bank", "emergency fund"],
    },
    Rule {
        kind: TransactionKind::Investment,
        confidence: 0.9,
        vi: &[
            "đầu tư", "cổ phiếu", "chứng khoán", "trái phiếu", "chứng chỉ quỹ", "quỹ", "vàng",
            "crypto", "bitcoin", "btc", "eth", "coin", "invest", "stock",
        ],
        en: &[
            "invest", "investment", "invested", "stock", "stocks", "shares", "bond", "bonds",
            "etf", "mutual fund", "fund", "crypto", "bitcoin", "btc", "eth", "gold",
        ],
    },
    Rule {
        kind: TransactionKind::Expense(ExpenseCategory::Health),
        confidence: 0.8,
        vi: &[
            "thuốc", "bệnh viện", "khám bệnh", "khám", "nha sĩ", "bác sĩ", "phòng khám", "tập gym",
            "gym", "vitamin", "bảo hiểm y tế",
        ],
        en: &[
            "medicine", "pharmacy", "hospital", "doctor", "dentist", "clinic", "gym", "vitamins",
            "health",
        ],
    },
    Rule {
        kind: TransactionKind::Expense(ExpenseCategory::Education),
        confidence: 0.8,
        vi: &[
            "học phí", "khóa học", "lớp học", "học thêm", "gia sư", "sách", "tiếng anh", "ielts",
            "học",
        ],
        en: &["tuition", "course", "class", "school", "tutor", "textbook", "books", "book", "udemy"],
    },
    Rule {
        kind: TransactionKind::Expense(ExpenseCategory::Utilities),
        confidence: 0.8,
        vi: &[
            "tiền điện", "tiền nước", "tiền mạng", "internet", "wifi", "điện thoại", "nạp card",
            "tiền nhà", "thuê nhà", "phí quản lý", "điện",
        ],
        en: &[
            "electricity", "electric bill", "water bill", "internet", "wifi", "phone bill", "rent",
            "utilities", "utility",
        ],
    },
    Rule {
        kind: TransactionKind::Expense(ExpenseCategory::Entertainment),
        confidence: 0.8,
        vi: &[
            "xem phim", "phim", "rạp", "karaoke", "du lịch", "game", "netflix", "spotify",
            "concert", "nhậu", "bia",
        ],
        en: &[
            "movie", "movies", "cinema", "netflix", "spotify", "game", "games", "concert",
            "karaoke", "bar", "beer", "party", "travel",
        ],
    },
    Rule {
        kind: TransactionKind::Expense(ExpenseCategory::Shopping),
        confidence: 0.8,
        vi: &[
            "mua sắm", "quần áo", "áo", "giày", "dép", "túi xách", "shopee", "lazada", "tiki",
            "mỹ phẩm", "mua",
        ],
        en: &["shopping", "clothes", "shoes", "shirt", "amazon", "shopee", "lazada", "mall", "bought", "buy"],
    },
];

/// Categorize a message with keyword rules. Always returns a match; unmatched
/// text becomes an `other` expense.
pub fn categorize(text: &str, language: Language) -> RuleMatch {
    let lowered = text.to_lowercase();

    for rule in RULES {
        if let Some(keyword) = find_phrase(&lowered, rule.keywords(language)) {
            debug!(keyword, kind = ?rule.kind, "category rule matched");
            return rule_match(rule.kind, rule.confidence, text, Some(keyword));
        }
    }

    debug!("no category rule matched");
    rule_match(
        TransactionKind::Expense(ExpenseCategory::Other),
        UNMATCHED_CONFIDENCE,
        text,
        None,
    )
}

fn rule_match(
    kind: TransactionKind,
    confidence: f64,
    text: &str,
    keyword: Option<&'static str>,
) -> RuleMatch {
    RuleMatch {
        kind,
        icon: kind.icon().to_string(),
        description: truncate_chars(text.trim(), RULE_DESCRIPTION_CHARS),
        confidence,
        keyword,
    }
}
