//! Voice transcript cleanup and clarity scoring.
//!
//! Normalization is a list of literal substitutions applied in order on a
//! space-padded, lowercased copy of the transcript. Later entries see the
//! output of earlier ones, so the tables below are order-sensitive:
//! `hai mươi lăm nghìn` → `hai mươi 5 nghìn` → `2 mươi 5 nghìn` → `25 nghìn` → `25k`.

use std::collections::HashSet;

use crate::text::{collapse_whitespace, contains_any};
use crate::transaction::Language;

const VI_SUBSTITUTIONS: &[(&str, &str)] = &[
    // currency noise
    (" vnđ ", " "),
    (" vnd ", " "),
    (" đồng ", " "),
    // frequent mis-hearings
    (" cà fê ", " cà phê "),
    (" ca phê ", " cà phê "),
    (" cà phe ", " cà phê "),
    (" trà sửa ", " trà sữa "),
    (" tiết kiêm ", " tiết kiệm "),
    (" tiếc kiệm ", " tiết kiệm "),
    (" đầu từ ", " đầu tư "),
    (" cổ phiểu ", " cổ phiếu "),
    (" chứng khoáng ", " chứng khoán "),
    (" gờ ráp ", " grab "),
    (" gráp ", " grab "),
    // "mười" is "1 mươi" so teens share the tens path
    (" mười ", " 1 mươi "),
    (" mươi mốt ", " mươi 1 "),
    (" mươi lăm ", " mươi 5 "),
    (" mươi nhăm ", " mươi 5 "),
    (" mươi tư ", " mươi 4 "),
    (" một ", " 1 "),
    (" hai ", " 2 "),
    (" ba ", " 3 "),
    (" bốn ", " 4 "),
    (" năm ", " 5 "),
    (" sáu ", " 6 "),
    (" bảy ", " 7 "),
    (" tám ", " 8 "),
    (" chín ", " 9 "),
    // tens: "2 mươi 5" → "25", "2 mươi" → "20"
    (" mươi 1 ", "1 "),
    (" mươi 2 ", "2 "),
    (" mươi 3 ", "3 "),
    (" mươi 4 ", "4 "),
    (" mươi 5 ", "5 "),
    (" mươi 6 ", "6 "),
    (" mươi 7 ", "7 "),
    (" mươi 8 ", "8 "),
    (" mươi 9 ", "9 "),
    (" mươi ", "0 "),
    // hundreds
    (" trăm rưỡi ", "50 "),
    (" trăm lẻ ", "0"),
    (" trăm linh ", "0"),
    (" trăm 1", "1"),
    (" trăm 2", "2"),
    (" trăm 3", "3"),
    (" trăm 4", "4"),
    (" trăm 5", "5"),
    (" trăm 6", "6"),
    (" trăm 7", "7"),
    (" trăm 8", "8"),
    (" trăm 9", "9"),
    (" trăm ", "00 "),
    // magnitude words
    (" nghìn rưỡi ", ".5k "),
    (" ngàn rưỡi ", ".5k "),
    (" triệu rưỡi ", ".5m "),
    (" nghìn ", "k "),
    (" ngàn ", "k "),
    (" triệu ", "m "),
    (" củ ", "m "),
];

const EN_SUBSTITUTIONS: &[(&str, &str)] = &[
    // currency noise
    (" dong ", " "),
    (" vnd ", " "),
    (" dollars ", " "),
    // frequent mis-hearings
    (" star bucks ", " starbucks "),
    (" coffee's ", " coffee "),
    (" uber eat ", " uber eats "),
    (" grab bike ", " grab "),
    (" in vest ", " invest "),
    (" savings account ", " savings "),
    (" a hundred ", " 1 hundred "),
    (" a thousand ", " 1 thousand "),
    (" a million ", " 1 million "),
    // tens carry a "#t" marker until the unit after them is known
    (" twenty-", " 2#t "),
    (" thirty-", " 3#t "),
    (" forty-", " 4#t "),
    (" fifty-", " 5#t "),
    (" sixty-", " 6#t "),
    (" seventy-", " 7#t "),
    (" eighty-", " 8#t "),
    (" ninety-", " 9#t "),
    (" twenty ", " 2#t "),
    (" thirty ", " 3#t "),
    (" forty ", " 4#t "),
    (" fifty ", " 5#t "),
    (" sixty ", " 6#t "),
    (" seventy ", " 7#t "),
    (" eighty ", " 8#t "),
    (" ninety ", " 9#t "),
    (" ten ", " 10 "),
    (" eleven ", " 11 "),
    (" twelve ", " 12 "),
    (" thirteen ", " 13 "),
    (" fourteen ", " 14 "),
    (" fifteen ", " 15 "),
    (" sixteen ", " 16 "),
    (" seventeen ", " 17 "),
    (" eighteen ", " 18 "),
    (" nineteen ", " 19 "),
    (" one ", " 1 "),
    (" two ", " 2 "),
    (" three ", " 3 "),
    (" four ", " 4 "),
    (" five ", " 5 "),
    (" six ", " 6 "),
    (" seven ", " 7 "),
    (" eight ", " 8 "),
    (" nine ", " 9 "),
    ("#t 1 ", "1 "),
    ("#t 2 ", "2 "),
    ("#t 3 ", "3 "),
    ("#t 4 ", "4 "),
    ("#t 5 ", "5 "),
    ("#t 6 ", "6 "),
    ("#t 7 ", "7 "),
    ("#t 8 ", "8 "),
    ("#t 9 ", "9 "),
    ("#t ", "0 "),
    (" hundred and ", " hundred "),
    (" hundred 1", "1"),
    (" hundred 2", "2"),
    (" hundred 3", "3"),
    (" hundred 4", "4"),
    (" hundred 5", "5"),
    (" hundred 6", "6"),
    (" hundred 7", "7"),
    (" hundred 8", "8"),
    (" hundred 9", "9"),
    (" hundred ", "00 "),
    // magnitude words
    (" thousand ", "k "),
    (" grand ", "k "),
    (" million ", "m "),
];

fn substitutions(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::Vi => VI_SUBSTITUTIONS,
        Language::En => EN_SUBSTITUTIONS,
    }
}

/// Rewrite a voice transcript into the written form the parsers expect.
pub fn normalize_transcript(transcript: &str, language: Language) -> String {
    let mut text = format!(" {} ", collapse_whitespace(&transcript.to_lowercase()));
    for (from, to) in substitutions(language) {
        if text.contains(from) {
            text = text.replace(from, to);
        }
    }
    collapse_whitespace(&text)
}

const DOMAIN_KEYWORDS: &[&str] = &[
    "cà phê", "cafe", "ăn", "phở", "cơm", "bún", "xăng", "grab", "taxi", "tiết kiệm",
    "đầu tư", "mua", "tiền", "nghìn", "ngàn", "triệu", "k",
    "coffee", "lunch", "dinner", "breakfast", "food", "uber", "saving", "savings",
    "invest", "buy", "bought", "paid", "thousand", "million",
];

const MIN_PLAUSIBLE_CHARS: usize = 5;
const MAX_PLAUSIBLE_CHARS: usize = 200;
const MIN_UNIQUE_WORD_RATIO: f64 = 0.7;

/// The individual signals behind [`clarity_score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClaritySignals {
    pub plausible_length: bool,
    pub has_digit: bool,
    pub has_keyword: bool,
    pub low_repetition: bool,
    pub has_punctuation: bool,
}

impl ClaritySignals {
    pub fn from_transcript(transcript: &str) -> Self {
        let text = transcript.trim().to_lowercase();
        if text.is_empty() {
            return Self::default();
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        let unique: HashSet<&str> = words.iter().copied().collect();
        let unique_ratio = unique.len() as f64 / words.len().max(1) as f64;

        Self {
            plausible_length: (MIN_PLAUSIBLE_CHARS..=MAX_PLAUSIBLE_CHARS)
                .contains(&text.chars().count()),
            has_digit: text.chars().any(|c| c.is_ascii_digit()),
            has_keyword: contains_any(&text, DOMAIN_KEYWORDS),
            low_repetition: unique_ratio >= MIN_UNIQUE_WORD_RATIO,
            has_punctuation: text.chars().any(|c| c.is_ascii_punctuation()),
        }
    }

    /// Weighted sum normalized to 0.0 - 1.0
    pub fn score(&self) -> f64 {
        let mut total = 0.0;
        if self.plausible_length {
            total += 2.0;
        }
        if self.has_digit {
            total += 2.0;
        }
        if self.has_keyword {
            total += 2.0;
        }
        if self.low_repetition {
            total += 1.0;
        }
        if self.has_punctuation {
            total += 1.0;
        }
        total / 8.0
    }
}

/// Advisory clarity heuristic in 0.0 - 1.0. Not used for control flow.
pub fn clarity_score(transcript: &str) -> f64 {
    ClaritySignals::from_transcript(transcript).score()
}

/// Below this score the user is offered suggestions.
pub const SUGGESTION_THRESHOLD: f64 = 0.6;

/// Localized hints for a transcript that scored poorly. Empty when clear enough.
pub fn clarity_suggestions(transcript: &str, language: Language) -> Vec<String> {
    let signals = ClaritySignals::from_transcript(transcript);
    if signals.score() >= SUGGESTION_THRESHOLD {
        return Vec::new();
    }

    let (amount_hint, purpose_hint, pace_hint) = match language {
        Language::Vi => (
            "Hãy nói rõ số tiền, ví dụ: \"cà phê 25 nghìn\".",
            "Hãy nói khoản này dùng cho việc gì (ăn uống, xăng xe, tiết kiệm...).",
            "Hãy nói chậm và rõ hơn.",
        ),
        Language::En => (
            "Say the amount clearly, e.g. \"coffee 25 thousand\".",
            "Mention what it was for (food, transport, savings...).",
            "Try speaking more slowly and clearly.",
        ),
    };

    let mut out = Vec::new();
    if !signals.has_digit {
        out.push(amount_hint.to_string());
    }
    if !signals.has_keyword {
        out.push(purpose_hint.to_string());
    }
    if !signals.plausible_length || !signals.low_repetition || out.is_empty() {
        out.push(pace_hint.to_string());
    }
    out
}
