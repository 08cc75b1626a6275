//! Campus-specific lexicons: word sentiment, category keyword rules, and issue tags.

use std::collections::BTreeSet;

use rinsight_core::Category;

/// Word weights for student posts.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("good", 0.3),
    ("great", 0.4),
    ("love", 0.5),
    ("chill", 0.3),
    ("fun", 0.4),
    ("happy", 0.5),
    ("excited", 0.4),
    ("passed", 0.4),
    ("thanks", 0.3),
    ("helpful", 0.4),
    ("awesome", 0.5),
    ("nice", 0.3),
    ("proud", 0.4),
    ("relieved", 0.4),
    ("win", 0.4),
    ("bet", 0.2),
    // Negative signals
    ("stress", -0.5),
    ("stressed", -0.5),
    ("stressing", -0.5),
    ("anxiety", -0.6),
    ("anxious", -0.5),
    ("depressed", -0.7),
    ("burnout", -0.6),
    ("broke", -0.4),
    ("cooked", -0.5),
    ("crashing", -0.4),
    ("fail", -0.5),
    ("failed", -0.5),
    ("failing", -0.6),
    ("trash", -0.5),
    ("rough", -0.4),
    ("killing", -0.4),
    ("broken", -0.4),
    ("lonely", -0.5),
    ("tired", -0.3),
    ("exhausted", -0.5),
    ("overwhelmed", -0.6),
    ("hate", -0.6),
    ("worst", -0.6),
    ("bad", -0.4),
    ("sick", -0.4),
    ("worried", -0.4),
    ("scared", -0.5),
    ("unwise", -0.3),
];

/// Keyword rules per category, in tie-break order.
///
/// Phrases are matched on word boundaries after punctuation is folded to
/// spaces, so `"co-op"` also matches "co op" and "Co-Op".
pub(crate) const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::Academic,
        &[
            "finals", "midterms", "midterm", "exam", "exams", "math", "no prep", "locking in",
            "crashing out", "co-op", "coop", "gpa", "professor", "class", "study", "grades",
            "interview", "interviews",
        ],
    ),
    (
        Category::Financial,
        &[
            "tuition", "broke af", "broke", "financial aid", "loan", "loans", "textbooks",
            "rent", "scholarship", "afford", "money",
        ],
    ),
    (
        Category::Health,
        &[
            "brain fog", "stress", "stressed", "anxiety", "depressed", "burnout", "counseling",
            "sick", "sleep", "focus", "mental health",
        ],
    ),
    (
        Category::Housing,
        &[
            "housing", "roommate", "dorm", "lease", "vibes off", "elevators", "landlord",
            "apartment", "res life",
        ],
    ),
    (
        Category::Social,
        &["bet", "dragonlink", "club", "clubs", "friends", "lonely", "party", "events"],
    ),
];

/// Keywords that count as mental-health mentions for recommendation overrides.
pub const MENTAL_HEALTH_KEYWORDS: &[&str] = &[
    "stress",
    "anxiety",
    "depressed",
    "burnout",
    "brain fog",
];

/// Coarse issue tags used by the offline crash-period analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Issue {
    MentalHealth,
    CoOp,
    Finals,
}

impl Issue {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Issue::MentalHealth => "mental_health",
            Issue::CoOp => "co_op",
            Issue::Finals => "finals",
        }
    }
}

impl std::str::FromStr for Issue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mental_health" => Ok(Issue::MentalHealth),
            "co_op" => Ok(Issue::CoOp),
            "finals" => Ok(Issue::Finals),
            other => Err(format!("unknown issue tag: {other}")),
        }
    }
}

/// Score a text string using the campus lexicon.
///
/// Splits text into lowercase words, sums matching weights, and clamps
/// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f64 {
    let mut score = 0.0_f64;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        for &(lex_word, weight) in LEXICON {
            if w == lex_word {
                score += weight;
                break;
            }
        }
    }
    score.clamp(-1.0, 1.0)
}

/// Keywords from [`CATEGORY_RULES`] present in `text`, in canonical form.
#[must_use]
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    let padded = format!(" {} ", normalize_text_for_match(text));
    CATEGORY_RULES
        .iter()
        .flat_map(|(_, phrases)| phrases.iter())
        .filter(|phrase| padded.contains(&format!(" {} ", normalize_text_for_match(phrase))))
        .map(|phrase| (*phrase).to_string())
        .collect()
}

/// Pick the category whose rule list shares the most keywords with `keywords`.
///
/// Ties, including the all-zero case, go to the earliest category in
/// [`CATEGORY_RULES`] order.
#[must_use]
pub fn categorize(keywords: &BTreeSet<String>) -> Category {
    let mut best = (Category::Academic, 0usize);
    for &(category, phrases) in CATEGORY_RULES {
        let hits = phrases
            .iter()
            .filter(|phrase| keywords.contains(**phrase))
            .count();
        if hits > best.1 {
            best = (category, hits);
        }
    }
    best.0
}

/// Issue tags for a post body, by substring match on the lowercased text.
#[must_use]
pub fn detect_issues(text: &str) -> BTreeSet<Issue> {
    let text = text.to_lowercase();
    let mut issues = BTreeSet::new();
    if ["stress", "anxiety", "depressed", "burnout"]
        .iter()
        .any(|w| text.contains(w))
    {
        issues.insert(Issue::MentalHealth);
    }
    if text.contains("co-op") || text.contains("coop") {
        issues.insert(Issue::CoOp);
    }
    if text.contains("finals") || text.contains("exams") {
        issues.insert(Issue::Finals);
    }
    issues
}

#[must_use]
pub fn is_mental_health_keyword(keyword: &str) -> bool {
    MENTAL_HEALTH_KEYWORDS.contains(&keyword)
}

fn normalize_text_for_match(input: &str) -> String {
    input
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(lexicon_score(""), 0.0);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert_eq!(lexicon_score("the quick brown fox"), 0.0);
    }

    #[test]
    fn negative_keyword_returns_negative() {
        let score = lexicon_score("so stressed about finals");
        assert!(score < 0.0, "expected negative score, got {score}");
    }

    #[test]
    fn positive_keyword_returns_positive() {
        let score = lexicon_score("DragonLink is chill, joined a fun club");
        assert!(score > 0.0, "expected positive score, got {score}");
    }

    #[test]
    fn score_clamps_to_negative_one() {
        let text = "depressed anxious overwhelmed exhausted failing worst hate";
        assert_eq!(lexicon_score(text), -1.0);
    }

    #[test]
    fn punctuation_stripped_from_words() {
        assert!(lexicon_score("cooked!!") < 0.0);
    }

    #[test]
    fn keywords_match_on_word_boundaries() {
        let keywords = extract_keywords("Broke AF, tuition due and I can't afford textbooks");
        assert_eq!(
            keywords,
            set(&["afford", "broke", "broke af", "textbooks", "tuition"])
        );
        // "classic" must not match "class".
        assert!(extract_keywords("a classic mistake").is_empty());
    }

    #[test]
    fn hyphenated_phrase_matches_loosely() {
        let keywords = extract_keywords("Co op interviews next week");
        assert!(keywords.contains("co-op"));
        assert!(keywords.contains("interviews"));
    }

    #[test]
    fn categorize_picks_most_matches() {
        assert_eq!(
            categorize(&set(&["roommate", "dorm", "stress"])),
            Category::Housing
        );
    }

    #[test]
    fn categorize_breaks_ties_in_rule_order() {
        // One academic hit, one health hit: academic comes first.
        assert_eq!(categorize(&set(&["finals", "anxiety"])), Category::Academic);
        // One financial hit, one social hit: financial comes first.
        assert_eq!(categorize(&set(&["tuition", "party"])), Category::Financial);
    }

    #[test]
    fn categorize_defaults_to_first_category_without_matches() {
        assert_eq!(categorize(&BTreeSet::new()), Category::Academic);
    }

    #[test]
    fn issues_follow_substring_rules() {
        let issues = detect_issues("Stressing over coop apps and finals");
        assert!(issues.contains(&Issue::MentalHealth));
        assert!(issues.contains(&Issue::CoOp));
        assert!(issues.contains(&Issue::Finals));
        assert!(detect_issues("nice weather today").is_empty());
    }

    #[test]
    fn issue_tags_round_trip() {
        for issue in [Issue::MentalHealth, Issue::CoOp, Issue::Finals] {
            assert_eq!(issue.as_str().parse::<Issue>(), Ok(issue));
        }
    }

    #[test]
    fn mental_health_keywords_are_the_override_set() {
        for kw in ["stress", "anxiety", "depressed", "burnout", "brain fog"] {
            assert!(is_mental_health_keyword(kw), "{kw}");
        }
        assert!(!is_mental_health_keyword("stressed"));
        assert!(!is_mental_health_keyword("finals"));
    }
}
