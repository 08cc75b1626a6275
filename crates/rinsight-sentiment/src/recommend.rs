//! Intervention recommendations for student-support staff.
//!
//! Two sources: a static per-category table that is always available, and
//! generative delegation to the configured classifier. Keyword-triggered
//! suggestions come from a fixed phrase table.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use rinsight_core::{Category, Post, RecommenderKind, TimeWindow};
use serde::Serialize;

use crate::classifier::{Classifier, Suggestion, SuggestionRequest};
use crate::lexicon::is_mental_health_keyword;

/// Targeted suggestion used once mental-health mentions cross the threshold.
pub const MENTAL_HEALTH_SUGGESTION: &str =
    "Offer Counseling Center drop-ins and mental health workshops";

/// Mentions within one window (or one category) that trigger the override.
pub const MENTAL_HEALTH_THRESHOLD: usize = 2;

/// Campus-wide recommendation attached to every stress report.
pub const UMBRELLA_RECOMMENDATION: &str = "Host campus-wide wellness fair";

/// A campus support office the recommender may point students to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportResource {
    pub name: &'static str,
    pub description: &'static str,
    pub category: Category,
}

pub const SUPPORT_RESOURCES: &[SupportResource] = &[
    SupportResource {
        name: "Math Resource Center (MRC)",
        description: "Free drop-in tutoring for math courses",
        category: Category::Academic,
    },
    SupportResource {
        name: "Academic Resource Center (ARC)",
        description: "Study skills coaching and group study sessions",
        category: Category::Academic,
    },
    SupportResource {
        name: "Steinbright Career Center",
        description: "Co-op preparation, resume review and mock interviews",
        category: Category::Academic,
    },
    SupportResource {
        name: "Student Financial Services",
        description: "Tuition billing, payment plans and financial aid counseling",
        category: Category::Financial,
    },
    SupportResource {
        name: "Counseling Center",
        description: "Same-day drop-in counseling and mental health workshops",
        category: Category::Health,
    },
    SupportResource {
        name: "Residential Living",
        description: "Roommate mediation, maintenance requests and housing changes",
        category: Category::Housing,
    },
    SupportResource {
        name: "DragonLink",
        description: "Directory of student clubs and campus events",
        category: Category::Social,
    },
];

/// Fallback recommendation for a category.
#[must_use]
pub fn static_suggestion(category: Category) -> &'static str {
    match category {
        Category::Academic => "Promote Math Resource Center (MRC)",
        Category::Financial => "Link to Student Financial Services",
        Category::Health => "Offer Counseling Center drop-ins",
        Category::Housing => "Refer to Resident Life",
        Category::Social => "Promote DragonLink clubs",
    }
}

const KEYWORD_SUGGESTIONS: &[(&str, &str)] = &[
    (
        "crashing out",
        "Promote Math Resource Center (MRC) for math exam prep",
    ),
    (
        "locking in",
        "Host study session with Academic Resource Center (ARC)",
    ),
    (
        "broke af",
        "Link to Student Financial Services for tuition concerns",
    ),
    ("bet", "Promote DragonLink for social engagement"),
    (
        "brain fog",
        "Offer Counseling Center drop-ins for mental health",
    ),
    ("vibes off", "Refer to Resident Life for roommate mediation"),
    ("housing", "Refer to Resident Life for housing issues"),
    ("co-op", "Promote Steinbright Career Center for co-op prep"),
    ("no prep", "Promote Quizlet and peer tutoring for exam prep"),
];

/// Suggestion for a keyword from the fixed table, if it has one.
#[must_use]
pub fn keyword_suggestion(keyword: &str) -> Option<&'static str> {
    KEYWORD_SUGGESTIONS
        .iter()
        .find(|(kw, _)| *kw == keyword)
        .map(|(_, suggestion)| *suggestion)
}

/// Number of mental-health keyword mentions across `posts`.
pub fn mental_health_mentions<'a>(posts: impl IntoIterator<Item = &'a Post>) -> usize {
    posts
        .into_iter()
        .map(|p| {
            p.keywords
                .iter()
                .filter(|k| is_mental_health_keyword(k))
                .count()
        })
        .sum()
}

/// Static category recommendation, overridden when the category's own posts
/// mention mental-health keywords often enough.
#[must_use]
pub fn category_recommendation(category: Category, posts: &[&Post]) -> &'static str {
    if mental_health_mentions(posts.iter().copied()) >= MENTAL_HEALTH_THRESHOLD {
        MENTAL_HEALTH_SUGGESTION
    } else {
        static_suggestion(category)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordRecommendation {
    pub keyword: String,
    pub suggestion: String,
    pub week: String,
}

/// Keyword-triggered recommendations for posts already filtered to `window`.
///
/// Keywords without a table entry are skipped unless they are mental-health
/// keywords and the override threshold is reached. Each keyword appears
/// once, at the position of its first occurrence in post order.
#[must_use]
pub fn keyword_recommendations(posts: &[&Post], window: &TimeWindow) -> Vec<KeywordRecommendation> {
    let override_active =
        mental_health_mentions(posts.iter().copied()) >= MENTAL_HEALTH_THRESHOLD;
    let week = window.label();
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for post in posts {
        for keyword in &post.keywords {
            let suggestion = if override_active && is_mental_health_keyword(keyword) {
                Some(MENTAL_HEALTH_SUGGESTION)
            } else {
                keyword_suggestion(keyword)
            };
            let Some(suggestion) = suggestion else {
                continue;
            };
            if seen.insert(keyword.clone()) {
                out.push(KeywordRecommendation {
                    keyword: keyword.clone(),
                    suggestion: suggestion.to_string(),
                    week: week.clone(),
                });
            }
        }
    }
    out
}

/// Chooses between the static table and generative delegation.
#[derive(Clone)]
pub struct Recommender {
    kind: RecommenderKind,
    classifier: Arc<dyn Classifier>,
}

impl Recommender {
    #[must_use]
    pub fn new(kind: RecommenderKind, classifier: Arc<dyn Classifier>) -> Self {
        Self { kind, classifier }
    }

    #[must_use]
    pub fn kind(&self) -> RecommenderKind {
        self.kind
    }

    /// Recommendation for `category` given the keywords seen in its posts.
    ///
    /// Generative failures degrade to the static table; the explanation
    /// records why.
    pub async fn recommend(&self, category: Category, keywords: &BTreeSet<String>) -> Suggestion {
        let fallback = static_suggestion(category).to_string();
        if self.kind == RecommenderKind::Static {
            return Suggestion {
                text: fallback,
                explanation: format!("Standard {category} resource"),
            };
        }

        let request = SuggestionRequest {
            category,
            keywords: keywords.clone(),
            resources: SUPPORT_RESOURCES,
        };
        match self.classifier.suggest(&request).await {
            Ok(suggestion) => suggestion,
            Err(e) => {
                tracing::warn!(
                    category = %category,
                    classifier = self.classifier.name(),
                    error = %e,
                    "generative recommendation failed; using static table"
                );
                Suggestion {
                    text: fallback,
                    explanation: format!(
                        "Generated recommendation unavailable ({e}); using standard {category} resource"
                    ),
                }
            }
        }
    }

    /// Recommendations for every category present in `keywords_by_category`.
    pub async fn recommend_all(
        &self,
        keywords_by_category: &BTreeMap<Category, BTreeSet<String>>,
    ) -> BTreeMap<Category, Suggestion> {
        let mut out = BTreeMap::new();
        for (category, keywords) in keywords_by_category {
            out.insert(*category, self.recommend(*category, keywords).await);
        }
        out
    }
}
