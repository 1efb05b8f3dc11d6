//! Category taxonomy keywords.
//!
//! One static table drives both free-text question parsing and the offline
//! transaction categorizer. Matching is whole-word and case-insensitive.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::finance::Category;

/// Keyword list per category. The bare category name always matches too.
pub static CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Food,
        &[
            "restaurant", "restaurants", "lunch", "dinner", "breakfast", "grocery",
            "groceries", "supermarket", "cafe", "coffee", "snacks", "meal", "meals",
            "takeaway", "naivas", "quickmart", "carrefour",
        ],
    ),
    (
        Category::Transport,
        &[
            "fare", "matatu", "uber", "bolt", "taxi", "fuel", "petrol", "parking", "bus",
            "train", "travel", "commute",
        ],
    ),
    (
        Category::Utilities,
        &[
            "utility", "electricity", "kplc", "water", "internet", "wifi", "airtime",
            "bundle", "bundles", "data bundle", "safaricom", "tokens",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "movie", "movies", "cinema", "netflix", "showmax", "music", "games", "concert",
            "party", "betting", "theatre",
        ],
    ),
    (
        Category::Shopping,
        &[
            "shopping", "clothes", "clothing", "shoes", "electronics", "jumia", "mall",
            "buy goods", "boutique",
        ],
    ),
    (
        Category::Health,
        &[
            "hospital", "doctor", "clinic", "pharmacy", "medicine", "medical", "dentist",
            "insurance", "nhif",
        ],
    ),
    (
        Category::Education,
        &[
            "school", "fees", "tuition", "books", "university", "college", "course",
        ],
    ),
    (
        Category::Housing,
        &["rent", "landlord", "apartment", "house rent", "mortgage"],
    ),
    (
        Category::Bills,
        &["bill", "paybill", "pay bill", "subscription", "dstv", "loan", "repayment"],
    ),
    (
        Category::Transfer,
        &["transfers", "send money", "sent money", "family", "friend"],
    ),
    (
        Category::Income,
        &["salary", "wages", "payroll", "earnings", "deposit", "received"],
    ),
    (Category::Other, &["miscellaneous", "misc"]),
];

/// Keywords registered for one category.
pub fn keywords_for(category: Category) -> &'static [&'static str] {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, kws)| *kws)
        .unwrap_or(&[])
}

static CATEGORY_PATTERNS: Lazy<Vec<(Category, Regex)>> = Lazy::new(|| {
    CATEGORY_KEYWORDS
        .iter()
        .filter_map(|(category, kws)| {
            let alternatives: Vec<String> = std::iter::once(category.name())
                .chain(kws.iter().copied())
                .map(regex::escape)
                .collect();
            Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
                .ok()
                .map(|re| (*category, re))
        })
        .collect()
});

/// Every category whose name or keyword appears as a whole word, in table order.
pub fn matching_categories(text: &str) -> Vec<Category> {
    CATEGORY_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(c, _)| *c)
        .collect()
}

/// Categorize a transaction description.
///
/// First category in table order wins; nothing matching gives `Other`.
pub fn categorize(description: &str) -> Category {
    matching_categories(description)
        .into_iter()
        .find(|c| *c != Category::Other)
        .unwrap_or(Category::Other)
}
