//! Seeding configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Configuration for cold-start seeding of the summary cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedingConfig {
    /// Category name -> seed keywords searched on the provider.
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<String, Vec<String>>,

    /// Hits kept per keyword. Unset means the page size of the request
    /// that triggered seeding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_keyword_limit: Option<usize>,
}

fn default_categories() -> BTreeMap<String, Vec<String>> {
    let seeds: [(&str, [&str; 3]); 4] = [
        ("Action", ["Avengers", "Batman", "John Wick"]),
        ("Comedy", ["Friends", "The Hangover", "The Office"]),
        ("Sci-Fi", ["Inception", "Interstellar", "Matrix"]),
        ("Fantasy", ["Harry Potter", "Lord of the Rings", "Hobbit"]),
    ];

    seeds
        .into_iter()
        .map(|(category, keywords)| {
            (
                category.to_string(),
                keywords.into_iter().map(String::from).collect(),
            )
        })
        .collect()
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            per_keyword_limit: None,
        }
    }
}

impl SeedingConfig {
    /// Every seed keyword, in category order.
    pub fn keywords(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories.iter().flat_map(|(category, keywords)| {
            keywords
                .iter()
                .map(move |keyword| (category.as_str(), keyword.as_str()))
        })
    }
}
