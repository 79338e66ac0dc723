//! Seeded demo catalog generator.
//!
//! Produces either a product catalog (brands, prices, ratings, tags) or a
//! plain article feed. The same seed and anchor time always yield the same
//! records, which keeps integration tests and benches reproducible.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{RecordProvider, StoreError};
use crate::model::types::Record;

const CATEGORIES: [&str; 9] = [
    "Electronics",
    "Clothing",
    "Home & Kitchen",
    "Books",
    "Sports",
    "Beauty",
    "Toys",
    "Automotive",
    "Health",
];

// Paired index-for-index with CATEGORIES.
const BRANDS: [&str; 9] = [
    "TechMaster",
    "StyleCo",
    "HomeEssentials",
    "BookWorm",
    "SportsPro",
    "BeautyGlow",
    "ToyWorld",
    "AutoParts",
    "HealthFirst",
];

const ADJECTIVES: [&str; 10] = [
    "Premium",
    "Deluxe",
    "Advanced",
    "Compact",
    "Professional",
    "Portable",
    "Smart",
    "Ultra",
    "Ergonomic",
    "Lightweight",
];

const NOUNS: [&str; 9] = [
    "Laptop",
    "Shirt",
    "Blender",
    "Novel",
    "Sneakers",
    "Moisturizer",
    "Action Figure",
    "Headlight",
    "Vitamins",
];

const TAGS: [&str; 9] = [
    "new",
    "bestseller",
    "sale",
    "trending",
    "premium",
    "eco-friendly",
    "limited-edition",
    "handmade",
    "imported",
];

const FEATURES: [&str; 9] = [
    "High quality materials",
    "Easy to use",
    "Durable construction",
    "Modern design",
    "Energy efficient",
    "Multifunctional",
    "Eco-friendly",
    "Compact size",
    "Versatile usage",
];

const ARTICLE_CATEGORIES: [&str; 5] = [
    "Technology",
    "Business",
    "Health",
    "Education",
    "Entertainment",
];

/// Maximum age of a generated record, in milliseconds (~115 days).
const MAX_AGE_MS: i64 = 10_000_000_000;

/// Which demo dataset to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Dataset {
    Products,
    Articles,
}

impl Dataset {
    pub fn default_count(self) -> usize {
        match self {
            Self::Products => 200,
            Self::Articles => 100,
        }
    }
}

impl std::str::FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "products" | "product" => Ok(Self::Products),
            "articles" | "article" | "content" => Ok(Self::Articles),
            other => Err(format!("unknown dataset '{other}'")),
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Products => write!(f, "products"),
            Self::Articles => write!(f, "articles"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogGenerator {
    dataset: Dataset,
    count: usize,
    seed: u64,
    anchor: DateTime<Utc>,
}

impl CatalogGenerator {
    pub fn new(dataset: Dataset, count: usize, seed: u64) -> Self {
        Self {
            dataset,
            count,
            seed,
            anchor: Utc::now(),
        }
    }

    /// Pin "now" so creation timestamps are reproducible.
    pub fn with_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn generate(&self) -> Vec<Record> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.count)
            .map(|index| match self.dataset {
                Dataset::Products => self.product(&mut rng, index),
                Dataset::Articles => self.article(&mut rng, index),
            })
            .collect()
    }

    fn created_at(&self, rng: &mut StdRng) -> DateTime<Utc> {
        self.anchor - Duration::milliseconds(rng.gen_range(0..MAX_AGE_MS))
    }

    fn product(&self, rng: &mut StdRng, index: usize) -> Record {
        let id = format!("prod-{}", index + 1);
        let slot = index % CATEGORIES.len();
        let category = CATEGORIES[slot];
        let brand = BRANDS[slot];
        let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Premium");
        let noun = NOUNS[slot % NOUNS.len()];
        let name = format!("{adjective} {brand} {noun}");

        let tag_count = rng.gen_range(2..=5);
        let tags = pick_distinct(rng, &TAGS, tag_count);
        let feature_count = rng.gen_range(2..=4);
        let features = pick_distinct(rng, &FEATURES, feature_count);

        let description = format!(
            "The {name} is a high-quality {} product from {brand}. {}. Perfect for everyday use and makes a great gift.",
            category.to_lowercase(),
            features.join(". ")
        );

        let price = f64::from(rng.gen_range(100u32..1000));
        let rating = ((rng.gen_range(3.0f64..5.0)) * 10.0).round() / 10.0;
        let stock = rng.gen_range(0u32..100);
        let created_at = self.created_at(rng);

        Record::new(&id, name, category, created_at)
            .with_description(description)
            .with_brand(brand)
            .with_price(price)
            .with_rating(rating)
            .with_stock(stock)
            .with_tags(tags)
            .with_image_url(format!("https://picsum.photos/seed/{id}/300/300"))
    }

    fn article(&self, rng: &mut StdRng, index: usize) -> Record {
        let n = index + 1;
        let category = ARTICLE_CATEGORIES
            .choose(rng)
            .copied()
            .unwrap_or("Technology");
        let created_at = self.created_at(rng);
        Record::new(
            format!("item-{n}"),
            format!("Search Result {n}"),
            category,
            created_at,
        )
        .with_description(format!(
            "This is a description for search result item {n}. It contains some more details about the item."
        ))
        .with_image_url(format!("https://picsum.photos/seed/{n}/200/200"))
    }
}

/// Draw `attempts` times with replacement, keeping first occurrences only.
fn pick_distinct(rng: &mut StdRng, pool: &[&str], attempts: usize) -> Vec<String> {
    let mut picked: Vec<String> = Vec::with_capacity(attempts);
    for _ in 0..attempts {
        if let Some(choice) = pool.choose(rng)
            && !picked.iter().any(|p| p == choice)
        {
            picked.push((*choice).to_string());
        }
    }
    picked
}

impl RecordProvider for CatalogGenerator {
    fn load(&self) -> Result<Vec<Record>, StoreError> {
        Ok(self.generate())
    }

    fn describe(&self) -> String {
        format!(
            "generated:{} count={} seed={}",
            self.dataset, self.count, self.seed
        )
    }
}
