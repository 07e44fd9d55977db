/// Service category taxonomy
///
/// Categories are a small, static taxonomy seeded at startup and rarely
/// mutated afterwards. Providers and tasks both reference a category.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A service category (e.g. "Plumbing", "Tutoring")
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServiceCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,

    /// Icon identifier for client UIs
    pub icon: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Default taxonomy seeded when the store has no categories yet
pub fn default_categories() -> Vec<CreateCategory> {
    [
        ("Cleaning", "Home and office cleaning", "broom"),
        ("Plumbing", "Pipes, fixtures, and drainage", "wrench"),
        ("Electrical", "Wiring, lighting, and repairs", "bolt"),
        ("Carpentry", "Furniture and woodwork", "hammer"),
        ("Painting", "Interior and exterior painting", "roller"),
        ("Gardening", "Lawn care and landscaping", "leaf"),
        ("Moving", "Packing and transport", "truck"),
        ("Tutoring", "Academic and skills tutoring", "book"),
    ]
    .into_iter()
    .map(|(name, description, icon)| CreateCategory {
        name: name.to_string(),
        description: Some(description.to_string()),
        icon: Some(icon.to_string()),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories_nonempty_and_unique() {
        let cats = default_categories();
        assert!(!cats.is_empty());

        let mut names: Vec<_> = cats.iter().map(|c| c.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), cats.len());
    }
}
