/// Review model
///
/// A review is a client's rating of a completed service request. At most one
/// review exists per request (unique constraint). Creating a review atomically
/// recomputes the provider's aggregate rating; see the store implementations.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE reviews (
///     id BIGSERIAL PRIMARY KEY,
///     service_request_id BIGINT NOT NULL UNIQUE REFERENCES service_requests(id),
///     client_id BIGINT NOT NULL REFERENCES users(id),
///     provider_id BIGINT NOT NULL REFERENCES service_providers(id),
///     rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
///     comment TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A client's rating of a completed engagement
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: i64,

    /// The completed engagement being reviewed (unique)
    pub service_request_id: i64,

    pub client_id: i64,
    pub provider_id: i64,

    /// 1 to 5 stars
    pub rating: i32,

    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReview {
    pub service_request_id: i64,
    pub client_id: i64,
    pub provider_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
}

/// Rounds a mean rating to one decimal place
///
/// Both store backends use this so the aggregate is identical regardless of
/// which backend computed it.
pub fn round_rating(mean: f64) -> f64 {
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_rating() {
        assert_eq!(round_rating(4.0), 4.0);
        assert_eq!(round_rating(4.25), 4.3);
        assert_eq!(round_rating(4.24), 4.2);
        assert_eq!(round_rating(10.0 / 3.0), 3.3);
    }

    #[test]
    fn test_mean_of_sequence() {
        let ratings = [5, 4, 4];
        let mean = ratings.iter().sum::<i32>() as f64 / ratings.len() as f64;
        assert_eq!(round_rating(mean), 4.3);
    }
}
