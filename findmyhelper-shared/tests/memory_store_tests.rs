//! Behavioral tests for the in-memory store
//!
//! These exercise the Store contract that both backends share, in particular
//! the at-most-once approval transition and the atomic rating recompute.

use findmyhelper_shared::models::{
    ApprovalStatus, CreateProvider, CreateReview, CreateServiceRequest, CreateSession, CreateUser,
    ProviderReview, RequestStatus, UpdateUser,
};
use findmyhelper_shared::store::{ensure_default_categories, MemoryStore, Store, StoreError};

fn new_user(email: &str) -> CreateUser {
    CreateUser {
        email: email.to_string(),
        password_hash: Some("$argon2id$fake".to_string()),
        auth_provider: None,
        full_name: Some("Test User".to_string()),
        phone: None,
        email_verified: true,
        verification_token: None,
    }
}

fn pending_provider(user_id: i64, category_id: i64) -> CreateProvider {
    CreateProvider {
        user_id,
        category_id,
        hourly_rate: 40.0,
        bio: Some("experienced".to_string()),
        verification_image_url: Some("https://objects.test/id.jpg".to_string()),
        approval_status: ApprovalStatus::Pending,
        is_verified: false,
    }
}

/// Seeds a user, the default categories, and a pending provider profile.
async fn seed_provider(store: &MemoryStore) -> (i64, i64) {
    let user = store.create_user(new_user("provider@example.com")).await.unwrap();
    ensure_default_categories(store).await.unwrap();
    let category = store.list_categories().await.unwrap()[0].id;
    let provider = store
        .create_provider(pending_provider(user.id, category))
        .await
        .unwrap();
    (user.id, provider.id)
}

#[tokio::test]
async fn test_email_uniqueness_is_case_insensitive() {
    let store = MemoryStore::new();
    store.create_user(new_user("alice@example.com")).await.unwrap();

    let err = store
        .create_user(new_user("ALICE@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let found = store.user_by_email("Alice@Example.COM").await.unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn test_update_user_clears_nullable_field() {
    let store = MemoryStore::new();
    let user = store.create_user(new_user("bob@example.com")).await.unwrap();
    assert!(user.full_name.is_some());

    let updated = store
        .update_user(
            user.id,
            UpdateUser {
                full_name: Some(None),
                phone: Some(Some("555-0100".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.full_name.is_none());
    assert_eq!(updated.phone.as_deref(), Some("555-0100"));
}

#[tokio::test]
async fn test_default_category_seeding_is_idempotent() {
    let store = MemoryStore::new();

    let first = ensure_default_categories(&store).await.unwrap();
    assert!(first > 0);

    let second = ensure_default_categories(&store).await.unwrap();
    assert_eq!(second, 0);

    assert_eq!(store.list_categories().await.unwrap().len(), first);
}

#[tokio::test]
async fn test_one_provider_profile_per_user() {
    let store = MemoryStore::new();
    let (user_id, _) = seed_provider(&store).await;
    let category = store.list_categories().await.unwrap()[0].id;

    let err = store
        .create_provider(pending_provider(user_id, category))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn test_approval_is_at_most_once() {
    let store = MemoryStore::new();
    let (_, provider_id) = seed_provider(&store).await;
    let admin = store.create_user(new_user("admin@example.com")).await.unwrap();

    let approved = store
        .review_provider(
            provider_id,
            ProviderReview {
                status: ApprovalStatus::Approved,
                admin_notes: None,
                reviewed_by: admin.id,
            },
        )
        .await
        .unwrap();

    assert_eq!(approved.approval_status, ApprovalStatus::Approved);
    assert!(approved.is_verified);
    assert_eq!(approved.reviewed_by, Some(admin.id));
    assert!(approved.reviewed_at.is_some());

    // A second decision on the same application must not land.
    let err = store
        .review_provider(
            provider_id,
            ProviderReview {
                status: ApprovalStatus::Rejected,
                admin_notes: Some("changed my mind".to_string()),
                reviewed_by: admin.id,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let unchanged = store.provider_by_id(provider_id).await.unwrap().unwrap();
    assert_eq!(unchanged.approval_status, ApprovalStatus::Approved);
}

#[tokio::test]
async fn test_rejection_records_notes_and_stays_unverified() {
    let store = MemoryStore::new();
    let (_, provider_id) = seed_provider(&store).await;
    let admin = store.create_user(new_user("admin@example.com")).await.unwrap();

    let rejected = store
        .review_provider(
            provider_id,
            ProviderReview {
                status: ApprovalStatus::Rejected,
                admin_notes: Some("blurry identity document".to_string()),
                reviewed_by: admin.id,
            },
        )
        .await
        .unwrap();

    assert_eq!(rejected.approval_status, ApprovalStatus::Rejected);
    assert!(!rejected.is_verified);
    assert_eq!(
        rejected.admin_notes.as_deref(),
        Some("blurry identity document")
    );
    assert!(!store
        .list_approved_providers(None)
        .await
        .unwrap()
        .iter()
        .any(|p| p.id == provider_id));
}

#[tokio::test]
async fn test_review_provider_missing_is_not_found() {
    let store = MemoryStore::new();
    let err = store
        .review_provider(
            9999,
            ProviderReview {
                status: ApprovalStatus::Approved,
                admin_notes: None,
                reviewed_by: 1,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn test_approved_provider_listing_filters_by_category() {
    let store = MemoryStore::new();
    let (_, provider_id) = seed_provider(&store).await;
    let admin = store.create_user(new_user("admin@example.com")).await.unwrap();
    store
        .review_provider(
            provider_id,
            ProviderReview {
                status: ApprovalStatus::Approved,
                admin_notes: None,
                reviewed_by: admin.id,
            },
        )
        .await
        .unwrap();

    let categories = store.list_categories().await.unwrap();
    let matching = categories[0].id;
    let other = categories[1].id;

    assert_eq!(
        store.list_approved_providers(Some(matching)).await.unwrap().len(),
        1
    );
    assert!(store
        .list_approved_providers(Some(other))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_rating_mean_rounds_to_one_decimal() {
    let store = MemoryStore::new();
    let (_, provider_id) = seed_provider(&store).await;
    let client = store.create_user(new_user("client@example.com")).await.unwrap();

    for rating in [5, 4, 4] {
        let request = store
            .create_service_request(CreateServiceRequest {
                client_id: client.id,
                provider_id,
                task_id: None,
                message: None,
            })
            .await
            .unwrap();
        store
            .update_service_request_status(request.id, RequestStatus::Completed)
            .await
            .unwrap();
        store
            .create_review(CreateReview {
                service_request_id: request.id,
                client_id: client.id,
                provider_id,
                rating,
                comment: None,
            })
            .await
            .unwrap();
    }

    let provider = store.provider_by_id(provider_id).await.unwrap().unwrap();
    // mean of 5, 4, 4 is 4.333..., stored as 4.3
    assert_eq!(provider.rating, 4.3);
    assert_eq!(provider.rating_count, 3);
}

#[tokio::test]
async fn test_duplicate_review_for_request_conflicts() {
    let store = MemoryStore::new();
    let (_, provider_id) = seed_provider(&store).await;
    let client = store.create_user(new_user("client@example.com")).await.unwrap();

    let request = store
        .create_service_request(CreateServiceRequest {
            client_id: client.id,
            provider_id,
            task_id: None,
            message: None,
        })
        .await
        .unwrap();

    let review = CreateReview {
        service_request_id: request.id,
        client_id: client.id,
        provider_id,
        rating: 5,
        comment: None,
    };
    store.create_review(review.clone()).await.unwrap();

    let err = store.create_review(review).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let provider = store.provider_by_id(provider_id).await.unwrap().unwrap();
    assert_eq!(provider.rating_count, 1);
}

#[tokio::test]
async fn test_review_with_dangling_references_conflicts() {
    let store = MemoryStore::new();
    let (_, provider_id) = seed_provider(&store).await;
    let client = store.create_user(new_user("client@example.com")).await.unwrap();

    // Unknown service request
    let err = store
        .create_review(CreateReview {
            service_request_id: 9999,
            client_id: client.id,
            provider_id,
            rating: 5,
            comment: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    // Unknown provider
    let request = store
        .create_service_request(CreateServiceRequest {
            client_id: client.id,
            provider_id,
            task_id: None,
            message: None,
        })
        .await
        .unwrap();
    let err = store
        .create_review(CreateReview {
            service_request_id: request.id,
            client_id: client.id,
            provider_id: 9999,
            rating: 5,
            comment: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn test_session_lifecycle() {
    let store = MemoryStore::new();
    let user = store.create_user(new_user("carol@example.com")).await.unwrap();

    let session = store
        .create_session(CreateSession {
            token: "a".repeat(64),
            user_id: user.id,
            expires_at: chrono::Utc::now() + chrono::Duration::hours(24),
        })
        .await
        .unwrap();
    assert!(!session.is_expired());

    let found = store.session_by_token(&session.token).await.unwrap();
    assert_eq!(found.unwrap().user_id, user.id);

    assert!(store.delete_session(&session.token).await.unwrap());
    assert!(!store.delete_session(&session.token).await.unwrap());
    assert!(store.session_by_token(&session.token).await.unwrap().is_none());
}
