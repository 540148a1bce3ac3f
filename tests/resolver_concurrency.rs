mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use linklet::application::services::ResolverService;
use linklet::domain::repositories::LinkRepository;
use linklet::domain::resolve::ResolveOutcome;
use linklet::infrastructure::persistence::MemoryLinkRepository;

#[tokio::test]
async fn test_one_time_link_resolves_exactly_once_under_contention() {
    let repo = Arc::new(MemoryLinkRepository::new());
    common::seed_one_time_link(&repo, "raceonce", "https://example.com/prize").await;

    let resolver = Arc::new(ResolverService::new(repo.clone()));

    let mut handles = Vec::new();
    for _ in 0..32 {
        let resolver = resolver.clone();
        handles.push(tokio::spawn(async move {
            resolver.resolve_and_track("raceonce").await.unwrap()
        }));
    }

    let mut successes = 0;
    let mut consumed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            ResolveOutcome::Success { original_url } => {
                assert_eq!(original_url, "https://example.com/prize");
                successes += 1;
            }
            ResolveOutcome::Consumed => consumed += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(consumed, 31);

    let link = repo.find_by_code("raceonce").await.unwrap().unwrap();
    assert_eq!(link.click_count, 1);
    assert!(link.consumed_at.is_some());
}

#[tokio::test]
async fn test_click_counter_is_monotonic_under_contention() {
    let repo = Arc::new(MemoryLinkRepository::new());
    common::seed_link(&repo, "popular1", "https://example.com/hot").await;

    let resolver = Arc::new(ResolverService::new(repo.clone()));

    let mut handles = Vec::new();
    for _ in 0..25 {
        let resolver = resolver.clone();
        handles.push(tokio::spawn(async move {
            resolver.resolve_and_track("popular1").await.unwrap()
        }));
    }

    for handle in handles {
        assert!(matches!(
            handle.await.unwrap(),
            ResolveOutcome::Success { .. }
        ));
    }

    let link = repo.find_by_code("popular1").await.unwrap().unwrap();
    assert_eq!(link.click_count, 25);
    assert!(link.last_clicked_at.is_some());
}

#[tokio::test]
async fn test_expired_one_time_link_reports_expired() {
    let repo = Arc::new(MemoryLinkRepository::new());
    repo.create(linklet::domain::entities::NewShortLink {
        code: "oldsecret".to_string(),
        original_url: "https://example.com/secret".to_string(),
        expires_at: Some(Utc::now() - Duration::minutes(5)),
        one_time: true,
    })
    .await
    .unwrap();

    let resolver = ResolverService::new(repo.clone());

    // Expiry wins over consumption checks and nothing is written.
    let outcome = resolver.resolve_and_track("oldsecret").await.unwrap();
    assert!(matches!(outcome, ResolveOutcome::Expired));

    let link = repo.find_by_code("oldsecret").await.unwrap().unwrap();
    assert_eq!(link.click_count, 0);
    assert!(link.consumed_at.is_none());
}
