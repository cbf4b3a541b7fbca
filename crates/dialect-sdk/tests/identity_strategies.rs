//! Execution policies of the identity resolver strategies

mod common;

use common::{key, FakeIdentityProvider, Outcome};
use dialect_sdk::identity::{
    AggregateSequentialIdentityResolver, FirstFoundFastIdentityResolver,
    FirstFoundIdentityResolver,
};
use dialect_sdk::{IdentityProvider, IdentityResolver};
use std::sync::Arc;
use std::time::Duration;

fn providers(list: &[&Arc<FakeIdentityProvider>]) -> Vec<Arc<dyn IdentityProvider>> {
    list.iter()
        .map(|p| (*p).clone() as Arc<dyn IdentityProvider>)
        .collect()
}

#[tokio::test]
async fn test_first_found_stops_at_first_hit() {
    let a = FakeIdentityProvider::new("a", 0, Outcome::Empty);
    let b = FakeIdentityProvider::new("b", 0, Outcome::Found("bob.sol"));
    let c = FakeIdentityProvider::new("c", 0, Outcome::Fail);
    let resolver = FirstFoundIdentityResolver::new(providers(&[&a, &b, &c]));

    let identities = resolver.resolve(&key(5)).await;

    assert_eq!(identities.len(), 1);
    assert_eq!(identities[0].name, "bob.sol");
    assert_eq!(identities[0].provider, "b");
    assert_eq!(a.calls(), 1);
    assert_eq!(c.calls(), 0);
}

#[tokio::test]
async fn test_first_found_swallows_errors() {
    let a = FakeIdentityProvider::new("a", 0, Outcome::Fail);
    let b = FakeIdentityProvider::new("b", 0, Outcome::Found("bob.sol"));
    let resolver = FirstFoundIdentityResolver::new(providers(&[&a, &b]));

    assert_eq!(resolver.resolve(&key(5)).await[0].provider, "b");
}

#[tokio::test]
async fn test_first_found_all_empty() {
    let a = FakeIdentityProvider::new("a", 0, Outcome::Empty);
    let b = FakeIdentityProvider::new("b", 0, Outcome::Fail);
    let resolver = FirstFoundIdentityResolver::new(providers(&[&a, &b]));

    assert!(resolver.resolve(&key(5)).await.is_empty());
    assert!(resolver.resolve_reverse("nobody").await.is_empty());
}

#[tokio::test]
async fn test_first_found_fast_waits_past_fast_failure() {
    let slow = FakeIdentityProvider::new("slow", 50, Outcome::Found("alice.sol"));
    let fast = FakeIdentityProvider::new("fast", 0, Outcome::Fail);
    let resolver = FirstFoundFastIdentityResolver::new(providers(&[&slow, &fast]));

    let identities = resolver.resolve(&key(5)).await;

    assert_eq!(identities.len(), 1);
    assert_eq!(identities[0].provider, "slow");
}

#[tokio::test]
async fn test_first_found_fast_ignores_provider_order() {
    let slow = FakeIdentityProvider::new("slow", 200, Outcome::Found("slow.sol"));
    let fast = FakeIdentityProvider::new("fast", 5, Outcome::Found("fast.sol"));
    let resolver = FirstFoundFastIdentityResolver::new(providers(&[&slow, &fast]));

    let started = tokio::time::Instant::now();
    let identities = resolver.resolve(&key(5)).await;

    assert_eq!(identities[0].name, "fast.sol");
    assert!(started.elapsed() < Duration::from_millis(200));
    // both were started concurrently
    assert_eq!(slow.calls(), 1);
}

#[tokio::test]
async fn test_first_found_fast_all_fail_is_empty() {
    let a = FakeIdentityProvider::new("a", 10, Outcome::Fail);
    let b = FakeIdentityProvider::new("b", 0, Outcome::Empty);
    let resolver = FirstFoundFastIdentityResolver::new(providers(&[&a, &b]));

    assert!(resolver.resolve(&key(5)).await.is_empty());
}

#[tokio::test]
async fn test_aggregate_sequential_collects_in_order() {
    let a = FakeIdentityProvider::new("a", 20, Outcome::Found("a.sol"));
    let b = FakeIdentityProvider::new("b", 0, Outcome::Fail);
    let c = FakeIdentityProvider::new("c", 0, Outcome::Found("c.sol"));
    let resolver = AggregateSequentialIdentityResolver::new(providers(&[&a, &b, &c]));

    let identities = resolver.resolve(&key(5)).await;

    let names: Vec<&str> = identities.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["a.sol", "c.sol"]);
    assert_eq!(b.calls(), 1);
}

#[tokio::test]
async fn test_aggregate_sequential_reverse_lookup() {
    let a = FakeIdentityProvider::new("a", 0, Outcome::Found("a.sol"));
    let b = FakeIdentityProvider::new("b", 0, Outcome::Found("b.twitter"));
    let resolver = AggregateSequentialIdentityResolver::new(providers(&[&a, &b]));

    let identities = resolver.resolve_reverse("anyone").await;

    assert_eq!(identities.len(), 2);
    assert!(identities.iter().all(|i| i.public_key == key(99)));
}
