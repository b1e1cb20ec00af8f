//! Wishlist reconciliation across session changes.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use krisha_core::ProductId;
use krisha_integration_tests::{Call, ScriptedWishlist, product, wait_until, within};
use krisha_storefront::cart::CartStore;
use krisha_storefront::storage::FileStore;
use krisha_storefront::{
    AuthSession, LoadOutcome, SessionToken, Storefront, WishlistOutcome, WishlistStore,
};

fn ids(ids: &[&str]) -> Vec<ProductId> {
    ids.iter().map(|id| ProductId::new(*id)).collect()
}

fn call_list(token: &str) -> Option<Call> {
    Some(Call::List(token.to_string()))
}

#[tokio::test]
async fn test_stale_load_never_overwrites_newer_session() {
    let (api, mut calls) = ScriptedWishlist::new();
    let api = api
        .with_user("tok-one", &["x"])
        .with_user("tok-two", &["y", "z"]);
    let release_one = api.hold_list("tok-one");
    let store = WishlistStore::new(api);

    let first = store.begin_session(Some(SessionToken::new("tok-one"))).unwrap();
    let slow = tokio::spawn({
        let store = store.clone();
        async move { store.run_load(first).await }
    });
    assert_eq!(within(calls.recv()).await, call_list("tok-one"));

    let second = store.begin_session(Some(SessionToken::new("tok-two"))).unwrap();
    assert_eq!(store.run_load(second).await.unwrap(), LoadOutcome::Applied(2));
    assert_eq!(store.product_ids(), ids(&["y", "z"]));

    release_one.send(()).unwrap();
    assert_eq!(within(slow).await.unwrap().unwrap(), LoadOutcome::Stale);
    assert_eq!(store.product_ids(), ids(&["y", "z"]));
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_watcher_follows_latest_session() {
    let (api, mut calls) = ScriptedWishlist::new();
    let api = api
        .with_user("tok-one", &["x"])
        .with_user("tok-two", &["y", "z"]);
    let release_one = api.hold_list("tok-one");
    let store = WishlistStore::new(api);
    let session = AuthSession::signed_out();
    let watcher = store.spawn_session_watcher(&session);

    session.set_token(SessionToken::new("tok-one"));
    assert_eq!(within(calls.recv()).await, call_list("tok-one"));
    assert!(store.is_loading());

    session.set_token(SessionToken::new("tok-two"));
    wait_until(|| store.product_ids() == ids(&["y", "z"])).await;

    release_one.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(store.product_ids(), ids(&["y", "z"]));
    assert!(!store.is_loading());

    session.clear();
    wait_until(|| !store.has_session()).await;
    assert!(store.is_empty());

    watcher.abort();
}

#[tokio::test]
async fn test_mutations_without_session_are_noops() {
    let (api, mut calls) = ScriptedWishlist::new();
    let store = WishlistStore::new(api);
    let x = ProductId::new("x");

    assert_eq!(store.add(&x).await.unwrap(), WishlistOutcome::NoSession);
    assert_eq!(store.remove(&x).await.unwrap(), WishlistOutcome::NoSession);
    assert!(store.is_empty());
    assert!(calls.try_recv().is_err());
}

#[tokio::test]
async fn test_add_then_remove_round_trip() {
    let (api, mut calls) = ScriptedWishlist::new();
    let api = api.with_user("tok", &["x", "y", "z"]);
    let store = WishlistStore::new(api);

    store
        .sync_session(Some(SessionToken::new("tok")))
        .await
        .unwrap();
    assert_eq!(calls.recv().await, call_list("tok"));

    let w = ProductId::new("w");
    assert_eq!(store.add(&w).await.unwrap(), WishlistOutcome::Applied);
    assert!(store.is_in_wishlist(&w));
    assert_eq!(calls.recv().await, Some(Call::Add("tok".to_string(), w)));
    assert_eq!(calls.recv().await, call_list("tok"));

    let x = ProductId::new("x");
    assert_eq!(store.remove(&x).await.unwrap(), WishlistOutcome::Applied);
    assert_eq!(store.product_ids(), ids(&["y", "z", "w"]));
    assert_eq!(store.api().server_products("tok"), ids(&["y", "z", "w"]));
    assert_eq!(calls.recv().await, Some(Call::Remove("tok".to_string(), x)));
    assert!(calls.try_recv().is_err());
}

#[tokio::test]
async fn test_outage_leaves_local_state() {
    let (api, _calls) = ScriptedWishlist::new();
    let api = api.with_user("tok", &["x"]);
    let store = WishlistStore::new(api);
    store
        .sync_session(Some(SessionToken::new("tok")))
        .await
        .unwrap();

    store.api().set_failing(true);
    assert!(store.add(&ProductId::new("y")).await.is_err());
    assert!(store.remove(&ProductId::new("x")).await.is_err());
    assert!(store.reload().await.is_err());
    assert_eq!(store.product_ids(), ids(&["x"]));
    assert!(!store.is_loading());

    store.api().set_failing(false);
    assert_eq!(store.reload().await.unwrap(), LoadOutcome::Applied(1));
}

#[tokio::test]
async fn test_storefront_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let (api, _calls) = ScriptedWishlist::new();
    let api = api.with_user("tok", &["x", "y"]);
    let session = AuthSession::new(Some(SessionToken::new("tok")));

    let mut storefront = Storefront::start(FileStore::open(dir.path()).unwrap(), session, api);
    assert!(storefront.is_watching());
    wait_until(|| storefront.wishlist().len() == 2).await;

    storefront.cart_mut().add_item(product("a", 1500, 2));
    storefront.session().clear();
    wait_until(|| storefront.wishlist().is_empty()).await;
    assert_eq!(storefront.cart().len(), 1);

    storefront.shutdown().unwrap();

    let cart = CartStore::hydrate(FileStore::open(dir.path()).unwrap());
    assert_eq!(cart.total_items(), 1);
}
