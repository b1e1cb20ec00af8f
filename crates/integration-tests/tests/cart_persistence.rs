//! Cart behavior across reloads of durable storage.

#![allow(clippy::unwrap_used)]

use krisha_core::{CartItem, Price, ProductId};
use krisha_integration_tests::product;
use krisha_storefront::cart::{
    AddOutcome, CART_STORAGE_KEY, CartStore, CartSummary, QuantityOutcome,
};
use krisha_storefront::storage::{FileStore, KeyValueStore, MemoryStore};

fn persisted(storage: &impl KeyValueStore) -> Vec<CartItem> {
    let raw = storage.get(CART_STORAGE_KEY).unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn test_adds_stop_at_stock() {
    let mut cart = CartStore::hydrate(MemoryStore::new());
    let a = product("a", 1000, 3);

    let outcomes: Vec<_> = (0..4).map(|_| cart.add_item(a.clone())).collect();

    assert_eq!(
        outcomes,
        vec![
            AddOutcome::Inserted,
            AddOutcome::Incremented,
            AddOutcome::Incremented,
            AddOutcome::AtStockLimit,
        ]
    );
    assert_eq!(cart.get(&ProductId::new("a")).unwrap().quantity, 3);
}

#[test]
fn test_update_clamps_to_stock() {
    let mut cart = CartStore::hydrate(MemoryStore::new());
    cart.add_item(product("a", 1000, 3));

    let outcome = cart.update_quantity(&ProductId::new("a"), 10);

    assert_eq!(
        outcome,
        QuantityOutcome::Set {
            quantity: 3,
            clamped: true
        }
    );
    assert_eq!(cart.total_items(), 3);
}

#[test]
fn test_clear_survives_reload() {
    let storage = MemoryStore::new();
    let mut cart = CartStore::hydrate(storage.clone());
    cart.add_item(product("a", 1000, 5));
    cart.add_item(product("b", 250, 5));
    assert_eq!(persisted(&storage).len(), 2);

    cart.clear_cart();

    assert!(cart.is_empty());
    assert!(persisted(&storage).is_empty());
    let reloaded = CartStore::hydrate(storage);
    assert!(reloaded.is_empty());
}

#[test]
fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut cart = CartStore::hydrate(FileStore::open(dir.path()).unwrap());
        cart.add_item(product("a", 1999, 4));
        cart.add_item(product("a", 1999, 4));
        cart.add_item(product("b", 500, 1));
        cart.update_quantity(&ProductId::new("b"), 0);
    }

    let cart = CartStore::hydrate(FileStore::open(dir.path()).unwrap());
    assert_eq!(cart.len(), 1);
    let line = cart.get(&ProductId::new("a")).unwrap();
    assert_eq!(line.quantity, 2);
    assert_eq!(line.stock, 4);
    assert_eq!(line.image.as_deref(), Some("/images/a.jpg"));
    assert_eq!(cart.total_price(), Price::from_minor(3998).unwrap());
}

#[test]
fn test_persisted_shape_is_camel_case_array() {
    let storage = MemoryStore::new();
    let mut cart = CartStore::hydrate(storage.clone());
    cart.add_item(product("a", 1999, 2));

    let raw = storage.get(CART_STORAGE_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(
        value,
        serde_json::json!([{
            "productId": "a",
            "name": "Product a",
            "price": 19.99,
            "image": "/images/a.jpg",
            "stock": 2,
            "quantity": 1
        }])
    );
}

#[test]
fn test_corrupt_value_yields_empty_cart() {
    let storage = MemoryStore::new();
    storage.set(CART_STORAGE_KEY, "{not json").unwrap();

    let mut cart = CartStore::hydrate(storage.clone());

    assert!(cart.is_empty());
    cart.add_item(product("a", 100, 1));
    assert_eq!(persisted(&storage).len(), 1);
}

#[test]
fn test_hydrate_repairs_invalid_lines() {
    let storage = MemoryStore::new();
    storage
        .set(
            CART_STORAGE_KEY,
            r#"[
                {"productId":"a","name":"A","price":5,"stock":2,"quantity":9},
                {"productId":"a","name":"A again","price":5,"stock":2,"quantity":1},
                {"productId":"b","name":"B","price":1.5,"stock":0,"quantity":1},
                {"productId":"c"}
            ]"#,
        )
        .unwrap();

    let cart = CartStore::hydrate(storage.clone());

    assert_eq!(cart.len(), 1);
    let line = cart.get(&ProductId::new("a")).unwrap();
    assert_eq!(line.name, "A");
    assert_eq!(line.quantity, 2);
    assert_eq!(persisted(&storage), cart.items());
}

#[test]
fn test_summary_matches_totals() {
    let mut cart = CartStore::hydrate(MemoryStore::new());
    cart.add_item(product("a", 1000, 5));
    cart.add_item(product("a", 1000, 5));
    cart.add_item(product("b", 250, 5));

    let summary = CartSummary::from(&cart);

    assert_eq!(summary.item_count, cart.total_items());
    assert_eq!(summary.subtotal, cart.total_price().to_string());
    assert_eq!(summary.subtotal, "22.50");
    assert_eq!(summary.items.len(), 2);
}

#[test]
fn test_high_precision_price_reloads_identically() {
    let storage = MemoryStore::new();
    let mut cart = CartStore::hydrate(storage.clone());
    let mut input = product("a", 100, 3);
    input.price = "12345678901.123456789".parse().unwrap();
    cart.add_item(input);
    cart.add_item(product("b", 1999, 2));

    let reloaded = CartStore::hydrate(storage);

    assert_eq!(reloaded.items(), cart.items());
    assert_eq!(reloaded.total_price(), cart.total_price());
}

#[test]
fn test_extreme_price_is_dropped_on_hydrate() {
    let storage = MemoryStore::new();
    storage
        .set(
            CART_STORAGE_KEY,
            r#"[{"productId":"a","name":"A","price":1e28,"stock":9,"quantity":9}]"#,
        )
        .unwrap();

    let cart = CartStore::hydrate(storage.clone());

    assert!(cart.is_empty());
    assert_eq!(cart.total_price(), Price::ZERO);
    assert!(persisted(&storage).is_empty());
}
