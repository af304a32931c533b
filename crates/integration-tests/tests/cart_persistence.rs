//! Integration tests for cart state across restarts.
//!
//! Every test opens file-backed storage in a temporary directory, changes the
//! cart, then reopens the files to check what a later run would load.

#![allow(clippy::unwrap_used)]

use parfumerie_client::cart::CART_KEY;
use parfumerie_client::{CartStore, Scope};
use parfumerie_core::ProductId;
use parfumerie_integration_tests::{TestEnv, product};
use rust_decimal::Decimal;

#[test]
fn test_cart_survives_restart() {
    let env = TestEnv::new().unwrap();

    let mut cart = CartStore::load(env.open_storage().unwrap());
    cart.add_item(product(1, "Neroli Portofino", Some(10)), 2).unwrap();
    cart.add_item(product(2, "Oud Wood", Some(15)), 1).unwrap();
    drop(cart);

    let cart = CartStore::load(env.open_storage().unwrap());
    assert_eq!(cart.items().len(), 2);
    assert_eq!(cart.total(), Decimal::from(35));
    assert_eq!(cart.item_count(), 3);
}

#[test]
fn test_repeated_adds_merge_into_one_line() {
    let env = TestEnv::new().unwrap();

    let mut cart = CartStore::load(env.open_storage().unwrap());
    cart.add_item(product(7, "Ambre Nuit", Some(20)), 1).unwrap();
    cart.add_item(product(7, "Ambre Nuit", Some(25)), 2).unwrap();
    drop(cart);

    let cart = CartStore::load(env.open_storage().unwrap());
    assert_eq!(cart.items().len(), 1);
    let line = cart.get(ProductId::new(7)).unwrap();
    assert_eq!(line.quantity, 3);
    assert_eq!(line.unit_price, Some(Decimal::from(20)));
}

#[test]
fn test_quantity_update_to_zero_removes_line() {
    let env = TestEnv::new().unwrap();

    let mut cart = CartStore::load(env.open_storage().unwrap());
    cart.add_item(product(1, "Rose", Some(10)), 2).unwrap();
    cart.add_item(product(2, "Vetiver", Some(12)), 1).unwrap();
    cart.update_quantity(ProductId::new(1), -2).unwrap();
    drop(cart);

    let cart = CartStore::load(env.open_storage().unwrap());
    assert!(cart.get(ProductId::new(1)).is_none());
    assert_eq!(cart.total(), Decimal::from(12));
}

#[test]
fn test_unknown_id_update_leaves_file_untouched() {
    let env = TestEnv::new().unwrap();

    let mut cart = CartStore::load(env.open_storage().unwrap());
    cart.update_quantity(ProductId::new(99), 1).unwrap();

    assert!(!env.durable_path().exists());
}

#[test]
fn test_clear_persists_empty_cart() {
    let env = TestEnv::new().unwrap();

    let mut cart = CartStore::load(env.open_storage().unwrap());
    cart.add_item(product(1, "Iris", Some(40)), 1).unwrap();
    cart.clear().unwrap();
    drop(cart);

    let storage = env.open_storage().unwrap();
    assert_eq!(
        storage.get(Scope::Durable, CART_KEY).unwrap().as_deref(),
        Some("[]")
    );
    assert!(CartStore::load(storage).is_empty());
}

#[test]
fn test_unpriced_lines_count_as_zero() {
    let env = TestEnv::new().unwrap();

    let mut cart = CartStore::load(env.open_storage().unwrap());
    cart.add_item(product(1, "Discovery Set", None), 3).unwrap();
    cart.add_item(product(2, "Santal", Some(50)), 1).unwrap();

    assert_eq!(cart.total(), Decimal::from(50));
    assert_eq!(cart.item_count(), 4);
}

#[test]
fn test_corrupt_cart_loads_empty() {
    let env = TestEnv::new().unwrap();
    env.open_storage()
        .unwrap()
        .set(Scope::Durable, CART_KEY, "{not a cart")
        .unwrap();

    let mut cart = CartStore::load(env.open_storage().unwrap());
    assert!(cart.is_empty());

    // The next mutation replaces the corrupt snapshot.
    cart.add_item(product(3, "Musc", Some(5)), 1).unwrap();
    let cart = CartStore::load(env.open_storage().unwrap());
    assert_eq!(cart.total(), Decimal::from(5));
}

#[test]
fn test_snapshot_uses_backend_field_names() {
    let env = TestEnv::new().unwrap();

    let mut cart = CartStore::load(env.open_storage().unwrap());
    cart.add_item(product(4, "Tubéreuse", Some(30)), 2).unwrap();

    let raw = env
        .open_storage()
        .unwrap()
        .get(Scope::Durable, CART_KEY)
        .unwrap()
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["product"]["id"], 4);
    assert_eq!(json[0]["quantity"], 2);
    assert_eq!(json[0]["unitPrice"], 30);
}
