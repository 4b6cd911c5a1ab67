//! Tenant-isolation integration tests.
//!
//! These cover the directory's accessible-set semantics, the scope filter's
//! empty-set and fallback rules, and the collapsed NotFound on every
//! read/update/delete path.

mod common;

use duka_core::context::Identity;
use duka_core::types::{MemberRole, NewSale, ProductUpdate};
use duka_db::{AccessScope, DbError, ProductFilter, SaleFilter};

use common::{seed_branch_product, seed_product, test_db};

// =============================================================================
// Accessible sets
// =============================================================================

#[tokio::test]
async fn anonymous_identity_scopes_to_nothing() {
    let db = test_db().await;
    let shop = db.directory().create_shop("owner-1", "Duka Moja").await.unwrap();
    for i in 0..50 {
        seed_product(&db, &shop.id, &format!("SKU-{i:03}")).await;
    }

    // Plenty of data, none of it visible to an anonymous caller
    let scope = db.directory().resolve_scope(&Identity::Anonymous).await.unwrap();
    assert!(scope.shop_ids().is_empty());

    let products = db.products().all(&scope, ProductFilter::default()).await.unwrap();
    assert!(products.is_empty());
    assert_eq!(db.products().count(&scope, ProductFilter::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn member_less_identity_scopes_to_nothing() {
    let db = test_db().await;
    let shop = db.directory().create_shop("owner-1", "Duka Moja").await.unwrap();
    seed_product(&db, &shop.id, "SKU-001").await;

    let scope = db
        .directory()
        .resolve_scope(&Identity::user("stranger"))
        .await
        .unwrap();

    let products = db.products().all(&scope, ProductFilter::default()).await.unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn owner_and_member_both_access_the_shop() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("owner-1", "Duka Moja").await.unwrap();
    directory
        .add_member(&shop.id, "staff-1", MemberRole::Staff)
        .await
        .unwrap();

    let owner_shops = directory
        .accessible_shop_ids(&Identity::user("owner-1"))
        .await
        .unwrap();
    let member_shops = directory
        .accessible_shop_ids(&Identity::user("staff-1"))
        .await
        .unwrap();

    assert_eq!(owner_shops, vec![shop.id.clone()]);
    assert_eq!(member_shops, vec![shop.id]);
}

#[tokio::test]
async fn branch_set_is_the_union_of_shop_branches_and_assignments() {
    let db = test_db().await;
    let directory = db.directory();

    // staff-1 is a member of shop A (all its branches) AND holds an explicit
    // assignment in shop B (that one branch only)
    let shop_a = directory.create_shop("owner-a", "Shop A").await.unwrap();
    let a1 = directory.create_branch(&shop_a.id, "A1", None).await.unwrap();
    let a2 = directory.create_branch(&shop_a.id, "A2", None).await.unwrap();
    directory
        .add_member(&shop_a.id, "staff-1", MemberRole::Staff)
        .await
        .unwrap();

    let shop_b = directory.create_shop("owner-b", "Shop B").await.unwrap();
    let b1 = directory.create_branch(&shop_b.id, "B1", None).await.unwrap();
    let _b2 = directory.create_branch(&shop_b.id, "B2", None).await.unwrap();
    directory
        .assign_branch_member(&b1.id, "staff-1")
        .await
        .unwrap();

    let mut expected = vec![a1.id, a2.id, b1.id];
    expected.sort();

    let branches = directory
        .accessible_branch_ids(&Identity::user("staff-1"), None)
        .await
        .unwrap();
    assert_eq!(branches, expected);
}

#[tokio::test]
async fn assignment_survives_membership_revocation() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("owner-1", "Duka Moja").await.unwrap();
    let branch = directory.create_branch(&shop.id, "Kariakoo", None).await.unwrap();
    directory
        .add_member(&shop.id, "staff-1", MemberRole::Staff)
        .await
        .unwrap();
    directory
        .assign_branch_member(&branch.id, "staff-1")
        .await
        .unwrap();

    directory.deactivate_member(&shop.id, "staff-1").await.unwrap();

    let identity = Identity::user("staff-1");

    // Shop-level access is gone...
    let shops = directory.accessible_shop_ids(&identity).await.unwrap();
    assert!(shops.is_empty());

    // ...but the explicit assignment is independent authority
    let branches = directory.accessible_branch_ids(&identity, None).await.unwrap();
    assert_eq!(branches, vec![branch.id]);
}

#[tokio::test]
async fn duplicate_membership_is_a_unique_violation() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("owner-1", "Duka Moja").await.unwrap();
    directory
        .add_member(&shop.id, "staff-1", MemberRole::Staff)
        .await
        .unwrap();

    // UNIQUE(shop_id, user_id) surfaces as the typed violation, not Internal
    let err = directory
        .add_member(&shop.id, "staff-1", MemberRole::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }));
}

#[tokio::test]
async fn branch_ids_can_be_narrowed_to_one_shop() {
    let db = test_db().await;
    let directory = db.directory();
    let shop_a = directory.create_shop("owner-1", "Shop A").await.unwrap();
    let shop_b = directory.create_shop("owner-1", "Shop B").await.unwrap();
    let a1 = directory.create_branch(&shop_a.id, "A1", None).await.unwrap();
    let _b1 = directory.create_branch(&shop_b.id, "B1", None).await.unwrap();

    let branches = directory
        .accessible_branch_ids(&Identity::user("owner-1"), Some(&shop_a.id))
        .await
        .unwrap();
    assert_eq!(branches, vec![a1.id]);
}

// =============================================================================
// Fallback scope semantics
// =============================================================================

#[tokio::test]
async fn shop_level_product_visible_through_fallback() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("owner-1", "Duka Moja").await.unwrap();
    let product = seed_product(&db, &shop.id, "SKU-001").await;

    // Owner has the shop but the shop has no branches at all
    let scope = directory.resolve_scope(&Identity::user("owner-1")).await.unwrap();
    assert!(scope.branch_ids().is_empty());

    // branch_id IS NULL + accessible shop: the fallback leg matches
    let found = db.products().find(&scope, &product.id).await.unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn branch_pinned_product_excluded_when_branch_not_accessible() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("owner-1", "Duka Moja").await.unwrap();
    let branch = directory.create_branch(&shop.id, "Kariakoo", None).await.unwrap();
    let pinned = seed_branch_product(&db, &shop.id, &branch.id, "SKU-PIN").await;
    let shop_level = seed_product(&db, &shop.id, "SKU-NULL").await;

    // Hand-built scope: the shop is accessible but the branch is not.
    // A non-null branch_id outside the branch set must be excluded even
    // though its shop is accessible.
    let scope = AccessScope::new(Identity::user("owner-1"), vec![shop.id.clone()], vec![]);

    assert!(db.products().find(&scope, &pinned.id).await.unwrap().is_none());
    assert!(db.products().find(&scope, &shop_level.id).await.unwrap().is_some());
}

#[tokio::test]
async fn fallback_with_both_sets_empty_matches_zero_rows() {
    let db = test_db().await;
    let shop = db.directory().create_shop("owner-1", "Duka Moja").await.unwrap();
    let branch = db.directory().create_branch(&shop.id, "Kariakoo", None).await.unwrap();
    seed_product(&db, &shop.id, "SKU-NULL").await;
    seed_branch_product(&db, &shop.id, &branch.id, "SKU-PIN").await;

    // Both legs of the OR must independently collapse to nothing
    let scope = AccessScope::empty();
    let products = db.products().all(&scope, ProductFilter::default()).await.unwrap();
    assert!(products.is_empty());
}

// =============================================================================
// Non-leaking lookups
// =============================================================================

#[tokio::test]
async fn find_hides_inaccessible_rows_and_find_or_fail_collapses_errors() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("alice", "Duka ya Alice").await.unwrap();
    let product = seed_product(&db, &shop.id, "SKU-001").await;

    let bob_scope = directory.resolve_scope(&Identity::user("bob")).await.unwrap();

    // find: absent, indistinguishable from nonexistent
    assert!(db.products().find(&bob_scope, &product.id).await.unwrap().is_none());

    // find_or_fail: NotFound with the SAME error shape as a nonexistent id
    let inaccessible = db.products().find_or_fail(&bob_scope, &product.id).await;
    let nonexistent = db.products().find_or_fail(&bob_scope, "no-such-id").await;

    let shape = |err: DbError| match err {
        DbError::NotFound { entity, .. } => entity,
        other => panic!("expected NotFound, got {other:?}"),
    };
    assert_eq!(shape(inaccessible.unwrap_err()), shape(nonexistent.unwrap_err()));
}

#[tokio::test]
async fn verify_shop_access_does_not_leak_existence() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("alice", "Duka ya Alice").await.unwrap();

    let bob = Identity::user("bob");
    let real = directory.verify_shop_access(&bob, &shop.id).await.unwrap_err();
    let fake = directory.verify_shop_access(&bob, "no-such-shop").await.unwrap_err();

    // Same variant, same entity label: existence is not leaked
    assert!(real.is_not_found());
    assert!(fake.is_not_found());

    // Owner resolves the shop
    let found = directory
        .verify_shop_access(&Identity::user("alice"), &shop.id)
        .await
        .unwrap();
    assert_eq!(found.id, shop.id);
}

#[tokio::test]
async fn verify_branch_access_follows_the_same_contract() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("alice", "Duka ya Alice").await.unwrap();
    let branch = directory.create_branch(&shop.id, "Kariakoo", None).await.unwrap();

    assert!(directory
        .verify_branch_access(&Identity::user("bob"), &branch.id)
        .await
        .unwrap_err()
        .is_not_found());

    let found = directory
        .verify_branch_access(&Identity::user("alice"), &branch.id)
        .await
        .unwrap();
    assert_eq!(found.shop_id, shop.id);
}

// =============================================================================
// Scoped writes
// =============================================================================

#[tokio::test]
async fn create_then_find_or_fail_round_trip() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("alice", "Duka ya Alice").await.unwrap();
    let product = seed_product(&db, &shop.id, "SKU-001").await;

    // Creator always resolves the new row
    let alice_scope = directory.resolve_scope(&Identity::user("alice")).await.unwrap();
    let found = db.products().find_or_fail(&alice_scope, &product.id).await.unwrap();
    assert_eq!(found.sku, "SKU-001");

    // A non-member always gets NotFound
    let bob_scope = directory.resolve_scope(&Identity::user("bob")).await.unwrap();
    assert!(db
        .products()
        .find_or_fail(&bob_scope, &product.id)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn update_cannot_touch_an_inaccessible_row() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("alice", "Duka ya Alice").await.unwrap();
    let product = seed_product(&db, &shop.id, "SKU-001").await;

    let bob_scope = directory.resolve_scope(&Identity::user("bob")).await.unwrap();
    let update = ProductUpdate {
        price_cents: Some(1),
        ..Default::default()
    };
    assert!(db
        .products()
        .update(&bob_scope, &product.id, update)
        .await
        .unwrap_err()
        .is_not_found());

    // The row is untouched
    let alice_scope = directory.resolve_scope(&Identity::user("alice")).await.unwrap();
    let unchanged = db.products().find_or_fail(&alice_scope, &product.id).await.unwrap();
    assert_eq!(unchanged.price_cents, 1000);
}

#[tokio::test]
async fn delete_is_scoped_and_soft() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("alice", "Duka ya Alice").await.unwrap();
    let product = seed_product(&db, &shop.id, "SKU-001").await;

    let bob_scope = directory.resolve_scope(&Identity::user("bob")).await.unwrap();
    assert!(db
        .products()
        .delete(&bob_scope, &product.id)
        .await
        .unwrap_err()
        .is_not_found());

    let alice_scope = directory.resolve_scope(&Identity::user("alice")).await.unwrap();
    assert!(db.products().delete(&alice_scope, &product.id).await.unwrap());

    // Soft delete: the row survives with is_active = false
    let deleted = db.products().find_or_fail(&alice_scope, &product.id).await.unwrap();
    assert!(!deleted.is_active);
}

#[tokio::test]
async fn update_applies_only_provided_fields() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("alice", "Duka ya Alice").await.unwrap();
    let product = seed_product(&db, &shop.id, "SKU-001").await;

    let scope = directory.resolve_scope(&Identity::user("alice")).await.unwrap();
    let updated = db
        .products()
        .update(
            &scope,
            &product.id,
            ProductUpdate {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.sku, "SKU-001");
    assert_eq!(updated.price_cents, 1000);
}

// =============================================================================
// Atomic sale recording
// =============================================================================

#[tokio::test]
async fn record_sale_decrements_stock_atomically() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("alice", "Duka ya Alice").await.unwrap();
    let branch = directory.create_branch(&shop.id, "Kariakoo", None).await.unwrap();
    let product = seed_product(&db, &shop.id, "SKU-001").await;

    let sale = db
        .sales()
        .record_sale(NewSale {
            shop_id: shop.id.clone(),
            branch_id: branch.id.clone(),
            cashier_id: "alice".to_string(),
            total_cents: 3000,
            product_id: product.id.clone(),
            quantity: 3,
        })
        .await
        .unwrap();

    let scope = directory.resolve_scope(&Identity::user("alice")).await.unwrap();
    let found = db.sales().find_or_fail(&scope, &sale.id).await.unwrap();
    assert_eq!(found.total_cents, 3000);

    let product = db.products().find_or_fail(&scope, &product.id).await.unwrap();
    assert_eq!(product.current_stock, Some(7));
}

#[tokio::test]
async fn record_sale_rolls_back_when_stock_update_fails() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("alice", "Duka ya Alice").await.unwrap();
    let branch = directory.create_branch(&shop.id, "Kariakoo", None).await.unwrap();

    let err = db
        .sales()
        .record_sale(NewSale {
            shop_id: shop.id.clone(),
            branch_id: branch.id.clone(),
            cashier_id: "alice".to_string(),
            total_cents: 3000,
            product_id: "no-such-product".to_string(),
            quantity: 3,
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    // No partial application: the sale insert was rolled back too
    let scope = directory.resolve_scope(&Identity::user("alice")).await.unwrap();
    assert_eq!(db.sales().count(&scope, SaleFilter::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn sales_require_branch_access_not_just_shop_access() {
    let db = test_db().await;
    let directory = db.directory();
    let shop = directory.create_shop("alice", "Duka ya Alice").await.unwrap();
    let branch = directory.create_branch(&shop.id, "Kariakoo", None).await.unwrap();
    let product = seed_product(&db, &shop.id, "SKU-001").await;

    let sale = db
        .sales()
        .record_sale(NewSale {
            shop_id: shop.id.clone(),
            branch_id: branch.id.clone(),
            cashier_id: "alice".to_string(),
            total_cents: 1000,
            product_id: product.id,
            quantity: 1,
        })
        .await
        .unwrap();

    // Strict branch scope: shop in the set, branch not
    let scope = AccessScope::new(Identity::user("alice"), vec![shop.id], vec![]);
    assert!(db.sales().find(&scope, &sale.id).await.unwrap().is_none());
}
