//! Device-aware pagination integration tests.
//!
//! These cover strategy selection per device class, the size ceiling, the
//! forced-strategy overrides, and the structural difference between the two
//! page shapes.

mod common;

use duka_core::context::Identity;
use duka_core::device::DeviceClass;
use duka_core::pagination::{Page, PaginationConfig};
use duka_db::{AccessScope, Database, PageRequest, ProductFilter};

use common::{seed_product, test_db};

/// Seeds one shop owned by "owner-1" with `count` shop-level products and
/// returns the owner's scope.
async fn seeded_scope(db: &Database, count: usize) -> AccessScope {
    let shop = db.directory().create_shop("owner-1", "Duka Moja").await.unwrap();
    for i in 0..count {
        seed_product(db, &shop.id, &format!("SKU-{i:04}")).await;
    }
    db.directory()
        .resolve_scope(&Identity::user("owner-1"))
        .await
        .unwrap()
}

#[tokio::test]
async fn mobile_auto_paginate_returns_a_cursor_page_of_the_default_size() {
    let db = test_db().await;
    let scope = seeded_scope(&db, 200).await;
    let config = PaginationConfig::default();

    // No explicit size: mobile default is 20, strategy is cursor
    let page = db
        .products()
        .auto_paginate(
            &scope,
            &config,
            DeviceClass::Mobile,
            &PageRequest::default(),
            ProductFilter::default(),
        )
        .await
        .unwrap();

    assert!(page.is_cursor());
    assert_eq!(page.items().len(), 20);

    // No `total` field on the wire
    let json = serde_json::to_value(&page).unwrap();
    assert!(json.get("total").is_none());
    assert!(json.get("next_cursor").is_some());
}

#[tokio::test]
async fn web_paginate_caps_the_requested_size_at_the_ceiling() {
    let db = test_db().await;
    let scope = seeded_scope(&db, 150).await;
    let config = PaginationConfig::default();

    // Requested 200, web ceiling is 100
    let request = PageRequest {
        page: 1,
        size: Some(200),
        cursor: None,
    };
    let page = db
        .products()
        .paginate(&scope, &config, DeviceClass::Web, &request, ProductFilter::default())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 100);
    assert_eq!(page.per_page, 100);
    assert_eq!(page.total, 150);
    assert_eq!(page.last_page, 2);
}

#[tokio::test]
async fn web_auto_paginate_returns_an_offset_page_with_total() {
    let db = test_db().await;
    let scope = seeded_scope(&db, 30).await;
    let config = PaginationConfig::default();

    let page = db
        .products()
        .auto_paginate(
            &scope,
            &config,
            DeviceClass::Web,
            &PageRequest::default(),
            ProductFilter::default(),
        )
        .await
        .unwrap();

    assert!(page.is_offset());
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json.get("total").unwrap().as_i64(), Some(30));
}

#[tokio::test]
async fn explicit_paginate_overrides_the_mobile_cursor_strategy() {
    let db = test_db().await;
    let scope = seeded_scope(&db, 60).await;
    let config = PaginationConfig::default();

    // A mobile caller explicitly asking for offset semantics (page counts)
    // must get them; only auto_paginate consults the strategy table
    let page = db
        .products()
        .paginate(
            &scope,
            &config,
            DeviceClass::Mobile,
            &PageRequest::default(),
            ProductFilter::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.items.len(), 20); // mobile default size still applies
    assert_eq!(page.total, 60);
    assert_eq!(page.last_page, 3);
}

#[tokio::test]
async fn explicit_cursor_paginate_works_for_a_web_caller() {
    let db = test_db().await;
    let scope = seeded_scope(&db, 30).await;
    let config = PaginationConfig::default();

    let page = db
        .products()
        .cursor_paginate(
            &scope,
            &config,
            DeviceClass::Web,
            &PageRequest::default(),
            ProductFilter::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.items.len(), 25); // web default size
    assert!(page.next_cursor.is_some());
    assert!(page.previous_cursor.is_none());
}

#[tokio::test]
async fn cursor_walk_visits_every_row_exactly_once() {
    let db = test_db().await;
    let scope = seeded_scope(&db, 45).await;
    let config = PaginationConfig::default();

    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let request = PageRequest {
            page: 1,
            size: Some(20),
            cursor: cursor.clone(),
        };
        let page = db
            .products()
            .cursor_paginate(
                &scope,
                &config,
                DeviceClass::Mobile,
                &request,
                ProductFilter::default(),
            )
            .await
            .unwrap();

        assert_eq!(page.previous_cursor, cursor);
        seen.extend(page.items.iter().map(|p| p.id.clone()));

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(seen.len(), 45);
    let mut deduped = seen.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), 45);
}

#[tokio::test]
async fn last_cursor_page_has_no_next_cursor() {
    let db = test_db().await;
    let scope = seeded_scope(&db, 20).await;
    let config = PaginationConfig::default();

    // Exactly one full page: the peek row is absent, so no next cursor
    let request = PageRequest {
        page: 1,
        size: Some(20),
        cursor: None,
    };
    let page = db
        .products()
        .cursor_paginate(
            &scope,
            &config,
            DeviceClass::Mobile,
            &request,
            ProductFilter::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.items.len(), 20);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn offset_pages_beyond_the_end_are_empty_but_well_formed() {
    let db = test_db().await;
    let scope = seeded_scope(&db, 10).await;
    let config = PaginationConfig::default();

    let request = PageRequest {
        page: 5,
        size: Some(10),
        cursor: None,
    };
    let page = db
        .products()
        .paginate(&scope, &config, DeviceClass::Web, &request, ProductFilter::default())
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.current_page, 5);
    assert_eq!(page.last_page, 1);
    assert_eq!(page.total, 10);
}

#[tokio::test]
async fn pagination_is_still_scoped() {
    let db = test_db().await;
    let _owner_scope = seeded_scope(&db, 40).await;
    let config = PaginationConfig::default();

    // A stranger pages over the same table and gets nothing
    let stranger_scope = db
        .directory()
        .resolve_scope(&Identity::user("stranger"))
        .await
        .unwrap();

    let page = db
        .products()
        .auto_paginate(
            &stranger_scope,
            &config,
            DeviceClass::Mobile,
            &PageRequest::default(),
            ProductFilter::default(),
        )
        .await
        .unwrap();

    assert!(matches!(&page, Page::Cursor(p) if p.items.is_empty() && p.next_cursor.is_none()));
}

#[tokio::test]
async fn product_listings_are_in_sku_order() {
    let db = test_db().await;
    let shop = db.directory().create_shop("owner-1", "Duka Moja").await.unwrap();
    for sku in ["SKU-C", "SKU-A", "SKU-B"] {
        seed_product(&db, &shop.id, sku).await;
    }
    let scope = db
        .directory()
        .resolve_scope(&Identity::user("owner-1"))
        .await
        .unwrap();

    // Catalog order, regardless of insertion order
    let all = db.products().all(&scope, ProductFilter::default()).await.unwrap();
    let skus: Vec<&str> = all.iter().map(|p| p.sku.as_str()).collect();
    assert_eq!(skus, ["SKU-A", "SKU-B", "SKU-C"]);

    // Offset pages share the same ordering
    let page = db
        .products()
        .paginate(
            &scope,
            &PaginationConfig::default(),
            DeviceClass::Web,
            &PageRequest::default(),
            ProductFilter::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.items[0].sku, "SKU-A");
}

#[tokio::test]
async fn filters_apply_after_the_scope() {
    let db = test_db().await;
    let scope = seeded_scope(&db, 5).await;

    // Soft-delete one product, then filter on is_active
    let all = db.products().all(&scope, ProductFilter::default()).await.unwrap();
    db.products().delete(&scope, &all[0].id).await.unwrap();

    let active = db
        .products()
        .all(
            &scope,
            ProductFilter {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(active.len(), 4);
}
