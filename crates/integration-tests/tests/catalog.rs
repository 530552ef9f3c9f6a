//! Reviews, wishlist and catalog deletion against a real database.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use shopeasy_core::Cart;
use shopeasy_integration_tests::{
    add_to_cart, create_product, create_shopper, reload, shipping_form, test_pool,
};
use shopeasy_storefront::db::wishlist::WishlistChange;
use shopeasy_storefront::services::catalog::{CatalogError, CatalogService};
use shopeasy_storefront::services::checkout::CheckoutService;
use shopeasy_storefront::services::reviews::{ReviewError, ReviewInput, ReviewService};
use shopeasy_storefront::services::wishlist::WishlistService;

fn review(product_id: shopeasy_core::ProductId, rating: i64) -> ReviewInput {
    ReviewInput {
        product_id: Some(product_id),
        rating: Some(rating),
        comment: Some("Solid".to_owned()),
    }
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_rating_is_mean_of_reviews() {
    let pool = test_pool().await;
    let product = create_product(&pool, Decimal::new(1999, 2), 5).await;
    let reviews = ReviewService::new(&pool);

    for rating in [5, 4, 3] {
        let shopper = create_shopper(&pool).await;
        reviews.add(shopper.id, review(product.id, rating)).await.unwrap();
    }

    let rated = reload(&pool, &product).await;
    assert!((rated.rating - 4.0).abs() < f64::EPSILON);

    let listed = reviews.list(product.id).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].rating, 3);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_concurrent_reviews_keep_rating_at_mean() {
    let pool = test_pool().await;
    let reviews = ReviewService::new(&pool);

    for _ in 0..20 {
        let product = create_product(&pool, Decimal::new(1999, 2), 5).await;
        let low = create_shopper(&pool).await;
        let high = create_shopper(&pool).await;

        let (a, b) = tokio::join!(
            reviews.add(low.id, review(product.id, 1)),
            reviews.add(high.id, review(product.id, 5)),
        );
        a.unwrap();
        b.unwrap();

        let rated = reload(&pool, &product).await;
        assert!(
            (rated.rating - 3.0).abs() < f64::EPSILON,
            "rating after reviews 1 and 5 was {}",
            rated.rating
        );
    }
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_second_review_by_same_user_rejected() {
    let pool = test_pool().await;
    let shopper = create_shopper(&pool).await;
    let product = create_product(&pool, Decimal::new(1999, 2), 5).await;
    let reviews = ReviewService::new(&pool);

    reviews.add(shopper.id, review(product.id, 2)).await.unwrap();
    let err = reviews
        .add(shopper.id, review(product.id, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::AlreadyReviewed));

    let rated = reload(&pool, &product).await;
    assert!((rated.rating - 2.0).abs() < f64::EPSILON);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_review_for_unknown_product_rejected() {
    let pool = test_pool().await;
    let shopper = create_shopper(&pool).await;

    let err = ReviewService::new(&pool)
        .add(shopper.id, review(shopeasy_core::ProductId::new(i32::MAX), 4))
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::ProductNotFound));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_wishlist_toggle_alternates() {
    let pool = test_pool().await;
    let shopper = create_shopper(&pool).await;
    let product = create_product(&pool, Decimal::new(1500, 2), 0).await;
    let wishlist = WishlistService::new(&pool);

    let (change, items) = wishlist.toggle(shopper.id, product.id).await.unwrap();
    assert_eq!(change, WishlistChange::Added);
    assert_eq!(items.len(), 1);

    let (change, items) = wishlist.toggle(shopper.id, product.id).await.unwrap();
    assert_eq!(change, WishlistChange::Removed);
    assert!(items.is_empty());

    let (change, items) = wishlist.toggle(shopper.id, product.id).await.unwrap();
    assert_eq!(change, WishlistChange::Added);
    assert_eq!(items.len(), 1);

    wishlist.clear(shopper.id).await.unwrap();
    assert!(wishlist.list(shopper.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_concurrent_toggles_add_then_remove() {
    let pool = test_pool().await;
    let wishlist = WishlistService::new(&pool);

    for _ in 0..20 {
        let shopper = create_shopper(&pool).await;
        let product = create_product(&pool, Decimal::new(1500, 2), 1).await;

        let (a, b) = tokio::join!(
            wishlist.toggle(shopper.id, product.id),
            wishlist.toggle(shopper.id, product.id),
        );
        let mut changes = [a.unwrap().0, b.unwrap().0];
        changes.sort_by_key(|c| c.as_str());
        assert_eq!(changes, [WishlistChange::Added, WishlistChange::Removed]);
        assert!(wishlist.list(shopper.id).await.unwrap().is_empty());
    }
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_product_with_order_history_cannot_be_deleted() {
    let pool = test_pool().await;
    let shopper = create_shopper(&pool).await;
    let sold = create_product(&pool, Decimal::new(1000, 2), 5).await;
    let unsold = create_product(&pool, Decimal::new(1000, 2), 5).await;

    let mut cart = Cart::new();
    add_to_cart(&mut cart, &sold, 1);
    CheckoutService::new(&pool, None)
        .place_order(&shopper, &cart, &shipping_form())
        .await
        .unwrap();

    let catalog = CatalogService::new(&pool);
    let err = catalog.delete(sold.id).await.unwrap_err();
    assert!(matches!(err, CatalogError::HasOrderHistory));
    assert_eq!(reload(&pool, &sold).await.stock, 4);

    catalog.delete(unsold.id).await.unwrap();
    assert!(matches!(
        catalog.get(unsold.id).await.unwrap_err(),
        CatalogError::NotFound
    ));
    assert!(matches!(
        catalog.delete(unsold.id).await.unwrap_err(),
        CatalogError::NotFound
    ));
}
