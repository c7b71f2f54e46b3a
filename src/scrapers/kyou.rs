//! Kyou.id specific layout

use std::collections::HashMap;

use crate::models::FieldKind;
use crate::traits::SiteLayout;

pub const BASE_URL: &str = "https://kyou.id";

/// Ancestor chain shared by every product-page field except the wishlist button
const PRODUCT_INFO: &str = "#__next > div.transition > div > div > div > div > div > \
     div.product-view > div > div.product-view__content__info";

/// Layout of the kyou.id search listing and product pages
pub fn layout(base_url: &str) -> SiteLayout {
    let detail = |n: u8| {
        format!(
            "{PRODUCT_INFO} > div.product-view__content__item-detail > ul > li:nth-child({n}) > div > a"
        )
    };

    let fields = HashMap::from([
        (
            FieldKind::Title,
            format!("{PRODUCT_INFO} > div.product-view__content__header > div > h2"),
        ),
        (
            FieldKind::Status,
            format!("{PRODUCT_INFO} > div.product-view__content__header > div > div > span"),
        ),
        (
            FieldKind::Price,
            format!(
                "{PRODUCT_INFO} > div.product-view__content__price-info > div:nth-child(1) > span"
            ),
        ),
        (FieldKind::Wishlist, "#AddtoWishlist > span".to_string()),
        (FieldKind::Character, detail(1)),
        (FieldKind::Series, detail(2)),
        (FieldKind::Category, detail(3)),
        (FieldKind::Manufacturer, detail(4)),
    ]);

    SiteLayout {
        name: "Kyou".to_string(),
        base_url: base_url.trim_end_matches('/').to_string(),
        listing_url_pattern: format!(
            "{}/search?q={{query}}&sort=wishlists&page={{page}}%2C40",
            base_url.trim_end_matches('/')
        ),
        listing_entry: "li.indexstyled__InfoName-sc-1vqzqkx-8.gtnUZH a".to_string(),
        listing_entry_attr: "href".to_string(),
        fields,
    }
}
