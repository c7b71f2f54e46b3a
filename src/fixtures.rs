//! HTML builders mirroring the kyou.id page structure

/// A listing page whose entries link to `hrefs`
pub fn listing_page(hrefs: &[&str]) -> String {
    let entries: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<div class="card"><ul>
                  <li class="indexstyled__InfoName-sc-1vqzqkx-8 gtnUZH"><a href="{href}">Item</a></li>
                  <li class="indexstyled__InfoPrice"><a href="/ignored">IDR 1</a></li>
                </ul></div>"#
            )
        })
        .collect();

    format!(r#"<html><body><div id="__next"><main>{entries}</main></div></body></html>"#)
}

/// A product page rendering the raw text of each present field
pub struct ItemPage<'a> {
    pub title: Option<&'a str>,
    pub status: Option<&'a str>,
    pub price: Option<&'a str>,
    pub wishlist: Option<&'a str>,
    /// Detail list in page order: character, series, category, manufacturer
    pub details: Vec<&'a str>,
}

impl<'a> ItemPage<'a> {
    pub fn complete(title: &'a str, status: &'a str) -> Self {
        Self {
            title: Some(title),
            status: Some(status),
            price: Some("IDR 350,000 Earn 3,500 points"),
            wishlist: Some("57 Wishlist"),
            details: vec!["Hatsune Miku", "Vocaloid", "Scale Figure", "Good Smile Company"],
        }
    }

    pub fn render(&self) -> String {
        let title = self
            .title
            .map(|t| format!("<h2>{t}</h2>"))
            .unwrap_or_default();
        let status = self
            .status
            .map(|s| format!("<div><span>{s}</span></div>"))
            .unwrap_or_default();
        let price = self
            .price
            .map(|p| format!("<div><span>{p}</span></div>"))
            .unwrap_or_default();
        let wishlist = self
            .wishlist
            .map(|w| format!(r#"<button id="AddtoWishlist"><span>{w}</span></button>"#))
            .unwrap_or_default();
        let details: String = self
            .details
            .iter()
            .map(|d| format!("<li><div><a href=\"/search\">{d}</a></div></li>"))
            .collect();

        format!(
            r#"<html><body><div id="__next"><div class="transition"><div><div><div><div><div>
<div class="product-view"><div><div class="product-view__content__info">
  <div class="product-view__content__header"><div>{title}{status}</div></div>
  <div class="product-view__content__price-info">{price}</div>
  <div class="product-view__content__item-detail"><ul>{details}</ul></div>
</div></div></div>
</div></div></div></div></div></div></div>{wishlist}</body></html>"#
        )
    }
}
