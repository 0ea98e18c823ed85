use crate::configuration::ScraperSelectors;
use crate::models::{ComponentCategory, ScrapedComponent};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;

lazy_static! {
    static ref PRICE: Regex = Regex::new(r"\d[\d\s\u{a0}\u{202f}]*(?:[.,]\d{1,2})?").unwrap();
}

#[derive(Debug, Default)]
pub struct ParsedPage {
    pub tiles: usize,
    pub components: Vec<ScrapedComponent>,
    /// One message per tile that couldn't be read
    pub skipped: Vec<String>,
}

/// Reads a price out of free text such as "12 345 ₽" or "от 1 299,90 руб.".
pub fn parse_price(text: &str) -> Option<Decimal> {
    let found = PRICE.find(text)?;
    let normalized: String = found
        .as_str()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    Decimal::from_str(&normalized).ok().map(|price| price.round_dp(2))
}

/// Absolute URL for `href` relative to the shop root.
pub fn resolve_url(base_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .ok()
}

fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|err| format!("invalid selector {css:?}: {err}"))
}

fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

struct Selectors {
    tile: Selector,
    name: Selector,
    link: Selector,
    price: Selector,
    image: Selector,
}

impl Selectors {
    fn compile(css: &ScraperSelectors) -> Result<Self, String> {
        Ok(Self {
            tile: selector(&css.tile)?,
            name: selector(&css.name)?,
            link: selector(&css.link)?,
            price: selector(&css.price)?,
            image: selector(&css.image)?,
        })
    }
}

/// Checks the configured selectors before a run starts.
pub fn validate_selectors(css: &ScraperSelectors) -> Result<(), String> {
    Selectors::compile(css).map(|_| ())
}

fn parse_tile(
    tile: ElementRef<'_>,
    selectors: &Selectors,
    base_url: &str,
    category: ComponentCategory,
) -> Result<ScrapedComponent, String> {
    let name = tile
        .select(&selectors.name)
        .next()
        .map(text_of)
        .filter(|name| !name.is_empty())
        .ok_or("tile without a name")?;

    let link = tile
        .select(&selectors.link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve_url(base_url, href))
        .ok_or_else(|| format!("{name}: no link"))?;

    let price = tile
        .select(&selectors.price)
        .next()
        .map(text_of)
        .and_then(|text| parse_price(&text))
        .ok_or_else(|| format!("{name}: no price"))?;

    let image = tile
        .select(&selectors.image)
        .next()
        .and_then(|img| {
            let attrs = img.value();
            attrs
                .attr("data-src")
                .or_else(|| attrs.attr("src"))
        })
        .and_then(|src| resolve_url(base_url, src));

    Ok(ScrapedComponent {
        name,
        link,
        price,
        image,
        category,
    })
}

pub fn parse_page(
    html: &str,
    base_url: &str,
    category: ComponentCategory,
    css: &ScraperSelectors,
) -> Result<ParsedPage, String> {
    let selectors = Selectors::compile(css)?;
    let document = Html::parse_document(html);
    let mut page = ParsedPage::default();

    for tile in document.select(&selectors.tile) {
        page.tiles += 1;
        match parse_tile(tile, &selectors, base_url, category) {
            Ok(component) => page.components.push(component),
            Err(reason) => page.skipped.push(format!("{category}: {reason}")),
        }
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const LISTING: &str = r#"
        <html><body>
          <div class="product-card">
            <a class="product-card__link" href="/product/ryzen-7-7800x3d">
              <span class="product-card__title">AMD Ryzen 7 7800X3D</span>
            </a>
            <img data-src="/img/7800x3d.jpg" src="/img/placeholder.gif">
            <div class="product-card__price">38 990 ₽</div>
          </div>
          <div class="product-card">
            <a class="product-card__link" href="https://shop.example/product/i5-13400f">
              <span class="product-card__title">Intel Core i5-13400F</span>
            </a>
            <div class="product-card__price">от 15 499,50 руб.</div>
          </div>
          <div class="product-card">
            <a class="product-card__link" href="/product/broken">
              <span class="product-card__title">Out of stock CPU</span>
            </a>
            <div class="product-card__price">Нет в наличии</div>
          </div>
        </body></html>
    "#;

    #[test]
    fn prices_from_free_text() {
        assert_eq!(parse_price("12 345 ₽"), Some(dec!(12345)));
        assert_eq!(parse_price("от 1\u{a0}299,90 руб."), Some(dec!(1299.90)));
        assert_eq!(parse_price("999.5"), Some(dec!(999.5)));
        assert_eq!(parse_price("по запросу"), None);
    }

    #[test]
    fn relative_urls_resolve_against_base() {
        assert_eq!(
            resolve_url("https://shop.example", "/product/x").as_deref(),
            Some("https://shop.example/product/x")
        );
        assert_eq!(
            resolve_url("https://shop.example/catalog/", "https://cdn.example/a.jpg").as_deref(),
            Some("https://cdn.example/a.jpg")
        );
        assert_eq!(resolve_url("https://shop.example", "  "), None);
    }

    #[test]
    fn listing_tiles_are_parsed_and_bad_ones_skipped() {
        let page = parse_page(
            LISTING,
            "https://shop.example",
            ComponentCategory::Cpu,
            &ScraperSelectors::default(),
        )
        .unwrap();

        assert_eq!(page.tiles, 3);
        assert_eq!(page.components.len(), 2);
        assert_eq!(page.skipped.len(), 1);
        assert!(page.skipped[0].contains("Out of stock CPU"));

        let ryzen = &page.components[0];
        assert_eq!(ryzen.name, "AMD Ryzen 7 7800X3D");
        assert_eq!(ryzen.link, "https://shop.example/product/ryzen-7-7800x3d");
        assert_eq!(ryzen.price, dec!(38990));
        assert_eq!(
            ryzen.image.as_deref(),
            Some("https://shop.example/img/7800x3d.jpg")
        );
        assert_eq!(ryzen.category, ComponentCategory::Cpu);

        let intel = &page.components[1];
        assert_eq!(intel.price, dec!(15499.50));
        assert!(intel.image.is_none());
    }

    #[test]
    fn empty_listing_has_no_tiles() {
        let page = parse_page(
            "<html><body><p>Nothing here</p></body></html>",
            "https://shop.example",
            ComponentCategory::Gpu,
            &ScraperSelectors::default(),
        )
        .unwrap();
        assert_eq!(page.tiles, 0);
        assert!(page.components.is_empty());
    }

    #[test]
    fn broken_selector_is_reported() {
        let css = ScraperSelectors {
            tile: "div[".to_string(),
            ..Default::default()
        };
        assert!(validate_selectors(&css).is_err());
    }
}
