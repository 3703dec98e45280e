//! CSS selectors for G2-style product pages.
//!
//! Arrays are ordered by preference: extractors try them front to back and
//! keep the first hit.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

fn parse(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

fn parse_all<const N: usize>(css: [&str; N]) -> [Selector; N] {
    css.map(parse)
}

pub static ANY_LINK: LazyLock<Selector> = LazyLock::new(|| parse("a[href]"));
pub static EXTERNAL_LINK: LazyLock<Selector> = LazyLock::new(|| parse("a[href^='http']"));

/// `/products/<slug>/` segment of a G2 URL.
pub static PRODUCT_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/products/([^/?#]+)").unwrap());
/// First integer in a label such as "12,345 followers".
pub static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d[\d,]*").unwrap());
pub static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

pub mod profile {
    use super::*;

    pub static NAME: LazyLock<[Selector; 4]> = LazyLock::new(|| {
        parse_all([
            "h1[data-testid='product-profile-header']",
            "h1[itemprop='name']",
            "h1",
            ".product-header h1",
        ])
    });

    pub static WHAT_IS: LazyLock<[Selector; 4]> = LazyLock::new(|| {
        parse_all([
            "[data-testid='what-is'] p",
            "section#about div p",
            "div[itemprop='description'] p",
            "div[itemprop='description']",
        ])
    });

    pub static RATING: LazyLock<Selector> = LazyLock::new(|| {
        parse("[data-testid='average-rating'], meta[itemprop='ratingValue']")
    });

    pub static REVIEW_COUNT: LazyLock<[Selector; 3]> = LazyLock::new(|| {
        parse_all([
            "[data-testid='review-count']",
            "meta[itemprop='reviewCount']",
            "a[href*='#reviews'] .count",
        ])
    });

    pub static LOGO_ITEMPROP: LazyLock<Selector> = LazyLock::new(|| parse("img[itemprop='image'][src]"));
    pub static LOGO_ALT: LazyLock<Selector> = LazyLock::new(|| parse("img[alt][src]"));
    pub static LOGO_CDN: LazyLock<Selector> = LazyLock::new(|| parse("img[src*='g2crowd']"));
    pub static ANY_IMAGE: LazyLock<Selector> = LazyLock::new(|| parse("img[src]"));

    pub static CATEGORY_LINK: LazyLock<Selector> = LazyLock::new(|| parse("a[href*='/categories/']"));

    /// Rating bars: `data-star="5" data-count="123"`.
    pub static STAR_BAR: LazyLock<Selector> = LazyLock::new(|| parse("[data-star][data-count]"));

    pub static DETAIL_TERM: LazyLock<Selector> = LazyLock::new(|| parse("dl dt"));
    pub static DETAIL_ROW: LazyLock<Selector> = LazyLock::new(|| parse("[data-testid='seller-detail']"));
    pub static DETAIL_LABEL: LazyLock<Selector> = LazyLock::new(|| parse("[data-testid='label']"));
    pub static DETAIL_VALUE: LazyLock<Selector> = LazyLock::new(|| parse("[data-testid='value']"));

    pub static SCREENSHOT: LazyLock<Selector> = LazyLock::new(|| {
        parse("[data-testid='screenshots'] img[src], .screenshots img[src]")
    });
    pub static VIDEO: LazyLock<Selector> = LazyLock::new(|| {
        parse(
            "[data-testid='videos'] iframe[src], \
             iframe[src*='youtube'], \
             iframe[src*='vimeo'], \
             video[src], \
             video source[src]",
        )
    });
    pub static DOWNLOAD: LazyLock<Selector> = LazyLock::new(|| {
        parse("a[data-testid='download-link'][href], a[href*='/download']")
    });
    pub static DISCUSSIONS: LazyLock<Selector> = LazyLock::new(|| parse("a[href*='/discussions']"));
    pub static CLAIMED_BADGE: LazyLock<Selector> =
        LazyLock::new(|| parse("[data-testid='claimed-badge'], .claimed-badge"));
}

pub mod reviews {
    use super::*;

    pub static BLOCK: LazyLock<[Selector; 2]> =
        LazyLock::new(|| parse_all(["[data-testid='review']", ".review"]));
    pub static TITLE: LazyLock<Selector> =
        LazyLock::new(|| parse("[data-testid='review-title'], .review-title"));
    pub static RATING: LazyLock<Selector> = LazyLock::new(|| {
        parse("[data-testid='star-rating'] [data-rating], .star-rating [data-rating]")
    });
    pub static DATE: LazyLock<Selector> = LazyLock::new(|| parse("time[datetime], .review-date"));
    pub static LINK: LazyLock<Selector> = LazyLock::new(|| parse("a[href*='/reviews/']"));

    /// Trailing numeric id of a review permalink: `.../acme-review-123`.
    pub static REVIEW_ID_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"-(\d+)/?(?:[?#].*)?$").unwrap());
}

pub mod competitors {
    use super::*;

    pub static ALTERNATIVE: LazyLock<Selector> =
        LazyLock::new(|| parse("a[href*='/products/'][href*='/reviews']"));
    pub static COMPARISON: LazyLock<Selector> = LazyLock::new(|| parse("a[href*='/compare/']"));

    /// A product's review landing page, not an individual review.
    pub static PRODUCT_REVIEWS_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"g2\.com/products/([^/?#]+)/reviews/?(?:[?#].*)?$").unwrap()
    });
}

pub mod pricing {
    use super::*;

    pub static PLAN_CARD: LazyLock<Selector> = LazyLock::new(|| {
        parse("[data-testid='pricing'] .plan, .pricing .plan, section#pricing .plan")
    });
    pub static PLAN_SECTION: LazyLock<Selector> = LazyLock::new(|| {
        parse("section#pricing, [data-section='pricing'], .pricing")
    });
    pub static PLAN_NAME: LazyLock<Selector> = LazyLock::new(|| parse(".plan-name, h3, h4"));
    pub static PLAN_DESCRIPTION: LazyLock<Selector> =
        LazyLock::new(|| parse(".plan-description, p"));
    pub static PLAN_FEATURE: LazyLock<Selector> =
        LazyLock::new(|| parse(".plan-features li, ul li"));
}
