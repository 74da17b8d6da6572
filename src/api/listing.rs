//! HTML listing page parsing.

use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};

/// Suffix appended to the date of edited posts ("updated").
const RENEW_SUFFIX: &str = "更新";

/// Date formats seen in post listings.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y/%m/%d %H:%M"];

/// A post as it appears on a fanclub's listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedPost {
    pub id: String,
    pub posted_at: Option<NaiveDateTime>,
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| Error::Api(format!("Invalid selector '{}': {:?}", s, e)))
}

/// Take the numeric ID following `/{segment}/` in an href.
fn id_after(href: &str, segment: &str) -> Option<String> {
    let marker = format!("/{}/", segment);
    let start = href.find(&marker)? + marker.len();
    let id: String = href[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    (!id.is_empty()).then_some(id)
}

/// Parse a listing date such as `2023-05-01 12:34` or `2023-05-01 12:34更新`.
pub fn parse_listing_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    let text = text.strip_suffix(RENEW_SUFFIX).unwrap_or(text).trim();

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

fn post_date(post: &ElementRef<'_>, primary: &Selector, fallback: &Selector) -> Option<NaiveDateTime> {
    let element = post
        .select(primary)
        .next()
        .or_else(|| post.select(fallback).next())?;
    let text: String = element.text().collect();
    parse_listing_date(&text)
}

/// Extract the posts listed on one page of `/fanclubs/{id}/posts`.
pub fn parse_posts_page(html: &str) -> Result<Vec<ListedPost>> {
    let document = Html::parse_document(html);
    let post_selector = parse_selector("div.post")?;
    let link_selector = parse_selector("a.link-block")?;
    let date_selector = parse_selector(".post-date .mr-5")?;
    let date_fallback = parse_selector(".post-date")?;

    let mut posts = Vec::new();
    for post in document.select(&post_selector) {
        let Some(id) = post
            .select(&link_selector)
            .next()
            .and_then(|link| link.value().attr("href"))
            .and_then(|href| id_after(href, "posts"))
        else {
            tracing::debug!("Skipping listing entry without a post link");
            continue;
        };

        posts.push(ListedPost {
            id,
            posted_at: post_date(&post, &date_selector, &date_fallback),
        });
    }

    Ok(posts)
}

/// Extract fanclub IDs from the "paid plans" page, in page order.
pub fn parse_paid_fanclubs(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let link_selector =
        parse_selector(r#"div.mb-5-children > div:nth-of-type(1) a[href^="/fanclubs"]"#)?;

    let mut ids: Vec<String> = Vec::new();
    for link in document.select(&link_selector) {
        if let Some(id) = link
            .value()
            .attr("href")
            .and_then(|href| id_after(href, "fanclubs"))
        {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    Ok(ids)
}
