//! Blog syndication: RSS 2.0 feed and XML sitemap.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::db::BlogPostRepository;
use crate::error::AppError;
use crate::models::BlogPost;
use crate::state::AppState;

/// Feeds are capped; a site with more published posts than this syndicates
/// only the newest ones.
const FEED_LIMIT: i64 = 50;

const CACHE_CONTROL: &str = "public, max-age=300, stale-while-revalidate=600";

/// Static site routes always present in the sitemap.
const STATIC_ROUTES: &[&str] = &["/", "/pricing", "/industries", "/blog", "/contact"];

/// Escape text for inclusion in XML character data and attribute values.
fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn rfc2822(time: DateTime<Utc>) -> String {
    time.to_rfc2822()
}

fn render_rss(base_url: &str, posts: &[BlogPost]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push_str("\n<rss version=\"2.0\"><channel>");
    xml.push_str("<title>Lumeo Digital Blog</title>");
    xml.push_str(&format!("<link>{}/blog</link>", escape_xml(base_url)));
    xml.push_str(
        "<description>Web design, SEO, and AI solutions from Lumeo Digital</description>",
    );
    xml.push_str("<language>en</language>");
    xml.push_str(&format!("<lastBuildDate>{}</lastBuildDate>", rfc2822(Utc::now())));

    for post in posts {
        let link = format!("{base_url}/blog/{}", post.slug);
        xml.push_str("<item>");
        xml.push_str(&format!("<title>{}</title>", escape_xml(&post.title)));
        xml.push_str(&format!("<link>{}</link>", escape_xml(&link)));
        xml.push_str(&format!(
            "<guid isPermaLink=\"true\">{}</guid>",
            escape_xml(&link)
        ));
        if let Some(excerpt) = &post.excerpt {
            xml.push_str(&format!(
                "<description>{}</description>",
                escape_xml(excerpt)
            ));
        }
        if let Some(author) = &post.author {
            xml.push_str(&format!("<author>{}</author>", escape_xml(author)));
        }
        if let Some(category) = &post.category {
            xml.push_str(&format!("<category>{}</category>", escape_xml(category)));
        }
        if let Some(published_at) = post.published_at {
            xml.push_str(&format!("<pubDate>{}</pubDate>", rfc2822(published_at)));
        }
        xml.push_str("</item>");
    }

    xml.push_str("</channel></rss>");
    xml
}

fn render_sitemap(base_url: &str, posts: &[(String, DateTime<Utc>)]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push_str("\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">");

    for route in STATIC_ROUTES {
        xml.push_str(&format!(
            "<url><loc>{}{}</loc></url>",
            escape_xml(base_url),
            route
        ));
    }
    for (slug, published_at) in posts {
        xml.push_str(&format!(
            "<url><loc>{}/blog/{}</loc><lastmod>{}</lastmod></url>",
            escape_xml(base_url),
            escape_xml(slug),
            published_at.format("%Y-%m-%d")
        ));
    }

    xml.push_str("</urlset>");
    xml
}

/// RSS 2.0 feed of published posts.
#[instrument(skip_all)]
pub async fn rss(State(state): State<AppState>) -> Result<Response, AppError> {
    let posts = BlogPostRepository::new(state.pool())
        .list_for_feed(FEED_LIMIT)
        .await?;

    let body = render_rss(&state.config().base_url, &posts);
    Ok((
        [
            (header::CONTENT_TYPE, "application/rss+xml; charset=utf-8"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        body,
    )
        .into_response())
}

/// Sitemap of static routes plus one entry per published post.
#[instrument(skip_all)]
pub async fn sitemap(State(state): State<AppState>) -> Result<Response, AppError> {
    let posts = BlogPostRepository::new(state.pool()).published_slugs().await?;

    let body = render_sitemap(&state.config().base_url, &posts);
    Ok((
        [
            (header::CONTENT_TYPE, "application/xml; charset=utf-8"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use lumeo_core::BlogPostId;

    use super::*;

    fn sample_post() -> BlogPost {
        let published_at = Utc.with_ymd_and_hms(2025, 5, 20, 9, 0, 0).unwrap();
        BlogPost {
            id: BlogPostId::generate(),
            title: "Design & <AI>".to_owned(),
            slug: "design-and-ai".to_owned(),
            excerpt: Some("What \"AI\" means for agencies".to_owned()),
            content: "<p>hi</p>".to_owned(),
            published: true,
            published_at: Some(published_at),
            category: Some("ai".to_owned()),
            tags: vec!["design".to_owned()],
            author: Some("Dana".to_owned()),
            featured_image: None,
            created_at: published_at,
            updated_at: published_at,
        }
    }

    #[test]
    fn escapes_xml_metacharacters() {
        assert_eq!(
            escape_xml(r#"a & b < c > "d" 'e'"#),
            "a &amp; b &lt; c &gt; &quot;d&quot; &apos;e&apos;"
        );
    }

    #[test]
    fn rss_contains_escaped_item_fields() {
        let xml = render_rss("https://lumeo.studio", &[sample_post()]);
        assert!(xml.contains("<title>Design &amp; &lt;AI&gt;</title>"));
        assert!(xml.contains("<link>https://lumeo.studio/blog/design-and-ai</link>"));
        assert!(xml.contains("<pubDate>Tue, 20 May 2025 09:00:00 +0000</pubDate>"));
    }

    #[test]
    fn sitemap_lists_static_routes_and_posts() {
        let published_at = Utc.with_ymd_and_hms(2025, 5, 20, 9, 0, 0).unwrap();
        let xml = render_sitemap(
            "https://lumeo.studio",
            &[("design-and-ai".to_owned(), published_at)],
        );
        assert!(xml.contains("<loc>https://lumeo.studio/pricing</loc>"));
        assert!(xml.contains(
            "<loc>https://lumeo.studio/blog/design-and-ai</loc><lastmod>2025-05-20</lastmod>"
        ));
    }
}
