use crate::appstate::AppState;
use crate::security::sanitize::sanitize_url;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Utc;
use maud::Markup;
use maud::PreEscaped;
use maud::html;
use serde_json::json;

#[derive(Debug, Clone)]
pub struct SeoConfig {
    pub site_name: String,
    pub site_url: String,
    pub default_title: String,
    pub default_description: String,
    pub default_keywords: Vec<String>,
    pub author: String,
    pub twitter_handle: Option<String>,
    pub default_image: String,
}

impl SeoConfig {
    pub fn for_site(site_url: &str) -> Self {
        Self {
            site_name: "Union Connect Hub".to_string(),
            site_url: site_url.trim_end_matches('/').to_string(),
            default_title: "Union Connect Hub - Your Digital Union Platform".to_string(),
            default_description: "Connect with your union community, access resources, and stay informed with Union Connect Hub.".to_string(),
            default_keywords: ["union", "community", "connect", "platform", "workers", "solidarity"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            author: "Union Connect Hub Team".to_string(),
            twitter_handle: None,
            default_image: "/logo.svg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageType {
    #[default]
    Website,
    Article,
    Profile,
}

impl PageType {
    fn as_str(&self) -> &'static str {
        match self {
            PageType::Website => "website",
            PageType::Article => "article",
            PageType::Profile => "profile",
        }
    }
}

/// Per-page overrides; anything left empty uses the site defaults.
#[derive(Debug, Clone, Default)]
pub struct PageSeo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub page_type: PageType,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub author: Option<String>,
    pub canonical: Option<String>,
}

impl PageSeo {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

pub struct SitemapRoute {
    pub path: &'static str,
    pub priority: f32,
}

pub const SITEMAP_ROUTES: &[SitemapRoute] = &[
    SitemapRoute { path: "/", priority: 1.0 },
    SitemapRoute { path: "/announcements", priority: 0.8 },
    SitemapRoute { path: "/tickets", priority: 0.7 },
    SitemapRoute { path: "/connect", priority: 0.6 },
    SitemapRoute { path: "/payments", priority: 0.5 },
    SitemapRoute { path: "/profile", priority: 0.5 },
    SitemapRoute { path: "/signin", priority: 0.3 },
];

pub struct SeoManager {
    config: SeoConfig,
}

impl SeoManager {
    pub fn new(config: SeoConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SeoConfig {
        &self.config
    }

    pub fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.config.site_url, path)
    }

    pub fn title(&self, page: &PageSeo) -> String {
        match &page.title {
            Some(title) => format!("{} | {}", title, self.config.site_name),
            None => self.config.default_title.clone(),
        }
    }

    /// Meta, Open Graph, Twitter and canonical tags for one page.
    pub fn head(&self, page: &PageSeo, path: &str) -> Markup {
        let config = &self.config;
        let title = self.title(page);
        let description = page
            .description
            .as_deref()
            .unwrap_or(&config.default_description);
        let keywords = page
            .keywords
            .as_ref()
            .unwrap_or(&config.default_keywords)
            .join(", ");
        let image = page.image.as_deref().unwrap_or(&config.default_image);
        let url = page.url.clone().unwrap_or_else(|| self.absolute(path));
        let canonical = sanitize_url(page.canonical.as_deref().unwrap_or(&url));

        html! {
            title { (title) }
            meta name="description" content=(description);
            meta name="keywords" content=(keywords);
            meta name="author" content=(page.author.as_deref().unwrap_or(&config.author));
            meta name="robots" content="index, follow";

            meta property="og:title" content=(title);
            meta property="og:description" content=(description);
            meta property="og:image" content=(image);
            meta property="og:url" content=(url);
            meta property="og:type" content=(page.page_type.as_str());
            meta property="og:site_name" content=(config.site_name);

            meta name="twitter:card" content="summary_large_image";
            meta name="twitter:title" content=(title);
            meta name="twitter:description" content=(description);
            meta name="twitter:image" content=(image);
            @if let Some(handle) = &config.twitter_handle {
                meta name="twitter:creator" content=(handle);
                meta name="twitter:site" content=(handle);
            }

            @if page.page_type == PageType::Article {
                @if let Some(published) = &page.published_time {
                    meta property="article:published_time" content=(published);
                }
                @if let Some(modified) = &page.modified_time {
                    meta property="article:modified_time" content=(modified);
                }
                @if let Some(author) = &page.author {
                    meta property="article:author" content=(author);
                }
            }

            @if !canonical.is_empty() {
                link rel="canonical" href=(canonical);
            }
        }
    }

    pub fn breadcrumbs(&self, crumbs: &[(&str, &str)]) -> Markup {
        let items: Vec<_> = crumbs
            .iter()
            .enumerate()
            .map(|(i, (name, path))| {
                json!({
                    "@type": "ListItem",
                    "position": i + 1,
                    "name": name,
                    "item": self.absolute(path),
                })
            })
            .collect();
        let data = json!({
            "@context": "https://schema.org",
            "@type": "BreadcrumbList",
            "itemListElement": items,
        });

        // keep the payload from closing the script element early
        let payload = data.to_string().replace("</", "<\\/");
        html! {
            script type="application/ld+json" { (PreEscaped(payload)) }
        }
    }

    pub fn sitemap(&self, routes: &[SitemapRoute]) -> String {
        let lastmod = Utc::now().format("%Y-%m-%d");
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );
        for route in routes {
            xml.push_str(&format!(
                "  <url><loc>{}</loc><lastmod>{}</lastmod><changefreq>weekly</changefreq><priority>{:.1}</priority></url>\n",
                xml_escape(&self.absolute(route.path)),
                lastmod,
                route.priority
            ));
        }
        xml.push_str("</urlset>\n");
        xml
    }

    pub fn robots(&self) -> String {
        format!(
            "User-agent: *\nAllow: /\nDisallow: /health\nSitemap: {}\n",
            self.absolute("/sitemap.xml")
        )
    }
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub async fn serve_sitemap(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        state.seo.sitemap(SITEMAP_ROUTES),
    )
}

pub async fn serve_robots(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        state.seo.robots(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SeoManager {
        SeoManager::new(SeoConfig::for_site("https://tee1104.org/"))
    }

    #[test]
    fn test_title() {
        let seo = manager();
        assert_eq!(seo.title(&PageSeo::titled("My Tickets")), "My Tickets | Union Connect Hub");
        assert_eq!(
            seo.title(&PageSeo::default()),
            "Union Connect Hub - Your Digital Union Platform"
        );
    }

    #[test]
    fn test_head_defaults_and_canonical() {
        let head = manager().head(&PageSeo::titled("Union News"), "/announcements").into_string();
        assert!(head.contains("<title>Union News | Union Connect Hub</title>"));
        assert!(head.contains(r#"<meta property="og:url" content="https://tee1104.org/announcements">"#));
        assert!(head.contains(r#"<link rel="canonical" href="https://tee1104.org/announcements">"#));
        assert!(head.contains("union, community, connect"));
        assert!(!head.contains("article:published_time"));
    }

    #[test]
    fn test_unsafe_canonical_is_dropped() {
        let page = PageSeo {
            canonical: Some("javascript:alert(1)".into()),
            ..PageSeo::default()
        };
        let head = manager().head(&page, "/").into_string();
        assert!(!head.contains("rel=\"canonical\""));
    }

    #[test]
    fn test_article_tags() {
        let page = PageSeo {
            page_type: PageType::Article,
            published_time: Some("2024-01-15".into()),
            author: Some("Union Leadership".into()),
            ..PageSeo::titled("New Union Agreement Signed")
        };
        let head = manager().head(&page, "/announcements").into_string();
        assert!(head.contains(r#"<meta property="article:published_time" content="2024-01-15">"#));
        assert!(head.contains(r#"<meta property="article:author" content="Union Leadership">"#));
        assert!(head.contains(r#"<meta property="og:type" content="article">"#));
    }

    #[test]
    fn test_breadcrumbs() {
        let markup = manager()
            .breadcrumbs(&[("Home", "/"), ("Tickets", "/tickets")])
            .into_string();
        assert!(markup.contains(r#""position":2"#));
        assert!(markup.contains(r#""item":"https://tee1104.org/tickets""#));
    }

    #[test]
    fn test_sitemap_and_robots() {
        let seo = manager();
        let xml = seo.sitemap(SITEMAP_ROUTES);
        assert!(xml.contains("<loc>https://tee1104.org/announcements</loc>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert_eq!(xml.matches("<url>").count(), SITEMAP_ROUTES.len());

        assert!(seo.robots().ends_with("Sitemap: https://tee1104.org/sitemap.xml\n"));
    }
}
