//! Deterministic rule-based suggestions
//!
//! Every rule emits exactly one suggestion: a fix when the page is deficient
//! on that signal, a refinement when it is not. Each category therefore has
//! at least two distinct entries for any feature set.

use crate::audit::{FeatureSet, LengthBand};
use crate::suggest::{Category, Suggestion, SuggestionSet};

/// Builds the full fallback set for a feature set
pub fn fallback_suggestions(features: &FeatureSet) -> SuggestionSet {
    let mut set = SuggestionSet::new();
    for category in Category::ALL {
        set.insert(category, fallback_for(category, features));
    }
    set
}

/// Builds the fallback entries for one category
pub fn fallback_for(category: Category, features: &FeatureSet) -> Vec<Suggestion> {
    match category {
        Category::Seo => seo_rules(features),
        Category::Performance => performance_rules(features),
        Category::Security => security_rules(features),
        Category::Metadata => metadata_rules(features),
        Category::Content => content_rules(features),
        Category::Schema => schema_rules(),
        Category::General => general_rules(features),
    }
}

fn seo_rules(features: &FeatureSet) -> Vec<Suggestion> {
    let seo = &features.seo;
    let mut out = Vec::with_capacity(4);

    out.push(if !seo.has_title || seo.title_status == LengthBand::TooShort {
        Suggestion::new(
            "Title tag is missing or too short",
            "Write a descriptive title of 30 to 60 characters that leads with the primary keyword and ends with the brand name.",
        )
    } else if seo.title_status == LengthBand::TooLong {
        Suggestion::new(
            format!("Title tag is too long ({} characters)", seo.title_length),
            "Trim the title to 60 characters or fewer so search results show it without truncation.",
        )
    } else {
        Suggestion::new(
            "Refine the title for click-through",
            "Experiment with title variants that use numbers or a clear benefit and keep the one with the best click-through rate.",
        )
    });

    out.push(
        if !seo.has_meta_description || seo.meta_status == LengthBand::TooShort {
            Suggestion::new(
                "Meta description is missing or too short",
                "Add a meta description of 120 to 160 characters that summarizes the page, includes the primary keyword and ends with a call to action.",
            )
        } else if seo.meta_status == LengthBand::TooLong {
            Suggestion::new(
                format!("Meta description is too long ({} characters)", seo.meta_length),
                "Shorten the meta description to 160 characters or fewer so it is not cut off in search results.",
            )
        } else {
            Suggestion::new(
                "Sharpen the meta description",
                "Try descriptions that pose a question or mention a concrete offer and compare their click-through rates.",
            )
        },
    );

    out.push(match seo.h1_count {
        0 => Suggestion::new(
            "Missing H1 heading",
            "Add one H1 that states the main topic of the page and contains the primary keyword.",
        ),
        1 => Suggestion::new(
            "Keep the single H1 aligned with the title",
            "Make sure the H1 and the title tag describe the same topic so the page sends one consistent signal.",
        ),
        n => Suggestion::new(
            format!("Multiple H1 headings detected ({})", n),
            "Keep one H1 per page and demote the others to H2 or H3 to preserve a clean heading hierarchy.",
        ),
    });

    out.push(if seo.missing_alt > 0 {
        Suggestion::new(
            format!("{} images missing alt text", seo.missing_alt),
            "Give every meaningful image alt text that describes its content or function; use an empty alt only for decorative images.",
        )
    } else {
        Suggestion::new(
            "Review image alt text quality",
            "Check that existing alt text is specific rather than generic and mentions relevant keywords where it reads naturally.",
        )
    });

    out
}

fn performance_rules(features: &FeatureSet) -> Vec<Suggestion> {
    let perf = &features.performance;

    vec![
        if perf.page_size_kb > 500.0 {
            Suggestion::new(
                format!("Page size is large ({:.1} KB)", perf.page_size_kb),
                "Minify the HTML, CSS and JavaScript, lazy-load images and defer scripts that are not needed for the first render.",
            )
        } else {
            Suggestion::new(
                "Tune page delivery further",
                "Serve static assets from a CDN with long cache lifetimes and enable HTTP/2 or HTTP/3 on the origin.",
            )
        },
        if perf.js_size_kb > 200.0 {
            Suggestion::new(
                format!("JavaScript payload is large ({:.1} KB)", perf.js_size_kb),
                "Split bundles by route, remove unused code with tree-shaking and load non-critical modules through dynamic imports.",
            )
        } else {
            Suggestion::new(
                "Streamline JavaScript loading",
                "Mark scripts async or defer and cache them with a service worker so repeat visits skip the download.",
            )
        },
        if perf.largest_image_kb > 300.0 {
            Suggestion::new(
                format!("Large image detected ({:.1} KB)", perf.largest_image_kb),
                "Re-encode large images as WebP or AVIF, serve responsive sizes with srcset and lazy-load images below the fold.",
            )
        } else {
            Suggestion::new(
                "Modernize image delivery",
                "Adopt WebP or AVIF with srcset-based responsive variants and deliver images through a CDN.",
            )
        },
    ]
}

fn security_rules(features: &FeatureSet) -> Vec<Suggestion> {
    let headers = &features.security_headers;
    let mut out = Vec::with_capacity(3);

    out.push(if headers.content_security_policy {
        Suggestion::new(
            "Tighten the Content-Security-Policy",
            "Audit the policy for broad sources and move inline scripts to nonces or 'strict-dynamic'.",
        )
    } else {
        Suggestion::new(
            "Missing Content-Security-Policy header",
            "Add a Content-Security-Policy header to block cross-site scripting; start restrictive and loosen only what the site needs.",
        )
    });

    // frame-ancestors in a CSP covers clickjacking on its own
    if !headers.x_frame_options && !headers.content_security_policy {
        out.push(Suggestion::new(
            "Missing X-Frame-Options header",
            "Send X-Frame-Options: DENY or SAMEORIGIN to stop other sites from framing the page.",
        ));
    }

    out.push(if headers.strict_transport_security {
        Suggestion::new(
            "Strengthen the HSTS policy",
            "Add includeSubDomains and preload to Strict-Transport-Security and submit the domain to the HSTS preload list.",
        )
    } else {
        Suggestion::new(
            "Missing Strict-Transport-Security header",
            "Send Strict-Transport-Security with a max-age of at least 31536000 so browsers always use HTTPS.",
        )
    });

    out
}

fn metadata_rules(features: &FeatureSet) -> Vec<Suggestion> {
    vec![
        if features.seo.canonical_present {
            Suggestion::new(
                "Verify canonical URLs",
                "Confirm canonical tags point at the preferred version of each page, including paginated and parameterized URLs.",
            )
        } else {
            Suggestion::new(
                "Missing canonical tag",
                "Add a canonical link to the preferred URL so duplicate variants consolidate their ranking signals.",
            )
        },
        Suggestion::new(
            "Add Open Graph and Twitter Card tags",
            "Provide og:title, og:description, og:image and the matching Twitter Card tags so shared links render rich previews.",
        ),
    ]
}

fn content_rules(features: &FeatureSet) -> Vec<Suggestion> {
    vec![
        if features.seo.h2_count < 3 {
            Suggestion::new(
                "Thin heading structure",
                "Break the content into sections with H2 and H3 headings so readers and crawlers can follow its outline.",
            )
        } else {
            Suggestion::new(
                "Review heading flow",
                "Check that H2s mark the main sections and H3s their subsections in a logical order.",
            )
        },
        Suggestion::new(
            "Deepen the content",
            "Cover the topic thoroughly, link to related pages on the site and support the text with images or video.",
        ),
    ]
}

fn schema_rules() -> Vec<Suggestion> {
    vec![
        Suggestion::new(
            "No structured data detected",
            "Add JSON-LD for Organization, WebSite and BreadcrumbList, plus Article or Product markup on content pages.",
        ),
        Suggestion::new(
            "Extend structured data coverage",
            "Where it applies, add FAQ, Review or Event markup to qualify for rich results.",
        ),
    ]
}

fn general_rules(features: &FeatureSet) -> Vec<Suggestion> {
    vec![
        if features.seo.sitemap_available {
            Suggestion::new(
                "Keep the sitemap current",
                "Include lastmod dates, split large sitemaps by content type and resubmit after major changes.",
            )
        } else {
            Suggestion::new(
                "sitemap.xml not found",
                "Publish an XML sitemap listing the important pages and submit it in the search engines' webmaster tools.",
            )
        },
        Suggestion::new(
            "Check mobile responsiveness",
            "Test on several screen sizes; keep touch targets at least 44 by 44 pixels and text readable without zooming.",
        ),
        Suggestion::new(
            "Improve accessibility",
            "Meet WCAG contrast ratios, support full keyboard navigation and label interactive elements for screen readers.",
        ),
    ]
}
