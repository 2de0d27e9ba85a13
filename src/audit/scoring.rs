//! Scoring functions
//!
//! Three independent pure functions map a [`FeatureSet`] to 0-100 scores.
//! They hold no state, so a stored feature set re-scores to the same values
//! at any later time.

use crate::audit::model::{FeatureSet, PerformanceFeatures, Scores, SecurityHeaders, SeoFeatures};

const MAX_SCORE: u32 = 100;

/// Scores all three dimensions
pub fn score(features: &FeatureSet) -> Scores {
    Scores {
        seo: seo_score(&features.seo),
        performance: performance_score(&features.performance),
        security: security_score(&features.security_headers),
    }
}

/// Banded length points: `ideal` inside `ideal_range`, `near` inside the
/// widened `near_range`, `far` anywhere else
fn banded_points(
    len: usize,
    ideal_range: (usize, usize),
    near_range: (usize, usize),
    points: (u32, u32, u32),
) -> u32 {
    let (ideal, near, far) = points;
    if (ideal_range.0..=ideal_range.1).contains(&len) {
        ideal
    } else if (near_range.0..=near_range.1).contains(&len) {
        near
    } else {
        far
    }
}

/// SEO score, summed from independent terms and capped at 100
pub fn seo_score(seo: &SeoFeatures) -> u32 {
    let mut score = 0;

    if seo.has_title {
        score += banded_points(seo.title_length, (30, 60), (20, 70), (20, 10, 5));
    }

    if seo.has_meta_description {
        score += banded_points(seo.meta_length, (120, 160), (100, 180), (15, 8, 3));
    }

    score += match seo.h1_count {
        0 => 0,
        1 => 15,
        _ => 5,
    };

    // No images earns nothing here, not full marks
    if seo.img_count > 0 {
        let with_alt = seo.img_count.saturating_sub(seo.missing_alt);
        score += (15 * with_alt / seo.img_count) as u32;
    }

    if seo.canonical_present {
        score += 10;
    }
    if seo.robots_meta {
        score += 10;
    }
    if seo.sitemap_available {
        score += 10;
    }
    if seo.robots_available {
        score += 5;
    }

    score.min(MAX_SCORE)
}

/// Deduction for the highest threshold `value` exceeds, zero below all of them
///
/// `tiers` is ordered from the highest threshold down.
fn tier_penalty(value: f64, tiers: [(f64, u32); 3]) -> u32 {
    tiers
        .iter()
        .find(|(threshold, _)| value > *threshold)
        .map_or(0, |(_, penalty)| *penalty)
}

/// Performance score: 100 minus one deduction per resource class, floored at 0
pub fn performance_score(perf: &PerformanceFeatures) -> u32 {
    let deductions = tier_penalty(perf.page_size_kb, [(2000.0, 30), (1000.0, 20), (500.0, 10)])
        + tier_penalty(perf.js_size_kb, [(500.0, 25), (300.0, 15), (200.0, 8)])
        + tier_penalty(perf.css_size_kb, [(200.0, 20), (100.0, 12), (50.0, 6)])
        + tier_penalty(perf.largest_image_kb, [(300.0, 15), (200.0, 10), (100.0, 5)]);

    MAX_SCORE.saturating_sub(deductions)
}

/// Security score: 20 points per present header
pub fn security_score(headers: &SecurityHeaders) -> u32 {
    (headers.present_count() as u32 * 20).min(MAX_SCORE)
}
