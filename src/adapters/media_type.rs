//! `Accept` header parsing and content selection.

use crate::domain::HttpContent;

pub const DEFAULT_ACCEPT: &str = "application/json";

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub main: String,
    pub sub: String,
    pub quality: f32,
}

impl MediaRange {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(';');
        let essence = parts.next()?.trim().to_ascii_lowercase();
        let (main, sub) = essence.split_once('/')?;
        if main.is_empty() || sub.is_empty() {
            return None;
        }

        let quality = parts
            .filter_map(|param| param.split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
            .and_then(|(_, value)| value.trim().parse::<f32>().ok())
            .unwrap_or(1.0);

        Some(Self {
            main: main.to_string(),
            sub: sub.to_string(),
            quality,
        })
    }

    fn is_wildcard(&self) -> bool {
        self.main == "*" || self.sub == "*"
    }

    fn matches_exactly(&self, other: &MediaRange) -> bool {
        !self.is_wildcard() && self.main == other.main && self.sub == other.sub
    }

    fn matches_wildcard(&self, other: &MediaRange) -> bool {
        (self.main == "*" || other.main == "*" || self.main == other.main)
            && (self.sub == "*" || other.sub == "*" || self.sub == other.sub)
    }
}

/// Parses an `Accept` header into ranges ordered by preference. Ranges with
/// `q=0` are dropped; equal qualities keep their header order.
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = header
        .split(',')
        .filter_map(MediaRange::parse)
        .filter(|range| range.quality > 0.0)
        .collect();
    ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    ranges
}

/// Picks the content answering `accept`: exact matches across all preferences
/// first, then wildcard matches. `None` when nothing matches.
pub fn find_content<'a>(accept: Option<&str>, contents: &'a [HttpContent]) -> Option<&'a HttpContent> {
    let accepted = parse_accept(accept.unwrap_or(DEFAULT_ACCEPT));
    let declared: Vec<(Option<MediaRange>, &HttpContent)> = contents
        .iter()
        .map(|content| (MediaRange::parse(&content.media_type), content))
        .collect();

    let exact = accepted.iter().find_map(|wanted| {
        declared.iter().find_map(|(range, content)| match range {
            Some(range) if wanted.matches_exactly(range) => Some(*content),
            _ => None,
        })
    });

    exact.or_else(|| {
        accepted.iter().find_map(|wanted| {
            declared.iter().find_map(|(range, content)| match range {
                Some(range) if wanted.matches_wildcard(range) => Some(*content),
                _ => None,
            })
        })
    })
}

/// Whether a body of this media type is serialized as JSON.
pub fn is_json_like(media_type: &str) -> bool {
    MediaRange::parse(media_type)
        .map(|range| range.sub == "json" || range.sub.ends_with("+json") || range.sub == "*")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(types: &[&str]) -> Vec<HttpContent> {
        types.iter().map(|t| HttpContent::new(*t)).collect()
    }

    #[test]
    fn test_parse_accept_orders_by_quality() {
        let ranges = parse_accept("text/html;q=0.5, application/xml, */*;q=0");
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].sub, "xml");
        assert_eq!(ranges[1].sub, "html");
    }

    #[test]
    fn test_defaults_to_json() {
        let declared = contents(&["application/xml", "application/json"]);
        let chosen = find_content(None, &declared).unwrap();
        assert_eq!(chosen.media_type, "application/json");
    }

    #[test]
    fn test_exact_match_beats_wildcard() {
        let declared = contents(&["text/plain", "application/xml"]);
        let chosen = find_content(Some("*/*, application/xml;q=0.1"), &declared).unwrap();
        assert_eq!(chosen.media_type, "application/xml");
    }

    #[test]
    fn test_wildcard_match() {
        let declared = contents(&["text/plain", "application/xml"]);
        let chosen = find_content(Some("application/*"), &declared).unwrap();
        assert_eq!(chosen.media_type, "application/xml");

        let chosen = find_content(Some("*/*"), &declared).unwrap();
        assert_eq!(chosen.media_type, "text/plain");
    }

    #[test]
    fn test_parameters_ignored() {
        let declared = contents(&["application/json; charset=utf-8"]);
        assert!(find_content(Some("application/json"), &declared).is_some());
    }

    #[test]
    fn test_no_match() {
        let declared = contents(&["text/plain"]);
        assert!(find_content(Some("image/png"), &declared).is_none());
    }

    #[test]
    fn test_json_like() {
        assert!(is_json_like("application/json"));
        assert!(is_json_like("application/problem+json"));
        assert!(!is_json_like("text/plain"));
    }
}
