//! `Link` response header parsing (RFC 8288), restricted to pagination links
//! that point back at the listing being walked.

use std::collections::HashMap;

use url::Url;

/// Extract relation → URL pairs from a `Link` header value.
///
/// Only entries whose URL targets the same path as `endpoint` and carries a
/// numeric `page` query parameter are kept; anything else is skipped. When a
/// relation repeats, the last entry wins. An empty header yields an empty map.
pub fn parse_link_header(value: &str, endpoint: &Url) -> HashMap<String, Url> {
    let mut relations = HashMap::new();
    let mut rest = value;

    while let Some(open) = rest.find('<') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('>') else {
            break;
        };
        let target = &after_open[..close];
        let params_and_rest = &after_open[close + 1..];
        let params_end = params_and_rest.find('<').unwrap_or(params_and_rest.len());
        let params = &params_and_rest[..params_end];
        rest = &params_and_rest[params_end..];

        let Some(url) = pagination_url(target, endpoint) else {
            continue;
        };
        for rel in rel_names(params) {
            relations.insert(rel.to_ascii_lowercase(), url.clone());
        }
    }

    relations
}

fn pagination_url(target: &str, endpoint: &Url) -> Option<Url> {
    let url = endpoint.join(target.trim()).ok()?;
    if url.path() != endpoint.path() {
        return None;
    }
    let has_page = url
        .query_pairs()
        .any(|(k, v)| k == "page" && !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()));
    has_page.then_some(url)
}

/// Relation names from the `;`-separated parameters following a link target.
fn rel_names(params: &str) -> Vec<&str> {
    params
        .split(';')
        .filter_map(|param| {
            let (key, value) = param.split_once('=')?;
            key.trim().eq_ignore_ascii_case("rel").then(|| value.trim())
        })
        .flat_map(|value| {
            value
                .trim_end_matches(',')
                .trim()
                .trim_matches('"')
                .split_whitespace()
        })
        .collect()
}
