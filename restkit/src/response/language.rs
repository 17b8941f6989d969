use axum::http::{HeaderMap, header::ACCEPT_LANGUAGE};

struct Weighted<'a> {
    tag: &'a str,
    quality: f32,
}

/// `en-us` -> `en_US`; subtags longer than two characters keep their case.
fn normalize_tag(tag: &str) -> String {
    let mut parts = tag.split('-');
    let primary = parts.next().unwrap_or_default().to_ascii_lowercase();
    parts.fold(primary, |mut locale, part| {
        locale.push('_');
        if part.len() == 2 {
            locale.push_str(&part.to_ascii_uppercase());
        } else {
            locale.push_str(part);
        }
        locale
    })
}

fn parse_quality(params: &str) -> Option<f32> {
    params
        .split(';')
        .filter_map(|param| param.trim().strip_prefix("q="))
        .next()
        .map(|q| q.trim().parse::<f32>().unwrap_or(0.0))
}

/// Languages from `Accept-Language`, most preferred first.
///
/// Entries are ordered by q-value, ties keep header order; `*` and `q=0`
/// entries are dropped.
#[must_use]
pub fn accepted_languages(headers: &HeaderMap) -> Vec<String> {
    let Some(raw) = headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
    else {
        return Vec::new();
    };

    let mut entries: Vec<Weighted<'_>> = raw
        .split(',')
        .filter_map(|entry| {
            let (tag, params) = entry.split_once(';').unwrap_or((entry, ""));
            let tag = tag.trim();
            let quality = parse_quality(params).unwrap_or(1.0);
            (!tag.is_empty() && tag != "*" && quality > 0.0).then_some(Weighted { tag, quality })
        })
        .collect();
    entries.sort_by(|a, b| b.quality.total_cmp(&a.quality));

    entries.into_iter().map(|entry| normalize_tag(entry.tag)).collect()
}

/// The client's most preferred language, if it sent any.
#[must_use]
pub fn preferred_language(headers: &HeaderMap) -> Option<String> {
    accepted_languages(headers).into_iter().next()
}
