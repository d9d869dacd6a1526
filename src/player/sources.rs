use std::collections::BTreeMap;

/// Parses a rendition label such as `"720"`, `"720p"` or `" 1080P "`.
pub(crate) fn normalize_quality_label(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_suffix('p')
        .or_else(|| trimmed.strip_suffix('P'))
        .unwrap_or(trimmed)
        .trim();
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(label) => Some(label),
    }
}

/// Playable renditions keyed by integer quality label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct QualitySources {
    urls: BTreeMap<u32, String>,
}

impl QualitySources {
    pub(crate) fn from_raw<'a, I>(raw: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut urls = BTreeMap::new();
        for (label, url) in raw {
            let url = url.trim();
            if url.is_empty() {
                continue;
            }
            let Some(quality) = normalize_quality_label(label) else {
                continue;
            };
            urls.insert(quality, url.to_string());
        }
        Self { urls }
    }

    pub(crate) fn url(&self, quality: u32) -> Option<&str> {
        self.urls.get(&quality).map(String::as_str)
    }

    pub(crate) fn contains(&self, quality: u32) -> bool {
        self.urls.contains_key(&quality)
    }

    pub(crate) fn labels(&self) -> impl Iterator<Item = u32> + '_ {
        self.urls.keys().copied()
    }
}

/// Qualities the user may pick from.
///
/// The advertised list is kept in its given order minus labels with no URL.
/// When nothing survives (or nothing was advertised) the list falls back to
/// the sources' own labels, ascending.
pub(crate) fn selectable_qualities(sources: &QualitySources, available: Option<&[u32]>) -> Vec<u32> {
    let mut out = Vec::new();
    for &quality in available.unwrap_or_default() {
        if sources.contains(quality) && !out.contains(&quality) {
            out.push(quality);
        }
    }
    if out.is_empty() {
        out.extend(sources.labels());
    }
    out
}

/// Picks the starting quality: remembered preference, then the requested
/// initial quality, then the highest selectable one, then `fallback`.
pub(crate) fn default_quality(
    sources: &QualitySources,
    qualities: &[u32],
    preferred: Option<u32>,
    initial: Option<u32>,
    fallback: u32,
) -> u32 {
    if let Some(quality) = preferred.filter(|q| sources.contains(*q)) {
        return quality;
    }
    if let Some(quality) = initial.filter(|q| sources.contains(*q)) {
        return quality;
    }
    qualities.iter().copied().max().unwrap_or(fallback)
}
