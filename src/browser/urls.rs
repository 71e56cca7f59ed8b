use url::Url;

fn path_segments(raw: &str) -> Option<Vec<String>> {
    let url = Url::parse(raw).ok()?;
    Some(
        url.path_segments()
            .map(|segs| {
                segs.filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    )
}

/// Location is inside the signed-in document area (`/<doc-root>` or below).
pub fn is_authenticated_url(raw: &str, doc_root: &str) -> bool {
    let root = doc_root.trim_matches('/');
    path_segments(raw).is_some_and(|segs| segs.first().is_some_and(|s| s == root))
}

/// Location is an edit page for one server-assigned bin: `/<doc-root>/<id>`.
pub fn is_bin_url(raw: &str, doc_root: &str) -> bool {
    let root = doc_root.trim_matches('/');
    path_segments(raw).is_some_and(|segs| segs.len() == 2 && segs[0] == root)
}

/// Final path segment of a bin edit page, i.e. the generated identifier.
pub fn bin_id_from_url(raw: &str, doc_root: &str) -> Option<String> {
    if !is_bin_url(raw, doc_root) {
        return None;
    }
    path_segments(raw).and_then(|mut segs| segs.pop())
}
