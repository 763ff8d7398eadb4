//! Minimal HTML slicing for markup sources.
//!
//! The markup adapters only ever need to find a marked element, walk its
//! tag blocks, and read attributes or text — a full DOM is not worth the
//! weight for that. Matching is ASCII case-insensitive throughout.

/// Find `needle` in `hay` at or after `from`, ASCII case-insensitive.
pub fn find_ci(hay: &str, needle: &str, from: usize) -> Option<usize> {
    if from > hay.len() {
        return None;
    }
    let hay_lower = hay[from..].to_ascii_lowercase();
    let needle_lower = needle.to_ascii_lowercase();
    hay_lower.find(&needle_lower).map(|i| from + i)
}

/// Content between the first occurrence of `start_marker` and the following
/// `end_marker`.
pub fn slice_between_ci<'a>(hay: &'a str, start_marker: &str, end_marker: &str) -> Option<&'a str> {
    let start = find_ci(hay, start_marker, 0)? + start_marker.len();
    let end = find_ci(hay, end_marker, start)?;
    Some(&hay[start..end])
}

/// Span of the next `open_prefix`…`close_tag` block starting at or after
/// `from`. The span covers the opening tag through the end of the close tag.
pub fn next_tag_block_ci(
    hay: &str,
    open_prefix: &str,
    close_tag: &str,
    from: usize,
) -> Option<(usize, usize)> {
    let start = find_ci(hay, open_prefix, from)?;
    let close = find_ci(hay, close_tag, start)?;
    Some((start, close + close_tag.len()))
}

/// Content of a block after its opening tag's closing `>`.
pub fn inner_after_open_tag(block: &str) -> &str {
    match block.find('>') {
        Some(gt) => &block[gt + 1..],
        None => block,
    }
}

/// Remove all tags, keeping text content.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Decode the handful of entities the upstream markup actually uses.
pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

/// Value of `name="..."` (or single-quoted) inside a single tag.
pub fn attr_value(tag: &str, name: &str) -> Option<String> {
    let marker = format!("{}=", name);
    let at = find_ci(tag, &marker, 0)? + marker.len();
    let rest = &tag[at..];
    let mut chars = rest.chars();
    match chars.next() {
        Some(quote @ ('"' | '\'')) => {
            let body = chars.as_str();
            let end = body.find(quote)?;
            Some(normalize_entities(&body[..end]))
        }
        Some(_) => {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                .unwrap_or(rest.len());
            Some(normalize_entities(&rest[..end]))
        }
        None => None,
    }
}

/// All `alt` attribute values of `<img>` tags in `fragment`, in order.
pub fn img_alts(fragment: &str) -> Vec<String> {
    let mut alts = Vec::new();
    let mut pos = 0;
    while let Some(start) = find_ci(fragment, "<img", pos) {
        let end = match fragment[start..].find('>') {
            Some(gt) => start + gt + 1,
            None => break,
        };
        if let Some(alt) = attr_value(&fragment[start..end], "alt") {
            alts.push(alt);
        }
        pos = end;
    }
    alts
}

/// All top-level blocks for `open_prefix`…`close_tag` whose opening tag
/// contains `marker`.
pub fn blocks_with_marker<'a>(
    hay: &'a str,
    open_prefix: &str,
    close_tag: &str,
    marker: &str,
) -> Vec<&'a str> {
    let mut blocks = Vec::new();
    let mut pos = 0;
    while let Some((start, end)) = next_tag_block_ci(hay, open_prefix, close_tag, pos) {
        let block = &hay[start..end];
        let open_end = block.find('>').unwrap_or(block.len());
        if find_ci(&block[..open_end], marker, 0).is_some() {
            blocks.push(block);
        }
        pos = end;
    }
    blocks
}
