/// Rich-text sanitization for user-submitted markup. The submission form
/// allows a small set of formatting tags; everything else -- scripts, styles,
/// event handlers, unknown tags -- is removed before the value reaches the
/// store. This runs on every rich-text field, not just the obviously risky
/// ones.

/// Fields treated as rich text by the normalizer.
pub const RICH_TEXT_FIELDS: &[&str] = &[
    "description",
    "details",
    "requirements",
    "bio",
    "eligibility_criteria",
];

pub fn is_rich_text_field(name: &str) -> bool {
    RICH_TEXT_FIELDS.contains(&name)
}

/// Formatting tags that survive sanitization. All attributes are dropped,
/// except a safe `href` on anchors.
const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "b", "strong", "i", "em", "u", "ul", "ol", "li", "a", "h2", "h3", "blockquote",
];

/// Tags whose entire content is executable or presentational noise and is
/// removed wholesale rather than unwrapped.
const DROP_CONTENT_TAGS: &[&str] = &["script", "style"];

/// Sanitize a rich-text value: allowed tags are kept (attributes stripped),
/// disallowed tags are unwrapped to their inner text, script/style bodies and
/// HTML comments are removed entirely.
pub fn sanitize_rich_text(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            // Plain text up to the next tag opener.
            let start = i;
            while i < bytes.len() && bytes[i] != b'<' {
                i += 1;
            }
            out.push_str(&input[start..i]);
            continue;
        }

        // HTML comment.
        if input[i..].starts_with("<!--") {
            i = match input[i..].find("-->") {
                Some(end) => i + end + 3,
                None => bytes.len(),
            };
            continue;
        }

        let Some(close) = input[i..].find('>') else {
            // Dangling '<' with no tag end; neutralize it and stop scanning.
            out.push_str("&lt;");
            out.push_str(&input[i + 1..]);
            break;
        };
        let tag_body = &input[i + 1..i + close];
        i += close + 1;

        let (is_closing, rest) = match tag_body.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, tag_body),
        };
        let name: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        if name.is_empty() {
            continue; // malformed tag, drop it
        }

        if DROP_CONTENT_TAGS.contains(&name.as_str()) {
            if !is_closing {
                // Skip everything through the matching close tag.
                let close_tag = format!("</{}", name);
                i = match find_ascii_ci(&input[i..], &close_tag) {
                    Some(pos) => {
                        let after = i + pos;
                        match input[after..].find('>') {
                            Some(end) => after + end + 1,
                            None => bytes.len(),
                        }
                    }
                    None => bytes.len(),
                };
            }
            continue;
        }

        if !ALLOWED_TAGS.contains(&name.as_str()) {
            continue; // unwrap: drop the tag, keep surrounding text
        }

        if is_closing {
            out.push_str("</");
            out.push_str(&name);
            out.push('>');
        } else if name == "a" {
            match safe_href(rest) {
                Some(href) => {
                    out.push_str("<a href=\"");
                    out.push_str(&href);
                    out.push_str("\">");
                }
                None => out.push_str("<a>"),
            }
        } else {
            out.push('<');
            out.push_str(&name);
            out.push('>');
        }
    }

    out
}

/// Case-insensitive ASCII substring search returning a byte offset. The
/// needle is always an ASCII tag prefix, so offsets stay on char boundaries.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&idx| h[idx..idx + n.len()].eq_ignore_ascii_case(n))
}

/// Extract an href value from an anchor tag body and return it only if it
/// points somewhere harmless (http, https, mailto, or site-relative).
fn safe_href(tag_body: &str) -> Option<String> {
    let pos = find_ascii_ci(tag_body, "href")?;
    let rest = &tag_body[pos + 4..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();

    let value = match rest.chars().next()? {
        q @ ('"' | '\'') => {
            let inner = &rest[1..];
            &inner[..inner.find(q)?]
        }
        _ => rest.split_whitespace().next()?,
    };

    let value = value.trim();
    let lower_value = value.to_lowercase();
    if lower_value.starts_with("http://")
        || lower_value.starts_with("https://")
        || lower_value.starts_with("mailto:")
        || (value.starts_with('/') && !value.starts_with("//"))
    {
        // Quotes cannot appear here by construction; escape nothing else.
        Some(value.to_string())
    } else {
        None
    }
}
