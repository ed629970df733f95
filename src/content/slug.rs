use uuid::Uuid;

/// Derive a URL-safe slug from a title: lowercase, whitespace to hyphens,
/// strip anything that is not a word character or hyphen, collapse repeated
/// hyphens, then append a short random suffix. The suffix makes slugs unique
/// by construction, so no uniqueness query is needed at insert time.
pub fn slugify(title: &str) -> String {
    let mut base = String::with_capacity(title.len());
    let mut last_hyphen = true; // suppress leading hyphens

    for c in title.trim().to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            if !last_hyphen {
                base.push('-');
                last_hyphen = true;
            }
        } else if c.is_alphanumeric() || c == '_' {
            base.push(c);
            last_hyphen = false;
        }
        // everything else is dropped
    }

    while base.ends_with('-') {
        base.pop();
    }

    let suffix = random_suffix();
    if base.is_empty() {
        suffix
    } else {
        format!("{}-{}", base, suffix)
    }
}

/// Eight hex characters of a fresh v4 UUID.
fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        let slug = slugify("Senior Rust Engineer");
        assert!(slug.starts_with("senior-rust-engineer-"));
    }

    #[test]
    fn strips_punctuation_and_collapses_hyphens() {
        let slug = slugify("  C++ / Embedded -- Firmware!  ");
        assert!(slug.starts_with("c-embedded-firmware-"), "got {}", slug);
        assert!(!slug.contains("--"));
    }

    #[test]
    fn two_calls_never_collide() {
        let a = slugify("Annual Grant Program");
        let b = slugify("Annual Grant Program");
        assert_ne!(a, b);
    }

    #[test]
    fn degenerate_title_still_yields_a_slug() {
        let slug = slugify("!!!");
        assert_eq!(slug.len(), 8);
        assert!(slug.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
