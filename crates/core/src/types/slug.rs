//! URL slugs for products and categories.

/// Turn a display name into a URL slug.
///
/// ASCII letters and digits are lowercased and kept; every other run of
/// characters becomes a single `-`. Leading and trailing dashes are dropped.
///
/// ```
/// use camrent_core::slugify;
///
/// assert_eq!(slugify("Sony FE 24-70mm f/2.8 GM II"), "sony-fe-24-70mm-f-2-8-gm-ii");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  Canon   EOS R5 "), "canon-eos-r5");
        assert_eq!(slugify("DJI -- Ronin/RS3"), "dji-ronin-rs3");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Çekim Işığı"), "ekim-i");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify("!!!"), "");
    }
}
