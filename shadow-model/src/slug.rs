/// Builds a URL-safe slug from a title.
///
/// Lowercases alphanumerics and collapses every other run of characters into
/// a single `-`, trimming dashes at both ends.
pub fn sanitize_title(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c == '\'' || c == '\u{2019}' {
            // Apostrophes vanish rather than splitting words.
        } else {
            pending_dash = true;
        }
    }

    slug
}
