/// Turn a title into a URL slug.
///
/// ASCII letters and digits are kept (lowercased); every other run of
/// characters becomes a single `-`. Leading and trailing separators are
/// dropped, so a title without any ASCII alphanumerics yields "".
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
