use uuid::Uuid;

/// Derive a unique, url-safe slug from the course title. The slug is
/// informational only; lookups are always by id.
pub(crate) fn make_slug(title: &str) -> String {
    let base: String = title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(60)
        .collect();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", base, &suffix[..6])
}
