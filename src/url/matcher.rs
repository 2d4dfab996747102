/// Checks if a host falls under an allowed domain
///
/// A host matches when it equals the allowed domain or is one of its
/// subdomains. Matching happens on label boundaries, so `notdell.com`
/// does not fall under `dell.com`.
///
/// # Examples
///
/// ```
/// use repair_harvest::url::matches_domain;
///
/// assert!(matches_domain("dell.com", "dell.com"));
/// assert!(matches_domain("dell.com", "www.dell.com"));
/// assert!(matches_domain("hp.com", "h30434.www3.hp.com"));
/// assert!(!matches_domain("dell.com", "notdell.com"));
/// assert!(!matches_domain("dell.com", "dell.com.evil.org"));
/// ```
pub fn matches_domain(allowed: &str, host: &str) -> bool {
    if allowed.is_empty() {
        return false;
    }

    match host.strip_suffix(allowed) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}
