// Quarantine role capabilities.
//
// The role is rebuilt from scratch each time: every capability we manage is
// stripped, then the configured subset is put back. Capabilities we don't
// manage are left untouched, so applying the same configuration twice is a
// no-op the second time.

use std::collections::BTreeSet;

/// Role assigned to quarantined accounts.
pub const QUARANTINE_ROLE: &str = "regguard_quarantined";

/// Human-readable name for the quarantine role.
pub const QUARANTINE_ROLE_LABEL: &str = "Quarantined Registration";

/// Account flag set on quarantined accounts.
pub const QUARANTINE_FLAG: &str = "_regguard_quarantined";

/// The capabilities regguard knows how to grant.
pub const KNOWN_CAPABILITIES: &[&str] = &["read", "edit_posts", "publish_posts"];

/// Keep only the requested capabilities that appear in `known`.
pub fn filter_known<'a, I>(requested: I, known: &[&str]) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    requested
        .into_iter()
        .filter(|cap| known.contains(cap))
        .map(str::to_string)
        .collect()
}

/// Reset every known capability on `current`, then re-apply the known
/// subset of `requested`.
pub fn reconcile(
    current: &BTreeSet<String>,
    requested: &BTreeSet<String>,
    known: &[&str],
) -> BTreeSet<String> {
    let mut caps: BTreeSet<String> = current
        .iter()
        .filter(|cap| !known.contains(&cap.as_str()))
        .cloned()
        .collect();
    caps.extend(filter_known(requested.iter().map(String::as_str), known));
    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(caps: &[&str]) -> BTreeSet<String> {
        caps.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_reconcile_replaces_known_caps() {
        let current = set(&["read", "edit_posts", "publish_posts"]);
        let result = reconcile(&current, &set(&["read"]), KNOWN_CAPABILITIES);
        assert_eq!(result, set(&["read"]));
    }

    #[test]
    fn test_reconcile_drops_unknown_requested() {
        let result = reconcile(
            &BTreeSet::new(),
            &set(&["read", "manage_options", "delete_users"]),
            KNOWN_CAPABILITIES,
        );
        assert_eq!(result, set(&["read"]));
    }

    #[test]
    fn test_reconcile_preserves_unmanaged_caps() {
        let current = set(&["upload_files", "edit_posts"]);
        let result = reconcile(&current, &BTreeSet::new(), KNOWN_CAPABILITIES);
        assert_eq!(result, set(&["upload_files"]));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let current = set(&["edit_posts", "moderate_comments"]);
        let requested = set(&["read", "publish_posts", "bogus"]);
        let once = reconcile(&current, &requested, KNOWN_CAPABILITIES);
        let twice = reconcile(&once, &requested, KNOWN_CAPABILITIES);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_known() {
        let caps = filter_known(["publish_posts", "root", "read"], KNOWN_CAPABILITIES);
        assert_eq!(caps, set(&["publish_posts", "read"]));
    }
}
