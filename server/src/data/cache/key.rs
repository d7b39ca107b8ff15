//! Type-safe cache key builder with versioning

use crate::core::constants::CACHE_KEY_VERSION;

/// Type-safe cache key builder
///
/// All keys are prefixed with a version (e.g., "v1:") to allow
/// invalidating all cached data on schema changes.
pub struct CacheKey;

impl CacheKey {
    // =========================================================================
    // Message counts
    // =========================================================================

    /// Cache key for the message count of a whole organization
    pub fn message_count_org(organization_id: &str) -> String {
        format!("{}:msgcount:org:{}", CACHE_KEY_VERSION, organization_id)
    }

    /// Cache key for the message count of an explicit project set.
    ///
    /// Order and duplicates in `project_ids` don't change the key.
    pub fn message_count_projects(project_ids: &[String]) -> String {
        let mut ids: Vec<&str> = project_ids.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids.dedup();
        format!("{}:msgcount:projects:{}", CACHE_KEY_VERSION, ids.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_key() {
        assert_eq!(CacheKey::message_count_org("org_1"), "v1:msgcount:org:org_1");
    }

    #[test]
    fn test_project_key_is_order_insensitive() {
        let a = CacheKey::message_count_projects(&["b".to_string(), "a".to_string()]);
        let b = CacheKey::message_count_projects(&[
            "a".to_string(),
            "b".to_string(),
            "a".to_string(),
        ]);
        assert_eq!(a, b);
        assert_eq!(a, "v1:msgcount:projects:a,b");
    }

    #[test]
    fn test_org_and_project_keys_never_collide() {
        assert_ne!(
            CacheKey::message_count_org("a"),
            CacheKey::message_count_projects(&["a".to_string()])
        );
    }
}
