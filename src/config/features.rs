//! Feature flags configuration

use serde::Deserialize;

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FeatureFlags {
    /// Generate replies with the completion provider instead of templates
    #[serde(default)]
    pub use_ai: bool,

    /// Return `[DEBUG <Kind>] <message>` replies instead of errors when
    /// generation fails (disable in production!)
    #[serde(default)]
    pub debug_replies: bool,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_logs: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_flags_defaults() {
        let flags = FeatureFlags::default();
        assert!(!flags.use_ai);
        assert!(!flags.debug_replies);
        assert!(!flags.json_logs);
    }

    #[test]
    fn test_feature_flags_deserialization() {
        let json = r#"{ "use_ai": true, "debug_replies": true }"#;

        let flags: FeatureFlags = serde_json::from_str(json).unwrap();
        assert!(flags.use_ai);
        assert!(flags.debug_replies);
        assert!(!flags.json_logs);
    }
}
