/// Configuration for the dispatch adapter
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Reject requests that omit the `jsonrpc` member entirely.
    /// A member that is present but not `"2.0"` is always rejected.
    pub require_version: bool,
    /// Turn a panicking handler into an `Internal error` outcome for its item
    pub catch_panics: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            require_version: false,
            catch_panics: true,
        }
    }
}

impl AdapterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the `jsonrpc` member on every request
    pub fn require_version(mut self, require: bool) -> Self {
        self.require_version = require;
        self
    }

    /// Enable or disable panic containment for handlers
    pub fn catch_panics(mut self, catch: bool) -> Self {
        self.catch_panics = catch;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AdapterConfig::default();
        assert!(!config.require_version);
        assert!(config.catch_panics);
    }

    #[test]
    fn test_config_builder() {
        let config = AdapterConfig::new().require_version(true).catch_panics(false);
        assert!(config.require_version);
        assert!(!config.catch_panics);
    }
}
