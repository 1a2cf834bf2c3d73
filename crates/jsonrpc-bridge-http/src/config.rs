/// Configuration for the JSON-RPC middleware
#[derive(Debug, Clone)]
pub struct MiddlewareConfig {
    /// Maximum accepted size of a raw request body, in bytes
    pub max_body_size: usize,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl MiddlewareConfig {
    /// Set maximum request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }
}
