use async_trait::async_trait;
use std::collections::HashMap;

/// HTTP headers to send with the WebSocket handshake
pub type Headers = HashMap<String, String>;

/// Trait for providing handshake headers dynamically
///
/// Called on every connection attempt, including reconnections, so a
/// provider can hand out a refreshed session cookie or token each time.
///
/// # Example
/// ```ignore
/// struct SessionHeaders {
///     store: Arc<SessionStore>,
/// }
///
/// #[async_trait::async_trait]
/// impl HeaderProvider for SessionHeaders {
///     async fn get_headers(&self) -> Headers {
///         let mut headers = Headers::new();
///         headers.insert("Cookie".to_string(), format!("session_id={}", self.store.current()));
///         headers
///     }
/// }
/// ```
#[async_trait]
pub trait HeaderProvider: Send + Sync {
    /// Generate headers to send with the WebSocket handshake
    async fn get_headers(&self) -> Headers;
}

/// A fixed set of headers, sent unchanged on every attempt
#[derive(Debug, Clone, Default)]
pub struct StaticHeaders {
    headers: Headers,
}

impl StaticHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// `Authorization: Bearer <token>`
    pub fn bearer(token: impl AsRef<str>) -> Self {
        Self::new().with("Authorization", format!("Bearer {}", token.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

#[async_trait]
impl HeaderProvider for StaticHeaders {
    async fn get_headers(&self) -> Headers {
        self.headers.clone()
    }
}
