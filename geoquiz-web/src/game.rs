// Re-export core quiz functionality
pub use geoquiz_game::*;

/// Failure of a single browser fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebFetchError {
    #[error("{0}")]
    Network(String),
    /// Non-success HTTP status, rendered as the bare code.
    #[error("{0}")]
    Status(u16),
    #[error("body is not text")]
    NotText,
}

/// Fetches resources with the browser `fetch` API.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserFetcher;

impl ResourceFetcher for BrowserFetcher {
    type Error = WebFetchError;

    async fn fetch_text(&self, url: &str) -> Result<String, Self::Error> {
        let network = |err: wasm_bindgen::JsValue| {
            WebFetchError::Network(crate::dom::js_error_message(&err))
        };
        let response = crate::dom::fetch_response(url).await.map_err(network)?;
        if !response.ok() {
            return Err(WebFetchError::Status(response.status()));
        }
        let body = wasm_bindgen_futures::JsFuture::from(response.text().map_err(network)?)
            .await
            .map_err(network)?;
        body.as_string().ok_or(WebFetchError::NotText)
    }
}

/// Engine wired to the browser fetcher and the deployed mirror lists.
#[must_use]
pub fn browser_engine() -> QuizEngine<BrowserFetcher> {
    QuizEngine::new(BrowserFetcher, crate::paths::resolved_sources())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_read_like_mirror_failures() {
        let message = format!("World Atlas fetch failed ({})", WebFetchError::Status(404));
        assert_eq!(message, "World Atlas fetch failed (404)");
        assert_eq!(
            WebFetchError::Network("offline".into()).to_string(),
            "offline"
        );
    }

    #[test]
    fn browser_engine_uses_bundled_quiz_config() {
        let engine = browser_engine();
        assert_eq!(engine.config(), &QuizConfig::default_config());
        assert!(!engine.sources().cities.is_empty());
    }
}
