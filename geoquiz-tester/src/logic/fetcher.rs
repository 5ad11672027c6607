use std::path::{Path, PathBuf};

use geoquiz_game::ResourceFetcher;

/// Serves mirror URLs from a local directory, keyed by the URL's file name.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn local_path(&self, url: &str) -> PathBuf {
        let name = url
            .split(['?', '#'])
            .next()
            .unwrap_or(url)
            .rsplit('/')
            .next()
            .unwrap_or(url);
        self.root.join(name)
    }
}

impl ResourceFetcher for FileFetcher {
    type Error = std::io::Error;

    async fn fetch_text(&self, url: &str) -> Result<String, Self::Error> {
        let path = self.local_path(url);
        log::debug!("reading {url} from {}", path.display());
        tokio::fs::read_to_string(&path).await
    }
}
