//! The script element handed to a [`ScriptHost`]

use crate::ui::popup::escape_html;
use url::Url;

#[cfg(feature = "http")]
use crate::{traits::MapsProvider, traits::ScriptHost, MapError, Result};
#[cfg(feature = "http")]
use async_trait::async_trait;
#[cfg(feature = "http")]
use std::sync::Arc;

/// An asynchronous `<script>` element loading the provider library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptElement {
    pub src: Url,
    pub nonce: Option<String>,
    /// Global function the script calls once it has executed
    pub callback: String,
}

impl ScriptElement {
    pub fn new(src: Url, callback: impl Into<String>) -> Self {
        Self {
            src,
            nonce: None,
            callback: callback.into(),
        }
    }

    pub fn with_nonce(mut self, nonce: Option<String>) -> Self {
        self.nonce = nonce;
        self
    }

    /// Query parameter value of the script URL
    pub fn param(&self, name: &str) -> Option<String> {
        self.src
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// Libraries named in the `libraries` parameter
    pub fn libraries(&self) -> Vec<super::Library> {
        self.param("libraries")
            .map(|list| {
                list.split(',')
                    .filter(|name| !name.is_empty())
                    .map(super::Library::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn to_html(&self) -> String {
        match &self.nonce {
            Some(nonce) => format!(
                "<script async src=\"{}\" nonce=\"{}\"></script>",
                escape_html(self.src.as_str()),
                escape_html(nonce)
            ),
            None => format!(
                "<script async src=\"{}\"></script>",
                escape_html(self.src.as_str())
            ),
        }
    }
}

/// Fetches the script over HTTP before handing it to the wrapped host, so an
/// unreachable endpoint or a rejected key fails the load
#[cfg(feature = "http")]
pub struct CheckedScriptHost<H> {
    client: reqwest::Client,
    inner: H,
}

#[cfg(feature = "http")]
impl<H: ScriptHost> CheckedScriptHost<H> {
    pub fn new(inner: H) -> Self {
        Self {
            client: reqwest::Client::new(),
            inner,
        }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl<H: ScriptHost> ScriptHost for CheckedScriptHost<H> {
    fn existing_nonce(&self) -> Option<String> {
        self.inner.existing_nonce()
    }

    async fn inject(&self, script: ScriptElement) -> Result<Arc<dyn MapsProvider>> {
        let resp = self.client.get(script.src.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(MapError::Provider(format!("HTTP {}", resp.status())));
        }
        let body = resp.bytes().await?;
        log::debug!("fetched provider script ({} bytes)", body.len());
        self.inner.inject(script).await
    }
}
