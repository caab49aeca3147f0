//! Script URL construction
//!
//! Configuration keys are camelCase in [`LoaderConfig`]; the provider expects
//! snake_case query parameters, so every uppercase letter becomes `_`
//! followed by its lowercase form (`mapIds` → `map_ids`).

use super::Library;
use crate::{core::config::LoaderConfig, Result};
use serde_json::Value;
use url::Url;

pub fn camel_to_snake(key: &str) -> String {
    let mut snake = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            snake.push('_');
            snake.push(c.to_ascii_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// Wire form of a config value; `None` for values that are not sent
fn param_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(param_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

/// Query parameters for a script request, in wire order
pub fn query_pairs(config: &LoaderConfig, libraries: &[Library]) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();

    if let Value::Object(fields) = serde_json::to_value(config)? {
        for (key, value) in &fields {
            if let Some(value) = param_value(value) {
                pairs.push((camel_to_snake(key), value));
            }
        }
    }

    if !libraries.is_empty() {
        let names: Vec<&str> = libraries.iter().map(Library::as_str).collect();
        pairs.push(("libraries".to_string(), names.join(",")));
    }

    pairs.push(("callback".to_string(), config.callback.clone()));
    Ok(pairs)
}

pub fn script_url(config: &LoaderConfig, libraries: &[Library]) -> Result<Url> {
    let mut url = Url::parse(&config.endpoint)?;
    url.query_pairs_mut()
        .extend_pairs(query_pairs(config, libraries)?);
    Ok(url)
}

/// The URL as text with the API key masked, for logs
pub fn redact_key(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" { "***".into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn params(url: &Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("mapIds"), "map_ids");
        assert_eq!(camel_to_snake("authReferrerPolicy"), "auth_referrer_policy");
        assert_eq!(camel_to_snake("v"), "v");
        assert_eq!(camel_to_snake("already_snake"), "already_snake");
    }

    #[test]
    fn test_script_url_parameters() {
        let mut config = LoaderConfig::default().with_key("secret");
        config.map_ids = vec!["a".into(), "b".into()];
        config.auth_referrer_policy = Some("origin".into());
        config
            .extra
            .insert("solutionChannelId".into(), Value::String("x".into()));

        let url = script_url(&config, &[Library::Maps, Library::Marker]).unwrap();
        assert_eq!(url.host_str(), Some("maps.googleapis.com"));
        assert_eq!(url.path(), "/maps/api/js");

        let params = params(&url);
        assert_eq!(params["key"], "secret");
        assert_eq!(params["v"], "weekly");
        assert_eq!(params["map_ids"], "a,b");
        assert_eq!(params["auth_referrer_policy"], "origin");
        assert_eq!(params["solution_channel_id"], "x");
        assert_eq!(params["libraries"], "maps,marker");
        assert_eq!(params["callback"], "initMap");
        assert!(!params.contains_key("endpoint"));
        assert!(!params.contains_key("language"));
    }

    #[test]
    fn test_no_libraries_parameter_when_empty() {
        let url = script_url(&LoaderConfig::default(), &[]).unwrap();
        assert!(!params(&url).contains_key("libraries"));
    }

    #[test]
    fn test_redact_key() {
        let config = LoaderConfig::default().with_key("secret");
        let url = script_url(&config, &[]).unwrap();
        let redacted = redact_key(&url);
        assert!(!redacted.contains("secret"));
        assert!(redacted.contains("key=***") || redacted.contains("key=%2A%2A%2A"));
    }
}
