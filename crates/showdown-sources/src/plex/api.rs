use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::SourceError;

const TMDB_GUID_PREFIX: &str = "tmdb://";

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryInfo {
    pub key: String,
    pub type_: String,
    pub title: String,
}

pub struct PlexHttpClient {
    client: Client,
    server_url: String,
}

impl PlexHttpClient {
    pub fn new(token: String, server_url: String, timeout_secs: u64) -> Result<Self, SourceError> {
        let client = Client::builder()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-token"),
                    reqwest::header::HeaderValue::from_str(&token)
                        .map_err(|_| SourceError::InvalidToken)?,
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-client-identifier"),
                    reqwest::header::HeaderValue::from_static("showdown-cli"),
                );
                headers
            })
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, url: &str) -> Result<Value, SourceError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    pub async fn get_libraries(&self) -> Result<Vec<LibraryInfo>, SourceError> {
        let url = format!("{}/library/sections", self.server_url);
        let json = self.get_json(&url).await?;
        let libraries = parse_libraries(&json);
        debug!("Plex: found {} library sections", libraries.len());
        Ok(libraries)
    }

    /// All TMDB ids of one library section, via `includeGuids=1`
    pub async fn get_library_tmdb_ids(&self, library_key: &str) -> Result<Vec<String>, SourceError> {
        let url = format!(
            "{}/library/sections/{}/all?includeGuids=1",
            self.server_url, library_key
        );
        let json = self.get_json(&url).await?;
        if json.get("MediaContainer").is_none() {
            return Err(SourceError::UnexpectedResponse(url));
        }
        Ok(extract_tmdb_ids(&json))
    }
}

pub fn parse_libraries(json: &Value) -> Vec<LibraryInfo> {
    let mut libraries = Vec::new();
    if let Some(dir_array) = json
        .get("MediaContainer")
        .and_then(|mc| mc.get("Directory"))
        .and_then(|d| d.as_array())
    {
        for dir in dir_array {
            let text = |field: &str| {
                dir.get(field)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string()
            };
            let key = text("key");
            if key.is_empty() {
                continue;
            }
            libraries.push(LibraryInfo {
                key,
                type_: text("type"),
                title: text("title"),
            });
        }
    }
    libraries
}

/// Pull `tmdb://<id>` guids out of a `MediaContainer.Metadata` listing
pub fn extract_tmdb_ids(json: &Value) -> Vec<String> {
    let Some(items) = json
        .get("MediaContainer")
        .and_then(|mc| mc.get("Metadata"))
        .and_then(|m| m.as_array())
    else {
        debug!("Plex: no Metadata array in library listing");
        return Vec::new();
    };

    let mut ids = Vec::new();
    let mut without_tmdb = 0;
    for item in items {
        let before = ids.len();
        for guid in guid_values(item.get("Guid").unwrap_or(&Value::Null)) {
            if let Some(id) = guid.strip_prefix(TMDB_GUID_PREFIX) {
                if !id.is_empty() {
                    ids.push(id.to_string());
                }
            }
        }
        if ids.len() == before {
            without_tmdb += 1;
        }
    }
    if without_tmdb > 0 {
        debug!("Plex: {} library items carry no TMDB guid", without_tmdb);
    }
    ids
}

// Guid shows up as an array of objects, a single object, or bare strings
fn guid_values(guid_value: &Value) -> Vec<&str> {
    match guid_value {
        Value::Array(items) => items
            .iter()
            .filter_map(|g| g.get("id").and_then(|i| i.as_str()).or_else(|| g.as_str()))
            .collect(),
        Value::Object(obj) => obj.get("id").and_then(|i| i.as_str()).into_iter().collect(),
        Value::String(s) => vec![s.as_str()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_libraries() {
        let payload = json!({
            "MediaContainer": {
                "Directory": [
                    {"key": "1", "type": "movie", "title": "Movies"},
                    {"key": "2", "type": "show", "title": "TV Shows"},
                    {"type": "movie", "title": "No Key"}
                ]
            }
        });
        let libraries = parse_libraries(&payload);
        assert_eq!(libraries.len(), 2);
        assert_eq!(libraries[0].title, "Movies");
        assert_eq!(libraries[1].type_, "show");
    }

    #[test]
    fn test_extract_tmdb_ids_handles_guid_shapes() {
        let payload = json!({
            "MediaContainer": {
                "Metadata": [
                    {"title": "Heat", "Guid": [{"id": "imdb://tt0113277"}, {"id": "tmdb://949"}]},
                    {"title": "Thief", "Guid": {"id": "tmdb://11524"}},
                    {"title": "Ronin", "Guid": ["tmdb://8195"]},
                    {"title": "Local Rip", "Guid": [{"id": "local://42"}]},
                    {"title": "No Guid"}
                ]
            }
        });
        assert_eq!(extract_tmdb_ids(&payload), vec!["949", "11524", "8195"]);
    }

    #[test]
    fn test_extract_tmdb_ids_empty_container() {
        assert!(extract_tmdb_ids(&json!({"MediaContainer": {"size": 0}})).is_empty());
        assert!(extract_tmdb_ids(&json!({})).is_empty());
    }

    #[test]
    fn test_client_rejects_bad_token() {
        let result = PlexHttpClient::new("bad\ntoken".to_string(), "http://localhost:32400".to_string(), 5);
        assert!(matches!(result, Err(SourceError::InvalidToken)));
    }
}
