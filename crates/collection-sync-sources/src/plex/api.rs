use chrono::{DateTime, TimeZone, Utc};
use collection_sync_models::{Collection, CollectionMode, CollectionSort, LibraryKind, MediaItem};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::PlexError;

const CLIENT_IDENTIFIER: &str = "plex-collections";

/// Metadata type number of collections in edit queries
const COLLECTION_TYPE: u8 = 18;

#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub key: String,
    pub type_: String,
    pub title: String,
}

/// Thin wrapper over the server's REST endpoints. Every call is a single
/// request; responses are navigated as `serde_json::Value`.
pub struct PlexHttpClient {
    client: Client,
    base_url: String,
}

impl PlexHttpClient {
    pub fn new(token: &str, base_url: &str) -> Result<Self, PlexError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let valid = Url::parse(&base_url)
            .map(|url| url.has_host() && matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid {
            return Err(PlexError::InvalidUrl(base_url));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("x-plex-token"),
            HeaderValue::from_str(token)
                .map_err(|_| PlexError::Parse("token (not a valid header value)".to_string()))?,
        );
        headers.insert(
            HeaderName::from_static("x-plex-client-identifier"),
            HeaderValue::from_static(CLIENT_IDENTIFIER),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, context: &str) -> Result<Response, PlexError> {
        let response = request.send().await?;
        let status = response.status();
        trace!("Plex {}: HTTP {}", context, status);

        match status {
            s if s.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(PlexError::Unauthorized),
            StatusCode::NOT_FOUND => Err(PlexError::NotFound(context.to_string())),
            status => Err(PlexError::Http {
                status,
                context: context.to_string(),
            }),
        }
    }

    async fn get_json(&self, path: &str, context: &str) -> Result<Value, PlexError> {
        debug!("Plex GET {}", path);
        let response = self.send(self.client.get(self.url(path)), context).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| PlexError::Parse(format!("{} response: {}", context, e)))
    }

    /// Machine identifier of the server; also proves the token is accepted
    pub async fn identity(&self) -> Result<String, PlexError> {
        let json = self.get_json("/identity", "server identity").await?;
        json.get("MediaContainer")
            .and_then(|mc| as_string(mc.get("machineIdentifier")))
            .ok_or_else(|| PlexError::Parse("server identity: missing machineIdentifier".to_string()))
    }

    pub async fn sections(&self) -> Result<Vec<LibraryInfo>, PlexError> {
        let json = self.get_json("/library/sections", "library sections").await?;

        let libraries = entries(&json, "Directory")
            .iter()
            .filter_map(|dir| {
                Some(LibraryInfo {
                    key: as_string(dir.get("key"))?,
                    type_: as_string(dir.get("type")).unwrap_or_default(),
                    title: as_string(dir.get("title"))?,
                })
            })
            .collect();

        Ok(libraries)
    }

    /// Items of a section, optionally filtered by the server's title search
    pub async fn section_items(
        &self,
        section_key: &str,
        kind: LibraryKind,
        title: Option<&str>,
    ) -> Result<Vec<MediaItem>, PlexError> {
        let mut path = format!(
            "/library/sections/{}/all?type={}&includeGuids=1",
            section_key,
            kind.plex_type()
        );
        if let Some(title) = title {
            path.push_str(&format!("&title={}", urlencoding::encode(title)));
        }

        let json = self.get_json(&path, "library items").await?;
        let metadata = entries(&json, "Metadata");

        let items: Vec<MediaItem> = metadata.iter().filter_map(parse_media_item).collect();
        if items.len() < metadata.len() {
            debug!(
                "Plex section_items: skipped {} entries without ratingKey or title",
                metadata.len() - items.len()
            );
        }
        Ok(items)
    }

    pub async fn section_collections(&self, section_key: &str) -> Result<Vec<Collection>, PlexError> {
        let path = format!("/library/sections/{}/collections", section_key);
        let json = self.get_json(&path, "collections").await?;
        Ok(entries(&json, "Metadata").iter().filter_map(parse_collection).collect())
    }

    /// Full metadata of one collection, including labels and locked fields
    pub async fn collection_metadata(&self, rating_key: &str) -> Result<Collection, PlexError> {
        let path = format!("/library/metadata/{}", rating_key);
        let context = format!("collection {}", rating_key);
        let json = self.get_json(&path, &context).await?;
        entries(&json, "Metadata")
            .first()
            .and_then(parse_collection)
            .ok_or_else(|| PlexError::Parse(format!("{} metadata", context)))
    }

    pub async fn collection_children(&self, rating_key: &str) -> Result<Vec<MediaItem>, PlexError> {
        let path = format!("/library/collections/{}/children?includeGuids=1", rating_key);
        let json = self.get_json(&path, "collection items").await?;
        Ok(entries(&json, "Metadata").iter().filter_map(parse_media_item).collect())
    }

    pub async fn create_collection(
        &self,
        section_key: &str,
        kind: LibraryKind,
        title: &str,
        items_uri: &str,
    ) -> Result<Collection, PlexError> {
        let path = format!(
            "/library/collections?{}",
            query(&[
                ("type", &kind.plex_type().to_string()),
                ("title", title),
                ("smart", "0"),
                ("sectionId", section_key),
                ("uri", items_uri),
            ])
        );
        debug!("Plex POST {}", path);

        let context = format!("create collection \"{}\"", title);
        let response = self.send(self.client.post(self.url(&path)), &context).await?;
        let json: Value = response
            .json()
            .await
            .map_err(|e| PlexError::Parse(format!("{} response: {}", context, e)))?;

        entries(&json, "Metadata")
            .first()
            .and_then(parse_collection)
            .ok_or_else(|| PlexError::Parse(format!("{} response", context)))
    }

    pub async fn add_collection_items(&self, rating_key: &str, items_uri: &str) -> Result<(), PlexError> {
        let path = format!(
            "/library/collections/{}/items?{}",
            rating_key,
            query(&[("uri", items_uri)])
        );
        debug!("Plex PUT {}", path);
        self.send(self.client.put(self.url(&path)), "add collection items").await?;
        Ok(())
    }

    pub async fn remove_collection_item(&self, rating_key: &str, item_rating_key: &str) -> Result<(), PlexError> {
        let path = format!("/library/collections/{}/items/{}", rating_key, item_rating_key);
        debug!("Plex DELETE {}", path);
        self.send(self.client.delete(self.url(&path)), "remove collection item").await?;
        Ok(())
    }

    pub async fn delete_metadata(&self, rating_key: &str) -> Result<(), PlexError> {
        let path = format!("/library/metadata/{}", rating_key);
        debug!("Plex DELETE {}", path);
        self.send(self.client.delete(self.url(&path)), "delete collection").await?;
        Ok(())
    }

    /// Edit collection attributes through the section edit endpoint
    pub async fn edit_collection(
        &self,
        section_key: &str,
        rating_key: &str,
        params: &[(String, String)],
    ) -> Result<(), PlexError> {
        let pairs: Vec<(&str, &str)> = params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let path = format!(
            "/library/sections/{}/all?type={}&id={}&{}",
            section_key,
            COLLECTION_TYPE,
            rating_key,
            query(&pairs)
        );
        debug!("Plex PUT {}", path);
        self.send(self.client.put(self.url(&path)), "edit collection").await?;
        Ok(())
    }

    pub async fn set_pref(&self, rating_key: &str, name: &str, value: i32) -> Result<(), PlexError> {
        let path = format!("/library/metadata/{}/prefs?{}={}", rating_key, name, value);
        debug!("Plex PUT {}", path);
        self.send(self.client.put(self.url(&path)), "update collection preferences").await?;
        Ok(())
    }

    pub async fn upload_poster_url(&self, rating_key: &str, poster_url: &str) -> Result<(), PlexError> {
        let path = format!(
            "/library/metadata/{}/posters?{}",
            rating_key,
            query(&[("url", poster_url)])
        );
        debug!("Plex POST {}", path);
        self.send(self.client.post(self.url(&path)), "upload poster").await?;
        Ok(())
    }

    pub async fn upload_poster_bytes(&self, rating_key: &str, data: Vec<u8>) -> Result<(), PlexError> {
        let path = format!("/library/metadata/{}/posters", rating_key);
        debug!("Plex POST {} ({} bytes)", path, data.len());
        self.send(self.client.post(self.url(&path)).body(data), "upload poster").await?;
        Ok(())
    }
}

/// Percent-encode a list of query pairs
pub(crate) fn query(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn entries<'a>(json: &'a Value, key: &str) -> &'a [Value] {
    json.get("MediaContainer")
        .and_then(|mc| mc.get(key))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

// The server is inconsistent about number vs string encoding across versions.

fn as_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn tags(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(|tag| as_string(tag.get("tag")))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_guid_array(guid_value: Option<&Value>) -> Vec<String> {
    match guid_value {
        Some(Value::Array(guids)) => guids
            .iter()
            .filter_map(|guid| as_string(guid.get("id")).or_else(|| guid.as_str().map(str::to_string)))
            .collect(),
        Some(Value::Object(guid)) => guid.get("id").and_then(Value::as_str).map(str::to_string).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn parse_timestamp(timestamp: Option<&Value>) -> Option<DateTime<Utc>> {
    as_i64(timestamp).and_then(|ts| Utc.timestamp_opt(ts, 0).single())
}

pub(crate) fn parse_media_item(item: &Value) -> Option<MediaItem> {
    let mut media = MediaItem::new(
        as_string(item.get("ratingKey"))?,
        as_string(item.get("guid")).unwrap_or_default(),
        as_string(item.get("title"))?,
    );
    media.guids = parse_guid_array(item.get("Guid"));
    media.year = as_i64(item.get("year")).and_then(|y| u32::try_from(y).ok());
    media.title_sort = as_string(item.get("titleSort"));
    media.content_rating = as_string(item.get("contentRating"));
    media.summary = as_string(item.get("summary")).filter(|s| !s.is_empty());
    media.studio = as_string(item.get("studio"));
    media.originally_available_at = as_string(item.get("originallyAvailableAt"));
    media.genres = tags(item.get("Genre"));
    media.labels = tags(item.get("Label"));
    media.added_at = parse_timestamp(item.get("addedAt"));
    Some(media)
}

pub(crate) fn parse_collection(item: &Value) -> Option<Collection> {
    let mut collection = Collection::new(as_string(item.get("ratingKey"))?, as_string(item.get("title"))?);
    collection.smart = as_flag(item.get("smart"));
    collection.title_sort = as_string(item.get("titleSort"));
    collection.content_rating = as_string(item.get("contentRating"));
    collection.summary = as_string(item.get("summary")).filter(|s| !s.is_empty());
    collection.labels = tags(item.get("Label"));
    collection.mode = as_i64(item.get("collectionMode")).and_then(CollectionMode::from_plex_value);
    collection.sort = as_i64(item.get("collectionSort")).and_then(CollectionSort::from_plex_value);
    collection.locked_fields = item
        .get("Field")
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .filter(|field| as_flag(field.get("locked")))
                .filter_map(|field| as_string(field.get("name")))
                .collect()
        })
        .unwrap_or_default();
    Some(collection)
}
