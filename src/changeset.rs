use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};

use crate::bounds::Bounds;
use crate::error::{Error, Result};
use crate::tag::Tag;

/// Compact bounding-box keys (`/changeset/{id}.json`) and their verbose
/// equivalents (`/changesets.json`).
const BOUNDS_ALIASES: [(&str, &str); 4] = [
    ("minlat", "min_lat"),
    ("minlon", "min_lon"),
    ("maxlat", "max_lat"),
    ("maxlon", "max_lon"),
];

/// One changeset as reported by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Changeset {
    pub osm_id: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub is_open: bool,
    /// Author display name.
    pub user: Option<String>,
    /// Author user id.
    pub uid: Option<u64>,
    pub bounds: Bounds,
    pub comments_count: u64,
    pub changes_count: u64,
    /// Tags in the order the API listed them.
    pub tags: Vec<Tag>,
}

/// Anything [`Changeset::normalize`] can read.
#[derive(Debug, Clone)]
pub enum ChangesetInput<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
    /// An already-decoded changeset object; used as-is.
    Value(Value),
}

impl<'a> From<&'a str> for ChangesetInput<'a> {
    fn from(text: &'a str) -> Self {
        ChangesetInput::Text(text)
    }
}

impl<'a> From<&'a String> for ChangesetInput<'a> {
    fn from(text: &'a String) -> Self {
        ChangesetInput::Text(text)
    }
}

impl<'a> From<&'a [u8]> for ChangesetInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ChangesetInput::Bytes(bytes)
    }
}

impl From<Value> for ChangesetInput<'_> {
    fn from(value: Value) -> Self {
        ChangesetInput::Value(value)
    }
}

impl From<Map<String, Value>> for ChangesetInput<'_> {
    fn from(map: Map<String, Value>) -> Self {
        ChangesetInput::Value(Value::Object(map))
    }
}

/// Top-level layout of a decoded document.
enum Shape {
    /// `{"elements": [changeset, ...]}`
    Elements(Vec<Value>),
    /// The document is the changeset.
    Bare(Map<String, Value>),
}

impl Shape {
    fn detect(document: Value) -> std::result::Result<Self, &'static str> {
        let Value::Object(mut object) = document else {
            return Err("top level is not a JSON object");
        };
        match object.remove("elements") {
            None => Ok(Shape::Bare(object)),
            Some(Value::Array(elements)) => Ok(Shape::Elements(elements)),
            Some(_) => Err("`elements` is not an array"),
        }
    }

    fn into_changeset(self) -> std::result::Result<Map<String, Value>, &'static str> {
        match self {
            Shape::Bare(object) => Ok(object),
            Shape::Elements(elements) => match elements.into_iter().next() {
                Some(Value::Object(object)) => Ok(object),
                Some(_) => Err("first entry of `elements` is not an object"),
                None => Err("`elements` is empty"),
            },
        }
    }
}

/// Field layout after key aliasing. Unknown keys (`type`, ...) are ignored.
#[derive(Debug, Deserialize)]
struct RawChangeset {
    id: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    closed_at: Option<DateTime<Utc>>,
    open: Option<bool>,
    user: Option<String>,
    uid: Option<u64>,
    min_lat: Option<f64>,
    min_lon: Option<f64>,
    max_lat: Option<f64>,
    max_lon: Option<f64>,
    comments_count: Option<u64>,
    changes_count: Option<u64>,
    tags: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct ChangesetList {
    changesets: Vec<Value>,
}

impl Changeset {
    /// Builds a changeset from any of the API's response layouts.
    ///
    /// Text and bytes are decoded once; an `elements` envelope yields its
    /// first entry, otherwise the document itself is the changeset. A decoded
    /// [`Value`] is taken to be the changeset object.
    pub fn normalize<'a>(input: impl Into<ChangesetInput<'a>>) -> Result<Self> {
        let object = match input.into() {
            ChangesetInput::Value(Value::Object(object)) => object,
            ChangesetInput::Value(other) => {
                return Err(Error::invalid_json(
                    "changeset is not a JSON object",
                    other.to_string(),
                ));
            }
            ChangesetInput::Text(text) => {
                let document = serde_json::from_str(text)
                    .map_err(|e| Error::invalid_json(e.to_string(), text))?;
                resolve(document, || text.to_string())?
            }
            ChangesetInput::Bytes(bytes) => {
                let lossy = || String::from_utf8_lossy(bytes).into_owned();
                let document = serde_json::from_slice(bytes)
                    .map_err(|e| Error::invalid_json(e.to_string(), lossy()))?;
                resolve(document, lossy)?
            }
        };

        Self::from_object(object)
    }

    /// Parses a `{"changesets": [...]}` list response.
    pub fn list_from_json(text: &str) -> Result<Vec<Self>> {
        let list: ChangesetList =
            serde_json::from_str(text).map_err(|e| Error::invalid_json(e.to_string(), text))?;
        list.changesets.into_iter().map(Changeset::normalize).collect()
    }

    /// Value of the tag `key`, if set.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.value.as_str())
    }

    /// Tags as one ordered JSON object.
    pub fn tags_map(&self) -> Map<String, Value> {
        self.tags.iter().flat_map(Tag::as_map).collect()
    }

    fn from_object(mut object: Map<String, Value>) -> Result<Self> {
        alias_bounds(&mut object);

        let value = Value::Object(object);
        let raw = RawChangeset::deserialize(&value)
            .map_err(|e| Error::invalid_json(e.to_string(), value.to_string()))?;

        Ok(Self {
            osm_id: raw.id,
            created_at: raw.created_at,
            closed_at: raw.closed_at,
            is_open: raw.open.unwrap_or(false),
            user: raw.user,
            uid: raw.uid,
            bounds: Bounds::from_parts(raw.min_lat, raw.min_lon, raw.max_lat, raw.max_lon),
            comments_count: raw.comments_count.unwrap_or(0),
            changes_count: raw.changes_count.unwrap_or(0),
            tags: raw
                .tags
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| Tag::from_entry(k, v))
                .collect(),
        })
    }
}

impl TryFrom<Value> for Changeset {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Changeset::normalize(value)
    }
}

impl std::str::FromStr for Changeset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Changeset::normalize(s)
    }
}

fn resolve(document: Value, raw: impl FnOnce() -> String) -> Result<Map<String, Value>> {
    Shape::detect(document)
        .and_then(Shape::into_changeset)
        .map_err(|reason| Error::invalid_json(reason, raw()))
}

fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_timestamp(&text)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 timestamp: {:?}", text)))
}

/// ISO-8601 date-time. No offset means UTC; a bare date means midnight UTC.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = text.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    text.parse::<NaiveDate>()
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// Compact keys win only when the verbose key is absent.
fn alias_bounds(object: &mut Map<String, Value>) {
    for (compact, verbose) in BOUNDS_ALIASES {
        if let Some(v) = object.remove(compact) {
            object.entry(verbose).or_insert(v);
        }
    }
}
