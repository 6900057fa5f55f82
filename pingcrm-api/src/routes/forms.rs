/// Request parsing shared by the resource handlers
///
/// Form bodies are JSON sent by the client's form helper, which is loose about
/// types: blank inputs arrive as `""` or `null`, checkboxes as booleans or
/// `"1"`/`"0"`, selects as numbers or numeric strings. The deserializers here
/// normalize all of that before validation runs.

use axum::{
    extract::{FromRequest, FromRequestParts, Query},
    http::request::Parts,
};
use pingcrm_shared::{
    models::non_empty,
    query::{ListFilters, TrashedFilter},
};
use serde::{de, Deserialize, Deserializer};

use crate::error::AppError;

/// JSON body extractor whose rejection is an [`AppError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct FormJson<T>(pub T);

/// Required text: `null` or absent becomes `""` so that validation reports it
pub fn required_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|v| v.trim().to_string()).unwrap_or_default())
}

/// Like [`required_text`] but keeps surrounding whitespace, for passwords
pub fn untrimmed_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Optional text: blank becomes `None`
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_empty(Option::<String>::deserialize(deserializer)?))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Checkbox value: `true`/`false`, `1`/`0` or `"1"`/`"0"`
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Loose>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Loose::Bool(b)) => Ok(b),
        Some(Loose::Int(n)) => Ok(n != 0),
        Some(Loose::Text(s)) => match s.trim() {
            "1" | "true" | "on" => Ok(true),
            "0" | "false" | "off" | "" => Ok(false),
            other => Err(de::Error::custom(format!("invalid flag value {other:?}"))),
        },
    }
}

/// Select value holding a row id: a number, a numeric string, `""` or `null`
///
/// `0` and blank mean no selection.
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match Option::<Loose>::deserialize(deserializer)? {
        None => None,
        Some(Loose::Int(n)) => Some(n),
        Some(Loose::Text(s)) if s.trim().is_empty() => None,
        Some(Loose::Text(s)) => Some(
            s.trim()
                .parse::<i64>()
                .map_err(|_| de::Error::custom(format!("invalid id {s:?}")))?,
        ),
        Some(Loose::Bool(_)) => return Err(de::Error::custom("invalid id: expected a number")),
    };

    Ok(id.filter(|id| *id != 0))
}

/// Query string of the list pages: `?search=&trashed=&page=`
///
/// A repeated key keeps its first value and unknown keys are ignored, so no
/// query string is ever rejected.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub trashed: TrashedFilter,
    pub page: Option<String>,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state).await?;
        Ok(Self::from_pairs(pairs))
    }
}

impl ListQuery {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut search = None;
        let mut trashed = None;
        let mut page = None;

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "search" => &mut search,
                "trashed" => &mut trashed,
                "page" => &mut page,
                _ => continue,
            };
            slot.get_or_insert(value);
        }

        Self {
            search,
            trashed: trashed.as_deref().map(TrashedFilter::parse).unwrap_or_default(),
            page,
        }
    }

    pub fn filters(&self) -> ListFilters {
        let search = self.search.as_deref().map(str::trim).unwrap_or_default();
        ListFilters::new(search, self.trashed)
    }

    /// Requested page; anything unparsable or below 1 is page 1
    pub fn page(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

/// `path` plus the active filters, the base of every pagination link
pub fn list_base_url(path: &str, filters: &ListFilters) -> String {
    let pairs = filters.query_pairs();
    if pairs.is_empty() {
        return path.to_string();
    }

    let query = pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{path}?{query}")
}
