//! Request and response types for the marketplace API.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ConnectError, Result};

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Pagination, sorting and filtering for list operations.
///
/// Every part is optional; an empty query sends no parameters at all.
/// Descending sort encodes as a `-` prefix on the field name, DRF style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_field: Option<String>,
    pub sort_order: SortOrder,
    /// Raw filter keys, passed through verbatim. Array values repeat the key.
    pub filter: BTreeMap<String, Value>,
}

impl ListQuery {
    /// Encode as request query parameters, in a stable order: `page`,
    /// `page_size`, `ordering`, then filter keys.
    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            params.push(("page_size".to_string(), page_size.to_string()));
        }
        if let Some(field) = &self.sort_field {
            let ordering = match self.sort_order {
                SortOrder::Asc => field.clone(),
                SortOrder::Desc => format!("-{field}"),
            };
            params.push(("ordering".to_string(), ordering));
        }
        for (key, value) in &self.filter {
            match value {
                Value::Array(items) => {
                    for item in items {
                        params.push((key.clone(), scalar_param(item)));
                    }
                }
                other => params.push((key.clone(), scalar_param(other))),
            }
        }
        params
    }
}

/// Query-parameter rendering of a filter value. Strings go bare; everything
/// else uses its JSON text.
fn scalar_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Primary key of a record. The backend issues integers; imported fixtures
/// use opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl RecordId {
    pub(crate) fn to_value(&self) -> Value {
        match self {
            Self::Int(id) => Value::from(*id),
            Self::Str(id) => Value::from(id.as_str()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

/// A single entity instance: an open field map with a required `id`.
///
/// The `id` requirement is enforced here, at the adapter boundary, so
/// screens never see a record they cannot address.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    fields: Map<String, Value>,
}

impl Record {
    /// Validate a decoded body as a record.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(ConnectError::invalid_record("expected a JSON object"));
        };
        let id = match fields.get("id") {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(int) => RecordId::Int(int),
                None => RecordId::Str(n.to_string()),
            },
            Some(Value::String(s)) => RecordId::Str(s.clone()),
            Some(_) => {
                return Err(ConnectError::invalid_record(
                    "record `id` must be a number or string",
                ))
            }
            None => return Err(ConnectError::invalid_record("record is missing `id`")),
        };
        Ok(Self { id, fields })
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Normalized list envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub data: Vec<Record>,
    pub total: u64,
}

/// The two body shapes the backend emits for list endpoints: a DRF
/// paginated envelope, or a bare array from the unpaginated views.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawListBody {
    Paginated {
        results: Vec<Value>,
        count: Option<u64>,
    },
    Bare(Vec<Value>),
}

impl RawListBody {
    /// Normalize to `{data, total}`. `total` falls back to the array length
    /// when `count` is absent.
    pub(crate) fn normalize(self) -> Result<ListPage> {
        let (values, count) = match self {
            Self::Paginated { results, count } => (results, count),
            Self::Bare(values) => (values, None),
        };
        let total = count.unwrap_or(values.len() as u64);
        let data = values
            .into_iter()
            .map(Record::from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(ListPage { data, total })
    }
}

/// A file attached to a draft field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A declared draft field: a plain JSON value or a file upload.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftField {
    Json(Value),
    File(FileUpload),
}

/// Create/update input.
///
/// Field types are declared when the draft is built, so whether the request
/// body is JSON or multipart is a property of the draft itself rather than
/// of runtime type sniffing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordDraft {
    fields: BTreeMap<String, DraftField>,
}

impl RecordDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain JSON field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), DraftField::Json(value.into()));
        self
    }

    /// Add a file field. One file field anywhere switches the whole body to
    /// multipart.
    pub fn file(mut self, name: impl Into<String>, upload: FileUpload) -> Self {
        self.fields.insert(name.into(), DraftField::File(upload));
        self
    }

    /// True when any field carries a file. Every field is inspected, not a
    /// declared subset.
    pub fn has_file(&self) -> bool {
        self.fields
            .values()
            .any(|field| matches!(field, DraftField::File(_)))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn fields(&self) -> &BTreeMap<String, DraftField> {
        &self.fields
    }

    /// JSON object body for the non-multipart path. File fields never reach
    /// this: the client checks [`has_file`](Self::has_file) first.
    pub(crate) fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (name, field) in &self.fields {
            if let DraftField::Json(value) = field {
                object.insert(name.clone(), value.clone());
            }
        }
        Value::Object(object)
    }
}

/// Account role issued by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    Vendor,
    Customer,
    /// Role string this client does not know; preserved, not rejected.
    Other(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "admin" => Self::Admin,
            "vendor" => Self::Vendor,
            "customer" => Self::Customer,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Vendor => "vendor",
            Self::Customer => "customer",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
