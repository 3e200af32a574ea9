//! Pagination types
//!
//! Defines the page envelope and the per-strategy request types.

use crate::error::{Error, Result};
use crate::types::{lookup_path, scalar_to_string, Record, StringMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where items, next cursor and total count live in a response body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeLayout {
    /// Path to the items array; `None` means the body itself is the array
    #[serde(default)]
    pub items_path: Option<String>,
    /// Path to the next-page cursor
    #[serde(default)]
    pub next_cursor_path: Option<String>,
    /// Path to the total item count
    #[serde(default)]
    pub total_path: Option<String>,
}

impl EnvelopeLayout {
    /// Body is a bare array of items
    pub fn bare_array() -> Self {
        Self::default()
    }

    /// Items under `items_path`
    pub fn items(items_path: impl Into<String>) -> Self {
        Self {
            items_path: Some(items_path.into()),
            ..Self::default()
        }
    }

    /// Set the next cursor path
    #[must_use]
    pub fn with_next_cursor(mut self, path: impl Into<String>) -> Self {
        self.next_cursor_path = Some(path.into());
        self
    }

    /// Set the total count path
    #[must_use]
    pub fn with_total(mut self, path: impl Into<String>) -> Self {
        self.total_path = Some(path.into());
        self
    }
}

/// One page of a collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageEnvelope {
    /// Records on this page, in provider order
    pub items: Vec<Record>,
    /// Opaque reference to the next page
    pub next_cursor: Option<String>,
    /// Total number of items in the collection, when reported
    pub total_count: Option<u64>,
}

impl PageEnvelope {
    /// A page without cursor or total
    pub fn new(items: Vec<Record>) -> Self {
        Self {
            items,
            next_cursor: None,
            total_count: None,
        }
    }

    /// Set the next cursor
    #[must_use]
    pub fn with_next_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.next_cursor = Some(cursor.into());
        self
    }

    /// Set the total count
    #[must_use]
    pub fn with_total(mut self, total: u64) -> Self {
        self.total_count = Some(total);
        self
    }

    /// Parse a response body according to `layout`.
    ///
    /// An empty string cursor counts as no cursor. Totals may be numbers or
    /// numeric strings.
    pub fn from_value(body: &Value, layout: &EnvelopeLayout) -> Result<Self> {
        let items = match &layout.items_path {
            Some(path) => lookup_path(body, path),
            None => Some(body),
        };
        let items = match items {
            Some(Value::Array(items)) => items.clone(),
            _ => {
                return Err(Error::protocol(format!(
                    "expected an items array at '{}'",
                    layout.items_path.as_deref().unwrap_or("$")
                )))
            }
        };

        let next_cursor = layout
            .next_cursor_path
            .as_deref()
            .and_then(|path| lookup_path(body, path))
            .and_then(scalar_to_string)
            .filter(|cursor| !cursor.is_empty());

        let total_count = layout
            .total_path
            .as_deref()
            .and_then(|path| lookup_path(body, path))
            .and_then(|total| match total {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            });

        Ok(Self {
            items,
            next_cursor,
            total_count,
        })
    }

    /// Parse an optional embedded page (e.g. a connection nested in a profile).
    /// Absent and `null` both mean "no page".
    pub fn from_optional(body: Option<&Value>, layout: &EnvelopeLayout) -> Result<Option<Self>> {
        match body {
            None | Some(Value::Null) => Ok(None),
            Some(body) => Self::from_value(body, layout).map(Some),
        }
    }
}

/// Where a cursor-link walk starts
#[derive(Debug, Clone, PartialEq)]
pub enum CursorLinkSource {
    /// A first page already in hand (possibly absent)
    Embedded(Option<PageEnvelope>),
    /// Fetch the first page from this path
    Path {
        /// Resource path
        path: String,
        /// Base query parameters
        query: StringMap,
    },
}

/// Offset/count fan-out over one collection
#[derive(Debug, Clone, PartialEq)]
pub struct FanOutRequest {
    /// Resource path
    pub path: String,
    /// Base query parameters
    pub query: StringMap,
    /// Known total; `None` means probe for it first
    pub total: Option<u64>,
    /// First offset to fetch
    pub offset: u64,
}

impl FanOutRequest {
    /// Fan out over `path` with the given total (`None` = unknown)
    pub fn new(path: impl Into<String>, total: Option<u64>) -> Self {
        Self {
            path: path.into(),
            query: StringMap::new(),
            total,
            offset: 0,
        }
    }

    /// Add a base query parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Start at a different offset
    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }
}

/// Reverse-chronological walk by item identifier
#[derive(Debug, Clone, PartialEq)]
pub struct CursorWalkRequest {
    /// Resource path
    pub path: String,
    /// Base query parameters (typically the subject id)
    pub query: StringMap,
    /// Nominal batch size
    pub batch_size: u64,
    /// Stop once this many items have been collected
    pub target_count: u64,
    /// Query parameter carrying the upper-bound cursor
    pub cursor_param: String,
    /// Query parameter carrying the requested count
    pub count_param: String,
    /// Item field holding the identifier used as the next cursor
    pub cursor_field: String,
}

impl CursorWalkRequest {
    /// Walk `path` with `max_id`/`count` parameters and `id_str` identifiers
    pub fn new(path: impl Into<String>, batch_size: u64, target_count: u64) -> Self {
        Self {
            path: path.into(),
            query: StringMap::new(),
            batch_size,
            target_count,
            cursor_param: "max_id".to_string(),
            count_param: "count".to_string(),
            cursor_field: "id_str".to_string(),
        }
    }

    /// Add a base query parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Use a different cursor parameter
    #[must_use]
    pub fn with_cursor_param(mut self, param: impl Into<String>) -> Self {
        self.cursor_param = param.into();
        self
    }

    /// Use a different count parameter
    #[must_use]
    pub fn with_count_param(mut self, param: impl Into<String>) -> Self {
        self.count_param = param.into();
        self
    }

    /// Read identifiers from a different item field
    #[must_use]
    pub fn with_cursor_field(mut self, field: impl Into<String>) -> Self {
        self.cursor_field = field.into();
        self
    }
}

/// One sub-collection request, tagged by strategy
#[derive(Debug, Clone, PartialEq)]
pub enum PaginationRequest {
    /// Follow next-page links
    CursorLink(CursorLinkSource),
    /// Probe for the total, then fetch offset batches concurrently
    BatchFanOut(FanOutRequest),
    /// Walk backwards by identifier up to a target count
    CursorWalk(CursorWalkRequest),
}

impl PaginationRequest {
    /// Cursor-link walk from a page already in hand
    pub fn embedded(initial: Option<PageEnvelope>) -> Self {
        Self::CursorLink(CursorLinkSource::Embedded(initial))
    }

    /// Cursor-link walk starting with a fetch of `path`
    pub fn links_from(path: impl Into<String>, query: StringMap) -> Self {
        Self::CursorLink(CursorLinkSource::Path {
            path: path.into(),
            query,
        })
    }

    /// Strategy name, for logging
    pub fn strategy_name(&self) -> &'static str {
        match self {
            Self::CursorLink(_) => "cursor_link",
            Self::BatchFanOut(_) => "batch_fan_out",
            Self::CursorWalk(_) => "cursor_walk",
        }
    }
}

impl From<FanOutRequest> for PaginationRequest {
    fn from(request: FanOutRequest) -> Self {
        Self::BatchFanOut(request)
    }
}

impl From<CursorWalkRequest> for PaginationRequest {
    fn from(request: CursorWalkRequest) -> Self {
        Self::CursorWalk(request)
    }
}
