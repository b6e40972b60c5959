/// Query Module
///
/// Value objects passed into and returned from `Connection::execute`: the
/// caller-filled [`Query`], the normalized [`QueryResult`] and the [`RowSet`]
/// payload of successful reads.

use super::drivers::FetchedRows;
use serde_json::{Map, Value};

/// Code carried by every successful result
pub const SUCCESS_CODE: i32 = 0;
/// Code for queries rejected before reaching the engine
pub const INVALID_QUERY_CODE: i32 = -1;

/// Whether a query reads rows or modifies data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Read,
    Write,
}

/// Shape of fetched rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorShape {
    /// Rows as positional value sequences
    #[default]
    Plain,
    /// Rows keyed by column name
    KeyedRows,
}

/// How many rows a read is expected to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// At most one row
    One,
    /// A bounded batch of rows
    Many,
    /// The full result set
    All,
}

/// A query to run on a connection.
///
/// The text is executed as-is; building it is the caller's job.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub text: String,
    pub kind: Option<QueryKind>,
    pub cursor_shape: CursorShape,
    /// Required for reads, ignored for writes
    pub cardinality: Option<Cardinality>,
    /// Caller-defined side information, never interpreted by the connector
    pub extra: Map<String, Value>,
}

impl Query {
    pub fn read(text: impl Into<String>, cardinality: Cardinality) -> Self {
        Query {
            text: text.into(),
            kind: Some(QueryKind::Read),
            cardinality: Some(cardinality),
            ..Query::default()
        }
    }

    pub fn write(text: impl Into<String>) -> Self {
        Query {
            text: text.into(),
            kind: Some(QueryKind::Write),
            ..Query::default()
        }
    }

    pub fn with_cursor_shape(mut self, shape: CursorShape) -> Self {
        self.cursor_shape = shape;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Checks the query is complete enough to run.
    ///
    /// Returns the validated kind, or a description of what is missing.
    pub fn validate(&self) -> Result<QueryKind, String> {
        if self.text.trim().is_empty() {
            return Err("Empty query string found. Skipped.".to_string());
        }
        match self.kind {
            None => Err("Query kind is not set. Expected Read or Write.".to_string()),
            Some(QueryKind::Read) if self.cardinality.is_none() => {
                Err("Read query requires a cardinality (One, Many or All).".to_string())
            }
            Some(kind) => Ok(kind),
        }
    }
}

/// Rows returned by a successful read.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSet {
    Plain {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    Keyed(Vec<Map<String, Value>>),
}

impl RowSet {
    /// Arranges fetched rows in the requested shape.
    ///
    /// Keyed rows use the column name as key; when a name repeats, the
    /// rightmost column wins.
    pub fn from_fetched(fetched: FetchedRows, shape: CursorShape) -> Self {
        match shape {
            CursorShape::Plain => RowSet::Plain {
                columns: fetched.columns,
                rows: fetched.rows,
            },
            CursorShape::KeyedRows => {
                let columns = fetched.columns;
                let rows = fetched
                    .rows
                    .into_iter()
                    .map(|row| columns.iter().cloned().zip(row).collect())
                    .collect();
                RowSet::Keyed(rows)
            }
        }
    }

    pub fn shape(&self) -> CursorShape {
        match self {
            RowSet::Plain { .. } => CursorShape::Plain,
            RowSet::Keyed(_) => CursorShape::KeyedRows,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RowSet::Plain { rows, .. } => rows.len(),
            RowSet::Keyed(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalized outcome of a connection operation.
///
/// `code` is zero exactly when the operation succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub code: i32,
    pub message: String,
    /// Populated for successful reads only
    pub rows: Option<RowSet>,
    pub extra: Option<Map<String, Value>>,
}

impl QueryResult {
    pub fn success(message: impl Into<String>) -> Self {
        QueryResult {
            code: SUCCESS_CODE,
            message: message.into(),
            rows: None,
            extra: None,
        }
    }

    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        QueryResult {
            code,
            message: message.into(),
            rows: None,
            extra: None,
        }
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::failure(INVALID_QUERY_CODE, message)
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    pub fn with_rows(mut self, rows: RowSet) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Looks up a side-channel entry
    pub fn extra_value(&self, key: &str) -> Option<&Value> {
        self.extra.as_ref()?.get(key)
    }

    pub fn row_count(&self) -> usize {
        self.rows.as_ref().map_or(0, RowSet::len)
    }
}
