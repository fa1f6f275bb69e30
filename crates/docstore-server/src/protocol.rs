//! Request and response messages.
//!
//! A request is a flat JSON object naming a `cmd` plus whichever optional
//! fields that command needs. It is validated into a typed [`Command`]
//! before dispatch.

use docstore_core::{CollectionConfig, Document, QueryParams};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CMD_CREATE_COLLECTION: &str = "CreateCollection";
pub const CMD_GET_COLLECTION: &str = "GetCollection";
pub const CMD_DELETE_COLLECTION: &str = "DeleteCollection";
pub const CMD_LIST_COLLECTIONS: &str = "ListCollections";
pub const CMD_PUT: &str = "Put";
pub const CMD_GET: &str = "Get";
pub const CMD_DELETE: &str = "Delete";
pub const CMD_LIST: &str = "List";
pub const CMD_CREATE_INDEX: &str = "CreateIndex";
pub const CMD_DELETE_INDEX: &str = "DeleteIndex";
pub const CMD_QUERY: &str = "Query";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub cmd: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<CollectionConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<QueryParams>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Vec<Document>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub fn with_doc(doc: Document) -> Self {
        Self {
            doc: Some(doc),
            ..Self::ok()
        }
    }

    pub fn with_docs(docs: Vec<Document>) -> Self {
        Self {
            docs: Some(docs),
            ..Self::ok()
        }
    }

    pub fn with_names(names: Vec<String>) -> Self {
        Self {
            names: Some(names),
            ..Self::ok()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            err: Some(message.into()),
            ..Self::default()
        }
    }
}

/// A request that names a known command but cannot be executed as sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("{cmd}: missing field `{field}`")]
    MissingField { cmd: &'static str, field: &'static str },
}

/// A validated request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `config` stays optional here; the store rejects a missing one.
    CreateCollection {
        name: String,
        config: Option<CollectionConfig>,
    },
    GetCollection {
        name: String,
    },
    DeleteCollection {
        name: String,
    },
    ListCollections,
    Put {
        collection: String,
        doc: Document,
    },
    Get {
        collection: String,
        key: String,
    },
    Delete {
        collection: String,
        key: String,
    },
    List {
        collection: String,
    },
    CreateIndex {
        collection: String,
        field_name: String,
    },
    DeleteIndex {
        collection: String,
        field_name: String,
    },
    Query {
        collection: String,
        field_name: String,
        params: QueryParams,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateCollection { .. } => CMD_CREATE_COLLECTION,
            Self::GetCollection { .. } => CMD_GET_COLLECTION,
            Self::DeleteCollection { .. } => CMD_DELETE_COLLECTION,
            Self::ListCollections => CMD_LIST_COLLECTIONS,
            Self::Put { .. } => CMD_PUT,
            Self::Get { .. } => CMD_GET,
            Self::Delete { .. } => CMD_DELETE,
            Self::List { .. } => CMD_LIST,
            Self::CreateIndex { .. } => CMD_CREATE_INDEX,
            Self::DeleteIndex { .. } => CMD_DELETE_INDEX,
            Self::Query { .. } => CMD_QUERY,
        }
    }

    /// Whether executing the command can change the store.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateCollection { .. }
                | Self::DeleteCollection { .. }
                | Self::Put { .. }
                | Self::Delete { .. }
                | Self::CreateIndex { .. }
                | Self::DeleteIndex { .. }
        )
    }
}

fn required<T>(value: Option<T>, cmd: &'static str, field: &'static str) -> Result<T, RequestError> {
    value.ok_or(RequestError::MissingField { cmd, field })
}

impl TryFrom<Request> for Command {
    type Error = RequestError;

    fn try_from(req: Request) -> Result<Self, RequestError> {
        let command = match req.cmd.trim() {
            CMD_CREATE_COLLECTION => Self::CreateCollection {
                name: required(req.name, CMD_CREATE_COLLECTION, "name")?,
                config: req.config,
            },
            CMD_GET_COLLECTION => Self::GetCollection {
                name: required(req.name, CMD_GET_COLLECTION, "name")?,
            },
            CMD_DELETE_COLLECTION => Self::DeleteCollection {
                name: required(req.name, CMD_DELETE_COLLECTION, "name")?,
            },
            CMD_LIST_COLLECTIONS => Self::ListCollections,
            CMD_PUT => Self::Put {
                collection: required(req.collection, CMD_PUT, "collection")?,
                doc: required(req.doc, CMD_PUT, "doc")?,
            },
            CMD_GET => Self::Get {
                collection: required(req.collection, CMD_GET, "collection")?,
                key: required(req.key, CMD_GET, "key")?,
            },
            CMD_DELETE => Self::Delete {
                collection: required(req.collection, CMD_DELETE, "collection")?,
                key: required(req.key, CMD_DELETE, "key")?,
            },
            CMD_LIST => Self::List {
                collection: required(req.collection, CMD_LIST, "collection")?,
            },
            CMD_CREATE_INDEX => Self::CreateIndex {
                collection: required(req.collection, CMD_CREATE_INDEX, "collection")?,
                field_name: required(req.field_name, CMD_CREATE_INDEX, "field_name")?,
            },
            CMD_DELETE_INDEX => Self::DeleteIndex {
                collection: required(req.collection, CMD_DELETE_INDEX, "collection")?,
                field_name: required(req.field_name, CMD_DELETE_INDEX, "field_name")?,
            },
            CMD_QUERY => Self::Query {
                collection: required(req.collection, CMD_QUERY, "collection")?,
                field_name: required(req.field_name, CMD_QUERY, "field_name")?,
                params: req.params.unwrap_or_default(),
            },
            other => return Err(RequestError::UnknownCommand(other.to_owned())),
        };
        Ok(command)
    }
}

impl From<Command> for Request {
    fn from(command: Command) -> Self {
        let cmd = command.name().to_owned();
        match command {
            Command::CreateCollection { name, config } => Self {
                cmd,
                name: Some(name),
                config,
                ..Self::default()
            },
            Command::GetCollection { name } | Command::DeleteCollection { name } => Self {
                cmd,
                name: Some(name),
                ..Self::default()
            },
            Command::ListCollections => Self {
                cmd,
                ..Self::default()
            },
            Command::Put { collection, doc } => Self {
                cmd,
                collection: Some(collection),
                doc: Some(doc),
                ..Self::default()
            },
            Command::Get { collection, key } | Command::Delete { collection, key } => Self {
                cmd,
                collection: Some(collection),
                key: Some(key),
                ..Self::default()
            },
            Command::List { collection } => Self {
                cmd,
                collection: Some(collection),
                ..Self::default()
            },
            Command::CreateIndex {
                collection,
                field_name,
            }
            | Command::DeleteIndex {
                collection,
                field_name,
            } => Self {
                cmd,
                collection: Some(collection),
                field_name: Some(field_name),
                ..Self::default()
            },
            Command::Query {
                collection,
                field_name,
                params,
            } => Self {
                cmd,
                collection: Some(collection),
                field_name: Some(field_name),
                params: Some(params),
                ..Self::default()
            },
        }
    }
}
