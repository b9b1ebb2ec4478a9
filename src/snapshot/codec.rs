use std::io::{Read, Write};

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use snafu::{ResultExt, Snafu};
use tracing::warn;

use crate::filesystem::{FileNode, FileType};

impl Serialize for FileNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.children.is_empty() { 3 } else { 4 };
        let mut state = serializer.serialize_struct("FileNode", len)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("size", &self.size)?;
        state.serialize_field("type", &self.file_type.code())?;
        if self.children.is_empty() {
            state.skip_field("subs")?;
        } else {
            state.serialize_field("subs", &self.children)?;
        }
        state.end()
    }
}

/// Writes `node` and everything retained below it to `sink`.
pub fn serialize(node: &FileNode, sink: impl Write) -> Result<(), SnapshotError> {
    let mut serializer =
        serde_json::Serializer::with_formatter(sink, PrettyFormatter::with_indent(b" "));
    node.serialize(&mut serializer).context(EncodeSnafu)
}

/// Reads a tree back from a snapshot document.
///
/// Member order does not matter and unknown members are ignored. Children
/// that do not form a valid node are dropped individually and the rest are
/// re-sorted by path.
pub fn deserialize(source: impl Read) -> Result<FileNode, SnapshotError> {
    let document: Value = serde_json::from_reader(source).context(ParseSnafu)?;
    let Value::Object(members) = &document else {
        return RootNotObjectSnafu {
            kind: kind_name(&document),
        }
        .fail();
    };
    node_from_members(members).ok_or(SnapshotError::InvalidRoot)
}

fn node_from_value(value: &Value) -> Option<FileNode> {
    match value {
        Value::Object(members) => node_from_members(members),
        other => {
            warn!("snapshot node is not an object, actual kind is {}", kind_name(other));
            None
        }
    }
}

fn node_from_members(members: &Map<String, Value>) -> Option<FileNode> {
    let mut node = FileNode::default();
    let mut children = Vec::new();

    for (name, value) in members {
        match name.as_str() {
            "path" => match value.as_str() {
                Some(path) => node.path = path.to_owned(),
                None => return invalid_member("path", value),
            },
            "size" => match value.as_u64() {
                Some(size) => node.size = size,
                None => return invalid_member("size", value),
            },
            "type" => match value.as_u64() {
                Some(code) => node.file_type = FileType::from_code(code),
                None => return invalid_member("type", value),
            },
            "subs" => match value.as_array() {
                Some(subs) => children.extend(subs.iter().filter_map(node_from_value)),
                None => warn!(
                    "'subs' of {} is not an array, actual kind is {}",
                    node.path,
                    kind_name(value)
                ),
            },
            _ => {}
        }
    }

    Some(node.with_children(children))
}

fn invalid_member(name: &str, value: &Value) -> Option<FileNode> {
    warn!(
        "snapshot member '{name}' has an invalid value of kind {}, dropping node",
        kind_name(value)
    );
    None
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Snafu)]
pub enum SnapshotError {
    #[snafu(display("Failed to parse snapshot document"))]
    ParseError { source: serde_json::Error },
    #[snafu(display("Snapshot root should be an object, found {kind}"))]
    RootNotObject { kind: &'static str },
    #[snafu(display("Snapshot root is not a valid node"))]
    InvalidRoot,
    #[snafu(display("Failed to encode snapshot"))]
    EncodeError { source: serde_json::Error },
}
