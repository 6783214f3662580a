use std::collections::{BTreeMap, HashSet, VecDeque};

use prost_reflect::{Kind, MessageDescriptor, MethodDescriptor};
use serde::Serialize;

/// A JSON Schema-like projection of one message, per `spec.md` §3. `required`
/// is always empty and repeated fields are projected as their element type —
/// both are documented imprecisions, not bugs (see `SPEC_FULL.md` §9).
#[derive(Debug, Clone, Serialize)]
pub struct MessageSchema {
    pub title: String,
    #[serde(rename = "type")]
    pub schema_type: &'static str,
    pub properties: BTreeMap<String, PropertySchema>,
    pub required: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub prop_type: &'static str,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl MessageSchema {
    pub fn project(message: &MessageDescriptor) -> Self {
        let properties = message
            .fields()
            .map(|field| (field.name().to_string(), project_field_kind(&field.kind())))
            .collect();

        Self {
            title: message.name().to_string(),
            schema_type: "object",
            properties,
            required: Vec::new(),
        }
    }
}

fn project_field_kind(kind: &Kind) -> PropertySchema {
    match kind {
        Kind::Double | Kind::Float => PropertySchema { prop_type: "number", reference: None },
        Kind::Int32
        | Kind::Int64
        | Kind::Uint32
        | Kind::Uint64
        | Kind::Sint32
        | Kind::Sint64
        | Kind::Fixed32
        | Kind::Fixed64
        | Kind::Sfixed32
        | Kind::Sfixed64 => PropertySchema { prop_type: "integer", reference: None },
        Kind::Bool => PropertySchema { prop_type: "boolean", reference: None },
        Kind::String | Kind::Bytes | Kind::Enum(_) => {
            PropertySchema { prop_type: "string", reference: None }
        }
        Kind::Message(m) => {
            PropertySchema { prop_type: "object", reference: Some(m.full_name().to_string()) }
        }
    }
}

/// Transitively collects every message type reachable from a service's
/// methods (inputs, outputs, and nested message-typed fields), depth-first
/// and cycle-safe via a seen-set keyed by fully-qualified name.
pub fn collect_transitive_messages(
    methods: impl Iterator<Item = MethodDescriptor>,
) -> BTreeMap<String, MessageSchema> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    let mut out = BTreeMap::new();

    for method in methods {
        queue.push_back(method.input());
        queue.push_back(method.output());
    }

    while let Some(message) = queue.pop_front() {
        let fqn = message.full_name().to_string();
        if !seen.insert(fqn.clone()) {
            continue;
        }

        for field in message.fields() {
            if let Kind::Message(nested) = field.kind() {
                queue.push_back(nested);
            }
        }

        out.insert(fqn, MessageSchema::project(&message));
    }

    out
}
