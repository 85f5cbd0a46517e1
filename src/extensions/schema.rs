//! Schema validation for protocol documents.
//!
//! All documents share one embedded Draft-7 schema bundle. Each document kind
//! is compiled once, on first use, as a reference into the bundle.

use jsonschema::{Draft, JSONSchema, ValidationError};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::components::{Action, Detail, List, ACTION_TYPES};
use super::error::{ExtensionError, ExtensionResult};
use super::manifest::{Manifest, MODES};

const BUNDLE: &str = include_str!("../../schemas/sunbeam.schema.json");

/// The kinds of document an extension can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Manifest,
    List,
    Detail,
    Action,
}

impl DocumentKind {
    pub fn definition(&self) -> &'static str {
        match self {
            Self::Manifest => "manifest",
            Self::List => "list",
            Self::Detail => "detail",
            Self::Action => "action",
        }
    }
}

struct Validators {
    manifest: JSONSchema,
    list: JSONSchema,
    detail: JSONSchema,
    action: JSONSchema,
}

impl Validators {
    fn compile() -> Result<Self, String> {
        let bundle: Value = serde_json::from_str(BUNDLE).map_err(|e| e.to_string())?;
        Ok(Self {
            manifest: compile(&bundle, DocumentKind::Manifest)?,
            list: compile(&bundle, DocumentKind::List)?,
            detail: compile(&bundle, DocumentKind::Detail)?,
            action: compile(&bundle, DocumentKind::Action)?,
        })
    }

    fn get(&self, kind: DocumentKind) -> &JSONSchema {
        match kind {
            DocumentKind::Manifest => &self.manifest,
            DocumentKind::List => &self.list,
            DocumentKind::Detail => &self.detail,
            DocumentKind::Action => &self.action,
        }
    }
}

static VALIDATORS: Lazy<Result<Validators, String>> = Lazy::new(Validators::compile);

fn compile(bundle: &Value, kind: DocumentKind) -> Result<JSONSchema, String> {
    let mut root = bundle.clone();
    if let Value::Object(map) = &mut root {
        map.insert(
            "allOf".to_string(),
            json!([{ "$ref": format!("#/definitions/{}", kind.definition()) }]),
        );
    }

    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&root)
        .map_err(|e| format!("invalid {} schema: {}", kind.definition(), e))
}

fn format_error(error: &ValidationError<'_>) -> String {
    let location = error.instance_path.to_string();
    let location = if location.is_empty() { "/" } else { &location };
    format!("{} is not valid: {}", location, error)
}

/// Validate a document, reporting the first failure.
pub fn validate(kind: DocumentKind, value: &Value) -> ExtensionResult<()> {
    check_tags(kind, value)?;

    let validators = VALIDATORS
        .as_ref()
        .map_err(|e| ExtensionError::SchemaInvalid(e.clone()))?;

    if let Err(mut errors) = validators.get(kind).validate(value) {
        let message = errors
            .next()
            .map(|error| format_error(&error))
            .unwrap_or_else(|| format!("{} document is not valid", kind.definition()));
        return Err(ExtensionError::SchemaInvalid(message));
    }

    Ok(())
}

/// Reject values outside the closed mode and action-type sets before schema
/// validation, so they surface as their own error kinds.
fn check_tags(kind: DocumentKind, value: &Value) -> ExtensionResult<()> {
    match kind {
        DocumentKind::Action => check_action(value),
        DocumentKind::Detail => check_actions(value.get("actions")),
        DocumentKind::List => {
            check_actions(value.get("actions"))?;
            if let Some(Value::Array(items)) = value.get("items") {
                for item in items {
                    check_actions(item.get("actions"))?;
                }
            }
            Ok(())
        }
        DocumentKind::Manifest => {
            check_actions(value.get("root"))?;
            if let Some(Value::Array(commands)) = value.get("commands") {
                for command in commands {
                    if let Some(Value::String(mode)) = command.get("mode") {
                        if !MODES.contains(&mode.as_str()) {
                            return Err(ExtensionError::UnknownMode(mode.clone()));
                        }
                    }
                }
            }
            Ok(())
        }
    }
}

fn check_actions(actions: Option<&Value>) -> ExtensionResult<()> {
    if let Some(Value::Array(actions)) = actions {
        for action in actions {
            check_action(action)?;
        }
    }
    Ok(())
}

fn check_action(action: &Value) -> ExtensionResult<()> {
    match action.get("type") {
        Some(Value::String(tag)) if !ACTION_TYPES.contains(&tag.as_str()) => {
            Err(ExtensionError::UnknownActionType(tag.clone()))
        }
        _ => Ok(()),
    }
}

/// Parse, validate and decode a document.
pub fn decode<T: DeserializeOwned>(kind: DocumentKind, bytes: &[u8]) -> ExtensionResult<T> {
    let value: Value = serde_json::from_slice(bytes)?;
    validate(kind, &value)?;
    Ok(serde_json::from_value(value)?)
}

pub fn decode_manifest(bytes: &[u8]) -> ExtensionResult<Manifest> {
    decode(DocumentKind::Manifest, bytes)
}

pub fn decode_list(bytes: &[u8]) -> ExtensionResult<List> {
    decode(DocumentKind::List, bytes)
}

pub fn decode_detail(bytes: &[u8]) -> ExtensionResult<Detail> {
    decode(DocumentKind::Detail, bytes)
}

pub fn decode_action(bytes: &[u8]) -> ExtensionResult<Action> {
    decode(DocumentKind::Action, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::components::ActionKind;

    #[test]
    fn test_bundle_compiles() {
        assert!(VALIDATORS.is_ok(), "{:?}", VALIDATORS.as_ref().err());
    }

    #[test]
    fn test_valid_list() {
        let list = decode_list(br#"{"items": [{"title": "A", "id": "a"}]}"#).unwrap();
        assert_eq!(list.items[0].title, "A");
    }

    #[test]
    fn test_list_item_missing_title() {
        let err = decode_list(br#"{"items": [{"subtitle": "no title"}]}"#).unwrap_err();
        match err {
            ExtensionError::SchemaInvalid(message) => {
                assert!(message.starts_with("/items/0 is not valid"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_root_location_reported() {
        let err = decode_list(br#"{"actions": []}"#).unwrap_err();
        match err {
            ExtensionError::SchemaInvalid(message) => {
                assert!(message.starts_with("/ is not valid"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_run_action_requires_command() {
        let err = decode_action(br#"{"type": "run"}"#).unwrap_err();
        assert!(matches!(err, ExtensionError::SchemaInvalid(_)));
    }

    #[test]
    fn test_unknown_action_type() {
        let err = decode_action(br#"{"type": "teleport"}"#).unwrap_err();
        assert!(matches!(err, ExtensionError::UnknownActionType(t) if t == "teleport"));

        let err = decode_list(br#"{"items": [{"title": "A", "actions": [{"type": "fly"}]}]}"#)
            .unwrap_err();
        assert!(matches!(err, ExtensionError::UnknownActionType(t) if t == "fly"));
    }

    #[test]
    fn test_unknown_mode() {
        let err = decode_manifest(
            br#"{"title": "X", "commands": [{"name": "a", "mode": "table"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ExtensionError::UnknownMode(m) if m == "table"));
    }

    #[test]
    fn test_detail_requires_content() {
        assert!(decode_detail(br#"{"actions": []}"#).is_err());
        let detail = decode_detail(br#"{"text": "hello"}"#).unwrap();
        assert_eq!(detail.markup.text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_decode_action_with_params() {
        let action =
            decode_action(br#"{"type": "reload", "params": {"page": 2}}"#).unwrap();
        match action.kind {
            ActionKind::Reload { params } => assert_eq!(params["page"].to_string(), "2"),
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            decode_list(b"not json"),
            Err(ExtensionError::Decode(_))
        ));
    }
}
