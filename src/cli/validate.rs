//! `sunbeam validate`: check a document against the embedded schema.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use serde_json::Value;

use crate::extensions::schema::{self, DocumentKind};

/// Document kind as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocumentArg {
    Manifest,
    List,
    Detail,
    Action,
}

impl From<DocumentArg> for DocumentKind {
    fn from(arg: DocumentArg) -> Self {
        match arg {
            DocumentArg::Manifest => Self::Manifest,
            DocumentArg::List => Self::List,
            DocumentArg::Detail => Self::Detail,
            DocumentArg::Action => Self::Action,
        }
    }
}

/// Read the document from `file`, or stdin when absent.
fn read_input(file: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match file {
        Some(path) => fs::read(path).with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .context("failed to read stdin")?;
            Ok(bytes)
        }
    }
}

/// Validate raw bytes as a document of `kind`.
pub fn check(kind: DocumentKind, bytes: &[u8]) -> anyhow::Result<()> {
    let value: Value = serde_json::from_slice(bytes).context("document is not valid JSON")?;
    schema::validate(kind, &value)?;
    Ok(())
}

pub fn run(kind: DocumentKind, file: Option<&Path>) -> anyhow::Result<()> {
    let bytes = read_input(file)?;
    check(kind, &bytes)?;
    println!("valid {}", kind.definition());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_check_reports_first_failure() {
        let err = check(DocumentKind::List, br#"{"items": [{"id": "x"}]}"#).unwrap_err();
        assert!(err.to_string().contains("is not valid"));
    }

    #[test]
    fn test_check_rejects_unknown_action_type() {
        let err = check(DocumentKind::Action, br#"{"type": "launch"}"#).unwrap_err();
        assert!(err.to_string().contains("launch"));
    }

    #[test]
    fn test_run_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"text": "hello", "actions": []}"#).unwrap();
        run(DocumentKind::Detail, Some(file.path())).unwrap();
    }

    #[test]
    fn test_document_arg_names() {
        let arg = DocumentArg::from_str("manifest", false).unwrap();
        assert_eq!(DocumentKind::from(arg), DocumentKind::Manifest);
        assert!(DocumentArg::from_str("table", false).is_err());
    }

    #[test]
    fn test_invalid_json() {
        let err = check(DocumentKind::Manifest, b"{").unwrap_err();
        assert_eq!(err.to_string(), "document is not valid JSON");
    }
}
