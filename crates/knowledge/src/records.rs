//! Reading knowledge-base source files into typed records.
//!
//! Both files hold a JSON array of objects. FAQ objects must carry string
//! `question` and `answer` fields; hotline fields are optional and default to
//! empty strings.

use crate::types::{FaqRecord, HotlineRecord, KnowledgeRecord};
use guardiane_core::{AppConfig, AppError, AppResult};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Locations of the two knowledge-base files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeSources {
    pub faq_path: PathBuf,
    pub hotline_path: PathBuf,
}

impl KnowledgeSources {
    pub fn new(faq_path: impl Into<PathBuf>, hotline_path: impl Into<PathBuf>) -> Self {
        Self {
            faq_path: faq_path.into(),
            hotline_path: hotline_path.into(),
        }
    }

    /// Source files named by the application config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.faq_path(), config.hotline_path())
    }

    /// Raw bytes of every source file, in fingerprint order (FAQ first).
    pub fn read_raw(&self) -> AppResult<Vec<Vec<u8>>> {
        [&self.faq_path, &self.hotline_path]
            .into_iter()
            .map(|path| {
                std::fs::read(path).map_err(|e| {
                    AppError::Knowledge(format!("Failed to read source file {:?}: {}", path, e))
                })
            })
            .collect()
    }

    /// Parse the FAQ file.
    pub fn read_faq(&self) -> AppResult<Vec<FaqRecord>> {
        read_objects(&self.faq_path)?
            .into_iter()
            .enumerate()
            .map(|(i, fields)| faq_from_fields(&self.faq_path, i, fields))
            .collect()
    }

    /// Parse the hotline file.
    pub fn read_hotlines(&self) -> AppResult<Vec<HotlineRecord>> {
        Ok(read_objects(&self.hotline_path)?
            .into_iter()
            .map(hotline_from_fields)
            .collect())
    }

    /// All records, FAQ entries first.
    pub fn read_all(&self) -> AppResult<Vec<KnowledgeRecord>> {
        let mut records: Vec<KnowledgeRecord> = self
            .read_faq()?
            .into_iter()
            .map(KnowledgeRecord::Faq)
            .collect();
        records.extend(self.read_hotlines()?.into_iter().map(KnowledgeRecord::Hotline));

        tracing::debug!("Read {} knowledge records", records.len());
        Ok(records)
    }
}

/// Read a file holding a JSON array of objects.
fn read_objects(path: &Path) -> AppResult<Vec<Map<String, Value>>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Knowledge(format!("Failed to read source file {:?}: {}", path, e))
    })?;

    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| AppError::DataFormat(format!("{:?} is not valid JSON: {}", path, e)))?;

    let Value::Array(items) = value else {
        return Err(AppError::DataFormat(format!(
            "{:?} must contain a JSON array of records",
            path
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(fields) => Ok(fields),
            other => Err(AppError::DataFormat(format!(
                "{:?} record {} is not an object: {}",
                path, i, other
            ))),
        })
        .collect()
}

fn faq_from_fields(path: &Path, index: usize, fields: Map<String, Value>) -> AppResult<FaqRecord> {
    Ok(FaqRecord {
        question: required_text(path, index, &fields, "question")?,
        answer: required_text(path, index, &fields, "answer")?,
        fields,
    })
}

/// A field that must be present and hold a string.
fn required_text(
    path: &Path,
    index: usize,
    fields: &Map<String, Value>,
    key: &str,
) -> AppResult<String> {
    match fields.get(key) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(AppError::DataFormat(format!(
            "{:?} record {}: '{}' must be a string, found {}",
            path, index, key, other
        ))),
        None => Err(AppError::DataFormat(format!(
            "{:?} record {}: missing required field '{}'",
            path, index, key
        ))),
    }
}

fn hotline_from_fields(fields: Map<String, Value>) -> HotlineRecord {
    HotlineRecord {
        organization: field_text(&fields, "organization"),
        topic: field_text(&fields, "topic"),
        phone: field_text(&fields, "phone"),
        website: field_text(&fields, "website"),
        fields,
    }
}

/// Render a field as text; missing and null fields become empty.
fn field_text(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
