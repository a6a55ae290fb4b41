//! Raw submission form and its validation.

use crate::error::SubmitError;
use crate::model::{Document, SubmissionRequest, Weights};
use bytes::Bytes;
use std::path::{Path, PathBuf};

const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Form inputs exactly as entered; read when the trigger fires, not before.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionForm {
    pub document: Option<PathBuf>,
    pub w_foundation: String,
    pub w_competency: String,
    pub w_density: String,
}

impl SubmissionForm {
    /// Check presence of every field and load the document.
    pub async fn build_request(&self, check_weight_sum: bool) -> Result<SubmissionRequest, SubmitError> {
        let path = self
            .document
            .as_deref()
            .ok_or_else(|| SubmitError::Validation("No document selected".into()))?;

        let weights = Weights {
            foundation: weight_input("Foundation", &self.w_foundation)?,
            competency: weight_input("Competency", &self.w_competency)?,
            density: weight_input("Density", &self.w_density)?,
        };
        if check_weight_sum {
            check_unit_sum(&weights)?;
        }

        let document = read_document(path).await?;
        Ok(SubmissionRequest { document, weights })
    }
}

fn weight_input(name: &str, raw: &str) -> Result<String, SubmitError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SubmitError::Validation(format!("Missing {name} weight")));
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(trimmed.to_string()),
        _ => Err(SubmitError::Validation(format!("{name} weight must be a number"))),
    }
}

fn check_unit_sum(weights: &Weights) -> Result<(), SubmitError> {
    // Values already parsed once in weight_input.
    let sum: f64 = weights
        .fields()
        .iter()
        .filter_map(|(_, v)| v.parse::<f64>().ok())
        .sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(SubmitError::Validation(
            "The sum of the weights must be exactly 1.0.".into(),
        ));
    }
    Ok(())
}

async fn read_document(path: &Path) -> Result<Document, SubmitError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| SubmitError::Validation(format!("Could not read {}: {e}", path.display())))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();
    Ok(Document {
        mime: mime_for(path),
        file_name,
        bytes: Bytes::from(bytes),
    })
}

pub fn mime_for(path: &Path) -> mime::Mime {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => mime::APPLICATION_PDF,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
