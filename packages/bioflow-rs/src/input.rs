use std::path::Path;

use crate::error::{BioflowError, Result};
use crate::types::PatientData;

/// Supported patient file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Json,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn supported_extensions() -> &'static [&'static str] {
        &["json"]
    }
}

/// Check that `path` exists and has a supported extension
pub fn validate_patient_file(path: &Path) -> Result<FileType> {
    if !path.exists() {
        return Err(BioflowError::FileNotFound(path.display().to_string()));
    }
    FileType::from_path(path).ok_or_else(|| {
        BioflowError::UnsupportedFileType(
            path.extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default(),
        )
    })
}

pub fn parse_patient_data(content: &str) -> Result<PatientData> {
    let patient: PatientData = serde_json::from_str(content)
        .map_err(|e| BioflowError::ParseError(format!("invalid patient data: {}", e)))?;
    if patient.is_empty() {
        return Err(BioflowError::InvalidParameter(
            "patient file contains no signals".to_string(),
        ));
    }
    Ok(patient)
}

pub async fn load_patient_file(path: &Path) -> Result<PatientData> {
    validate_patient_file(path)?;
    let content = tokio::fs::read_to_string(path).await?;
    let patient = parse_patient_data(&content)?;
    log::debug!(
        "Loaded {} signals from {}",
        patient.signal_count(),
        path.display()
    );
    Ok(patient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_extension() {
        assert_eq!(FileType::from_extension("JSON"), Some(FileType::Json));
        assert_eq!(FileType::from_extension("csv"), None);
    }

    #[test]
    fn test_validate_missing_file() {
        let result = validate_patient_file(Path::new("/nonexistent/patient.json"));
        assert!(matches!(result, Err(BioflowError::FileNotFound(_))));
    }

    #[test]
    fn test_validate_wrong_extension() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        let result = validate_patient_file(file.path());
        assert!(matches!(result, Err(BioflowError::UnsupportedFileType(ext)) if ext == "csv"));
    }

    #[test]
    fn test_parse_rejects_empty_patient() {
        let result = parse_patient_data("{}");
        assert!(matches!(result, Err(BioflowError::InvalidParameter(_))));
        assert!(matches!(
            parse_patient_data("not json"),
            Err(BioflowError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn test_load_patient_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"spo2": [97, 98], "cognitive": "focus"}}"#).unwrap();
        let patient = load_patient_file(file.path()).await.unwrap();
        assert_eq!(patient.signal_count(), 2);
        assert_eq!(patient.cognitive.as_deref(), Some("focus"));
    }
}
