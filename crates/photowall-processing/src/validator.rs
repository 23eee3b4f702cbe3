/// Upload validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File size exceeds limit of {}MB", max / (1024 * 1024))]
    FileTooLarge { size: usize, max: usize },

    #[error("Only image files are allowed (JPEG, PNG, WebP, HEIC), got {content_type}")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Empty file")]
    EmptyFile,
}

/// Photo upload validator
///
/// Checks the declared content type against the allow-list and the payload size
/// against the configured maximum.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl UploadValidator {
    pub fn new(max_file_size: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate content type (case-insensitive, parameters ignored)
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Content type first, then size.
    pub fn validate_all(&self, content_type: &str, file_size: usize) -> Result<(), ValidationError> {
        self.validate_content_type(content_type)?;
        self.validate_file_size(file_size)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator() -> UploadValidator {
        UploadValidator::new(
            1024 * 1024, // 1MB
            vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/heic".to_string(),
            ],
        )
    }

    #[test]
    fn test_validate_file_size() {
        let validator = test_validator();
        assert!(validator.validate_file_size(512 * 1024).is_ok());
        assert!(validator.validate_file_size(1024 * 1024).is_ok());
        assert!(matches!(
            validator.validate_file_size(1024 * 1024 + 1),
            Err(ValidationError::FileTooLarge { .. })
        ));
        assert!(matches!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
    }

    #[test]
    fn test_validate_content_type() {
        let validator = test_validator();
        assert!(validator.validate_content_type("image/jpeg").is_ok());
        assert!(validator.validate_content_type("IMAGE/HEIC").is_ok());
        assert!(validator.validate_content_type("image/png; charset=binary").is_ok());
        assert!(validator.validate_content_type("application/pdf").is_err());
        assert!(validator.validate_content_type("").is_err());
    }

    #[test]
    fn test_validate_all_checks_type_before_size() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_all("application/pdf", 0),
            Err(ValidationError::InvalidContentType { .. })
        ));
        assert!(validator.validate_all("image/jpeg", 10).is_ok());
    }

    #[test]
    fn test_size_message_in_megabytes() {
        let validator = UploadValidator::new(52_428_800, vec!["image/jpeg".to_string()]);
        let err = validator.validate_file_size(52_428_801).unwrap_err();
        assert_eq!(err.to_string(), "File size exceeds limit of 50MB");
    }
}
