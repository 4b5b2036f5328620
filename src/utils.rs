use crate::item_validation::ValidationError;

/// Standardizes a course code, e.g. `" inst326 "` becomes `"INST326"`.
pub fn format_course_code(code: &str) -> Result<String, ValidationError> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyText {
            field: "course_code",
        });
    }
    Ok(trimmed.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_codes_are_trimmed_and_uppercased() {
        assert_eq!(format_course_code(" inst326 ").unwrap(), "INST326");
        assert!(format_course_code("   ").is_err());
    }
}
