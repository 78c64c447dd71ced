use validator::ValidationError;

pub fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(field_error("not_blank", "This field is required"));
    }
    Ok(())
}

/// Mobile numbers are exactly 10 digits.
pub fn validate_mobile(value: &str) -> Result<(), ValidationError> {
    if !is_digits(value, 10) {
        return Err(field_error("mobile", "Mobile number must be 10 digits"));
    }
    Ok(())
}

/// National ID numbers are exactly 12 digits.
pub fn validate_national_id(value: &str) -> Result<(), ValidationError> {
    if !is_digits(value, 12) {
        return Err(field_error("national_id", "National ID number must be 12 digits"));
    }
    Ok(())
}

pub fn validate_hourly_rate(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(field_error("hourly_rate", "Hourly rate must be greater than 0"));
    }
    Ok(())
}
