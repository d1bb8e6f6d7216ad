use thiserror::Error;

use crate::domain::StationId;

/// Client-side rejection of an operator input. Never reaches the network.
///
/// Display output is the operator-facing message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Por favor, insira um valor entre 0 e {capacity}.")]
    NotANumber { input: String, capacity: f64 },
    #[error("Por favor, insira um valor entre 0 e {capacity}.")]
    OutOfRange { value: f64, capacity: f64 },
    #[error("Estação {0} não encontrada.")]
    UnknownStation(StationId),
}

/// Parses an operator-typed volume and checks `0 <= value <= capacity`.
///
/// Only plain decimal text is a number here: blank input and hex such as
/// `0x10` are rejected.
pub fn validate_volume(input: &str, capacity: f64) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    let value = trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            input: input.to_string(),
            capacity,
        })?;

    if value < 0.0 || value > capacity {
        return Err(ValidationError::OutOfRange { value, capacity });
    }

    Ok(value)
}
