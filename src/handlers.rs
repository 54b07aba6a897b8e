pub mod auth;
pub mod clinics;
pub mod patients;

use serde::de::DeserializeOwned;

use crate::common::error::AppError;

// Os handlers recebem o corpo cru e só o leem depois do gate
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    Ok(serde_json::from_slice(body)?)
}
