use serde::{Deserialize, Serialize};

use crate::error::CashierError;

/// Handle to the host application, passed to every vendor operation.
///
/// Vendors use the application id to address the billing backend (it plays the
/// role of a package name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostContext {
    app_id: String,
}

impl HostContext {
    pub fn new(app_id: impl Into<String>) -> Result<Self, CashierError> {
        let app_id = app_id.into();
        if app_id.trim().is_empty() {
            return Err(CashierError::InvalidArgument(
                "host app id must not be empty".to_string(),
            ));
        }
        Ok(Self { app_id })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}
