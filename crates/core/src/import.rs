//! Per-invocation input of the package import trigger.

use std::path::Path;

use bytes::Bytes;

use crate::config::ErpConfig;
use crate::error::CoreError;

/// Extension a landed file must carry to be picked up as a package.
pub const PACKAGE_EXTENSION: &str = "zip";

/// Everything one import invocation needs. Dropped when the invocation ends.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// Base name of the landed file, without the `.zip` extension. Sent to
    /// the ERP as the unique file name of the upload.
    pub package_name: String,
    pub payload: Bytes,
    pub resource_url: String,
    pub legal_entity: String,
    pub project_name: String,
}

impl ImportRequest {
    pub fn new(package_name: impl Into<String>, payload: impl Into<Bytes>, erp: &ErpConfig) -> Self {
        Self {
            package_name: package_name.into(),
            payload: payload.into(),
            resource_url: erp.resource.clone(),
            legal_entity: erp.legal_entity.clone(),
            project_name: erp.project_name.clone(),
        }
    }
}

/// Derive the package name from a landed file path (`{name}.zip` -> `name`).
pub fn package_name_from_path(path: &Path) -> Result<String, CoreError> {
    let invalid = || CoreError::InvalidPackageName(path.display().to_string());

    let extension = path.extension().and_then(|e| e.to_str()).ok_or_else(invalid)?;
    if extension != PACKAGE_EXTENSION {
        return Err(invalid());
    }

    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(invalid)
}
