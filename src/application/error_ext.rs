//! Path context for I/O errors

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Turns `io::Result` into `ApplicationResult`, naming the action and file.
pub trait IoResultExt<T> {
    /// ```ignore
    /// fs.read_to_string(path).with_path_context("read outline", path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{action} {}: {e}", path.display()),
            source: Box::new(e),
        })
    }
}
