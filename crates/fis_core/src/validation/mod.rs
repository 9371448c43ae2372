//! Job and upload validation.
//!
//! Validation runs synchronously at submission time, before any job starts.
//! A rejected request never produces a partial job; the caller surfaces the
//! error to the user.

mod errors;
mod validator;

pub use errors::{FileError, SelectionError, ValidationError, ValidationResult};
pub use validator::{validate, validate_file, validate_files, validate_sketch};
