//! Error types and utilities.

use std::path::PathBuf;
use std::{fmt, io};

/// The result type used by this library.
///
/// Reading the value of a failed result (e.g. with [`Result::unwrap`]) panics;
/// there is no default region list to fall back on.
pub type Result<T> = ::std::result::Result<T, Error>;

/// The closed set of outcomes an operation can report.
///
/// Every [`Error`] maps onto exactly one code (see [`Error::code`]). Callers
/// are expected to branch on the specific code, since e.g. a denied request
/// and a vanished process usually warrant different handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
  Success,
  ProcessNotFound,
  PermissionDenied,
  FileNotFound,
  ParseError,
  PlatformNotSupported,
  UnknownError,
}

impl ErrorCode {
  /// Returns a short, stable, human-readable phrase for the code.
  ///
  /// # Examples
  ///
  /// ```
  /// use vmmap::ErrorCode;
  ///
  /// assert_eq!(ErrorCode::PermissionDenied.as_str(), "Permission denied");
  /// ```
  pub fn as_str(self) -> &'static str {
    match self {
      ErrorCode::Success => "Success",
      ErrorCode::ProcessNotFound => "Process not found",
      ErrorCode::PermissionDenied => "Permission denied",
      ErrorCode::FileNotFound => "File not found",
      ErrorCode::ParseError => "Parse error",
      ErrorCode::PlatformNotSupported => "Platform not supported",
      ErrorCode::UnknownError => "Unknown error",
    }
  }
}

impl fmt::Display for ErrorCode {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A collection of possible errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The targeted process does not exist (or exited during the query).
  #[error("Process not found: {0}")]
  ProcessNotFound(u32),
  /// The mapping source exists, but the caller may not read it.
  #[error("Permission denied accessing process: {process}")]
  PermissionDenied {
    process: String,
    #[source]
    source: Option<io::Error>,
  },
  /// The mapping source is entirely absent (e.g. procfs is not mounted).
  #[error("Cannot open maps file: {}", .0.display())]
  FileNotFound(PathBuf),
  /// A maps line could not be parsed.
  #[error("Invalid maps line: {0:?}")]
  Parse(String),
  /// No backend exists for the current build target.
  #[error("Platform not supported")]
  PlatformNotSupported,
  /// A system call failed in an unexpected manner.
  #[error("System call failed: {0}")]
  SystemCall(#[source] io::Error),
  /// A macOS kernel call failed.
  #[error("macOS kernel call failed: {0}")]
  MachCall(i32),
}

impl Error {
  /// Returns the error code corresponding to this error.
  pub fn code(&self) -> ErrorCode {
    match self {
      Error::ProcessNotFound(_) => ErrorCode::ProcessNotFound,
      Error::PermissionDenied { .. } => ErrorCode::PermissionDenied,
      Error::FileNotFound(_) => ErrorCode::FileNotFound,
      Error::Parse(_) => ErrorCode::ParseError,
      Error::PlatformNotSupported => ErrorCode::PlatformNotSupported,
      Error::SystemCall(_) | Error::MachCall(_) => ErrorCode::UnknownError,
    }
  }

  /// Returns the human-readable message of this error.
  pub fn message(&self) -> String {
    self.to_string()
  }

  pub(crate) fn permission_denied<P: fmt::Display>(process: P, source: Option<io::Error>) -> Self {
    Error::PermissionDenied {
      process: process.to_string(),
      source,
    }
  }
}
