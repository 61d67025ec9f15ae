//! The error kinds the core can fail with.
//!
//! These mirror the errno-flavored kinds a real filesystem driver would report rather than a
//! generic `anyhow`-style error, since the VFS adapter this core is meant to sit under needs to
//! tell e.g. "no space" apart from "not a directory" to pick the right syscall return value.

use std::fmt;
use std::io;

/// An error produced by the filesystem core.
#[derive(Debug)]
pub enum Error {
	/// The underlying block driver failed.
	Io(io::Error),
	/// The inode or data bitmap has no free bit left to allocate.
	NoSpace,
	/// A path component does not exist.
	NotFound,
	/// A non-final path component resolved to a regular file.
	NotADir,
	/// The target of a create operation already exists.
	Exists,
	/// Arguments passed to an operation are invalid.
	Inval,
	/// The requested operation is not supported by this filesystem.
	Unsupported,
	/// The caller is not allowed to perform the operation.
	Access,
	/// The target of an operation that requires a non-directory is a directory.
	IsDir,
	/// A seek past the bounds of the device was attempted.
	Seek,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Io(e) => write!(f, "I/O error: {e}"),
			Self::NoSpace => write!(f, "no space left on device"),
			Self::NotFound => write!(f, "no such file or directory"),
			Self::NotADir => write!(f, "not a directory"),
			Self::Exists => write!(f, "file exists"),
			Self::Inval => write!(f, "invalid argument"),
			Self::Unsupported => write!(f, "operation not supported"),
			Self::Access => write!(f, "permission denied"),
			Self::IsDir => write!(f, "is a directory"),
			Self::Seek => write!(f, "illegal seek"),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Self {
		Self::Io(e)
	}
}

/// Shorthand for a [`Result`] failing with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
