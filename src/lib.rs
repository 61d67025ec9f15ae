//! A small block-based filesystem core: on-disk layout, bitmap allocation, an in-memory
//! directory-tree cache with lazy load, and a path resolver, sitting over a pluggable
//! [`BlockDriver`].
//!
//! This crate implements the core only. A POSIX-facing VFS adapter, command-line argument
//! parsing beyond the thin `mkfs-newfs` binary, and logging are the caller's job; see
//! [`MountOptions`] and [`BlockDriver`] for the seams a caller hooks into.

mod adapter;
mod bitmap;
mod cache;
mod codec;
mod dentry;
mod driver;
mod error;
mod inode;
mod layout;
mod mount;
mod resolver;
mod util;

pub use codec::{FileType, DATA_PER_FILE, MAX_NAME_LEN, ROOT_INO};
pub use dentry::{Dentry, DentryRef};
pub use driver::{BlockDriver, FileDriver, MemDriver};
pub use error::{Error, Result};
pub use inode::{Inode, InodeRef};
pub use mount::{Filesystem, MountOptions};
pub use resolver::LookupResult;
