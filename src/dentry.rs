//! The in-memory dentry: a named link from a parent directory to an inode.
//!
//! A dentry owns the inode it points to (once loaded); its parent link is a non-owning
//! back-reference, which is what lets a directory's own inode hold a strong list of its
//! children without creating a reference cycle back to itself. This is the same
//! `Rc<RefCell<_>>`-tree-with-`Weak`-parent shape used by in-memory filesystem caches generally.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::codec::FileType;
use crate::inode::Inode;

/// Shared, mutable handle to a [`Dentry`].
pub type DentryRef = Rc<RefCell<Dentry>>;

/// A directory entry: a filename bound to an inode number within a parent directory.
pub struct Dentry {
	pub fname: String,
	pub ino: u32,
	pub ftype: FileType,
	/// Non-owning link to the parent directory's dentry. `None` only for the root.
	pub parent: Option<Weak<RefCell<Dentry>>>,
	/// The inode this dentry points to, once lazily loaded or freshly allocated.
	pub inode: Option<Rc<RefCell<Inode>>>,
}

impl Dentry {
	/// Creates a new, not-yet-bound dentry.
	pub fn new(fname: impl Into<String>, ftype: FileType) -> DentryRef {
		Rc::new(RefCell::new(Self {
			fname: fname.into(),
			ino: 0,
			ftype,
			parent: None,
			inode: None,
		}))
	}

	/// Creates the root dentry: filename `"/"`, inode number 0, no parent.
	pub fn new_root() -> DentryRef {
		Self::new("/", FileType::Dir)
	}

	/// Tells whether this dentry's inode has already been lazily loaded.
	pub fn is_loaded(&self) -> bool {
		self.inode.is_some()
	}
}
