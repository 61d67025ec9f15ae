//! Path resolution: a slash-separated walk over the cache, triggering lazy loads as it descends.

use crate::codec::FileType;
use crate::dentry::DentryRef;
use crate::driver::BlockDriver;
use crate::error::Result;
use crate::mount::Filesystem;

/// The result of [`Filesystem::lookup`].
pub struct LookupResult {
	/// The dentry the walk ended on: the match itself on success, or the deepest surviving
	/// ancestor on failure.
	pub dentry: DentryRef,
	pub found: bool,
	pub is_root: bool,
}

impl<D: BlockDriver> Filesystem<D> {
	/// Counts `/` occurrences in `path`, except that the literal path `"/"` is level 0
	/// regardless of its single slash.
	pub fn calc_level(&self, path: &str) -> usize {
		if path == "/" {
			return 0;
		}
		path.chars().filter(|&c| c == '/').count()
	}

	/// Resolves `path` against the cache, lazily loading dentries/inodes as the walk descends.
	///
	/// Component comparison is by prefix: a stored name `"abcd"` matches a queried component
	/// `"abc"`. Callers must pass exact components; the resolver does not guard against this.
	pub fn lookup(&mut self, path: &str) -> Result<LookupResult> {
		if self.calc_level(path) == 0 {
			return Ok(LookupResult {
				dentry: self.root(),
				found: true,
				is_root: true,
			});
		}

		let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();

		let mut cursor = self.root();

		for (i, component) in components.iter().enumerate() {
			let is_last = i == components.len() - 1;

			if !cursor.borrow().is_loaded() {
				let ino = cursor.borrow().ino;
				self.read_inode(&cursor, ino)?;
			}

			let cursor_ftype = cursor.borrow().ftype;
			if cursor_ftype == FileType::RegFile && !is_last {
				return Ok(LookupResult {
					dentry: cursor,
					found: false,
					is_root: false,
				});
			}

			let inode = cursor
				.borrow()
				.inode
				.clone()
				.expect("inode loaded above");

			let matched = inode
				.borrow()
				.children
				.iter()
				.find(|child| {
					let fname = &child.borrow().fname;
					fname.as_bytes().starts_with(component.as_bytes())
				})
				.cloned();

			let Some(matched) = matched else {
				return Ok(LookupResult {
					dentry: cursor,
					found: false,
					is_root: false,
				});
			};

			if is_last {
				if !matched.borrow().is_loaded() {
					let ino = matched.borrow().ino;
					self.read_inode(&matched, ino)?;
				}
				return Ok(LookupResult {
					dentry: matched,
					found: true,
					is_root: false,
				});
			}

			cursor = matched;
		}

		unreachable!("components is non-empty when level > 0")
	}
}

#[cfg(test)]
mod test {
	use crate::driver::MemDriver;
	use crate::mount::Filesystem;

	#[test]
	fn calc_level_matches_reference_special_case() {
		let fs = Filesystem::mount(MemDriver::new(4 * 1024 * 1024, 512)).unwrap();
		assert_eq!(fs.calc_level("/"), 0);
		assert_eq!(fs.calc_level("/a"), 1);
		assert_eq!(fs.calc_level("/a/b/c"), 3);
	}

	#[test]
	fn lookup_root_on_fresh_device() {
		let mut fs = Filesystem::mount(MemDriver::new(4 * 1024 * 1024, 512)).unwrap();
		let result = fs.lookup("/").unwrap();
		assert!(result.found);
		assert!(result.is_root);
	}

	#[test]
	fn lookup_missing_component_misses_at_root() {
		let mut fs = Filesystem::mount(MemDriver::new(4 * 1024 * 1024, 512)).unwrap();
		let result = fs.lookup("/nope").unwrap();
		assert!(!result.found);
		assert!(!result.is_root);
	}
}
