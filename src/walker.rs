//! Depth-first tree traversal with pre/post directory bracketing
//!
//! [`TreeWalker`] lazily produces one [`TreeEntry`] per step. Every
//! directory appears exactly twice: once before any of its children
//! (setup, e.g. creating a destination directory) and once after all of
//! them (teardown, e.g. removing a now-empty directory). The walk never
//! follows symbolic links downward; only the root path itself is resolved
//! before the walk begins.
//!
//! Traversal is driven by an explicit stack of frames rather than call
//! recursion, which bounds memory use by tree depth and makes the
//! two-visits-per-directory contract explicit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// One step of a depth-first walk
#[derive(Debug)]
pub enum TreeEntry {
    /// A non-directory entry: regular file, symlink, or special file
    File(PathBuf),
    /// A directory, reported before any of its children
    DirectoryPre(PathBuf),
    /// The same directory again, after all of its children
    DirectoryPost(PathBuf),
    /// An entry that could not be examined, or a directory that could not
    /// be read; the error carries the OS error code
    Error(PathBuf, io::Error),
}

impl TreeEntry {
    /// Path this entry refers to
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::File(path)
            | Self::DirectoryPre(path)
            | Self::DirectoryPost(path)
            | Self::Error(path, _) => path,
        }
    }
}

/// Per-directory child iteration state
enum Children {
    /// Directory not opened yet
    Unread,
    /// Mid-iteration over the directory's entries
    Open(fs::ReadDir),
    /// Nothing left to produce for this directory
    Done,
}

/// One directory on the walk stack
struct Frame {
    path: PathBuf,
    children: Children,
}

/// Lazy depth-first walker over a directory tree
///
/// The sequence is finite and consumed strictly once; to traverse again,
/// construct a new walker from the root. An error while opening or reading
/// one subdirectory is surfaced as a [`TreeEntry::Error`] and the walk
/// continues with siblings; the failing directory's
/// [`TreeEntry::DirectoryPost`] still appears, so the bracketing contract
/// is unconditional. Sibling ordering is whatever the OS returns.
///
/// # Examples
///
/// ```rust,ignore
/// use localfs::walker::{TreeEntry, TreeWalker};
///
/// for entry in TreeWalker::new("/some/tree") {
///     match entry {
///         TreeEntry::DirectoryPre(path) => println!("entering {}", path.display()),
///         TreeEntry::DirectoryPost(path) => println!("leaving {}", path.display()),
///         TreeEntry::File(path) => println!("found {}", path.display()),
///         TreeEntry::Error(path, err) => eprintln!("{}: {err}", path.display()),
///     }
/// }
/// ```
pub struct TreeWalker {
    /// Root path, consumed by the first call to `next`
    root: Option<PathBuf>,
    /// Directories between the root and the current position
    stack: Vec<Frame>,
}

impl TreeWalker {
    /// Create a walker rooted at `root`
    ///
    /// Nothing is touched until the first entry is pulled.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        debug!("walking {}", root.display());

        Self {
            root: Some(root),
            stack: Vec::new(),
        }
    }
}

impl Iterator for TreeWalker {
    type Item = TreeEntry;

    fn next(&mut self) -> Option<TreeEntry> {
        // The root is classified with a following stat; a symlink root is
        // walked as the directory it resolves to.
        if let Some(root) = self.root.take() {
            return Some(match fs::metadata(&root) {
                Ok(metadata) if metadata.is_dir() => {
                    self.stack.push(Frame {
                        path: root.clone(),
                        children: Children::Unread,
                    });
                    TreeEntry::DirectoryPre(root)
                }
                Ok(_) => TreeEntry::File(root),
                Err(err) => TreeEntry::Error(root, err),
            });
        }

        loop {
            let top = self.stack.len().checked_sub(1)?;

            if matches!(self.stack[top].children, Children::Unread) {
                match fs::read_dir(&self.stack[top].path) {
                    Ok(entries) => self.stack[top].children = Children::Open(entries),
                    Err(err) => {
                        // Cannot descend; the post-order visit still follows.
                        self.stack[top].children = Children::Done;
                        return Some(TreeEntry::Error(self.stack[top].path.clone(), err));
                    }
                }
            }

            let step = match &mut self.stack[top].children {
                Children::Open(entries) => entries.next(),
                _ => None,
            };

            match step {
                Some(Ok(entry)) => {
                    let path = entry.path();

                    // No-follow: classify the child by its own identity, so a
                    // symlink to a directory stays a leaf.
                    match fs::symlink_metadata(&path) {
                        Ok(metadata) if metadata.is_dir() => {
                            self.stack.push(Frame {
                                path: path.clone(),
                                children: Children::Unread,
                            });
                            return Some(TreeEntry::DirectoryPre(path));
                        }
                        Ok(_) => return Some(TreeEntry::File(path)),
                        Err(err) => return Some(TreeEntry::Error(path, err)),
                    }
                }
                Some(Err(err)) => {
                    return Some(TreeEntry::Error(self.stack[top].path.clone(), err));
                }
                None => {
                    if let Some(frame) = self.stack.pop() {
                        return Some(TreeEntry::DirectoryPost(frame.path));
                    }

                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn collect(root: &Path) -> Vec<TreeEntry> {
        TreeWalker::new(root).collect()
    }

    #[test]
    fn test_walk_empty_directory() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;

        let entries = collect(temp_dir.path());

        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], TreeEntry::DirectoryPre(_)));
        assert!(matches!(entries[1], TreeEntry::DirectoryPost(_)));

        Ok(())
    }

    #[test]
    fn test_walk_file_root() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("only.txt");
        fs::write(&path, b"x")?;

        let entries = collect(&path);

        assert_eq!(entries.len(), 1);
        match &entries[0] {
            TreeEntry::File(found) => assert_eq!(found, &path),
            other => panic!("expected File, got {other:?}"),
        }

        Ok(())
    }

    #[test]
    fn test_walk_missing_root() {
        let entries = collect(Path::new("/nonexistent/really/not/here"));

        assert_eq!(entries.len(), 1);
        assert!(matches!(entries[0], TreeEntry::Error(_, _)));
    }

    #[test]
    fn test_directories_bracket_their_children() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir(root.join("sub"))?;
        fs::write(root.join("sub/inner.txt"), b"x")?;
        fs::write(root.join("top.txt"), b"x")?;

        let entries = collect(root);

        let position = |wanted: &Path, pre: bool| {
            entries
                .iter()
                .position(|entry| match entry {
                    TreeEntry::DirectoryPre(path) => pre && path == wanted,
                    TreeEntry::DirectoryPost(path) => !pre && path == wanted,
                    _ => false,
                })
                .unwrap_or_else(|| panic!("no {} visit for {}", if pre { "pre" } else { "post" }, wanted.display()))
        };
        let file_position = |wanted: &Path| {
            entries
                .iter()
                .position(|entry| matches!(entry, TreeEntry::File(path) if path == wanted))
                .unwrap_or_else(|| panic!("no entry for {}", wanted.display()))
        };

        // Each directory is visited exactly twice, children strictly between.
        let sub = root.join("sub");
        assert!(position(root, true) < position(&sub, true));
        assert!(position(&sub, true) < file_position(&sub.join("inner.txt")));
        assert!(file_position(&sub.join("inner.txt")) < position(&sub, false));
        assert!(position(&sub, false) < position(root, false));
        assert!(file_position(&root.join("top.txt")) < position(root, false));

        Ok(())
    }

    #[test]
    fn test_symlinked_directory_is_not_descended() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("root");
        let outside = temp_dir.path().join("outside");
        fs::create_dir_all(&root)?;
        fs::create_dir_all(&outside)?;
        fs::write(outside.join("secret.txt"), b"x")?;
        std::os::unix::fs::symlink(&outside, root.join("portal"))?;

        let entries = collect(&root);

        assert!(entries
            .iter()
            .any(|entry| matches!(entry, TreeEntry::File(path) if path == &root.join("portal"))));
        assert!(!entries
            .iter()
            .any(|entry| entry.path().ends_with("secret.txt")));

        Ok(())
    }

    #[test]
    fn test_symlink_root_is_resolved() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let target = temp_dir.path().join("target");
        let link = temp_dir.path().join("link");
        fs::create_dir(&target)?;
        fs::write(target.join("inner.txt"), b"x")?;
        std::os::unix::fs::symlink(&target, &link)?;

        let entries = collect(&link);

        // The root link resolves to the directory; its child is reached
        // through the link path.
        assert!(matches!(entries[0], TreeEntry::DirectoryPre(_)));
        assert!(entries
            .iter()
            .any(|entry| matches!(entry, TreeEntry::File(path) if path == &link.join("inner.txt"))));

        Ok(())
    }

    #[test]
    fn test_walk_is_finite_and_consumed_once() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("a.txt"), b"x")?;

        let mut walker = TreeWalker::new(temp_dir.path());
        while walker.next().is_some() {}

        assert!(walker.next().is_none());
        assert!(walker.next().is_none());

        Ok(())
    }
}
