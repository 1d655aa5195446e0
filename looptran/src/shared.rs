use std::sync::Arc;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

/// A convenience type alias for [Arc<RwLock<T>>].
///
/// The tree handed to a transformation script is a shared mutable structure
/// with parent back-references, so every node is behind an `Arc<RwLock<..>>`.
///
/// # Example
///
/// ```
/// use looptran::shared::Shared;
///
/// let lock = Shared::new(42.into());
/// assert_eq!(*lock.try_read().unwrap(), 42);
/// ```
pub type Shared<T> = Arc<RwLock<T>>;

/// A convenience trait around [RwLock].
///
/// Scripts run single-threaded over the tree (the external compiler never
/// invokes them concurrently), so a lock that cannot be taken immediately is
/// a bug and crashing beats hanging. `try_read`/`try_write` plus `unwrap`
/// encode that, and this trait makes the one-liners readable.
///
/// # Example
///
/// ```
/// use looptran::shared::Shared;
/// use looptran::shared::SharedExt;
///
/// let lock = Shared::new(42.into());
/// assert_eq!(*lock.rd(), 42);
/// ```
pub trait SharedExt<T: ?Sized> {
    /// Convenience method for reading.
    fn rd(&self) -> RwLockReadGuard<T>;
    /// Convenience method for writing.
    fn wr(&self) -> RwLockWriteGuard<T>;
}

impl<T: ?Sized> SharedExt<T> for Shared<T> {
    fn rd(&self) -> RwLockReadGuard<T> {
        self.try_read().unwrap()
    }
    fn wr(&self) -> RwLockWriteGuard<T> {
        self.try_write().unwrap()
    }
}

#[test]
fn test_shared() {
    let lock = Shared::new(42.into());
    assert_eq!(*lock.rd(), 42);
}
