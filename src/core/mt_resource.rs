use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted handle to a value behind a read-write lock.
///
/// The engine uses it for state that background tasks and the main thread both touch,
/// such as the overlay provider and its result cache: every overlay fetch task holds a
/// clone, and the cache outlives any single request.
///
/// # Type Parameters
/// - `T`: The type of the contained resource, must be `Send + Sync`
///
/// # Examples
///
/// ```
/// use buckland_blocks::core::MtResource;
///
/// let fetches = MtResource::new(0u32);
/// let worker_handle = fetches.clone();
///
/// std::thread::spawn(move || {
///     *worker_handle.get_mut() += 1;
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(*fetches.get(), 1);
/// ```
///
/// Reads (`get()`) run concurrently; writes (`get_mut()`) are exclusive.
pub struct MtResource<T: Send + Sync> {
    pub resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> MtResource<T> {
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Read access to the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap()
    }

    /// Exclusive access to the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap()
    }

    /// Number of handles sharing this resource.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
