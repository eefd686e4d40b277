//! Access to state owned by the main game thread.
//!
//! The game runs the server and client simulations on its main thread, so the global state here
//! needs no locking. Instead, every access requires a [`MainThreadMarker`].

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::marker::PhantomData;

/// Static guarantee of being on the main game thread.
///
/// Functions that should only be called from the main game thread should accept an argument of
/// this type.
#[derive(Clone, Copy)]
pub struct MainThreadMarker {
    // Mark as !Send and !Sync.
    _marker: PhantomData<*const ()>,
}

impl MainThreadMarker {
    /// Creates a new `MainThreadMarker`.
    ///
    /// # Safety
    ///
    /// This should only be called from the main game thread.
    #[inline]
    pub unsafe fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

/// `Cell` accessible only from the main thread.
pub struct MainThreadCell<T>(Cell<T>);

// Safety: all methods are guarded with MainThreadMarker.
unsafe impl<T> Send for MainThreadCell<T> {}
unsafe impl<T> Sync for MainThreadCell<T> {}

impl<T: Copy> MainThreadCell<T> {
    pub const fn new(value: T) -> Self {
        Self(Cell::new(value))
    }

    pub fn get(&self, _marker: MainThreadMarker) -> T {
        self.0.get()
    }

    pub fn set(&self, _marker: MainThreadMarker, value: T) {
        self.0.set(value);
    }
}

/// `RefCell` accessible only from the main thread.
pub struct MainThreadRefCell<T>(RefCell<T>);

// Safety: all methods are guarded with MainThreadMarker.
unsafe impl<T> Send for MainThreadRefCell<T> {}
unsafe impl<T> Sync for MainThreadRefCell<T> {}

impl<T> MainThreadRefCell<T> {
    pub const fn new(value: T) -> Self {
        Self(RefCell::new(value))
    }

    pub fn borrow(&self, _marker: MainThreadMarker) -> Ref<T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self, _marker: MainThreadMarker) -> RefMut<T> {
        self.0.borrow_mut()
    }
}

/// Makes the calling test thread act as the main thread.
///
/// Tests run in parallel, so the returned guard must be held for as long as the marker is used.
#[cfg(test)]
pub fn test_main_thread() -> (std::sync::MutexGuard<'static, ()>, MainThreadMarker) {
    use std::sync::Mutex;

    static LOCK: Mutex<()> = Mutex::new(());

    let guard = LOCK.lock().unwrap_or_else(|err| err.into_inner());
    // Safety: the lock makes this the only thread touching main thread state.
    (guard, unsafe { MainThreadMarker::new() })
}
