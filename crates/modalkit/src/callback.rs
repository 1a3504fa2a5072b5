#![forbid(unsafe_code)]

//! Host-supplied callbacks.

use std::fmt;
use std::rc::Rc;

/// A shared, host-supplied callback taking `&T`.
///
/// Cloning shares the same closure. Callbacks are `Fn`, not `FnMut`: hosts
/// that need to mutate state capture a `Cell`/`RefCell`.
pub struct Callback<T: ?Sized = ()> {
    f: Rc<dyn Fn(&T)>,
}

impl<T: ?Sized> Clone for Callback<T> {
    fn clone(&self) -> Self {
        Self {
            f: Rc::clone(&self.f),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").finish_non_exhaustive()
    }
}

impl<T: ?Sized + 'static> Callback<T> {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&T) + 'static) -> Self {
        Self { f: Rc::new(f) }
    }

    /// Invoke the callback.
    #[inline]
    pub fn call(&self, arg: &T) {
        (self.f)(arg)
    }

    /// Whether two callbacks share the same closure.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

impl Callback<()> {
    /// Wrap a closure that takes no argument.
    pub fn from_fn(f: impl Fn() + 'static) -> Self {
        Self::new(move |_: &()| f())
    }
}

/// Call `callback` if present. Returns whether anything ran.
#[inline]
pub(crate) fn emit<T: ?Sized + 'static>(callback: Option<&Callback<T>>, arg: &T) -> bool {
    match callback {
        Some(cb) => {
            cb.call(arg);
            true
        }
        None => false,
    }
}
