use crate::{ucount, Event, Probe, Silent};
use alloc::boxed::Box;
use branches::{assume, unlikely};
use core::{
    cell::Cell,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem::MaybeUninit,
    ptr::NonNull,
};

// Payload first so a pair pointer doubles as a payload pointer.
#[repr(C)]
struct SharedInner<T> {
    data: T,
    counter: Cell<ucount>,
}

/// [`Shared<T>`] is an empty-aware reference-counting pointer for
/// single-threaded use. An instance is either *owning*, holding a
/// heap-allocated payload+counter pair jointly with every instance cloned
/// from it, or *empty*, holding nothing. Cloning an owning instance bumps the
/// shared counter; dropping an owner decrements it, and whichever drop brings
/// it to zero releases the payload and the counter together. Cloning an empty
/// instance yields another empty instance without ever touching a counter.
///
/// Assignment follows Rust's drop rules: writing over an owning `Shared`
/// releases its previous pair. Because the right-hand side is constructed
/// before the destination is dropped, `p = p.clone()` leaves the count
/// unchanged and never transiently frees the payload.
///
/// The `P` parameter selects a [`Probe`] that observes ownership transitions;
/// the default [`Silent`] probe compiles to nothing.
pub struct Shared<T, P: Probe = Silent> {
    ptr: Option<NonNull<SharedInner<T>>>,
    phantom: PhantomData<(Box<SharedInner<T>>, P)>,
}

impl<T> Shared<T> {
    /// Constructs a new owning [`Shared<T>`] with a count of 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharelite::Shared;
    ///
    /// let tada = Shared::new("Tada!");
    /// assert_eq!(tada.get(), Some(&"Tada!"));
    /// ```
    #[inline]
    pub fn new(data: T) -> Shared<T> {
        Self::probed(data)
    }

    /// Constructs an empty [`Shared<T>`]. No allocation is performed;
    /// [`get`](Shared::get) returns `None` and dropping it is a no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharelite::Shared;
    ///
    /// let nothing: Shared<u32> = Shared::empty();
    /// assert!(nothing.is_empty());
    /// assert_eq!(nothing.get(), None);
    /// ```
    #[inline]
    pub fn empty() -> Shared<T> {
        Self::probed_empty()
    }

    /// Constructs an owning [`Shared<T>`] from a fallible payload
    /// initializer. The pair is allocated and its counter written before
    /// `init` runs; if `init` fails, the allocation is released again, so an
    /// error can never leak the counter or leave a half-built pair behind.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharelite::Shared;
    ///
    /// let parsed = Shared::try_new(|| "42".parse::<u32>());
    /// assert_eq!(parsed.unwrap().get(), Some(&42));
    ///
    /// let failed = Shared::try_new(|| "forty-two".parse::<u32>());
    /// assert!(failed.is_err());
    /// ```
    #[inline]
    pub fn try_new<E, F>(init: F) -> Result<Shared<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        Self::try_probed(init)
    }
}

impl<T, P: Probe> Shared<T, P> {
    /// Like [`Shared::new`], but with an explicit probe type.
    ///
    /// The probe type is normally picked through an annotation on the
    /// binding, as inference alone cannot choose it:
    ///
    /// ```
    /// use sharelite::{Shared, Silent};
    ///
    /// let p: Shared<u32, Silent> = Shared::probed(7);
    /// assert_eq!(p.get(), Some(&7));
    /// ```
    #[inline]
    pub fn probed(data: T) -> Shared<T, P> {
        // Safety: box is always not null
        let ptr = unsafe {
            NonNull::new_unchecked(Box::leak(Box::new(SharedInner {
                data,
                counter: Cell::new(1),
            })))
        };
        P::on_event(Event::Allocated, ptr.as_ptr() as *const (), 1);
        Shared {
            ptr: Some(ptr),
            phantom: PhantomData,
        }
    }

    /// Like [`Shared::empty`], but with an explicit probe type.
    #[inline]
    pub fn probed_empty() -> Shared<T, P> {
        Shared {
            ptr: None,
            phantom: PhantomData,
        }
    }

    /// Like [`Shared::try_new`], but with an explicit probe type.
    pub fn try_probed<E, F>(init: F) -> Result<Shared<T, P>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let mut buffer: Box<MaybeUninit<SharedInner<T>>> = Box::new(MaybeUninit::uninit());
        unsafe {
            (&mut (*buffer.as_mut_ptr()).counter as *mut Cell<ucount>).write(Cell::new(1));
        }
        // An early return drops `buffer`, releasing the counter without
        // touching the never-constructed payload.
        let data = init()?;
        let ptr = unsafe {
            (&mut (*buffer.as_mut_ptr()).data as *mut T).write(data);
            NonNull::new_unchecked(Box::leak(buffer) as *mut _ as *mut SharedInner<T>)
        };
        P::on_event(Event::Allocated, ptr.as_ptr() as *const (), 1);
        Ok(Shared {
            ptr: Some(ptr),
            phantom: PhantomData,
        })
    }

    #[inline(always)]
    fn inner(&self) -> Option<&SharedInner<T>> {
        // SAFETY: a present pair is protected by its counter, it will not get
        // released unless drop of the last owner get called.
        self.ptr.map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Returns a view of the payload, or `None` if this instance is empty.
    /// The view borrows this instance and cannot outlive it.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharelite::Shared;
    ///
    /// let p = Shared::new("hello".to_owned());
    /// assert_eq!(p.get().map(String::as_str), Some("hello"));
    ///
    /// let q: Shared<String> = Shared::empty();
    /// assert!(q.get().is_none());
    /// ```
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.inner().map(|inner| &inner.data)
    }

    /// Returns `true` if this instance holds no pair.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    /// Gets the number of owners of this instance's pair, or 0 if it is
    /// empty. The count stays the same and the [`Shared<T>`] isn't used up.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharelite::Shared;
    ///
    /// let five = Shared::new(5);
    /// let _also_five = five.clone();
    ///
    /// // This assertion is deterministic because a pair is never shared
    /// // between threads.
    /// assert_eq!(2, five.strong_count());
    /// ```
    #[inline]
    pub fn strong_count(&self) -> usize {
        match self.inner() {
            Some(inner) => inner.counter.get() as usize,
            None => 0,
        }
    }

    /// Gives you a pointer to the payload, or a null pointer if this
    /// instance is empty. The count stays the same; the pointer stays valid
    /// as long as some owner of the pair does.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharelite::Shared;
    ///
    /// let x = Shared::new("hello".to_owned());
    /// let y = x.clone();
    /// assert_eq!(x.as_ptr(), y.as_ptr());
    /// assert_eq!(unsafe { &*x.as_ptr() }, "hello");
    /// ```
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr() as *const T,
            None => core::ptr::null(),
        }
    }

    /// Compares if two [`Shared<T>`]s reference the same pair, similar to
    /// [`ptr::eq`]. Two empty instances compare equal.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharelite::Shared;
    ///
    /// let five = Shared::new(5);
    /// let same_five = five.clone();
    /// let other_five = Shared::new(5);
    ///
    /// assert!(Shared::ptr_eq(&five, &same_five));
    /// assert!(!Shared::ptr_eq(&five, &other_five));
    /// ```
    ///
    /// [`ptr::eq`]: core::ptr::eq "ptr::eq"
    #[inline]
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.as_ptr() == other.as_ptr()
    }

    /// Transfers ownership out of this instance, leaving it empty. The count
    /// of the pair is unchanged; the returned instance owns exactly what this
    /// one owned. Taking from an empty instance yields an empty instance.
    ///
    /// This is the observable form of a move: after `let q = p.take();`, `p`
    /// is still usable and reports empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharelite::Shared;
    ///
    /// let mut p = Shared::new(7);
    /// let q = p.take();
    /// assert!(p.is_empty());
    /// assert_eq!(q.get(), Some(&7));
    /// assert_eq!(q.strong_count(), 1);
    /// ```
    #[inline]
    pub fn take(&mut self) -> Shared<T, P> {
        Shared {
            ptr: self.ptr.take(),
            phantom: PhantomData,
        }
    }

    /// Returns a mutable reference to the payload if this instance is the
    /// sole owner of its pair, and `None` if it is empty or the pair is
    /// shared.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharelite::Shared;
    ///
    /// let mut x = Shared::new(3);
    /// *Shared::get_mut(&mut x).unwrap() = 4;
    /// assert_eq!(x.get(), Some(&4));
    ///
    /// let _y = x.clone();
    /// assert!(Shared::get_mut(&mut x).is_none());
    /// ```
    #[inline]
    pub fn get_mut(this: &mut Self) -> Option<&mut T> {
        let mut ptr = this.ptr?;
        if unsafe { ptr.as_ref() }.counter.get() != 1 {
            return None;
        }
        // SAFETY: this is the only owner, no other view of the payload exists
        Some(unsafe { &mut ptr.as_mut().data })
    }

    /// If this instance is the sole owner of its pair, moves the payload out
    /// and deallocates the pair. Otherwise returns the instance back,
    /// untouched; an empty instance always comes back as `Err`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharelite::Shared;
    ///
    /// let x = Shared::new(3);
    /// assert_eq!(Shared::try_unwrap(x).unwrap(), 3);
    ///
    /// let x = Shared::new(4);
    /// let _y = x.clone();
    /// assert_eq!(Shared::try_unwrap(x).unwrap_err().get(), Some(&4));
    /// ```
    #[inline]
    pub fn try_unwrap(this: Self) -> Result<T, Self> {
        let ptr = match this.ptr {
            Some(ptr) => ptr,
            None => return Err(this),
        };
        if unsafe { ptr.as_ref() }.counter.get() != 1 {
            return Err(this);
        }
        // SAFETY: there is only one owner, it's safe to move the payload out
        // of the pair and destroy the container
        unsafe {
            let inner = Box::from_raw(ptr.as_ptr());
            core::mem::forget(this);
            P::on_event(Event::Freed, ptr.as_ptr() as *const (), 0);
            Ok(inner.data)
        }
    }

    /// Extracts the payload if this instance is the sole owner of its pair,
    /// dropping the instance either way. Equivalent to
    /// `Shared::try_unwrap(this).ok()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharelite::Shared;
    ///
    /// let value = Shared::new(42);
    /// let cloned = value.clone();
    /// // not the sole owner, dropped without yielding the payload
    /// assert!(Shared::into_inner(value).is_none());
    /// // the last owner gets the payload out
    /// assert_eq!(Shared::into_inner(cloned), Some(42));
    /// ```
    pub fn into_inner(this: Self) -> Option<T> {
        Shared::try_unwrap(this).ok()
    }

    // The non-inlined portion of `drop` that simply invokes the destructor.
    // We rely on the compiler to determine whether it is beneficial to inline
    // the destructor or not.
    unsafe fn drop_slow(ptr: NonNull<SharedInner<T>>) {
        let _ = Box::from_raw(ptr.as_ptr());
    }
}

impl<T, P: Probe> Clone for Shared<T, P> {
    #[inline]
    fn clone(&self) -> Self {
        let ptr = match self.ptr {
            // An empty source propagates emptiness; there is no counter to
            // touch.
            None => return Self::probed_empty(),
            Some(ptr) => ptr,
        };
        let counter = unsafe { &ptr.as_ref().counter };
        let value = counter.get();
        unsafe { assume(value != 0) };
        let value = value.wrapping_add(1);
        // SAFETY: counter is ensured to be used in single threaded environment only
        if unlikely(value == 0) {
            panic!("reference counter overflow");
        }
        counter.set(value);
        P::on_event(Event::Attached, ptr.as_ptr() as *const (), value as usize);
        Shared {
            ptr: Some(ptr),
            phantom: PhantomData,
        }
    }
}

impl<T, P: Probe> Drop for Shared<T, P> {
    #[inline]
    fn drop(&mut self) {
        let ptr = match self.ptr {
            // Empty teardown is a no-op.
            None => return,
            Some(ptr) => ptr,
        };
        let counter = unsafe { &ptr.as_ref().counter };
        let value = counter.get();
        unsafe {
            assume(value != 0);
        }
        if value != 1 {
            let value = value.wrapping_sub(1);
            counter.set(value);
            P::on_event(Event::Detached, ptr.as_ptr() as *const (), value as usize);
        } else {
            P::on_event(Event::Freed, ptr.as_ptr() as *const (), 0);
            unsafe { Self::drop_slow(ptr) };
        }
    }
}

impl<T, P: Probe> Default for Shared<T, P> {
    /// The default instance is empty, whatever `T` is.
    #[inline]
    fn default() -> Shared<T, P> {
        Self::probed_empty()
    }
}

impl<T, P: Probe> From<T> for Shared<T, P> {
    #[inline(always)]
    fn from(value: T) -> Self {
        Self::probed(value)
    }
}

impl<T: fmt::Debug, P: Probe> fmt::Debug for Shared<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Shared").field(value).finish(),
            None => f.write_str("Shared(<empty>)"),
        }
    }
}

impl<T, P: Probe> fmt::Pointer for Shared<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.as_ptr(), f)
    }
}

impl<T: Hash, P: Probe> Hash for Shared<T, P> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get().hash(state);
    }
}

/// Payload comparison through the [`get`](Shared::get) view: two empty
/// instances are equal, and an empty instance never equals an owning one.
impl<T: PartialEq, P: Probe> PartialEq for Shared<T, P> {
    #[inline]
    fn eq(&self, other: &Shared<T, P>) -> bool {
        self.get() == other.get()
    }
}

impl<T: Eq, P: Probe> Eq for Shared<T, P> {}

impl<T: PartialOrd, P: Probe> PartialOrd for Shared<T, P> {
    /// Empty instances order before owning ones, like `None` before `Some`.
    #[inline]
    fn partial_cmp(&self, other: &Shared<T, P>) -> Option<core::cmp::Ordering> {
        self.get().partial_cmp(&other.get())
    }
}

impl<T: Ord, P: Probe> Ord for Shared<T, P> {
    #[inline]
    fn cmp(&self, other: &Shared<T, P>) -> core::cmp::Ordering {
        self.get().cmp(&other.get())
    }
}

impl<T, P: Probe> Unpin for Shared<T, P> {}
