use core::{
    fmt,
    iter::FusedIterator,
    marker::PhantomData,
    mem::{self, ManuallyDrop, MaybeUninit},
    ptr::{self, NonNull},
    slice,
};

use crate::{
    Error,
    storage::{LenType, NonTrivial, Storage, Trivial, ZeroSized},
    utils::{cold_path, split_range_bound},
};

/// A vector with a fixed capacity whose elements live inside the value itself.
///
/// It mirrors most of the API of [`Vec`], but never allocates: room for `N`
/// elements is part of the `InplaceVec` object, wherever that object lives.
///
/// The third parameter selects the [storage](crate::storage). The default,
/// [`NonTrivial`], works for every `T`. Use [`CopyVec`](crate::CopyVec) for
/// `Copy` elements to get a `Copy` vector, and [`EmptyVec`](crate::EmptyVec)
/// for a zero-sized vector with no capacity.
///
/// # Errors
///
/// Operations that could exceed the capacity come in three flavors:
/// - checked ([`push`](Self::push), [`insert`](Self::insert), ...) return
///   [`Error::CapacityExceeded`];
/// - try ([`try_push`](Self::try_push), [`try_push_with`](Self::try_push_with))
///   hand the value back or return `None`;
/// - unchecked ([`push_unchecked`](Self::push_unchecked), ...) are `unsafe`
///   and require room for the new element.
///
/// # Examples
///
/// ```
/// use inplacevec::InplaceVec;
///
/// // Room for 10 elements, no allocation.
/// let mut vec: InplaceVec<String, 10> = InplaceVec::new();
///
/// assert_eq!(vec.len(), 0);
/// assert_eq!(vec.capacity(), 10);
///
/// vec.push("Hello".to_string()).unwrap();
/// vec.push(", world!".to_string()).unwrap();
///
/// assert_eq!(vec, ["Hello", ", world!"]);
/// ```
///
/// [`Vec`]: https://doc.rust-lang.org/std/vec/struct.Vec.html
pub struct InplaceVec<T, const N: usize, S: Storage<T, N> = NonTrivial<T, N>> {
    storage: S,
    marker: PhantomData<T>,
}

impl<T: Copy, const N: usize, L: LenType> Copy for InplaceVec<T, N, Trivial<T, N, L>> {}

impl<T: Clone> Copy for InplaceVec<T, 0, ZeroSized<T>> {}

macro_rules! impl_const_copy_vec {
    ($($ty:ty),+) => {$(
        impl<T: Copy, const N: usize> InplaceVec<T, N, Trivial<T, N, $ty>> {
            /// Creates a vector holding the elements of `array`, in constant evaluation too.
            ///
            /// Fails to compile if `P > N`.
            ///
            /// # Examples
            ///
            /// ```
            /// # use inplacevec::CopyVec;
            /// const PRIMES: CopyVec<u8, 8, u8> = CopyVec::<u8, 8, u8>::from_array([2, 3, 5, 7]);
            /// const _: () = assert!(PRIMES.storage().len() == 4);
            /// assert_eq!(PRIMES, [2, 3, 5, 7]);
            /// ```
            #[inline]
            pub const fn from_array<const P: usize>(array: [T; P]) -> Self {
                Self {
                    storage: Trivial::<T, N, $ty>::from_array(array),
                    marker: PhantomData,
                }
            }
        }
    )+};
}

impl_const_copy_vec!(u8, u16, u32, u64, usize);

/// Creates an [`InplaceVec`] containing the arguments.
///
/// The syntax is similar to [`vec!`](https://doc.rust-lang.org/std/macro.vec.html),
/// the capacity comes from the annotated type.
///
/// # Panics
/// Panics if the number of elements exceeds the capacity.
///
/// # Examples
///
/// ```
/// # use inplacevec::{inplace_vec, InplaceVec, CopyVec};
/// let vec: InplaceVec<String, 10> = inplace_vec![];
/// let vec: InplaceVec<i64, 10> = inplace_vec![1; 5];
/// let vec: CopyVec<_, 10> = inplace_vec![1, 2, 3, 4];
/// assert_eq!(vec, [1, 2, 3, 4]);
/// ```
#[macro_export]
macro_rules! inplace_vec {
    [] => { $crate::InplaceVec::new() };
    [$elem:expr; $n:expr] => {
        match $crate::InplaceVec::from_elem($elem, $n) {
            ::core::result::Result::Ok(vec) => vec,
            ::core::result::Result::Err(err) => ::core::panic!("{}", err),
        }
    };
    [$($item:expr),+ $(,)?] => {
        match $crate::InplaceVec::try_from([ $($item),+ ]) {
            ::core::result::Result::Ok(vec) => vec,
            ::core::result::Result::Err(err) => ::core::panic!("{}", err),
        }
    };
}

impl<T, const N: usize, S: Storage<T, N>> InplaceVec<T, N, S> {
    /// The fixed capacity.
    pub const CAPACITY: usize = N;

    /// Constructs a new, empty `InplaceVec`.
    ///
    /// The whole capacity is reserved inside the returned value, so `N`
    /// should not be too large for the stack.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::{InplaceVec, CopyVec};
    /// let mut vec: InplaceVec<i32, 8> = InplaceVec::new();
    ///
    /// // Also usable in constants.
    /// const EMPTY: CopyVec<u8, 4> = CopyVec::new();
    /// assert!(EMPTY.is_empty());
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Self {
            storage: S::EMPTY,
            marker: PhantomData,
        }
    }

    /// Returns the backing storage.
    ///
    /// [`Trivial`] and [`ZeroSized`] expose `const` accessors, which makes
    /// this the way to inspect a vector in constant evaluation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::CopyVec;
    /// const WORD: CopyVec<u8, 16> = CopyVec::<u8, 16>::from_array(*b"const");
    /// const LEN: usize = WORD.storage().len();
    /// const FIRST: u8 = WORD.storage().as_slice()[0];
    /// assert_eq!((LEN, FIRST), (5, b'c'));
    /// ```
    #[inline(always)]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the backing storage mutably.
    ///
    /// Storages keep their own invariants, so this is safe; it gives
    /// `const` code access to [`Trivial::try_push`] and [`Trivial::pop`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::CopyVec;
    /// const SQUARES: CopyVec<u32, 4> = {
    ///     let mut vec: CopyVec<u32, 4> = CopyVec::new();
    ///     let mut i = 0;
    ///     while vec.storage_mut().try_push(i * i).is_ok() {
    ///         i += 1;
    ///     }
    ///     vec
    /// };
    /// assert_eq!(SQUARES, [0, 1, 4, 9]);
    /// ```
    #[inline(always)]
    pub const fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Creates a vector with `len` default values.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if `len > N`.
    ///
    /// # Examples
    /// ```
    /// # use inplacevec::InplaceVec;
    /// let vec = InplaceVec::<String, 4>::with_default(2).unwrap();
    /// assert_eq!(vec, ["", ""]);
    ///
    /// assert!(InplaceVec::<String, 4>::with_default(5).is_err());
    /// ```
    pub fn with_default(len: usize) -> Result<Self, Error>
    where
        T: Default,
    {
        let mut vec = Self::new();
        vec.resize_with(len, T::default)?;
        Ok(vec)
    }

    /// Builds a vector from an iterator.
    ///
    /// If the iterator's size hint already shows that it cannot fit, this
    /// fails without pulling any element. Otherwise elements are pushed one
    /// by one and the error is reported as soon as the capacity is exceeded.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if the iterator yields more than `N` elements.
    ///
    /// # Examples
    /// ```
    /// # use inplacevec::InplaceVec;
    /// let vec = InplaceVec::<i32, 4>::try_from_iter(1..=3).unwrap();
    /// assert_eq!(vec, [1, 2, 3]);
    ///
    /// assert!(InplaceVec::<i32, 4>::try_from_iter(0..9).is_err());
    /// ```
    pub fn try_from_iter<I: IntoIterator<Item = T>>(iter: I) -> Result<Self, Error> {
        let mut vec = Self::new();
        vec.append_range(iter)?;
        Ok(vec)
    }

    /// Returns a raw pointer to the vector's buffer.
    ///
    /// The pointer is dangling, but well aligned, if the capacity is zero.
    /// Modifying the vector never moves its buffer, but moving the vector does.
    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Returns a raw mutable pointer to the vector's buffer.
    ///
    /// See [`as_ptr`](Self::as_ptr).
    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.storage.as_mut_ptr()
    }

    /// Forces the length of the vector to `new_len`.
    ///
    /// This is a low-level operation that maintains none of the normal
    /// invariants of the type.
    ///
    /// # Safety
    /// - `new_len` needs to be less than or equal to the capacity `N`.
    /// - If the length is increased, the new elements must be initialized.
    /// - If the length is reduced, the removed elements are leaked unless
    ///   the caller drops them.
    #[inline(always)]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= N, "new length out of bounds [0, N]");
        unsafe { self.storage.set_len(new_len) }
    }

    /// Returns the number of elements in the vector.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns `true` if the vector contains no elements.
    ///
    /// # Examples
    /// ```
    /// # use inplacevec::InplaceVec;
    /// let mut v = InplaceVec::<i32, 5>::new();
    /// assert!(v.is_empty());
    ///
    /// v.push(1).unwrap();
    /// assert!(!v.is_empty());
    /// ```
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `len == N`.
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.len() >= N
    }

    /// Returns the maximum number of elements the vector can hold.
    ///
    /// # Examples
    /// ```
    /// # use inplacevec::InplaceVec;
    /// let vec = InplaceVec::<String, 5>::new();
    /// assert_eq!(vec.capacity(), 5);
    /// ```
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Same as [`capacity`](Self::capacity), without needing a value.
    #[inline(always)]
    pub const fn max_size() -> usize {
        N
    }

    /// Returns the number of elements that can still be pushed.
    #[inline(always)]
    pub fn remaining_capacity(&self) -> usize {
        N - self.len()
    }

    /// Checks that the vector can hold `capacity` elements.
    ///
    /// There is nothing to reserve, the storage already exists.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if `capacity > N`.
    ///
    /// # Examples
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let vec: InplaceVec<i32, 4> = inplace_vec![1, 2];
    /// assert!(vec.reserve(4).is_ok());
    /// assert!(vec.reserve(5).is_err());
    /// ```
    #[inline]
    pub fn reserve(&self, capacity: usize) -> Result<(), Error> {
        if capacity > N {
            cold_path();
            return Err(Error::CapacityExceeded { required: capacity, capacity: N });
        }
        Ok(())
    }

    /// Fails if `additional` more elements would not fit.
    #[inline]
    fn check_room(&self, additional: usize) -> Result<(), Error> {
        self.reserve(self.len().saturating_add(additional))
    }

    /// Does nothing, the capacity is fixed.
    #[inline(always)]
    pub fn shrink_to_fit(&mut self) {}

    /// Extracts a slice containing the entire vector.
    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are live.
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len()) }
    }

    /// Extracts a mutable slice containing the entire vector.
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len();
        // SAFETY: the first `len` slots are live.
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), len) }
    }

    /// Returns the remaining spare capacity of the vector as a slice of `MaybeUninit<T>`.
    ///
    /// Fill it, then mark the data as initialized with [`set_len`](Self::set_len).
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::InplaceVec;
    /// let mut v = InplaceVec::<i32, 10>::new();
    ///
    /// let uninit = v.spare_capacity_mut();
    /// uninit[0].write(0);
    /// uninit[1].write(1);
    /// uninit[2].write(2);
    ///
    /// unsafe { v.set_len(3) };
    ///
    /// assert_eq!(v, [0, 1, 2]);
    /// ```
    #[inline]
    pub fn spare_capacity_mut(&mut self) -> &mut [MaybeUninit<T>] {
        let len = self.len();
        // SAFETY: slots `[len, N)` belong to the storage.
        unsafe {
            slice::from_raw_parts_mut(self.as_mut_ptr().add(len) as *mut MaybeUninit<T>, N - len)
        }
    }

    /// Returns a reference to the element at `index`.
    ///
    /// Unlike indexing, this reports a bad index as an error.
    ///
    /// # Errors
    /// [`Error::OutOfRange`] if `index >= len`.
    ///
    /// # Examples
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec, Error};
    /// let vec: InplaceVec<i32, 4> = inplace_vec![10, 20];
    /// assert_eq!(vec.at(1), Ok(&20));
    /// assert_eq!(vec.at(2), Err(Error::OutOfRange { index: 2, len: 2 }));
    /// ```
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T, Error> {
        let len = self.len();
        if index >= len {
            cold_path();
            return Err(Error::OutOfRange { index, len });
        }
        // SAFETY: `index < len`.
        Ok(unsafe { &*self.as_ptr().add(index) })
    }

    /// Mutable version of [`at`](Self::at).
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, Error> {
        let len = self.len();
        if index >= len {
            cold_path();
            return Err(Error::OutOfRange { index, len });
        }
        // SAFETY: `index < len`.
        Ok(unsafe { &mut *self.as_mut_ptr().add(index) })
    }

    /// Returns the first element.
    ///
    /// # Panics
    /// Panics if the vector is empty.
    #[inline]
    pub fn front(&self) -> &T {
        assert!(!self.is_empty(), "`front` called on an empty InplaceVec");
        &self.as_slice()[0]
    }

    /// Returns the first element mutably.
    ///
    /// # Panics
    /// Panics if the vector is empty.
    #[inline]
    pub fn front_mut(&mut self) -> &mut T {
        assert!(!self.is_empty(), "`front_mut` called on an empty InplaceVec");
        &mut self.as_mut_slice()[0]
    }

    /// Returns the last element.
    ///
    /// # Panics
    /// Panics if the vector is empty.
    #[inline]
    pub fn back(&self) -> &T {
        let len = self.len();
        assert!(len > 0, "`back` called on an empty InplaceVec");
        &self.as_slice()[len - 1]
    }

    /// Returns the last element mutably.
    ///
    /// # Panics
    /// Panics if the vector is empty.
    #[inline]
    pub fn back_mut(&mut self) -> &mut T {
        let len = self.len();
        assert!(len > 0, "`back_mut` called on an empty InplaceVec");
        &mut self.as_mut_slice()[len - 1]
    }

    /// Appends an element to the back of the vector.
    ///
    /// On failure the vector is unchanged and `value` is dropped; use
    /// [`try_push`](Self::try_push) to get it back.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if the vector is full.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::InplaceVec;
    /// let mut vec = InplaceVec::<i32, 2>::new();
    /// vec.push(1).unwrap();
    /// *vec.push(2).unwrap() += 10;
    /// assert_eq!(vec, [1, 12]);
    ///
    /// assert!(vec.push(3).is_err());
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) -> Result<&mut T, Error> {
        self.push_with(|| value)
    }

    /// Constructs an element in place at the back of the vector.
    ///
    /// `f` is only called if there is room for its result. If `f` panics
    /// the vector is unchanged.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if the vector is full.
    #[inline]
    pub fn push_with<F: FnOnce() -> T>(&mut self, f: F) -> Result<&mut T, Error> {
        match self.try_push_with(f) {
            Some(slot) => Ok(slot),
            None => Err(Error::CapacityExceeded {
                required: N + 1,
                capacity: N,
            }),
        }
    }

    /// Appends an element, giving it back if the vector is full.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::InplaceVec;
    /// let mut vec = InplaceVec::<String, 1>::new();
    /// assert!(vec.try_push("a".to_string()).is_ok());
    /// assert_eq!(vec.try_push("b".to_string()), Err("b".to_string()));
    /// assert_eq!(vec, ["a"]);
    /// ```
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<&mut T, T> {
        if self.is_full() {
            cold_path();
            return Err(value);
        }
        // SAFETY: `len < N`.
        Ok(unsafe { self.push_unchecked(value) })
    }

    /// Constructs an element in place at the back, or returns `None` if the
    /// vector is full.
    ///
    /// `f` is not called when there is no room.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::InplaceVec;
    /// let mut vec = InplaceVec::<u8, 1>::new();
    /// assert_eq!(vec.try_push_with(|| 1), Some(&mut 1));
    /// assert_eq!(vec.try_push_with(|| unreachable!()), None);
    /// ```
    #[inline]
    pub fn try_push_with<F: FnOnce() -> T>(&mut self, f: F) -> Option<&mut T> {
        if self.is_full() {
            cold_path();
            return None;
        }
        // SAFETY: `len < N`.
        Some(unsafe { self.push_with_unchecked(f) })
    }

    /// Appends an element to the back of the vector without checking the capacity.
    ///
    /// # Safety
    /// `len < N` before the call.
    #[inline(always)]
    pub unsafe fn push_unchecked(&mut self, value: T) -> &mut T {
        unsafe { self.push_with_unchecked(|| value) }
    }

    /// Constructs an element in place at the back without checking the capacity.
    ///
    /// # Safety
    /// `len < N` before the call.
    #[inline(always)]
    pub unsafe fn push_with_unchecked<F: FnOnce() -> T>(&mut self, f: F) -> &mut T {
        let len = self.len();
        debug_assert!(len < N, "length overflow during `push`");

        let value = f();
        unsafe {
            let slot = self.as_mut_ptr().add(len);
            ptr::write(slot, value);
            self.storage.set_len(len + 1);
            &mut *self.as_mut_ptr().add(len)
        }
    }

    /// Removes the last element and returns it, or `None` if empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::InplaceVec;
    /// let mut vec = InplaceVec::<i32, 5>::new();
    /// vec.push(1).unwrap();
    ///
    /// assert_eq!(vec.pop(), Some(1));
    /// assert_eq!(vec.pop(), None);
    /// ```
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            cold_path();
            None
        } else {
            // SAFETY: the vector is not empty.
            Some(unsafe { self.pop_unchecked() })
        }
    }

    /// Removes the last element without checking that there is one.
    ///
    /// # Safety
    /// The vector must not be empty.
    #[inline(always)]
    pub unsafe fn pop_unchecked(&mut self) -> T {
        let len = self.len();
        debug_assert!(len > 0, "`pop` from an empty InplaceVec");

        unsafe {
            self.storage.set_len(len - 1);
            ptr::read(self.as_ptr().add(len - 1))
        }
    }

    /// Appends every element of an iterator.
    ///
    /// A source whose size hint already exceeds the remaining capacity is
    /// rejected before any element is taken. Otherwise elements are pushed
    /// one at a time; the ones pushed before the error stay in the vector.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if the elements do not fit.
    ///
    /// # Examples
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut vec: InplaceVec<i32, 5> = inplace_vec![1];
    /// vec.append_range([2, 3]).unwrap();
    /// assert_eq!(vec, [1, 2, 3]);
    ///
    /// // Rejected up front, nothing changes.
    /// assert!(vec.append_range([4, 5, 6]).is_err());
    /// assert_eq!(vec, [1, 2, 3]);
    /// ```
    pub fn append_range<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<(), Error> {
        let iter = iter.into_iter();
        self.check_room(iter.size_hint().0)?;
        for item in iter {
            self.push(item)?;
        }
        Ok(())
    }

    /// Inserts an element at position `index`, shifting the following elements
    /// to the right.
    ///
    /// The element is appended first and then rotated into place, so it is
    /// constructed exactly once. On failure the vector is unchanged.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if the vector is full.
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut vec: InplaceVec<i32, 4> = inplace_vec![1, 3];
    /// vec.insert(1, 2).unwrap();
    /// assert_eq!(vec, [1, 2, 3]);
    /// ```
    #[inline]
    pub fn insert(&mut self, index: usize, element: T) -> Result<&mut T, Error> {
        self.insert_with(index, || element)
    }

    /// Constructs an element in place at position `index`.
    ///
    /// `f` is only called if there is room. If it panics, the vector is unchanged.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if the vector is full.
    ///
    /// # Panics
    /// Panics if `index > len`.
    pub fn insert_with<F: FnOnce() -> T>(&mut self, index: usize, f: F) -> Result<&mut T, Error> {
        let len = self.len();
        assert!(index <= len, "insertion index (is {index}) should be <= len (is {len})");

        self.push_with(f)?;
        let tail = &mut self.as_mut_slice()[index..];
        tail.rotate_right(1);
        Ok(&mut tail[0])
    }

    /// Inserts `count` clones of `value` at position `index`.
    ///
    /// Checks the capacity before touching the vector.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if `len + count > N`.
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut vec: InplaceVec<char, 6> = inplace_vec!['a', 'd'];
    /// let inserted = vec.insert_n(1, 2, &'-').unwrap();
    /// assert_eq!(inserted, ['-', '-']);
    /// assert_eq!(vec, ['a', '-', '-', 'd']);
    /// ```
    pub fn insert_n(&mut self, index: usize, count: usize, value: &T) -> Result<&mut [T], Error>
    where
        T: Clone,
    {
        self.insert_range(index, core::iter::repeat_n(value, count).cloned())
    }

    /// Inserts every element of an iterator at position `index`, keeping their order.
    ///
    /// The elements are appended at the back and the block is then rotated
    /// into place. A source whose size hint already exceeds the remaining
    /// capacity is rejected before any change. A source that only turns out
    /// to be too long while being consumed leaves the elements appended so
    /// far at the back of the vector, not rotated.
    ///
    /// Returns the inserted elements.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if the elements do not fit.
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut vec: InplaceVec<i32, 6> = inplace_vec![0, 1, 2, 3];
    /// vec.insert_range(2, [10, 11]).unwrap();
    /// assert_eq!(vec, [0, 1, 10, 11, 2, 3]);
    /// ```
    pub fn insert_range<I>(&mut self, index: usize, iter: I) -> Result<&mut [T], Error>
    where
        I: IntoIterator<Item = T>,
    {
        let len = self.len();
        assert!(index <= len, "insertion index (is {index}) should be <= len (is {len})");

        self.append_range(iter)?;
        let added = self.len() - len;
        let tail = &mut self.as_mut_slice()[index..];
        tail.rotate_right(added);
        Ok(&mut tail[..added])
    }

    /// Clones and appends all elements of a slice.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if the elements do not fit; the vector is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut vec: InplaceVec<_, 5> = inplace_vec![1];
    /// vec.extend_from_slice(&[2, 3, 4]).unwrap();
    /// assert_eq!(vec, [1, 2, 3, 4]);
    /// ```
    pub fn extend_from_slice(&mut self, other: &[T]) -> Result<(), Error>
    where
        T: Clone,
    {
        self.check_room(other.len())?;
        for item in other {
            // SAFETY: room was checked above.
            unsafe { self.push_unchecked(item.clone()) };
        }
        Ok(())
    }

    /// Removes the element at `index`, shifting the following elements to the left.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut vec: InplaceVec<i32, 3> = inplace_vec![1, 2, 3];
    /// vec.erase(0);
    /// assert_eq!(vec, [2, 3]);
    /// ```
    #[inline]
    pub fn erase(&mut self, index: usize) {
        let len = self.len();
        assert!(index < len, "erase index (is {index}) should be < len (is {len})");
        self.erase_range(index..index + 1);
    }

    /// Removes the elements in `range`, shifting the following elements to the left.
    ///
    /// # Panics
    /// Panics if the range is decreasing or ends past `len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut vec: InplaceVec<i32, 6> = inplace_vec![0, 1, 2, 3, 4, 5];
    /// vec.erase_range(1..4);
    /// assert_eq!(vec, [0, 4, 5]);
    /// ```
    pub fn erase_range<R: core::ops::RangeBounds<usize>>(&mut self, range: R) {
        let len = self.len();
        let (start, end) = split_range_bound(&range, len);
        if start == end {
            return;
        }

        unsafe {
            // A panicking destructor leaks the tail instead of dropping twice.
            self.storage.set_len(start);
            let base = self.as_mut_ptr();
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(start), end - start));
            ptr::copy(base.add(end), base.add(start), len - end);
            self.storage.set_len(len - (end - start));
        }
    }

    /// Removes and returns the element at `index`, shifting the following
    /// elements to the left.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut vec: InplaceVec<i32, 5> = inplace_vec![1, 2, 3];
    /// assert_eq!(vec.remove(1), 2);
    /// assert_eq!(vec, [1, 3]);
    /// ```
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len();
        assert!(index < len, "removal index (is {index}) should be < len (is {len})");

        unsafe {
            let ptr = self.as_mut_ptr().add(index);
            let value = ptr::read(ptr);
            ptr::copy(ptr.add(1), ptr, len - index - 1);
            self.storage.set_len(len - 1);
            value
        }
    }

    /// Removes and returns the element at `index`, replacing it with the last element.
    ///
    /// This does not preserve ordering, but is O(1).
    ///
    /// # Panics
    /// Panics if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut vec: InplaceVec<i32, 5> = inplace_vec![1, 2, 3];
    /// assert_eq!(vec.swap_remove(0), 1);
    /// assert_eq!(vec, [3, 2]);
    /// ```
    pub fn swap_remove(&mut self, index: usize) -> T {
        let len = self.len();
        assert!(index < len, "removal index (is {index}) should be < len (is {len})");

        unsafe {
            let base = self.as_mut_ptr();
            let value = ptr::read(base.add(index));
            ptr::copy(base.add(len - 1), base.add(index), 1);
            self.storage.set_len(len - 1);
            value
        }
    }

    /// Shortens the vector, keeping the first `len` elements and dropping the rest.
    ///
    /// Has no effect if `len` is not less than the current length.
    pub fn truncate(&mut self, len: usize) {
        let old_len = self.len();
        if old_len > len {
            unsafe {
                self.storage.set_len(len);
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                    self.as_mut_ptr().add(len),
                    old_len - len,
                ));
            }
        }
    }

    /// Drops every element.
    ///
    /// # Examples
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut v: InplaceVec<i32, 5> = inplace_vec![1, 2, 3];
    /// v.clear();
    /// assert!(v.is_empty());
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resizes the vector so that its length is `new_len`, filling new slots
    /// with the values returned by `f`.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if `new_len > N`; the vector is unchanged.
    ///
    /// # Examples
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut vec: InplaceVec<_, 5> = inplace_vec![1, 2, 3, 4];
    /// vec.resize_with(2, Default::default).unwrap();
    /// assert_eq!(vec, [1, 2]);
    ///
    /// let mut p = 1;
    /// vec.resize_with(5, || { p *= 2; p }).unwrap();
    /// assert_eq!(vec, [1, 2, 2, 4, 8]);
    /// ```
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: usize, mut f: F) -> Result<(), Error> {
        let len = self.len();
        if new_len == len {
            return Ok(());
        }
        if new_len > N {
            cold_path();
            return Err(Error::CapacityExceeded { required: new_len, capacity: N });
        }

        if new_len < len {
            self.truncate(new_len);
        } else {
            for _ in len..new_len {
                // SAFETY: `new_len <= N`.
                unsafe { self.push_with_unchecked(&mut f) };
            }
        }
        Ok(())
    }

    /// Resizes the vector, filling new slots with `T::default()`.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if `new_len > N`.
    #[inline]
    pub fn resize_default(&mut self, new_len: usize) -> Result<(), Error>
    where
        T: Default,
    {
        self.resize_with(new_len, T::default)
    }

    /// Replaces the content with the elements of an iterator.
    ///
    /// The old elements are dropped first.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if the new elements do not fit.
    pub fn assign_range<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<(), Error> {
        self.clear();
        self.append_range(iter)
    }

    /// Swaps the content of two vectors.
    ///
    /// Storage is never shared, so this exchanges every element of both.
    ///
    /// # Examples
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut a: InplaceVec<i32, 4> = inplace_vec![1, 2, 3];
    /// let mut b: InplaceVec<i32, 4> = inplace_vec![9];
    /// a.swap(&mut b);
    /// assert_eq!(a, [9]);
    /// assert_eq!(b, [1, 2, 3]);
    /// ```
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut vec: InplaceVec<_, 5> = inplace_vec![1, 2, 3, 4];
    /// vec.retain(|v| *v % 2 == 0);
    /// assert_eq!(vec, [2, 4]);
    /// ```
    #[inline]
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut f: F) {
        self.retain_mut(|v| f(v));
    }

    /// Retains only the elements specified by the predicate, passing a mutable reference to it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut vec: InplaceVec<_, 5> = inplace_vec![1, 2, 3, 4];
    /// vec.retain_mut(|v| {
    ///     *v += 10;
    ///     *v % 2 != 0
    /// });
    /// assert_eq!(vec, [11, 13]);
    /// ```
    pub fn retain_mut<F: FnMut(&mut T) -> bool>(&mut self, mut f: F) {
        let len = self.len();
        let mut count = 0usize;
        unsafe {
            // A panicking predicate leaks the rest instead of dropping twice.
            self.storage.set_len(0);
            let base = self.as_mut_ptr();
            for index in 0..len {
                let cur = base.add(index);
                if f(&mut *cur) {
                    if index != count {
                        ptr::copy_nonoverlapping(cur, base.add(count), 1);
                    }
                    count += 1;
                } else {
                    ptr::drop_in_place(cur);
                }
            }
            self.storage.set_len(count);
        }
    }

    /// Removes the subslice indicated by the given range, returning a
    /// double-ended iterator over the removed elements.
    ///
    /// If the iterator is dropped before being fully consumed, it drops the
    /// remaining removed elements.
    ///
    /// # Panics
    /// Panics if the range is decreasing or ends past `len`.
    ///
    /// # Examples
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut v: InplaceVec<_, 5> = inplace_vec![1, 2, 3];
    /// let u: Vec<_> = v.drain(1..).collect();
    /// assert_eq!(v, [1]);
    /// assert_eq!(u, [2, 3]);
    ///
    /// v.drain(..);
    /// assert!(v.is_empty());
    /// ```
    pub fn drain<R: core::ops::RangeBounds<usize>>(&mut self, range: R) -> Drain<'_, T, N, S> {
        let len = self.len();
        let (start, end) = split_range_bound(&range, len);

        unsafe { self.storage.set_len(start) };

        Drain {
            front: start,
            back: end,
            tail_start: end,
            tail_len: len - end,
            vec: NonNull::from(self),
            marker: PhantomData,
        }
    }
}

impl<T: Clone, const N: usize, S: Storage<T, N>> InplaceVec<T, N, S> {
    /// Creates a vector with `num` copies of `elem`.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if `num > N`.
    ///
    /// # Examples
    /// ```
    /// # use inplacevec::InplaceVec;
    /// let vec: InplaceVec<i32, 5> = InplaceVec::from_elem(1, 4).unwrap();
    /// assert_eq!(vec, [1, 1, 1, 1]);
    /// ```
    pub fn from_elem(elem: T, num: usize) -> Result<Self, Error> {
        let mut vec = Self::new();
        vec.resize(num, elem)?;
        Ok(vec)
    }

    /// Resizes the vector so that its length is `new_len`, filling new slots
    /// with clones of `value`.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if `new_len > N`; the vector is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let mut vec: InplaceVec<_, 5> = inplace_vec!["hello"];
    /// vec.resize(3, "world").unwrap();
    /// assert_eq!(vec, ["hello", "world", "world"]);
    ///
    /// vec.resize(1, "_").unwrap();
    /// assert_eq!(vec, ["hello"]);
    /// ```
    pub fn resize(&mut self, new_len: usize, value: T) -> Result<(), Error> {
        let len = self.len();
        if new_len <= len {
            self.truncate(new_len);
            return Ok(());
        }
        if new_len > N {
            cold_path();
            return Err(Error::CapacityExceeded { required: new_len, capacity: N });
        }

        unsafe {
            for _ in len + 1..new_len {
                self.push_unchecked(value.clone());
            }
            // The last slot takes `value` itself.
            self.push_unchecked(value);
        }
        Ok(())
    }

    /// Replaces the content with `num` clones of `value`.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if `num > N`; the old content is dropped anyway.
    pub fn assign_elem(&mut self, value: T, num: usize) -> Result<(), Error> {
        self.clear();
        self.resize(num, value)
    }
}

impl<T, const N: usize, S: Storage<T, N>> Default for InplaceVec<T, N, S> {
    /// Same as [`InplaceVec::new`].
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const N: usize, S: Storage<T, N>> Clone for InplaceVec<T, N, S> {
    /// Clones every element into a new vector.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::{InplaceVec, inplace_vec};
    /// let vec: InplaceVec<String, 5> = inplace_vec!["a".to_string()];
    /// let mut copy = vec.clone();
    /// copy[0].push('b');
    /// assert_eq!(vec, ["a"]);
    /// assert_eq!(copy, ["ab"]);
    /// ```
    fn clone(&self) -> Self {
        let mut vec = Self::new();
        for item in self.as_slice() {
            unsafe { vec.push_unchecked(item.clone()) };
        }
        vec
    }

    /// Drops the current elements, then clones every element of `source`.
    fn clone_from(&mut self, source: &Self) {
        self.clear();
        for item in source.as_slice() {
            unsafe { self.push_unchecked(item.clone()) };
        }
    }
}

impl<'a, T: 'a + Clone, const N: usize, S: Storage<T, N>> Extend<&'a T> for InplaceVec<T, N, S> {
    /// Clones values from an iterator.
    ///
    /// # Panics
    /// Insufficient capacity.
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        if let Err(err) = self.append_range(iter.into_iter().cloned()) {
            panic!("{err}");
        }
    }
}

impl<T, const N: usize, S: Storage<T, N>> Extend<T> for InplaceVec<T, N, S> {
    /// Extends the vector with the contents of an iterator.
    ///
    /// # Panics
    /// Insufficient capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::InplaceVec;
    /// let mut vec: InplaceVec<i32, 5> = InplaceVec::new();
    /// vec.extend([1, 2, 3]);
    /// assert_eq!(vec, [1, 2, 3]);
    /// ```
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(err) = self.append_range(iter) {
            panic!("{err}");
        }
    }
}

impl<T, const N: usize, S: Storage<T, N>> FromIterator<T> for InplaceVec<T, N, S> {
    /// # Panics
    /// Insufficient capacity, see [`InplaceVec::try_from_iter`] for a checked version.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        match Self::try_from_iter(iter) {
            Ok(vec) => vec,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T: Clone, const N: usize, S: Storage<T, N>> TryFrom<&[T]> for InplaceVec<T, N, S> {
    type Error = Error;

    /// # Examples
    ///
    /// ```
    /// # use inplacevec::InplaceVec;
    /// let vec = <InplaceVec<i32, 3>>::try_from([1, 2, 3].as_slice()).unwrap();
    /// assert_eq!(vec, [1, 2, 3]);
    /// ```
    fn try_from(value: &[T]) -> Result<Self, Self::Error> {
        let mut vec = Self::new();
        vec.extend_from_slice(value)?;
        Ok(vec)
    }
}

impl<T: Clone, const N: usize, S: Storage<T, N>> TryFrom<&mut [T]> for InplaceVec<T, N, S> {
    type Error = Error;

    #[inline]
    fn try_from(value: &mut [T]) -> Result<Self, Self::Error> {
        <Self as TryFrom<&[T]>>::try_from(value)
    }
}

impl<T, const N: usize, const P: usize, S: Storage<T, N>> TryFrom<[T; P]> for InplaceVec<T, N, S> {
    type Error = Error;

    /// Moves the elements of an array into a new vector.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inplacevec::{InplaceVec, Error};
    /// let vec = <InplaceVec<i32, 3>>::try_from([1, 2, 3]).unwrap();
    /// assert_eq!(vec, [1, 2, 3]);
    ///
    /// let err = <InplaceVec<i32, 2>>::try_from([1, 2, 3]).unwrap_err();
    /// assert_eq!(err, Error::CapacityExceeded { required: 3, capacity: 2 });
    /// ```
    fn try_from(value: [T; P]) -> Result<Self, Self::Error> {
        if P > N {
            cold_path();
            return Err(Error::CapacityExceeded { required: P, capacity: N });
        }
        let value = ManuallyDrop::new(value);
        let mut vec = Self::new();
        unsafe {
            ptr::copy_nonoverlapping(value.as_ptr(), vec.as_mut_ptr(), P);
            vec.storage.set_len(P);
        }
        Ok(vec)
    }
}

impl<T, const N: usize, S: Storage<T, N>> core::ops::Deref for InplaceVec<T, N, S> {
    type Target = [T];
    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, const N: usize, S: Storage<T, N>> core::ops::DerefMut for InplaceVec<T, N, S> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, const N: usize, S: Storage<T, N>> fmt::Debug for InplaceVec<T, N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

impl<T, const N: usize, S: Storage<T, N>> AsRef<[T]> for InplaceVec<T, N, S> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize, S: Storage<T, N>> AsMut<[T]> for InplaceVec<T, N, S> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, const N: usize, S: Storage<T, N>> core::borrow::Borrow<[T]> for InplaceVec<T, N, S> {
    #[inline]
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize, S: Storage<T, N>> core::borrow::BorrowMut<[T]> for InplaceVec<T, N, S> {
    #[inline]
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: core::hash::Hash, const N: usize, S: Storage<T, N>> core::hash::Hash for InplaceVec<T, N, S> {
    #[inline]
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        core::hash::Hash::hash(self.as_slice(), state);
    }
}

impl<T, I: slice::SliceIndex<[T]>, const N: usize, S: Storage<T, N>> core::ops::Index<I>
    for InplaceVec<T, N, S>
{
    type Output = <I as slice::SliceIndex<[T]>>::Output;
    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        core::ops::Index::index(self.as_slice(), index)
    }
}

impl<T, I: slice::SliceIndex<[T]>, const N: usize, S: Storage<T, N>> core::ops::IndexMut<I>
    for InplaceVec<T, N, S>
{
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        core::ops::IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<'a, T, const N: usize, S: Storage<T, N>> IntoIterator for &'a InplaceVec<T, N, S> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, const N: usize, S: Storage<T, N>> IntoIterator for &'a mut InplaceVec<T, N, S> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T: Ord, const N: usize, S: Storage<T, N>> Ord for InplaceVec<T, N, S> {
    /// Lexicographic comparison.
    #[inline]
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        Ord::cmp(self.as_slice(), other.as_slice())
    }
}

impl<T: PartialOrd, const N: usize, S: Storage<T, N>> PartialOrd for InplaceVec<T, N, S> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        PartialOrd::partial_cmp(self.as_slice(), other.as_slice())
    }
}

impl<T: Eq, const N: usize, S: Storage<T, N>> Eq for InplaceVec<T, N, S> {}

impl<T, U, const N: usize, const M: usize, S, R> PartialEq<InplaceVec<U, M, R>>
    for InplaceVec<T, N, S>
where
    T: PartialEq<U>,
    S: Storage<T, N>,
    R: Storage<U, M>,
{
    /// Lengths are compared first, then the elements in order.
    #[inline]
    fn eq(&self, other: &InplaceVec<U, M, R>) -> bool {
        self.len() == other.len() && PartialEq::eq(self.as_slice(), other.as_slice())
    }
}

impl<T, U, const N: usize, S: Storage<T, N>> PartialEq<[U]> for InplaceVec<T, N, S>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &[U]) -> bool {
        PartialEq::eq(self.as_slice(), other)
    }
}

impl<T, U, const N: usize, S: Storage<T, N>> PartialEq<&[U]> for InplaceVec<T, N, S>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &&[U]) -> bool {
        PartialEq::eq(self.as_slice(), *other)
    }
}

impl<T, U, const N: usize, const P: usize, S: Storage<T, N>> PartialEq<[U; P]>
    for InplaceVec<T, N, S>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &[U; P]) -> bool {
        PartialEq::eq(self.as_slice(), other.as_slice())
    }
}

impl<T, U, const N: usize, const P: usize, S: Storage<T, N>> PartialEq<&[U; P]>
    for InplaceVec<T, N, S>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &&[U; P]) -> bool {
        PartialEq::eq(self.as_slice(), other.as_slice())
    }
}

/// An iterator that consumes an [`InplaceVec`] and yields its items by value.
///
/// # Examples
///
/// ```
/// # use inplacevec::{InplaceVec, inplace_vec};
/// let vec: InplaceVec<&'static str, 3> = inplace_vec!["1", "2", "3"];
/// let mut iter = vec.into_iter();
///
/// assert_eq!(iter.next(), Some("1"));
/// assert_eq!(iter.next_back(), Some("3"));
/// assert_eq!(iter.as_slice(), ["2"]);
/// ```
pub struct IntoIter<T, const N: usize, S: Storage<T, N> = NonTrivial<T, N>> {
    vec: ManuallyDrop<InplaceVec<T, N, S>>,
    index: usize,
}

impl<T, const N: usize, S: Storage<T, N>> IntoIterator for InplaceVec<T, N, S> {
    type Item = T;
    type IntoIter = IntoIter<T, N, S>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            vec: ManuallyDrop::new(self),
            index: 0,
        }
    }
}

impl<T, const N: usize, S: Storage<T, N>> IntoIter<T, N, S> {
    /// Returns the remaining items as a slice.
    pub fn as_slice(&self) -> &[T] {
        let len = self.vec.len() - self.index;
        unsafe { slice::from_raw_parts(self.vec.as_ptr().add(self.index), len) }
    }

    /// Returns the remaining items as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.vec.len() - self.index;
        unsafe { slice::from_raw_parts_mut(self.vec.as_mut_ptr().add(self.index), len) }
    }
}

impl<T, const N: usize, S: Storage<T, N>> Iterator for IntoIter<T, N, S> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.vec.len() {
            self.index += 1;
            unsafe { Some(ptr::read(self.vec.as_ptr().add(self.index - 1))) }
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let v = self.vec.len() - self.index;
        (v, Some(v))
    }
}

impl<T, const N: usize, S: Storage<T, N>> DoubleEndedIterator for IntoIter<T, N, S> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let len = self.vec.len();
        if self.index < len {
            unsafe {
                self.vec.storage.set_len(len - 1);
                Some(ptr::read(self.vec.as_ptr().add(len - 1)))
            }
        } else {
            None
        }
    }
}

impl<T, const N: usize, S: Storage<T, N>> ExactSizeIterator for IntoIter<T, N, S> {
    #[inline]
    fn len(&self) -> usize {
        self.vec.len() - self.index
    }
}

impl<T, const N: usize, S: Storage<T, N>> FusedIterator for IntoIter<T, N, S> {}

impl<T, const N: usize, S: Storage<T, N>> Drop for IntoIter<T, N, S> {
    fn drop(&mut self) {
        let len = self.vec.len();
        if self.index < len {
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                    self.vec.as_mut_ptr().add(self.index),
                    len - self.index,
                ));
            }
        }
    }
}

impl<T: fmt::Debug, const N: usize, S: Storage<T, N>> fmt::Debug for IntoIter<T, N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

/// An iterator that removes the items from an [`InplaceVec`] and yields them by value.
///
/// See [`InplaceVec::drain`].
pub struct Drain<'a, T, const N: usize, S: Storage<T, N> = NonTrivial<T, N>> {
    /// Next element to yield from the front.
    front: usize,
    /// One past the next element to yield from the back.
    back: usize,
    tail_start: usize,
    tail_len: usize,
    vec: NonNull<InplaceVec<T, N, S>>,
    marker: PhantomData<&'a mut InplaceVec<T, N, S>>,
}

impl<T, const N: usize, S: Storage<T, N>> Drain<'_, T, N, S> {
    /// Returns the items not yet yielded as a slice.
    pub fn as_slice(&self) -> &[T] {
        unsafe {
            let base = self.vec.as_ref().as_ptr();
            slice::from_raw_parts(base.add(self.front), self.back - self.front)
        }
    }
}

unsafe impl<T: Send, const N: usize, S: Storage<T, N> + Send> Send for Drain<'_, T, N, S> {}

unsafe impl<T: Sync, const N: usize, S: Storage<T, N> + Sync> Sync for Drain<'_, T, N, S> {}

impl<T: fmt::Debug, const N: usize, S: Storage<T, N>> fmt::Debug for Drain<'_, T, N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Drain").field(&self.as_slice()).finish()
    }
}

impl<T, const N: usize, S: Storage<T, N>> Iterator for Drain<'_, T, N, S> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.front < self.back {
            self.front += 1;
            unsafe { Some(ptr::read(self.vec.as_ref().as_ptr().add(self.front - 1))) }
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let v = self.back - self.front;
        (v, Some(v))
    }
}

impl<T, const N: usize, S: Storage<T, N>> DoubleEndedIterator for Drain<'_, T, N, S> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.front < self.back {
            self.back -= 1;
            unsafe { Some(ptr::read(self.vec.as_ref().as_ptr().add(self.back))) }
        } else {
            None
        }
    }
}

impl<T, const N: usize, S: Storage<T, N>> ExactSizeIterator for Drain<'_, T, N, S> {}

impl<T, const N: usize, S: Storage<T, N>> FusedIterator for Drain<'_, T, N, S> {}

impl<T, const N: usize, S: Storage<T, N>> Drop for Drain<'_, T, N, S> {
    fn drop(&mut self) {
        /// Moves back the un-`Drain`ed tail, even if dropping an item panics.
        struct DropGuard<'r, 'a, T, const N: usize, S: Storage<T, N>>(&'r mut Drain<'a, T, N, S>);

        impl<T, const N: usize, S: Storage<T, N>> Drop for DropGuard<'_, '_, T, N, S> {
            fn drop(&mut self) {
                let drain = &mut *self.0;
                unsafe {
                    let vec = drain.vec.as_mut();
                    let start = vec.len();
                    if drain.tail_len > 0 && drain.tail_start != start {
                        let base = vec.as_mut_ptr();
                        ptr::copy(base.add(drain.tail_start), base.add(start), drain.tail_len);
                    }
                    vec.storage.set_len(start + drain.tail_len);
                }
            }
        }

        let (front, back) = (self.front, self.back);
        self.front = back;

        let guard = DropGuard(self);
        if front < back {
            unsafe {
                let base = guard.0.vec.as_mut().as_mut_ptr();
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(front), back - front));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CopyVec, EmptyVec};
    use core::cell::Cell;
    use std::{rc::Rc, string::String, string::ToString, vec::Vec};

    /// Counts live instances through a shared counter.
    struct Counted {
        live: Rc<Cell<isize>>,
    }

    impl Counted {
        fn new(live: &Rc<Cell<isize>>) -> Self {
            live.set(live.get() + 1);
            Self { live: live.clone() }
        }
    }

    impl Clone for Counted {
        fn clone(&self) -> Self {
            Self::new(&self.live)
        }
    }

    impl Drop for Counted {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    #[test]
    fn push_until_full() {
        let mut vec: InplaceVec<i32, 5> = InplaceVec::new();
        for i in 0..5 {
            assert_eq!(vec.push(i), Ok(&mut { i }));
            assert_eq!(vec.len(), i as usize + 1);
            assert_eq!(vec.capacity(), 5);
        }
        assert_eq!(
            vec.push(5),
            Err(Error::CapacityExceeded { required: 6, capacity: 5 })
        );
        assert_eq!(vec.len(), 5);
        assert_eq!(vec.capacity(), 5);
        assert_eq!(vec, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn try_tier_hands_back() {
        let mut vec: InplaceVec<String, 1> = InplaceVec::new();
        assert!(vec.try_push("a".to_string()).is_ok());
        assert_eq!(vec.try_push("b".to_string()), Err("b".to_string()));

        let mut called = false;
        assert!(vec.try_push_with(|| { called = true; String::new() }).is_none());
        assert!(!called);
        assert_eq!(vec, ["a"]);
    }

    #[test]
    fn unchecked_tier() {
        let mut vec: CopyVec<u8, 3, u8> = CopyVec::new();
        unsafe {
            vec.push_unchecked(1);
            *vec.push_with_unchecked(|| 2) += 1;
            assert_eq!(vec.pop_unchecked(), 3);
        }
        assert_eq!(vec, [1]);
    }

    #[test]
    fn erase_first() {
        let mut vec: InplaceVec<i32, 3> = inplace_vec![1, 2, 3];
        vec.erase(0);
        assert_eq!(vec, [2, 3]);
        assert_eq!(vec.len(), 2);
    }

    #[test]
    fn erase_range_drops_span() {
        let live = Rc::new(Cell::new(0));
        let mut vec: InplaceVec<Counted, 6> = InplaceVec::new();
        for _ in 0..6 {
            vec.push(Counted::new(&live)).ok().unwrap();
        }
        vec.erase_range(1..4);
        assert_eq!(vec.len(), 3);
        assert_eq!(live.get(), 3);

        vec.erase_range(1..1);
        assert_eq!(live.get(), 3);

        drop(vec);
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn insert_rotates_block() {
        let mut vec: InplaceVec<i32, 8> = (0..6).collect();
        let inserted = vec.insert_range(2, [100, 101]).unwrap();
        assert_eq!(inserted, [100, 101]);
        assert_eq!(vec, [0, 1, 100, 101, 2, 3, 4, 5]);

        assert_eq!(vec.insert(8, 7), Err(Error::CapacityExceeded { required: 9, capacity: 8 }));
        assert_eq!(vec, [0, 1, 100, 101, 2, 3, 4, 5]);
    }

    #[test]
    fn insert_at_end_and_front() {
        let mut vec: InplaceVec<char, 4> = InplaceVec::new();
        vec.insert(0, 'b').unwrap();
        vec.insert(0, 'a').unwrap();
        vec.insert(2, 'c').unwrap();
        assert_eq!(vec, ['a', 'b', 'c']);
    }

    #[test]
    #[should_panic(expected = "insertion index")]
    fn insert_past_len() {
        let mut vec: InplaceVec<i32, 4> = inplace_vec![1];
        let _ = vec.insert(2, 5);
    }

    #[test]
    fn sized_bulk_insert_is_atomic() {
        let mut vec: InplaceVec<i32, 4> = inplace_vec![1, 2];
        assert!(vec.insert_range(1, [7, 8, 9]).is_err());
        assert_eq!(vec, [1, 2]);
        assert!(vec.insert_n(0, 3, &0).is_err());
        assert_eq!(vec, [1, 2]);
    }

    #[test]
    fn unsized_bulk_insert_may_leave_tail() {
        let mut vec: InplaceVec<i32, 4> = inplace_vec![1, 2];
        // `filter` hides the exact length.
        let source = [7, 8, 9].into_iter().filter(|_| true);
        assert_eq!(
            vec.insert_range(0, source),
            Err(Error::CapacityExceeded { required: 5, capacity: 4 })
        );
        // Appended, not rotated.
        assert_eq!(vec, [1, 2, 7, 8]);
    }

    #[test]
    fn panicking_constructor_leaves_vec_unchanged() {
        let mut vec: InplaceVec<String, 4> = inplace_vec!["a".to_string()];
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = vec.insert_with(0, || panic!("boom"));
        }));
        assert!(result.is_err());
        assert_eq!(vec, ["a"]);
    }

    #[test]
    fn resize_counts_instances() {
        let live = Rc::new(Cell::new(0));
        let mut vec: InplaceVec<Counted, 8> = InplaceVec::new();
        vec.resize(5, Counted::new(&live)).ok().unwrap();
        assert_eq!(live.get(), 5);

        vec.resize(2, Counted::new(&live)).ok().unwrap();
        assert_eq!(vec.len(), 2);
        assert_eq!(live.get(), 2);

        assert!(vec.resize(9, Counted::new(&live)).is_err());
        assert_eq!(live.get(), 2);

        vec.clear();
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn resize_default_and_same_len() {
        let mut vec: InplaceVec<i32, 4> = inplace_vec![1, 2];
        vec.resize_default(4).unwrap();
        assert_eq!(vec, [1, 2, 0, 0]);
        vec.resize_default(4).unwrap();
        assert_eq!(vec, [1, 2, 0, 0]);
        assert!(vec.resize_default(5).is_err());
    }

    #[test]
    fn constructors() {
        assert_eq!(InplaceVec::<i32, 3>::with_default(3).unwrap(), [0, 0, 0]);
        assert!(InplaceVec::<i32, 3>::with_default(4).is_err());
        assert_eq!(InplaceVec::<i32, 3>::from_elem(7, 2).unwrap(), [7, 7]);
        assert!(InplaceVec::<i32, 3>::from_elem(7, 4).is_err());
        assert!(InplaceVec::<i32, 3>::try_from([1, 2, 3, 4].as_slice()).is_err());
    }

    #[test]
    fn try_from_iter_drops_partial() {
        let live = Rc::new(Cell::new(0));
        let source = (0..5).map(|_| Counted::new(&live)).filter(|_| true);
        assert!(InplaceVec::<Counted, 3>::try_from_iter(source).is_err());
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn try_from_iter_rejects_sized_source_up_front() {
        let mut pulled = 0;
        let source = (0..5).map(|i| {
            pulled += 1;
            i
        });
        assert!(InplaceVec::<i32, 3>::try_from_iter(source).is_err());
        assert_eq!(pulled, 0);
    }

    #[test]
    fn access() {
        let mut vec: InplaceVec<i32, 42> = inplace_vec![1, 1337, 42, 12, 0, -1];
        assert_eq!(vec[3], 12);
        vec[3] = 4;
        assert_eq!(*vec.front(), 1);
        assert_eq!(*vec.back(), -1);
        *vec.back_mut() = -2;
        *vec.front_mut() = 2;
        assert_eq!(vec, [2, 1337, 42, 4, 0, -2]);
        assert_eq!(vec.as_ptr(), vec.front() as *const i32);

        assert_eq!(vec.at(5), Ok(&-2));
        assert_eq!(vec.at(6), Err(Error::OutOfRange { index: 6, len: 6 }));
        *vec.at_mut(0).unwrap() = 3;
        assert_eq!(vec[0], 3);
    }

    #[test]
    #[should_panic(expected = "empty")]
    fn front_on_empty() {
        let vec: InplaceVec<i32, 2> = InplaceVec::new();
        vec.front();
    }

    #[test]
    fn clone_is_independent() {
        let a: InplaceVec<String, 4> = inplace_vec!["x".to_string(), "y".to_string()];
        let mut b = a.clone();
        assert_eq!(a, b);
        b[0].push('!');
        b.pop();
        assert_eq!(a, ["x", "y"]);
        assert_eq!(b, ["x!"]);

        let mut c: InplaceVec<String, 4> = inplace_vec!["z".to_string()];
        c.clone_from(&a);
        assert_eq!(c, a);
    }

    #[test]
    fn assign() {
        let mut vec: InplaceVec<i32, 4> = inplace_vec![1, 2, 3];
        vec.assign_range([9, 8]).unwrap();
        assert_eq!(vec, [9, 8]);
        vec.assign_elem(5, 4).unwrap();
        assert_eq!(vec, [5, 5, 5, 5]);
        assert!(vec.assign_elem(5, 5).is_err());
        assert!(vec.is_empty());
    }

    #[test]
    fn swap_exchanges() {
        let mut a: InplaceVec<String, 4> = inplace_vec!["a".to_string()];
        let mut b: InplaceVec<String, 4> = inplace_vec!["b".to_string(), "c".to_string()];
        a.swap(&mut b);
        a[0].push('!');
        assert_eq!(a, ["b!", "c"]);
        assert_eq!(b, ["a"]);
    }

    #[test]
    fn ordering() {
        let a: CopyVec<i32, 4> = inplace_vec![1, 2, 3];
        let b: CopyVec<i32, 4> = inplace_vec![1, 3];
        let c: CopyVec<i32, 4> = inplace_vec![1, 2];
        assert!(a < b);
        assert!(c < a);
        assert_eq!(a.cmp(&a), core::cmp::Ordering::Equal);
        assert_ne!(a, c);
    }

    #[test]
    fn reserve_and_shrink() {
        let mut vec: InplaceVec<u8, 4> = inplace_vec![1, 2, 3];
        assert!(vec.reserve(4).is_ok());
        assert_eq!(vec.reserve(5), Err(Error::CapacityExceeded { required: 5, capacity: 4 }));
        vec.shrink_to_fit();
        assert_eq!(vec.capacity(), 4);
        assert_eq!(InplaceVec::<u8, 4>::max_size(), 4);
        assert_eq!(InplaceVec::<u8, 4>::CAPACITY, 4);
    }

    #[test]
    fn zero_capacity() {
        let mut vec: EmptyVec<i32> = EmptyVec::new();
        assert_eq!(mem::size_of::<EmptyVec<i32>>(), 0);
        assert_eq!(vec.len(), 0);
        assert!(vec.is_empty());
        assert!(vec.iter().next().is_none());
        assert_eq!(vec.try_push(1), Err(1));
        assert!(vec.push(1).is_err());
        assert_eq!(vec.pop(), None);
        vec.clear();

        let copy = vec;
        assert_eq!(copy, vec);
    }

    #[test]
    fn trivial_vec_is_copy() {
        let mut a: CopyVec<u8, 200, u8> = CopyVec::new();
        assert_eq!(mem::size_of_val(&a), 201);
        a.extend_from_slice(b"abc").unwrap();

        let mut b = a;
        b.push(b'd').unwrap();
        assert_eq!(a, b"abc");
        assert_eq!(b, b"abcd");
    }

    #[test]
    fn const_construction() {
        const EMPTY: CopyVec<u32, 8, u8> = CopyVec::new();
        const CAPACITY: usize = EMPTY.capacity();
        assert_eq!(CAPACITY, 8);
        assert!(EMPTY.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "length overflow")]
    fn push_unchecked_on_full() {
        let mut vec = CopyVec::<u8, 2>::from_array([1, 2]);
        unsafe { vec.push_unchecked(3) };
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "from an empty InplaceVec")]
    fn pop_unchecked_on_empty() {
        let mut vec: InplaceVec<String, 2> = InplaceVec::new();
        unsafe { vec.pop_unchecked() };
    }

    const FIB: CopyVec<u64, 12, u8> = {
        let mut vec = CopyVec::<u64, 12, u8>::from_array([0, 1]);
        loop {
            let seq = vec.storage().as_slice();
            let next = seq[seq.len() - 1] + seq[seq.len() - 2];
            if vec.storage_mut().try_push(next).is_err() {
                break;
            }
        }
        vec
    };

    const FIB_SUM: u64 = {
        let seq = FIB.storage().as_slice();
        let mut total = 0;
        let mut i = 0;
        while i < seq.len() {
            total += seq[i];
            i += 1;
        }
        total
    };

    const _: () = assert!(FIB.storage().is_full());
    const _: () = assert!(FIB.storage().len() == FIB.capacity());

    #[test]
    fn constant_evaluation() {
        assert_eq!(FIB, [0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89]);
        assert_eq!(FIB_SUM, 232);

        const TRIMMED: CopyVec<u64, 12, u8> = {
            let mut vec = FIB;
            while vec.storage().len() > 3 {
                vec.storage_mut().pop();
            }
            vec
        };
        assert_eq!(TRIMMED, [0, 1, 1]);

        const NOTHING: EmptyVec<u64> = EmptyVec::new();
        const _: () = assert!(NOTHING.storage().is_empty());
        assert_eq!(NOTHING.storage().as_slice(), NOTHING.as_slice());
    }

    #[test]
    fn overflowing_ranges_panic_and_keep_elements() {
        use core::ops::Bound;
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let mut vec: InplaceVec<i32, 4> = (0..4).collect();
        let ranges = [
            (Bound::Excluded(usize::MAX), Bound::Unbounded),
            (Bound::Included(0), Bound::Included(usize::MAX)),
        ];
        for range in ranges {
            assert!(catch_unwind(AssertUnwindSafe(|| vec.erase_range(range))).is_err());
            assert!(catch_unwind(AssertUnwindSafe(|| drop(vec.drain(range)))).is_err());
            assert_eq!(vec, [0, 1, 2, 3]);
        }
    }

    #[test]
    fn remove_and_swap_remove() {
        let mut vec: InplaceVec<i32, 5> = inplace_vec![1, 2, 3, 4];
        assert_eq!(vec.remove(1), 2);
        assert_eq!(vec.swap_remove(0), 1);
        assert_eq!(vec, [4, 3]);
    }

    #[test]
    fn retain_drops_rejected() {
        let live = Rc::new(Cell::new(0));
        let mut vec: InplaceVec<(usize, Counted), 6> = InplaceVec::new();
        for i in 0..6 {
            vec.push((i, Counted::new(&live))).ok().unwrap();
        }
        vec.retain(|(i, _)| i % 3 == 0);
        assert_eq!(live.get(), 2);
        assert_eq!(vec.iter().map(|(i, _)| *i).collect::<Vec<_>>(), [0, 3]);
    }

    #[test]
    fn drain_partial_consumption() {
        let live = Rc::new(Cell::new(0));
        let mut vec: InplaceVec<(usize, Counted), 6> = InplaceVec::new();
        for i in 0..6 {
            vec.push((i, Counted::new(&live))).ok().unwrap();
        }
        {
            let mut drain = vec.drain(1..4);
            assert_eq!(drain.len(), 3);
            assert_eq!(drain.next().map(|(i, _)| i), Some(1));
            assert_eq!(drain.next_back().map(|(i, _)| i), Some(3));
        }
        assert_eq!(live.get(), 3);
        assert_eq!(vec.iter().map(|(i, _)| *i).collect::<Vec<_>>(), [0, 4, 5]);
    }

    #[test]
    fn into_iter_drops_rest() {
        let live = Rc::new(Cell::new(0));
        let mut vec: InplaceVec<Counted, 4> = InplaceVec::new();
        for _ in 0..4 {
            vec.push(Counted::new(&live)).ok().unwrap();
        }
        let mut iter = vec.into_iter();
        drop(iter.next());
        drop(iter.next_back());
        assert_eq!(iter.len(), 2);
        assert_eq!(live.get(), 2);
        drop(iter);
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn zero_sized_elements() {
        let mut vec: InplaceVec<(), 3> = InplaceVec::new();
        vec.push(()).unwrap();
        vec.push(()).unwrap();
        vec.insert(0, ()).unwrap();
        assert!(vec.push(()).is_err());
        vec.erase(1);
        assert_eq!(vec.len(), 2);
        assert_eq!(vec.into_iter().count(), 2);
    }

    #[test]
    fn small_len_type() {
        let mut vec: InplaceVec<String, 255, NonTrivial<String, 255, u8>> = InplaceVec::new();
        vec.resize_with(255, String::new).unwrap();
        assert_eq!(vec.len(), 255);
        assert!(vec.is_full());
    }

    #[test]
    #[should_panic(expected = "capacity exceeded")]
    fn extend_panics_on_overflow() {
        let mut vec: InplaceVec<i32, 2> = InplaceVec::new();
        vec.extend([1, 2, 3]);
    }
}
