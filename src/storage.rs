//! Backing storage for [`InplaceVec`](crate::InplaceVec).
//!
//! A storage reserves slots for `N` elements and tracks how many of them
//! are live. It never constructs or drops elements inside the live range
//! by itself; that is the job of the vector built on top of it.
//!
//! Three layouts exist, and the vector picks one through its third
//! generic parameter:
//!
//! | Storage | Usable when | Notes |
//! |---------|-------------|-------|
//! | [`ZeroSized`] | `N == 0` | no data at all, the vector is a ZST |
//! | [`Trivial`] | `T: Copy` | `Copy`, no `Drop`, `const`-constructible |
//! | [`NonTrivial`] | any `T` | drops its live prefix when dropped |
//!
//! The count is stored as a [`LenType`], so a vector of at most 255
//! elements can keep its length in a single byte.

use core::{
    marker::PhantomData,
    mem::MaybeUninit,
    ptr::{self, NonNull},
};

mod sealed {
    pub trait Sealed {}
}

/// Unsigned integer used to store the number of live elements.
///
/// Implemented for `u8`, `u16`, `u32`, `u64` and `usize`.
pub trait LenType: Copy + sealed::Sealed {
    /// Zero of this type.
    const ZERO: Self;

    /// The largest length this type can hold, saturated to `usize`.
    const MAX: usize;

    /// Widens the length to `usize`.
    fn to_usize(self) -> usize;

    /// Converts a length that is known to fit.
    fn from_usize(len: usize) -> Self;
}

macro_rules! impl_len_type {
    ($($ty:ty),+) => {$(
        impl sealed::Sealed for $ty {}

        impl LenType for $ty {
            const ZERO: Self = 0;
            const MAX: usize = if (<$ty>::MAX as u128) < (usize::MAX as u128) {
                <$ty>::MAX as usize
            } else {
                usize::MAX
            };

            #[inline(always)]
            fn to_usize(self) -> usize {
                self as usize
            }

            #[inline(always)]
            fn from_usize(len: usize) -> Self {
                debug_assert!(len <= <Self as LenType>::MAX, "length does not fit the length type");
                len as $ty
            }
        }
    )+};
}

impl_len_type!(u8, u16, u32, u64, usize);

/// Raw-access protocol between a storage and the vector.
///
/// This trait is sealed. The vector relies on the following contract:
/// `as_ptr` points at `N` contiguous slots for `T`, and the first `len()`
/// of them hold live values.
pub trait Storage<T, const N: usize>: sealed::Sealed + Sized {
    /// An empty storage.
    const EMPTY: Self;

    /// Pointer to the first slot, dangling but well aligned if there is no slot.
    fn as_ptr(&self) -> *const T;

    /// Mutable pointer to the first slot, dangling but well aligned if there is no slot.
    fn as_mut_ptr(&mut self) -> *mut T;

    /// Number of live elements.
    fn len(&self) -> usize;

    /// Overwrites the number of live elements.
    ///
    /// # Safety
    /// `len <= N`, and the slots `[0, len)` must hold live values once this returns.
    unsafe fn set_len(&mut self, len: usize);
}

/// Storage for a vector without capacity.
///
/// Holds nothing, so `InplaceVec<T, 0, ZeroSized<T>>` is zero-sized and `Copy`.
pub struct ZeroSized<T>(PhantomData<T>);

impl<T> Clone for ZeroSized<T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ZeroSized<T> {}

impl<T> ZeroSized<T> {
    #[inline(always)]
    pub const fn new() -> Self {
        Self(PhantomData)
    }

    /// Always `0`, usable in constant evaluation.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        0
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        true
    }

    #[inline(always)]
    pub const fn as_slice(&self) -> &[T] {
        &[]
    }
}

impl<T> Default for ZeroSized<T> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> sealed::Sealed for ZeroSized<T> {}

impl<T> Storage<T, 0> for ZeroSized<T> {
    const EMPTY: Self = Self::new();

    #[inline(always)]
    fn as_ptr(&self) -> *const T {
        NonNull::dangling().as_ptr()
    }

    #[inline(always)]
    fn as_mut_ptr(&mut self) -> *mut T {
        NonNull::dangling().as_ptr()
    }

    #[inline(always)]
    fn len(&self) -> usize {
        0
    }

    #[inline(always)]
    unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(len == 0, "tried to change the length of empty storage to a non-zero value");
    }
}

/// Storage for `Copy` elements.
///
/// Nothing has to be dropped, so this storage is `Copy` itself and a vector
/// built on it is `Copy` too.
pub struct Trivial<T: Copy, const N: usize, L: LenType = usize> {
    data: [MaybeUninit<T>; N],
    len: L,
}

impl<T: Copy, const N: usize, L: LenType> Clone for Trivial<T, N, L> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Copy, const N: usize, L: LenType> Copy for Trivial<T, N, L> {}

impl<T: Copy, const N: usize, L: LenType> Trivial<T, N, L> {
    /// Creates an empty storage.
    ///
    /// Fails to compile if `N` does not fit into `L`:
    ///
    /// ```compile_fail
    /// # use inplacevec::Trivial;
    /// let storage = Trivial::<u8, 256, u8>::new();
    /// ```
    #[inline(always)]
    pub const fn new() -> Self {
        const { assert!(N <= L::MAX, "capacity does not fit the length type") };
        Self {
            data: [const { MaybeUninit::uninit() }; N],
            len: L::ZERO,
        }
    }
}

/// Operations usable in constant evaluation.
///
/// The count has to be read and written without going through
/// [`LenType`], so these exist once per length type.
macro_rules! impl_const_trivial {
    ($($ty:ty),+) => {$(
        impl<T: Copy, const N: usize> Trivial<T, N, $ty> {
            /// Builds a storage holding the elements of `array`.
            ///
            /// Fails to compile if `P > N`.
            pub const fn from_array<const P: usize>(array: [T; P]) -> Self {
                const { assert!(P <= N, "array does not fit the capacity") };
                let mut storage = Self::new();
                let mut i = 0;
                while i < P {
                    storage.data[i] = MaybeUninit::new(array[i]);
                    i += 1;
                }
                storage.len = P as $ty;
                storage
            }

            #[inline(always)]
            pub const fn len(&self) -> usize {
                self.len as usize
            }

            #[inline(always)]
            pub const fn is_empty(&self) -> bool {
                self.len == 0
            }

            #[inline(always)]
            pub const fn is_full(&self) -> bool {
                self.len as usize >= N
            }

            /// The live elements.
            #[inline(always)]
            pub const fn as_slice(&self) -> &[T] {
                // SAFETY: the first `len` slots are live.
                unsafe {
                    core::slice::from_raw_parts(self.data.as_ptr() as *const T, self.len as usize)
                }
            }

            /// Appends `value`, or hands it back if the storage is full.
            pub const fn try_push(&mut self, value: T) -> Result<(), T> {
                let len = self.len as usize;
                if len >= N {
                    return Err(value);
                }
                self.data[len] = MaybeUninit::new(value);
                self.len = (len + 1) as $ty;
                Ok(())
            }

            /// Removes the last element, or returns `None` if empty.
            pub const fn pop(&mut self) -> Option<T> {
                let len = self.len as usize;
                if len == 0 {
                    return None;
                }
                self.len = (len - 1) as $ty;
                // SAFETY: slot `len - 1` was live.
                Some(unsafe { self.data[len - 1].assume_init() })
            }
        }
    )+};
}

impl_const_trivial!(u8, u16, u32, u64, usize);

impl<T: Copy, const N: usize, L: LenType> Default for Trivial<T, N, L> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize, L: LenType> sealed::Sealed for Trivial<T, N, L> {}

impl<T: Copy, const N: usize, L: LenType> Storage<T, N> for Trivial<T, N, L> {
    const EMPTY: Self = Self::new();

    #[inline(always)]
    fn as_ptr(&self) -> *const T {
        self.data.as_ptr() as *const T
    }

    #[inline(always)]
    fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_mut_ptr() as *mut T
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.len.to_usize()
    }

    #[inline(always)]
    unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(len <= N, "new length out of bounds [0, N]");
        self.len = L::from_usize(len);
    }
}

/// Storage for any element type.
///
/// The slots are raw and uninitialized; dropping the storage drops the
/// live prefix `[0, len)` in index order.
pub struct NonTrivial<T, const N: usize, L: LenType = usize> {
    data: [MaybeUninit<T>; N],
    len: L,
}

impl<T, const N: usize, L: LenType> NonTrivial<T, N, L> {
    /// Creates an empty storage.
    ///
    /// Fails to compile if `N` does not fit into `L`:
    ///
    /// ```compile_fail
    /// # use inplacevec::NonTrivial;
    /// let storage = NonTrivial::<String, 70_000, u16>::new();
    /// ```
    #[inline(always)]
    pub const fn new() -> Self {
        const { assert!(N <= L::MAX, "capacity does not fit the length type") };
        Self {
            data: [const { MaybeUninit::uninit() }; N],
            len: L::ZERO,
        }
    }
}

impl<T, const N: usize, L: LenType> Default for NonTrivial<T, N, L> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize, L: LenType> Drop for NonTrivial<T, N, L> {
    fn drop(&mut self) {
        let len = self.len.to_usize();
        if len > 0 {
            // SAFETY: the first `len` slots are live.
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_mut_ptr(), len));
            }
        }
    }
}

impl<T, const N: usize, L: LenType> sealed::Sealed for NonTrivial<T, N, L> {}

impl<T, const N: usize, L: LenType> Storage<T, N> for NonTrivial<T, N, L> {
    const EMPTY: Self = Self::new();

    #[inline(always)]
    fn as_ptr(&self) -> *const T {
        self.data.as_ptr() as *const T
    }

    #[inline(always)]
    fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_mut_ptr() as *mut T
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.len.to_usize()
    }

    #[inline(always)]
    unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(len <= N, "new length out of bounds [0, N]");
        self.len = L::from_usize(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::size_of;

    #[test]
    fn len_type_bounds() {
        assert_eq!(<u8 as LenType>::MAX, 255);
        assert_eq!(<u16 as LenType>::MAX, 65535);
        assert_eq!(<usize as LenType>::MAX, usize::MAX);
        assert_eq!(<u64 as LenType>::MAX, usize::MAX);
        assert_eq!(u8::from_usize(200).to_usize(), 200);
    }

    #[test]
    fn footprint() {
        assert_eq!(size_of::<ZeroSized<u64>>(), 0);
        assert_eq!(size_of::<Trivial<u8, 200, u8>>(), 201);
        assert_eq!(size_of::<Trivial<u8, 300, u16>>(), 302);
        assert_eq!(size_of::<NonTrivial<u8, 7, u8>>(), 8);
    }

    #[test]
    fn set_len_is_bookkeeping_only() {
        let mut storage = <Trivial<u32, 4, u8>>::new();
        assert_eq!(storage.len(), 0);

        unsafe {
            storage.as_mut_ptr().write(7);
            storage.as_mut_ptr().add(1).write(9);
            storage.set_len(2);
        }
        assert_eq!(storage.len(), 2);
        assert_eq!(unsafe { *storage.as_ptr().add(1) }, 9);

        let copy = storage;
        assert_eq!(copy.len(), 2);
    }

    const SEQ: Trivial<u16, 6, u8> = {
        let mut storage = Trivial::<u16, 6, u8>::from_array([1, 2, 3]);
        let mut i = 4;
        while storage.try_push(i).is_ok() {
            i += 1;
        }
        storage
    };

    const fn sum(values: &[u16]) -> u16 {
        let mut total = 0;
        let mut i = 0;
        while i < values.len() {
            total += values[i];
            i += 1;
        }
        total
    }

    const _: () = assert!(SEQ.len() == 6);
    const _: () = assert!(SEQ.is_full());
    const _: () = assert!(sum(SEQ.as_slice()) == 21);

    #[test]
    fn const_operations() {
        let mut storage = SEQ;
        assert_eq!(storage.as_slice(), [1, 2, 3, 4, 5, 6]);
        assert_eq!(storage.try_push(7), Err(7));
        assert_eq!(storage.pop(), Some(6));
        assert!(!storage.is_full());

        const EMPTY: Trivial<i32, 4> = Trivial::new();
        const POPPED: Option<i32> = {
            let mut storage = EMPTY;
            storage.pop()
        };
        assert!(EMPTY.is_empty());
        assert_eq!(POPPED, None);

        const NONE: ZeroSized<i32> = ZeroSized::new();
        const _: () = assert!(NONE.is_empty() && NONE.len() == 0);
        assert!(NONE.as_slice().is_empty());
    }

    #[test]
    fn zero_sized_is_always_empty() {
        let mut storage = ZeroSized::<i32>::new();
        unsafe { storage.set_len(0) };
        assert_eq!(storage.len(), 0);
        assert!(storage.as_ptr().is_aligned());
    }
}
