//! ## Intro
//!
//! A vector with a capacity fixed at compile time, whose elements live
//! inside the vector value itself.
//!
//! [`InplaceVec<T, N>`] behaves like a [`Vec`] that can never grow past `N`
//! elements and never allocates. Put it on the stack, in a `static`, or
//! inside another struct; the storage goes wherever the value goes.
//!
//! ```
//! # use inplacevec::InplaceVec;
//! let mut vec: InplaceVec<i32, 10> = InplaceVec::new();
//! assert_eq!(vec.capacity(), 10);
//!
//! vec.push(1).unwrap();
//! vec.push(2).unwrap();
//! assert_eq!(vec.len(), 2);
//! ```
//!
//! ## Overflow handling
//!
//! Every operation that may exceed the capacity exists in three forms:
//!
//! | Form | Example | On overflow |
//! |------|---------|-------------|
//! | checked | [`InplaceVec::push`] | returns [`Error::CapacityExceeded`] |
//! | try | [`InplaceVec::try_push`] | gives the value back |
//! | unchecked | [`InplaceVec::push_unchecked`] | undefined behavior (`unsafe`) |
//!
//! ```
//! # use inplacevec::{InplaceVec, Error};
//! let mut vec: InplaceVec<u8, 1> = InplaceVec::new();
//! vec.push(1).unwrap();
//!
//! assert_eq!(vec.try_push(2), Err(2));
//! assert!(matches!(vec.push(2), Err(Error::CapacityExceeded { .. })));
//! ```
//!
//! ## Storage
//!
//! The layout is chosen with the third type parameter, see [`storage`]:
//!
//! - [`InplaceVec<T, N>`] works for any `T` and drops its elements.
//! - [`CopyVec<T, N, L>`] holds `Copy` elements and is `Copy` itself.
//! - [`EmptyVec<T>`] has no capacity and takes no space.
//!
//! The length is stored as `L` (`usize` by default). Pick `u8` for up to
//! 255 elements to save space:
//!
//! ```
//! # use inplacevec::CopyVec;
//! assert_eq!(size_of::<CopyVec<u8, 200, u8>>(), 201);
//! ```
//!
//! ## `no_std` support
//!
//! This crate requires only `core`. It does not even need `alloc`.
//!
//! ## Optional features
//!
//! ### `std`
//!
//! Implements [`std::io::Write`] for byte vectors.
//!
//! ### `serde`
//!
//! Implements `Serialize` and `Deserialize` for [`InplaceVec`]. Deserializing
//! more elements than the capacity is an error.
//!
//! [`Vec`]: https://doc.rust-lang.org/std/vec/struct.Vec.html
//! [`std::io::Write`]: https://doc.rust-lang.org/std/io/trait.Write.html
#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

mod error;
mod utils;

pub mod inplace_vec;
pub mod storage;

#[cfg(feature = "serde")]
mod serde;

#[cfg(feature = "std")]
mod std_io;

#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use inplace_vec::InplaceVec;
#[doc(inline)]
pub use storage::{LenType, NonTrivial, Storage, Trivial, ZeroSized};

/// An `InplaceVec` of `Copy` elements, itself `Copy`.
///
/// This is an alias for `InplaceVec<T, N, Trivial<T, N, L>>`.
///
/// # Examples
///
/// ```
/// # use inplacevec::{CopyVec, inplace_vec};
/// let a: CopyVec<u32, 4> = inplace_vec![1, 2];
/// let mut b = a;
/// b.push(3).unwrap();
///
/// assert_eq!(a, [1, 2]);
/// assert_eq!(b, [1, 2, 3]);
///
/// // Usable in constants.
/// const NONE: CopyVec<u32, 4, u8> = CopyVec::new();
/// assert!(NONE.is_empty());
/// ```
pub type CopyVec<T, const N: usize, L = usize> = InplaceVec<T, N, Trivial<T, N, L>>;

/// An `InplaceVec` without capacity.
///
/// Zero-sized and `Copy`, every insertion fails.
///
/// # Examples
///
/// ```
/// # use inplacevec::EmptyVec;
/// let mut vec: EmptyVec<String> = EmptyVec::new();
/// assert_eq!(size_of_val(&vec), 0);
/// assert!(vec.push("a".to_string()).is_err());
/// ```
pub type EmptyVec<T> = InplaceVec<T, 0, ZeroSized<T>>;
