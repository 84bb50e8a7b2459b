use thiserror::Error;

/// Errors reported by the checked operations of [`InplaceVec`](crate::InplaceVec).
///
/// # Examples
///
/// ```
/// # use inplacevec::{InplaceVec, Error};
/// let mut vec: InplaceVec<i32, 1> = InplaceVec::new();
/// vec.push(1).unwrap();
///
/// assert_eq!(
///     vec.push(2),
///     Err(Error::CapacityExceeded { required: 2, capacity: 1 }),
/// );
/// assert_eq!(vec.at(3), Err(Error::OutOfRange { index: 3, len: 1 }));
/// ```
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// The operation needs more slots than the fixed capacity provides.
    #[error("capacity exceeded: {required} elements required but the capacity is {capacity}")]
    CapacityExceeded { required: usize, capacity: usize },

    /// A checked access used an index that is not less than the length.
    #[error("index out of range: the len is {len} but the index is {index}")]
    OutOfRange { index: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::Error;
    use std::string::ToString;

    #[test]
    fn display_messages() {
        let err = Error::CapacityExceeded { required: 6, capacity: 5 };
        assert_eq!(
            err.to_string(),
            "capacity exceeded: 6 elements required but the capacity is 5"
        );

        let err = Error::OutOfRange { index: 5, len: 0 };
        assert_eq!(err.to_string(), "index out of range: the len is 0 but the index is 5");
    }
}
