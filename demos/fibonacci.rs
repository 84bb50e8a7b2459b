//! Builds the first terms of the Fibonacci sequence in a fixed-capacity vector.
//!
//! Expected output:
//!
//! ```text
//! 0: 0
//! 1: 1
//! 2: 1
//! ...
//! 10: 55
//! ```

use inplacevec::{CopyVec, Error};

/// Returns the terms `F(0)..=F(num)`.
fn fibonacci_to<const N: usize>(num: usize) -> Result<CopyVec<u64, N>, Error> {
    let mut vec = CopyVec::<u64, N>::new();
    for i in 0..=num {
        let value = if i < 2 { i as u64 } else { vec[i - 1] + vec[i - 2] };
        vec.push(value)?;
    }
    Ok(vec)
}

fn main() -> Result<(), Error> {
    let seq = fibonacci_to::<50>(10)?;
    for (i, value) in seq.iter().enumerate() {
        println!("{i}: {value}");
    }

    // Asking for more terms than the capacity is reported, not truncated.
    assert!(fibonacci_to::<5>(10).is_err());
    Ok(())
}
