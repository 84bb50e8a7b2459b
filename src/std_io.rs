use core::ptr;
use std::io::{IoSlice, Write};

use crate::{InplaceVec, Storage};

/// Write is implemented for `InplaceVec<u8, N>` by appending to the vector.
///
/// Writes are partial when the remaining capacity is too small. If the
/// vector is full, [`Write::write`] will return `Ok(0)`, which makes
/// [`Write::write_all`] fail with [`std::io::ErrorKind::WriteZero`].
impl<const N: usize, S: Storage<u8, N>> Write for InplaceVec<u8, N, S> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let len = self.len();
        let num = core::cmp::min(N - len, buf.len());

        unsafe {
            ptr::copy_nonoverlapping(buf.as_ptr(), self.as_mut_ptr().add(len), num);
            self.set_len(len + num);
        }

        Ok(num)
    }

    #[inline(always)]
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    #[inline]
    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> std::io::Result<usize> {
        let mut num = 0;
        for buf in bufs {
            if self.is_full() {
                break;
            }
            num += self.write(buf)?;
        }
        Ok(num)
    }
}
