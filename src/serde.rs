use core::marker::PhantomData;
use serde_core::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, SeqAccess, Visitor},
    ser::SerializeSeq,
};

use crate::{InplaceVec, Storage};

impl<T: Serialize, const N: usize, S: Storage<T, N>> Serialize for InplaceVec<T, N, S> {
    /// Serialize an `InplaceVec` as a sequence.
    fn serialize<Z>(&self, serializer: Z) -> Result<Z::Ok, Z::Error>
    where
        Z: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

impl<'de, T: Deserialize<'de>, const N: usize, S: Storage<T, N>> Deserialize<'de>
    for InplaceVec<T, N, S>
{
    /// Deserialize an `InplaceVec` from a sequence.
    ///
    /// Fails if the sequence is longer than the capacity `N`.
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct InplaceVecVisitor<T, const N: usize, S> {
            _marker: PhantomData<(T, S)>,
        }

        impl<'de, T: Deserialize<'de>, const N: usize, S: Storage<T, N>> Visitor<'de>
            for InplaceVecVisitor<T, N, S>
        {
            type Value = InplaceVec<T, N, S>;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                write!(formatter, "a sequence of at most {N} elements")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                if let Some(hint) = seq.size_hint() {
                    if hint > N {
                        return Err(de::Error::invalid_length(hint, &self));
                    }
                }

                let mut vec = InplaceVec::new();

                while let Some(element) = seq.next_element()? {
                    if vec.try_push(element).is_err() {
                        return Err(de::Error::invalid_length(N + 1, &self));
                    }
                }

                Ok(vec)
            }
        }

        deserializer.deserialize_seq(InplaceVecVisitor {
            _marker: PhantomData,
        })
    }
}
