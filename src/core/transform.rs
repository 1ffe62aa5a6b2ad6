//! Purpose: Pluggable value transformers applied around a keyed read or write.
//! Exports: `EncodeTransform`, `DecodeTransform`, `FnTransform`.
//! Role: Convert between an application type and a serializable wire type.
//! Invariants: Transformers are stateless from the facade's point of view.
//! Invariants: Both directions are fallible; failures surface to the caller.
use std::error::Error as StdError;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::error::Error;

/// Encode direction: application value to an encodable wire value.
pub trait EncodeTransform {
    type Source: ?Sized;
    type Target: Serialize;

    fn encode(&self, value: &Self::Source) -> Result<Self::Target, Error>;
}

/// Decode direction: decoded wire value to an application value.
pub trait DecodeTransform {
    type Source: DeserializeOwned;
    type Target;

    fn decode(&self, value: Self::Source) -> Result<Self::Target, Error>;
}

impl<X: EncodeTransform + ?Sized> EncodeTransform for &X {
    type Source = X::Source;
    type Target = X::Target;

    fn encode(&self, value: &Self::Source) -> Result<Self::Target, Error> {
        (**self).encode(value)
    }
}

impl<X: DecodeTransform + ?Sized> DecodeTransform for &X {
    type Source = X::Source;
    type Target = X::Target;

    fn decode(&self, value: Self::Source) -> Result<Self::Target, Error> {
        (**self).decode(value)
    }
}

/// Transformer built from a pair of closures.
///
/// `A` is the application type, `B` the wire type. Closure errors are
/// reported as `ErrorKind::TransformFailure`.
pub struct FnTransform<A, B, E, En, De> {
    encode: En,
    decode: De,
    marker: PhantomData<fn(&A, B) -> Result<(A, B), E>>,
}

impl<A, B, E, En, De> FnTransform<A, B, E, En, De>
where
    En: Fn(&A) -> Result<B, E>,
    De: Fn(B) -> Result<A, E>,
{
    pub fn new(encode: En, decode: De) -> Self {
        Self {
            encode,
            decode,
            marker: PhantomData,
        }
    }
}

impl<A, B, E, En, De> EncodeTransform for FnTransform<A, B, E, En, De>
where
    B: Serialize,
    E: Into<Box<dyn StdError + Send + Sync>>,
    En: Fn(&A) -> Result<B, E>,
{
    type Source = A;
    type Target = B;

    fn encode(&self, value: &A) -> Result<B, Error> {
        (self.encode)(value).map_err(Error::transform)
    }
}

impl<A, B, E, En, De> DecodeTransform for FnTransform<A, B, E, En, De>
where
    B: DeserializeOwned,
    E: Into<Box<dyn StdError + Send + Sync>>,
    De: Fn(B) -> Result<A, E>,
{
    type Source = B;
    type Target = A;

    fn decode(&self, value: B) -> Result<A, Error> {
        (self.decode)(value).map_err(Error::transform)
    }
}
