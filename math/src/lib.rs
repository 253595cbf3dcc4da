//! Number-theoretic and polynomial-ring arithmetic for ring-LWE schemes.
//!
//! Word-sized arithmetic lives in [`modulus`] and [`dft`]; arbitrary
//! precision is confined to [`number_theory`] and [`crt`]. Every context is
//! immutable once built and can be shared across threads by reference.

pub mod automorphism;
pub mod crt;
pub mod dft;
pub mod dyn_array;
pub mod error;
pub mod modulus;
pub mod number_theory;
pub mod params;
pub mod poly;
pub mod sampling;

pub use error::{Error, Result};
