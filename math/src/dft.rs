pub mod ntt;

use crate::error::Result;
use crate::modulus::Zp64;

/// A precomputed transform under which negacyclic convolution becomes
/// pointwise multiplication.
pub trait Dft {
    /// Ring dimension N.
    fn n(&self) -> usize;

    /// Modulus the transform is defined over.
    fn modulus(&self) -> &Zp64;

    /// Coefficient representation to evaluation representation.
    fn forward_inplace(&self, a: &mut [u64]) -> Result<()>;

    /// Evaluation representation back to coefficients.
    fn backward_inplace(&self, a: &mut [u64]) -> Result<()>;
}
