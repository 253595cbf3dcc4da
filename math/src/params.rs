//! Ring parameter sets.
//!
//! A [RingParameters] is plain data; [RingParameters::build] searches the
//! primes and precomputes every table, returning an immutable [RingContext].

use crate::automorphism::GaloisTool;
use crate::crt::CrtContext;
use crate::dft::ntt::NttContext;
use crate::error::{Error, Result};
use crate::modulus::MAX_MODULUS_BITS;
use crate::sampling::sample_noise;
use rand_core::CryptoRng;
use sampling::distributions::Distributions;
use tracing::{debug, instrument};

/// Largest supported log2 of the ring dimension.
pub const MAX_LOG_N: u32 = 17;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingParameters {
    /// log2(N).
    pub log_n: u32,
    /// Every prime is larger than 2^prime_bits.
    pub prime_bits: u32,
    pub num_primes: usize,
    pub noise: Distributions,
}

impl Default for RingParameters {
    fn default() -> Self {
        Self::toy()
    }
}

impl RingParameters {
    /// N = 16, two 20-bit primes. Only for tests.
    pub fn toy() -> Self {
        Self {
            log_n: 4,
            prime_bits: 20,
            num_primes: 2,
            noise: Distributions::Triangle,
        }
    }

    /// N = 4096, three 36-bit primes, ternary secret of weight 64.
    pub fn n4096() -> Self {
        Self {
            log_n: 12,
            prime_bits: 36,
            num_primes: 3,
            noise: Distributions::Ternary { hamming_weight: 64 },
        }
    }

    /// N = 8192, four 50-bit primes, centered normal noise with sigma 3.2.
    pub fn n8192() -> Result<Self> {
        let noise: Distributions = Distributions::normal(3.2, 19.2)
            .map_err(|e| Error::InvalidDistribution(e.to_string()))?;
        Ok(Self {
            log_n: 13,
            prime_bits: 50,
            num_primes: 4,
            noise,
        })
    }

    pub fn n(&self) -> usize {
        1 << self.log_n
    }

    pub fn validate(&self) -> Result<()> {
        if self.log_n == 0 || self.log_n > MAX_LOG_N {
            return Err(Error::invalid_parameter(
                "log_n",
                format!("{} not in [1, {}]", self.log_n, MAX_LOG_N),
            ));
        }
        if self.prime_bits <= self.log_n || self.prime_bits >= MAX_MODULUS_BITS {
            return Err(Error::invalid_parameter(
                "prime_bits",
                format!(
                    "{} not in ({}, {})",
                    self.prime_bits, self.log_n, MAX_MODULUS_BITS
                ),
            ));
        }
        if self.num_primes == 0 {
            return Err(Error::invalid_parameter("num_primes", "must be positive"));
        }
        match self.noise {
            Distributions::Ternary { hamming_weight } if hamming_weight > self.n() => {
                Err(Error::HammingWeightTooLarge {
                    weight: hamming_weight,
                    length: self.n(),
                })
            }
            Distributions::Normal { bound, .. } if !bound.is_finite() || bound < 0.0 => Err(
                Error::InvalidDistribution(format!("normal bound {}", bound)),
            ),
            Distributions::Uniform { min, max } if min >= max => {
                Err(Error::InvalidSampleRange { min, max })
            }
            _ => Ok(()),
        }
    }

    #[instrument(level = "debug")]
    pub fn build(&self) -> Result<RingContext> {
        self.validate()?;
        let crt: CrtContext = CrtContext::new(self.num_primes, self.prime_bits, self.n())?;
        let galois: GaloisTool = GaloisTool::new(self.n())?;
        debug!(
            n = self.n(),
            primes = ?crt.primes(),
            modulus_bits = crt.modulus_bits(),
            "ring context built"
        );
        Ok(RingContext {
            params: *self,
            crt,
            galois,
        })
    }
}

/// Precomputed tables for one parameter set.
#[derive(Debug)]
pub struct RingContext {
    params: RingParameters,
    crt: CrtContext,
    galois: GaloisTool,
}

impl RingContext {
    pub fn params(&self) -> &RingParameters {
        &self.params
    }

    pub fn n(&self) -> usize {
        self.params.n()
    }

    pub fn crt(&self) -> &CrtContext {
        &self.crt
    }

    pub fn galois(&self) -> &GaloisTool {
        &self.galois
    }

    pub fn ntt(&self, i: usize) -> Option<&NttContext> {
        self.crt.ntt(i)
    }

    /// Draws N coefficients from the configured noise distribution.
    pub fn sample_noise<R: CryptoRng + ?Sized>(&self, rng: &mut R) -> Result<Vec<i64>> {
        sample_noise(&self.params.noise, self.n(), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        for params in [
            RingParameters::toy(),
            RingParameters::n4096(),
            RingParameters::n8192().unwrap(),
        ] {
            assert!(params.validate().is_ok(), "{:?}", params);
        }
    }

    #[test]
    fn validate_rejects() {
        let mut params: RingParameters = RingParameters::toy();
        params.log_n = 0;
        assert!(params.validate().is_err());

        let mut params: RingParameters = RingParameters::toy();
        params.prime_bits = 63;
        assert!(params.validate().is_err());

        let mut params: RingParameters = RingParameters::toy();
        params.noise = Distributions::Ternary { hamming_weight: 17 };
        assert!(matches!(
            params.validate(),
            Err(Error::HammingWeightTooLarge { weight: 17, length: 16 })
        ));
    }

    #[test]
    fn toy_builds() {
        let ctx: RingContext = RingParameters::toy().build().unwrap();
        assert_eq!(ctx.n(), 16);
        assert_eq!(ctx.crt().num_primes(), 2);
        for p in ctx.crt().primes() {
            assert_eq!(p % 32, 1);
            assert!(p > 1 << 20);
        }
        assert_eq!(ctx.galois().cyclotomic_order(), 32);
    }
}
