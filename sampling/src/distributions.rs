use rand_distr::{Normal, NormalError};

/// Describes how secret and noise coefficients are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Distributions {
    /// Ternary vector with exactly `hamming_weight` entries in {-1, 1}.
    Ternary { hamming_weight: usize },
    /// b1 - b2 for two fair bits: values in {-1, 0, 1} with weights 1/4, 1/2, 1/4.
    #[default]
    Triangle,
    /// Rounded normal samples, rejected when |x| > bound.
    Normal { dist: Normal<f64>, bound: f64 },
    /// Uniform integers in [min, max).
    Uniform { min: u64, max: u64 },
}

impl Distributions {
    pub fn normal(sigma: f64, bound: f64) -> Result<Self, NormalError> {
        Ok(Distributions::Normal {
            dist: Normal::new(0.0, sigma)?,
            bound,
        })
    }
}
