//! Effect size (Cohen's r) from a two-sided p-value
//!
//! `z = Φ⁻¹(1 - p/2)` and `r = z / √n`, where `n` is the total number of
//! observations across both conditions.
//!
//! # Boundary
//! `p = 0` gives `z = +∞` and therefore `r = +∞`. So does any p small enough
//! that `1 - p/2` rounds to 1.0 in f64 (below about 1.1e-16). The value is
//! reported as is and never clamped: text output prints `inf`, JSON writes the
//! string `"inf"` and sets `"unbounded": true`.

use crate::error::{AnalysisError, Result};
use crate::paired::standard_normal;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use statrs::distribution::ContinuousCDF;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSize {
    pub z: f64,
    pub n: usize,
    pub r: f64,
}

impl EffectSize {
    /// True when the z-score is infinite (p = 0 or below f64 resolution)
    pub fn is_unbounded(&self) -> bool {
        self.r.is_infinite()
    }
}

/// JSON has no infinity; non-finite values are written as "inf", "-inf" or "nan"
struct ExtendedF64(f64);

impl Serialize for ExtendedF64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let v = self.0;
        if v.is_finite() {
            serializer.serialize_f64(v)
        } else if v.is_nan() {
            serializer.serialize_str("nan")
        } else if v > 0.0 {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }
}

impl Serialize for EffectSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EffectSize", 4)?;
        state.serialize_field("z", &ExtendedF64(self.z))?;
        state.serialize_field("n", &self.n)?;
        state.serialize_field("r", &ExtendedF64(self.r))?;
        state.serialize_field("unbounded", &self.is_unbounded())?;
        state.end()
    }
}

pub fn cohens_r(p_value: f64, n: usize) -> Result<EffectSize> {
    if !(0.0..=1.0).contains(&p_value) {
        return Err(AnalysisError::InvalidInput(format!(
            "p-value must lie in [0, 1], got {}",
            p_value
        )));
    }
    if n == 0 {
        return Err(AnalysisError::InvalidInput(
            "effect size needs at least one observation".into(),
        ));
    }

    let z = if p_value == 0.0 {
        f64::INFINITY
    } else {
        standard_normal()?.inverse_cdf(1.0 - p_value / 2.0)
    };

    Ok(EffectSize {
        z,
        n,
        r: z / (n as f64).sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p_005_gives_z_196() {
        let effect = cohens_r(0.05, 16).unwrap();
        assert!((effect.z - 1.959963985).abs() < 1e-6);
        assert!((effect.r - effect.z / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_p_one_gives_zero() {
        let effect = cohens_r(1.0, 10).unwrap();
        assert!(effect.z.abs() < 1e-9);
        assert!(effect.r.abs() < 1e-9);
    }

    #[test]
    fn test_r_grows_as_p_shrinks() {
        let a = cohens_r(0.1, 20).unwrap();
        let b = cohens_r(1e-6, 20).unwrap();
        assert!(b.r > a.r);
        assert!(b.r.is_finite());
    }

    #[test]
    fn test_p_zero_is_unbounded() {
        let effect = cohens_r(0.0, 4).unwrap();
        assert!(effect.is_unbounded());
        assert_eq!(effect.z, f64::INFINITY);
    }

    #[test]
    fn test_tiny_p_rounds_to_unbounded() {
        // 1 - 1e-20 / 2 == 1.0 in f64
        let effect = cohens_r(1e-20, 100).unwrap();
        assert!(effect.is_unbounded());
    }

    #[test]
    fn test_json_keeps_unbounded_value() {
        let json = serde_json::to_value(cohens_r(0.0, 4).unwrap()).unwrap();
        assert_eq!(json["z"], "inf");
        assert_eq!(json["r"], "inf");
        assert_eq!(json["unbounded"], true);

        let json = serde_json::to_value(cohens_r(0.05, 16).unwrap()).unwrap();
        assert!(json["r"].is_f64());
        assert_eq!(json["unbounded"], false);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(cohens_r(1.5, 4).is_err());
        assert!(cohens_r(f64::NAN, 4).is_err());
        assert!(cohens_r(0.5, 0).is_err());
    }
}
