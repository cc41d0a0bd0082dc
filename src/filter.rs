//! Frequency-response kernels applied to projections before back-projection.
//!
//! A kernel maps a normalized frequency `f` in `[0, 1]` to an attenuation
//! factor. All kernels vanish at and above their cutoff.

use std::f64::consts::PI;
use std::str::FromStr;

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    None,
    RamLak,
    Cosine,
    Hamming,
    #[serde(alias = "shepp-logan", alias = "shopplogan")]
    SheppLogan,
}

impl FilterKind {
    /// Cutoff used when none is given explicitly
    pub fn default_cutoff(self) -> f64 {
        match self {
            FilterKind::None => 1.0,
            _                => 0.3,
        }
    }
}

impl FromStr for FilterKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use FilterKind::*;
        match s.to_lowercase().as_str() {
            "none"                                      => Ok(None),
            "ramlak"                                    => Ok(RamLak),
            "cosine"                                    => Ok(Cosine),
            "hamming"                                   => Ok(Hamming),
            "shepp-logan" | "shepplogan" | "shopplogan" => Ok(SheppLogan),
            _ => Err(format!("Unknown filter `{s}`: expected one of none, ramlak, cosine, hamming, shepp-logan")),
        }
    }
}

pub const DEFAULT_ALPHA: f64 = 0.54;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterKernel {
    pub kind  : FilterKind,
    pub cutoff: f64,
    /// Only used by `Hamming`
    pub alpha : f64,
}

impl Default for FilterKernel {
    fn default() -> Self { Self::new(FilterKind::None) }
}

impl FilterKernel {

    pub fn new(kind: FilterKind) -> Self {
        Self { kind, cutoff: kind.default_cutoff(), alpha: DEFAULT_ALPHA }
    }

    pub fn with_cutoff(self, cutoff: f64) -> Self { Self { cutoff, ..self } }
    pub fn with_alpha (self, alpha : f64) -> Self { Self { alpha , ..self } }

    /// Attenuation at normalized frequency `f`
    pub fn at(&self, f: f64) -> f64 {
        if f >= self.cutoff { 0.0 }
        else                { self.shaped(f) }
    }

    /// Attenuation at the `n`th of `m` evenly spaced frequencies spanning `[0, 1]`
    pub fn sample(&self, n: usize, m: usize) -> f64 {
        self.at(n as f64 / (m as f64 - 1.0))
    }

    /// Discretized response of length `size`, sampling frequencies up to 0.5.
    ///
    /// Element 2 is the response at frequency 0.5 itself (if within the
    /// cutoff) rather than at its regular sampling point.
    pub fn table(&self, size: usize) -> Vec<f64> {
        let mut values = vec![0.0; size];
        for (i, value) in values.iter_mut().enumerate().skip(1) {
            *value = self.at(0.5 * (i - 1) as f64 / size as f64);
        }
        if size > 2 {
            values[2] = if 0.5 <= self.cutoff { self.shaped(0.5) } else { 0.0 };
        }
        values
    }

    // Response without the cutoff
    fn shaped(&self, f: f64) -> f64 {
        let Self { kind, cutoff, alpha } = *self;
        match kind {
            FilterKind::None       => 1.0,
            FilterKind::RamLak     => f / cutoff,
            FilterKind::Cosine     => f * (PI * f / cutoff).cos(),
            FilterKind::Hamming    => f * (alpha + (1.0 - alpha) * (PI * f / cutoff).cos()),
            FilterKind::SheppLogan => f * (PI * f / cutoff).sin() / PI,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    const ALL_KINDS: [FilterKind; 5] = [
        FilterKind::None, FilterKind::RamLak, FilterKind::Cosine,
        FilterKind::Hamming, FilterKind::SheppLogan,
    ];

    proptest! {
        #[test]
        fn vanishes_beyond_cutoff(
            kind   in prop::sample::select(ALL_KINDS.to_vec()),
            cutoff in 0.01..1.0_f64,
            excess in 0.0..1.0_f64,
        ) {
            let filter = FilterKernel::new(kind).with_cutoff(cutoff);
            prop_assert_eq!(filter.at(cutoff + excess), 0.0);
        }
    }

    #[test]
    fn ramlak_is_linear_up_to_cutoff() {
        let filter = FilterKernel::new(FilterKind::RamLak).with_cutoff(0.5);
        let n = 101;
        for x in 0..n {
            let expected = if x < 50 { x as f64 * 0.02 } else { 0.0 };
            assert_float_eq!(filter.sample(x, n), expected, abs <= 1e-12);
        }
    }

    #[rstest(/**/ kind, f, expected,
             case(FilterKind::None      , 0.5, 1.0),
             case(FilterKind::RamLak    , 0.5, 0.5),
             case(FilterKind::Cosine    , 0.5, 0.5 * (PI / 2.0).cos()),
             case(FilterKind::Hamming   , 0.5, 0.5 * (0.54 + 0.46 * (PI / 2.0).cos())),
             case(FilterKind::SheppLogan, 0.5, 0.5 / PI),
             case(FilterKind::Cosine    , 0.0, 0.0),
    )]
    fn shapes_below_cutoff(kind: FilterKind, f: f64, expected: f64) {
        let filter = FilterKernel::new(kind).with_cutoff(1.0);
        assert_float_eq!(filter.at(f), expected, abs <= 1e-12);
    }

    #[test]
    fn default_cutoffs() {
        assert_eq!(FilterKernel::new(FilterKind::None   ).cutoff, 1.0);
        assert_eq!(FilterKernel::new(FilterKind::Hamming).cutoff, 0.3);
        assert_eq!(FilterKernel::new(FilterKind::Hamming).alpha , 0.54);
        assert_eq!(FilterKernel::default().at(0.99), 1.0);
    }

    #[test]
    fn table_overrides_third_element() {
        let wide = FilterKernel::new(FilterKind::RamLak).with_cutoff(1.0).table(8);
        assert_eq!(wide.len(), 8);
        assert_eq!(wide[0], 0.0);
        assert_eq!(wide[1], 0.0);
        assert_float_eq!(wide[2], 0.5, abs <= 1e-12);
        assert_float_eq!(wide[3], 2.0 * 0.5 / 8.0, abs <= 1e-12);

        let narrow = FilterKernel::new(FilterKind::None).with_cutoff(0.4).table(8);
        assert_eq!(narrow[2], 0.0);
        assert_eq!(narrow[3], 1.0);
    }

    #[rstest(/**/ text, expected,
             case("none"       , FilterKind::None),
             case("RamLak"     , FilterKind::RamLak),
             case("cosine"     , FilterKind::Cosine),
             case("hamming"    , FilterKind::Hamming),
             case("shepp-logan", FilterKind::SheppLogan),
             case("sheppLogan" , FilterKind::SheppLogan),
             case("shopplogan" , FilterKind::SheppLogan),
    )]
    fn parse_kind(text: &str, expected: FilterKind) {
        assert_eq!(text.parse::<FilterKind>(), Ok(expected));
    }

    #[test]
    fn parse_unknown_kind() {
        assert!("hann".parse::<FilterKind>().is_err());
    }
}
