use std::f64::consts::TAU;

/// Normalized Gaussian centred on zero, which vanishes beyond `cutoff`
/// standard deviations (if a cutoff is given).
pub fn make_gauss(sigma: f64, cutoff: Option<f64>) -> impl Fn(f64) -> f64 {
    let peak_height = 1.0 / (sigma * TAU.sqrt());
    let cutoff = cutoff.map_or(f64::INFINITY, |width| width * sigma);
    move |dx: f64| -> f64 {
        if dx.abs() < cutoff {
            let y = dx / sigma;
            peak_height * (-0.5 * y * y).exp()
        } else {
            0.0
        }
    }
}

/// Probability density of the normal distribution `N(mean, sigma^2)` at `x`
pub fn normal_pdf(x: f64, mean: f64, sigma: f64) -> f64 {
    make_gauss(sigma, None)(x - mean)
}

/// Unnormalized Gaussian with unit peak at `center`
pub fn gaussian_weight(position: f64, center: f64, sigma: f64) -> f64 {
    let d = position - center;
    (-(d * d) / (2.0 * sigma * sigma)).exp()
}
