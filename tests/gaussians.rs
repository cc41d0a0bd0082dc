use float_eq::assert_float_eq;
use proptest::prelude::*;
use fbpet::gauss::{gaussian_weight, make_gauss, normal_pdf};

proptest! {
    #[test]
    fn cutoff_only_removes_the_tails(
        x      in -100.0 .. 100.0_f64,
        sigma  in    1.0 ..  50.0_f64,
        cutoff in    1.0 ..   5.0_f64,
    ) {
        let truncated = make_gauss(sigma, Some(cutoff))(x);
        if x.abs() < cutoff * sigma {
            assert_float_eq!(truncated, normal_pdf(x, 0.0, sigma), rmax <= 1e-12);
        } else {
            assert_eq!(truncated, 0.0);
        }
    }

    #[test]
    fn normal_pdf_is_symmetric(
        d     in -100.0 .. 100.0_f64,
        mean  in -100.0 .. 100.0_f64,
        sigma in    1.0 ..  50.0_f64,
    ) {
        assert_float_eq!(normal_pdf(mean + d, mean, sigma), normal_pdf(mean - d, mean, sigma), abs <= 1e-300, rmax <= 1e-9);
    }

    #[test]
    fn unit_peak_weight_is_scaled_pdf(
        position in -100.0 .. 100.0_f64,
        center   in -100.0 .. 100.0_f64,
        sigma    in    1.0 ..  50.0_f64,
    ) {
        let peak = normal_pdf(center, center, sigma);
        assert_float_eq!(gaussian_weight(position, center, sigma) * peak,
                         normal_pdf(position, center, sigma),
                         abs <= 1e-15, rmax <= 1e-9);
    }
}
