//! Iterative radix-2 decimation-in-time FFT.
//!
//! Slower than `rustfft`, but small enough to be read at a glance, which makes
//! it a useful reference for the library-backed path.

use rustfft::num_complex::Complex64;

use super::Dft;

pub struct DecimationInTime {
    len: usize,
    /// `exp(-2 pi i k / len)` for `k` in `0..len/2`
    twiddles: Vec<Complex64>,
}

impl DecimationInTime {
    pub fn new(len: usize) -> Self {
        assert!(len.is_power_of_two(), "Radix-2 FFT length must be a power of 2, got {len}");
        let twiddles = (0..len / 2)
            .map(|k| Complex64::from_polar(1.0, -std::f64::consts::TAU * k as f64 / len as f64))
            .collect();
        Self { len, twiddles }
    }

    fn transform(&self, buffer: &mut [Complex64]) {
        let n = self.len;
        assert_eq!(buffer.len(), n);
        if n < 2 { return }

        let bits = n.trailing_zeros();
        for i in 0..n {
            let j = i.reverse_bits() >> (usize::BITS - bits);
            if i < j { buffer.swap(i, j) }
        }

        let mut size = 2;
        while size <= n {
            let half = size / 2;
            let stride = n / size;
            for start in (0..n).step_by(size) {
                for k in 0..half {
                    let t = self.twiddles[k * stride] * buffer[start + k + half];
                    let u = buffer[start + k];
                    buffer[start + k       ] = u + t;
                    buffer[start + k + half] = u - t;
                }
            }
            size *= 2;
        }
    }
}

impl Dft for DecimationInTime {
    fn forward(&self, buffer: &mut [Complex64]) { self.transform(buffer) }

    fn inverse(&self, buffer: &mut [Complex64]) {
        buffer.iter_mut().for_each(|c| *c = c.conj());
        self.transform(buffer);
        buffer.iter_mut().for_each(|c| *c = c.conj());
    }
}
