use crate::Grid;

/// Smallest power of 2 which is not smaller than `n`. `0` maps to `1`.
pub fn next_power_of_2(n: usize) -> usize { n.max(1).next_power_of_two() }

/// Flush values closer to zero than `epsilon` to exactly zero
pub fn set_to_zero_if_small(value: f64, epsilon: f64) -> f64 {
    if value.abs() < epsilon { 0.0 } else { value }
}

/// Largest element of `grid`; 0 for an empty grid
pub fn max_value(grid: &Grid) -> f64 {
    grid.iter().copied().fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
        .unwrap_or(0.0)
}

/// Group numeric digits to facilitate reading long numbers
pub fn group_digits<F: std::fmt::Display>(n: F) -> String {
    use numsep::{separate, Locale};
    separate(n, Locale::English)
}


pub mod timing {

    use super::group_digits;
    use std::time::Instant;

    /// Reports the wall-clock time spent in successive stages of a run
    pub struct Progress {
        previous: Instant,
        message: String,
    }

    impl Progress {

        #[allow(clippy::new_without_default)]
        pub fn new() -> Self { Self { previous: Instant::now(), message: String::new() } }

        /// Remember message, start timer.
        pub fn start(&mut self, message: &str) {
            log::debug!("{message} ...");
            self.message = message.into();
            self.start_timer();
        }

        // Log time elapsed since last start or done
        pub fn done(&mut self) {
            log::info!("{}: {} ms", self.message, group_digits(self.previous.elapsed().as_millis()));
            self.start_timer();
        }

        // Log message followed by time elapsed since last start or done
        pub fn done_with_message(&mut self, message: &str) {
            log::info!("{message}: {} ms",
                       group_digits(self.previous.elapsed().as_millis()));
            self.start_timer();
        }

        fn start_timer(&mut self) { self.previous = Instant::now() }
    }
}
