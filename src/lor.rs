//! Binning of coincidences (pairs of detector hits) into sinograms.
//!
//! Hit coordinates are in cm and times in ps. The transverse plane is `xy`;
//! `z` runs along the scanner axis and selects the slice.

use std::ops::Range;

use crate::types::{Lengthf32, Timef32};
use crate::{Grid, TofEventList, TofSinogram};

/// Number of angular bins (one per degree) in sinograms built from LORs
pub const SINOGRAM_ANGLES: usize = 180;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub x: Lengthf32,
    pub y: Lengthf32,
    pub z: Lengthf32,
    pub t: Timef32,
}

/// Line of response: the two hits of a coincidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lor {
    pub p1: Hit,
    pub p2: Hit,
}

impl Lor {
    pub fn new(p1: Hit, p2: Hit) -> Self { Self { p1, p2 } }
}

/// Index of the multiple of `accuracy` nearest to `value`
pub fn round_to_nearest_multiplicity(value: f32, accuracy: f32) -> i32 {
    (value / accuracy + accuracy / 2.0).floor() as i32
}

/// Angle (whole degrees in `0..180`) of the line through two points
pub fn angle(x1: f32, y1: f32, x2: f32, y2: f32) -> u32 {
    let mut angle = (y1 - y2).atan2(x1 - x2).to_degrees();
    if angle < 0.0 { angle += 180.0 }
    let rounded = angle.round() as u32;
    if rounded >= 180 { rounded - 180 } else { rounded }
}

/// Signed distance between the origin and the line through two points
pub fn distance(mut x1: f32, mut y1: f32, mut x2: f32, mut y2: f32) -> f32 {
    if x1 > x2 {
        std::mem::swap(&mut x1, &mut x2);
        std::mem::swap(&mut y1, &mut y2);
    }
    let norm = (x2 - x1).hypot(y2 - y1);
    if norm.abs() < 1e-6 { return 0.0 }
    (x2 * y1 - y2 * x1) / norm
}

/// (radial bin, angular bin) of the line through two points. `None` if the
/// line passes more than `max_radius` from the origin on the negative side.
pub fn sinogram_representation(x1: f32, y1: f32, x2: f32, y2: f32, max_radius: f32, accuracy: f32) -> Option<(usize, usize)> {
    let distance = distance(x1, y1, x2, y2);
    let angle = angle(x1, y1, x2, y2) as usize;
    let n = usize::try_from(round_to_nearest_multiplicity(distance + max_radius, accuracy)).ok()?;
    Some((n, (angle + 90) % SINOGRAM_ANGLES))
}

/// Number of radial bins needed to cover a disc of radius `max_radius`
pub fn max_distance_number(max_radius: f32, accuracy: f32) -> usize {
    (max_radius * 2.0 * (1.0 / accuracy)).ceil() as usize + 1
}

/// Split a scintillator of the given `length`, centred on `z = 0`, into `n`
/// equal ranges along `z`
pub fn z_split_ranges(length: f32, n: usize) -> Vec<Range<f32>> {
    let half = length / 2.0;
    let range = length / n as f32;
    (0..n)
        .map(|i| (i as f32 * range - half)..((i + 1) as f32 * range - half))
        .collect()
}

/// Index of the range containing the mean `z` of the two hits
pub fn split_range_number(z1: f32, z2: f32, ranges: &[Range<f32>]) -> Option<usize> {
    let z = (z1 + z2) / 2.0;
    ranges.iter().position(|range| range.contains(&z))
}

/// TOF bin of the time difference between the two hits
pub fn tof_slice(t1: f32, t2: f32, slice_size: f32) -> i32 {
    ((t1 - t2) / slice_size).round() as i32
}

/// Geometry of the binning of LORs into slices of TOF sinograms
#[derive(Debug, Clone, PartialEq)]
pub struct Binning {
    /// Radius of the reconstructed disc, in cm
    pub max_radius: f32,
    /// Width of a radial bin, in cm
    pub accuracy: f32,
    /// Width of a TOF bin, in ps
    pub tof_slice: f32,
    pub z_ranges: Vec<Range<f32>>,
}

impl Binning {
    pub fn new(max_radius: f32, accuracy: f32, tof_slice: f32, scintillator_length: f32, slices: usize) -> Self {
        assert!(slices > 0, "Need at least one slice");
        assert!(accuracy > 0.0, "Radial bin width must be positive, got {accuracy}");
        Self { max_radius, accuracy, tof_slice, z_ranges: z_split_ranges(scintillator_length, slices) }
    }

    pub fn n_slices(&self) -> usize { self.z_ranges.len() }

    pub fn n_radial(&self) -> usize { max_distance_number(self.max_radius, self.accuracy) }
}

/// Everything accumulated for one `z` slice
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slice {
    /// Counts of all LORs, ignoring TOF
    pub sinogram: Grid,
    /// Counts split by TOF bin
    pub tof_sinograms: TofSinogram,
    /// TOF differences of the LORs in each (radial, angular) bin
    pub tof_events: TofEventList,
}

/// Accumulates LORs into per-slice sinograms
pub struct SinogramBuilder {
    binning: Binning,
    slices: Vec<Slice>,
    rejected: usize,
}

impl SinogramBuilder {

    pub fn new(binning: Binning) -> Self {
        let empty = Slice {
            sinogram: Grid::zeros((binning.n_radial(), SINOGRAM_ANGLES)),
            ..Default::default()
        };
        let slices = vec![empty; binning.n_slices()];
        Self { binning, slices, rejected: 0 }
    }

    /// Add `lor` to the sinograms of its slice. Returns whether it was accepted.
    pub fn add(&mut self, lor: &Lor) -> bool {
        let Lor { p1, p2 } = *lor;
        let Binning { max_radius, accuracy, tof_slice: slice_size, ref z_ranges } = self.binning;

        let Some(slice) = split_range_number(p1.z, p2.z, z_ranges) else {
            log::warn!("LOR slice out of range: z = {} / {} ({} slices)", p1.z, p2.z, z_ranges.len());
            self.rejected += 1;
            return false
        };
        let n_radial = self.binning.n_radial();
        let Some((n, angle)) = sinogram_representation(p1.x, p1.y, p2.x, p2.y, max_radius, accuracy)
            .filter(|&(n, _)| n < n_radial)
        else {
            log::warn!("LOR further than {max_radius} from centre: distance = {}",
                       distance(p1.x, p1.y, p2.x, p2.y));
            self.rejected += 1;
            return false
        };

        let slice = &mut self.slices[slice];
        slice.sinogram[[n, angle]] += 1.0;
        slice.tof_sinograms
            .entry(tof_slice(p1.t, p2.t, slice_size))
            .or_insert_with(|| Grid::zeros((n_radial, SINOGRAM_ANGLES)))
            [[n, angle]] += 1.0;
        slice.tof_events.entry((n, angle)).or_default().push(p1.t - p2.t);
        true
    }

    pub fn extend<'l>(&mut self, lors: impl IntoIterator<Item = &'l Lor>) {
        for lor in lors { self.add(lor); }
    }

    /// Number of LORs which fell outside the binning
    pub fn rejected(&self) -> usize { self.rejected }

    pub fn finish(self) -> Vec<Slice> { self.slices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest(/**/ value, accuracy, expected,
             case(-1.0, 1.0 , -1),
             case(0.0 , 1.0 ,  0),
             case(0.4 , 1.0 ,  0),
             case(0.5 , 1.0 ,  1),
             case(30.0, 1.0 , 30),
             case(0.0 , 0.01,  0),
             case(0.01, 0.01,  1),
             case(0.02, 0.01,  2),
    )]
    fn nearest_multiplicity(value: f32, accuracy: f32, expected: i32) {
        assert_eq!(round_to_nearest_multiplicity(value, accuracy), expected);
    }

    #[test]
    fn lors_through_centre_of_circle() {
        let r = 10.0_f32;
        let (max_radius, accuracy) = (20.0, 0.1);
        let expected_n = round_to_nearest_multiplicity(max_radius, accuracy) as usize;
        for i in 0..360_u32 {
            let a1 = (i as f32).to_radians();
            let a2 = ((i + 180) as f32).to_radians();
            let (x1, y1) = (r * a1.cos(), r * a1.sin());
            let (x2, y2) = (r * a2.cos(), r * a2.sin());
            let (n, angle) = sinogram_representation(x1, y1, x2, y2, max_radius, accuracy).unwrap();
            assert_eq!(angle, ((i + 90) % 180) as usize, "i = {i}");
            assert_eq!(n, expected_n, "i = {i}");
        }
    }

    #[rstest(/**/ x1,   y1,   x2,   y2, expected,
             case(-1.0,  5.0,  1.0,  5.0,  5.0),
             case( 1.0,  5.0, -1.0,  5.0,  5.0),
             case( 3.0, -2.0,  3.0,  2.0, -3.0),
             case( 2.0,  2.0,  2.0,  2.0,  0.0),
    )]
    fn distance_from_origin(x1: f32, y1: f32, x2: f32, y2: f32, expected: f32) {
        assert_float_eq!(distance(x1, y1, x2, y2), expected, abs <= 1e-6);
    }

    #[test]
    fn split_ranges() {
        let ranges = z_split_ranges(50.0, 5);
        assert_eq!(ranges.len(), 5);
        assert_eq!(ranges[0], -25.0..-15.0);
        assert_eq!(ranges[4],  15.0.. 25.0);
        assert_eq!(split_range_number( 0.0,  0.0, &ranges), Some(2));
        assert_eq!(split_range_number(-24.0, 4.0, &ranges), Some(1));
        assert_eq!(split_range_number(30.0, 30.0, &ranges), None);
    }

    #[rstest(/**/ t1, t2, size, expected,
             case(  0.0,   0.0, 100.0,  0),
             case(149.0,   0.0, 100.0,  1),
             case(  0.0, 151.0, 100.0, -2),
    )]
    fn tof_bins(t1: f32, t2: f32, size: f32, expected: i32) {
        assert_eq!(tof_slice(t1, t2, size), expected);
    }

    #[test]
    fn lines_beyond_negative_radius_have_no_bin() {
        assert_eq!(sinogram_representation(-30.0, -25.0, 30.0, -25.0, 20.0, 0.5), None);
        assert_eq!(sinogram_representation(-30.0, -19.0, 30.0, -19.0, 20.0, 0.5), Some((2, 90)));
    }

    #[test]
    fn radial_bin_count() {
        assert_eq!(max_distance_number(20.0, 0.5), 81);
    }

    fn hit(x: f32, y: f32, z: f32, t: f32) -> Hit { Hit { x, y, z, t } }

    #[test]
    fn builder_accumulates_and_rejects() {
        let binning = Binning::new(20.0, 0.5, 100.0, 50.0, 2);
        let mut builder = SinogramBuilder::new(binning);
        let lors = [
            // Horizontal, through centre, slice 1, TOF bin 0
            Lor::new(hit(-10.0, 0.0, 5.0, 10.0), hit(10.0, 0.0, 5.0, 20.0)),
            // Same, but TOF bin 2
            Lor::new(hit(-10.0, 0.0, 5.0, 210.0), hit(10.0, 0.0, 5.0, 20.0)),
            // z out of range
            Lor::new(hit(-10.0, 0.0, 40.0, 0.0), hit(10.0, 0.0, 40.0, 0.0)),
            // Too far from centre, on either side
            Lor::new(hit(-30.0,  25.0, 5.0, 0.0), hit(30.0,  25.0, 5.0, 0.0)),
            Lor::new(hit(-30.0, -25.0, 5.0, 0.0), hit(30.0, -25.0, 5.0, 0.0)),
        ];
        builder.extend(&lors);
        assert_eq!(builder.rejected(), 3);

        let slices = builder.finish();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].sinogram.sum(), 0.0);
        assert!(slices[0].tof_sinograms.is_empty());

        let slice = &slices[1];
        assert_eq!(slice.sinogram.dim(), (81, SINOGRAM_ANGLES));
        assert_eq!(slice.sinogram.sum(), 2.0);
        let bin = (round_to_nearest_multiplicity(20.0, 0.5) as usize, 90);
        assert_eq!(slice.sinogram[bin], 2.0);
        assert_eq!(slice.tof_sinograms.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(slice.tof_sinograms[&0][bin], 1.0);
        assert_eq!(slice.tof_sinograms[&2][bin], 1.0);
        assert_eq!(slice.tof_events[&bin], vec![-10.0, 190.0]);
    }
}
