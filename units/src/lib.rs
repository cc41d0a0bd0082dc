//! Physical quantities used in configuration files and LOR binning.
//!
//! Everything is stored in a millimetre-picosecond system, so the raw
//! `value` of a `Length` is in mm and that of a `Time` is in ps.

pub mod todo;
pub use todo::{Lengthf32, Timef32};

pub mod mmps {

  pub mod f32 {
    use uom::{ISQ, system};
    ISQ!(uom::si, f32, (millimeter, kilogram, picosecond, ampere, kelvin, mole, candela));
  }

}

pub use mmps::f32::{Length, Time};

pub mod units {
  pub use uom::si::{length::{millimeter, centimeter},
                    time  ::{nanosecond, picosecond},
  };
}

/// Generate a function called NAME which returns QUANTITY by interpreting its
/// argument as UNIT
///
/// wrap!(NAME QUANTITY UNIT);
macro_rules! wrap {
  ($name:ident $quantity:ident $unit:ident ) => {
    pub fn $name(x: f32) -> $quantity { $quantity::new::<units::$unit>(x) }
  };
}

wrap!(cm     Length         centimeter);
wrap!(mm     Length         millimeter);
wrap!(ns     Time           nanosecond);
wrap!(ps     Time           picosecond);

// Reverse direction of the above
pub fn cm_(x: Length) -> f32 { x.get::<units::centimeter>() }
pub fn ps_(x: Time  ) -> f32 { x.get::<units::picosecond>() }

#[macro_export]
macro_rules! assert_uom_eq {
  ($unit:ident, $lhs:expr, $rhs:expr, $algo:ident <= $tol:expr) => {
    float_eq::assert_float_eq!($lhs.get::<$unit>(), $rhs.get::<$unit>(), $algo <= $tol)
  };
}
