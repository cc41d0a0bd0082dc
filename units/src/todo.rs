/// Units which are plain `f32` aliases rather than `uom` `Quantity`s.
///
/// Hit coordinates and times are read from text files and binned with plain
/// arithmetic, so they stay as `f32`, with the alias as a clue to what they
/// represent (cm and ps respectively).

pub type Lengthf32 = f32;
pub type Timef32   = f32;
