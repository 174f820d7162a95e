//! Procedural 3D gradient noise for texturing.

mod multi_octave;
mod perlin;
mod settings;

pub use multi_octave::{MultiOctavePerlinNoise3D, OctaveAmplitude};
pub use perlin::{PERMUTATION_TABLE, PerlinNoise3D};
pub use settings::{NoiseError, NoiseSettings};

#[cfg(test)]
mod tests;
