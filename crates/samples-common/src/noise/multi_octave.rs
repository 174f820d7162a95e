use crate::geometry::Vec3;

use super::PerlinNoise3D;

/// How the amplitude of the first octave is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OctaveAmplitude {
    /// Amplitude of octave 0 as given; the supremum follows from it.
    Initial(f32),
    /// Target supremum of the octave sum; the amplitude of octave 0 is solved for.
    Supremum(f32),
}

/// Sum of `num_octaves` noise terms, each at `frequency_multiplier` times the frequency and
/// `persistence` times the amplitude of the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiOctavePerlinNoise3D {
    primary_noise_gen: PerlinNoise3D,
    num_octaves: u32,
    initial_frequency: f32,
    initial_amplitude: f32,
    frequency_multiplier: f32,
    persistence: f32,
    sup_value: f32,
}

// Finite sum a0 + a0*p + ... over exactly as many octaves as `evaluate` adds up, so the
// supremum matches the real output range rather than the infinite series.
fn amplitude_sum(initial_amplitude: f32, persistence: f32, num_octaves: u32) -> f32 {
    let mut amplitude = initial_amplitude;
    let mut sum = 0.0;
    for _ in 0..num_octaves {
        sum += amplitude;
        amplitude *= persistence;
    }
    sum
}

impl MultiOctavePerlinNoise3D {
    /// `OctaveAmplitude::Supremum` with zero octaves has no solution; that is checked in debug
    /// builds only, use [`super::NoiseSettings`] to validate untrusted parameters.
    pub fn new(
        num_octaves: u32,
        initial_frequency: f32,
        amplitude: OctaveAmplitude,
        frequency_multiplier: f32,
        persistence: f32,
        repeat: i32,
    ) -> Self {
        let (initial_amplitude, sup_value) = match amplitude {
            OctaveAmplitude::Supremum(sup_value) => {
                debug_assert!(num_octaves > 0, "a supremum needs at least one octave");
                let unit_sum = amplitude_sum(1.0, persistence, num_octaves);
                (sup_value / unit_sum, sup_value)
            }
            OctaveAmplitude::Initial(initial_amplitude) => {
                (initial_amplitude, amplitude_sum(initial_amplitude, persistence, num_octaves))
            }
        };

        Self {
            primary_noise_gen: PerlinNoise3D::new(repeat),
            num_octaves,
            initial_frequency,
            initial_amplitude,
            frequency_multiplier,
            persistence,
            sup_value,
        }
    }

    pub fn evaluate(&self, p: Vec3) -> f32 {
        let mut total = 0.0;
        let mut frequency = self.initial_frequency;
        let mut amplitude = self.initial_amplitude;
        for _ in 0..self.num_octaves {
            total += self.primary_noise_gen.evaluate(p, frequency) * amplitude;

            amplitude *= self.persistence;
            frequency *= self.frequency_multiplier;
        }

        total
    }

    /// `evaluate` remapped from `[-sup, sup]` to `[0, 1]`. A zero supremum maps everything to 0.5.
    pub fn evaluate_normalized(&self, p: Vec3) -> f32 {
        if self.sup_value == 0.0 {
            return 0.5;
        }
        (0.5 * (self.evaluate(p) / self.sup_value.abs() + 1.0)).clamp(0.0, 1.0)
    }

    pub fn num_octaves(&self) -> u32 {
        self.num_octaves
    }

    pub fn initial_frequency(&self) -> f32 {
        self.initial_frequency
    }

    pub fn initial_amplitude(&self) -> f32 {
        self.initial_amplitude
    }

    pub fn frequency_multiplier(&self) -> f32 {
        self.frequency_multiplier
    }

    pub fn persistence(&self) -> f32 {
        self.persistence
    }

    pub fn sup_value(&self) -> f32 {
        self.sup_value
    }

    pub fn repeat(&self) -> i32 {
        self.primary_noise_gen.repeat()
    }
}
