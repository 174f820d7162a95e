use thiserror::Error;

use super::{MultiOctavePerlinNoise3D, OctaveAmplitude};

#[derive(Debug, Error, PartialEq)]
pub enum NoiseError {
    #[error("at least one octave is required")]
    NoOctaves,
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("persistence must not be negative, got {0}")]
    NegativePersistence(f32),
    #[error("repeat period must not be negative, got {0}")]
    NegativeRepeat(i32),
}

/// User-facing parameters of a [`MultiOctavePerlinNoise3D`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSettings {
    pub num_octaves: u32,
    pub initial_frequency: f32,
    pub amplitude: OctaveAmplitude,
    pub frequency_multiplier: f32,
    pub persistence: f32,
    pub repeat: i32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            num_octaves: 4,
            initial_frequency: 1.0,
            amplitude: OctaveAmplitude::Supremum(1.0),
            frequency_multiplier: 2.0,
            persistence: 0.5,
            repeat: 0,
        }
    }
}

fn check_finite(name: &'static str, value: f32) -> Result<f32, NoiseError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NoiseError::NonFinite { name, value })
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<(), NoiseError> {
    if check_finite(name, value)? > 0.0 {
        Ok(())
    } else {
        Err(NoiseError::NonPositive { name, value })
    }
}

impl NoiseSettings {
    pub fn validate(&self) -> Result<(), NoiseError> {
        if self.num_octaves == 0 {
            return Err(NoiseError::NoOctaves);
        }
        check_positive("initial frequency", self.initial_frequency)?;
        check_positive("frequency multiplier", self.frequency_multiplier)?;
        if check_finite("persistence", self.persistence)? < 0.0 {
            return Err(NoiseError::NegativePersistence(self.persistence));
        }
        let (name, value) = match self.amplitude {
            OctaveAmplitude::Initial(a) => ("initial amplitude", a),
            OctaveAmplitude::Supremum(s) => ("supremum", s),
        };
        check_finite(name, value)?;
        if self.repeat < 0 {
            return Err(NoiseError::NegativeRepeat(self.repeat));
        }
        Ok(())
    }

    pub fn build(&self) -> Result<MultiOctavePerlinNoise3D, NoiseError> {
        self.validate()?;
        Ok(MultiOctavePerlinNoise3D::new(
            self.num_octaves,
            self.initial_frequency,
            self.amplitude,
            self.frequency_multiplier,
            self.persistence,
            self.repeat,
        ))
    }
}
