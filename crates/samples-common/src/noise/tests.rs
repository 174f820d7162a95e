use approx::assert_abs_diff_eq;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::geometry::Vec3;

use super::*;

fn random_point(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3(
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
    )
}

#[test]
fn permutation_table_layout() {
    let mut offset = 0;
    for len in [11usize, 13, 16, 17, 19] {
        let mut sub_table: Vec<u8> = PERMUTATION_TABLE[offset..offset + len].to_vec();
        sub_table.sort_unstable();
        let expected: Vec<u8> = (0..len as u8).collect();
        assert_eq!(sub_table, expected, "sub-table at offset {offset} is not a permutation");
        offset += len;
    }
    assert_eq!(offset, PERMUTATION_TABLE.len());
}

#[test]
fn reference_values() {
    let noise = PerlinNoise3D::new(0);
    assert_eq!(noise.evaluate(Vec3(0.5, 0.5, 0.5), 1.0), 0.125);
    assert_abs_diff_eq!(noise.evaluate(Vec3(1.25, 2.5, 3.75), 1.0), -0.487_945_08, epsilon = 1e-5);
    // frequency only scales the point
    assert_abs_diff_eq!(
        noise.evaluate(Vec3(0.625, 1.25, 1.875), 2.0),
        noise.evaluate(Vec3(1.25, 2.5, 3.75), 1.0),
        epsilon = 1e-6
    );
}

#[test]
fn zero_on_lattice_points() {
    let noise = PerlinNoise3D::new(0);
    for (x, y, z) in [(0, 0, 0), (3, 4, 5), (-7, 2, 11), (100, -100, 37)] {
        let value = noise.evaluate(Vec3(x as f32, y as f32, z as f32), 1.0);
        assert_eq!(value, 0.0, "lattice point ({x}, {y}, {z})");
    }
}

#[test]
fn evaluation_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let plain = PerlinNoise3D::new(0);
    let tiled = PerlinNoise3D::new(16);
    for _ in 0..1000 {
        let p = random_point(&mut rng, 100.0);
        let frequency = rng.random_range(0.1..4.0);
        assert_eq!(plain.evaluate(p, frequency).to_bits(), plain.evaluate(p, frequency).to_bits());
        assert_eq!(tiled.evaluate(p, frequency).to_bits(), tiled.evaluate(p, frequency).to_bits());
        // a second generator with the same period agrees bit for bit
        assert_eq!(
            tiled.evaluate(p, frequency).to_bits(),
            PerlinNoise3D::new(16).evaluate(p, frequency).to_bits()
        );
    }
}

#[test]
fn negative_coordinates_are_finite() {
    let noise = PerlinNoise3D::new(0);
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1000 {
        let p = random_point(&mut rng, 1000.0);
        let value = noise.evaluate(p, 1.0);
        assert!(value.is_finite());
        assert!(value.abs() <= 1.0 + 1e-4, "{value} out of range at {p:?}");
    }
}

#[test]
fn repeat_tiles_along_every_axis() {
    const R: i32 = 8;
    let noise = PerlinNoise3D::new(R);
    let period = R as f32;
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..500 {
        let p = Vec3(
            rng.random_range(0.0..8.0),
            rng.random_range(0.0..8.0),
            rng.random_range(0.0..8.0),
        );
        let base = noise.evaluate(p, 1.0);
        for shifted in [
            p + Vec3(period, 0.0, 0.0),
            p + Vec3(0.0, period, 0.0),
            p + Vec3(0.0, 0.0, period),
            p - Vec3(period, period, period),
            p + Vec3(3.0 * period, -2.0 * period, period),
        ] {
            assert_abs_diff_eq!(noise.evaluate(shifted, 1.0), base, epsilon = 1e-4);
        }
    }
}

#[test]
fn repeat_period_scales_with_frequency() {
    // period in lattice units is floor(repeat * frequency), so in point space it stays `repeat`
    let noise = PerlinNoise3D::new(4);
    let p = Vec3(1.25, 0.75, 2.5);
    assert_abs_diff_eq!(
        noise.evaluate(p, 2.0),
        noise.evaluate(p + Vec3(4.0, 0.0, 0.0), 2.0),
        epsilon = 1e-4
    );
}

#[test]
fn supremum_from_initial_amplitude() {
    let noise = MultiOctavePerlinNoise3D::new(4, 1.0, OctaveAmplitude::Initial(1.0), 2.0, 0.5, 0);
    assert_eq!(noise.initial_amplitude(), 1.0);
    assert_abs_diff_eq!(noise.sup_value(), 1.875, epsilon = 1e-6);

    // finite series, not a / (1 - p)
    let single = MultiOctavePerlinNoise3D::new(1, 1.0, OctaveAmplitude::Initial(3.0), 2.0, 0.5, 0);
    assert_eq!(single.sup_value(), 3.0);
}

#[test]
fn initial_amplitude_from_supremum() {
    let noise = MultiOctavePerlinNoise3D::new(4, 1.0, OctaveAmplitude::Supremum(2.0), 2.0, 0.5, 0);
    assert_eq!(noise.sup_value(), 2.0);
    assert_abs_diff_eq!(noise.initial_amplitude(), 2.0 / 1.875, epsilon = 1e-6);

    // both parameterizations describe the same generator
    let same = MultiOctavePerlinNoise3D::new(
        4,
        1.0,
        OctaveAmplitude::Initial(noise.initial_amplitude()),
        2.0,
        0.5,
        0,
    );
    assert_abs_diff_eq!(same.sup_value(), 2.0, epsilon = 1e-5);
}

#[test]
fn octave_sum_stays_within_supremum() {
    const S: f32 = 2.5;
    let noise = MultiOctavePerlinNoise3D::new(5, 0.75, OctaveAmplitude::Supremum(S), 2.0, 0.5, 0);
    let mut rng = StdRng::seed_from_u64(1234);
    let mut max_abs: f32 = 0.0;
    for _ in 0..20_000 {
        let value = noise.evaluate(random_point(&mut rng, 50.0));
        max_abs = max_abs.max(value.abs());
    }
    assert!(max_abs <= S * (1.0 + 1e-3), "max |noise| = {max_abs} exceeds supremum {S}");
    assert!(max_abs > 0.1 * S, "noise looks degenerate, max |noise| = {max_abs}");
}

#[test]
fn octaves_add_up() {
    let p = Vec3(1.3, -2.7, 0.4);
    let base = PerlinNoise3D::new(0);
    let noise = MultiOctavePerlinNoise3D::new(3, 0.5, OctaveAmplitude::Initial(2.0), 3.0, 0.25, 0);
    let expected = base.evaluate(p, 0.5) * 2.0
        + base.evaluate(p, 1.5) * 0.5
        + base.evaluate(p, 4.5) * 0.125;
    assert_abs_diff_eq!(noise.evaluate(p), expected, epsilon = 1e-6);
}

#[test]
fn normalized_output_in_unit_range() {
    let noise = NoiseSettings::default().build().expect("default settings are valid");
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..2000 {
        let value = noise.evaluate_normalized(random_point(&mut rng, 20.0));
        assert!((0.0..=1.0).contains(&value));
    }
    assert_eq!(noise.evaluate_normalized(Vec3::zero()), 0.5);
}

#[test]
fn settings_validation() {
    let defaults = NoiseSettings::default();
    assert_eq!(defaults.validate(), Ok(()));

    let no_octaves = NoiseSettings { num_octaves: 0, ..defaults };
    assert_eq!(no_octaves.build().unwrap_err(), NoiseError::NoOctaves);

    let bad_frequency = NoiseSettings { initial_frequency: 0.0, ..defaults };
    assert_eq!(
        bad_frequency.validate(),
        Err(NoiseError::NonPositive { name: "initial frequency", value: 0.0 })
    );

    let nan_multiplier = NoiseSettings { frequency_multiplier: f32::NAN, ..defaults };
    assert!(matches!(
        nan_multiplier.validate(),
        Err(NoiseError::NonFinite { name: "frequency multiplier", .. })
    ));

    let negative_persistence = NoiseSettings { persistence: -0.5, ..defaults };
    assert_eq!(negative_persistence.validate(), Err(NoiseError::NegativePersistence(-0.5)));

    let infinite_sup = NoiseSettings {
        amplitude: OctaveAmplitude::Supremum(f32::INFINITY),
        ..defaults
    };
    assert!(matches!(infinite_sup.validate(), Err(NoiseError::NonFinite { name: "supremum", .. })));

    let negative_repeat = NoiseSettings { repeat: -1, ..defaults };
    assert_eq!(negative_repeat.validate(), Err(NoiseError::NegativeRepeat(-1)));

    let built = NoiseSettings { repeat: 32, ..defaults }.build().expect("valid settings");
    assert_eq!(built.repeat(), 32);
    assert_eq!(built.num_octaves(), 4);
    assert_eq!(built.frequency_multiplier(), 2.0);
    assert_eq!(built.persistence(), 0.5);
    assert_eq!(built.initial_frequency(), 1.0);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "a supremum needs at least one octave")]
fn supremum_without_octaves_panics() {
    MultiOctavePerlinNoise3D::new(0, 1.0, OctaveAmplitude::Supremum(1.0), 2.0, 0.5, 0);
}

#[test]
fn generators_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PerlinNoise3D>();
    assert_send_sync::<MultiOctavePerlinNoise3D>();
    assert_send_sync::<NoiseSettings>();
}
