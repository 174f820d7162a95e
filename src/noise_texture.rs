//! Renders a z-slice of multi-octave noise, the way the samples bake procedural textures.

use std::time::Instant;

use anyhow::Context;
use indicatif::ProgressStyle;
use tracing::{info, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use samples_common::{
    color::{hsv_to_rgb, srgb_gamma},
    geometry::Vec3,
    noise::{NoiseSettings, OctaveAmplitude},
};

use crate::cli::{NoiseArgs, Palette};

impl From<&NoiseArgs> for NoiseSettings {
    fn from(args: &NoiseArgs) -> Self {
        let amplitude = match args.amplitude {
            Some(amplitude) => OctaveAmplitude::Initial(amplitude),
            None => OctaveAmplitude::Supremum(args.supremum.unwrap_or(1.0)),
        };

        NoiseSettings {
            num_octaves: args.octaves,
            initial_frequency: args.frequency,
            amplitude,
            frequency_multiplier: args.frequency_multiplier,
            persistence: args.persistence,
            repeat: args.repeat,
        }
    }
}

fn shade(value: f32, palette: Palette) -> Vec3 {
    match palette {
        Palette::Grayscale => Vec3::splat(value),
        // blue (low) through red (high)
        Palette::Hue => hsv_to_rgb((1.0 - value) * 2.0 / 3.0, 1.0, 1.0),
    }
}

pub(crate) fn run(args: &NoiseArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.width > 0 && args.height > 0, "image must not be empty");

    let settings = NoiseSettings::from(args);
    let noise = settings.build().context("invalid noise parameters")?;
    info!(
        octaves = noise.num_octaves(),
        initial_amplitude = noise.initial_amplitude(),
        supremum = noise.sup_value(),
        "noise generator ready"
    );

    let t = Instant::now();
    let render_span = info_span!("render");
    render_span.pb_set_style(&ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40} {pos}/{len} rows",
    )?);
    render_span.pb_set_length(args.height as u64);
    let render_guard = render_span.enter();

    // noise space spans [0, 1) across the image width so `frequency` reads as cycles per width
    let scale = 1.0 / args.width as f32;
    let mut pixels = Vec::with_capacity(args.width as usize * args.height as usize * 3);
    for y in 0..args.height {
        for x in 0..args.width {
            let p = Vec3((x as f32 + 0.5) * scale, (y as f32 + 0.5) * scale, args.depth);
            let value = noise.evaluate_normalized(p);
            let rgb = srgb_gamma(shade(value, args.palette));
            pixels.extend(<[f32; 3]>::from(rgb).map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8));
        }
        render_span.pb_inc(1);
    }

    drop(render_guard);
    info!("render: {:.2}s", t.elapsed().as_secs_f64());

    image::save_buffer_with_format(
        &args.output,
        &pixels,
        args.width,
        args.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("wrote {}", args.output.display());

    Ok(())
}
