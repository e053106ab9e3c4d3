use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use glam::{IVec2, Vec2};
use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};
use tracing::{debug, info, warn};

use eddy_fluids::{Scene, StableFluid2D, StableFluid2DParams, ACTIVE_DENSITY_THRESHOLD};
use eddy_io::encode::FluidDataEncoder;

/// Density injected by the emitter each frame.
const FLUID_ADD: f32 = 5.0;

#[derive(Args)]
pub struct RunArgs {
    /// Grid width in cells
    #[arg(long, default_value_t = 80)]
    width: u32,

    /// Grid height in cells
    #[arg(long, default_value_t = 24)]
    height: u32,

    /// Number of steps to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Playback rate stored in the recording
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seconds per step
    #[arg(long, default_value_t = 0.016)]
    dt: f32,

    #[arg(long, default_value_t = 0.01)]
    viscosity: f32,

    #[arg(long, default_value_t = 0.001)]
    diffusion: f32,

    /// Gauss-Seidel passes per solve
    #[arg(long, default_value_t = 40)]
    iterations: usize,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    gravity_x: f32,

    #[arg(long, default_value_t = 0.001, allow_negative_numbers = true)]
    gravity_y: f32,

    /// Density above which gravity acts on a cell
    #[arg(long, default_value_t = 0.001)]
    gravity_threshold: f32,

    /// Emitter column, defaults to the grid centre
    #[arg(long, allow_negative_numbers = true)]
    emitter_x: Option<i32>,

    /// Emitter row, defaults to the grid centre
    #[arg(long, allow_negative_numbers = true)]
    emitter_y: Option<i32>,

    /// Density added by the emitter each frame
    #[arg(long, default_value_t = FLUID_ADD)]
    emitter_amount: f32,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    emitter_vx: f32,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    emitter_vy: f32,

    /// Stop emitting after this many frames
    #[arg(long)]
    emit_frames: Option<u64>,

    /// Directory to record frames into. Must not exist yet.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RunArgs {
    fn params(&self) -> StableFluid2DParams {
        StableFluid2DParams {
            delta_time: self.dt,
            viscosity: self.viscosity,
            diffusion_rate: self.diffusion,
            relaxation_iters: self.iterations,
            gravity: Vec2::new(self.gravity_x, self.gravity_y),
            gravity_threshold: self.gravity_threshold,
        }
    }

    /// The emitter cell, kept off the border rows and columns since those are rewritten from
    /// their interior neighbours every stage.
    fn emitter(&self) -> IVec2 {
        let requested = IVec2::new(
            self.emitter_x.unwrap_or(self.width as i32 / 2),
            self.emitter_y.unwrap_or(self.height as i32 / 2),
        );

        let size = IVec2::new(self.width as i32, self.height as i32);
        let last_interior = (size - 2).max(IVec2::ONE);
        let emitter = requested.clamp(IVec2::ONE, last_interior);

        if emitter != requested {
            warn!(
                requested_x = requested.x,
                requested_y = requested.y,
                x = emitter.x,
                y = emitter.y,
                "emitter moved off the grid border"
            );
        }

        emitter
    }
}

pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let fluid = StableFluid2D::new(args.width, args.height, args.params())
        .context("failed to create fluid")?;
    let mut scene = Scene::<2, _>::new(fluid);

    let mut encoder = match &args.output {
        Some(path) => {
            let mut encoder = FluidDataEncoder::new(path.clone(), args.frames, args.fps)
                .with_context(|| format!("failed to create recording at {}", path.display()))?;
            encoder.encode_metadata(&scene)?;
            Some(encoder)
        }
        None => None,
    };

    let emitter = args.emitter();
    let emit_frames = args.emit_frames.unwrap_or(args.frames);
    info!(x = emitter.x, y = emitter.y, amount = args.emitter_amount, "emitter");

    let bar_template =
        "Running Simulation {spinner:.green} [{elapsed}] [{bar:50.white/white}] {pos}/{len} ({eta})";
    let style = ProgressStyle::with_template(bar_template)?
        .progress_chars("=> ").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress = ProgressBar::new(args.frames).with_style(style);

    for frame in (0..args.frames).progress_with(progress) {
        if frame < emit_frames {
            scene.fluid.add_density(emitter.x, emitter.y, args.emitter_amount);
            scene.fluid.add_velocity(emitter.x, emitter.y, args.emitter_vx, args.emitter_vy);
        }

        scene.step()?;

        let stats = scene.fluid.stats(ACTIVE_DENSITY_THRESHOLD);
        debug!(
            frame,
            total_density = stats.total_density,
            max_density = stats.max_density,
            active_cells = stats.active_cells,
            velocity_x = stats.velocity_x_abs_total,
            velocity_y = stats.velocity_y_abs_total,
            "frame stats"
        );

        if let Some(encoder) = encoder.as_mut() {
            encoder
                .encode_frame(&scene)
                .with_context(|| format!("failed to record frame {frame}"))?;
        }
    }

    let stats = scene.fluid.stats(ACTIVE_DENSITY_THRESHOLD);
    info!(
        frames = scene.frame(),
        elapsed = scene.elapsed(),
        total_density = stats.total_density,
        max_density = stats.max_density,
        active_cells = stats.active_cells,
        "simulation finished"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        run: RunArgs,
    }

    fn parse(args: &[&str]) -> RunArgs {
        Cli::try_parse_from(std::iter::once("run").chain(args.iter().copied())).unwrap().run
    }

    #[test]
    fn emitter_defaults_to_the_centre() {
        let args = parse(&["--width", "10", "--height", "8"]);
        assert_eq!(args.emitter(), IVec2::new(5, 4));
    }

    #[test]
    fn emitter_is_kept_off_the_border() {
        let args = parse(&[
            "--width", "10", "--height", "10",
            "--emitter-x", "0", "--emitter-y", "5",
        ]);
        assert_eq!(args.emitter(), IVec2::new(1, 5));

        let args = parse(&[
            "--width", "10", "--height", "10",
            "--emitter-x", "12", "--emitter-y", "-3",
        ]);
        assert_eq!(args.emitter(), IVec2::new(8, 1));
    }

    #[test]
    fn border_emitter_still_adds_density() {
        let args = parse(&[
            "--width", "10", "--height", "10",
            "--emitter-x", "0", "--emitter-y", "5",
        ]);
        let emitter = args.emitter();
        let mut fluid = StableFluid2D::new(args.width, args.height, args.params()).unwrap();

        fluid.add_density(emitter.x, emitter.y, 10.0);
        eddy_fluids::Fluid::step(&mut fluid).unwrap();

        assert!(fluid.density().sum() > 0.0);
    }
}
