use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use eddy_io::decode::FluidDataDecoder;

#[derive(Args)]
pub struct InspectArgs {
    /// Recording directory written by `run --output`
    path: PathBuf,
}

pub fn execute(args: InspectArgs) -> anyhow::Result<()> {
    let mut decoder = FluidDataDecoder::new(args.path.clone());
    let meta = decoder
        .decode_metadata()
        .with_context(|| format!("failed to read metadata from {}", args.path.display()))?;

    info!(
        width = meta.width(),
        height = meta.height(),
        frames = meta.num_frames,
        fps = meta.fps,
        delta_time = meta.delta_time,
        "recording"
    );

    let mut frame = 0u64;
    while let Some(data) = decoder
        .decode_frame()
        .with_context(|| format!("failed to read frame {frame}"))?
    {
        info!(
            frame,
            total_density = data.total_density(),
            max_density = data.max_density(),
            "frame"
        );
        frame += 1;
    }

    Ok(())
}
