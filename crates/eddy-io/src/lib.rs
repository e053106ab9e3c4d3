use std::{io::Write, path::{Path, PathBuf}};

use encode::{EncodingError, FluidFrameEncoder};
use glam::Vec2;
use eddy_fluids::StableFluid2D;

pub mod encode;
pub mod decode;
pub mod as_bytes;

/// First bytes of every `_meta` file.
pub const MAGIC: [u8; 4] = *b"EDDY";

pub trait EncodeFluid {
    fn encode_state<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError>;
}

impl EncodeFluid for StableFluid2D {
    fn encode_state<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError> {
        let density = self.density().as_slice();
        let u = self.velocity_x().as_slice();
        let v = self.velocity_y().as_slice();

        encoder.encode_section(density.len(), density.iter().copied())?;
        encoder.encode_section(u.len(), u.iter().zip(v).map(|(&x, &y)| Vec2::new(x, y)))?;

        Ok(())
    }
}

/// Frame files are numbered from zero and padded to the width of the last index.
pub(crate) fn frame_path(dir: &Path, num_frames: u64, frame: u64) -> PathBuf {
    let digits = num_frames.saturating_sub(1).checked_ilog10().unwrap_or(0) + 1;

    dir.join(format!("{frame:0width$}.dat", width = digits as usize))
}
