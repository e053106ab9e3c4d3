use std::{fs::File, io::{BufWriter, Write}, path::PathBuf};

use thiserror::Error;

use eddy_fluids::{scene::Scene, Fluid};

use crate::{frame_path, EncodeFluid, MAGIC};

use super::as_bytes::AsBytes;

pub struct FluidDataEncoder {
    /// The path to the directory into which the fluid data will be placed.
    path: PathBuf,
    num_frames: u64,
    fps: u32,
    current_frame: u64,
}

impl FluidDataEncoder {
    /// Creates the output directory. Fails if it already exists.
    pub fn new(path: PathBuf, num_frames: u64, fps: u32) -> Result<FluidDataEncoder, EncodingError> {
        std::fs::create_dir(&path)?;

        Ok(Self {
            path,
            num_frames,
            fps,
            current_frame: 0,
        })
    }

    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    pub fn encode_metadata<const D: usize, F>(&mut self, scene: &Scene<D, F>) -> Result<(), EncodingError>
    where
        F: Fluid<D>,
    {
        let path = self.path.join("_meta");
        let mut writer = BufWriter::new(File::create(path)?);

        writer.write_all(&MAGIC)?;
        writer.write_all(&(D as u8).to_bytes())?;
        writer.write_all(&self.fps.to_bytes())?;
        writer.write_all(&self.num_frames.to_bytes())?;

        for extent in scene.size() {
            writer.write_all(&extent.to_bytes())?;
        }

        writer.write_all(&scene.fluid.delta_time().to_bytes())?;
        writer.flush()?;

        Ok(())
    }

    pub fn encode_frame<const D: usize, F>(&mut self, scene: &Scene<D, F>) -> Result<(), EncodingError>
    where
        F: Fluid<D> + EncodeFluid,
    {
        if self.current_frame >= self.num_frames {
            return Err(EncodingError::TooManyFrames(self.num_frames));
        }

        let path = frame_path(&self.path, self.num_frames, self.current_frame);
        let mut encoder = FluidFrameEncoder { writer: BufWriter::new(File::create(path)?) };

        scene.fluid.encode_state(&mut encoder)?;
        encoder.writer.flush()?;

        self.current_frame += 1;

        Ok(())
    }
}

pub struct FluidFrameEncoder<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> FluidFrameEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: BufWriter::new(writer) }
    }

    /// Writes `len` followed by the bytes of every value.
    pub fn encode_section<const N: usize, T, I>(&mut self, len: usize, values: I) -> Result<(), EncodingError>
    where
        I: Iterator<Item = T>,
        T: AsBytes<N>,
    {
        self.writer.write_all(&(len as u64).to_bytes())?;

        let bytes: Vec<_> = values.flat_map(|v| v.to_bytes()).collect();
        self.writer.write_all(&bytes)?;

        Ok(())
    }

    pub fn finish(mut self) -> Result<W, EncodingError> {
        self.writer.flush()?;
        self.writer.into_inner().map_err(|e| EncodingError::Io(e.into_error()))
    }
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("recording is limited to {0} frames")]
    TooManyFrames(u64),
}
