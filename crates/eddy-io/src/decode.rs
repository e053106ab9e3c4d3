use std::{fs::File, io::{BufRead, BufReader, Read}, path::PathBuf};

use glam::Vec2;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{as_bytes::AsBytes, frame_path, MAGIC};

pub struct FluidDataDecoder {
    /// The path to the directory in which the fluid data resides.
    path: PathBuf,
    num_frames: u64,
    cells: u64,
    current_frame: u64,
}

impl FluidDataDecoder {
    pub fn new(path: PathBuf) -> FluidDataDecoder {
        Self {
            path,
            num_frames: 0,
            cells: 0,
            current_frame: 0,
        }
    }

    fn read_value<const N: usize, T: AsBytes<N>, R: BufRead>(reader: &mut R) -> Result<T, DecodingError> {
        let mut bytes = [0; N];
        reader.read_exact(&mut bytes)?;

        Ok(T::from_bytes(bytes))
    }

    fn read_values<const N: usize, T: AsBytes<N>, R: BufRead>(reader: &mut R, count: usize) -> Result<Vec<T>, DecodingError> {
        let mut bytes = vec![0; N * count];
        reader.read_exact(&mut bytes)?;

        Ok(bytes.chunks_exact(N).map(|chunk| {
            let mut b = [0; N];
            b.copy_from_slice(chunk);
            T::from_bytes(b)
        }).collect())
    }

    /// Reads a section header and checks it against the grid size from the metadata.
    fn read_section_len<R: BufRead>(&self, reader: &mut R) -> Result<usize, DecodingError> {
        let found = Self::read_value::<8, u64, _>(reader)?;

        if found != self.cells {
            return Err(DecodingError::FrameSizeMismatch { expected: self.cells, found });
        }

        Ok(found as usize)
    }

    pub fn decode_metadata(&mut self) -> Result<FluidMetadata, DecodingError> {
        let path = self.path.join("_meta");
        let mut reader = BufReader::new(File::open(path)?);

        let mut magic = [0; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(DecodingError::InvalidMagic);
        }

        let dim = Self::read_value::<1, u8, _>(&mut reader)?;
        if dim != 2 {
            return Err(DecodingError::UnsupportedDimension(dim));
        }

        let fps = Self::read_value::<4, u32, _>(&mut reader)?;
        let num_frames = Self::read_value::<8, u64, _>(&mut reader)?;
        let mut size: SmallVec<[u32; 4]> = SmallVec::new();

        for _ in 0..dim {
            size.push(Self::read_value::<4, u32, _>(&mut reader)?);
        }

        let delta_time = Self::read_value::<4, f32, _>(&mut reader)?;

        self.num_frames = num_frames;
        self.cells = size.iter().map(|&s| s as u64).product();
        self.current_frame = 0;

        Ok(FluidMetadata {
            dim,
            fps,
            num_frames,
            size,
            delta_time,
        })
    }

    /// Decodes the next frame, or returns `None` once every frame has been read.
    pub fn decode_frame(&mut self) -> Result<Option<FluidFrameData>, DecodingError> {
        if self.current_frame >= self.num_frames {
            return Ok(None)
        }

        let path = frame_path(&self.path, self.num_frames, self.current_frame);
        let mut reader = BufReader::new(File::open(path)?);

        let n_density = self.read_section_len(&mut reader)?;
        let density = Self::read_values::<4, f32, _>(&mut reader, n_density)?;

        let n_velocity = self.read_section_len(&mut reader)?;
        let velocity = Self::read_values::<8, Vec2, _>(&mut reader, n_velocity)?;

        self.current_frame += 1;

        Ok(Some(FluidFrameData {
            density,
            velocity,
        }))
    }

    /// Rewinds to the first frame.
    pub fn reset(&mut self) {
        self.current_frame = 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FluidMetadata {
    pub dim: u8,
    pub fps: u32,
    pub num_frames: u64,
    pub size: SmallVec<[u32; 4]>,
    pub delta_time: f32,
}

impl FluidMetadata {
    pub fn width(&self) -> u32 {
        self.size.first().copied().unwrap_or(0)
    }

    pub fn height(&self) -> u32 {
        self.size.get(1).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FluidFrameData {
    /// Density samples in row-major order.
    pub density: Vec<f32>,
    /// Velocity samples in row-major order.
    pub velocity: Vec<Vec2>,
}

impl FluidFrameData {
    pub fn total_density(&self) -> f32 {
        self.density.iter().sum()
    }

    pub fn max_density(&self) -> f32 {
        self.density.iter().copied().fold(0.0, f32::max)
    }
}

#[derive(Debug, Error)]
pub enum DecodingError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("not a fluid recording")]
    InvalidMagic,
    #[error("unsupported fluid dimension {0}")]
    UnsupportedDimension(u8),
    #[error("frame holds {found} samples, expected {expected}")]
    FrameSizeMismatch { expected: u64, found: u64 },
}
