use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use ndarray::{s, Array2, Axis};

use crate::error::SiError;
use crate::grid::Grid;
use crate::layout;

/// Raw spectroscopic-imaging acquisition file (siarray dump).
///
/// Each slice is `2*points` spectral channel rows by `rows*cols` pixel columns
/// of little-endian f32. Channel rows `[0, points)` carry the real component
/// and `[points, 2*points)` the imaginary component, in matching order.
pub struct SiData {
    file_path: PathBuf,
    grid: Grid,
}

impl SiData {
    pub fn new(file_path: &Path, grid: Grid) -> Self {
        Self {
            file_path: file_path.to_owned(),
            grid,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Read this grid's slice into the `(2*points, rows*cols)` sample matrix.
    /// A missing or truncated file is a format error with no partial result.
    pub fn sample_matrix(&self) -> Result<Array2<f32>, SiError> {
        let floats = self.float_stream()?;
        Ok(layout::disk_to_matrix(
            floats,
            self.grid.n_pixels(),
            2 * self.grid.points(),
        ))
    }

    /// Sum of channel rows `[start, end)` per pixel, shaped to the spatial
    /// grid. A quick summary map for eyeballing grid placement.
    pub fn integrate(&self, start: usize, end: usize) -> Result<Array2<f32>, SiError> {
        let data = self.sample_matrix()?;
        let summed = data.slice(s![start..end, ..]).sum_axis(Axis(0));
        Ok(layout::pixel_linear_to_grid(
            summed.to_vec(),
            self.grid.rows(),
            self.grid.cols(),
        ))
    }

    fn float_stream(&self) -> Result<Vec<f32>, SiError> {
        let bytes = self.byte_stream()?;
        let mut floats = vec![0.0f32; self.grid.samples_per_slice()];
        LittleEndian::read_f32_into(&bytes, &mut floats);
        Ok(floats)
    }

    fn byte_stream(&self) -> Result<Vec<u8>, SiError> {
        let offset = self.grid.slice_offset();
        let expected = self.grid.samples_per_slice() * 4;
        let f = File::open(&self.file_path).map_err(|e| self.format_error(e))?;
        let mut reader = BufReader::new(f);
        reader
            .seek(SeekFrom::Start(offset))
            .map_err(|e| self.format_error(e))?;
        let mut raw = vec![0u8; expected];
        reader
            .read_exact(&mut raw)
            .map_err(|e| self.format_error(e))?;
        debug!(
            "read {} bytes from {:?} at offset {}",
            expected, self.file_path, offset
        );
        Ok(raw)
    }

    fn format_error(&self, source: std::io::Error) -> SiError {
        SiError::Format {
            path: self.file_path.clone(),
            expected: self.grid.samples_per_slice() * 4,
            offset: self.grid.slice_offset(),
            source,
        }
    }
}
