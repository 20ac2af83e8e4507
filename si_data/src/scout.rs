use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use ndarray::Array2;

use crate::error::SiError;
use crate::layout;

/// stock scout acquisition resolution
pub const DEFAULT_SCOUT_RES: usize = 216;

/// Anatomical scout image: a single `(res, res)` little-endian f32 frame,
/// serialized in the same pixel order as the SI raw format.
pub struct Scout {
    file_path: PathBuf,
    res: usize,
}

impl Scout {
    pub fn new(file_path: &Path, res: usize) -> Self {
        Self {
            file_path: file_path.to_owned(),
            res,
        }
    }

    pub fn res(&self) -> usize {
        self.res
    }

    pub fn image(&self) -> Result<Array2<f32>, SiError> {
        let expected = self.res * self.res * 4;
        let format_error = |source| SiError::Format {
            path: self.file_path.clone(),
            expected,
            offset: 0,
            source,
        };
        let f = File::open(&self.file_path).map_err(&format_error)?;
        let mut reader = BufReader::new(f);
        let mut raw = vec![0u8; expected];
        reader.read_exact(&mut raw).map_err(&format_error)?;
        let mut floats = vec![0.0f32; self.res * self.res];
        LittleEndian::read_f32_into(&raw, &mut floats);
        debug!("read scout {:?} at {}x{}", self.file_path, self.res, self.res);
        Ok(layout::disk_to_matrix(floats, self.res, self.res))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_le_floats(path: &Path, floats: &[f32]) {
        let mut bytes = vec![0u8; floats.len() * 4];
        LittleEndian::write_f32_into(floats, &mut bytes);
        let mut f = File::create(path).unwrap();
        f.write_all(&bytes).unwrap();
    }

    #[test]
    fn scout_is_read_transposed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.img");
        write_le_floats(&path, &[1.0, 2.0, 3.0, 4.0]);

        let img = Scout::new(&path, 2).image().unwrap();
        assert_eq!(img.shape(), &[2, 2]);
        // the logical matrix is the transpose of the read order
        assert_eq!(img[[0, 0]], 1.0);
        assert_eq!(img[[0, 1]], 3.0);
        assert_eq!(img[[1, 0]], 2.0);
        assert_eq!(img[[1, 1]], 4.0);
    }

    #[test]
    fn short_scout_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.img");
        write_le_floats(&path, &[1.0, 2.0, 3.0]);

        let err = Scout::new(&path, 2).image().unwrap_err();
        assert!(matches!(err, SiError::Format { .. }));
    }
}
