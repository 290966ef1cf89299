//! NIfTI file I/O
//!
//! Loads NIfTI-1 volumes (.nii and .nii.gz, gzip is auto-detected) into a
//! [`Volume`] and writes single-file float32 NIfTI-1 images carrying the
//! volume's affine in the sform rows.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use nifti::volume::ndarray::IntoNdArray;
use nifti::{InMemNiftiObject, NiftiHeader, NiftiObject};
use tracing::debug;

use crate::error::{Error, Result};
use crate::volume::Volume;

const HEADER_SIZE: usize = 348;
const DATA_OFFSET: usize = 352;
const MEMORY_ORIGIN: &str = "<memory>";

/// Check if bytes are gzip compressed
fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

/// Header summary for diagnostics on undecodable input
fn header_info(bytes: &[u8]) -> String {
    if bytes.len() < HEADER_SIZE {
        return format!("file too small ({} bytes, need at least {})", bytes.len(), HEADER_SIZE);
    }
    let sizeof_hdr = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let magic = String::from_utf8_lossy(&bytes[344..348]).to_string();
    let datatype = i16::from_le_bytes([bytes[70], bytes[71]]);
    format!("sizeof_hdr={}, magic='{}', datatype={}", sizeof_hdr, magic, datatype)
}

fn nifti_error(origin: &Path, message: impl Into<String>) -> Error {
    Error::Nifti { path: origin.to_path_buf(), message: message.into() }
}

/// Decode a NIfTI volume from bytes
pub fn decode_volume(bytes: &[u8]) -> Result<Volume> {
    decode_with_origin(bytes, Path::new(MEMORY_ORIGIN))
}

fn decode_with_origin(bytes: &[u8], origin: &Path) -> Result<Volume> {
    let raw;
    let plain: &[u8] = if is_gzip(bytes) {
        let mut decompressed = Vec::new();
        GzDecoder::new(Cursor::new(bytes))
            .read_to_end(&mut decompressed)
            .map_err(|e| nifti_error(origin, format!("gzip decompression failed: {}", e)))?;
        raw = decompressed;
        &raw
    } else {
        bytes
    };

    let obj = InMemNiftiObject::from_reader(Cursor::new(plain))
        .map_err(|e| nifti_error(origin, format!("{} ({})", e, header_info(plain))))?;

    let header = obj.header();
    let ndim = header.dim[0] as usize;
    if ndim < 3 {
        return Err(Error::UnsupportedDimensions(ndim));
    }
    let voxel_size = (
        header.pixdim[1] as f64,
        header.pixdim[2] as f64,
        header.pixdim[3] as f64,
    );
    let affine = header_affine(header);

    let array = obj.into_volume()
        .into_ndarray::<f64>()
        .map_err(|e| nifti_error(origin, format!("failed to convert to array: {}", e)))?;

    let shape = array.shape().to_vec();
    if shape.len() < 3 {
        return Err(Error::UnsupportedDimensions(shape.len()));
    }
    let (nx, ny, nz) = (shape[0], shape[1], shape[2]);

    // Fortran order, first frame of anything beyond 3D
    let mut index = vec![0usize; shape.len()];
    let mut data = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                index[0] = i;
                index[1] = j;
                index[2] = k;
                data.push(array[index.as_slice()]);
            }
        }
    }

    debug!(dims = ?(nx, ny, nz), ?voxel_size, origin = %origin.display(), "decoded NIfTI volume");
    Volume::new(data, (nx, ny, nz), voxel_size, affine)
}

/// Affine from the header: sform rows when present, otherwise pixdim scaling
fn header_affine(header: &NiftiHeader) -> [f64; 16] {
    if header.sform_code > 0 {
        let (x, y, z) = (&header.srow_x, &header.srow_y, &header.srow_z);
        [
            x[0] as f64, x[1] as f64, x[2] as f64, x[3] as f64,
            y[0] as f64, y[1] as f64, y[2] as f64, y[3] as f64,
            z[0] as f64, z[1] as f64, z[2] as f64, z[3] as f64,
            0.0, 0.0, 0.0, 1.0,
        ]
    } else {
        let p = &header.pixdim;
        [
            p[1] as f64, 0.0, 0.0, 0.0,
            0.0, p[2] as f64, 0.0, 0.0,
            0.0, 0.0, p[3] as f64, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]
    }
}

fn put_i16(buf: &mut [u8], offset: usize, v: i16) {
    buf[offset..offset + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_f32(buf: &mut [u8], offset: usize, v: f32) {
    buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
}

/// Encode a volume as uncompressed single-file NIfTI-1 (float32)
pub fn encode_volume(volume: &Volume) -> Result<Vec<u8>> {
    let (nx, ny, nz) = volume.dims;
    for (name, d) in [("nx", nx), ("ny", ny), ("nz", nz)] {
        if d > i16::MAX as usize {
            return Err(Error::invalid(name, d, "NIfTI-1 dimensions are limited to 32767"));
        }
    }
    let (vsx, vsy, vsz) = volume.voxel_size;
    let mut header = [0u8; HEADER_SIZE];

    header[0..4].copy_from_slice(&(HEADER_SIZE as i32).to_le_bytes());

    let dim: [i16; 8] = [3, nx as i16, ny as i16, nz as i16, 1, 1, 1, 1];
    for (i, &d) in dim.iter().enumerate() {
        put_i16(&mut header, 40 + i * 2, d);
    }

    // FLOAT32, 32 bits per voxel
    put_i16(&mut header, 70, 16);
    put_i16(&mut header, 72, 32);

    let pixdim: [f32; 8] = [1.0, vsx as f32, vsy as f32, vsz as f32, 1.0, 1.0, 1.0, 1.0];
    for (i, &p) in pixdim.iter().enumerate() {
        put_f32(&mut header, 76 + i * 4, p);
    }

    put_f32(&mut header, 108, DATA_OFFSET as f32);
    put_f32(&mut header, 112, 1.0);
    put_f32(&mut header, 116, 0.0);

    // sform_code = 1 (scanner anat)
    put_i16(&mut header, 254, 1);
    for row in 0..3 {
        for col in 0..4 {
            put_f32(&mut header, 280 + row * 16 + col * 4, volume.affine[row * 4 + col] as f32);
        }
    }

    header[344..348].copy_from_slice(b"n+1\0");

    let mut buffer = Vec::with_capacity(DATA_OFFSET + volume.len() * 4);
    buffer.extend_from_slice(&header);
    // empty extension block
    buffer.extend_from_slice(&[0u8; 4]);
    for &v in &volume.data {
        buffer.extend_from_slice(&(v as f32).to_le_bytes());
    }

    Ok(buffer)
}

/// Encode a volume as gzipped NIfTI-1 (.nii.gz)
pub fn encode_volume_gz(volume: &Volume) -> Result<Vec<u8>> {
    let uncompressed = encode_volume(volume)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&uncompressed)
        .map_err(|e| nifti_error(Path::new(MEMORY_ORIGIN), format!("gzip compression failed: {}", e)))?;
    encoder.finish()
        .map_err(|e| nifti_error(Path::new(MEMORY_ORIGIN), format!("gzip finish failed: {}", e)))
}

/// Read a NIfTI file (.nii or .nii.gz) from disk
pub fn read_volume(path: &Path) -> Result<Volume> {
    let bytes = std::fs::read(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    decode_with_origin(&bytes, path)
}

/// Write a volume to disk; paths ending in `.gz` are gzip compressed
pub fn write_volume(path: &Path, volume: &Volume) -> Result<()> {
    let gz = path.to_string_lossy().ends_with(".gz");
    let bytes = if gz { encode_volume_gz(volume)? } else { encode_volume(volume)? };
    std::fs::write(path, &bytes).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote NIfTI volume");
    Ok(())
}
