use crate::error::UnpackFailure;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Decompress `source` into a new file at `destination`, returning the
/// number of bytes written. Blocking; run it on a blocking thread.
///
/// Concatenated gzip members are decoded as one stream. On failure the
/// partially written destination is removed so later stages never see a
/// truncated file.
pub fn gunzip_file(source: &Path, destination: &Path) -> Result<u64, UnpackFailure> {
    let input = File::open(source).map_err(|e| UnpackFailure::Open {
        path: source.to_path_buf(),
        source: e,
    })?;
    let output = File::create(destination).map_err(|e| UnpackFailure::Create {
        path: destination.to_path_buf(),
        source: e,
    })?;

    let mut decoder = MultiGzDecoder::new(BufReader::new(input));
    let mut writer = BufWriter::new(output);

    let result = std::io::copy(&mut decoder, &mut writer)
        .map_err(|e| UnpackFailure::Decompress {
            path: source.to_path_buf(),
            source: e,
        })
        .and_then(|n| {
            writer.flush().map_err(|e| UnpackFailure::Write {
                path: destination.to_path_buf(),
                source: e,
            })?;
            Ok(n)
        });

    if result.is_err() {
        drop(writer);
        let _ = std::fs::remove_file(destination);
    }
    result
}
