use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::canvas::TileCanvas;

#[derive(Debug)]
pub enum SnapshotError {
    EmptyCanvas,
    Io(std::io::Error),
    Encode(png::EncodingError),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::EmptyCanvas => write!(f, "cannot snapshot a zero-sized canvas"),
            SnapshotError::Io(err) => write!(f, "snapshot write failed: {}", err),
            SnapshotError::Encode(err) => write!(f, "snapshot encode failed: {}", err),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::EmptyCanvas => None,
            SnapshotError::Io(err) => Some(err),
            SnapshotError::Encode(err) => Some(err),
        }
    }
}

/// Writes a canvas to an RGBA PNG, mainly for debugging match renders.
pub fn write_png(canvas: &TileCanvas, path: &Path) -> Result<(), SnapshotError> {
    if canvas.width_px() == 0 || canvas.height_px() == 0 {
        return Err(SnapshotError::EmptyCanvas);
    }
    let file = File::create(path).map_err(SnapshotError::Io)?;
    let writer = BufWriter::new(file);
    let mut encoder = png::Encoder::new(writer, canvas.width_px(), canvas.height_px());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut png_writer = encoder.write_header().map_err(SnapshotError::Encode)?;
    png_writer
        .write_image_data(canvas.as_rgba())
        .map_err(SnapshotError::Encode)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Color;
    use crate::geometry::BoardDims;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let unique = format!(
            "matchview-snapshot-{}-{}-{}",
            name,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock before epoch")
                .as_nanos()
        );
        std::env::temp_dir().join(unique)
    }

    #[test]
    fn snapshot_round_trips_through_the_png_decoder() {
        let mut canvas = TileCanvas::new(BoardDims::new(1, 1));
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, Color::rgb(10, 20, 30));
        let path = temp_path("roundtrip");
        write_png(&canvas, &path).expect("write png");

        let decoder = png::Decoder::new(File::open(&path).expect("open png"));
        let mut reader = decoder.read_info().expect("read info");
        let mut buffer = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buffer).expect("decode frame");
        assert_eq!(info.width, canvas.width_px());
        assert_eq!(info.height, canvas.height_px());
        assert_eq!(&buffer[..4], &[10, 20, 30, 255]);
        std::fs::remove_file(&path).expect("cleanup");
    }

    #[test]
    fn snapshot_of_empty_canvas_is_rejected() {
        let canvas = TileCanvas::new(BoardDims::new(0, 0));
        let err = write_png(&canvas, &temp_path("empty")).expect_err("must fail");
        assert!(matches!(err, SnapshotError::EmptyCanvas));
    }
}
