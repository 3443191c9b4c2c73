//! Write processed frames and their `metadata.json` entry.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::frames_gen::{BoxError, GrayFrame};

/// On-disk format of each exported frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum FrameFormat {
    Png,
    /// ASCII grayscale (`P2`), readable as plain text.
    Pgm,
}

impl FrameFormat {
    fn extension(self) -> &'static str {
        match self {
            FrameFormat::Png => "png",
            FrameFormat::Pgm => "pgm",
        }
    }
}

impl std::fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Serialize)]
struct Dimensions {
    width: usize,
    height: usize,
}

#[derive(Debug, Serialize)]
struct FrameMetadata<'a> {
    generated_at: String,
    source: Option<String>,
    base_name: &'a str,
    frame_dir: String,
    frame_count: usize,
    fps: Option<f64>,
    dimensions: Dimensions,
    frame_format: FrameFormat,
    frames: Vec<String>,
}

impl Serialize for FrameFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.extension())
    }
}

/// Where an export landed.
#[derive(Debug)]
pub struct ExportSummary {
    pub frame_dir: PathBuf,
    pub metadata_path: PathBuf,
    pub frame_count: usize,
}

/// Write `frames` as `frame_0001.<ext>`... under `output_root/base_name` and
/// record them in `output_root/metadata.json`. `fps` is `None` for stills.
pub fn export_frames(
    frames: &[GrayFrame],
    output_root: &Path,
    base_name: &str,
    source: Option<&Path>,
    fps: Option<f64>,
    format: FrameFormat,
) -> Result<ExportSummary, BoxError> {
    let Some(first) = frames.first() else {
        return Err("No frames were exported; ensure input media contains frames.".into());
    };

    let frame_dir = output_root.join(base_name);
    fs::create_dir_all(&frame_dir)?;

    let mut frame_names = Vec::with_capacity(frames.len());
    for (index, frame) in frames.iter().enumerate() {
        let file_name = format!("frame_{:04}.{}", index + 1, format.extension());
        let path = frame_dir.join(&file_name);
        match format {
            FrameFormat::Png => write_png(frame, &path)?,
            FrameFormat::Pgm => write_pgm(frame, &path)?,
        }
        frame_names.push(format!("{base_name}/{file_name}"));
    }

    let metadata = FrameMetadata {
        generated_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
        source: source.map(|path| path.display().to_string()),
        base_name,
        frame_dir: frame_dir.display().to_string(),
        frame_count: frames.len(),
        fps,
        dimensions: Dimensions {
            width: first.width,
            height: first.height,
        },
        frame_format: format,
        frames: frame_names,
    };

    let metadata_path = output_root.join("metadata.json");
    merge_metadata(&metadata_path, base_name, serde_json::to_value(&metadata)?)?;

    Ok(ExportSummary {
        frame_dir,
        metadata_path,
        frame_count: frames.len(),
    })
}

/// Replace the `base_name` entry of the metadata file, keeping the others.
/// A missing file or one that is not a JSON object starts over from `{}`;
/// any other read failure is returned so existing entries are never lost.
fn merge_metadata(path: &Path, base_name: &str, entry: Value) -> Result<(), BoxError> {
    let mut existing = match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str::<Map<String, Value>>(&text).unwrap_or_default(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Map::new(),
        Err(err) => return Err(format!("{}: {err}", path.display()).into()),
    };
    existing.insert(base_name.to_string(), entry);
    fs::write(path, serde_json::to_string_pretty(&existing)?)?;
    Ok(())
}

fn write_png(frame: &GrayFrame, path: &Path) -> Result<(), BoxError> {
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), frame.width as u32, frame.height as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.pixels)?;
    Ok(())
}

fn write_pgm(frame: &GrayFrame, path: &Path) -> Result<(), BoxError> {
    let mut out = BufWriter::new(File::create(path)?);
    write!(out, "P2\n{} {}\n255\n", frame.width, frame.height)?;
    for row in frame.rows() {
        let values: Vec<String> = row.iter().map(u8::to_string).collect();
        writeln!(out, "{}", values.join(" "))?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames_gen::decode_png;

    fn checker() -> GrayFrame {
        GrayFrame::new(3, 2, vec![0, 255, 0, 255, 0, 128])
    }

    #[test]
    fn pgm_is_ascii_grayscale() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let summary = export_frames(&[checker()], dir.path(), "clip", None, None, FrameFormat::Pgm)
            .expect("export must succeed");

        assert_eq!(summary.frame_count, 1);
        let text = fs::read_to_string(summary.frame_dir.join("frame_0001.pgm")).expect("pgm");
        assert_eq!(text, "P2\n3 2\n255\n0 255 0\n255 0 128\n");
    }

    #[test]
    fn png_round_trips_through_decoder() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let frames = [checker(), GrayFrame::new(3, 2, vec![9; 6])];
        let summary = export_frames(&frames, dir.path(), "clip", None, None, FrameFormat::Png)
            .expect("export must succeed");

        assert_eq!(summary.frame_count, 2);
        let second = decode_png(&summary.frame_dir.join("frame_0002.png")).expect("decodes");
        assert_eq!(second, frames[1]);
        let first = decode_png(&summary.frame_dir.join("frame_0001.png")).expect("decodes");
        assert_eq!(first, frames[0]);
    }

    #[test]
    fn metadata_keeps_other_entries() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let metadata_path = dir.path().join("metadata.json");
        fs::write(&metadata_path, r#"{"older": {"frame_count": 3}}"#).expect("seed metadata");

        export_frames(
            &[checker()],
            dir.path(),
            "clip",
            Some(Path::new("clip.gif")),
            Some(12.5),
            FrameFormat::Pgm,
        )
        .expect("export must succeed");

        let text = fs::read_to_string(&metadata_path).expect("metadata written");
        let metadata: Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(metadata["older"]["frame_count"], 3);
        assert_eq!(metadata["clip"]["frame_count"], 1);
        assert_eq!(metadata["clip"]["source"], "clip.gif");
        assert_eq!(metadata["clip"]["frame_format"], "pgm");
        assert_eq!(metadata["clip"]["dimensions"]["width"], 3);
        assert_eq!(metadata["clip"]["dimensions"]["height"], 2);
        assert_eq!(metadata["clip"]["fps"], 12.5);
        assert_eq!(metadata["clip"]["frames"][0], "clip/frame_0001.pgm");
    }

    #[test]
    fn corrupt_metadata_starts_over() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let metadata_path = dir.path().join("metadata.json");
        fs::write(&metadata_path, "not json").expect("seed metadata");

        export_frames(&[checker()], dir.path(), "clip", None, None, FrameFormat::Pgm)
            .expect("export must succeed");

        let metadata: Map<String, Value> =
            serde_json::from_str(&fs::read_to_string(&metadata_path).expect("written"))
                .expect("valid json");
        assert_eq!(metadata.keys().collect::<Vec<_>>(), ["clip"]);
    }

    #[test]
    fn stills_record_null_fps() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        export_frames(&[checker()], dir.path(), "clip", None, None, FrameFormat::Png)
            .expect("export must succeed");

        let text = fs::read_to_string(dir.path().join("metadata.json")).expect("written");
        let metadata: Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(metadata["clip"]["fps"], Value::Null);
    }

    #[test]
    fn unreadable_metadata_is_kept_and_reported() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        // A directory where the metadata file belongs cannot be read as text.
        let metadata_path = dir.path().join("metadata.json");
        fs::create_dir(&metadata_path).expect("seed directory");
        fs::write(metadata_path.join("keep.txt"), "other entries").expect("seed file");

        let err = export_frames(&[checker()], dir.path(), "clip", None, None, FrameFormat::Pgm)
            .expect_err("metadata cannot be merged");
        assert!(err.to_string().contains("metadata.json"), "{err}");
        assert!(metadata_path.join("keep.txt").exists());
    }

    #[test]
    fn no_frames_is_an_error() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let err = export_frames(&[], dir.path(), "clip", None, None, FrameFormat::Png)
            .expect_err("nothing to export");
        assert!(err.to_string().starts_with("No frames were exported"));
        assert!(!dir.path().join("metadata.json").exists());
    }
}
