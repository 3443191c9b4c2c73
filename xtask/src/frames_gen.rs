//! Turn PNG frames into grayscale bitmaps sized for the LED matrix.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// How source pixels are sampled when resizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Interpolation {
    /// Pixel under each target center.
    Nearest,
    /// Blend of the four source pixels around each target center.
    Bilinear,
    /// Average of every source pixel under each target pixel.
    Box,
    /// Cubic convolution (`a = -0.5`), widened when downscaling.
    Bicubic,
    /// Three-lobe Lanczos window, widened when downscaling.
    Lanczos,
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interpolation::Nearest => write!(f, "nearest"),
            Interpolation::Bilinear => write!(f, "bilinear"),
            Interpolation::Box => write!(f, "box"),
            Interpolation::Bicubic => write!(f, "bicubic"),
            Interpolation::Lanczos => write!(f, "lanczos"),
        }
    }
}

/// An 8-bit grayscale image, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayFrame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl GrayFrame {
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Self {
        assert_eq!(pixels.len(), width * height, "pixel count must be width*height");
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks(self.width.max(1)).take(self.height)
    }

    fn at(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }

    /// Resample to `width × height`.
    pub fn resize(&self, width: usize, height: usize, interpolation: Interpolation) -> GrayFrame {
        if (width, height) == (self.width, self.height) {
            return self.clone();
        }
        let sample: fn(&Self, usize, usize, usize, usize) -> u8 = match interpolation {
            Interpolation::Nearest => Self::nearest,
            Interpolation::Bilinear => Self::bilinear,
            Interpolation::Box => Self::box_average,
            Interpolation::Bicubic => return self.convolve(width, height, bicubic, 2.0),
            Interpolation::Lanczos => return self.convolve(width, height, lanczos, 3.0),
        };
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(sample(self, x, y, width, height));
            }
        }
        GrayFrame::new(width, height, pixels)
    }

    fn nearest(&self, x: usize, y: usize, width: usize, height: usize) -> u8 {
        let src_x = ((2 * x + 1) * self.width / (2 * width)).min(self.width - 1);
        let src_y = ((2 * y + 1) * self.height / (2 * height)).min(self.height - 1);
        self.at(src_x, src_y)
    }

    fn bilinear(&self, x: usize, y: usize, width: usize, height: usize) -> u8 {
        let (x0, x1, tx) = sample_axis(x, width, self.width);
        let (y0, y1, ty) = sample_axis(y, height, self.height);
        let top = lerp(f32::from(self.at(x0, y0)), f32::from(self.at(x1, y0)), tx);
        let bottom = lerp(f32::from(self.at(x0, y1)), f32::from(self.at(x1, y1)), tx);
        lerp(top, bottom, ty).round().clamp(0.0, 255.0) as u8
    }

    fn box_average(&self, x: usize, y: usize, width: usize, height: usize) -> u8 {
        let (x_start, x_end) = box_span(x, width, self.width);
        let (y_start, y_end) = box_span(y, height, self.height);
        let mut sum = 0u32;
        let mut count = 0u32;
        for src_y in y_start..y_end {
            for src_x in x_start..x_end {
                sum += u32::from(self.at(src_x, src_y));
                count += 1;
            }
        }
        ((sum + count / 2) / count) as u8
    }

    // Separable resampling: rows first, then columns.
    fn convolve(&self, width: usize, height: usize, kernel: fn(f64) -> f64, support: f64) -> GrayFrame {
        let columns: Vec<_> = (0..width)
            .map(|x| Taps::new(x, width, self.width, kernel, support))
            .collect();
        let mut horizontal = vec![0.0; width * self.height];
        for (src_row, out) in self.rows().zip(horizontal.chunks_mut(width)) {
            for (value, taps) in out.iter_mut().zip(&columns) {
                *value = taps.apply(|i| f64::from(src_row[i]));
            }
        }

        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            let taps = Taps::new(y, height, self.height, kernel, support);
            for x in 0..width {
                let value = taps.apply(|i| horizontal[i * width + x]);
                pixels.push(value.round().clamp(0.0, 255.0) as u8);
            }
        }
        GrayFrame::new(width, height, pixels)
    }
}

// Source pixels on either side of the target center, and the blend weight.
fn sample_axis(dst: usize, dst_len: usize, src_len: usize) -> (usize, usize, f32) {
    let center = (dst as f32 + 0.5) * src_len as f32 / dst_len as f32 - 0.5;
    let center = center.clamp(0.0, (src_len - 1) as f32);
    let low = center.floor() as usize;
    let high = (low + 1).min(src_len - 1);
    (low, high, center - low as f32)
}

// Source pixels covered by one target pixel; never empty.
fn box_span(dst: usize, dst_len: usize, src_len: usize) -> (usize, usize) {
    let start = dst * src_len / dst_len;
    let end = ((dst + 1) * src_len).div_ceil(dst_len).max(start + 1);
    (start, end.min(src_len))
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Normalized filter weights for the source span under one target pixel.
struct Taps {
    start: usize,
    weights: Vec<f64>,
}

impl Taps {
    fn new(dst: usize, dst_len: usize, src_len: usize, kernel: fn(f64) -> f64, support: f64) -> Self {
        let scale = src_len as f64 / dst_len as f64;
        // Downscaling stretches the kernel so every source pixel contributes.
        let stretch = scale.max(1.0);
        let reach = support * stretch;
        let center = (dst as f64 + 0.5) * scale;
        let start = (center - reach + 0.5).floor().max(0.0) as usize;
        let end = ((center + reach + 0.5).floor() as usize).min(src_len).max(start + 1);

        let mut weights: Vec<f64> = (start..end)
            .map(|src| kernel((src as f64 - center + 0.5) / stretch))
            .collect();
        let total: f64 = weights.iter().sum();
        if total == 0.0 {
            weights = vec![1.0 / weights.len() as f64; weights.len()];
        } else {
            weights.iter_mut().for_each(|weight| *weight /= total);
        }
        Self { start, weights }
    }

    fn apply(&self, sample: impl Fn(usize) -> f64) -> f64 {
        self.weights
            .iter()
            .enumerate()
            .map(|(offset, weight)| sample(self.start + offset) * weight)
            .sum()
    }
}

fn bicubic(x: f64) -> f64 {
    const A: f64 = -0.5;
    let x = x.abs();
    if x < 1.0 {
        ((A + 2.0) * x - (A + 3.0)) * x * x + 1.0
    } else if x < 2.0 {
        (((x - 5.0) * x + 8.0) * x - 4.0) * A
    } else {
        0.0
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let x = x * std::f64::consts::PI;
        x.sin() / x
    }
}

fn lanczos(x: f64) -> f64 {
    if x.abs() < 3.0 { sinc(x) * sinc(x / 3.0) } else { 0.0 }
}

/// ITU-R 601 luma in the same fixed point PIL uses for `L` conversion.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((19595 * u32::from(r) + 38470 * u32::from(g) + 7471 * u32::from(b) + 0x8000) >> 16) as u8
}

/// What the `frames` command reads.
#[derive(Debug, PartialEq, Eq)]
pub enum MediaInput {
    /// Still PNGs, one frame each, in name order.
    Png(Vec<PathBuf>),
    /// A single GIF, animated or not.
    Gif(PathBuf),
}

/// Frames at their target size, plus the source frame rate when it has one.
#[derive(Debug)]
pub struct Media {
    pub frames: Vec<GrayFrame>,
    pub fps: Option<f64>,
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Classify `input`: a `.png` or `.gif` file, or a directory whose `.png`
/// files are the frames, sorted by name.
pub fn collect_inputs(input: &Path) -> Result<MediaInput, BoxError> {
    if !input.exists() {
        return Err(format!("Path does not exist: {}", input.display()).into());
    }
    if input.is_file() {
        if has_extension(input, "png") {
            return Ok(MediaInput::Png(vec![input.to_path_buf()]));
        }
        if has_extension(input, "gif") {
            return Ok(MediaInput::Gif(input.to_path_buf()));
        }
        return Err(format!(
            "Unsupported input format: {} (expected .png, .gif, or a directory of .png frames)",
            input.display()
        )
        .into());
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(input)? {
        let path = entry?.path();
        if has_extension(&path, "png") && path.is_file() {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(format!("No PNG frames found in {}", input.display()).into());
    }
    paths.sort();
    Ok(MediaInput::Png(paths))
}

/// Decode one PNG into grayscale at its own resolution. Alpha is ignored.
pub fn decode_png(path: &Path) -> Result<GrayFrame, BoxError> {
    let mut decoder = png::Decoder::new(File::open(path)?);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;

    let channels = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        png::ColorType::Indexed => {
            return Err(format!("{}: palette was not expanded", path.display()).into());
        }
    };

    let width = info.width as usize;
    let height = info.height as usize;
    let mut pixels = Vec::with_capacity(width * height);
    for line in buf.chunks(info.line_size).take(height) {
        for pixel in line.chunks_exact(channels).take(width) {
            pixels.push(match pixel {
                [gray] | [gray, _] => *gray,
                [r, g, b] | [r, g, b, _] => luma(*r, *g, *b),
                _ => unreachable!("chunks_exact yields {channels} samples"),
            });
        }
    }

    Ok(GrayFrame::new(width, height, pixels))
}

/// Decode every frame of a GIF at its logical screen size.
///
/// Frames are composited onto an RGBA canvas the way players show them,
/// honoring each frame's disposal. Transparent canvas pixels read as black.
pub fn decode_gif(path: &Path) -> Result<Media, BoxError> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(File::open(path)?)?;

    let width = usize::from(decoder.width());
    let height = usize::from(decoder.height());
    let mut canvas = vec![0u8; width * height * 4];
    let mut frames = Vec::new();
    let mut delays = Vec::new();

    while let Some(frame) = decoder.read_next_frame()? {
        let saved = (frame.dispose == gif::DisposalMethod::Previous).then(|| canvas.clone());

        for (dst, src) in frame_pixels(frame, width, height) {
            if let Some(rgba) = frame.buffer.get(src..src + 4) {
                // Alpha 0 marks the frame's transparent index.
                if rgba[3] != 0 {
                    canvas[dst..dst + 4].copy_from_slice(rgba);
                }
            }
        }

        let pixels = canvas
            .chunks_exact(4)
            .map(|rgba| luma(rgba[0], rgba[1], rgba[2]))
            .collect();
        frames.push(GrayFrame::new(width, height, pixels));
        delays.push(frame.delay);

        match (frame.dispose, saved) {
            (gif::DisposalMethod::Background, _) => {
                for (dst, _) in frame_pixels(frame, width, height) {
                    canvas[dst..dst + 4].fill(0);
                }
            }
            (gif::DisposalMethod::Previous, Some(saved)) => canvas = saved,
            _ => {}
        }
    }

    if frames.is_empty() {
        return Err("GIF contains no frames".into());
    }
    Ok(Media {
        frames,
        fps: fps_from_delays(&delays),
    })
}

// Canvas byte offsets a frame covers, paired with the matching offsets into
// its own RGBA buffer. Parts outside the logical screen are skipped.
fn frame_pixels(
    frame: &gif::Frame<'_>,
    width: usize,
    height: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let left = usize::from(frame.left);
    let top = usize::from(frame.top);
    let frame_width = usize::from(frame.width);
    (0..usize::from(frame.height))
        .flat_map(move |fy| (0..frame_width).map(move |fx| (fx, fy)))
        .filter(move |&(fx, fy)| left + fx < width && top + fy < height)
        .map(move |(fx, fy)| {
            (
                ((top + fy) * width + left + fx) * 4,
                (fy * frame_width + fx) * 4,
            )
        })
}

/// Frames per second from GIF delays (hundredths of a second each).
/// `None` when no frame carries a delay.
pub fn fps_from_delays(delays: &[u16]) -> Option<f64> {
    let total: u32 = delays.iter().map(|&delay| u32::from(delay)).sum();
    (total > 0).then(|| 100.0 * delays.len() as f64 / f64::from(total))
}

/// Decode and resize every input in parallel; results keep input order.
pub fn process_frames(
    paths: &[PathBuf],
    width: usize,
    height: usize,
    interpolation: Interpolation,
) -> Result<Vec<GrayFrame>, BoxError> {
    paths
        .par_iter()
        .map(|path| {
            decode_png(path)
                .map(|frame| frame.resize(width, height, interpolation))
                .map_err(|err| -> BoxError { format!("{}: {err}", path.display()).into() })
        })
        .collect()
}

/// Load `input` and resize all of its frames to `width × height`.
pub fn process_media(
    input: &MediaInput,
    width: usize,
    height: usize,
    interpolation: Interpolation,
) -> Result<Media, BoxError> {
    match input {
        MediaInput::Png(paths) => Ok(Media {
            frames: process_frames(paths, width, height, interpolation)?,
            fps: None,
        }),
        MediaInput::Gif(path) => {
            let media = decode_gif(path)
                .map_err(|err| -> BoxError { format!("{}: {err}", path.display()).into() })?;
            Ok(Media {
                frames: media
                    .frames
                    .par_iter()
                    .map(|frame| frame.resize(width, height, interpolation))
                    .collect(),
                fps: media.fps,
            })
        }
    }
}

/// Filesystem-friendly base name: runs outside `[A-Za-z0-9_.-]` become `_`.
pub fn sanitize_base_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
            sanitized.push(c);
            in_run = false;
        } else if !in_run {
            sanitized.push('_');
            in_run = true;
        }
    }
    let trimmed = sanitized.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "output".to_string()
    } else {
        trimmed.to_string()
    }
}
