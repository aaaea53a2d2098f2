//! Animated GIF rendering for confetti previews

use crate::output::{ensure_parent, OutputError};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Per-frame delay in milliseconds for a playback rate, rounded to the
/// centisecond resolution GIF stores.
pub fn frame_delay_ms(fps: u32) -> u32 {
    let ms = 1000 / fps.max(1);
    ((ms + 5) / 10).max(1) * 10
}

/// Render a sequence of frames as an animated GIF.
///
/// An empty frame list writes nothing.
pub fn render_gif(
    frames: &[RgbaImage],
    duration_ms: u32,
    loop_anim: bool,
    path: &Path,
) -> Result<(), OutputError> {
    if frames.is_empty() {
        return Ok(());
    }
    ensure_parent(path)?;

    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(if loop_anim { Repeat::Infinite } else { Repeat::Finite(0) })?;

    // GIF delays are in centiseconds
    let delay_cs = (duration_ms / 10).max(1);
    for rgba_image in frames {
        let delay = Delay::from_numer_denom_ms(delay_cs * 10, 1);
        encoder.encode_frame(Frame::from_parts(rgba_image.clone(), 0, 0, delay))?;
    }

    Ok(())
}
