use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameSize};
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::media::frame::FrameRGBA;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Drop the last column and/or row of odd-sized frames instead of rejecting them.
    pub crop_to_even: bool,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            crop_to_even: false,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGBA8 frames to stdin.
///
/// Output is H.264 in yuv420p with `+faststart`, which plays back in browsers and on phones.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    encoded: Option<FrameSize>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            encoded: None,
            last_idx: None,
        }
    }

    /// Output path this sink writes to.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn kill_child(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> OverlayResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(OverlayError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(OverlayError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        let encoded = encoded_size(cfg, self.opts.crop_to_even)?;
        if encoded.width == 0 || encoded.height == 0 {
            return Err(OverlayError::validation(format!(
                "{}x{} frames leave nothing after cropping to even dimensions",
                cfg.width, cfg.height
            )));
        }
        if encoded != FrameSize::new(cfg.width, cfg.height) {
            tracing::warn!(
                "cropping {}x{} frames to {}x{} for yuv420p output",
                cfg.width,
                cfg.height,
                encoded.width,
                encoded.height
            );
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(OverlayError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(OverlayError::resource(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", encoded.width, encoded.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);
        cmd.args([
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            OverlayError::resource(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| OverlayError::resource("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| OverlayError::resource("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = encoded.width,
            height = encoded.height,
            fps = cfg.fps.as_f64(),
            "ffmpeg encoder started"
        );

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.encoded = Some(encoded);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> OverlayResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| OverlayError::resource("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(OverlayError::resource(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(OverlayError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        let encoded = self.encoded.unwrap_or_else(|| frame.size());
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(OverlayError::resource("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        let write_err = |e: std::io::Error| {
            OverlayError::resource(format!("failed to write frame to ffmpeg stdin: {e}"))
        };
        if encoded == frame.size() {
            stdin.write_all(&frame.data).map_err(write_err)?;
        } else {
            for row in cropped_rows(frame, encoded) {
                stdin.write_all(row).map_err(write_err)?;
            }
        }
        Ok(())
    }

    fn end(&mut self) -> OverlayResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| OverlayError::resource("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            OverlayError::resource(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| OverlayError::resource("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| OverlayError::resource(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(OverlayError::resource(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        self.encoded = None;
        Ok(())
    }

    fn abort(&mut self) {
        let started = self.cfg.take().is_some();
        self.encoded = None;
        self.kill_child();
        if started && self.opts.out_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.opts.out_path) {
                tracing::warn!(
                    "failed to remove partial output '{}': {e}",
                    self.opts.out_path.display()
                );
            }
        }
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

/// Size actually handed to the encoder. yuv420p subsamples chroma 2x2, so libx264 rejects
/// odd dimensions.
fn encoded_size(cfg: SinkConfig, crop_to_even: bool) -> OverlayResult<FrameSize> {
    if cfg.width.is_multiple_of(2) && cfg.height.is_multiple_of(2) {
        return Ok(FrameSize::new(cfg.width, cfg.height));
    }
    if !crop_to_even {
        return Err(OverlayError::validation(format!(
            "{}x{} output cannot be encoded: yuv420p mp4 output needs even width and height \
             (enable crop_to_even to drop the last odd row/column)",
            cfg.width, cfg.height
        )));
    }
    Ok(FrameSize::new(cfg.width & !1, cfg.height & !1))
}

/// Top-left `size` window of `frame`, one RGBA row slice at a time.
fn cropped_rows(frame: &FrameRGBA, size: FrameSize) -> impl Iterator<Item = &[u8]> {
    let stride = frame.width as usize * 4;
    let keep = size.width as usize * 4;
    frame
        .data
        .chunks_exact(stride)
        .take(size.height as usize)
        .map(move |row| &row[..keep])
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, use `-r` before `-i` to specify the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> OverlayResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
