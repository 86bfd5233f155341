use std::collections::VecDeque;
use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::foundation::core::FrameSize;
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::media::frame::FrameRGBA;
use crate::media::probe::SourceInfo;

/// Source of raw (unrotated) frames in increasing frame order.
pub trait FrameSource {
    /// Raw frame size.
    fn frame_size(&self) -> FrameSize;
    /// Next frame, or `None` once the stream is drained.
    fn next_frame(&mut self) -> OverlayResult<Option<FrameRGBA>>;
    /// Release the underlying decoder. Called once, after the last frame or on early exit.
    fn close(&mut self) -> OverlayResult<()> {
        Ok(())
    }
}

/// Streams frames from the system `ffmpeg` binary as raw RGBA8.
///
/// Frames are decoded with `-noautorotate`: they arrive exactly as stored, and rotation is the
/// caller's concern.
pub struct FfmpegFrameSource {
    size: FrameSize,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    drained: bool,
    frames_read: u64,
}

impl FfmpegFrameSource {
    /// Start decoding every frame of `source`.
    pub fn open(source: &SourceInfo) -> OverlayResult<Self> {
        Self::spawn(source, None)
    }

    /// Start decoding at most `max_frames` leading frames of `source`.
    pub fn open_leading(source: &SourceInfo, max_frames: u32) -> OverlayResult<Self> {
        Self::spawn(source, Some(max_frames))
    }

    fn spawn(source: &SourceInfo, max_frames: Option<u32>) -> OverlayResult<Self> {
        if source.raw_size.width == 0 || source.raw_size.height == 0 {
            return Err(OverlayError::resource(
                "decoded video frame size is zero (invalid source dimensions)",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args(["-v", "error", "-noautorotate", "-i"])
            .arg(&source.source_path)
            .args(["-an", "-sn"]);
        if let Some(n) = max_frames {
            cmd.args(["-frames:v", &n.to_string()]);
        }
        cmd.args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"]);

        let mut child = cmd.spawn().map_err(|e| {
            OverlayError::resource(format!(
                "failed to spawn ffmpeg decoder (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| OverlayError::resource("failed to open ffmpeg stdout (unexpected)"))?;
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
            path = %source.source_path.display(),
            width = source.raw_size.width,
            height = source.raw_size.height,
            "ffmpeg decoder started"
        );

        Ok(Self {
            size: source.raw_size,
            child: Some(child),
            stdout: Some(stdout),
            stderr_drain: Some(stderr_drain),
            drained: false,
            frames_read: 0,
        })
    }

    /// Frames returned so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    fn join_stderr(&mut self) -> Vec<u8> {
        match self.stderr_drain.take() {
            Some(handle) => handle.join().ok().and_then(|r| r.ok()).unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

impl FrameSource for FfmpegFrameSource {
    fn frame_size(&self) -> FrameSize {
        self.size
    }

    fn next_frame(&mut self) -> OverlayResult<Option<FrameRGBA>> {
        if self.drained {
            return Ok(None);
        }
        let Some(stdout) = self.stdout.as_mut() else {
            return Err(OverlayError::resource("ffmpeg decoder is already closed"));
        };

        let mut buf = vec![0u8; self.size.rgba_len()];
        let filled = read_full(stdout, &mut buf).map_err(|e| {
            OverlayError::resource(format!("failed to read frame from ffmpeg stdout: {e}"))
        })?;
        if filled == 0 {
            self.drained = true;
            return Ok(None);
        }
        if filled < buf.len() {
            self.drained = true;
            return Err(OverlayError::resource(format!(
                "decoded frame {} is truncated: got {filled} bytes, expected {}",
                self.frames_read,
                buf.len()
            )));
        }

        self.frames_read += 1;
        FrameRGBA::new(self.size.width, self.size.height, buf).map(Some)
    }

    fn close(&mut self) -> OverlayResult<()> {
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        if !self.drained {
            // Stopped early on purpose; the exit status of a killed decoder is meaningless.
            let _ = child.kill();
            let _ = child.wait();
            self.join_stderr();
            return Ok(());
        }

        let status = child.wait().map_err(|e| {
            OverlayError::resource(format!("failed to wait for ffmpeg decoder: {e}"))
        })?;
        let stderr_bytes = self.join_stderr();
        if !status.success() {
            return Err(OverlayError::resource(format!(
                "ffmpeg decoder exited with status {}: {}",
                status,
                String::from_utf8_lossy(&stderr_bytes).trim()
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        drop(self.stdout.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.join_stderr();
    }
}

fn read_full(r: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Frames held in memory, for tests and pre-decoded clips.
#[derive(Debug)]
pub struct InMemoryFrameSource {
    size: FrameSize,
    frames: VecDeque<FrameRGBA>,
    closed: bool,
}

impl InMemoryFrameSource {
    /// Create a source; every frame must have `size`.
    pub fn new(size: FrameSize, frames: Vec<FrameRGBA>) -> OverlayResult<Self> {
        if let Some(bad) = frames.iter().find(|f| f.size() != size) {
            return Err(OverlayError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                bad.width, bad.height, size.width, size.height
            )));
        }
        Ok(Self {
            size,
            frames: frames.into(),
            closed: false,
        })
    }

    /// Return `true` once [`FrameSource::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FrameSource for InMemoryFrameSource {
    fn frame_size(&self) -> FrameSize {
        self.size
    }

    fn next_frame(&mut self) -> OverlayResult<Option<FrameRGBA>> {
        if self.closed {
            return Err(OverlayError::resource("frame source is already closed"));
        }
        Ok(self.frames.pop_front())
    }

    fn close(&mut self) -> OverlayResult<()> {
        self.closed = true;
        Ok(())
    }
}

/// Pull up to `count` leading frames from `source`, stopping early at end of stream.
pub fn take_frames(source: &mut dyn FrameSource, count: usize) -> OverlayResult<Vec<FrameRGBA>> {
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        match source.next_frame()? {
            Some(f) => out.push(f),
            None => break,
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/media/decode.rs"]
mod tests;
