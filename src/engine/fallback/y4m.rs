//! YUV4MPEG2 frame source and capture sink

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::FrameRate;
use crate::engine::fallback::{CaptureSink, FrameSource, SourceMetadata};

const SIGNATURE: &str = "YUV4MPEG2";
const FRAME_MARKER: &[u8] = b"FRAME";
const DEFAULT_COLORSPACE: &str = "420jpeg";

/// Parsed stream header
#[derive(Debug, Clone, PartialEq)]
struct StreamHeader {
    width: u32,
    height: u32,
    frame_rate: FrameRate,
    colorspace: String,
}

impl StreamHeader {
    fn parse(line: &str) -> Result<Self, DomainError> {
        let mut tokens = line.split_ascii_whitespace();
        if tokens.next() != Some(SIGNATURE) {
            return Err(DomainError::Decode("missing YUV4MPEG2 signature".to_string()));
        }

        let mut width = None;
        let mut height = None;
        let mut frame_rate = None;
        let mut colorspace = DEFAULT_COLORSPACE.to_string();

        for token in tokens {
            let Some(tag) = token.get(..1) else {
                continue;
            };
            let value = &token[1..];
            match tag {
                "W" => width = value.parse::<u32>().ok(),
                "H" => height = value.parse::<u32>().ok(),
                "F" => {
                    frame_rate = value
                        .split_once(':')
                        .and_then(|(n, d)| Some((n.parse::<u32>().ok()?, d.parse::<u32>().ok()?)))
                        .and_then(|(n, d)| FrameRate::new(n, d).ok())
                }
                "C" => colorspace = value.to_string(),
                // interlacing, aspect and extension tags do not affect layout
                _ => {}
            }
        }

        let width = width
            .filter(|w| *w > 0)
            .ok_or_else(|| DomainError::Decode("missing or invalid width".to_string()))?;
        let height = height
            .filter(|h| *h > 0)
            .ok_or_else(|| DomainError::Decode("missing or invalid height".to_string()))?;
        let frame_rate =
            frame_rate.ok_or_else(|| DomainError::Decode("missing or invalid frame rate".to_string()))?;

        Ok(Self {
            width,
            height,
            frame_rate,
            colorspace,
        })
    }

    /// Bytes of pixel data per frame
    fn frame_size(&self) -> Result<usize, DomainError> {
        let w = self.width as usize;
        let h = self.height as usize;
        let chroma_w = w / 2 + w % 2;
        let chroma_h = h / 2 + h % 2;
        let cs = self.colorspace.as_str();

        let luma = w.checked_mul(h);
        let size = if cs.starts_with("420") {
            chroma_w
                .checked_mul(chroma_h)
                .and_then(|c| c.checked_mul(2))
                .and_then(|c| luma?.checked_add(c))
        } else if cs.starts_with("422") {
            chroma_w
                .checked_mul(h)
                .and_then(|c| c.checked_mul(2))
                .and_then(|c| luma?.checked_add(c))
        } else if cs == "444alpha" {
            luma.and_then(|l| l.checked_mul(4))
        } else if cs.starts_with("444") {
            luma.and_then(|l| l.checked_mul(3))
        } else if cs.starts_with("mono") {
            luma
        } else {
            return Err(DomainError::Decode(format!(
                "unsupported colorspace: {}",
                self.colorspace
            )));
        };
        size.ok_or_else(|| DomainError::Decode("frame size overflows".to_string()))
    }
}

/// Reads a `.y4m` file into memory and serves frames by timestamp
pub struct Y4mSource {
    path: PathBuf,
    data: Vec<u8>,
    header: Option<StreamHeader>,
    frame_offsets: Vec<usize>,
    frame_size: usize,
    current: usize,
}

impl Y4mSource {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: Vec::new(),
            header: None,
            frame_offsets: Vec::new(),
            frame_size: 0,
            current: 0,
        }
    }

    /// Read `path` on the async runtime's blocking-safe file API
    pub async fn read(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| DomainError::Decode(format!("cannot read {}: {}", path.display(), e)))?;
        Ok(Self {
            path,
            ..Self::from_bytes(data)
        })
    }

    /// Build a source over bytes already in memory
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            path: PathBuf::new(),
            data,
            header: None,
            frame_offsets: Vec::new(),
            frame_size: 0,
            current: 0,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_offsets.len()
    }

    fn index_frames(&mut self, body_start: usize) -> Result<(), DomainError> {
        let mut offset = body_start;
        while offset < self.data.len() {
            let rest = &self.data[offset..];
            if !rest.starts_with(FRAME_MARKER) {
                return Err(DomainError::Decode(format!(
                    "expected FRAME marker at byte {}",
                    offset
                )));
            }
            let line_end = rest
                .iter()
                .position(|b| *b == b'\n')
                .ok_or_else(|| DomainError::Decode("unterminated FRAME header".to_string()))?;
            let pixels = offset + line_end + 1;
            let frame_end = pixels
                .checked_add(self.frame_size)
                .ok_or_else(|| DomainError::Decode("frame size overflows".to_string()))?;
            if frame_end > self.data.len() {
                // a truncated trailing frame is ignored
                warn!("Ignoring truncated frame at byte {}", offset);
                break;
            }
            self.frame_offsets.push(pixels);
            offset = frame_end;
        }
        Ok(())
    }
}

impl FrameSource for Y4mSource {
    fn load_metadata(&mut self) -> Result<SourceMetadata, DomainError> {
        if self.data.is_empty() && !self.path.as_os_str().is_empty() {
            self.data = std::fs::read(&self.path).map_err(|e| {
                DomainError::Decode(format!("cannot read {}: {}", self.path.display(), e))
            })?;
        }

        let header_end = self
            .data
            .iter()
            .position(|b| *b == b'\n')
            .ok_or_else(|| DomainError::Decode("missing stream header".to_string()))?;
        let line = std::str::from_utf8(&self.data[..header_end])
            .map_err(|_| DomainError::Decode("stream header is not ASCII".to_string()))?;
        let header = StreamHeader::parse(line)?;
        self.frame_size = header.frame_size()?;
        self.frame_offsets.clear();
        self.index_frames(header_end + 1)?;

        if self.frame_offsets.is_empty() {
            return Err(DomainError::Decode("stream contains no frames".to_string()));
        }

        let duration = self.frame_offsets.len() as f64 * header.frame_rate.frame_duration();
        debug!(
            "Indexed {} frames of {} bytes",
            self.frame_offsets.len(),
            self.frame_size
        );

        let metadata = SourceMetadata {
            width: header.width,
            height: header.height,
            duration,
            frame_rate: header.frame_rate,
            pixel_format: Some(header.colorspace.clone()),
        };
        self.header = Some(header);
        Ok(metadata)
    }

    fn seek(&mut self, position: f64) -> Result<(), DomainError> {
        let header = self
            .header
            .as_ref()
            .ok_or_else(|| DomainError::Decode("seek before metadata loaded".to_string()))?;
        if !position.is_finite() || position < 0.0 {
            return Err(DomainError::Decode(format!("invalid seek position {}", position)));
        }
        // small epsilon so exact frame boundaries do not round down
        let index = (position * header.frame_rate.as_f64() + 1e-6).floor() as usize;
        self.current = index.min(self.frame_offsets.len().saturating_sub(1));
        Ok(())
    }

    fn current_frame(&mut self) -> Result<&[u8], DomainError> {
        let start = *self
            .frame_offsets
            .get(self.current)
            .ok_or_else(|| DomainError::Decode("no frame at current position".to_string()))?;
        Ok(&self.data[start..start + self.frame_size])
    }
}

/// Writes captured frames to a `.y4m` file
pub struct Y4mSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    frames_written: u64,
}

impl Y4mSink {
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            frames_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn capture_error(&self, action: &str, e: std::io::Error) -> DomainError {
        DomainError::Capture(format!("{} {}: {}", action, self.path.display(), e))
    }
}

impl CaptureSink for Y4mSink {
    type Output = PathBuf;

    fn start(&mut self, metadata: &SourceMetadata, rate: FrameRate) -> Result<(), DomainError> {
        let file = File::create(&self.path).map_err(|e| self.capture_error("cannot create", e))?;
        let mut writer = BufWriter::new(file);
        let colorspace = metadata
            .pixel_format
            .as_deref()
            .unwrap_or(DEFAULT_COLORSPACE);
        let header = writeln!(
            writer,
            "{} W{} H{} F{}:{} Ip A1:1 C{}",
            SIGNATURE, metadata.width, metadata.height, rate.num, rate.den, colorspace
        );
        if let Err(e) = header {
            drop(writer);
            if let Err(remove) = std::fs::remove_file(&self.path) {
                warn!("Failed to remove partial capture {}: {}", self.path.display(), remove);
            }
            return Err(self.capture_error("cannot write header to", e));
        }
        self.writer = Some(writer);
        self.frames_written = 0;
        Ok(())
    }

    fn capture(&mut self, frame: &[u8]) -> Result<(), DomainError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| DomainError::Capture("capture stream not started".to_string()))?;
        let written = writer
            .write_all(FRAME_MARKER)
            .and_then(|_| writer.write_all(b"\n"))
            .and_then(|_| writer.write_all(frame));
        written.map_err(|e| self.capture_error("cannot write frame to", e))?;
        self.frames_written += 1;
        Ok(())
    }

    fn finalize(&mut self) -> Result<PathBuf, DomainError> {
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| DomainError::Capture("capture stream not started".to_string()))?;
        writer
            .flush()
            .map_err(|e| self.capture_error("cannot flush", e))?;
        Ok(self.path.clone())
    }

    fn release(&mut self) {
        if self.writer.take().is_some() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!("Failed to remove partial capture {}: {}", self.path.display(), e);
            }
        }
    }
}
