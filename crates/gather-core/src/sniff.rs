//! # Header Sniffing
//!
//! Recognizes media containers from their leading bytes.
//!
//! Loaders fetch an asset and call [`verify`] with its first bytes. This is
//! the "decode" step: an asset whose bytes do not match the kind inferred from
//! its locator is treated as a load failure, the same way a browser image
//! element fires `error` for a corrupt file.

use crate::{AssetKind, GatherError};

/// Container formats recognized from header bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Bmp,
    Ico,
    Avif,
    Svg,
    Mp3,
    Wav,
    Ogg,
    /// ISO base media (MP4/MOV/M4A): bytes 4..8 == "ftyp"
    Mp4,
    /// MKV/WebM: EBML magic
    Matroska,
}

impl ContainerFormat {
    /// Media kind this container carries.
    #[must_use]
    pub fn kind(&self) -> AssetKind {
        match self {
            ContainerFormat::Png
            | ContainerFormat::Jpeg
            | ContainerFormat::Gif
            | ContainerFormat::WebP
            | ContainerFormat::Bmp
            | ContainerFormat::Ico
            | ContainerFormat::Avif
            | ContainerFormat::Svg => AssetKind::Image,
            ContainerFormat::Mp3 | ContainerFormat::Wav | ContainerFormat::Ogg => AssetKind::Audio,
            ContainerFormat::Mp4 | ContainerFormat::Matroska => AssetKind::Video,
        }
    }

    /// Whether this container is acceptable for an asset of `kind`.
    ///
    /// Ogg and Matroska carry both audio and video, so either kind accepts
    /// them.
    #[must_use]
    pub fn serves(&self, kind: AssetKind) -> bool {
        match self {
            ContainerFormat::Ogg | ContainerFormat::Matroska => {
                matches!(kind, AssetKind::Audio | AssetKind::Video)
            }
            _ => self.kind() == kind,
        }
    }
}

/// Detect container format from header bytes.
#[must_use]
pub fn detect(header: &[u8]) -> Option<ContainerFormat> {
    if header.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some(ContainerFormat::Png);
    }
    if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ContainerFormat::Jpeg);
    }
    if header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a") {
        return Some(ContainerFormat::Gif);
    }
    if header.len() >= 12 && &header[0..4] == b"RIFF" {
        return match &header[8..12] {
            b"WEBP" => Some(ContainerFormat::WebP),
            b"WAVE" => Some(ContainerFormat::Wav),
            _ => None,
        };
    }
    if header.starts_with(b"BM") {
        return Some(ContainerFormat::Bmp);
    }
    if header.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        return Some(ContainerFormat::Ico);
    }
    // ISO base media: brand decides between AVIF images and MP4 video.
    if header.len() >= 12 && &header[4..8] == b"ftyp" {
        return match &header[8..12] {
            b"avif" | b"avis" => Some(ContainerFormat::Avif),
            _ => Some(ContainerFormat::Mp4),
        };
    }
    if header.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some(ContainerFormat::Matroska);
    }
    if header.starts_with(b"OggS") {
        return Some(ContainerFormat::Ogg);
    }
    if header.starts_with(b"ID3") || is_mpeg_audio_frame(header) {
        return Some(ContainerFormat::Mp3);
    }
    if is_svg(header) {
        return Some(ContainerFormat::Svg);
    }
    None
}

/// Check that `header` decodes as media of `expected` kind.
pub fn verify(expected: AssetKind, header: &[u8]) -> Result<ContainerFormat, GatherError> {
    match detect(header) {
        Some(format) if format.serves(expected) => Ok(format),
        _ => Err(GatherError::Undecodable { expected }),
    }
}

/// MPEG audio frame sync: 11 set bits.
fn is_mpeg_audio_frame(header: &[u8]) -> bool {
    header.len() >= 2 && header[0] == 0xFF && (header[1] & 0xE0) == 0xE0
}

/// SVG documents are text; accept an XML prolog or a root `<svg` element
/// after an optional BOM and leading whitespace.
fn is_svg(header: &[u8]) -> bool {
    let body = header.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(header);
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    let body = &body[start..];
    body.starts_with(b"<svg") || body.starts_with(b"<?xml")
}
