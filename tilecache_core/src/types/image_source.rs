//! This module provides [`ImageSource`], the payload wrapper handed out by cache backends.
//!
//! # Overview
//!
//! An [`ImageSource`] owns the encoded bytes of a stored tile image. The cache layer never
//! decodes them; it only wraps what the container returns and exposes it for downstream
//! decoding. [`ImageSource::format`] sniffs the magic bytes so callers can pick a decoder
//! or a MIME type without touching an image library.
//!
//! # Examples
//!
//! ```rust
//! use tilecache_core::{ImageFormat, ImageSource};
//!
//! let source = ImageSource::from(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
//! assert_eq!(source.len(), 8);
//! assert_eq!(source.format(), Some(ImageFormat::PNG));
//! ```

use std::fmt::{self, Debug, Display};

/// Encoded image formats recognised by [`ImageSource::format`].
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImageFormat {
	GIF,
	JPG,
	PNG,
	WEBP,
}

impl ImageFormat {
	/// Returns a lowercase string identifier for this format.
	///
	/// ```
	/// use tilecache_core::ImageFormat;
	/// assert_eq!(ImageFormat::JPG.as_str(), "jpg");
	/// ```
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			ImageFormat::GIF => "gif",
			ImageFormat::JPG => "jpg",
			ImageFormat::PNG => "png",
			ImageFormat::WEBP => "webp",
		}
	}

	/// Returns the MIME type for this format.
	#[must_use]
	pub fn as_mime_str(&self) -> &'static str {
		match self {
			ImageFormat::GIF => "image/gif",
			ImageFormat::JPG => "image/jpeg",
			ImageFormat::PNG => "image/png",
			ImageFormat::WEBP => "image/webp",
		}
	}

	/// Detect the format from the leading magic bytes of `data`.
	#[must_use]
	pub fn sniff(data: &[u8]) -> Option<ImageFormat> {
		match data {
			[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(ImageFormat::PNG),
			[0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::JPG),
			[b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(ImageFormat::GIF),
			[b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(ImageFormat::WEBP),
			_ => None,
		}
	}
}

impl Display for ImageFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Encoded tile image bytes as read from a cache.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageSource(Vec<u8>);

impl ImageSource {
	/// Returns the encoded bytes.
	#[must_use]
	pub fn as_slice(&self) -> &[u8] {
		&self.0
	}

	/// Consumes the source and returns the encoded bytes.
	#[must_use]
	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	/// Returns the number of encoded bytes.
	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Sniff the encoded image format, if it is one of [`ImageFormat`].
	#[must_use]
	pub fn format(&self) -> Option<ImageFormat> {
		ImageFormat::sniff(&self.0)
	}
}

impl From<Vec<u8>> for ImageSource {
	fn from(bytes: Vec<u8>) -> Self {
		ImageSource(bytes)
	}
}

impl From<&[u8]> for ImageSource {
	fn from(bytes: &[u8]) -> Self {
		ImageSource(bytes.to_vec())
	}
}

impl Debug for ImageSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.format() {
			Some(format) => write!(f, "ImageSource({format}, {} bytes)", self.0.len()),
			None => write!(f, "ImageSource({} bytes)", self.0.len()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0], Some(ImageFormat::PNG))]
	#[case(&[0xFF, 0xD8, 0xFF, 0xE0], Some(ImageFormat::JPG))]
	#[case(b"GIF89a..", Some(ImageFormat::GIF))]
	#[case(b"RIFF\x10\0\0\0WEBPVP8 ", Some(ImageFormat::WEBP))]
	#[case(b"RIFF\x10\0\0\0WAVE", None)]
	#[case(&[0x89, b'P', b'N'], None)]
	#[case(&[], None)]
	fn sniff(#[case] data: &[u8], #[case] expected: Option<ImageFormat>) {
		assert_eq!(ImageFormat::sniff(data), expected);
	}

	#[test]
	fn debug_shows_format_and_size() {
		let source = ImageSource::from(&[0xFF, 0xD8, 0xFF, 0xDB, 0x00][..]);
		assert_eq!(format!("{source:?}"), "ImageSource(jpg, 5 bytes)");

		let source = ImageSource::from(vec![1, 2, 3]);
		assert_eq!(format!("{source:?}"), "ImageSource(3 bytes)");
		assert_eq!(source.into_vec(), vec![1, 2, 3]);
	}

	#[test]
	fn mime_types() {
		assert_eq!(ImageFormat::PNG.as_mime_str(), "image/png");
		assert_eq!(ImageFormat::WEBP.to_string(), "webp");
	}
}
