//! Sound sample description. Part of the `stsd` atom.
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/sound_sample_description>

use binrw::BinRead;

#[derive(Debug, BinRead)]
#[br(import {size: u32})]
pub struct Audio {
    /// A 16-bit integer that holds the sample description version.
    _version: u16,
    /// A 16-bit integer.
    _revision_level: u16,
    /// A 32-bit integer that specifies the developer of the compressor that generated the compressed data.
    vendor: u32,
    /// Number of audio channels, e.g. `1` mono, `2` stereo.
    number_of_channels: u16,
    /// Number of bits per sample.
    sample_size: u16,
    /// Compression ID. `0` indicates no compression/fixed-size samples.
    compression_id: i16,
    /// Packet size, reserved, must be set to 0.
    packet_size: u16,
    /// Sample rate as a 32-bit fixed-point number,
    /// i.e. the interpreted result is `sample_rate_u32 / 2^16`.
    sample_rate: u32,

    /// Extension bytes (currently unsupported).
    #[br(count = size.saturating_sub(16 + 20))]
    extensions: Vec<u8>,
}

impl Audio {
    pub fn vendor(&self) -> u32 {
        self.vendor
    }

    pub fn number_of_channels(&self) -> u16 {
        self.number_of_channels
    }

    pub fn sample_size(&self) -> u16 {
        self.sample_size
    }

    pub fn compression_id(&self) -> i16 {
        self.compression_id
    }

    pub fn sample_rate(&self) -> Option<f64> {
        Some(self.sample_rate as f64 / 2_u32.pow(16) as f64)
    }

    pub fn extensions(&self) -> &[u8] {
        &self.extensions
    }
}
