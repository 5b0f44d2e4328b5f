//! Session configuration with versioned JSON persistence.

use crate::alloc::{AllocBudget, DEFAULT_MAX_ALLOC_BYTES};
use crate::error::{FrameStateError, Result};
use crate::frame::{FrameBufferSpec, DEFAULT_BORDER, MAX_MB_PLANE};
use serde::{Deserialize, Serialize};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Reference slots plus in-flight margin.
pub const DEFAULT_FRAME_BUFFERS: usize = 15;
/// Addressable entropy context slots (the defaults snapshot is extra).
pub const DEFAULT_FRAME_CONTEXTS: usize = 8;

/// Per-session settings for the common layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonConfig {
    /// Capacity of the decoded-picture buffer pool
    pub frame_buffers: usize,
    /// Number of addressable entropy context slots
    pub frame_contexts: usize,
    /// Luma only
    pub monochrome: bool,
    /// Horizontal chroma subsampling
    pub subsampling_x: bool,
    /// Vertical chroma subsampling
    pub subsampling_y: bool,
    /// Sample bit depth
    pub bit_depth: u8,
    /// Every tile starts from an identical probability state
    pub large_scale_tile: bool,
    /// Enables the loop-filter bitmask buffers
    pub loop_filter_bitmask: bool,
    /// Largest single allocation in bytes
    pub max_alloc_bytes: u64,
    /// Picture border in luma pixels
    pub border: u32,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            frame_buffers: DEFAULT_FRAME_BUFFERS,
            frame_contexts: DEFAULT_FRAME_CONTEXTS,
            monochrome: false,
            subsampling_x: true,
            subsampling_y: true,
            bit_depth: 8,
            large_scale_tile: false,
            loop_filter_bitmask: false,
            max_alloc_bytes: DEFAULT_MAX_ALLOC_BYTES,
            border: DEFAULT_BORDER,
        }
    }
}

impl CommonConfig {
    /// Check the settings for values the common layer cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.frame_buffers == 0 {
            return Err(FrameStateError::InvalidParameter(
                "frame_buffers must be at least 1".into(),
            ));
        }
        if self.frame_contexts == 0 || self.frame_contexts > u8::MAX as usize {
            return Err(FrameStateError::InvalidParameter(format!(
                "frame_contexts must be in 1..=255, got {}",
                self.frame_contexts
            )));
        }
        if !matches!(self.bit_depth, 8 | 10 | 12) {
            return Err(FrameStateError::InvalidParameter(format!(
                "unsupported bit depth {}",
                self.bit_depth
            )));
        }
        Ok(())
    }

    /// Number of color planes.
    #[inline]
    pub fn num_planes(&self) -> usize {
        if self.monochrome {
            1
        } else {
            MAX_MB_PLANE
        }
    }

    /// Samples need two bytes of storage.
    #[inline]
    pub fn high_bitdepth(&self) -> bool {
        self.bit_depth > 8
    }

    /// Allocation budget derived from `max_alloc_bytes`.
    pub fn budget(&self) -> AllocBudget {
        AllocBudget::new(self.max_alloc_bytes)
    }

    /// Picture buffer request for a frame of the given size.
    pub fn frame_buffer_spec(&self, width: u32, height: u32) -> FrameBufferSpec {
        FrameBufferSpec {
            width,
            height,
            subsampling_x: self.subsampling_x,
            subsampling_y: self.subsampling_y,
            bit_depth: self.bit_depth,
            monochrome: self.monochrome,
            border: self.border,
        }
    }
}

/// Versioned configuration file wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Schema version for migration.
    pub version: u32,
    /// The configuration data.
    pub config: CommonConfig,
}

impl ConfigFile {
    /// Wrap a configuration at the current schema version.
    pub fn new(config: CommonConfig) -> Self {
        Self {
            version: CURRENT_VERSION,
            config,
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            FrameStateError::Serialization(format!("Failed to serialize config: {}", e))
        })
    }

    /// Deserialize from JSON bytes and validate.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| FrameStateError::Serialization(format!("Invalid JSON: {}", e)))?;

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        if version > CURRENT_VERSION {
            return Err(FrameStateError::Serialization(format!(
                "Config version {} is newer than supported version {}",
                version, CURRENT_VERSION
            )));
        }

        let file: Self = serde_json::from_value(raw)
            .map_err(|e| FrameStateError::Serialization(format!("Failed to parse config: {}", e)))?;
        file.config.validate()?;
        Ok(file)
    }

    /// Save the configuration to a file path.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        let data = self.to_json()?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Load a configuration from a file path.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}
