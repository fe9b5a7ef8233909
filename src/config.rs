//! Run configuration, resolved once at startup.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML config file,
//! explicit overrides (usually CLI flags). A matching [`Preset`] then fills
//! the class filter and ROI only where neither was set explicitly.

use std::num::NonZeroU32;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::detection::{ClassFilter, DetectionFilter};
use crate::error::ConfigError;
use crate::geometry::{ProcessingSize, Roi};
use crate::render::AnnotationStyle;

pub const DEFAULT_CONFIDENCE: f32 = 0.6;

/// Immutable configuration consumed by the pipeline.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Threshold handed to the detector
    pub confidence: f32,
    /// Run the detector on every n-th frame
    pub skip_interval: NonZeroU32,
    pub processing: ProcessingSize,
    pub classes: Option<ClassFilter>,
    pub roi: Option<Roi>,
    pub style: AnnotationStyle,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            skip_interval: NonZeroU32::MIN,
            processing: ProcessingSize::original(),
            classes: None,
            roi: None,
            style: AnnotationStyle::default(),
        }
    }
}

impl RunConfig {
    pub fn with_confidence(mut self, confidence: f32) -> Result<Self, ConfigError> {
        self.confidence = validate_confidence(confidence)?;
        Ok(self)
    }

    pub fn with_skip_interval(mut self, skip_interval: u32) -> Result<Self, ConfigError> {
        self.skip_interval = NonZeroU32::new(skip_interval).ok_or(ConfigError::ZeroSkipInterval)?;
        Ok(self)
    }

    pub fn with_processing(mut self, processing: ProcessingSize) -> Self {
        self.processing = processing;
        self
    }

    pub fn with_classes(mut self, classes: impl IntoIterator<Item = u32>) -> Self {
        self.classes = Some(ClassFilter::new(classes));
        self
    }

    pub fn with_roi(mut self, roi: Roi) -> Self {
        self.roi = Some(roi);
        self
    }

    pub fn with_style(mut self, style: AnnotationStyle) -> Self {
        self.style = style;
        self
    }

    pub fn detection_filter(&self) -> DetectionFilter {
        DetectionFilter::new(self.classes.clone(), self.roi.clone())
    }

    /// Resolve the configuration for `source_name`.
    pub fn resolve(
        file: ConfigFile,
        overrides: Overrides,
        source_name: &str,
    ) -> Result<Self, ConfigError> {
        let mut config = RunConfig::default()
            .with_confidence(
                overrides
                    .confidence
                    .or(file.confidence)
                    .unwrap_or(DEFAULT_CONFIDENCE),
            )?
            .with_skip_interval(overrides.skip_frames.or(file.skip_frames).unwrap_or(1))?
            .with_processing(ProcessingSize::new(
                overrides.resize_width.or(file.resize_width),
                overrides.resize_height.or(file.resize_height),
            )?);

        if let Some(style) = file.style {
            config = config.with_style(style);
        }
        config.classes = overrides.classes.or(file.classes).map(ClassFilter::new);
        config.roi = overrides.roi.or(file.roi);

        let presets = PresetTable::new(file.presets);
        if let Some(preset) = presets.lookup(source_name) {
            config.apply_preset(preset);
        }

        Ok(config)
    }

    fn apply_preset(&mut self, preset: &Preset) {
        if self.classes.is_none() {
            if let Some(classes) = &preset.classes {
                info!(preset = %preset.name, ?classes, "preset selects class filter");
                self.classes = Some(ClassFilter::new(classes.iter().copied()));
            }
        }
        if self.roi.is_none() {
            if let Some(roi) = &preset.roi {
                info!(preset = %preset.name, ?roi, "preset selects ROI");
                self.roi = Some(roi.clone());
            }
        }
    }
}

fn validate_confidence(confidence: f32) -> Result<f32, ConfigError> {
    if (0.0..=1.0).contains(&confidence) {
        Ok(confidence)
    } else {
        Err(ConfigError::Confidence(confidence))
    }
}

/// Settings given explicitly, typically on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub confidence: Option<f32>,
    pub skip_frames: Option<u32>,
    pub resize_width: Option<u32>,
    pub resize_height: Option<u32>,
    pub classes: Option<Vec<u32>>,
    pub roi: Option<Roi>,
}

/// TOML config file.
///
/// ```toml
/// confidence = 0.5
/// skip_frames = 2
/// resize_width = 640
/// resize_height = 360
///
/// [[presets]]
/// name = "highway"
/// match = "highway_cam"
/// classes = [2, 3, 5, 7]
/// roi = { x_min = 50, y_min = 0, x_max = 1250, y_max = 700, label = "ROI - lane" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub confidence: Option<f32>,
    pub skip_frames: Option<u32>,
    pub resize_width: Option<u32>,
    pub resize_height: Option<u32>,
    pub classes: Option<Vec<u32>>,
    pub roi: Option<Roi>,
    pub style: Option<AnnotationStyle>,
    #[serde(default)]
    pub presets: Vec<Preset>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse TOML text; `path` is only used in error reports.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Named defaults selected by a substring of the source name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preset {
    pub name: String,
    /// Substring the source name must contain
    #[serde(rename = "match")]
    pub pattern: String,
    pub classes: Option<Vec<u32>>,
    pub roi: Option<Roi>,
}

/// Ordered preset list; the first preset whose pattern matches wins.
#[derive(Debug, Clone, Default)]
pub struct PresetTable {
    presets: Vec<Preset>,
}

impl PresetTable {
    pub fn new(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    pub fn lookup(&self, source_name: &str) -> Option<&Preset> {
        self.presets
            .iter()
            .find(|p| !p.pattern.is_empty() && source_name.contains(&p.pattern))
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
