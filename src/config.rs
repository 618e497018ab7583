use crate::globe::{EngineOptions, DEFAULT_ROTATION_STEP, DEFAULT_STAR_COUNT};
use crate::node::NodeFilter;
use crate::settings::GlobeSettings;
use std::path::PathBuf;

pub const DEFAULT_TIME_STEP: f32 = 0.016;
pub const DEFAULT_DENSITY: f32 = 1.0;

/// Values given on the command line; each one beats the settings file
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub nodes: Option<PathBuf>,
    pub time_step: Option<f32>,
    pub density: Option<f32>,
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub filter: NodeFilter,
}

/// Resolved configuration for a globe session
#[derive(Clone, Debug, PartialEq)]
pub struct GlobeConfig {
    pub nodes: Option<PathBuf>,
    pub time_step: f32,
    pub rotation_step: f32,
    pub star_count: usize,
    pub density: f32,
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub filter: NodeFilter,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            nodes: None,
            time_step: DEFAULT_TIME_STEP,
            rotation_step: DEFAULT_ROTATION_STEP,
            star_count: DEFAULT_STAR_COUNT,
            density: DEFAULT_DENSITY,
            seed: None,
            log_file: None,
            filter: NodeFilter::default(),
        }
    }
}

impl GlobeConfig {
    pub fn resolve(settings: &GlobeSettings, overrides: Overrides) -> Self {
        let defaults = Self::default();
        let mut filter = overrides.filter;
        filter.min_urgency = filter.min_urgency.map(|u| u.min(100));

        Self {
            nodes: overrides.nodes.or_else(|| settings.nodes.clone()),
            time_step: overrides
                .time_step
                .or(settings.time_step)
                .unwrap_or(defaults.time_step)
                .clamp(0.001, 1.0),
            rotation_step: settings.rotation_step.unwrap_or(defaults.rotation_step),
            star_count: settings.star_count.unwrap_or(defaults.star_count),
            density: overrides
                .density
                .or(settings.density)
                .unwrap_or(defaults.density)
                .clamp(0.25, 4.0),
            seed: overrides.seed,
            log_file: overrides.log_file.or_else(|| settings.log_file.clone()),
            filter,
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            rotation_step: self.rotation_step,
            star_count: self.star_count,
        }
    }
}
