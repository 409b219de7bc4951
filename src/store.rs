use crate::config::Config;
use crate::sampler::CharacterCounts;
use crate::time_series::SamplePoint;
use crate::util::std_dev;

/// Settings the scoring side reads from its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub show_errors: bool,
    pub max_line_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Settings {
    fn from(cfg: &Config) -> Self {
        Self {
            show_errors: cfg.show_errors,
            max_line_length: cfg.max_line_length,
        }
    }
}

/// Sink for everything the session computes. The session pushes results
/// here after every sample and never reads them back.
pub trait Store {
    fn append_sample(&mut self, at_secs: f64, wpm: u32, raw: u32, errors: u32);
    fn set_accuracy(&mut self, value: f64);
    fn set_character_counts(&mut self, counts: CharacterCounts);
    fn set_complete(&mut self, elapsed_secs: f64);
    fn settings(&self) -> &Settings;
    /// Drop all recorded results, keeping settings.
    fn clear(&mut self);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    settings: Settings,
    samples: Vec<SamplePoint>,
    accuracy: f64,
    counts: CharacterCounts,
    completed_after: Option<f64>,
}

impl MemoryStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn samples(&self) -> &[SamplePoint] {
        &self.samples
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn counts(&self) -> CharacterCounts {
        self.counts
    }

    pub fn completed_after(&self) -> Option<f64> {
        self.completed_after
    }

    /// Standard deviation of the sampled WPM values.
    pub fn consistency(&self) -> f64 {
        let wpms: Vec<f64> = self.samples.iter().map(|p| p.wpm as f64).collect();
        std_dev(&wpms).unwrap_or(0.0)
    }
}

impl Store for MemoryStore {
    fn append_sample(&mut self, at_secs: f64, wpm: u32, raw: u32, errors: u32) {
        self.samples.push(SamplePoint::new(at_secs, wpm, raw, errors));
    }

    fn set_accuracy(&mut self, value: f64) {
        self.accuracy = value;
    }

    fn set_character_counts(&mut self, counts: CharacterCounts) {
        self.counts = counts;
    }

    fn set_complete(&mut self, elapsed_secs: f64) {
        self.completed_after = Some(elapsed_secs);
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn clear(&mut self) {
        *self = Self::new(self.settings);
    }
}
