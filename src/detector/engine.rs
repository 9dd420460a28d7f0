use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::bins::BinBank;
use super::event::SignalEvent;
use super::groups::GroupMap;
use super::lifecycle::{process_groups, Cycle};
use super::template::NoiseTemplate;
use crate::util::Timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub nfft: usize,
    pub samples_per_frame: u32,
    pub sampling_rate: u32,
    pub threshold: f32,
    pub lower_limit: f64,
    pub upper_limit: f64,
}

impl DetectorConfig {
    /// One second of input.
    pub fn warmup_transforms(&self) -> u64 {
        (self.sampling_rate / self.samples_per_frame.max(1)) as u64
    }

    pub fn accepts_duration(&self, duration: f64) -> bool {
        duration >= self.lower_limit && duration <= self.upper_limit
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            nfft: 400,
            samples_per_frame: 50,
            sampling_rate: 250_000,
            threshold: 10.0,
            lower_limit: 0.0,
            upper_limit: 1.0,
        }
    }
}

pub struct Engine {
    config: DetectorConfig,
    template: NoiseTemplate,
    bins: BinBank,
    groups: GroupMap,
    base: Timestamp,
    transforms: u64,
}

impl Engine {
    pub fn new(config: DetectorConfig, base: Timestamp) -> Self {
        let nfft = config.nfft;
        Self {
            config,
            template: NoiseTemplate::new(nfft),
            bins: BinBank::new(nfft),
            groups: GroupMap::assemble(&vec![0; nfft]),
            base,
            transforms: 0,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn base(&self) -> Timestamp {
        self.base
    }

    pub fn transforms(&self) -> u64 {
        self.transforms
    }

    pub fn is_warming_up(&self) -> bool {
        self.transforms <= self.config.warmup_transforms()
    }

    pub fn template(&self) -> &NoiseTemplate {
        &self.template
    }

    pub fn bins(&self) -> &BinBank {
        &self.bins
    }

    pub fn groups(&self) -> &GroupMap {
        &self.groups
    }

    pub fn push_frame(&mut self, psd: &[f32], batch_transforms: u32) -> Vec<SignalEvent> {
        assert_eq!(psd.len(), self.config.nfft, "PSD frame size does not match nfft");

        let events = if self.is_warming_up() {
            self.template.observe(psd);
            self.bins.seed_peaks(psd);
            if self.transforms + batch_transforms as u64 > self.config.warmup_transforms() {
                debug!("Noise template settled after {} transforms", self.transforms + batch_transforms as u64);
            }
            Vec::new()
        } else {
            self.step(psd, batch_transforms)
        };

        self.transforms += batch_transforms as u64;
        events
    }

    fn step(&mut self, psd: &[f32], batch_transforms: u32) -> Vec<SignalEvent> {
        let active = self.bins.update_detect(psd, &self.template, self.config.threshold, self.transforms);
        self.bins.update_count();
        self.groups = GroupMap::assemble(self.bins.counts());
        trace!("{} active bins in {} groups", active, self.groups.len());

        let cycle = Cycle { base: self.base, transforms: self.transforms, batch_transforms };
        process_groups(&self.groups, &mut self.bins, &self.template, &self.config, &cycle)
    }
}
