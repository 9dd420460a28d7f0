use anyhow::Result;
use log::{debug, error, info};
use rustfft::num_complex::Complex32;
use std::io::Read;

use crate::api::EventSink;
use crate::detector::{DetectorConfig, Engine, SignalEvent};
use crate::filter::DcBlocker;
use crate::source::{IqReader, BLOCK_LEN};
use crate::spectrum::{Spectrogram, MIN_BATCH_TRANSFORMS};
use crate::util::Timestamp;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total_samples: u64,
    pub total_transforms: u64,
    pub events: u64,
    pub heartbeats: u64,
}

/// Keep-alive spacing in transforms, saturating for very long intervals.
pub fn keepalive_transforms(keepalive_secs: u64, config: &DetectorConfig) -> u64 {
    let per_second = (config.sampling_rate / config.samples_per_frame.max(1)) as u64;
    keepalive_secs.saturating_mul(per_second).max(1)
}

pub struct Monitor {
    dc: DcBlocker,
    spectrogram: Spectrogram,
    engine: Engine,
    sinks: Vec<Box<dyn EventSink>>,
    keepalive: u64,
    next_heartbeat: u64,
    psd: Vec<f32>,
    summary: RunSummary,
}

impl Monitor {
    pub fn new(config: DetectorConfig, base: Timestamp, keepalive_secs: u64) -> Self {
        let keepalive = keepalive_transforms(keepalive_secs, &config);
        Self {
            dc: DcBlocker::default(),
            spectrogram: Spectrogram::new(config.nfft, config.samples_per_frame as usize),
            psd: vec![0.0; config.nfft],
            engine: Engine::new(config, base),
            sinks: Vec::new(),
            keepalive,
            next_heartbeat: keepalive,
            summary: RunSummary::default(),
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        info!("Writing detections to {} sink", sink.name());
        self.sinks.push(sink);
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn keepalive(&self) -> u64 {
        self.keepalive
    }

    /// Signals still open when the stream ends are dropped.
    pub fn run<R: Read>(&mut self, reader: &mut IqReader<R>) -> Result<RunSummary> {
        let base = self.engine.base();
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.on_start(&base) {
                error!("{} sink failed to start: {:#}", sink.name(), e);
            }
        }

        let mut block = vec![Complex32::default(); BLOCK_LEN];
        loop {
            let read = reader.read_block(&mut block)?;
            if read != BLOCK_LEN {
                debug!("Short read of {} samples, end of stream", read);
                break;
            }
            self.process_block(&mut block);
        }

        self.summary.total_samples = reader.total_samples();
        self.summary.total_transforms = self.engine.transforms();
        info!("total samples in : {}", self.summary.total_samples);
        info!("total transforms : {}", self.summary.total_transforms);
        Ok(self.summary)
    }

    pub fn process_block(&mut self, block: &mut [Complex32]) {
        self.dc.process(block);
        self.spectrogram.write(block);

        let batch = self.spectrogram.num_transforms();
        if batch < MIN_BATCH_TRANSFORMS {
            return;
        }

        self.spectrogram.psd(&mut self.psd);
        let events = self.engine.push_frame(&self.psd, batch);
        self.spectrogram.reset();

        for event in &events {
            self.dispatch_event(event);
        }

        while self.engine.transforms() >= self.next_heartbeat {
            let config = self.engine.config();
            let timestamp = self.engine.base()
                + Timestamp::from_transforms(self.next_heartbeat, config.samples_per_frame, config.sampling_rate);
            self.dispatch_heartbeat(&timestamp);
            self.next_heartbeat = self.next_heartbeat.saturating_add(self.keepalive);
        }
    }

    fn dispatch_event(&mut self, event: &SignalEvent) {
        self.summary.events += 1;
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.record_event(event) {
                error!("{} sink: {:#}", sink.name(), e);
            }
        }
    }

    fn dispatch_heartbeat(&mut self, timestamp: &Timestamp) {
        self.summary.heartbeats += 1;
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.record_heartbeat(timestamp) {
                error!("{} sink: {:#}", sink.name(), e);
            }
        }
    }
}
