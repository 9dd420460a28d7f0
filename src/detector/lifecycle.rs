use log::debug;

use super::bins::{BinBank, PEAK_FLOOR};
use super::engine::DetectorConfig;
use super::event::SignalEvent;
use super::groups::{Group, GroupMap};
use super::template::NoiseTemplate;
use crate::util::{bins_to_hz, normalized_to_hz, transforms_to_seconds, Timestamp};

pub const PEAK_OFFSET: f32 = 100.0;

#[derive(Debug, Clone, Copy)]
pub struct Cycle {
    pub base: Timestamp,
    pub transforms: u64,
    pub batch_transforms: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupMetrics {
    pub frame_span: u32,
    /// Count-weighted centre frequency, normalised to [-0.5, 0.5).
    pub center: f64,
    pub width: usize,
    pub max_signal: f32,
    pub noise: f32,
    pub onset: Option<u64>,
}

pub fn is_complete(group: &Group, bins: &BinBank) -> bool {
    !group.bins().any(|i| bins.is_detecting(i))
}

pub fn measure(group: &Group, bins: &BinBank, template: &NoiseTemplate) -> GroupMetrics {
    let nfft = bins.len() as f64;

    let mut frame_span = 0;
    let mut weighted = 0.0;
    let mut total = 0u64;
    let mut peak = PEAK_FLOOR;
    let mut noise = 0.0;
    let mut onset: Option<u64> = None;

    for i in group.bins() {
        let count = bins.count(i);
        frame_span = frame_span.max(count);
        weighted += (i as f64 / nfft - 0.5) * count as f64;
        total += count as u64;

        if bins.peak(i) > peak {
            peak = bins.peak(i);
            noise = template.floor(i);
        }
        if let Some(start) = bins.onset(i) {
            onset = Some(onset.map_or(start, |o| o.min(start)));
        }
    }

    GroupMetrics {
        frame_span,
        center: if total > 0 { weighted / total as f64 } else { 0.0 },
        width: group.width(),
        max_signal: peak + PEAK_OFFSET,
        noise,
        onset,
    }
}

/// Completed groups are always reset, whether or not their duration is
/// reported.
pub fn process_groups(
    map: &GroupMap,
    bins: &mut BinBank,
    template: &NoiseTemplate,
    config: &DetectorConfig,
    cycle: &Cycle,
) -> Vec<SignalEvent> {
    let mut events = Vec::new();

    for group in map.groups() {
        if !is_complete(group, bins) {
            continue;
        }

        let metrics = measure(group, bins, template);
        let duration = transforms_to_seconds(
            cycle.batch_transforms,
            metrics.frame_span,
            config.samples_per_frame,
            config.sampling_rate,
        );

        if config.accepts_duration(duration) {
            let start = metrics.onset.unwrap_or(cycle.transforms);
            let offset = Timestamp::from_transforms(start, config.samples_per_frame, config.sampling_rate);
            events.push(SignalEvent {
                timestamp: cycle.base + offset,
                samples: cycle.transforms,
                batch_transforms: cycle.batch_transforms,
                duration,
                frequency: normalized_to_hz(metrics.center, config.sampling_rate),
                bandwidth: bins_to_hz(metrics.width, bins.len(), config.sampling_rate),
                max_signal: metrics.max_signal,
                noise: metrics.noise,
            });
        } else {
            debug!(
                "Discarding group {} (bins {}..={}): duration {:.6}s outside [{}, {}]",
                group.id, group.lo, group.hi, duration, config.lower_limit, config.upper_limit
            );
        }

        bins.reset(group.bins());
    }

    events
}
