use std::ops::RangeInclusive;

use super::template::NoiseTemplate;

pub const PEAK_FLOOR: f32 = -1000.0;

// `detect` is rewritten every frame; `count`, `peak` and `onset` persist
// until the enclosing group is reset.
pub struct BinBank {
    detect: Vec<bool>,
    count: Vec<u32>,
    peak: Vec<f32>,
    onset: Vec<Option<u64>>,
}

impl BinBank {
    pub fn new(nfft: usize) -> Self {
        Self {
            detect: vec![false; nfft],
            count: vec![0; nfft],
            peak: vec![PEAK_FLOOR; nfft],
            onset: vec![None; nfft],
        }
    }

    pub fn len(&self) -> usize {
        self.count.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count.is_empty()
    }

    pub fn seed_peaks(&mut self, psd: &[f32]) {
        self.peak.copy_from_slice(psd);
    }

    /// Returns the number of bins above threshold this frame.
    pub fn update_detect(
        &mut self,
        psd: &[f32],
        template: &NoiseTemplate,
        threshold: f32,
        transform: u64,
    ) -> usize {
        let mut total = 0;
        for (i, &power) in psd.iter().enumerate() {
            if power - template.floor(i) > threshold {
                self.onset[i].get_or_insert(transform);
                if power > self.peak[i] {
                    self.peak[i] = power;
                }
                self.detect[i] = true;
                total += 1;
            } else {
                self.detect[i] = false;
            }
        }
        total
    }

    pub fn update_count(&mut self) {
        for (count, &detect) in self.count.iter_mut().zip(&self.detect) {
            if detect {
                *count += 1;
            }
        }
    }

    pub fn reset(&mut self, bins: RangeInclusive<usize>) {
        for i in bins {
            self.count[i] = 0;
            self.peak[i] = PEAK_FLOOR;
            self.onset[i] = None;
        }
    }

    pub fn is_detecting(&self, bin: usize) -> bool {
        self.detect[bin]
    }

    pub fn count(&self, bin: usize) -> u32 {
        self.count[bin]
    }

    pub fn counts(&self) -> &[u32] {
        &self.count
    }

    pub fn peak(&self, bin: usize) -> f32 {
        self.peak[bin]
    }

    pub fn onset(&self, bin: usize) -> Option<u64> {
        self.onset[bin]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_template(n: usize, level: f32) -> NoiseTemplate {
        let mut t = NoiseTemplate::new(n);
        t.observe(&vec![level; n]);
        t
    }

    #[test]
    fn test_detect_marks_onset_once() {
        let template = flat_template(4, 0.0);
        let mut bank = BinBank::new(4);

        let total = bank.update_detect(&[0.0, 12.0, 0.0, 0.0], &template, 10.0, 0);
        bank.update_count();
        assert_eq!(total, 1);
        assert_eq!(bank.onset(1), Some(0));
        assert_eq!(bank.count(1), 1);

        bank.update_detect(&[0.0, 20.0, 0.0, 0.0], &template, 10.0, 16);
        bank.update_count();
        assert_eq!(bank.onset(1), Some(0));
        assert_eq!(bank.count(1), 2);
        assert_eq!(bank.peak(1), 20.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let template = flat_template(2, -5.0);
        let mut bank = BinBank::new(2);
        let total = bank.update_detect(&[5.0, 5.5], &template, 10.0, 3);
        assert_eq!(total, 1);
        assert!(!bank.is_detecting(0));
        assert!(bank.is_detecting(1));
    }

    #[test]
    fn test_inactive_frame_keeps_accumulated_state() {
        let template = flat_template(1, 0.0);
        let mut bank = BinBank::new(1);
        bank.update_detect(&[15.0], &template, 10.0, 32);
        bank.update_count();
        bank.update_detect(&[0.0], &template, 10.0, 48);
        bank.update_count();

        assert!(!bank.is_detecting(0));
        assert_eq!(bank.count(0), 1);
        assert_eq!(bank.peak(0), 15.0);
        assert_eq!(bank.onset(0), Some(32));
    }

    #[test]
    fn test_reset_restores_idle_state() {
        let template = flat_template(3, 0.0);
        let mut bank = BinBank::new(3);
        bank.update_detect(&[15.0, 15.0, 15.0], &template, 10.0, 7);
        bank.update_count();
        bank.reset(0..=1);

        for i in 0..=1 {
            assert_eq!(bank.count(i), 0);
            assert_eq!(bank.peak(i), PEAK_FLOOR);
            assert_eq!(bank.onset(i), None);
        }
        assert_eq!(bank.count(2), 1);
        assert_eq!(bank.onset(2), Some(7));
    }

    #[test]
    fn test_seed_peaks() {
        let mut bank = BinBank::new(2);
        bank.seed_peaks(&[-3.0, -4.0]);
        assert_eq!(bank.peak(0), -3.0);
        assert_eq!(bank.peak(1), -4.0);
    }
}
