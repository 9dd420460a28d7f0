use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::Arc;

/// PSD frames are drained from the spectrogram once this many transforms
/// have been averaged.
pub const MIN_BATCH_TRANSFORMS: u32 = 16;

const POWER_FLOOR: f32 = 1e-30;

pub fn hamming(len: usize) -> Vec<f32> {
    if len < 2 {
        return vec![1.0; len];
    }
    (0..len)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f32 / (len - 1) as f32).cos())
        .collect()
}

/// Averaging periodogram: a Hamming-windowed transform every `delay` input
/// samples, power accumulated until `reset`.
pub struct Spectrogram {
    nfft: usize,
    delay: usize,
    window: Vec<f32>,
    window_energy: f32,
    history: VecDeque<Complex32>,
    timer: usize,
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex32>,
    scratch: Vec<Complex32>,
    power: Vec<f32>,
    num_transforms: u32,
}

impl Spectrogram {
    pub fn new(nfft: usize, delay: usize) -> Self {
        let window = hamming((nfft / 2).max(1));
        let window_energy = window.iter().map(|w| w * w).sum::<f32>();
        let fft = FftPlanner::<f32>::new().plan_fft_forward(nfft);
        let scratch = vec![Complex32::default(); fft.get_inplace_scratch_len()];
        let delay = delay.max(1);

        Self {
            nfft,
            delay,
            history: VecDeque::from(vec![Complex32::default(); window.len()]),
            window,
            window_energy,
            timer: delay,
            fft,
            buffer: vec![Complex32::default(); nfft],
            scratch,
            power: vec![0.0; nfft],
            num_transforms: 0,
        }
    }

    pub fn write(&mut self, block: &[Complex32]) {
        for &x in block {
            self.history.pop_front();
            self.history.push_back(x);
            self.timer -= 1;
            if self.timer == 0 {
                self.transform();
                self.timer = self.delay;
            }
        }
    }

    fn transform(&mut self) {
        self.buffer.fill(Complex32::default());
        for ((out, &x), &w) in self.buffer.iter_mut().zip(&self.history).zip(&self.window) {
            *out = x * w;
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);
        for (p, x) in self.power.iter_mut().zip(&self.buffer) {
            *p += x.norm_sqr();
        }
        self.num_transforms += 1;
    }

    pub fn num_transforms(&self) -> u32 {
        self.num_transforms
    }

    /// Average power per bin in dB, shifted so that index `nfft / 2` is DC.
    pub fn psd(&self, out: &mut [f32]) {
        let scale = 1.0 / (self.num_transforms.max(1) as f32 * self.window_energy.max(POWER_FLOOR));
        let half = self.nfft / 2;
        for (i, out) in out.iter_mut().enumerate().take(self.nfft) {
            let p = self.power[(i + half) % self.nfft] * scale;
            *out = 10.0 * p.max(POWER_FLOOR).log10();
        }
    }

    pub fn reset(&mut self) {
        self.power.fill(0.0);
        self.num_transforms = 0;
        self.history.iter_mut().for_each(|x| *x = Complex32::default());
        self.timer = self.delay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argmax(v: &[f32]) -> usize {
        v.iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, &x)| if x > best.1 { (i, x) } else { best })
            .0
    }

    #[test]
    fn test_hamming_window() {
        let w = hamming(5);
        assert!((w[0] - 0.08).abs() < 1e-6);
        assert!((w[2] - 1.0).abs() < 1e-6);
        assert!((w[4] - 0.08).abs() < 1e-6);
    }

    #[test]
    fn test_transform_cadence() {
        let mut spgram = Spectrogram::new(64, 50);
        spgram.write(&vec![Complex32::new(0.1, 0.0); 50 * 16 + 49]);
        assert_eq!(spgram.num_transforms(), 16);
        spgram.reset();
        assert_eq!(spgram.num_transforms(), 0);
    }

    #[test]
    fn test_tone_lands_in_shifted_bin() {
        let nfft = 64;
        let mut spgram = Spectrogram::new(nfft, 8);
        // quarter of the sampling rate
        let tone: Vec<Complex32> = (0..1024)
            .map(|n| Complex32::from_polar(1.0, 2.0 * PI * n as f32 / 4.0))
            .collect();
        spgram.write(&tone);

        let mut psd = vec![0.0; nfft];
        spgram.psd(&mut psd);
        assert_eq!(argmax(&psd), 3 * nfft / 4);
    }

    #[test]
    fn test_dc_lands_in_center_bin() {
        let nfft = 32;
        let mut spgram = Spectrogram::new(nfft, 4);
        spgram.write(&vec![Complex32::new(0.5, 0.5); 256]);

        let mut psd = vec![0.0; nfft];
        spgram.psd(&mut psd);
        assert_eq!(argmax(&psd), nfft / 2);
    }
}
