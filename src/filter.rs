use biquad::{Biquad, Coefficients, DirectForm1};
use rustfft::num_complex::Complex32;

pub const DC_BLOCK_ALPHA: f32 = 1e-3;

/// First-order DC blocker `g (1 - z^-1) / (1 - (1 - alpha) z^-1)` applied to
/// the in-phase and quadrature rails separately.
pub struct DcBlocker {
    re: DirectForm1<f32>,
    im: DirectForm1<f32>,
}

pub fn dc_block_coefficients(alpha: f32) -> Coefficients<f32> {
    let pole = 1.0 - alpha;
    // unity gain at fs/2
    let gain = (1.0 + pole) / 2.0;
    Coefficients {
        a1: -pole,
        a2: 0.0,
        b0: gain,
        b1: -gain,
        b2: 0.0,
    }
}

impl DcBlocker {
    pub fn new(alpha: f32) -> Self {
        Self {
            re: DirectForm1::<f32>::new(dc_block_coefficients(alpha)),
            im: DirectForm1::<f32>::new(dc_block_coefficients(alpha)),
        }
    }

    pub fn process(&mut self, block: &mut [Complex32]) {
        for x in block.iter_mut() {
            *x = Complex32::new(self.re.run(x.re), self.im.run(x.im));
        }
    }
}

impl Default for DcBlocker {
    fn default() -> Self {
        Self::new(DC_BLOCK_ALPHA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_constant_offset() {
        let mut dc = DcBlocker::new(1e-2);
        let mut block = vec![Complex32::new(0.5, -0.25); 4000];
        dc.process(&mut block);
        let tail = block.last().copied().unwrap();
        assert!(tail.re.abs() < 1e-3);
        assert!(tail.im.abs() < 1e-3);
    }

    #[test]
    fn test_passes_alternating_signal() {
        let mut dc = DcBlocker::default();
        let mut block: Vec<Complex32> = (0..20_000)
            .map(|i| Complex32::new(if i % 2 == 0 { 1.0 } else { -1.0 }, 0.0))
            .collect();
        dc.process(&mut block);
        let tail = block.last().copied().unwrap();
        assert!((tail.re.abs() - 1.0).abs() < 1e-2);
    }
}
