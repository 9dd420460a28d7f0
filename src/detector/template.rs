/// Per-bin noise floor learned during warm-up and frozen afterwards.
pub struct NoiseTemplate {
    floor: Vec<f32>,
}

impl NoiseTemplate {
    pub fn new(nfft: usize) -> Self {
        Self { floor: vec![f32::INFINITY; nfft] }
    }

    pub fn observe(&mut self, psd: &[f32]) {
        for (floor, &power) in self.floor.iter_mut().zip(psd) {
            if power < *floor {
                *floor = power;
            }
        }
    }

    pub fn floor(&self, bin: usize) -> f32 {
        self.floor[bin]
    }

    pub fn floors(&self) -> &[f32] {
        &self.floor
    }

    pub fn len(&self) -> usize {
        self.floor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floor.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_defines_floor() {
        let mut t = NoiseTemplate::new(3);
        t.observe(&[-50.0, 2.0, 0.0]);
        assert_eq!(t.floors(), &[-50.0, 2.0, 0.0]);
    }

    #[test]
    fn test_floor_tracks_minimum() {
        let mut t = NoiseTemplate::new(3);
        t.observe(&[-50.0, -40.0, -30.0]);
        t.observe(&[-60.0, -20.0, -30.5]);
        t.observe(&[-55.0, -45.0, -10.0]);
        assert_eq!(t.floors(), &[-60.0, -45.0, -30.5]);
    }
}
