use serde::Serialize;

/// One sampler reading, placed at `t` seconds into the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePoint {
    pub t: f64,
    pub wpm: u32,
    pub raw: u32,
    pub errors: u32,
}

impl SamplePoint {
    pub fn new(t: f64, wpm: u32, raw: u32, errors: u32) -> Self {
        Self {
            t,
            wpm,
            raw,
            errors,
        }
    }

    /// `(t, wpm)` pair for chart datasets.
    pub fn wpm_coord(&self) -> (f64, f64) {
        (self.t, self.wpm as f64)
    }

    pub fn raw_coord(&self) -> (f64, f64) {
        (self.t, self.raw as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_pair_time_with_speed() {
        let p = SamplePoint::new(2.0, 40, 45, 1);
        assert_eq!(p.wpm_coord(), (2.0, 40.0));
        assert_eq!(p.raw_coord(), (2.0, 45.0));
    }
}
