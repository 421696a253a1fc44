//! Max-hold and exponential averaging applied to incoming frames before
//! they are drawn. History always keeps the raw bins.

#[derive(Default)]
pub struct TraceProcessor {
    max_hold: bool,
    max: Option<Vec<f32>>,
    averaging: u32,
    alpha: f32,
    average: Option<Vec<f32>>,
}

impl TraceProcessor {
    pub fn new(averaging: u32, max_hold: bool) -> Self {
        let mut t = Self::default();
        t.set_averaging(averaging);
        t.max_hold = max_hold;
        t
    }

    pub fn max_hold(&self) -> bool {
        self.max_hold
    }

    /// Enabling or disabling max-hold always discards the held maximum.
    pub fn set_max_hold(&mut self, on: bool) {
        self.max_hold = on;
        self.max = None;
    }

    pub fn max_trace(&self) -> Option<&[f32]> {
        self.max.as_deref()
    }

    pub fn averaging(&self) -> u32 {
        self.averaging
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Window `n` gives a smoothing factor of 2 / (n + 1); 0 disables.
    pub fn set_averaging(&mut self, n: u32) {
        self.averaging = n;
        self.alpha = 2.0 / (n as f32 + 1.0);
    }

    /// Fold a frame into the max-hold and average buffers.
    pub fn update(&mut self, bins: &[f32]) {
        if self.max_hold {
            match &mut self.max {
                Some(max) if max.len() == bins.len() => {
                    for (m, &b) in max.iter_mut().zip(bins) {
                        if b > *m {
                            *m = b;
                        }
                    }
                }
                _ => self.max = Some(bins.to_vec()),
            }
        }

        if self.averaging == 0 {
            return;
        }
        let alpha = self.alpha;
        match &mut self.average {
            Some(avg) if avg.len() == bins.len() => {
                for (a, &b) in avg.iter_mut().zip(bins) {
                    *a += alpha * (b - *a);
                }
            }
            _ => self.average = Some(bins.to_vec()),
        }
    }

    /// Series to draw for `raw`: the running average when averaging is on
    /// and sized to match, otherwise `raw` itself.
    pub fn display<'a>(&'a self, raw: &'a [f32]) -> &'a [f32] {
        match &self.average {
            Some(avg) if self.averaging > 0 && avg.len() == raw.len() => avg,
            _ => raw,
        }
    }

    #[cfg(test)]
    fn process<'a>(&'a mut self, bins: &'a [f32]) -> &'a [f32] {
        self.update(bins);
        self.display(bins)
    }
}
