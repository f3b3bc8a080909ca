//! Deterministic workload generators for integration tests.
//!
//! Key streams are generated without external RNG crates so test runs are
//! reproducible byte for byte across platforms.

/// xorshift64 pseudo-random generator.
#[derive(Debug, Clone, Copy)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    pub fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (u64::MAX as f64);
        (self.next_u64() as f64) * SCALE
    }
}

/// Zipfian key sampler over `[0, universe)` using YCSB's inverse-CDF
/// construction.
///
/// `theta` controls skew: 0.0 is uniform, 0.99 is the YCSB default and
/// models the heavy key-popularity skew of real cache traces.
#[derive(Debug, Clone)]
pub struct ZipfianGenerator {
    universe: u64,
    theta: f64,
    zeta_n: f64,
    alpha: f64,
    eta: f64,
    rng: XorShift64,
}

impl ZipfianGenerator {
    pub fn new(universe: u64, theta: f64, seed: u64) -> Self {
        let theta = theta.clamp(0.0, 0.9999);
        let zeta_2 = Self::zeta(2, theta);
        let zeta_n = Self::zeta(universe, theta);
        let alpha = 1.0 / (1.0 - theta);
        let eta = (1.0 - (2.0 / universe as f64).powf(1.0 - theta)) / (1.0 - zeta_2 / zeta_n);
        Self {
            universe,
            theta,
            zeta_n,
            alpha,
            eta,
            rng: XorShift64::new(seed),
        }
    }

    fn zeta(n: u64, theta: f64) -> f64 {
        let mut sum = 0.0;
        for i in 1..=n {
            sum += 1.0 / (i as f64).powf(theta);
        }
        sum
    }

    pub fn next_key(&mut self) -> u64 {
        let u = self.rng.next_f64();
        let uz = u * self.zeta_n;
        if uz < 1.0 {
            return 0;
        }
        if uz < 1.0 + 0.5f64.powf(self.theta) {
            return 1;
        }
        let spread = self.universe as f64 * (self.eta * u - self.eta + 1.0).powf(self.alpha);
        (spread as u64).min(self.universe - 1)
    }
}

/// Generates a uniform-random trace over `[0, universe)`.
#[allow(dead_code)]
pub fn uniform_trace(length: usize, universe: u64, seed: u64) -> Vec<u64> {
    let mut rng = XorShift64::new(seed);
    (0..length).map(|_| rng.next_u64() % universe).collect()
}

/// Generates a Zipfian trace over `[0, universe)`.
#[allow(dead_code)]
pub fn zipfian_trace(length: usize, universe: u64, theta: f64, seed: u64) -> Vec<u64> {
    let mut zipf = ZipfianGenerator::new(universe, theta, seed);
    (0..length).map(|_| zipf.next_key()).collect()
}
