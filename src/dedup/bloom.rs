use super::{AdmitOutcome, DedupIndex};
use bitvec::prelude::{BitVec, Lsb0};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Approximate dedup backend: bounded memory, configurable false-positive
/// rate, capacity-limited. Classic Bloom filter with Kirsch-Mitzenmacher
/// double hashing (two xxh3 hashes combine into the `k` probe positions).
pub struct BloomDedup {
    bits: Mutex<BitVec<usize, Lsb0>>,
    num_hashes: u32,
    capacity: usize,
    inserted: AtomicUsize,
}

impl BloomDedup {
    /// Builds a filter sized for `capacity` expected insertions at false
    /// positive rate `error_rate` (0 < error_rate < 1).
    pub fn new(capacity: usize, error_rate: f64) -> Self {
        let capacity = capacity.max(1);
        let error_rate = error_rate.clamp(f64::MIN_POSITIVE, 0.5);

        let n = capacity as f64;
        let ln2_sq = std::f64::consts::LN_2 * std::f64::consts::LN_2;
        let num_bits = (-(n * error_rate.ln()) / ln2_sq).ceil().max(8.0) as usize;
        let num_hashes = ((num_bits as f64 / n) * std::f64::consts::LN_2)
            .round()
            .max(1.0) as u32;

        Self {
            bits: Mutex::new(BitVec::repeat(false, num_bits)),
            num_hashes,
            capacity,
            inserted: AtomicUsize::new(0),
        }
    }

    fn positions(&self, url: &str, num_bits: usize) -> impl Iterator<Item = usize> + '_ {
        let h1 = xxh3_64_with_seed(url.as_bytes(), 0);
        let h2 = xxh3_64_with_seed(url.as_bytes(), 1);
        (0..self.num_hashes).map(move |i| {
            let combined = h1.wrapping_add((i as u64).wrapping_mul(h2));
            (combined % num_bits as u64) as usize
        })
    }
}

impl DedupIndex for BloomDedup {
    fn contains(&self, url: &str) -> bool {
        let bits = self.bits.lock().expect("bloom mutex poisoned");
        self.positions(url, bits.len()).all(|pos| bits[pos])
    }

    fn add(&self, url: &str) -> AdmitOutcome {
        let mut bits = self.bits.lock().expect("bloom mutex poisoned");
        let num_bits = bits.len();

        if self.positions(url, num_bits).all(|pos| bits[pos]) {
            return AdmitOutcome::AlreadySeen;
        }

        if self.inserted.load(Ordering::Relaxed) >= self.capacity {
            return AdmitOutcome::AtCapacity;
        }

        for pos in self.positions(url, num_bits) {
            bits.set(pos, true);
        }
        self.inserted.fetch_add(1, Ordering::Relaxed);
        AdmitOutcome::Admitted
    }
}
