//! Seeded obstacle placement and spawn pacing.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

const RUN_STREAM_LABEL: &str = "obstacle-spawner";
const MIN_SPAWN_DELAY: Duration = Duration::from_millis(1);

/// Random source deciding where obstacles appear and how long to wait between them.
///
/// Every run draws from its own stream derived from the session seed and the
/// run index, so a run replays exactly under the same seed.
#[derive(Clone, Debug)]
pub struct ObstacleSpawner {
    rng: ChaCha8Rng,
}

impl ObstacleSpawner {
    /// Creates the spawner of the given one-based run.
    #[must_use]
    pub fn for_run(seed: u64, run: u32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(derive_run_seed(seed, run)),
        }
    }

    /// Left edge, in percent, of a new obstacle `width_percent` wide.
    ///
    /// Uniform over `[0, 100 - width_percent)`.
    pub fn spawn_x(&mut self, width_percent: f32) -> f32 {
        let span = 100.0 - width_percent;
        if !(span > 0.0) {
            return 0.0;
        }
        self.rng.gen_range(0.0..span)
    }

    /// Delay before the next spawn, uniform over the `[min, max]` window in milliseconds.
    ///
    /// Never shorter than one millisecond, so consecutive spawns are always
    /// due at distinct instants.
    pub fn next_delay(&mut self, (min, max): (f32, f32)) -> Duration {
        let min = if min.is_finite() { min.max(0.0) } else { 0.0 };
        let millis = if max.is_finite() && max > min {
            self.rng.gen_range(min..=max)
        } else {
            min
        };
        Duration::try_from_secs_f32(millis / 1_000.0)
            .unwrap_or(MIN_SPAWN_DELAY)
            .max(MIN_SPAWN_DELAY)
    }
}

fn derive_run_seed(seed: u64, run: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(RUN_STREAM_LABEL.as_bytes());
    hasher.update(run.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
