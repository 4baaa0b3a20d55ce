//! Optimistic retry engine
//!
//! Every cell operation has the same shape:
//!
//! ```text
//! 1. load()      - Read the current committed snapshot
//! 2. compute()   - Evaluate the transition against that snapshot
//! 3. IF compute aborted: return the abort, nothing was written
//! 4. commit()    - CAS the candidate against the snapshot read in step 1
//! 5. IF CAS lost: back off and go to 1 (retry-to-success only)
//! ```
//!
//! Two policies are built from it:
//! - [`retry_to_success`]: loops until a CAS wins or the transition aborts.
//!   Unbounded under sustained contention.
//! - [`attempt_once`]: a single read-compute-CAS, reporting a lost race.
//!
//! A lost race always restarts from a fresh read. The candidate computed
//! from the old snapshot is discarded, never retried blindly.
//!
//! ## Purity Requirement
//!
//! `compute` may run several times for one logical operation. Only the run
//! that produced the winning CAS has its result returned to the caller.

use tracing::{debug, trace};

/// Backoff policy between lost CAS races
///
/// The policy shapes how a contended operation waits before re-reading. It
/// never limits how many times an operation retries.
///
/// # Example
///
/// ```
/// use stratacell_concurrency::RetryConfig;
///
/// let config = RetryConfig::default()
///     .with_spin_limit(4)
///     .with_contention_threshold(16);
/// assert_eq!(config.spin_limit, 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Lost races answered by spinning. Race `n` spins `2^n` times.
    pub spin_limit: u32,

    /// Yield the thread once the spin budget is exhausted
    pub yield_on_contention: bool,

    /// Lost races in one operation before a contention event is logged
    pub contention_threshold: u32,
}

impl RetryConfig {
    /// Default spin budget
    pub const DEFAULT_SPIN_LIMIT: u32 = 6;

    /// Default contention logging threshold
    pub const DEFAULT_CONTENTION_THRESHOLD: u32 = 64;

    /// Create the default policy
    pub const fn new() -> Self {
        Self {
            spin_limit: Self::DEFAULT_SPIN_LIMIT,
            yield_on_contention: true,
            contention_threshold: Self::DEFAULT_CONTENTION_THRESHOLD,
        }
    }

    /// Retry immediately after a lost race, without spinning or yielding
    pub const fn no_backoff() -> Self {
        Self {
            spin_limit: 0,
            yield_on_contention: false,
            contention_threshold: Self::DEFAULT_CONTENTION_THRESHOLD,
        }
    }

    /// Set the spin budget
    pub const fn with_spin_limit(mut self, spin_limit: u32) -> Self {
        self.spin_limit = spin_limit;
        self
    }

    /// Enable or disable yielding after the spin budget
    pub const fn with_yield(mut self, yield_on_contention: bool) -> Self {
        self.yield_on_contention = yield_on_contention;
        self
    }

    /// Set the contention logging threshold
    pub const fn with_contention_threshold(mut self, threshold: u32) -> Self {
        self.contention_threshold = threshold;
        self
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-operation backoff state
#[derive(Debug)]
pub struct Backoff {
    config: RetryConfig,
    lost: u32,
}

/// Spin exponent cap, so `2^n` stays bounded with large spin limits
const MAX_SPIN_SHIFT: u32 = 16;

impl Backoff {
    /// Start a fresh operation
    pub fn new(config: RetryConfig) -> Self {
        Self { config, lost: 0 }
    }

    /// Number of races lost so far
    pub fn lost(&self) -> u32 {
        self.lost
    }

    /// Record a lost race and wait before the next attempt
    pub fn snooze(&mut self) {
        self.lost = self.lost.saturating_add(1);
        trace!(attempt = self.lost, "CAS lost race, retrying from fresh read");

        if self.lost == self.config.contention_threshold {
            debug!(
                attempts = self.lost,
                "sustained contention on cell, operation still retrying"
            );
        }

        if self.lost <= self.config.spin_limit {
            for _ in 0..(1u32 << self.lost.min(MAX_SPIN_SHIFT)) {
                std::hint::spin_loop();
            }
        } else if self.config.yield_on_contention {
            std::thread::yield_now();
        }
    }
}

/// Run a read-compute-CAS loop until a CAS wins or `compute` aborts
///
/// # Arguments
/// * `load` - Reads the current snapshot
/// * `compute` - Candidate and result for a snapshot, or `Err` to abort
/// * `commit` - CAS the candidate against the snapshot, `true` if it won
///
/// # Returns
/// - Ok(result) from the evaluation whose candidate was committed
/// - Err(abort) from the first evaluation that aborted
pub fn retry_to_success<S, N, R, E>(
    config: RetryConfig,
    mut load: impl FnMut() -> S,
    mut compute: impl FnMut(&S) -> std::result::Result<(N, R), E>,
    mut commit: impl FnMut(&S, N) -> bool,
) -> std::result::Result<R, E> {
    let mut backoff = Backoff::new(config);
    loop {
        let current = load();

        let (candidate, result) = match compute(&current) {
            Ok(step) => step,
            Err(abort) => {
                trace!(
                    attempts = backoff.lost() + 1,
                    "transition short-circuited, cell left unchanged"
                );
                return Err(abort);
            }
        };

        if commit(&current, candidate) {
            if backoff.lost() > 0 {
                trace!(attempts = backoff.lost() + 1, "committed after contention");
            }
            return Ok(result);
        }

        backoff.snooze();
    }
}

/// Run a single read-compute-CAS
///
/// # Returns
/// - Ok(Some(result)) if the CAS won
/// - Ok(None) if a concurrent commit got there first
/// - Err(abort) if `compute` aborted; nothing was attempted
pub fn attempt_once<S, N, R, E>(
    load: impl FnOnce() -> S,
    compute: impl FnOnce(&S) -> std::result::Result<(N, R), E>,
    commit: impl FnOnce(&S, N) -> bool,
) -> std::result::Result<Option<R>, E> {
    let current = load();
    let (candidate, result) = compute(&current)?;

    if commit(&current, candidate) {
        Ok(Some(result))
    } else {
        trace!("single CAS attempt lost race");
        Ok(None)
    }
}
