//! Program-wide constants.

/// Length of one epoch in seconds (7 days, UTC).
pub const EPOCH_DURATION: i64 = 7 * 86_400;

/// Number of epochs a deposit stays locked.
pub const LOCK_EPOCHS: i64 = 16;

/// Full lock duration in seconds (16 weeks).
pub const LOCK_DURATION: i64 = EPOCH_DURATION * LOCK_EPOCHS;

/// Fixed-point scale for reward-per-token accumulators (1e18; truncating
/// integer division only, no rounding).
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Basis-point denominator for the kick incentive rate.
pub const DENOMINATOR: u64 = 10_000;

/// Default kick incentive per overdue epoch, in basis points (1%).
pub const DEFAULT_KICK_REWARD_PER_EPOCH: u64 = 100;

/// Upper bound for the configurable kick incentive rate (5%).
pub const MAX_KICK_REWARD_PER_EPOCH: u64 = 500;

/// Default grace period before third parties may kick, in epochs.
pub const DEFAULT_KICK_REWARD_EPOCH_DELAY: u64 = 4;

/// Lower bound for the configurable kick grace period, in epochs.
pub const MIN_KICK_REWARD_EPOCH_DELAY: u64 = 2;

/// Max reward streams a locker can register.
pub const MAX_REWARD_TOKENS: usize = 5;

/// Max approved distributors per reward stream.
pub const MAX_DISTRIBUTORS: usize = 4;

/// Epoch timeline capacity reserved in the state account (8 years of weekly
/// epochs).
pub const MAX_EPOCHS: usize = 416;

/// Max lock records per holder. Same-epoch deposits merge, so this is bounded
/// by distinct deposit epochs and also covers 8 years.
pub const MAX_LOCK_RECORDS: usize = 416;
