use anchor_lang::prelude::*;

use crate::constants::{DENOMINATOR, MAX_DISTRIBUTORS, MAX_EPOCHS, MAX_REWARD_TOKENS, PRECISION};
use crate::error::LockerError;
use crate::state::{UserLock, UserRewardState};
use crate::utils::epoch::epoch_start;

/// One time bucket on the timeline. `supply` accumulates every deposit made
/// while this epoch was current and is never decremented.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Epoch {
    pub supply: u64,
    pub start_time: i64,
}

impl Epoch {
    pub const SIZE: usize = 8 + 8;
}

/// Streaming reward state for one reward token.
///
/// `reward_per_token_stored` is the monotonically increasing accumulator
/// (scaled by PRECISION); `reward_rate` is tokens per second, truncating.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RewardStream {
    pub token: Pubkey,
    /// Distributors approved to top up this stream.
    pub distributors: Vec<Pubkey>,
    pub reward_rate: u128,
    pub period_finish: i64,
    pub last_update_time: i64,
    pub reward_per_token_stored: u128,
}

impl RewardStream {
    pub const SIZE: usize = 32 + (4 + 32 * MAX_DISTRIBUTORS) + 16 + 8 + 8 + 16;
}

/// Result of one expiry-processing pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpiredOutcome {
    /// Total resolved this pass.
    pub unlocked: u64,
    /// Amount owed to the holder (or relocked): `unlocked - kick_reward`.
    pub net_amount: u64,
    /// Incentive owed to the kicker; zero for self-service processing.
    pub kick_reward: u64,
}

/// Global locker state PDA: epoch timeline, aggregate supply and every
/// reward stream.
#[account]
#[derive(Default)]
pub struct LockerState {
    pub admin: Pubkey,
    /// Mint of the locked token.
    pub mint: Pubkey,
    pub bump: u8,
    /// One-way flag; unlocks every position and blocks new deposits.
    pub is_shutdown: bool,
    pub epoch_duration: i64,
    pub lock_duration: i64,
    /// Kick incentive per overdue epoch, in basis points of DENOMINATOR.
    pub kick_reward_per_epoch: u64,
    /// Grace period before third parties may kick, in epochs.
    pub kick_reward_epoch_delay: u64,
    /// Sum of every holder's `locked_amount`.
    pub total_locked: u64,
    /// Dense, append-only epoch timeline.
    pub epochs: Vec<Epoch>,
    pub rewards: Vec<RewardStream>,
}

impl LockerState {
    pub const SIZE: usize = 32
        + 32
        + 1
        + 1
        + 8
        + 8
        + 8
        + 8
        + 8
        + 4 + Epoch::SIZE * MAX_EPOCHS
        + 4 + RewardStream::SIZE * MAX_REWARD_TOKENS;

    pub fn current_epoch_start(&self, now: i64) -> i64 {
        epoch_start(now, self.epoch_duration)
    }

    /// Extend the timeline with zero-supply epochs until it reaches `now`.
    /// Idempotent within one epoch; must run before any operation touching
    /// current-epoch supply.
    pub fn checkpoint_epochs(&mut self, now: i64) -> Result<()> {
        let current = self.current_epoch_start(now);
        if self.epochs.is_empty() {
            self.epochs.push(Epoch {
                supply: 0,
                start_time: current,
            });
            return Ok(());
        }
        while self.epochs[self.epochs.len() - 1].start_time < current {
            require!(self.epochs.len() < MAX_EPOCHS, LockerError::EpochListFull);
            let next_start = self.epochs[self.epochs.len() - 1].start_time + self.epoch_duration;
            self.epochs.push(Epoch {
                supply: 0,
                start_time: next_start,
            });
        }
        Ok(())
    }

    pub fn find_reward_index(&self, token: &Pubkey) -> Option<usize> {
        self.rewards.iter().position(|s| s.token == *token)
    }

    /// Register a reward stream with one initially approved distributor.
    pub fn add_reward_stream(&mut self, token: Pubkey, distributor: Pubkey, now: i64) -> Result<()> {
        require!(token != self.mint, LockerError::LockedTokenNotRewardable);
        require!(
            self.find_reward_index(&token).is_none(),
            LockerError::RewardTokenAlreadyAdded
        );
        require!(
            self.rewards.len() < MAX_REWARD_TOKENS,
            LockerError::RewardTokenListFull
        );
        self.rewards.push(RewardStream {
            token,
            distributors: vec![distributor],
            reward_rate: 0,
            period_finish: now,
            last_update_time: now,
            reward_per_token_stored: 0,
        });
        Ok(())
    }

    /// Reward-per-token accumulator as of `now`. Frozen while nothing is
    /// locked (no division by zero; accrual pauses).
    pub fn reward_per_token(&self, index: usize, now: i64) -> Result<u128> {
        let stream = &self.rewards[index];
        if self.total_locked == 0 {
            return Ok(stream.reward_per_token_stored);
        }
        let applicable = now.min(stream.period_finish);
        let elapsed = applicable.saturating_sub(stream.last_update_time);
        if elapsed <= 0 {
            return Ok(stream.reward_per_token_stored);
        }
        let accrued = (elapsed as u128)
            .checked_mul(stream.reward_rate)
            .ok_or(LockerError::MathOverflow)?
            .checked_mul(PRECISION)
            .ok_or(LockerError::MathOverflow)?
            .checked_div(self.total_locked as u128)
            .ok_or(LockerError::MathOverflow)?;
        stream
            .reward_per_token_stored
            .checked_add(accrued)
            .ok_or_else(|| LockerError::MathOverflow.into())
    }

    /// Freeze every accumulator at `now` and, when a holder is given, fold
    /// their earned amount into `rewards` and stamp `reward_per_token_paid`.
    ///
    /// This must run before any change to the holder's `locked_amount` or to
    /// `total_locked`: the accumulator has to be frozen against the old
    /// supply.
    pub fn settle_rewards(&mut self, mut user: Option<&mut UserLock>, now: i64) -> Result<()> {
        for index in 0..self.rewards.len() {
            let rpt = self.reward_per_token(index, now)?;
            let stream = &mut self.rewards[index];
            stream.reward_per_token_stored = rpt;
            stream.last_update_time = now.min(stream.period_finish);
            if let Some(user) = user.as_deref_mut() {
                if user.reward_states.len() <= index {
                    // Streams registered after this account was created:
                    // a zeroed entry accrues retroactively from stream start.
                    user.reward_states
                        .resize(index + 1, UserRewardState::default());
                }
                let locked = user.locked_amount;
                let entry = &mut user.reward_states[index];
                entry.rewards = earned_amount(locked, rpt, entry)?;
                entry.reward_per_token_paid = rpt;
            }
        }
        Ok(())
    }

    /// Earned-but-unclaimed amount for one stream against the live
    /// accumulator; read-only.
    pub fn claimable(&self, user: &UserLock, index: usize, now: i64) -> Result<u64> {
        let rpt = self.reward_per_token(index, now)?;
        let entry = user
            .reward_states
            .get(index)
            .copied()
            .unwrap_or_default();
        earned_amount(user.locked_amount, rpt, &entry)
    }

    /// Fold `amount` into a stream's rate: a fresh rate when the previous
    /// period lapsed, otherwise the undistributed remainder rolls into the
    /// new rate. The period always restarts at one epoch from `now`.
    /// Must be preceded by a global `settle_rewards(None, now)`.
    pub fn notify_reward_core(&mut self, index: usize, amount: u64, now: i64) -> Result<()> {
        let epoch_duration = self.epoch_duration as u128;
        let stream = &mut self.rewards[index];
        if now >= stream.period_finish {
            stream.reward_rate = (amount as u128) / epoch_duration;
        } else {
            let leftover = ((stream.period_finish - now) as u128)
                .checked_mul(stream.reward_rate)
                .ok_or(LockerError::MathOverflow)?;
            stream.reward_rate = (amount as u128)
                .checked_add(leftover)
                .ok_or(LockerError::MathOverflow)?
                / epoch_duration;
        }
        stream.last_update_time = now;
        stream.period_finish = now
            .checked_add(self.epoch_duration)
            .ok_or(LockerError::MathOverflow)?;
        Ok(())
    }

    /// Deposit `amount` for `user`, unlocking one full lock duration after
    /// the start of the current epoch. Returns the unlock time.
    pub fn lock_core(&mut self, user: &mut UserLock, amount: u64, now: i64) -> Result<i64> {
        require!(amount > 0, LockerError::InvalidAmount);
        require!(!self.is_shutdown, LockerError::SystemShutdown);

        self.checkpoint_epochs(now)?;
        self.settle_rewards(Some(user), now)?;

        let unlock_time = self.current_epoch_start(now) + self.lock_duration;
        user.add_lock(amount, unlock_time)?;
        user.locked_amount = user
            .locked_amount
            .checked_add(amount)
            .ok_or(LockerError::MathOverflow)?;
        self.total_locked = self
            .total_locked
            .checked_add(amount)
            .ok_or(LockerError::MathOverflow)?;

        // Checkpoint guarantees the timeline is non-empty and ends at the
        // current epoch.
        let last = self.epochs.len() - 1;
        let epoch = &mut self.epochs[last];
        epoch.supply = epoch
            .supply
            .checked_add(amount)
            .ok_or(LockerError::MathOverflow)?;

        Ok(unlock_time)
    }

    /// Resolve expired lock records for `user`.
    ///
    /// Fast path (shutdown, or even the newest record is past
    /// `now - grace_delay`): everything resolves in one step, and a kick
    /// (`grace_delay > 0`) earns a single incentive computed from the last
    /// record's overdue count only, even when older records are more
    /// overdue. Intentional approximation; observable behavior.
    ///
    /// Incremental path: walk from the cursor, accruing per-record
    /// incentives, stop at the first record still locked.
    pub fn process_expired_core(
        &mut self,
        user: &mut UserLock,
        relock: bool,
        grace_delay: i64,
        now: i64,
    ) -> Result<ExpiredOutcome> {
        self.checkpoint_epochs(now)?;
        self.settle_rewards(Some(user), now)?;

        let len = user.locks.len();
        require!(len > 0, LockerError::NothingToProcess);
        let expiry_time = now - grace_delay;

        let mut unlocked: u64 = 0;
        let mut reward: u64 = 0;

        if self.is_shutdown || user.locks[len - 1].unlock_time <= expiry_time {
            unlocked = user.locked_amount;
            user.next_unlock_index = len as u32;
            if grace_delay > 0 {
                let last = &user.locks[len - 1];
                let overdue = (epoch_start(expiry_time, self.epoch_duration)
                    - last.unlock_time)
                    .max(0)
                    / self.epoch_duration;
                reward = kick_incentive(last.amount, overdue, self.kick_reward_per_epoch)?;
            }
        } else {
            let mut i = user.next_unlock_index as usize;
            while i < len && user.locks[i].unlock_time <= expiry_time {
                let rec = user.locks[i];
                unlocked = unlocked
                    .checked_add(rec.amount)
                    .ok_or(LockerError::MathOverflow)?;
                if grace_delay > 0 {
                    let overdue = (epoch_start(expiry_time, self.epoch_duration)
                        - rec.unlock_time)
                        .max(0)
                        / self.epoch_duration;
                    reward = reward
                        .checked_add(kick_incentive(
                            rec.amount,
                            overdue,
                            self.kick_reward_per_epoch,
                        )?)
                        .ok_or(LockerError::MathOverflow)?;
                }
                i += 1;
            }
            user.next_unlock_index = i as u32;
        }

        require!(unlocked > 0, LockerError::NothingToProcess);

        user.locked_amount = user
            .locked_amount
            .checked_sub(unlocked)
            .ok_or(LockerError::MathOverflow)?;
        self.total_locked = self
            .total_locked
            .checked_sub(unlocked)
            .ok_or(LockerError::MathOverflow)?;

        let net_amount = unlocked
            .checked_sub(reward)
            .ok_or(LockerError::MathOverflow)?;
        if relock {
            self.lock_core(user, net_amount, now)?;
        }

        Ok(ExpiredOutcome {
            unlocked,
            net_amount,
            kick_reward: reward,
        })
    }

    /// Eligible total supply at `now`: epoch supplies newer than the lock
    /// window are counted, the still-open epoch is not.
    pub fn total_supply(&self, now: i64) -> u64 {
        self.total_supply_before(self.current_epoch_start(now))
    }

    /// Eligible total supply at a stored epoch, excluding that epoch's own
    /// deposits.
    pub fn total_supply_at_epoch(&self, index: usize) -> u64 {
        self.total_supply_before(self.epochs[index].start_time)
    }

    fn total_supply_before(&self, target_start: i64) -> u64 {
        let cutoff = target_start - self.lock_duration;
        let mut supply = 0u64;
        for e in self.epochs.iter().rev() {
            if e.start_time >= target_start {
                continue;
            }
            if e.start_time <= cutoff {
                break;
            }
            supply = supply.saturating_add(e.supply);
        }
        supply
    }
}

/// `locked * (accumulator - paid) / PRECISION + accrued`, truncating.
fn earned_amount(locked: u64, reward_per_token: u128, entry: &UserRewardState) -> Result<u64> {
    let delta = reward_per_token
        .checked_sub(entry.reward_per_token_paid)
        .ok_or(LockerError::MathOverflow)?;
    let gained = (locked as u128)
        .checked_mul(delta)
        .ok_or(LockerError::MathOverflow)?
        / PRECISION;
    let total = gained
        .checked_add(entry.rewards as u128)
        .ok_or(LockerError::MathOverflow)?;
    u64::try_from(total).map_err(|_| LockerError::MathOverflow.into())
}

/// `amount * min(per_epoch * (overdue + 1), DENOMINATOR) / DENOMINATOR`.
fn kick_incentive(amount: u64, overdue_epochs: i64, per_epoch: u64) -> Result<u64> {
    let rate = per_epoch
        .checked_mul(overdue_epochs as u64 + 1)
        .ok_or(LockerError::MathOverflow)?
        .min(DENOMINATOR);
    let reward = (amount as u128) * (rate as u128) / (DENOMINATOR as u128);
    u64::try_from(reward).map_err(|_| LockerError::MathOverflow.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        DEFAULT_KICK_REWARD_EPOCH_DELAY, DEFAULT_KICK_REWARD_PER_EPOCH, EPOCH_DURATION,
        LOCK_DURATION,
    };

    fn new_state(now: i64) -> LockerState {
        let mut st = LockerState {
            epoch_duration: EPOCH_DURATION,
            lock_duration: LOCK_DURATION,
            kick_reward_per_epoch: DEFAULT_KICK_REWARD_PER_EPOCH,
            kick_reward_epoch_delay: DEFAULT_KICK_REWARD_EPOCH_DELAY,
            ..Default::default()
        };
        st.checkpoint_epochs(now).unwrap();
        st
    }

    fn assert_conserved(st: &LockerState, users: &[&UserLock]) {
        let sum_locked: u64 = users.iter().map(|u| u.locked_amount).sum();
        let sum_unresolved: u64 = users.iter().map(|u| u.unresolved_total()).sum();
        assert_eq!(st.total_locked, sum_locked);
        assert_eq!(sum_locked, sum_unresolved);
    }

    #[test]
    fn checkpoint_fills_gaps_and_is_idempotent() {
        let mut st = new_state(0);
        assert_eq!(st.epochs.len(), 1);

        let now = 5 * EPOCH_DURATION + 42;
        st.checkpoint_epochs(now).unwrap();
        assert_eq!(st.epochs.len(), 6);
        for (i, e) in st.epochs.iter().enumerate() {
            assert_eq!(e.start_time, (i as i64) * EPOCH_DURATION);
            assert_eq!(e.supply, 0);
        }

        let snapshot = st.epochs.clone();
        st.checkpoint_epochs(now).unwrap();
        assert_eq!(st.epochs, snapshot);
        // Later in the same epoch is still a no-op.
        st.checkpoint_epochs(now + 100).unwrap();
        assert_eq!(st.epochs, snapshot);
    }

    #[test]
    fn scenario_a_balance_lifecycle() {
        // Deposit 100 during epoch 0; eligible from epoch 1; gone at unlock.
        let mut st = new_state(0);
        let mut user = UserLock::default();
        let unlock = st.lock_core(&mut user, 100, 1_000).unwrap();
        assert_eq!(unlock, LOCK_DURATION);

        assert_eq!(
            user.balance_of(2_000, EPOCH_DURATION, LOCK_DURATION).unwrap(),
            0
        );
        assert_eq!(st.total_supply(2_000), 0);

        // Epoch 1 onward: counted.
        assert_eq!(
            user.balance_of(EPOCH_DURATION, EPOCH_DURATION, LOCK_DURATION)
                .unwrap(),
            100
        );
        assert_eq!(st.total_supply(EPOCH_DURATION), 100);
        assert_eq!(
            user.balance_of(LOCK_DURATION - 1, EPOCH_DURATION, LOCK_DURATION)
                .unwrap(),
            100
        );

        // At the unlock instant the record is expired, balance drops.
        assert_eq!(
            user.balance_of(LOCK_DURATION, EPOCH_DURATION, LOCK_DURATION)
                .unwrap(),
            0
        );

        // Expiry processing resolves the record.
        let out = st
            .process_expired_core(&mut user, false, 0, LOCK_DURATION)
            .unwrap();
        assert_eq!(out.unlocked, 100);
        assert_eq!(out.net_amount, 100);
        assert_eq!(out.kick_reward, 0);
        assert_eq!(user.locked_amount, 0);
        assert_eq!(user.next_unlock_index, 1);
        assert_conserved(&st, &[&user]);
    }

    #[test]
    fn scenario_c_kick_incentive_from_last_record() {
        let mut st = new_state(0);
        let mut user = UserLock::default();
        st.lock_core(&mut user, 100, 1_000).unwrap();

        // Ignored for 10 epochs past unlock; kicked with a 4-epoch grace.
        let grace = 4 * EPOCH_DURATION;
        let now = LOCK_DURATION + 10 * EPOCH_DURATION;
        let out = st.process_expired_core(&mut user, false, grace, now).unwrap();

        // overdue = 6 whole epochs beyond the last record's unlock time,
        // rate = min(100 * (6 + 1), 10000) = 700 bps.
        assert_eq!(out.kick_reward, 100 * 700 / 10_000);
        assert_eq!(out.net_amount, 100 - out.kick_reward);
        assert_eq!(st.total_locked, 0);
    }

    #[test]
    fn kick_incentive_rate_caps_at_denominator() {
        let mut st = new_state(0);
        st.kick_reward_per_epoch = 500;
        let mut user = UserLock::default();
        st.lock_core(&mut user, 1_000, 0).unwrap();

        // So overdue that the rate saturates: the whole stake goes to the
        // kicker.
        let now = LOCK_DURATION + 100 * EPOCH_DURATION;
        let out = st
            .process_expired_core(&mut user, false, 4 * EPOCH_DURATION, now)
            .unwrap();
        assert_eq!(out.kick_reward, 1_000);
        assert_eq!(out.net_amount, 0);
    }

    #[test]
    fn incremental_expiry_advances_cursor_per_record() {
        let mut st = new_state(0);
        let mut user = UserLock::default();
        // Deposits in epochs 0, 1 and 2.
        st.lock_core(&mut user, 10, 0).unwrap();
        st.lock_core(&mut user, 20, EPOCH_DURATION).unwrap();
        st.lock_core(&mut user, 40, 2 * EPOCH_DURATION).unwrap();
        assert_eq!(user.locks.len(), 3);

        // Only the first two records have expired: incremental path.
        let now = LOCK_DURATION + EPOCH_DURATION;
        let out = st.process_expired_core(&mut user, false, 0, now).unwrap();
        assert_eq!(out.unlocked, 30);
        assert_eq!(user.next_unlock_index, 2);
        assert_eq!(user.locked_amount, 40);
        assert_conserved(&st, &[&user]);

        // Nothing more to process at the same time.
        let err = st.process_expired_core(&mut user, false, 0, now).unwrap_err();
        assert_eq!(err, LockerError::NothingToProcess.into());
    }

    #[test]
    fn incremental_kick_accrues_per_record_incentives() {
        let mut st = new_state(0);
        let mut user = UserLock::default();
        // Deposits in epochs 0, 2 and 12: unlock at epochs 16, 18 and 28.
        st.lock_core(&mut user, 1_000, 0).unwrap();
        st.lock_core(&mut user, 200, 2 * EPOCH_DURATION).unwrap();
        st.lock_core(&mut user, 500, 12 * EPOCH_DURATION).unwrap();

        // Kick at epoch 26 with a 4-epoch grace: the newest record is still
        // locked, so the walk takes the incremental path and sums one
        // incentive per expired record at its own overdue depth.
        let grace = 4 * EPOCH_DURATION;
        let now = 26 * EPOCH_DURATION;
        let out = st.process_expired_core(&mut user, false, grace, now).unwrap();

        assert_eq!(out.unlocked, 1_200);
        // First record: 6 epochs overdue, 700 bps of 1000. Second: 4 epochs
        // overdue, 500 bps of 200.
        assert_eq!(out.kick_reward, 70 + 10);
        assert_eq!(out.net_amount, 1_200 - 80);
        assert_eq!(user.next_unlock_index, 2);
        assert_eq!(user.locked_amount, 500);
        assert_conserved(&st, &[&user]);
    }

    #[test]
    fn nothing_to_process_without_records() {
        let mut st = new_state(0);
        let mut user = UserLock::default();
        let err = st.process_expired_core(&mut user, false, 0, 1_000).unwrap_err();
        assert_eq!(err, LockerError::NothingToProcess.into());
    }

    #[test]
    fn shutdown_unlocks_everything_and_blocks_deposits() {
        let mut st = new_state(0);
        let mut user = UserLock::default();
        st.lock_core(&mut user, 100, 1_000).unwrap();

        st.is_shutdown = true;
        // Far from expired, but the fast path resolves everything.
        let out = st.process_expired_core(&mut user, false, 0, 2_000).unwrap();
        assert_eq!(out.unlocked, 100);
        assert_eq!(out.kick_reward, 0);
        assert_eq!(user.locked_amount, 0);

        let err = st.lock_core(&mut user, 1, 3_000).unwrap_err();
        assert_eq!(err, LockerError::SystemShutdown.into());
    }

    #[test]
    fn relock_rolls_net_amount_into_new_record() {
        let mut st = new_state(0);
        let mut user = UserLock::default();
        st.lock_core(&mut user, 100, 0).unwrap();

        let now = LOCK_DURATION + 10;
        let out = st.process_expired_core(&mut user, true, 0, now).unwrap();
        assert_eq!(out.net_amount, 100);
        assert_eq!(user.locked_amount, 100);
        assert_eq!(user.locks.len(), 2);
        assert_eq!(
            user.locks[1].unlock_time,
            epoch_start(now, EPOCH_DURATION) + LOCK_DURATION
        );
        assert_eq!(st.total_locked, 100);
        assert_conserved(&st, &[&user]);

        // Relocking under shutdown is a deposit, so it is rejected.
        let mut st2 = new_state(0);
        let mut user2 = UserLock::default();
        st2.lock_core(&mut user2, 50, 0).unwrap();
        st2.is_shutdown = true;
        let err = st2
            .process_expired_core(&mut user2, true, 0, LOCK_DURATION)
            .unwrap_err();
        assert_eq!(err, LockerError::SystemShutdown.into());
    }

    #[test]
    fn conservation_across_mixed_operations() {
        let mut st = new_state(0);
        let mut alice = UserLock::default();
        let mut bob = UserLock::default();
        let mut deposited: u64 = 0;

        st.lock_core(&mut alice, 100, 500).unwrap();
        deposited += 100;
        st.lock_core(&mut bob, 250, EPOCH_DURATION + 3).unwrap();
        deposited += 250;
        st.lock_core(&mut alice, 70, 3 * EPOCH_DURATION).unwrap();
        deposited += 70;
        assert_conserved(&st, &[&alice, &bob]);

        // Alice's first record expires; process self-service.
        let now = LOCK_DURATION + EPOCH_DURATION;
        let out = st.process_expired_core(&mut alice, false, 0, now).unwrap();
        assert_eq!(out.unlocked, 100);
        assert_conserved(&st, &[&alice, &bob]);

        // Bob is kicked much later.
        let later = LOCK_DURATION + 9 * EPOCH_DURATION;
        st.process_expired_core(&mut bob, false, 4 * EPOCH_DURATION, later)
            .unwrap();
        assert_conserved(&st, &[&alice, &bob]);

        // Epoch supply reconciliation: epoch supplies are never decremented,
        // so their sum equals everything ever deposited.
        let epoch_sum: u64 = st.epochs.iter().map(|e| e.supply).sum();
        assert_eq!(epoch_sum, deposited);
    }

    #[test]
    fn epoch_supply_counts_relocks_as_new_deposits() {
        let mut st = new_state(0);
        let mut user = UserLock::default();
        st.lock_core(&mut user, 100, 0).unwrap();
        st.process_expired_core(&mut user, true, 0, LOCK_DURATION).unwrap();

        let epoch_sum: u64 = st.epochs.iter().map(|e| e.supply).sum();
        assert_eq!(epoch_sum, 200);
        assert_eq!(st.total_locked, 100);
    }

    #[test]
    fn total_supply_window_and_exclusions() {
        let mut st = new_state(0);
        let mut user = UserLock::default();
        st.lock_core(&mut user, 100, 1_000).unwrap();

        // Current epoch's own supply never counts.
        assert_eq!(st.total_supply(2_000), 0);
        assert_eq!(st.total_supply(EPOCH_DURATION), 100);

        // Counted for the whole lock window, then aged out.
        assert_eq!(st.total_supply(LOCK_DURATION - 1), 100);
        st.checkpoint_epochs(LOCK_DURATION).unwrap();
        assert_eq!(st.total_supply(LOCK_DURATION), 0);

        // Historical per-epoch view agrees.
        assert_eq!(st.total_supply_at_epoch(0), 0);
        assert_eq!(st.total_supply_at_epoch(1), 100);
        assert_eq!(st.total_supply_at_epoch(16), 0);
    }

    #[test]
    fn at_epoch_quotes_agree_for_a_sole_holder() {
        let mut st = new_state(0);
        let mut user = UserLock::default();
        st.lock_core(&mut user, 100, 0).unwrap();
        st.lock_core(&mut user, 50, 3 * EPOCH_DURATION).unwrap();
        st.checkpoint_epochs(20 * EPOCH_DURATION).unwrap();

        // With a single holder the historical balance and the historical
        // supply are the same series, for every stored epoch.
        for index in 0..st.epochs.len() {
            let balance = user.balance_at_epoch(st.epochs[index].start_time, st.lock_duration);
            assert_eq!(balance, st.total_supply_at_epoch(index));
        }
        assert_eq!(st.total_supply_at_epoch(16), 50);
        assert_eq!(st.total_supply_at_epoch(19), 0);
    }

    #[test]
    fn scenario_d_notify_sets_then_blends_rate() {
        let now = 10 * EPOCH_DURATION;
        let mut st = new_state(now);
        let mut user = UserLock::default();
        st.lock_core(&mut user, 400, now).unwrap();
        st.add_reward_stream(Pubkey::new_unique(), Pubkey::new_unique(), now)
            .unwrap();

        // No active stream: plain rate.
        let amount = (700 * EPOCH_DURATION) as u64;
        st.settle_rewards(None, now).unwrap();
        st.notify_reward_core(0, amount, now).unwrap();
        assert_eq!(st.rewards[0].reward_rate, 700);
        assert_eq!(st.rewards[0].period_finish, now + EPOCH_DURATION);

        // Mid-period top-up folds the undistributed half into the new rate.
        let mid = now + EPOCH_DURATION / 2;
        st.settle_rewards(None, mid).unwrap();
        st.notify_reward_core(0, amount, mid).unwrap();
        assert_eq!(st.rewards[0].reward_rate, 700 + 350);
        assert_eq!(st.rewards[0].period_finish, mid + EPOCH_DURATION);
    }

    #[test]
    fn accumulator_is_monotonic() {
        let now = 0;
        let mut st = new_state(now);
        let mut user = UserLock::default();
        st.add_reward_stream(Pubkey::new_unique(), Pubkey::new_unique(), now)
            .unwrap();
        st.lock_core(&mut user, 1_000, now).unwrap();
        st.settle_rewards(None, now).unwrap();
        st.notify_reward_core(0, 10 * EPOCH_DURATION as u64, now).unwrap();

        let mut last = 0u128;
        let checkpoints = [
            1_000,
            EPOCH_DURATION / 3,
            EPOCH_DURATION - 1,
            EPOCH_DURATION,
            EPOCH_DURATION + 5,
            2 * EPOCH_DURATION,
        ];
        for t in checkpoints {
            let rpt = st.reward_per_token(0, t).unwrap();
            assert!(rpt >= last);
            last = rpt;
            st.settle_rewards(Some(&mut user), t).unwrap();
            assert_eq!(st.rewards[0].reward_per_token_stored, rpt);
        }
    }

    #[test]
    fn reward_conservation_after_period_end() {
        let now = 0;
        let mut st = new_state(now);
        let mut alice = UserLock::default();
        let mut bob = UserLock::default();
        st.add_reward_stream(Pubkey::new_unique(), Pubkey::new_unique(), now)
            .unwrap();
        st.lock_core(&mut alice, 100, now).unwrap();
        st.lock_core(&mut bob, 233, now).unwrap();

        let total_reward = (1_000 * EPOCH_DURATION) as u64;
        st.settle_rewards(None, now).unwrap();
        st.notify_reward_core(0, total_reward, now).unwrap();

        // Settle well past the period end; accrual stops at period_finish.
        let after = 3 * EPOCH_DURATION;
        st.settle_rewards(Some(&mut alice), after).unwrap();
        st.settle_rewards(Some(&mut bob), after).unwrap();

        let paid = alice.reward_states[0].rewards + bob.reward_states[0].rewards;
        assert!(paid <= total_reward);
        // Only truncation dust may be withheld.
        assert!(total_reward - paid <= 2, "dust was {}", total_reward - paid);

        // Holders split proportionally to locked balance.
        let a = alice.reward_states[0].rewards as u128;
        let b = bob.reward_states[0].rewards as u128;
        assert!(a * 233 / 100 >= b - 2 && a * 233 / 100 <= b + 2);
    }

    #[test]
    fn mid_stream_deposit_only_earns_from_entry() {
        let now = 0;
        let mut st = new_state(now);
        let mut early = UserLock::default();
        let mut late = UserLock::default();
        st.add_reward_stream(Pubkey::new_unique(), Pubkey::new_unique(), now)
            .unwrap();
        st.lock_core(&mut early, 100, now).unwrap();
        st.settle_rewards(None, now).unwrap();
        st.notify_reward_core(0, (100 * EPOCH_DURATION) as u64, now).unwrap();

        // Half the period passes before the late holder enters with an equal
        // stake: the first half belongs entirely to the early holder.
        let mid = EPOCH_DURATION / 2;
        st.lock_core(&mut late, 100, mid).unwrap();

        let after = EPOCH_DURATION;
        st.settle_rewards(Some(&mut early), after).unwrap();
        st.settle_rewards(Some(&mut late), after).unwrap();

        let early_rewards = early.reward_states[0].rewards;
        let late_rewards = late.reward_states[0].rewards;
        assert!(early_rewards > late_rewards);
        // Early: full first half plus half of the second half = 3x late's.
        assert!((early_rewards as i64 - 3 * late_rewards as i64).abs() <= 3);
    }

    #[test]
    fn stream_added_after_lock_accrues_retroactively_from_stream_start() {
        let now = 0;
        let mut st = new_state(now);
        let mut user = UserLock::default();
        st.lock_core(&mut user, 100, now).unwrap();
        assert!(user.reward_states.is_empty());

        let later = EPOCH_DURATION;
        st.add_reward_stream(Pubkey::new_unique(), Pubkey::new_unique(), later)
            .unwrap();
        st.settle_rewards(None, later).unwrap();
        let reward = (10 * EPOCH_DURATION) as u64;
        st.notify_reward_core(0, reward, later).unwrap();

        st.settle_rewards(Some(&mut user), later + EPOCH_DURATION).unwrap();
        assert_eq!(user.reward_states.len(), 1);
        // Sole holder for the whole stream: receives it all (minus dust).
        assert!(reward - user.reward_states[0].rewards <= 1);
    }

    #[test]
    fn accrual_pauses_while_nothing_is_locked() {
        let now = 0;
        let mut st = new_state(now);
        st.add_reward_stream(Pubkey::new_unique(), Pubkey::new_unique(), now)
            .unwrap();
        st.settle_rewards(None, now).unwrap();
        st.notify_reward_core(0, (100 * EPOCH_DURATION) as u64, now).unwrap();

        // No supply: the accumulator stays put.
        assert_eq!(st.reward_per_token(0, EPOCH_DURATION).unwrap(), 0);
        st.settle_rewards(None, EPOCH_DURATION).unwrap();
        assert_eq!(st.rewards[0].reward_per_token_stored, 0);
    }

    #[test]
    fn reward_stream_registration_rules() {
        let mut st = new_state(0);
        st.mint = Pubkey::new_unique();

        let err = st
            .add_reward_stream(st.mint, Pubkey::new_unique(), 0)
            .unwrap_err();
        assert_eq!(err, LockerError::LockedTokenNotRewardable.into());

        let token = Pubkey::new_unique();
        st.add_reward_stream(token, Pubkey::new_unique(), 0).unwrap();
        let err = st
            .add_reward_stream(token, Pubkey::new_unique(), 0)
            .unwrap_err();
        assert_eq!(err, LockerError::RewardTokenAlreadyAdded.into());

        for _ in st.rewards.len()..MAX_REWARD_TOKENS {
            st.add_reward_stream(Pubkey::new_unique(), Pubkey::new_unique(), 0)
                .unwrap();
        }
        let err = st
            .add_reward_stream(Pubkey::new_unique(), Pubkey::new_unique(), 0)
            .unwrap_err();
        assert_eq!(err, LockerError::RewardTokenListFull.into());
    }

    #[test]
    fn zero_amount_deposit_rejected() {
        let mut st = new_state(0);
        let mut user = UserLock::default();
        let err = st.lock_core(&mut user, 0, 0).unwrap_err();
        assert_eq!(err, LockerError::InvalidAmount.into());
    }
}
