use anchor_lang::prelude::*;

use crate::constants::{MAX_LOCK_RECORDS, MAX_REWARD_TOKENS};
use crate::error::LockerError;
use crate::utils::epoch::epoch_start;

/// One locked parcel: tokens deposited during a single epoch.
///
/// All deposits made in the same epoch share one unlock time, so a new
/// deposit whose computed unlock time equals the last record's merges into it
/// instead of appending. Records are stored in non-decreasing `unlock_time`
/// order and are never deleted; `UserLock.next_unlock_index` advances past
/// resolved ones.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LockRecord {
    pub amount: u64,
    pub unlock_time: i64,
}

impl LockRecord {
    pub const SIZE: usize = 8 + 8;
}

/// Per-holder, per-reward-stream accrual snapshot. Indexed in parallel with
/// `LockerState.rewards`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UserRewardState {
    /// Accumulator value already credited to this holder (scaled by PRECISION).
    pub reward_per_token_paid: u128,
    /// Earned but unclaimed amount.
    pub rewards: u64,
}

impl UserRewardState {
    pub const SIZE: usize = 16 + 8;
}

/// Per-holder lock ledger PDA.
#[account]
#[derive(Default)]
pub struct UserLock {
    pub owner: Pubkey,
    pub bump: u8,
    /// Live locked total; decremented only when expired records are resolved.
    pub locked_amount: u64,
    /// Cursor into `locks`: every record before this index is fully resolved.
    /// Monotonically non-decreasing.
    pub next_unlock_index: u32,
    pub locks: Vec<LockRecord>,
    pub reward_states: Vec<UserRewardState>,
}

impl UserLock {
    pub const SIZE: usize = 32
        + 1
        + 8
        + 4
        + 4 + LockRecord::SIZE * MAX_LOCK_RECORDS
        + 4 + UserRewardState::SIZE * MAX_REWARD_TOKENS;

    /// Append a lock record, or merge into the last one when the unlock time
    /// matches (same-epoch deposit).
    pub fn add_lock(&mut self, amount: u64, unlock_time: i64) -> Result<()> {
        match self.locks.last_mut() {
            Some(last) if last.unlock_time == unlock_time => {
                last.amount = last
                    .amount
                    .checked_add(amount)
                    .ok_or(LockerError::MathOverflow)?;
            }
            _ => {
                require!(
                    self.locks.len() < MAX_LOCK_RECORDS,
                    LockerError::LockRecordListFull
                );
                self.locks.push(LockRecord {
                    amount,
                    unlock_time,
                });
            }
        }
        Ok(())
    }

    /// Sum of unresolved records (cursor onward). Equals `locked_amount`
    /// whenever the bookkeeping is consistent.
    pub fn unresolved_total(&self) -> u64 {
        self.locks[self.next_unlock_index as usize..]
            .iter()
            .map(|l| l.amount)
            .sum()
    }

    /// Eligible balance at `now`: the live total minus unresolved records
    /// that have already expired, minus the last record when it was deposited
    /// in the still-open epoch (not yet eligible).
    pub fn balance_of(&self, now: i64, epoch_duration: i64, lock_duration: i64) -> Result<u64> {
        let mut amount = self.locked_amount;
        let len = self.locks.len();
        let mut i = self.next_unlock_index as usize;
        while i < len {
            if self.locks[i].unlock_time > now {
                break;
            }
            amount = amount
                .checked_sub(self.locks[i].amount)
                .ok_or(LockerError::MathOverflow)?;
            i += 1;
        }
        if i < len {
            let last = &self.locks[len - 1];
            if last.unlock_time - lock_duration >= epoch_start(now, epoch_duration) {
                amount = amount
                    .checked_sub(last.amount)
                    .ok_or(LockerError::MathOverflow)?;
            }
        }
        Ok(amount)
    }

    /// Historical balance at the epoch starting at `epoch_start_time`.
    ///
    /// Walks records backward, counting every record whose originating epoch
    /// lies strictly inside `(epoch_start_time - lock_duration,
    /// epoch_start_time)`. Records originating at or after the target epoch
    /// were not yet eligible; the walk stops at the cutoff since records are
    /// unlock-time ordered.
    pub fn balance_at_epoch(&self, epoch_start_time: i64, lock_duration: i64) -> u64 {
        let cutoff = epoch_start_time - lock_duration;
        let mut amount = 0u64;
        for rec in self.locks.iter().rev() {
            let origin = rec.unlock_time - lock_duration;
            if origin >= epoch_start_time {
                continue;
            }
            if origin <= cutoff {
                break;
            }
            amount = amount.saturating_add(rec.amount);
        }
        amount
    }
}
