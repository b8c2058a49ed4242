use anchor_lang::prelude::*;

use crate::error::LockerError;
use crate::state::{LockerState, LockRecord, UserLock};
use crate::utils::epoch::find_epoch_index;

/// Read-only status quote for one holder: live and eligible balances, the
/// full lock record listing, and per-stream claimable amounts. Passing a
/// stored epoch index also quotes the holder's balance and the total supply
/// as of that epoch. Emitted as an event for off-chain consumers; no state
/// is mutated.
pub fn emit_lock_status(
    ctx: Context<EmitLockStatus>,
    owner: Pubkey,
    epoch_index: Option<u32>,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let st = &ctx.accounts.locker_state;
    let user = &ctx.accounts.user_lock;

    let eligible_balance = user.balance_of(now, st.epoch_duration, st.lock_duration)?;

    let (epoch_balance, epoch_supply) = match epoch_index {
        Some(index) => {
            let index = index as usize;
            require!(index < st.epochs.len(), LockerError::ParameterOutOfRange);
            (
                Some(user.balance_at_epoch(st.epochs[index].start_time, st.lock_duration)),
                Some(st.total_supply_at_epoch(index)),
            )
        }
        None => (None, None),
    };
    let mut reward_tokens = Vec::with_capacity(st.rewards.len());
    let mut claimable = Vec::with_capacity(st.rewards.len());
    for index in 0..st.rewards.len() {
        reward_tokens.push(st.rewards[index].token);
        claimable.push(st.claimable(user, index, now)?);
    }

    emit!(LockStatus {
        owner,
        locked_amount: user.locked_amount,
        eligible_balance,
        total_supply: st.total_supply(now),
        current_epoch_index: find_epoch_index(&st.epochs, now, st.epoch_duration) as u32,
        next_unlock_index: user.next_unlock_index,
        locks: user.locks[user.next_unlock_index as usize..].to_vec(),
        reward_tokens,
        claimable,
        epoch_balance,
        epoch_supply,
    });

    Ok(())
}

#[derive(Accounts)]
#[instruction(owner: Pubkey)]
pub struct EmitLockStatus<'info> {
    #[account(seeds = [b"locker_state"], bump)]
    pub locker_state: Account<'info, LockerState>,

    #[account(
        seeds = [b"user_lock", owner.as_ref()],
        bump = user_lock.bump,
    )]
    pub user_lock: Account<'info, UserLock>,
}

#[event]
pub struct LockStatus {
    pub owner: Pubkey,
    pub locked_amount: u64,
    pub eligible_balance: u64,
    pub total_supply: u64,
    pub current_epoch_index: u32,
    pub next_unlock_index: u32,
    pub locks: Vec<LockRecord>,
    pub reward_tokens: Vec<Pubkey>,
    pub claimable: Vec<u64>,
    /// Holder balance at the requested epoch, when one was given.
    pub epoch_balance: Option<u64>,
    /// Total supply at the requested epoch, when one was given.
    pub epoch_supply: Option<u64>,
}
