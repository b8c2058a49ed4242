pub mod constants;
pub mod error;
pub mod instructions;
pub mod state;
pub mod utils;

use anchor_lang::prelude::*;

use instructions::*;

declare_id!("2tTu9zo3pQEsdtKHbLTj1fRuNbwLuKiB4efPJNbdNH6s");

/// Epoch-indexed token locker with streaming rewards.
///
/// Deposits lock for a fixed number of epochs, become eligible for supply
/// and balance queries one epoch after deposit, and earn a share of every
/// registered reward stream proportional to locked balance over time.
#[program]
pub mod epoch_locker {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize(ctx)
    }

    pub fn lock(ctx: Context<Lock>, amount: u64) -> Result<()> {
        instructions::lock(ctx, amount)
    }

    pub fn withdraw_expired(ctx: Context<WithdrawExpired>, relock: bool) -> Result<()> {
        instructions::withdraw_expired(ctx, relock)
    }

    pub fn kick_expired(ctx: Context<KickExpired>) -> Result<()> {
        instructions::kick_expired(ctx)
    }

    pub fn claim_rewards<'info>(
        ctx: Context<'_, '_, 'info, 'info, ClaimRewards<'info>>,
    ) -> Result<()> {
        instructions::claim_rewards(ctx)
    }

    pub fn add_reward_token(ctx: Context<AddRewardToken>, distributor: Pubkey) -> Result<()> {
        instructions::add_reward_token(ctx, distributor)
    }

    pub fn approve_reward_distributor(
        ctx: Context<ApproveRewardDistributor>,
        token: Pubkey,
        distributor: Pubkey,
        approved: bool,
    ) -> Result<()> {
        instructions::approve_reward_distributor(ctx, token, distributor, approved)
    }

    pub fn notify_reward_amount(ctx: Context<NotifyRewardAmount>, amount: u64) -> Result<()> {
        instructions::notify_reward_amount(ctx, amount)
    }

    pub fn set_kick_incentive(
        ctx: Context<SetKickIncentive>,
        rate_bps: u64,
        epoch_delay: u64,
    ) -> Result<()> {
        instructions::set_kick_incentive(ctx, rate_bps, epoch_delay)
    }

    pub fn shutdown(ctx: Context<Shutdown>) -> Result<()> {
        instructions::shutdown(ctx)
    }

    pub fn checkpoint_epochs(ctx: Context<CheckpointEpochs>) -> Result<()> {
        instructions::checkpoint_epochs(ctx)
    }

    pub fn emit_lock_status(
        ctx: Context<EmitLockStatus>,
        owner: Pubkey,
        epoch_index: Option<u32>,
    ) -> Result<()> {
        instructions::emit_lock_status(ctx, owner, epoch_index)
    }
}
