use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::error::LockerError;
use crate::state::{LockerState, UserLock};

/// Third-party expiry processing after the configured grace period. The
/// caller earns an incentive proportional to how overdue the position is;
/// the remainder is pushed to the holder.
pub fn kick_expired(ctx: Context<KickExpired>) -> Result<()> {
    let locker_state_ai = ctx.accounts.locker_state.to_account_info();
    let locker_state_bump = ctx.accounts.locker_state.bump;

    let now = Clock::get()?.unix_timestamp;
    let st = &mut ctx.accounts.locker_state;
    let user = &mut ctx.accounts.user_lock;

    let grace_delay = (st.kick_reward_epoch_delay as i64)
        .checked_mul(st.epoch_duration)
        .ok_or(LockerError::MathOverflow)?;
    let outcome = st.process_expired_core(user, false, grace_delay, now)?;

    let signer_seeds: &[&[&[u8]]] = &[&[b"locker_state", &[locker_state_bump]]];
    if outcome.net_amount > 0 {
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.vault.to_account_info(),
                    to: ctx.accounts.owner_token_account.to_account_info(),
                    authority: locker_state_ai.clone(),
                },
                signer_seeds,
            ),
            outcome.net_amount,
        )?;
    }
    if outcome.kick_reward > 0 {
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.vault.to_account_info(),
                    to: ctx.accounts.kicker_token_account.to_account_info(),
                    authority: locker_state_ai,
                },
                signer_seeds,
            ),
            outcome.kick_reward,
        )?;
    }

    emit!(KickReward {
        owner: user.owner,
        kicker: ctx.accounts.kicker.key(),
        unlocked: outcome.unlocked,
        net_amount: outcome.net_amount,
        kick_reward: outcome.kick_reward,
        total_locked: st.total_locked,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct KickExpired<'info> {
    #[account(mut, seeds = [b"locker_state"], bump)]
    pub locker_state: Account<'info, LockerState>,

    #[account(
        mut,
        seeds = [b"vault", locker_state.key().as_ref()],
        bump,
        constraint = vault.mint == locker_state.mint @ LockerError::InvalidTokenMint,
    )]
    pub vault: Account<'info, TokenAccount>,

    /// Holder being kicked.
    /// CHECK: only used as the user lock PDA seed.
    pub owner: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [b"user_lock", owner.key().as_ref()],
        bump = user_lock.bump,
    )]
    pub user_lock: Account<'info, UserLock>,

    #[account(
        mut,
        constraint = owner_token_account.mint == locker_state.mint @ LockerError::InvalidTokenMint,
        constraint = owner_token_account.owner == owner.key() @ LockerError::InvalidTokenAccount,
    )]
    pub owner_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = kicker_token_account.mint == locker_state.mint @ LockerError::InvalidTokenMint,
    )]
    pub kicker_token_account: Account<'info, TokenAccount>,

    pub kicker: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[event]
pub struct KickReward {
    pub owner: Pubkey,
    pub kicker: Pubkey,
    pub unlocked: u64,
    pub net_amount: u64,
    pub kick_reward: u64,
    pub total_locked: u64,
}
