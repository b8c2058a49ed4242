use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::error::LockerError;
use crate::state::{LockerState, UserLock};

/// Self-service expiry processing: no grace delay, no kick incentive. The
/// net amount lands in `destination`, or is relocked for another full term.
pub fn withdraw_expired(ctx: Context<WithdrawExpired>, relock: bool) -> Result<()> {
    let locker_state_ai = ctx.accounts.locker_state.to_account_info();
    let locker_state_bump = ctx.accounts.locker_state.bump;

    let now = Clock::get()?.unix_timestamp;
    let st = &mut ctx.accounts.locker_state;
    let user = &mut ctx.accounts.user_lock;

    let outcome = st.process_expired_core(user, relock, 0, now)?;

    if !relock && outcome.net_amount > 0 {
        let signer_seeds: &[&[&[u8]]] = &[&[b"locker_state", &[locker_state_bump]]];
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.vault.to_account_info(),
                    to: ctx.accounts.destination.to_account_info(),
                    authority: locker_state_ai,
                },
                signer_seeds,
            ),
            outcome.net_amount,
        )?;
    }

    emit!(ExpiredLocksProcessed {
        owner: user.owner,
        unlocked: outcome.unlocked,
        relocked: relock,
        locked_amount: user.locked_amount,
        total_locked: st.total_locked,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct WithdrawExpired<'info> {
    #[account(mut, seeds = [b"locker_state"], bump)]
    pub locker_state: Account<'info, LockerState>,

    #[account(
        mut,
        seeds = [b"vault", locker_state.key().as_ref()],
        bump,
        constraint = vault.mint == locker_state.mint @ LockerError::InvalidTokenMint,
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [b"user_lock", owner.key().as_ref()],
        bump = user_lock.bump,
        constraint = user_lock.owner == owner.key() @ LockerError::Unauthorized,
    )]
    pub user_lock: Account<'info, UserLock>,

    #[account(
        mut,
        constraint = destination.mint == locker_state.mint @ LockerError::InvalidTokenMint,
    )]
    pub destination: Account<'info, TokenAccount>,

    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[event]
pub struct ExpiredLocksProcessed {
    pub owner: Pubkey,
    pub unlocked: u64,
    pub relocked: bool,
    pub locked_amount: u64,
    pub total_locked: u64,
}
