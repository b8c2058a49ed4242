use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::error::LockerError;
use crate::state::{LockerState, UserLock};

pub fn lock(ctx: Context<Lock>, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let st = &mut ctx.accounts.locker_state;
    require_keys_eq!(
        ctx.accounts.payer_token_account.mint,
        st.mint,
        LockerError::InvalidTokenMint
    );

    let user = &mut ctx.accounts.user_lock;
    if user.owner == Pubkey::default() {
        user.owner = ctx.accounts.owner.key();
        user.bump = ctx.bumps.user_lock;
    }

    let unlock_time = st.lock_core(user, amount, now)?;

    // Internal state is final before the external pull.
    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.payer_token_account.to_account_info(),
                to: ctx.accounts.vault.to_account_info(),
                authority: ctx.accounts.payer.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(TokensLocked {
        owner: user.owner,
        payer: ctx.accounts.payer.key(),
        amount,
        unlock_time,
        locked_amount: user.locked_amount,
        total_locked: st.total_locked,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Lock<'info> {
    #[account(mut, seeds = [b"locker_state"], bump)]
    pub locker_state: Account<'info, LockerState>,

    #[account(
        mut,
        seeds = [b"vault", locker_state.key().as_ref()],
        bump,
        constraint = vault.mint == locker_state.mint @ LockerError::InvalidTokenMint,
    )]
    pub vault: Account<'info, TokenAccount>,

    /// Holder the deposit is credited to; the payer funds it.
    /// CHECK: only used as the user lock PDA seed.
    pub owner: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + UserLock::SIZE,
        seeds = [b"user_lock", owner.key().as_ref()],
        bump
    )]
    pub user_lock: Account<'info, UserLock>,

    #[account(mut)]
    pub payer_token_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[event]
pub struct TokensLocked {
    pub owner: Pubkey,
    pub payer: Pubkey,
    pub amount: u64,
    pub unlock_time: i64,
    pub locked_amount: u64,
    pub total_locked: u64,
}
