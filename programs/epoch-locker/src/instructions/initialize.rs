use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::{
    DEFAULT_KICK_REWARD_EPOCH_DELAY, DEFAULT_KICK_REWARD_PER_EPOCH, EPOCH_DURATION, LOCK_DURATION,
};
use crate::state::LockerState;

pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let st = &mut ctx.accounts.locker_state;
    st.admin = ctx.accounts.admin.key();
    st.mint = ctx.accounts.mint.key();
    st.bump = ctx.bumps.locker_state;
    st.is_shutdown = false;
    st.epoch_duration = EPOCH_DURATION;
    st.lock_duration = LOCK_DURATION;
    st.kick_reward_per_epoch = DEFAULT_KICK_REWARD_PER_EPOCH;
    st.kick_reward_epoch_delay = DEFAULT_KICK_REWARD_EPOCH_DELAY;
    st.total_locked = 0;
    st.epochs = Vec::new();
    st.rewards = Vec::new();

    // Seeds the genesis epoch at the current boundary.
    st.checkpoint_epochs(now)?;

    emit!(LockerInitialized {
        mint: st.mint,
        admin: st.admin,
        epoch_duration: st.epoch_duration,
        lock_duration: st.lock_duration,
        genesis_epoch_start: st.epochs[0].start_time,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = admin,
        space = 8 + LockerState::SIZE,
        seeds = [b"locker_state"],
        bump
    )]
    pub locker_state: Account<'info, LockerState>,

    #[account(
        init,
        payer = admin,
        token::mint = mint,
        token::authority = locker_state,
        seeds = [b"vault", locker_state.key().as_ref()],
        bump
    )]
    pub vault: Account<'info, TokenAccount>,

    pub mint: Account<'info, Mint>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[event]
pub struct LockerInitialized {
    pub mint: Pubkey,
    pub admin: Pubkey,
    pub epoch_duration: i64,
    pub lock_duration: i64,
    pub genesis_epoch_start: i64,
}
