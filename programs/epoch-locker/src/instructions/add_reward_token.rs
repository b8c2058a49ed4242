use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::error::LockerError;
use crate::state::LockerState;

/// Register a reward stream and create its vault. The locked token itself is
/// not rewardable; duplicates are rejected.
pub fn add_reward_token(ctx: Context<AddRewardToken>, distributor: Pubkey) -> Result<()> {
    require!(distributor != Pubkey::default(), LockerError::InvalidPubkey);

    let st = &mut ctx.accounts.locker_state;
    require_keys_eq!(
        ctx.accounts.admin.key(),
        st.admin,
        LockerError::Unauthorized
    );

    let now = Clock::get()?.unix_timestamp;
    let token = ctx.accounts.reward_mint.key();
    st.add_reward_stream(token, distributor, now)?;

    emit!(RewardTokenAdded {
        token,
        distributor,
        reward_token_count: st.rewards.len() as u8,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct AddRewardToken<'info> {
    #[account(mut, seeds = [b"locker_state"], bump)]
    pub locker_state: Account<'info, LockerState>,

    pub reward_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = admin,
        token::mint = reward_mint,
        token::authority = locker_state,
        seeds = [b"reward_vault", locker_state.key().as_ref(), reward_mint.key().as_ref()],
        bump
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[event]
pub struct RewardTokenAdded {
    pub token: Pubkey,
    pub distributor: Pubkey,
    pub reward_token_count: u8,
}
