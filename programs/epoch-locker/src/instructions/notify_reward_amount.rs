use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::error::LockerError;
use crate::state::LockerState;

/// Top up a reward stream. The global accumulator is settled against the old
/// rate first, then the new amount (plus any undistributed remainder of the
/// running period) streams out over the next epoch.
pub fn notify_reward_amount(ctx: Context<NotifyRewardAmount>, amount: u64) -> Result<()> {
    require!(amount > 0, LockerError::InvalidAmount);

    let now = Clock::get()?.unix_timestamp;
    let st = &mut ctx.accounts.locker_state;
    let token = ctx.accounts.reward_mint.key();
    let index = st
        .find_reward_index(&token)
        .ok_or(LockerError::RewardTokenNotFound)?;
    require!(
        st.rewards[index]
            .distributors
            .contains(&ctx.accounts.distributor.key()),
        LockerError::UnauthorizedDistributor
    );

    st.checkpoint_epochs(now)?;
    st.settle_rewards(None, now)?;
    st.notify_reward_core(index, amount, now)?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.distributor_token_account.to_account_info(),
                to: ctx.accounts.reward_vault.to_account_info(),
                authority: ctx.accounts.distributor.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(RewardNotified {
        token,
        distributor: ctx.accounts.distributor.key(),
        amount,
        reward_rate: st.rewards[index].reward_rate,
        period_finish: st.rewards[index].period_finish,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct NotifyRewardAmount<'info> {
    #[account(mut, seeds = [b"locker_state"], bump)]
    pub locker_state: Account<'info, LockerState>,

    pub reward_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [b"reward_vault", locker_state.key().as_ref(), reward_mint.key().as_ref()],
        bump,
        constraint = reward_vault.mint == reward_mint.key() @ LockerError::InvalidTokenMint,
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = distributor_token_account.mint == reward_mint.key() @ LockerError::InvalidTokenMint,
    )]
    pub distributor_token_account: Account<'info, TokenAccount>,

    pub distributor: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[event]
pub struct RewardNotified {
    pub token: Pubkey,
    pub distributor: Pubkey,
    pub amount: u64,
    pub reward_rate: u128,
    pub period_finish: i64,
}
