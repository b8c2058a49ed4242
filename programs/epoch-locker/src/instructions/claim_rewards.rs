use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::error::LockerError;
use crate::state::{LockerState, UserLock};

/// Pay out every stream with a nonzero accrued balance.
///
/// Remaining accounts carry one (reward vault, recipient token account) pair
/// per registered stream, in registration order; pairs for streams with
/// nothing accrued are validated but skipped.
pub fn claim_rewards<'info>(ctx: Context<'_, '_, 'info, 'info, ClaimRewards<'info>>) -> Result<()> {
    let locker_state_ai = ctx.accounts.locker_state.to_account_info();
    let locker_state_key = ctx.accounts.locker_state.key();
    let locker_state_bump = ctx.accounts.locker_state.bump;

    let now = Clock::get()?.unix_timestamp;
    let st = &mut ctx.accounts.locker_state;
    let user = &mut ctx.accounts.user_lock;

    // Freeze accruals; pads reward states to the full stream count.
    st.settle_rewards(Some(user), now)?;

    let signer_seeds: &[&[&[u8]]] = &[&[b"locker_state", &[locker_state_bump]]];
    for index in 0..st.rewards.len() {
        let token_mint = st.rewards[index].token;
        let vault_ai = ctx
            .remaining_accounts
            .get(2 * index)
            .ok_or(LockerError::MissingRewardAccounts)?;
        let recipient_ai = ctx
            .remaining_accounts
            .get(2 * index + 1)
            .ok_or(LockerError::MissingRewardAccounts)?;

        let (expected_vault, _) = Pubkey::find_program_address(
            &[
                b"reward_vault",
                locker_state_key.as_ref(),
                token_mint.as_ref(),
            ],
            &crate::ID,
        );
        require_keys_eq!(vault_ai.key(), expected_vault, LockerError::InvalidRewardVault);

        let amount = user.reward_states[index].rewards;
        if amount == 0 {
            continue;
        }

        let recipient = Account::<TokenAccount>::try_from(recipient_ai)?;
        require_keys_eq!(recipient.mint, token_mint, LockerError::InvalidTokenMint);
        require_keys_eq!(recipient.owner, user.owner, LockerError::InvalidTokenAccount);

        user.reward_states[index].rewards = 0;
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: vault_ai.clone(),
                    to: recipient_ai.clone(),
                    authority: locker_state_ai.clone(),
                },
                signer_seeds,
            ),
            amount,
        )?;

        emit!(RewardClaimed {
            owner: user.owner,
            token: token_mint,
            amount,
        });
    }

    Ok(())
}

#[derive(Accounts)]
pub struct ClaimRewards<'info> {
    #[account(mut, seeds = [b"locker_state"], bump)]
    pub locker_state: Account<'info, LockerState>,

    #[account(
        mut,
        seeds = [b"user_lock", owner.key().as_ref()],
        bump = user_lock.bump,
        constraint = user_lock.owner == owner.key() @ LockerError::Unauthorized,
    )]
    pub user_lock: Account<'info, UserLock>,

    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[event]
pub struct RewardClaimed {
    pub owner: Pubkey,
    pub token: Pubkey,
    pub amount: u64,
}
