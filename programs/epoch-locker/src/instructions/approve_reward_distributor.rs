use anchor_lang::prelude::*;

use crate::constants::MAX_DISTRIBUTORS;
use crate::error::LockerError;
use crate::state::LockerState;

pub fn approve_reward_distributor(
    ctx: Context<ApproveRewardDistributor>,
    token: Pubkey,
    distributor: Pubkey,
    approved: bool,
) -> Result<()> {
    require!(distributor != Pubkey::default(), LockerError::InvalidPubkey);

    let st = &mut ctx.accounts.locker_state;
    require_keys_eq!(
        ctx.accounts.admin.key(),
        st.admin,
        LockerError::Unauthorized
    );

    let index = st
        .find_reward_index(&token)
        .ok_or(LockerError::RewardTokenNotFound)?;
    let stream = &mut st.rewards[index];
    if approved {
        if !stream.distributors.contains(&distributor) {
            require!(
                stream.distributors.len() < MAX_DISTRIBUTORS,
                LockerError::DistributorListFull
            );
            stream.distributors.push(distributor);
        }
    } else {
        stream.distributors.retain(|d| *d != distributor);
    }

    emit!(DistributorApprovalSet {
        token,
        distributor,
        approved,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct ApproveRewardDistributor<'info> {
    #[account(mut, seeds = [b"locker_state"], bump)]
    pub locker_state: Account<'info, LockerState>,

    pub admin: Signer<'info>,
}

#[event]
pub struct DistributorApprovalSet {
    pub token: Pubkey,
    pub distributor: Pubkey,
    pub approved: bool,
}
