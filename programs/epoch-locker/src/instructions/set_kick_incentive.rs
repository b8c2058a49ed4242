use anchor_lang::prelude::*;

use crate::constants::{MAX_KICK_REWARD_PER_EPOCH, MIN_KICK_REWARD_EPOCH_DELAY};
use crate::error::LockerError;
use crate::state::LockerState;

pub fn set_kick_incentive(
    ctx: Context<SetKickIncentive>,
    rate_bps: u64,
    epoch_delay: u64,
) -> Result<()> {
    let st = &mut ctx.accounts.locker_state;
    require_keys_eq!(
        ctx.accounts.admin.key(),
        st.admin,
        LockerError::Unauthorized
    );
    require!(
        rate_bps <= MAX_KICK_REWARD_PER_EPOCH,
        LockerError::ParameterOutOfRange
    );
    require!(
        epoch_delay >= MIN_KICK_REWARD_EPOCH_DELAY,
        LockerError::ParameterOutOfRange
    );

    st.kick_reward_per_epoch = rate_bps;
    st.kick_reward_epoch_delay = epoch_delay;

    emit!(KickIncentiveSet {
        rate_bps,
        epoch_delay,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct SetKickIncentive<'info> {
    #[account(mut, seeds = [b"locker_state"], bump)]
    pub locker_state: Account<'info, LockerState>,

    pub admin: Signer<'info>,
}

#[event]
pub struct KickIncentiveSet {
    pub rate_bps: u64,
    pub epoch_delay: u64,
}
