use anchor_lang::prelude::*;

use crate::error::LockerError;
use crate::state::LockerState;

/// One-way shutdown: blocks new deposits and lets every holder withdraw
/// immediately through the fast expiry path.
pub fn shutdown(ctx: Context<Shutdown>) -> Result<()> {
    let st = &mut ctx.accounts.locker_state;
    require_keys_eq!(
        ctx.accounts.admin.key(),
        st.admin,
        LockerError::Unauthorized
    );
    require!(!st.is_shutdown, LockerError::AlreadyShutdown);

    let now = Clock::get()?.unix_timestamp;
    st.checkpoint_epochs(now)?;
    st.settle_rewards(None, now)?;
    st.is_shutdown = true;

    emit!(LockerShutdown {
        admin: st.admin,
        total_locked: st.total_locked,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Shutdown<'info> {
    #[account(mut, seeds = [b"locker_state"], bump)]
    pub locker_state: Account<'info, LockerState>,

    pub admin: Signer<'info>,
}

#[event]
pub struct LockerShutdown {
    pub admin: Pubkey,
    pub total_locked: u64,
}
