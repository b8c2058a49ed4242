use anchor_lang::prelude::*;

use crate::state::LockerState;

/// Permissionless timeline crank: fills any gap epochs up to now. Calling it
/// twice inside one epoch is a no-op.
pub fn checkpoint_epochs(ctx: Context<CheckpointEpochs>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let st = &mut ctx.accounts.locker_state;
    st.checkpoint_epochs(now)?;

    emit!(EpochsCheckpointed {
        epoch_count: st.epochs.len() as u32,
        latest_epoch_start: st.epochs[st.epochs.len() - 1].start_time,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct CheckpointEpochs<'info> {
    #[account(mut, seeds = [b"locker_state"], bump)]
    pub locker_state: Account<'info, LockerState>,
}

#[event]
pub struct EpochsCheckpointed {
    pub epoch_count: u32,
    pub latest_epoch_start: i64,
}
