use anchor_lang::prelude::*;

/// Custom error codes for the epoch locker program.
#[error_code]
pub enum LockerError {
    #[msg("Unauthorized: admin signature required")]
    Unauthorized,

    #[msg("Unauthorized: caller is not an approved distributor for this reward token")]
    UnauthorizedDistributor,

    #[msg("Invalid public key")]
    InvalidPubkey,

    #[msg("Invalid amount (must be > 0)")]
    InvalidAmount,

    #[msg("Locker is shut down")]
    SystemShutdown,

    #[msg("Locker is already shut down")]
    AlreadyShutdown,

    #[msg("No expired locks to process")]
    NothingToProcess,

    #[msg("Reward token already registered")]
    RewardTokenAlreadyAdded,

    #[msg("Reward token not registered")]
    RewardTokenNotFound,

    #[msg("The locked token cannot be registered as a reward token")]
    LockedTokenNotRewardable,

    #[msg("Reward token list is full")]
    RewardTokenListFull,

    #[msg("Distributor list is full")]
    DistributorListFull,

    #[msg("Kick incentive parameter out of range")]
    ParameterOutOfRange,

    #[msg("Epoch timeline is full")]
    EpochListFull,

    #[msg("Lock record list is full")]
    LockRecordListFull,

    #[msg("Invalid token mint")]
    InvalidTokenMint,

    #[msg("Invalid token account")]
    InvalidTokenAccount,

    #[msg("Invalid reward vault for this reward token")]
    InvalidRewardVault,

    #[msg("Missing reward vault / recipient account pair")]
    MissingRewardAccounts,

    #[msg("Math overflow")]
    MathOverflow,
}
