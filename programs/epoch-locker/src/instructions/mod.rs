pub mod initialize;
pub mod lock;
pub mod withdraw_expired;
pub mod kick_expired;
pub mod claim_rewards;
pub mod add_reward_token;
pub mod approve_reward_distributor;
pub mod notify_reward_amount;
pub mod set_kick_incentive;
pub mod shutdown;
pub mod checkpoint_epochs;
pub mod emit_lock_status;

pub use initialize::*;
pub use lock::*;
pub use withdraw_expired::*;
pub use kick_expired::*;
pub use claim_rewards::*;
pub use add_reward_token::*;
pub use approve_reward_distributor::*;
pub use notify_reward_amount::*;
pub use set_kick_incentive::*;
pub use shutdown::*;
pub use checkpoint_epochs::*;
pub use emit_lock_status::*;
