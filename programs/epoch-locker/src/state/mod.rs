pub mod locker_state;
pub mod user_lock;

pub use locker_state::*;
pub use user_lock::*;
