pub mod audit;
pub mod conflict_state;
pub mod issue;
pub mod period;
pub mod period_status;
pub mod record;
