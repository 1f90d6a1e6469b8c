//! Transaction building, signing, and submission

mod gas;
mod submitter;

pub use gas::GasPolicy;
pub use submitter::{Deployment, TransactionSubmitter};
