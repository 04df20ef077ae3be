use anyhow::Result;

pub mod replay;
pub mod script;
pub mod validate;

pub use replay::{ReplayCommand, ReplaySummary};
pub use script::{parse_script, ScriptCommand};
pub use validate::ValidateCommand;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}
