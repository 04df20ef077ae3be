use anyhow::Result;
use std::path::PathBuf;

use super::Command;
use crate::catalog::StepCatalog;

pub struct ValidateCommand {
    pub catalog: PathBuf,
}

impl ValidateCommand {
    pub fn new(catalog: PathBuf) -> Self {
        Self { catalog }
    }
}

impl Command for ValidateCommand {
    async fn execute(&self) -> Result<()> {
        let catalog = StepCatalog::load(&self.catalog)?;

        println!("✅ {}: {} steps", self.catalog.display(), catalog.size());
        for (index, step) in catalog.steps().iter().enumerate() {
            let title = step.title.as_deref().unwrap_or("(untitled)");
            println!("  [{index}] {} {title} ({:?})", step.target, step.placement);
        }
        Ok(())
    }
}
