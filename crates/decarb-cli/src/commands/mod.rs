pub mod abatement;
pub mod inventory;
pub mod projects;
pub mod store;
pub mod strategy;
pub mod tracking;

use std::path::PathBuf;

use decarb_core::store::JsonFileStore;
use decarb_core::EngineConfig;

/// Settings shared by every command.
pub struct Context {
    pub engine: EngineConfig,
    pub store_dir: PathBuf,
}

impl Context {
    pub fn open_store(&self) -> Result<JsonFileStore, Box<dyn std::error::Error>> {
        Ok(JsonFileStore::open(&self.store_dir)?)
    }
}
