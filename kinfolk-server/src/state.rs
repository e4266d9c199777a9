use std::sync::Arc;

use anyhow::Result;
use kinfolk_core::{Kinfolk, KinfolkConfig};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    kinfolk: Arc<Kinfolk>,
}

impl AppState {
    pub fn new(config: KinfolkConfig) -> Result<Self> {
        Ok(AppState {
            kinfolk: Arc::new(Kinfolk::open(config)?),
        })
    }

    pub fn kinfolk(&self) -> &Kinfolk {
        &self.kinfolk
    }
}
