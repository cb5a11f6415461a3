//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{OrderingService, OutlineService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::OrderKeyEngine;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    engine: OrderKeyEngine,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> ApplicationResult<Self> {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    ///
    /// Fails if the configured key alphabet is invalid.
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> ApplicationResult<Self> {
        let engine = settings.engine()?;
        Ok(Self {
            settings: Arc::new(settings),
            fs,
            engine,
        })
    }

    pub fn engine(&self) -> OrderKeyEngine {
        self.engine
    }

    pub fn outline_service(&self) -> OutlineService {
        OutlineService::new(Arc::clone(&self.fs), self.engine)
    }

    pub fn ordering_service(&self) -> OrderingService {
        OrderingService::new(self.engine)
    }
}
