//! AnalysisHost: shared index state and background analyses.
//!
//! The host owns the symbol index behind a read-write lock. Analyses take a
//! read guard for their whole run, so they always see one consistent
//! snapshot; updates take the write guard and wait for running analyses to
//! finish.
//!
//! ## Usage
//!
//! ```ignore
//! let host = AnalysisHost::new(index);
//!
//! // Synchronous, on the caller's thread
//! let tree = host.snapshot().call_hierarchy(&seed, &CancellationToken::new())?;
//!
//! // In the background, cancellable from the UI thread
//! let task = host.spawn_call_hierarchy(seed);
//! task.cancel();
//! assert!(task.join().unwrap_err().is_cancelled());
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use indexmap::IndexSet;
use parking_lot::{RwLock, RwLockReadGuard};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::config::AnalysisConfig;
use super::error::{AnalysisError, AnalysisResult};
use super::relations::MappingRelation;
use super::tree::CallNode;
use super::{analyze_call_hierarchy, analyze_mapping_relations};
use crate::hir::{FieldRef, SymbolIndex};

/// Owns the index and the configuration analyses run with.
pub struct AnalysisHost<I> {
    index: Arc<RwLock<I>>,
    config: AnalysisConfig,
}

impl<I: SymbolIndex> AnalysisHost<I> {
    pub fn new(index: I) -> Self {
        Self {
            index: Arc::new(RwLock::new(index)),
            config: AnalysisConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.config = config;
    }

    /// Mutate the index. Blocks until running analyses release it.
    pub fn update<R>(&self, f: impl FnOnce(&mut I) -> R) -> R {
        let mut guard = self.index.write();
        f(&mut *guard)
    }

    /// A consistent view for synchronous queries.
    pub fn snapshot(&self) -> Snapshot<'_, I> {
        Snapshot {
            index: self.index.read(),
            config: &self.config,
        }
    }
}

impl<I: SymbolIndex + Send + Sync + 'static> AnalysisHost<I> {
    /// Build a call hierarchy on a background thread.
    pub fn spawn_call_hierarchy(&self, seed: FieldRef) -> AnalysisTask<CallNode> {
        self.spawn(move |index, config, cancel| {
            analyze_call_hierarchy(index, &seed, config, cancel)
        })
    }

    /// Resolve mapping relations on a background thread.
    pub fn spawn_mapping_relations(
        &self,
        seed: FieldRef,
    ) -> AnalysisTask<IndexSet<MappingRelation>> {
        self.spawn(move |index, config, cancel| {
            analyze_mapping_relations(index, &seed, config, cancel)
        })
    }

    fn spawn<T, F>(&self, job: F) -> AnalysisTask<T>
    where
        T: Send + 'static,
        F: FnOnce(&I, &AnalysisConfig, &CancellationToken) -> AnalysisResult<T> + Send + 'static,
    {
        let index = Arc::clone(&self.index);
        let config = self.config.clone();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = thread::spawn(move || {
            let guard = index.read();
            job(&*guard, &config, &token)
        });
        AnalysisTask { cancel, handle }
    }
}

/// A read-locked view of the host's index.
pub struct Snapshot<'h, I> {
    index: RwLockReadGuard<'h, I>,
    config: &'h AnalysisConfig,
}

impl<I: SymbolIndex> Snapshot<'_, I> {
    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn mapping_relations(
        &self,
        seed: &FieldRef,
        cancel: &CancellationToken,
    ) -> AnalysisResult<IndexSet<MappingRelation>> {
        analyze_mapping_relations(&*self.index, seed, self.config, cancel)
    }

    pub fn call_hierarchy(
        &self,
        seed: &FieldRef,
        cancel: &CancellationToken,
    ) -> AnalysisResult<CallNode> {
        analyze_call_hierarchy(&*self.index, seed, self.config, cancel)
    }
}

/// Handle to a background analysis.
pub struct AnalysisTask<T> {
    cancel: CancellationToken,
    handle: JoinHandle<AnalysisResult<T>>,
}

impl<T> AnalysisTask<T> {
    /// Request cancellation. The analysis stops at its next check.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the result.
    pub fn join(self) -> AnalysisResult<T> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => {
                warn!("analysis thread panicked");
                Err(AnalysisError::fault("analysis thread panicked"))
            }
        }
    }
}
