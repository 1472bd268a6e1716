use std::{cell::Cell, fmt};

use serde::Serialize;
use tracing::debug;

use crate::{
    activate::{activate, SweepReport},
    config::ShimConfig,
    install::{install, InstallReport},
    intercept::{intercept, Interception},
    store::{Network, RequestOf, ResponseOf, StoreManager},
    Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Installing,
    /// Installed and waiting for the host to activate it
    Installed,
    Activating,
    Active,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Active => "active",
        })
    }
}

/// The lifecycle signals the host sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Install,
    Activate,
    Fetch,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Fetch => "intercept fetches for",
        })
    }
}

/// One worker instance: the handlers plus the state the host has moved it
/// through.
///
/// Events are dispatched on a single thread, so the state is a plain `Cell`.
///
/// This is the native host's model of the lifecycle. The wasm worker calls
/// the `install`, `activate` and `intercept` handlers directly instead,
/// because the browser may stop and restart it between events and nothing
/// held in memory survives that.
#[derive(Debug)]
pub struct OfflineShim<S, N> {
    storage: S,
    network: N,
    config: ShimConfig,
    state: Cell<WorkerState>,
}

impl<S, N> OfflineShim<S, N>
where
    S: StoreManager,
    N: Network<Request = RequestOf<S>, Response = ResponseOf<S>>,
{
    pub fn new(storage: S, network: N, config: ShimConfig) -> Self {
        Self {
            storage,
            network,
            config,
            state: Cell::new(WorkerState::Installing),
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state.get()
    }

    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    fn expect(&self, expected: WorkerState, phase: Phase) -> Result<(), Error> {
        let state = self.state.get();
        if state == expected {
            Ok(())
        } else {
            Err(Error::InvalidTransition { state, phase })
        }
    }

    fn transition(&self, to: WorkerState) {
        debug!("{} -> {to}", self.state.get());
        self.state.set(to);
    }

    /// A failed install leaves the worker installing so the host can retry
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.expect(WorkerState::Installing, Phase::Install)?;
        let report = install(&self.storage, &self.config).await?;
        self.transition(WorkerState::Installed);
        Ok(report)
    }

    pub async fn activate(&self) -> Result<SweepReport, Error> {
        self.expect(WorkerState::Installed, Phase::Activate)?;
        self.transition(WorkerState::Activating);

        match activate(&self.storage, &self.config).await {
            Ok(report) => {
                self.transition(WorkerState::Active);
                Ok(report)
            }
            Err(e) => {
                self.transition(WorkerState::Installed);
                Err(e)
            }
        }
    }

    pub async fn fetch(
        &self,
        request: &RequestOf<S>,
    ) -> Result<Interception<ResponseOf<S>>, Error> {
        self.expect(WorkerState::Active, Phase::Fetch)?;
        intercept(&self.storage, &self.network, &self.config, request).await
    }
}
