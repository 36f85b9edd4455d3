//! Agent lifecycle - start one task per agent, stop them all with a deadline.

use paddock_core::{stop_channel, Agent, AgentExit, AgentId, AgentReport, StopHandle};
use paddock_env::PaddockContext;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Outcome of a shutdown.
#[derive(Debug, Clone, Default)]
pub struct ShutdownReport {
    /// Reports from agents that stopped on their own
    pub reports: Vec<AgentReport>,

    /// Agents still running at the deadline, then aborted
    pub aborted: Vec<AgentId>,

    /// Agents whose task panicked
    pub panicked: Vec<AgentId>,
}

impl ShutdownReport {
    /// Number of agents that stopped cooperatively.
    pub fn stopped(&self) -> usize {
        self.reports.len()
    }

    /// True if any agent had to be aborted.
    pub fn forced(&self) -> bool {
        !self.aborted.is_empty()
    }

    /// Agents that stopped on a movement fault.
    pub fn faulted(&self) -> impl Iterator<Item = &AgentReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.exit, AgentExit::Faulted(_)))
    }
}

/// Owns the running agent tasks and the stop signal they share.
pub struct AgentScheduler {
    stop: StopHandle,
    tasks: Vec<(AgentId, JoinHandle<AgentReport>)>,
}

impl AgentScheduler {
    /// Spawns one task per agent.
    pub fn start<Ctx: PaddockContext>(ctx: &Arc<Ctx>, agents: Vec<Agent>) -> Self {
        let (stop, signal) = stop_channel();
        let tasks: Vec<_> = agents
            .into_iter()
            .map(|agent| {
                let id = agent.id();
                let name = format!("{}-{}", agent.kind(), id.0);
                let handle = ctx.spawn(&name, agent.run(Arc::clone(ctx), signal.clone()));
                (id, handle)
            })
            .collect();

        info!(agents = tasks.len(), "agents started");
        Self { stop, tasks }
    }

    /// Number of managed tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Raises the stop signal, waits up to `timeout` for every agent, then
    /// aborts the rest.
    pub async fn shutdown(self, timeout: Duration) -> ShutdownReport {
        self.stop.stop();
        let deadline = tokio::time::Instant::now() + timeout;
        let mut report = ShutdownReport::default();

        for (id, mut handle) in self.tasks {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(agent_report)) => report.reports.push(agent_report),
                Ok(Err(err)) => {
                    warn!(agent = %id, "agent task failed: {}", err);
                    report.panicked.push(id);
                }
                Err(_) => {
                    handle.abort();
                    report.aborted.push(id);
                }
            }
        }

        if report.forced() {
            warn!(aborted = report.aborted.len(), "forcing shutdown of unresponsive agents");
        }
        info!(
            stopped = report.stopped(),
            aborted = report.aborted.len(),
            panicked = report.panicked.len(),
            "agents shut down"
        );
        report
    }
}
