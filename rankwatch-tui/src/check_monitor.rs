use rankwatch_core::check::{CheckEvent, CheckSummary, RankChecker};
use rankwatch_core::credentials::SharedCredentials;
use rankwatch_core::model::Project;
use rankwatch_lookup::RankLookup;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Message types for communication between a background check and the TUI
#[derive(Debug, Clone)]
pub enum CheckMessage {
    /// The project changed; `project` is the full snapshot after `event`
    Progress { project: Project, event: CheckEvent },
    /// The run is over
    Finished {
        project_id: String,
        result: Result<CheckSummary, String>,
    },
}

/// Create a channel pair for check monitoring
pub fn create_monitor_channel() -> (
    mpsc::UnboundedSender<CheckMessage>,
    mpsc::UnboundedReceiver<CheckMessage>,
) {
    mpsc::unbounded_channel()
}

/// Runs one check on the runtime behind `handle`, reporting through `tx`.
pub fn spawn_check(
    handle: &Handle,
    lookup: Arc<dyn RankLookup>,
    credentials: SharedCredentials,
    project: Project,
    tx: mpsc::UnboundedSender<CheckMessage>,
) {
    handle.spawn(async move {
        let project_id = project.id.clone();
        let progress_tx = tx.clone();
        let checker = RankChecker::new(lookup).with_progress_callback(Arc::new(
            move |project: &Project, event: &CheckEvent| {
                let _ = progress_tx.send(CheckMessage::Progress {
                    project: project.clone(),
                    event: event.clone(),
                });
            },
        ));

        let mut project = project;
        let result = checker
            .check_project(&mut project, credentials.as_ref())
            .await
            .map_err(|e| e.to_string());

        let _ = tx.send(CheckMessage::Finished { project_id, result });
    });
}
