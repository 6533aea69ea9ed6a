use crate::credentials::CredentialSource;
use crate::error::{CoreError, Result};
use crate::model::{KeywordResult, Project};
use indicatif::{ProgressBar, ProgressStyle};
use rankwatch_lookup::{RankLookup, RankQuery};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stored on a keyword when the key set was empty by the time it was reached.
pub const ALL_KEYS_FAILED: &str = "All available API keys failed.";

/// Index of the key the next attempt will use.
///
/// It survives from one keyword to the next: a key that just worked is tried
/// first for the following keyword, and only failures move it forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationCursor {
    index: usize,
}

impl RotationCursor {
    pub fn at(index: usize) -> Self {
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Position within a set of `len` keys; the set may have shrunk since the last use.
    pub fn position(&self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.index % len)
        }
    }

    pub fn advance(self, len: usize) -> Self {
        match self.position(len) {
            Some(pos) => Self {
                index: (pos + 1) % len,
            },
            None => self,
        }
    }
}

/// What happened while resolving one keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordResolution {
    pub result: KeywordResult,
    pub cursor: RotationCursor,
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckEvent {
    /// Published before the first lookup for the keyword.
    KeywordStarted { index: usize, keyword: String },
    /// Published as soon as the keyword has an outcome or an error.
    KeywordFinished {
        index: usize,
        result: KeywordResult,
        attempts: usize,
    },
}

impl CheckEvent {
    pub fn index(&self) -> usize {
        match self {
            CheckEvent::KeywordStarted { index, .. } | CheckEvent::KeywordFinished { index, .. } => {
                *index
            }
        }
    }
}

/// Receives the whole project after every change together with what changed.
pub type CheckProgressCallback = Arc<dyn Fn(&Project, &CheckEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub checked: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub attempts: usize,
}

pub struct RankChecker {
    lookup: Arc<dyn RankLookup>,
    progress_callback: Option<CheckProgressCallback>,
}

impl RankChecker {
    pub fn new(lookup: Arc<dyn RankLookup>) -> Self {
        Self {
            lookup,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: CheckProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn publish(&self, project: &Project, event: CheckEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(project, &event);
        }
    }

    /// One sequential pass over every keyword of `project`.
    ///
    /// Keys are re-read from `credentials` before each keyword, so edits made
    /// while a run is in progress take effect from the next keyword on.
    pub async fn check_project<C: CredentialSource + ?Sized>(
        &self,
        project: &mut Project,
        credentials: &C,
    ) -> Result<CheckSummary> {
        if credentials.snapshot().is_empty() {
            return Err(CoreError::NoCredentials);
        }
        if !project.is_aligned() {
            return Err(CoreError::MisalignedResults {
                id: project.id.clone(),
                keywords: project.keywords.len(),
                results: project.results.len(),
            });
        }

        info!(
            "Checking {} keywords for {} ({})",
            project.keywords.len(),
            project.domain,
            project.id
        );

        let mut summary = CheckSummary::default();
        let mut cursor = RotationCursor::default();

        for index in 0..project.keywords.len() {
            let keyword = project.keywords[index].clone();

            project.results[index].mark_loading();
            self.publish(
                project,
                CheckEvent::KeywordStarted {
                    index,
                    keyword: keyword.clone(),
                },
            );

            let keys = credentials.snapshot();
            let query = project.query_for(&keyword);
            let resolution = self.resolve_keyword(&query, &keys, cursor).await;

            cursor = resolution.cursor;
            summary.checked += 1;
            summary.attempts += resolution.attempts;
            if resolution.result.error.is_some() {
                summary.failed += 1;
            } else {
                summary.succeeded += 1;
            }

            project.results[index] = resolution.result.clone();
            self.publish(
                project,
                CheckEvent::KeywordFinished {
                    index,
                    result: resolution.result,
                    attempts: resolution.attempts,
                },
            );
        }

        info!(
            "Check of {} finished: {} succeeded, {} failed, {} lookups",
            project.id, summary.succeeded, summary.failed, summary.attempts
        );
        Ok(summary)
    }

    /// Tries each key at most once, starting at `cursor`.
    ///
    /// Success leaves the cursor on the key that worked. Each failure moves it
    /// one step round the ring. If every key fails the last failure is kept.
    pub async fn resolve_keyword(
        &self,
        query: &RankQuery,
        keys: &[String],
        mut cursor: RotationCursor,
    ) -> KeywordResolution {
        let mut last_error: Option<String> = None;
        let mut attempts = 0;

        for _ in 0..keys.len() {
            let Some(position) = cursor.position(keys.len()) else {
                break;
            };
            attempts += 1;

            match self.lookup.lookup_rank(query, &keys[position]).await {
                Ok(outcome) => {
                    debug!("Key #{} answered for \"{}\"", position, query.keyword);
                    return KeywordResolution {
                        result: KeywordResult::succeeded(&query.keyword, outcome),
                        cursor,
                        attempts,
                    };
                }
                Err(e) => {
                    warn!(
                        "API key at index {} failed for keyword \"{}\". Trying next key.",
                        position, query.keyword
                    );
                    last_error = Some(e.to_string());
                    cursor = cursor.advance(keys.len());
                }
            }
        }

        KeywordResolution {
            result: KeywordResult::failed(
                &query.keyword,
                last_error.unwrap_or_else(|| ALL_KEYS_FAILED.to_string()),
            ),
            cursor,
            attempts,
        }
    }
}

/// Options for a check started from a front end
pub struct CheckOptions {
    pub show_progress_bar: bool,
}

/// Runs a check, optionally drawing a progress bar, and forwards every event to `progress_callback`.
pub async fn execute_check<C: CredentialSource + ?Sized>(
    lookup: Arc<dyn RankLookup>,
    project: &mut Project,
    credentials: &C,
    options: CheckOptions,
    progress_callback: Option<CheckProgressCallback>,
) -> Result<CheckSummary> {
    let progress_bar = if options.show_progress_bar {
        let pb = ProgressBar::new(project.keywords.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        pb.set_style(style);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(Arc::new(pb))
    } else {
        None
    };

    let bar = progress_bar.clone();
    let forward = progress_callback.clone();
    let callback: CheckProgressCallback = Arc::new(move |project: &Project, event: &CheckEvent| {
        if let Some(ref pb) = bar {
            match event {
                CheckEvent::KeywordStarted { keyword, .. } => {
                    pb.set_message(format!("checking \"{}\"", keyword));
                }
                CheckEvent::KeywordFinished { .. } => pb.inc(1),
            }
        }
        if let Some(ref cb) = forward {
            cb(project, event);
        }
    });

    let checker = RankChecker::new(lookup).with_progress_callback(callback);
    let result = checker.check_project(project, credentials).await;

    if let Some(ref pb) = progress_bar {
        match &result {
            Ok(summary) => pb.finish_with_message(format!(
                "done: {} succeeded, {} failed",
                summary.succeeded, summary.failed
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    result
}
