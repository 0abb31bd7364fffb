use std::{
    collections::HashMap,
    sync::{mpsc::Receiver, Arc, LazyLock},
    time::Duration,
};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use nu_ansi_term::{
    Color::{Cyan, Green, Red},
    Style,
};
use pkgdex_events::{EventSink, Failure, LogLevel, PkgdexEvent, SyncStage};
use tracing::{debug, error, info, warn};

use crate::utils::progress_enabled;

/// Shared MultiProgress instance for suspend/stop from other modules.
static MULTI: LazyLock<Arc<MultiProgress>> = LazyLock::new(|| Arc::new(MultiProgress::new()));

/// Pause progress display, run the closure, then resume.
pub fn suspend<F: FnOnce()>(f: F) {
    MULTI.suspend(f);
}

/// Stop and clear all progress bars.
pub fn stop() {
    MULTI.clear().ok();
}

/// Owns the background thread started by [`spawn_event_handler`].
///
/// The context holding the channel sender must be dropped before
/// [`finish`](ProgressGuard::finish), otherwise the join never returns.
pub struct ProgressGuard {
    handle: Option<std::thread::JoinHandle<()>>,
}

impl ProgressGuard {
    pub fn finish(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = if progress_enabled() {
        MULTI.add(ProgressBar::new_spinner())
    } else {
        MULTI.add(ProgressBar::hidden())
    };
    pb.set_style(spinner_style());
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Spinner text for the in-flight sync stages.
fn stage_message(repo_name: &str, stage: &SyncStage) -> Option<String> {
    match stage {
        SyncStage::Resolving => Some(format!("{repo_name}: resolving manifest")),
        SyncStage::FetchingMetadata { package_count } => {
            Some(format!("{repo_name}: fetching metadata (0/{package_count})"))
        }
        SyncStage::WritingStore => Some(format!("{repo_name}: writing store")),
        SyncStage::Complete { .. } | SyncStage::Cancelled => None,
    }
}

fn batch_message(repo_name: &str, completed: u32, total: u32, skipped: u32) -> String {
    let skip_msg = if skipped > 0 {
        format!(", {skipped} skipped")
    } else {
        String::new()
    };
    format!("{repo_name}: fetching metadata ({completed}/{total}{skip_msg})")
}

fn completion_status(package_count: u32, skipped: u32) -> String {
    if skipped > 0 {
        format!("synced {package_count} packages ({skipped} skipped)")
    } else {
        format!("synced {package_count} packages")
    }
}

pub fn log_failure(failure: &Failure) {
    log_message(failure.level, &failure.to_string());
}

fn log_message(level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => debug!("{message}"),
        LogLevel::Info => info!("{message}"),
        LogLevel::Warning => warn!("{message}"),
        LogLevel::Error => error!("{message}"),
    }
}

/// Sink used when spinners are disabled: events go straight to the log.
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: PkgdexEvent) {
        match event {
            PkgdexEvent::SyncProgress {
                repo_name,
                stage: SyncStage::Complete {
                    package_count,
                    skipped,
                },
            } => info!("[{repo_name}] {}", completion_status(package_count, skipped)),
            PkgdexEvent::SyncProgress {
                repo_name,
                stage: SyncStage::Cancelled,
            } => warn!("[{repo_name}] sync cancelled"),
            PkgdexEvent::SyncProgress {
                repo_name,
                stage,
            } => {
                if let Some(msg) = stage_message(&repo_name, &stage) {
                    debug!("{msg}");
                }
            }
            PkgdexEvent::BatchProgress { .. } => {}
            PkgdexEvent::Failure(failure) => log_failure(&failure),
            PkgdexEvent::Log {
                level,
                message,
            } => log_message(level, &message),
        }
    }
}

/// Spawns a thread that maps [`PkgdexEvent`]s onto one spinner per repository.
pub fn spawn_event_handler(receiver: Receiver<PkgdexEvent>) -> ProgressGuard {
    let handle = std::thread::spawn(move || {
        let mut sync_jobs: HashMap<String, ProgressBar> = HashMap::new();

        while let Ok(event) = receiver.recv() {
            match event {
                PkgdexEvent::SyncProgress {
                    repo_name,
                    stage,
                } => {
                    match stage {
                        SyncStage::Complete {
                            package_count,
                            skipped,
                        } => {
                            if let Some(pb) = sync_jobs.remove(&repo_name) {
                                pb.finish_and_clear();
                            }
                            let status = completion_status(package_count, skipped);
                            MULTI.suspend(|| {
                                eprintln!(
                                    " {} {}: {}",
                                    Green.paint("✓"),
                                    Cyan.paint(&repo_name),
                                    Style::new().dimmed().paint(status)
                                );
                            });
                        }
                        SyncStage::Cancelled => {
                            if let Some(pb) = sync_jobs.remove(&repo_name) {
                                pb.finish_and_clear();
                            }
                            MULTI.suspend(|| {
                                eprintln!(
                                    " {} {}: {}",
                                    Red.paint("✗"),
                                    Cyan.paint(&repo_name),
                                    Red.paint("cancelled")
                                );
                            });
                        }
                        _ => {
                            if let Some(msg) = stage_message(&repo_name, &stage) {
                                let pb = sync_jobs
                                    .entry(repo_name)
                                    .or_insert_with(|| create_spinner(&msg));
                                pb.set_message(msg);
                            }
                        }
                    }
                }
                PkgdexEvent::BatchProgress {
                    repo_name,
                    completed,
                    total,
                    skipped,
                } => {
                    let msg = batch_message(&repo_name, completed, total, skipped);
                    let pb = sync_jobs
                        .entry(repo_name)
                        .or_insert_with(|| create_spinner(&msg));
                    pb.set_message(msg);
                }
                PkgdexEvent::Failure(failure) => log_failure(&failure),
                PkgdexEvent::Log {
                    level,
                    message,
                } => log_message(level, &message),
            }
        }

        for (_, pb) in sync_jobs {
            pb.finish_and_clear();
        }
    });

    ProgressGuard {
        handle: Some(handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_messages() {
        assert_eq!(
            stage_message("r1", &SyncStage::FetchingMetadata { package_count: 3 }).as_deref(),
            Some("r1: fetching metadata (0/3)")
        );
        assert!(stage_message("r1", &SyncStage::Cancelled).is_none());
        assert_eq!(
            batch_message("r1", 2, 3, 1),
            "r1: fetching metadata (2/3, 1 skipped)"
        );
    }

    #[test]
    fn test_completion_status() {
        assert_eq!(completion_status(4, 0), "synced 4 packages");
        assert_eq!(completion_status(4, 2), "synced 4 packages (2 skipped)");
    }

    #[test]
    fn test_handler_drains_and_exits() {
        let (sender, receiver) = std::sync::mpsc::channel();
        let guard = spawn_event_handler(receiver);
        sender
            .send(PkgdexEvent::BatchProgress {
                repo_name: "r1".into(),
                completed: 1,
                total: 2,
                skipped: 0,
            })
            .unwrap();
        sender
            .send(PkgdexEvent::SyncProgress {
                repo_name: "r1".into(),
                stage: SyncStage::Complete {
                    package_count: 2,
                    skipped: 0,
                },
            })
            .unwrap();
        drop(sender);
        guard.finish();
    }
}
