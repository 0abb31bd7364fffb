mod event;
mod sink;

use std::sync::Arc;

pub use event::*;
pub use sink::*;

/// Shared handle to an event sink.
pub type EventSinkHandle = Arc<dyn EventSink>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink() {
        let sink = NullSink;
        sink.emit(PkgdexEvent::Log {
            level: LogLevel::Info,
            message: "test".to_string(),
        });
    }

    #[test]
    fn test_channel_sink() {
        let (sink, rx) = ChannelSink::new();
        sink.emit(PkgdexEvent::SyncProgress {
            repo_name: "rewpkgs".to_string(),
            stage: SyncStage::Resolving,
        });
        sink.emit(PkgdexEvent::BatchProgress {
            repo_name: "rewpkgs".to_string(),
            completed: 1,
            total: 2,
            skipped: 0,
        });
        sink.report(Failure::new(
            FailureKind::Network,
            "https://example.com/main.yaml",
            "connection refused",
        ));

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);

        assert!(matches!(
            &events[0],
            PkgdexEvent::SyncProgress {
                stage: SyncStage::Resolving,
                ..
            }
        ));
        assert!(matches!(
            &events[1],
            PkgdexEvent::BatchProgress {
                completed: 1,
                ..
            }
        ));
        assert!(matches!(
            &events[2],
            PkgdexEvent::Failure(Failure {
                kind: FailureKind::Network,
                ..
            })
        ));
    }

    #[test]
    fn test_channel_sink_receiver_dropped() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(PkgdexEvent::Log {
            level: LogLevel::Info,
            message: "orphaned".to_string(),
        });
    }

    #[test]
    fn test_collector_sink_filters_failures() {
        let sink = CollectorSink::default();
        assert!(sink.is_empty());

        sink.emit(PkgdexEvent::SyncProgress {
            repo_name: "r1".to_string(),
            stage: SyncStage::Complete {
                package_count: 3,
                skipped: 1,
            },
        });
        sink.report(Failure::new(FailureKind::Parse, "m.json", "expected value"));
        sink.report(Failure::new(
            FailureKind::MalformedSourceLocation,
            "pkg",
            "npm:pkg",
        ));

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.failures().len(), 2);

        let parse = sink.failures_of(FailureKind::Parse);
        assert_eq!(parse.len(), 1);
        assert_eq!(parse[0].subject, "m.json");
    }

    #[test]
    fn test_event_sink_handle() {
        let collector = Arc::new(CollectorSink::default());
        let sink: EventSinkHandle = collector.clone();
        sink.emit(PkgdexEvent::SyncProgress {
            repo_name: "r1".to_string(),
            stage: SyncStage::Cancelled,
        });
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_failure_display() {
        let failure = Failure::new(FailureKind::CyclicInclude, "https://a/m.json", "a -> a");
        assert_eq!(
            failure.to_string(),
            "https://a/m.json (cyclic include): a -> a"
        );
        assert_eq!(failure.level, LogLevel::Warning);
        assert_eq!(
            failure.with_level(LogLevel::Debug).level,
            LogLevel::Debug
        );
    }

    #[test]
    fn test_event_sink_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NullSink>();
        assert_send_sync::<ChannelSink>();
        assert_send_sync::<CollectorSink>();
    }
}
