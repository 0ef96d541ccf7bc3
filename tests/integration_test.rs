//! End-to-end screening runs against mock quote sources and in-memory
//! stores.

mod common;

use common::*;
use trendwatch::adapters::memory_store::MemoryStore;
use trendwatch::domain::error::FetchErrorKind;
use trendwatch::domain::notification::NotificationKind;
use trendwatch::domain::screener::Screener;
use trendwatch::domain::trend::{CurrentTrend, HistoryKind};
use trendwatch::ports::store_port::TrendStateStore;

mod trend_transitions {
    use super::*;

    #[test]
    fn first_up_creates_state_and_history() {
        let end = date("2016-07-06");
        let source = MockQuoteSource::new().with_quotes("AMD", closes("AMD", end, &rising(60)));
        let store = MemoryStore::new();
        let config = screener_config(end, &["AMD"], &[]);

        let summary = Screener::new(&source, &store, &config).run();

        assert_eq!(summary.processed, 1);
        let state = store.get_state("AMD").unwrap().unwrap();
        assert!(state.up_trend);
        assert!(!state.down_trend);
        assert!(!state.heavy_volume_reversal);
        assert_eq!(state.trend_start_date, end);

        let history = store.list_history("AMD").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].trend_type, HistoryKind::Up);
        assert_eq!(
            summary.notifications.get("AMD").unwrap().kinds,
            vec![NotificationKind::Up]
        );
    }

    #[test]
    fn up_then_down_flips() {
        let store = MemoryStore::new();

        let day1 = date("2016-07-06");
        let source = MockQuoteSource::new().with_quotes("AMD", closes("AMD", day1, &rising(60)));
        Screener::new(&source, &store, &screener_config(day1, &["AMD"], &[])).run();

        let day2 = date("2016-07-07");
        let source = MockQuoteSource::new().with_quotes("AMD", closes("AMD", day2, &falling(60)));
        let summary = Screener::new(&source, &store, &screener_config(day2, &["AMD"], &[])).run();

        let state = store.get_state("AMD").unwrap().unwrap();
        assert_eq!(CurrentTrend::of(Some(&state)), CurrentTrend::Down);
        assert_eq!(state.trend_start_date, day2);

        let kinds: Vec<HistoryKind> = store
            .list_history("AMD")
            .unwrap()
            .iter()
            .map(|e| e.trend_type)
            .collect();
        assert_eq!(kinds, vec![HistoryKind::Up, HistoryKind::Down]);
        assert_eq!(
            summary.notifications.get("AMD").unwrap().kinds,
            vec![NotificationKind::Down]
        );
    }

    #[test]
    fn repeated_up_mutates_nothing() {
        let end = date("2016-07-06");
        let source = MockQuoteSource::new().with_quotes("AMD", closes("AMD", end, &rising(60)));
        let store = MemoryStore::new();
        let config = screener_config(end, &["AMD"], &[]);

        Screener::new(&source, &store, &config).run();
        let after_first = store.mutation_count();
        let summary = Screener::new(&source, &store, &config).run();

        assert_eq!(store.mutation_count(), after_first);
        assert!(summary.notifications.is_empty());
    }

    #[test]
    fn watchlist_repeat_notifies_without_mutation() {
        let end = date("2016-07-06");
        let source = MockQuoteSource::new().with_quotes("SPY", closes("SPY", end, &rising(60)));
        let store = MemoryStore::new();
        let config = screener_config(end, &["SPY"], &["SPY"]);

        Screener::new(&source, &store, &config).run();
        let after_first = store.mutation_count();
        let summary = Screener::new(&source, &store, &config).run();

        assert_eq!(store.mutation_count(), after_first);
        assert_eq!(
            summary.notifications.get("SPY").unwrap().kinds,
            vec![NotificationKind::ExistingUp]
        );
    }

    #[test]
    fn flat_series_is_neutral() {
        let end = date("2016-07-06");
        let source = MockQuoteSource::new().with_quotes("FLAT", closes("FLAT", end, &[4.0; 60]));
        let store = MemoryStore::new();
        let summary =
            Screener::new(&source, &store, &screener_config(end, &["FLAT"], &["FLAT"])).run();

        assert_eq!(summary.processed, 1);
        assert_eq!(store.mutation_count(), 0);
        assert!(summary.notifications.is_empty());
    }
}

mod heavy_volume_reversal {
    use super::*;

    #[test]
    fn reversal_with_first_up_on_same_day() {
        let end = date("2016-07-06");
        let source = MockQuoteSource::new()
            .with_quotes("HSTM", quote_series("HSTM", end, &reversal_days(60)));
        let store = MemoryStore::new();
        let summary =
            Screener::new(&source, &store, &screener_config(end, &["HSTM"], &[])).run();

        let state = store.get_state("HSTM").unwrap().unwrap();
        assert!(state.up_trend);
        assert!(state.heavy_volume_reversal);
        assert_eq!(state.trend_start_date, end);

        // Both events share (symbol, date); the reversal is written last.
        let history = store.list_history("HSTM").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].trend_type, HistoryKind::HeavyVolumeReversal);
        assert_eq!(summary.history_collisions, 1);

        assert_eq!(
            summary.notifications.get("HSTM").unwrap().kinds,
            vec![NotificationKind::Up, NotificationKind::HeavyVolumeReversal]
        );
    }

    #[test]
    fn reversal_is_recorded_every_time() {
        let store = MemoryStore::new();
        for end in [date("2016-07-06"), date("2016-07-07")] {
            let source = MockQuoteSource::new()
                .with_quotes("HSTM", quote_series("HSTM", end, &reversal_days(60)));
            let summary =
                Screener::new(&source, &store, &screener_config(end, &["HSTM"], &[])).run();
            assert!(summary
                .notifications
                .get("HSTM")
                .unwrap()
                .kinds
                .contains(&NotificationKind::HeavyVolumeReversal));
        }

        let history = store.list_history("HSTM").unwrap();
        assert_eq!(history.len(), 2);
        assert!(history
            .iter()
            .all(|e| e.trend_type == HistoryKind::HeavyVolumeReversal));
        let state = store.get_state("HSTM").unwrap().unwrap();
        assert_eq!(state.trend_start_date, date("2016-07-07"));
    }

    #[test]
    fn low_volume_jump_is_not_a_reversal() {
        let end = date("2016-07-06");
        let mut days = reversal_days(60);
        if let Some(last) = days.last_mut() {
            last.1 = 240_000;
        }
        let source = MockQuoteSource::new().with_quotes("HSTM", quote_series("HSTM", end, &days));
        let store = MemoryStore::new();
        let summary =
            Screener::new(&source, &store, &screener_config(end, &["HSTM"], &[])).run();

        assert!(!store.get_state("HSTM").unwrap().unwrap().heavy_volume_reversal);
        assert_eq!(
            summary.notifications.get("HSTM").unwrap().kinds,
            vec![NotificationKind::Up]
        );
    }
}

mod failure_isolation {
    use super::*;

    #[test]
    fn fetch_failures_counted_by_kind() {
        let end = date("2016-07-06");
        let source = MockQuoteSource::new()
            .with_error("BAD1", FetchErrorKind::Connection)
            .with_error("BAD2", FetchErrorKind::Type)
            .with_quotes("AMD", closes("AMD", end, &rising(60)));
        let store = MemoryStore::new();
        let summary = Screener::new(
            &source,
            &store,
            &screener_config(end, &["BAD1", "AMD", "BAD2", "GONE"], &[]),
        )
        .run();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.fetch_failures.get(&FetchErrorKind::Connection), Some(&1));
        assert_eq!(summary.fetch_failures.get(&FetchErrorKind::Type), Some(&1));
        assert_eq!(summary.fetch_failures.get(&FetchErrorKind::Index), Some(&1));
        assert_eq!(*source.calls.borrow(), vec!["BAD1", "AMD", "BAD2", "GONE"]);
    }

    #[test]
    fn short_history_is_skipped_without_touching_state() {
        let end = date("2016-07-06");
        let source = MockQuoteSource::new()
            .with_quotes("HSTM", quote_series("HSTM", end, &reversal_days(49)));
        let store = MemoryStore::new();
        let summary =
            Screener::new(&source, &store, &screener_config(end, &["HSTM"], &[])).run();

        assert_eq!(summary.skipped_insufficient, 1);
        assert_eq!(store.mutation_count(), 0);
        assert!(summary.notifications.is_empty());
    }

    #[test]
    fn store_failure_for_one_symbol_spares_the_rest() {
        let end = date("2016-07-06");
        let source = MockQuoteSource::new()
            .with_quotes("AMD", closes("AMD", end, &rising(60)))
            .with_quotes("NVDA", closes("NVDA", end, &falling(60)));
        let store = FailingStore::new(&["AMD"]);
        let summary =
            Screener::new(&source, &store, &screener_config(end, &["AMD", "NVDA"], &[])).run();

        assert_eq!(summary.store_failures, 1);
        assert_eq!(summary.processed, 1);
        assert!(summary.notifications.get("AMD").is_none());
        assert_eq!(
            summary.notifications.get("NVDA").unwrap().kinds,
            vec![NotificationKind::Down]
        );
    }

    #[test]
    fn failed_history_append_suppresses_notification() {
        let end = date("2016-07-06");
        let source = MockQuoteSource::new().with_quotes("AMD", closes("AMD", end, &rising(60)));
        let store = FailingStore::new(&["AMD"]).append_only();
        let summary =
            Screener::new(&source, &store, &screener_config(end, &["AMD"], &[])).run();

        assert_eq!(summary.store_failures, 1);
        assert!(summary.notifications.is_empty());
        // The state write landed before the history write failed.
        assert!(store.inner.get_state("AMD").unwrap().unwrap().up_trend);
        assert!(store.inner.list_history("AMD").unwrap().is_empty());
    }
}

mod series_input {
    use super::*;

    #[test]
    fn unordered_input_matches_ordered() {
        let end = date("2016-07-06");
        let ordered = closes("AMD", end, &rising(60));
        let mut shuffled = ordered.clone();
        shuffled.reverse();
        shuffled.swap(3, 40);

        let a = MemoryStore::new();
        let b = MemoryStore::new();
        let config = screener_config(end, &["AMD"], &[]);
        let sa = Screener::new(&MockQuoteSource::new().with_quotes("AMD", ordered), &a, &config).run();
        let sb = Screener::new(&MockQuoteSource::new().with_quotes("AMD", shuffled), &b, &config).run();

        assert_eq!(a.get_state("AMD").unwrap(), b.get_state("AMD").unwrap());
        assert_eq!(
            sa.notifications.get("AMD").unwrap().snapshot,
            sb.notifications.get("AMD").unwrap().snapshot
        );
    }

    #[test]
    fn malformed_records_are_dropped_not_fatal() {
        let end = date("2016-07-06");
        let mut quotes = closes("AMD", end, &rising(62));
        quotes[5].insert(KEY_CLOSE.to_string(), "N/A".to_string());
        quotes[9].remove(KEY_DATE);

        let store = MemoryStore::new();
        let summary = Screener::new(
            &MockQuoteSource::new().with_quotes("AMD", quotes),
            &store,
            &screener_config(end, &["AMD"], &[]),
        )
        .run();

        assert_eq!(summary.dropped_records, 2);
        assert_eq!(summary.processed, 1);
        assert!(store.get_state("AMD").unwrap().unwrap().up_trend);
    }

    #[test]
    fn snapshot_carries_latest_day() {
        let end = date("2016-07-06");
        let store = MemoryStore::new();
        let summary = Screener::new(
            &MockQuoteSource::new().with_quotes("AMD", closes("AMD", end, &rising(60))),
            &store,
            &screener_config(end, &["AMD"], &[]),
        )
        .run();

        let snapshot = &summary.notifications.get("AMD").unwrap().snapshot;
        assert_eq!(snapshot.date, end);
        approx::assert_relative_eq!(snapshot.close, 60.0);
        approx::assert_relative_eq!(snapshot.sma10, 55.5);
        assert!(snapshot.ema20 < snapshot.sma10);
    }
}
