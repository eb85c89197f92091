//! Unit tests for the risk crate

#[cfg(test)]
mod scoring_tests {
    use crate::application::config::RiskConfig;
    use crate::domain::services::{RiskSignals, assess};
    use crate::domain::value_objects::RiskLevel;

    fn aged_signals() -> RiskSignals {
        RiskSignals {
            account_age_hours: 48,
            ..RiskSignals::default()
        }
    }

    #[test]
    fn test_clean_user_scores_zero() {
        let assessment = assess(&aged_signals(), &RiskConfig::default());
        assert_eq!(assessment.score.value(), 0);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert!(!assessment.should_block);
        assert!(assessment.factors.is_empty());
    }

    #[test]
    fn test_device_count_threshold_is_exclusive() {
        let config = RiskConfig::default();

        let mut signals = aged_signals();
        signals.device_count = 3;
        assert_eq!(assess(&signals, &config).score.value(), 0);

        signals.device_count = 4;
        let assessment = assess(&signals, &config);
        assert_eq!(assessment.score.value(), 15);
        assert_eq!(assessment.factors, vec!["device_count"]);
    }

    #[test]
    fn test_shared_device_weight() {
        let mut signals = aged_signals();
        signals.shared_device = true;
        let assessment = assess(&signals, &RiskConfig::default());
        assert_eq!(assessment.score.value(), 25);
    }

    #[test]
    fn test_crowded_ip_weight() {
        let mut signals = aged_signals();
        signals.crowded_ip = true;
        let assessment = assess(&signals, &RiskConfig::default());
        assert_eq!(assessment.score.value(), 20);
    }

    #[test]
    fn test_claim_velocity_weight() {
        let config = RiskConfig::default();

        let mut signals = aged_signals();
        signals.claims_last_hour = config.hourly_claim_cap;
        assert_eq!(assess(&signals, &config).score.value(), 0);

        signals.claims_last_hour = config.hourly_claim_cap + 1;
        assert_eq!(assess(&signals, &config).score.value(), 30);
    }

    #[test]
    fn test_new_account_weight() {
        let mut signals = aged_signals();
        signals.account_age_hours = 23;
        assert_eq!(assess(&signals, &RiskConfig::default()).score.value(), 10);

        signals.account_age_hours = 24;
        assert_eq!(assess(&signals, &RiskConfig::default()).score.value(), 0);
    }

    #[test]
    fn test_flagged_events_scale_linearly() {
        let mut signals = aged_signals();
        signals.flagged_events = 3;
        let assessment = assess(&signals, &RiskConfig::default());
        assert_eq!(assessment.score.value(), 15);
        assert_eq!(assessment.factors, vec!["recent_flags"]);
    }

    #[test]
    fn test_score_is_clamped_to_100() {
        let signals = RiskSignals {
            device_count: 10,
            shared_device: true,
            crowded_ip: true,
            claims_last_hour: 100,
            account_age_hours: 1,
            flagged_events: 20,
        };
        let assessment = assess(&signals, &RiskConfig::default());
        assert_eq!(assessment.score.value(), 100);
        assert!(assessment.should_block);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn test_levels_follow_thresholds() {
        let config = RiskConfig::default();

        // 25 + 20 + 10 = 55: medium, not blocked
        let signals = RiskSignals {
            shared_device: true,
            crowded_ip: true,
            account_age_hours: 1,
            ..RiskSignals::default()
        };
        let assessment = assess(&signals, &config);
        assert_eq!(assessment.score.value(), 55);
        assert_eq!(assessment.level, RiskLevel::Medium);
        assert!(!assessment.should_block);

        // 25 + 20 + 30 + 10 = 85: high, blocked
        let signals = RiskSignals {
            shared_device: true,
            crowded_ip: true,
            claims_last_hour: config.hourly_claim_cap + 1,
            account_age_hours: 1,
            ..RiskSignals::default()
        };
        let assessment = assess(&signals, &config);
        assert_eq!(assessment.score.value(), 85);
        assert_eq!(assessment.level, RiskLevel::High);
        assert!(assessment.should_block);
    }
}

#[cfg(test)]
mod value_object_tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use crate::domain::entities::BlacklistEntry;
    use crate::domain::value_objects::*;

    #[test]
    fn test_risk_score_clamp() {
        assert_eq!(RiskScore::from_raw(0).value(), 0);
        assert_eq!(RiskScore::from_raw(100).value(), 100);
        assert_eq!(RiskScore::from_raw(250).value(), 100);
        assert_eq!(RiskScore::from_stored(-5).value(), 0);
        assert_eq!(RiskScore::from_stored(120).value(), 100);
    }

    #[test]
    fn test_severity_round_trip() {
        for severity in [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ] {
            assert_eq!(Severity::from_str(severity.as_str()), Some(severity));
        }
        assert_eq!(Severity::from_str("bogus"), None);
    }

    #[test]
    fn test_severity_flagged() {
        assert!(!Severity::Low.is_flagged());
        assert!(!Severity::Medium.is_flagged());
        assert!(Severity::High.is_flagged());
        assert!(Severity::Critical.is_flagged());
    }

    #[test]
    fn test_severity_at_or_above() {
        assert_eq!(Severity::Low.at_or_above().len(), 4);
        assert_eq!(Severity::High.at_or_above(), &[
            Severity::High,
            Severity::Critical
        ]);
    }

    #[test]
    fn test_blacklist_subject_parse() {
        let id = Uuid::new_v4();
        assert_eq!(
            BlacklistSubject::parse("user", &id.to_string()),
            Some(BlacklistSubject::User(id))
        );
        assert_eq!(
            BlacklistSubject::parse("device", "fp-1"),
            Some(BlacklistSubject::Device("fp-1".to_string()))
        );
        assert_eq!(
            BlacklistSubject::parse("ip", "10.0.0.1"),
            Some(BlacklistSubject::Ip("10.0.0.1".to_string()))
        );
        assert_eq!(BlacklistSubject::parse("user", "not-a-uuid"), None);
        assert_eq!(BlacklistSubject::parse("device", ""), None);
        assert_eq!(BlacklistSubject::parse("wallet", "x"), None);
    }

    #[test]
    fn test_blacklist_entry_expiry() {
        let now = Utc::now();
        let subject = BlacklistSubject::Ip("10.0.0.1".to_string());

        let permanent = BlacklistEntry::new(subject.clone(), "abuse".to_string(), None);
        assert!(!permanent.is_expired(now));

        let expired = BlacklistEntry::new(
            subject.clone(),
            "abuse".to_string(),
            Some(now - Duration::hours(1)),
        );
        assert!(expired.is_expired(now));

        let live = BlacklistEntry::new(subject, "abuse".to_string(), Some(now + Duration::hours(1)));
        assert!(!live.is_expired(now));
    }

    #[test]
    fn test_rate_window_severity() {
        assert_eq!(RateWindow::Minute.severity(), Severity::Medium);
        assert_eq!(RateWindow::Hour.severity(), Severity::Medium);
        assert_eq!(RateWindow::Day.severity(), Severity::Low);
    }

    #[test]
    fn test_denial_reason_display() {
        assert_eq!(DenialReason::AccountBanned.to_string(), "account banned");
        assert_eq!(
            DenialReason::RateLimited(RateWindow::Hour).to_string(),
            "claim limit per hour exceeded"
        );
        assert_eq!(DenialReason::RiskTooHigh.to_string(), "risk too high");
    }
}

#[cfg(test)]
mod config_tests {
    use crate::application::config::{ClaimRateConfig, RiskConfig};

    #[test]
    fn test_risk_config_defaults() {
        let config = RiskConfig::default();
        assert_eq!(config.weight_device_count, 15);
        assert_eq!(config.weight_shared_device, 25);
        assert_eq!(config.weight_crowded_ip, 20);
        assert_eq!(config.weight_claim_velocity, 30);
        assert_eq!(config.weight_new_account, 10);
        assert_eq!(config.weight_per_flagged_event, 5);
        assert_eq!(config.device_count_threshold, 3);
        assert_eq!(config.ip_user_threshold, 5);
        assert_eq!(config.warn_threshold, 50);
        assert_eq!(config.block_threshold, 80);
    }

    #[test]
    fn test_claim_rate_defaults() {
        let config = ClaimRateConfig::default();
        assert_eq!(config.per_minute.max_requests, 5);
        assert_eq!(config.per_hour.max_requests, 20);
        assert_eq!(config.per_day.max_requests, 50);
        assert_eq!(config.per_minute.window_ms(), 60_000);
        assert_eq!(config.per_hour.window_ms(), 3_600_000);
        assert_eq!(config.per_day.window_ms(), 86_400_000);
    }
}

#[cfg(test)]
mod use_case_tests {
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;

    use crate::application::check_rate::CheckRateUseCase;
    use crate::application::config::{ClaimRateConfig, RiskConfig};
    use crate::application::evaluate_risk::EvaluateRiskUseCase;
    use crate::application::gatekeeper::{AdmissionContext, GatekeeperUseCase};
    use crate::domain::entities::{BlacklistEntry, DeviceFingerprint, RiskEvent, event_types};
    use crate::domain::repository::*;
    use crate::domain::value_objects::*;
    use crate::error::RiskResult;

    #[derive(Default)]
    struct MockState {
        device_count: i64,
        shared_device: bool,
        crowded_ip: bool,
        claims: Vec<DateTime<Utc>>,
        flagged_events: i64,
        created_at: Option<DateTime<Utc>>,
        blacklist: Vec<BlacklistEntry>,
        events: Vec<RiskEvent>,
        persisted_score: Option<u8>,
    }

    #[derive(Clone, Default)]
    struct MockRiskRepo {
        state: Arc<Mutex<MockState>>,
    }

    impl MockRiskRepo {
        fn with_user_created(age: Duration) -> Self {
            let repo = Self::default();
            repo.state.lock().unwrap().created_at = Some(Utc::now() - age);
            repo
        }

        fn events(&self) -> Vec<RiskEvent> {
            self.state.lock().unwrap().events.clone()
        }
    }

    impl FingerprintRepository for MockRiskRepo {
        async fn upsert_fingerprint(&self, _fingerprint: &DeviceFingerprint) -> RiskResult<()> {
            Ok(())
        }

        async fn count_devices_for_user(&self, _user_id: Uuid) -> RiskResult<i64> {
            Ok(self.state.lock().unwrap().device_count)
        }

        async fn user_has_shared_device(&self, _user_id: Uuid) -> RiskResult<bool> {
            Ok(self.state.lock().unwrap().shared_device)
        }
    }

    impl IpActivityRepository for MockRiskRepo {
        async fn record_ip(&self, _ip: &str, _user_id: Uuid) -> RiskResult<()> {
            Ok(())
        }

        async fn user_has_crowded_ip(
            &self,
            _user_id: Uuid,
            _user_threshold: i64,
        ) -> RiskResult<bool> {
            Ok(self.state.lock().unwrap().crowded_ip)
        }
    }

    impl BlacklistRepository for MockRiskRepo {
        async fn find_active(
            &self,
            subject: &BlacklistSubject,
        ) -> RiskResult<Option<BlacklistEntry>> {
            let now = Utc::now();
            Ok(self
                .state
                .lock()
                .unwrap()
                .blacklist
                .iter()
                .find(|e| &e.subject == subject && !e.is_expired(now))
                .cloned())
        }

        async fn upsert_entry(&self, entry: &BlacklistEntry) -> RiskResult<()> {
            let mut state = self.state.lock().unwrap();
            state.blacklist.retain(|e| e.subject != entry.subject);
            state.blacklist.push(entry.clone());
            Ok(())
        }

        async fn remove_entry(&self, subject: &BlacklistSubject) -> RiskResult<bool> {
            let mut state = self.state.lock().unwrap();
            let before = state.blacklist.len();
            state.blacklist.retain(|e| &e.subject != subject);
            Ok(state.blacklist.len() < before)
        }

        async fn cleanup_expired(&self) -> RiskResult<u64> {
            Ok(0)
        }
    }

    impl RiskEventRepository for MockRiskRepo {
        async fn append_event(&self, event: &RiskEvent) -> RiskResult<()> {
            self.state.lock().unwrap().events.push(event.clone());
            Ok(())
        }

        async fn count_flagged_since(
            &self,
            _user_id: Uuid,
            _since: DateTime<Utc>,
        ) -> RiskResult<i64> {
            Ok(self.state.lock().unwrap().flagged_events)
        }

        async fn find_recent(&self, _filter: &RiskEventFilter) -> RiskResult<Vec<RiskEvent>> {
            Ok(self.events())
        }
    }

    impl ClaimActivityRepository for MockRiskRepo {
        async fn count_claims_since(&self, _user_id: Uuid, since: DateTime<Utc>) -> RiskResult<i64> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .claims
                .iter()
                .filter(|t| **t >= since)
                .count() as i64)
        }
    }

    impl UserRiskRepository for MockRiskRepo {
        async fn persist_score(&self, _user_id: Uuid, score: RiskScore) -> RiskResult<()> {
            self.state.lock().unwrap().persisted_score = Some(score.value());
            Ok(())
        }

        async fn account_created_at(&self, _user_id: Uuid) -> RiskResult<Option<DateTime<Utc>>> {
            Ok(self.state.lock().unwrap().created_at)
        }
    }

    fn admission_ctx(user_id: Uuid) -> AdmissionContext {
        AdmissionContext {
            user_id,
            ip: Some("203.0.113.7".to_string()),
            visitor_id: Some("fp-test".to_string()),
        }
    }

    #[tokio::test]
    async fn test_rate_check_allows_under_all_windows() {
        let repo = MockRiskRepo::default();
        let use_case = CheckRateUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(ClaimRateConfig::default()),
        );

        let decision = use_case.execute(Uuid::new_v4()).await.unwrap();
        assert!(decision.allowed);
        assert!(decision.window.is_none());
        assert!(repo.events().is_empty());
    }

    #[tokio::test]
    async fn test_rate_check_minute_window_short_circuits() {
        let repo = MockRiskRepo::default();
        {
            let mut state = repo.state.lock().unwrap();
            let now = Utc::now();
            // 5 claims in the last minute: at the cap, next is denied
            for _ in 0..5 {
                state.claims.push(now - Duration::seconds(10));
            }
        }

        let use_case = CheckRateUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(ClaimRateConfig::default()),
        );
        let decision = use_case.execute(Uuid::new_v4()).await.unwrap();

        assert!(!decision.allowed);
        assert_eq!(decision.window, Some(RateWindow::Minute));

        let events = repo.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, event_types::RATE_LIMIT_EXCEEDED);
        assert_eq!(events[0].severity, Severity::Medium);
    }

    #[tokio::test]
    async fn test_rate_check_hour_window_wins_when_minute_clean() {
        let repo = MockRiskRepo::default();
        {
            let mut state = repo.state.lock().unwrap();
            let now = Utc::now();
            // 20 claims half an hour ago: minute window clean, hour at cap
            for _ in 0..20 {
                state.claims.push(now - Duration::minutes(30));
            }
        }

        let use_case = CheckRateUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(ClaimRateConfig::default()),
        );
        let decision = use_case.execute(Uuid::new_v4()).await.unwrap();

        assert_eq!(decision.window, Some(RateWindow::Hour));
        assert_eq!(repo.events()[0].severity, Severity::Medium);
    }

    #[tokio::test]
    async fn test_rate_check_day_window_has_low_severity() {
        let repo = MockRiskRepo::default();
        {
            let mut state = repo.state.lock().unwrap();
            let now = Utc::now();
            for _ in 0..50 {
                state.claims.push(now - Duration::hours(3));
            }
        }

        let use_case = CheckRateUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(ClaimRateConfig::default()),
        );
        let decision = use_case.execute(Uuid::new_v4()).await.unwrap();

        assert_eq!(decision.window, Some(RateWindow::Day));
        assert_eq!(repo.events()[0].severity, Severity::Low);
    }

    #[tokio::test]
    async fn test_evaluate_persists_score() {
        let repo = MockRiskRepo::with_user_created(Duration::hours(1));
        {
            let mut state = repo.state.lock().unwrap();
            state.device_count = 4;
        }

        let use_case = EvaluateRiskUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(RiskConfig::default()),
        );
        let assessment = use_case.execute(Uuid::new_v4()).await.unwrap();

        // device_count (15) + new_account (10)
        assert_eq!(assessment.score.value(), 25);
        assert_eq!(repo.state.lock().unwrap().persisted_score, Some(25));
    }

    #[tokio::test]
    async fn test_gatekeeper_blacklist_dominates_everything() {
        let user_id = Uuid::new_v4();
        let repo = MockRiskRepo::with_user_created(Duration::days(30));
        {
            let mut state = repo.state.lock().unwrap();
            state
                .blacklist
                .push(BlacklistEntry::new(
                    BlacklistSubject::User(user_id),
                    "fraud ring".to_string(),
                    None,
                ));
            // Rate windows are also exceeded, but blacklist wins
            let now = Utc::now();
            for _ in 0..10 {
                state.claims.push(now - Duration::seconds(5));
            }
        }

        let gatekeeper = GatekeeperUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(RiskConfig::default()),
            Arc::new(ClaimRateConfig::default()),
        );
        let decision = gatekeeper.decide(&admission_ctx(user_id)).await.unwrap();

        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some(DenialReason::AccountBanned));
        // No rate event: the check never ran
        assert!(repo.events().is_empty());
    }

    #[tokio::test]
    async fn test_gatekeeper_expired_blacklist_entry_is_inert() {
        let user_id = Uuid::new_v4();
        let repo = MockRiskRepo::with_user_created(Duration::days(30));
        {
            let mut state = repo.state.lock().unwrap();
            state.blacklist.push(BlacklistEntry::new(
                BlacklistSubject::User(user_id),
                "old ban".to_string(),
                Some(Utc::now() - Duration::hours(1)),
            ));
        }

        let gatekeeper = GatekeeperUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(RiskConfig::default()),
            Arc::new(ClaimRateConfig::default()),
        );
        let decision = gatekeeper.decide(&admission_ctx(user_id)).await.unwrap();

        assert!(decision.allowed);
    }

    #[tokio::test]
    async fn test_gatekeeper_device_ban_applies_to_visitor() {
        let user_id = Uuid::new_v4();
        let repo = MockRiskRepo::with_user_created(Duration::days(30));
        {
            let mut state = repo.state.lock().unwrap();
            state.blacklist.push(BlacklistEntry::new(
                BlacklistSubject::Device("fp-test".to_string()),
                "emulator farm".to_string(),
                None,
            ));
        }

        let gatekeeper = GatekeeperUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(RiskConfig::default()),
            Arc::new(ClaimRateConfig::default()),
        );
        let decision = gatekeeper.decide(&admission_ctx(user_id)).await.unwrap();

        assert_eq!(decision.reason, Some(DenialReason::DeviceBanned));
    }

    #[tokio::test]
    async fn test_gatekeeper_blocks_on_high_risk_and_logs_critical() {
        let user_id = Uuid::new_v4();
        let repo = MockRiskRepo::with_user_created(Duration::hours(1));
        {
            let mut state = repo.state.lock().unwrap();
            // shared_device (25) + crowded_ip (20) + flagged x8 (40) + new (10) = 95
            state.shared_device = true;
            state.crowded_ip = true;
            state.flagged_events = 8;
        }

        let gatekeeper = GatekeeperUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(RiskConfig::default()),
            Arc::new(ClaimRateConfig::default()),
        );
        let decision = gatekeeper.decide(&admission_ctx(user_id)).await.unwrap();

        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some(DenialReason::RiskTooHigh));
        assert_eq!(decision.score.unwrap().value(), 95);

        let events = repo.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, event_types::RISK_BLOCK);
        assert_eq!(events[0].severity, Severity::Critical);
    }

    #[tokio::test]
    async fn test_gatekeeper_allows_and_returns_score() {
        let user_id = Uuid::new_v4();
        let repo = MockRiskRepo::with_user_created(Duration::hours(1));

        let gatekeeper = GatekeeperUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(RiskConfig::default()),
            Arc::new(ClaimRateConfig::default()),
        );
        let decision = gatekeeper.decide(&admission_ctx(user_id)).await.unwrap();

        assert!(decision.allowed);
        // new_account only
        assert_eq!(decision.score.unwrap().value(), 10);
        // score persisted as a side effect of evaluation
        assert_eq!(repo.state.lock().unwrap().persisted_score, Some(10));
    }
}
