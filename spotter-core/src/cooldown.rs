// ============================================================================
// spotter-core/src/cooldown.rs
// ============================================================================
//
// ALERT COOLDOWN TRACKER: Per-Frame Alert Decisions
//
// This module owns the alerting state machine. Once per frame the detection
// loop reports whether the target is present, and the tracker answers with
// the set of actions to fire for that frame.
//
// KEY COMPONENTS:
// - AlertCooldownTracker: Idle/Active state machine with cooldown gating
// - AlertEpisode: State of one continuous run of target frames
// - AlertDecision: Actions to fire for the current frame
// - CooldownScope: Whether the cooldown re-arms on a new episode
//
// RULES:
// - The alarm is requested on every present frame.
// - An alert round happens when no round has fired yet, or when more than
//   the cooldown has elapsed since the last one.
// - Email and SMS fire at most once per episode, on an alert round.
// - The log fires on every alert round.
// - The first absent frame ends the episode and clears its flags.
//
// AI-ASSISTANT-INFO: Alert state machine with cooldown and per-episode dedup

// ---- Standard library imports ----
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

// ---- External crate imports ----
use log::{debug, info};
use serde::{Deserialize, Serialize};

// ============================================================================
// ACTIONS AND DECISIONS
// ============================================================================

/// A side effect the detection loop can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertAction {
    Alarm,
    Email,
    Sms,
    Log,
}

impl AlertAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertAction::Alarm => "alarm",
            AlertAction::Email => "email",
            AlertAction::Sms => "sms",
            AlertAction::Log => "log",
        }
    }
}

impl fmt::Display for AlertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions the tracker allows for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertDecision {
    pub alarm: bool,
    pub email: bool,
    pub sms: bool,
    pub log: bool,
}

impl AlertDecision {
    /// Decision for a frame without the target.
    pub const NONE: AlertDecision = AlertDecision {
        alarm: false,
        email: false,
        sms: false,
        log: false,
    };

    /// True when this frame opened a new alert round.
    pub fn is_alert_round(&self) -> bool {
        self.log
    }

    /// Allowed actions in issue order: alarm, email, sms, log.
    pub fn actions(&self) -> Vec<AlertAction> {
        [
            (self.alarm, AlertAction::Alarm),
            (self.email, AlertAction::Email),
            (self.sms, AlertAction::Sms),
            (self.log, AlertAction::Log),
        ]
        .into_iter()
        .filter_map(|(allowed, action)| allowed.then_some(action))
        .collect()
    }
}

// ============================================================================
// COOLDOWN SCOPE
// ============================================================================

/// Lifetime of the cooldown window relative to episodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CooldownScope {
    /// A new episode starts with no previous alert round, so email and SMS
    /// fire again immediately.
    #[default]
    PerEpisode,
    /// The last alert round carries over episodes; a new episode inside the
    /// window waits for it to elapse.
    Global,
}

impl fmt::Display for CooldownScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CooldownScope::PerEpisode => f.write_str("per-episode"),
            CooldownScope::Global => f.write_str("global"),
        }
    }
}

impl FromStr for CooldownScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-episode" | "episode" => Ok(CooldownScope::PerEpisode),
            "global" => Ok(CooldownScope::Global),
            other => Err(format!(
                "unknown cooldown scope '{}' (expected per-episode or global)",
                other
            )),
        }
    }
}

// ============================================================================
// EPISODES
// ============================================================================

/// A maximal run of consecutive frames in which the target is present.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEpisode {
    pub started_at: Instant,
    pub last_alert_fired_at: Option<Instant>,
    pub email_sent: bool,
    pub sms_sent: bool,
    pub alert_rounds: u32,
    pub frames: u64,
}

impl AlertEpisode {
    fn new(started_at: Instant, last_alert_fired_at: Option<Instant>) -> Self {
        Self {
            started_at,
            last_alert_fired_at,
            email_sent: false,
            sms_sent: false,
            alert_rounds: 0,
            frames: 0,
        }
    }
}

#[derive(Debug, Clone)]
enum TrackerState {
    Idle,
    Active(AlertEpisode),
}

// ============================================================================
// TRACKER
// ============================================================================

/// Decides, once per frame, which alert actions fire.
///
/// Owned by the detection loop thread; it is never shared.
#[derive(Debug, Clone)]
pub struct AlertCooldownTracker {
    cooldown: Duration,
    scope: CooldownScope,
    state: TrackerState,
    last_round_at: Option<Instant>,
    episodes_started: u64,
}

impl AlertCooldownTracker {
    pub fn new(cooldown: Duration, scope: CooldownScope) -> Self {
        Self {
            cooldown,
            scope,
            state: TrackerState::Idle,
            last_round_at: None,
            episodes_started: 0,
        }
    }

    /// Records a frame with the target present and returns the actions to
    /// fire for it.
    pub fn observe_present(&mut self, now: Instant) -> AlertDecision {
        if let TrackerState::Idle = self.state {
            let carried = match self.scope {
                CooldownScope::PerEpisode => None,
                CooldownScope::Global => self.last_round_at,
            };
            self.state = TrackerState::Active(AlertEpisode::new(now, carried));
            self.episodes_started += 1;
            info!("Alert episode #{} started", self.episodes_started);
        }

        let TrackerState::Active(episode) = &mut self.state else {
            return AlertDecision::NONE;
        };
        episode.frames += 1;

        let mut decision = AlertDecision {
            alarm: true,
            ..AlertDecision::NONE
        };

        let round_due = match episode.last_alert_fired_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.cooldown,
        };
        if !round_due {
            return decision;
        }

        episode.last_alert_fired_at = Some(now);
        episode.alert_rounds += 1;
        self.last_round_at = Some(now);

        decision.log = true;
        if !episode.email_sent {
            episode.email_sent = true;
            decision.email = true;
        }
        if !episode.sms_sent {
            episode.sms_sent = true;
            decision.sms = true;
        }

        debug!(
            "Alert round {} of episode #{} (email: {}, sms: {})",
            episode.alert_rounds, self.episodes_started, decision.email, decision.sms
        );
        decision
    }

    /// Records a frame without the target. Returns the episode that just
    /// ended, if any.
    pub fn observe_absent(&mut self) -> Option<AlertEpisode> {
        match std::mem::replace(&mut self.state, TrackerState::Idle) {
            TrackerState::Active(episode) => {
                info!(
                    "Alert episode #{} ended after {} frames and {} alert rounds",
                    self.episodes_started, episode.frames, episode.alert_rounds
                );
                Some(episode)
            }
            TrackerState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TrackerState::Active(_))
    }

    pub fn current_episode(&self) -> Option<&AlertEpisode> {
        match &self.state {
            TrackerState::Active(episode) => Some(episode),
            TrackerState::Idle => None,
        }
    }

    pub fn episodes_started(&self) -> u64 {
        self.episodes_started
    }

    pub fn scope(&self) -> CooldownScope {
        self.scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, secs: u64) -> Instant {
        base + Duration::from_secs(secs)
    }

    fn tracker(scope: CooldownScope) -> AlertCooldownTracker {
        AlertCooldownTracker::new(Duration::from_secs(30), scope)
    }

    #[test]
    fn test_first_present_frame_is_full_alert_round() {
        let base = Instant::now();
        let mut tracker = tracker(CooldownScope::PerEpisode);

        let decision = tracker.observe_present(base);
        assert_eq!(
            decision,
            AlertDecision { alarm: true, email: true, sms: true, log: true }
        );
        assert_eq!(
            decision.actions(),
            vec![AlertAction::Alarm, AlertAction::Email, AlertAction::Sms, AlertAction::Log]
        );
        assert!(tracker.is_active());
    }

    #[test]
    fn test_alarm_every_frame_but_notifications_gated() {
        let base = Instant::now();
        let mut tracker = tracker(CooldownScope::PerEpisode);
        tracker.observe_present(base);

        for s in 1..=30 {
            let decision = tracker.observe_present(at(base, s));
            assert!(decision.alarm);
            assert!(!decision.email && !decision.sms && !decision.log, "second {}", s);
        }
    }

    #[test]
    fn test_new_round_after_cooldown_logs_without_repeating_email_sms() {
        let base = Instant::now();
        let mut tracker = tracker(CooldownScope::PerEpisode);
        tracker.observe_present(base);

        // Exactly the cooldown is not enough; the interval must be exceeded.
        assert!(!tracker.observe_present(at(base, 30)).log);

        let decision = tracker.observe_present(at(base, 31));
        assert!(decision.alarm && decision.log);
        assert!(!decision.email && !decision.sms);
        assert_eq!(tracker.current_episode().map(|e| e.alert_rounds), Some(2));
    }

    #[test]
    fn test_absence_clears_flags() {
        let base = Instant::now();
        let mut tracker = tracker(CooldownScope::PerEpisode);
        tracker.observe_present(base);

        let ended = tracker.observe_absent().expect("episode should end");
        assert!(ended.email_sent && ended.sms_sent);
        assert!(!tracker.is_active());
        assert!(tracker.observe_absent().is_none());
    }

    #[test]
    fn test_per_episode_scope_rearms_within_window() {
        let base = Instant::now();
        let mut tracker = tracker(CooldownScope::PerEpisode);
        tracker.observe_present(base);
        tracker.observe_absent();

        let decision = tracker.observe_present(at(base, 5));
        assert!(decision.email && decision.sms && decision.log);
        assert_eq!(tracker.episodes_started(), 2);
    }

    #[test]
    fn test_global_scope_waits_for_window_across_episodes() {
        let base = Instant::now();
        let mut tracker = tracker(CooldownScope::Global);
        tracker.observe_present(base);
        tracker.observe_absent();

        let decision = tracker.observe_present(at(base, 5));
        assert!(decision.alarm);
        assert!(!decision.email && !decision.sms && !decision.log);

        // Flags were reset at the episode boundary, so the first round after
        // the window fires email and SMS again.
        let decision = tracker.observe_present(at(base, 31));
        assert!(decision.email && decision.sms && decision.log);
    }

    #[test]
    fn test_short_episode_fires_email_and_sms_exactly_once() {
        let base = Instant::now();
        let mut tracker = tracker(CooldownScope::PerEpisode);
        let mut emails = 0;
        let mut sms = 0;
        for s in 0..20 {
            let decision = tracker.observe_present(at(base, s));
            emails += decision.email as u32;
            sms += decision.sms as u32;
        }
        tracker.observe_absent();
        assert_eq!((emails, sms), (1, 1));
    }

    #[test]
    fn test_zero_cooldown_rounds_on_every_later_frame() {
        let base = Instant::now();
        let mut tracker = AlertCooldownTracker::new(Duration::ZERO, CooldownScope::PerEpisode);
        assert!(tracker.observe_present(base).log);
        // Same instant: nothing elapsed.
        assert!(!tracker.observe_present(base).log);
        let decision = tracker.observe_present(at(base, 1));
        assert!(decision.log && !decision.email);
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!("global".parse::<CooldownScope>(), Ok(CooldownScope::Global));
        assert_eq!("episode".parse::<CooldownScope>(), Ok(CooldownScope::PerEpisode));
        assert!("forever".parse::<CooldownScope>().is_err());
        assert_eq!(CooldownScope::PerEpisode.to_string(), "per-episode");
    }
}
