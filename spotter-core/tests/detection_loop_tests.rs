// spotter-core/tests/detection_loop_tests.rs
//
// End-to-end runs of the detection loop against recording collaborators.

mod common;

use common::{CountingSound, MockChannel, PresenceDetector, SteppedSource};
use spotter_core::notifications::{AlertChannels, NotificationDispatcher};
use spotter_core::{AlarmPlayer, CooldownScope, CoreConfigBuilder, DetectionLoop, LoopSummary};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    email: Arc<MockChannel>,
    sms: Arc<MockChannel>,
    log: Arc<MockChannel>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl Harness {
    fn new(email: Arc<MockChannel>) -> Self {
        let sms = MockChannel::new("sms");
        let log = MockChannel::new("log");
        let channels = AlertChannels::default()
            .with_email(email.clone())
            .with_sms(sms.clone())
            .with_log(log.clone());
        let dispatcher = Arc::new(NotificationDispatcher::new(channels, 2).unwrap());
        Self {
            email,
            sms,
            log,
            dispatcher,
        }
    }

    fn run(
        &self,
        scope: CooldownScope,
        frames: u64,
        alarm: AlarmPlayer,
        present: impl Fn(u64) -> bool + Send + 'static,
    ) -> LoopSummary {
        let config = CoreConfigBuilder::new()
            .cooldown_seconds(30.0)
            .cooldown_scope(scope)
            .build();
        let mut detection_loop = DetectionLoop::new(
            config,
            SteppedSource::new(frames, Duration::from_secs(1)),
            PresenceDetector::new("cell phone", present),
            alarm,
            self.dispatcher.clone(),
        )
        .unwrap();
        let summary = detection_loop.run();
        assert!(self.dispatcher.wait_idle(Duration::from_secs(10)));
        summary
    }
}

#[test]
fn test_phone_appears_after_forty_empty_frames() {
    let harness = Harness::new(MockChannel::new("email"));
    let sound = Arc::new(CountingSound::default());
    let alarm = AlarmPlayer::new(sound.clone());

    let summary = harness.run(CooldownScope::PerEpisode, 50, alarm.clone(), |i| i > 40);
    assert!(alarm.wait_idle(Duration::from_secs(5)));

    assert_eq!(summary.frames_processed, 50);
    assert_eq!(summary.target_frames, 10);
    assert_eq!(summary.alarm_requests, 10);
    assert_eq!(summary.episodes, 1);
    assert_eq!(summary.alert_rounds, 1);

    assert_eq!(harness.email.frame_indices(), vec![41]);
    assert_eq!(harness.sms.frame_indices(), vec![41]);
    assert_eq!(harness.log.frame_indices(), vec![41]);

    let plays = sound.plays();
    assert!((1..=10).contains(&plays), "unexpected play count {}", plays);
    assert_eq!(alarm.stats().started, plays);
}

#[test]
fn test_failing_email_does_not_affect_other_channels() {
    let harness = Harness::new(MockChannel::failing("email"));

    // Two episodes: frames 1-3 and 6-8.
    let summary = harness.run(CooldownScope::PerEpisode, 10, AlarmPlayer::silent(), |i| {
        (1..=3).contains(&i) || (6..=8).contains(&i)
    });

    assert_eq!(summary.frames_processed, 10);
    assert_eq!(summary.episodes, 2);
    assert_eq!(harness.email.frame_indices(), vec![1, 6]);
    assert_eq!(harness.sms.frame_indices(), vec![1, 6]);
    assert_eq!(harness.log.frame_indices(), vec![1, 6]);

    let stats = harness.dispatcher.stats();
    assert_eq!(stats.dispatched, 6);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.succeeded, 4);
}

#[test]
fn test_episode_reset_rearms_email_per_episode() {
    let harness = Harness::new(MockChannel::new("email"));
    harness.run(CooldownScope::PerEpisode, 6, AlarmPlayer::silent(), |i| i != 4);

    assert_eq!(harness.email.frame_indices(), vec![1, 5]);
    assert_eq!(harness.sms.frame_indices(), vec![1, 5]);
}

#[test]
fn test_global_scope_holds_window_across_episodes() {
    let harness = Harness::new(MockChannel::new("email"));
    let summary = harness.run(CooldownScope::Global, 6, AlarmPlayer::silent(), |i| i != 4);

    assert_eq!(summary.episodes, 2);
    assert_eq!(summary.alarm_requests, 5);
    assert_eq!(harness.email.frame_indices(), vec![1]);
    assert_eq!(harness.log.frame_indices(), vec![1]);
}

#[test]
fn test_global_scope_fires_once_window_elapses() {
    let harness = Harness::new(MockChannel::new("email"));
    harness.run(CooldownScope::Global, 40, AlarmPlayer::silent(), |i| i == 1 || i == 40);

    assert_eq!(harness.email.frame_indices(), vec![1, 40]);
    assert_eq!(harness.sms.frame_indices(), vec![1, 40]);
}

#[test]
fn test_long_episode_logs_every_cooldown_but_notifies_once() {
    let harness = Harness::new(MockChannel::new("email"));
    // Present for 70 seconds: rounds at t=0, t=31 and t=62.
    let summary = harness.run(CooldownScope::PerEpisode, 71, AlarmPlayer::silent(), |_| true);

    assert_eq!(summary.alert_rounds, 3);
    assert_eq!(harness.log.frame_indices(), vec![1, 32, 63]);
    assert_eq!(harness.email.frame_indices(), vec![1]);
    assert_eq!(harness.sms.frame_indices(), vec![1]);
}
