mod tests {
    use embassy_time::{Duration, Instant};
    use sight_controller::config::{Config, ConfigUpdate};
    use sight_controller::frame_scheduler::{Cadence, CadenceKind, Scheduler};
    use sight_controller::signal::SchedulerSignals;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn test_cadence_fires_after_interval() {
        let mut cadence = Cadence::new(Duration::from_millis(20), at(0));
        assert!(!cadence.poll(at(19)));
        assert!(cadence.poll(at(20)));
        assert!(!cadence.poll(at(21)));
        assert!(cadence.poll(at(45)));
        assert_eq!(cadence.deadline(), at(65));
    }

    #[test]
    fn test_stalled_loop_fires_once() {
        let mut cadence = Cadence::new(Duration::from_millis(10), at(0));
        assert!(cadence.poll(at(1000)));
        assert!(!cadence.poll(at(1001)));
    }

    #[test]
    fn test_intervals_follow_timing() {
        let timing = Config::defaults().timing;
        let scheduler = Scheduler::new(&timing, at(0));
        assert_eq!(
            scheduler.cadence(CadenceKind::Refresh).interval(),
            Duration::from_millis(20)
        );
        assert_eq!(
            scheduler.cadence(CadenceKind::Blink).interval(),
            Duration::from_millis(500)
        );
        assert_eq!(
            scheduler.cadence(CadenceKind::Animate).interval(),
            Duration::from_millis(60)
        );
        assert_eq!(
            scheduler.cadence(CadenceKind::Push).interval(),
            Duration::from_millis(40)
        );
        assert_eq!(scheduler.next_deadline(), at(20));
    }

    #[test]
    fn test_poll_raises_signals() {
        let timing = Config::defaults().timing;
        let mut scheduler = Scheduler::new(&timing, at(0));
        let signals = SchedulerSignals::new();

        scheduler.poll(at(20), &signals);
        assert!(signals.pixels_dirty.take());
        assert!(!signals.transmit_due.is_raised());

        scheduler.poll(at(40), &signals);
        assert!(signals.transmit_due.take());

        scheduler.poll(at(60), &signals);
        assert_eq!(signals.take_animation_ticks(), 1);
        assert_eq!(signals.take_animation_ticks(), 0);

        assert!(!signals.blink_phase());
        scheduler.poll(at(500), &signals);
        assert!(signals.blink_toggled.take());
        assert!(signals.blink_phase());
    }

    #[test]
    fn test_rearm_touches_only_one_cadence() {
        let mut config = Config::defaults();
        let mut scheduler = Scheduler::new(&config.timing, at(0));

        config.apply(ConfigUpdate::AnimateInterval(200)).unwrap();
        scheduler.rearm(CadenceKind::Animate, &config.timing, at(30));

        let animate = scheduler.cadence(CadenceKind::Animate);
        assert_eq!(animate.interval(), Duration::from_millis(200));
        assert_eq!(animate.deadline(), at(230));
        assert_eq!(scheduler.cadence(CadenceKind::Refresh).deadline(), at(20));
    }

    #[test]
    fn test_signals_hold_one_pending_flag() {
        let signals = SchedulerSignals::new();
        signals.pixels_dirty.raise();
        signals.pixels_dirty.raise();
        assert!(signals.pixels_dirty.take());
        assert!(!signals.pixels_dirty.take());
    }

    #[test]
    fn test_animation_ticks_accumulate() {
        let signals = SchedulerSignals::new();
        for _ in 0..3 {
            signals.tick_animation();
        }
        assert_eq!(signals.take_animation_ticks(), 3);
    }
}
