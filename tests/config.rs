mod tests {
    use sight_controller::MAX_GROUPS;
    use sight_controller::color::rgb_from_u32;
    use sight_controller::config::{Config, ConfigError, ConfigUpdate};
    use sight_controller::pattern::PatternId;

    #[test]
    fn test_defaults() {
        let config = Config::defaults();
        assert_eq!(config.identity(), "sight");
        assert_eq!(config.pixels_per_channel, 100);
        assert_eq!(config.active_groups(), 10);
        assert_eq!(config.pixels_per_group(), 10);
        assert_eq!(config.timing.update_ms, 20);
        assert_eq!(config.timing.push_ms, 40);
        assert_eq!(config.states[0].color, rgb_from_u32(0));
        assert_eq!(config.states[8].pattern(), PatternId::Blink);
        assert_eq!(config.states[9].pattern(), PatternId::SweepUp);
        assert_eq!(config.pins, [16, 17, 18, 19, 21, 22, 23, 25]);
    }

    #[test]
    fn test_defaults_need_no_correction() {
        let (config, report) = Config::defaults().validate_and_clamp();
        assert_eq!(config, Config::defaults());
        assert!(!report.is_corrected());
    }

    #[test]
    fn test_out_of_range_fields_reset_individually() {
        let mut config = Config::defaults();
        config.pixels_per_channel = 1000;
        config.spacer = 200;
        config.brightness = 7;

        let (clamped, report) = config.validate_and_clamp();
        assert_eq!(clamped.pixels_per_channel, 100);
        assert_eq!(clamped.spacer, 0);
        assert_eq!(clamped.brightness, 7);
        assert_eq!(report.fields().len(), 2);
    }

    #[test]
    fn test_capacity_overflow_resets_both_fields() {
        let mut config = Config::defaults();
        config.channels = 8;
        config.groups_per_channel = 50;

        let (clamped, report) = config.validate_and_clamp();
        assert_eq!(clamped.channels, 1);
        assert_eq!(clamped.groups_per_channel, 10);
        assert!(report.is_corrected());
        assert!(clamped.active_groups() <= MAX_GROUPS);
    }

    #[test]
    fn test_interval_ordering_resets_both() {
        let mut config = Config::defaults();
        config.timing.update_ms = 600;
        config.timing.push_ms = 1200;

        let (clamped, _) = config.validate_and_clamp();
        assert_eq!(clamped.timing.update_ms, 20);
        assert_eq!(clamped.timing.blink_ms, 500);
        assert_eq!(clamped.timing.push_ms, 40);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let mut config = Config::defaults();
        config.channel_order = [1, 1, 2, 3, 4, 5, 6, 7];
        config.timing.animate_ms = 1;
        config.states[3].pattern = 40;

        let (once, _) = config.validate_and_clamp();
        let (twice, report) = once.clone().validate_and_clamp();
        assert_eq!(once, twice);
        assert!(!report.is_corrected());
    }

    #[test]
    fn test_setter_rejects_out_of_range() {
        let mut config = Config::defaults();
        let err = config.apply(ConfigUpdate::PixelsPerChannel(301)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfRange {
                field: "pixels per channel",
                value: 301,
                min: 1,
                max: 300,
            }
        );
        assert_eq!(config, Config::defaults());
    }

    #[test]
    fn test_blink_must_stay_above_update() {
        let mut config = Config::defaults();
        config.apply(ConfigUpdate::UpdateInterval(100)).unwrap();

        let err = config.apply(ConfigUpdate::BlinkInterval(80)).unwrap_err();
        assert!(matches!(err, ConfigError::Ordering { limit: 100, .. }));
        assert_eq!(config.timing.blink_ms, 500);

        let err = config.apply(ConfigUpdate::BlinkInterval(100)).unwrap_err();
        assert!(matches!(err, ConfigError::Ordering { limit: 100, .. }));

        config.apply(ConfigUpdate::BlinkInterval(101)).unwrap();
        assert_eq!(config.timing.blink_ms, 101);
    }

    #[test]
    fn test_update_interval_drives_push_interval() {
        let mut config = Config::defaults();
        config.apply(ConfigUpdate::UpdateInterval(100)).unwrap();
        assert_eq!(config.timing.push_ms, 200);
    }

    #[test]
    fn test_capacity_is_checked_on_update() {
        let mut config = Config::defaults();
        config.apply(ConfigUpdate::GroupsPerChannel(50)).unwrap();
        config.apply(ConfigUpdate::Channels(2)).unwrap();

        let err = config.apply(ConfigUpdate::Channels(3)).unwrap_err();
        assert!(matches!(err, ConfigError::CapacityExceeded { channels: 3, .. }));
        assert_eq!(config.channels, 2);
        assert_eq!(config.active_groups(), 100);
    }

    #[test]
    fn test_state_zero_is_fixed() {
        let mut config = Config::defaults();
        let err = config
            .apply(ConfigUpdate::State {
                state: 0,
                color: 0xFF_FFFF,
                pattern: 0,
            })
            .unwrap_err();
        assert!(err.is_validation());

        config
            .apply(ConfigUpdate::State {
                state: 4,
                color: 0x12_3456,
                pattern: 10,
            })
            .unwrap();
        assert_eq!(config.states[4].color, rgb_from_u32(0x12_3456));
        assert_eq!(config.states[4].pattern(), PatternId::Bounce);
    }

    #[test]
    fn test_channel_order_must_be_permutation() {
        let mut config = Config::defaults();
        assert!(config.apply(ConfigUpdate::ChannelOrder("11345678")).is_err());
        assert!(config.apply(ConfigUpdate::ChannelOrder("1234567")).is_err());
        assert!(config.apply(ConfigUpdate::ChannelOrder("92345678")).is_err());

        config.apply(ConfigUpdate::ChannelOrder("87654321")).unwrap();
        assert_eq!(config.channel_order, [8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(config.logical_position(8), Some(0));
        assert_eq!(config.logical_position(1), None);
    }

    #[test]
    fn test_identity_update() {
        let mut config = Config::defaults();
        config.apply(ConfigUpdate::Identity("aisle-7")).unwrap();
        assert_eq!(config.identity(), "aisle-7");

        assert!(config.apply(ConfigUpdate::Identity("")).is_err());
        assert!(
            config
                .apply(ConfigUpdate::Identity("this identity is far too long!!!"))
                .is_err()
        );
        assert_eq!(config.identity(), "aisle-7");
    }

    #[test]
    fn test_update_codes() {
        assert_eq!(ConfigUpdate::BlinkFade(1).code(), 'k');
        assert!(ConfigUpdate::Spacer(1).changes_layout());
        assert!(!ConfigUpdate::Brightness(1).changes_layout());
    }
}
