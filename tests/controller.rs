mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::fmt;

    use embassy_time::{Duration, Instant};
    use heapless::String as HString;
    use sight_controller::board::{
        Board, ConfigStorage, Console, DEVICE_ID_LEN, PixelOutput, StatusLed, StorageError,
        Watchdog,
    };
    use sight_controller::color::{BLACK, Rgb};
    use sight_controller::config::{self, CONFIG_PATH, Config, ConfigUpdate};
    use sight_controller::controller::{Controller, WATCHDOG_TIMEOUT};
    use sight_controller::frame_scheduler::CadenceKind;
    use sight_controller::groups::ChannelId;
    use sight_controller::renderer::PaintFrame;
    use sight_controller::signal::SchedulerSignals;
    use sight_controller::status::StatusMode;

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };

    #[derive(Default)]
    struct MockBoard {
        input: VecDeque<u8>,
        output: String,
        files: HashMap<String, Vec<u8>>,
        fail_reads: bool,
        fail_writes: bool,
        paints: usize,
        painted_channels: Vec<u8>,
        painted_brightness: u8,
        status_color: Option<Rgb>,
        watchdog: Option<Duration>,
        kicks: usize,
        reboots: usize,
        overruns: u32,
    }

    impl MockBoard {
        fn with_config(config: &Config) -> Self {
            let mut board = Self::default();
            board
                .files
                .insert(CONFIG_PATH.to_owned(), config::save(config).to_vec());
            board
        }

        fn without_startup() -> Self {
            let mut config = Config::defaults();
            config.apply(ConfigUpdate::StartupAnimation(0)).unwrap();
            Self::with_config(&config)
        }

        fn type_line(&mut self, line: &str) {
            self.input.extend(line.bytes());
            self.input.push_back(b'\r');
        }

        fn take_output(&mut self) -> String {
            std::mem::take(&mut self.output)
        }
    }

    impl fmt::Write for MockBoard {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.output.push_str(s);
            Ok(())
        }
    }

    impl Console for MockBoard {
        fn read_byte(&mut self) -> Option<u8> {
            self.input.pop_front()
        }

        fn overruns(&self) -> u32 {
            self.overruns
        }
    }

    impl PixelOutput for MockBoard {
        fn paint(&mut self, frame: &PaintFrame<'_>) {
            self.paints += 1;
            self.painted_channels = frame.channels().map(|(id, _, _)| id.get()).collect();
            self.painted_brightness = frame.brightness;
        }
    }

    impl StatusLed for MockBoard {
        fn set_status_color(&mut self, color: Rgb) {
            self.status_color = Some(color);
        }
    }

    impl Watchdog for MockBoard {
        fn arm(&mut self, timeout: Duration) {
            self.watchdog = Some(timeout);
        }

        fn kick(&mut self) {
            self.kicks += 1;
        }
    }

    impl ConfigStorage for MockBoard {
        fn read_all(&mut self, path: &str, buffer: &mut [u8]) -> Result<usize, StorageError> {
            if self.fail_reads {
                return Err(StorageError::Failed);
            }
            let data = self.files.get(path).ok_or(StorageError::NotFound)?;
            let target = buffer.get_mut(..data.len()).ok_or(StorageError::Failed)?;
            target.copy_from_slice(data);
            Ok(data.len())
        }

        fn write_all(&mut self, path: &str, bytes: &[u8]) -> Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::Failed);
            }
            self.files.insert(path.to_owned(), bytes.to_vec());
            Ok(())
        }
    }

    impl Board for MockBoard {
        fn unique_id(&self) -> HString<DEVICE_ID_LEN> {
            let mut id = HString::new();
            let _ = id.push_str("MOCK-0001");
            id
        }

        fn reboot(&mut self) {
            self.reboots += 1;
        }
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn channel_one<B: Board>(controller: &Controller<'_, B>) -> Vec<Rgb> {
        controller
            .renderer()
            .buffers()
            .channel(ChannelId::new(1).unwrap())[..100]
            .to_vec()
    }

    #[test]
    fn test_boot_without_stored_config() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::default(), &signals, at(0));

        assert_eq!(controller.config(), &Config::defaults());
        assert_eq!(controller.status().mode(), StatusMode::Normal);
        assert!(controller.is_starting_up());
        assert_eq!(controller.board().watchdog, Some(WATCHDOG_TIMEOUT));
        assert!(controller.board_mut().take_output().contains("sight"));
    }

    #[test]
    fn test_boot_with_storage_failure_enters_error() {
        let signals = SchedulerSignals::new();
        let board = MockBoard {
            fail_reads: true,
            ..MockBoard::default()
        };
        let mut controller = Controller::new(board, &signals, at(0));

        assert_eq!(controller.status().mode(), StatusMode::Error);
        assert_eq!(controller.config(), &Config::defaults());
        assert!(
            controller
                .board_mut()
                .take_output()
                .starts_with("ERR boot: storage: driver failure")
        );
    }

    #[test]
    fn test_boot_with_corrupt_config_uses_defaults() {
        let signals = SchedulerSignals::new();
        let mut stored = Config::defaults();
        stored.apply(ConfigUpdate::Brightness(3)).unwrap();
        let mut board = MockBoard::with_config(&stored);
        if let Some(blob) = board.files.get_mut(CONFIG_PATH) {
            blob[5] ^= 0xFF;
        }

        let mut controller = Controller::new(board, &signals, at(0));
        assert_eq!(controller.status().mode(), StatusMode::Normal);
        assert_eq!(controller.config().brightness, 128);
        assert!(
            controller
                .board_mut()
                .take_output()
                .starts_with("WARN boot: configuration digest mismatch")
        );
    }

    #[test]
    fn test_boot_loads_stored_config() {
        let signals = SchedulerSignals::new();
        let mut stored = Config::defaults();
        stored.apply(ConfigUpdate::AnimateInterval(250)).unwrap();
        let controller = Controller::new(MockBoard::with_config(&stored), &signals, at(0));

        assert_eq!(controller.config(), &stored);
        assert_eq!(
            controller.scheduler().cadence(CadenceKind::Animate).interval(),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_group_commands_render() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::without_startup(), &signals, at(0));

        controller.board_mut().type_line("T:1:1");
        controller.poll(at(1));
        let leds = channel_one(&controller);
        assert_eq!(&leds[..10], &[RED; 10]);
        assert_eq!(leds[10], BLACK);

        controller.board_mut().type_line("A:0");
        controller.poll(at(2));
        assert!(channel_one(&controller).iter().all(|led| *led == BLACK));
    }

    #[test]
    fn test_push_cadence_paints() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::without_startup(), &signals, at(0));

        for ms in (0..=100).step_by(10) {
            controller.poll(at(ms));
        }
        let board = controller.board();
        assert_eq!(board.paints, 2);
        assert_eq!(board.painted_channels, vec![1]);
        assert_eq!(board.painted_brightness, 128);
        assert_eq!(board.kicks, 11);
        assert!(board.status_color.is_some());
    }

    #[test]
    fn test_startup_sweep_hands_over_to_table() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::default(), &signals, at(0));

        controller.poll(at(20));
        controller.poll(at(40));
        controller.poll(at(60));
        assert_eq!(&channel_one(&controller)[..10], &[RED; 10]);
        assert_eq!(channel_one(&controller)[10], BLACK);

        let mut ms = 60;
        while controller.is_starting_up() && ms < 2000 {
            ms += 20;
            controller.poll(at(ms));
        }
        assert_eq!(ms, 660);
        assert!(channel_one(&controller).iter().all(|led| *led == BLACK));
    }

    #[test]
    fn test_group_command_ends_startup_sweep() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::default(), &signals, at(0));
        controller.board_mut().type_line("T3:2");
        controller.poll(at(1));
        assert!(!controller.is_starting_up());
    }

    #[test]
    fn test_rejected_blink_interval_keeps_cadence() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::without_startup(), &signals, at(0));
        controller.board_mut().take_output();

        controller.board_mut().type_line("Cu:100");
        controller.board_mut().type_line("Cb:80");
        controller.poll(at(100));
        let blink = controller.scheduler().cadence(CadenceKind::Blink);
        assert_eq!(blink.interval(), Duration::from_millis(500));
        assert_eq!(blink.deadline(), at(500));
        assert_eq!(controller.config().timing.blink_ms, 500);
        assert!(
            controller
                .board_mut()
                .take_output()
                .ends_with("ERR blink interval 80 must be above update interval 100\n")
        );
        assert_eq!(controller.stats().errors(), 1);
    }

    #[test]
    fn test_accepted_interval_rearms_cadence() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::without_startup(), &signals, at(0));

        controller.board_mut().type_line("Ca:100");
        controller.poll(at(30));
        let animate = controller.scheduler().cadence(CadenceKind::Animate);
        assert_eq!(animate.interval(), Duration::from_millis(100));
        assert_eq!(animate.deadline(), at(130));
        // untouched cadences keep their phase
        assert_eq!(
            controller.scheduler().cadence(CadenceKind::Blink).deadline(),
            at(500)
        );
    }

    #[test]
    fn test_save_and_load() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::without_startup(), &signals, at(0));
        controller.board_mut().take_output();

        controller.board_mut().type_line("Cr:64");
        controller.board_mut().type_line("S");
        controller.poll(at(1));
        assert!(
            controller
                .board_mut()
                .take_output()
                .contains("OK S saved 142 bytes to /sight/config.bin")
        );

        controller.board_mut().type_line("Cr:200");
        controller.board_mut().type_line("L");
        controller.poll(at(2));
        assert_eq!(controller.config().brightness, 64);
        assert!(
            controller
                .board_mut()
                .take_output()
                .ends_with("OK L loaded from /sight/config.bin\n")
        );
    }

    #[test]
    fn test_storage_failure_is_reported() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::without_startup(), &signals, at(0));
        controller.board_mut().take_output();
        controller.board_mut().fail_writes = true;

        controller.board_mut().type_line("S");
        controller.poll(at(1));
        assert_eq!(
            controller.board_mut().take_output(),
            "ERR storage: driver failure\n"
        );
        assert_eq!(controller.stats().errors(), 1);
    }

    #[test]
    fn test_load_without_file_restores_defaults() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::default(), &signals, at(0));
        controller.board_mut().take_output();

        controller.board_mut().type_line("Cr:9");
        controller.board_mut().type_line("L");
        controller.poll(at(1));
        assert_eq!(controller.config(), &Config::defaults());
        assert!(controller.board_mut().take_output().ends_with(
            "WARN L: storage: not found, using defaults\nOK L defaults restored, S to persist\n"
        ));
        assert_eq!(controller.stats().errors(), 0);
    }

    #[test]
    fn test_load_of_corrupt_record_restores_defaults() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::without_startup(), &signals, at(0));
        controller.board_mut().type_line("S");
        controller.poll(at(1));
        if let Some(blob) = controller.board_mut().files.get_mut(CONFIG_PATH) {
            blob[40] ^= 0x01;
        }
        controller.board_mut().take_output();

        controller.board_mut().type_line("Cl:50");
        controller.board_mut().type_line("L");
        controller.poll(at(2));
        assert_eq!(controller.config().pixels_per_channel, 100);
        assert!(
            controller
                .board_mut()
                .take_output()
                .contains("WARN L: configuration digest mismatch, using defaults\n")
        );
    }

    #[test]
    fn test_load_with_read_failure_keeps_config() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::without_startup(), &signals, at(0));
        controller.board_mut().take_output();

        controller.board_mut().type_line("Cr:9");
        controller.poll(at(1));
        controller.board_mut().take_output();
        controller.board_mut().fail_reads = true;
        controller.board_mut().type_line("L");
        controller.poll(at(2));
        assert_eq!(controller.config().brightness, 9);
        assert_eq!(
            controller.board_mut().take_output(),
            "ERR storage: driver failure\n"
        );
        assert_eq!(controller.stats().errors(), 1);
    }

    #[test]
    fn test_info_reports_counters() {
        let signals = SchedulerSignals::new();
        let mut board = MockBoard::without_startup();
        board.overruns = 3;
        let mut controller = Controller::new(board, &signals, at(0));
        controller.board_mut().take_output();

        controller.board_mut().type_line("Z");
        controller.board_mut().type_line("I");
        controller.poll(at(2500));
        let out = controller.board_mut().take_output();
        assert!(out.contains("device: MOCK-0001"));
        assert!(out.contains("uptime: 2.500 s"));
        assert!(out.contains("status: normal"));
        assert!(out.contains("commands: 2 errors: 1"));
        assert!(out.contains("input overruns: 3"));
        assert!(out.ends_with("OK I\n"));
    }

    #[test]
    fn test_reboot_request() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::without_startup(), &signals, at(0));
        controller.board_mut().type_line("R");
        controller.poll(at(1));
        assert_eq!(controller.board().reboots, 1);
    }

    #[test]
    fn test_overlong_line_is_truncated_and_dispatched() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::without_startup(), &signals, at(0));
        controller.board_mut().take_output();

        let line = format!("M:{}", "1".repeat(600));
        controller.board_mut().input.extend(line.bytes());
        for ms in 1..20 {
            controller.poll(at(ms));
        }

        let out = controller.board_mut().take_output();
        assert!(out.starts_with("\u{7}WARN line truncated at 511 characters\n"));
        assert!(out.contains("OK M set 10 groups\n"));
        assert!(out.contains("WARN M: 499 digits beyond group 10 ignored\n"));
    }

    #[test]
    fn test_input_is_bounded_per_poll() {
        let signals = SchedulerSignals::new();
        let mut controller = Controller::new(MockBoard::without_startup(), &signals, at(0));
        controller.board_mut().input.extend([b'x'; 100]);
        controller.poll(at(1));
        assert_eq!(controller.board().input.len(), 36);
    }
}
