mod tests {
    use sight_controller::math8::{fade8, percent_of, scale8, triangle8};

    #[test]
    fn test_scale8() {
        assert_eq!(scale8(255, 128), 128);
        assert_eq!(scale8(0, 128), 0);
        assert_eq!(scale8(128, 128), 64);
        assert_eq!(scale8(128, 255), 128);
        assert_eq!(scale8(128, 0), 0);
    }

    #[test]
    fn test_fade8() {
        assert_eq!(fade8(200, 0), 200);
        assert_eq!(fade8(200, 255), 0);
        assert_eq!(fade8(255, 128), 127);
    }

    #[test]
    fn test_percent_of_rounds_half_up() {
        assert_eq!(percent_of(10, 50), 5);
        assert_eq!(percent_of(10, 25), 3);
        assert_eq!(percent_of(10, 100), 10);
        assert_eq!(percent_of(7, 50), 4);
    }

    #[test]
    fn test_percent_of_never_hides_nonzero_fill() {
        assert_eq!(percent_of(10, 1), 1);
        assert_eq!(percent_of(10, 0), 0);
        assert_eq!(percent_of(0, 50), 0);
    }

    #[test]
    fn test_triangle8_bounces() {
        assert_eq!(triangle8(250, 8, 16, true), (255, false));
        assert_eq!(triangle8(255, 8, 16, false), (247, false));
        assert_eq!(triangle8(20, 8, 16, false), (16, true));
        assert_eq!(triangle8(16, 8, 16, true), (24, true));
    }
}
