mod tests {
    use sight_controller::color::{
        BLACK, Rgb, fade_all, fade_to_black_by, pack_rgbw, rgb_from_u32, rgb_to_u32, rgbw_cells,
        scale_color, to_rgbw,
    };

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    const GRAY: Rgb = Rgb {
        r: 10,
        g: 10,
        b: 10,
    };

    #[test]
    fn test_rgb_u32_conversion() {
        assert_eq!(rgb_from_u32(0xFF_8000), Rgb { r: 255, g: 128, b: 0 });
        assert_eq!(rgb_to_u32(Rgb { r: 1, g: 2, b: 3 }), 0x01_0203);
    }

    #[test]
    fn test_fade_to_black_by() {
        assert_eq!(fade_to_black_by(RED, 0), RED);
        assert_eq!(fade_to_black_by(RED, 255), BLACK);
        assert_eq!(fade_to_black_by(RED, 128), Rgb { r: 127, g: 0, b: 0 });
    }

    #[test]
    fn test_scale_color() {
        assert_eq!(scale_color(RED, 128), Rgb { r: 128, g: 0, b: 0 });
        assert_eq!(scale_color(RED, 0), BLACK);
    }

    #[test]
    fn test_fade_all() {
        let mut leds = [RED; 3];
        fade_all(&mut leds, 255);
        assert_eq!(leds, [BLACK; 3]);
    }

    #[test]
    fn test_to_rgbw_moves_gray_to_white() {
        let rgbw = to_rgbw(GRAY);
        assert_eq!((rgbw.r, rgbw.g, rgbw.b, rgbw.a.0), (0, 0, 0, 10));

        let rgbw = to_rgbw(RED);
        assert_eq!((rgbw.r, rgbw.g, rgbw.b, rgbw.a.0), (255, 0, 0, 0));
    }

    #[test]
    fn test_pack_rgbw() {
        assert_eq!(rgbw_cells(2), 3);
        assert_eq!(rgbw_cells(3), 4);

        let mut cells = [RED; 3];
        let written = pack_rgbw(&[RED, GRAY], &mut cells);
        assert_eq!(written, 3);
        assert_eq!(
            cells,
            [
                Rgb { r: 0, g: 255, b: 0 },
                BLACK,
                Rgb { r: 0, g: 10, b: 0 },
            ]
        );
    }

    #[test]
    fn test_pack_rgbw_drops_pixels_that_do_not_fit() {
        let mut cells = [BLACK; 2];
        let written = pack_rgbw(&[RED, RED, RED], &mut cells);
        assert_eq!(written, 2);
        assert_eq!(cells[0], Rgb { r: 0, g: 255, b: 0 });
    }
}
