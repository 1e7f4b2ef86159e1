//! Randomized typing animation
//!
//! Each frame touches roughly half of the 8x96 grid and lights roughly
//! half of what it touches, so about a quarter of the pixels flip on per
//! pass while the rest keep their previous state - a decaying sparkle
//! that reads as frantic typing from across the room.

use crate::{MATRIX_HEIGHT, MATRIX_WIDTH};

/// Pixel sink for the 8x96 grid. The firmware's MAX7219 chain driver
/// implements this over its framebuffer; flushing is the caller's duty.
pub trait Surface {
    fn set_pixel(&mut self, x: usize, y: usize, on: bool);
}

/// Source of randomness. Hardware RNG on the target, a seeded xorshift
/// in tests.
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    /// Fair coin flip.
    fn coin(&mut self) -> bool {
        self.next_u32() & 1 == 0
    }
}

/// Draw one typing frame. Pixels the first coin flip skips are left
/// exactly as the previous frame had them.
pub fn render_typing_frame<S: Surface, R: RandomSource>(surface: &mut S, rng: &mut R) {
    for y in 0..MATRIX_HEIGHT {
        for x in 0..MATRIX_WIDTH {
            if rng.coin() {
                surface.set_pixel(x, y, rng.coin());
            }
        }
    }
}

/// Turn every pixel off.
pub fn blank<S: Surface>(surface: &mut S) {
    for y in 0..MATRIX_HEIGHT {
        for x in 0..MATRIX_WIDTH {
            surface.set_pixel(x, y, false);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{Grid, XorShift};
    use super::*;

    const PIXELS: usize = MATRIX_WIDTH * MATRIX_HEIGHT;

    #[test]
    fn frame_touches_roughly_half_and_lights_roughly_a_quarter() {
        let mut grid = Grid::new();
        let mut rng = XorShift(0x2F6E_2B1D);
        render_typing_frame(&mut grid, &mut rng);

        let touched = grid.touched.iter().flatten().filter(|&&p| p).count();
        // Loose statistical bounds; the point is "some but not all".
        assert!(touched > PIXELS / 4 && touched < PIXELS * 3 / 4, "touched {touched}");
        let lit = grid.lit();
        assert!(lit > PIXELS / 10 && lit < PIXELS / 2, "lit {lit}");
    }

    #[test]
    fn untouched_pixels_keep_their_previous_state() {
        let mut grid = Grid::new();
        // Previous frame: everything lit.
        for y in 0..MATRIX_HEIGHT {
            for x in 0..MATRIX_WIDTH {
                grid.on[y][x] = true;
            }
        }
        let mut rng = XorShift(0xDEAD_BEEF);
        render_typing_frame(&mut grid, &mut rng);

        for y in 0..MATRIX_HEIGHT {
            for x in 0..MATRIX_WIDTH {
                if !grid.touched[y][x] {
                    assert!(grid.on[y][x], "untouched pixel ({x},{y}) went dark");
                }
            }
        }
    }

    #[test]
    fn blank_turns_every_pixel_off() {
        let mut grid = Grid::new();
        let mut rng = XorShift(1);
        render_typing_frame(&mut grid, &mut rng);
        blank(&mut grid);
        assert_eq!(grid.lit(), 0);
    }
}
