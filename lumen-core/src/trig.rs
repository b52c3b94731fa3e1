//! Trigonometry without `std`
//!
//! Integer-degree lookups come from a constant Q14 sine table; arbitrary
//! float angles use a short polynomial after octant reduction.

use crate::geometry::point::round_f32;

/// Fixed-point scale of [`SIN_TABLE_Q14`]
pub const TRIG_SHIFT: u32 = 14;

/// `sin(deg) * 16384` for 0..=90 degrees
pub static SIN_TABLE_Q14: [i32; 91] = [
    0, 286, 572, 857, 1143, 1428, 1713, 1997, 2280, 2563,
    2845, 3126, 3406, 3686, 3964, 4240, 4516, 4790, 5063, 5334,
    5604, 5872, 6138, 6402, 6664, 6924, 7182, 7438, 7692, 7943,
    8192, 8438, 8682, 8923, 9162, 9397, 9630, 9860, 10087, 10311,
    10531, 10749, 10963, 11174, 11381, 11585, 11786, 11982, 12176, 12365,
    12551, 12733, 12911, 13085, 13255, 13421, 13583, 13741, 13894, 14044,
    14189, 14330, 14466, 14598, 14726, 14849, 14968, 15082, 15191, 15296,
    15396, 15491, 15582, 15668, 15749, 15826, 15897, 15964, 16026, 16083,
    16135, 16182, 16225, 16262, 16294, 16322, 16344, 16362, 16374, 16382,
    16384,
];

/// `sin(deg)` in Q14 for any integer angle
pub fn sin_q14(deg: i32) -> i32 {
    let deg = deg.rem_euclid(360);
    match deg {
        0..=90 => SIN_TABLE_Q14[deg as usize],
        91..=180 => SIN_TABLE_Q14[(180 - deg) as usize],
        181..=270 => -SIN_TABLE_Q14[(deg - 180) as usize],
        _ => -SIN_TABLE_Q14[(360 - deg) as usize],
    }
}

/// `cos(deg)` in Q14 for any integer angle
pub fn cos_q14(deg: i32) -> i32 {
    sin_q14(deg + 90)
}

/// `(sin, cos)` of an angle in degrees
pub fn sin_cos_deg(deg: f32) -> (f32, f32) {
    let deg = deg % 360.0;
    let quadrant = round_f32(deg / 90.0);
    let r = (deg - quadrant as f32 * 90.0) * (core::f32::consts::PI / 180.0);
    let r2 = r * r;
    // |r| <= pi/4, so the series converges well within f32 precision
    let s = r * (1.0 - r2 / 6.0 * (1.0 - r2 / 20.0 * (1.0 - r2 / 42.0 * (1.0 - r2 / 72.0))));
    let c = 1.0 - r2 / 2.0 * (1.0 - r2 / 12.0 * (1.0 - r2 / 30.0 * (1.0 - r2 / 56.0)));
    match quadrant.rem_euclid(4) {
        0 => (s, c),
        1 => (c, -s),
        2 => (-s, -c),
        _ => (-c, s),
    }
}

/// Integer square root (floor)
pub fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}
