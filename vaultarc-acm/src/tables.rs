//! Value maps and packed lookup tables used by the subband decoders.

/// 1-bit code to amplitude.
pub const MAP_1BIT: [i32; 2] = [-1, 1];
/// 2-bit code to amplitude.
pub const MAP_2BIT: [i32; 4] = [-2, -1, 1, 2];
/// 2-bit code to amplitude, skipping ±1.
pub const MAP_2BIT_FAR: [i32; 4] = [-3, -2, 2, 3];
/// 3-bit code to amplitude.
pub const MAP_3BIT: [i32; 8] = [-4, -3, -2, -1, 1, 2, 3, 4];

/// Two base-11 digits packed as nibbles.
pub const MUL_2X11: [u16; 121] = square_table::<11, 121>();
/// Three base-3 digits packed as nibbles.
pub const MUL_3X3: [u16; 27] = cube_table::<3, 27>();
/// Three base-5 digits packed as nibbles.
pub const MUL_3X5: [u16; 125] = cube_table::<5, 125>();

/// `table[x1 + x2 * R] = x1 | x2 << 4`
const fn square_table<const R: usize, const N: usize>() -> [u16; N] {
    let mut table = [0u16; N];
    let mut x2 = 0;
    while x2 < R {
        let mut x1 = 0;
        while x1 < R {
            table[x1 + x2 * R] = (x1 + (x2 << 4)) as u16;
            x1 += 1;
        }
        x2 += 1;
    }
    table
}

/// `table[x1 + x2 * R + x3 * R * R] = x1 | x2 << 4 | x3 << 8`
const fn cube_table<const R: usize, const N: usize>() -> [u16; N] {
    let mut table = [0u16; N];
    let mut x3 = 0;
    while x3 < R {
        let mut x2 = 0;
        while x2 < R {
            let mut x1 = 0;
            while x1 < R {
                table[x1 + x2 * R + x3 * R * R] = (x1 + (x2 << 4) + (x3 << 8)) as u16;
                x1 += 1;
            }
            x2 += 1;
        }
        x3 += 1;
    }
    table
}
