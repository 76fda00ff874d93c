//! Subband merge ("wrap") transform.
//!
//! Turns the subband-domain block into PCM in place. The block is processed
//! in chunks of at most `block_samples_per_subband` rows; for each chunk the
//! subband width is halved repeatedly while the row count doubles, running a
//! two-tap butterfly over every column at each stage. The wrap buffer carries
//! the last two values of every column at every stage into the next block.

use crate::header::AcmHeader;

/// Merge the subbands of `block` in place, updating `wrap`.
///
/// Does nothing for a single-subband stream (level 0).
pub fn merge_subbands(header: &AcmHeader, block: &mut [i32], wrap: &mut [i32]) {
    if header.level == 0 {
        return;
    }

    let rows_per_pass = header.block_samples_per_subband();
    let samples_per_pass = header.block_total_samples();
    let mut block_offset = 0;
    let mut remaining = header.subband_length as usize;

    while remaining > 0 {
        let mut wrap_offset = 0;
        let mut sub_count = remaining.min(rows_per_pass);
        let mut sub_len = header.num_subbands();

        while sub_len > 1 {
            sub_len /= 2;
            sub_count *= 2;
            juggle(block, wrap, wrap_offset, block_offset, sub_len, sub_count);
            wrap_offset += sub_len * 2;
        }

        remaining = remaining.saturating_sub(rows_per_pass);
        block_offset += samples_per_pass;
    }
}

/// One butterfly stage over `sub_len` columns of `sub_count` rows.
fn juggle(
    block: &mut [i32],
    wrap: &mut [i32],
    mut wrap_offset: usize,
    mut block_offset: usize,
    sub_len: usize,
    sub_count: usize,
) {
    for _ in 0..sub_len {
        let mut r0 = wrap[wrap_offset];
        let mut r1 = wrap[wrap_offset + 1];
        let mut r2 = 0;
        let mut r3 = 0;
        let mut offset = block_offset;

        for _ in 0..sub_count / 2 {
            r2 = block[offset];
            block[offset] = r1.wrapping_mul(2).wrapping_add(r0.wrapping_add(r2));
            offset += sub_len;

            r3 = block[offset];
            block[offset] = r2.wrapping_mul(2).wrapping_sub(r1.wrapping_add(r3));
            offset += sub_len;

            r0 = r2;
            r1 = r3;
        }

        wrap[wrap_offset] = r2;
        wrap[wrap_offset + 1] = r3;
        wrap_offset += 2;
        block_offset += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(level: u8, subband_length: u16) -> AcmHeader {
        AcmHeader {
            num_samples: 0,
            channels: 1,
            stored_channels: 1,
            sample_rate: 22050,
            level,
            subband_length,
            data_offset: 14,
        }
    }

    #[test]
    fn test_level_zero_is_identity() {
        let h = header(0, 4);
        let mut block = vec![1, 2, 3, 4];
        let mut wrap = vec![];
        merge_subbands(&h, &mut block, &mut wrap);
        assert_eq!(block, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_two_subbands_single_row() {
        // level 1: one stage with sub_len 1, sub_count 2
        let h = header(1, 1);
        let mut block = vec![5, 7];
        let mut wrap = vec![0, 0];
        merge_subbands(&h, &mut block, &mut wrap);
        // b0 = 0*2 + (0 + 5) = 5; b1 = 5*2 - (0 + 7) = 3
        assert_eq!(block, vec![5, 3]);
        assert_eq!(wrap, vec![5, 7]);
    }

    #[test]
    fn test_history_carries_into_next_block() {
        let h = header(1, 1);
        let mut wrap = vec![0, 0];
        let mut first = vec![5, 7];
        merge_subbands(&h, &mut first, &mut wrap);

        let mut second = vec![1, 1];
        merge_subbands(&h, &mut second, &mut wrap);
        // b0 = 7*2 + (5 + 1) = 20; b1 = 1*2 - (7 + 1) = -6
        assert_eq!(second, vec![20, -6]);
    }

    #[test]
    fn test_wrap_buffer_fully_used() {
        let h = header(3, 2);
        let mut block: Vec<i32> = (1..=16).collect();
        let sentinel = i32::MIN + 12345;
        let mut wrap = vec![sentinel; h.wrap_length()];
        merge_subbands(&h, &mut block, &mut wrap);
        assert_eq!(wrap.len(), 14);
        assert!(wrap.iter().all(|&v| v != sentinel));
    }

    #[test]
    fn test_arithmetic_wraps() {
        let h = header(1, 1);
        let mut block = vec![i32::MAX, i32::MIN];
        let mut wrap = vec![i32::MAX, i32::MAX];
        merge_subbands(&h, &mut block, &mut wrap);
        let expected0 = i32::MAX
            .wrapping_mul(2)
            .wrapping_add(i32::MAX.wrapping_add(i32::MAX));
        assert_eq!(block[0], expected0);
    }
}
