//! Proof-of-work target check and bounded solver.

use crate::block::BlockHeader;
use crate::crypto::Digest32;
use crate::TARGET;
use rand::Rng;

/// Whether a digest has at least `bits` leading zero bits: the first
/// `bits / 8` bytes must be zero, then the top `bits % 8` bits of the next
/// byte.
pub fn meets_target(digest: &Digest32, bits: u32) -> bool {
    let zero_bytes = (bits / 8) as usize;
    let zero_bits = bits % 8;
    let bytes = digest.as_ref();
    if bytes[..zero_bytes].iter().any(|&b| b != 0) {
        return false;
    }
    if zero_bits > 0 && bytes[zero_bytes] >> (8 - zero_bits) != 0 {
        return false;
    }
    true
}

/// One bounded solving pass: try up to `max_attempts` random nonces on the
/// header, leaving the winning nonce in place on success.
///
/// The bound is what keeps a mining pass preemptible: callers re-check the
/// world between passes instead of spinning until a solution exists.
pub fn try_solve(header: &mut BlockHeader, max_attempts: u32) -> bool {
    let mut rng = rand::thread_rng();
    for _ in 0..max_attempts {
        header.nonce = rng.gen();
        if meets_target(&header.digest(), TARGET) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_checks_bytes_then_bits() {
        let mut digest = Digest32::zero();
        assert!(meets_target(&digest, 20));

        // 0x08 in byte 2 = 0000 1000: exactly 4 leading zero bits there
        digest.0[2] = 0x08;
        assert!(meets_target(&digest, 20));
        assert!(!meets_target(&digest, 21));

        digest.0[0] = 1;
        assert!(!meets_target(&digest, 8));
    }

    #[test]
    fn zero_bit_target_accepts_everything() {
        let mut digest = Digest32::zero();
        digest.0[0] = 0xff;
        assert!(meets_target(&digest, 0));
    }

    #[test]
    fn solved_header_meets_target() {
        let mut header = BlockHeader {
            prev_hash: Digest32::zero(),
            summary: Digest32::zero(),
            timestamp: 1,
            nonce: 0,
        };
        while !try_solve(&mut header, 10_000) {}
        assert!(meets_target(&header.digest(), TARGET));
    }
}
