use chrono::Utc;
use rand::Rng;

pub const TICKET_PREFIX: &str = "DW2025";

const BASE36_UPPER: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const STAMP_MODULUS: i64 = 1_000_000;
const RANDOM_LEN: usize = 4;

/// New ticket identifier: prefix, last six digits of the current epoch
/// millis, four random base-36 characters. Collisions are unlikely but never
/// checked against existing tickets.
pub fn generate_ticket_id() -> String {
    compose_ticket_id(Utc::now().timestamp_millis(), &mut rand::thread_rng())
}

pub fn compose_ticket_id<R: Rng + ?Sized>(epoch_millis: i64, rng: &mut R) -> String {
    let stamp = epoch_millis.rem_euclid(STAMP_MODULUS);
    let random: String = (0..RANDOM_LEN)
        .map(|_| BASE36_UPPER[rng.gen_range(0..BASE36_UPPER.len())] as char)
        .collect();
    format!("{}{:06}{}", TICKET_PREFIX, stamp, random)
}

#[cfg(test)]
pub fn looks_like_ticket_id(value: &str) -> bool {
    let Some(rest) = value.strip_prefix(TICKET_PREFIX) else {
        return false;
    };
    let bytes = rest.as_bytes();
    bytes.len() == 6 + RANDOM_LEN
        && bytes[..6].iter().all(u8::is_ascii_digit)
        && bytes[6..]
            .iter()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
}
