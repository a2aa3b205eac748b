//! Seeded 32-bit string hash (Bob Jenkins' lookup3 `hashlittle`, 2006).
//!
//! Two code paths compose the input words: [`hash_words`] reads each 4-byte
//! group in one go, [`hash_bytes`] assembles it from individual bytes. Both
//! produce identical output for the same byte sequence on every target;
//! [`hash`] picks the one that suits the target's byte order.

const INIT: u32 = 0xdead_beef;

#[inline(always)]
fn mix(a: &mut u32, b: &mut u32, c: &mut u32) {
    *a = a.wrapping_sub(*c);
    *a ^= c.rotate_left(4);
    *c = c.wrapping_add(*b);
    *b = b.wrapping_sub(*a);
    *b ^= a.rotate_left(6);
    *a = a.wrapping_add(*c);
    *c = c.wrapping_sub(*b);
    *c ^= b.rotate_left(8);
    *b = b.wrapping_add(*a);
    *a = a.wrapping_sub(*c);
    *a ^= c.rotate_left(16);
    *c = c.wrapping_add(*b);
    *b = b.wrapping_sub(*a);
    *b ^= a.rotate_left(19);
    *a = a.wrapping_add(*c);
    *c = c.wrapping_sub(*b);
    *c ^= b.rotate_left(4);
    *b = b.wrapping_add(*a);
}

#[inline(always)]
fn finalize(a: &mut u32, b: &mut u32, c: &mut u32) {
    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(14));
    *a ^= *c;
    *a = a.wrapping_sub(c.rotate_left(11));
    *b ^= *a;
    *b = b.wrapping_sub(a.rotate_left(25));
    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(16));
    *a ^= *c;
    *a = a.wrapping_sub(c.rotate_left(4));
    *b ^= *a;
    *b = b.wrapping_sub(a.rotate_left(14));
    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(24));
}

/// Hash `key` with `seed`. Deterministic for identical `(key, seed)` pairs.
#[inline]
pub fn hash(key: &[u8], seed: u32) -> u32 {
    #[cfg(target_endian = "little")]
    {
        hash_words(key, seed)
    }
    #[cfg(not(target_endian = "little"))]
    {
        hash_bytes(key, seed)
    }
}

/// Word-at-a-time path: each 32-bit lane is read from a 4-byte chunk.
pub fn hash_words(key: &[u8], seed: u32) -> u32 {
    let mut a = INIT.wrapping_add(key.len() as u32).wrapping_add(seed);
    let mut b = a;
    let mut c = a;

    let mut rest = key;
    while rest.len() > 12 {
        a = a.wrapping_add(word(&rest[0..4]));
        b = b.wrapping_add(word(&rest[4..8]));
        c = c.wrapping_add(word(&rest[8..12]));
        mix(&mut a, &mut b, &mut c);
        rest = &rest[12..];
    }
    if rest.is_empty() {
        return c;
    }

    // Zero padding stands in for the masked partial reads of the tail.
    let mut tail = [0u8; 12];
    tail[..rest.len()].copy_from_slice(rest);
    a = a.wrapping_add(word(&tail[0..4]));
    b = b.wrapping_add(word(&tail[4..8]));
    c = c.wrapping_add(word(&tail[8..12]));
    finalize(&mut a, &mut b, &mut c);
    c
}

#[inline(always)]
fn word(chunk: &[u8]) -> u32 {
    let mut w = [0u8; 4];
    w.copy_from_slice(chunk);
    u32::from_le_bytes(w)
}

/// Byte-at-a-time path: lanes are composed with shifts, independent of the target's byte order.
pub fn hash_bytes(key: &[u8], seed: u32) -> u32 {
    let mut a = INIT.wrapping_add(key.len() as u32).wrapping_add(seed);
    let mut b = a;
    let mut c = a;

    let mut k = key;
    while k.len() > 12 {
        a = a.wrapping_add(k[0] as u32);
        a = a.wrapping_add((k[1] as u32) << 8);
        a = a.wrapping_add((k[2] as u32) << 16);
        a = a.wrapping_add((k[3] as u32) << 24);
        b = b.wrapping_add(k[4] as u32);
        b = b.wrapping_add((k[5] as u32) << 8);
        b = b.wrapping_add((k[6] as u32) << 16);
        b = b.wrapping_add((k[7] as u32) << 24);
        c = c.wrapping_add(k[8] as u32);
        c = c.wrapping_add((k[9] as u32) << 8);
        c = c.wrapping_add((k[10] as u32) << 16);
        c = c.wrapping_add((k[11] as u32) << 24);
        mix(&mut a, &mut b, &mut c);
        k = &k[12..];
    }
    if k.is_empty() {
        return c;
    }

    // Highest byte first, each lane picking up its lower bytes on the way down.
    for i in (0..k.len()).rev() {
        let byte = (k[i] as u32) << (8 * (i % 4));
        match i / 4 {
            0 => a = a.wrapping_add(byte),
            1 => b = b.wrapping_add(byte),
            _ => c = c.wrapping_add(byte),
        }
    }
    finalize(&mut a, &mut b, &mut c);
    c
}
