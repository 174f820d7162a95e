//! Bit twiddling on 32-bit words. Everything here follows x86 `tzcnt`/`lzcnt` semantics,
//! i.e. counting on a zero word yields 32 instead of being undefined.

#[inline]
pub fn tzcnt(x: u32) -> u32 {
    x.trailing_zeros()
}

#[inline]
pub fn lzcnt(x: u32) -> u32 {
    x.leading_zeros()
}

#[inline]
pub fn popcnt(x: u32) -> u32 {
    x.count_ones()
}

//     0: 0
//     1: 0
//  2- 3: 1
//  4- 7: 2
//  8-15: 3
// 16-31: 4
// ...
pub fn prev_pow_of_2_exponent(x: u32) -> u32 {
    if x == 0 {
        return 0;
    }
    31 - lzcnt(x)
}

//    0: 0
//    1: 0
//    2: 1
// 3- 4: 2
// 5- 8: 3
// 9-16: 4
// ...
pub fn next_pow_of_2_exponent(x: u32) -> u32 {
    if x == 0 {
        return 0;
    }
    32 - lzcnt(x - 1)
}

pub fn prev_power_of_2(x: u32) -> u32 {
    if x == 0 {
        return 0;
    }
    1 << prev_pow_of_2_exponent(x)
}

/// Smallest power of two `>= x`. Values above `1 << 31` have no such power in a `u32`.
pub fn next_power_of_2(x: u32) -> u32 {
    if x == 0 {
        return 0;
    }
    debug_assert!(x <= 1 << 31, "next power of two of {x} does not fit in 32 bits");
    1 << next_pow_of_2_exponent(x)
}

/// Rounds `x` up to a multiple of `1 << exponent`.
pub const fn next_multiple_for_pow_of_2(x: u32, exponent: u32) -> u32 {
    let mask = (1u32 << exponent) - 1;
    (x + mask) & !mask
}

/// Number of `1 << exponent` sized blocks needed to cover `x`.
pub const fn next_multiplier_for_pow_of_2(x: u32, exponent: u32) -> u32 {
    let mask = (1u32 << exponent) - 1;
    (x >> exponent) + ((x & mask != 0) as u32)
}

pub const fn align_up(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

/// Bit position of the `n`-th (0-based) set bit of `value`, counting from the LSB.
/// Returns `u32::MAX` if `value` has `n` or fewer set bits.
pub fn nth_set_bit(mut value: u32, mut n: u32) -> u32 {
    if n >= popcnt(value) {
        return u32::MAX;
    }

    // binary search over halves: if the low half holds fewer than n+1 set bits, skip it
    let mut idx = 0;
    let mut width = 16;
    while width >= 1 {
        let mask = (1u32 << width) - 1;
        let count = popcnt(value & mask);
        if n >= count {
            value >>= width;
            n -= count;
            idx += width;
        }
        width >>= 1;
    }

    idx
}
