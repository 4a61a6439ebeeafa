use fixed::types::I32F32;

/// Q32.32 fixed-point used for every ratio in the engine: profitability,
/// reliability, quality, efficiency gains, and derived metric rates.
pub type Fixed64 = I32F32;

/// Convert an f64 to Fixed64. Use only for fixtures and catalog loading.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::saturating_from_num(v)
}

/// Convert Fixed64 to f64. Use only for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Exact Q32.32 quotient of two integers. Saturates at the Fixed64 range and
/// returns zero for a zero denominator.
pub fn ratio(numerator: i64, denominator: i64) -> Fixed64 {
    if denominator == 0 {
        return Fixed64::ZERO;
    }
    let bits = ((numerator as i128) << 32) / denominator as i128;
    Fixed64::from_bits(bits.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
}

/// Scale an integer amount by a fixed-point factor, truncating toward zero.
pub fn scale(amount: i64, factor: Fixed64) -> i64 {
    let product = (amount as i128 * factor.to_bits() as i128) / (1i128 << 32);
    product.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Clamp a value into the unit interval [0, 1].
pub fn clamp_unit(v: Fixed64) -> Fixed64 {
    v.clamp(Fixed64::ZERO, Fixed64::ONE)
}

/// Arithmetic mean of a set of fixed-point values; zero for an empty set.
pub fn mean(values: impl IntoIterator<Item = Fixed64>) -> Fixed64 {
    let mut sum = Fixed64::ZERO;
    let mut count: i32 = 0;
    for v in values {
        sum = sum.saturating_add(v);
        count = count.saturating_add(1);
    }
    if count == 0 {
        Fixed64::ZERO
    } else {
        sum / Fixed64::from_num(count)
    }
}

/// Render a fixed-point value as exact decimal text.
///
/// Every Q32.32 value is a multiple of 2^-32, so its expansion terminates
/// within 32 fractional digits. Integers carry no fractional part.
pub fn decimal_text(v: Fixed64) -> String {
    const FRAC_MASK: u64 = (1 << 32) - 1;
    let bits = v.to_bits();
    let magnitude = bits.unsigned_abs();
    let mut text = String::new();
    if bits < 0 {
        text.push('-');
    }
    text.push_str(&(magnitude >> 32).to_string());
    let mut frac = magnitude & FRAC_MASK;
    if frac != 0 {
        text.push('.');
        while frac != 0 {
            // frac < 2^32, so frac * 10 fits in a u64.
            frac *= 10;
            let digit = (frac >> 32) as u8;
            text.push(char::from(b'0' + digit));
            frac &= FRAC_MASK;
        }
    }
    text
}
