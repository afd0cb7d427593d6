//! Value stringification for the gauges.
//!
//! Every gauge value fits in four characters. The truncating formatter is
//! the one place that decides how a float becomes those four characters.

use core::fmt::{self, Write};

use heapless::String;

/// Text produced for one value. Longer than any rendered string; anything
/// beyond the capacity is dropped.
pub type ValueText = String<24>;

/// Characters kept by [`truncated`].
pub const VALUE_WIDTH: usize = 4;

/// Magnitudes from here up are written in exponent form.
const EXPONENT_ABOVE: f64 = 1e16;

/// Nonzero magnitudes below this are written in exponent form.
const EXPONENT_BELOW: f64 = 1e-4;

/// Writer that keeps the leading characters that fit into a [`ValueText`].
#[derive(Default)]
struct Clipped {
    text: ValueText,
    clipped: bool,
}

impl Write for Clipped {
    fn write_str(
        &mut self,
        s: &str,
    ) -> fmt::Result {
        for ch in s.chars() {
            if self.text.push(ch).is_err() {
                self.clipped = true;
                break;
            }
        }
        Ok(())
    }
}

fn clipped(args: fmt::Arguments<'_>) -> Clipped {
    let mut out = Clipped::default();
    out.write_fmt(args).ok();
    out
}

/// Exponent form with a signed, zero padded exponent (`1e+16`, `1.5e-05`).
fn exponent(value: f64) -> ValueText {
    let lower = clipped(format_args!("{value:e}")).text;
    let Some((mantissa, exp)) = lower.split_once('e') else {
        return lower;
    };
    let (sign, digits) = exp.strip_prefix('-').map_or(('+', exp), |digits| ('-', digits));
    clipped(format_args!("{mantissa}e{sign}{digits:0>2}")).text
}

/// Shortest round-trip form of `value`, with `.0` appended to integral
/// values (`5.0`, `1234.5`, `-0.25`). Very large and very small magnitudes
/// use exponent form (`1e+16`, `1.5e-05`).
pub fn decimal(value: f64) -> ValueText {
    let magnitude = if value < 0.0 { -value } else { value };
    if value.is_finite() && (magnitude >= EXPONENT_ABOVE || (magnitude != 0.0 && magnitude < EXPONENT_BELOW)) {
        return exponent(value);
    }

    let mut out = clipped(format_args!("{value}"));
    if value.is_finite() && !out.clipped && !out.text.contains('.') {
        out.text.push_str(".0").ok();
    }
    out.text
}

/// Decimal form cut to [`VALUE_WIDTH`] characters: 1234.5 → `1234`,
/// 1.2345 → `1.23`, 5.0 → `5.0`.
pub fn truncated(value: f64) -> ValueText {
    let mut text = decimal(value);
    let cut = text.char_indices().nth(VALUE_WIDTH).map_or(text.len(), |(index, _)| index);
    text.truncate(cut);
    text
}

/// Rounded to zero decimals (`{:.0}`, ties to even).
pub fn rounded(value: f64) -> ValueText { clipped(format_args!("{value:.0}")).text }

/// Digits before the decimal point. Truncates toward zero and keeps the sign
/// (`-0.5` → `-0`).
pub fn integer_part(value: f64) -> ValueText {
    let mut text = clipped(format_args!("{value}")).text;
    if let Some(dot) = text.find('.') {
        text.truncate(dot);
    }
    text
}

/// Two decimals followed by `suffix` (`23.47p`).
pub fn fixed2(
    value: f64,
    suffix: &str,
) -> ValueText {
    clipped(format_args!("{value:.2}{suffix}")).text
}
