//! Field-observation codes: hand hardness and grain classification.

/// Hand-hardness index for a field code.
///
/// Base codes map `F`=1, `4F`=2, `1F`=3, `P`=4, `K`=5, `I`=6. A trailing `+`
/// or `-` shifts by a third of a step. A range such as `4F-1F` resolves to
/// the mean of both ends. Unknown codes yield `None`.
pub fn hand_hardness_index(code: &str) -> Option<f64> {
    let code = code.trim();
    if let Some((lo, hi)) = code.split_once('-').filter(|(lo, hi)| !lo.is_empty() && !hi.is_empty()) {
        return Some((single_hardness(lo)? + single_hardness(hi)?) / 2.0);
    }
    single_hardness(code)
}

fn single_hardness(code: &str) -> Option<f64> {
    let code = code.trim().to_ascii_uppercase();
    let (base, shift) = if let Some(base) = code.strip_suffix('+') {
        (base, 1.0 / 3.0)
    } else if let Some(base) = code.strip_suffix('-') {
        (base, -1.0 / 3.0)
    } else {
        (code.as_str(), 0.0)
    };
    let index = match base {
        "F" => 1.0,
        "4F" => 2.0,
        "1F" => 3.0,
        "P" => 4.0,
        "K" => 5.0,
        "I" => 6.0,
        _ => return None,
    };
    Some(index + shift)
}

/// The two-letter basic grain class of a code (`RGmx` -> `RG`).
pub fn basic_grain_class(code: &str) -> Option<&str> {
    let basic = code.get(..2)?;
    basic.chars().all(|c| c.is_ascii_uppercase()).then_some(basic)
}

/// Picks the grain code variant a method accepts.
///
/// The full sub-class code wins when the method lists it, otherwise the
/// basic class is tried. `valid = None` means the method accepts any code.
pub fn resolve_grain_code<'a>(code: &'a str, valid: Option<&[String]>) -> Option<&'a str> {
    let code = code.trim();
    let Some(valid) = valid else {
        return (!code.is_empty()).then_some(code);
    };
    if valid.iter().any(|v| v == code) {
        return Some(code);
    }
    let basic = basic_grain_class(code)?;
    valid.iter().any(|v| v == basic).then_some(basic)
}
