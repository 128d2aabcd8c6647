// Canonical text forms for numbers, reseed/key digits and draw identifiers.
//
// Every comparison in the evaluators happens on these canonical strings:
// - balls and stars are zero-padded to two digits ("7" -> "07")
// - reseed and key digits drop leading zeros ("07" -> "7")
// - draw identifiers are three-digit codes ("7" -> "007", "2025/128" -> "128")

use crate::error::MatchError;

/// Normalize a single ball/star value to its two-digit form ("7", "07", "007" -> "07")
pub fn normalize_number(raw: &str) -> Result<String, MatchError> {
    let s = raw.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(MatchError::InvalidNumber(raw.to_string()));
    }
    let significant = s.trim_start_matches('0');
    let significant = if significant.is_empty() { "0" } else { significant };
    Ok(format!("{:0>2}", significant))
}

/// Normalize a reseed or key digit so that "07" and "7" compare equal
pub fn normalize_digit(raw: &str) -> Result<String, MatchError> {
    let s = raw.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(MatchError::InvalidDigit(raw.to_string()));
    }
    let trimmed = s.trim_start_matches('0');
    Ok(if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() })
}

/// Split a number list into canonical two-digit strings.
///
/// Accepts separated lists ("1, 2 ,03" or "01 02 03" or "01-02-03") and the
/// packed form stored on tickets ("010203"), which is read two characters at a time.
pub fn parse_number_list(raw: &str) -> Result<Vec<String>, MatchError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }

    let separated = s.contains(|c: char| c == ',' || c == ';' || c == '-' || c.is_whitespace());
    if separated {
        return s
            .split(|c: char| c == ',' || c == ';' || c == '-' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(normalize_number)
            .collect();
    }

    if !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(MatchError::InvalidNumber(raw.to_string()));
    }

    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(2)
        .map(|pair| normalize_number(&pair.iter().collect::<String>()))
        .collect()
}

/// Normalize a draw identifier to its three-digit code.
///
/// Compound legacy codes ("2025/128") keep only the part after the slash;
/// otherwise the first run of digits is used.
pub fn normalize_draw_id(raw: &str) -> Result<String, MatchError> {
    let s = raw.trim();
    let tail = match s.rsplit_once('/') {
        Some((_, tail)) if !tail.trim().is_empty() => tail.trim(),
        _ => s,
    };

    let digits: String = tail
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return Err(MatchError::InvalidDrawId(raw.to_string()));
    }

    let significant = digits.trim_start_matches('0');
    let significant = if significant.is_empty() { "0" } else { significant };
    Ok(format!("{:0>3}", significant))
}

/// True when a stored draw identifier refers to the normalized code, including
/// legacy compound records where only the numeric suffix is significant.
pub fn draw_id_matches(stored: &str, normalized: &str) -> bool {
    let stored = stored.trim();
    if stored == normalized {
        return true;
    }
    match stored.rsplit_once('/') {
        Some((_, tail)) => normalize_draw_id(tail).map(|t| t == normalized).unwrap_or(false),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_number_pads() {
        assert_eq!(normalize_number("7").unwrap(), "07");
        assert_eq!(normalize_number(" 42 ").unwrap(), "42");
        assert_eq!(normalize_number("007").unwrap(), "07");
        assert_eq!(normalize_number("0").unwrap(), "00");
        assert_eq!(normalize_number("000").unwrap(), "00");
        assert!(normalize_number("4a").is_err());
        assert!(normalize_number("").is_err());
    }

    #[test]
    fn test_normalize_digit_drops_leading_zeros() {
        assert_eq!(normalize_digit("07").unwrap(), "7");
        assert_eq!(normalize_digit("0").unwrap(), "0");
        assert_eq!(normalize_digit("00").unwrap(), "0");
        assert!(normalize_digit("x").is_err());
    }

    #[test]
    fn test_parse_packed_ticket_numbers() {
        let numbers = parse_number_list("010203040506").unwrap();
        assert_eq!(numbers, vec!["01", "02", "03", "04", "05", "06"]);

        let numbers = parse_number_list("01 02 3").unwrap();
        assert_eq!(numbers, vec!["01", "02", "03"]);
    }

    #[test]
    fn test_parse_comma_list() {
        let numbers = parse_number_list("1, 12,33").unwrap();
        assert_eq!(numbers, vec!["01", "12", "33"]);
        assert!(parse_number_list("").unwrap().is_empty());
        assert!(parse_number_list("1,x").is_err());
    }

    #[test]
    fn test_normalize_draw_id() {
        assert_eq!(normalize_draw_id("7").unwrap(), "007");
        assert_eq!(normalize_draw_id("042").unwrap(), "042");
        assert_eq!(normalize_draw_id("2025/128").unwrap(), "128");
        assert_eq!(normalize_draw_id("Sorteo 12").unwrap(), "012");
        assert!(normalize_draw_id("abc").is_err());
    }

    #[test]
    fn test_legacy_draw_id_matching() {
        assert!(draw_id_matches("128", "128"));
        assert!(draw_id_matches("2025/128", "128"));
        assert!(draw_id_matches("2025/28", "028"));
        assert!(!draw_id_matches("2025/129", "128"));
        assert!(!draw_id_matches("1280", "128"));
    }
}
