use crate::data_models::Currency;
use crate::errors::ValidationError;
use crate::notify::is_valid_email;
use crate::parser::{clean_price, PriceParser};
use rust_decimal::Decimal;
use std::str::FromStr;

const TRUTHY: [&str; 5] = ["1", "true", "yes", "y", "on"];
const FALSY: [&str; 6] = ["", "0", "false", "no", "n", "off"];

/// Free text typed by the user, normalized before it is compared to anything.
pub trait ExternalText {
    fn cleaned(&self) -> String;
}

impl ExternalText for str {
    fn cleaned(&self) -> String {
        let value = self.trim().to_lowercase();
        value
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect::<String>()
    }
}

pub fn parse_text(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty);
    }
    Ok(value.to_string())
}

pub fn parse_yes_no(raw: &str) -> Result<bool, ValidationError> {
    match raw.cleaned().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        _ => Err(ValidationError::NotYesNo),
    }
}

pub fn parse_url(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    PriceParser::check_url(value).map_err(|_| ValidationError::InvalidUrl(value.to_string()))?;
    Ok(value.to_string())
}

/// Accepts `40`, `40.5`, `£40.00`, `1,299.99` or `39,99 €`.
pub fn parse_price(raw: &str) -> Result<Decimal, ValidationError> {
    let invalid = || ValidationError::InvalidPrice(raw.trim().to_string());
    let core = raw
        .trim()
        .trim_matches(|c: char| !c.is_ascii_digit() && !matches!(c, '-' | '.' | ','));
    if core.starts_with('-') {
        return Err(ValidationError::NegativePrice);
    }
    if core.is_empty() || !core.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return Err(invalid());
    }
    if !is_well_formed_amount(core) {
        return Err(invalid());
    }
    let core = if core.starts_with('.') {
        format!("0{core}")
    } else {
        core.to_string()
    };
    clean_price(&core).map_err(|_| invalid())
}

/// One decimal mark at most. Any other separator must group thousands: `1,299.99`,
/// `1.299,99`, `1.299.000`. Typos such as `39.99.9` do not qualify.
fn is_well_formed_amount(core: &str) -> bool {
    let last_dot = core.rfind('.');
    let last_comma = core.rfind(',');
    let (integer, thousands) = match (last_dot, last_comma) {
        (None, None) => return true,
        (Some(dot), Some(comma)) if dot > comma => (&core[..dot], ','),
        (Some(_), Some(comma)) => (&core[..comma], '.'),
        (Some(_), None) if core.matches('.').count() == 1 => return true,
        (None, Some(_)) if core.matches(',').count() == 1 => return true,
        (Some(_), None) => (core, '.'),
        (None, Some(_)) => (core, ','),
    };
    let mut groups = integer.split(thousands);
    let leading_ok = groups
        .next()
        .is_some_and(|group| (1..=3).contains(&group.len()) && is_digits(group));
    leading_ok && groups.all(|group| group.len() == 3 && is_digits(group))
}

fn is_digits(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_digit())
}

pub fn parse_currency(raw: &str) -> Result<Currency, ValidationError> {
    Currency::from_str(raw)
}

pub fn parse_email(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    is_valid_email(value).map_err(|_| ValidationError::InvalidEmail(value.to_string()))?;
    Ok(value.to_string())
}

/// A menu number between 0 and `max`, both included. `[2]` is read as `2`.
pub fn parse_choice(raw: &str, max: usize) -> Result<usize, ValidationError> {
    let trimmed = raw.trim();
    let value = trimmed
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(trimmed)
        .trim();
    match value.parse::<usize>() {
        Ok(choice) if choice <= max => Ok(choice),
        _ => Err(ValidationError::UnknownChoice(raw.trim().to_string())),
    }
}

/// Reads `cron_job=<value>` or a bare `<value>`.
pub fn parse_cron_job(raw: &str) -> Result<bool, ValidationError> {
    let trimmed = raw.trim();
    let value = match trimmed.split_once('=') {
        Some((key, value)) if key.trim().eq_ignore_ascii_case("cron_job") => value,
        _ => trimmed,
    };
    let value = value.trim().to_lowercase();
    if TRUTHY.contains(&value.as_str()) {
        return Ok(true);
    }
    if FALSY.contains(&value.as_str()) {
        return Ok(false);
    }
    Err(ValidationError::NotABool(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleaned_strips_case_and_punctuation() {
        assert_eq!(" Yes! ".cleaned(), "yes");
        assert_eq!("[1]".cleaned(), "1");
    }

    #[test]
    fn parse_text_rejects_blank() {
        assert_eq!(parse_text("   "), Err(ValidationError::Empty));
        assert_eq!(parse_text(" Kettle ").as_deref(), Ok("Kettle"));
    }

    #[test]
    fn parse_yes_no_works() {
        assert_eq!(parse_yes_no("Y"), Ok(true));
        assert_eq!(parse_yes_no("no."), Ok(false));
        assert_eq!(parse_yes_no("maybe"), Err(ValidationError::NotYesNo));
    }

    #[test]
    fn parse_url_needs_http() {
        assert!(parse_url("https://www.amazon.co.uk/kettle").is_ok());
        assert!(matches!(
            parse_url("www.amazon.co.uk"),
            Err(ValidationError::InvalidUrl(_))
        ));
        assert!(parse_url("mailto:me@example.com").is_err());
    }

    #[test]
    fn parse_price_accepts_common_forms() {
        assert_eq!(parse_price("40"), Ok(Decimal::new(40, 0)));
        assert_eq!(parse_price("£40.00"), Ok(Decimal::new(4000, 2)));
        assert_eq!(parse_price("39,99 €"), Ok(Decimal::new(3999, 2)));
        assert_eq!(parse_price("1,299.99"), Ok(Decimal::new(129999, 2)));
        assert_eq!(parse_price(".5"), Ok(Decimal::new(5, 1)));
        assert_eq!(parse_price("0"), Ok(Decimal::ZERO));
    }

    #[test]
    fn parse_price_rejects_bad_input() {
        assert_eq!(parse_price("-3"), Err(ValidationError::NegativePrice));
        assert!(matches!(parse_price("cheap"), Err(ValidationError::InvalidPrice(_))));
        assert!(matches!(parse_price("4 0"), Err(ValidationError::InvalidPrice(_))));
        assert!(matches!(parse_price(""), Err(ValidationError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_misplaced_separators() {
        for raw in ["40.0.0", "39.99.9", "1,29,9", "1.2,3.4", "12,34.5,6"] {
            assert!(
                matches!(parse_price(raw), Err(ValidationError::InvalidPrice(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn parse_price_accepts_thousands_groups() {
        assert_eq!(parse_price("1.299,99"), Ok(Decimal::new(129999, 2)));
        assert_eq!(parse_price("1,299,000"), Ok(Decimal::new(1299000, 0)));
        assert_eq!(parse_price("1.299.000"), Ok(Decimal::new(1299000, 0)));
    }

    #[test]
    fn parse_email_works() {
        assert_eq!(parse_email(" a@b.cd ").as_deref(), Ok("a@b.cd"));
        assert!(matches!(parse_email("a@b"), Err(ValidationError::InvalidEmail(_))));
    }

    #[test]
    fn parse_choice_respects_range() {
        assert_eq!(parse_choice("0", 5), Ok(0));
        assert_eq!(parse_choice(" 5 ", 5), Ok(5));
        assert!(parse_choice("6", 5).is_err());
        assert!(parse_choice("one", 5).is_err());
        assert_eq!(parse_choice("[2]", 5), Ok(2));
    }

    #[test]
    fn parse_choice_rejects_signs_and_fractions() {
        for raw in ["-1", "+1", "1.5", "1,5", "[1", "1!"] {
            assert_eq!(
                parse_choice(raw, 20),
                Err(ValidationError::UnknownChoice(raw.to_string())),
                "{raw}"
            );
        }
    }

    #[test]
    fn parse_cron_job_truthy_values() {
        for value in ["cron_job=1", "cron_job=TRUE", "yes", "Y", "cron_job=on"] {
            assert_eq!(parse_cron_job(value), Ok(true), "{value}");
        }
    }

    #[test]
    fn parse_cron_job_falsy_values() {
        for value in ["cron_job=0", "cron_job=False", "cron_job=", "no", "off", "N"] {
            assert_eq!(parse_cron_job(value), Ok(false), "{value}");
        }
    }

    #[test]
    fn parse_cron_job_rejects_everything_else() {
        assert_eq!(
            parse_cron_job("cron_job=sometimes"),
            Err(ValidationError::NotABool("sometimes".to_string()))
        );
    }
}
