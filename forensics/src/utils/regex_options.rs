use super::error::UtilsError;
use log::error;
use regex::Regex;

/// Compile a regex pattern. An empty pattern matches everything
pub(crate) fn create_regex(input: &str) -> Result<Regex, UtilsError> {
    let reg_result = Regex::new(input);
    match reg_result {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[regex] Bad regex {input}, error: {err:?}");
            Err(UtilsError::Regex)
        }
    }
}

/// Check if provided input matches regex
pub(crate) fn regex_check(reg: &Regex, input: &str) -> bool {
    reg.is_match(input)
}

#[cfg(test)]
mod tests {
    use super::{create_regex, regex_check};

    #[test]
    fn test_create_regex() {
        let result = create_regex("(?i)ntuser\\.dat$").unwrap();
        assert_eq!(result.as_str(), "(?i)ntuser\\.dat$");
    }

    #[test]
    #[should_panic(expected = "Regex")]
    fn test_create_regex_bad() {
        let _ = create_regex("[[[bad").unwrap();
    }

    #[test]
    fn test_regex_check() {
        let reg = create_regex("").unwrap();
        assert_eq!(regex_check(&reg, "any input at all"), true);

        let reg = create_regex("(?i)explorer\\.exe$").unwrap();
        assert_eq!(regex_check(&reg, "C:\\Windows\\Explorer.EXE"), true);
        assert_eq!(regex_check(&reg, "C:\\Windows\\notepad.exe"), false);
    }
}
