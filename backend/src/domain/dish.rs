//! Validated dish names.

use thiserror::Error;

/// Longest accepted dish name, counted in UTF-16 code units after trimming.
pub const DISH_NAME_MAX_LENGTH: usize = 100;

/// Reasons a raw dish name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DishNameError {
    /// Nothing but whitespace was supplied.
    #[error("Dish name cannot be empty or whitespace")]
    Empty,
    /// The trimmed name is longer than [`DISH_NAME_MAX_LENGTH`].
    #[error("Dish name must be {DISH_NAME_MAX_LENGTH} characters or less")]
    TooLong {
        /// UTF-16 length of the trimmed input.
        length: usize,
    },
}

/// Trimmed dish name with tag-like markup removed.
///
/// # Examples
/// ```
/// use carbon_api::domain::DishName;
///
/// let dish = DishName::parse("  <b>Chicken</b> Biryani ").expect("valid dish");
/// assert_eq!(dish.as_str(), "Chicken Biryani");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DishName(String);

impl DishName {
    /// Validate and sanitise a raw dish name.
    ///
    /// Length is checked on the trimmed input before markup is stripped, so a
    /// name made only of tags is accepted and sanitises to an empty string.
    /// Characters outside the Basic Multilingual Plane count twice, matching
    /// how browsers report string length.
    ///
    /// # Errors
    /// Returns [`DishNameError::Empty`] for blank input and
    /// [`DishNameError::TooLong`] past [`DISH_NAME_MAX_LENGTH`] code units.
    pub fn parse(raw: &str) -> Result<Self, DishNameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DishNameError::Empty);
        }
        let length = trimmed.encode_utf16().count();
        if length > DISH_NAME_MAX_LENGTH {
            return Err(DishNameError::TooLong { length });
        }
        Ok(Self(strip_tags(trimmed)))
    }

    /// Borrow the sanitised name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for DishName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for DishName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drop every `<...>` run. An unterminated `<` swallows the rest of the input.
fn strip_tags(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match (in_tag, ch) {
            (false, '<') => in_tag = true,
            (false, _) => output.push(ch),
            (true, '>') => in_tag = false,
            (true, _) => {}
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Chicken Biryani", "Chicken Biryani")]
    #[case("   salad\t\n", "salad")]
    #[case("<script>alert(1)</script>Pasta", "alert(1)Pasta")]
    #[case("Fish <b>and</b> chips", "Fish and chips")]
    #[case("a < b", "a ")]
    #[case("<img src=x onerror=alert(1)>", "")]
    #[case("5 > 3", "5 > 3")]
    fn parse_trims_and_strips_markup(#[case] raw: &str, #[case] expected: &str) {
        let dish = DishName::parse(raw).expect("valid dish");
        assert_eq!(dish.as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t ")]
    fn parse_rejects_blank(#[case] raw: &str) {
        assert_eq!(DishName::parse(raw), Err(DishNameError::Empty));
    }

    #[rstest]
    fn parse_accepts_exactly_max_length() {
        let raw = "a".repeat(DISH_NAME_MAX_LENGTH);
        assert!(DishName::parse(&raw).is_ok());
    }

    #[rstest]
    fn parse_rejects_over_max_length_after_trim() {
        let raw = format!("  {}  ", "a".repeat(DISH_NAME_MAX_LENGTH + 1));
        assert_eq!(
            DishName::parse(&raw),
            Err(DishNameError::TooLong { length: 101 })
        );
    }

    #[rstest]
    fn length_counts_code_units_not_bytes() {
        let raw = "é".repeat(DISH_NAME_MAX_LENGTH);
        assert!(DishName::parse(&raw).is_ok());
    }

    #[rstest]
    fn astral_characters_count_as_two_units() {
        let raw = "\u{1D4D0}".repeat(60);
        assert_eq!(
            DishName::parse(&raw),
            Err(DishNameError::TooLong { length: 120 })
        );
        assert!(DishName::parse(&"\u{1D4D0}".repeat(50)).is_ok());
    }

    #[rstest]
    fn error_messages_match_wire_text() {
        assert_eq!(
            DishNameError::Empty.to_string(),
            "Dish name cannot be empty or whitespace"
        );
        assert_eq!(
            DishNameError::TooLong { length: 101 }.to_string(),
            "Dish name must be 100 characters or less"
        );
    }
}
