//! Validated text primitives shared across the HCMS crates.

/// Rejection reasons for validated text values.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// Input was empty once surrounding whitespace was removed
    #[error("Text is blank")]
    Empty,
    /// Input exceeded the caller's character bound
    #[error("Text is longer than {max} characters")]
    TooLong { max: usize },
}

/// A trimmed string carrying at least one non-whitespace character.
///
/// Required clinical fields (complaints, test names, medicine names,
/// uploaded filenames) are held as `NonEmptyText`, so blank input is
/// rejected where the value is constructed instead of being re-checked
/// at every use site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Trims `input` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] when nothing but whitespace remains.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let text = input.as_ref().trim();
        if text.is_empty() {
            Err(TextError::Empty)
        } else {
            Ok(Self(text.to_owned()))
        }
    }

    /// Like [`NonEmptyText::new`], with an upper bound on length.
    ///
    /// The bound counts characters of the trimmed input, not bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for blank input and
    /// [`TextError::TooLong`] when the trimmed input is longer than
    /// `max` characters.
    pub fn bounded(input: impl AsRef<str>, max: usize) -> Result<Self, TextError> {
        let text = Self::new(input)?;
        if text.0.chars().count() > max {
            return Err(TextError::TooLong { max });
        }
        Ok(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwraps into the owned `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_surrounding_whitespace() {
        let text = NonEmptyText::new("  chest pain  ").expect("should accept non-empty input");
        assert_eq!(text.as_str(), "chest pain");
    }

    #[test]
    fn new_rejects_whitespace_only_input() {
        assert!(matches!(NonEmptyText::new("   \t"), Err(TextError::Empty)));
    }

    #[test]
    fn bounded_rejects_overlong_input() {
        let result = NonEmptyText::bounded("a".repeat(11), 10);
        assert!(matches!(result, Err(TextError::TooLong { max: 10 })));
    }

    #[test]
    fn bounded_counts_characters_after_trimming() {
        let text = NonEmptyText::bounded("  fever   ", 5).expect("trimmed input fits the bound");
        assert_eq!(text.as_str(), "fever");
    }

    #[test]
    fn deserialize_rejects_blank_json_string() {
        let result: Result<NonEmptyText, _> = serde_json::from_str("\"  \"");
        assert!(result.is_err());
    }
}
