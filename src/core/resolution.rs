use crate::core::error::{DownloadError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Resolutions offered in the video prompt hint.
pub const AVAILABLE_RESOLUTIONS: [u32; 8] = [2160, 1440, 1080, 720, 480, 360, 240, 144];

fn resolution_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([0-9]+)(?:p([0-9]+))?$").expect("static regex"))
}

/// Keeps ASCII digits and the lowercase letter `p`, in their original order.
///
/// The filter is case-sensitive: `"1080P!!"` becomes `"1080"`.
pub fn clean_resolution(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'p')
        .collect()
}

/// A validated target resolution such as `720` or `1080p60`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    raw: String,
    cleaned: String,
    height: String,
    fps: Option<String>,
}

impl Resolution {
    /// Accepts all-digit input or digits, `p`, digits. Anything else
    /// (including the empty string) is rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let captures = resolution_pattern()
            .captures(input)
            .ok_or_else(|| DownloadError::InvalidResolution(input.to_string()))?;
        let height = captures[1].to_string();
        let fps = captures.get(2).map(|m| m.as_str().to_string());

        Ok(Self {
            raw: input.to_string(),
            cleaned: clean_resolution(input),
            height,
            fps,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn cleaned(&self) -> &str {
        &self.cleaned
    }

    /// Height digits as typed; they may exceed any fixed-width integer.
    pub fn height(&self) -> &str {
        &self.height
    }

    pub fn fps(&self) -> Option<&str> {
        self.fps.as_deref()
    }

    /// Stream constraint used inside the format selection expression,
    /// e.g. `[height<=720]` or `[height<=720][fps<=60]`.
    pub fn constraint(&self) -> String {
        match &self.fps {
            Some(fps) => format!("[height<={}][fps<={}]", self.height, fps),
            None => format!("[height<={}]", self.height),
        }
    }

    /// Suffix placed after the title in the output template.
    pub fn file_label(&self) -> String {
        format!("{}p", self.cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_resolution() {
        assert_eq!(clean_resolution("1080p60"), "1080p60");
        assert_eq!(clean_resolution("720 "), "720");
        assert_eq!(clean_resolution("1080P!!"), "1080");
        assert_eq!(clean_resolution("a7b2c0p"), "720p");
        assert_eq!(clean_resolution(""), "");
        assert_eq!(clean_resolution("４８０"), "");
    }

    #[test]
    fn test_parse_accepts_valid_forms() {
        let plain = Resolution::parse("720").unwrap();
        assert_eq!(plain.height(), "720");
        assert_eq!(plain.fps(), None);
        assert_eq!(plain.constraint(), "[height<=720]");
        assert_eq!(plain.file_label(), "720p");

        let with_fps = Resolution::parse("1080p60").unwrap();
        assert_eq!(with_fps.height(), "1080");
        assert_eq!(with_fps.fps(), Some("60"));
        assert_eq!(with_fps.constraint(), "[height<=1080][fps<=60]");
        assert_eq!(with_fps.cleaned(), "1080p60");
    }

    #[test]
    fn test_parse_accepts_heights_beyond_u32() {
        let huge = Resolution::parse("99999999999").unwrap();
        assert_eq!(huge.height(), "99999999999");
        assert_eq!(huge.constraint(), "[height<=99999999999]");
        assert_eq!(huge.file_label(), "99999999999p");

        let huge_fps = Resolution::parse("720p99999999999").unwrap();
        assert_eq!(huge_fps.fps(), Some("99999999999"));
    }

    #[test]
    fn test_parse_rejects_invalid_forms() {
        for input in ["", "abc", "1080x", "720p", "p60", "720 p60", " 720", "1080P60"] {
            assert!(
                matches!(Resolution::parse(input), Err(DownloadError::InvalidResolution(_))),
                "{input:?} should be rejected"
            );
        }
    }
}
