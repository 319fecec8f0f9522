use crate::error::RecoveryError;
use std::str::FromStr;

/// Closed set of source languages with known keyword lists.
///
/// Each language maps to an ordered list of literal substrings expected
/// to occur verbatim in decrypted plaintext of that language. Unknown
/// tags fail fast at parse time instead of deep inside a recovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    C,
    Php,
    CSharp,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::C, Language::Php, Language::CSharp];

    /// The anchor keywords probed for this language, strongest first.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Language::C => &[
                "return ",
                "return;",
                "#include ",
                "#DEFINE ",
                "#define ",
                "#IFDEF",
                "static void",
                "const char",
                "const",
                "char *",
                "struct",
                "extern",
                "static",
                "      ",
                "        ",
                "malloc",
                "printf",
                "sprintf",
                "stdio.h",
                "Copyright",
                "GNU General Public License",
            ],
            Language::Php => &[
                "this",
                "array(",
                "function ",
                "return ",
                "return;",
                "public ",
                "<?php",
                "class ",
                "false",
                "true",
                "null",
                "      ",
                "        ",
                "Copyright",
            ],
            Language::CSharp => &[
                "private void InitializeComponent",
                "private System.Windows.Forms",
                "static void Main(string[] args)",
                "private void",
                "public void",
                "this.",
                "public ",
                "        ",
                "private ",
            ],
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Language::C => "C",
            Language::Php => "PHP",
            Language::CSharp => "CS",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = RecoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "C" => Ok(Language::C),
            "PHP" => Ok(Language::Php),
            "CS" | "CSHARP" | "C#" => Ok(Language::CSharp),
            other => Err(RecoveryError::UnknownLanguage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!("C".parse::<Language>().unwrap(), Language::C);
        assert_eq!("php".parse::<Language>().unwrap(), Language::Php);
        assert_eq!("CS".parse::<Language>().unwrap(), Language::CSharp);
    }

    #[test]
    fn test_parse_unknown_tag_fails_fast() {
        assert!(matches!(
            "COBOL".parse::<Language>(),
            Err(RecoveryError::UnknownLanguage(tag)) if tag == "COBOL"
        ));
    }

    #[test]
    fn test_keyword_lists_are_nonempty_ascii() {
        for lang in Language::ALL {
            let keywords = lang.keywords();
            assert!(!keywords.is_empty());
            for kw in keywords {
                assert!(!kw.is_empty());
                assert!(kw.is_ascii());
            }
        }
    }
}
