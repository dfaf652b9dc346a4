use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RegistryError;

/// Output kind produced by a preprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Markup,
    Style,
    Script,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Markup, Category::Style, Category::Script];

    /// Extension of the compiled file.
    pub fn output_extension(self) -> &'static str {
        match self {
            Category::Markup => "html",
            Category::Style => "css",
            Category::Script => "js",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Markup => "markup",
            Category::Style => "style",
            Category::Script => "script",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markup" | "html" => Ok(Category::Markup),
            "style" | "css" => Ok(Category::Style),
            "script" | "js" => Ok(Category::Script),
            other => Err(RegistryError::UnknownCategory(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_aliases() {
        assert_eq!("markup".parse::<Category>().unwrap(), Category::Markup);
        assert_eq!("CSS".parse::<Category>().unwrap(), Category::Style);
        assert_eq!("js".parse::<Category>().unwrap(), Category::Script);
        assert!("images".parse::<Category>().is_err());
    }

    #[test]
    fn test_output_extensions() {
        assert_eq!(Category::Markup.output_extension(), "html");
        assert_eq!(Category::Style.output_extension(), "css");
        assert_eq!(Category::Script.output_extension(), "js");
    }
}
