//! Categorical fields derived from free-text identifiers.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Process layer encoded somewhere inside a recipe id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    #[serde(rename = "BP")]
    Bp,
    #[serde(rename = "PFA")]
    Pfa,
    #[serde(rename = "AS")]
    As,
}

impl Layer {
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Bp => "BP",
            Layer::Pfa => "PFA",
            Layer::As => "AS",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "BP" => Some(Layer::Bp),
            "PFA" => Some(Layer::Pfa),
            "AS" => Some(Layer::As),
            _ => None,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static LAYER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("BP|PFA|AS").expect("regex"));

/// Leftmost layer code appearing anywhere in `recipe_id` (case-sensitive).
pub fn extract_layer(recipe_id: &str) -> Option<Layer> {
    LAYER_RE
        .find(recipe_id)
        .and_then(|m| Layer::from_code(m.as_str()))
}

/// First four characters of an identifier, or all of it when shorter.
pub fn prefix_code(id: &str) -> &str {
    match id.char_indices().nth(4) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Whether two identifiers share the same four-character prefix code.
pub fn prefixes_match(a: &str, b: &str) -> bool {
    prefix_code(a) == prefix_code(b)
}

/// Recipes of the remote-plasma chamber clean start with `RPSC`.
pub fn is_rpsc(recipe_id: &str) -> bool {
    recipe_id.starts_with("RPSC")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_from_recipe() {
        assert_eq!(extract_layer("RPSC_BP_001"), Some(Layer::Bp));
        assert_eq!(extract_layer("CVD-PFA-7"), Some(Layer::Pfa));
        assert_eq!(extract_layer("XYZ123"), None);
        assert_eq!(extract_layer(""), None);
    }

    #[test]
    fn leftmost_match_wins() {
        assert_eq!(extract_layer("AS_then_BP"), Some(Layer::As));
        assert_eq!(extract_layer("xPFAxAS"), Some(Layer::Pfa));
    }

    #[test]
    fn layer_match_is_case_sensitive() {
        assert_eq!(extract_layer("rpsc_bp_001"), None);
    }

    #[test]
    fn prefix_codes() {
        assert_eq!(prefix_code("ABCD1234"), "ABCD");
        assert_eq!(prefix_code("AB"), "AB");
        assert_eq!(prefix_code(""), "");
        assert_eq!(prefix_code("玻璃片號碼"), "玻璃片號");
        assert!(prefixes_match("ABCD1234", "ABCDxyz"));
        assert!(!prefixes_match("ABCD1234", "ABCE1234"));
    }

    #[test]
    fn rpsc_detection() {
        assert!(is_rpsc("RPSC_BP_001"));
        assert!(!is_rpsc("XRPSC"));
    }
}
