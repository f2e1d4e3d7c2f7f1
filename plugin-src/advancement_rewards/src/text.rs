//! Translatable chat text and lang-file based translation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

const BUNDLED_LANG: &str = include_str!("../lang/en_us.json");

#[derive(Debug, Error)]
pub enum LangError {
    #[error("read lang file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse lang file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Argument of a translatable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextArg {
    Number(i64),
    Translatable(TranslatableText),
}

impl From<i64> for TextArg {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<TranslatableText> for TextArg {
    fn from(text: TranslatableText) -> Self {
        Self::Translatable(text)
    }
}

/// A translation key plus its arguments, resolved when the message is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatableText {
    pub key: String,
    pub args: Vec<TextArg>,
}

impl TranslatableText {
    pub fn translate(key: impl Into<String>, args: Vec<TextArg>) -> Self {
        Self {
            key: key.into(),
            args,
        }
    }
}

/// Resolves translatable text to the string shown in chat.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &TranslatableText) -> String;
}

/// Translator backed by a flat `key -> template` JSON lang file.
///
/// Templates use `%s`/`%d` and positional `%1$s` placeholders. Unknown keys
/// render as the key itself.
#[derive(Debug, Clone, Default)]
pub struct LangTranslator {
    entries: HashMap<String, String>,
}

impl LangTranslator {
    pub fn from_json(json: &str) -> Result<Self, LangError> {
        Ok(Self {
            entries: serde_json::from_str(json)?,
        })
    }

    /// English strings shipped with the plugin.
    pub fn bundled() -> Result<Self, LangError> {
        Self::from_json(BUNDLED_LANG)
    }

    /// Bundled strings with the entries of `path` layered on top.
    pub fn bundled_with_overrides(path: &Path) -> Result<Self, LangError> {
        let text = std::fs::read_to_string(path).map_err(|source| LangError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut lang = Self::bundled()?;
        lang.entries.extend(Self::from_json(&text)?.entries);
        Ok(lang)
    }
}

impl Translator for LangTranslator {
    fn translate(&self, text: &TranslatableText) -> String {
        let args: Vec<String> = text
            .args
            .iter()
            .map(|arg| match arg {
                TextArg::Number(n) => n.to_string(),
                TextArg::Translatable(inner) => self.translate(inner),
            })
            .collect();
        match self.entries.get(&text.key) {
            Some(template) => format_template(template, &args),
            None => text.key.clone(),
        }
    }
}

/// Fill `%s`, `%d`, `%N$s` and `%%` placeholders. Placeholders without a matching
/// argument are left as written.
fn format_template(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next = 0usize;
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let spec = &rest[pos + 1..];
        if let Some(after) = spec.strip_prefix('%') {
            out.push('%');
            rest = after;
            continue;
        }

        let digits = spec.chars().take_while(char::is_ascii_digit).count();
        let positional = digits > 0 && spec[digits..].starts_with('$');
        let conv_at = if positional { digits + 1 } else { 0 };

        match spec[conv_at..].chars().next() {
            Some('s' | 'd') => {
                let index = if positional {
                    spec[..digits]
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                } else {
                    next += 1;
                    Some(next - 1)
                };
                let consumed = conv_at + 1;
                match index.and_then(|i| args.get(i)) {
                    Some(arg) => out.push_str(arg),
                    None => out.push_str(&rest[pos..=pos + consumed]),
                }
                rest = &spec[consumed..];
            }
            _ => {
                out.push('%');
                rest = spec;
            }
        }
    }

    out.push_str(rest);
    out
}
