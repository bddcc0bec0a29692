//! Phrase lookup and printf-style interpolation for notice templates.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Resolves a message key to display text.  Translation catalogs live
/// outside this crate; implement this trait to plug one in.
pub trait PhraseBook: Send + Sync {
    fn phrase(&self, key: &str) -> String;
}

/// Returns every key unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Verbatim;

impl PhraseBook for Verbatim {
    fn phrase(&self, key: &str) -> String {
        key.to_owned()
    }
}

/// Case-insensitive lookup table, falling back to the key itself.
#[derive(Debug, Default, Clone)]
pub struct PhraseMap {
    phrases: HashMap<String, String>,
}

impl PhraseMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.phrases.insert(key.to_lowercase(), value.into());
    }
}

impl FromIterator<(String, String)> for PhraseMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(&k, v);
        }
        map
    }
}

impl PhraseBook for PhraseMap {
    fn phrase(&self, key: &str) -> String {
        self.phrases
            .get(&key.to_lowercase())
            .cloned()
            .unwrap_or_else(|| key.to_owned())
    }
}

fn directive_regex() -> &'static Regex {
    static DIRECTIVE: OnceLock<Regex> = OnceLock::new();
    DIRECTIVE.get_or_init(|| {
        Regex::new(r"%(?:(\d+)\$)?([-+0]*)(\d+)?(?:\.(\d+))?([%sduf])").expect("static regex")
    })
}

fn numeric_prefix_regex() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("static regex")
    })
}

/// printf-style substitution of `args` into `template`.
///
/// Directives take the form `%[N$][flags][width][.precision]conv`:
/// - `conv` is one of `s`, `d`, `u`, `f`, or `%` for a literal percent;
/// - flags `-` (left-justify), `0` (zero-pad) and `+` (force sign) are honoured;
/// - precision truncates `%s` and sets the decimals of `%f` (default 6).
///
/// Missing arguments render empty.  Numeric conversions read the longest
/// numeric prefix of the argument (`"12abc"` is 12, `"abc"` is 0) and `%d`
/// truncates toward zero.  Anything else is left as written.
pub fn interpolate<S: AsRef<str>>(template: &str, args: &[S]) -> String {
    let mut next = 0usize;
    directive_regex()
        .replace_all(template, |caps: &Captures<'_>| {
            let conv = &caps[5];
            if conv == "%" {
                return "%".to_owned();
            }
            let idx = match caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok()) {
                Some(pos) if pos > 0 => pos - 1,
                Some(_) => return String::new(),
                None => {
                    let i = next;
                    next += 1;
                    i
                }
            };
            let arg = args.get(idx).map(|a| a.as_ref()).unwrap_or("");
            let flags = caps.get(2).map_or("", |m| m.as_str());
            let width = caps
                .get(3)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .unwrap_or(0);
            let precision = caps.get(4).and_then(|m| m.as_str().parse::<usize>().ok());
            let plus = flags.contains('+');

            let body: String = match conv {
                "s" => match precision {
                    Some(p) => arg.chars().take(p).collect(),
                    None => arg.to_owned(),
                },
                "d" => signed(leading_number(arg) as i64, plus),
                // Negative values wrap to their two's-complement reading.
                "u" => (leading_number(arg) as i64 as u64).to_string(),
                "f" => {
                    let text = format!("{:.*}", precision.unwrap_or(6), leading_number(arg));
                    if plus && !text.starts_with('-') {
                        format!("+{text}")
                    } else {
                        text
                    }
                }
                _ => return caps[0].to_owned(),
            };
            pad(body, width, flags.contains('-'), flags.contains('0'), conv != "s")
        })
        .into_owned()
}

fn signed(n: i64, plus: bool) -> String {
    if plus && n >= 0 {
        format!("+{n}")
    } else {
        n.to_string()
    }
}

/// Pad `body` to `width` characters.  Zero padding goes after any sign on
/// numeric conversions; left-justified output is always space-padded.
fn pad(body: String, width: usize, left: bool, zero: bool, numeric: bool) -> String {
    let len = body.chars().count();
    if len >= width {
        return body;
    }
    let fill = width - len;
    if left {
        return format!("{body}{}", " ".repeat(fill));
    }
    if !zero {
        return format!("{}{body}", " ".repeat(fill));
    }
    let zeros = "0".repeat(fill);
    match body.strip_prefix(['-', '+']) {
        Some(rest) if numeric => format!("{}{zeros}{rest}", &body[..1]),
        _ => format!("{zeros}{body}"),
    }
}

/// Value of the longest numeric prefix of `arg`, or `0` when there is none.
fn leading_number(arg: &str) -> f64 {
    numeric_prefix_regex()
        .find(arg.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_strings() {
        assert_eq!(interpolate("Hello %s", &["World"]), "Hello World");
        assert_eq!(interpolate("%s and %s", &["a", "b"]), "a and b");
    }

    #[test]
    fn positional_and_percent() {
        assert_eq!(interpolate("%2$s before %1$s", &["x", "y"]), "y before x");
        assert_eq!(interpolate("100%% of %s", &["it"]), "100% of it");
    }

    #[test]
    fn numeric_conversions() {
        assert_eq!(interpolate("%d items", &["42"]), "42 items");
        assert_eq!(interpolate("%d items", &["4.9"]), "4 items");
        assert_eq!(interpolate("%d items", &["many"]), "0 items");
        assert_eq!(interpolate("%.2f MB", &["1.5"]), "1.50 MB");
    }

    #[test]
    fn integer_conversions_use_numeric_prefix() {
        assert_eq!(interpolate("%d", &["-0.5"]), "0");
        assert_eq!(interpolate("%d", &["-3.7"]), "-3");
        assert_eq!(interpolate("%d", &["12abc"]), "12");
        assert_eq!(interpolate("%d", &["  7 days"]), "7");
        assert_eq!(interpolate("%d", &["1e3"]), "1000");
        assert_eq!(interpolate("%u", &["5"]), "5");
        assert_eq!(interpolate("%u", &["-1"]), "18446744073709551615");
        assert_eq!(interpolate("%.1f", &["2.71kg"]), "2.7");
    }

    #[test]
    fn width_and_flags_pad_output() {
        assert_eq!(interpolate("[%5s]", &["ab"]), "[   ab]");
        assert_eq!(interpolate("[%-5s]", &["ab"]), "[ab   ]");
        assert_eq!(interpolate("[%05d]", &["-42"]), "[-0042]");
        assert_eq!(interpolate("[%+d]", &["42"]), "[+42]");
        assert_eq!(interpolate("[%8.2f]", &["3.14159"]), "[    3.14]");
        assert_eq!(interpolate("[%2s]", &["longer"]), "[longer]");
        assert_eq!(interpolate("[%1$4s|%1$-4s]", &["x"]), "[   x|x   ]");
    }

    #[test]
    fn string_precision_truncates() {
        assert_eq!(interpolate("[%.2s]", &["abcdef"]), "[ab]");
        assert_eq!(interpolate("[%5.3s]", &["abcdef"]), "[  abc]");
        assert_eq!(interpolate("[%.2s]", &["é€x"]), "[é€]");
    }

    #[test]
    fn missing_args_render_empty() {
        assert_eq!(interpolate("[%s][%s]", &["only"]), "[only][]");
        let none: [&str; 0] = [];
        assert_eq!(interpolate("[%s]", &none), "[]");
    }

    #[test]
    fn unknown_conversions_are_left_alone() {
        assert_eq!(interpolate("50%x done", &["a"]), "50%x done");
    }

    #[test]
    fn phrase_map_is_case_insensitive() {
        let mut map = PhraseMap::new();
        map.insert("Topic Saved", "Sujet enregistré");
        assert_eq!(map.phrase("topic saved"), "Sujet enregistré");
        assert_eq!(map.phrase("Unknown"), "Unknown");
        assert_eq!(Verbatim.phrase("As is"), "As is");
    }
}
