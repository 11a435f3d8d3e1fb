use serde::Serialize;

pub const LOVELACE_PER_ADA: u64 = 1_000_000;

/// Display formatting handed to column `getValue`/`render` functions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Formatters {
    pub thousands_sep: char,
    pub decimal_sep: char,
    pub ada_symbol: String,
    pub ada_decimals: usize,
}

impl Default for Formatters {
    fn default() -> Self {
        Self {
            thousands_sep: ',',
            decimal_sep: '.',
            ada_symbol: "ADA".to_string(),
            ada_decimals: 2,
        }
    }
}

impl Formatters {
    /// Group digits of an integer: `1234567` -> `1,234,567`.
    pub fn int(&self, n: u64) -> String {
        let digits = n.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(self.thousands_sep);
            }
            out.push(ch);
        }
        out
    }

    fn fixed(&self, value: f64, decimals: usize) -> String {
        let rendered = format!("{:.*}", decimals, value.abs());
        let (whole, frac) = match rendered.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (rendered.as_str(), None),
        };
        let whole: u64 = whole.parse().unwrap_or(0);
        let sign = if value < 0.0 && rendered.chars().any(|c| c.is_ascii_digit() && c != '0') {
            "-"
        } else {
            ""
        };
        match frac {
            Some(f) => format!("{sign}{}{}{f}", self.int(whole), self.decimal_sep),
            None => format!("{sign}{}", self.int(whole)),
        }
    }

    /// Lovelace amount as ADA, e.g. `1,234.50 ADA`.
    pub fn ada(&self, lovelace: u64) -> String {
        let ada = lovelace as f64 / LOVELACE_PER_ADA as f64;
        format!("{} {}", self.fixed(ada, self.ada_decimals), self.ada_symbol)
    }

    /// Compact ADA amount for narrow cells, e.g. `1.5M ADA`.
    pub fn ada_compact(&self, lovelace: u64) -> String {
        let ada = lovelace as f64 / LOVELACE_PER_ADA as f64;
        let (value, suffix) = if ada >= 1e9 {
            (ada / 1e9, "B")
        } else if ada >= 1e6 {
            (ada / 1e6, "M")
        } else if ada >= 1e3 {
            (ada / 1e3, "K")
        } else {
            (ada, "")
        };
        let text = format!("{value:.1}");
        let text = text.strip_suffix(".0").unwrap_or(&text).replace('.', &self.decimal_sep.to_string());
        format!("{text}{suffix} {}", self.ada_symbol)
    }

    /// Ratio as percent: `0.0512` -> `5.12 %`.
    pub fn percent(&self, ratio: f64) -> String {
        format!("{} %", self.fixed(ratio * 100.0, 2))
    }

    /// `abcdef0123456789` -> `abcdef…6789`.
    pub fn short_hash(&self, hash: &str) -> String {
        let chars: Vec<char> = hash.chars().collect();
        if chars.len() <= 12 {
            return hash.to_string();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}…{tail}")
    }
}

/// Stable colour for an identifier, used as a visual hash next to pool names.
pub fn visual_hash(id: &str) -> String {
    // FNV-1a
    let mut h: u32 = 0x811c_9dc5;
    for b in id.bytes() {
        h ^= u32::from(b);
        h = h.wrapping_mul(0x0100_0193);
    }
    format!("#{:06x}", h & 0x00ff_ffff)
}
