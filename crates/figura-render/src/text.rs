use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    pub bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            bold: false,
        }
    }
}

impl TextStyle {
    pub fn sized(font_size: f64) -> Self {
        Self {
            font_size,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Font-free estimate: display columns times a per-column advance.
///
/// Wide (CJK) characters count as two columns, which keeps labels in other scripts from
/// overflowing their boxes.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };
        let bold_factor = if style.bold { 1.08 } else { 1.0 };

        let font_size = style.font_size.max(1.0);
        let lines: Vec<&str> = text.split('\n').collect();
        let max_cols = lines.iter().map(|l| l.width()).max().unwrap_or(0);

        TextMetrics {
            width: max_cols as f64 * font_size * char_width_factor * bold_factor,
            height: lines.len() as f64 * font_size * line_height_factor,
            line_count: lines.len(),
        }
    }
}

/// Largest font size in `[min, start]` at which `text` fits in `max_width`.
pub fn fit_font_size(
    measurer: &dyn TextMeasurer,
    text: &str,
    max_width: f64,
    start: f64,
    min: f64,
) -> f64 {
    let mut size = start;
    while size > min {
        if measurer.measure(text, &TextStyle::sized(size)).width <= max_width {
            return size;
        }
        size -= 0.5;
    }
    min
}

/// Greedy word wrap to at most `max_width`, measured at `style`.
pub fn wrap_words(
    measurer: &dyn TextMeasurer,
    text: &str,
    style: &TextStyle,
    max_width: f64,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{cur} {word}")
        };
        if !cur.is_empty() && measurer.measure(&candidate, style).width > max_width {
            lines.push(std::mem::take(&mut cur));
            cur = word.to_string();
        } else {
            cur = candidate;
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_characters_count_double() {
        let m = DeterministicTextMeasurer::default();
        let ascii = m.measure("ab", &TextStyle::sized(10.0));
        let cjk = m.measure("细胞", &TextStyle::sized(10.0));
        assert_eq!(ascii.width, 12.0);
        assert_eq!(cjk.width, 24.0);
    }

    #[test]
    fn font_shrinks_to_fit() {
        let m = DeterministicTextMeasurer::default();
        let size = fit_font_size(&m, "CH3COOH + C2H5OH", 60.0, 14.0, 9.0);
        assert_eq!(size, 9.0);
        assert_eq!(fit_font_size(&m, "H2", 170.0, 14.0, 9.0), 14.0);
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let m = DeterministicTextMeasurer::default();
        let lines = wrap_words(&m, "collect the gas over water", &TextStyle::sized(10.0), 80.0);
        assert_eq!(lines, vec!["collect the", "gas over", "water"]);
    }
}
