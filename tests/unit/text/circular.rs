use super::*;

/// Every character is half the font size wide.
struct FixedWidth;

impl TextMeasure for FixedWidth {
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * 0.5
    }
}

fn params(max_lines: usize) -> CircularTextParams {
    CircularTextParams {
        diameter: 300.0,
        font_size: 10.0,
        line_height: 1.2,
        start_y: 40.0,
        padding: 20.0,
        max_lines,
    }
}

#[test]
fn short_text_is_one_line() {
    let layout = calculate_circular_text_layout("Each night", &params(5), &FixedWidth);
    assert_eq!(layout.lines.len(), 1);
    assert_eq!(layout.lines[0].text, "Each night");
    assert!((layout.total_height - 12.0).abs() < 1e-9);
    assert!(!layout.truncated);
}

#[test]
fn every_line_respects_its_chord() {
    let text = "Each night*, choose a player: they die. If you kill yourself this way, \
                a Minion becomes the Imp.";
    let p = params(8);
    let layout = calculate_circular_text_layout(text, &p, &FixedWidth);
    assert!(layout.lines.len() > 1);
    for (i, line) in layout.lines.iter().enumerate() {
        let top = p.start_y + i as f64 * layout.line_height_px;
        let chord = chord_width(p.diameter, top, layout.line_height_px, p.padding);
        assert!((line.max_width - chord).abs() < 1e-9);
        assert!(line.width <= chord + 1e-9, "line {i} too wide");
    }
    // Rows nearer the center are wider.
    assert!(layout.lines[1].max_width > layout.lines[0].max_width);
    assert_eq!(
        layout.total_height,
        layout.lines.len() as f64 * layout.line_height_px
    );
}

#[test]
fn chord_uses_farther_row_edge() {
    // Row straddling the center is bounded by its farther edge.
    let w = chord_width(100.0, 45.0, 20.0, 0.0);
    let dy: f64 = 15.0;
    assert!((w - 2.0 * (2500.0 - dy * dy).sqrt()).abs() < 1e-9);
    assert_eq!(chord_width(100.0, 100.0, 10.0, 0.0), 0.0);
}

#[test]
fn max_lines_truncates_with_ellipsis() {
    let text = "one two three four five six seven eight nine ten eleven twelve thirteen \
                fourteen fifteen sixteen seventeen eighteen nineteen twenty";
    let layout = calculate_circular_text_layout(text, &params(2), &FixedWidth);
    assert_eq!(layout.lines.len(), 2);
    assert!(layout.truncated);
    let last = layout.lines.last().unwrap();
    assert!(last.text.ends_with('\u{2026}'));
    assert!(last.width <= last.max_width);
}

#[test]
fn stops_when_longest_word_cannot_fit() {
    let mut p = params(5);
    p.start_y = 0.0;
    let layout = calculate_circular_text_layout("Supercalifragilistic", &p, &FixedWidth);
    assert!(layout.lines.is_empty());
    assert!(layout.truncated);
}

#[test]
fn explicit_newlines_break_rows() {
    let layout = calculate_circular_text_layout("a b\nc", &params(5), &FixedWidth);
    let texts: Vec<_> = layout.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["a b", "c"]);
}

#[test]
fn fitting_shrinks_until_untruncated() {
    let text = "one two three four five six seven eight nine ten eleven twelve";
    let p = params(1);
    let fitted = fit_circular_text_layout(text, &p, 4.0, &FixedWidth);
    assert!(!fitted.truncated);
    assert!(fitted.font_size < p.font_size);
    assert!(fitted.font_size >= 4.0);

    let floor = fit_circular_text_layout(text, &p, 9.9, &FixedWidth);
    assert!(floor.truncated);
    assert_eq!(floor.font_size, p.font_size);
}
