use super::*;

fn system_book() -> Option<FontBook> {
    let book = FontBook::with_system_fallback();
    (!book.is_empty()).then_some(book)
}

#[test]
fn empty_book_has_no_face() {
    let book = FontBook::new();
    assert!(book.is_empty());
    assert!(book.face("Dumbledor").is_none());
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let mut book = FontBook::new();
    assert!(book.add_font_bytes(b"not a font".to_vec()).is_err());
    assert!(book.is_empty());
}

#[test]
fn unknown_family_falls_back_to_first_face() {
    let Some(book) = system_book() else {
        return;
    };
    let first = book.families().next().unwrap().to_string();
    assert_eq!(book.face("No Such Family").unwrap().family, first);
    assert_eq!(book.face(&first.to_uppercase()).unwrap().family, first);
}

#[test]
fn shaping_width_grows_with_text_and_spacing() {
    let Some(book) = system_book() else {
        return;
    };
    let face = book.face("any").unwrap();
    let short = book.shape(face, "Imp", 20.0, 0.0).unwrap();
    let long = book.shape(face, "Imp Imp", 20.0, 0.0).unwrap();
    let spaced = book.shape(face, "Imp", 20.0, 4.0).unwrap();
    assert!(short.width > 0.0);
    assert!(long.width > short.width);
    assert!(spaced.width > short.width);
    assert_eq!(short.glyphs.len(), 3);
    assert!(short.ascent > 0.0);

    let m = book.measurer(face, 0.0);
    assert!((m.measure("Imp", 20.0) - short.width).abs() < 1e-6);
    assert!(book.shape(face, "Imp", 0.0, 0.0).is_err());
}
