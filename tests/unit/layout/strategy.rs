use super::*;

fn ctx(text_block: Option<TextBlock>) -> IconLayoutContext {
    IconLayoutContext {
        diameter: 300.0,
        icon: IconTransform::default(),
        text_block,
    }
}

#[test]
fn selection_is_keyed_by_kind_and_text() {
    use IconLayoutStrategy as S;
    assert_eq!(S::select(TokenKind::Character, true), S::CharacterWithAbility);
    assert_eq!(S::select(TokenKind::Character, false), S::CharacterNameOnly);
    assert_eq!(S::select(TokenKind::Reminder, true), S::Reminder);
    assert_eq!(S::select(TokenKind::Almanac, false), S::Meta);
    assert_eq!(S::select(TokenKind::Pandemonium, true), S::Meta);
}

#[test]
fn ability_text_pushes_icon_below_text_and_shrinks_it() {
    let block = TextBlock {
        start_y: 36.0,
        total_height: 60.0,
    };
    let with_text = IconLayoutStrategy::CharacterWithAbility.calculate(&ctx(Some(block)));
    let name_only = IconLayoutStrategy::CharacterNameOnly.calculate(&ctx(None));

    assert!(with_text.position.y >= block.bottom());
    assert!(with_text.size < name_only.size);
    assert!(with_text.rect().y1 <= 0.80 * 300.0 + 1e-9);
    assert!((with_text.center().x - 150.0).abs() < 1e-9);
}

#[test]
fn tall_text_block_keeps_minimum_icon() {
    let block = TextBlock {
        start_y: 30.0,
        total_height: 200.0,
    };
    let p = IconLayoutStrategy::CharacterWithAbility.calculate(&ctx(Some(block)));
    assert!((p.size - 90.0).abs() < 1e-9);
}

#[test]
fn scale_and_offset_apply_around_center() {
    let mut c = ctx(None);
    let base = IconLayoutStrategy::Meta.calculate(&c);
    c.icon = IconTransform {
        scale: 0.5,
        offset_x: 0.1,
        offset_y: -0.1,
    };
    let moved = IconLayoutStrategy::Meta.calculate(&c);
    assert!((moved.size - base.size * 0.5).abs() < 1e-9);
    assert!((moved.center().x - (base.center().x + 30.0)).abs() < 1e-9);
    assert!((moved.center().y - (base.center().y - 30.0)).abs() < 1e-9);
}
