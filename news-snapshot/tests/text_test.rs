use news_snapshot::text::{normalize, normalize_opt, ELLIPSIS};

#[test]
fn test_strips_markup_and_collapses_whitespace() {
    let raw = "<p>Hello,\n\n  <b>world</b>!</p>\t<br/>  Bye ";
    assert_eq!(normalize(raw, 150), "Hello, world! Bye");
}

#[test]
fn test_short_text_is_returned_as_is() {
    assert_eq!(normalize("short text", 10), "short text");
}

#[test]
fn test_long_text_is_cut_with_ellipsis() {
    let out = normalize("abcdefghijklmnop", 10);
    assert_eq!(out, "abcdefg...");
    assert_eq!(out.chars().count(), 10);
    assert!(out.ends_with(ELLIPSIS));
}

#[test]
fn test_length_is_counted_in_characters() {
    let raw = "生成AIを活用した経営コンサルティングサービスを本格展開";
    let out = normalize(raw, 8);
    assert_eq!(out, "生成AIを...");
    assert_eq!(out.chars().count(), 8);
}

#[test]
fn test_empty_and_absent_input() {
    assert_eq!(normalize("", 150), "");
    assert_eq!(normalize("   \n\t ", 150), "");
    assert_eq!(normalize("<div></div>", 150), "");
    assert_eq!(normalize_opt(None, 150), "");
    assert_eq!(normalize_opt(Some("<i>x</i>"), 150), "x");
}

#[test]
fn test_unclosed_tag_passes_through() {
    assert_eq!(normalize("a < b and c", 150), "a < b and c");
}

#[test]
fn test_output_never_exceeds_max_len() {
    let samples = [
        "",
        "a",
        "<p>one two three four five six seven</p>",
        "line\r\nbreaks\r\nand\ttabs   everywhere",
        "日本語のテキストとEnglish textが混在している文章です",
    ];
    for raw in samples {
        for max_len in 4..40 {
            let out = normalize(raw, max_len);
            assert!(out.chars().count() <= max_len, "{:?} at {}", out, max_len);
        }
    }
}

#[test]
fn test_normalizing_twice_changes_nothing() {
    let samples = [
        "<p>Some <em>marked up</em>\n text </p>",
        "a fairly long sentence that will certainly need to be truncated somewhere",
        "ends with a space right at the cut point xx",
        "x < y > z",
    ];
    for raw in samples {
        for max_len in [4, 10, 25, 150] {
            let once = normalize(raw, max_len);
            assert_eq!(normalize(&once, max_len), once);
        }
    }
}

#[test]
fn test_tiny_max_len_has_no_room_for_ellipsis() {
    assert_eq!(normalize("abcdef", 2), "ab");
    assert_eq!(normalize("a bcdef", 2), "a");
    assert_eq!(normalize("abcdef", 0), "");
    assert_eq!(normalize("abcdef", 3), "...");
}
