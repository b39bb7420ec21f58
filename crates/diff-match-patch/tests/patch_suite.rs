use diff_match_patch::diff;
use diff_match_patch::patch::{
    self, add_context, add_padding, apply, from_text, split_max, to_text, PatchError,
};
use diff_match_patch::{Diff, Options, Patch, PatchInput};

fn opts() -> Options {
    Options::default()
}

#[test]
fn patch_renders_its_wire_form() {
    let patch = Patch {
        start1: 20,
        start2: 21,
        length1: 18,
        length2: 17,
        diffs: vec![
            Diff::equal("jump"),
            Diff::delete("s"),
            Diff::insert("ed"),
            Diff::equal(" over "),
            Diff::delete("the"),
            Diff::insert("a"),
            Diff::equal("\nlaz"),
        ],
    };
    assert_eq!(
        patch.to_string(),
        "@@ -21,18 +22,17 @@\n jump\n-s\n+ed\n  over \n-the\n+a\n %0Alaz\n"
    );
}

#[test]
fn from_text_parses_and_round_trips() {
    assert_eq!(from_text(""), Ok(vec![]));

    for text in [
        "@@ -21,18 +22,17 @@\n jump\n-s\n+ed\n  over \n-the\n+a\n %0Alaz\n",
        "@@ -1 +1 @@\n-a\n+b\n",
        "@@ -1,3 +0,0 @@\n-abc\n",
        "@@ -0,0 +1,3 @@\n+abc\n",
    ] {
        let patches = from_text(text).unwrap();
        assert_eq!(to_text(&patches), text, "round trip of {text:?}");
    }
}

#[test]
fn from_text_reads_header_coordinates() {
    let patches = from_text("@@ -1 +1 @@\n-a\n+b\n").unwrap();
    assert_eq!(patches[0].start1, 0);
    assert_eq!(patches[0].length1, 1);
    assert_eq!(patches[0].start2, 0);
    assert_eq!(patches[0].length2, 1);

    let patches = from_text("@@ -1,3 +0,0 @@\n-abc\n").unwrap();
    assert_eq!(patches[0].start1, 0);
    assert_eq!(patches[0].length1, 3);
    assert_eq!(patches[0].start2, 0);
    assert_eq!(patches[0].length2, 0);
}

#[test]
fn from_text_rejects_garbage() {
    let err = from_text("Bad\nPatch\n").unwrap_err();
    assert_eq!(err, PatchError::BadHeader("Bad".to_string()));
    assert!(err.to_string().contains("Bad"));

    let err = from_text("@@ -1 +1 @@\n*a\n").unwrap_err();
    assert!(matches!(err, PatchError::UnknownSign { sign: '*', .. }));

    let err = from_text("@@ -1 +1 @@\n-a%zz\n").unwrap_err();
    assert!(matches!(err, PatchError::InvalidEscape(_)));
}

#[test]
fn to_text_concatenates_patches() {
    let text = "@@ -1,9 +1,9 @@\n-f\n+F\n oo+fooba\n@@ -7,9 +7,9 @@\n obar\n-,\n+.\n tes\n";
    let patches = from_text(text).unwrap();
    assert_eq!(to_text(&patches), text);
}

#[test]
fn add_context_widens_to_a_unique_window() {
    let opts = opts();

    let mut patch = from_text("@@ -21,4 +21,10 @@\n-jump\n+somersault\n").unwrap().remove(0);
    add_context(&mut patch, "The quick brown fox jumps over the lazy dog.", &opts);
    assert_eq!(
        patch.to_string(),
        "@@ -17,12 +17,18 @@\n fox \n-jump\n+somersault\n s ov\n"
    );

    // Same, but not enough trailing context.
    let mut patch = from_text("@@ -21,4 +21,10 @@\n-jump\n+somersault\n").unwrap().remove(0);
    add_context(&mut patch, "The quick brown fox jumps.", &opts);
    assert_eq!(
        patch.to_string(),
        "@@ -17,10 +17,16 @@\n fox \n-jump\n+somersault\n s.\n"
    );

    // Same, but not enough leading context.
    let mut patch = from_text("@@ -3 +3,2 @@\n-e\n+at\n").unwrap().remove(0);
    add_context(&mut patch, "The quick brown fox jumps.", &opts);
    assert_eq!(patch.to_string(), "@@ -1,7 +1,8 @@\n Th\n-e\n+at\n  quick\n");

    // Same, but with ambiguity.
    let mut patch = from_text("@@ -3 +3,2 @@\n-e\n+at\n").unwrap().remove(0);
    add_context(
        &mut patch,
        "The quick brown fox jumps.  The quick brown fox crashes.",
        &opts,
    );
    assert_eq!(
        patch.to_string(),
        "@@ -1,27 +1,28 @@\n Th\n-e\n+at\n  quick brown fox jumps. \n"
    );
}

#[test]
fn make_from_texts_builds_rolling_context_patches() {
    let opts = opts();
    assert_eq!(to_text(&patch::make_from_texts("", "", &opts)), "");

    let text1 = "The quick brown fox jumps over the lazy dog.";
    let text2 = "That quick brown fox jumped over a lazy dog.";

    // The second patch must be coordinated against the rolling context, so
    // the reversed direction has different offsets.
    let expected = "@@ -1,8 +1,7 @@\n Th\n-at\n+e\n  quick b\n@@ -21,17 +21,18 @@\n jump\n-ed\n+s\n  over \n-a\n+the\n  laz\n";
    assert_eq!(
        to_text(&patch::make_from_texts(text2, text1, &opts)),
        expected
    );

    let expected = "@@ -1,11 +1,12 @@\n Th\n-e\n+at\n  quick b\n@@ -22,18 +22,17 @@\n jump\n-s\n+ed\n  over \n-the\n+a\n  laz\n";
    assert_eq!(
        to_text(&patch::make_from_texts(text1, text2, &opts)),
        expected
    );

    // The three precomputed-script shapes agree with the two-text shape.
    let diffs = diff::diff(text1, text2, &opts);
    assert_eq!(to_text(&patch::make_from_diffs(&diffs, &opts)), expected);
    assert_eq!(
        to_text(&patch::make_from_text_and_diffs(text1, &diffs, &opts)),
        expected
    );
    assert_eq!(
        to_text(&patch::make(PatchInput::TextDiffs(text1, &diffs), &opts)),
        expected
    );
    #[allow(deprecated)]
    {
        assert_eq!(
            to_text(&patch::make_from_texts_and_diffs(text1, text2, &diffs, &opts)),
            expected
        );
    }
}

#[test]
fn make_percent_encodes_the_wire_form() {
    let opts = opts();
    let patches = patch::make_from_texts(
        "`1234567890-=[]\\;',./",
        "~!@#$%^&*()_+{}|:\"<>?",
        &opts,
    );
    assert_eq!(
        to_text(&patches),
        "@@ -1,21 +1,21 @@\n-%601234567890-=%5B%5D%5C;',./\n+~!@#$%25%5E&*()_+%7B%7D%7C:%22%3C%3E?\n"
    );
}

#[test]
fn from_text_decodes_the_wire_form() {
    let patches = from_text(
        "@@ -1,21 +1,21 @@\n-%601234567890-=%5B%5D%5C;',./\n+~!@#$%25%5E&*()_+%7B%7D%7C:%22%3C%3E?\n",
    )
    .unwrap();
    assert_eq!(
        patches[0].diffs,
        vec![
            Diff::delete("`1234567890-=[]\\;',./"),
            Diff::insert("~!@#$%^&*()_+{}|:\"<>?"),
        ]
    );
}

#[test]
fn make_widens_context_over_repeated_text() {
    let opts = opts();
    let text1 = "abcdef".repeat(100);
    let text2 = format!("{text1}123");
    let patches = patch::make_from_texts(&text1, &text2, &opts);
    assert_eq!(
        to_text(&patches),
        "@@ -573,28 +573,31 @@\n cdefabcdefabcdefabcdefabcdef\n+123\n"
    );
}

#[test]
fn split_max_chops_oversized_patches() {
    let opts = opts();

    let mut patches = patch::make_from_texts(
        "abcdefghijklmnopqrstuvwxyz01234567890",
        "XabXcdXefXghXijXklXmnXopXqrXstXuvXwxXyzX01X23X45X67X89X0",
        &opts,
    );
    split_max(&mut patches, &opts);
    assert_eq!(
        to_text(&patches),
        "@@ -1,32 +1,46 @@\n+X\n ab\n+X\n cd\n+X\n ef\n+X\n gh\n+X\n ij\n+X\n kl\n+X\n mn\n+X\n op\n+X\n qr\n+X\n st\n+X\n uv\n+X\n wx\n+X\n yz\n+X\n 012345\n@@ -25,13 +39,18 @@\n zX01\n+X\n 23\n+X\n 45\n+X\n 67\n+X\n 89\n+X\n 0\n"
    );

    let mut patches = patch::make_from_texts(
        "abcdef1234567890123456789012345678901234567890123456789012345678901234567890uvwxyz",
        "abcdefuvwxyz",
        &opts,
    );
    let before = to_text(&patches);
    split_max(&mut patches, &opts);
    assert_eq!(to_text(&patches), before);

    let mut patches = patch::make_from_texts(
        "1234567890123456789012345678901234567890123456789012345678901234567890",
        "abc",
        &opts,
    );
    split_max(&mut patches, &opts);
    assert_eq!(
        to_text(&patches),
        "@@ -1,32 +1,4 @@\n-1234567890123456789012345678\n 9012\n@@ -29,32 +1,4 @@\n-9012345678901234567890123456\n 7890\n@@ -57,14 +1,3 @@\n-78901234567890\n+abc\n"
    );

    let mut patches = patch::make_from_texts(
        "abcdefghij , h : 0 , t : 1 abcdefghij , h : 0 , t : 1 abcdefghij , h : 0 , t : 1",
        "abcdefghij , h : 1 , t : 1 abcdefghij , h : 1 , t : 1 abcdefghij , h : 0 , t : 1",
        &opts,
    );
    split_max(&mut patches, &opts);
    assert_eq!(
        to_text(&patches),
        "@@ -2,32 +2,32 @@\n bcdefghij , h : \n-0\n+1\n  , t : 1 abcdef\n@@ -29,32 +29,32 @@\n bcdefghij , h : \n-0\n+1\n  , t : 1 abcdef\n"
    );
}

#[test]
fn add_padding_pads_every_edge_shape() {
    let opts = opts();

    // Both edges full.
    let mut patches = patch::make_from_texts("", "test", &opts);
    assert_eq!(to_text(&patches), "@@ -0,0 +1,4 @@\n+test\n");
    add_padding(&mut patches, &opts);
    assert_eq!(
        to_text(&patches),
        "@@ -1,8 +1,12 @@\n %01%02%03%04\n+test\n %01%02%03%04\n"
    );

    // Both edges partial.
    let mut patches = patch::make_from_texts("XY", "XtestY", &opts);
    assert_eq!(to_text(&patches), "@@ -1,2 +1,6 @@\n X\n+test\n Y\n");
    add_padding(&mut patches, &opts);
    assert_eq!(
        to_text(&patches),
        "@@ -2,8 +2,12 @@\n %02%03%04X\n+test\n Y%01%02%03\n"
    );

    // Both edges none.
    let mut patches = patch::make_from_texts("XXXXYYYY", "XXXXtestYYYY", &opts);
    assert_eq!(to_text(&patches), "@@ -1,8 +1,12 @@\n XXXX\n+test\n YYYY\n");
    add_padding(&mut patches, &opts);
    assert_eq!(to_text(&patches), "@@ -5,8 +5,12 @@\n XXXX\n+test\n YYYY\n");
}

#[test]
fn apply_exact_and_partial_matches() {
    let opts = opts();
    let text1 = "The quick brown fox jumps over the lazy dog.";
    let text2 = "That quick brown fox jumped over a lazy dog.";
    let patches = patch::make_from_texts(text1, text2, &opts);

    assert_eq!(
        apply(&patches, text1, &opts),
        (text2.to_string(), vec![true, true])
    );

    assert_eq!(
        apply(
            &patches,
            "The quick red rabbit jumps over the tired tiger.",
            &opts
        ),
        (
            "That quick red rabbit jumped over a tired tiger.".to_string(),
            vec![true, true]
        )
    );

    assert_eq!(
        apply(
            &patches,
            "I am the very model of a modern major general.",
            &opts
        ),
        (
            "I am the very model of a modern major general.".to_string(),
            vec![false, false]
        )
    );
}

#[test]
fn apply_big_delete_respects_delete_threshold() {
    let opts = opts();
    let patches = patch::make_from_texts(
        "x1234567890123456789012345678901234567890123456789012345678901234567890y",
        "xabcy",
        &opts,
    );

    assert_eq!(
        apply(
            &patches,
            "x123456789012345678901234567890-----++++++++++-----123456789012345678901234567890y",
            &opts
        ),
        ("xabcy".to_string(), vec![true, true])
    );

    assert_eq!(
        apply(
            &patches,
            "x12345678901234567890---------------++++++++++---------------12345678901234567890y",
            &opts
        ),
        (
            "xabc12345678901234567890---------------++++++++++---------------12345678901234567890y"
                .to_string(),
            vec![false, true]
        )
    );

    let lenient = Options {
        patch_delete_threshold: 0.6,
        ..Options::default()
    };
    let patches = patch::make_from_texts(
        "x1234567890123456789012345678901234567890123456789012345678901234567890y",
        "xabcy",
        &lenient,
    );
    assert_eq!(
        apply(
            &patches,
            "x12345678901234567890---------------++++++++++---------------12345678901234567890y",
            &lenient
        ),
        ("xabcy".to_string(), vec![true, true])
    );
}

#[test]
fn apply_compensates_for_failed_patches() {
    let strict = Options {
        match_threshold: 0.0,
        match_distance: 0,
        ..Options::default()
    };
    let patches = patch::make_from_texts(
        "abcdefghijklmnopqrstuvwxyz--------------------1234567890",
        "abcXXXXXXXXXXdefghijklmnopqrstuvwxyz--------------------1234567YYYYYYYYYY890",
        &strict,
    );
    assert_eq!(
        apply(
            &patches,
            "ABCDEFGHIJKLMNOPQRSTUVWXYZ--------------------1234567890",
            &strict
        ),
        (
            "ABCDEFGHIJKLMNOPQRSTUVWXYZ--------------------1234567YYYYYYYYYY890".to_string(),
            vec![false, true]
        )
    );
}

#[test]
fn apply_does_not_mutate_its_input() {
    let opts = opts();

    let patches = patch::make_from_texts("", "test", &opts);
    let before = to_text(&patches);
    apply(&patches, "", &opts);
    assert_eq!(to_text(&patches), before);

    let patches = patch::make_from_texts(
        "The quick brown fox jumps over the lazy dog.",
        "Woof",
        &opts,
    );
    let before = to_text(&patches);
    apply(&patches, "The quick brown fox jumps over the lazy dog.", &opts);
    assert_eq!(to_text(&patches), before);
}

#[test]
fn apply_anchors_at_text_edges() {
    let opts = opts();

    let patches = patch::make_from_texts("", "test", &opts);
    assert_eq!(apply(&patches, "", &opts), ("test".to_string(), vec![true]));

    let patches = patch::make_from_texts("XY", "XtestY", &opts);
    assert_eq!(
        apply(&patches, "XY", &opts),
        ("XtestY".to_string(), vec![true])
    );

    let patches = patch::make_from_texts("y", "y123", &opts);
    assert_eq!(
        apply(&patches, "y", &opts),
        ("y123".to_string(), vec![true])
    );

    let patches = patch::make_from_texts("x", "x123", &opts);
    assert_eq!(
        apply(&patches, "x", &opts),
        ("x123".to_string(), vec![true])
    );
}

#[test]
fn apply_with_empty_patch_list_is_identity() {
    assert_eq!(
        apply(&[], "Hello world.", &opts()),
        ("Hello world.".to_string(), vec![])
    );
}

#[test]
fn clone_is_a_deep_copy() {
    let patches = patch::make_from_texts("The cat.", "The hat.", &opts());
    let mut copied = patches.clone();
    copied[0].diffs[0] = Diff::equal("mutated");
    copied[0].start1 = 99;
    assert_ne!(to_text(&copied), to_text(&patches));
    assert_eq!(patches[0].start1, 0);
}
