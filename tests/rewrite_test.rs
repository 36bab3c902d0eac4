use featherfeed::{rewrite_fragment, Options};

fn rewrite(html: &str) -> featherfeed::Rewritten {
    rewrite_fragment(html, Options::default()).expect("expected Ok(_)")
}

#[test]
fn emoji_images_become_characters() {
    let out = rewrite(
        r#"no time to explain <img style="height: 1.2em; width: 1.2em" aria-label="Face with tears of joy" src="https://abs.example.com/emoji/v2/svg/1f602.svg">"#,
    );
    assert!(out.html.contains('\u{1f602}'));
    assert!(!out.html.contains("<img"));
    assert!(out.text.contains('\u{1f602}'));
}

#[test]
fn multi_codepoint_emoji_are_joined() {
    let out = rewrite(
        r#"<img style="height: 1.2em;" aria-label="flag" src="https://abs.example.com/emoji/v2/72x72/1f1e6-1f1e8.png">"#,
    );
    assert!(out.html.contains("\u{1f1e6}\u{1f1e8}"));
}

#[test]
fn undecodable_emoji_images_are_left_alone() {
    let out = rewrite(
        r#"<img style="height: 1.2em;" aria-label="x" src="https://abs.example.com/emoji/v2/svg/zzzz.svg">"#,
    );
    assert!(out.html.contains("<img"));
}

#[test]
fn newlines_become_br_elements() {
    let out = rewrite("<div>first line\nsecond line</div>");
    assert!(out.html.contains("first line<br>second line"));
    assert_eq!(out.text, "first line second line");
}

#[test]
fn whitespace_only_formatting_gaps_gain_no_breaks() {
    let out = rewrite("<div>a</div>\n<div>b</div>");
    assert!(!out.html.contains("<br>"));
}

#[test]
fn relative_links_are_absolutized() {
    let out = rewrite(r#"<a href="/user/status/5">link</a>"#);
    assert!(out.html.contains(r#"href="https://twitter.com/user/status/5""#));
}

#[test]
fn absolute_foreign_links_are_untouched() {
    let out = rewrite(r#"<a href="https://example.com/page">link</a>"#);
    assert!(out.html.contains(r#"href="https://example.com/page""#));
}

#[test]
fn mention_only_divs_flow_inline() {
    let out = rewrite(r#"<div><a href="/doc">@doc</a></div>after"#);
    assert!(out.html.contains("<span>"));
    assert!(!out.html.contains("<div>"));
}

#[test]
fn quote_previews_collapse_to_image_and_summary() {
    let out = rewrite(
        r#"<div role="link">
             <div>Quote Tweet</div>
             <img src="https://pbs.example.com/media/thumb.jpg">
             <div>Doc Brown <time datetime="2020-01-01T00:00:00Z">Jan 1</time></div>
             <div>original words</div>
             <div>Show this thread</div>
           </div>"#,
    );
    assert!(out.html.contains(r#"<img src="https://pbs.example.com/media/thumb.jpg">"#));
    assert!(out.html.contains("<b>"));
    assert!(out.html.contains("original words"));
    assert!(!out.html.contains("Quote Tweet"));
    assert!(!out.html.contains("Show this thread"));
}

#[test]
fn link_cards_get_bold_title_and_italic_domain() {
    let out = rewrite(
        r#"<div data-testid="card.layoutLarge.detail">
             <div>Some Article Title</div>
             <div>A description of the article.</div>
             <div>example.com</div>
           </div>"#,
    );
    assert!(out.html.contains("<b>Some Article Title</b>"));
    assert!(out.html.contains("<i>example.com</i>"));
    assert!(out.html.contains("A description of the article."));
}

#[test]
fn videos_gain_controls_and_lose_redundant_posters() {
    let out = rewrite(
        r#"<video src="https://video.example.com/v.mp4" poster="https://pbs.example.com/poster.jpg"></video>
           <img src="https://pbs.example.com/poster.jpg">"#,
    );
    assert!(out.html.contains("controls"));
    assert!(!out.html.contains("<img"));
}

#[test]
fn blob_videos_are_left_alone() {
    let out = rewrite(
        r#"<video src="blob:abc" poster="https://pbs.example.com/poster.jpg"></video>
           <img src="https://pbs.example.com/poster.jpg">"#,
    );
    assert!(!out.html.contains("controls"));
    assert!(out.html.contains("<img"));
}

#[test]
fn simplify_strips_presentational_attributes_and_svg() {
    let out = rewrite(
        r#"<div class="css-1x2y" style="color: red" role="group" draggable="true">
             <svg viewBox="0 0 24 24"><path d="M0 0"></path></svg>
             kept text
           </div>"#,
    );
    assert!(!out.html.contains("class="));
    assert!(!out.html.contains("style="));
    assert!(!out.html.contains("role="));
    assert!(!out.html.contains("draggable="));
    assert!(!out.html.contains("<svg"));
    assert!(out.html.contains("kept text"));
}

#[test]
fn simplify_can_be_disabled() {
    let opts = Options {
        simplify: false,
        ..Options::default()
    };
    let out = rewrite_fragment(r#"<div class="keepme">x</div>"#, opts).expect("expected Ok(_)");
    assert!(out.html.contains(r#"class="keepme""#));
}

#[test]
fn rewriting_simplified_output_is_a_no_op() {
    let first = rewrite(
        "<div>line one\nline two <a href=\"/user/status/5\">link</a></div><div><a href=\"/doc\">@doc</a></div>",
    );
    let second = rewrite(&first.html);
    assert_eq!(first.html, second.html);
    assert_eq!(first.text, second.text);
}
