mod common;

use std::sync::Arc;

use common::docx_assertions::count_elements;
use common::fixtures::*;
use common::{render, render_with, TestResult};
use serde_json::{json, Value};
use stencil::{HidableStrategy, TemplateHandler};

fn section(fields: Value) -> Value {
    json!({"_type": "sections", "section": fields})
}

fn two_paragraph_section() -> String {
    [
        paragraph("{^details}"),
        paragraph("First"),
        paragraph("Second {name}"),
        paragraph("{/details}"),
    ]
    .concat()
}

#[test]
fn test_hidden_excludable_section_is_removed() -> TestResult {
    let rendered = render(
        &two_paragraph_section(),
        json!({"details": section(json!({"hidden": true, "hideMode": "excludable"}))}),
    )?;
    assert!(rendered.body_children().is_empty(), "body was:\n{}", rendered.xml());
    Ok(())
}

#[test]
fn test_excluded_section_keeps_surrounding_paragraphs() -> TestResult {
    let body = [paragraph("start"), two_paragraph_section(), paragraph("end")].concat();
    let rendered = render(
        &body,
        json!({"details": section(json!({"include": false, "mode": "ejectable"}))}),
    )?;
    assert_paragraphs!(rendered, ["start", "end"]);
    Ok(())
}

#[test]
fn test_visible_section_is_compiled_without_an_index() -> TestResult {
    let rendered = render(
        &two_paragraph_section(),
        json!({"name": "outer", "details": section(json!({"hideMode": "excludable"}))}),
    )?;
    assert_paragraphs!(rendered, ["First", "Second outer"]);
    assert_xml_not_contains!(rendered, "w:vanish");
    Ok(())
}

#[test]
fn test_hidden_hidable_section_vanishes() -> TestResult {
    let rendered = render(
        &two_paragraph_section(),
        json!({"name": "x", "details": section(json!({"hidden": true}))}),
    )?;
    assert_paragraphs!(rendered, ["First", "Second x"]);
    // Every run plus both paragraph marks.
    assert_eq!(count_elements(&rendered.document, "w:vanish"), 4);
    Ok(())
}

#[test]
fn test_section_bookmarks_surround_the_region() -> TestResult {
    let rendered = render(
        &two_paragraph_section(),
        json!({"details": section(json!({"id": 12, "name": "Details"}))}),
    )?;
    assert_eq!(
        rendered.body_children(),
        vec!["w:bookmarkStart", "w:p", "w:p", "w:bookmarkEnd"]
    );
    assert_xml_contains!(rendered, r#"<w:bookmarkStart w:id="12" w:name="Details"/>"#);
    assert_xml_contains!(rendered, r#"<w:bookmarkEnd w:id="12"/>"#);
    Ok(())
}

#[test]
fn test_content_control_strategy_wraps_the_region() -> TestResult {
    let handler = TemplateHandler::builder()
        .with_hidable_section_strategy(HidableStrategy::ContentControl)
        .build()?;
    let rendered = render_with(
        &handler,
        &two_paragraph_section(),
        json!({"name": "n", "details": section(json!({"id": "5", "name": "Terms", "hidden": true, "lock": true}))}),
    )?;

    assert_eq!(rendered.body_children(), vec!["w:bookmarkStart", "w:sdt", "w:bookmarkEnd"]);
    assert_paragraphs!(rendered, ["First", "Second n"]);
    assert_xml_contains!(rendered, r#"<w:alias w:val="Terms"/>"#);
    assert_xml_contains!(rendered, r#"<w:lock w:val="sdtLocked"/>"#);
    assert_xml_contains!(rendered, r#"<w15:appearance w15:val="hidden"/>"#);
    assert_xml_contains!(rendered, "<w:sdtPr><w:rPr><w:vanish/></w:rPr>");
    Ok(())
}

#[test]
fn test_inline_section_hides_only_its_runs() -> TestResult {
    let rendered = render(
        &paragraph("Visible {^note}secret{/note} tail"),
        json!({"note": section(json!({"hidden": true}))}),
    )?;
    assert_paragraphs!(rendered, ["Visible secret tail"]);
    assert_eq!(count_elements(&rendered.document, "w:vanish"), 1);
    Ok(())
}

#[test]
fn test_missing_section_data_removes_the_region() -> TestResult {
    let body = [paragraph("keep"), two_paragraph_section()].concat();
    let rendered = render(&body, json!({}))?;
    assert_paragraphs!(rendered, ["keep"]);
    Ok(())
}

#[test]
fn test_section_inside_loop_uses_item_data() -> TestResult {
    let body = [
        paragraph("{#people}"),
        paragraph("{^extra}{name} is hidden{/extra}"),
        paragraph("{/people}"),
    ]
    .concat();
    let data = json!({"people": [
        {"name": "Ada", "extra": section(json!({"hidden": true, "hideMode": "excludable"}))},
        {"name": "Bob", "extra": section(json!({"hideMode": "excludable"}))}
    ]});

    let rendered = render(&body, data)?;
    assert_paragraphs!(rendered, ["Bob is hidden"]);
    Ok(())
}

#[test]
fn test_handler_is_shared_across_threads() -> TestResult {
    let handler = Arc::new(TemplateHandler::new()?);
    let workers: Vec<_> = (0..4)
        .map(|n| {
            let handler = Arc::clone(&handler);
            std::thread::spawn(move || {
                render_with(&handler, &paragraph("{v}"), json!({"v": n}))
                    .map(|rendered| rendered.paragraph_texts())
                    .map_err(|err| err.to_string())
            })
        })
        .collect();
    for (n, worker) in workers.into_iter().enumerate() {
        let texts = worker.join().map_err(|_| "worker panicked")??;
        assert_eq!(texts, vec![n.to_string()]);
    }
    Ok(())
}
