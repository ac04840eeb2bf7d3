mod common;

use common::fixtures::*;
use common::{render, TestResult};
use serde_json::json;

#[test]
fn test_loop_repeats_paragraphs_in_order() -> TestResult {
    let body = [paragraph("{#beers}"), paragraph("{name}"), paragraph("{/beers}")].concat();
    let data = json!({"beers": [{"name": "Jack"}, {"name": "Carlsberg"}, {"name": "Leffe"}]});

    let rendered = render(&body, data)?;
    assert_paragraphs!(rendered, ["Jack", "Carlsberg", "Leffe"]);
    assert_eq!(rendered.body_children(), vec!["w:p", "w:p", "w:p"]);
    Ok(())
}

#[test]
fn test_empty_array_leaves_no_residual_paragraph() -> TestResult {
    let body = [
        paragraph("before"),
        paragraph("{#beers}"),
        paragraph("{name}"),
        paragraph("{/beers}"),
        paragraph("after"),
    ]
    .concat();

    let rendered = render(&body, json!({"beers": []}))?;
    assert_paragraphs!(rendered, ["before", "after"]);
    Ok(())
}

#[test]
fn test_non_array_value_repeats_zero_times() -> TestResult {
    let body = [paragraph("{#beers}"), paragraph("{name}"), paragraph("{/beers}")].concat();
    let rendered = render(&body, json!({"beers": "not a list"}))?;
    assert!(rendered.paragraph_texts().is_empty());
    Ok(())
}

#[test]
fn test_inline_loop_within_one_paragraph() -> TestResult {
    let rendered = render(
        &paragraph("Numbers: {#numbers}{value}, {/numbers}done"),
        json!({"numbers": [{"value": 1}, {"value": 2}, {"value": 3}]}),
    )?;
    assert_paragraphs!(rendered, ["Numbers: 1, 2, 3, done"]);
    Ok(())
}

#[test]
fn test_nested_loops_resolve_inner_paths() -> TestResult {
    let body = [
        paragraph("{#teams}"),
        paragraph("Team {name}"),
        paragraph("{#members}{name} of {city}{/members}"),
        paragraph("{/teams}"),
    ]
    .concat();
    let data = json!({
        "city": "Oslo",
        "teams": [
            {"name": "A", "members": [{"name": "Ann"}, {"name": "Arne"}]},
            {"name": "B", "members": [{"name": "Bo"}]}
        ]
    });

    let rendered = render(&body, data)?;
    assert_paragraphs!(
        rendered,
        ["Team A", "Ann of OsloArne of Oslo", "Team B", "Bo of Oslo"]
    );
    Ok(())
}

#[test]
fn test_loop_items_fall_back_to_outer_scope() -> TestResult {
    let rendered = render(
        &paragraph("{#items}{label}-{suffix};{/items}"),
        json!({"suffix": "x", "items": [{"label": "a"}, {"label": "b", "suffix": "own"}]}),
    )?;
    assert_paragraphs!(rendered, ["a-x;b-own;"]);
    Ok(())
}

#[test]
fn test_loop_over_primitive_items_repeats_per_item() -> TestResult {
    let rendered = render(
        &paragraph("{#tags}[{/tags}]"),
        json!({"tags": ["x", "y"]}),
    )?;
    assert_paragraphs!(rendered, ["[[]"]);
    Ok(())
}

#[test]
fn test_list_loop_repeats_whole_items() -> TestResult {
    let body = [
        list_paragraph("{#items}"),
        list_paragraph("{name}"),
        list_paragraph("{/items}"),
    ]
    .concat();

    let rendered = render(&body, json!({"items": [{"name": "one"}, {"name": "two"}]}))?;
    assert_paragraphs!(rendered, ["one", "two"]);
    assert_eq!(common::docx_assertions::count_elements(&rendered.document, "w:numPr"), 2);
    Ok(())
}

#[test]
fn test_list_loop_in_single_item() -> TestResult {
    let rendered = render(
        &list_paragraph("{#items}{name}{/items}"),
        json!({"items": [{"name": "one"}, {"name": "two"}, {"name": "three"}]}),
    )?;
    assert_paragraphs!(rendered, ["one", "two", "three"]);
    assert_eq!(common::docx_assertions::count_elements(&rendered.document, "w:numPr"), 3);
    Ok(())
}

#[test]
fn test_loop_keeps_section_break_at_end_of_body() -> TestResult {
    let body = [
        paragraph("{#rows}"),
        paragraph("{v}"),
        section_break_paragraph("{/rows}"),
    ]
    .concat();

    let rendered = render(&body, json!({"rows": [{"v": "a"}, {"v": "b"}]}))?;
    assert_eq!(common::docx_assertions::count_elements(&rendered.document, "w:sectPr"), 1);
    let children = rendered.body_children();
    assert_eq!(children.last().map(String::as_str), Some("w:p"));
    assert_xml_contains!(rendered, "<w:sectPr>");
    Ok(())
}
