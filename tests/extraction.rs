// tests/extraction.rs
//
// Integer extraction and locator queries against small documents and the
// saved dashboard pages.
//
mod common;

use common::fixture;
use xcheck::config::consts::*;
use xcheck::extract::{self, ExtractError, FragmentError};
use xcheck::store::Document;

fn span(text: &str) -> Document {
    Document::from_text("snippet", &format!("<html><body><span id=\"n\">{text}</span></body></html>"))
}

#[test]
fn separators_are_dropped() {
    for (text, want) in [("550,234", 550_234), ("1.200", 1200), ("  12,000 ", 12_000), ("550,234 activities", 550_234), ("$1,200", 1200)] {
        let doc = span(text);
        assert_eq!(extract::query_single_integer(&doc, r#"//span[@id="n"]"#), Ok(want), "{text:?}");
    }
}

#[test]
fn decimals_are_read_naively() {
    assert_eq!(extract::query_single_integer(&span("12.5"), "//span"), Ok(125));
}

#[test]
fn no_digits_is_non_numeric() {
    for text in ["N/A", "—", "n/a (pending)"] {
        let err = extract::query_single_integer(&span(text), "//span").unwrap_err();
        assert!(matches!(&err, ExtractError::NonNumericContent { fragment, .. } if fragment == text), "{text:?} gave {err:?}");
    }
    for text in ["N/A", ""] {
        assert_eq!(extract::integer_from_fragment(text), Err(FragmentError::NoDigits(text.into())));
    }
}

#[test]
fn blank_text_is_locator_miss() {
    for text in ["", "   ", "&nbsp;", "\n\t"] {
        let err = extract::query_single_integer(&span(text), "//span").unwrap_err();
        assert!(matches!(err, ExtractError::LocatorMiss { .. }), "{text:?} gave {err:?}");
    }
}

#[test]
fn number_in_child_element_is_locator_miss() {
    // text() only looks at direct children
    let doc = Document::from_text("nested", "<p><a><b>5</b></a></p>");
    assert!(matches!(extract::query_single_integer(&doc, "//a"), Err(ExtractError::LocatorMiss { .. })));
    assert_eq!(extract::query_single_integer(&doc, "//a/b"), Ok(5));
}

#[test]
fn empty_match_is_locator_miss() {
    let err = extract::query_single_integer(&span("42"), "//div/span").unwrap_err();
    assert_eq!(
        err,
        ExtractError::LocatorMiss { document: "snippet".into(), locator: "//div/span".into() }
    );
}

#[test]
fn first_matching_node_wins() {
    let doc = Document::from_text("list", "<ul><li>  </li><li>7 items</li><li>9</li></ul>");
    // The blank <li> is skipped as a fragment, not as a node
    assert_eq!(extract::query_single_integer(&doc, "//li"), Ok(7));
    assert_eq!(extract::query_single_integer(&doc, "//li[3]"), Ok(9));
}

#[test]
fn query_returns_all_fragments_in_order() {
    let doc = Document::from_text("t", "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></table>");
    assert_eq!(extract::query(&doc, "//td/text()").unwrap(), vec!["a", "b", "c"]);
    assert_eq!(extract::query_joined(&doc, "//td/text()").unwrap(), "a b c");
    assert!(extract::query(&doc, "//th").unwrap().is_empty());
}

#[test]
fn broken_markup_still_queries() {
    let doc = Document::from_text(
        "broken",
        "<div><p>one<p>two</span><b>3<i>4</b></i><table><tr><td>5<td>6</div><p",
    );
    assert_eq!(extract::query(&doc, "//p/text()").unwrap(), vec!["one", "two"]);
    assert_eq!(extract::query_single_integer(&doc, "//td[2]"), Ok(6));
}

#[test]
fn dashboard_home_headlines() {
    let doc = Document::from_text(DASH_HOME, &fixture("dashboard_home.html"));
    assert_eq!(extract::query_single_integer(&doc, DASH_HOME_ACTIVITIES_XPATH), Ok(600_000));
    assert_eq!(extract::query_single_integer(&doc, DASH_HOME_UNIQUE_ACTIVITIES_XPATH), Ok(590_000));
    assert_eq!(extract::query_single_integer(&doc, DASH_HOME_PUBLISHERS_XPATH), Ok(501));
}

#[test]
fn dashboard_pages_and_registry() {
    let acts = Document::from_text(DASH_ACTIVITIES, &fixture("dashboard_activities.html"));
    assert_eq!(extract::query_single_integer(&acts, DASH_ACTIVITIES_XPATH), Ok(600_000));
    assert_eq!(extract::query_single_integer(&acts, DASH_ACTIVITIES_UNIQUE_XPATH), Ok(590_000));

    let pubs = Document::from_text(DASH_PUBLISHERS, &fixture("dashboard_publishers.html"));
    assert_eq!(extract::query_single_integer(&pubs, DASH_PUBLISHERS_XPATH), Ok(501));

    let reg = Document::from_text(REGISTRY_HOME, &fixture("registry_home.html"));
    assert_eq!(extract::query_single_integer(&reg, REGISTRY_PUBLISHERS_XPATH), Ok(498));
}

#[test]
fn datastore_xml_count() {
    let doc = Document::from_text(DATASTORE_ACTIVITY_COUNT, &fixture("datastore_count.xml"));
    assert_eq!(extract::query_single_integer(&doc, DATASTORE_TOTAL_COUNT_XPATH), Ok(580_000));
}

#[test]
fn script_bodies_are_not_markup() {
    let doc = Document::from_text(DASH_HOME, &fixture("dashboard_home.html"));
    assert_eq!(extract::query(&doc, r#"//*[@id="wrap"]"#).unwrap().len(), 1);
}

#[test]
fn links_and_substring_search() {
    let doc = Document::from_text(DASH_HOME, &fixture("dashboard_home.html"));
    let links = extract::links(&doc).unwrap();
    assert_eq!(links.first().map(String::as_str), Some("index.html"));
    assert!(extract::substring_in_list("publishers.html", &links));
    assert!(extract::substring_in_list("iatistandard.org", &links));
    assert!(!extract::substring_in_list("datastore", &links));
}

#[test]
fn regex_search_over_links() {
    let doc = Document::from_text(DASH_HOME, &fixture("dashboard_home.html"));
    let links = extract::links(&doc).unwrap();
    assert_eq!(extract::regex_match_in_list(r"^https://[a-z]+\.org/$", &links), Ok(true));
    // Unanchored: matches inside an entry
    assert_eq!(extract::regex_match_in_list(r"ublishers\.h", &links), Ok(true));
    assert_eq!(extract::regex_match_in_list(r"\d{3}\.html", &links), Ok(false));
    assert!(extract::regex_match_in_list("(unclosed", &links).is_err());
    assert_eq!(extract::regex_match_in_list::<String>(".*", &[]), Ok(false));
}
