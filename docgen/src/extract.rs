//! Turning one HTML page into a flat search document.

use anyhow::{anyhow, Result};
use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Headings tried in order when a page has no `<title>`.
const TITLE_TAGS: [&str; 6] = ["title", "h1", "h2", "h3", "h4", "h5"];

/// Ordered groups of `key -> [tag selectors]`; earlier groups claim text first.
pub type KeyTags = Vec<KeyGroup>;

/// One `{key: [tags], ...}` object, keys kept in the order they were written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyGroup(pub Vec<(String, Vec<String>)>);

impl<'de> Deserialize<'de> for KeyGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct GroupVisitor;

        impl<'de> Visitor<'de> for GroupVisitor {
            type Value = KeyGroup;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping keys to lists of tag selectors")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<KeyGroup, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Vec<String>>()? {
                    entries.push(entry);
                }
                Ok(KeyGroup(entries))
            }
        }

        deserializer.deserialize_map(GroupVisitor)
    }
}

/// Build the document for one page.
///
/// Each key collects the whitespace-normalized text of every element matching
/// its tags. Claimed elements are removed from consideration, so later keys and
/// the trailing `content` field never repeat their text. `content` holds the
/// rest of `<main>`, or of the whole page when there is none.
pub fn page_to_document(source: &str, url: &str, key_tags: &KeyTags) -> Result<Map<String, Value>> {
    let html = Html::parse_document(source);
    let mut page = Map::new();
    page.insert("root_relative_url".into(), Value::String(url.to_string()));

    let mut claimed: HashSet<NodeId> = HashSet::new();
    for (key, tags) in key_tags.iter().flat_map(|group| group.0.iter()) {
        let mut words: Vec<String> = Vec::new();
        for tag in tags {
            let sel = Selector::parse(tag).map_err(|e| anyhow!("invalid tag selector {tag:?}: {e:?}"))?;
            for el in html.select(&sel) {
                if is_claimed(el, &claimed) { continue; }
                words.extend(text_of(*el, &claimed).split_whitespace().map(str::to_string));
                claimed.insert(el.id());
            }
        }
        page.insert(key.clone(), Value::String(words.join(" ")));
    }

    let main = Selector::parse("main").map_err(|e| anyhow!("{e:?}"))?;
    let body = match html.select(&main).find(|el| !is_claimed(*el, &claimed)) {
        Some(el) => text_of(*el, &claimed),
        None => text_of(html.tree.root(), &claimed),
    };
    page.insert("content".into(), Value::String(normalize_ws(&body)));
    Ok(page)
}

/// First non-empty text among `title, h1..h5`, whitespace-normalized.
pub fn page_title(source: &str) -> Option<String> {
    let html = Html::parse_document(source);
    let none = HashSet::new();
    TITLE_TAGS.iter().find_map(|tag| {
        let sel = Selector::parse(tag).ok()?;
        let el = html.select(&sel).next()?;
        Some(normalize_ws(&text_of(*el, &none)))
    })
}

fn is_claimed(el: ElementRef<'_>, claimed: &HashSet<NodeId>) -> bool {
    claimed.contains(&el.id()) || el.ancestors().any(|a| claimed.contains(&a.id()))
}

/// Concatenated text below `node`, skipping claimed subtrees and non-content elements.
fn text_of(node: NodeRef<'_, Node>, claimed: &HashSet<NodeId>) -> String {
    let mut out = String::new();
    collect_text(node, claimed, &mut out);
    out
}

fn collect_text(node: NodeRef<'_, Node>, claimed: &HashSet<NodeId>, out: &mut String) {
    for child in node.children() {
        if claimed.contains(&child.id()) { continue; }
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if matches!(e.name(), "script" | "style" | "noscript" | "template") => {}
            Node::Element(_) => collect_text(child, claimed, out),
            _ => {}
        }
    }
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
