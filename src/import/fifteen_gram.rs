// Copyright 2023 Remi Bernotavicius

//! Recipe pages from 15gram.be.

use super::ImportedRecipe;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::OnceLock;

const INGREDIENTS_HEADING: &str = "ingrediënten";
const INSTRUCTIONS_HEADING: &str = "bereiding";

fn info_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\s*MIN|\d+\s*personen").unwrap())
}

fn minutes_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*MIN").unwrap())
}

fn persons_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*personen").unwrap())
}

fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn elements<'a>(root: ElementRef<'a>, tag: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |e| e.value().name() == tag)
}

fn heading<'a>(document: &'a Html, title: &str) -> Option<ElementRef<'a>> {
    elements(document.root_element(), "h3").find(|h| text_of(*h).to_lowercase() == title)
}

/// The first `tag` element anywhere after `start` in document order.
fn first_after<'a>(document: &'a Html, start: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .skip_while(|node| node.id() != start.id())
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == tag)
}

fn capture_number(re: &Regex, text: &str) -> i32 {
    re.captures(text)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0)
}

fn ingredients(document: &Html) -> Vec<String> {
    let Some(list) = heading(document, INGREDIENTS_HEADING)
        .and_then(|h| first_after(document, h, "ul"))
    else {
        return vec![];
    };
    elements(list, "li")
        .map(text_of)
        .filter(|t| !t.is_empty())
        .collect()
}

fn instructions(document: &Html) -> Vec<String> {
    let Some(start) = heading(document, INSTRUCTIONS_HEADING) else {
        return vec![];
    };

    let mut steps = vec![];
    for sibling in start
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|e| matches!(e.value().name(), "ol" | "p"))
    {
        if sibling.value().name() == "ol" {
            steps.extend(elements(sibling, "li").map(text_of));
        } else {
            steps.push(text_of(sibling));
        }
    }
    steps.retain(|s| !s.is_empty());
    steps
}

pub fn parse(html: &str) -> ImportedRecipe {
    let document = Html::parse_document(html);

    let name = elements(document.root_element(), "h1")
        .map(text_of)
        .next()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown Recipe".into());

    let info = document
        .root_element()
        .descendants()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .find(|text| info_regex().is_match(text))
        .unwrap_or_default();

    ImportedRecipe {
        name,
        persons: capture_number(persons_regex(), info),
        cooking_time: capture_number(minutes_regex(), info),
        cuisine_origin: "Belgian".into(),
        ingredients: ingredients(&document),
        instructions: instructions(&document),
    }
}

#[cfg(test)]
pub(super) const FIXTURE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Vol-au-vent | 15gram</title></head>
<body>
  <header><nav><ul><li>Recepten</li><li>Over ons</li></ul></nav></header>
  <article>
    <h1> Vol-au-vent met <em>frietjes</em> </h1>
    <div class="meta"><span>45 MIN</span> <span>4 personen</span></div>
    <div class="ingredients">
      <h3>Ingrediënten</h3>
      <div class="list">
        <ul>
          <li>1 soepkip</li>
          <li>250 g <strong>champignons</strong></li>
          <li>2 el bloem</li>
        </ul>
      </div>
    </div>
    <div class="method">
      <h3>BEREIDING</h3>
      <p>Kook de kip.</p>
      <ol>
        <li>Stoof de champignons.</li>
        <li>Bind de saus met bloem.</li>
      </ol>
      <p>Smakelijk!</p>
      <h4>Tip</h4>
      <p>Niet meegenomen.</p>
    </div>
  </article>
</body>
</html>
"#;

#[test]
fn parse_fixture() {
    let recipe = parse(FIXTURE);
    assert_eq!(recipe.name, "Vol-au-vent met frietjes");
    assert_eq!(recipe.cooking_time, 45);
    assert_eq!(recipe.persons, 0);
    assert_eq!(recipe.cuisine_origin, "Belgian");
    assert_eq!(
        recipe.ingredients,
        ["1 soepkip", "250 g champignons", "2 el bloem"]
    );
    assert_eq!(
        recipe.instructions,
        [
            "Kook de kip.",
            "Stoof de champignons.",
            "Bind de saus met bloem.",
            "Smakelijk!"
        ]
    );
}

#[test]
fn parse_persons_from_same_text() {
    let recipe = parse("<html><body><p>30 MIN - 2 personen</p></body></html>");
    assert_eq!(recipe.cooking_time, 30);
    assert_eq!(recipe.persons, 2);
}

#[test]
fn parse_empty_page() {
    let recipe = parse("<html><body></body></html>");
    assert_eq!(recipe.name, "Unknown Recipe");
    assert_eq!(recipe.cooking_time, 0);
    assert!(recipe.ingredients.is_empty());
    assert!(recipe.instructions.is_empty());
}
