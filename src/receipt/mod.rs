// Copyright 2023 Remi Bernotavicius

use crate::database::models::{NewReceiptItem, ReceiptItem};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

mod ocr;

pub use ocr::{perform_ocr, OcrError};

const KNOWN_SHOPS: [&str; 5] = ["lidl", "aldi", "colruyt", "delhaize", "carrefour"];
pub const UNKNOWN_SHOP: &str = "Unknown Shop";

/// What could be read from one receipt.
#[derive(Clone, Debug, PartialEq)]
pub struct ReceiptScan {
    pub shop: String,
    pub date: NaiveDate,
    pub items: Vec<ScannedItem>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScannedItem {
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: String,
}

impl ReceiptScan {
    pub fn to_new_items(&self, image_path: &str) -> Vec<NewReceiptItem> {
        self.items
            .iter()
            .map(|item| NewReceiptItem {
                item_name: item.name.clone(),
                price: item.price,
                shop: self.shop.clone(),
                price_date: self.date,
                quantity: item.quantity,
                unit: item.unit.clone(),
                receipt_image_path: image_path.into(),
            })
            .collect()
    }
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{2}[-/]\d{2}[-/]\d{4})").unwrap())
}

fn item_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?)\s+([\d,]+\.\d{2})\s*$").unwrap())
}

fn leading_count_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\s*").unwrap())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn find_shop(lines: &[&str]) -> Option<String> {
    lines.iter().find_map(|line| {
        let line = line.to_lowercase();
        KNOWN_SHOPS
            .iter()
            .find(|shop| line.contains(*shop))
            .map(|shop| capitalize(shop))
    })
}

fn find_date(lines: &[&str]) -> Option<NaiveDate> {
    lines.iter().find_map(|line| {
        let found = date_regex().captures(line)?;
        NaiveDate::parse_from_str(&found[1].replace('-', "/"), "%d/%m/%Y").ok()
    })
}

fn parse_item(line: &str) -> Option<ScannedItem> {
    let found = item_regex().captures(line)?;
    let name = leading_count_regex().replace(found[1].trim(), "").trim().to_owned();
    if name.is_empty() {
        return None;
    }
    let price = found[2].replace(',', "").parse().ok()?;
    Some(ScannedItem {
        name,
        price,
        quantity: 1.0,
        unit: String::new(),
    })
}

/// Pulls the shop, date and priced lines out of OCR text. Falls back to [`UNKNOWN_SHOP`] and
/// `today` when those can't be found.
pub fn parse_receipt(text: &str, today: NaiveDate) -> ReceiptScan {
    let lines: Vec<&str> = text.lines().collect();

    let shop = find_shop(&lines).unwrap_or_else(|| UNKNOWN_SHOP.into());
    let date = find_date(&lines).unwrap_or(today);
    let items: Vec<_> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .filter_map(parse_item)
        .collect();

    log::info!(
        "parsed receipt from {shop} dated {date} with {} items",
        items.len()
    );
    ReceiptScan { shop, date, items }
}

/// The first saved receipt item whose name contains `ingredient`, ignoring case. `items` are
/// expected newest first.
pub fn find_ingredient_price<'a>(
    ingredient: &str,
    items: &'a [ReceiptItem],
) -> Option<&'a ReceiptItem> {
    let needle = ingredient.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    items
        .iter()
        .find(|item| item.item_name.to_lowercase().contains(&needle))
}

#[cfg(test)]
pub(crate) fn receipt_item(name: &str, price: f64, shop: &str, day: u32) -> ReceiptItem {
    use crate::database::models::ReceiptItemId;

    ReceiptItem {
        id: ReceiptItemId::from_raw(day as i32),
        item_name: name.into(),
        price,
        shop: shop.into(),
        price_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
        quantity: 1.0,
        unit: String::new(),
        receipt_image_path: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIDL_RECEIPT: &str = "\
LIDL Belgium
Kassa 3
12/05/2024 17:32
2 Bananen 1.98
Melk halfvol   0.99
Kaas jong belegen 1,234.50
  12.00
TOTAAL 1,237.47
";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn parse_shop_date_and_items() {
        let scan = parse_receipt(LIDL_RECEIPT, today());
        assert_eq!(scan.shop, "Lidl");
        assert_eq!(scan.date, NaiveDate::from_ymd_opt(2024, 5, 12).unwrap());

        let items: Vec<_> = scan
            .items
            .iter()
            .map(|i| (i.name.as_str(), i.price))
            .collect();
        assert_eq!(
            items,
            [
                ("Bananen", 1.98),
                ("Melk halfvol", 0.99),
                ("Kaas jong belegen", 1234.50),
                ("TOTAAL", 1237.47),
            ]
        );
        assert!(scan.items.iter().all(|i| i.quantity == 1.0));
    }

    #[test]
    fn count_without_name_is_skipped() {
        let scan = parse_receipt("3 2.50\nBrood 2.10\n12 0.99\n", today());
        let names: Vec<_> = scan.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Brood"]);
    }

    #[test]
    fn parse_defaults() {
        let scan = parse_receipt("31-02-2024\nnothing priced here", today());
        assert_eq!(scan.shop, UNKNOWN_SHOP);
        assert_eq!(scan.date, today());
        assert!(scan.items.is_empty());
    }

    #[test]
    fn dashed_dates_and_later_shop_lines() {
        let scan = parse_receipt("welcome\nColruyt Laagste Prijzen\n03-01-2024", today());
        assert_eq!(scan.shop, "Colruyt");
        assert_eq!(scan.date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn scan_to_new_items() {
        let scan = parse_receipt(LIDL_RECEIPT, today());
        let new_items = scan.to_new_items("/tmp/receipt.png");
        assert_eq!(new_items.len(), 4);
        assert_eq!(new_items[0].shop, "Lidl");
        assert_eq!(new_items[0].price_date, scan.date);
        assert_eq!(new_items[0].receipt_image_path, "/tmp/receipt.png");
    }

    #[test]
    fn ingredient_price_first_match() {
        let items = [
            receipt_item("Bio TOMATEN", 2.49, "Delhaize", 20),
            receipt_item("tomaten", 1.99, "Aldi", 10),
        ];
        let found = find_ingredient_price("Tomaten", &items).unwrap();
        assert_eq!(found.price, 2.49);
        assert_eq!(found.shop, "Delhaize");
        assert!(find_ingredient_price("ui", &items).is_none());
        assert!(find_ingredient_price("", &items).is_none());
    }
}
