// src/services/extractor/table.rs

//! Known staff table layout with positional cells.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::ExtractionStrategy;
use crate::error::Result;
use crate::models::{CoachRecord, TableLayout};
use crate::utils::{contact_value, element_text, parse_selector, resolve_url};

/// Reads rows of a known staff table, one coach per row.
pub struct TableStrategy {
    layout: TableLayout,
    table: Selector,
    row: Selector,
    cell: Selector,
    link: Selector,
    image: Selector,
    mailto: Selector,
    tel: Selector,
}

impl TableStrategy {
    pub fn new(layout: &TableLayout) -> Result<Self> {
        Ok(Self {
            layout: layout.clone(),
            table: parse_selector(&layout.table_selector)?,
            row: parse_selector(&layout.row_selector)?,
            cell: parse_selector(&layout.cell_selector)?,
            link: parse_selector("a[href]")?,
            image: parse_selector("img")?,
            mailto: parse_selector("a[href^='mailto:']")?,
            tel: parse_selector("a[href^='tel:']")?,
        })
    }

    fn parse_row(&self, row: &ElementRef<'_>, base: &Url) -> Option<CoachRecord> {
        let cells: Vec<ElementRef<'_>> = row.select(&self.cell).collect();
        let cell = |index: usize| cells.get(index);

        let name_cell = cell(self.layout.name_cell)?;
        let link = name_cell.select(&self.link).next();
        let mut record = match link {
            Some(a) => {
                let mut record = CoachRecord::named(&element_text(&a))?;
                record.profile_url = a
                    .value()
                    .attr("href")
                    .and_then(|href| resolve_url(base, href));
                record
            }
            None => CoachRecord::named(&element_text(name_cell))?,
        };

        record.image_url = cell(self.layout.image_cell)
            .and_then(|c| c.select(&self.image).next())
            .and_then(|img| img.value().attr("src").or(img.value().attr("data-src")))
            .and_then(|src| resolve_url(base, src));

        record.position = cell(self.layout.position_cell)
            .map(element_text)
            .filter(|text| !text.is_empty());

        record.email = cell(self.layout.email_cell)
            .and_then(|c| c.select(&self.mailto).next())
            .and_then(|a| contact_value(&a, "mailto:"));

        record.phone = cell(self.layout.phone_cell).and_then(|c| {
            let text = match c.select(&self.tel).next() {
                Some(a) => element_text(&a),
                None => element_text(c),
            };
            (!text.is_empty()).then_some(text)
        });

        record.sport = Some(self.layout.sport.clone());
        Some(record)
    }
}

impl ExtractionStrategy for TableStrategy {
    fn name(&self) -> &'static str {
        "table"
    }

    fn extract(&self, document: &Html, base: &Url) -> Vec<CoachRecord> {
        document
            .select(&self.table)
            .flat_map(|table| table.select(&self.row))
            .filter_map(|row| self.parse_row(&row, base))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Vec<CoachRecord> {
        let strategy = TableStrategy::new(&TableLayout::default()).unwrap();
        let base = Url::parse("https://goexample.com/sports/football/coaches").unwrap();
        strategy.extract(&Html::parse_document(html), &base)
    }

    #[test]
    fn test_row_with_mailto_and_empty_phone() {
        let records = extract(
            r#"<table class="sidearm-table"><tbody>
                <tr class="sidearm-coaches-coach">
                  <td><img src="/images/jane.jpg" alt=""></td>
                  <td><a href="/sports/football/roster/coaches/jane-doe/12">Jane Doe</a></td>
                  <td>Head Coach</td>
                  <td><a href="mailto:jd@x.edu">Email</a></td>
                  <td></td>
                </tr>
            </tbody></table>"#,
        );

        assert_eq!(records.len(), 1);
        let jane = &records[0];
        assert_eq!(jane.name, "Jane Doe");
        assert_eq!(jane.email.as_deref(), Some("jd@x.edu"));
        assert_eq!(jane.phone, None);
        assert_eq!(jane.position.as_deref(), Some("Head Coach"));
        assert_eq!(jane.sport.as_deref(), Some("Football"));
        assert_eq!(
            jane.profile_url.as_deref(),
            Some("https://goexample.com/sports/football/roster/coaches/jane-doe/12")
        );
        assert_eq!(
            jane.image_url.as_deref(),
            Some("https://goexample.com/images/jane.jpg")
        );
    }

    #[test]
    fn test_phone_from_tel_anchor_or_cell_text() {
        let records = extract(
            r#"<table class="sidearm-table">
                <tr class="sidearm-coaches-coach">
                  <td></td><td>Al Brown</td><td></td><td></td>
                  <td><a href="tel:5551234">555-1234</a></td>
                </tr>
                <tr class="sidearm-coaches-coach">
                  <td></td><td>Cy Young</td><td>Analyst</td><td></td>
                  <td>555-9876</td>
                </tr>
            </table>"#,
        );

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].phone.as_deref(), Some("555-1234"));
        assert_eq!(records[0].profile_url, None);
        assert_eq!(records[0].position, None);
        assert_eq!(records[1].phone.as_deref(), Some("555-9876"));
    }

    #[test]
    fn test_rows_without_name_are_skipped() {
        let records = extract(
            r#"<table class="sidearm-table">
                <tr class="sidearm-coaches-coach"><td></td><td>  </td><td>Coach</td></tr>
                <tr class="sidearm-coaches-coach"><td></td></tr>
                <tr class="other-row"><td></td><td>Not A Coach</td></tr>
            </table>"#,
        );
        assert!(records.is_empty());
    }
}
