use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::domain::ProblemRecord;

const NAME_CELL: usize = 1;
const DIFFICULTY_CELL: usize = 4;

/// The page does not have the listing layout the extractor expects.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ExtractError {
    #[error("Malformed page: no row group container")]
    MissingRowGroup,
    #[error("Malformed page: row group has no rows")]
    NoRows,
    #[error("Malformed page: first row has no cell {0}")]
    MissingCell(usize),
    #[error("Malformed page: cell {cell} has no <{tag}> element")]
    MissingElement { cell: usize, tag: &'static str },
    #[error("Malformed page: empty {0}")]
    EmptyField(&'static str),
    #[error("Malformed page: cannot resolve problem link {href}: {reason}")]
    InvalidUrl { href: String, reason: String },
    #[error("Malformed page: invalid selector {0}")]
    Selector(String),
}

struct Selectors {
    row_group: Selector,
    row: Selector,
    cell: Selector,
    link: Selector,
    label: Selector,
}

impl Selectors {
    fn new() -> Result<Self, ExtractError> {
        let parse =
            |css: &str| Selector::parse(css).map_err(|e| ExtractError::Selector(e.to_string()));

        Ok(Selectors {
            row_group: parse(r#"div[role="rowgroup"]"#)?,
            row: parse(r#"div[role="row"]"#)?,
            cell: parse(r#"div[role="cell"]"#)?,
            link: parse("a")?,
            label: parse("span")?,
        })
    }
}

/// Pulls the featured problem out of the rendered listing page.
///
/// The featured problem is taken to be the first row of the first row
/// group. Cell 1 holds the link (text is the name, `href` is resolved
/// against `origin`) and cell 4 holds the difficulty label. Searches are
/// descendant searches in document order.
///
/// Name and difficulty are the element text with surrounding whitespace
/// trimmed, so they can differ from the raw text node content by leading
/// or trailing whitespace.
pub fn extract_problem(markup: &str, origin: &Url) -> Result<ProblemRecord, ExtractError> {
    let selectors = Selectors::new()?;
    let document = Html::parse_document(markup);

    let row_group = document
        .select(&selectors.row_group)
        .next()
        .ok_or(ExtractError::MissingRowGroup)?;
    let first_row = row_group
        .select(&selectors.row)
        .next()
        .ok_or(ExtractError::NoRows)?;
    let cells: Vec<ElementRef> = first_row.select(&selectors.cell).collect();

    let name_cell = cells
        .get(NAME_CELL)
        .ok_or(ExtractError::MissingCell(NAME_CELL))?;
    let link = name_cell
        .select(&selectors.link)
        .next()
        .ok_or(ExtractError::MissingElement {
            cell: NAME_CELL,
            tag: "a",
        })?;
    let name = non_empty(text_of(link), "problem name")?;
    let href = link
        .value()
        .attr("href")
        .ok_or(ExtractError::EmptyField("problem link"))?;
    let url = origin
        .join(href)
        .map_err(|e| ExtractError::InvalidUrl {
            href: href.to_string(),
            reason: e.to_string(),
        })?
        .to_string();

    let difficulty_cell = cells
        .get(DIFFICULTY_CELL)
        .ok_or(ExtractError::MissingCell(DIFFICULTY_CELL))?;
    let label = difficulty_cell
        .select(&selectors.label)
        .next()
        .ok_or(ExtractError::MissingElement {
            cell: DIFFICULTY_CELL,
            tag: "span",
        })?;
    let difficulty = non_empty(text_of(label), "difficulty")?;

    log::info!("HTML parsed");

    Ok(ProblemRecord {
        name,
        url,
        difficulty,
    })
}

fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn non_empty(text: String, field: &'static str) -> Result<String, ExtractError> {
    match text.is_empty() {
        true => Err(ExtractError::EmptyField(field)),
        false => Ok(text),
    }
}
