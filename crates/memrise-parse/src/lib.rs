use memrise_model::{AttachmentId, Error, Result, Word};
use scraper::{ElementRef, Html, Selector};

pub mod normalize;

/// Parse the rendered level editing table into words.
///
/// The editor renders one `tr.thing` per word. Within a row the second
/// cell holds the target-language text, the third the definition, and the
/// first cell whose class mentions `audio` is the audio column, listing its
/// existing files inside `div.dropdown-menu`.
///
/// Rows that lack an id, text or audio column are skipped with a warning.
/// A document with no table at all, or a table where no row can be read,
/// means the editor markup has changed and is reported as [`Error::Parse`].
pub fn parse_level_words(html: &str) -> Result<Vec<Word>> {
    let document = Html::parse_fragment(html);

    let table_sel = Selector::parse("table").expect("valid selector");
    if document.select(&table_sel).next().is_none() {
        return Err(Error::Parse(
            "level editing HTML has no word table".to_string(),
        ));
    }

    let row_sel = Selector::parse("tr.thing").expect("valid selector");
    let mut words = Vec::new();
    let mut rows = 0usize;

    for row in document.select(&row_sel) {
        rows += 1;
        match parse_row(row) {
            Ok(word) => words.push(word),
            Err(reason) => {
                let thing_id = row.value().attr("data-thing-id").unwrap_or("?");
                tracing::warn!(thing_id, reason, "Skipping unparseable word row");
            }
        }
    }

    if rows > 0 && words.is_empty() {
        return Err(Error::Parse(format!(
            "none of the {rows} word rows in the level table could be read"
        )));
    }

    tracing::debug!(rows, words = words.len(), "Parsed level word table");
    Ok(words)
}

fn parse_row(row: ElementRef) -> std::result::Result<Word, &'static str> {
    let thing_id = row
        .value()
        .attr("data-thing-id")
        .ok_or("missing data-thing-id")?
        .trim()
        .parse::<u64>()
        .map_err(|_| "non-numeric data-thing-id")?;

    let cells: Vec<ElementRef> = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "td")
        .collect();

    let target_text = cells
        .get(1)
        .and_then(|td| cell_text(*td))
        .ok_or("missing word text")?;

    let source_text = cells
        .get(2)
        .filter(|td| !is_audio_cell(**td))
        .and_then(|td| cell_text(*td));

    let audio_cell = cells
        .iter()
        .copied()
        .find(|td| is_audio_cell(*td))
        .ok_or("missing audio column")?;

    let audio_column = audio_cell
        .value()
        .attr("data-key")
        .ok_or("audio column has no data-key")?
        .trim()
        .to_string();

    Ok(Word {
        thing_id,
        target_text,
        source_text,
        audio_column,
        attachments: attachments(audio_cell),
    })
}

fn is_audio_cell(td: ElementRef) -> bool {
    td.value().classes().any(|c| c.contains("audio"))
}

/// Text of the `div > div` wrapper the editor puts around each cell value.
fn cell_text(td: ElementRef) -> Option<String> {
    let value_sel = Selector::parse("div > div").expect("valid selector");
    let value = td.select(&value_sel).next()?;
    let text = normalize::normalize_text(&value.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

/// Existing audio files, one `div` per file inside the cell's dropdown menu.
///
/// Files are identified by `data-id`/`data-file-id` when every entry has
/// one; otherwise the whole cell falls back to 1-based positions, which is
/// what the delete endpoint accepts.
fn attachments(audio_cell: ElementRef) -> Vec<AttachmentId> {
    let file_sel = Selector::parse("div.dropdown-menu > div").expect("valid selector");
    let files: Vec<ElementRef> = audio_cell.select(&file_sel).collect();

    let explicit: Option<Vec<AttachmentId>> = files
        .iter()
        .map(|file| {
            file.value()
                .attr("data-id")
                .or_else(|| file.value().attr("data-file-id"))
                .map(AttachmentId::from)
        })
        .collect();

    explicit.unwrap_or_else(|| {
        (1..=files.len())
            .map(|i| AttachmentId(i.to_string()))
            .collect()
    })
}
