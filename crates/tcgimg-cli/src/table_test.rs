use super::*;
use tcgimg_scraper::{MissReason, RowOutcome};

fn read(csv: &str) -> Vec<CardRow> {
    read_rows(csv.as_bytes()).expect("valid CSV")
}

#[test]
fn reads_name_and_number_by_position() {
    let rows = read("Name,Number\nPikachu,025/165\n\"Farfetch'd, Sir\",083 / 165\n");
    assert_eq!(
        rows,
        vec![
            CardRow::new("Pikachu", "025/165"),
            CardRow::new("Farfetch'd, Sir", "083 / 165"),
        ]
    );
}

#[test]
fn missing_number_column_reads_as_empty() {
    let rows = read("card,number\nMewtwo\nMew,151,extra\n");
    assert_eq!(
        rows,
        vec![CardRow::new("Mewtwo", ""), CardRow::new("Mew", "151")]
    );
    assert_eq!(rows[0].search_query(), "Mewtwo");
}

#[test]
fn rows_without_a_name_are_kept_for_the_summary() {
    let rows = read("name,number\nPikachu,019 / 184\n  ,025\nMew,151\n");
    assert_eq!(
        rows,
        vec![
            CardRow::new("Pikachu", "019 / 184"),
            CardRow::new("", "025"),
            CardRow::new("Mew", "151"),
        ]
    );
}

#[test]
fn header_only_file_has_no_rows() {
    assert!(read("name,number\n").is_empty());
}

#[test]
fn summary_lists_counts_and_failed_rows() {
    let mut table = TableCollector::default();
    table.record(
        CardRow::new("Pikachu", "25"),
        RowOutcome::Found {
            detail_url: "https://example.com/cards/1".to_owned(),
            image_url: "https://img.example/1.png".to_owned(),
        },
    );
    table.record(
        CardRow::new("Missingno", ""),
        RowOutcome::NotFound {
            reason: MissReason::NoMatches,
        },
    );
    table.record(
        CardRow::new("Mew", "151"),
        RowOutcome::NotFound {
            reason: MissReason::FetchFailed("timed out".to_owned()),
        },
    );
    table.record(
        CardRow::new("", "025"),
        RowOutcome::NotFound {
            reason: MissReason::BlankName,
        },
    );

    let mut buf = Vec::new();
    write_summary(&mut buf, &table).expect("write to Vec");

    assert_eq!(
        String::from_utf8(buf).expect("utf8"),
        concat!(
            "Rows attempted: 4\n",
            "Found: 1\n",
            "Not found: 3\n",
            "\n",
            "Rows without an image:\n",
            "  Missingno (): no matching card\n",
            "  Mew (151): fetch failed: timed out\n",
            "   (025): row has no card name\n",
        )
    );
}

#[test]
fn summary_without_failures_has_counts_only() {
    let mut buf = Vec::new();
    write_summary(&mut buf, &TableCollector::default()).expect("write to Vec");
    assert_eq!(
        String::from_utf8(buf).expect("utf8"),
        "Rows attempted: 0\nFound: 0\nNot found: 0\n"
    );
}
