use anyhow::Result;
use tenderfeed::{
    export::export_csv,
    process::{Record, Table},
    query::{run_query, QueryState, SortDirection, SortSpec},
    schema::{HeaderMapping, LogicalField},
    session::{FetchOutcome, Session},
    TenderError,
};
use tracing_subscriber::EnvFilter;

fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tenderfeed=debug")),
        )
        .with_test_writer()
        .try_init();
}

const LABELS: &str = "Title,Attachments,Contracting Entity,Published Date,Closing Date,\
Start Date,Contact Name,Email,Phone,Reference #,Solicitation #,UNSPSC,UNSPSC Description";

const FEED: &str = "\
title-en,title-fr,referenceNumber-eng,contractingEntityName-en,publicationDate.1,attachment-en,contactInfoEmail
Snow Removal,Déneigement,R-1,Public Works,2024-01-03,\"https://a/1.pdf,https://a/2.pdf\",x@pw.ca
Bridge Repair,Réparation,R-2,Transport,2024-01-01,,
Snow Fencing,Clôture,R-3,Public Works,2024-01-03,,
Airport Lighting,Éclairage,R-4,Transport,2024-01-02,,
";

fn refs(view: &[&Record]) -> Vec<String> {
    view.iter()
        .map(|r| r.get(LogicalField::ReferenceNumber).to_string())
        .collect()
}

fn by_date(dir: SortDirection) -> Result<QueryState> {
    Ok(QueryState::new().with_sort(SortSpec::new(LogicalField::PublicationDate, dir)?))
}

#[test]
fn duplicate_normalized_headers_map_to_first() {
    init_test_tracing();
    let headers: Vec<String> = ["title-en", "title-fr"].iter().map(|s| s.to_string()).collect();
    let mapping = HeaderMapping::resolve(&headers);
    assert_eq!(mapping.raw_header(LogicalField::Title), Some("title-en"));
}

#[test]
fn export_header_is_fixed_regardless_of_input() -> Result<()> {
    init_test_tracing();
    for feed in [FEED, "unrelated\n1\n", "title.9\nx\n"] {
        let table = Table::from_csv(feed)?;
        let text = export_csv(table.records());
        assert_eq!(text.lines().next(), Some(LABELS));
    }
    Ok(())
}

#[test]
fn empty_search_returns_sorted_sequence_unchanged() -> Result<()> {
    init_test_tracing();
    let table = Table::from_csv(FEED)?;
    let q = by_date(SortDirection::Ascending)?;
    let sorted = refs(&run_query(&table, &q));
    let searched = refs(&run_query(&table, &q.clone().with_search("")));
    assert_eq!(sorted, searched);
    assert_eq!(sorted, vec!["R-2", "R-4", "R-1", "R-3"]);
    Ok(())
}

#[test]
fn toggling_reverses_except_ties() -> Result<()> {
    init_test_tracing();
    let table = Table::from_csv(FEED)?;
    let mut q = QueryState::new();
    q.toggle_sort(LogicalField::PublicationDate)?;
    let asc = refs(&run_query(&table, &q));
    q.toggle_sort(LogicalField::PublicationDate)?;
    let desc = refs(&run_query(&table, &q));

    assert_eq!(asc, vec!["R-2", "R-4", "R-1", "R-3"]);
    // R-1 and R-3 share a date and keep table order in both directions
    assert_eq!(desc, vec!["R-1", "R-3", "R-4", "R-2"]);
    Ok(())
}

#[test]
fn versioned_row_projection() -> Result<()> {
    init_test_tracing();
    let table = Table::from_csv("title-en,publicationDate.1\nSnow Removal,2024-01-01\n")?;
    let rec = &table.records()[0];
    for (field, value) in rec.iter() {
        match field {
            LogicalField::Title => assert_eq!(value, "Snow Removal"),
            LogicalField::PublicationDate => assert_eq!(value, "2024-01-01"),
            _ => assert_eq!(value, ""),
        }
    }
    Ok(())
}

#[test]
fn sort_then_filter_example() -> Result<()> {
    init_test_tracing();
    let table = Table::from_records(
        ["A", "B", "C"]
            .iter()
            .map(|t| Record::default().with(LogicalField::Title, *t))
            .collect(),
    );
    let q = QueryState::new()
        .with_sort(SortSpec::new(LogicalField::Title, SortDirection::Ascending)?)
        .with_search("b");
    let view = run_query(&table, &q);
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].get(LogicalField::Title), "B");
    Ok(())
}

#[test]
fn export_doubles_quotes() {
    init_test_tracing();
    let rec = Record::default().with(LogicalField::Title, "He said \"hi\"");
    let text = export_csv([&rec]);
    assert!(text.contains("\"He said \"\"hi\"\"\""));
}

#[test]
fn search_reaches_every_column() -> Result<()> {
    init_test_tracing();
    let table = Table::from_csv(FEED)?;
    let q = QueryState::new().with_search("PUBLIC WORKS");
    assert_eq!(refs(&run_query(&table, &q)), vec!["R-1", "R-3"]);
    // attachment text participates as an opaque string
    let q = QueryState::new().with_search("2.pdf");
    assert_eq!(refs(&run_query(&table, &q)), vec!["R-1"]);
    Ok(())
}

#[test]
fn failed_refresh_keeps_displayed_table() -> Result<()> {
    init_test_tracing();
    let mut session = Session::new();
    let t = session.begin_fetch();
    assert_eq!(
        session.complete_fetch(t, Ok(FEED.to_string()))?,
        FetchOutcome::Installed { rows: 4 }
    );
    let before = session.export();

    let t = session.begin_fetch();
    let err = session
        .complete_fetch(
            t,
            Err(TenderError::Fetch {
                url: "https://feed".into(),
                message: "dns error".into(),
            }),
        )
        .unwrap_err();
    assert!(err.is_fetch());
    assert_eq!(session.export(), before);
    assert!(session.last_error().is_some());
    Ok(())
}

#[test]
fn invalid_sort_field_is_rejected() {
    init_test_tracing();
    assert!(matches!(
        SortSpec::new(LogicalField::Unspsc, SortDirection::Ascending),
        Err(TenderError::InvalidSortField(LogicalField::Unspsc))
    ));
}
