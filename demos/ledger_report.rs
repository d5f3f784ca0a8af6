use ledger_summary::{process_csv, process_workbook, verify_net_profit, LoadOptions};
use std::fs::File;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("usage: ledger_report <ledger.xlsx|ledger.csv> [--json]");
            std::process::exit(2);
        }
    };
    let as_json = args.any(|arg| arg == "--json");

    let is_csv = Path::new(&path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let report = if is_csv {
        process_csv(File::open(&path)?)?
    } else {
        let bytes = std::fs::read(&path)?;
        process_workbook(&bytes, &LoadOptions::default())?
    };

    verify_net_profit(&report.summary, 0.01)?;

    if as_json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.to_markdown());
    }

    Ok(())
}
